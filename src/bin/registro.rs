//! Registration server binary.
//!
//! Reads configuration from the environment, wires the identity and document
//! backends into the registration service and serves the HTTP surface with
//! graceful shutdown.

use anyhow::Result;
use registro::{
    config::Config,
    http::{AppState, build_router},
    registration::RegistrationService,
    storage::{create_document_store, create_identity_provider},
    templates::build_engine,
};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "registro=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = registro::config::version()?;

    if env::args().any(|arg| arg == "--version") {
        println!("{version}");
        return Ok(());
    }

    tracing::info!(?version, "Starting registro");

    let config = Config::new()?;

    // Build HTTP client with certificate bundles
    let mut client_builder = reqwest::Client::builder();
    for ca_certificate in config.certificate_bundles.as_ref() {
        tracing::info!("Loading CA certificate: {:?}", ca_certificate);
        let cert = std::fs::read(ca_certificate)?;
        let cert = reqwest::Certificate::from_pem(&cert)?;
        client_builder = client_builder.add_root_certificate(cert);
    }

    client_builder = client_builder
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref());
    let http_client = client_builder.build()?;

    let template_env = build_engine(&config.http_templates_path, &version);

    tracing::info!(
        identity_backend = ?config.identity_backend,
        storage_backend = ?config.storage_backend,
        collection = %config.profile_collection.as_ref(),
        "Configuring registration backends"
    );
    let identity_provider = create_identity_provider(
        &config.identity_backend,
        &http_client,
        config.firebase.as_ref(),
    )?;
    let document_store = create_document_store(
        &config.storage_backend,
        &http_client,
        config.firebase.as_ref(),
    )
    .await?;

    let registration_service = Arc::new(
        RegistrationService::new(identity_provider, document_store)
            .with_collection(config.profile_collection.as_ref()),
    );

    let http_port = *config.http_port.as_ref();
    let app = build_router(AppState::new(
        Arc::new(config),
        template_env,
        registration_service,
    ));

    // Setup graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Bind before spawning so a busy port fails startup
    let bind_address = format!("0.0.0.0:{http_port}");
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Starting server on {bind_address}");

    {
        let inner_token = token.clone();
        tracker.spawn(async move {
            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_token.cancelled().await;
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
