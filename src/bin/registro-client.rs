//! Registration CLI tool
//!
//! Checks a registration locally with the same sanitizing and validation rules
//! the server applies, or submits it to a running server's JSON API.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Validate without contacting the server
//! registro-client check --nombres "Ana" --apellidos "Pérez" --cedula 52123456 \
//!   --fecha-nacimiento 1995-06-15 --sexo Femenino --telefono 3001234567 \
//!   --email ana@example.com --password 'Abcdef1!'
//!
//! # Register against a local server
//! REGISTRO_PASSWORD='Abcdef1!' registro-client --base-url http://localhost:8080 submit \
//!   --nombres "Ana" --apellidos "Pérez" --cedula 52123456 --fecha-nacimiento 1995-06-15 \
//!   --sexo Femenino --telefono 3001234567 --email ana@example.com
//! ```
//!
//! ## Environment Variables
//!
//! - `REGISTRO_BASE_URL`: server base URL (alternative to --base-url)
//! - `REGISTRO_PASSWORD`: password (alternative to --password)
//! - `REGISTRO_CONFIRM_PASSWORD`: confirmation (alternative to --confirm-password)
//!
//! Exit codes:
//! - 0: Success
//! - 1: Network or response parsing error
//! - 2: The registration is invalid
//! - 3: The server refused the registration (email taken or backend failure)

use clap::{Args, Parser, Subcommand, ValueEnum};
use registro::registration::{ErrorMap, FormState, RegistrationForm, validate};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::process;

/// Main CLI application structure
#[derive(Parser)]
#[command(
    name = "registro-client",
    about = "Registration CLI tool",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Base URL of the registration server
    #[arg(long, env = "REGISTRO_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// JSON formatted output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// Human-readable output
    Text,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Validate a registration locally
    Check(RegistrationArgs),
    /// Validate locally, then register with the server
    Submit(RegistrationArgs),
}

/// Registration form values
#[derive(Args)]
struct RegistrationArgs {
    #[arg(long, default_value = "")]
    nombres: String,

    #[arg(long, default_value = "")]
    apellidos: String,

    #[arg(long, default_value = "")]
    cedula: String,

    /// Date of birth, YYYY-MM-DD
    #[arg(long, default_value = "")]
    fecha_nacimiento: String,

    /// Masculino or Femenino
    #[arg(long, default_value = "")]
    sexo: String,

    #[arg(long, default_value = "")]
    telefono: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, env = "REGISTRO_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Defaults to --password
    #[arg(long, env = "REGISTRO_CONFIRM_PASSWORD", hide_env_values = true)]
    confirm_password: Option<String>,
}

impl RegistrationArgs {
    /// Raw values run through the same per-field sanitizing as the web form
    fn to_form(&self) -> RegistrationForm {
        RegistrationForm::from_state(&FormState {
            cedula: self.cedula.clone(),
            nombres: self.nombres.clone(),
            apellidos: self.apellidos.clone(),
            fecha_nacimiento: self.fecha_nacimiento.clone(),
            sexo: self.sexo.clone(),
            telefono: self.telefono.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self
                .confirm_password
                .clone()
                .unwrap_or_else(|| self.password.clone()),
        })
    }
}

/// Application errors
#[derive(Debug)]
enum AppError {
    /// Network or HTTP client errors
    Network(reqwest::Error),
    /// JSON parsing or serialization errors
    Json(serde_json::Error),
    /// Local validation failed
    Invalid(ErrorMap),
    /// The server answered with something other than a registration
    Rejected(StatusCode, Value),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Network(_) | AppError::Json(_) => 1,
            AppError::Invalid(_) => 2,
            AppError::Rejected(StatusCode::UNPROCESSABLE_ENTITY, _) => 2,
            AppError::Rejected(_, _) => 3,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Network(err) => write!(f, "Network error: {}", err),
            AppError::Json(err) => write!(f, "JSON error: {}", err),
            AppError::Invalid(errors) => write!(f, "Registration is invalid ({} fields)", errors.len()),
            AppError::Rejected(status, body) => {
                let message = body
                    .pointer("/notification/message")
                    .and_then(Value::as_str)
                    .unwrap_or("unexpected response");
                write!(f, "Server refused the registration ({}): {}", status, message)
            }
        }
    }
}

/// Main application entry point
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Check(args) => check(&cli, args),
        Commands::Submit(args) => submit(&cli, args).await,
    };

    if let Err(err) = result {
        match &err {
            AppError::Invalid(errors) => {
                let _ = output_response(&cli.format, errors);
            }
            AppError::Rejected(_, body) => {
                let _ = output_response(&cli.format, body);
            }
            _ => {}
        }
        eprintln!("Error: {}", err);
        process::exit(err.exit_code());
    }
}

/// Validate the registration locally
fn check(cli: &Cli, args: &RegistrationArgs) -> Result<(), AppError> {
    let form = args.to_form();
    validate(form.state()).map_err(AppError::Invalid)?;
    if cli.verbose {
        eprintln!("Registration is valid");
    }
    output_response(&cli.format, &serde_json::json!({ "status": "valid" }))
}

/// Validate locally, then post the sanitized form to the server
async fn submit(cli: &Cli, args: &RegistrationArgs) -> Result<(), AppError> {
    let form = args.to_form();
    validate(form.state()).map_err(AppError::Invalid)?;

    let url = format!("{}/api/registro", cli.base_url.trim_end_matches('/'));
    if cli.verbose {
        eprintln!("Submitting registration to {}", url);
    }

    let response = Client::new().post(&url).json(form.state()).send().await?;
    let status = response.status();
    if cli.verbose {
        eprintln!("Response status: {}", status);
    }

    let body: Value = response.json().await?;
    match status {
        StatusCode::CREATED => output_response(&cli.format, &body),
        status => Err(AppError::Rejected(status, body)),
    }
}

/// Output response data in the requested format
fn output_response<T: Serialize>(format: &OutputFormat, data: &T) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(data)?);
        }
        OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            let json_value: Value = serde_json::to_value(data)?;
            print_text(&json_value, 0);
        }
    }
    Ok(())
}

/// Print data as indented key-value lines; field error lists print as `field: message`
fn print_text(value: &Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}:", prefix, key);
                        print_text(val, indent + 1);
                    }
                    _ => println!("{}{}: {}", prefix, key, format_value(val)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match (item.get("field"), item.get("message")) {
                    (Some(field), Some(message)) => {
                        println!("{}{}: {}", prefix, format_value(field), format_value(message));
                    }
                    _ => print_text(item, indent),
                }
            }
        }
        _ => println!("{}{}", prefix, format_value(value)),
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_else(|_| "invalid".to_string()),
    }
}
