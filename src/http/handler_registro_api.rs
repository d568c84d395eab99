//! Handles POST /api/registro - JSON registration endpoint

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::context::AppState;
use super::handler_registro::{outcome_status, submit_form};
use crate::errors::{HttpError, RegistrationError, Result};
use crate::registration::{APPLICATION_ROOT, ErrorMap, FormState, Notification, SubmitOutcome};

/// Body of every /api/registro response, tagged by `status`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationResponse {
    Registered {
        uid: String,
        notification: Notification,
        redirect: String,
    },
    Invalid {
        notification: Notification,
        errors: ErrorMap,
    },
    EmailAlreadyRegistered {
        notification: Notification,
    },
    Failed {
        notification: Notification,
    },
}

/// Register a user from a JSON form body
pub async fn handle_registro_api(
    State(state): State<AppState>,
    Json(raw): Json<FormState>,
) -> Result<Response> {
    let submission = submit_form(&state, &raw).await;
    let status = outcome_status(&submission.outcome);

    // Every reachable outcome emits exactly one notification
    let notification = submission.notification.ok_or_else(|| {
        HttpError::RequestProcessingFailed("submission produced no notification".to_string())
    })?;

    let body = match submission.outcome {
        SubmitOutcome::Completed(Ok(registered)) => RegistrationResponse::Registered {
            uid: registered.uid,
            notification,
            redirect: submission
                .redirect
                .unwrap_or_else(|| APPLICATION_ROOT.to_string()),
        },
        SubmitOutcome::Invalid => RegistrationResponse::Invalid {
            notification,
            errors: submission.form.errors().clone(),
        },
        SubmitOutcome::Completed(Err(RegistrationError::IdentityConflict(_))) => {
            RegistrationResponse::EmailAlreadyRegistered { notification }
        }
        SubmitOutcome::Completed(Err(_)) => RegistrationResponse::Failed { notification },
        SubmitOutcome::AlreadySubmitting | SubmitOutcome::AlreadyRegistered => {
            return Err(HttpError::RequestProcessingFailed(
                "fresh form reported a previous submission".to_string(),
            ));
        }
    };

    Ok((status, Json(body)).into_response())
}
