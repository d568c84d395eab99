//! Handles GET and POST /registro - the HTML registration form

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use http::StatusCode;
use minijinja::context;
use std::collections::BTreeMap;

use super::context::AppState;
use crate::errors::{RegistrationError, Result};
use crate::registration::form::{SEXO_FEMENINO, SEXO_MASCULINO};
use crate::registration::{
    APPLICATION_ROOT, ErrorMap, Field, FormState, Notification, RecordingSurface, RegistrationForm,
    SubmitOutcome,
};

const SEXO_OPTIONS: [&str; 2] = [SEXO_MASCULINO, SEXO_FEMENINO];

/// A finished form submission and what it asked the page to show
pub(super) struct Submission {
    pub form: RegistrationForm,
    pub outcome: SubmitOutcome,
    pub notification: Option<Notification>,
    pub redirect: Option<String>,
}

/// Replay a posted form through a fresh controller and submit it
pub(super) async fn submit_form(state: &AppState, raw: &FormState) -> Submission {
    let mut form = RegistrationForm::from_state(raw);
    let surface = RecordingSurface::new();
    let outcome = form
        .submit(&state.registration_service, &surface, &surface)
        .await;
    Submission {
        form,
        outcome,
        notification: surface.last_notification(),
        redirect: surface.redirect(),
    }
}

/// Status code shared by the HTML and JSON surfaces for a submission outcome
pub(super) fn outcome_status(outcome: &SubmitOutcome) -> StatusCode {
    match outcome {
        SubmitOutcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Completed(Ok(_)) => StatusCode::CREATED,
        SubmitOutcome::Completed(Err(RegistrationError::IdentityConflict(_))) => {
            StatusCode::CONFLICT
        }
        SubmitOutcome::Completed(Err(_)) => StatusCode::BAD_GATEWAY,
        SubmitOutcome::AlreadySubmitting | SubmitOutcome::AlreadyRegistered => {
            StatusCode::CONFLICT
        }
    }
}

/// Values written back into the page. Credentials are left blank so they never
/// appear in rendered HTML; the controller's own state keeps them.
fn page_values(form: &FormState) -> BTreeMap<&'static str, &str> {
    Field::ALL
        .into_iter()
        .map(|field| {
            let value = if field.is_secret() { "" } else { form.get(field) };
            (field.as_str(), value)
        })
        .collect()
}

fn errors_by_field(errors: &ErrorMap) -> BTreeMap<&'static str, &str> {
    errors
        .iter()
        .map(|(field, message)| (field.as_str(), message))
        .collect()
}

/// Render an empty registration form
pub async fn handle_registro_form(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(RenderHtml(
        "registro.html",
        state.template_env.clone(),
        context! {
            form => page_values(&FormState::default()),
            errors => BTreeMap::<&str, &str>::new(),
            sexo_options => SEXO_OPTIONS,
        },
    ))
}

/// Submit the posted form.
///
/// On success the confirmation page sends the browser on to the application
/// root. Anything else re-renders the form with the values, the per-field
/// errors and the notification.
pub async fn handle_registro_submit(
    State(state): State<AppState>,
    Form(raw): Form<FormState>,
) -> Result<Response> {
    let submission = submit_form(&state, &raw).await;
    let status = outcome_status(&submission.outcome);

    if let SubmitOutcome::Completed(Ok(_)) = submission.outcome {
        let redirect = submission
            .redirect
            .unwrap_or_else(|| APPLICATION_ROOT.to_string());
        return Ok((
            StatusCode::OK,
            RenderHtml(
                "registro_exitoso.html",
                state.template_env.clone(),
                context! {
                    notification => submission.notification,
                    redirect => redirect,
                },
            ),
        )
            .into_response());
    }

    Ok((
        status,
        RenderHtml(
            "registro.html",
            state.template_env.clone(),
            context! {
                form => page_values(submission.form.state()),
                errors => errors_by_field(submission.form.errors()),
                notification => submission.notification,
                sexo_options => SEXO_OPTIONS,
            },
        ),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::test_support::memory_state;
    use crate::registration::orchestrator::MSG_EMAIL_TAKEN;
    use crate::registration::validation::MSG_CEDULA_FORMAT;
    use crate::storage::IdentityProvider;
    use axum::body::to_bytes;

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn posted(cedula: &str, email: &str) -> FormState {
        FormState {
            nombres: "Ana María".to_string(),
            apellidos: "Pérez".to_string(),
            cedula: cedula.to_string(),
            fecha_nacimiento: "1995-06-15".to_string(),
            sexo: "Femenino".to_string(),
            telefono: "3001234567".to_string(),
            email: email.to_string(),
            password: "Abcdef1!".to_string(),
            confirm_password: "Abcdef1!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_form_page_renders() {
        let (state, _, _) = memory_state();
        let response = handle_registro_form(State(state)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("name=\"fechaNacimiento\""));
        assert!(html.contains("<option value=\"Masculino\""));
    }

    #[tokio::test]
    async fn test_invalid_post_rerenders_with_values() {
        let (state, _, documents) = memory_state();
        let response = handle_registro_submit(State(state), Form(posted("12a3", "ana@example.com")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let html = body_text(response).await;
        assert!(html.contains(MSG_CEDULA_FORMAT));
        // Sanitized value is what comes back
        assert!(html.contains("value=\"123\""));
        assert!(html.contains("value=\"ana@example.com\""));
        assert!(!html.contains("Abcdef1!"));
        assert_eq!(documents.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_post_renders_confirmation() {
        let (state, identity, documents) = memory_state();
        let response = handle_registro_submit(
            State(state),
            Form(posted("52123456", "ana@example.com")),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("¡Registro exitoso!"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(identity.contains("ana@example.com"));
        assert_eq!(documents.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_conflict_rerender_keeps_values_but_not_passwords() {
        let (state, identity, documents) = memory_state();
        identity.create_identity("ana@example.com", "Otra123!").await.unwrap();

        let response = handle_registro_submit(
            State(state),
            Form(posted("52123456", "ana@example.com")),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let html = body_text(response).await;
        assert!(html.contains(MSG_EMAIL_TAKEN));
        assert!(html.contains("value=\"52123456\""));
        assert!(html.contains("value=\"ana@example.com\""));
        assert!(html.contains("id=\"password\" name=\"password\" type=\"password\" autocomplete=\"new-password\" value=\"\""));
        assert!(!html.contains("Abcdef1!"));
        assert_eq!(documents.create_calls(), 0);
    }

    #[test]
    fn test_page_values_blank_credentials() {
        let form = posted("52123456", "ana@example.com");
        let values = page_values(&form);
        assert_eq!(values["cedula"], "52123456");
        assert_eq!(values["fechaNacimiento"], "1995-06-15");
        assert_eq!(values["password"], "");
        assert_eq!(values["confirmPassword"], "");
    }

    #[test]
    fn test_outcome_status() {
        assert_eq!(outcome_status(&SubmitOutcome::Invalid), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            outcome_status(&SubmitOutcome::Completed(Err(RegistrationError::IdentityConflict(
                "dup@x.com".to_string()
            )))),
            StatusCode::CONFLICT
        );
    }
}
