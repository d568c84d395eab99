//! Registration flow tests
//!
//! Drive the form controller against in-memory backends the way a page would:
//! field edits, a submission, then the notification and navigation it produced.

use registro::errors::RegistrationError;
use registro::registration::{
    Field, FormState, RecordingSurface, RegistrationForm, RegistrationService, Severity,
    SubmissionPhase, SubmitOutcome, SurfaceEvent, sanitize, validate,
};
use registro::storage::{
    DocumentStore, IdentityHandle, IdentityProvider, MemoryDocumentStore, MemoryIdentityProvider,
};
use std::sync::Arc;

fn fill(form: &mut RegistrationForm, email: &str) {
    form.edit(Field::Nombres, "  Valentina ");
    form.edit(Field::Apellidos, "Ñáñez Ríos");
    form.edit(Field::Cedula, "1.098.765.432");
    form.edit(Field::FechaNacimiento, "2001-09-09");
    form.edit(Field::Sexo, "Femenino");
    form.edit(Field::Telefono, "+57 (318) 555-0199");
    form.edit(Field::Email, email);
    form.edit(Field::Password, "Abcdef1!");
    form.edit(Field::ConfirmPassword, "Abcdef1!");
}

#[test]
fn test_sanitized_values_as_typed() {
    let mut form = RegistrationForm::new();
    fill(&mut form, "valentina@example.com");

    assert_eq!(form.state().cedula, "1098765432");
    // "+57 (318) 555-0199" keeps its first ten digits
    assert_eq!(form.state().telefono, "5731855501");
    assert_eq!(form.state().apellidos, "Ñáñez Ríos");
    assert_eq!(sanitize(Field::Telefono, &form.state().telefono), form.state().telefono);
}

#[test]
fn test_validation_trims_record() {
    let mut form = RegistrationForm::new();
    fill(&mut form, "  valentina@example.com ");
    let record = validate(form.state()).unwrap();
    assert_eq!(record.nombres, "Valentina");
    assert_eq!(record.email, "valentina@example.com");
    // The form keeps what was typed
    assert_eq!(form.state().nombres, "  Valentina ");
}

#[tokio::test]
async fn test_full_registration() {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = RegistrationService::new(identity.clone(), documents.clone());
    let surface = RecordingSurface::new();

    let mut form = RegistrationForm::new();
    let outcome = form.submit(&service, &surface, &surface).await;
    assert!(matches!(outcome, SubmitOutcome::Invalid));
    assert_eq!(form.errors().len(), 8);
    assert_eq!(surface.notifications().len(), 1);

    fill(&mut form, "valentina@example.com");
    assert!(form.errors().is_empty());

    let outcome = form.submit(&service, &surface, &surface).await;
    let uid = match outcome {
        SubmitOutcome::Completed(Ok(registered)) => registered.uid,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(form.phase(), SubmissionPhase::Registered);

    let events = surface.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], SurfaceEvent::Notified(first) if first.severity == Severity::Error));
    assert!(matches!(&events[1], SurfaceEvent::Notified(second) if second.severity == Severity::Success));
    assert_eq!(events[2], SurfaceEvent::Navigated("/".to_string()));

    let profile = documents
        .get_document("usuarios", &IdentityHandle::new(uid))
        .await
        .unwrap()
        .expect("profile document");
    assert_eq!(profile["nombres"], "Valentina");
    assert_eq!(profile["telefono"], "5731855501");
    assert_eq!(profile["estado"], "pendiente");
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_email_between_forms() {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = RegistrationService::new(identity.clone(), documents.clone());

    let first_surface = RecordingSurface::new();
    let mut first = RegistrationForm::new();
    fill(&mut first, "same@example.com");
    first.submit(&service, &first_surface, &first_surface).await;

    let second_surface = RecordingSurface::new();
    let mut second = RegistrationForm::new();
    fill(&mut second, "SAME@example.com");
    let outcome = second.submit(&service, &second_surface, &second_surface).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Completed(Err(RegistrationError::IdentityConflict(_)))
    ));
    assert_eq!(
        second_surface.last_notification().unwrap().message,
        "Este correo ya está registrado."
    );
    assert!(second_surface.navigations().is_empty());
    assert_eq!(documents.create_calls(), 1);
    assert_eq!(identity.len(), 1);
}

#[tokio::test]
async fn test_identity_conflict_reported_by_provider() {
    let identity = Arc::new(MemoryIdentityProvider::new());
    identity.create_identity("dup@x.com", "Abcdef1!").await.unwrap();
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = RegistrationService::new(identity, documents.clone());

    let surface = RecordingSurface::new();
    let mut form = RegistrationForm::from_state(&FormState {
        nombres: "Pedro".to_string(),
        apellidos: "Soto".to_string(),
        cedula: "123456".to_string(),
        fecha_nacimiento: "1980-01-01".to_string(),
        sexo: "Masculino".to_string(),
        telefono: "3000000000".to_string(),
        email: "dup@x.com".to_string(),
        password: "Abcdef1!".to_string(),
        confirm_password: "Abcdef1!".to_string(),
    });
    form.submit(&service, &surface, &surface).await;

    assert_eq!(documents.create_calls(), 0);
    assert_eq!(surface.notifications().len(), 1);
    assert_eq!(form.phase(), SubmissionPhase::Editing);
}

#[tokio::test]
async fn test_concurrent_forms_share_one_service() {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = Arc::new(RegistrationService::new(identity.clone(), documents.clone()));

    let submissions = (0..5).map(|i| {
        let service = service.clone();
        async move {
            let surface = RecordingSurface::new();
            let mut form = RegistrationForm::new();
            fill(&mut form, &format!("usuario{}@example.com", i % 3));
            form.submit(&service, &surface, &surface).await
        }
    });
    let outcomes = futures::future::join_all(submissions).await;

    let registered = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SubmitOutcome::Completed(Ok(_))))
        .count();
    let conflicts = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                SubmitOutcome::Completed(Err(RegistrationError::IdentityConflict(_)))
            )
        })
        .count();
    assert_eq!(registered, 3);
    assert_eq!(conflicts, 2);
    assert_eq!(identity.len(), 3);
    assert_eq!(documents.create_calls(), 3);
}
