//! Full-form validation run on every submission attempt.

use regex::Regex;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use super::form::{Field, FormState, redacted};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zÁÉÍÓÚÑáéíóúñ\s]+$").expect("valid name pattern"));
static CEDULA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6,15}$").expect("valid cedula pattern"));
static TELEFONO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid telefono pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Symbols a password must draw at least one character from
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Minimum password length
pub const PASSWORD_MIN_LEN: usize = 8;

pub const MSG_NOMBRES_REQUIRED: &str = "Por favor ingresa tus nombres.";
pub const MSG_NOMBRES_FORMAT: &str = "El nombre solo debe contener letras y espacios.";
pub const MSG_APELLIDOS_REQUIRED: &str = "Por favor ingresa tus apellidos.";
pub const MSG_APELLIDOS_FORMAT: &str = "El apellido solo debe contener letras y espacios.";
pub const MSG_CEDULA_REQUIRED: &str = "Por favor ingresa la cédula.";
pub const MSG_CEDULA_FORMAT: &str = "La cédula debe contener solo números (6 a 15 dígitos).";
pub const MSG_FECHA_REQUIRED: &str = "Por favor ingresa la fecha de nacimiento.";
pub const MSG_SEXO_REQUIRED: &str = "Selecciona el sexo.";
pub const MSG_TELEFONO_REQUIRED: &str = "Por favor ingresa el teléfono.";
pub const MSG_TELEFONO_FORMAT: &str = "El teléfono debe tener 10 dígitos.";
pub const MSG_EMAIL_REQUIRED: &str = "Por favor ingresa el correo.";
pub const MSG_EMAIL_FORMAT: &str = "Escribe un correo válido.";
pub const MSG_PASSWORD_REQUIRED: &str = "Por favor ingresa la contraseña.";
pub const MSG_PASSWORD_FORMAT: &str =
    "La contraseña debe tener mínimo 8 caracteres, una mayúscula, un número y un símbolo.";
pub const MSG_PASSWORD_MISMATCH: &str = "Las contraseñas no coinciden.";

/// Per-field validation messages, iterated in rule-evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<Field, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the message for a field, keeping the first one recorded
    pub fn record(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed validation
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Forget the message for a field
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The error surfaced as the prominent notification
    pub fn first(&self) -> Option<(Field, &str)> {
        self.0
            .iter()
            .next()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

/// One entry of a serialized [`ErrorMap`]
#[derive(Serialize)]
struct FieldError<'a> {
    field: Field,
    message: &'a str,
}

impl Serialize for ErrorMap {
    /// Serialized as an ordered list so the order survives JSON object re-keying.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (field, message) in self.iter() {
            seq.serialize_element(&FieldError { field, message })?;
        }
        seq.end()
    }
}

/// Trimmed snapshot of a valid form, ready for the external calls.
#[derive(Clone, PartialEq, Eq)]
pub struct CleanRecord {
    pub cedula: String,
    pub nombres: String,
    pub apellidos: String,
    pub fecha_nacimiento: String,
    pub sexo: String,
    pub telefono: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl CleanRecord {
    /// Trim every text field; the date and both credentials are kept verbatim.
    fn from_state(state: &FormState) -> Self {
        Self {
            cedula: state.cedula.trim().to_string(),
            nombres: state.nombres.trim().to_string(),
            apellidos: state.apellidos.trim().to_string(),
            fecha_nacimiento: state.fecha_nacimiento.clone(),
            sexo: state.sexo.clone(),
            telefono: state.telefono.trim().to_string(),
            email: state.email.trim().to_string(),
            password: state.password.clone(),
            confirm_password: state.confirm_password.clone(),
        }
    }
}

impl fmt::Debug for CleanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanRecord")
            .field("cedula", &self.cedula)
            .field("nombres", &self.nombres)
            .field("apellidos", &self.apellidos)
            .field("fecha_nacimiento", &self.fecha_nacimiento)
            .field("sexo", &self.sexo)
            .field("telefono", &self.telefono)
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("confirm_password", &redacted(&self.confirm_password))
            .finish()
    }
}

/// Validate the whole form.
///
/// Every field is checked; for each field only the first failing rule is
/// reported.
pub fn validate(state: &FormState) -> Result<CleanRecord, ErrorMap> {
    let data = CleanRecord::from_state(state);
    let mut errors = ErrorMap::new();

    if data.nombres.is_empty() {
        errors.record(Field::Nombres, MSG_NOMBRES_REQUIRED);
    } else if !NAME_RE.is_match(&data.nombres) {
        errors.record(Field::Nombres, MSG_NOMBRES_FORMAT);
    }

    if data.apellidos.is_empty() {
        errors.record(Field::Apellidos, MSG_APELLIDOS_REQUIRED);
    } else if !NAME_RE.is_match(&data.apellidos) {
        errors.record(Field::Apellidos, MSG_APELLIDOS_FORMAT);
    }

    if data.cedula.is_empty() {
        errors.record(Field::Cedula, MSG_CEDULA_REQUIRED);
    } else if !CEDULA_RE.is_match(&data.cedula) {
        errors.record(Field::Cedula, MSG_CEDULA_FORMAT);
    }

    if data.fecha_nacimiento.is_empty() {
        errors.record(Field::FechaNacimiento, MSG_FECHA_REQUIRED);
    }

    if data.sexo.is_empty() {
        errors.record(Field::Sexo, MSG_SEXO_REQUIRED);
    }

    if data.telefono.is_empty() {
        errors.record(Field::Telefono, MSG_TELEFONO_REQUIRED);
    } else if !TELEFONO_RE.is_match(&data.telefono) {
        errors.record(Field::Telefono, MSG_TELEFONO_FORMAT);
    }

    if data.email.is_empty() {
        errors.record(Field::Email, MSG_EMAIL_REQUIRED);
    } else if !EMAIL_RE.is_match(&data.email) {
        errors.record(Field::Email, MSG_EMAIL_FORMAT);
    }

    if data.password.is_empty() {
        errors.record(Field::Password, MSG_PASSWORD_REQUIRED);
    } else if !is_strong_password(&data.password) {
        errors.record(Field::Password, MSG_PASSWORD_FORMAT);
    }

    if data.password != data.confirm_password {
        errors.record(Field::ConfirmPassword, MSG_PASSWORD_MISMATCH);
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(errors)
    }
}

/// At least eight characters drawn from ASCII letters, digits and
/// [`PASSWORD_SYMBOLS`], with one uppercase letter, one digit and one symbol.
pub fn is_strong_password(password: &str) -> bool {
    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    password.chars().count() >= PASSWORD_MIN_LEN
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_symbol(c))
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn valid_state() -> FormState {
        FormState {
            cedula: "1023456789".to_string(),
            nombres: "María José".to_string(),
            apellidos: "Núñez Peña".to_string(),
            fecha_nacimiento: "1994-03-12".to_string(),
            sexo: "Femenino".to_string(),
            telefono: "3001234567".to_string(),
            email: "maria@example.com".to_string(),
            password: "Abcdef1!".to_string(),
            confirm_password: "Abcdef1!".to_string(),
        }
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = validate(&FormState::default()).unwrap_err();
        let fields: BTreeSet<Field> = errors.fields().collect();
        let expected: BTreeSet<Field> = [
            Field::Nombres,
            Field::Apellidos,
            Field::Cedula,
            Field::FechaNacimiento,
            Field::Sexo,
            Field::Telefono,
            Field::Email,
            Field::Password,
        ]
        .into_iter()
        .collect();
        assert_eq!(fields, expected);
        assert_eq!(errors.get(Field::Cedula), Some(MSG_CEDULA_REQUIRED));
        assert_eq!(errors.get(Field::ConfirmPassword), None);
    }

    #[test]
    fn test_first_error_follows_rule_order() {
        let errors = validate(&FormState::default()).unwrap_err();
        assert_eq!(errors.first(), Some((Field::Nombres, MSG_NOMBRES_REQUIRED)));

        let mut state = valid_state();
        state.email = "x".to_string();
        state.cedula = "12".to_string();
        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.first(), Some((Field::Cedula, MSG_CEDULA_FORMAT)));
        let order: Vec<Field> = errors.fields().collect();
        assert_eq!(order, vec![Field::Cedula, Field::Email]);
    }

    #[test]
    fn test_weak_password_matching_confirmation() {
        let mut state = valid_state();
        state.password = "abc".to_string();
        state.confirm_password = "abc".to_string();

        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Password), Some(MSG_PASSWORD_FORMAT));
        assert_eq!(errors.get(Field::ConfirmPassword), None);
    }

    #[test]
    fn test_valid_form_produces_trimmed_record() {
        let mut state = valid_state();
        state.nombres = "  María José ".to_string();
        state.apellidos = "\tNúñez Peña".to_string();
        state.cedula = " 1023456789 ".to_string();
        state.telefono = "3001234567 ".to_string();
        state.email = " maria@example.com ".to_string();

        let record = validate(&state).unwrap();
        assert_eq!(record.nombres, "María José");
        assert_eq!(record.apellidos, "Núñez Peña");
        assert_eq!(record.cedula, "1023456789");
        assert_eq!(record.telefono, "3001234567");
        assert_eq!(record.email, "maria@example.com");
        assert_eq!(record.fecha_nacimiento, "1994-03-12");
        assert_eq!(record.password, "Abcdef1!");
    }

    #[test]
    fn test_invalid_email() {
        let mut state = valid_state();
        state.email = "not-an-email".to_string();

        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Email), Some(MSG_EMAIL_FORMAT));
    }

    #[test]
    fn test_password_whitespace_is_significant() {
        let mut state = valid_state();
        state.password = " Abcdef1!".to_string();
        state.confirm_password = "Abcdef1!".to_string();

        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.get(Field::Password), Some(MSG_PASSWORD_FORMAT));
        assert_eq!(errors.get(Field::ConfirmPassword), Some(MSG_PASSWORD_MISMATCH));
    }

    #[test]
    fn test_whitespace_only_names_are_missing() {
        let mut state = valid_state();
        state.nombres = "   ".to_string();
        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.get(Field::Nombres), Some(MSG_NOMBRES_REQUIRED));
    }

    #[test]
    fn test_format_rules() {
        let mut state = valid_state();
        state.nombres = "Ana3".to_string();
        state.cedula = "12345".to_string();
        state.telefono = "300123456".to_string();
        let errors = validate(&state).unwrap_err();
        assert_eq!(errors.get(Field::Nombres), Some(MSG_NOMBRES_FORMAT));
        assert_eq!(errors.get(Field::Cedula), Some(MSG_CEDULA_FORMAT));
        assert_eq!(errors.get(Field::Telefono), Some(MSG_TELEFONO_FORMAT));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Abcdef1!"));
        assert!(is_strong_password("ZZZZZZ9&"));
        assert!(!is_strong_password("Abcde1!"));
        assert!(!is_strong_password("abcdef1!"));
        assert!(!is_strong_password("Abcdefg!"));
        assert!(!is_strong_password("Abcdefg1"));
        assert!(!is_strong_password("Abcdef1!#"));
        assert!(!is_strong_password("Ábcdef1!"));
    }

    #[test]
    fn test_error_map_serializes_in_order() {
        let errors = validate(&FormState::default()).unwrap_err();
        let value = serde_json::to_value(&errors).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["field"], "nombres");
        assert_eq!(first["message"], MSG_NOMBRES_REQUIRED);
        assert_eq!(value.as_array().unwrap()[3]["field"], "fechaNacimiento");
    }
}
