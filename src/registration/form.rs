//! Registration form fields and the mutable form state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted value for `sexo` when the male option is selected
pub const SEXO_MASCULINO: &str = "Masculino";

/// Accepted value for `sexo` when the female option is selected
pub const SEXO_FEMENINO: &str = "Femenino";

/// Registration form fields.
///
/// Variants are declared in rule-evaluation order, so the derived `Ord` is the
/// order errors are surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Nombres,
    Apellidos,
    Cedula,
    FechaNacimiento,
    Sexo,
    Telefono,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Every field, in rule-evaluation order
    pub const ALL: [Field; 9] = [
        Field::Nombres,
        Field::Apellidos,
        Field::Cedula,
        Field::FechaNacimiento,
        Field::Sexo,
        Field::Telefono,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
    ];

    /// Wire name of the field, as used by the HTML form and the JSON API
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Nombres => "nombres",
            Field::Apellidos => "apellidos",
            Field::Cedula => "cedula",
            Field::FechaNacimiento => "fechaNacimiento",
            Field::Sexo => "sexo",
            Field::Telefono => "telefono",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }

    /// Whether the field carries a credential, which pages never echo back
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values of the registration form, one string per input.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormState {
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

impl FormState {
    /// Current value of a field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Cedula => &self.cedula,
            Field::Nombres => &self.nombres,
            Field::Apellidos => &self.apellidos,
            Field::FechaNacimiento => &self.fecha_nacimiento,
            Field::Sexo => &self.sexo,
            Field::Telefono => &self.telefono,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Cedula => &mut self.cedula,
            Field::Nombres => &mut self.nombres,
            Field::Apellidos => &mut self.apellidos,
            Field::FechaNacimiento => &mut self.fecha_nacimiento,
            Field::Sexo => &mut self.sexo,
            Field::Telefono => &mut self.telefono,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        };
        *slot = value;
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
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

pub(crate) fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[redacted]" }
}
