//! Live input filtering applied to every field edit.

use super::form::Field;

/// Maximum number of digits kept for `cedula`
pub const CEDULA_MAX_LEN: usize = 15;

/// Maximum number of digits kept for `telefono`
pub const TELEFONO_MAX_LEN: usize = 10;

/// Letters accepted in person names besides ASCII `A-Z` and `a-z`
const ACCENTED_LETTERS: [char; 12] = [
    'Á', 'É', 'Í', 'Ó', 'Ú', 'Ñ', 'á', 'é', 'í', 'ó', 'ú', 'ñ',
];

/// Rewrite a raw field value into the value the form accepts.
///
/// Names keep letters and whitespace only, `cedula` and `telefono` keep ASCII
/// digits up to their maximum length, every other field passes through.
pub fn sanitize(field: Field, raw: &str) -> String {
    match field {
        Field::Nombres | Field::Apellidos => raw.chars().filter(|c| is_name_char(*c)).collect(),
        Field::Cedula => digits(raw, CEDULA_MAX_LEN),
        Field::Telefono => digits(raw, TELEFONO_MAX_LEN),
        _ => raw.to_string(),
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || ACCENTED_LETTERS.contains(&c) || c.is_whitespace()
}

fn digits(raw: &str, max_len: usize) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}
