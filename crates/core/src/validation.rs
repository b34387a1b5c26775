//! Input validation utilities.
//!
//! These checks run before a create request leaves the client so the operator gets
//! immediate feedback. The backend still enforces uniqueness on its own.

use crate::constants::{MAX_IDENTIFICATION_LEN, MAX_NAME_LEN};
use crate::{CardError, CardResult};
use cartao_types::NonEmptyText;

/// Validates a person or vaccine name.
///
/// Rejects blank input and names longer than the backend column.
pub fn validate_name(field: &str, value: &str) -> CardResult<NonEmptyText> {
    let text = NonEmptyText::new(value)
        .map_err(|_| CardError::InvalidInput(format!("{field} cannot be empty")))?;

    if text.as_str().chars().count() > MAX_NAME_LEN {
        return Err(CardError::InvalidInput(format!(
            "{field} exceeds maximum length of {MAX_NAME_LEN} characters"
        )));
    }

    if text.as_str().chars().any(char::is_control) {
        return Err(CardError::InvalidInput(format!(
            "{field} must not contain control characters"
        )));
    }

    Ok(text)
}

/// Validates an identification number (CPF, RG, etc.).
///
/// The value is trimmed; only ASCII alphanumerics and `.`, `-`, `/` are accepted,
/// which covers the punctuation of the usual Brazilian document formats.
pub fn validate_identification_number(value: &str) -> CardResult<NonEmptyText> {
    let text = NonEmptyText::new(value).map_err(|_| {
        CardError::InvalidInput("numero_identificacao cannot be empty".into())
    })?;

    if text.as_str().len() > MAX_IDENTIFICATION_LEN {
        return Err(CardError::InvalidInput(format!(
            "numero_identificacao exceeds maximum length of {MAX_IDENTIFICATION_LEN} characters"
        )));
    }

    let ok = text
        .as_str()
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'/'));

    if !ok {
        return Err(CardError::InvalidInput(
            "numero_identificacao contains invalid characters (only alphanumeric, '.', '-', '/' allowed)"
                .into(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_formatted_cpf() {
        let id = validate_identification_number(" 123.456.789-00 ").expect("valid cpf");
        assert_eq!(id.as_str(), "123.456.789-00");
    }

    #[test]
    fn rejects_identification_with_spaces() {
        let err = validate_identification_number("123 456").expect_err("space inside");
        assert!(matches!(err, CardError::InvalidInput(_)));
    }

    #[test]
    fn rejects_long_names() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name("nome", &long).is_err());
        assert!(validate_name("nome", &"a".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn accepts_accented_names() {
        let name = validate_name("nome", "João Conceição").expect("accented name");
        assert_eq!(name.as_str(), "João Conceição");
    }

    #[test]
    fn rejects_blank_name() {
        match validate_name("nome", "   ") {
            Err(CardError::InvalidInput(msg)) => assert!(msg.contains("nome")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
