//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use rust_decimal::Decimal;
use validator::ValidateEmail;

use crate::{EngineError, ResultEngine};

const MIN_PASSWORD_LEN: usize = 8;

/// Trim and lower-case an e-mail address, rejecting malformed ones.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.validate_email() {
        return Err(EngineError::InvalidInput(format!(
            "invalid email address: {}",
            value.trim()
        )));
    }
    Ok(email)
}

/// Password strength: at least 8 characters with an upper-case letter, a
/// lower-case letter and a digit.
pub(crate) fn validate_password(value: &str) -> ResultEngine<()> {
    let rule = |message: &str| Err(EngineError::InvalidInput(message.to_string()));

    if value.chars().count() < MIN_PASSWORD_LEN {
        return rule("password must be at least 8 characters long");
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return rule("password must contain at least one uppercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return rule("password must contain at least one lowercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return rule("password must contain at least one digit");
    }
    Ok(())
}

/// Strip spaces, dashes and parentheses, then require `+?[0-9]{10,15}`.
pub(crate) fn normalize_phone(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if !(10..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidInput(
            "invalid phone number format".to_string(),
        ));
    }
    Ok(Some(cleaned))
}

pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Catalog rates must be strictly positive.
pub(crate) fn validate_base_rate(rate: Decimal) -> ResultEngine<()> {
    if rate <= Decimal::ZERO {
        return Err(EngineError::InvalidRate(
            "base rate must be > 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Customer@Test.com ").unwrap(),
            "customer@test.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Customer123").is_ok());
        assert_eq!(
            validate_password("Ab1"),
            Err(EngineError::InvalidInput(
                "password must be at least 8 characters long".to_string()
            ))
        );
        assert!(validate_password("customer123").is_err());
        assert!(validate_password("CUSTOMER123").is_err());
        assert!(validate_password("Customerxyz").is_err());
    }

    #[test]
    fn phone_is_cleaned() {
        assert_eq!(
            normalize_phone(Some("+254 700-000 (000)")).unwrap(),
            Some("+254700000000".to_string())
        );
        assert_eq!(normalize_phone(None).unwrap(), None);
        assert_eq!(normalize_phone(Some("  ")).unwrap(), None);
        assert!(normalize_phone(Some("12345")).is_err());
        assert!(normalize_phone(Some("+2547000000ab")).is_err());
    }

    #[test]
    fn base_rate_must_be_positive() {
        assert!(validate_base_rate(Decimal::new(1250, 2)).is_ok());
        assert!(validate_base_rate(Decimal::ZERO).is_err());
        assert!(validate_base_rate(Decimal::new(-1, 0)).is_err());
    }
}
