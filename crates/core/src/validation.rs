//! Field validation helpers shared by the workflow engine.
//!
//! Each helper trims its input, enforces the length limits from
//! [`crate::constants`] and returns the normalised value. Error
//! messages name the offending field so the HTTP layer can forward
//! them to clients verbatim.

use hcms_types::{NonEmptyText, TextError};

use crate::constants::{MAX_AGE, MAX_COMPLAINT_LEN, MAX_USERNAME_LEN};
use crate::error::{HcmsError, HcmsResult};

/// Validates a required free-text field and returns it trimmed.
pub fn required_text(field: &'static str, value: &str, max: usize) -> HcmsResult<String> {
    match NonEmptyText::bounded(value, max) {
        Ok(text) => Ok(text.into_inner()),
        Err(TextError::Empty) => Err(HcmsError::Validation(format!("{field} is required"))),
        Err(TextError::TooLong { .. }) => Err(HcmsError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
    }
}

/// Validates an optional free-text field. Blank input collapses to
/// `None`; present input is trimmed and length-checked.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> HcmsResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(HcmsError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates the chief complaint captured at registration.
pub fn complaint(value: &str) -> HcmsResult<String> {
    required_text("Complaint", value, MAX_COMPLAINT_LEN)
}

/// Validates a phone number. Digits, spaces and the characters
/// `+ - ( )` are allowed.
pub fn phone(value: &str) -> HcmsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HcmsError::Validation(
            "Phone number is required".to_string(),
        ));
    }
    let valid = trimmed
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'(' | b')' | b' '));
    if !valid {
        return Err(HcmsError::Validation(
            "Phone number contains invalid characters".to_string(),
        ));
    }
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(HcmsError::Validation(
            "Phone number must contain at least one digit".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validates an optional email address. The check is intentionally
/// shallow: one `@` with a dotted domain part.
pub fn email(value: Option<&str>) -> HcmsResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(HcmsError::Validation(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates a patient's age in years.
pub fn age(value: u32) -> HcmsResult<()> {
    if value > MAX_AGE {
        return Err(HcmsError::Validation(format!(
            "Age must be at most {MAX_AGE}"
        )));
    }
    Ok(())
}

/// Validates a monetary amount: finite and not negative.
pub fn amount(field: &'static str, value: f64) -> HcmsResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HcmsError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Validates a dispense or prescription quantity.
pub fn quantity(field: &'static str, value: u32) -> HcmsResult<()> {
    if value == 0 {
        return Err(HcmsError::Validation(format!(
            "{field} must be at least 1"
        )));
    }
    Ok(())
}

/// Validates a username and returns it trimmed and lowercased.
pub fn username(value: &str) -> HcmsResult<String> {
    let normalised = required_text("Username", value, MAX_USERNAME_LEN)?.to_lowercase();
    let valid = normalised
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-'));
    if !valid {
        return Err(HcmsError::Validation(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(normalised)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_returns_the_value() {
        let value = required_text("Complaint", "  fever  ", 100).expect("Should be valid");
        assert_eq!(value, "fever");
    }

    #[test]
    fn required_text_rejects_blank_input() {
        let err = required_text("Complaint", "   ", 100).unwrap_err();
        assert_eq!(err.to_string(), "Complaint is required");
    }

    #[test]
    fn required_text_rejects_overlong_input() {
        let err = required_text("Complaint", &"x".repeat(101), 100).unwrap_err();
        assert_eq!(err.to_string(), "Complaint must be at most 100 characters");
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        let value = optional_text("Notes", Some("   "), 100).expect("Should be valid");
        assert!(value.is_none());
    }

    #[test]
    fn optional_text_rejects_overlong_input() {
        let result = optional_text("Notes", Some(&"x".repeat(101)), 100);
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[test]
    fn phone_accepts_common_formats() {
        for candidate in ["+1 (555) 123-4567", "0712345678", "020 7946 0958"] {
            phone(candidate).expect("Phone should be accepted");
        }
    }

    #[test]
    fn phone_rejects_letters() {
        let result = phone("call me");
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[test]
    fn email_requires_a_dotted_domain() {
        email(Some("nurse@clinic.example")).expect("Email should be accepted");
        let result = email(Some("nurse@clinic"));
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[test]
    fn email_treats_blank_as_absent() {
        let value = email(Some("  ")).expect("Blank email should be ignored");
        assert!(value.is_none());
    }

    #[test]
    fn age_rejects_values_over_the_limit() {
        age(150).expect("Boundary age should be accepted");
        assert!(matches!(age(151), Err(HcmsError::Validation(_))));
    }

    #[test]
    fn amount_rejects_negative_and_non_finite_values() {
        amount("Amount", 0.0).expect("Zero should be accepted");
        assert!(matches!(
            amount("Amount", -0.01),
            Err(HcmsError::Validation(_))
        ));
        assert!(matches!(
            amount("Amount", f64::NAN),
            Err(HcmsError::Validation(_))
        ));
    }

    #[test]
    fn username_is_lowercased_and_charset_checked() {
        let value = username("  Reception.Desk ").expect("Username should be accepted");
        assert_eq!(value, "reception.desk");
        assert!(matches!(
            username("no spaces allowed"),
            Err(HcmsError::Validation(_))
        ));
    }
}
