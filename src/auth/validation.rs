use std::sync::OnceLock;

use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }

    if email.len() > 254 {
        return Err("email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
            .expect("email regex is valid")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }

    Ok(())
}

/// Returns the trimmed name, or an error naming the empty field.
pub fn required_text(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Rejects text longer than `max` characters, the way VARCHAR(max) counts them.
pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters long"));
    }
    Ok(())
}

/// Trims, rejects blank text and enforces the column length.
pub fn bounded_text(field: &str, value: &str, max: usize) -> Result<String, String> {
    let trimmed = required_text(field, value)?;
    max_length(field, &trimmed, max)?;
    Ok(trimmed)
}

/// Length check for a run of optional fields as `(field, value, max)`.
pub fn optional_lengths(fields: &[(&str, Option<&str>, usize)]) -> Result<(), String> {
    for &(field, value, max) in fields {
        if let Some(value) = value {
            max_length(field, value, max)?;
        }
    }
    Ok(())
}
