//! Input validation for user and admin fields

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be at most {1} characters long")]
    TooLong(&'static str, usize),
    #[error("Name must contain only letters and spaces")]
    BadName,
    #[error("Cellphone must contain only digits")]
    BadCellphone,
    #[error("Invalid email format")]
    BadEmail,
}

const MAX_NAME_LEN: usize = 255;
const MAX_CELLPHONE_LEN: usize = 20;

/// Names are letters (any script) separated by spaces, apostrophes or hyphens.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required("Name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong("Name", MAX_NAME_LEN));
    }

    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX
        .get_or_init(|| Regex::new(r"^\p{L}+([ '\-]\p{L}+)*$").expect("Failed to compile name regex"));

    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if !regex.is_match(&name) {
        return Err(ValidationError::BadName);
    }

    Ok(name)
}

pub fn validate_cellphone(cellphone: &str) -> Result<String, ValidationError> {
    let cellphone = cellphone.trim();

    if cellphone.is_empty() {
        return Err(ValidationError::Required("Cellphone"));
    }

    if cellphone.len() > MAX_CELLPHONE_LEN {
        return Err(ValidationError::TooLong("Cellphone", MAX_CELLPHONE_LEN));
    }

    if !cellphone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::BadCellphone);
    }

    Ok(cellphone.to_string())
}

pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();

    if email.len() > 254 {
        return Err(ValidationError::TooLong("Email", 254));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(ValidationError::BadEmail);
    }

    Ok(email.to_string())
}

/// Blank optional fields count as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
