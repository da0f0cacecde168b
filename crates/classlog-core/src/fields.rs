//! Input masks and validators for student and user fields.
//!
//! The masks are the same transformations a form applies while the user types:
//! they never fail, they only strip and reformat. The validators are pure
//! predicates; the `validate_*` wrappers adapt them to `#[validate(custom)]`.

use validator::ValidationError;

pub const CPF_DIGITS: usize = 11;
pub const PHONE_MAX_DIGITS: usize = 11;

/// Keeps only ASCII digits, truncated to `max` characters.
pub fn digits_only(value: &str, max: usize) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

/// Formats a CPF as `123.456.789-01`.
///
/// Separators are inserted once at least ten digits are present; shorter
/// input is returned as bare digits.
pub fn mask_cpf(value: &str) -> String {
    let digits = digits_only(value, CPF_DIGITS);
    if digits.len() < 10 {
        return digits;
    }

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..]
    )
}

/// Formats a Brazilian phone number as `(11) 98765-4321` (mobile, 11 digits)
/// or `(11) 2345-6789` (landline, 10 digits). Other lengths are returned as
/// bare digits.
pub fn mask_phone(value: &str) -> String {
    let digits = digits_only(value, PHONE_MAX_DIGITS);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..]),
        _ => digits,
    }
}

/// A CPF is valid when it carries exactly eleven digits, masked or not.
pub fn is_valid_cpf(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let only_mask_chars = value
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == ' ');

    only_mask_chars && digits.len() == CPF_DIGITS
}

/// A phone is valid when it carries ten or eleven digits, masked or not.
pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let only_mask_chars = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '(' | ')' | '-' | ' ' | '+'));

    only_mask_chars && (digits == 10 || digits == 11)
}

/// At least two whitespace-separated words made only of letters.
pub fn is_valid_full_name(value: &str) -> bool {
    let mut tokens = 0;
    for token in value.split_whitespace() {
        if !token.chars().all(char::is_alphabetic) {
            return false;
        }
        tokens += 1;
    }
    tokens >= 2
}

/// `local@domain.tld` shape: non-blank text on both sides of a single `@`,
/// with a dot inside the domain that has text on both sides.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(value) {
        Ok(())
    } else {
        Err(invalid("cpf", "CPF must have 11 digits"))
    }
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if is_valid_phone(value) {
        Ok(())
    } else {
        Err(invalid("phone", "Phone must have 10 or 11 digits"))
    }
}

pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    if is_valid_full_name(value) {
        Ok(())
    } else {
        Err(invalid("name", "Name must have at least two words"))
    }
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(invalid(
            "email",
            "Email must be in the format example@email.com",
        ))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("blank", "must not be blank"))
    } else {
        Ok(())
    }
}
