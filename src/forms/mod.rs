//! Request payloads accepted by the API together with their validation and
//! sanitisation into domain types.

use thiserror::Error;
use validator::ValidationErrors;

pub mod analytics;
pub mod auth;
pub mod billing;
pub mod categories;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;

/// Maximum length allowed for names and titles.
pub const NAME_MAX_LEN: u64 = 128;

/// Maximum length allowed for free-form descriptions and notes.
pub const TEXT_MAX_LEN: u64 = 4096;

/// Largest monetary amount accepted in any payload, in the smallest currency unit.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Result type returned by the form helpers.
pub type FormResult<T> = Result<T, FormError>;

/// Errors that can occur while processing a submitted payload.
#[derive(Debug, Error)]
pub enum FormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// A required text field is empty after sanitisation.
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
    /// A field holds a value that cannot be used.
    #[error("invalid {field} `{value}`")]
    InvalidValue { field: &'static str, value: String },
    /// The uploaded CSV is missing required columns.
    #[error("upload is missing the required `{0}` header")]
    MissingHeader(&'static str),
    /// A CSV row could not be converted.
    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
    /// The uploaded CSV did not contain any usable rows.
    #[error("upload contains no rows")]
    EmptyUpload,
    /// CSV parsing failures.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    /// Reading the uploaded file failed.
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Collapse runs of whitespace and drop control characters.
pub fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

pub fn sanitize_sku(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
}

/// Sanitise each line, trim blank lines at both ends and collapse repeated
/// blank lines in between.
pub fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty && previous_empty {
            continue;
        }
        previous_empty = is_empty;
        result.push(line);
    }

    result.join("\n")
}

/// ISO 4217 codes are three ASCII letters; stored uppercase.
pub fn sanitize_currency(input: &str) -> FormResult<String> {
    let trimmed = input.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(FormError::InvalidValue {
            field: "currency",
            value: trimmed.to_string(),
        });
    }

    Ok(trimmed.to_ascii_uppercase())
}

/// Sanitised inline text, or an error naming `field` when nothing is left.
pub fn required_inline(input: &str, field: &'static str) -> FormResult<String> {
    let sanitized = sanitize_inline_text(input);
    if sanitized.is_empty() {
        return Err(FormError::EmptyField { field });
    }
    Ok(sanitized)
}

/// Sanitised inline text; blank input becomes `None`.
pub fn optional_inline(input: Option<&str>) -> Option<String> {
    input.map(sanitize_inline_text).filter(|value| !value.is_empty())
}

/// Sanitised multi-line text; blank input becomes `None`.
pub fn optional_multiline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_is_collapsed() {
        assert_eq!(sanitize_inline_text("  Deluxe \t Product\u{7} "), "Deluxe Product");
    }

    #[test]
    fn multiline_text_keeps_single_blank_lines() {
        assert_eq!(
            sanitize_multiline_text("\n First line.\n\n\n Second line.  \n\n"),
            "First line.\n\nSecond line."
        );
    }

    #[test]
    fn currency_is_uppercased_and_checked() {
        assert_eq!(sanitize_currency(" usd ").expect("valid"), "USD");
        assert!(matches!(
            sanitize_currency("US!"),
            Err(FormError::InvalidValue { field: "currency", .. })
        ));
    }
}
