//! Downloadable documents: CSV exports and order invoices.

use thiserror::Error;

pub mod csv;
pub mod invoice;

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("failed to finish CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Format an amount in the smallest currency unit as `12.34`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
