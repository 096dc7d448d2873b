//! Ledger errors

use thiserror::Error;

/// Failures surfaced by ledger operations. Everything above `Io` is a
/// problem with the request rather than the ledger file.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: text must not be empty")]
    EmptyInput,
    #[error("No transactions found in text")]
    NoTransactionsFound,
    #[error("Organization ID required")]
    OrganizationRequired,
    #[error("Invalid organization name: {0:?}")]
    InvalidOrganizationName(String),
    #[error("Organization \"{0}\" not found")]
    OrganizationNotFound(String),
    #[error("Organization \"{0}\" already exists")]
    OrganizationExists(String),
    #[error("Not a member of organization \"{0}\"")]
    NotAMember(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Ledger file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
