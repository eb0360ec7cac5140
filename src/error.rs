use crate::domain::payout::ChainFamily;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("No {0} wallet provider is available")]
    ProviderUnavailable(ChainFamily),
    #[error("Rejected by user: {0}")]
    UserRejected(String),
    #[error("Network mismatch: required {required}, {reason}")]
    NetworkMismatch { required: String, reason: String },
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Wallet provider not ready after {waited_ms} ms")]
    Timeout { waited_ms: u64 },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PayoutError {
    /// `UserRejected` is final: the operator declined and the payout must not
    /// be resubmitted without a new decision. Everything else is reviewable.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutError::UserRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, PayoutError>;
