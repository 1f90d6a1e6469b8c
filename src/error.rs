//! Error types for the transaction submitter

use thiserror::Error;

/// Main error type for the submitter
#[derive(Error, Debug)]
pub enum SubmitterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("ABI encoding error: {0}")]
    Encoding(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("node request failed: {0}")]
    Network(String),

    #[error("transaction rejected by node: {0}")]
    Rejected(String),

    #[error("timed out waiting for {operation}")]
    Timeout { operation: String },
}

impl SubmitterError {
    /// Classify an RPC-level error message from a broadcast attempt.
    ///
    /// The node returns a plain message when it refuses a transaction it
    /// could parse (nonce conflict, balance too low, duplicate); anything
    /// else is treated as a transport fault.
    pub fn from_rpc_message(message: String) -> Self {
        let lowered = message.to_lowercase();
        let rejected = lowered.contains("nonce too low")
            || lowered.contains("insufficient funds")
            || lowered.contains("replacement transaction underpriced")
            || lowered.contains("already known");

        if rejected {
            SubmitterError::Rejected(message)
        } else {
            SubmitterError::Network(message)
        }
    }
}

/// Result type for submitter operations
pub type SubmitterResult<T> = Result<T, SubmitterError>;
