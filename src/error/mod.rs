//! Error types and handling module.
//!
//! Defines all application-specific error types and conversions.

use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logically inconsistent input (e.g. an address not derived from its key).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Wallet-related errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The node did not answer the liveness probe.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport errors on read-only RPC requests.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Solidity compilation or compiler installation failed.
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// Arguments could not be ABI-encoded.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Signing, submission, confirmation or execution of a transaction failed.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A read-only contract call failed.
    #[error("Call error: {0}")]
    Call(String),

    /// Filesystem or process errors.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<alloy::hex::FromHexError> for AppError {
    fn from(err: alloy::hex::FromHexError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
