//! Error types for the wallet flows.
//!
//! - [`ValidationError`] - bad user input, caught before any network call
//! - [`ConnectorError`] - what a wallet connector reports
//! - [`FlowError`] - the closed set every flow returns
//!
//! Connector errors are folded into [`FlowError`] at the flow boundary so the
//! shell only ever matches on one enum.

use thiserror::Error;

/// Rejected user input. Each variant is a distinct reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty address")]
    EmptyAddress,

    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    #[error("no wallet connected")]
    WalletNotConnected,

    #[error("no recipients entered")]
    NoRecipients,

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Every entry that failed address validation, in input order.
    #[error("invalid recipient addresses: {}", .0.join(", "))]
    InvalidRecipients(Vec<String>),

    #[error("amount is too small to divide across {0} recipients")]
    AmountTooSmallToDivide(usize),

    /// Per-recipient amount times the recipient count does not fit in `U256`.
    #[error("total amount is too large to send to {0} recipients")]
    TotalTooLarge(usize),
}

/// Failures reported by a wallet connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    /// The user declined a prompt (EIP-1193 code 4001).
    #[error("request rejected by user")]
    UserRejected,

    /// The wallet does not know the requested chain (code 4902).
    #[error("chain {0} has not been added to the wallet")]
    ChainNotAdded(u64),

    /// The wallet could not be reached at all.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
}

impl ConnectorError {
    pub fn timeout(operation: impl Into<String>, limit: std::time::Duration) -> Self {
        ConnectorError::Timeout {
            operation: operation.into(),
            seconds: limit.as_secs(),
        }
    }
}

/// Closed error taxonomy returned by every flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// RPC call failed or returned unusable data.
    #[error("RPC error: {0}")]
    Gateway(String),

    /// Wallet missing or failed for a reason other than a user decline.
    #[error("wallet error: {0}")]
    Connector(String),

    /// Explicit decline of a connection, switch or confirmation prompt.
    #[error("cancelled: {0}")]
    UserRejected(String),

    #[error("{operation} timed out after {seconds}s")]
    RequestTimeout { operation: String, seconds: u64 },
}

impl FlowError {
    pub fn gateway(err: impl std::fmt::Display) -> Self {
        FlowError::Gateway(err.to_string())
    }

    pub fn timeout(operation: impl Into<String>, limit: std::time::Duration) -> Self {
        FlowError::RequestTimeout {
            operation: operation.into(),
            seconds: limit.as_secs(),
        }
    }

    /// Map a connector failure for the named action.
    pub fn from_connector(action: &str, err: ConnectorError) -> Self {
        match err {
            ConnectorError::UserRejected => FlowError::UserRejected(action.to_string()),
            ConnectorError::Timeout { operation, seconds } => {
                FlowError::RequestTimeout { operation, seconds }
            }
            other => FlowError::Connector(format!("{}: {}", action, other)),
        }
    }

    /// Errors the shell can drop without alarming messaging.
    pub fn is_silent(&self) -> bool {
        matches!(self, FlowError::UserRejected(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation(_))
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Validation(e) => capitalize(&e.to_string()),
            FlowError::UserRejected(action) => format!("{} was cancelled.", capitalize(action)),
            other => capitalize(&other.to_string()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
