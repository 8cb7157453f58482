//! Error types for loan bookkeeping.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// A circulation error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for circulation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a loan or return was refused.
///
/// ### Input Errors
/// - [`ErrorKind::InvalidPhone`]
/// - [`ErrorKind::MissingBorrower`]
///
/// ### State Errors
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::Unavailable`]
/// - [`ErrorKind::NoActiveLoan`]
/// - [`ErrorKind::PhoneMismatch`] - recoverable by confirming the return.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No record with this key in the catalog.
    #[display("no record with key {_0}")]
    NotFound(#[error(not(source))] String),
    /// The record is already lent out.
    #[display("record {_0} is not available for loan")]
    Unavailable(#[error(not(source))] String),
    /// Phone number is not digits-only or has the wrong length.
    #[display("invalid phone number: {_0}")]
    InvalidPhone(#[error(not(source))] String),
    /// Borrower name was blank.
    #[display("borrower name is required")]
    MissingBorrower,
    /// Nothing is on loan under this key.
    #[display("no active loan for {_0}")]
    NoActiveLoan(#[error(not(source))] String),
    /// The phone given at return differs from the one recorded at loan time.
    #[display("phone number does not match the loan record for {_0}")]
    PhoneMismatch(#[error(not(source))] String),
    /// The configured phone policy is unusable.
    #[display("invalid phone policy: {_0}")]
    Policy(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A mismatch can be retried once the librarian confirms it.
        matches!(self, Self::PhoneMismatch(_))
    }
}
