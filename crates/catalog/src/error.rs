//! Catalog Error Types
//!
//! The store itself never fails for expected conditions (duplicate keys,
//! missing records, blank queries); those are ordinary return values. The
//! errors here belong to the edges: building a [`Record`](crate::Record) from
//! untrusted input and parsing a [`SearchField`](crate::SearchField).

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was blank or missing.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// Publication year outside of the accepted range.
    #[display("invalid publication year: {_0}")]
    InvalidYear(#[error(not(source))] i32),
    /// The name of a searchable field was not recognised.
    #[display("unknown search field: {_0}")]
    UnknownField(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Validation errors only go away when the input changes.
        false
    }
}
