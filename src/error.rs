//! Console Error Types
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.
//! Rejections the librarian can act on (duplicate keys, invalid phones, ...)
//! are printed and the menu carries on; only these end the program.

use derive_more::{Display, Error};

/// A console error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded.
    #[display("configuration error")]
    Config,
    /// Configured loan policy was rejected.
    #[display("circulation setup error")]
    Circulation,
    /// Reading from or writing to the terminal failed.
    #[display("terminal I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
