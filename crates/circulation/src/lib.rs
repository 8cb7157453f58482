//! Loan bookkeeping for a [`shelf_catalog::Catalog`].
//!
//! Tracks who borrowed which record (and their phone number), flipping the
//! record's availability on loan and return.

pub mod error;
mod ledger;
mod phone;

pub use crate::ledger::{Ledger, Loan, Receipt};
pub use crate::phone::PhonePolicy;
