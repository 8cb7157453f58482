//! In-memory, thread-safe catalog of library records.
//!
//! A [`Catalog`] indexes [`Record`]s three ways at once:
//!
//! - by **unique key** (an ISBN-like identifier, whitespace/hyphen-insensitive),
//! - by **author**, covering the primary and every secondary author,
//! - by **category**,
//!
//! and keeps every index consistent with the others under concurrent inserts,
//! removals and lookups. Author and title searches fall back to a linear
//! substring scan; see [`Catalog::find_by_author`] for the exact rules.
//!
//! Building and validating records is the caller's job, via [`RecordBuilder`];
//! the catalog only rejects key collisions.

pub mod error;
mod index;
pub mod normalize;
mod query;
mod record;
mod stats;
mod store;

pub use crate::query::SearchField;
pub use crate::record::{MIN_YEAR, Record, RecordBuilder, Revision};
pub use crate::stats::{DEFAULT_REPORT_SAMPLE, Statistics};
pub use crate::store::Catalog;
