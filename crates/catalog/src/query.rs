//! Read-only lookups over [`Indexes`].
//!
//! Each searchable field uses one or both of two tiers:
//!
//! - **indexed**: hash lookup of the normalized term, copying the bucket out;
//! - **scan**: walk every live record in insertion order and keep those whose
//!   field contains the lowercased term.
//!
//! | Field    | Indexed | Scan                                  |
//! |----------|---------|---------------------------------------|
//! | key      | yes     | no                                    |
//! | author   | yes     | fallback, **primary author only**     |
//! | title    | no      | always                                |
//! | category | yes     | no                                    |
//!
//! The author fallback ignores secondary authors even though the indexed tier
//! covers them. Callers can observe this, so it stays.
//!
//! Every result is a freshly allocated `Vec`; the records inside are shared
//! immutable snapshots, never references into the index structures.

use crate::error::{Error, ErrorKind};
use crate::index::Indexes;
use crate::normalize::{index_key, is_blank, lookup_key};
use crate::record::Record;
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

/// A field that [`Catalog::search`](crate::Catalog::search) can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Key,
    Author,
    Title,
    Category,
}
impl SearchField {
    pub const ALL: [SearchField; 4] = [Self::Key, Self::Author, Self::Title, Self::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Author => "author",
            Self::Title => "title",
            Self::Category => "category",
        }
    }
}
impl FromStr for SearchField {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "key" | "isbn" => Ok(Self::Key),
            "author" => Ok(Self::Author),
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            _ => exn::bail!(ErrorKind::UnknownField(s.to_string())),
        }
    }
}
impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn by_key(indexes: &Indexes, key: &str) -> Option<Arc<Record>> {
    let key = lookup_key(key)?;
    indexes.get(&key).map(|entry| entry.record.clone())
}

pub(crate) fn by_author(indexes: &Indexes, name: &str) -> Vec<Arc<Record>> {
    if is_blank(name) {
        return Vec::new();
    }
    let term = index_key(name);
    match indexes.author_bucket(&term) {
        Some(bucket) => collect(indexes, bucket),
        None => {
            tracing::trace!(author = %term, "No exact author bucket; scanning primary authors");
            scan(indexes, |record| record.author().to_lowercase().contains(&term))
        },
    }
}

pub(crate) fn by_title(indexes: &Indexes, text: &str) -> Vec<Arc<Record>> {
    if is_blank(text) {
        return Vec::new();
    }
    let term = text.trim().to_lowercase();
    scan(indexes, |record| record.title().to_lowercase().contains(&term))
}

pub(crate) fn by_category(indexes: &Indexes, name: &str) -> Vec<Arc<Record>> {
    if is_blank(name) {
        return Vec::new();
    }
    indexes.category_bucket(&index_key(name)).map(|bucket| collect(indexes, bucket)).unwrap_or_default()
}

/// Copy a bucket out, ordered by insertion so results are reproducible.
fn collect(indexes: &Indexes, bucket: &HashSet<String>) -> Vec<Arc<Record>> {
    let mut entries: Vec<_> = bucket.iter().filter_map(|key| indexes.get(key)).collect();
    entries.sort_unstable_by_key(|entry| entry.seq);
    entries.into_iter().map(|entry| entry.record.clone()).collect()
}

fn scan(indexes: &Indexes, matches: impl Fn(&Record) -> bool) -> Vec<Arc<Record>> {
    indexes.ordered().filter(|record| matches(record)).cloned().collect()
}
