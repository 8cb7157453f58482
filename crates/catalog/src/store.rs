use crate::error::Result;
use crate::index::Indexes;
use crate::normalize::lookup_key;
use crate::query::{self, SearchField};
use crate::record::{Record, Revision};
use crate::stats::{DEFAULT_REPORT_SAMPLE, Statistics};
use parking_lot::RwLock;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use tracing::instrument;

/// Thread-safe, multi-index catalog of [`Record`]s.
///
/// Records are indexed by unique key, by every author (primary and secondary)
/// and by category. All four internal structures sit behind one [`RwLock`], so
/// a mutation is observed by readers either completely or not at all, and
/// inserts/removals of the same key are linearizable with exactly one winner.
///
/// Expected outcomes (duplicate key, unknown key, blank query) are reported
/// through return values, never errors. Query results are owned `Vec`s of
/// shared, immutable [`Record`] snapshots; nothing returned aliases the
/// catalog's own storage.
///
/// Share between threads with an [`Arc`] (or scoped borrows); every method
/// takes `&self`.
///
/// # Examples
///
/// ```
/// use shelf_catalog::{Catalog, Record};
///
/// let catalog = Catalog::new();
/// let record = Record::builder("111", "Dom Casmurro").author("Machado de Assis").category("Fiction");
/// assert!(catalog.insert(record.build().unwrap()));
/// assert!(!catalog.insert(Record::builder("1-1-1", "Impostor").build().unwrap()));
///
/// assert_eq!(catalog.find_by_author("machado de assis").len(), 1);
/// assert_eq!(catalog.find_by_author("assis").len(), 1);
/// assert!(catalog.remove_by_key("111"));
/// assert!(catalog.find_by_key("111").is_none());
/// ```
pub struct Catalog {
    indexes: RwLock<Indexes>,
    report_sample: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(Indexes::default()),
            report_sample: DEFAULT_REPORT_SAMPLE,
        }
    }

    /// Change how many category buckets [`statistics`](Self::statistics) lists.
    pub fn with_report_sample(mut self, sample: usize) -> Self {
        self.report_sample = sample;
        self
    }

    /// Adopt a record, indexing it by key, authors and category.
    ///
    /// Returns `false` (and changes nothing) when a record with the same
    /// normalized key is already present.
    #[instrument(skip_all, fields(key = record.key()))]
    pub fn insert(&self, record: Record) -> bool {
        let inserted = self.indexes.write().insert(Arc::new(record));
        match inserted {
            true => tracing::debug!("Record added to catalog"),
            false => tracing::warn!("Record with this key already exists; insert rejected"),
        }
        inserted
    }

    /// Evict the record with the given key from every index.
    ///
    /// Returns `false` when the key is blank or not present.
    #[instrument(skip(self))]
    pub fn remove_by_key(&self, key: &str) -> bool {
        let Some(key) = lookup_key(key) else {
            return false;
        };
        let removed = self.indexes.write().remove(&key);
        if removed.is_some() {
            tracing::debug!("Record removed from catalog");
        }
        removed.is_some()
    }

    /// Exact lookup by (normalized) key.
    pub fn find_by_key(&self, key: &str) -> Option<Arc<Record>> {
        query::by_key(&self.indexes.read(), key)
    }

    /// Records by author.
    ///
    /// An exact (case-insensitive, trimmed) match against any primary or
    /// secondary author is answered from the index. Otherwise every record is
    /// scanned for the term as a substring of its **primary** author only.
    pub fn find_by_author(&self, name: &str) -> Vec<Arc<Record>> {
        query::by_author(&self.indexes.read(), name)
    }

    /// Records whose title contains `text`, case-insensitively, in insertion order.
    pub fn find_by_title(&self, text: &str) -> Vec<Arc<Record>> {
        query::by_title(&self.indexes.read(), text)
    }

    /// Records in the named category (exact, case-insensitive match only).
    pub fn find_by_category(&self, name: &str) -> Vec<Arc<Record>> {
        query::by_category(&self.indexes.read(), name)
    }

    /// Dispatch a lookup by field. A key lookup yields zero or one record.
    pub fn search(&self, field: SearchField, term: &str) -> Vec<Arc<Record>> {
        match field {
            SearchField::Key => self.find_by_key(term).into_iter().collect(),
            SearchField::Author => self.find_by_author(term),
            SearchField::Title => self.find_by_title(term),
            SearchField::Category => self.find_by_category(term),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_by_key(key).is_some()
    }

    /// Flip the availability flag of a live record.
    ///
    /// Returns `false` when the key is blank or not present.
    #[instrument(skip(self))]
    pub fn set_available(&self, key: &str, available: bool) -> bool {
        let Some(key) = lookup_key(key) else {
            return false;
        };
        self.indexes.write().replace(&key, |record| record.with_available(available))
    }

    /// Flip the availability flag only when it currently equals `expected`.
    ///
    /// The check and the swap happen under one write lock, so of several
    /// callers racing to take the same record exactly one succeeds. Returns
    /// `false` when the key is blank, not present, or holds another value.
    #[instrument(skip(self))]
    pub fn set_available_if(&self, key: &str, expected: bool, available: bool) -> bool {
        let Some(key) = lookup_key(key) else {
            return false;
        };
        let mut indexes = self.indexes.write();
        let matches = indexes.get(&key).is_some_and(|entry| entry.record.is_available() == expected);
        matches && indexes.replace(&key, |record| record.with_available(available))
    }

    /// Apply a [`Revision`] to the descriptive fields of a live record.
    ///
    /// Key, authors and category are not revisable, so no index changes.
    /// Returns `Ok(false)` when the key is blank or not present, and fails
    /// with the same errors as [`RecordBuilder::build`](crate::RecordBuilder::build)
    /// for a blank title or out-of-range year, leaving the record untouched.
    #[instrument(skip(self, revision))]
    pub fn update(&self, key: &str, revision: Revision) -> Result<bool> {
        let Some(key) = lookup_key(key) else {
            return Ok(false);
        };
        let mut indexes = self.indexes.write();
        let Some(entry) = indexes.get(&key) else {
            return Ok(false);
        };
        let revised = entry.record.revised(revision)?;
        let updated = indexes.replace(&key, |_| revised);
        tracing::debug!("Record updated");
        Ok(updated)
    }

    /// Snapshot of every live record, in insertion order.
    pub fn records(&self) -> Vec<Arc<Record>> {
        self.indexes.read().ordered().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.indexes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::collect(&self.indexes.read(), self.report_sample)
    }

    /// Human-readable summary: record count, author and category bucket
    /// counts, and the largest category buckets.
    pub fn statistics_report(&self) -> String {
        self.statistics().to_string()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        self.indexes.read().assert_consistent();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Catalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Catalog").field("records", &self.len()).field("report_sample", &self.report_sample).finish()
    }
}
