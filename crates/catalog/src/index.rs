//! Coupled index bookkeeping.
//!
//! [`Indexes`] owns the four structures behind a [`Catalog`](crate::Catalog):
//!
//! | Structure     | Maps                               | Purpose                     |
//! |---------------|------------------------------------|-----------------------------|
//! | `by_key`      | record key → entry                 | primary store, exact lookup |
//! | `by_author`   | author index key → record keys     | exact author lookup         |
//! | `by_category` | category index key → record keys   | exact category lookup       |
//! | `order`       | insertion sequence → record key    | insertion-ordered scans     |
//!
//! Buckets hold record keys rather than records, so a record lives in exactly
//! one place (`by_key`) and can be swapped (e.g. availability changes) without
//! touching any bucket.
//!
//! Nothing in here synchronises; the [`Catalog`](crate::Catalog) wraps the
//! whole struct in a single lock so every mutation is applied as one unit.
//!
//! # Invariants
//!
//! After every completed mutation:
//!
//! - every live record is reachable from `by_key` and from `order`, once;
//! - every live record is in the bucket of each of its author keys and of its
//!   category key;
//! - no bucket is empty;
//! - `order` iterates live records in first-insertion order.

use crate::record::Record;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

type Buckets = HashMap<String, HashSet<String>>;

/// A live record together with its insertion sequence number.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) seq: u64,
    pub(crate) record: Arc<Record>,
}

#[derive(Debug, Default)]
pub(crate) struct Indexes {
    by_key: HashMap<String, Entry>,
    by_author: Buckets,
    by_category: Buckets,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Indexes {
    /// Claim the record's key and index it everywhere.
    ///
    /// Returns `false`, without touching anything, when the key is taken.
    pub(crate) fn insert(&mut self, record: Arc<Record>) -> bool {
        let key = record.key().to_string();
        if self.by_key.contains_key(&key) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;

        for author in record.author_keys() {
            self.by_author.entry(author).or_default().insert(key.clone());
        }
        self.by_category.entry(record.category_key()).or_default().insert(key.clone());
        self.order.insert(seq, key.clone());
        self.by_key.insert(key, Entry { seq, record });
        true
    }

    /// Evict a record (by normalized key) from every structure, dropping any
    /// bucket left empty.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Arc<Record>> {
        let Entry { seq, record } = self.by_key.remove(key)?;
        self.order.remove(&seq);
        for author in record.author_keys() {
            detach(&mut self.by_author, &author, key);
        }
        detach(&mut self.by_category, &record.category_key(), key);
        Some(record)
    }

    /// Swap the stored record for one with identical identity and index keys.
    ///
    /// Returns `false` when the key is not live.
    pub(crate) fn replace(&mut self, key: &str, update: impl FnOnce(&Record) -> Record) -> bool {
        match self.by_key.get_mut(key) {
            Some(entry) => {
                let updated = update(&entry.record);
                debug_assert_eq!(updated.key(), entry.record.key());
                entry.record = Arc::new(updated);
                true
            },
            None => false,
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Entry> {
        self.by_key.get(key)
    }

    pub(crate) fn author_bucket(&self, author_key: &str) -> Option<&HashSet<String>> {
        self.by_author.get(author_key)
    }

    pub(crate) fn category_bucket(&self, category_key: &str) -> Option<&HashSet<String>> {
        self.by_category.get(category_key)
    }

    pub(crate) fn categories(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_category.iter().map(|(name, bucket)| (name.as_str(), bucket.len()))
    }

    /// Live records in insertion order.
    pub(crate) fn ordered(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.order.values().filter_map(|key| self.by_key.get(key)).map(|entry| &entry.record)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn author_count(&self) -> usize {
        self.by_author.len()
    }

    pub(crate) fn category_count(&self) -> usize {
        self.by_category.len()
    }

    /// Panics when any of the documented invariants is broken.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.by_key.len(), self.order.len(), "primary map and order disagree on size");
        for (seq, key) in &self.order {
            let entry = self.by_key.get(key).unwrap_or_else(|| panic!("ordered key {key} is not live"));
            assert_eq!(entry.seq, *seq, "sequence mismatch for {key}");
        }
        for (key, entry) in &self.by_key {
            assert_eq!(entry.record.key(), key, "record stored under a foreign key");
            for author in entry.record.author_keys() {
                let bucket = self.by_author.get(&author).unwrap_or_else(|| panic!("no author bucket {author}"));
                assert!(bucket.contains(key), "{key} missing from author bucket {author}");
            }
            let category = entry.record.category_key();
            let bucket = self.by_category.get(&category).unwrap_or_else(|| panic!("no category bucket {category}"));
            assert!(bucket.contains(key), "{key} missing from category bucket {category}");
        }
        for (name, bucket) in self.by_author.iter().chain(self.by_category.iter()) {
            assert!(!bucket.is_empty(), "empty bucket {name}");
            for key in bucket {
                assert!(self.by_key.contains_key(key), "bucket {name} references dead key {key}");
            }
        }
    }
}

/// Remove `key` from the named bucket, deleting the bucket once empty.
fn detach(buckets: &mut Buckets, name: &str, key: &str) {
    if let Some(bucket) = buckets.get_mut(name) {
        bucket.remove(key);
        if bucket.is_empty() {
            buckets.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, author: &str, secondary: &[&str], category: &str) -> Arc<Record> {
        Arc::new(
            Record::builder(key, format!("Title {key}"))
                .author(author)
                .secondary_authors(secondary.iter().copied())
                .category(category)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_insert_indexes_every_author_and_category() {
        let mut indexes = Indexes::default();
        assert!(indexes.insert(record("1", "Ana Silva", &["Bruno Costa"], "Fiction")));
        assert_eq!(indexes.author_count(), 2);
        assert_eq!(indexes.category_count(), 1);
        assert!(indexes.author_bucket("ana silva").unwrap().contains("1"));
        assert!(indexes.author_bucket("bruno costa").unwrap().contains("1"));
        assert!(indexes.category_bucket("fiction").unwrap().contains("1"));
        indexes.assert_consistent();
    }

    #[test]
    fn test_insert_duplicate_has_no_side_effects() {
        let mut indexes = Indexes::default();
        assert!(indexes.insert(record("1", "Ana", &[], "Fiction")));
        assert!(!indexes.insert(record("1", "Other", &["Someone"], "Science")));
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes.author_count(), 1);
        assert!(indexes.category_bucket("science").is_none());
        assert_eq!(indexes.get("1").unwrap().record.author(), "Ana");
        indexes.assert_consistent();
    }

    #[test]
    fn test_remove_drops_empty_buckets() {
        let mut indexes = Indexes::default();
        indexes.insert(record("1", "Ana", &["Bruno"], "Fiction"));
        indexes.insert(record("2", "Ana", &[], "Science"));

        let removed = indexes.remove("1").unwrap();
        assert_eq!(removed.key(), "1");
        assert!(indexes.author_bucket("bruno").is_none());
        assert!(indexes.category_bucket("fiction").is_none());
        assert_eq!(indexes.author_bucket("ana").unwrap().len(), 1);
        indexes.assert_consistent();

        assert!(indexes.remove("1").is_none());
        indexes.remove("2");
        assert_eq!(indexes.len(), 0);
        assert_eq!(indexes.author_count(), 0);
        assert_eq!(indexes.category_count(), 0);
        indexes.assert_consistent();
    }

    #[test]
    fn test_duplicate_secondary_author_removed_cleanly() {
        let mut indexes = Indexes::default();
        indexes.insert(record("1", "Ana", &["ana", "ANA "], "X"));
        assert_eq!(indexes.author_count(), 1);
        indexes.remove("1");
        assert_eq!(indexes.author_count(), 0);
        indexes.assert_consistent();
    }

    #[test]
    fn test_reinsertion_goes_to_the_back() {
        let mut indexes = Indexes::default();
        for key in ["1", "2", "3"] {
            indexes.insert(record(key, "A", &[], "C"));
        }
        indexes.remove("1");
        indexes.insert(record("1", "A", &[], "C"));
        let keys: Vec<_> = indexes.ordered().map(|r| r.key().to_string()).collect();
        assert_eq!(keys, ["2", "3", "1"]);
        indexes.assert_consistent();
    }

    #[test]
    fn test_replace_keeps_indexes() {
        let mut indexes = Indexes::default();
        indexes.insert(record("1", "Ana", &[], "Fiction"));
        assert!(indexes.replace("1", |r| r.with_available(false)));
        assert!(!indexes.get("1").unwrap().record.is_available());
        assert!(!indexes.replace("missing", |r| r.clone()));
        indexes.assert_consistent();
    }
}
