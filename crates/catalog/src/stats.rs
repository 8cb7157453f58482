use crate::index::Indexes;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Default number of category buckets listed in a report.
pub const DEFAULT_REPORT_SAMPLE: usize = 10;

/// Point-in-time summary of a [`Catalog`](crate::Catalog).
///
/// The [`Display`] implementation renders the human-readable report returned
/// by [`Catalog::statistics_report`](crate::Catalog::statistics_report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// Live records.
    pub records: usize,
    /// Distinct author buckets.
    pub authors: usize,
    /// Distinct category buckets.
    pub categories: usize,
    /// Largest category buckets (normalized name, size), biggest first and
    /// ties broken by name.
    pub top_categories: Vec<(String, usize)>,
}
impl Statistics {
    pub(crate) fn collect(indexes: &Indexes, sample: usize) -> Self {
        let mut categories: Vec<_> = indexes.categories().map(|(name, size)| (name.to_string(), size)).collect();
        categories.sort_unstable_by(|(a_name, a_size), (b_name, b_size)| b_size.cmp(a_size).then(a_name.cmp(b_name)));
        categories.truncate(sample);
        Self {
            records: indexes.len(),
            authors: indexes.author_count(),
            categories: indexes.category_count(),
            top_categories: categories,
        }
    }
}
impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "=== CATALOG REPORT ===")?;
        writeln!(f, "Total records: {}", self.records)?;
        writeln!(f, "Indexed authors: {}", self.authors)?;
        writeln!(f, "Categories: {}", self.categories)?;
        writeln!(f, "Top categories (sample):")?;
        for (name, size) in &self.top_categories {
            writeln!(f, " - {name}: {size}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use std::sync::Arc;

    fn indexes(categories: &[&str]) -> Indexes {
        let mut indexes = Indexes::default();
        for (i, category) in categories.iter().enumerate() {
            let record = Record::builder(i.to_string(), "T").author(format!("Author {i}")).category(*category);
            indexes.insert(Arc::new(record.build().unwrap()));
        }
        indexes
    }

    #[test]
    fn test_collect_orders_by_size() {
        let stats = Statistics::collect(&indexes(&["b", "a", "c", "c", "Drama", "drama", "drama"]), 10);
        assert_eq!(stats.records, 7);
        assert_eq!(stats.authors, 7);
        assert_eq!(stats.categories, 4);
        assert_eq!(
            stats.top_categories,
            [("drama".to_string(), 3), ("c".to_string(), 2), ("a".to_string(), 1), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn test_collect_truncates_sample() {
        let names: Vec<String> = (0..15).map(|i| format!("cat{i:02}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let stats = Statistics::collect(&indexes(&names), DEFAULT_REPORT_SAMPLE);
        assert_eq!(stats.categories, 15);
        assert_eq!(stats.top_categories.len(), DEFAULT_REPORT_SAMPLE);
    }

    #[test]
    fn test_display() {
        let stats = Statistics::collect(&indexes(&["Fiction", "Fiction", "Science"]), 10);
        assert_eq!(
            stats.to_string(),
            "=== CATALOG REPORT ===\n\
             Total records: 3\n\
             Indexed authors: 3\n\
             Categories: 2\n\
             Top categories (sample):\n \
             - fiction: 2\n \
             - science: 1\n"
        );
    }

    #[test]
    fn test_display_empty() {
        let stats = Statistics::collect(&Indexes::default(), 10);
        assert!(stats.to_string().ends_with("Top categories (sample):\n"));
    }
}
