use crate::error::{ErrorKind, Result};
use crate::normalize::{index_key, record_key};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use time::UtcDateTime;

/// Earliest accepted publication year.
pub const MIN_YEAR: i32 = 1000;

/// A single catalog entry (a book).
///
/// Identity is the normalized [`key`](Self::key): two records with the same
/// key compare equal and hash identically, whatever their other fields say.
/// Fields that participate in indexing (key, authors, category) cannot change
/// once built; the store relies on that to keep its indexes consistent.
///
/// Records are built through [`RecordBuilder`], which owns all validation.
///
/// ```
/// use shelf_catalog::Record;
///
/// let record = Record::builder("978-0-13-110362-7", "The C Programming Language")
///     .author("Brian Kernighan")
///     .secondary_author("Dennis Ritchie")
///     .category("Programming")
///     .year(1988)
///     .build()
///     .unwrap();
/// assert_eq!(record.key(), "9780131103627");
/// assert_eq!(record.authors().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    key: String,
    title: String,
    author: String,
    secondary_authors: Vec<String>,
    publisher: String,
    year: Option<i32>,
    category: String,
    pages: u32,
    language: String,
    available: bool,
    location: String,
    registered_at: UtcDateTime,
}

impl Record {
    /// Category assigned when none is given.
    pub const UNCATEGORIZED: &'static str = "Uncategorized";
    /// Language assigned when none is given.
    pub const UNKNOWN_LANGUAGE: &'static str = "Unknown";

    /// Start building a record from its two required fields.
    pub fn builder(key: impl Into<String>, title: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(key, title)
    }

    /// Normalized unique key (whitespace and hyphens stripped).
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    /// Primary author. May be empty.
    pub fn author(&self) -> &str {
        &self.author
    }
    pub fn secondary_authors(&self) -> &[String] {
        &self.secondary_authors
    }
    /// Primary author followed by every secondary author, in insertion order.
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.author.as_str()).chain(self.secondary_authors.iter().map(String::as_str))
    }
    pub fn publisher(&self) -> &str {
        &self.publisher
    }
    pub fn year(&self) -> Option<i32> {
        self.year
    }
    pub fn category(&self) -> &str {
        &self.category
    }
    pub fn pages(&self) -> u32 {
        self.pages
    }
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn is_available(&self) -> bool {
        self.available
    }
    /// Physical shelf or digital location.
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn registered_at(&self) -> UtcDateTime {
        self.registered_at
    }

    /// Normalized author index keys, primary first. A blank primary author
    /// still yields its (empty) key; secondary authors are never blank. May
    /// repeat when the same author is listed twice.
    pub(crate) fn author_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.authors().map(index_key)
    }

    /// Normalized category index key.
    pub(crate) fn category_key(&self) -> String {
        index_key(&self.category)
    }

    /// Copy of this record with a different availability flag.
    pub(crate) fn with_available(&self, available: bool) -> Self {
        Self { available, ..self.clone() }
    }

    /// Copy of this record with the revised descriptive fields applied.
    ///
    /// Title and year go through the same checks as [`RecordBuilder::build`].
    /// Key, authors, category and registration time are carried over.
    pub(crate) fn revised(&self, revision: Revision) -> Result<Self> {
        let mut record = self.clone();
        if let Some(title) = revision.title {
            record.title = required_title(&title)?.to_string();
        }
        if let Some(year) = revision.year {
            record.year = valid_year(year, UtcDateTime::now())?;
        }
        if let Some(publisher) = revision.publisher {
            record.publisher = trimmed_or(Some(publisher), "");
        }
        if let Some(pages) = revision.pages {
            record.pages = pages;
        }
        if let Some(language) = revision.language {
            record.language = trimmed_or(Some(language), Record::UNKNOWN_LANGUAGE);
        }
        if let Some(location) = revision.location {
            record.location = trimmed_or(Some(location), "");
        }
        Ok(record)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Record {}
impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}] {}", self.key, self.title)?;
        if !self.author.is_empty() {
            write!(f, " by {}", self.author)?;
        }
        let status = if self.available { "available" } else { "on loan" };
        write!(f, " ({}, {status})", self.category)
    }
}

/// Validating constructor for [`Record`].
///
/// Required fields go into [`new`](Self::new); everything else is optional
/// and trimmed on the way in. Nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    key: String,
    title: String,
    author: Option<String>,
    secondary_authors: Vec<String>,
    publisher: Option<String>,
    year: Option<i32>,
    category: Option<String>,
    pages: u32,
    language: Option<String>,
    available: bool,
    location: Option<String>,
}

impl RecordBuilder {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            author: None,
            secondary_authors: Vec::new(),
            publisher: None,
            year: None,
            category: None,
            pages: 0,
            language: None,
            available: true,
            location: None,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Add a secondary author. Blank names are ignored; duplicates are kept.
    pub fn secondary_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        let author = author.trim();
        if !author.is_empty() {
            self.secondary_authors.push(author.to_string());
        }
        self
    }

    pub fn secondary_authors<S: Into<String>>(self, authors: impl IntoIterator<Item = S>) -> Self {
        authors.into_iter().fold(self, |builder, author| builder.secondary_author(author))
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Blank categories fall back to [`Record::UNCATEGORIZED`], exactly like
    /// an absent one, so no record is ever indexed under an empty category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Validate and produce the [`Record`].
    ///
    /// Fails with [`ErrorKind::MissingField`] for a blank key or title, and
    /// [`ErrorKind::InvalidYear`] for a year before [`MIN_YEAR`] or after next
    /// year.
    pub fn build(self) -> Result<Record> {
        let registered_at = UtcDateTime::now();
        let key = record_key(&self.key);
        if key.is_empty() {
            exn::bail!(ErrorKind::MissingField("key"));
        }
        let title = required_title(&self.title)?;
        let year = valid_year(self.year, registered_at)?;
        Ok(Record {
            key,
            title: title.to_string(),
            author: trimmed_or(self.author, ""),
            secondary_authors: self.secondary_authors,
            publisher: trimmed_or(self.publisher, ""),
            year,
            category: trimmed_or(self.category, Record::UNCATEGORIZED),
            pages: self.pages,
            language: trimmed_or(self.language, Record::UNKNOWN_LANGUAGE),
            available: self.available,
            location: trimmed_or(self.location, ""),
            registered_at,
        })
    }
}

/// Descriptive fields to change on a live record, via
/// [`Catalog::update`](crate::Catalog::update).
///
/// Only the fields that take part in no index can be revised; unset fields are
/// left as they are. Passing `year(None)` clears the year.
///
/// ```
/// use shelf_catalog::Revision;
///
/// let revision = Revision::new().title("Dom Casmurro (2nd ed.)").year(Some(1900)).pages(256);
/// assert!(!revision.is_empty());
/// assert!(Revision::new().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision {
    title: Option<String>,
    publisher: Option<String>,
    year: Option<Option<i32>>,
    pages: Option<u32>,
    language: Option<String>,
    location: Option<String>,
}

impl Revision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = Some(year);
        self
    }

    pub fn pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn required_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingField("title"));
    }
    Ok(title)
}

/// Accepts years from [`MIN_YEAR`] up to the year after `now`.
fn valid_year(year: Option<i32>, now: UtcDateTime) -> Result<Option<i32>> {
    if let Some(year) = year
        && !(MIN_YEAR..=now.year() + 1).contains(&year)
    {
        exn::bail!(ErrorKind::InvalidYear(year));
    }
    Ok(year)
}

fn trimmed_or(value: Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}
