use crate::error::{ErrorKind, Result};
use crate::phone::PhonePolicy;
use shelf_catalog::Catalog;
use shelf_catalog::normalize::record_key;
use std::collections::HashMap;
use std::fmt::{Display, Error as FmtError, Formatter, Result as FmtResult};
use time::UtcDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::instrument;

/// An active loan of one catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    /// Normalized record key
    pub key: String,
    pub borrower: String,
    pub phone: String,
    pub loaned_at: UtcDateTime,
}
impl Display for Loan {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let when = self.loaned_at.format(&Rfc3339).map_err(|_| FmtError)?;
        write!(f, "[{}] lent to {} ({}) at {when}", self.key, self.borrower, self.phone)
    }
}

/// Outcome of a successful return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub loan: Loan,
    /// `false` when the record was removed from the catalog while on loan, so
    /// there was nothing to mark available again.
    pub cataloged: bool,
}

/// In-memory register of active loans, keyed by normalized record key.
///
/// The ledger is an ordinary collaborator of the [`Catalog`]: it only uses
/// the catalog's public lookups and availability setters.
#[derive(Debug, Default)]
pub struct Ledger {
    policy: PhonePolicy,
    loans: HashMap<String, Loan>,
}

impl Ledger {
    pub fn new(policy: PhonePolicy) -> Self {
        Self {
            policy,
            loans: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &PhonePolicy {
        &self.policy
    }

    /// Lend the record with `key` to `borrower`, marking it unavailable.
    ///
    /// Checked in order: the record exists ([`ErrorKind::NotFound`]), it is
    /// available ([`ErrorKind::Unavailable`]), the phone is acceptable
    /// ([`ErrorKind::InvalidPhone`]) and the borrower is named
    /// ([`ErrorKind::MissingBorrower`]).
    ///
    /// The record is taken with [`Catalog::set_available_if`], so when other
    /// holders of the catalog remove or lend it concurrently the loan is
    /// refused rather than recorded against a record that is gone.
    #[instrument(skip(self, catalog, phone))]
    pub fn lend(&mut self, catalog: &Catalog, key: &str, borrower: &str, phone: &str) -> Result<Loan> {
        let key = record_key(key);
        let record = catalog.find_by_key(&key).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key.clone())))?;
        if !record.is_available() || self.loans.contains_key(&key) {
            exn::bail!(ErrorKind::Unavailable(key));
        }
        let phone = self.policy.validate(phone.trim())?;
        let borrower = borrower.trim();
        if borrower.is_empty() {
            exn::bail!(ErrorKind::MissingBorrower);
        }

        if !catalog.set_available_if(&key, true, false) {
            tracing::warn!("Record changed while lending");
            match catalog.contains_key(&key) {
                true => exn::bail!(ErrorKind::Unavailable(key)),
                false => exn::bail!(ErrorKind::NotFound(key)),
            }
        }
        let loan = Loan {
            key: key.clone(),
            borrower: borrower.to_string(),
            phone: phone.to_string(),
            loaned_at: UtcDateTime::now(),
        };
        self.loans.insert(key, loan.clone());
        tracing::info!(title = record.title(), "Loan registered");
        Ok(loan)
    }

    /// Close the loan on `key`, marking the record available again.
    ///
    /// A phone that differs from the one given at loan time is refused with
    /// [`ErrorKind::PhoneMismatch`] unless `confirm_mismatch` is set.
    #[instrument(skip(self, catalog, phone))]
    pub fn receive(&mut self, catalog: &Catalog, key: &str, phone: &str, confirm_mismatch: bool) -> Result<Receipt> {
        let phone = self.policy.validate(phone.trim())?;
        let key = record_key(key);
        let loan = self.loans.get(&key).ok_or_else(|| exn::Exn::from(ErrorKind::NoActiveLoan(key.clone())))?;
        if loan.phone != phone {
            if !confirm_mismatch {
                exn::bail!(ErrorKind::PhoneMismatch(key));
            }
            tracing::warn!(expected = %loan.phone, given = %phone, "Accepting return with mismatched phone");
        }
        let cataloged = catalog.set_available(&key, true);
        if !cataloged {
            tracing::warn!("Returned record is no longer in the catalog");
        }
        let loan = self.forget(&key).ok_or_else(|| exn::Exn::from(ErrorKind::NoActiveLoan(key)))?;
        Ok(Receipt { loan, cataloged })
    }

    /// Drop a loan without touching the catalog (e.g. the record is being
    /// removed from it).
    pub fn forget(&mut self, key: &str) -> Option<Loan> {
        self.loans.remove(&record_key(key))
    }

    pub fn active(&self, key: &str) -> Option<&Loan> {
        self.loans.get(&record_key(key))
    }

    /// Active loans, oldest first.
    pub fn loans(&self) -> Vec<&Loan> {
        let mut loans: Vec<_> = self.loans.values().collect();
        loans.sort_by(|a, b| a.loaned_at.cmp(&b.loaned_at).then_with(|| a.key.cmp(&b.key)));
        loans
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::Record;
    use std::sync::Barrier;
    use std::thread;

    const PHONE: &str = "11999990000";

    fn catalog() -> Catalog {
        let catalog = Catalog::new();
        for key in ["978-1", "978-2"] {
            catalog.insert(Record::builder(key, format!("Book {key}")).author("Ana").build().unwrap());
        }
        catalog
    }

    #[test]
    fn test_lend_and_receive() {
        let catalog = catalog();
        let mut ledger = Ledger::default();

        let loan = ledger.lend(&catalog, "978 1", " Maria ", PHONE).unwrap();
        assert_eq!(loan.key, "9781");
        assert_eq!(loan.borrower, "Maria");
        assert!(!catalog.find_by_key("9781").unwrap().is_available());
        assert_eq!(ledger.active("978-1"), Some(&loan));

        let receipt = ledger.receive(&catalog, "9781", PHONE, false).unwrap();
        assert!(receipt.cataloged);
        assert_eq!(receipt.loan, loan);
        assert!(catalog.find_by_key("9781").unwrap().is_available());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_lend_missing_record() {
        let mut ledger = Ledger::default();
        let err = ledger.lend(&catalog(), "404", "Maria", PHONE).unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound("404".to_string()));
    }

    #[test]
    fn test_lend_twice_is_unavailable() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        ledger.lend(&catalog, "9781", "Maria", PHONE).unwrap();
        let err = ledger.lend(&catalog, "9781", "João", "11888880000").unwrap_err();
        assert_eq!(&*err, &ErrorKind::Unavailable("9781".to_string()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_lend_validates_borrower_and_phone() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        let err = ledger.lend(&catalog, "9781", "  ", PHONE).unwrap_err();
        assert_eq!(&*err, &ErrorKind::MissingBorrower);
        let err = ledger.lend(&catalog, "9781", "Maria", "+55 11").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPhone(_)));
        // Nothing changed.
        assert!(ledger.is_empty());
        assert!(catalog.find_by_key("9781").unwrap().is_available());
    }

    #[test]
    fn test_lend_checks_phone_before_borrower() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        let err = ledger.lend(&catalog, "9781", " ", "abc").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPhone(_)));
    }

    #[test]
    fn test_lend_refuses_record_taken_elsewhere() {
        let catalog = catalog();
        let mut ours = Ledger::default();
        let mut theirs = Ledger::default();
        theirs.lend(&catalog, "9781", "Maria", PHONE).unwrap();
        let err = ours.lend(&catalog, "9781", "João", PHONE).unwrap_err();
        assert_eq!(&*err, &ErrorKind::Unavailable("9781".to_string()));
        assert!(ours.is_empty());
    }

    #[test]
    fn test_concurrent_ledgers_lend_once() {
        const THREADS: usize = 8;
        let catalog = catalog();
        let barrier = Barrier::new(THREADS);
        let outcomes: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let (catalog, barrier) = (&catalog, &barrier);
                    s.spawn(move || {
                        let mut ledger = Ledger::default();
                        barrier.wait();
                        let outcome = ledger.lend(catalog, "9781", &format!("Borrower {i}"), PHONE);
                        outcome.map(|_| ledger.len()).map_err(|err| (*err).clone())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let lent: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
        assert_eq!(lent, [&1]);
        for err in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
            assert_eq!(err, &ErrorKind::Unavailable("9781".to_string()));
        }
        assert!(!catalog.find_by_key("9781").unwrap().is_available());
    }

    #[test]
    fn test_concurrent_removal_never_leaves_dangling_loan() {
        let catalog = catalog();
        let outcome = thread::scope(|s| {
            let lender = s.spawn(|| Ledger::default().lend(&catalog, "9782", "Maria", PHONE).map_err(|err| (*err).clone()));
            s.spawn(|| catalog.remove_by_key("9782"));
            lender.join().unwrap()
        });
        match outcome {
            // Lent first, then removed.
            Ok(loan) => assert_eq!(loan.key, "9782"),
            Err(err) => assert_eq!(err, ErrorKind::NotFound("9782".to_string())),
        }
        assert!(catalog.find_by_key("9782").is_none());
    }

    #[test]
    fn test_receive_phone_mismatch() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        ledger.lend(&catalog, "9781", "Maria", PHONE).unwrap();

        let err = ledger.receive(&catalog, "9781", "11000000000", false).unwrap_err();
        assert_eq!(&*err, &ErrorKind::PhoneMismatch("9781".to_string()));
        assert!(err.is_retryable());
        assert_eq!(ledger.len(), 1);

        let receipt = ledger.receive(&catalog, "9781", "11000000000", true).unwrap();
        assert_eq!(receipt.loan.phone, PHONE);
        assert!(catalog.find_by_key("9781").unwrap().is_available());
    }

    #[test]
    fn test_receive_without_loan() {
        let mut ledger = Ledger::default();
        let err = ledger.receive(&catalog(), "9782", PHONE, false).unwrap_err();
        assert_eq!(&*err, &ErrorKind::NoActiveLoan("9782".to_string()));
        let err = ledger.receive(&catalog(), "9782", "12", false).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPhone(_)));
    }

    #[test]
    fn test_receive_after_removal() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        ledger.lend(&catalog, "9782", "Maria", PHONE).unwrap();
        assert!(catalog.remove_by_key("9782"));
        let receipt = ledger.receive(&catalog, "9782", PHONE, false).unwrap();
        assert!(!receipt.cataloged);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_loans_are_listed_oldest_first() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        ledger.lend(&catalog, "9782", "Maria", PHONE).unwrap();
        ledger.lend(&catalog, "9781", "João", PHONE).unwrap();
        let keys: Vec<_> = ledger.loans().iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys.len(), 2);
        assert!(ledger.loans()[0].loaned_at <= ledger.loans()[1].loaned_at);
        assert!(ledger.forget("978-2").is_some());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_loan_display() {
        let catalog = catalog();
        let mut ledger = Ledger::default();
        let loan = ledger.lend(&catalog, "9781", "Maria", PHONE).unwrap();
        let text = loan.to_string();
        assert!(text.starts_with("[9781] lent to Maria (11999990000) at "));
    }
}
