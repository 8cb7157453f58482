use crate::error::{ErrorKind, Result};
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

static DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Acceptable borrower phone numbers: ASCII digits only, within a length range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonePolicy {
    digits: RangeInclusive<usize>,
}

impl PhonePolicy {
    pub const DEFAULT_MIN_DIGITS: usize = 8;
    pub const DEFAULT_MAX_DIGITS: usize = 15;

    /// Fails with [`ErrorKind::Policy`] for an empty or inverted range.
    pub fn new(min_digits: usize, max_digits: usize) -> Result<Self> {
        if min_digits == 0 || min_digits > max_digits {
            exn::bail!(ErrorKind::Policy(format!("{min_digits}..={max_digits} digits")));
        }
        Ok(Self {
            digits: min_digits..=max_digits,
        })
    }

    pub fn is_valid(&self, phone: &str) -> bool {
        self.digits.contains(&phone.len()) && DIGITS_REGEX.is_match(phone)
    }

    /// Returns the phone unchanged if valid, otherwise [`ErrorKind::InvalidPhone`].
    pub fn validate<'a>(&self, phone: &'a str) -> Result<&'a str> {
        match self.is_valid(phone) {
            true => Ok(phone),
            false => exn::bail!(ErrorKind::InvalidPhone(phone.to_string())),
        }
    }
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self {
            digits: Self::DEFAULT_MIN_DIGITS..=Self::DEFAULT_MAX_DIGITS,
        }
    }
}
