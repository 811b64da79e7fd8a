//! Accounts and their value objects.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::id::{AccountId, OwnerId};
use crate::money::Money;

/// Closed set of account products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Savings,
    Current,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Current => "current",
        }
    }
}

impl FromStr for AccountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "savings" => Ok(Self::Savings),
            "current" => Ok(Self::Current),
            other => Err(DomainError::validation(format!(
                "account type must be one of: savings, current; got {other:?}"
            ))),
        }
    }
}

/// 3-letter currency code (ISO-4217 style).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency must be a 3-letter code, got {code:?}"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("NGN".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Length of the public account number.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// 10-digit number addressing an account from the outside.
///
/// Unique across all accounts; generated at creation and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        let well_formed = s.len() == ACCOUNT_NUMBER_LEN
            && s.bytes().all(|b| b.is_ascii_digit())
            && !s.starts_with('0');
        if !well_formed {
            return Err(DomainError::validation(format!(
                "account number must be {ACCOUNT_NUMBER_LEN} digits, got {s:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Draw a fresh candidate number from UUIDv7 entropy.
    ///
    /// Uniqueness is the store's job; callers regenerate on collision.
    pub fn generate() -> Self {
        let bytes = Uuid::now_v7().into_bytes();
        let mut n = 0u64;
        for b in &bytes[8..16] {
            n = (n << 8) | u64::from(*b);
        }
        Self(format!("{}", 1_000_000_000 + n % 9_000_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A customer bank account (system-of-record row).
///
/// `balance` only ever moves through ledger operations; everything else is
/// immutable after creation apart from the metadata fields (type, currency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner_id: OwnerId,
    pub number: AccountNumber,
    pub account_type: AccountType,
    pub currency: Currency,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_are_well_formed() {
        for _ in 0..64 {
            let number = AccountNumber::generate();
            assert_eq!(number.as_str().len(), ACCOUNT_NUMBER_LEN);
            assert!(number.as_str().bytes().all(|b| b.is_ascii_digit()));
            assert!(!number.as_str().starts_with('0'));
            // round-trips through validation
            AccountNumber::new(number.as_str()).unwrap();
        }
    }

    #[test]
    fn account_number_rejects_malformed_input() {
        assert!(AccountNumber::new("123").is_err());
        assert!(AccountNumber::new("0123456789").is_err());
        assert!(AccountNumber::new("12345abcde").is_err());
        assert!(AccountNumber::new("12345678901").is_err());
    }

    #[test]
    fn currency_normalizes_and_validates() {
        assert_eq!(Currency::new("ngn").unwrap().as_str(), "NGN");
        assert_eq!(Currency::default().as_str(), "NGN");
        assert!(Currency::new("naira").is_err());
        assert!(Currency::new("N1").is_err());
    }

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Savings".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert_eq!("CURRENT".parse::<AccountType>().unwrap(), AccountType::Current);
        assert!("checking".parse::<AccountType>().is_err());
    }
}
