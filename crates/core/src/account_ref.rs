//! Polymorphic account addressing: internal id or public account number.

use core::fmt;
use core::str::FromStr;

use uuid::Uuid;

use crate::account::AccountNumber;
use crate::error::DomainError;
use crate::id::AccountId;

/// How callers address an account at the ledger boundary.
///
/// Resolved to a concrete account exactly once at the entry of each
/// operation; nothing downstream branches on the addressing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Id(AccountId),
    Number(AccountNumber),
}

impl From<AccountId> for AccountRef {
    fn from(id: AccountId) -> Self {
        Self::Id(id)
    }
}

impl From<AccountNumber> for AccountRef {
    fn from(number: AccountNumber) -> Self {
        Self::Number(number)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => fmt::Display::fmt(id, f),
            AccountRef::Number(number) => fmt::Display::fmt(number, f),
        }
    }
}

impl FromStr for AccountRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(uuid) = Uuid::from_str(s) {
            return Ok(Self::Id(AccountId::from_uuid(uuid)));
        }
        AccountNumber::new(s).map(Self::Number).map_err(|_| {
            DomainError::invalid_id(format!(
                "account ref must be a uuid or a 10-digit account number, got {s:?}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uuids_as_ids() {
        let id = AccountId::new();
        match id.to_string().parse::<AccountRef>().unwrap() {
            AccountRef::Id(parsed) => assert_eq!(parsed, id),
            other => panic!("expected id ref, got {other:?}"),
        }
    }

    #[test]
    fn parses_ten_digit_strings_as_numbers() {
        match "1234567890".parse::<AccountRef>().unwrap() {
            AccountRef::Number(number) => assert_eq!(number.as_str(), "1234567890"),
            other => panic!("expected number ref, got {other:?}"),
        }
    }

    #[test]
    fn rejects_everything_else() {
        assert!("not-an-account".parse::<AccountRef>().is_err());
        assert!("12345".parse::<AccountRef>().is_err());
    }
}
