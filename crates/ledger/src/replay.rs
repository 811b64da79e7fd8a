//! Internal consistency check: an account history must replay to its
//! snapshots.

use corebank_core::{DomainError, Money, TransactionKind, TransactionRecord};

/// Verify that applying `records` (oldest first) to `opening` reproduces
/// every `balance_after` and lands on `closing`.
///
/// Transfer legs carry no explicit direction; whichever of
/// `previous + amount` / `previous - amount` matches the recorded
/// `balance_after` decides it. Amounts are strictly positive, so at most one
/// side can match.
pub fn verify_history(
    opening: Money,
    records: &[TransactionRecord],
    closing: Money,
) -> Result<(), DomainError> {
    let mut ordered: Vec<&TransactionRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let mut balance = opening;
    for record in ordered {
        if !record.amount.is_positive() {
            return Err(DomainError::invariant(format!(
                "record {} has a non-positive amount",
                record.id
            )));
        }

        let credited = balance.checked_add(record.amount);
        let debited = balance.checked_sub(record.amount);
        let next = match record.kind {
            TransactionKind::Deposit => credited,
            TransactionKind::Withdrawal => debited,
            TransactionKind::Transfer => {
                if credited == Some(record.balance_after) {
                    credited
                } else {
                    debited
                }
            }
        };

        match next {
            Some(next) if next == record.balance_after && !next.is_negative() => balance = next,
            _ => {
                return Err(DomainError::invariant(format!(
                    "record {} does not replay: {} {} {} produced snapshot {}",
                    record.id,
                    balance,
                    record.kind.as_str(),
                    record.amount,
                    record.balance_after
                )));
            }
        }
    }

    if balance != closing {
        return Err(DomainError::invariant(format!(
            "replayed balance {balance} does not match account balance {closing}"
        )));
    }

    Ok(())
}
