//! Derived contract balances.
//!
//! No balance column exists anywhere in the schema. A contract's balance is
//! always the replay of its COMPLETED transactions' signed amounts, read
//! fresh on every call — the withdrawal guard runs this inside the
//! recorder's write transaction so it can never act on a stale figure.

use crate::{
    error::LedgerResult,
    store::Db,
    types::{ContractId, TransactionType},
};

/// Sign semantics per transaction type. DEPOSIT and PAYMENT credit the
/// contract; WITHDRAWAL and FEE debit it; the remaining types are recorded
/// but carry no balance weight.
pub fn signed_amount(txn_type: TransactionType, amount: f64) -> f64 {
    match txn_type {
        TransactionType::Deposit | TransactionType::Payment => amount,
        TransactionType::Withdrawal | TransactionType::Fee => -amount,
        TransactionType::Interest
        | TransactionType::Refund
        | TransactionType::Adjustment
        | TransactionType::Penalty => 0.0,
    }
}

/// Replay a contract's COMPLETED transactions into its current balance.
pub fn contract_balance(db: Db<'_>, contract_id: ContractId) -> LedgerResult<f64> {
    let entries = db.completed_amounts(contract_id)?;
    Ok(entries
        .iter()
        .map(|&(txn_type, amount)| signed_amount(txn_type, amount))
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType::*;

    #[test]
    fn credits_and_debits_carry_their_sign() {
        assert_eq!(signed_amount(Deposit, 500.0), 500.0);
        assert_eq!(signed_amount(Payment, 250.0), 250.0);
        assert_eq!(signed_amount(Withdrawal, 100.0), -100.0);
        assert_eq!(signed_amount(Fee, 25.0), -25.0);
    }

    #[test]
    fn neutral_types_contribute_nothing() {
        for t in [Interest, Refund, Adjustment, Penalty] {
            assert_eq!(signed_amount(t, 1_000.0), 0.0, "{t:?} must be neutral");
        }
    }
}
