//! The precondition chain run before any ledger mutation.
//!
//! RULE: Expected business-rule violations are values, not errors.
//! A failed check produces a `Rejection`; `LedgerError` is reserved for
//! storage and serialization faults. Checks run in a fixed order and stop
//! at the first violation; nothing is written until all of them pass.

use crate::{
    error::LedgerResult,
    store::Db,
    types::{AgencyId, ContractId, ContractStatus, Currency, TransactionType, UserId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a check chain: the validated value, or the first violation.
pub type Checked<T> = Result<T, Rejection>;

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    MissingField(&'static str),
    ContractNotFound(ContractId),
    ContractNotOpen {
        contract_id: ContractId,
        status: ContractStatus,
    },
    AgencyMismatch {
        contract_agency: AgencyId,
        stated_agency: AgencyId,
    },
    AgencyNotFound(AgencyId),
    AgencyInactive(AgencyId),
    UserNotFound(UserId),
    UserInactive(UserId),
    UnknownTransactionType(String),
    UnknownCurrency(String),
    InvalidEmail(String),
    DuplicateNationalId(String),
    DuplicateEmail(String),
    InsufficientBalance {
        requested: f64,
        available: f64,
    },
    DeadlineExceeded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => {
                write!(f, "Missing or empty required field: {field}")
            }
            Self::ContractNotFound(id) => write!(f, "Contract {id} not found"),
            Self::ContractNotOpen {
                contract_id,
                status,
            } => write!(
                f,
                "Contract {contract_id} is {} and no longer accepts transactions",
                status.as_str()
            ),
            Self::AgencyMismatch {
                contract_agency,
                stated_agency,
            } => write!(
                f,
                "Contract belongs to agency {contract_agency}, not agency {stated_agency}"
            ),
            Self::AgencyNotFound(id) => write!(f, "Agency {id} not found"),
            Self::AgencyInactive(id) => write!(f, "Agency {id} is inactive"),
            Self::UserNotFound(id) => write!(f, "User {id} not found"),
            Self::UserInactive(id) => write!(f, "User {id} is inactive"),
            Self::UnknownTransactionType(t) => {
                write!(f, "Unknown transaction type '{t}'")
            }
            Self::UnknownCurrency(c) => write!(f, "Unknown currency '{c}'"),
            Self::InvalidEmail(e) => write!(f, "Invalid email address '{e}'"),
            Self::DuplicateNationalId(n) => {
                write!(f, "A client with national id '{n}' already exists")
            }
            Self::DuplicateEmail(e) => {
                write!(f, "A client with email '{e}' already exists")
            }
            Self::InsufficientBalance {
                requested,
                available,
            } => write!(
                f,
                "Insufficient balance: requested {requested:.2}, available {available:.2}"
            ),
            Self::DeadlineExceeded => write!(f, "Deadline exceeded before commit"),
        }
    }
}

/// A transaction request exactly as the caller hands it over. Enum-valued
/// fields are plain strings here; turning them into typed values is check
/// 8/9's job, so an unrecognized value is a rejection, not a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub contract_id: Option<ContractId>,
    pub txn_type: String,
    pub amount: f64,
    pub agency_id: Option<AgencyId>,
    pub performed_by: Option<UserId>,
    #[serde(default)]
    pub verified_by: Option<UserId>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the configured home currency when absent.
    #[serde(default)]
    pub currency: Option<String>,
}

/// A request that has passed every check, with enums parsed and the
/// contract's pre-write status captured for the activation side effect.
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    pub contract_id: ContractId,
    pub agency_id: AgencyId,
    pub txn_type: TransactionType,
    pub amount: f64,
    pub currency: Currency,
    pub performed_by: UserId,
    pub verified_by: Option<UserId>,
    pub description: Option<String>,
    pub contract_status: ContractStatus,
}

/// Run the full chain against the given store view. Called by the recorder
/// with its write transaction's view, so every read here sees the same
/// snapshot the insert will commit against.
pub fn validate(
    db: Db<'_>,
    req: &TransactionRequest,
    default_currency: &str,
) -> LedgerResult<Checked<ValidatedTransaction>> {
    // 1. Required fields.
    let contract_id = match req.contract_id {
        Some(id) => id,
        None => return Ok(Err(Rejection::MissingField("contract_id"))),
    };
    if req.txn_type.trim().is_empty() {
        return Ok(Err(Rejection::MissingField("type")));
    }
    if req.amount <= 0.0 {
        return Ok(Err(Rejection::MissingField("amount")));
    }
    let agency_id = match req.agency_id {
        Some(id) => id,
        None => return Ok(Err(Rejection::MissingField("agency_id"))),
    };
    let performed_by = match req.performed_by {
        Some(id) => id,
        None => return Ok(Err(Rejection::MissingField("performed_by"))),
    };

    // 2. Contract exists.
    let contract = match db.contract(contract_id)? {
        Some(c) => c,
        None => return Ok(Err(Rejection::ContractNotFound(contract_id))),
    };

    // 3. Contract still accepts transactions.
    if !contract.status.accepts_transactions() {
        return Ok(Err(Rejection::ContractNotOpen {
            contract_id,
            status: contract.status,
        }));
    }

    // 4. Stated agency matches the contract's.
    if contract.agency_id != agency_id {
        return Ok(Err(Rejection::AgencyMismatch {
            contract_agency: contract.agency_id,
            stated_agency: agency_id,
        }));
    }

    // 5. Agency exists and is active.
    match db.agency(agency_id)? {
        None => return Ok(Err(Rejection::AgencyNotFound(agency_id))),
        Some(a) if !a.active => return Ok(Err(Rejection::AgencyInactive(agency_id))),
        Some(_) => {}
    }

    // 6. Performing user exists and is active.
    match db.user(performed_by)? {
        None => return Ok(Err(Rejection::UserNotFound(performed_by))),
        Some(u) if !u.active => return Ok(Err(Rejection::UserInactive(performed_by))),
        Some(_) => {}
    }

    // 7. Verifying user, when supplied.
    if let Some(verifier) = req.verified_by {
        match db.user(verifier)? {
            None => return Ok(Err(Rejection::UserNotFound(verifier))),
            Some(u) if !u.active => return Ok(Err(Rejection::UserInactive(verifier))),
            Some(_) => {}
        }
    }

    // 8. Transaction type is one of the eight recognized values.
    let txn_type = match TransactionType::parse(req.txn_type.trim()) {
        Some(t) => t,
        None => {
            return Ok(Err(Rejection::UnknownTransactionType(
                req.txn_type.trim().to_string(),
            )))
        }
    };

    // 9. Currency is recognized (home currency when unspecified).
    let currency_str = match req.currency.as_deref() {
        Some(c) if !c.trim().is_empty() => c.trim(),
        _ => default_currency,
    };
    let currency = match Currency::parse(currency_str) {
        Some(c) => c,
        None => return Ok(Err(Rejection::UnknownCurrency(currency_str.to_string()))),
    };

    Ok(Ok(ValidatedTransaction {
        contract_id,
        agency_id,
        txn_type,
        amount: req.amount,
        currency,
        performed_by,
        verified_by: req.verified_by,
        description: req.description.clone(),
        contract_status: contract.status,
    }))
}
