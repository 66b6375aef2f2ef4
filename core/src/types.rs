//! Shared identifier aliases and the closed domain enums.
//!
//! Enum values are persisted as their `as_str` form; `parse` is the single
//! place a caller-supplied string becomes a typed value, so an unrecognized
//! value is caught once, at the validation boundary.

use serde::{Deserialize, Serialize};

pub type AgencyId = i64;
pub type UserId = i64;
pub type ClientId = i64;
pub type ContractId = i64;
pub type TransactionId = i64;

/// The eight recognized transaction types. Sign semantics live in
/// `balance::signed_amount`, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Payment,
    Deposit,
    Withdrawal,
    Fee,
    Interest,
    Refund,
    Adjustment,
    Penalty,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "PAYMENT",
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Fee => "FEE",
            Self::Interest => "INTEREST",
            Self::Refund => "REFUND",
            Self::Adjustment => "ADJUSTMENT",
            Self::Penalty => "PENALTY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PAYMENT" => Some(Self::Payment),
            "DEPOSIT" => Some(Self::Deposit),
            "WITHDRAWAL" => Some(Self::Withdrawal),
            "FEE" => Some(Self::Fee),
            "INTEREST" => Some(Self::Interest),
            "REFUND" => Some(Self::Refund),
            "ADJUSTMENT" => Some(Self::Adjustment),
            "PENALTY" => Some(Self::Penalty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
    Failed,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
        }
    }
}

/// Home currency plus the two accepted foreign currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Xaf,
    Eur,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xaf => "XAF",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "XAF" => Some(Self::Xaf),
            "EUR" => Some(Self::Eur),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Draft,
    Active,
    Closed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "ACTIVE" => Some(Self::Active),
            "CLOSED" => Some(Self::Closed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Only open contracts accept new transactions.
    pub fn accepts_transactions(&self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Ceo,
    AgencyManager,
    AgencyStaff,
    Audit,
    Report,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ceo => "CEO",
            Self::AgencyManager => "AGENCY_MANAGER",
            Self::AgencyStaff => "AGENCY_STAFF",
            Self::Audit => "AUDIT",
            Self::Report => "REPORT",
        }
    }
}

/// The closed set of client-listing sort keys. Each maps to a fixed column
/// name at compile time — caller strings are never interpolated into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    FullName,
    NationalId,
    Email,
    RegistrationDate,
    Status,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::NationalId => "national_id",
            Self::Email => "email",
            Self::RegistrationDate => "registration_date",
            Self::Status => "status",
        }
    }

    /// Unrecognized input falls back to the name sort rather than failing.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "national_id" => Self::NationalId,
            "email" => Self::Email,
            "registration_date" => Self::RegistrationDate,
            "status" => Self::Status,
            _ => Self::FullName,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
