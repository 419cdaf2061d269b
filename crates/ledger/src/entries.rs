//! Ledger entry primitives.
//!
//! A `LedgerEntry` is a record of money owed: a sale (customer owes the
//! store) or a supplier purchase (the store owes the supplier). Cash
//! entries are created already settled so both sale types land in one
//! reporting view. `outstanding` and `status` are derived, never stored,
//! so they cannot drift from `principal`/`paid`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, LedgerError, Money, ResultLedger};

use super::{line_items, payments};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Goods leave stock, the counterparty is a customer.
    Sale,
    /// Goods enter stock, the counterparty is a supplier.
    Purchase,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
        }
    }

    /// Invoice number prefix (`V-00001` for sales, `C-00001` for purchases).
    pub fn invoice_prefix(self) -> &'static str {
        match self {
            Self::Sale => "V",
            Self::Purchase => "C",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sale" => Ok(Self::Sale),
            "purchase" => Ok(Self::Purchase),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Credit,
}

impl PaymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for PaymentMode {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "credit" => Ok(Self::Credit),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid payment mode: {other}"
            ))),
        }
    }
}

/// Derived settlement state. Never persisted as an independent column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    Settled,
}

impl Status {
    /// Status is a pure function of the outstanding balance.
    pub fn from_outstanding(outstanding: Money) -> Self {
        if outstanding.is_zero() {
            Self::Settled
        } else {
            Self::Open
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub invoice_id: String,
    pub kind: EntryKind,
    pub counterparty: String,
    /// Original amount owed; immutable after creation.
    pub principal: Money,
    /// Cumulative amount paid; monotonically non-decreasing.
    pub paid: Money,
    pub payment_mode: PaymentMode,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub last_payment_at: Option<DateTime<Utc>>,
    /// `false` means cancelled (soft-deleted); stock has been restored.
    pub active: bool,
    pub created_by: String,
    /// Immutable snapshot taken at creation time, independent of later
    /// product price changes.
    pub line_items: Vec<line_items::LineItem>,
    /// Append-only payment history, oldest first.
    pub payments: Vec<payments::Payment>,
}

impl LedgerEntry {
    pub fn new(
        invoice_id: String,
        kind: EntryKind,
        counterparty: String,
        principal: Money,
        payment_mode: PaymentMode,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultLedger<Self> {
        if !principal.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "principal must be > 0".to_string(),
            ));
        }
        let paid = match payment_mode {
            PaymentMode::Cash => principal,
            PaymentMode::Credit => Money::ZERO,
        };
        let last_payment_at = match payment_mode {
            PaymentMode::Cash => Some(created_at),
            PaymentMode::Credit => None,
        };
        Ok(Self {
            invoice_id,
            kind,
            counterparty,
            principal,
            paid,
            payment_mode,
            currency: Currency::default(),
            created_at,
            last_payment_at,
            active: true,
            created_by,
            line_items: Vec::new(),
            payments: Vec::new(),
        })
    }

    /// Amount still owed, recomputed from the invariant
    /// `outstanding = principal - paid`.
    pub fn outstanding(&self) -> Money {
        self.principal - self.paid
    }

    /// Settlement state, derived from the outstanding balance.
    pub fn status(&self) -> Status {
        Status::from_outstanding(self.outstanding())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub invoice_id: String,
    pub kind: String,
    pub counterparty: String,
    pub principal_minor: i64,
    pub paid_minor: i64,
    pub payment_mode: String,
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub last_payment_at: Option<DateTimeUtc>,
    pub active: bool,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            invoice_id: ActiveValue::Set(entry.invoice_id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            counterparty: ActiveValue::Set(entry.counterparty.clone()),
            principal_minor: ActiveValue::Set(entry.principal.cents()),
            paid_minor: ActiveValue::Set(entry.paid.cents()),
            payment_mode: ActiveValue::Set(entry.payment_mode.as_str().to_string()),
            currency: ActiveValue::Set(entry.currency.code().to_string()),
            created_at: ActiveValue::Set(entry.created_at),
            last_payment_at: ActiveValue::Set(entry.last_payment_at),
            active: ActiveValue::Set(entry.active),
            created_by: ActiveValue::Set(entry.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            invoice_id: model.invoice_id,
            kind: EntryKind::try_from(model.kind.as_str())?,
            counterparty: model.counterparty,
            principal: Money::new(model.principal_minor),
            paid: Money::new(model.paid_minor),
            payment_mode: PaymentMode::try_from(model.payment_mode.as_str())?,
            currency: Currency::try_from(model.currency.as_str())?,
            created_at: model.created_at,
            last_payment_at: model.last_payment_at,
            active: model.active,
            created_by: model.created_by,
            line_items: Vec::new(),
            payments: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_entry_is_settled_at_creation() {
        let entry = LedgerEntry::new(
            "V-00001".to_string(),
            EntryKind::Sale,
            "Ana".to_string(),
            Money::new(8000),
            PaymentMode::Cash,
            "admin".to_string(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(entry.paid, Money::new(8000));
        assert_eq!(entry.outstanding(), Money::ZERO);
        assert_eq!(entry.status(), Status::Settled);
        assert!(entry.last_payment_at.is_some());
    }

    #[test]
    fn credit_entry_starts_open_and_unpaid() {
        let entry = LedgerEntry::new(
            "V-00002".to_string(),
            EntryKind::Sale,
            "Ana".to_string(),
            Money::new(15000),
            PaymentMode::Credit,
            "admin".to_string(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(entry.paid, Money::ZERO);
        assert_eq!(entry.outstanding(), Money::new(15000));
        assert_eq!(entry.status(), Status::Open);
        assert!(entry.last_payment_at.is_none());
    }

    #[test]
    fn unknown_stored_currency_is_an_error_not_a_default() {
        let model = Model {
            invoice_id: "V-00001".to_string(),
            kind: "sale".to_string(),
            counterparty: "Ana".to_string(),
            principal_minor: 1000,
            paid_minor: 0,
            payment_mode: "credit".to_string(),
            currency: "XXX".to_string(),
            created_at: Utc::now(),
            last_payment_at: None,
            active: true,
            created_by: "admin".to_string(),
        };

        let err = LedgerEntry::try_from(model).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidAmount("unsupported currency: XXX".to_string())
        );
    }

    #[test]
    fn zero_principal_is_rejected() {
        let err = LedgerEntry::new(
            "V-00003".to_string(),
            EntryKind::Sale,
            "Ana".to_string(),
            Money::ZERO,
            PaymentMode::Credit,
            "admin".to_string(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidAmount("principal must be > 0".to_string())
        );
    }
}
