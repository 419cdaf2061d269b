//! Audit trail.
//!
//! Every ledger mutation appends one [`AuditEvent`] row in the same
//! database transaction as the mutation itself, so the trail can never
//! miss a committed change. Rows are append-only.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money};

/// Canonical action names recorded by the ledger.
pub mod actions {
    pub const SALE: &str = "sale";
    pub const PURCHASE: &str = "purchase";
    pub const PAYMENT: &str = "payment";
    pub const CANCEL: &str = "cancel";
    pub const EXPENSE: &str = "expense";
    pub const EXPENSE_REMOVED: &str = "expense_removed";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor: String,
    pub action: String,
    pub invoice_id: Option<String>,
    pub amount: Option<Money>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor: String,
        action: &str,
        invoice_id: Option<String>,
        amount: Option<Money>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor,
            action: action.to_string(),
            invoice_id,
            amount,
            recorded_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub actor: String,
    pub action: String,
    pub invoice_id: Option<String>,
    pub amount_minor: Option<i64>,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AuditEvent> for ActiveModel {
    fn from(event: &AuditEvent) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            actor: ActiveValue::Set(event.actor.clone()),
            action: ActiveValue::Set(event.action.clone()),
            invoice_id: ActiveValue::Set(event.invoice_id.clone()),
            amount_minor: ActiveValue::Set(event.amount.map(Money::cents)),
            recorded_at: ActiveValue::Set(event.recorded_at),
        }
    }
}

impl TryFrom<Model> for AuditEvent {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("audit event not exists".to_string()))?,
            actor: model.actor,
            action: model.action,
            invoice_id: model.invoice_id,
            amount: model.amount_minor.map(Money::new),
            recorded_at: model.recorded_at,
        })
    }
}
