//! Payment history.
//!
//! A [`Payment`] is one applied installment against a ledger entry. Rows
//! are append-only and never rewritten, so an entry's payment history is
//! fully reconstructable: `entry.paid == sum(payments.amount)`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: String,
    /// Amount actually applied (after clipping, if the clip policy is on).
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
    pub actor: String,
}

impl Payment {
    pub fn new(invoice_id: String, amount: Money, paid_at: DateTime<Utc>, actor: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            invoice_id,
            amount,
            paid_at,
            actor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_id: String,
    pub amount_minor: i64,
    pub paid_at: DateTimeUtc,
    pub actor: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::InvoiceId",
        to = "super::entries::Column::InvoiceId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            invoice_id: ActiveValue::Set(payment.invoice_id.clone()),
            amount_minor: ActiveValue::Set(payment.amount.cents()),
            paid_at: ActiveValue::Set(payment.paid_at),
            actor: ActiveValue::Set(payment.actor.clone()),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("payment not exists".to_string()))?,
            invoice_id: model.invoice_id,
            amount: Money::new(model.amount_minor),
            paid_at: model.paid_at,
            actor: model.actor,
        })
    }
}
