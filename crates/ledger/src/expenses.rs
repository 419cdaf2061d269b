//! Operating expenses.
//!
//! An [`Expense`] is money the store spends outside the purchase ledger
//! (rent, electricity, repairs). Expenses have no stock effect and no
//! payment history; they are flat rows, hard-deleted on removal, with the
//! removal itself still leaving an audit event.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub category: Option<String>,
    pub amount: Money,
    /// Day the money was spent, as entered by the admin.
    pub spent_at: NaiveDate,
    pub recorded_by: String,
}

impl Expense {
    pub fn new(
        description: String,
        category: Option<String>,
        amount: Money,
        spent_at: NaiveDate,
        recorded_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            category,
            amount,
            spent_at,
            recorded_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub category: Option<String>,
    pub amount_minor: i64,
    pub spent_at: Date,
    pub recorded_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            spent_at: ActiveValue::Set(expense.spent_at),
            recorded_by: ActiveValue::Set(expense.recorded_by.clone()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("expense not exists".to_string()))?,
            description: model.description,
            category: model.category,
            amount: Money::new(model.amount_minor),
            spent_at: model.spent_at,
            recorded_by: model.recorded_by,
        })
    }
}
