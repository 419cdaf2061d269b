//! Product catalog primitives.
//!
//! A `Product` is a catalog item with its on-hand stock. Ledger entry
//! creation and cancellation are the only writers of `quantity`; the
//! catalog operations only touch descriptive fields and price.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier, generated once and persisted, so the product can
    /// be renamed without breaking line-item references.
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    /// Current list price. Line items snapshot the price at sale time, so
    /// changing this never rewrites history.
    pub unit_price: Money,
    /// On-hand stock. Never negative.
    pub quantity: i64,
    pub archived: bool,
}

impl Product {
    pub fn new(name: String, category: Option<String>, unit_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            category,
            unit_price,
            quantity: 0,
            archived: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub unit_price_minor: i64,
    pub quantity: i64,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        Self {
            id: ActiveValue::Set(product.id.to_string()),
            name: ActiveValue::Set(product.name.clone()),
            category: ActiveValue::Set(product.category.clone()),
            unit_price_minor: ActiveValue::Set(product.unit_price.cents()),
            quantity: ActiveValue::Set(product.quantity),
            archived: ActiveValue::Set(product.archived),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("product not exists".to_string()))?,
            name: model.name,
            category: model.category,
            unit_price: Money::new(model.unit_price_minor),
            quantity: model.quantity,
            archived: model.archived,
        })
    }
}
