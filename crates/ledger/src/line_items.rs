//! Line items.
//!
//! A [`LineItem`] is one (product, quantity, unit price) row of a
//! [`LedgerEntry`](crate::LedgerEntry). Items are snapshotted at entry
//! creation: the product name and unit price are copied so that later
//! catalog edits never rewrite invoice history.
//!
//! For sales the unit price is the selling price; for supplier purchases it
//! is the unit **cost**, which the reporting aggregator uses as the cost
//! basis for goods sold afterwards.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub invoice_id: String,
    pub product_id: Uuid,
    /// Product name at entry time.
    pub product_name: String,
    pub quantity: i64,
    /// Unit price (sale) or unit cost (purchase) at entry time.
    pub unit_price: Money,
    /// Order within the invoice, 0-based.
    pub position: i32,
}

impl LineItem {
    pub fn new(
        invoice_id: String,
        product_id: Uuid,
        product_name: String,
        quantity: i64,
        unit_price: Money,
        position: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            invoice_id,
            product_id,
            product_name,
            quantity,
            unit_price,
            position,
        }
    }

    /// Extended amount for the row.
    pub fn total(&self) -> Option<Money> {
        self.unit_price.checked_mul_qty(self.quantity)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_minor: i64,
    pub position: i32,
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
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Products,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LineItem> for ActiveModel {
    fn from(item: &LineItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            invoice_id: ActiveValue::Set(item.invoice_id.clone()),
            product_id: ActiveValue::Set(item.product_id.to_string()),
            product_name: ActiveValue::Set(item.product_name.clone()),
            quantity: ActiveValue::Set(item.quantity),
            unit_price_minor: ActiveValue::Set(item.unit_price.cents()),
            position: ActiveValue::Set(item.position),
        }
    }
}

impl TryFrom<Model> for LineItem {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("line item not exists".to_string()))?,
            invoice_id: model.invoice_id,
            product_id: Uuid::parse_str(&model.product_id)
                .map_err(|_| LedgerError::NotFound("product not exists".to_string()))?,
            product_name: model.product_name,
            quantity: model.quantity,
            unit_price: Money::new(model.unit_price_minor),
            position: model.position,
        })
    }
}
