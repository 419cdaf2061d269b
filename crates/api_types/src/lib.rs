use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Dop,
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        pub category: Option<String>,
        pub unit_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub name: String,
        pub category: Option<String>,
        pub unit_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: Uuid,
        pub name: String,
        pub category: Option<String>,
        pub unit_price_minor: i64,
        pub quantity: i64,
        pub archived: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductListParams {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductListResponse {
        pub products: Vec<ProductView>,
    }
}

pub mod entry {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Sale,
        Purchase,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMode {
        Cash,
        Credit,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Status {
        Open,
        Settled,
    }

    /// One requested line item. `unit_price_minor: None` means "use the
    /// current catalog price" (sales only).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineItemNew {
        pub product_id: Uuid,
        pub quantity: i64,
        pub unit_price_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub kind: EntryKind,
        pub counterparty: String,
        pub payment_mode: PaymentMode,
        pub items: Vec<LineItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineItemView {
        pub product_id: Uuid,
        pub product_name: String,
        pub quantity: i64,
        pub unit_price_minor: i64,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub amount_minor: i64,
        pub paid_at: DateTime<Utc>,
        pub actor: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub invoice_id: String,
        pub kind: EntryKind,
        pub counterparty: String,
        pub principal_minor: i64,
        pub paid_minor: i64,
        pub outstanding_minor: i64,
        pub status: Status,
        pub payment_mode: PaymentMode,
        pub currency: Currency,
        pub created_at: DateTime<Utc>,
        pub last_payment_at: Option<DateTime<Utc>>,
        pub active: bool,
        pub line_items: Vec<LineItemView>,
        pub payments: Vec<PaymentView>,
    }

    /// Query-string filters for the entry listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryListParams {
        pub counterparty: Option<String>,
        pub kind: Option<EntryKind>,
        pub status: Option<Status>,
        pub include_cancelled: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
        pub counterparties: Vec<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub category: Option<String>,
        pub amount_minor: i64,
        pub spent_at: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub category: Option<String>,
        pub amount_minor: i64,
        pub spent_at: NaiveDate,
        pub recorded_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseMonthTotalView {
        pub year: i32,
        pub month: u32,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseMonthlyResponse {
        pub months: Vec<ExpenseMonthTotalView>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyParams {
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthRollupView {
        pub year: i32,
        pub month: u32,
        pub investment_cash_minor: i64,
        pub investment_credit_minor: i64,
        pub revenue_cash_minor: i64,
        pub revenue_credit_minor: i64,
        pub items_sold: i64,
        pub cost_of_goods_sold_minor: i64,
        pub profit_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyResponse {
        pub months: Vec<MonthRollupView>,
    }
}

pub mod audit {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AuditParams {
        pub limit: Option<u64>,
        pub actor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditEventView {
        pub actor: String,
        pub action: String,
        pub invoice_id: Option<String>,
        pub amount_minor: Option<i64>,
        pub recorded_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditResponse {
        pub events: Vec<AuditEventView>,
    }
}
