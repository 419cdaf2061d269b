use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub use audit::{AuditEvent, actions};
pub use currency::Currency;
pub use entries::{EntryKind, LedgerEntry, PaymentMode, Status};
pub use error::LedgerError;
pub use expenses::Expense;
pub use line_items::LineItem;
pub use money::Money;
pub use payments::Payment;
pub use products::Product;
pub use reports::{ExpenseMonthTotal, MonthRollup, expense_totals, rollup};
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, prelude::*,
};

mod audit;
mod currency;
mod entries;
mod error;
mod expenses;
mod line_items;
mod money;
mod payments;
mod products;
mod reports;

type ResultLedger<T> = Result<T, LedgerError>;

/// What to do when a payment exceeds the outstanding balance.
///
/// The business rule is genuinely ambiguous (the store sometimes wants the
/// excess returned as change, sometimes refused), so it is a policy chosen
/// at construction, not a guess.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverpaymentPolicy {
    /// Reject the whole payment with [`LedgerError::OverpaymentRejected`].
    #[default]
    Reject,
    /// Apply only the outstanding balance; the excess is never recorded.
    Clip,
}

/// A line item request for [`Ledger::create_entry`].
///
/// `unit_price: None` means "use the current catalog price" (sales only);
/// purchases must state the unit cost explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Option<Money>,
}

/// Filters for [`Ledger::list_entries`].
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    pub counterparty: Option<String>,
    pub kind: Option<EntryKind>,
    pub status: Option<Status>,
    pub include_cancelled: bool,
}

/// The ledger store.
///
/// Holds the injected database handle (one per process) and the
/// overpayment policy. All mutating operations run as a single database
/// transaction: either the whole effect commits (entry + line items +
/// stock change + payment history + audit row) or none of it does.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    overpayment: OverpaymentPolicy,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    // ────────────────────────────────────────────────────────────────────
    // Product catalog
    // ────────────────────────────────────────────────────────────────────

    /// Add a new catalog product with zero initial stock.
    pub async fn new_product(
        &self,
        name: &str,
        category: Option<&str>,
        unit_price: Money,
    ) -> ResultLedger<Product> {
        if !unit_price.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "unit price must be > 0".to_string(),
            ));
        }
        let exists = products::Entity::find()
            .filter(products::Column::Name.eq(name))
            .filter(products::Column::Archived.eq(false))
            .one(&self.database)
            .await?;
        if exists.is_some() {
            return Err(LedgerError::ExistingKey(name.to_string()));
        }

        let product = Product::new(name.to_string(), category.map(|c| c.to_string()), unit_price);
        products::ActiveModel::from(&product)
            .insert(&self.database)
            .await?;
        Ok(product)
    }

    /// Return a product by id.
    pub async fn product(&self, product_id: Uuid) -> ResultLedger<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;
        Product::try_from(model)
    }

    /// List catalog products, name ascending.
    pub async fn list_products(&self, include_archived: bool) -> ResultLedger<Vec<Product>> {
        let mut query = products::Entity::find().order_by_asc(products::Column::Name);
        if !include_archived {
            query = query.filter(products::Column::Archived.eq(false));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Product::try_from).collect()
    }

    /// Update descriptive fields and price. Stock is owned by the ledger
    /// operations and cannot be set here.
    pub async fn update_product(
        &self,
        product_id: Uuid,
        name: &str,
        category: Option<&str>,
        unit_price: Money,
    ) -> ResultLedger<Product> {
        if !unit_price.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "unit price must be > 0".to_string(),
            ));
        }
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;

        let update = products::ActiveModel {
            id: ActiveValue::Set(model.id),
            name: ActiveValue::Set(name.to_string()),
            category: ActiveValue::Set(category.map(|c| c.to_string())),
            unit_price_minor: ActiveValue::Set(unit_price.cents()),
            ..Default::default()
        };
        let updated = update.update(&self.database).await?;
        Product::try_from(updated)
    }

    /// Archive a product (hidden from default listings; history intact).
    pub async fn archive_product(&self, product_id: Uuid) -> ResultLedger<()> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;
        let update = products::ActiveModel {
            id: ActiveValue::Set(model.id),
            archived: ActiveValue::Set(true),
            ..Default::default()
        };
        update.update(&self.database).await?;
        Ok(())
    }

    /// Increase on-hand stock outside an entry (inventory correction).
    pub async fn increment_stock(&self, product_id: Uuid, quantity: i64) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;
        adjust_stock(&db_tx, product_id, quantity).await?;
        db_tx.commit().await?;
        Ok(())
    }

    /// Decrease on-hand stock outside an entry (inventory correction).
    pub async fn decrement_stock(&self, product_id: Uuid, quantity: i64) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;
        adjust_stock(&db_tx, product_id, -quantity).await?;
        db_tx.commit().await?;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Ledger entries
    // ────────────────────────────────────────────────────────────────────

    /// Create a sale or purchase entry together with its stock effect.
    ///
    /// The insert, the line-item snapshot, the stock adjustment for every
    /// item and the audit row are one transaction: a stock failure on the
    /// third item rolls back the first two.
    pub async fn create_entry(
        &self,
        kind: EntryKind,
        counterparty: &str,
        items: &[NewLineItem],
        payment_mode: PaymentMode,
        actor: &str,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<LedgerEntry> {
        if items.is_empty() {
            return Err(LedgerError::InvalidAmount(
                "entry needs at least one line item".to_string(),
            ));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(LedgerError::InvalidAmount(
                    "line item quantity must be > 0".to_string(),
                ));
            }
        }

        let db_tx = self.database.begin().await?;

        let invoice_id = next_invoice_id(&db_tx, kind).await?;

        let overflow = || LedgerError::InvalidAmount("amount too large".to_string());
        let mut principal = Money::ZERO;
        let mut snapshot: Vec<LineItem> = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let product = products::Entity::find_by_id(item.product_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;

            let unit_price = match (kind, item.unit_price) {
                (_, Some(price)) => price,
                (EntryKind::Sale, None) => Money::new(product.unit_price_minor),
                (EntryKind::Purchase, None) => {
                    return Err(LedgerError::InvalidAmount(
                        "unit cost is required for purchases".to_string(),
                    ));
                }
            };
            if !unit_price.is_positive() {
                return Err(LedgerError::InvalidAmount(
                    "unit price must be > 0".to_string(),
                ));
            }

            let delta = match kind {
                EntryKind::Sale => -item.quantity,
                EntryKind::Purchase => item.quantity,
            };
            apply_stock_delta(&db_tx, &product, delta).await?;

            let total = unit_price
                .checked_mul_qty(item.quantity)
                .ok_or_else(overflow)?;
            principal = principal.checked_add(total).ok_or_else(overflow)?;

            snapshot.push(LineItem::new(
                invoice_id.clone(),
                item.product_id,
                product.name,
                item.quantity,
                unit_price,
                position as i32,
            ));
        }

        let mut entry = LedgerEntry::new(
            invoice_id.clone(),
            kind,
            counterparty.to_string(),
            principal,
            payment_mode,
            actor.to_string(),
            occurred_at,
        )?;

        entries::ActiveModel::from(&entry).insert(&db_tx).await?;
        for item in &snapshot {
            line_items::ActiveModel::from(item).insert(&db_tx).await?;
        }

        // Cash entries settle immediately; record the payment so the
        // history still reconstructs `paid`.
        if payment_mode == PaymentMode::Cash {
            let payment =
                Payment::new(invoice_id.clone(), principal, occurred_at, actor.to_string());
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;
            entry.payments.push(payment);
        }

        let action = match kind {
            EntryKind::Sale => actions::SALE,
            EntryKind::Purchase => actions::PURCHASE,
        };
        record_audit(&db_tx, actor, action, Some(&invoice_id), Some(principal), occurred_at)
            .await?;

        db_tx.commit().await?;

        entry.line_items = snapshot;
        Ok(entry)
    }

    /// Apply a partial payment to an active entry.
    ///
    /// Overpayments follow the configured [`OverpaymentPolicy`]; a payment
    /// against a settled entry is rejected under either policy.
    pub async fn apply_payment(
        &self,
        invoice_id: &str,
        amount: Money,
        actor: &str,
        paid_at: DateTime<Utc>,
    ) -> ResultLedger<LedgerEntry> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let model = entries::Entity::find_by_id(invoice_id.to_string())
            .filter(entries::Column::Active.eq(true))
            .one(&db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound("entry not exists".to_string()))?;
        let entry = LedgerEntry::try_from(model)?;

        let outstanding = entry.outstanding();
        if outstanding.is_zero() {
            return Err(LedgerError::OverpaymentRejected(
                "entry already settled, no outstanding balance".to_string(),
            ));
        }

        let applied = if amount > outstanding {
            match self.overpayment {
                OverpaymentPolicy::Reject => {
                    return Err(LedgerError::OverpaymentRejected(format!(
                        "payment {amount} exceeds outstanding {outstanding}"
                    )));
                }
                OverpaymentPolicy::Clip => outstanding,
            }
        } else {
            amount
        };

        let new_paid = entry.paid.checked_add(applied).ok_or_else(|| {
            LedgerError::InvalidAmount("amount too large".to_string())
        })?;

        let update = entries::ActiveModel {
            invoice_id: ActiveValue::Set(entry.invoice_id.clone()),
            paid_minor: ActiveValue::Set(new_paid.cents()),
            last_payment_at: ActiveValue::Set(Some(paid_at)),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        let payment = Payment::new(entry.invoice_id.clone(), applied, paid_at, actor.to_string());
        payments::ActiveModel::from(&payment).insert(&db_tx).await?;

        record_audit(
            &db_tx,
            actor,
            actions::PAYMENT,
            Some(&entry.invoice_id),
            Some(applied),
            paid_at,
        )
        .await?;

        db_tx.commit().await?;

        self.entry(invoice_id).await
    }

    /// Cancel an entry (soft delete) and undo its stock effect.
    ///
    /// Cancelling twice is an error, not a silent success: a second call
    /// would otherwise restore stock a second time. `paid`/`principal`
    /// stay as they were, for audit.
    pub async fn cancel_entry(
        &self,
        invoice_id: &str,
        actor: &str,
        cancelled_at: DateTime<Utc>,
    ) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;

        let model = entries::Entity::find_by_id(invoice_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound("entry not exists".to_string()))?;
        if !model.active {
            return Err(LedgerError::AlreadyCancelled(invoice_id.to_string()));
        }
        let entry = LedgerEntry::try_from(model)?;

        let item_models = line_items::Entity::find()
            .filter(line_items::Column::InvoiceId.eq(invoice_id))
            .all(&db_tx)
            .await?;

        for item_model in item_models {
            let item = LineItem::try_from(item_model)?;
            let product = products::Entity::find_by_id(item.product_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;
            let delta = match entry.kind {
                // A cancelled sale returns goods to the shelf; a cancelled
                // purchase sends received goods back to the supplier.
                EntryKind::Sale => item.quantity,
                EntryKind::Purchase => -item.quantity,
            };
            apply_stock_delta(&db_tx, &product, delta).await?;
        }

        let update = entries::ActiveModel {
            invoice_id: ActiveValue::Set(entry.invoice_id.clone()),
            active: ActiveValue::Set(false),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        record_audit(
            &db_tx,
            actor,
            actions::CANCEL,
            Some(&entry.invoice_id),
            None,
            cancelled_at,
        )
        .await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Return an entry with its line items and full payment history.
    pub async fn entry(&self, invoice_id: &str) -> ResultLedger<LedgerEntry> {
        let model = entries::Entity::find_by_id(invoice_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("entry not exists".to_string()))?;
        let mut entry = LedgerEntry::try_from(model)?;

        let item_models = line_items::Entity::find()
            .filter(line_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(line_items::Column::Position)
            .all(&self.database)
            .await?;
        entry.line_items = item_models
            .into_iter()
            .map(LineItem::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;

        let payment_models = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payments::Column::PaidAt)
            .all(&self.database)
            .await?;
        entry.payments = payment_models
            .into_iter()
            .map(Payment::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;

        Ok(entry)
    }

    /// List entry headers (no line items or payments), newest first.
    pub async fn list_entries(&self, filter: &EntryFilter) -> ResultLedger<Vec<LedgerEntry>> {
        let mut query = entries::Entity::find().order_by_desc(entries::Column::CreatedAt);
        if let Some(counterparty) = &filter.counterparty {
            query = query.filter(entries::Column::Counterparty.eq(counterparty.clone()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(entries::Column::Kind.eq(kind.as_str()));
        }
        if !filter.include_cancelled {
            query = query.filter(entries::Column::Active.eq(true));
        }

        let models = query.all(&self.database).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let entry = LedgerEntry::try_from(model)?;
            if let Some(status) = filter.status
                && entry.status() != status
            {
                continue;
            }
            out.push(entry);
        }
        Ok(out)
    }

    /// Distinct counterparty names, ascending (filter dropdowns).
    pub async fn counterparties(&self) -> ResultLedger<Vec<String>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_string(
            backend,
            "SELECT DISTINCT counterparty FROM ledger_entries ORDER BY counterparty",
        );
        let rows = self.database.query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.try_get("", "counterparty")?);
        }
        Ok(out)
    }

    // ────────────────────────────────────────────────────────────────────
    // Reporting
    // ────────────────────────────────────────────────────────────────────

    /// Monthly rollups for `[start, end]`, ascending, one per calendar
    /// month. Pure read; see [`rollup`] for the aggregation rules.
    pub async fn monthly_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultLedger<Vec<MonthRollup>> {
        if end < start {
            return Ok(Vec::new());
        }

        // Purchases before the window still matter: they carry the cost
        // basis of later sales. Fetch everything up to the window's end.
        let end_exclusive = end
            .succ_opt()
            .unwrap_or(end)
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc());

        let mut query = entries::Entity::find().filter(entries::Column::Active.eq(true));
        if let Some(end_exclusive) = end_exclusive {
            query = query.filter(entries::Column::CreatedAt.lt(end_exclusive));
        }
        let models = query.all(&self.database).await?;

        let invoice_ids: Vec<String> = models.iter().map(|m| m.invoice_id.clone()).collect();
        let item_models = line_items::Entity::find()
            .filter(line_items::Column::InvoiceId.is_in(invoice_ids))
            .order_by_asc(line_items::Column::Position)
            .all(&self.database)
            .await?;

        let mut entries_by_id: Vec<LedgerEntry> = models
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;
        for item_model in item_models {
            let item = LineItem::try_from(item_model)?;
            if let Some(entry) = entries_by_id
                .iter_mut()
                .find(|e| e.invoice_id == item.invoice_id)
            {
                entry.line_items.push(item);
            }
        }

        Ok(reports::rollup(start, end, &entries_by_id))
    }

    // ────────────────────────────────────────────────────────────────────
    // Operating expenses
    // ────────────────────────────────────────────────────────────────────

    /// Record an operating expense (rent, electricity, repairs). No stock
    /// effect; the audit row lands in the same transaction.
    pub async fn new_expense(
        &self,
        description: &str,
        category: Option<&str>,
        amount: Money,
        actor: &str,
        spent_at: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> ResultLedger<Expense> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }

        let expense = Expense::new(
            description.to_string(),
            category.map(|c| c.to_string()),
            amount,
            spent_at,
            actor.to_string(),
        );

        let db_tx = self.database.begin().await?;
        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
        record_audit(&db_tx, actor, actions::EXPENSE, None, Some(amount), recorded_at).await?;
        db_tx.commit().await?;

        Ok(expense)
    }

    /// List expenses, most recent spend date first.
    pub async fn list_expenses(&self) -> ResultLedger<Vec<Expense>> {
        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::SpentAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    /// Remove an expense. Unlike ledger entries there is no history to
    /// preserve, so the row is deleted outright; the removal itself is
    /// still audited.
    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        actor: &str,
        recorded_at: DateTime<Utc>,
    ) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;

        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))?;
        let expense = Expense::try_from(model)?;

        expenses::Entity::delete_by_id(expense.id.to_string())
            .exec(&db_tx)
            .await?;
        record_audit(
            &db_tx,
            actor,
            actions::EXPENSE_REMOVED,
            None,
            Some(expense.amount),
            recorded_at,
        )
        .await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Per-month expense totals, newest month first.
    pub async fn expense_summary(&self) -> ResultLedger<Vec<ExpenseMonthTotal>> {
        let expenses = self.list_expenses().await?;
        Ok(reports::expense_totals(&expenses))
    }

    // ────────────────────────────────────────────────────────────────────
    // Audit
    // ────────────────────────────────────────────────────────────────────

    /// Recent audit events, newest first, optionally filtered by actor.
    pub async fn audit_log(
        &self,
        limit: u64,
        actor: Option<&str>,
    ) -> ResultLedger<Vec<AuditEvent>> {
        let mut query = audit::Entity::find()
            .order_by_desc(audit::Column::RecordedAt)
            .limit(limit);
        if let Some(actor) = actor {
            query = query.filter(audit::Column::Actor.eq(actor));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(AuditEvent::try_from).collect()
    }
}

/// Allocate the next sequential invoice id for `kind` inside the open
/// transaction. Entries are never physically deleted, so the row count is
/// a stable sequence; a concurrent duplicate fails on the primary key and
/// rolls back.
async fn next_invoice_id<C: ConnectionTrait>(conn: &C, kind: EntryKind) -> ResultLedger<String> {
    let count = entries::Entity::find()
        .filter(entries::Column::Kind.eq(kind.as_str()))
        .count(conn)
        .await?;
    Ok(format!("{}-{:05}", kind.invoice_prefix(), count + 1))
}

/// Apply a signed stock change to a product row, rejecting negatives.
async fn apply_stock_delta<C: ConnectionTrait>(
    conn: &C,
    product: &products::Model,
    delta: i64,
) -> ResultLedger<()> {
    let new_quantity = product
        .quantity
        .checked_add(delta)
        .ok_or_else(|| LedgerError::InvalidAmount("quantity too large".to_string()))?;
    if new_quantity < 0 {
        return Err(LedgerError::InsufficientStock(product.name.clone()));
    }
    let update = products::ActiveModel {
        id: ActiveValue::Set(product.id.clone()),
        quantity: ActiveValue::Set(new_quantity),
        ..Default::default()
    };
    update.update(conn).await?;
    Ok(())
}

async fn adjust_stock(
    conn: &sea_orm::DatabaseTransaction,
    product_id: Uuid,
    delta: i64,
) -> ResultLedger<()> {
    let product = products::Entity::find_by_id(product_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("product not exists".to_string()))?;
    apply_stock_delta(conn, &product, delta).await
}

async fn record_audit<C: ConnectionTrait>(
    conn: &C,
    actor: &str,
    action: &str,
    invoice_id: Option<&str>,
    amount: Option<Money>,
    recorded_at: DateTime<Utc>,
) -> ResultLedger<()> {
    let event = AuditEvent::new(
        actor.to_string(),
        action,
        invoice_id.map(|id| id.to_string()),
        amount,
        recorded_at,
    );
    audit::ActiveModel::from(&event).insert(conn).await?;
    Ok(())
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    overpayment: OverpaymentPolicy,
}

impl LedgerBuilder {
    /// Pass the required database handle.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Choose the overpayment policy (default: reject).
    pub fn overpayment(mut self, policy: OverpaymentPolicy) -> LedgerBuilder {
        self.overpayment = policy;
        self
    }

    /// Construct the `Ledger`.
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
            overpayment: self.overpayment,
        }
    }
}
