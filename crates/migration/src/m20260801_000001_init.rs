//! Initial schema migration - creates all tables from scratch.
//!
//! Ordered, idempotent (`if_not_exists`) and run once at startup; a failure
//! here is fatal to startup, never swallowed. The schema:
//!
//! - `users`: authentication and roles
//! - `products`: catalog items with on-hand stock
//! - `ledger_entries`: sales and supplier purchases, cash or credit
//! - `line_items`: per-entry product snapshots
//! - `payments`: append-only installment history
//! - `expenses`: operating expenses outside the purchase ledger
//! - `audit_log`: append-only trail of ledger mutations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Category,
    UnitPriceMinor,
    Quantity,
    Archived,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    InvoiceId,
    Kind,
    Counterparty,
    PrincipalMinor,
    PaidMinor,
    PaymentMode,
    Currency,
    CreatedAt,
    LastPaymentAt,
    Active,
    CreatedBy,
}

#[derive(Iden)]
enum LineItems {
    Table,
    Id,
    InvoiceId,
    ProductId,
    ProductName,
    Quantity,
    UnitPriceMinor,
    Position,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    InvoiceId,
    AmountMinor,
    PaidAt,
    Actor,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Description,
    Category,
    AmountMinor,
    SpentAt,
    RecordedBy,
}

#[derive(Iden)]
enum AuditLog {
    Table,
    Id,
    Actor,
    Action,
    InvoiceId,
    AmountMinor,
    RecordedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("employee"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Category).string())
                    .col(
                        ColumnDef::new(Products::UnitPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-name")
                    .table(Products::Table)
                    .col(Products::Name)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::InvoiceId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Counterparty)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::PrincipalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::PaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::PaymentMode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Currency)
                            .string()
                            .not_null()
                            .default("DOP"),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::LastPaymentAt).timestamp())
                    .col(ColumnDef::new(LedgerEntries::Active).boolean().not_null())
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-counterparty")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Counterparty)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-kind-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Kind)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Line items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LineItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LineItems::InvoiceId).string().not_null())
                    .col(ColumnDef::new(LineItems::ProductId).string().not_null())
                    .col(ColumnDef::new(LineItems::ProductName).string().not_null())
                    .col(ColumnDef::new(LineItems::Quantity).big_integer().not_null())
                    .col(
                        ColumnDef::new(LineItems::UnitPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LineItems::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-line_items-invoice_id")
                            .from(LineItems::Table, LineItems::InvoiceId)
                            .to(LedgerEntries::Table, LedgerEntries::InvoiceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-line_items-product_id")
                            .from(LineItems::Table, LineItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-line_items-invoice_id")
                    .table(LineItems::Table)
                    .col(LineItems::InvoiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-line_items-product_id")
                    .table(LineItems::Table)
                    .col(LineItems::ProductId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::InvoiceId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .col(ColumnDef::new(Payments::Actor).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-invoice_id")
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(LedgerEntries::Table, LedgerEntries::InvoiceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-invoice_id")
                    .table(Payments::Table)
                    .col(Payments::InvoiceId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::SpentAt).date().not_null())
                    .col(ColumnDef::new(Expenses::RecordedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-spent_at")
                    .table(Expenses::Table)
                    .col(Expenses::SpentAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Audit log
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLog::Actor).string().not_null())
                    .col(ColumnDef::new(AuditLog::Action).string().not_null())
                    .col(ColumnDef::new(AuditLog::InvoiceId).string())
                    .col(ColumnDef::new(AuditLog::AmountMinor).big_integer())
                    .col(ColumnDef::new(AuditLog::RecordedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-audit_log-recorded_at")
                    .table(AuditLog::Table)
                    .col(AuditLog::RecordedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-audit_log-actor")
                    .table(AuditLog::Table)
                    .col(AuditLog::Actor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
