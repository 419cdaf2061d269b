//! Ledger entry API endpoints: sales, purchases, payments, cancellation.

use api_types::entry::{
    EntryKind as ApiKind, EntryListParams, EntryListResponse, EntryNew, EntryView, LineItemView,
    PaymentMode as ApiMode, PaymentNew, PaymentView, Status as ApiStatus,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};
use ledger::{EntryFilter, LedgerError, Money, NewLineItem};

fn map_kind_in(kind: ApiKind) -> ledger::EntryKind {
    match kind {
        ApiKind::Sale => ledger::EntryKind::Sale,
        ApiKind::Purchase => ledger::EntryKind::Purchase,
    }
}

fn map_kind(kind: ledger::EntryKind) -> ApiKind {
    match kind {
        ledger::EntryKind::Sale => ApiKind::Sale,
        ledger::EntryKind::Purchase => ApiKind::Purchase,
    }
}

fn map_mode_in(mode: ApiMode) -> ledger::PaymentMode {
    match mode {
        ApiMode::Cash => ledger::PaymentMode::Cash,
        ApiMode::Credit => ledger::PaymentMode::Credit,
    }
}

fn map_mode(mode: ledger::PaymentMode) -> ApiMode {
    match mode {
        ledger::PaymentMode::Cash => ApiMode::Cash,
        ledger::PaymentMode::Credit => ApiMode::Credit,
    }
}

fn map_status(status: ledger::Status) -> ApiStatus {
    match status {
        ledger::Status::Open => ApiStatus::Open,
        ledger::Status::Settled => ApiStatus::Settled,
    }
}

fn map_currency(currency: ledger::Currency) -> api_types::Currency {
    match currency {
        ledger::Currency::Dop => api_types::Currency::Dop,
    }
}

pub(crate) fn entry_view(entry: ledger::LedgerEntry) -> Result<EntryView, ServerError> {
    let line_items = entry
        .line_items
        .iter()
        .map(|item| {
            let total = item.total().ok_or_else(|| {
                ServerError::Ledger(LedgerError::InvalidAmount("amount too large".to_string()))
            })?;
            Ok(LineItemView {
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_minor: item.unit_price.cents(),
                total_minor: total.cents(),
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;

    let payments = entry
        .payments
        .iter()
        .map(|payment| PaymentView {
            amount_minor: payment.amount.cents(),
            paid_at: payment.paid_at,
            actor: payment.actor.clone(),
        })
        .collect();

    Ok(EntryView {
        invoice_id: entry.invoice_id.clone(),
        kind: map_kind(entry.kind),
        counterparty: entry.counterparty.clone(),
        principal_minor: entry.principal.cents(),
        paid_minor: entry.paid.cents(),
        outstanding_minor: entry.outstanding().cents(),
        status: map_status(entry.status()),
        payment_mode: map_mode(entry.payment_mode),
        currency: map_currency(entry.currency),
        created_at: entry.created_at,
        last_payment_at: entry.last_payment_at,
        active: entry.active,
        line_items,
        payments,
    })
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let counterparty = payload.counterparty.trim();
    if counterparty.is_empty() {
        return Err(ServerError::Generic("counterparty is required".to_string()));
    }

    let items: Vec<NewLineItem> = payload
        .items
        .iter()
        .map(|item| NewLineItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price_minor.map(Money::new),
        })
        .collect();

    let entry = state
        .ledger
        .create_entry(
            map_kind_in(payload.kind),
            counterparty,
            &items,
            map_mode_in(payload.payment_mode),
            &user.username,
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry_view(entry)?)))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<EntryListParams>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let filter = EntryFilter {
        counterparty: params.counterparty,
        kind: params.kind.map(map_kind_in),
        status: params.status.map(|status| match status {
            ApiStatus::Open => ledger::Status::Open,
            ApiStatus::Settled => ledger::Status::Settled,
        }),
        include_cancelled: params.include_cancelled.unwrap_or(false),
    };

    let entries = state
        .ledger
        .list_entries(&filter)
        .await?
        .into_iter()
        .map(entry_view)
        .collect::<Result<Vec<_>, ServerError>>()?;
    let counterparties = state.ledger.counterparties().await?;

    Ok(Json(EntryListResponse {
        entries,
        counterparties,
    }))
}

pub async fn get_detail(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.ledger.entry(&invoice_id).await?;
    Ok(Json(entry_view(entry)?))
}

pub async fn payment_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(invoice_id): Path<String>,
    Json(payload): Json<PaymentNew>,
) -> Result<Json<EntryView>, ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can record payments".to_string(),
        ));
    }

    let entry = state
        .ledger
        .apply_payment(
            &invoice_id,
            Money::new(payload.amount_minor),
            &user.username,
            Utc::now(),
        )
        .await?;

    Ok(Json(entry_view(entry)?))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(invoice_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can cancel entries".to_string(),
        ));
    }

    state
        .ledger
        .cancel_entry(&invoice_id, &user.username, Utc::now())
        .await?;

    Ok(StatusCode::OK)
}
