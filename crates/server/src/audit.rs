//! Audit trail endpoint (admin only).

use api_types::audit::{AuditEventView, AuditParams, AuditResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<AuditParams>,
) -> Result<Json<AuditResponse>, ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can read the audit trail".to_string(),
        ));
    }

    let limit = params.limit.unwrap_or(50);
    let events = state
        .ledger
        .audit_log(limit, params.actor.as_deref())
        .await?
        .into_iter()
        .map(|event| AuditEventView {
            actor: event.actor,
            action: event.action,
            invoice_id: event.invoice_id,
            amount_minor: event.amount.map(ledger::Money::cents),
            recorded_at: event.recorded_at,
        })
        .collect();

    Ok(Json(AuditResponse { events }))
}
