//! Operating expense API endpoints. Admin only, like the audit trail.

use api_types::expense::{
    ExpenseListResponse, ExpenseMonthTotalView, ExpenseMonthlyResponse, ExpenseNew, ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use ledger::Money;

fn expense_view(expense: ledger::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        category: expense.category,
        amount_minor: expense.amount.cents(),
        spent_at: expense.spent_at,
        recorded_by: expense.recorded_by,
    }
}

fn require_admin(user: &user::Model) -> Result<(), ServerError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServerError::Forbidden(
            "only admins can manage expenses".to_string(),
        ))
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    require_admin(&user)?;

    let description = payload.description.trim();
    if description.is_empty() {
        return Err(ServerError::Generic(
            "expense description is required".to_string(),
        ));
    }

    let expense = state
        .ledger
        .new_expense(
            description,
            payload.category.as_deref(),
            Money::new(payload.amount_minor),
            &user.username,
            payload.spent_at,
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    require_admin(&user)?;

    let expenses = state
        .ledger
        .list_expenses()
        .await?
        .into_iter()
        .map(expense_view)
        .collect();

    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_admin(&user)?;

    state
        .ledger
        .delete_expense(id, &user.username, Utc::now())
        .await?;
    Ok(StatusCode::OK)
}

pub async fn monthly(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseMonthlyResponse>, ServerError> {
    require_admin(&user)?;

    let months = state
        .ledger
        .expense_summary()
        .await?
        .into_iter()
        .map(|total| ExpenseMonthTotalView {
            year: total.year,
            month: total.month,
            total_minor: total.total.cents(),
        })
        .collect();

    Ok(Json(ExpenseMonthlyResponse { months }))
}
