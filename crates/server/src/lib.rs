use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod audit;
mod entries;
mod expenses;
mod products;
mod reports;
mod server;
mod user;

pub mod types {
    pub mod entry {
        pub use api_types::entry::{
            EntryKind, EntryListParams, EntryListResponse, EntryNew, EntryView, LineItemNew,
            LineItemView, PaymentMode, PaymentNew, PaymentView, Status,
        };
    }

    pub mod product {
        pub use api_types::product::{
            ProductListParams, ProductListResponse, ProductNew, ProductUpdate, ProductView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListResponse, ExpenseMonthTotalView, ExpenseMonthlyResponse, ExpenseNew,
            ExpenseView,
        };
    }

    pub mod report {
        pub use api_types::report::{MonthRollupView, MonthlyParams, MonthlyResponse};
    }

    pub mod audit {
        pub use api_types::audit::{AuditEventView, AuditParams, AuditResponse};
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Forbidden(String),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::ExistingKey(_) | LedgerError::AlreadyCancelled(_) => StatusCode::CONFLICT,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidAmount(_)
        | LedgerError::InsufficientStock(_)
        | LedgerError::OverpaymentRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        // Storage details stay in the logs, never in the response body.
        LedgerError::Storage(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_not_found_maps_to_404() {
        let res = ServerError::from(LedgerError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ledger_already_cancelled_maps_to_409() {
        let res =
            ServerError::from(LedgerError::AlreadyCancelled("V-00001".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_existing_key_maps_to_409() {
        let res = ServerError::from(LedgerError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_validation_maps_to_422() {
        let res = ServerError::from(LedgerError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res =
            ServerError::from(LedgerError::InsufficientStock("rice".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res =
            ServerError::from(LedgerError::OverpaymentRejected("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = ServerError::Forbidden("admin only".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
