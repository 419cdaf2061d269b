use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{audit, entries, expenses, products, reports, user};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/entries", post(entries::create).get(entries::list))
        .route("/entries/{invoice_id}", get(entries::get_detail))
        .route("/entries/{invoice_id}/payments", post(entries::payment_new))
        .route("/entries/{invoice_id}/cancel", post(entries::cancel))
        .route("/products", post(products::create).get(products::list))
        .route(
            "/products/{id}",
            axum::routing::patch(products::update).delete(products::archive),
        )
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route("/expenses/monthly", get(expenses::monthly))
        .route("/expenses/{id}", axum::routing::delete(expenses::remove))
        .route("/reports/monthly", get(reports::monthly))
        .route("/audit", get(audit::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Build the full application router. Exposed so integration tests can
/// drive it without a TCP listener.
pub fn app(ledger: Ledger, db: DatabaseConnection) -> Router {
    router(ServerState {
        ledger: Arc::new(ledger),
        db,
    })
}

pub async fn run(ledger: Ledger, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(ledger, db)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
