//! Product catalog API endpoints.

use api_types::product::{
    ProductListParams, ProductListResponse, ProductNew, ProductUpdate, ProductView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use ledger::Money;

fn product_view(product: ledger::Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        category: product.category,
        unit_price_minor: product.unit_price.cents(),
        quantity: product.quantity,
        archived: product.archived,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can edit the catalog".to_string(),
        ));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ServerError::Generic("product name is required".to_string()));
    }

    let product = state
        .ledger
        .new_product(
            name,
            payload.category.as_deref(),
            Money::new(payload.unit_price_minor),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product_view(product))))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductListResponse>, ServerError> {
    let products = state
        .ledger
        .list_products(params.include_archived.unwrap_or(false))
        .await?
        .into_iter()
        .map(product_view)
        .collect();

    Ok(Json(ProductListResponse { products }))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<ProductView>, ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can edit the catalog".to_string(),
        ));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ServerError::Generic("product name is required".to_string()));
    }

    let product = state
        .ledger
        .update_product(
            id,
            name,
            payload.category.as_deref(),
            Money::new(payload.unit_price_minor),
        )
        .await?;

    Ok(Json(product_view(product)))
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if !user.is_admin() {
        return Err(ServerError::Forbidden(
            "only admins can edit the catalog".to_string(),
        ));
    }

    state.ledger.archive_product(id).await?;
    Ok(StatusCode::OK)
}
