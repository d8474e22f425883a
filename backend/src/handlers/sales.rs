//! HTTP handlers for the sale ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{CreateSaleRequest, Sale, SaleListQuery};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::SalesService;
use crate::AppState;

fn sales_service(state: &AppState) -> SalesService {
    SalesService::new(state.db.clone(), state.config.sales.policy())
}

/// Record a sale and decrement stock
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    user.require_seller()?;
    let sale = sales_service(&state)
        .create_sale(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales, most recent first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    Ok(Json(sales_service(&state).list_sales(&query).await?))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    Ok(Json(sales_service(&state).get_sale(sale_id).await?))
}

/// Cancel a sale and restore its stock
pub async fn cancel_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    user.require_seller()?;
    let sale = sales_service(&state)
        .cancel_sale(sale_id, user.user_id)
        .await?;
    Ok(Json(sale))
}
