//! HTTP handlers for stock alerts and manual movements

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{CreateMovementRequest, MovementListQuery, StockAlert, StockMovement};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::StockService;
use crate::AppState;

/// Declinations at or below their threshold
pub async fn low_stock_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<StockAlert>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.low_stock_alerts().await?))
}

/// Record a restock, return, loss or correction
pub async fn record_movement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateMovementRequest>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = StockService::new(state.db);
    let movement = service.record_movement(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.list_movements(&query).await?))
}
