//! Reporting handlers for dashboard statistics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{ReportPeriod, StockOverview};

use crate::error::{AppError, AppResult};
use crate::services::{ReportingService, SalesService};
use crate::AppState;

#[derive(Deserialize)]
pub struct SalesReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
    pub format: Option<String>, // "json" or "csv"
}

/// Catalog statistics for the dashboard
pub async fn get_overview(State(state): State<AppState>) -> AppResult<Json<StockOverview>> {
    let service = ReportingService::new(state.db.clone());
    Ok(Json(service.stock_overview().await?))
}

/// Sales report over the requested period
pub async fn get_sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let ledger = SalesService::new(state.db.clone(), state.config.sales.policy());
    let report = service
        .sales_report(&ledger, query.period, Utc::now())
        .await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(report).into_response()),
        Some("csv") => {
            let csv = ReportingService::export_to_csv(&report.daily)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"sales_report.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        Some(other) => Err(AppError::validation(
            "format",
            format!("Unsupported export format: {}", other),
            format!("Format d'export non pris en charge : {}", other),
        )),
    }
}
