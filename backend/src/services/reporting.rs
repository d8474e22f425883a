//! Reporting service for dashboard statistics and sales reports

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::SalesService;
use shared::{
    ArticleStockSummary, Collection, ReportPeriod, SaleStatus, SalesReport, StockOverview,
};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Per-article stock aggregate
#[derive(Debug, FromRow)]
struct SummaryRow {
    collection: String,
    prix_achat: Decimal,
    declination_count: i64,
    total_units: i64,
    low_stock_count: i64,
}

impl TryFrom<SummaryRow> for ArticleStockSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> AppResult<Self> {
        let collection = Collection::parse(&row.collection).ok_or_else(|| {
            AppError::Internal(format!("Unknown collection in database: {}", row.collection))
        })?;
        Ok(ArticleStockSummary {
            collection,
            purchase_price: row.prix_achat,
            declination_count: row.declination_count,
            total_units: row.total_units,
            low_stock_count: row.low_stock_count,
        })
    }
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Catalog statistics, recomputed on every call
    pub async fn stock_overview(&self) -> AppResult<StockOverview> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT a.collection,
                   a.prix_achat,
                   COUNT(d.id) AS declination_count,
                   COALESCE(SUM(d.quantite), 0)::BIGINT AS total_units,
                   COUNT(d.id) FILTER (WHERE d.quantite <= d.quantite_min) AS low_stock_count
            FROM articles a
            LEFT JOIN declinaisons d ON d.article_id = a.id
            GROUP BY a.id, a.collection, a.prix_achat
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let summaries = rows
            .into_iter()
            .map(ArticleStockSummary::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(StockOverview::from_summaries(&summaries))
    }

    /// Sales report over validated sales since the start of `period`,
    /// compared with the previous period
    pub async fn sales_report(
        &self,
        ledger: &SalesService,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<SalesReport> {
        let sales = ledger
            .sales_since(SaleStatus::Validated, period.previous_start(now))
            .await?;
        Ok(SalesReport::build(period, now, &sales))
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::DailyRevenue;

    #[test]
    fn test_export_daily_series_to_csv() {
        let rows = vec![
            DailyRevenue {
                date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                sales_count: 2,
                units_sold: 3,
                revenue: Decimal::new(7500, 2),
            },
            DailyRevenue {
                date: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
                sales_count: 1,
                units_sold: 1,
                revenue: Decimal::new(2500, 2),
            },
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,nombreVentes,articlesVendus,montant"));
        assert_eq!(lines.next(), Some("2024-06-10,2,3,75.00"));
        assert_eq!(lines.next(), Some("2024-06-11,1,1,25.00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_summary_row_conversion() {
        let row = SummaryRow {
            collection: "AUTOMNE_2024".into(),
            prix_achat: Decimal::new(1000, 2),
            declination_count: 3,
            total_units: 12,
            low_stock_count: 1,
        };
        let summary = ArticleStockSummary::try_from(row).unwrap();
        assert_eq!(summary.collection, Collection::Autumn2024);
        assert_eq!(summary.total_units, 12);
    }
}
