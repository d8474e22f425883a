//! Dashboard statistics and sales reporting roll-ups

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::article::Collection;
use super::sale::{Sale, SaleStatus};
use crate::validation::round_money;

/// Stock figures of a single article, as aggregated by the store
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleStockSummary {
    pub collection: Collection,
    pub purchase_price: Decimal,
    pub declination_count: i64,
    pub total_units: i64,
    pub low_stock_count: i64,
}

/// Catalog overview shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub total_articles: i64,
    #[serde(rename = "totalDeclinaisons")]
    pub total_declinations: i64,
    pub total_stock: i64,
    /// Declinations at or below their threshold
    #[serde(rename = "stockBas")]
    pub low_stock: i64,
    /// Σ quantity × purchase price
    #[serde(rename = "valeurStock")]
    pub stock_value: Decimal,
    /// Article count for every collection tag, zero-filled
    #[serde(rename = "articlesParCollection")]
    pub articles_per_collection: BTreeMap<String, i64>,
}

impl StockOverview {
    pub fn from_summaries<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a ArticleStockSummary>,
    {
        let mut per_collection: BTreeMap<String, i64> = Collection::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();

        let mut overview = Self {
            total_articles: 0,
            total_declinations: 0,
            total_stock: 0,
            low_stock: 0,
            stock_value: Decimal::ZERO,
            articles_per_collection: BTreeMap::new(),
        };

        for summary in summaries {
            overview.total_articles += 1;
            overview.total_declinations += summary.declination_count;
            overview.total_stock += summary.total_units;
            overview.low_stock += summary.low_stock_count;
            overview.stock_value += Decimal::from(summary.total_units) * summary.purchase_price;
            *per_collection
                .entry(summary.collection.as_str().to_string())
                .or_insert(0) += 1;
        }

        overview.stock_value = round_money(overview.stock_value);
        overview.articles_per_collection = per_collection;
        overview
    }
}

/// Reporting window, always ending now
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl ReportPeriod {
    /// Start of the current period in UTC (weeks start on Monday)
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let first_day = match self {
            ReportPeriod::Day => today,
            ReportPeriod::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            ReportPeriod::Month => today.with_day(1).unwrap_or(today),
            ReportPeriod::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&first_day.and_time(chrono::NaiveTime::MIN))
    }

    /// Start of the period before the current one
    pub fn previous_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.start(self.start(now) - Duration::days(1))
    }
}

/// Units and revenue of one article over a report window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopArticle {
    pub article_id: Uuid,
    pub reference: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "quantite")]
    pub units_sold: i64,
    #[serde(rename = "chiffre")]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    #[serde(rename = "nombreVentes")]
    pub sales_count: i64,
    #[serde(rename = "articlesVendus")]
    pub units_sold: i64,
    #[serde(rename = "montant")]
    pub revenue: Decimal,
}

/// Sales report over validated sales since the start of a period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub since: DateTime<Utc>,
    #[serde(rename = "totalVentes")]
    pub total_revenue: Decimal,
    #[serde(rename = "nombreVentes")]
    pub sales_count: i64,
    #[serde(rename = "panierMoyen")]
    pub average_basket: Decimal,
    #[serde(rename = "articlesVendus")]
    pub units_sold: i64,
    /// Revenue change against the same elapsed time of the previous period, e.g. "+12.5%"
    pub evolution: String,
    #[serde(rename = "topArticles")]
    pub top_articles: Vec<TopArticle>,
    #[serde(rename = "ventesParJour")]
    pub daily: Vec<DailyRevenue>,
}

impl SalesReport {
    pub const TOP_ARTICLES: usize = 5;

    /// Roll up the validated sales of the current period up to `now`.
    ///
    /// `sales` should reach back to `period.previous_start(now)` so the
    /// evolution can be computed; cancelled sales are ignored.
    pub fn build(period: ReportPeriod, now: DateTime<Utc>, sales: &[Sale]) -> Self {
        let since = period.start(now);
        let previous_start = period.previous_start(now);
        let previous_end = (previous_start + (now - since)).min(since);

        let mut total_revenue = Decimal::ZERO;
        let mut previous_revenue = Decimal::ZERO;
        let mut sales_count = 0i64;
        let mut units_sold = 0i64;
        let mut by_article: HashMap<Uuid, TopArticle> = HashMap::new();
        let mut by_day: BTreeMap<NaiveDate, DailyRevenue> = BTreeMap::new();

        for sale in sales.iter().filter(|s| s.status == SaleStatus::Validated) {
            if sale.created_at >= previous_start && sale.created_at < previous_end {
                previous_revenue += sale.total_amount;
                continue;
            }
            if sale.created_at < since || sale.created_at > now {
                continue;
            }

            let sale_units: i64 = sale.items.iter().map(|i| i64::from(i.quantity)).sum();
            total_revenue += sale.total_amount;
            sales_count += 1;
            units_sold += sale_units;

            let date = sale.created_at.date_naive();
            let day = by_day.entry(date).or_insert_with(|| DailyRevenue {
                date,
                sales_count: 0,
                units_sold: 0,
                revenue: Decimal::ZERO,
            });
            day.sales_count += 1;
            day.units_sold += sale_units;
            day.revenue += sale.total_amount;

            for item in &sale.items {
                let entry = by_article.entry(item.article_id).or_insert_with(|| TopArticle {
                    article_id: item.article_id,
                    reference: item.article_reference.clone(),
                    name: item.article_name.clone(),
                    units_sold: 0,
                    revenue: Decimal::ZERO,
                });
                entry.units_sold += i64::from(item.quantity);
                entry.revenue += item.line_total;
            }
        }

        let mut top_articles: Vec<TopArticle> = by_article.into_values().collect();
        top_articles.sort_by(|a, b| {
            b.units_sold
                .cmp(&a.units_sold)
                .then_with(|| b.revenue.cmp(&a.revenue))
                .then_with(|| a.name.cmp(&b.name))
        });
        top_articles.truncate(Self::TOP_ARTICLES);

        let average_basket = if sales_count == 0 {
            Decimal::ZERO
        } else {
            round_money(total_revenue / Decimal::from(sales_count))
        };

        Self {
            period,
            since,
            total_revenue,
            sales_count,
            average_basket,
            units_sold,
            evolution: format_evolution(total_revenue, previous_revenue),
            top_articles,
            daily: by_day.into_values().collect(),
        }
    }
}

/// Signed percentage change with one decimal. Growth from nothing counts as +100%.
pub fn format_evolution(current: Decimal, previous: Decimal) -> String {
    if previous.is_zero() {
        let pct = if current.is_zero() { "+0.0%" } else { "+100.0%" };
        return pct.to_string();
    }
    let tenths = ((current - previous) * Decimal::from(1000) / previous)
        .round()
        .to_i64()
        .unwrap_or_default();
    let sign = if tenths < 0 { "-" } else { "+" };
    let tenths = tenths.unsigned_abs();
    format!("{sign}{}.{}%", tenths / 10, tenths % 10)
}
