//! Statistics and reporting tests
//!
//! Tests for the dashboard overview and the sales report including:
//! - Catalog totals and stock valuation
//! - Cancelled sales excluded from revenue
//! - Top articles ordering

mod common;

use chrono::{TimeZone, Utc};
use common::{dec, line, sale_request, Shop};
use rust_decimal::Decimal;
use shared::{ArticleStockSummary, Collection, ReportPeriod, SalesReport, StockOverview};

fn summary(collection: Collection, price: &str, units: i64, low: i64) -> ArticleStockSummary {
    ArticleStockSummary {
        collection,
        purchase_price: dec(price),
        declination_count: 2,
        total_units: units,
        low_stock_count: low,
    }
}

#[test]
fn test_overview_totals() {
    let summaries = vec![
        summary(Collection::Summer2024, "10.00", 20, 1),
        summary(Collection::Summer2024, "12.50", 4, 2),
        summary(Collection::Winter2024, "30.00", 0, 2),
    ];

    let overview = StockOverview::from_summaries(&summaries);

    assert_eq!(overview.total_articles, 3);
    assert_eq!(overview.total_declinations, 6);
    assert_eq!(overview.total_stock, 24);
    assert_eq!(overview.low_stock, 5);
    assert_eq!(overview.stock_value, dec("250.00"));
    assert_eq!(overview.articles_per_collection["ETE_2024"], 2);
    assert_eq!(overview.articles_per_collection["HIVER_2024"], 1);
    assert_eq!(overview.articles_per_collection["PRINTEMPS_2025"], 0);
}

#[test]
fn test_overview_wire_names() {
    let overview = StockOverview::from_summaries(&[summary(Collection::Autumn2024, "5.00", 3, 0)]);
    let json = serde_json::to_value(&overview).unwrap();

    assert_eq!(json["totalArticles"], 1);
    assert_eq!(json["totalStock"], 3);
    assert_eq!(json["articlesParCollection"]["AUTOMNE_2024"], 1);
}

#[test]
fn test_sales_report_excludes_cancelled_sales() {
    let (mut shop, tshirt, d1) = Shop::with_basic_tshirt(50);
    let jean = shop.add_article("JEA-001", "Jean Slim", "60.00");
    let d2 = shop.add_declination(jean, "40", "Bleu", 10, 2);

    shop.create_sale(&sale_request(vec![line(tshirt, d1, 3, "25.00")], "75.00"))
        .unwrap();
    shop.create_sale(&sale_request(
        vec![line(jean, d2, 1, "60.00"), line(tshirt, d1, 1, "25.00")],
        "100.00",
    ))
    .unwrap();
    let cancelled = shop
        .create_sale(&sale_request(vec![line(jean, d2, 4, "60.00")], "240.00"))
        .unwrap();
    shop.cancel_sale(cancelled.id).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap();
    let report = SalesReport::build(ReportPeriod::Month, now, &shop.sales());

    assert_eq!(report.sales_count, 2);
    assert_eq!(report.total_revenue, dec("160.00"));
    assert_eq!(report.average_basket, dec("80.00"));
    assert_eq!(report.units_sold, 5);
    assert_eq!(report.top_articles[0].name, "T-shirt Basic Blanc");
    assert_eq!(report.top_articles[0].units_sold, 4);
    assert_eq!(report.top_articles[1].name, "Jean Slim");
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.daily[0].revenue, dec("160.00"));
    assert_eq!(report.evolution, "+100.0%");
}

#[test]
fn test_sales_report_outside_period_is_empty() {
    let (mut shop, tshirt, d1) = Shop::with_basic_tshirt(50);
    shop.create_sale(&sale_request(vec![line(tshirt, d1, 1, "25.00")], "25.00"))
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 7, 3, 9, 0, 0).unwrap();
    let report = SalesReport::build(ReportPeriod::Month, now, &shop.sales());

    assert_eq!(report.sales_count, 0);
    assert_eq!(report.average_basket, Decimal::ZERO);
    assert!(report.top_articles.is_empty());
    assert!(report.daily.is_empty());
    // June's sale falls after June 3rd, outside the comparable window
    assert_eq!(report.evolution, "+0.0%");
}

#[test]
fn test_sales_report_evolution_against_previous_period() {
    let (mut shop, tshirt, d1) = Shop::with_basic_tshirt(50);
    shop.create_sale(&sale_request(vec![line(tshirt, d1, 1, "25.00")], "25.00"))
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 7, 20, 9, 0, 0).unwrap();
    let report = SalesReport::build(ReportPeriod::Month, now, &shop.sales());
    assert_eq!(report.sales_count, 0);
    assert_eq!(report.evolution, "-100.0%");

    let now = Utc.with_ymd_and_hms(2024, 6, 20, 9, 0, 0).unwrap();
    let report = SalesReport::build(ReportPeriod::Month, now, &shop.sales());
    assert_eq!(report.sales_count, 1);
    assert_eq!(report.evolution, "+100.0%");
}

#[test]
fn test_sales_report_wire_names() {
    let (mut shop, tshirt, d1) = Shop::with_basic_tshirt(50);
    shop.create_sale(&sale_request(vec![line(tshirt, d1, 2, "25.00")], "50.00"))
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap();
    let json = serde_json::to_value(SalesReport::build(ReportPeriod::Month, now, &shop.sales()))
        .unwrap();

    assert_eq!(json["nombreVentes"], 1);
    assert_eq!(json["articlesVendus"], 2);
    assert_eq!(json["evolution"], "+100.0%");
    assert_eq!(json["topArticles"][0]["nom"], "T-shirt Basic Blanc");
    assert_eq!(json["topArticles"][0]["quantite"], 2);
    assert_eq!(json["ventesParJour"][0]["date"], "2024-06-15");
    assert!(json["ventesParJour"][0].get("montant").is_some());
    assert!(json.get("totalVentes").is_some());
    assert!(json.get("panierMoyen").is_some());
}
