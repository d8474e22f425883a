//! Business logic services for the Stock Chic back office

pub mod auth;
pub mod catalog;
pub mod reporting;
pub mod sales;
pub mod stock;

pub use auth::AuthService;
pub use catalog::{ArticleListQuery, CatalogService};
pub use reporting::ReportingService;
pub use sales::SalesService;
pub use stock::StockService;
