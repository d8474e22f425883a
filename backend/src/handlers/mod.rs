//! HTTP handlers

pub mod articles;
pub mod auth;
pub mod health;
pub mod reporting;
pub mod sales;
pub mod stock;

pub use articles::*;
pub use auth::*;
pub use health::*;
pub use reporting::*;
pub use sales::*;
pub use stock::*;
