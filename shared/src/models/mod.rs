//! Domain models for the Stock Chic platform
//!
//! Rust field names are English; serde renames keep the French wire names the
//! shop front-end already speaks.

mod article;
mod sale;
mod stats;
mod stock;
mod user;

pub use article::*;
pub use sale::*;
pub use stats::*;
pub use stock::*;
pub use user::*;
