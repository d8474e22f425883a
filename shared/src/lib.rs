//! Shared types and domain logic for the Stock Chic inventory and point-of-sale platform
//!
//! This crate holds everything that does not touch the database or the network:
//! wire models, request schemas, validation rules, the stock adjustment engine,
//! sale numbering and the read-side aggregators.

pub mod engine;
pub mod models;
pub mod numbering;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
