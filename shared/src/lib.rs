//! Shared types and models for the Taiwan regional forecast service
//!
//! This crate contains the region code table and the forecast document model shared
//! between the ingestion backend and its tests.

pub mod models;
pub mod region;
pub mod types;
pub mod validation;

pub use models::*;
pub use region::*;
pub use types::*;
pub use validation::*;
