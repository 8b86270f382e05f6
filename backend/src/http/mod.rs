//! HTTP API for the pricing and prediction engines.
//!
//! Thin axum layer: handlers parse and validate query parameters, call into
//! the services held by [`crate::AppState`], and serialize the results.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;

pub use router::create_router;
