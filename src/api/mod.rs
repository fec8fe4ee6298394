//! HTTP surface.
//!
//! Thin axum handlers over the ledger and store; all domain rules live
//! below this layer.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ServerConfig};
