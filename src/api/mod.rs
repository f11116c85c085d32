//! HTTP API for the Renewal Workflow Engine.
//!
//! This module provides the batch endpoints operators drive renewals
//! with, built on the axum web framework.

pub mod handlers;
pub mod request;
pub mod response;
pub mod state;

pub use handlers::create_router;
pub use request::{BatchRequest, LogQueryParams};
pub use response::ApiMessage;
pub use state::AppState;
