//! Axum HTTP API for posture analysis.
//!
//! This crate provides:
//! - Frame, landmark and video analysis endpoints
//! - Health and mock-mode status reports
//! - Per-IP rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
