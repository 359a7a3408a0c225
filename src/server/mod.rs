//! HTTP server exposing the motivator pipeline.
//!
//! # Endpoints
//!
//! - `GET  /health`   - Liveness probe with token usage
//! - `POST /motivate` - Map a feeling to a verse and encouragement

pub mod routes;

pub use routes::{app_router, AppState, MotivateRequest};
