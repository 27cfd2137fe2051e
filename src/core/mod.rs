//! Query facade and its HTTP surface

pub mod http;
pub mod service;

pub use http::{create_router, start_server, AppState, HealthStatus};
pub use service::{MoverService, MAX_MOVERS};
