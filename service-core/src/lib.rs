//! service-core: Shared infrastructure for HTTP front-end services.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tokio;
pub use tower;
pub use tower_http;
pub use tracing;
