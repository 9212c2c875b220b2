//! API layer - HTTP endpoint handlers organized by concern.

mod account;
mod admin;
mod chat;
mod health;
mod metrics;
mod routes;

pub use account::{hello, me, HelloQuery, HelloResponse};
pub use admin::{admin_settings, analytics_summary, AnalyticsSummary};
pub use chat::chat;
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::{api_routes, guarded};
