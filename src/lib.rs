// Shared components
pub mod config;
pub mod error;
pub mod metrics;

// Domain
pub mod auth;
pub mod rag;

// Application layer
pub mod api;
pub mod server;
