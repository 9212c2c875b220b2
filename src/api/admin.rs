//! Tier- and group-gated endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::PublicSettings;
use crate::rag::RagStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub retrieval_enabled: bool,
    pub queries: RagStatsSnapshot,
}

/// GET /api/analytics/summary - premium tier with analytics permission
#[tracing::instrument(name = "http.analytics_summary", skip(state))]
pub async fn analytics_summary(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    Json(AnalyticsSummary {
        retrieval_enabled: state.rag.is_augmented(),
        queries: state.rag.stats(),
    })
}

/// GET /api/admin/settings - Administrators group only
#[tracing::instrument(name = "http.admin_settings", skip(state))]
pub async fn admin_settings(State(state): State<AppState>) -> Json<PublicSettings> {
    Json(state.settings.public_view())
}
