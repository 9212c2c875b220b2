use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::rag::{ChatRequest, RagResponse};
use crate::server::AppState;

/// POST /api/chat - answer a query, grounded on search results when enabled
#[tracing::instrument(
    name = "http.chat",
    skip(state, user, body),
    fields(user_id = %user.user_id, tier = %user.user_tier)
)]
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<RagResponse>> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let response = state.rag.answer(&request).await?;
    Ok(Json(response))
}
