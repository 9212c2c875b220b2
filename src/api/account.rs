//! Identity endpoints.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, EnterpriseUser, MaybeUser};

#[derive(Debug, Deserialize)]
pub struct HelloQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub authenticated: bool,
}

/// GET /api/hello - greets anonymous and signed-in callers alike
#[tracing::instrument(name = "http.hello", skip_all)]
pub async fn hello(MaybeUser(user): MaybeUser, Query(query): Query<HelloQuery>) -> Json<HelloResponse> {
    let name = query
        .name
        .filter(|n| !n.is_empty())
        .or_else(|| user.as_ref().map(|u| u.display_name().to_string()))
        .unwrap_or_else(|| "World".to_string());

    Json(HelloResponse {
        message: format!("Hello, {}!", name),
        authenticated: user.is_some(),
    })
}

/// GET /api/me - the caller's derived identity
#[tracing::instrument(name = "http.me", skip(user), fields(user_id = %user.user_id))]
pub async fn me(user: CurrentUser) -> Json<EnterpriseUser> {
    Json(EnterpriseUser::clone(&user))
}
