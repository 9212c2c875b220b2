use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::auth::{
    enforce_guards, groups, optional_auth, permissions, require_auth, Guard, GuardChain,
};
use crate::server::AppState;

use super::account::{hello, me};
use super::admin::{admin_settings, analytics_summary};
use super::chat::chat;
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Anonymous callers welcome, identity attached when a usable token is sent
    let optional = Router::new()
        .route("/hello", get(hello))
        .route_layer(from_fn_with_state(state.clone(), optional_auth));

    // Token required, then per-route guards
    let protected = Router::new()
        .merge(guarded(
            Router::new().route("/me", get(me)),
            [Guard::require_authenticated()],
        ))
        .merge(guarded(
            Router::new().route("/chat", post(chat)),
            [
                Guard::require_authenticated(),
                Guard::require_permission(permissions::CHAT),
            ],
        ))
        .merge(guarded(
            Router::new().route("/analytics/summary", get(analytics_summary)),
            [
                Guard::require_authenticated(),
                Guard::require_any_tier(["premium"]),
                Guard::require_permission(permissions::ANALYTICS),
            ],
        ))
        .merge(guarded(
            Router::new().route("/admin/settings", get(admin_settings)),
            [
                Guard::require_authenticated(),
                Guard::require_any_role([groups::ADMINISTRATORS]),
            ],
        ))
        .route_layer(from_fn_with_state(state, require_auth));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api", optional.merge(protected))
}

/// Attach `guards` to every route in `router`, evaluated in the given order.
pub fn guarded<S>(router: Router<S>, guards: impl IntoIterator<Item = Guard>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let chain: GuardChain = guards.into_iter().collect();
    router.route_layer(from_fn_with_state(Arc::new(chain), enforce_guards))
}
