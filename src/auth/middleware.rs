//! axum glue for the auth pipeline.
//!
//! `require_auth` and `optional_auth` derive the identity and store it in the
//! request extensions; `enforce_guards` checks a route's [`GuardChain`]
//! against whatever identity is stored there. Layer them so that the auth
//! step runs first:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/admin", get(handler))
//!     .route_layer(middleware::from_fn_with_state(Arc::new(chain), enforce_guards))
//!     .route_layer(middleware::from_fn_with_state(state, require_auth))
//! ```

use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::metrics::AuthMetrics;
use crate::server::AppState;

use super::{AuthError, EnterpriseUser, GuardChain};

/// Identity stored in the request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<EnterpriseUser>);

impl Deref for CurrentUser {
    type Target = EnterpriseUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Identity if one was attached, never rejects
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Reject the request unless it carries a usable bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if req.extensions().get::<CurrentUser>().is_none() {
        // Unreadable header bytes never reach the authenticator, so count them here
        let header = authorization_header(req.headers())
            .inspect_err(|e| AuthMetrics::record("required", e.code()))?;
        let user = state.authenticator.authenticate(header)?;

        tracing::debug!(
            user_id = %user.user_id,
            tier = %user.user_tier,
            "Request authenticated"
        );
        attach(&mut req, user);
    }

    Ok(next.run(req).await)
}

/// Attach an identity when a usable token is present; otherwise continue
/// anonymously.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if req.extensions().get::<CurrentUser>().is_none() {
        let header = authorization_header(req.headers()).ok().flatten();
        if let Some(user) = state.authenticator.authenticate_optional(header) {
            attach(&mut req, user);
        }
    }

    next.run(req).await
}

/// Run the route's guards against the attached identity.
pub async fn enforce_guards(
    State(chain): State<Arc<GuardChain>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = req.extensions().get::<CurrentUser>().map(|u| u.0.as_ref());

    if let Err(e) = chain.evaluate(user) {
        AuthMetrics::record_guard_rejection(e.code());
        return Err(e);
    }

    Ok(next.run(req).await)
}

fn attach(req: &mut Request, user: EnterpriseUser) {
    req.extensions_mut().insert(CurrentUser(Arc::new(user)));
}

fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| AuthError::InvalidAuthorizationFormat))
        .transpose()
}
