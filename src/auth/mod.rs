//! Bearer-token authentication and route authorization.
//!
//! The pipeline runs per request: [`ClaimsExtractor`] decodes the token into a
//! [`ClaimsRecord`], [`EnterpriseUser::from_claims`] derives tier and
//! permissions, and a route's [`GuardChain`] decides whether the handler runs.

mod authenticator;
mod claims;
mod error;
mod extractor;
mod guard;
mod jwks;
mod middleware;
mod user;

pub use authenticator::{bearer_token, Authenticator, BEARER_PREFIX};
pub use claims::ClaimsRecord;
pub use error::AuthError;
pub use extractor::ClaimsExtractor;
pub use guard::{Guard, GuardChain};
pub use jwks::fetch_jwks;
pub use middleware::{enforce_guards, optional_auth, require_auth, CurrentUser, MaybeUser};
pub use user::{groups, permissions, EnterpriseUser, ServicePermissions, UserProfile, UserTier};
