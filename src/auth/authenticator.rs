use crate::metrics::AuthMetrics;

use super::{AuthError, ClaimsExtractor, EnterpriseUser};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Turns an `Authorization` header value into an [`EnterpriseUser`].
pub struct Authenticator {
    extractor: ClaimsExtractor,
}

impl Authenticator {
    pub fn new(extractor: ClaimsExtractor) -> Self {
        Self { extractor }
    }

    pub fn is_verifying(&self) -> bool {
        self.extractor.is_verifying()
    }

    /// Mandatory path: any problem with the header or token is an error.
    pub fn authenticate(&self, header: Option<&str>) -> Result<EnterpriseUser, AuthError> {
        let result = self.derive_user(header);
        match &result {
            Ok(_) => AuthMetrics::record("required", "authenticated"),
            Err(e) => AuthMetrics::record("required", e.code()),
        }
        result
    }

    /// Optional path: failures leave the caller anonymous instead of
    /// rejecting the request.
    pub fn authenticate_optional(&self, header: Option<&str>) -> Option<EnterpriseUser> {
        match self.derive_user(header) {
            Ok(user) => {
                AuthMetrics::record("optional", "authenticated");
                Some(user)
            }
            Err(e) => {
                if header.is_some() {
                    tracing::debug!(error = %e, "Ignoring unusable credentials on optional-auth route");
                }
                AuthMetrics::record("optional", "anonymous");
                None
            }
        }
    }

    fn derive_user(&self, header: Option<&str>) -> Result<EnterpriseUser, AuthError> {
        let header = header
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingAuthorization)?;
        let token = bearer_token(header).ok_or(AuthError::InvalidAuthorizationFormat)?;
        let claims = self.extractor.extract(token)?;
        Ok(EnterpriseUser::from_claims(&claims))
    }
}

/// Token part of a `Bearer <token>` header value. The prefix is case-sensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix(BEARER_PREFIX)
}
