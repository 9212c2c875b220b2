use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::AuthConfig;
use crate::error::AppError;

use super::jwks::fetch_jwks;
use super::{AuthError, ClaimsRecord};

/// Turns a bearer token into a [`ClaimsRecord`].
pub struct ClaimsExtractor {
    mode: Mode,
}

enum Mode {
    /// Payload is read without any signature check
    Unverified,
    Verified {
        keys: KeySource,
        validation: Validation,
    },
}

enum KeySource {
    Shared(DecodingKey),
    KeySet(JwkSet),
}

impl ClaimsExtractor {
    /// Build the extractor described by `config`, fetching the key set when
    /// `jwks_url` is configured.
    pub async fn from_config(config: &AuthConfig, http: &reqwest::Client) -> Result<Self, AppError> {
        if !config.verify_signature {
            tracing::warn!("Token signature verification is DISABLED; claims are trusted as sent");
            return Ok(Self::unverified());
        }

        if let Some(ref url) = config.jwks_url {
            let jwks = fetch_jwks(http, url).await?;
            tracing::info!(url = %url, keys = jwks.keys.len(), "Loaded token signing keys");
            return Ok(Self::with_key_set(jwks, config));
        }

        match config.secret {
            Some(ref secret) => Ok(Self::with_secret(secret, config)),
            None => Err(AppError::Internal(
                "no token key material configured".to_string(),
            )),
        }
    }

    pub fn unverified() -> Self {
        Self {
            mode: Mode::Unverified,
        }
    }

    /// HS256 verification with a shared secret
    pub fn with_secret(secret: &str, config: &AuthConfig) -> Self {
        Self {
            mode: Mode::Verified {
                keys: KeySource::Shared(DecodingKey::from_secret(secret.as_bytes())),
                validation: build_validation(config, Algorithm::HS256),
            },
        }
    }

    /// RS256 verification against a published key set, selected by `kid`
    pub fn with_key_set(jwks: JwkSet, config: &AuthConfig) -> Self {
        Self {
            mode: Mode::Verified {
                keys: KeySource::KeySet(jwks),
                validation: build_validation(config, Algorithm::RS256),
            },
        }
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self.mode, Mode::Verified { .. })
    }

    pub fn extract(&self, token: &str) -> Result<ClaimsRecord, AuthError> {
        match &self.mode {
            Mode::Unverified => decode_unverified(token),
            Mode::Verified { keys, validation } => {
                let payload = decode_verified(token, keys, validation)?;
                ClaimsRecord::from_payload(payload)
            }
        }
    }
}

fn build_validation(config: &AuthConfig, algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.leeway = config.leeway_seconds;

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }

    match config.audience {
        Some(ref audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    validation
}

fn decode_verified(
    token: &str,
    keys: &KeySource,
    validation: &Validation,
) -> Result<Map<String, Value>, AuthError> {
    let invalid = |e: jsonwebtoken::errors::Error| {
        AuthError::MalformedToken(format!("failed to verify token: {}", e))
    };

    let data = match keys {
        KeySource::Shared(key) => decode::<Map<String, Value>>(token, key, validation).map_err(invalid)?,
        KeySource::KeySet(jwks) => {
            let header = decode_header(token).map_err(invalid)?;
            let kid = header
                .kid
                .ok_or_else(|| AuthError::MalformedToken("token header has no key id".to_string()))?;
            let jwk = jwks
                .find(&kid)
                .ok_or_else(|| AuthError::MalformedToken(format!("unknown signing key '{}'", kid)))?;
            let key = DecodingKey::from_jwk(jwk).map_err(invalid)?;
            decode::<Map<String, Value>>(token, &key, validation).map_err(invalid)?
        }
    };

    Ok(data.claims)
}

fn decode_unverified(token: &str) -> Result<ClaimsRecord, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(
            "failed to parse token: token contains an invalid number of segments".to_string(),
        ));
    }

    let header = decode_segment(segments[0])?;
    serde_json::from_slice::<Map<String, Value>>(&header)
        .map_err(|e| AuthError::MalformedToken(format!("failed to parse token header: {}", e)))?;

    let payload = decode_segment(segments[1])?;
    ClaimsRecord::from_json(&payload)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("failed to parse token: {}", e)))
}
