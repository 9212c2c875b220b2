use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::AuthError;

/// Claims carried by a Cognito ID/access token.
///
/// Every field is optional in the payload and decoded on its own: a claim of
/// the wrong JSON type reads as absent instead of failing the whole token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClaimsRecord {
    /// Subject (user ID)
    #[serde(default, deserialize_with = "lenient")]
    pub sub: String,
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,
    #[serde(rename = "cognito:groups", default, deserialize_with = "string_elements")]
    pub groups: Vec<String>,
    #[serde(rename = "custom:userTier", default, deserialize_with = "lenient")]
    pub user_tier: String,
    #[serde(rename = "custom:department", default, deserialize_with = "lenient")]
    pub department: Option<String>,
    #[serde(rename = "custom:role", default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(rename = "given_name", default, deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(rename = "family_name", default, deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number: Option<String>,
    /// Expiration time (Unix timestamp)
    #[serde(default, deserialize_with = "timestamp")]
    pub exp: Option<i64>,
    /// Issued at (Unix timestamp)
    #[serde(default, deserialize_with = "timestamp")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub aud: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub iss: Option<String>,
}

impl ClaimsRecord {
    /// Build a record from a decoded token payload.
    ///
    /// Fails only when the subject is missing; every other claim may be absent.
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, AuthError> {
        let claims = ClaimsRecord::deserialize(Value::Object(payload))
            .map_err(|e| AuthError::MalformedToken(format!("failed to extract claims: {}", e)))?;

        if claims.sub.is_empty() {
            return Err(AuthError::MalformedToken("missing subject claim".to_string()));
        }

        Ok(claims)
    }

    /// Parse a raw JSON payload. Anything other than a JSON object is rejected.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AuthError> {
        let payload: Map<String, Value> = serde_json::from_slice(bytes)
            .map_err(|e| AuthError::MalformedToken(format!("failed to parse token: {}", e)))?;
        Self::from_payload(payload)
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => exp < chrono::Utc::now().timestamp(),
            None => false,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn string_elements<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// JSON numbers are accepted whether or not they carry a fraction.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    })
}
