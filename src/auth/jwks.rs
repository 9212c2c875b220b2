use jsonwebtoken::jwk::JwkSet;

use crate::error::AppError;

/// Download the signing key set published by the identity provider.
pub async fn fetch_jwks(http: &reqwest::Client, url: &str) -> Result<JwkSet, AppError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("failed to fetch key set from {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Internal(format!(
            "key set endpoint {} answered {}",
            url, status
        )));
    }

    response
        .json::<JwkSet>()
        .await
        .map_err(|e| AppError::Internal(format!("invalid key set from {}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{
                    "kty": "RSA",
                    "kid": "key-1",
                    "alg": "RS256",
                    "use": "sig",
                    "n": "u1SU1LfVLPHCozMxH2Mo4lgOEePzNm0tRgeLezV6ffAt0gunVTLw7onLRnrq0_IzW7yWR7QkrmBL7jTKEn5u-qKhbwKfBstIs-bMY2Zkp18gnTxKLxoS2tFczGkPLPgizskuemMghRniWaoLcyehkd3qqGElvW_VDL5AaWTg0nLVkjRo9z-40RQzuVaE8AkAFmxZzow3x-VJYKdjykkJ0iT9wCS0DRTXu269V264Vf_3jvredZiKRkgwlL9xNAwxXFg0x_XFw005UWVRIkdgcKWTjpBP2dPwVZ4WWC-9aGVd-Gyn1o0CLelf4rEjGoXbAAEgAqeGUxrcIlbjXfbcmw",
                    "e": "AQAB"
                }]
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let jwks = fetch_jwks(&http, &format!("{}/.well-known/jwks.json", server.uri()))
            .await
            .unwrap();

        assert_eq!(jwks.keys.len(), 1);
        assert!(jwks.find("key-1").is_some());
    }

    #[tokio::test]
    async fn test_fetch_key_set_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let result = fetch_jwks(&http, &format!("{}/jwks.json", server.uri())).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
