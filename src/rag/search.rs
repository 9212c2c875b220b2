use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SearchConfig;

use super::RagError;

const SERVICE: &str = "search service";

/// Hosted document index queried for grounding material.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>, RagError>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// Azure AI Search index, queried through the REST API.
pub struct AzureSearchClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    top: u32,
    content_field: String,
    timeout: Duration,
}

impl AzureSearchClient {
    pub fn new(config: &SearchConfig, http: reqwest::Client, timeout: Duration) -> Self {
        let url = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.index_name,
            config.api_version
        );

        Self {
            http,
            url,
            api_key: config.api_key.clone(),
            top: config.top,
            content_field: config.content_field.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, RagError> {
        tracing::debug!(query = %query, top = self.top, "Searching index");

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&SearchRequest {
                search: query,
                top: self.top,
            })
            .send()
            .await
            .map_err(RagError::http(SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let results: SearchResponse = response.json().await.map_err(RagError::http(SERVICE))?;

        // Hits without a text content field are skipped
        Ok(results
            .value
            .into_iter()
            .filter_map(|mut hit| match hit.remove(&self.content_field) {
                Some(Value::String(text)) if !text.is_empty() => Some(text),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(endpoint: &str) -> AzureSearchClient {
        let config = SearchConfig {
            enabled: true,
            endpoint: endpoint.to_string(),
            api_key: "search-key".to_string(),
            index_name: "songs".to_string(),
            ..Default::default()
        };
        AzureSearchClient::new(&config, reqwest::Client::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_search_returns_content_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/songs/docs/search"))
            .and(query_param("api-version", "2023-11-01"))
            .and(header("api-key", "search-key"))
            .and(body_json(json!({ "search": "nocturne", "top": 3 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    { "@search.score": 2.1, "id": "1", "content": "Chopin, Nocturne Op. 9 No. 2" },
                    { "@search.score": 1.4, "id": "2", "title": "no content" },
                    { "@search.score": 0.9, "id": "3", "content": "Field, Nocturne No. 5" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let docs = client(&server.uri()).search("nocturne").await.unwrap();

        assert_eq!(docs, vec!["Chopin, Nocturne Op. 9 No. 2", "Field, Nocturne No. 5"]);
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).search("nocturne").await.unwrap_err();
        assert!(matches!(err, RagError::Status { status: 403, .. }));
    }
}
