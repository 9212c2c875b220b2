use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Authenticator, ClaimsExtractor};
use crate::config::Settings;
use crate::error::AppError;
use crate::rag::{AzureOpenAiClient, AzureSearchClient, CompletionBackend, RagService, SearchBackend};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub authenticator: Arc<Authenticator>,
    pub rag: Arc<RagService>,
}

impl AppState {
    pub fn new(settings: Settings, authenticator: Authenticator, rag: RagService) -> Self {
        Self {
            settings: Arc::new(settings),
            authenticator: Arc::new(authenticator),
            rag: Arc::new(rag),
        }
    }

    /// Wire the production backends. Fetches the JWKS when one is configured.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let extractor = ClaimsExtractor::from_config(&settings.auth, &http).await?;

        let completion: Arc<dyn CompletionBackend> =
            Arc::new(AzureOpenAiClient::new(&settings.completion, http.clone()));

        let search: Option<Arc<dyn SearchBackend>> = if settings.search.enabled {
            let timeout = Duration::from_secs(settings.completion.timeout_seconds);
            Some(Arc::new(AzureSearchClient::new(&settings.search, http, timeout)))
        } else {
            None
        };

        tracing::info!(
            verify_signature = extractor.is_verifying(),
            retrieval = search.is_some(),
            "Backends initialized"
        );

        Ok(Self::new(
            settings,
            Authenticator::new(extractor),
            RagService::new(completion, search),
        ))
    }
}
