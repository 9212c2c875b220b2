use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::metrics::CompletionMetrics;

use super::{ChatRequest, CompletionBackend, RagResponse, SearchBackend};

#[derive(Debug, Default)]
pub struct RagStats {
    /// Questions answered or attempted
    pub total_queries: AtomicU64,
    /// Questions answered with retrieved documents in the prompt
    pub augmented_queries: AtomicU64,
    /// Searches that failed (the answer went ahead without documents)
    pub search_failures: AtomicU64,
    /// Completions that failed
    pub completion_failures: AtomicU64,
}

impl RagStats {
    pub fn snapshot(&self) -> RagStatsSnapshot {
        RagStatsSnapshot {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            augmented_queries: self.augmented_queries.load(Ordering::Relaxed),
            search_failures: self.search_failures.load(Ordering::Relaxed),
            completion_failures: self.completion_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagStatsSnapshot {
    pub total_queries: u64,
    pub augmented_queries: u64,
    pub search_failures: u64,
    pub completion_failures: u64,
}

/// Answers chat queries, optionally grounding them on search results.
pub struct RagService {
    completion: Arc<dyn CompletionBackend>,
    search: Option<Arc<dyn SearchBackend>>,
    stats: RagStats,
}

impl RagService {
    pub fn new(completion: Arc<dyn CompletionBackend>, search: Option<Arc<dyn SearchBackend>>) -> Self {
        Self {
            completion,
            search,
            stats: RagStats::default(),
        }
    }

    pub fn is_augmented(&self) -> bool {
        self.search.is_some()
    }

    pub fn stats(&self) -> RagStatsSnapshot {
        self.stats.snapshot()
    }

    #[tracing::instrument(
        name = "rag.answer",
        skip(self, request),
        fields(history = request.conversation_history.len())
    )]
    pub async fn answer(&self, request: &ChatRequest) -> Result<RagResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query must not be empty".to_string()));
        }

        self.stats.total_queries.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let documents = match &self.search {
            Some(search) => match search.search(query).await {
                Ok(docs) => docs,
                Err(e) => {
                    self.stats.search_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "Search failed, answering without documents");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if !documents.is_empty() {
            self.stats.augmented_queries.fetch_add(1, Ordering::Relaxed);
        }

        let content = match self
            .completion
            .complete(query, &request.conversation_history, &documents)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                self.stats.completion_failures.fetch_add(1, Ordering::Relaxed);
                CompletionMetrics::record_failure();
                return Err(e.into());
            }
        };

        CompletionMetrics::record_success(started.elapsed().as_secs_f64());
        tracing::info!(
            documents = documents.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answer composed"
        );

        Ok(RagResponse {
            content,
            sources: documents,
        })
    }
}
