//! Retrieval-augmented answering over hosted completion and search services.

mod completion;
mod error;
mod search;
mod service;
mod types;

pub use completion::{AzureOpenAiClient, CompletionBackend};
pub use error::RagError;
pub use search::{AzureSearchClient, SearchBackend};
pub use service::{RagService, RagStats, RagStatsSnapshot};
pub use types::{ChatRequest, Message, MessageType, RagResponse};
