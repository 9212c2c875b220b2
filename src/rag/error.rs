use thiserror::Error;

/// Failures talking to the completion or search service.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} answered {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("no choices in completion response")]
    EmptyResponse,
}

impl RagError {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RagError::Http { service, source }
    }
}
