//! Error types for request resolution and dispatch.
//!
//! # Design
//! Every stage of the resolver fails with its own variant so callers can tell
//! a configuration mistake (`MethodMissing`, `InvalidMethod`, `UrlParseError`)
//! apart from a payload problem (`SerializationError`) or a network failure
//! (`TransportError`). None of them are retried here.

/// Errors returned by `Client::request`, `Client::build_request` and the
/// individual resolver stages.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Neither the per-call configuration nor the defaults name a method.
    #[error("no method provided in the request or the client defaults")]
    MethodMissing,

    /// The resolved method is not one of the seven supported verbs.
    #[error("unsupported HTTP method `{0}`")]
    InvalidMethod(String),

    /// The target URL or the base URL could not be parsed.
    #[error("invalid URL `{input}`: {source}")]
    UrlParseError {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The request body could not be encoded.
    #[error("request body serialization failed: {0}")]
    SerializationError(String),

    /// The transport failed to deliver the request or read the response.
    #[error("transport failed: {0}")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RequestError {
    pub(crate) fn url(input: &str, source: url::ParseError) -> Self {
        RequestError::UrlParseError {
            input: input.to_string(),
            source,
        }
    }

    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RequestError::TransportError(Box::new(err))
    }
}
