//! The boundary between resolved requests and the network.
//!
//! # Design
//! `Transport` is the only place where I/O happens. The resolver never sees
//! a socket, which keeps resolution deterministic and lets tests swap in a
//! recording transport. `UreqTransport` is the blocking default and returns
//! 4xx/5xx responses as data so status interpretation stays with the caller.

use std::fmt;
use std::sync::Arc;

use crate::error::RequestError;
use crate::http::{HttpRequest, HttpResponse};

/// Sends a resolved request and returns the raw response.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. Keep `http_status_as_error(false)` on it if
    /// error statuses should come back as responses.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match request.body {
            Some(body) => {
                let request = builder.body(body).map_err(RequestError::transport)?;
                self.agent.run(request)
            }
            None => {
                let request = builder.body(()).map_err(RequestError::transport)?;
                self.agent.run(request)
            }
        }
        .map_err(RequestError::transport)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(RequestError::transport)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
