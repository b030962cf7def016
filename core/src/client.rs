//! Client holding default request settings and a transport.
//!
//! # Design
//! `Client` keeps its defaults read-only for its whole lifetime. Every call
//! resolves a fresh `HttpRequest` from the defaults and the per-call
//! configuration, then hands it to the transport. `build_request` exposes
//! the resolution step alone for callers that want to do the I/O
//! themselves.

use std::sync::Arc;

use tracing::debug;

use crate::config::RequestConfig;
use crate::encode::{BodyEncoder, JsonEncoder};
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resolve::resolve;
use crate::transport::{Transport, UreqTransport};

/// HTTP request builder and sender with layered defaults.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    defaults: RequestConfig,
    transport: T,
    encoder: Arc<dyn BodyEncoder>,
}

impl Client<UreqTransport> {
    /// Client with empty defaults.
    pub fn new() -> Self {
        Self::with_defaults(RequestConfig::default())
    }

    pub fn with_defaults(defaults: RequestConfig) -> Self {
        Self::with_transport(defaults, UreqTransport::new())
    }
}

impl Default for Client<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(defaults: RequestConfig, transport: T) -> Self {
        Self {
            defaults,
            transport,
            encoder: Arc::new(JsonEncoder),
        }
    }

    /// Replace the JSON body encoder.
    pub fn with_encoder(mut self, encoder: impl BodyEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn defaults(&self) -> &RequestConfig {
        &self.defaults
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `config` against the defaults without sending anything.
    pub fn build_request(&self, config: &RequestConfig) -> Result<HttpRequest, RequestError> {
        resolve(&self.defaults, config, self.encoder.as_ref())
    }

    /// Resolve `config` and send it. Nothing is sent if resolution fails.
    pub fn request(&self, config: &RequestConfig) -> Result<HttpResponse, RequestError> {
        let request = self.build_request(config)?;
        debug!(
            method = %request.method,
            url = %request.url,
            has_body = request.body.is_some(),
            "sending request"
        );
        let response = self.transport.send(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub fn get(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Get, url, config)
    }

    pub fn post(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Post, url, config)
    }

    pub fn put(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Put, url, config)
    }

    pub fn delete(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Delete, url, config)
    }

    pub fn patch(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Patch, url, config)
    }

    pub fn head(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Head, url, config)
    }

    pub fn options(&self, url: &str, config: Option<RequestConfig>) -> Result<HttpResponse, RequestError> {
        self.request_with(HttpMethod::Options, url, config)
    }

    fn request_with(
        &self,
        method: HttpMethod,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<HttpResponse, RequestError> {
        let config = config.unwrap_or_default().url(url).method(method);
        self.request(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::{Map, Value};

    /// Records every request and answers 200 with an empty body.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
            self.sent.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: Vec::new(),
            })
        }
    }

    #[derive(Debug)]
    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&self, _request: HttpRequest) -> Result<HttpResponse, RequestError> {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            Err(RequestError::transport(io))
        }
    }

    #[derive(Debug)]
    struct RejectingEncoder;

    impl BodyEncoder for RejectingEncoder {
        fn encode(&self, _body: &Map<String, Value>) -> Result<Vec<u8>, RequestError> {
            Err(RequestError::SerializationError("cannot encode".to_string()))
        }
    }

    fn defaults() -> RequestConfig {
        RequestConfig::new()
            .base_url("http://api.example.com/v1")
            .header("X-Client", "migmig")
    }

    #[test]
    fn request_sends_resolved_request() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults(), &transport);

        let response = client
            .request(&RequestConfig::new().method("DELETE").url("users/7"))
            .unwrap();
        assert_eq!(response.status, 200);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[0].url.as_str(), "http://api.example.com/v1/users/7");
        assert_eq!(sent[0].headers["X-Client"], "migmig");
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn convenience_methods_preset_method_and_url() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults(), &transport);

        client.get("a", None).unwrap();
        client.post("b", None).unwrap();
        client.put("c", None).unwrap();
        client.delete("d", None).unwrap();
        client.patch("e", None).unwrap();
        client.head("f", None).unwrap();
        client.options("g", None).unwrap();

        let sent: Vec<(HttpMethod, String)> = transport
            .sent()
            .into_iter()
            .map(|r| (r.method, r.url.path().to_string()))
            .collect();
        assert_eq!(
            sent,
            vec![
                (HttpMethod::Get, "/v1/a".to_string()),
                (HttpMethod::Post, "/v1/b".to_string()),
                (HttpMethod::Put, "/v1/c".to_string()),
                (HttpMethod::Delete, "/v1/d".to_string()),
                (HttpMethod::Patch, "/v1/e".to_string()),
                (HttpMethod::Head, "/v1/f".to_string()),
                (HttpMethod::Options, "/v1/g".to_string()),
            ]
        );
    }

    #[test]
    fn convenience_method_overrides_config_method_and_url() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults(), &transport);

        let config = RequestConfig::new()
            .method("GET")
            .url("ignored")
            .body_field("name", "alice");
        client.post("users", Some(config)).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url.as_str(), "http://api.example.com/v1/users");
        assert_eq!(sent[0].body.as_deref(), Some(br#"{"name":"alice"}"#.as_slice()));
    }

    #[test]
    fn missing_method_sends_nothing() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults(), &transport);

        let err = client.request(&RequestConfig::new().url("users")).unwrap_err();
        assert!(matches!(err, RequestError::MethodMissing));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn invalid_default_method_is_reported() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults().method("FETCH"), &transport);

        let err = client.request(&RequestConfig::new().url("users")).unwrap_err();
        assert!(matches!(err, RequestError::InvalidMethod(ref m) if m == "FETCH"));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn custom_encoder_failure_sends_nothing() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults(), &transport).with_encoder(RejectingEncoder);

        let config = RequestConfig::new().body_field("a", 1);
        let err = client.put("users/1", Some(config.clone())).unwrap_err();
        assert!(matches!(err, RequestError::SerializationError(_)));
        assert!(transport.sent().is_empty());

        // GET never reaches the encoder.
        client.get("users/1", Some(config)).unwrap();
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn transport_error_is_propagated() {
        let client = Client::with_transport(defaults(), FailingTransport);
        let err = client.get("users", None).unwrap_err();
        assert!(matches!(err, RequestError::TransportError(_)));
        assert_eq!(err.to_string(), "transport failed: connection refused");
    }

    #[test]
    fn build_request_matches_sent_request() {
        let transport = RecordingTransport::default();
        let client = Client::with_transport(defaults().method("GET"), &transport);
        let config = RequestConfig::new().url("users").query_param("page", "1");

        let built = client.build_request(&config).unwrap();
        client.request(&config).unwrap();
        assert_eq!(transport.sent(), vec![built]);
    }

    #[test]
    fn concurrent_calls_share_defaults() {
        let transport = Arc::new(RecordingTransport::default());
        let client = Client::with_transport(defaults().method("GET"), Arc::clone(&transport));
        let snapshot = client.defaults().clone();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let client = &client;
                scope.spawn(move || {
                    let config = RequestConfig::new()
                        .url(format!("items/{i}"))
                        .header("X-Client", format!("worker-{i}"));
                    client.request(&config).unwrap();
                });
            }
        });

        let mut paths: Vec<String> = transport
            .sent()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        paths.sort();
        let expected: Vec<String> = (0..8).map(|i| format!("/v1/items/{i}")).collect();
        assert_eq!(paths, expected);
        assert_eq!(client.defaults(), &snapshot);
    }

    #[test]
    fn new_client_has_empty_defaults() {
        let client = Client::new();
        assert_eq!(client.defaults(), &RequestConfig::default());
        let err = client.build_request(&RequestConfig::new()).unwrap_err();
        assert!(matches!(err, RequestError::MethodMissing));
    }
}
