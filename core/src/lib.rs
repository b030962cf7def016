//! HTTP request builder with layered defaults.
//!
//! # Overview
//! A `Client` holds default request settings (base URL, method, headers,
//! query parameters, body). Each call supplies a `RequestConfig` that
//! overrides only what differs; the two layers are resolved into an
//! `HttpRequest` and handed to a `Transport`.
//!
//! # Design
//! - Resolution (`resolve`) is pure: method, URL, body, query parameters and
//!   headers are computed from borrowed inputs, and the first failing stage
//!   aborts before any I/O.
//! - Headers and query parameters merge key by key; every other field is a
//!   whole-value override.
//! - I/O lives behind `Transport`; `UreqTransport` is the default.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod merge;
pub mod resolve;
pub mod transport;

pub use client::Client;
pub use config::RequestConfig;
pub use encode::{BodyEncoder, JsonEncoder};
pub use error::RequestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
