//! Request body encoding.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::RequestError;

/// Turns a resolved body map into the bytes sent on the wire.
pub trait BodyEncoder: fmt::Debug + Send + Sync {
    fn encode(&self, body: &Map<String, Value>) -> Result<Vec<u8>, RequestError>;
}

/// Compact JSON via `serde_json`. Keys come out sorted, so equal maps always
/// encode to equal bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl BodyEncoder for JsonEncoder {
    fn encode(&self, body: &Map<String, Value>) -> Result<Vec<u8>, RequestError> {
        serde_json::to_vec(body).map_err(|e| RequestError::SerializationError(e.to_string()))
    }
}
