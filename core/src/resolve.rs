//! Resolution of a defaults layer and a per-call layer into one request.
//!
//! # Design
//! Each stage is a free function over borrowed inputs so it can be tested on
//! its own and never touches the defaults it reads. `resolve` runs the stages
//! in order (method, URL, body, query, headers) and stops at the first error,
//! before any byte reaches a transport.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;
use url::Url;

use crate::config::RequestConfig;
use crate::encode::BodyEncoder;
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest};
use crate::merge::{merge_maps, pick, pick_str};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Resolve the effective method.
pub fn resolve_method(
    per_call: Option<&str>,
    default: Option<&str>,
) -> Result<HttpMethod, RequestError> {
    pick_str(per_call, default)
        .ok_or(RequestError::MethodMissing)?
        .parse()
}

/// Resolve the effective absolute URL.
///
/// A target that parses as an absolute URL is returned as is and the base is
/// ignored. Anything else is joined onto the base.
pub fn resolve_url(
    per_call_url: Option<&str>,
    per_call_base: Option<&str>,
    default_url: Option<&str>,
    default_base: Option<&str>,
) -> Result<Url, RequestError> {
    let target = pick_str(per_call_url, default_url).unwrap_or_default();
    let base = pick_str(per_call_base, default_base).unwrap_or_default();

    match Url::parse(target) {
        Ok(absolute) => return Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(source) => return Err(RequestError::url(target, source)),
    }

    let mut resolved = Url::parse(base).map_err(|source| RequestError::url(base, source))?;
    join_reference(&mut resolved, target);
    trace!(base, target, resolved = %resolved, "joined relative url onto base");
    Ok(resolved)
}

/// Apply a relative reference to `base`: its path is appended segment by
/// segment, its query and fragment (when present) replace the base's.
fn join_reference(base: &mut Url, reference: &str) {
    let (rest, fragment) = match reference.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (reference, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    if !path.is_empty() {
        let joined = join_path(base.path(), path);
        base.set_path(&joined);
    }
    if query.is_some() {
        base.set_query(query);
    }
    if fragment.is_some() {
        base.set_fragment(fragment);
    }
}

/// Concatenate path segments, dropping empty ones. Dot segments are kept.
fn join_path(base: &str, relative: &str) -> String {
    let segments: Vec<&str> = base
        .split('/')
        .chain(relative.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Resolve the effective body and encode it if `method` allows one.
///
/// The encoder is not called when the result is absent.
pub fn resolve_body(
    per_call: &Map<String, Value>,
    default: &Map<String, Value>,
    method: HttpMethod,
    encoder: &dyn BodyEncoder,
) -> Result<Option<Vec<u8>>, RequestError> {
    let body = pick(per_call, default);
    if body.is_empty() || !method.accepts_body() {
        return Ok(None);
    }
    encoder.encode(body).map(Some)
}

/// Merge headers and fill in `Content-Type: application/json` when no
/// `Content-Type` key (exact spelling) is present.
pub fn merge_headers(
    defaults: &BTreeMap<String, String>,
    per_call: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = merge_maps(defaults, per_call);
    merged
        .entry(CONTENT_TYPE.to_string())
        .or_insert_with(|| DEFAULT_CONTENT_TYPE.to_string());
    merged
}

pub fn merge_query_params(
    defaults: &BTreeMap<String, String>,
    per_call: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    merge_maps(defaults, per_call)
}

/// Encode `params` onto the query already present on `url`.
///
/// Existing pairs keep their order unless `params` carries their key, in
/// which case the value from `params` replaces them. `params` is appended in
/// key order. An empty `params` leaves `url` untouched.
pub fn apply_query_params(url: &mut Url, params: &BTreeMap<String, String>) {
    if params.is_empty() {
        return;
    }
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.contains_key(key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    for (key, value) in &retained {
        query.append_pair(key, value);
    }
    for (key, value) in params {
        query.append_pair(key, value);
    }
}

/// Run every stage and assemble the outgoing request.
pub fn resolve(
    defaults: &RequestConfig,
    per_call: &RequestConfig,
    encoder: &dyn BodyEncoder,
) -> Result<HttpRequest, RequestError> {
    let method = resolve_method(per_call.method.as_deref(), defaults.method.as_deref())?;
    let mut url = resolve_url(
        per_call.url.as_deref(),
        per_call.base_url.as_deref(),
        defaults.url.as_deref(),
        defaults.base_url.as_deref(),
    )?;
    let body = resolve_body(&per_call.body, &defaults.body, method, encoder)?;

    let query = merge_query_params(&defaults.query_params, &per_call.query_params);
    apply_query_params(&mut url, &query);
    let headers = merge_headers(&defaults.headers, &per_call.headers);

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}
