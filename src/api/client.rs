//
//  open-toolchain-sdk
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # HTTP Envelope for the Open Toolchain API
//!
//! This module provides the core HTTP machinery shared by every operation.
//! It handles request construction, authentication, retries, cancellation
//! and response capture.
//!
//! ## Features
//!
//! - Path segments are percent-encoded onto the base URL
//! - Envelope headers first, per-call headers second (they win on collision)
//! - `Authorization` and `Content-Type` stay under envelope control
//! - Opt-in retries with exponential backoff, see [`retry`](super::retry)
//! - Every call runs inside a [`RequestContext`]
//! - A [`DetailedResponse`] is always captured for diagnostics

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::api::common::{ApiResponse, ErrorEnvelope, Result, SdkError};
use crate::api::context::RequestContext;
use crate::api::retry::{self, RetryPolicy};
use crate::auth::Authenticator;

/// Header carrying SDK analytics for every request.
pub const SDK_ANALYTICS_HEADER: &str = "X-IBMCloud-SDK-Analytics";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Parses an Open Toolchain error response and extracts a user-friendly message.
///
/// The structured [`ErrorEnvelope`] is returned alongside the message when the
/// body is JSON. If nothing useful can be extracted, the message falls back to
/// the status line and the raw body.
pub fn format_api_error(status: StatusCode, body: &str) -> (String, Option<ErrorEnvelope>) {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.message() {
            return (message, Some(envelope));
        }
        if envelope != ErrorEnvelope::default() {
            return (status_text(status), Some(envelope));
        }
    }

    if body.trim().is_empty() {
        (status_text(status), None)
    } else {
        (format!("API error ({}): {}", status, body.trim()), None)
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Transport-level result of a call: status, headers and body bytes.
///
/// Header names are stored lowercase; one name may map to several values.
///
/// # Example
///
/// ```rust
/// use open_toolchain::api::DetailedResponse;
///
/// let raw = DetailedResponse::new(200, vec![("Content-Type", "application/json")], b"{}".to_vec());
/// assert_eq!(raw.header("content-type"), Some("application/json"));
/// assert!(raw.is_json());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailedResponse {
    /// The HTTP status code.
    pub status_code: u16,

    /// Response headers, lowercase name to values.
    pub headers: HashMap<String, Vec<String>>,

    /// The response body as received.
    pub body: Vec<u8>,
}

impl DetailedResponse {
    /// Builds a response by hand; mostly useful in tests.
    pub fn new<K, V>(status_code: u16, headers: Vec<(K, V)>, body: Vec<u8>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            map.entry(name.as_ref().to_ascii_lowercase())
                .or_default()
                .push(value.into());
        }
        Self {
            status_code,
            headers: map,
            body,
        }
    }

    async fn from_response(response: reqwest::Response) -> std::result::Result<Self, reqwest::Error> {
        let status_code = response.status().as_u16();
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let body = response.bytes().await?.to_vec();

        Ok(Self {
            status_code,
            headers,
            body,
        })
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the body is absent or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Whether the response declares a JSON content type.
    pub fn is_json(&self) -> bool {
        self.header("content-type").is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case(JSON_CONTENT_TYPE) || mime.ends_with("+json")
        })
    }
}

/// Decodes a success response into `T`.
///
/// An empty body yields `result: None`. A body that is not valid JSON for `T`
/// yields [`SdkError::Decode`] with the raw response attached.
pub fn decode_response<T: DeserializeOwned>(raw: DetailedResponse) -> Result<ApiResponse<T>> {
    if raw.is_empty() {
        return Ok(ApiResponse { result: None, raw });
    }

    if raw.header("content-type").is_some() && !raw.is_json() {
        let message = format!(
            "unexpected content type '{}'",
            raw.header("content-type").unwrap_or_default()
        );
        return Err(SdkError::Decode {
            message,
            response: Box::new(raw),
        });
    }

    match serde_json::from_slice::<T>(&raw.body) {
        Ok(result) => Ok(ApiResponse {
            result: Some(result),
            raw,
        }),
        Err(err) => Err(SdkError::Decode {
            message: err.to_string(),
            response: Box::new(raw),
        }),
    }
}

/// A prepared request for one operation.
///
/// Operations build a `RequestSpec` from their options and hand it to
/// [`ServiceClient::execute`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    operation_id: &'static str,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    expected: &'static [u16],
    accept_json: bool,
}

impl RequestSpec {
    pub fn new(method: Method, operation_id: &'static str) -> Self {
        Self {
            method,
            operation_id,
            segments: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            expected: &[],
            accept_json: false,
        }
    }

    /// Appends literal path segments, e.g. `&["devops", "toolchains"]`.
    pub fn path(mut self, segments: &[&str]) -> Self {
        self.segments
            .extend(segments.iter().map(|s| (*s).to_string()));
        self
    }

    /// Appends one path parameter; it is percent-encoded.
    pub fn path_param(mut self, value: &str) -> Self {
        self.segments.push(value.to_string());
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v.to_string()),
            None => self,
        }
    }

    /// Adds the caller's per-call headers.
    pub fn headers(mut self, headers: &HashMap<String, String>) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Serializes `body` as the JSON request body.
    pub fn json_body<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| SdkError::Validation(format!("failed to serialize request body: {e}")))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Status codes the endpoint documents as success.
    pub fn success_codes(mut self, codes: &'static [u16]) -> Self {
        self.expected = codes;
        self
    }

    /// Sends `Accept: application/json`.
    pub fn accept_json(mut self) -> Self {
        self.accept_json = true;
        self
    }

    /// GET, PUT and DELETE may be replayed; POST and PATCH may not.
    pub fn is_idempotent(&self) -> bool {
        matches!(self.method, Method::GET | Method::PUT | Method::DELETE | Method::HEAD)
    }

    /// Resolves the full URL against `base_url`.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url =
            Url::parse(base_url).map_err(|e| SdkError::InvalidServiceUrl(format!("{base_url}: {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SdkError::InvalidServiceUrl(base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Merges envelope headers and per-call headers.
    pub fn header_map(&self, defaults: &HeaderMap) -> Result<HeaderMap> {
        let mut map = defaults.clone();

        let analytics = format!(
            "service_name={};service_version=V1;operation_id={}",
            crate::DEFAULT_SERVICE_NAME,
            self.operation_id
        );
        map.insert(
            HeaderName::from_static("x-ibmcloud-sdk-analytics"),
            header_value(&analytics)?,
        );
        if self.accept_json {
            map.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SdkError::Validation(format!("invalid header name '{name}': {e}")))?;
            if name == AUTHORIZATION || name == CONTENT_TYPE {
                continue;
            }
            map.insert(name, header_value(value)?);
        }

        if self.body.is_some() {
            map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        } else {
            map.remove(CONTENT_TYPE);
        }
        map.remove(AUTHORIZATION);

        Ok(map)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SdkError::Validation(format!("invalid header value '{value}': {e}")))
}

/// Validates and normalizes a service URL.
///
/// An empty URL is accepted so it can be set later; anything else must be an
/// absolute URL without stray braces or quotes. Trailing slashes are removed.
pub fn normalize_service_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if has_bad_first_or_last_char(trimmed) {
        return Err(SdkError::InvalidServiceUrl(format!(
            "{trimmed}: remove the surrounding braces or quotes"
        )));
    }
    let parsed = Url::parse(trimmed).map_err(|e| SdkError::InvalidServiceUrl(format!("{trimmed}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(SdkError::InvalidServiceUrl(trimmed.to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// True when a value starts or ends with `{`, `}` or `"`.
pub(crate) fn has_bad_first_or_last_char(value: &str) -> bool {
    let bad = |c: char| matches!(c, '{' | '}' | '"');
    value.starts_with(bad) || value.ends_with(bad)
}

/// Mutable settings snapshotted at the start of each request.
#[derive(Debug, Clone)]
struct ClientState {
    url: String,
    retry: RetryPolicy,
    default_headers: HeaderMap,
    http: Client,
    disable_ssl: bool,
}

/// The HTTP engine behind [`OpenToolchainV1`](crate::OpenToolchainV1).
///
/// URL, retry policy, default headers and the underlying `reqwest::Client` sit
/// behind a lock; each request reads a consistent snapshot when it is prepared.
/// The authenticator is shared by reference between clones.
#[derive(Debug)]
pub struct ServiceClient {
    authenticator: Arc<Authenticator>,
    state: RwLock<ClientState>,
}

impl ServiceClient {
    /// Creates a client for `url` using `authenticator`.
    pub fn new(url: &str, authenticator: Arc<Authenticator>) -> Result<Self> {
        let url = normalize_service_url(url)?;
        Ok(Self {
            authenticator,
            state: RwLock::new(ClientState {
                url,
                retry: RetryPolicy::default(),
                default_headers: HeaderMap::new(),
                http: build_http_client(false)?,
                disable_ssl: false,
            }),
        })
    }

    fn snapshot(&self) -> ClientState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut ClientState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    pub fn service_url(&self) -> String {
        self.snapshot().url
    }

    pub fn set_service_url(&self, url: &str) -> Result<()> {
        let url = normalize_service_url(url)?;
        self.update(|state| state.url = url);
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.snapshot().retry
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy) {
        self.update(|state| state.retry = policy);
    }

    pub fn default_headers(&self) -> HeaderMap {
        self.snapshot().default_headers
    }

    pub fn set_default_headers(&self, headers: HeaderMap) {
        self.update(|state| state.default_headers = headers);
    }

    pub fn ssl_verification_disabled(&self) -> bool {
        self.snapshot().disable_ssl
    }

    /// Rebuilds the transport so server certificates are not verified.
    pub fn disable_ssl_verification(&self) -> Result<()> {
        let http = build_http_client(true)?;
        self.update(|state| {
            state.http = http;
            state.disable_ssl = true;
        });
        Ok(())
    }

    /// Executes `spec` inside `ctx`, retrying according to the current policy.
    ///
    /// # Errors
    ///
    /// - [`SdkError::ServiceUrlMissing`] when no URL is configured
    /// - [`SdkError::Cancelled`] when `ctx` fires first
    /// - [`SdkError::Transport`] for network failures that exhausted retries
    /// - [`SdkError::Http`] for non-2xx responses, with the raw response attached
    pub async fn execute(&self, ctx: &RequestContext, spec: RequestSpec) -> Result<DetailedResponse> {
        let state = self.snapshot();
        if state.url.is_empty() {
            return Err(SdkError::ServiceUrlMissing);
        }

        let url = spec.url(&state.url)?;
        let headers = spec.header_map(&state.default_headers)?;

        ctx.run(self.send_with_retries(ctx, &state, &spec, url, headers))
            .await
    }

    async fn send_with_retries(
        &self,
        ctx: &RequestContext,
        state: &ClientState,
        spec: &RequestSpec,
        url: Url,
        headers: HeaderMap,
    ) -> Result<DetailedResponse> {
        let policy = state.retry;
        let allowed = policy.retries_allowed();
        let idempotent = spec.is_idempotent();
        let mut attempt: u32 = 0;

        loop {
            let mut request = state
                .http
                .request(spec.method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = &spec.body {
                request = request.body(body.clone());
            }
            let request = self.authenticator.authenticate(ctx, request).await?;

            debug!(
                operation = spec.operation_id,
                method = %spec.method,
                url = %url,
                attempt,
                "Sending request"
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if attempt < allowed && retry::is_retryable_status(status, idempotent) {
                        let retry_after = retry::parse_retry_after(
                            response
                                .headers()
                                .get(RETRY_AFTER)
                                .and_then(|v| v.to_str().ok()),
                        );
                        let delay = policy.backoff(attempt, retry_after);
                        warn!(
                            operation = spec.operation_id,
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request after retryable status"
                        );
                        drop(response);
                        ctx.sleep(delay).await?;
                        attempt += 1;
                        continue;
                    }

                    let raw = DetailedResponse::from_response(response).await?;
                    debug!(
                        operation = spec.operation_id,
                        status = raw.status_code,
                        bytes = raw.body.len(),
                        "Received response"
                    );
                    return check_status(spec, raw);
                }
                Err(err) => {
                    if attempt < allowed && retry::is_retryable_transport(&err, idempotent) {
                        let delay = policy.backoff(attempt, None);
                        warn!(
                            operation = spec.operation_id,
                            error = %err,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request after transport error"
                        );
                        ctx.sleep(delay).await?;
                        attempt += 1;
                        continue;
                    }
                    return Err(SdkError::Transport(err));
                }
            }
        }
    }
}

impl Clone for ServiceClient {
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
            state: RwLock::new(self.snapshot()),
        }
    }
}

fn check_status(spec: &RequestSpec, raw: DetailedResponse) -> Result<DetailedResponse> {
    let status = StatusCode::from_u16(raw.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_success() {
        if !spec.expected.is_empty() && !spec.expected.contains(&raw.status_code) {
            debug!(
                operation = spec.operation_id,
                status = raw.status_code,
                expected = ?spec.expected,
                "Success status differs from the documented one"
            );
        }
        return Ok(raw);
    }

    let (message, envelope) = format_api_error(status, &raw.body_text());
    Err(SdkError::Http {
        message,
        envelope,
        response: Box::new(raw),
    })
}

fn build_http_client(disable_ssl: bool) -> Result<Client> {
    Client::builder()
        .user_agent(format!("open-toolchain-sdk/{}", crate::VERSION))
        .danger_accept_invalid_certs(disable_ssl)
        .build()
        .map_err(SdkError::Transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_api_error_envelope() {
        let (message, envelope) = format_api_error(
            StatusCode::NOT_FOUND,
            r#"{"errors":[{"code":"not_found","message":"Toolchain not found"}]}"#,
        );
        assert_eq!(message, "Toolchain not found");
        assert!(envelope.is_some());
    }

    #[test]
    fn test_format_api_error_fallbacks() {
        let (message, envelope) = format_api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(message, "Bad Gateway");
        assert!(envelope.is_none());

        let (message, _) = format_api_error(StatusCode::BAD_REQUEST, "plain text");
        assert!(message.contains("plain text"));
    }

    #[test]
    fn test_spec_url_encodes_segments_and_query() {
        let spec = RequestSpec::new(Method::GET, "GetToolchain")
            .path(&["devops", "toolchains"])
            .path_param("a b/c")
            .query("env_id", "ibm:yp:us-south");
        let url = spec.url("https://cloud.ibm.com/").unwrap();
        assert_eq!(url.path(), "/devops/toolchains/a%20b%2Fc");
        assert_eq!(url.query(), Some("env_id=ibm%3Ayp%3Aus-south"));
    }

    #[test]
    fn test_spec_url_keeps_base_path() {
        let spec = RequestSpec::new(Method::GET, "GetToolchain")
            .path(&["devops", "toolchains"])
            .path_param("g");
        let url = spec.url("https://example.com/api").unwrap();
        assert_eq!(url.path(), "/api/devops/toolchains/g");
    }

    #[test]
    fn test_header_precedence() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-team", HeaderValue::from_static("default"));

        let mut user = HashMap::new();
        user.insert("X-Team".to_string(), "caller".to_string());
        user.insert("Authorization".to_string(), "Bearer sneaky".to_string());
        user.insert("Content-Type".to_string(), "text/plain".to_string());

        let spec = RequestSpec::new(Method::PATCH, "PatchToolchain")
            .headers(&user)
            .json_body(&serde_json::json!({"name": "n"}))
            .unwrap();
        let map = spec.header_map(&defaults).unwrap();

        assert_eq!(map.get("x-team").unwrap(), "caller");
        assert!(map.get(AUTHORIZATION).is_none());
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(map
            .get(SDK_ANALYTICS_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("operation_id=PatchToolchain"));
    }

    #[test]
    fn test_normalize_service_url() {
        assert_eq!(normalize_service_url("").unwrap(), "");
        assert_eq!(
            normalize_service_url("https://cloud.ibm.com/").unwrap(),
            "https://cloud.ibm.com"
        );
        assert!(normalize_service_url("{BAD_URL_STRING").is_err());
        assert!(normalize_service_url("not a url").is_err());
        assert!(normalize_service_url("\"https://cloud.ibm.com\"").is_err());
    }

    #[test]
    fn test_decode_empty_and_invalid() {
        let empty = DetailedResponse::new::<&str, String>(200, vec![], Vec::new());
        let decoded: ApiResponse<serde_json::Value> = decode_response(empty).unwrap();
        assert!(decoded.result.is_none());

        let invalid = DetailedResponse::new(
            200,
            vec![("Content-Type", "application/json")],
            b"} this is not valid json {".to_vec(),
        );
        let err = decode_response::<serde_json::Value>(invalid).unwrap_err();
        assert!(err.to_string().contains("response processing error"));
        assert!(err.response().is_some());
    }

    #[test]
    fn test_idempotency() {
        assert!(RequestSpec::new(Method::GET, "x").is_idempotent());
        assert!(RequestSpec::new(Method::DELETE, "x").is_idempotent());
        assert!(!RequestSpec::new(Method::POST, "x").is_idempotent());
        assert!(!RequestSpec::new(Method::PATCH, "x").is_idempotent());
    }
}
