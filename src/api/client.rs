//
//  zentao-gateway
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the ZenTao API
//!
//! This module provides the core client for interacting with a ZenTao
//! instance: the transport primitive that performs one bounded HTTP
//! exchange, and the generic call operation every domain operation funnels
//! through.
//!
//! ## Features
//!
//! - Implicit authentication: every call resolves a token first
//! - Uniform response envelopes for success and failure
//! - Content-type-driven body decoding with graceful degradation
//! - Bounded timeouts on every exchange
//! - Custom User-Agent header
//!
//! ## Example
//!
//! ```rust,no_run
//! use zentao_gateway::api::client::ApiRequest;
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let client = ZentaoClient::new(config)?;
//!
//! let envelope = client.call(ApiRequest::get("/projects")).await?;
//! println!("status {}", envelope.status);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::common::{ApiError, ResponseEnvelope, MAX_ERROR_BODY_CHARS};
use crate::api::url::resolve_url;
use crate::auth::{TokenManager, TokenSource};
use crate::config::GatewayConfig;
use crate::util::{is_json_content_type, mask_token, truncate};

/// The fixed request header carrying the session token.
pub const TOKEN_HEADER: &str = "Token";

/// Describes one API request.
///
/// Transient: constructed per call, consumed by [`ZentaoClient::call`],
/// never retained.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use zentao_gateway::api::client::ApiRequest;
///
/// let request = ApiRequest::post("/bugs/42/resolve")
///     .with_body(json!({"resolution": "fixed"}));
/// assert_eq!(request.method, "POST");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Relative request path, resolved against the configured prefix.
    pub path: String,

    /// HTTP method name; case-normalized to uppercase before dispatch.
    pub method: String,

    /// Query entries; `None` values are omitted from the URL.
    pub query: Vec<(String, Option<String>)>,

    /// Optional JSON body. Bodies are only ever sent as JSON.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a GET request for the given path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: "GET".to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request for the given path.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            ..Self::get(path)
        }
    }

    /// Replaces the query entries.
    pub fn with_query(mut self, query: Vec<(String, Option<String>)>) -> Self {
        self.query = query;
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The credential surface returned by [`ZentaoClient::token_info`].
///
/// The token is masked unless the configuration sets `reveal_token`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    /// The token, masked by default.
    pub token: String,

    /// Whether the token came from the cache or a fresh login.
    pub source: TokenSource,
}

/// Decides whether an error means the upstream demands a product scope.
type ScopePredicate = Box<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Default scope detection: an HTTP error whose body mentions a required
/// product. The upstream only signals this condition through free text, so
/// this stays a heuristic; replace it via
/// [`ZentaoClient::with_scope_predicate`] when a deployment phrases it
/// differently.
pub fn default_scope_predicate(error: &ApiError) -> bool {
    let ApiError::Http { body, .. } = error else {
        return false;
    };
    let body = body.to_ascii_lowercase();
    body.contains("product") && (body.contains("required") || body.contains("must"))
}

/// The main client for interacting with a ZenTao instance.
///
/// The client owns its HTTP handle, its configuration and its token cache.
/// Independent client instances keep fully independent credential state.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use zentao_gateway::{GatewayConfig, ZentaoClient};
///
/// let config = GatewayConfig::new("https://zentao.example.com")
///     .with_credentials("bot", "secret");
/// let client = ZentaoClient::new(config)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct ZentaoClient {
    /// The underlying HTTP client.
    http: reqwest::Client,
    /// Immutable gateway configuration.
    config: GatewayConfig,
    /// The cached-credential owner.
    tokens: TokenManager,
    /// Pluggable detection of scope-required upstream errors.
    scope_predicate: ScopePredicate,
}

impl ZentaoClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(format!("zentao-gateway/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            config,
            tokens: TokenManager::new(),
            scope_predicate: Box::new(default_scope_predicate),
        })
    }

    /// Replaces the scope-required detection predicate.
    ///
    /// This method uses the builder pattern and returns `self` for
    /// chaining. The default predicate is [`default_scope_predicate`].
    pub fn with_scope_predicate(
        mut self,
        predicate: impl Fn(&ApiError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.scope_predicate = Box::new(predicate);
        self
    }

    /// Returns the client's configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Performs one authenticated API call.
    ///
    /// The single primitive every domain operation composes: resolve a
    /// current token (logging in when needed), build the absolute URL,
    /// dispatch the request and return the normalized envelope. Token and
    /// transport failures propagate unchanged so callers can inspect
    /// status codes.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] for an unsupported HTTP method
    /// - [`ApiError::InvalidPath`] for empty or absolute paths
    /// - Token manager failures (see
    ///   [`TokenManager::get_token`](crate::auth::TokenManager::get_token))
    /// - Transport failures: [`ApiError::Http`], [`ApiError::Timeout`],
    ///   [`ApiError::Network`]
    pub async fn call(&self, request: ApiRequest) -> Result<ResponseEnvelope> {
        let (token, _) = self
            .tokens
            .get_token(&self.http, &self.config, false)
            .await?;

        let method = parse_method(&request.method)?;
        let url = resolve_url(
            &self.config.base_url,
            &self.config.api_prefix,
            &request.path,
            &request.query,
        )?;

        let envelope = dispatch(
            &self.http,
            method,
            url,
            Some(&token),
            request.body.as_ref(),
            self.config.timeout_ms,
        )
        .await?;

        Ok(envelope)
    }

    /// Makes an authenticated GET request.
    pub async fn get(
        &self,
        path: &str,
        query: Vec<(String, Option<String>)>,
    ) -> Result<ResponseEnvelope> {
        self.call(ApiRequest::get(path).with_query(query)).await
    }

    /// Makes an authenticated POST request with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> Result<ResponseEnvelope> {
        self.call(ApiRequest::post(path).with_body(body)).await
    }

    /// Returns the current credential and its source.
    ///
    /// The token is masked unless the configuration sets `reveal_token`.
    /// `force` re-authenticates even when a fresh cached token exists.
    pub async fn token_info(&self, force: bool) -> Result<TokenInfo> {
        let (token, source) = self.tokens.get_token(&self.http, &self.config, force).await?;

        let token = if self.config.reveal_token {
            token
        } else {
            mask_token(&token)
        };

        Ok(TokenInfo { token, source })
    }

    /// Checks whether an error chain matches the scope-required predicate.
    pub(crate) fn scope_required(&self, error: &anyhow::Error) -> bool {
        error
            .downcast_ref::<ApiError>()
            .map(|api_error| (self.scope_predicate)(api_error))
            .unwrap_or(false)
    }
}

/// Normalizes a method name to a `reqwest::Method`.
fn parse_method(method: &str) -> Result<Method, ApiError> {
    let normalized = method.trim().to_ascii_uppercase();
    Method::from_bytes(normalized.as_bytes())
        .map_err(|_| ApiError::Validation(format!("unsupported HTTP method '{}'", method)))
}

/// Performs one HTTP exchange bounded by a timeout.
///
/// The transport primitive shared by the generic call operation and the
/// login flow. Success and failure are both normalized: the body is decoded
/// as JSON only when the content type indicates JSON (a JSON-declared body
/// that fails to parse degrades to raw text rather than masking the
/// response with a parse error), and a non-2xx status becomes
/// [`ApiError::Http`] carrying the truncated body.
pub(crate) async fn dispatch(
    http: &reqwest::Client,
    method: Method,
    url: Url,
    token: Option<&str>,
    body: Option<&Value>,
    timeout_ms: u64,
) -> Result<ResponseEnvelope, ApiError> {
    tracing::debug!(%method, %url, "dispatching request");

    let mut request = http
        .request(method, url)
        .timeout(Duration::from_millis(timeout_ms.max(1)));
    if let Some(token) = token {
        request = request.header(TOKEN_HEADER, token);
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|error| classify_transport_error(error, timeout_ms))?;

    let status = response.status();
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|printable| (name.as_str().to_string(), printable.to_string()))
        })
        .collect();
    let content_type = headers.get("content-type").cloned().unwrap_or_default();

    let text = response
        .text()
        .await
        .map_err(|error| classify_transport_error(error, timeout_ms))?;
    let data = decode_body(&content_type, text);

    if !status.is_success() {
        let body_text = match &data {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };
        return Err(ApiError::Http {
            status: status.as_u16(),
            body: truncate(&body_text, MAX_ERROR_BODY_CHARS),
        });
    }

    tracing::debug!(status = status.as_u16(), "request completed");
    Ok(ResponseEnvelope {
        status: status.as_u16(),
        headers,
        data,
    })
}

/// Maps a transport failure onto the gateway's error kinds.
fn classify_transport_error(error: reqwest::Error, timeout_ms: u64) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(timeout_ms)
    } else {
        ApiError::Network(error)
    }
}

/// Decodes a response body according to its declared content type.
fn decode_body(content_type: &str, text: String) -> Value {
    if is_json_content_type(content_type) {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(%error, "JSON-declared body failed to parse, keeping raw text");
                Value::String(text)
            }
        }
    } else {
        Value::String(text)
    }
}
