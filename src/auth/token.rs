//
//  zentao-gateway
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Token Lifecycle Management
//!
//! ZenTao issues short-lived session tokens through a login endpoint. This
//! module owns the single cached token and decides, per call, whether the
//! cached value is still usable or a fresh login is needed.
//!
//! # Lifecycle
//!
//! A token is considered expired when it was never set, never timestamped,
//! or its age exceeds the configured TTL. [`TokenManager::get_token`]
//! returns the cached token when it is fresh and performs a login
//! otherwise; `force` skips the cache entirely. The returned
//! [`TokenSource`] tells the caller which branch was taken.
//!
//! # Concurrent Refresh
//!
//! The cache lock is held only to read or overwrite the credential, never
//! across the login request itself. Two callers that both observe an
//! expired token will therefore both log in, and the later response wins
//! the cache. Logins are idempotent upstream, so this costs at most a
//! redundant request; refreshes are deliberately not deduplicated.
//!
//! # Response Probing
//!
//! The login response's shape is not guaranteed, so the token is probed by
//! an ordered list of strategies (`token`, `data.token`,
//! `data.session.token`). When none matches the login fails loudly with
//! [`ApiError::TokenFieldMissing`] instead of caching an empty credential.

use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::client::dispatch;
use crate::api::common::ApiError;
use crate::api::url::resolve_url;
use crate::config::GatewayConfig;

/// Where a returned token came from.
///
/// Serialized as `"cache"` / `"login"` for result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// An unexpired cached token was reused.
    Cache,
    /// A login request was performed.
    Login,
}

/// A cached bearer credential and the moment it was obtained.
#[derive(Debug, Clone)]
pub struct Credential {
    /// The opaque token string sent with every request.
    pub token: String,

    /// When the token was obtained. Age is measured against this.
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential timestamped now.
    pub fn new(token: String) -> Self {
        Self {
            token,
            obtained_at: Utc::now(),
        }
    }

    /// Checks whether this credential's age exceeds the given TTL.
    pub fn is_expired(&self, ttl_ms: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.obtained_at);
        age > Duration::milliseconds(ttl_ms.min(i64::MAX as u64) as i64)
    }
}

/// One way of locating the token inside a login response.
type TokenStrategy = fn(&Value) -> Option<String>;

/// `body.token`
fn token_named_field(body: &Value) -> Option<String> {
    body.get("token")?.as_str().map(str::to_owned)
}

/// `body.data.token`
fn token_data_field(body: &Value) -> Option<String> {
    body.get("data")?.get("token")?.as_str().map(str::to_owned)
}

/// `body.data.session.token`
fn token_session_field(body: &Value) -> Option<String> {
    body.get("data")?
        .get("session")?
        .get("token")?
        .as_str()
        .map(str::to_owned)
}

const TOKEN_STRATEGIES: &[TokenStrategy] =
    &[token_named_field, token_data_field, token_session_field];

/// Probes a login response body for the token, trying each known shape in
/// order.
pub(crate) fn probe_token(body: &Value) -> Option<String> {
    TOKEN_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body))
        .filter(|token| !token.is_empty())
}

/// Owns the single cached credential for one client instance.
///
/// Each [`ZentaoClient`](crate::ZentaoClient) holds its own manager; there
/// is no process-wide credential state, so independent clients (for
/// example, one per tenant) keep independent sessions.
#[derive(Debug, Default)]
pub struct TokenManager {
    cached: Mutex<Option<Credential>>,
}

impl TokenManager {
    /// Creates a manager with an empty cache.
    pub fn new() -> Self {
        Self {
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid token, logging in when the cache cannot be used.
    ///
    /// # Parameters
    ///
    /// * `http` - The client's HTTP handle
    /// * `config` - Gateway configuration (credentials, endpoints, TTL)
    /// * `force` - Re-authenticate even if the cached token is fresh
    ///
    /// # Returns
    ///
    /// The token plus a [`TokenSource`] naming the branch taken.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingCredentials`] when account or password are not
    ///   configured
    /// - [`ApiError::TokenFieldMissing`] when the login response carries no
    ///   recognizable token field
    /// - Transport failures ([`ApiError::Http`], [`ApiError::Timeout`],
    ///   [`ApiError::Network`]) from the login request, unchanged
    pub async fn get_token(
        &self,
        http: &reqwest::Client,
        config: &GatewayConfig,
        force: bool,
    ) -> Result<(String, TokenSource)> {
        if !force {
            let guard = self.lock();
            if let Some(credential) = guard.as_ref() {
                if !credential.is_expired(config.token_ttl_ms) {
                    tracing::debug!("reusing cached token");
                    return Ok((credential.token.clone(), TokenSource::Cache));
                }
            }
        }

        // The lock is not held across the login await; see the module docs
        // on concurrent refresh.
        let token = self.login(http, config).await?;

        let mut guard = self.lock();
        *guard = Some(Credential::new(token.clone()));

        Ok((token, TokenSource::Login))
    }

    /// Drops the cached credential, forcing a login on the next call.
    pub fn invalidate(&self) {
        let mut guard = self.lock();
        *guard = None;
    }

    async fn login(&self, http: &reqwest::Client, config: &GatewayConfig) -> Result<String> {
        let (account, password) = match (&config.account, &config.password) {
            (Some(account), Some(password))
                if !account.trim().is_empty() && !password.is_empty() =>
            {
                (account, password)
            }
            _ => return Err(ApiError::MissingCredentials.into()),
        };

        let url = resolve_url(&config.base_url, &config.api_prefix, &config.token_path, &[])?;
        let body = json!({ "account": account, "password": password });

        tracing::debug!(account = %account, "logging in to obtain a token");
        let envelope = dispatch(
            http,
            reqwest::Method::POST,
            url,
            None,
            Some(&body),
            config.timeout_ms,
        )
        .await
        .context("Login request failed")?;

        let token = probe_token(&envelope.data).ok_or(ApiError::TokenFieldMissing)?;
        Ok(token)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        // The cache is a single Option assignment; a poisoned lock still
        // holds a consistent value.
        self.cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
