//
//  zentao-gateway
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Gateway Configuration
//!
//! This module provides the immutable configuration consumed by
//! [`ZentaoClient`](crate::ZentaoClient). A [`GatewayConfig`] is constructed
//! once by the hosting process and is read-only for the lifetime of the
//! client.
//!
//! The gateway never reads environment variables or configuration files
//! itself; the hosting process owns that concern and hands the finished
//! value over. [`GatewayConfig`] derives `Deserialize` so hosts that keep
//! their settings as JSON can map them directly onto the struct.
//!
//! ## Example
//!
//! ```rust
//! use zentao_gateway::GatewayConfig;
//!
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot-account", "s3cret")
//!     .with_default_product(12)
//!     .with_token_ttl_ms(600_000);
//!
//! assert_eq!(config.api_prefix, "/api.php/v1");
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;
use url::Url;

use crate::api::common::ApiError;

/// Default versioned API prefix appended to the base URL.
pub const DEFAULT_API_PREFIX: &str = "/api.php/v1";

/// Default token endpoint path, relative to the API prefix.
pub const DEFAULT_TOKEN_PATH: &str = "/tokens";

/// Default token time-to-live: twenty minutes.
pub const DEFAULT_TOKEN_TTL_MS: u64 = 1_200_000;

/// Default per-request timeout: thirty seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Immutable configuration for a [`ZentaoClient`](crate::ZentaoClient).
///
/// All fields are fixed at construction time. The builder-style `with_*`
/// methods consume and return the value so a configuration can be assembled
/// in one expression.
///
/// # Fields
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `base_url` | (required) | Root URL of the ZenTao instance |
/// | `api_prefix` | `/api.php/v1` | Versioned API prefix |
/// | `token_path` | `/tokens` | Token endpoint, relative to the prefix |
/// | `token_ttl_ms` | `1200000` | Cached token lifetime in milliseconds |
/// | `timeout_ms` | `30000` | Per-request timeout in milliseconds |
/// | `account` | `None` | Login account identifier |
/// | `password` | `None` | Login secret |
/// | `default_product` | `None` | Product used for scoped-path fallback |
/// | `reveal_token` | `false` | Return raw tokens instead of masked ones |
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Root URL of the ZenTao instance, e.g. `https://zentao.example.com`.
    pub base_url: String,

    /// Versioned API prefix inserted between the base URL and every request
    /// path.
    pub api_prefix: String,

    /// Token endpoint path, resolved relative to `api_prefix`.
    pub token_path: String,

    /// How long a cached token stays valid, in milliseconds. A token older
    /// than this is re-obtained via login on the next call.
    pub token_ttl_ms: u64,

    /// Timeout applied to every HTTP exchange, in milliseconds.
    pub timeout_ms: u64,

    /// Account identifier used for the login request.
    pub account: Option<String>,

    /// Secret used for the login request.
    pub password: Option<String>,

    /// Product identifier used when the upstream demands a product-scoped
    /// bug listing and the caller did not provide one.
    pub default_product: Option<u64>,

    /// When `false` (the default), operations that surface the credential
    /// return it masked; `true` returns the raw value.
    pub reveal_token: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            token_ttl_ms: DEFAULT_TOKEN_TTL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            account: None,
            password: None,
            default_product: None,
            reveal_token: false,
        }
    }
}

impl GatewayConfig {
    /// Creates a configuration for the given base URL with all other fields
    /// at their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zentao_gateway::GatewayConfig;
    ///
    /// let config = GatewayConfig::new("https://zentao.example.com");
    /// assert_eq!(config.timeout_ms, 30_000);
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the login account and secret.
    pub fn with_credentials(
        mut self,
        account: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.account = Some(account.into());
        self.password = Some(password.into());
        self
    }

    /// Overrides the versioned API prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Overrides the token endpoint path (relative to the API prefix).
    pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Overrides the cached token lifetime, in milliseconds.
    pub fn with_token_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.token_ttl_ms = ttl_ms;
        self
    }

    /// Overrides the per-request timeout, in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the product used for the scoped-path fallback.
    pub fn with_default_product(mut self, product: u64) -> Self {
        self.default_product = Some(product);
        self
    }

    /// Controls whether the raw token value is ever returned in full.
    pub fn with_reveal_token(mut self, reveal: bool) -> Self {
        self.reveal_token = reveal;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the base URL is empty, does not
    /// parse, or uses a scheme other than `http`/`https`.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::Validation("base URL must not be empty".to_string()));
        }

        let url = Url::parse(&self.base_url).map_err(|error| {
            ApiError::Validation(format!("invalid base URL '{}': {}", self.base_url, error))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ApiError::Validation(format!(
                "unsupported base URL scheme '{}'",
                other
            ))),
        }
    }
}
