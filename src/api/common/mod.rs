//
//  zentao-gateway
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Common API Types for the ZenTao Gateway
//!
//! This module provides the shared types used across the gateway client:
//! the unified [`ApiError`] for all failure kinds, the [`ResponseEnvelope`]
//! produced by every HTTP exchange, and the response-shape extraction
//! helpers (re-exported from [`extract`]).
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all gateway operations
//! - [`ResponseEnvelope`] - Uniform result of one HTTP exchange
//! - [`extract_list`] / [`extract_detail`] - Response shape normalization
//! - [`error_status`] - HTTP status lookup on a propagated error chain
//!
//! # Error Handling
//!
//! Public operations return `anyhow::Result` with an [`ApiError`] always
//! present in the chain. Callers that need to branch on a failure kind
//! downcast:
//!
//! ```rust
//! use zentao_gateway::api::common::{error_status, ApiError};
//!
//! let error: anyhow::Error = ApiError::Http {
//!     status: 404,
//!     body: "not found".to_string(),
//! }
//! .into();
//!
//! assert_eq!(error_status(&error), Some(404));
//! assert!(error.downcast_ref::<ApiError>().is_some());
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

mod extract;

pub use extract::*;

/// Maximum number of characters of an upstream error body carried inside
/// [`ApiError::Http`]. Longer bodies are truncated.
pub const MAX_ERROR_BODY_CHARS: usize = 2000;

/// Unified error type for all ZenTao gateway operations.
///
/// `ApiError` covers every failure kind the gateway can produce, from
/// request construction through transport to argument validation. It
/// implements the standard `Error` trait via `thiserror` so it composes
/// with `anyhow` chains.
///
/// # Variants
///
/// | Variant | Raised by | Network involved |
/// |---------|-----------|------------------|
/// | `InvalidPath` | URL resolver | no |
/// | `MissingCredentials` | token manager | no |
/// | `TokenFieldMissing` | token manager | after login |
/// | `Http` | transport (non-2xx) | yes |
/// | `Timeout` | transport | yes |
/// | `Network` | transport | yes |
/// | `InvalidVerifyResult` | verify dispatch | no |
/// | `MissingIdentifier` | batch orchestrator | no |
/// | `Validation` | argument checks | no |
///
/// # Notes
///
/// - `Http` carries the numeric status and the (possibly truncated) decoded
///   body so callers can branch on status codes.
/// - The `Network` variant automatically converts from `reqwest::Error`;
///   timeouts are classified separately before conversion.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request path is empty or scheme-qualified.
    ///
    /// Only relative paths are accepted, which keeps every request on the
    /// configured host.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    /// The configuration carries no account or no password, so a login
    /// request cannot be built.
    #[error("Authentication required: account and password are not configured")]
    MissingCredentials,

    /// The login response contained none of the known token fields.
    ///
    /// Failing loudly here is deliberate: a silently empty credential would
    /// surface later as a confusing authorization failure.
    #[error("Login succeeded but no token field was found in the response")]
    TokenFieldMissing,

    /// The upstream answered with a non-2xx status.
    ///
    /// # Parameters
    ///
    /// - `status` - The numeric HTTP status code
    /// - `body` - The decoded body, truncated to [`MAX_ERROR_BODY_CHARS`]
    #[error("API error ({status}): {body}")]
    Http {
        /// The numeric HTTP status code.
        status: u16,
        /// The decoded response body, possibly truncated.
        body: String,
    },

    /// The request exceeded the configured timeout and was aborted.
    ///
    /// # Parameters
    ///
    /// - `0` - The timeout that was exceeded, in milliseconds
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// A transport-level error occurred (connection, DNS, TLS).
    ///
    /// # Parameters
    ///
    /// - `0` - The underlying `reqwest::Error`
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A verify result other than `pass` or `fail` was supplied.
    ///
    /// # Parameters
    ///
    /// - `0` - The rejected result value
    #[error("Invalid verify result '{0}': expected 'pass' or 'fail'")]
    InvalidVerifyResult(String),

    /// A batch candidate carried no recognizable identifier field.
    #[error("Record has no recognizable identifier field")]
    MissingIdentifier,

    /// An operation argument failed the gateway's own checks, before any
    /// network call.
    ///
    /// # Parameters
    ///
    /// - `0` - Description of the invalid argument
    #[error("Invalid argument: {0}")]
    Validation(String),
}

/// Uniform result of one HTTP exchange.
///
/// Every transport call, success or not, is normalized into this shape
/// before higher layers look at it. The body is parsed as JSON only when
/// the response's content type indicates JSON; otherwise `data` holds the
/// raw text as a `Value::String`.
///
/// # Fields
///
/// * `status` - The numeric HTTP status code
/// * `headers` - Response headers with printable values
/// * `data` - Decoded JSON body, or the raw text when not JSON
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// The numeric HTTP status code.
    pub status: u16,

    /// Response headers. Values that are not valid visible ASCII are
    /// omitted.
    pub headers: HashMap<String, String>,

    /// The decoded body: a JSON value for JSON responses, otherwise the raw
    /// text wrapped in `Value::String`.
    pub data: Value,
}

/// Returns the HTTP status carried by an error chain, if any.
///
/// Walks the chain for an [`ApiError::Http`] and returns its status code.
/// Used by the fallback logic in domain operations and available to callers
/// that branch on upstream statuses.
///
/// # Example
///
/// ```rust
/// use zentao_gateway::api::common::{error_status, ApiError};
///
/// let error: anyhow::Error = ApiError::Http { status: 404, body: String::new() }.into();
/// assert_eq!(error_status(&error), Some(404));
///
/// let error: anyhow::Error = ApiError::MissingCredentials.into();
/// assert_eq!(error_status(&error), None);
/// ```
pub fn error_status(error: &anyhow::Error) -> Option<u16> {
    match error.downcast_ref::<ApiError>() {
        Some(ApiError::Http { status, .. }) => Some(*status),
        _ => None,
    }
}
