//
//  zentao-gateway
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP client implementation for the ZenTao REST API, versioned under the
//! configurable `/api.php/v1` prefix.
//!
//! ## Architecture
//!
//! The API layer is organized as follows:
//!
//! - [`client`]: Core HTTP client with token injection and request handling
//! - [`url`]: Absolute URL construction and path templating
//! - [`bugs`]: Bug listing, detail and mutation operations
//! - [`projects`]: Project listing
//! - [`common`]: Shared types (errors, response envelopes, shape extraction)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let client = ZentaoClient::new(config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns `anyhow::Result` with an
//! [`ApiError`](common::ApiError) in the chain; callers branch on failure
//! kinds by downcasting (see [`common::error_status`]).

/// Core HTTP client for the ZenTao API.
///
/// Provides the [`ZentaoClient`](client::ZentaoClient) struct which handles:
/// - Token resolution before every call
/// - Request building and dispatch with bounded timeouts
/// - Response decoding and status mapping
pub mod client;

/// Request URL construction and path template resolution.
pub mod url;

/// Bug domain operations: list, detail, resolve, close, activate, verify,
/// comment.
pub mod bugs;

/// Project domain operations.
pub mod projects;

/// Common types shared across the API layer.
///
/// Includes:
/// - [`ApiError`](common::ApiError): standardized error kinds
/// - [`ResponseEnvelope`](common::ResponseEnvelope): uniform exchange result
/// - [`extract_list`](common::extract_list) /
///   [`extract_detail`](common::extract_detail): response-shape extraction
pub mod common;

/// Re-export of the main API client.
pub use client::ZentaoClient;

/// Re-export of common API types.
pub use common::{ApiError, ResponseEnvelope};
