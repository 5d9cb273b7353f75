//
//  zentao-gateway
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # ZenTao Gateway Library
//!
//! A gateway client for the ZenTao issue tracker REST API, built for
//! hosting inside automated agents. The crate turns ZenTao's loosely
//! specified HTTP surface into a small set of typed, callable operations.
//!
//! ## Overview
//!
//! The gateway owns the pieces with real state and branching behavior:
//! the session-token lifecycle, request building and dispatch, the
//! normalization of ZenTao's varying response envelopes, path-template
//! resolution with fallback retries, and a list-then-resolve batch
//! workflow with per-item failure accounting. Everything around it - the
//! operation router that maps named invocations onto these methods, and
//! the bootstrap that assembles a [`GatewayConfig`] from the environment -
//! lives in the hosting process.
//!
//! ## Features
//!
//! - **Implicit Authentication**: every call resolves a cached-or-fresh
//!   session token first; there is no unauthenticated variant
//! - **Tolerant Response Handling**: list/detail payloads are extracted
//!   from several plausible envelope shapes via ordered strategies
//! - **Defensive Filtering**: server-side bug filters are re-applied
//!   client-side, so upstream filter quirks never leak into results
//! - **Fallback Retries**: product-scope and pluralized-comment-path
//!   fallbacks, each firing at most once per call
//! - **Batch Resolution**: sequential list-then-resolve with partial
//!   failure isolation and a full accounting tally
//!
//! ## Module Structure
//!
//! - [`api`]: HTTP client, URL resolution, domain operations, shared types
//! - [`auth`]: session-token cache and login flow
//! - [`batch`]: the list-then-resolve batch orchestrator
//! - [`config`]: construction-time configuration
//! - [`util`]: small pure helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use zentao_gateway::api::bugs::BugFilter;
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot-account", "s3cret")
//!     .with_default_product(12);
//! let client = ZentaoClient::new(config)?;
//!
//! let filter = BugFilter {
//!     assigned_to: Some("bot-account".to_string()),
//!     status: Some("active".to_string()),
//!     ..BugFilter::default()
//! };
//! let listing = client.list_my_bugs(&filter).await?;
//! println!("{} of {} bugs match", listing.matched, listing.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! A client instance performs all work on the calling task; nothing is
//! spawned. The only shared mutable state is the cached credential, whose
//! lock is never held across an await. Concurrent callers that both find
//! the token expired will both log in - token refresh is deliberately not
//! single-flight (see [`auth`]).

/// API client implementation for the ZenTao REST surface.
///
/// The client handles authentication, request building, response
/// normalization and the domain operations over bugs and projects.
pub mod api;

/// Authentication and token lifecycle management.
///
/// ZenTao sessions are short-lived tokens obtained by POSTing account
/// credentials to the token endpoint; this module owns the single cached
/// credential per client instance.
pub mod auth;

/// The list-then-resolve batch orchestrator.
pub mod batch;

/// Construction-time configuration for the gateway client.
pub mod config;

/// Utility functions and helpers.
pub mod util;

/// Re-export of the main client struct.
///
/// [`ZentaoClient`] is the entry point for all gateway operations.
pub use api::ZentaoClient;

/// Re-export of the unified API error type.
pub use api::ApiError;

/// Re-export of the configuration struct.
pub use config::GatewayConfig;

/// Library version, derived from Cargo.toml at compile time.
///
/// Sent upstream as part of the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
