//
//  zentao-gateway
//  batch/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Batch Resolution
//!
//! The list-then-mutate workflow: list the bugs matching a filter once,
//! then resolve each candidate, isolating per-item failures into the
//! returned [`BatchOutcome`] instead of aborting the whole run.
//!
//! ## Sequencing
//!
//! Candidates are processed strictly sequentially, never concurrently.
//! This stays within the upstream's rate tolerance and keeps per-item
//! error attribution trivial. The only early exit is `stop_on_error`,
//! which halts the loop at the first failure.
//!
//! ## Accounting
//!
//! - `requested` counts the bugs matched by the list step, before
//!   truncation to `max_items`.
//! - `attempted` counts the candidates actually processed.
//! - `resolved` and `failed` partition `attempted`; the identity
//!   `attempted == resolved + failed` always holds.
//!
//! A candidate without a recognizable identifier is recorded as a failure
//! without consuming a resolve call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zentao_gateway::api::bugs::{BugFilter, ResolveArgs};
//! use zentao_gateway::batch::BatchOptions;
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let client = ZentaoClient::new(config)?;
//!
//! let filter = BugFilter {
//!     status: Some("active".to_string()),
//!     assigned_to: Some("bot".to_string()),
//!     ..BugFilter::default()
//! };
//! let outcome = client
//!     .batch_resolve_my_bugs(&filter, &ResolveArgs::default(), &BatchOptions::default())
//!     .await?;
//!
//! println!("{}/{} resolved", outcome.resolved, outcome.attempted);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::bugs::{bug_id, BugFilter, ResolveArgs};
use crate::api::client::ZentaoClient;
use crate::api::common::ApiError;

/// Upper bound for a batch's `max_items`.
pub const MAX_BATCH_ITEMS: u32 = 500;

/// Default number of candidates processed per batch.
pub const DEFAULT_BATCH_ITEMS: u32 = 50;

/// Options for [`ZentaoClient::batch_resolve_my_bugs`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Maximum number of candidates to process, 1 to [`MAX_BATCH_ITEMS`].
    pub max_items: u32,

    /// Halt the loop at the first failure instead of continuing through
    /// all candidates.
    pub stop_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_BATCH_ITEMS,
            stop_on_error: false,
        }
    }
}

/// One successfully resolved candidate.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSuccess {
    /// The resolved bug.
    pub id: u64,

    /// HTTP status of the resolve response.
    pub status: u16,
}

/// One failed candidate.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// The bug's identifier, when one was recognizable.
    pub id: Option<u64>,

    /// Description of the failure.
    pub error: String,
}

/// Aggregate result of one batch invocation.
///
/// Constructed fresh per call, returned to the caller, never retained.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// Bugs matched by the list step, before truncation.
    pub requested: usize,

    /// Candidates actually processed.
    pub attempted: usize,

    /// Candidates resolved successfully.
    pub resolved: usize,

    /// Candidates that failed (including unrecognizable identifiers).
    pub failed: usize,

    /// Per-candidate success records.
    pub success: Vec<BatchSuccess>,

    /// Per-candidate failure records.
    pub errors: Vec<BatchFailure>,
}

impl ZentaoClient {
    /// Lists the bugs matching `filter` and resolves each candidate.
    ///
    /// The listing runs exactly once; the matched set is truncated to
    /// `options.max_items` and processed sequentially. Each candidate's
    /// failure is caught and recorded individually; with
    /// `options.stop_on_error` the loop halts at the first failure and the
    /// remaining candidates are left untouched.
    ///
    /// # Errors
    ///
    /// Only the list step propagates an error; from then on failures are
    /// data in the returned [`BatchOutcome`]. `max_items` outside
    /// 1..=[`MAX_BATCH_ITEMS`] fails with [`ApiError::Validation`] before
    /// any network call.
    pub async fn batch_resolve_my_bugs(
        &self,
        filter: &BugFilter,
        resolve: &ResolveArgs,
        options: &BatchOptions,
    ) -> Result<BatchOutcome> {
        if options.max_items == 0 || options.max_items > MAX_BATCH_ITEMS {
            return Err(ApiError::Validation(format!(
                "maxItems must be between 1 and {}",
                MAX_BATCH_ITEMS
            ))
            .into());
        }

        let listing = self
            .list_my_bugs(filter)
            .await
            .context("Failed to list bugs for batch resolve")?;

        let mut outcome = BatchOutcome {
            requested: listing.matched,
            ..BatchOutcome::default()
        };

        for bug in listing.bugs.into_iter().take(options.max_items as usize) {
            outcome.attempted += 1;

            let Some(id) = bug_id(&bug) else {
                outcome.failed += 1;
                outcome.errors.push(BatchFailure {
                    id: None,
                    error: ApiError::MissingIdentifier.to_string(),
                });
                if options.stop_on_error {
                    break;
                }
                continue;
            };

            match self.resolve_bug(id, resolve).await {
                Ok(result) => {
                    tracing::debug!(id, "bug resolved in batch");
                    outcome.resolved += 1;
                    outcome.success.push(BatchSuccess {
                        id,
                        status: result.status,
                    });
                }
                Err(error) => {
                    tracing::debug!(id, %error, "bug failed to resolve in batch");
                    outcome.failed += 1;
                    outcome.errors.push(BatchFailure {
                        id: Some(id),
                        error: format!("{:#}", error),
                    });
                    if options.stop_on_error {
                        break;
                    }
                }
            }
        }

        Ok(outcome)
    }
}
