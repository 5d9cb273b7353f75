//
//  zentao-gateway
//  api/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Project Operations
//!
//! Listing the projects visible to the authenticated account. Projects are
//! containers that group related bugs; the gateway treats their records as
//! opaque upstream data and only counts them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let client = ZentaoClient::new(config)?;
//!
//! let listing = client.list_my_projects().await?;
//! println!("{} projects visible", listing.total);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::api::client::ZentaoClient;
use crate::api::common::extract_list;

/// Result of a project listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectList {
    /// Number of projects returned by the upstream.
    pub total: usize,

    /// The project records, as returned by the upstream.
    pub projects: Vec<Value>,
}

impl ZentaoClient {
    /// Lists the projects visible to the authenticated account.
    pub async fn list_my_projects(&self) -> Result<ProjectList> {
        let envelope = self
            .get("/projects", Vec::new())
            .await
            .context("Failed to list projects")?;

        let projects = extract_list(&envelope.data, "projects");

        Ok(ProjectList {
            total: projects.len(),
            projects,
        })
    }
}
