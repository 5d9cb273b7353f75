//
//  zentao-gateway
//  api/url.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Request URL and Path Template Resolution
//!
//! Builds absolute request URLs from the configured base URL, the versioned
//! API prefix, a relative path and an optional query mapping, and fills
//! `{id}` placeholders in path templates.
//!
//! # Rules
//!
//! - Paths must be relative: an empty or scheme-qualified path is rejected
//!   with [`ApiError::InvalidPath`], which keeps every request on the
//!   configured host.
//! - Exactly one `/` separates the base URL, the prefix and the path,
//!   regardless of how many slashes the inputs carry.
//! - Query entries with a `None` value are omitted; all other values are
//!   set verbatim. A key that appears more than once keeps its last value.
//!
//! # Example
//!
//! ```rust
//! use zentao_gateway::api::url::{fill_path, resolve_url};
//!
//! let url = resolve_url(
//!     "https://zentao.example.com/",
//!     "/api.php/v1",
//!     "bugs",
//!     &[("limit".to_string(), Some("20".to_string()))],
//! )
//! .unwrap();
//! assert_eq!(url.as_str(), "https://zentao.example.com/api.php/v1/bugs?limit=20");
//!
//! assert_eq!(fill_path("/bugs/{id}/resolve", 42, ""), "/bugs/42/resolve");
//! assert_eq!(fill_path("/bugs/", 42, "/resolve"), "/bugs/42/resolve");
//! ```

use url::Url;

use crate::api::common::ApiError;

/// Placeholder token replaced by a concrete identifier in path templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Joins two URL segments with exactly one `/` between them.
fn join_segments(left: &str, right: &str) -> String {
    format!(
        "{}/{}",
        left.trim_end_matches('/'),
        right.trim_start_matches('/')
    )
}

/// Builds the absolute URL for one request.
///
/// # Parameters
///
/// * `base_url` - Root URL of the instance
/// * `api_prefix` - Versioned prefix inserted after the base URL
/// * `path` - Relative request path
/// * `query` - Query entries; `None` values are omitted, duplicate keys
///   keep the last value
///
/// # Errors
///
/// Returns [`ApiError::InvalidPath`] when `path` is empty or carries a URL
/// scheme, and when the joined result does not parse as a URL.
pub fn resolve_url(
    base_url: &str,
    api_prefix: &str,
    path: &str,
    query: &[(String, Option<String>)],
) -> Result<Url, ApiError> {
    if path.trim().is_empty() {
        return Err(ApiError::InvalidPath("path must not be empty".to_string()));
    }
    if path.contains("://") {
        return Err(ApiError::InvalidPath(format!(
            "absolute URLs are not allowed: {}",
            path
        )));
    }

    let joined = join_segments(&join_segments(base_url, api_prefix), path);
    let mut url = Url::parse(&joined)
        .map_err(|error| ApiError::InvalidPath(format!("{}: {}", joined, error)))?;

    let mut entries: Vec<(&str, &str)> = Vec::new();
    for (key, value) in query {
        let Some(value) = value.as_deref() else {
            continue;
        };
        match entries.iter().position(|(existing, _)| *existing == key.as_str()) {
            Some(position) => entries[position].1 = value,
            None => entries.push((key.as_str(), value)),
        }
    }

    if !entries.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in entries {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Fills a path template with a concrete identifier.
///
/// When the template contains [`ID_PLACEHOLDER`], every occurrence is
/// replaced with the stringified identifier. Otherwise trailing slashes are
/// stripped and `/<id><suffix>` is appended.
///
/// # Parameters
///
/// * `template` - The path template, with or without a placeholder
/// * `id` - The identifier substituted into the path
/// * `suffix` - Fixed suffix appended in the no-placeholder case (pass `""`
///   for plain detail paths)
pub fn fill_path(template: &str, id: u64, suffix: &str) -> String {
    if template.contains(ID_PLACEHOLDER) {
        template.replace(ID_PLACEHOLDER, &id.to_string())
    } else {
        format!("{}/{}{}", template.trim_end_matches('/'), id, suffix)
    }
}
