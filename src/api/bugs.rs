//
//  zentao-gateway
//  api/bugs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Bug Operations
//!
//! Domain operations over ZenTao bugs: listing with filters, detail
//! retrieval with image extraction, and the resolve/close/activate/verify/
//! comment mutations. Every operation is a thin composition of the generic
//! call primitive, path templating and response-shape extraction.
//!
//! ## Filtering
//!
//! [`ZentaoClient::list_my_bugs`] sends the filter as server-side query
//! parameters *and* re-applies it client-side over the returned records.
//! The server-side parameters are a performance optimization; the
//! client-side pass is the correctness guarantee, because upstream
//! deployments differ in how exactly they filter.
//!
//! ## Fallbacks
//!
//! Two independent single-retry fallbacks exist:
//!
//! - Listing without an explicit product retries once against the
//!   product-scoped path when the upstream signals that a product scope is
//!   mandatory and a default product is configured.
//! - Commenting retries once against the pluralized comment path when the
//!   singular path returns HTTP 404.
//!
//! Each fires at most once per call; all other errors pass through
//! untouched.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zentao_gateway::api::bugs::{BugFilter, ResolveArgs};
//! use zentao_gateway::{GatewayConfig, ZentaoClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let client = ZentaoClient::new(config)?;
//!
//! let filter = BugFilter {
//!     status: Some("active".to_string()),
//!     ..BugFilter::default()
//! };
//! let listing = client.list_my_bugs(&filter).await?;
//! println!("{} of {} bugs match", listing.matched, listing.total);
//!
//! for bug in &listing.bugs {
//!     if let Some(id) = zentao_gateway::api::bugs::bug_id(bug) {
//!         client.resolve_bug(id, &ResolveArgs::default()).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::client::ZentaoClient;
use crate::api::common::{error_status, extract_detail, extract_list, ApiError};
use crate::api::url::fill_path;

/// Identifier keys probed on a bug record, in order.
pub const BUG_ID_KEYS: &[&str] = &["id", "bugID", "bug_id"];

/// Free-text fields searched by the keyword filter.
const KEYWORD_FIELDS: &[&str] = &["title", "steps", "keywords"];

/// Free-text fields scanned for embedded images.
const IMAGE_FIELDS: &[&str] = &["steps", "title"];

/// Upper bound for the `limit` page-size parameter.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Label prefixed to an explicit solution when it becomes the resolve
/// comment.
const SOLUTION_LABEL: &str = "Solution: ";

/// `src` attributes inside image markup.
static IMG_SRC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("valid img src pattern")
});

/// Bare image URLs in plain text.
static IMAGE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>()]+\.(?:png|jpe?g|gif|bmp|webp|svg)"#)
        .expect("valid image url pattern")
});

/// Filter arguments for [`ZentaoClient::list_my_bugs`].
///
/// All fields are optional; an empty filter lists everything the upstream
/// returns for the first page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BugFilter {
    /// Exact-match assignee account (case-insensitive client-side).
    pub assigned_to: Option<String>,

    /// Exact-match status, e.g. `active`, `resolved` (case-insensitive
    /// client-side).
    pub status: Option<String>,

    /// Explicit product scope; when set, the product-scoped path is used
    /// directly and no fallback applies.
    pub product: Option<u64>,

    /// Substring searched across title, steps and keywords
    /// (case-insensitive, client-side only).
    pub keyword: Option<String>,

    /// Page number, 1-based.
    pub page: Option<u32>,

    /// Page size, 1 to [`MAX_PAGE_SIZE`].
    pub limit: Option<u32>,
}

/// Result of a bug listing.
#[derive(Debug, Clone, Serialize)]
pub struct BugList {
    /// Number of records the upstream returned, before client-side
    /// filtering.
    pub total: usize,

    /// Number of records that passed the client-side filter.
    pub matched: usize,

    /// The matching records, as returned by the upstream.
    pub bugs: Vec<Value>,
}

/// Result of a bug detail fetch.
#[derive(Debug, Clone, Serialize)]
pub struct BugDetail {
    /// The bug record, or `None` when the response carried no recognizable
    /// record shape.
    pub bug: Option<Value>,

    /// Image URLs found in the record's free-text fields, deduplicated in
    /// first-seen order.
    pub images: Vec<String>,
}

/// Arguments for [`ZentaoClient::resolve_bug`].
///
/// The resolve comment is built from one of three sources with strict
/// precedence: `solution` (wrapped with a fixed label), then `comment`,
/// then a generated fallback describing the resolution. Only one source is
/// ever used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveArgs {
    /// Resolution code, e.g. `fixed`, `notrepro`, `duplicate`.
    pub resolution: String,

    /// Build in which the fix landed.
    pub resolved_build: Option<String>,

    /// Free-text description of the fix; takes precedence over `comment`.
    pub solution: Option<String>,

    /// Free-text comment; used only when no solution is given.
    pub comment: Option<String>,
}

impl Default for ResolveArgs {
    fn default() -> Self {
        Self {
            resolution: "fixed".to_string(),
            resolved_build: None,
            solution: None,
            comment: None,
        }
    }
}

/// Result of a single bug mutation.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    /// The bug the action was applied to.
    pub id: u64,

    /// HTTP status of the upstream response.
    pub status: u16,

    /// Decoded upstream response body.
    pub data: Value,
}

/// Extracts the numeric identifier from a bug record.
///
/// Probes [`BUG_ID_KEYS`] in order, accepting either a JSON number or a
/// numeric string. Returns `None` when no key yields a usable identifier.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use zentao_gateway::api::bugs::bug_id;
///
/// assert_eq!(bug_id(&json!({"id": 12})), Some(12));
/// assert_eq!(bug_id(&json!({"bugID": "34"})), Some(34));
/// assert_eq!(bug_id(&json!({"title": "no id"})), None);
/// ```
pub fn bug_id(record: &Value) -> Option<u64> {
    BUG_ID_KEYS.iter().find_map(|key| {
        let value = record.get(*key)?;
        value
            .as_u64()
            .or_else(|| value.as_str()?.trim().parse().ok())
    })
}

/// Scans a bug record's free-text fields for embedded images.
///
/// Two independent patterns run over each field: image markup `src`
/// attributes and bare image URLs. Matches are deduplicated into an
/// ordered set. Purely derived, no network cost.
pub fn extract_image_urls(record: &Value) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();

    for field in IMAGE_FIELDS {
        let Some(text) = record.get(*field).and_then(Value::as_str) else {
            continue;
        };
        for capture in IMG_SRC_PATTERN.captures_iter(text) {
            push_unique(&mut images, capture[1].to_string());
        }
        for found in IMAGE_URL_PATTERN.find_iter(text) {
            push_unique(&mut images, found.as_str().to_string());
        }
    }

    images
}

fn push_unique(images: &mut Vec<String>, url: String) {
    if !images.iter().any(|existing| existing == &url) {
        images.push(url);
    }
}

/// Builds the resolve comment, honoring the solution > comment > generated
/// precedence.
pub(crate) fn resolve_comment(args: &ResolveArgs) -> String {
    if let Some(solution) = non_empty(&args.solution) {
        return format!("{}{}", SOLUTION_LABEL, solution);
    }
    if let Some(comment) = non_empty(&args.comment) {
        return comment.to_string();
    }
    format!("Resolved as {}.", args.resolution)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

/// Applies the client-side filter pass to one record.
pub(crate) fn matches_filter(record: &Value, filter: &BugFilter) -> bool {
    if let Some(status) = non_empty(&filter.status) {
        if !field_eq_ignore_case(record, "status", status) {
            return false;
        }
    }
    if let Some(assignee) = non_empty(&filter.assigned_to) {
        if !field_eq_ignore_case(record, "assignedTo", assignee) {
            return false;
        }
    }
    if let Some(keyword) = non_empty(&filter.keyword) {
        let needle = keyword.to_lowercase();
        let hit = KEYWORD_FIELDS.iter().any(|field| {
            record
                .get(*field)
                .and_then(Value::as_str)
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }
    true
}

fn field_eq_ignore_case(record: &Value, field: &str, expected: &str) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(|actual| actual.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn ensure_positive_id(id: u64) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::Validation(
            "bug id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn scoped_bugs_path(product: u64) -> String {
    fill_path("/products/{id}/bugs", product, "")
}

fn server_side_query(filter: &BugFilter) -> Vec<(String, Option<String>)> {
    vec![
        ("assignedTo".to_string(), filter.assigned_to.clone()),
        ("status".to_string(), filter.status.clone()),
        ("page".to_string(), filter.page.map(|page| page.to_string())),
        (
            "limit".to_string(),
            filter.limit.map(|limit| limit.to_string()),
        ),
    ]
}

fn comment_body(comment: Option<&str>) -> Value {
    match comment.map(str::trim).filter(|text| !text.is_empty()) {
        Some(comment) => json!({ "comment": comment }),
        None => json!({}),
    }
}

impl ZentaoClient {
    /// Lists bugs matching the given filter.
    ///
    /// The filter is applied twice: as server-side query parameters, and
    /// again client-side over the returned records (status and assignee
    /// exact-match case-insensitive, keyword substring over title, steps
    /// and keywords). `total` counts the records the upstream returned,
    /// `matched` counts the records that survived the client-side pass.
    ///
    /// When no explicit product is given and the upstream rejects the
    /// listing because a product scope is mandatory, the call retries once
    /// against the product-scoped path with the configured default
    /// product. That fallback fires at most once per call.
    pub async fn list_my_bugs(&self, filter: &BugFilter) -> Result<BugList> {
        if let Some(limit) = filter.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ApiError::Validation(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGE_SIZE
                ))
                .into());
            }
        }
        if filter.page == Some(0) {
            return Err(ApiError::Validation("page must be at least 1".to_string()).into());
        }
        if let Some(product) = filter.product {
            ensure_positive_id(product)?;
        }

        let query = server_side_query(filter);
        let envelope = if let Some(product) = filter.product {
            self.get(&scoped_bugs_path(product), query).await?
        } else {
            match self.get("/bugs", query.clone()).await {
                Ok(envelope) => envelope,
                Err(error) => match self.config().default_product {
                    Some(product) if self.scope_required(&error) => {
                        tracing::warn!(
                            product,
                            "upstream requires a product scope, retrying against the scoped path"
                        );
                        self.get(&scoped_bugs_path(product), query).await?
                    }
                    _ => return Err(error),
                },
            }
        };

        let records = extract_list(&envelope.data, "bugs");
        let total = records.len();
        let bugs: Vec<Value> = records
            .into_iter()
            .filter(|record| matches_filter(record, filter))
            .collect();

        Ok(BugList {
            total,
            matched: bugs.len(),
            bugs,
        })
    }

    /// Fetches one bug and derives its embedded image URLs.
    ///
    /// An unrecognizable response shape yields `bug: None` rather than an
    /// error; callers must treat that as "no record found".
    pub async fn bug_detail(&self, id: u64) -> Result<BugDetail> {
        ensure_positive_id(id)?;

        let envelope = self
            .get(&fill_path("/bugs/{id}", id, ""), Vec::new())
            .await
            .with_context(|| format!("Failed to fetch bug {}", id))?;

        let bug = extract_detail(&envelope.data, "bug");
        let images = bug.as_ref().map(extract_image_urls).unwrap_or_default();

        Ok(BugDetail { bug, images })
    }

    /// Resolves a bug.
    ///
    /// The comment sent upstream comes from exactly one source:
    /// an explicit solution (wrapped with the `Solution: ` label), an
    /// explicit comment, or a generated `Resolved as <resolution>.`
    /// fallback, in that order of precedence.
    pub async fn resolve_bug(&self, id: u64, args: &ResolveArgs) -> Result<ActionResult> {
        ensure_positive_id(id)?;
        if args.resolution.trim().is_empty() {
            return Err(ApiError::Validation("resolution must not be empty".to_string()).into());
        }

        let mut body = json!({
            "resolution": args.resolution,
            "comment": resolve_comment(args),
        });
        if let Some(build) = non_empty(&args.resolved_build) {
            body["resolvedBuild"] = json!(build);
        }

        self.bug_action(id, "resolve", body).await
    }

    /// Closes a bug, with an optional comment.
    pub async fn close_bug(&self, id: u64, comment: Option<&str>) -> Result<ActionResult> {
        ensure_positive_id(id)?;
        self.bug_action(id, "close", comment_body(comment)).await
    }

    /// Reactivates a bug, with an optional comment.
    pub async fn activate_bug(&self, id: u64, comment: Option<&str>) -> Result<ActionResult> {
        ensure_positive_id(id)?;
        self.bug_action(id, "activate", comment_body(comment)).await
    }

    /// Verifies a resolved bug.
    ///
    /// Not a separate upstream action: `pass` closes the bug and `fail`
    /// reactivates it. Any other result fails with
    /// [`ApiError::InvalidVerifyResult`] before any network call.
    pub async fn verify_bug(
        &self,
        id: u64,
        result: &str,
        comment: Option<&str>,
    ) -> Result<ActionResult> {
        ensure_positive_id(id)?;
        match result {
            "pass" => self.close_bug(id, comment).await,
            "fail" => self.activate_bug(id, comment).await,
            other => Err(ApiError::InvalidVerifyResult(other.to_string()).into()),
        }
    }

    /// Adds a comment to a bug.
    ///
    /// Some deployments expose the comment route pluralized. When the
    /// singular path returns HTTP 404 the call retries once against
    /// `/bugs/{id}/comments`; if that fails too, the pluralized path's
    /// error is surfaced.
    pub async fn comment_bug(&self, id: u64, comment: &str) -> Result<ActionResult> {
        ensure_positive_id(id)?;
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ApiError::Validation("comment must not be empty".to_string()).into());
        }

        let body = json!({ "comment": comment });
        match self
            .post(&fill_path("/bugs/{id}/comment", id, ""), body.clone())
            .await
        {
            Ok(envelope) => Ok(ActionResult {
                id,
                status: envelope.status,
                data: envelope.data,
            }),
            Err(error) if error_status(&error) == Some(404) => {
                tracing::warn!(id, "comment path returned 404, retrying the pluralized path");
                let envelope = self
                    .post(&fill_path("/bugs/{id}/comments", id, ""), body)
                    .await?;
                Ok(ActionResult {
                    id,
                    status: envelope.status,
                    data: envelope.data,
                })
            }
            Err(error) => Err(error),
        }
    }

    async fn bug_action(&self, id: u64, action: &str, body: Value) -> Result<ActionResult> {
        let path = fill_path(&format!("/bugs/{{id}}/{}", action), id, "");
        let envelope = self
            .post(&path, body)
            .await
            .with_context(|| format!("Failed to {} bug {}", action, id))?;

        Ok(ActionResult {
            id,
            status: envelope.status,
            data: envelope.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use crate::config::GatewayConfig;

    use super::*;

    async fn mock_login(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/api.php/v1/tokens")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token": "tok-xyz"}"#)
            .create_async()
            .await
    }

    fn client_for(server: &mockito::ServerGuard) -> ZentaoClient {
        let config = GatewayConfig::new(server.url()).with_credentials("bot", "secret");
        ZentaoClient::new(config).unwrap()
    }

    #[test]
    fn test_bug_id_probes_alternative_keys() {
        assert_eq!(bug_id(&json!({"id": 12})), Some(12));
        assert_eq!(bug_id(&json!({"bugID": 34})), Some(34));
        assert_eq!(bug_id(&json!({"bug_id": "56"})), Some(56));
        assert_eq!(bug_id(&json!({"id": "  7 "})), Some(7));
        assert_eq!(bug_id(&json!({"id": "abc"})), None);
        assert_eq!(bug_id(&json!({"title": "no id"})), None);
    }

    #[test]
    fn test_resolve_comment_precedence() {
        let args = ResolveArgs {
            solution: Some("A".to_string()),
            comment: Some("B".to_string()),
            ..ResolveArgs::default()
        };
        assert_eq!(resolve_comment(&args), "Solution: A");

        let args = ResolveArgs {
            comment: Some("B".to_string()),
            ..ResolveArgs::default()
        };
        assert_eq!(resolve_comment(&args), "B");

        let args = ResolveArgs {
            resolution: "duplicate".to_string(),
            ..ResolveArgs::default()
        };
        assert_eq!(resolve_comment(&args), "Resolved as duplicate.");
    }

    #[test]
    fn test_resolve_comment_ignores_blank_sources() {
        let args = ResolveArgs {
            solution: Some("   ".to_string()),
            comment: Some("B".to_string()),
            ..ResolveArgs::default()
        };
        assert_eq!(resolve_comment(&args), "B");
    }

    #[test]
    fn test_matches_filter() {
        let bug = json!({
            "id": 1,
            "status": "Active",
            "assignedTo": "Bot",
            "title": "Login page crashes",
            "steps": "open the login page",
        });

        let mut filter = BugFilter::default();
        assert!(matches_filter(&bug, &filter));

        filter.status = Some("active".to_string());
        assert!(matches_filter(&bug, &filter));

        filter.assigned_to = Some("bot".to_string());
        assert!(matches_filter(&bug, &filter));

        filter.keyword = Some("LOGIN".to_string());
        assert!(matches_filter(&bug, &filter));

        filter.keyword = Some("payments".to_string());
        assert!(!matches_filter(&bug, &filter));

        let filter = BugFilter {
            status: Some("resolved".to_string()),
            ..BugFilter::default()
        };
        assert!(!matches_filter(&bug, &filter));
    }

    #[test]
    fn test_extract_image_urls_dedupes_in_order() {
        let bug = json!({
            "title": "see https://files.example.com/a.png",
            "steps": concat!(
                "<img src=\"https://files.example.com/b.jpg\"> then ",
                "<img src='https://files.example.com/a.png'> and ",
                "https://files.example.com/b.jpg again",
            ),
        });

        // Steps are scanned before the title, and the markup pass runs
        // before the bare-URL pass within each field.
        let images = extract_image_urls(&bug);
        assert_eq!(
            images,
            vec![
                "https://files.example.com/b.jpg".to_string(),
                "https://files.example.com/a.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_image_urls_handles_missing_fields() {
        assert!(extract_image_urls(&json!({"id": 1})).is_empty());
        assert!(extract_image_urls(&json!({"steps": "no images here"})).is_empty());
    }

    #[tokio::test]
    async fn test_list_my_bugs_refilters_client_side() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _listing = server
            .mock("GET", "/api.php/v1/bugs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"bugs": [
                    {"id": 1, "status": "active", "assignedTo": "bot"},
                    {"id": 2, "status": "active", "assignedTo": "bot"},
                    {"id": 3, "status": "active", "assignedTo": "bot"},
                    {"id": 4, "status": "resolved", "assignedTo": "bot"},
                    {"id": 5, "status": "resolved", "assignedTo": "bot"},
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let filter = BugFilter {
            status: Some("active".to_string()),
            assigned_to: Some("bot".to_string()),
            ..BugFilter::default()
        };
        let listing = client.list_my_bugs(&filter).await.unwrap();

        assert_eq!(listing.total, 5);
        assert_eq!(listing.matched, 3);
        assert_eq!(listing.bugs.len(), 3);
    }

    #[tokio::test]
    async fn test_list_my_bugs_uses_scoped_path_for_explicit_product() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let scoped = server
            .mock("GET", "/api.php/v1/products/9/bugs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bugs": []}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let filter = BugFilter {
            product: Some(9),
            ..BugFilter::default()
        };
        client.list_my_bugs(&filter).await.unwrap();

        scoped.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_my_bugs_scope_fallback_fires_once() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let unscoped = server
            .mock("GET", "/api.php/v1/bugs")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "a product id is required for bug listings"}"#)
            .expect(1)
            .create_async()
            .await;
        let scoped = server
            .mock("GET", "/api.php/v1/products/7/bugs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bugs": [{"id": 1, "status": "active"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let config = GatewayConfig::new(server.url())
            .with_credentials("bot", "secret")
            .with_default_product(7);
        let client = ZentaoClient::new(config).unwrap();

        let listing = client.list_my_bugs(&BugFilter::default()).await.unwrap();
        assert_eq!(listing.total, 1);

        unscoped.assert_async().await;
        scoped.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_my_bugs_scope_fallback_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _mock = server
            .mock("GET", "/api.php/v1/bugs")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "a product id is required for bug listings"}"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/api.php/v1/products/7/bugs")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_header("content-type", "text/plain")
            .with_body("scoped listing broke")
            .create_async()
            .await;

        let config = GatewayConfig::new(server.url())
            .with_credentials("bot", "secret")
            .with_default_product(7);
        let client = ZentaoClient::new(config).unwrap();

        let error = client.list_my_bugs(&BugFilter::default()).await.unwrap_err();
        assert_eq!(error_status(&error), Some(500));
    }

    #[tokio::test]
    async fn test_list_my_bugs_without_default_product_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _mock = server
            .mock("GET", "/api.php/v1/bugs")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "a product id is required for bug listings"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client.list_my_bugs(&BugFilter::default()).await.unwrap_err();
        assert_eq!(error_status(&error), Some(400));
    }

    #[tokio::test]
    async fn test_list_my_bugs_validates_limit() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);

        let filter = BugFilter {
            limit: Some(0),
            ..BugFilter::default()
        };
        let error = client.list_my_bugs(&filter).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::Validation(_))
        ));

        let filter = BugFilter {
            limit: Some(MAX_PAGE_SIZE + 1),
            ..BugFilter::default()
        };
        assert!(client.list_my_bugs(&filter).await.is_err());
    }

    #[tokio::test]
    async fn test_bug_detail_extracts_record_and_images() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _mock = server
            .mock("GET", "/api.php/v1/bugs/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"bug": {
                    "id": 42,
                    "title": "broken layout",
                    "steps": "<img src=\"https://files.example.com/shot.png\">",
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let detail = client.bug_detail(42).await.unwrap();

        assert_eq!(detail.bug.unwrap()["id"], 42);
        assert_eq!(detail.images, vec!["https://files.example.com/shot.png"]);
    }

    #[tokio::test]
    async fn test_bug_detail_rejects_zero_id() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);

        let error = client.bug_detail(0).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_bug_sends_solution_comment() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let resolve = server
            .mock("POST", "/api.php/v1/bugs/5/resolve")
            .match_body(Matcher::PartialJson(json!({
                "resolution": "fixed",
                "comment": "Solution: A",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        let args = ResolveArgs {
            solution: Some("A".to_string()),
            comment: Some("B".to_string()),
            ..ResolveArgs::default()
        };
        let result = client.resolve_bug(5, &args).await.unwrap();

        assert_eq!(result.id, 5);
        assert_eq!(result.status, 200);
        resolve.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_bug_dispatches_pass_to_close() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let close = server
            .mock("POST", "/api.php/v1/bugs/8/close")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        client.verify_bug(8, "pass", None).await.unwrap();

        close.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_bug_dispatches_fail_to_activate() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let activate = server
            .mock("POST", "/api.php/v1/bugs/8/activate")
            .match_body(Matcher::PartialJson(json!({"comment": "still broken"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        client.verify_bug(8, "fail", Some("still broken")).await.unwrap();

        activate.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_bug_rejects_other_results_before_any_network_call() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api.php/v1/tokens")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client.verify_bug(8, "maybe", None).await.unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::InvalidVerifyResult(value)) if value == "maybe"
        ));
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_comment_bug_retries_pluralized_path_on_404() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let singular = server
            .mock("POST", "/api.php/v1/bugs/3/comment")
            .with_status(404)
            .with_header("content-type", "text/plain")
            .with_body("no such route")
            .expect(1)
            .create_async()
            .await;
        let plural = server
            .mock("POST", "/api.php/v1/bugs/3/comments")
            .match_body(Matcher::PartialJson(json!({"comment": "ping"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.comment_bug(3, "ping").await.unwrap();

        assert_eq!(result.status, 201);
        singular.assert_async().await;
        plural.assert_async().await;
    }

    #[tokio::test]
    async fn test_comment_bug_surfaces_pluralized_error() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _mock = server
            .mock("POST", "/api.php/v1/bugs/3/comment")
            .with_status(404)
            .with_header("content-type", "text/plain")
            .with_body("no such route")
            .create_async()
            .await;
        let _mock = server
            .mock("POST", "/api.php/v1/bugs/3/comments")
            .with_status(500)
            .with_header("content-type", "text/plain")
            .with_body("comments exploded")
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client.comment_bug(3, "ping").await.unwrap_err();

        assert_eq!(error_status(&error), Some(500));
    }

    #[tokio::test]
    async fn test_comment_bug_does_not_retry_non_404_errors() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _mock = server
            .mock("POST", "/api.php/v1/bugs/3/comment")
            .with_status(403)
            .with_header("content-type", "text/plain")
            .with_body("forbidden")
            .create_async()
            .await;
        let plural = server
            .mock("POST", "/api.php/v1/bugs/3/comments")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let error = client.comment_bug(3, "ping").await.unwrap_err();

        assert_eq!(error_status(&error), Some(403));
        plural.assert_async().await;
    }

    #[tokio::test]
    async fn test_comment_bug_rejects_blank_comment() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);

        let error = client.comment_bug(3, "   ").await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::Validation(_))
        ));
    }
}
