//
//  zentao-gateway
//  api/common/extract.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Response Shape Normalization
//!
//! The upstream API's response envelopes are only loosely specified: a bug
//! listing may arrive as `{"bugs": [...]}`, `{"data": {"bugs": [...]}}`,
//! `{"data": [...]}` or as a bare array, depending on version and
//! deployment. This module extracts list and detail payloads from any of
//! those shapes.
//!
//! # Strategy Order
//!
//! Extraction walks an explicit ordered list of strategies and takes the
//! first match:
//!
//! | Order | List | Detail |
//! |-------|------|--------|
//! | 1 | `body[key]` array | `body[key]` object |
//! | 2 | `body.data[key]` array, else `body.data` array | `body.data[key]` object, else `body.data` object |
//! | 3 | bare top-level array | bare top-level object (arrays excluded) |
//!
//! When no strategy matches, [`extract_list`] returns an empty vector and
//! [`extract_detail`] returns `None`. An empty result means "no match
//! found", never an error - callers must not treat it as a failure.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use zentao_gateway::api::common::{extract_detail, extract_list};
//!
//! let body = json!({"data": {"bugs": [{"id": 1}]}});
//! assert_eq!(extract_list(&body, "bugs").len(), 1);
//!
//! let body = json!({"bug": {"id": 7}});
//! assert_eq!(extract_detail(&body, "bug").unwrap()["id"], 7);
//! ```

use serde_json::Value;

/// One way of locating a list payload inside a response body.
type ListStrategy = fn(&Value, &str) -> Option<Vec<Value>>;

/// One way of locating a single-record payload inside a response body.
type DetailStrategy = fn(&Value, &str) -> Option<Value>;

/// `body[key]` as an array.
fn list_named_field(body: &Value, key: &str) -> Option<Vec<Value>> {
    body.get(key)?.as_array().cloned()
}

/// `body.data[key]` as an array, else `body.data` itself as an array.
fn list_data_field(body: &Value, key: &str) -> Option<Vec<Value>> {
    let data = body.get("data")?;
    if let Some(items) = data.get(key).and_then(Value::as_array) {
        return Some(items.clone());
    }
    data.as_array().cloned()
}

/// The body itself as a bare array.
fn list_bare(body: &Value, _key: &str) -> Option<Vec<Value>> {
    body.as_array().cloned()
}

const LIST_STRATEGIES: &[ListStrategy] = &[list_named_field, list_data_field, list_bare];

/// The value as a record, excluding arrays and scalars.
fn as_record(value: &Value) -> Option<Value> {
    if value.is_object() {
        Some(value.clone())
    } else {
        None
    }
}

/// `body[key]` as an object.
fn detail_named_field(body: &Value, key: &str) -> Option<Value> {
    body.get(key).and_then(as_record)
}

/// `body.data[key]` as an object, else `body.data` itself as an object.
fn detail_data_field(body: &Value, key: &str) -> Option<Value> {
    let data = body.get("data")?;
    if let Some(record) = data.get(key).and_then(as_record) {
        return Some(record);
    }
    as_record(data)
}

/// The body itself as a bare object.
fn detail_bare(body: &Value, _key: &str) -> Option<Value> {
    as_record(body)
}

const DETAIL_STRATEGIES: &[DetailStrategy] =
    &[detail_named_field, detail_data_field, detail_bare];

/// Extracts a list payload from a response body.
///
/// Tries each strategy in order (named field, nested `data` field, bare
/// array) and returns the first match. Returns an empty vector when no
/// strategy matches.
///
/// # Parameters
///
/// * `body` - The decoded response body
/// * `key` - The named list field to look for (e.g. `bugs`, `projects`)
pub fn extract_list(body: &Value, key: &str) -> Vec<Value> {
    LIST_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body, key))
        .unwrap_or_default()
}

/// Extracts a single-record payload from a response body.
///
/// Tries each strategy in order (named field, nested `data` field, bare
/// object). Arrays never match. Returns `None` when no strategy matches -
/// an absent record, not an error.
///
/// # Parameters
///
/// * `body` - The decoded response body
/// * `key` - The named singular field to look for (e.g. `bug`)
pub fn extract_detail(body: &Value, key: &str) -> Option<Value> {
    DETAIL_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body, key))
}
