//
//  zentao-gateway
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Utility functions and helpers.
//!
//! Small pure helpers shared across the gateway client:
//!
//! - [`truncate`]: bound a string to a maximum number of characters
//! - [`mask_token`]: hide the middle of a credential for display
//! - [`is_json_content_type`]: content-type sniffing for response decoding

/// Truncates a string to a maximum number of characters.
///
/// Strings within the limit are returned unchanged. Longer strings are cut
/// and suffixed with `...` so the result never exceeds `max_chars`.
///
/// # Example
///
/// ```rust
/// use zentao_gateway::util::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// ```
///
/// # Notes
///
/// - Operates on characters, not bytes, so multi-byte input is never split
///   mid-character.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Masks a credential for display, keeping only the first and last four
/// characters visible.
///
/// Short tokens (eight characters or fewer) are replaced entirely with
/// asterisks so that nothing useful leaks.
///
/// # Example
///
/// ```rust
/// use zentao_gateway::util::mask_token;
///
/// assert_eq!(mask_token("abcdefghijkl"), "abcd****ijkl");
/// assert_eq!(mask_token("short"), "*****");
/// ```
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// Checks whether a `Content-Type` header value indicates a JSON body.
///
/// Accepts `application/json` with any parameters as well as `+json`
/// suffixed media types (e.g. `application/problem+json`).
///
/// # Example
///
/// ```rust
/// use zentao_gateway::util::is_json_content_type;
///
/// assert!(is_json_content_type("application/json"));
/// assert!(is_json_content_type("application/json; charset=utf-8"));
/// assert!(is_json_content_type("application/problem+json"));
/// assert!(!is_json_content_type("text/html"));
/// ```
pub fn is_json_content_type(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    value.contains("application/json") || value.contains("+json")
}
