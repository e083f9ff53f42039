//! Cache key and payload contract.
//!
//! Keys look like `activity_logs:{user}:{start}:{end}`. Each present component
//! is percent-encoded, so it never contains `:` and never starts with a bare
//! `%` followed by a non-hex letter. An absent bound is written as
//! [`UNDEFINED_PLACEHOLDER`], which no encoded component can equal. The mapping
//! from `(user, start, end)` to key is therefore injective.

use crate::error::Result;
use crate::models::ActivityRecord;

pub const DEFAULT_KEY_PREFIX: &str = "activity_logs";

/// Stands in for an omitted range bound.
pub const UNDEFINED_PLACEHOLDER: &str = "%undefined";

const SEPARATOR: char = ':';

#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    prefix: String,
}

impl Default for CacheKeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl CacheKeyBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key for one `(user, start, end)` lookup.
    pub fn activity_logs(&self, user_id: &str, start: Option<&str>, end: Option<&str>) -> String {
        format!(
            "{}{}{}{}",
            self.user_prefix(user_id),
            encode_bound(start),
            SEPARATOR,
            encode_bound(end)
        )
    }

    /// Prefix shared by every key of one user, trailing separator included.
    pub fn user_prefix(&self, user_id: &str) -> String {
        format!(
            "{}{}{}{}",
            self.prefix,
            SEPARATOR,
            urlencoding::encode(user_id),
            SEPARATOR
        )
    }
}

fn encode_bound(bound: Option<&str>) -> String {
    match bound {
        Some(value) => urlencoding::encode(value).into_owned(),
        None => UNDEFINED_PLACEHOLDER.to_string(),
    }
}

/// Serializes a query result into the cached snapshot.
pub fn encode_payload(records: &[ActivityRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Restores a cached snapshot.
pub fn decode_payload(payload: &str) -> Result<Vec<ActivityRecord>> {
    Ok(serde_json::from_str(payload)?)
}
