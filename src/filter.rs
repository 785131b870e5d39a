//! Saved-search filter canonicalization.
//!
//! Filters travel and persist as JSON objects. Order inside an id set and a
//! `false` exclude flag carry no meaning, so comparison and persistence go
//! through the canonical form: every id set sorted ascending, every empty
//! set and false flag omitted, keys emitted in one fixed order.

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, Result};

/// A saved-search filter as it appears on the wire and in storage.
///
/// Each facet pairs an id set with an exclude flag ("match issues NOT in
/// this set" when true). Field declaration order below is the canonical
/// output order. A false exclude flag is represented the same as an absent
/// one, and serialization omits it.
///
/// `PartialEq` is deliberately not implemented: structural comparison would
/// distinguish representations that mean the same filter. Use [`eq`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub project_exclude: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub status_exclude: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub assignee_exclude: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub priority_exclude: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub severity_exclude: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub type_exclude: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Canonical form of `spec`: id sets sorted ascending with duplicates
/// preserved (the backend does not dedupe, and neither do we), empty sets
/// dropped. The input is not touched.
pub fn normalize(spec: &FilterSpec) -> FilterSpec {
    FilterSpec {
        project_ids: normalize_ids(&spec.project_ids),
        project_exclude: spec.project_exclude,
        status_ids: normalize_ids(&spec.status_ids),
        status_exclude: spec.status_exclude,
        assignee_ids: normalize_ids(&spec.assignee_ids),
        assignee_exclude: spec.assignee_exclude,
        priority_ids: normalize_ids(&spec.priority_ids),
        priority_exclude: spec.priority_exclude,
        severity_ids: normalize_ids(&spec.severity_ids),
        severity_exclude: spec.severity_exclude,
        type_ids: normalize_ids(&spec.type_ids),
        type_exclude: spec.type_exclude,
    }
}

fn normalize_ids(ids: &Option<Vec<i64>>) -> Option<Vec<i64>> {
    match ids {
        Some(ids) if !ids.is_empty() => {
            let mut sorted = ids.clone();
            sorted.sort();
            Some(sorted)
        }
        _ => None,
    }
}

/// Serialize the canonical form. Semantically equal specs produce
/// byte-identical output, which makes the result safe to persist and to
/// compare as an opaque string.
pub fn canonical_json(spec: &FilterSpec) -> Result<String> {
    serde_json::to_string(&normalize(spec)).map_err(CommandError::transport)
}

/// The sole equality for filters: canonical forms must match field for
/// field. Never compare `FilterSpec`s any other way.
pub fn eq(a: &FilterSpec, b: &FilterSpec) -> bool {
    serde_json::to_value(normalize(a))
        .and_then(|a| serde_json::to_value(normalize(b)).map(|b| a == b))
        .unwrap_or(false)
}
