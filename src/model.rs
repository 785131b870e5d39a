//! Wire payloads decoded from command results.
//!
//! Shapes mirror what the backend emits; optional wire fields stay `Option`
//! so older backends keep decoding.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub big_photo: Option<String>,
    #[serde(default)]
    pub gravatar_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub owner: i64,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
}

/// Row shape for the issue table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub subject: String,
    pub project: i64,
    pub status: i64,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default)]
    pub status_color: Option<String>,
    #[serde(default)]
    pub owner: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub assigned_to_photo: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
}

/// Full issue payload for the detail pane, including the version used for
/// optimistic locking on mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetail {
    pub id: i64,
    pub ref_number: i64,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,

    pub project_id: i64,
    pub project_name: String,

    pub status_id: i64,
    pub status_name: String,
    pub status_color: String,
    pub is_closed: bool,

    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub severity_id: Option<i64>,
    #[serde(default)]
    pub severity_name: Option<String>,
    #[serde(default)]
    pub priority_id: Option<i64>,
    #[serde(default)]
    pub priority_name: Option<String>,

    #[serde(default)]
    pub assigned_to_id: Option<i64>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    pub created_date: String,
    pub modified_date: String,

    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// One comment or field change from an issue's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: i64,
    pub user_name: String,
    #[serde(default)]
    pub user_photo: Option<String>,
    pub created_at: String,
    /// `"comment"` or `"change"`.
    pub entry_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_edited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub full_name: String,
    pub role_name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// A priority, severity, or issue-type entry; the backend ships the three
/// with one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedOption {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagColor {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Per-project lookup tables the issue views resolve ids against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: i64,
    pub statuses: Vec<IssueStatus>,
    pub members: Vec<Member>,
    pub priorities: Vec<NamedOption>,
    pub severities: Vec<NamedOption>,
    pub issue_types: Vec<NamedOption>,
    #[serde(default)]
    pub tags_colors: Vec<TagColor>,
}

/// A persisted saved view. `filter_data` holds canonical filter JSON; see
/// [`crate::filter::canonical_json`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedView {
    pub id: i64,
    pub name: String,
    pub filter_data: String,
    pub is_system: bool,
    pub is_default: bool,
    #[serde(default)]
    pub last_used: Option<String>,
    pub created_at: String,
}
