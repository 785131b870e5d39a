//! Names of the commands the backend registers.
//!
//! Centralized so call sites cannot drift from the backend's handler table.

// Auth & session
pub const CMD_LOGIN: &str = "login";
pub const CMD_HAS_API_TOKEN: &str = "has_api_token";
pub const CMD_LOGOUT: &str = "logout";
/// Well-known session-refresh command. Invoked with no arguments, and only
/// by the invoker's refresh path.
pub const CMD_REFRESH_TOKEN: &str = "refresh_token";

// Users & projects
pub const CMD_GET_ME: &str = "get_me";
pub const CMD_GET_PROJECTS: &str = "get_projects";
pub const CMD_LIST_ISSUES: &str = "list_issues";
pub const CMD_GET_SELECTED_PROJECTS: &str = "get_selected_projects";
pub const CMD_SAVE_SELECTED_PROJECTS: &str = "save_selected_projects";
pub const CMD_GET_AGGREGATED_ISSUES: &str = "get_aggregated_issues";
pub const CMD_GET_PROJECT_METADATA: &str = "get_project_metadata";

// Issues
pub const CMD_GET_ISSUE_DETAIL: &str = "get_issue_detail";
pub const CMD_GET_ISSUE_HISTORY: &str = "get_issue_history";
pub const CMD_CHANGE_ISSUE_STATUS: &str = "change_issue_status";
pub const CMD_CHANGE_ISSUE_ASSIGNEE: &str = "change_issue_assignee";
pub const CMD_ADD_ISSUE_COMMENT: &str = "add_issue_comment";

// Saved views
pub const CMD_LIST_VIEWS: &str = "list_views";
pub const CMD_CREATE_VIEW: &str = "create_view";
pub const CMD_UPDATE_VIEW: &str = "update_view";
pub const CMD_DELETE_VIEW: &str = "delete_view";
pub const CMD_SET_DEFAULT_VIEW: &str = "set_default_view";

// Local drafts
pub const CMD_SAVE_LOCAL_DRAFT: &str = "save_local_draft";
pub const CMD_GET_LOCAL_DRAFT: &str = "get_local_draft";
pub const CMD_DELETE_LOCAL_DRAFT: &str = "delete_local_draft";
