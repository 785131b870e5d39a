//! Typed facade over the invoker.
//!
//! Every remote operation the client performs goes through here, so every
//! one of them inherits the invoker's refresh-and-replay behavior. Methods
//! are thin: name the command, shape the arguments, decode the payload.

use std::sync::Arc;

use serde_json::json;

use crate::commands::*;
use crate::error::Result;
use crate::filter::{self, FilterSpec};
use crate::invoke::Invoker;
use crate::model::{
    HistoryEntry, Issue, IssueDetail, Project, ProjectMetadata, SavedView, User,
};
use crate::session::{CurrentUser, SessionExpiredHook};

pub struct Api {
    invoker: Arc<Invoker>,
    user: CurrentUser,
}

impl Api {
    pub fn new(invoker: Arc<Invoker>) -> Self {
        Self {
            invoker,
            user: CurrentUser::new(),
        }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// The authenticated user, if a login or `get_me` has completed.
    pub fn current_user(&self) -> Option<User> {
        self.user.get()
    }

    /// Hook fired when the session turns out to be unrecoverable; the shell
    /// registers its redirect-to-login here.
    pub fn session_expired(&self) -> &SessionExpiredHook {
        self.invoker.session_expired()
    }

    // === Auth & session ===

    pub fn login(&self, api_url: &str, username: &str, password: &str) -> Result<User> {
        let user: User = self.invoker.invoke(
            CMD_LOGIN,
            json!({
                "api_url": api_url,
                "username": username,
                "password": password,
            }),
        )?;
        self.user.set(user.clone());
        Ok(user)
    }

    pub fn has_api_token(&self) -> Result<bool> {
        self.invoker.invoke_no_args(CMD_HAS_API_TOKEN)
    }

    pub fn logout(&self) -> Result<()> {
        self.invoker.invoke_no_args::<()>(CMD_LOGOUT)?;
        self.user.clear();
        Ok(())
    }

    pub fn get_me(&self) -> Result<User> {
        let user: User = self.invoker.invoke_no_args(CMD_GET_ME)?;
        self.user.set(user.clone());
        Ok(user)
    }

    // === Projects ===

    pub fn get_projects(&self) -> Result<Vec<Project>> {
        self.invoker.invoke_no_args(CMD_GET_PROJECTS)
    }

    pub fn list_issues(&self, project_id: i64) -> Result<Vec<Issue>> {
        self.invoker
            .invoke(CMD_LIST_ISSUES, json!({ "project_id": project_id }))
    }

    pub fn get_selected_projects(&self) -> Result<Vec<i64>> {
        self.invoker.invoke_no_args(CMD_GET_SELECTED_PROJECTS)
    }

    pub fn save_selected_projects(&self, project_ids: &[i64]) -> Result<()> {
        self.invoker.invoke(
            CMD_SAVE_SELECTED_PROJECTS,
            json!({ "project_ids": project_ids }),
        )
    }

    pub fn get_aggregated_issues(&self, project_ids: &[i64]) -> Result<Vec<Issue>> {
        self.invoker.invoke(
            CMD_GET_AGGREGATED_ISSUES,
            json!({ "project_ids": project_ids }),
        )
    }

    pub fn get_project_metadata(&self, project_id: i64) -> Result<ProjectMetadata> {
        self.invoker
            .invoke(CMD_GET_PROJECT_METADATA, json!({ "project_id": project_id }))
    }

    // === Issues ===

    pub fn get_issue_detail(&self, issue_id: i64) -> Result<IssueDetail> {
        self.invoker
            .invoke(CMD_GET_ISSUE_DETAIL, json!({ "issue_id": issue_id }))
    }

    pub fn get_issue_history(&self, issue_id: i64) -> Result<Vec<HistoryEntry>> {
        self.invoker
            .invoke(CMD_GET_ISSUE_HISTORY, json!({ "issue_id": issue_id }))
    }

    /// Mutations carry the issue version for optimistic locking; the backend
    /// rejects stale versions with a conflict error.
    pub fn change_issue_status(
        &self,
        issue_id: i64,
        status_id: i64,
        version: i64,
    ) -> Result<IssueDetail> {
        self.invoker.invoke(
            CMD_CHANGE_ISSUE_STATUS,
            json!({
                "issue_id": issue_id,
                "status_id": status_id,
                "version": version,
            }),
        )
    }

    pub fn change_issue_assignee(
        &self,
        issue_id: i64,
        assigned_to: Option<i64>,
        version: i64,
    ) -> Result<IssueDetail> {
        self.invoker.invoke(
            CMD_CHANGE_ISSUE_ASSIGNEE,
            json!({
                "issue_id": issue_id,
                "assigned_to": assigned_to,
                "version": version,
            }),
        )
    }

    pub fn add_issue_comment(
        &self,
        issue_id: i64,
        comment: &str,
        version: i64,
    ) -> Result<IssueDetail> {
        self.invoker.invoke(
            CMD_ADD_ISSUE_COMMENT,
            json!({
                "issue_id": issue_id,
                "comment": comment,
                "version": version,
            }),
        )
    }

    // === Saved views ===

    pub fn list_views(&self) -> Result<Vec<SavedView>> {
        self.invoker.invoke_no_args(CMD_LIST_VIEWS)
    }

    /// Persists the filter in canonical form so stored views compare and
    /// deduplicate byte-for-byte.
    pub fn create_view(&self, name: &str, filter: &FilterSpec) -> Result<SavedView> {
        let filter_data = filter::canonical_json(filter)?;
        self.invoker.invoke(
            CMD_CREATE_VIEW,
            json!({ "name": name, "filter_data": filter_data }),
        )
    }

    pub fn update_view(&self, view_id: i64, name: &str, filter: &FilterSpec) -> Result<()> {
        let filter_data = filter::canonical_json(filter)?;
        self.invoker.invoke(
            CMD_UPDATE_VIEW,
            json!({
                "id": view_id,
                "name": name,
                "filter_data": filter_data,
            }),
        )
    }

    pub fn delete_view(&self, view_id: i64) -> Result<()> {
        self.invoker.invoke(CMD_DELETE_VIEW, json!({ "id": view_id }))
    }

    pub fn set_default_view(&self, view_id: i64) -> Result<()> {
        self.invoker
            .invoke(CMD_SET_DEFAULT_VIEW, json!({ "id": view_id }))
    }

    // === Local drafts ===

    pub fn save_local_draft(&self, issue_id: i64, content: &str) -> Result<()> {
        self.invoker.invoke(
            CMD_SAVE_LOCAL_DRAFT,
            json!({ "issue_id": issue_id, "content": content }),
        )
    }

    pub fn get_local_draft(&self, issue_id: i64) -> Result<Option<String>> {
        self.invoker
            .invoke(CMD_GET_LOCAL_DRAFT, json!({ "issue_id": issue_id }))
    }

    pub fn delete_local_draft(&self, issue_id: i64) -> Result<()> {
        self.invoker
            .invoke(CMD_DELETE_LOCAL_DRAFT, json!({ "issue_id": issue_id }))
    }
}
