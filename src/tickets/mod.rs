mod filer;
mod jira;

use async_trait::async_trait;

use crate::error::Result;

pub use filer::{owner_account, parse_pass_ratio, FiledTicket, TicketFiler, PASS_RATIO_THRESHOLD};
pub use jira::JiraClient;

pub const STATUS_CLOSED: &str = "Closed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
}

impl SubIssue {
    pub fn is_closed(&self) -> bool {
        self.status == STATUS_CLOSED
    }
}

/// A parent issue together with its sub-issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub project_key: String,
    pub summary: String,
    pub status: String,
    pub subtasks: Vec<SubIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubtask {
    pub project_key: String,
    pub parent_key: String,
    pub summary: String,
    pub description: String,
    pub assignee: String,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn issue(&self, key: &str) -> Result<Issue>;

    /// Creates the sub-task and returns its key.
    async fn create_subtask(&self, subtask: &NewSubtask) -> Result<String>;

    async fn add_comment(&self, key: &str, body: &str) -> Result<()>;

    fn browse_url(&self, key: &str) -> String;
}
