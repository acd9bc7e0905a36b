use log::{info, warn};
use serde_json::Value;

use super::{Issue, IssueTracker, NewSubtask, SubIssue};
use crate::error::{CaseLensError, Result};
use crate::sheets::{Spreadsheet, ValueInput};

/// Cases below this pass ratio (in percent) get a tracking sub-task.
pub const PASS_RATIO_THRESHOLD: f64 = 85.0;

const COL_CASE_ID: usize = 0;
const COL_TITLE: usize = 1;
const COL_AUTHOR: usize = 2;
const COL_PASS_RATIO: usize = 6;
const COL_FAILED_JOBS: usize = 7;
const COL_TICKET: usize = 9;
const MIN_ROW_CELLS: usize = 7;

const OWNER_ACCOUNTS: [(&str, &str); 6] = [
    ("xzha", "rhn-support-xzha"),
    ("jiazha", "rhn-support-jiazha"),
    ("kuiwang", "rhn-support-kuiwang"),
    ("bandrade", "bandrade@redhat.com"),
    ("scolange", "rhn-support-xzha"),
    ("tbuskey", "rhn-support-xzha"),
];

/// Tracker account responsible for cases written by `author`.
pub fn owner_account(author: &str) -> Result<&'static str> {
    let author = author.trim();
    OWNER_ACCOUNTS
        .iter()
        .find(|(name, _)| *name == author)
        .map(|(_, account)| *account)
        .ok_or_else(|| CaseLensError::Lookup(format!("No tracker account for author '{author}'")))
}

/// Reads a pass-ratio cell as a percentage. `"66.7%"` and `"66.7"` give
/// 66.7; a bare fraction such as `"0.5"` is scaled to 50.
pub fn parse_pass_ratio(text: &str) -> Option<f64> {
    let has_percent = text.contains('%');
    let value: f64 = text.replace('%', "").trim().parse().ok()?;
    if !has_percent && value <= 1.0 {
        Some(value * 100.0)
    } else {
        Some(value)
    }
}

/// A published row whose case needs a ticket.
#[derive(Debug, Clone, PartialEq)]
struct UnstableCase {
    row_number: usize,
    case_id: String,
    title: String,
    author: String,
    ratio_text: String,
    failed_jobs: String,
}

impl UnstableCase {
    fn from_row(index: usize, row: &[String]) -> Option<Self> {
        if row.len() < MIN_ROW_CELLS || !row[COL_CASE_ID].contains("OCP-") {
            return None;
        }
        let cell = |column: usize| row.get(column).cloned().unwrap_or_default();

        let ticket = cell(COL_TICKET);
        if !ticket.is_empty() {
            info!("Ticket {ticket} already filed for {}", row[COL_CASE_ID]);
            return None;
        }

        let ratio_text = cell(COL_PASS_RATIO);
        let Some(ratio) = parse_pass_ratio(&ratio_text) else {
            warn!(
                "Unreadable pass ratio '{ratio_text}' for {}",
                row[COL_CASE_ID]
            );
            return None;
        };
        if ratio >= PASS_RATIO_THRESHOLD {
            return None;
        }
        info!("{} pass ratio is {ratio}", row[COL_CASE_ID]);

        Some(Self {
            row_number: index + 1,
            case_id: cell(COL_CASE_ID),
            title: cell(COL_TITLE),
            author: cell(COL_AUTHOR),
            ratio_text,
            failed_jobs: cell(COL_FAILED_JOBS),
        })
    }
}

/// Outcome of filing one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiledTicket {
    pub case_id: String,
    pub row_number: usize,
    pub key: String,
    pub link: String,
    pub reused: bool,
}

/// Files tracking sub-tasks under a parent issue for unstable cases.
pub struct TicketFiler<'a> {
    tracker: &'a dyn IssueTracker,
    parent_key: String,
    version: String,
}

impl<'a> TicketFiler<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, parent_key: &str, version: &str) -> Self {
        Self {
            tracker,
            parent_key: parent_key.to_string(),
            version: version.to_string(),
        }
    }

    /// Scans `sheet_name` and files a ticket for every unstable case that
    /// has none yet, writing the ticket link into column J.
    pub async fn file_from_sheet(
        &self,
        sheet: &dyn Spreadsheet,
        sheet_name: &str,
    ) -> Result<Vec<FiledTicket>> {
        let mut parent = self.tracker.issue(&self.parent_key).await?;
        let subtask_keys: Vec<_> = parent.subtasks.iter().map(|s| s.key.as_str()).collect();
        info!(
            "Parent {} has {} sub-tasks: {subtask_keys:?}",
            parent.key,
            parent.subtasks.len()
        );

        let values = sheet.all_values(sheet_name).await?;
        let mut filed = Vec::new();

        for (index, row) in values.iter().enumerate().skip(1) {
            let Some(case) = UnstableCase::from_row(index, row) else {
                continue;
            };

            let ticket = self.file_case(&mut parent, &case).await?;
            sheet
                .update_range(
                    sheet_name,
                    &format!("J{}", case.row_number),
                    vec![vec![Value::from(ticket.link.as_str())]],
                    ValueInput::UserEntered,
                )
                .await?;
            filed.push(ticket);
        }

        info!("Filed {} tickets", filed.len());
        Ok(filed)
    }

    async fn file_case(&self, parent: &mut Issue, case: &UnstableCase) -> Result<FiledTicket> {
        let account = owner_account(&case.author)?;
        let comment = format!(
            "{}: pass ratio is {}\n{}",
            self.version, case.ratio_text, case.failed_jobs
        );
        let description = format!(
            "Hi, @{account}\n{} {} is unstable, please help to check it.\n{comment}",
            case.case_id, case.title
        );

        let needle = case.case_id.to_lowercase();
        let existing = parent
            .subtasks
            .iter()
            .find(|sub| sub.summary.to_lowercase().contains(&needle));

        let (key, reused) = if let Some(sub) = existing {
            if sub.is_closed() {
                warn!(
                    "Sub-task {} for {} is closed, reusing it",
                    sub.key, case.case_id
                );
            }
            info!("Add comment to {}", sub.key);
            self.tracker.add_comment(&sub.key, &description).await?;
            (sub.key.clone(), true)
        } else {
            info!("Create sub-task for {}", case.case_id);
            let summary = format!("{} is unstable", case.case_id);
            let key = self
                .tracker
                .create_subtask(&NewSubtask {
                    project_key: parent.project_key.clone(),
                    parent_key: parent.key.clone(),
                    summary: summary.clone(),
                    description,
                    assignee: account.to_string(),
                })
                .await?;
            info!("Sub-task {key} created");
            // Later rows for the same case comment on this one.
            parent.subtasks.push(SubIssue {
                key: key.clone(),
                summary,
                status: String::new(),
            });
            (key, false)
        };

        Ok(FiledTicket {
            case_id: case.case_id.clone(),
            row_number: case.row_number,
            link: self.tracker.browse_url(&key),
            key,
            reused,
        })
    }
}
