mod client;
mod oauth;
mod publisher;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use client::GoogleSheetsClient;
pub use oauth::{fetch_access_token, ServiceAccountKey};
pub use publisher::{trend_column, ReportPublisher, ROW_OFFSET, TEMPLATE_SHEET, TREND_SHEET};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub id: i64,
    pub title: String,
    pub index: usize,
}

/// How written cells are interpreted by the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput {
    Raw,
    UserEntered,
}

impl ValueInput {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// Grid store the report is published into. Columns and rows are 1-based,
/// ranges use A1 notation without the sheet name.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    async fn worksheets(&self) -> Result<Vec<Worksheet>>;

    /// Copies `source` into position `index` and returns the copy.
    async fn duplicate_sheet(&self, source: &Worksheet, index: usize) -> Result<Worksheet>;

    async fn rename_sheet(&self, sheet: &Worksheet, title: &str) -> Result<()>;

    /// Values of `column` down to the last non-empty cell.
    async fn col_values(&self, sheet: &str, column: usize) -> Result<Vec<String>>;

    async fn update_range(
        &self,
        sheet: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInput,
    ) -> Result<()>;

    async fn all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>>;
}

/// 1 → `A`, 27 → `AA`.
pub fn column_letter(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// `'<sheet>'!<range>`, doubling quotes inside the title.
pub fn sheet_range(sheet: &str, range: &str) -> String {
    let title = sheet.replace('\'', "''");
    if range.is_empty() {
        format!("'{title}'")
    } else {
        format!("'{title}'!{range}")
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
