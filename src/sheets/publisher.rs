use chrono::NaiveDate;
use log::{debug, info};
use serde_json::Value;

use super::{Spreadsheet, ValueInput, Worksheet};
use crate::error::{CaseLensError, Result};
use crate::reportportal::PLATFORMS;
use crate::results::Rollup;

pub const TEMPLATE_SHEET: &str = "template";
pub const TREND_SHEET: &str = "Monthly CI Pass Ratio Trend";
/// Report rows start right below this row.
pub const ROW_OFFSET: usize = 32;
const TALLY_STOP_LABEL: &str = "Total";

/// Trend-sheet column tracking `version`, as (number, letter).
pub fn trend_column(version: &str) -> Option<(usize, &'static str)> {
    match version {
        "4.15" => Some((8, "H")),
        "4.14" => Some((10, "J")),
        "4.13" => Some((12, "L")),
        _ => None,
    }
}

/// Writes a rollup into a fresh copy of the template worksheet.
pub struct ReportPublisher<'a> {
    sheet: &'a dyn Spreadsheet,
    version: String,
}

impl<'a> ReportPublisher<'a> {
    pub fn new(sheet: &'a dyn Spreadsheet, version: &str) -> Self {
        Self {
            sheet,
            version: version.to_string(),
        }
    }

    pub fn sheet_name(&self, today: NaiveDate) -> String {
        format!("{}-{}", self.version, today.format("%Y%m%d"))
    }

    /// Publishes `rollup` and returns the title of the new worksheet.
    pub async fn publish(&self, rollup: &Rollup, today: NaiveDate) -> Result<String> {
        let worksheets = self.sheet.worksheets().await?;
        let template = worksheets
            .iter()
            .find(|ws| ws.title == TEMPLATE_SHEET)
            .ok_or_else(|| {
                CaseLensError::Lookup(format!("Worksheet '{TEMPLATE_SHEET}' not found"))
            })?;

        let sheet_name = self.sheet_name(today);
        let target = self.sheet.duplicate_sheet(template, 1).await?;
        self.sheet.rename_sheet(&target, &sheet_name).await?;
        info!("Created worksheet {sheet_name}");

        let worksheets = self.sheet.worksheets().await?;
        if let Some(trend) = worksheets.iter().find(|ws| ws.title == TREND_SHEET) {
            info!("Update {TREND_SHEET}");
            self.update_trend(trend, &sheet_name).await?;
        }

        self.write_rows(&sheet_name, rollup).await?;
        self.write_tallies(&sheet_name, rollup).await?;

        Ok(sheet_name)
    }

    async fn update_trend(&self, trend: &Worksheet, sheet_name: &str) -> Result<()> {
        let Some((column, letter)) = trend_column(&self.version) else {
            debug!("No trend column for version {}", self.version);
            return Ok(());
        };

        let next_row = self.sheet.col_values(&trend.title, column).await?.len() + 1;
        let date = sheet_name
            .strip_prefix(&format!("{}-", self.version))
            .unwrap_or(sheet_name);
        debug!("Update {letter}{next_row} to be {date}");

        self.sheet
            .update_range(
                &trend.title,
                &format!("{letter}{next_row}"),
                vec![vec![Value::from(date)]],
                ValueInput::UserEntered,
            )
            .await
    }

    async fn write_rows(&self, sheet_name: &str, rollup: &Rollup) -> Result<()> {
        if rollup.rows.is_empty() {
            info!("No case rows to write");
            return Ok(());
        }

        let first = ROW_OFFSET + 1;
        let last = ROW_OFFSET + rollup.rows.len();
        let cells = rollup.rows.iter().map(|row| row.to_cells()).collect();

        let range = format!("A{first}:H{last}");
        self.sheet
            .update_range(sheet_name, &range, cells, ValueInput::Raw)
            .await
    }

    /// Fills `M:AF` of every labelled row above `Total` with per-platform
    /// (pass, failed) pairs for the row's subteam.
    async fn write_tallies(&self, sheet_name: &str, rollup: &Rollup) -> Result<()> {
        let labels = self.sheet.col_values(sheet_name, 1).await?;

        for (index, subteam) in labels.iter().enumerate() {
            let row_number = index + 1;
            if subteam.is_empty() {
                continue;
            }
            if subteam == TALLY_STOP_LABEL {
                break;
            }

            let content = tally_cells(rollup, subteam);
            info!("update M{row_number}:AF{row_number} for {subteam}");
            self.sheet
                .update_range(
                    sheet_name,
                    &format!("M{row_number}:AF{row_number}"),
                    vec![content],
                    ValueInput::UserEntered,
                )
                .await?;
        }

        Ok(())
    }
}

fn tally_cells(rollup: &Rollup, subteam: &str) -> Vec<Value> {
    PLATFORMS
        .iter()
        .flat_map(|platform| {
            let tally = rollup.tallies.get(platform, subteam);
            [Value::from(tally.pass), Value::from(tally.failed)]
        })
        .collect()
}
