use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{info, warn};

use caselens::auth::{resolve_reportportal_token, Token};
use caselens::reportportal::{
    CollectConfig, CollectionReport, ReportPortalClient, ReportPortalProvider,
};
use caselens::rollup::{compute_rollup, RollupOptions, SubteamFilter};
use caselens::sheets::{GoogleSheetsClient, ReportPublisher, Spreadsheet};
use caselens::tickets::{JiraClient, TicketFiler};
use caselens::CaseLensError;

pub const DEFAULT_REPORTPORTAL_URL: &str =
    "https://reportportal-openshift.apps.ocp-c1.prod.psi.redhat.com";
pub const DEFAULT_JIRA_URL: &str = "https://issues.redhat.com";

#[derive(Parser)]
#[command(name = "caselens")]
#[command(author, about = "Per-case CI result aggregation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// ReportPortal API token
    #[arg(short, long, global = true, env = "RP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// JSON file holding the ReportPortal token when none is given
    #[arg(long, global = true, default_value = "/root/rp.key")]
    rp_key_file: PathBuf,

    /// Google service-account key file
    #[arg(short, long, global = true)]
    key: Option<PathBuf>,

    /// Target spreadsheet URL
    #[arg(short, long, global = true)]
    file: Option<String>,

    /// Subteam to report on, or "all"
    #[arg(short, long, global = true, default_value = "OLM")]
    subteam: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// OCP version
    #[arg(short = 'v', long = "version", global = true, default_value = "4.14")]
    ocp_version: String,

    /// Number of days of launches to collect
    #[arg(short, long, global = true, default_value_t = 7)]
    days: u32,

    /// Parent issue the unstable-case sub-tasks are filed under
    #[arg(short, long, global = true)]
    parent_jira: Option<String>,

    /// Jira personal access token
    #[arg(long, global = true, env = "JIRA_TOKEN", hide_env_values = true)]
    jira_token: Option<String>,

    /// Existing worksheet to file tickets from
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Leave cases without failures out of the report rows
    #[arg(long, global = true, default_value_t = false)]
    skip_no_failure_cases: bool,

    #[arg(long, global = true, default_value = DEFAULT_REPORTPORTAL_URL)]
    reportportal_url: String,

    #[arg(long, global = true, default_value = DEFAULT_JIRA_URL)]
    jira_url: String,

    /// Validate the ReportPortal TLS certificate
    #[arg(long, global = true, default_value_t = false)]
    verify_tls: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect case results, publish them and optionally file tickets
    Report,
    /// File tickets from an already published worksheet
    Tickets,
}

struct SheetTarget<'a> {
    key: &'a Path,
    url: &'a str,
}

impl Cli {
    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_deref()
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Report => self.report().await,
            Commands::Tickets => self.tickets().await,
        }
    }

    async fn report(&self) -> Result<()> {
        let target = self.sheet_target()?;
        let jira_token = self.jira_token()?;
        let subteam = SubteamFilter::from(self.subteam.as_str());

        let token = resolve_reportportal_token(self.token.as_deref(), &self.rp_key_file)?;
        let client = ReportPortalClient::new(&self.reportportal_url, token, self.verify_tls)?;
        let config = CollectConfig::new(&self.ocp_version, self.days, subteam.clone());
        let provider = ReportPortalProvider::new(client, config);

        info!(
            "Collecting {} case results of the last {} days",
            self.ocp_version, self.days
        );
        let (results, reports) = provider.collect_case_results().await;
        log_collection(&reports);

        let rollup = compute_rollup(
            &results,
            &RollupOptions {
                subteam,
                skip_no_failure_cases: self.skip_no_failure_cases,
            },
        );
        info!("Rollup has {} rows", rollup.rows.len());

        let sheets = GoogleSheetsClient::open_by_url(target.url, target.key)
            .await
            .context("Failed to open target spreadsheet")?;
        let sheet_name = ReportPublisher::new(&sheets, &self.ocp_version)
            .publish(&rollup, Local::now().date_naive())
            .await
            .context("Failed to publish report")?;
        info!("Report written to {sheet_name}");

        if let (Some(parent), Some(jira_token)) = (&self.parent_jira, jira_token) {
            self.file_tickets(&sheets, &sheet_name, parent, jira_token)
                .await?;
        }

        Ok(())
    }

    async fn tickets(&self) -> Result<()> {
        let target = self.sheet_target()?;
        let sheet_name = required(self.sheet.as_deref(), "sheet")?;
        let parent = required(self.parent_jira.as_deref(), "parent-jira")?;
        let jira_token = required(self.jira_token()?, "jira-token")?;

        let sheets = GoogleSheetsClient::open_by_url(target.url, target.key)
            .await
            .context("Failed to open target spreadsheet")?;
        self.file_tickets(&sheets, sheet_name, parent, jira_token)
            .await
    }

    async fn file_tickets(
        &self,
        sheets: &dyn Spreadsheet,
        sheet_name: &str,
        parent: &str,
        jira_token: Token,
    ) -> Result<()> {
        let tracker = JiraClient::new(&self.jira_url, jira_token)?;
        let filed = TicketFiler::new(&tracker, parent, &self.ocp_version)
            .file_from_sheet(sheets, sheet_name)
            .await
            .context("Failed to file tickets")?;

        for ticket in &filed {
            let action = if ticket.reused { "updated" } else { "created" };
            info!(
                "{}: {} {action} ({})",
                ticket.case_id, ticket.key, ticket.link
            );
        }
        Ok(())
    }

    fn sheet_target(&self) -> Result<SheetTarget<'_>> {
        match (&self.key, &self.file) {
            (Some(key), Some(url)) => Ok(SheetTarget { key, url }),
            _ => Err(CaseLensError::Config(
                "both --key and --file are required to reach the spreadsheet".to_string(),
            )
            .into()),
        }
    }

    /// Jira token, required only when a parent issue is given.
    fn jira_token(&self) -> Result<Option<Token>> {
        let token = self
            .jira_token
            .as_deref()
            .map(Token::from)
            .filter(|t| !t.is_empty());

        if self.parent_jira.is_some() && token.is_none() {
            return Err(CaseLensError::Config(
                "a parent issue was given without --jira-token".to_string(),
            )
            .into());
        }
        Ok(token)
    }
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| CaseLensError::Config(format!("--{flag} is required for tickets")).into())
}

fn log_collection(reports: &[CollectionReport]) {
    for report in reports {
        if report.is_partial() {
            warn!(
                "{} collection was partial: listing failed={}, {} of {} launches failed",
                report.source,
                report.launch_list_failed,
                report.launches_failed,
                report.launches_listed
            );
        } else {
            info!(
                "{}: {} launches, {} skipped, {} occurrences",
                report.source,
                report.launches_listed,
                report.launches_skipped,
                report.occurrences_recorded
            );
        }
    }
}
