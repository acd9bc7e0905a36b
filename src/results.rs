use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::reportportal::Source;

pub const STATUS_PASSED: &str = "PASSED";
pub const STATUS_FAILED: &str = "FAILED";

/// Identifies the launch an occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LaunchKey {
    pub source: Source,
    pub launch_id: u64,
}

/// One execution of a case inside one launch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub status: String,
    pub author: String,
    pub link: String,
    pub date: String,
    pub build_version: String,
    pub architecture: String,
    pub profile_name: String,
    pub platform: String,
    pub title: String,
}

impl Occurrence {
    pub fn failed_job(&self) -> String {
        format!(
            "{}: {}: {}",
            self.profile_name, self.build_version, self.link
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseRecord {
    pub subteam: String,
    pub occurrences: IndexMap<LaunchKey, Occurrence>,
}

/// Aggregation context shared by both collection routines.
///
/// Cases keep first-seen order; recording the same launch twice for a case
/// replaces the earlier occurrence, and the subteam is always overwritten
/// by the latest record.
#[derive(Debug, Default, Serialize)]
pub struct CaseResults {
    cases: IndexMap<String, CaseRecord>,
}

impl CaseResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str, subteam: &str, launch: LaunchKey, occurrence: Occurrence) {
        let case = self.cases.entry(key.to_string()).or_default();
        case.subteam = subteam.to_string();
        case.occurrences.insert(launch, occurrence);
    }

    pub fn get(&self, key: &str) -> Option<&CaseRecord> {
        self.cases.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CaseRecord)> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// One line of the published report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub case_id: String,
    pub title: String,
    pub author: String,
    pub subteam: String,
    pub passed: usize,
    pub failed: usize,
    pub pass_ratio: f64,
    pub failed_jobs: Vec<String>,
}

impl ReportRow {
    /// Cells in sheet column order `A..H`.
    pub fn to_cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.case_id.as_str()),
            Value::from(self.title.as_str()),
            Value::from(self.author.as_str()),
            Value::from(self.subteam.as_str()),
            Value::from(self.passed),
            Value::from(self.failed),
            Value::from(self.pass_ratio),
            Value::from(self.failed_jobs.join("\n")),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub pass: usize,
    pub failed: usize,
}

/// Pass/fail counts keyed by platform, then subteam.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformTallies {
    by_platform: IndexMap<String, IndexMap<String, Tally>>,
}

impl PlatformTallies {
    pub fn count(&mut self, platform: &str, subteam: &str, passed: bool) {
        let tally = self
            .by_platform
            .entry(platform.to_string())
            .or_default()
            .entry(subteam.to_string())
            .or_default();
        if passed {
            tally.pass += 1;
        } else {
            tally.failed += 1;
        }
    }

    pub fn get(&self, platform: &str, subteam: &str) -> Tally {
        self.by_platform
            .get(platform)
            .and_then(|subteams| subteams.get(subteam))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_platform.is_empty()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Rollup {
    pub rows: Vec<ReportRow>,
    pub tallies: PlatformTallies,
}
