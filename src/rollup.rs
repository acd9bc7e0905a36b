use log::{debug, error};

use crate::results::{CaseResults, ReportRow, Rollup, STATUS_FAILED, STATUS_PASSED};

/// Which subteam's cases end up in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubteamFilter {
    All,
    Only(String),
}

impl From<&str> for SubteamFilter {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }
}

impl SubteamFilter {
    pub fn matches(&self, subteam: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => name == subteam,
        }
    }

    pub fn team(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RollupOptions {
    pub subteam: SubteamFilter,
    pub skip_no_failure_cases: bool,
}

pub fn pass_ratio(passed: usize, failed: usize) -> Option<f64> {
    let total = passed + failed;
    #[allow(clippy::cast_precision_loss)]
    let ratio = (total > 0).then(|| passed as f64 / total as f64);
    ratio
}

/// Builds report rows and platform/subteam tallies from the merged results.
///
/// Tallies count every PASSED/FAILED occurrence of a matching subteam, even
/// for cases whose row is suppressed by `skip_no_failure_cases`.
pub fn compute_rollup(results: &CaseResults, options: &RollupOptions) -> Rollup {
    let mut rollup = Rollup::default();

    for (case_id, case) in results.iter() {
        let subteam = case.subteam.as_str();
        if !options.subteam.matches(subteam) {
            continue;
        }
        debug!("Check {case_id} result");

        let mut passed = 0;
        let mut failed = 0;
        let mut failed_jobs = Vec::new();
        let mut author = "";
        let mut title = "";

        for occurrence in case.occurrences.values() {
            author = occurrence.author.as_str();
            title = occurrence.title.as_str();

            let is_pass = match occurrence.status.as_str() {
                STATUS_PASSED => {
                    passed += 1;
                    true
                }
                STATUS_FAILED => {
                    failed += 1;
                    failed_jobs.push(occurrence.failed_job());
                    false
                }
                _ => continue,
            };

            if occurrence.platform.is_empty() {
                error!(
                    "The platform is empty for {} {}",
                    occurrence.profile_name, occurrence.link
                );
                continue;
            }
            rollup.tallies.count(&occurrence.platform, subteam, is_pass);
        }

        if failed == 0 && (options.skip_no_failure_cases || passed == 0) {
            debug!("Skip {case_id}");
            continue;
        }
        let Some(ratio) = pass_ratio(passed, failed) else {
            continue;
        };

        rollup.rows.push(ReportRow {
            case_id: case_id.clone(),
            title: title.to_string(),
            author: author.to_string(),
            subteam: subteam.to_string(),
            passed,
            failed,
            pass_ratio: ratio,
            failed_jobs,
        });
    }

    rollup
}
