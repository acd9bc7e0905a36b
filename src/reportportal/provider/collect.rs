use chrono::{Local, TimeZone};
use log::{debug, error, info};
use serde::Serialize;
use tokio::time::sleep;

use super::core::ReportPortalProvider;
use crate::case_id::CaseIdentity;
use crate::error::Result;
use crate::reportportal::client::{ItemDto, LaunchDto};
use crate::reportportal::Source;
use crate::results::{CaseResults, LaunchKey, Occurrence};
use crate::url_utils::launch_ui_url;

/// Per-source bookkeeping of a collection pass.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub source: Source,
    pub launch_list_failed: bool,
    pub launches_listed: usize,
    pub launches_skipped: usize,
    pub launches_failed: usize,
    pub occurrences_recorded: usize,
}

impl CollectionReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            launch_list_failed: false,
            launches_listed: 0,
            launches_skipped: 0,
            launches_failed: 0,
            occurrences_recorded: 0,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.launch_list_failed || self.launches_failed > 0
    }
}

/// Launch-level fields copied into every occurrence of the launch.
struct LaunchContext {
    key: LaunchKey,
    link: String,
    date: String,
    build_version: String,
    architecture: String,
    profile_name: String,
    platform: String,
}

impl LaunchContext {
    fn occurrence(&self, status: &str, identity: CaseIdentity) -> Occurrence {
        Occurrence {
            status: status.to_string(),
            author: identity.author,
            link: self.link.clone(),
            date: self.date.clone(),
            build_version: self.build_version.clone(),
            architecture: self.architecture.clone(),
            profile_name: self.profile_name.clone(),
            platform: self.platform.clone(),
            title: identity.title,
        }
    }
}

struct StepRecord {
    keys: Vec<String>,
    subteam: String,
    occurrence: Occurrence,
}

fn launch_date(start_time_ms: i64) -> String {
    Local
        .timestamp_millis_opt(start_time_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl ReportPortalProvider {
    /// Runs every source in order against one shared result set.
    pub async fn collect_case_results(&self) -> (CaseResults, Vec<CollectionReport>) {
        let mut results = CaseResults::new();
        let mut reports = Vec::with_capacity(Source::ALL.len());

        for source in Source::ALL {
            reports.push(self.collect_source(source, &mut results).await);
        }

        info!("Collected results for {} cases", results.len());
        (results, reports)
    }

    /// Folds one source's launches into `results`.
    ///
    /// Failures never escape: a failed launch listing yields no launches,
    /// an undecodable launch is counted as failed, and a failed item page
    /// ends that launch only.
    pub async fn collect_source(
        &self,
        source: Source,
        results: &mut CaseResults,
    ) -> CollectionReport {
        info!("Collecting {source} case results");
        let mut report = CollectionReport::new(source);
        let filter = source.composite_filter(&self.config.version, &self.config.subteam);

        let launches = match self
            .client
            .fetch_launches(source, &filter, self.config.days)
            .await
        {
            Ok(launches) => launches,
            Err(e) => {
                error!("Failed to list {source} launches: {e}");
                report.launch_list_failed = true;
                return report;
            }
        };

        if launches.is_empty() {
            info!("No {source} launch found");
        }
        report.launches_listed = launches.len();

        let mut launch_number = 0;
        for raw in launches {
            let launch = match LaunchDto::decode(raw) {
                Ok(launch) => launch,
                Err(e) => {
                    error!("Skipping malformed {source} launch: {e}");
                    report.launches_failed += 1;
                    continue;
                }
            };
            if !launch.has_executions() {
                report.launches_skipped += 1;
                continue;
            }

            let context = self.launch_context(source, &launch);
            if source.is_throttled() {
                sleep(self.config.launch_throttle).await;
            }
            info!(
                "Get result from: {launch_number}: {} {}",
                launch.name, launch.id
            );
            launch_number += 1;

            match self.collect_launch(&context, results).await {
                Ok(recorded) => report.occurrences_recorded += recorded,
                Err(e) => {
                    error!(
                        "Failed to collect items of {source} launch {}: {e}",
                        launch.id
                    );
                    report.launches_failed += 1;
                }
            }
        }

        report
    }

    fn launch_context(&self, source: Source, launch: &LaunchDto) -> LaunchContext {
        let build_version = launch
            .attribute(source.build_version_key())
            .unwrap_or_default()
            .to_string();
        let profile_name = launch
            .attribute("profilename")
            .unwrap_or_default()
            .to_string();

        LaunchContext {
            key: LaunchKey {
                source,
                launch_id: launch.id,
            },
            link: launch_ui_url(self.client.base_url.as_str(), source.project(), launch.id),
            date: launch_date(launch.start_time),
            architecture: source.architecture(&build_version, launch.attribute("architecture")),
            platform: source.classify_platform(&profile_name),
            build_version,
            profile_name,
        }
    }

    /// Walks the launch's item pages until `totalPages` or an empty page.
    async fn collect_launch(
        &self,
        context: &LaunchContext,
        results: &mut CaseResults,
    ) -> Result<usize> {
        let LaunchKey { source, launch_id } = context.key;
        let mut recorded = 0;
        let mut page_number = 1;
        let mut total_pages = 1;

        while page_number <= total_pages {
            let page = self
                .client
                .fetch_item_page(source, launch_id, page_number)
                .await?;
            if page_number == 1 {
                total_pages = page.total_pages();
            }

            let items = page.into_content();
            if items.is_empty() {
                debug!("Launch {launch_id} page {page_number} is empty, stopping");
                break;
            }

            // Decode the whole page before touching the results.
            for record in self.step_records(context, &items)? {
                for key in &record.keys {
                    results.record(key, &record.subteam, context.key, record.occurrence.clone());
                    recorded += 1;
                }
            }

            page_number += 1;
        }

        Ok(recorded)
    }

    fn step_records(&self, context: &LaunchContext, items: &[ItemDto]) -> Result<Vec<StepRecord>> {
        items
            .iter()
            .filter(|item| item.is_step())
            .map(|item| {
                let subteam = item.subteam()?;
                let identity = self.parser.parse(&item.name);
                Ok(StepRecord {
                    keys: identity.record_keys(&item.name),
                    subteam,
                    occurrence: context.occurrence(&item.status, identity),
                })
            })
            .collect()
    }
}
