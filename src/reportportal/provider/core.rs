use std::time::Duration;

use crate::case_id::{CaseNameParser, ColonSplitParser};
use crate::reportportal::client::ReportPortalClient;
use crate::rollup::SubteamFilter;

/// What to collect and how politely.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub version: String,
    pub days: u32,
    pub subteam: SubteamFilter,
    /// Pause before each throttled source's item fetch.
    pub launch_throttle: Duration,
}

impl CollectConfig {
    pub fn new(version: &str, days: u32, subteam: SubteamFilter) -> Self {
        Self {
            version: version.to_string(),
            days,
            subteam,
            launch_throttle: Duration::from_secs(1),
        }
    }
}

pub struct ReportPortalProvider {
    pub client: ReportPortalClient,
    pub config: CollectConfig,
    pub parser: Box<dyn CaseNameParser + Send + Sync>,
}

impl ReportPortalProvider {
    pub fn new(client: ReportPortalClient, config: CollectConfig) -> Self {
        Self {
            client,
            config,
            parser: Box::new(ColonSplitParser),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn CaseNameParser + Send + Sync>) -> Self {
        self.parser = parser;
        self
    }
}
