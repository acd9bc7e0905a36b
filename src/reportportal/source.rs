use serde::Serialize;

use crate::rollup::SubteamFilter;

/// Platforms in report column order; classification takes the first hit.
pub const PLATFORMS: [&str; 10] = [
    "aws", "gcp", "vsphere", "azure", "baremetal", "alibaba", "ibmcloud", "nutanix", "osp",
    "powervs",
];

/// Jenkins profile names that carry no platform from the list above.
const JENKINS_FALLBACKS: [(&str, &str); 3] = [
    ("metal", "baremetal"),
    ("osp", "osp"),
    ("packet", "baremetal"),
];

const JENKINS_LAUNCH_TYPE: &str = "launchtype:golang,pipeline_type:prereleasepipeline";

/// The two launch feeds results are collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Prow,
    Jenkins,
}

impl Source {
    /// Collection order. Later sources win the subteam of shared cases.
    pub const ALL: [Source; 2] = [Source::Prow, Source::Jenkins];

    /// ReportPortal project the source's launches live in.
    pub fn project(self) -> &'static str {
        match self {
            Self::Prow => "prow",
            Self::Jenkins => "ocp",
        }
    }

    pub fn build_version_key(self) -> &'static str {
        match self {
            Self::Prow => "version_installed",
            Self::Jenkins => "build_version",
        }
    }

    pub fn composite_filter(self, version: &str, subteam: &SubteamFilter) -> String {
        match self {
            Self::Prow => format!("version:{version}"),
            Self::Jenkins => {
                let mut filter = format!("version:{}", version.replace('.', "_"));
                if let Some(team) = subteam.team() {
                    filter.push_str(",team:");
                    filter.push_str(team);
                }
                filter.push(',');
                filter.push_str(JENKINS_LAUNCH_TYPE);
                filter
            }
        }
    }

    pub fn classify_platform(self, profile_name: &str) -> String {
        let profile = profile_name.to_lowercase();
        if let Some(platform) = PLATFORMS.iter().find(|p| profile.contains(*p)) {
            return (*platform).to_string();
        }

        let fallback = match self {
            Self::Prow => None,
            Self::Jenkins => JENKINS_FALLBACKS
                .into_iter()
                .find(|(needle, _)| profile.contains(needle))
                .map(|(_, platform)| platform),
        };
        fallback.unwrap_or_default().to_string()
    }

    /// Prow launches carry an `architecture` attribute; jenkins ones only
    /// hint at it through the build version.
    pub fn architecture(self, build_version: &str, attribute: Option<&str>) -> String {
        match self {
            Self::Prow => attribute.unwrap_or_default().to_string(),
            Self::Jenkins => {
                let version = build_version.to_lowercase();
                if version.contains("arm") {
                    "arm64".to_string()
                } else if version.contains("multi") {
                    "multi".to_string()
                } else {
                    "amd64".to_string()
                }
            }
        }
    }

    pub fn is_throttled(self) -> bool {
        matches!(self, Self::Prow)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prow => write!(f, "prow"),
            Self::Jenkins => write!(f, "jenkins"),
        }
    }
}
