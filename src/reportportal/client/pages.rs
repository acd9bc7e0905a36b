use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::core::ReportPortalClient;
use crate::error::{CaseLensError, Result};
use crate::reportportal::Source;

pub const LAUNCH_PAGE_SIZE: u32 = 2000;
pub const ITEM_PAGE_SIZE: u32 = 400;
const MINUTES_PER_DAY: u32 = 1440;

/// One page of a ReportPortal listing. Both fields may be absent on error
/// responses.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub content: Option<Vec<T>>,
    pub page: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        self.page
            .as_ref()
            .and_then(|meta| meta.total_pages)
            .unwrap_or(1)
    }

    pub fn into_content(self) -> Vec<T> {
        self.content.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDto {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub start_time: i64,
    #[serde(default)]
    pub attributes: Vec<AttributeDto>,
    #[serde(default)]
    pub statistics: Option<StatisticsDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDto {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsDto {
    #[serde(default)]
    pub executions: Option<Map<String, Value>>,
}

impl LaunchDto {
    /// Decodes one entry of a launch listing.
    pub fn decode(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| CaseLensError::DataShape(format!("Failed to decode launch: {e}")))
    }

    pub fn has_executions(&self) -> bool {
        self.statistics
            .as_ref()
            .and_then(|stats| stats.executions.as_ref())
            .is_some_and(|executions| !executions.is_empty())
    }

    /// Value of the last attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|attr| attr.key.as_deref() == Some(key))
            .last()
            .map(|attr| attr.value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub path_names: Option<PathNamesDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNamesDto {
    #[serde(default)]
    pub item_paths: Vec<ItemPathDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemPathDto {
    pub name: String,
}

impl ItemDto {
    pub fn is_step(&self) -> bool {
        self.item_type == "STEP"
    }

    /// Subteam is the first path segment, minus the `_cucushift` suffix.
    pub fn subteam(&self) -> Result<String> {
        self.path_names
            .as_ref()
            .and_then(|paths| paths.item_paths.first())
            .map(|path| path.name.replace("_cucushift", ""))
            .ok_or_else(|| {
                CaseLensError::DataShape(format!("item '{}' has no path names", self.name))
            })
    }
}

fn decode_page<T: DeserializeOwned>(value: Value, what: &str) -> Result<Page<T>> {
    serde_json::from_value(value)
        .map_err(|e| CaseLensError::DataShape(format!("Failed to decode {what} page: {e}")))
}

impl ReportPortalClient {
    /// Raw launches of `source` matching `composite_filter` that started
    /// within the last `days` days. Only the first page is read; entries
    /// are left undecoded so one bad launch cannot sink the listing.
    pub async fn fetch_launches(
        &self,
        source: Source,
        composite_filter: &str,
        days: u32,
    ) -> Result<Vec<Value>> {
        let mut url = self.api_url(source.project(), "launch")?;
        url.query_pairs_mut()
            .append_pair("filter.has.compositeAttribute", composite_filter)
            .append_pair(
                "filter.btw.startTime",
                &format!("-{};{MINUTES_PER_DAY};-0000", MINUTES_PER_DAY * days),
            )
            .append_pair("page.size", &LAUNCH_PAGE_SIZE.to_string());

        let body = self.fetch_json(url).await?;
        Ok(decode_page::<Value>(body, "launch")?.into_content())
    }

    /// One page (1-based) of the items belonging to `launch_id`.
    pub async fn fetch_item_page(
        &self,
        source: Source,
        launch_id: u64,
        page: u32,
    ) -> Result<Page<ItemDto>> {
        let mut url = self.api_url(source.project(), "item")?;
        url.query_pairs_mut()
            .append_pair("filter.eq.launchId", &launch_id.to_string())
            .append_pair("launchesLimit", "0")
            .append_pair("page.size", &ITEM_PAGE_SIZE.to_string())
            .append_pair("page.page", &page.to_string());

        let body = self.fetch_json(url).await?;
        decode_page(body, "item")
    }
}
