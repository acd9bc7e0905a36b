use std::path::Path;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::oauth::{fetch_access_token, ServiceAccountKey};
use super::{cell_text, column_letter, sheet_range, Spreadsheet, ValueInput, Worksheet};
use crate::auth::Token;
use crate::error::{CaseLensError, Result};
use crate::url_utils::spreadsheet_id_from_url;

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Deserialize)]
struct SpreadsheetDto {
    #[serde(default)]
    sheets: Vec<SheetDto>,
}

#[derive(Debug, Deserialize)]
struct SheetDto {
    properties: SheetPropertiesDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetPropertiesDto {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: usize,
}

impl From<SheetPropertiesDto> for Worksheet {
    fn from(props: SheetPropertiesDto) -> Self {
        Self {
            id: props.sheet_id,
            title: props.title,
            index: props.index,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRangeDto {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateDto {
    #[serde(default)]
    replies: Vec<Value>,
}

/// Google Sheets v4 REST client bound to one spreadsheet.
pub struct GoogleSheetsClient {
    client: Client,
    api_url: Url,
    spreadsheet_id: String,
    token: Token,
}

impl GoogleSheetsClient {
    pub fn new(api_url: &str, spreadsheet_id: &str, token: Token) -> Result<Self> {
        Self::with_client(build_http_client()?, api_url, spreadsheet_id, token)
    }

    fn with_client(
        client: Client,
        api_url: &str,
        spreadsheet_id: &str,
        token: Token,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| CaseLensError::Config(format!("Invalid Sheets API URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
        })
    }

    /// Authenticates with the service-account key and binds to the
    /// spreadsheet behind `sheet_url`.
    pub async fn open_by_url(sheet_url: &str, key_file: &Path) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id_from_url(sheet_url)?;
        let key = ServiceAccountKey::from_file(key_file)?;
        let client = build_http_client()?;
        let token = fetch_access_token(&client, &key).await?;

        Self::with_client(client, SHEETS_API_URL, &spreadsheet_id, token)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CaseLensError::Config(format!("Invalid Sheets API URL: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        self.url(&[self.spreadsheet_id.as_str(), "values", range])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(self.token.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaseLensError::Api(format!(
                "Sheets request failed: {status} - {body}"
            )));
        }

        Ok(response.json::<T>().await?)
    }

    async fn batch_update(&self, request: Value) -> Result<BatchUpdateDto> {
        let endpoint = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[endpoint.as_str()])?;
        let body = json!({ "requests": [request] });
        self.send(self.client.post(url).json(&body)).await
    }

    async fn get_values(&self, range: &str, major_dimension: &str) -> Result<Vec<Vec<String>>> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut()
            .append_pair("majorDimension", major_dimension);

        let dto: ValueRangeDto = self.send(self.client.get(url)).await?;
        Ok(dto
            .values
            .iter()
            .map(|line| line.iter().map(cell_text).collect())
            .collect())
    }
}

fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("caselens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CaseLensError::Config(format!("Failed to create HTTP client: {e}")))
}

#[async_trait]
impl Spreadsheet for GoogleSheetsClient {
    async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let mut url = self.url(&[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties");

        let dto: SpreadsheetDto = self.send(self.client.get(url)).await?;
        Ok(dto
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.into())
            .collect())
    }

    async fn duplicate_sheet(&self, source: &Worksheet, index: usize) -> Result<Worksheet> {
        debug!("Duplicating sheet '{}' into position {index}", source.title);
        let reply = self
            .batch_update(json!({
                "duplicateSheet": {
                    "sourceSheetId": source.id,
                    "insertSheetIndex": index,
                }
            }))
            .await?;

        let properties = reply
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.get("duplicateSheet")?.get("properties").cloned())
            .ok_or_else(|| {
                CaseLensError::DataShape("duplicateSheet reply has no properties".to_string())
            })?;
        let properties: SheetPropertiesDto = serde_json::from_value(properties)?;
        Ok(properties.into())
    }

    async fn rename_sheet(&self, sheet: &Worksheet, title: &str) -> Result<()> {
        self.batch_update(json!({
            "updateSheetProperties": {
                "properties": { "sheetId": sheet.id, "title": title },
                "fields": "title",
            }
        }))
        .await?;
        Ok(())
    }

    async fn col_values(&self, sheet: &str, column: usize) -> Result<Vec<String>> {
        let letter = column_letter(column);
        let range = sheet_range(sheet, &format!("{letter}:{letter}"));
        let columns = self.get_values(&range, "COLUMNS").await?;
        Ok(columns.into_iter().next().unwrap_or_default())
    }

    async fn update_range(
        &self,
        sheet: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInput,
    ) -> Result<()> {
        let range = sheet_range(sheet, range);
        debug!("Update {range} ({} rows, {})", values.len(), input.as_str());

        let mut url = self.values_url(&range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        let _: Value = self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        self.get_values(&sheet_range(sheet, ""), "ROWS").await
    }
}
