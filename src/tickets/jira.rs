use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Issue, IssueTracker, NewSubtask, SubIssue};
use crate::auth::Token;
use crate::error::{CaseLensError, Result};
use crate::url_utils::issue_browse_url;

const ISSUE_FIELDS: &str = "summary,status,project,subtasks";
const SUBTASK_TYPE: &str = "Sub-task";

#[derive(Debug, Deserialize)]
struct IssueDto {
    key: String,
    fields: IssueFieldsDto,
}

#[derive(Debug, Deserialize)]
struct IssueFieldsDto {
    #[serde(default)]
    summary: String,
    status: Option<NamedDto>,
    project: Option<ProjectDto>,
    #[serde(default)]
    subtasks: Vec<SubtaskDto>,
}

#[derive(Debug, Deserialize)]
struct SubtaskDto {
    key: String,
    fields: SubtaskFieldsDto,
}

#[derive(Debug, Deserialize)]
struct SubtaskFieldsDto {
    #[serde(default)]
    summary: String,
    status: Option<NamedDto>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    key: String,
}

#[derive(Debug, Deserialize)]
struct CreatedDto {
    key: String,
}

fn status_name(status: Option<NamedDto>) -> String {
    status.map(|s| s.name).unwrap_or_default()
}

/// Jira REST v2 client using a personal access token.
pub struct JiraClient {
    client: Client,
    base_url: Url,
    api_url: Url,
    token: Token,
}

impl JiraClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("caselens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CaseLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| CaseLensError::Config(format!("Invalid Jira URL: {e}")))?;
        let mut api_url = base_url.clone();
        api_url
            .path_segments_mut()
            .map_err(|()| CaseLensError::Config(format!("Invalid Jira URL: {base_url}")))?
            .pop_if_empty()
            .extend(["rest", "api", "2", ""]);

        Ok(Self {
            client,
            base_url,
            api_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| CaseLensError::Config(format!("Invalid Jira endpoint {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(self.token.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaseLensError::Api(format!(
                "Jira request failed: {status} - {body}"
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn issue(&self, key: &str) -> Result<Issue> {
        let mut url = self.endpoint(&format!("issue/{key}"))?;
        url.query_pairs_mut().append_pair("fields", ISSUE_FIELDS);
        debug!("GET {url}");

        let dto: IssueDto = self.send(self.client.get(url)).await?;
        let fields = dto.fields;
        Ok(Issue {
            key: dto.key,
            project_key: fields.project.map(|p| p.key).unwrap_or_default(),
            summary: fields.summary,
            status: status_name(fields.status),
            subtasks: fields
                .subtasks
                .into_iter()
                .map(|sub| SubIssue {
                    key: sub.key,
                    summary: sub.fields.summary,
                    status: status_name(sub.fields.status),
                })
                .collect(),
        })
    }

    async fn create_subtask(&self, subtask: &NewSubtask) -> Result<String> {
        let url = self.endpoint("issue")?;
        let body = json!({
            "fields": {
                "project": { "key": subtask.project_key },
                "parent": { "key": subtask.parent_key },
                "summary": subtask.summary,
                "description": subtask.description,
                "issuetype": { "name": SUBTASK_TYPE },
                "assignee": { "name": subtask.assignee },
            }
        });

        let created: CreatedDto = self.send(self.client.post(url).json(&body)).await?;
        Ok(created.key)
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<()> {
        let url = self.endpoint(&format!("issue/{key}/comment"))?;
        let _: Value = self
            .send(self.client.post(url).json(&json!({ "body": body })))
            .await?;
        Ok(())
    }

    fn browse_url(&self, key: &str) -> String {
        issue_browse_url(self.base_url.as_str(), key)
    }
}
