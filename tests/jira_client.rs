//! Jira REST v2 client against a mock server.

use caselens::auth::Token;
use caselens::tickets::{IssueTracker, JiraClient, NewSubtask};
use caselens::CaseLensError;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};

fn jira(server: &ServerGuard) -> JiraClient {
    JiraClient::new(&server.url(), Token::from("jira-token")).expect("client should build")
}

fn subtask(key: &str, status: &str) -> Value {
    json!({
        "key": key,
        "fields": {"summary": format!("{key} is unstable"), "status": {"name": status}}
    })
}

#[tokio::test]
async fn test_issue_lists_subtasks_with_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/api/2/issue/OCPQE-1")
        .match_header("authorization", "Bearer jira-token")
        .match_query(Matcher::UrlEncoded(
            "fields".into(),
            "summary,status,project,subtasks".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "key": "OCPQE-1",
                "fields": {
                    "summary": "OLM CI stability",
                    "status": {"name": "In Progress"},
                    "project": {"key": "OCPQE"},
                    "subtasks": [subtask("OCPQE-2", "Closed"), subtask("OCPQE-3", "New")]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let issue = jira(&server).issue("OCPQE-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(issue.project_key, "OCPQE");
    assert_eq!(issue.status, "In Progress");
    assert_eq!(issue.subtasks.len(), 2);
    assert!(issue.subtasks[0].is_closed());
    assert!(!issue.subtasks[1].is_closed());
}

#[tokio::test]
async fn test_create_subtask_posts_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/2/issue")
        .match_body(Matcher::PartialJson(json!({
            "fields": {
                "project": {"key": "OCPQE"},
                "parent": {"key": "OCPQE-1"},
                "summary": "OCP-1001 is unstable",
                "issuetype": {"name": "Sub-task"},
                "assignee": {"name": "rhn-support-xzha"}
            }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "10001", "key": "OCPQE-9"}).to_string())
        .create_async()
        .await;

    let key = jira(&server)
        .create_subtask(&NewSubtask {
            project_key: "OCPQE".to_string(),
            parent_key: "OCPQE-1".to_string(),
            summary: "OCP-1001 is unstable".to_string(),
            description: "Hi".to_string(),
            assignee: "rhn-support-xzha".to_string(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(key, "OCPQE-9");
}

#[tokio::test]
async fn test_add_comment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/2/issue/OCPQE-2/comment")
        .match_body(Matcher::Json(json!({"body": "4.14: pass ratio is 50%"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "555"}).to_string())
        .create_async()
        .await;

    jira(&server)
        .add_comment("OCPQE-2", "4.14: pass ratio is 50%")
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_issue_is_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/2/issue/OCPQE-404")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({"errorMessages": ["No such issue"]}).to_string())
        .create_async()
        .await;

    let err = jira(&server).issue("OCPQE-404").await.unwrap_err();

    assert!(matches!(err, CaseLensError::Api(ref msg) if msg.contains("No such issue")));
}
