//! Google Sheets REST client and service-account token exchange against
//! a mock server.

use std::path::Path;

use caselens::auth::Token;
use caselens::sheets::{
    fetch_access_token, GoogleSheetsClient, ServiceAccountKey, Spreadsheet, ValueInput, Worksheet,
};
use caselens::CaseLensError;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const SPREADSHEET_ID: &str = "sheet123";

fn sheets_client(server: &ServerGuard) -> GoogleSheetsClient {
    GoogleSheetsClient::new(
        &format!("{}/v4/spreadsheets/", server.url()),
        SPREADSHEET_ID,
        Token::from("access-token"),
    )
    .expect("client should build")
}

fn service_account(server: &ServerGuard) -> ServiceAccountKey {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json");
    let mut key = ServiceAccountKey::from_file(&path).unwrap();
    key.token_uri = format!("{}/token", server.url());
    key
}

#[tokio::test]
async fn test_worksheets_are_listed_with_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/spreadsheets/sheet123")
        .match_header("authorization", "Bearer access-token")
        .match_query(Matcher::UrlEncoded(
            "fields".into(),
            "sheets.properties".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"sheets": [
                {"properties": {"sheetId": 0, "title": "summary", "index": 0}},
                {"properties": {"sheetId": 42, "title": "template", "index": 1}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let sheets = sheets_client(&server).worksheets().await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        sheets[1],
        Worksheet {
            id: 42,
            title: "template".to_string(),
            index: 1,
        }
    );
}

#[tokio::test]
async fn test_duplicate_sheet_returns_copy_properties() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/spreadsheets/sheet123:batchUpdate")
        .match_body(Matcher::PartialJson(json!({"requests": [
            {"duplicateSheet": {"sourceSheetId": 42, "insertSheetIndex": 1}}
        ]})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"spreadsheetId": SPREADSHEET_ID, "replies": [
                {"duplicateSheet": {"properties": {"sheetId": 77, "title": "Copy", "index": 1}}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let template = Worksheet {
        id: 42,
        title: "template".to_string(),
        index: 2,
    };
    let copy = sheets_client(&server)
        .duplicate_sheet(&template, 1)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(copy.id, 77);
    assert_eq!(copy.index, 1);
}

#[tokio::test]
async fn test_update_range_sends_rows_with_input_option() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "PUT",
            "/v4/spreadsheets/sheet123/values/'4.14-20261019'!A33:H33",
        )
        .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
        .match_body(Matcher::PartialJson(json!({
            "range": "'4.14-20261019'!A33:H33",
            "majorDimension": "ROWS",
            "values": [["OCP-1001", 1]]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"updatedCells": 2}).to_string())
        .create_async()
        .await;

    sheets_client(&server)
        .update_range(
            "4.14-20261019",
            "A33:H33",
            vec![vec![json!("OCP-1001"), json!(1)]],
            ValueInput::Raw,
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_col_values_reads_first_column() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v4/spreadsheets/sheet123/values/'template'!A:A")
        .match_query(Matcher::UrlEncoded(
            "majorDimension".into(),
            "COLUMNS".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"values": [["", "OLM", "Total"]]}).to_string())
        .create_async()
        .await;

    let column = sheets_client(&server)
        .col_values("template", 1)
        .await
        .unwrap();

    assert_eq!(column, vec!["", "OLM", "Total"]);
}

#[tokio::test]
async fn test_empty_range_reads_as_no_values() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v4/spreadsheets/sheet123/values/'blank'")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"range": "'blank'!A1:Z1000"}).to_string())
        .create_async()
        .await;

    let values = sheets_client(&server).all_values("blank").await.unwrap();

    assert!(values.is_empty());
}

#[tokio::test]
async fn test_error_status_is_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v4/spreadsheets/sheet123")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(json!({"error": {"message": "denied"}}).to_string())
        .create_async()
        .await;

    let err = sheets_client(&server).worksheets().await.unwrap_err();

    assert!(matches!(err, CaseLensError::Api(ref msg) if msg.contains("403")));
}

#[tokio::test]
async fn test_service_account_token_exchange() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": "ya29.test"}).to_string())
        .create_async()
        .await;

    let key = service_account(&server);

    let token = fetch_access_token(&reqwest::Client::new(), &key)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(token.as_str(), "ya29.test");
}

#[tokio::test]
async fn test_rejected_token_exchange_is_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(json!({"error": "invalid_grant"}).to_string())
        .create_async()
        .await;

    let key = service_account(&server);

    let err = fetch_access_token(&reqwest::Client::new(), &key)
        .await
        .unwrap_err();

    assert!(matches!(err, CaseLensError::Api(_)));
}
