use anyhow::Result;
use mockito::Matcher;

use super::AssignmentOperation;
use super::ControlApi;
use crate::domain::models::NoticeKind;
use crate::domain::models::SyncError;

impl ControlApi {
    fn with_url(url: String) -> ControlApi {
        return ControlApi {
            url,
            cookie: "JSESSIONID=abc123".to_string(),
        };
    }
}

#[tokio::test]
async fn it_creates_a_competition() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/competition")
        .match_header("cookie", "JSESSIONID=abc123")
        .match_body(Matcher::JsonString(
            r#"{"name":"Friday","assignments":["fizzbuzz","sudoku"]}"#.to_string(),
        ))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = ControlApi::with_url(server.url());
    let res = api
        .create_competition("Friday", &["fizzbuzz".to_string(), "sudoku".to_string()])
        .await?;

    assert_eq!(res.kind, NoticeKind::Success);
    assert_eq!(res.text, "Created competition Friday.");
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_starts_a_session() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/competition/c-42/session")
        .with_status(201)
        .create_async()
        .await;

    let api = ControlApi::with_url(format!("{}/", server.url()));
    let res = api.start_session("c-42", "Friday").await?;

    assert_eq!(
        res.text,
        "Started competition session for competition Friday."
    );
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_changes_an_assignment() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/session/s-1/assignment/a-2/reset")
        .with_status(200)
        .create_async()
        .await;

    let api = ControlApi::with_url(server.url());
    let res = api
        .change_assignment("s-1", "a-2", "fizzbuzz", AssignmentOperation::Reset)
        .await?;

    assert_eq!(res.text, "Reset assignment 'fizzbuzz'.");
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_reports_rejections() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/session/s-1/assignment/a-2/start")
        .with_status(409)
        .create_async()
        .await;

    let api = ControlApi::with_url(server.url());
    let err = api
        .change_assignment("s-1", "a-2", "fizzbuzz", AssignmentOperation::Start)
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<SyncError>(),
        Some(&SyncError::ServerRejected {
            action: "start assignment 'fizzbuzz'".to_string()
        })
    );
    assert_eq!(err.to_string(), "Unable to start assignment 'fizzbuzz'.");
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_reports_unreachable_servers() {
    let api = ControlApi::with_url("http://127.0.0.1:1".to_string());
    let res = api.start_session("c-1", "Friday").await;
    assert_eq!(
        res.unwrap_err().to_string(),
        "Unable to start competition session for competition Friday."
    );
}

#[test]
fn it_words_confirmations() {
    assert_eq!(
        AssignmentOperation::Stop.prompt("sudoku").message,
        "Stop assignment 'sudoku' and finalize scores for teams?"
    );
}
