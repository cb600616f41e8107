use anyhow::Result;
use test_utils::compile_feedback_fixture;
use test_utils::test_feedback_fixture;

use super::is_reload_directive;
use super::CompileFeedback;
use super::ControlMessage;
use super::FeedbackMessage;
use super::TestFeedback;
use crate::domain::models::Topic;

#[test]
fn it_decodes_plain_user_feedback() -> Result<()> {
    let msg = ControlMessage::decode(Topic::UserControlFeedback, "Assignment restarted")?;
    assert_eq!(
        msg,
        ControlMessage::Feedback {
            text: "Assignment restarted".to_string()
        }
    );
    return Ok(());
}

#[test]
fn it_decodes_broadcast_feedback() -> Result<()> {
    let msg = ControlMessage::decode(
        Topic::ControlFeedback,
        r#"{"assignment":"fizzbuzz","cause":"assignment started"}"#,
    )?;

    insta::assert_debug_snapshot!(msg, @r###"
    Feedback {
        text: "[fizzbuzz] assignment started",
    }
    "###);
    return Ok(());
}

#[test]
fn it_decodes_time_sync() -> Result<()> {
    let msg = ControlMessage::decode(Topic::Time, r#"{"remainingTime":120,"totalTime":440}"#)?;
    assert_eq!(
        msg,
        ControlMessage::TimeSync {
            remaining: 120,
            total: 440
        }
    );
    return Ok(());
}

#[test]
fn it_decodes_empty_start_and_stop() -> Result<()> {
    assert_eq!(ControlMessage::decode(Topic::Start, "")?, ControlMessage::Reload);
    assert_eq!(ControlMessage::decode(Topic::Stop, "")?, ControlMessage::Stop);
    return Ok(());
}

#[test]
fn it_fails_on_malformed_time() {
    let res = ControlMessage::decode(Topic::Time, "not json");
    assert!(res.is_err());
}

#[test]
fn it_rejects_feedback_topics_as_control() {
    let res = ControlMessage::decode(Topic::UserFeedback, "{}");
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"user-feedback is not a control topic");
}

#[test]
fn it_detects_reload_directives() {
    assert!(is_reload_directive("session changed, reload"));
    assert!(!is_reload_directive("assignment started"));
}

#[test]
fn it_decodes_test_feedback() -> Result<()> {
    let msg = FeedbackMessage::decode(Topic::UserFeedback, test_feedback_fixture())?;
    assert_eq!(
        msg,
        FeedbackMessage::Test(TestFeedback {
            test: "test1".to_string(),
            text: Some("1 test passed".to_string()),
            success: true,
            submit: false,
        })
    );
    return Ok(());
}

#[test]
fn it_decodes_compile_feedback_with_null_text() -> Result<()> {
    let msg = FeedbackMessage::decode(Topic::UserCompileFeedback, r#"{"text":null,"success":false}"#)?;
    assert_eq!(
        msg,
        FeedbackMessage::Compile(CompileFeedback {
            text: None,
            success: false,
        })
    );

    let fixture = FeedbackMessage::decode(Topic::UserCompileFeedback, compile_feedback_fixture())?;
    assert!(matches!(fixture, FeedbackMessage::Compile(CompileFeedback { success: false, .. })));
    return Ok(());
}
