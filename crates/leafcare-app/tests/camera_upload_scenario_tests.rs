//! Integration tests for a camera-sourced diagnosis.

mod common;

use leafcare_capture::CameraSession;
use leafcare_core::{ImageSource, Severity};
use leafcare_upload::UploadPhase;
use serde_json::json;

#[test]
fn camera_upload_scenario_tests_releases_camera_after_healthy_result() {
    let body = json!({"message": "ok", "disease": "Healthy Leaf", "confidence": 95}).to_string();
    let (mut session, transport, stats) =
        common::fixture_session(common::ScriptedTransport::default().upload_reply(200, &body));

    session.start_camera().expect("camera should start");
    session.capture().expect("capture should work");
    assert!(matches!(session.camera_session(), CameraSession::Active(_)));
    assert!(session.ui().preview_visible);

    let diagnosis = session.submit().expect("submission should succeed");

    assert!(diagnosis.camera_stopped);
    assert_eq!(session.last_outcome(), Some(UploadPhase::Succeeded));
    assert_eq!(session.camera_session(), CameraSession::Inactive);
    assert_eq!(stats.closes(), 1);
    assert!(!session.ui().camera_visible);
    assert!(!session.ui().preview_visible);
    assert!(!session.ui().retake_visible);

    let prediction = session.ui().prediction.as_ref().expect("prediction shown");
    assert_eq!(prediction.severity, Severity::Success);
    assert_eq!(
        transport.uploaded(),
        vec![("captured.jpg".to_string(), ImageSource::Camera)]
    );
}

#[test]
fn camera_upload_scenario_tests_keeps_camera_on_failed_upload() {
    let (mut session, _transport, stats) = common::fixture_session(
        common::ScriptedTransport::default().upload_reply(200, r#"{"error":"bad image"}"#),
    );

    session.start_camera().expect("camera should start");
    session.capture().expect("capture should work");
    session.submit().expect_err("submission should fail");

    assert!(matches!(session.camera_session(), CameraSession::Active(_)));
    assert_eq!(stats.closes(), 0);
    assert!(session.ui().camera_visible);
}
