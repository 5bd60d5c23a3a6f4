//! Integration tests for submitting without a selection.

mod common;

use leafcare_app::AppError;
use leafcare_upload::{UploadError, UploadPhase};

#[test]
fn no_image_submit_tests_never_calls_the_service() {
    let (mut session, transport, _stats) =
        common::fixture_session(common::ScriptedTransport::default());

    let error = session.submit().expect_err("submission should be refused");

    assert!(matches!(error, AppError::Upload(UploadError::NoImageSelected)));
    assert_eq!(transport.upload_calls(), 0);
    assert_eq!(session.upload_phase(), UploadPhase::Idle);
    assert_eq!(session.last_outcome(), None);
    assert!(
        session
            .ui()
            .status
            .text
            .contains("Please select or capture an image first!")
    );
}

#[test]
fn no_image_submit_tests_applies_after_retake() {
    let (mut session, transport, _stats) =
        common::fixture_session(common::ScriptedTransport::default());

    session.start_camera().expect("camera should start");
    session.capture().expect("capture should work");
    session.retake();

    assert!(session.submit().is_err());
    assert_eq!(transport.upload_calls(), 0);
}
