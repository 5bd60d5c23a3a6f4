//! Integration tests for missing responses.

mod common;

use leafcare_app::AppError;
use leafcare_upload::{CONNECTION_ERROR_MESSAGE, UploadError, UploadPhase};

#[test]
fn transport_failure_tests_reports_generic_connectivity_message() {
    let (mut session, transport, _stats) =
        common::fixture_session(common::ScriptedTransport::default().upload_failure());

    session.select_file(common::fixture_file_image());
    let error = session.submit().expect_err("submission should fail");

    assert!(matches!(
        error,
        AppError::Upload(UploadError::Network { status: None, .. })
    ));
    assert_eq!(transport.upload_calls(), 1);
    assert_eq!(
        session.ui().status.text,
        format!("❌ {CONNECTION_ERROR_MESSAGE}")
    );
    assert_eq!(session.last_outcome(), Some(UploadPhase::Failed));
    assert_eq!(session.upload_phase(), UploadPhase::Idle);
}
