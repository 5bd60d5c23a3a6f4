//! Integration tests for the history viewer.

mod common;

use leafcare_core::Severity;
use leafcare_ui::HistoryView;
use leafcare_upload::UploadPhase;
use serde_json::json;

#[test]
fn history_viewer_tests_empty_list_renders_placeholder() {
    let (mut session, transport, _stats) = common::fixture_session(
        common::ScriptedTransport::default().history_reply(200, r#"{"history":[]}"#),
    );

    let view = session.load_history().clone();

    assert_eq!(view, HistoryView::Empty);
    assert_eq!(view.placeholder(), Some("No uploads yet."));
    assert_eq!(transport.history_calls(), 1);
}

#[test]
fn history_viewer_tests_rows_are_classified_per_record() {
    let body = json!({"history": [
        {"id": 3, "filename": "c.jpg", "disease": "Healthy Leaf", "confidence": 99.0, "timestamp": "2024-05-03 08:00:00"},
        {"id": 2, "filename": "b.jpg", "disease": "Corn Rust", "confidence": 65.0, "timestamp": "2024-05-02 08:00:00"},
        {"id": 1, "filename": "a.jpg", "disease": "Apple Scab", "confidence": 95.2, "timestamp": "2024-05-01 08:00:00"}
    ]})
    .to_string();
    let (mut session, _transport, _stats) =
        common::fixture_session(common::ScriptedTransport::default().history_reply(200, &body));

    let HistoryView::Table(rows) = session.load_history().clone() else {
        panic!("expected a table");
    };

    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
    assert_eq!(rows[0].severity, Severity::Success);
    assert_eq!(rows[1].severity, Severity::Warning);
    assert_eq!(rows[2].severity, Severity::Danger);
}

#[test]
fn history_viewer_tests_failures_render_error_placeholder() {
    let (mut session, _transport, _stats) = common::fixture_session(
        common::ScriptedTransport::default()
            .history_reply(500, "internal error")
            .history_reply(200, "not json"),
    );

    assert_eq!(session.load_history(), &HistoryView::Error);
    assert_eq!(session.load_history(), &HistoryView::Error);
    assert_eq!(session.load_history(), &HistoryView::Error);
}

#[test]
fn history_viewer_tests_do_not_touch_upload_state() {
    let (mut session, transport, _stats) = common::fixture_session(
        common::ScriptedTransport::default().history_reply(200, r#"{"history":[]}"#),
    );
    session.select_file(common::fixture_file_image());

    session.load_history();

    assert_eq!(session.upload_phase(), UploadPhase::Idle);
    assert!(session.ui().upload_enabled);
    assert_eq!(transport.upload_calls(), 0);
}

#[test]
fn history_viewer_tests_loading_placeholder_shows_until_fetch_completes() {
    let body = json!({"history": [
        {"id": 1, "filename": "a.jpg", "disease": "Corn Rust", "confidence": 82.0, "timestamp": "2024-05-01 08:00:00"}
    ]})
    .to_string();
    let (mut session, transport, _stats) =
        common::fixture_session(common::ScriptedTransport::default().history_reply(200, &body));

    let loading = session.begin_history().clone();
    assert_eq!(loading, HistoryView::Loading);
    assert_eq!(loading.placeholder(), Some("⏳ Loading history..."));
    assert_eq!(session.ui().history, HistoryView::Loading);
    assert_eq!(transport.history_calls(), 0);

    let fetched = session.history_viewer().fetch();
    let HistoryView::Table(rows) = session.finish_history(fetched).clone() else {
        panic!("expected a table");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].severity, Severity::Danger);
    assert_eq!(transport.history_calls(), 1);
}

#[test]
fn history_viewer_tests_viewer_projects_without_a_session() {
    let transport = std::sync::Arc::new(
        common::ScriptedTransport::default().history_reply(503, "unavailable"),
    );
    let viewer = leafcare_app::HistoryViewer::new(
        common::fixture_config().endpoints,
        transport,
    );

    assert_eq!(viewer.load(), HistoryView::Error);
}
