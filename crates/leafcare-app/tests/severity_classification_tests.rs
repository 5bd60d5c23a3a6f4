//! Integration tests for the shared severity rule.

use leafcare_core::{Severity, classify_severity};
use leafcare_ui::PredictionPresenter;

#[test]
fn severity_classification_tests_hold_across_confidence_range() {
    for step in 0..=1000 {
        let confidence = f64::from(step) / 10.0;
        let expected = if confidence < 70.0 {
            Severity::Warning
        } else {
            Severity::Danger
        };

        assert_eq!(classify_severity("Potato Late Blight", confidence), expected);
        assert_eq!(classify_severity("Healthy Leaf", confidence), Severity::Success);
        assert_eq!(classify_severity("mostly HEALTHY", confidence), Severity::Success);
        assert_eq!(
            PredictionPresenter.present("Potato Late Blight", confidence).severity,
            expected
        );
    }
}

#[test]
fn severity_classification_tests_use_fallback_tip_for_unknown_labels() {
    let known = PredictionPresenter.present("Apple Scab", 91.0);
    let unknown = PredictionPresenter.present("Unknown Blight", 50.0);

    assert_eq!(known.tip, "🍎 Prune infected branches; ensure good air flow.");
    assert_eq!(
        unknown.tip,
        "💡 Keep monitoring and ensure proper sunlight and water balance."
    );
    assert_eq!(unknown.severity, Severity::Warning);
}
