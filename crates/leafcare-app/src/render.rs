//! Terminal projection of [`UiState`].

use colored::{ColoredString, Colorize};
use leafcare_core::Severity;
use leafcare_ui::{HistoryView, PredictionView, StatusLine};

fn paint(text: &str, tone: Option<Severity>) -> ColoredString {
    match tone {
        Some(Severity::Success) => text.green(),
        Some(Severity::Warning) => text.yellow(),
        Some(Severity::Danger) => text.red(),
        None => text.normal(),
    }
}

/// Renders the status line.
pub fn status(line: &StatusLine) -> String {
    paint(&line.text, line.tone).to_string()
}

/// Renders a diagnosis block.
pub fn prediction(view: &PredictionView) -> String {
    format!(
        "{}\n{}\n{}",
        paint(&view.disease_text, Some(view.severity)).bold(),
        view.confidence_text,
        view.tip
    )
}

/// Renders the history panel as a fixed-width table or its placeholder.
pub fn history(view: &HistoryView) -> String {
    let HistoryView::Table(rows) = view else {
        return view.placeholder().unwrap_or_default().to_string();
    };

    let mut out = format!(
        "{:<6} {:<28} {:<28} {:>11} {}",
        "ID", "Filename", "Disease", "Confidence", "Timestamp"
    )
    .bold()
    .to_string();

    for row in rows {
        let line = format!(
            "{:<6} {:<28} {:<28} {:>11} {}",
            row.id, row.filename, row.disease, row.confidence, row.timestamp
        );
        out.push('\n');
        out.push_str(&paint(&line, Some(row.severity)).to_string());
    }
    out
}
