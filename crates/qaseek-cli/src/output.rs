//! Output formatting for answers.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use crate::ask::AskReport;
use qaseek_core::compose::LinkEntry;
use qaseek_core::rerank::ScoreKind;
use serde::Serialize;

/// JSON output structure for one answered question
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub question: &'a str,
    pub rag: bool,
    pub answer: Option<&'a str>,
    /// `cosine` or `relevance`, depending on the rerank strategy
    pub score_kind: ScoreKind,
    pub links: &'a [LinkEntry],
}

/// Formats an answer as JSON.
pub fn format_json(report: &AskReport) -> String {
    let output = JsonOutput {
        question: &report.outcome.question,
        rag: report.rag,
        answer: report.answer.as_deref(),
        score_kind: report.outcome.ranked.kind(),
        links: &report.outcome.links,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an answer for human-readable terminal output.
pub fn format_human(report: &AskReport) -> String {
    let links = &report.outcome.links;
    let mut output = String::new();

    if let Some(answer) = &report.answer {
        output.push_str(&format!("AI: {}\n\n", answer));
    }

    if links.is_empty() {
        output.push_str(&format!(
            "No results found for \"{}\"",
            report.outcome.question
        ));
        return output;
    }

    output.push_str(if report.answer.is_some() {
        "Sources:\n"
    } else {
        "Related questions:\n"
    });

    for entry in links {
        let score = if report.show_scores {
            format!("{} ", entry.score)
        } else {
            String::new()
        };
        output.push_str(&format!("  {}{}\n    {}\n", score, entry.label, entry.link));
    }

    output.trim_end().to_string()
}
