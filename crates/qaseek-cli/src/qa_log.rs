//! Append-only question log.
//!
//! One record per answered question:
//!
//! ```text
//! 2024-05-01 14:03:22
//! [Question: how do I reset my password] RAG used: True
//! Open settings and choose reset.
//!
//! ```
//!
//! Each record is written with a single `write_all` on a file opened in
//! append mode, so records from concurrent processes do not interleave.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Renders one log record.
pub fn format_record<Tz>(timestamp: &DateTime<Tz>, question: &str, answer: &str, rag: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}\n[Question: {}] RAG used: {}\n{}\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        question,
        if rag { "True" } else { "False" },
        answer
    )
}

/// Appends a record stamped with the current local time.
pub fn append_record(path: &Path, question: &str, answer: &str, rag: bool) -> Result<()> {
    let record = format_record(&Local::now(), question, answer, rag);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    file.write_all(record.as_bytes())
        .with_context(|| format!("Failed to write log file: {}", path.display()))
}

/// Logs one answered question. `answer` is the generated answer, `None`
/// when RAG was off; such records carry an empty answer line.
pub fn append_answer(path: &Path, question: &str, answer: Option<&str>) -> Result<()> {
    append_record(path, question, answer.unwrap_or(""), answer.is_some())
}
