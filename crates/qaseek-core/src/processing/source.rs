//! Parsing of tagged question/answer source text.
//!
//! Source files are line oriented:
//!
//! ```text
//! [query] How do I reset my password?
//! [link] https://example.com/reset
//! [passage] Open the settings page.
//! Choose "reset password".
//! ```
//!
//! A `[query] ` line opens a new document. `[link] ` sets the link of the
//! current document. Every other non-empty line belongs to the answer.

use crate::corpus::{DocumentId, DocumentRecord};

const QUERY_MARKER: &str = "[query] ";
const LINK_MARKER: &str = "[link]";
const PASSAGE_MARKER: &str = "[passage]";

#[derive(Default)]
struct OpenDocument {
    question: String,
    link: String,
    answer: Vec<String>,
}

impl OpenDocument {
    fn finish(self, id: u64) -> DocumentRecord {
        DocumentRecord {
            document_id: DocumentId::from_u64(id),
            question_text: self.question,
            answer_text: self.answer.join("\n"),
            link: self.link,
        }
    }
}

/// Parses source text into documents with ids counting up from 0.
///
/// Lines are trimmed. Answer lines are joined with `\n` after any
/// `[passage]` marker is removed. Lines before the first `[query] ` are
/// ignored.
pub fn parse_source(text: &str) -> Vec<DocumentRecord> {
    let mut documents = Vec::new();
    let mut current: Option<OpenDocument> = None;

    for line in text.lines().map(str::trim) {
        if line.starts_with(QUERY_MARKER) {
            if let Some(open) = current.take() {
                documents.push(open.finish(documents.len() as u64));
            }
            current = Some(OpenDocument {
                question: line.replace(QUERY_MARKER, ""),
                ..OpenDocument::default()
            });
        } else if line.starts_with("[link] ") {
            if let Some(open) = current.as_mut() {
                open.link = line.replace(LINK_MARKER, "").trim().to_string();
            }
        } else if !line.is_empty() {
            let passage = line.replace(PASSAGE_MARKER, "").trim().to_string();
            if let Some(open) = current.as_mut() {
                if !passage.is_empty() {
                    open.answer.push(passage);
                }
            }
        }
    }

    if let Some(open) = current {
        documents.push(open.finish(documents.len() as u64));
    }

    documents
}
