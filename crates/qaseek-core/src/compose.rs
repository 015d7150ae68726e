//! Final result composition: one entry per external link.

use crate::corpus::DocumentTable;
use crate::error::RetrievalError;
use crate::rerank::RankedList;
use serde::Serialize;
use std::collections::HashSet;

/// A deduplicated result ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkEntry {
    /// External link of the source page
    pub link: String,
    /// Score of the first ranked result holding this link
    pub score: f32,
    /// Question text of that result
    pub label: String,
}

/// Collapses ranked results into unique links.
///
/// Walks `ranked` in order. The first result holding a link decides its
/// score and label; later results with the same link are absorbed even if
/// they carry a higher score. Output order is first-seen order.
///
/// # Errors
///
/// `RetrievalError::UnknownDocument` if a ranked id is missing from
/// `documents`.
pub fn compose(ranked: &RankedList, documents: &DocumentTable) -> Result<Vec<LinkEntry>, RetrievalError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(ranked.len());
    let mut entries = Vec::with_capacity(ranked.len());

    for result in ranked.iter() {
        let doc = documents.lookup(result.document_id)?;
        if seen.insert(doc.link.as_str()) {
            entries.push(LinkEntry {
                link: doc.link.clone(),
                score: result.score,
                label: doc.question_text.clone(),
            });
        }
    }

    Ok(entries)
}
