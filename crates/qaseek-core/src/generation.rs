//! Prompt assembly for answer synthesis.
//!
//! The generation model itself is an [`AnswerGenerator`](crate::backend::AnswerGenerator)
//! supplied by the caller. This module only builds the prompt from the ranked
//! sources and cleans up the completion.

use crate::corpus::DocumentTable;
use crate::error::RetrievalError;
use crate::rerank::RankedList;

/// Renders every ranked document as a numbered source block.
///
/// Each block is `"Source {i}: {question}\n{answer}\n"` with `i` counting
/// from 0 in ranked order. Blocks are joined with a newline.
pub fn build_sources(ranked: &RankedList, documents: &DocumentTable) -> Result<String, RetrievalError> {
    let blocks = ranked
        .iter()
        .enumerate()
        .map(|(index, result)| {
            documents.lookup(result.document_id).map(|doc| {
                format!(
                    "Source {}: {}\n{}\n",
                    index, doc.question_text, doc.answer_text
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(blocks.join("\n"))
}

/// Fills the generation template.
pub fn build_prompt(instruction: &str, question: &str, sources: &str) -> String {
    format!(
        "{}\n\nQuestion: {}\n\nSource:\n{}\n\nAnswer:\n",
        instruction, question, sources
    )
}

/// Trims a completion and drops any unfinished trailing sentence.
///
/// Everything after the last `.` is removed. Text without a period is only
/// trimmed.
pub fn trim_to_last_sentence(completion: &str) -> String {
    let trimmed = completion.trim();
    match trimmed.rfind('.') {
        Some(position) => trimmed[..=position].to_string(),
        None => trimmed.to_string(),
    }
}
