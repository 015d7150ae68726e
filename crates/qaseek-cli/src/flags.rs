//! Inline question flags.
//!
//! Questions may carry option tokens anywhere among their words:
//!
//! | token | effect |
//! |-------|--------|
//! | `-s`  | show scores |
//! | `-ce` | rerank with the cross-encoder |
//! | `-1`, `-2`, `-3` | keep that many final results |
//!
//! Flag tokens are removed; the remaining words are rejoined with single
//! spaces. When a flag repeats, the last occurrence wins.

use qaseek_core::query::QueryOptions;
use qaseek_core::rerank::RerankStrategy;

/// Splits flag tokens out of a raw question.
pub fn parse_question_flags(raw_question: &str) -> (String, QueryOptions) {
    let mut options = QueryOptions::default();
    let mut words = Vec::new();

    for word in raw_question.split_whitespace() {
        match word {
            "-s" => options.show_scores = true,
            "-ce" => options.strategy = RerankStrategy::CrossEncoder,
            "-1" => options.final_top_k = 1,
            "-2" => options.final_top_k = 2,
            "-3" => options.final_top_k = 3,
            _ => words.push(word),
        }
    }

    (words.join(" "), options)
}
