//! Query text normalization.

/// Normalizes a question before it is embedded.
///
/// Lowercases, drops ASCII punctuation, collapses whitespace runs to a
/// single space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
