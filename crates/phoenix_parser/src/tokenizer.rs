//! Input tokenization.
//!
//! Converts a raw utterance into upper-cased words. Richer tokenizers can
//! replace this one by handing their own word list to the parser.

/// Splits utterances into dictionary-shaped words.
pub struct InputTokenizer;

impl InputTokenizer {
    /// Tokenizes a raw input string.
    ///
    /// - Splits on whitespace
    /// - Strips punctuation around words (`"boston,"` → `BOSTON`)
    /// - Upper-cases words
    ///
    /// Punctuation inside a word is kept, so `o'clock` and `9:30` survive.
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<String> {
        input
            .split_whitespace()
            .map(|word| word.trim_matches(is_edge_punctuation))
            .filter(|word| !word.is_empty())
            .map(str::to_uppercase)
            .collect()
    }
}

fn is_edge_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '"' | '(' | ')')
}
