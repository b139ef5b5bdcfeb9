//! The word sequence a sentence is matched against.
//!
//! Position 0 holds the start symbol and the last position the end symbol,
//! so grammars can anchor rules to sentence boundaries.

use log::warn;

use phoenix_foundation::{ArenaLimit, Capacity, WordDictionary, WordId};

use crate::config::ParserConfig;

/// One position of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptWord {
    /// Upper-cased surface text.
    pub text: String,
    /// Dictionary id, `None` when the word is unknown.
    pub word: Option<WordId>,
    /// Index of the input token this position came from; `None` for the
    /// boundary symbols.
    pub source: Option<usize>,
}

/// A sentence prepared for matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    words: Vec<ScriptWord>,
    tokens: Vec<String>,
    oov: Vec<usize>,
    overflow: Option<ArenaLimit>,
}

impl Script {
    /// Builds a script from words. Unknown words are dropped when
    /// `ignore_oov` is set and kept as unmatchable positions otherwise.
    pub fn build<S: AsRef<str>>(tokens: &[S], dictionary: &WordDictionary, config: &ParserConfig) -> Self {
        let tokens: Vec<String> = tokens
            .iter()
            .map(|t| WordDictionary::normalize(t.as_ref()))
            .collect();
        let entries = tokens
            .iter()
            .enumerate()
            .map(|(i, text)| (i, text.clone(), dictionary.lookup(text)))
            .collect();
        Self::assemble(tokens, entries, dictionary, config)
    }

    /// Builds a script from dictionary ids.
    pub fn from_ids(ids: &[WordId], dictionary: &WordDictionary, config: &ParserConfig) -> Self {
        let mut tokens = Vec::with_capacity(ids.len());
        let mut entries = Vec::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            let (text, word) = match dictionary.word(id) {
                Some(text) => (text.to_string(), Some(id)),
                None => (format!("#{}", id.index()), None),
            };
            tokens.push(text.clone());
            entries.push((i, text, word));
        }
        Self::assemble(tokens, entries, dictionary, config)
    }

    fn assemble(
        tokens: Vec<String>,
        entries: Vec<(usize, String, Option<WordId>)>,
        dictionary: &WordDictionary,
        config: &ParserConfig,
    ) -> Self {
        let mut script = Self {
            tokens,
            ..Self::default()
        };
        script.push_symbol(&config.start_sym, dictionary);

        let room = config.input_buf_size.saturating_sub(2);
        for (source, text, word) in entries {
            if word.is_none() {
                script.oov.push(source);
                if config.ignore_oov {
                    continue;
                }
            }
            if script.words.len() > room {
                script.overflow = Some(ArenaLimit {
                    capacity: Capacity::InputBuf,
                    limit: config.input_buf_size,
                });
                warn!("input truncated at {} words: {}", room, Capacity::InputBuf);
                break;
            }
            script.words.push(ScriptWord {
                text,
                word,
                source: Some(source),
            });
        }

        script.push_symbol(&config.end_sym, dictionary);
        script
    }

    fn push_symbol(&mut self, symbol: &str, dictionary: &WordDictionary) {
        self.words.push(ScriptWord {
            text: WordDictionary::normalize(symbol),
            word: dictionary.lookup(symbol),
            source: None,
        });
    }

    /// Number of positions, boundary symbols included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the script holds no input words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.len() <= 2
    }

    /// The position at `pos`.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&ScriptWord> {
        self.words.get(pos)
    }

    /// The dictionary id at `pos`.
    #[must_use]
    pub fn word(&self, pos: usize) -> Option<WordId> {
        self.words.get(pos).and_then(|w| w.word)
    }

    /// All positions.
    #[must_use]
    pub fn words(&self) -> &[ScriptWord] {
        &self.words
    }

    /// Index of the first input token at or after position `pos`.
    #[must_use]
    pub fn token_start(&self, pos: usize) -> usize {
        self.words
            .get(pos..)
            .unwrap_or_default()
            .iter()
            .find_map(|w| w.source)
            .unwrap_or(self.tokens.len())
    }

    /// One past the last input token before position `end`.
    #[must_use]
    pub fn token_end(&self, end: usize) -> usize {
        self.words
            .get(..end)
            .unwrap_or(&self.words)
            .iter()
            .rev()
            .find_map(|w| w.source)
            .map_or(0, |s| s + 1)
    }

    /// The input tokens, upper-cased, before any were dropped.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Input token indices of words missing from the dictionary.
    #[must_use]
    pub fn oov(&self) -> &[usize] {
        &self.oov
    }

    /// Set when the input did not fit in `InputBufSize`.
    #[must_use]
    pub const fn overflow(&self) -> Option<ArenaLimit> {
        self.overflow
    }
}
