//! Parser options.
//!
//! Options keep their traditional names (`MAX_PARSES`, `EdgeBufSize`, ...)
//! for options files and the command line:
//!
//! ```text
//! # parser.cfg
//! -MAX_PARSES   5
//! EdgeBufSize   4000
//! IGNORE_OOV    0
//! ```

use std::fs;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use phoenix_foundation::{Error, Result};

/// Limits and switches for one parser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Log verbosity, 0 (errors only) to 4 (trace).
    pub verbose: u8,
    /// Parses kept per sentence.
    pub max_parses: usize,
    /// Prefer frames used in recent interpretations.
    pub use_history: bool,
    /// Drop words missing from the dictionary before matching.
    pub ignore_oov: bool,
    /// Emit every equally good parse instead of only the best.
    pub all_parses: bool,
    /// Skip nets and transitions the next word cannot take.
    pub bigram_prune: bool,
    /// Provisional paths kept per net match; 0 means unbounded.
    pub max_paths: usize,
    /// Edges per sentence.
    pub edge_buf_size: usize,
    /// Chart links per sentence.
    pub chart_buf_size: usize,
    /// Edge child pointers per sentence.
    pub pe_buf_size: usize,
    /// Words per sentence, including start and end symbols.
    pub input_buf_size: usize,
    /// Bytes of rendered parse text.
    pub string_buf_size: usize,
    /// Slots in one sequence.
    pub slot_seq_len: usize,
    /// Frame-labelling steps per sentence.
    pub frame_buf_size: usize,
    /// Bytes of word and net-name text in the loaded grammar.
    pub sym_buf_size: usize,
    /// Slot fills across the parses of one sentence.
    pub parse_buf_size: usize,
    /// Sequence nodes per sentence.
    pub seq_buf_size: usize,
    /// Priority histogram cells per sentence.
    pub pri_buf_size: usize,
    /// Frame fragmentation cells per sentence.
    pub fid_buf_size: usize,
    /// Symbol placed before the first word.
    pub start_sym: String,
    /// Symbol placed after the last word.
    pub end_sym: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            verbose: 1,
            max_parses: 10,
            use_history: false,
            ignore_oov: true,
            all_parses: true,
            bigram_prune: false,
            max_paths: 0,
            edge_buf_size: 1000,
            chart_buf_size: 40_000,
            pe_buf_size: 2000,
            input_buf_size: 1000,
            string_buf_size: 50_000,
            slot_seq_len: 200,
            frame_buf_size: 500,
            sym_buf_size: 100_000,
            parse_buf_size: 200,
            seq_buf_size: 500,
            pri_buf_size: 2000,
            fid_buf_size: 1000,
            start_sym: "<s>".to_string(),
            end_sym: "</s>".to_string(),
        }
    }
}

impl ParserConfig {
    /// Builder method to set the edge capacity.
    #[must_use]
    pub fn with_edge_buf_size(mut self, size: usize) -> Self {
        self.edge_buf_size = size;
        self
    }

    /// Builder method to set the number of parses kept.
    #[must_use]
    pub fn with_max_parses(mut self, max: usize) -> Self {
        self.max_parses = max;
        self
    }

    /// Builder method to set the OOV policy.
    #[must_use]
    pub fn with_ignore_oov(mut self, ignore: bool) -> Self {
        self.ignore_oov = ignore;
        self
    }

    /// Builder method to enable bigram pruning.
    #[must_use]
    pub fn with_bigram_prune(mut self, prune: bool) -> Self {
        self.bigram_prune = prune;
        self
    }

    /// Builder method to enable the interpretation history.
    #[must_use]
    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    /// Builder method to bound provisional paths.
    #[must_use]
    pub fn with_max_paths(mut self, max: usize) -> Self {
        self.max_paths = max;
        self
    }

    /// Sets an option by its traditional name. A leading `-` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOption`](phoenix_foundation::ErrorKind::InvalidOption)
    /// for an unknown name or a value of the wrong type.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let name = name.trim_start_matches('-');
        let invalid = || Error::invalid_option(name, value);
        let number = |slot: &mut usize| -> Result<()> {
            *slot = value.parse().map_err(|_| invalid())?;
            Ok(())
        };
        let flag = |slot: &mut bool| -> Result<()> {
            *slot = match value {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid()),
            };
            Ok(())
        };

        match name {
            "verbose" => self.verbose = value.parse().map_err(|_| invalid())?,
            "MAX_PARSES" => number(&mut self.max_parses)?,
            "USE_HISTORY" => flag(&mut self.use_history)?,
            "IGNORE_OOV" => flag(&mut self.ignore_oov)?,
            "ALL_PARSES" => flag(&mut self.all_parses)?,
            "BIGRAM_PRUNE" => flag(&mut self.bigram_prune)?,
            "MAX_PATHS" => number(&mut self.max_paths)?,
            "EdgeBufSize" => number(&mut self.edge_buf_size)?,
            "ChartBufSize" => number(&mut self.chart_buf_size)?,
            "PeBufSize" => number(&mut self.pe_buf_size)?,
            "InputBufSize" => number(&mut self.input_buf_size)?,
            "StringBufSize" => number(&mut self.string_buf_size)?,
            "SlotSeqLen" => number(&mut self.slot_seq_len)?,
            "FrameBufSize" => number(&mut self.frame_buf_size)?,
            "SymBufSize" => number(&mut self.sym_buf_size)?,
            "ParseBufSize" => number(&mut self.parse_buf_size)?,
            "SeqBufSize" => number(&mut self.seq_buf_size)?,
            "PriBufSize" => number(&mut self.pri_buf_size)?,
            "FidBufSize" => number(&mut self.fid_buf_size)?,
            "start_sym" => self.start_sym = value.to_string(),
            "end_sym" => self.end_sym = value.to_string(),
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Applies `Name value` lines. `#` starts a comment.
    ///
    /// # Errors
    ///
    /// Returns a format error for a line without a value, or an invalid
    /// option error naming the offending option.
    pub fn apply_options(&mut self, text: &str, source: &str) -> Result<()> {
        for (n, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
                return Err(Error::format(source, n + 1, format!("option without a value: {line}")));
            };
            self.set_option(name, value)?;
        }
        Ok(())
    }

    /// Applies an options file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds an invalid option.
    pub fn load_options(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.apply_options(&text, &path.display().to_string())
    }

    /// The log level `verbose` stands for.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_traditional_values() {
        let config = ParserConfig::default();
        assert_eq!(config.max_parses, 10);
        assert!(config.ignore_oov);
        assert!(config.all_parses);
        assert!(!config.bigram_prune);
        assert_eq!(config.edge_buf_size, 1000);
        assert_eq!(config.chart_buf_size, 40_000);
        assert_eq!(config.slot_seq_len, 200);
        assert_eq!(config.start_sym, "<s>");
        assert_eq!(config.end_sym, "</s>");
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn options_by_name() {
        let mut config = ParserConfig::default();
        config.set_option("-MAX_PARSES", "3").unwrap();
        config.set_option("IGNORE_OOV", "0").unwrap();
        config.set_option("end_sym", "<end>").unwrap();
        assert_eq!(config.max_parses, 3);
        assert!(!config.ignore_oov);
        assert_eq!(config.end_sym, "<end>");

        assert!(config.set_option("IGNORE_OOV", "maybe").is_err());
        assert!(config.set_option("EdgeBufSize", "-1").is_err());
        assert!(config.set_option("MaxNfa", "1").is_err());
    }

    #[test]
    fn options_text() {
        let mut config = ParserConfig::default();
        config
            .apply_options("# limits\n-EdgeBufSize 5   # tiny\n\nBIGRAM_PRUNE 1\n", "opts")
            .unwrap();
        assert_eq!(config.edge_buf_size, 5);
        assert!(config.bigram_prune);

        let err = config.apply_options("MAX_PATHS\n", "opts").unwrap_err();
        assert!(err.to_string().contains("opts:1"));
    }

    #[test]
    fn options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.cfg");
        fs::write(&path, "verbose 3\nSlotSeqLen 7\n").unwrap();

        let mut config = ParserConfig::default();
        config.load_options(&path).unwrap();
        assert_eq!(config.slot_seq_len, 7);
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn serde_fills_missing_fields() {
        let config: ParserConfig = serde_json::from_str(r#"{"max_parses": 2}"#).unwrap();
        assert_eq!(config.max_parses, 2);
        assert_eq!(config.edge_buf_size, 1000);
    }
}
