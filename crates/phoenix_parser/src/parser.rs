//! The parser pipeline.
//!
//! [`PhoenixParser`] ties the stages together for one grammar: tokens become
//! a [`Script`], the [`ChartParser`] fills the chart, the [`LatticeBuilder`]
//! ranks slot sequences, and the winners are turned into [`Parse`]s.

use log::{debug, info};

use phoenix_foundation::WordId;
use phoenix_grammar::Grammar;

use crate::config::ParserConfig;
use crate::history::FrameHistory;
use crate::lattice::{Candidate, LatticeBuilder, SlotIndex};
use crate::matcher::ChartParser;
use crate::parse::{Parse, ParseOutcome, ParseTree, SlotFill, unparsed};
use crate::script::Script;
use crate::tokenizer::InputTokenizer;

/// Parses sentences against one compiled grammar.
///
/// Holds every per-sentence buffer, so one parser handles one sentence at a
/// time. Create one parser per thread to parse in parallel.
pub struct PhoenixParser<'g> {
    grammar: &'g Grammar,
    config: ParserConfig,
    slots: SlotIndex,
    chart: ChartParser<'g>,
    lattice: LatticeBuilder,
    history: FrameHistory,
}

impl<'g> PhoenixParser<'g> {
    /// Creates a parser.
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: ParserConfig) -> Self {
        let slots = SlotIndex::new(grammar);
        info!(
            "parser ready: {} slot nets{}",
            slots.active().len(),
            if slots.is_framed() { "" } else { " (no frames)" }
        );
        Self {
            grammar,
            chart: ChartParser::new(grammar, &config),
            lattice: LatticeBuilder::new(&config),
            config,
            slots,
            history: FrameHistory::new(),
        }
    }

    /// The grammar being parsed against.
    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The parser options.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The interpretation history.
    #[must_use]
    pub const fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Forgets earlier interpretations.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Tokenizes and parses a raw utterance.
    pub fn parse_text(&mut self, text: &str) -> ParseOutcome {
        self.parse_words(&InputTokenizer::tokenize(text))
    }

    /// Parses pre-tokenized words.
    pub fn parse_words<S: AsRef<str>>(&mut self, words: &[S]) -> ParseOutcome {
        let script = Script::build(words, self.grammar.dictionary(), &self.config);
        self.parse_script(&script)
    }

    /// Parses dictionary ids.
    pub fn parse_ids(&mut self, ids: &[WordId]) -> ParseOutcome {
        let script = Script::from_ids(ids, self.grammar.dictionary(), &self.config);
        self.parse_script(&script)
    }

    /// Parses a prepared script.
    pub fn parse_script(&mut self, script: &Script) -> ParseOutcome {
        let mut overflow = script.overflow();
        if let Some(limit) = self.chart.parse(script, self.slots.active()) {
            overflow.get_or_insert(limit);
        }

        let history = self.config.use_history.then_some(&self.history);
        let lattice = self.lattice.build(self.grammar, &self.slots, self.chart.chart(), history);
        if let Some(limit) = lattice.overflow {
            overflow.get_or_insert(limit);
        }

        let parses: Vec<Parse> = lattice.candidates.iter().filter_map(|c| self.to_parse(script, c)).collect();
        debug!("{} parses for {} tokens", parses.len(), script.tokens().len());

        if let Some(best) = lattice.candidates.first() {
            let mut frames: Vec<_> = best.slots.iter().filter_map(|s| s.frame).collect();
            frames.dedup();
            for frame in frames {
                self.history.push(frame);
            }
        }

        ParseOutcome {
            tokens: script.tokens().to_vec(),
            oov: script.oov().iter().filter_map(|&i| script.tokens().get(i).cloned()).collect(),
            parses,
            overflow,
        }
    }

    fn to_parse(&self, script: &Script, candidate: &Candidate) -> Option<Parse> {
        let chart = self.chart.chart();
        let slots = candidate
            .slots
            .iter()
            .map(|choice| {
                let tree = ParseTree::from_edge(self.grammar, chart, script, choice.edge)?;
                let frame = choice
                    .frame
                    .and_then(|f| self.grammar.frame(f))
                    .map(|f| f.name.clone());
                Some(SlotFill { frame, tree })
            })
            .collect::<Option<Vec<_>>>()?;
        let edges: Vec<_> = candidate.slots.iter().map(|s| s.edge).collect();
        Some(Parse {
            slots,
            score: candidate.score,
            frames: candidate.frames,
            unparsed: unparsed(chart, script, &edges),
        })
    }
}
