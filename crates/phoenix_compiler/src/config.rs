//! Configuration for the grammar compiler.

use serde::{Deserialize, Serialize};

use phoenix_foundation::{Error, Result};

/// Capacities and file names used while compiling a grammar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Non-terminal records per net.
    pub max_non_term: usize,
    /// Symbol table entries (nets, non-terminals and words of one net).
    pub max_symbol: usize,
    /// Automaton states per net.
    pub max_nfa: usize,
    /// Automaton arcs per net.
    pub max_suc_link: usize,
    /// Net list file name inside the grammar directory.
    pub net_list: String,
    /// Dictionary file name inside the grammar directory.
    pub dictionary: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_non_term: 100_000,
            max_symbol: 10_000,
            max_nfa: 150_000,
            max_suc_link: 500_000,
            net_list: "nets".to_string(),
            dictionary: "base.dic".to_string(),
        }
    }
}

impl CompilerConfig {
    /// Builder method to set the non-terminal record capacity.
    #[must_use]
    pub fn with_max_non_term(mut self, limit: usize) -> Self {
        self.max_non_term = limit;
        self
    }

    /// Builder method to set the symbol table capacity.
    #[must_use]
    pub fn with_max_symbol(mut self, limit: usize) -> Self {
        self.max_symbol = limit;
        self
    }

    /// Builder method to set the state capacity.
    #[must_use]
    pub fn with_max_nfa(mut self, limit: usize) -> Self {
        self.max_nfa = limit;
        self
    }

    /// Builder method to set the arc capacity.
    #[must_use]
    pub fn with_max_suc_link(mut self, limit: usize) -> Self {
        self.max_suc_link = limit;
        self
    }

    /// Sets an option by its traditional name (`MaxNfa`, `MaxSucLink`,
    /// `MaxNonTerm`, `MaxSymbol`).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOption`](phoenix_foundation::ErrorKind::InvalidOption)
    /// for an unknown name or a non-numeric value.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let slot = match name {
            "MaxNonTerm" => &mut self.max_non_term,
            "MaxSymbol" => &mut self.max_symbol,
            "MaxNfa" => &mut self.max_nfa,
            "MaxSucLink" => &mut self.max_suc_link,
            _ => return Err(Error::invalid_option(name, value)),
        };
        *slot = value
            .parse()
            .map_err(|_| Error::invalid_option(name, value))?;
        Ok(())
    }
}
