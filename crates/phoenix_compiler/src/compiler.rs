//! The grammar compiler's line driver.
//!
//! Each line of grammar source is classified and routed according to the
//! current definition state. Header and macro rules are only collected while
//! a net is open; the `;` that closes the net resolves them in one pass, so a
//! bare upper-case token can be told apart from a word by looking at the
//! macros the net defines.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;

use phoenix_foundation::{
    ArenaId, Error, ErrorContext, Result, SymbolId, SymbolTable, WordDictionary,
};
use phoenix_grammar::{Net, NetId, mark_concept_leaves, write_nets};

use crate::builder::{NetBuilder, ResolvedToken};
use crate::config::CompilerConfig;
use crate::nfa::{Label, Nfa, NfaArc, NonTermId};
use crate::rule::{RuleToken, parse_rule};

/// How serious a diagnostic is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The grammar compiled, possibly missing a rule.
    Warning,
    /// A line was rejected.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A problem found in the grammar source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// File the line came from.
    pub source: String,
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
    /// The offending text, if any.
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}: {}", self.source, self.line, self.severity, self.message)
    }
}

/// Size of one compiled net.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetSummary {
    /// Bracketed net name.
    pub name: String,
    /// Net number.
    pub id: u32,
    /// State count.
    pub states: usize,
    /// Arc count.
    pub arcs: usize,
}

/// Everything the compiler has to say about a grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    /// Compiled nets in definition order.
    pub nets: Vec<NetSummary>,
    /// Warnings and errors in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileReport {
    /// Warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Errors only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Returns true if any line was rejected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// A compiled grammar ready to be written out.
#[derive(Clone, Debug)]
pub struct Compilation {
    /// Number of nets in the net list.
    pub declared: usize,
    /// Compiled nets in definition order, concept leaves marked.
    pub nets: Vec<Net>,
    /// Diagnostics and sizes.
    pub report: CompileReport,
}

impl Compilation {
    /// Renders the net file.
    #[must_use]
    pub fn render(&self) -> String {
        write_nets(self.declared, &self.nets)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DefinitionState {
    None,
    Header,
    Macro,
    Skipping,
}

#[derive(Debug)]
struct PendingRule {
    owner: String,
    tokens: Vec<RuleToken>,
    source: String,
    line: usize,
}

/// One open net, between its header and its `;`.
#[derive(Debug)]
struct Definition {
    net: NetId,
    name: String,
    feature: Option<String>,
    /// Symbol that rule lines are currently routed to.
    owner: String,
    macros: Vec<String>,
    rules: Vec<PendingRule>,
    source: String,
    line: usize,
}

enum TokenClass {
    Net,
    NonTerminal,
    Word,
}

/// Compiles grammar source into nets.
///
/// ```
/// use phoenix_compiler::{CompilerConfig, GrammarCompiler};
/// use phoenix_foundation::WordDictionary;
///
/// let mut compiler = GrammarCompiler::new(CompilerConfig::default(), WordDictionary::new());
/// compiler.register_nets(&["[Greeting]"]).unwrap();
/// compiler.compile_source("[Greeting]\n\t(HELLO *THERE)\n;\n", "greet.gra").unwrap();
/// let (compilation, dictionary) = compiler.finish().unwrap();
///
/// assert_eq!(compilation.nets.len(), 1);
/// assert!(dictionary.lookup("there").is_some());
/// ```
pub struct GrammarCompiler {
    config: CompilerConfig,
    symbols: SymbolTable,
    dictionary: WordDictionary,
    nfa: Nfa,
    nets: Vec<Net>,
    defined: HashSet<NetId>,
    report: CompileReport,
    state: DefinitionState,
    current: Option<Definition>,
    /// Files being compiled, outermost first.
    includes: Vec<PathBuf>,
    base_dir: PathBuf,
}

impl GrammarCompiler {
    /// Creates a compiler that adds new words to `dictionary`.
    #[must_use]
    pub fn new(config: CompilerConfig, dictionary: WordDictionary) -> Self {
        Self {
            symbols: SymbolTable::new(config.max_symbol),
            nfa: Nfa::new(&config),
            config,
            dictionary,
            nets: Vec::new(),
            defined: HashSet::new(),
            report: CompileReport::default(),
            state: DefinitionState::None,
            current: None,
            includes: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// Registers the net list. Net numbers follow the list order from 1.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or if the list overflows `MaxSymbol`.
    pub fn register_nets<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let last = self.symbols.register_nets(names.iter().map(AsRef::as_ref))?;
        debug!("registered {last} nets");
        Ok(())
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Diagnostics so far.
    #[must_use]
    pub const fn report(&self) -> &CompileReport {
        &self.report
    }

    /// The dictionary, including words added so far.
    #[must_use]
    pub const fn dictionary(&self) -> &WordDictionary {
        &self.dictionary
    }

    /// Compiles a grammar file. Includes, nested ones too, resolve relative
    /// to the directory of the outermost file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or a capacity overflows.
    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        if self.includes.is_empty() {
            self.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        }
        self.includes.push(canonical(path));
        let result = self.compile_source(&text, &path.display().to_string());
        self.includes.pop();
        result
    }

    /// Compiles grammar text. `source` names it in diagnostics.
    ///
    /// A definition left open at the end of the text stays open, so it may
    /// continue in the next call.
    ///
    /// # Errors
    ///
    /// Fails if a capacity overflows or an included file cannot be read.
    pub fn compile_source(&mut self, text: &str, source: &str) -> Result<()> {
        for (n, line) in text.lines().enumerate() {
            self.compile_line(line, source, n + 1)?;
        }
        Ok(())
    }

    /// Closes any open definition and hands back the compiled nets and the
    /// dictionary.
    ///
    /// # Errors
    ///
    /// Fails if resolving the open definition overflows a capacity.
    pub fn finish(mut self) -> Result<(Compilation, WordDictionary)> {
        if let Some(def) = self.current.take() {
            self.diagnose(
                Severity::Warning,
                &def.source,
                def.line,
                format!("net {} not terminated by ';'", def.name),
                "",
            );
            self.resolve(&def)?;
        }
        self.state = DefinitionState::None;

        mark_concept_leaves(&mut self.nets);
        let compilation = Compilation {
            declared: self.symbols.last_net() as usize,
            nets: self.nets,
            report: self.report,
        };
        Ok((compilation, self.dictionary))
    }

    fn compile_line(&mut self, line: &str, source: &str, n: usize) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        if trimmed.starts_with("#incl") {
            return self.include(trimmed, source, n);
        }
        if trimmed.starts_with('#') || trimmed.starts_with("//") {
            return Ok(());
        }
        if trimmed.starts_with(';') {
            return self.end_definition(source, n);
        }
        if line.starts_with(char::is_whitespace) {
            self.rule_line(trimmed, source, n);
        } else if trimmed.starts_with('[') {
            self.header(trimmed, source, n);
        } else if is_macro_name(trimmed) {
            self.macro_line(trimmed, source, n);
        } else {
            self.diagnose(Severity::Error, source, n, "bad format", trimmed);
        }
        Ok(())
    }

    fn include(&mut self, trimmed: &str, source: &str, n: usize) -> Result<()> {
        let target = trimmed
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim().trim_matches(|c| matches!(c, '"' | '<' | '>')))
            .filter(|t| !t.is_empty());
        let Some(target) = target else {
            self.diagnose(Severity::Error, source, n, "include without a file name", trimmed);
            return Ok(());
        };

        let path = self.base_dir.join(target);
        if self.includes.contains(&canonical(&path)) {
            self.diagnose(
                Severity::Error,
                source,
                n,
                format!("include cycle through {}", path.display()),
                trimmed,
            );
            return Ok(());
        }
        if !path.is_file() {
            self.diagnose(
                Severity::Error,
                source,
                n,
                format!("cannot read include {}", path.display()),
                trimmed,
            );
            return Ok(());
        }
        debug!("including {}", path.display());
        self.compile_file(&path)
    }

    fn header(&mut self, trimmed: &str, source: &str, n: usize) {
        if self.state != DefinitionState::None {
            self.diagnose(
                Severity::Error,
                source,
                n,
                "net header inside a definition, missing ';'",
                trimmed,
            );
            return;
        }
        let Some((name, feature)) = split_header(trimmed) else {
            self.diagnose(Severity::Error, source, n, "bad net header", trimmed);
            return;
        };
        let Some(symbol) = self.symbols.intern_net(name) else {
            self.diagnose(
                Severity::Warning,
                source,
                n,
                format!("net {name} is not in the net list"),
                trimmed,
            );
            self.state = DefinitionState::Skipping;
            return;
        };
        let net = NetId::from(symbol);
        if !self.defined.insert(net) {
            self.diagnose(
                Severity::Warning,
                source,
                n,
                format!("net {name} defined twice, later definition skipped"),
                trimmed,
            );
            self.state = DefinitionState::Skipping;
            return;
        }

        self.current = Some(Definition {
            net,
            name: name.to_string(),
            feature,
            owner: header_symbol(name),
            macros: Vec::new(),
            rules: Vec::new(),
            source: source.to_string(),
            line: n,
        });
        self.state = DefinitionState::Header;
    }

    fn macro_line(&mut self, name: &str, source: &str, n: usize) {
        if self.state == DefinitionState::Skipping {
            return;
        }
        if let Some(def) = self.current.as_mut() {
            if !def.macros.iter().any(|m| m == name) {
                def.macros.push(name.to_string());
            }
            def.owner = name.to_string();
            self.state = DefinitionState::Macro;
            return;
        }
        self.diagnose(Severity::Error, source, n, "macro outside a net definition", name);
    }

    fn rule_line(&mut self, trimmed: &str, source: &str, n: usize) {
        if self.state == DefinitionState::Skipping {
            return;
        }
        let Some(def) = self.current.as_mut() else {
            self.diagnose(Severity::Error, source, n, "rule outside a net definition", trimmed);
            return;
        };
        match parse_rule(trimmed) {
            Ok(tokens) => def.rules.push(PendingRule {
                owner: def.owner.clone(),
                tokens,
                source: source.to_string(),
                line: n,
            }),
            Err(err) => self.diagnose(Severity::Error, source, n, err.to_string(), trimmed),
        }
    }

    fn end_definition(&mut self, source: &str, n: usize) -> Result<()> {
        let state = std::mem::replace(&mut self.state, DefinitionState::None);
        match state {
            DefinitionState::None => {
                self.diagnose(Severity::Warning, source, n, "';' outside a net definition", ";");
            }
            DefinitionState::Skipping => {}
            DefinitionState::Header | DefinitionState::Macro => {
                if let Some(def) = self.current.take() {
                    self.resolve(&def)?;
                }
            }
        }
        Ok(())
    }

    fn resolve(&mut self, def: &Definition) -> Result<()> {
        let result = self.build_net(def);
        self.nfa.reset();
        self.symbols.reset();
        result.map_err(|err| {
            error!("{}: {err}", def.name);
            err.with_context(
                ErrorContext::new()
                    .with_source(&def.source)
                    .with_line(def.line)
                    .with_net(&def.name),
            )
        })
    }

    fn build_net(&mut self, def: &Definition) -> Result<()> {
        self.nfa.reset();
        self.symbols.reset();

        let start = self.nfa.add_state()?;
        let end = self.nfa.add_state()?;
        self.nfa.set_final(end);
        let root = self.symbols.intern_non_terminal(&header_symbol(&def.name))?;
        let arc = self.nfa.add_arc(NfaArc {
            label: Label::NonTerminal(root),
            from: start,
            to: end,
            head: false,
            feature: None,
        })?;
        self.nfa.record(root, arc, None)?;
        for name in &def.macros {
            self.symbols.intern_non_terminal(name)?;
        }

        let mut table: HashMap<SymbolId, Vec<Vec<ResolvedToken>>> = HashMap::new();
        for rule in &def.rules {
            let Some(owner) = self.symbols.find(&rule.owner) else {
                continue;
            };
            if let Some(tokens) = self.resolve_rule(rule, &def.macros)? {
                table.entry(owner).or_default().push(tokens);
            }
        }

        let mut recursive = HashSet::new();
        let mut next = 0u32;
        while (next as usize) < self.nfa.non_terminal_count() {
            let id = NonTermId::from_raw(next);
            next += 1;
            let Some(symbol) = self.nfa.non_terminal(id).map(|r| r.symbol) else {
                continue;
            };
            if self.nfa.expands_within(id, symbol) {
                if recursive.insert(symbol) {
                    let name = self.symbol_name(symbol);
                    self.diagnose(
                        Severity::Warning,
                        &def.source,
                        def.line,
                        format!("non-terminal {name} expands into itself in {}, left unexpanded", def.name),
                        "",
                    );
                }
                continue;
            }
            let Some(rules) = table.get(&symbol) else {
                continue;
            };
            for rule in rules {
                NetBuilder::new(&mut self.nfa).rewrite(id, rule)?;
                self.nfa.mark_rewritten(id);
            }
        }

        let unrewritten: Vec<SymbolId> = self
            .nfa
            .non_terminals()
            .filter(|(_, r)| r.rewritten == 0 && !recursive.contains(&r.symbol))
            .map(|(_, r)| r.symbol)
            .collect();
        let mut reported = HashSet::new();
        for symbol in unrewritten {
            if reported.insert(symbol) {
                let name = self.symbol_name(symbol);
                self.diagnose(
                    Severity::Warning,
                    &def.source,
                    def.line,
                    format!("non-terminal {name} not rewritten in {}", def.name),
                    "",
                );
            }
        }

        let net = self.nfa.to_net(def.net, &def.name, def.feature.clone());
        info!("{}  {} states  {} arcs", def.name, net.node_count(), net.arc_count());
        self.report.nets.push(NetSummary {
            name: def.name.clone(),
            id: def.net.index(),
            states: net.node_count(),
            arcs: net.arc_count(),
        });
        self.nets.push(net);
        Ok(())
    }

    /// Resolves the tokens of one rule. `None` means the rule was rejected and
    /// a diagnostic recorded.
    fn resolve_rule(&mut self, rule: &PendingRule, macros: &[String]) -> Result<Option<Vec<ResolvedToken>>> {
        let mut resolved = Vec::with_capacity(rule.tokens.len());
        for token in &rule.tokens {
            let label = match classify(&token.text, macros) {
                TokenClass::Net => {
                    let Some(symbol) = self.symbols.intern_net(&token.text) else {
                        self.diagnose(
                            Severity::Warning,
                            &rule.source,
                            rule.line,
                            format!("unknown net {}, rule skipped", token.text),
                            &token.text,
                        );
                        return Ok(None);
                    };
                    Label::Call(NetId::from(symbol))
                }
                TokenClass::NonTerminal => {
                    let interned = self.symbols.intern_non_terminal(&token.text);
                    let Some(symbol) = self.checked(rule, interned)? else {
                        return Ok(None);
                    };
                    Label::NonTerminal(symbol)
                }
                // words are numbered by the dictionary, never by the symbol table
                TokenClass::Word => Label::Word(self.dictionary.add_if_absent(&token.text)),
            };
            resolved.push(ResolvedToken {
                label,
                optional: token.optional,
                self_loop: token.self_loop,
                head: token.head,
                feature: token.feature.clone(),
            });
        }
        Ok(Some(resolved))
    }

    /// Passes overflows through and turns other interning failures into
    /// diagnostics.
    fn checked(&mut self, rule: &PendingRule, interned: Result<SymbolId>) -> Result<Option<SymbolId>> {
        match interned {
            Ok(symbol) => Ok(Some(symbol)),
            Err(err) if err.overflow().is_some() => Err(err),
            Err(err) => {
                self.diagnose(Severity::Error, &rule.source, rule.line, err.to_string(), "");
                Ok(None)
            }
        }
    }

    fn symbol_name(&self, symbol: SymbolId) -> String {
        self.symbols
            .lookup(symbol)
            .map_or_else(|| format!("{symbol:?}"), str::to_string)
    }

    fn diagnose(&mut self, severity: Severity, source: &str, line: usize, message: impl Into<String>, text: &str) {
        let message = message.into();
        match severity {
            Severity::Warning => warn!("{source}:{line}: {message}"),
            Severity::Error => error!("{source}:{line}: {message}: {text}"),
        }
        self.report.diagnostics.push(Diagnostic {
            severity,
            source: source.to_string(),
            line,
            message,
            text: text.to_string(),
        });
    }
}

/// Compiles `<dir>/<name>.gra` into `<dir>/<name>.net`.
///
/// Reads the net list and the dictionary from `dir`, and rewrites the
/// dictionary when new words were added.
///
/// # Errors
///
/// Fails on unreadable or unwritable files, a malformed dictionary, a
/// duplicate net name, or a capacity overflow.
pub fn compile_dir(dir: impl AsRef<Path>, name: &str, config: &CompilerConfig) -> Result<Compilation> {
    let dir = dir.as_ref();
    let list_path = dir.join(&config.net_list);
    let list = fs::read_to_string(&list_path).map_err(|e| Error::io(&list_path, e))?;

    let dict_path = dir.join(&config.dictionary);
    let dictionary = if dict_path.is_file() {
        WordDictionary::load(&dict_path)?
    } else {
        WordDictionary::new()
    };

    let mut compiler = GrammarCompiler::new(config.clone(), dictionary);
    compiler.register_nets(&parse_net_list(&list))?;
    compiler.compile_file(dir.join(format!("{name}.gra")))?;
    let (compilation, mut dictionary) = compiler.finish()?;

    let net_path = dir.join(format!("{name}.net"));
    fs::write(&net_path, compilation.render()).map_err(|e| Error::io(&net_path, e))?;
    if dictionary.is_dirty() {
        dictionary.save(&dict_path)?;
    }
    info!(
        "compiled {} of {} nets into {}",
        compilation.nets.len(),
        compilation.declared,
        net_path.display()
    );
    Ok(compilation)
}

/// Splits a net list into bracketed names. Bare names get brackets.
#[must_use]
pub fn parse_net_list(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|name| {
            if name.starts_with('[') {
                name.to_string()
            } else {
                format!("[{name}]")
            }
        })
        .collect()
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// `[Name]` or `[Name].feature`.
fn split_header(line: &str) -> Option<(&str, Option<String>)> {
    let close = line.find(']')?;
    let name = &line[..=close];
    if name.len() <= 2 {
        return None;
    }
    let rest = line[close + 1..].trim();
    if rest.is_empty() {
        return Some((name, None));
    }
    let feature = rest.strip_prefix('.')?.trim();
    (!feature.is_empty()).then(|| (name, Some(feature.to_string())))
}

/// The non-terminal a net's header rules belong to: `[Name]` → `<Name>`.
fn header_symbol(name: &str) -> String {
    let inner = name.trim_start_matches('[').trim_end_matches(']');
    format!("<{inner}>")
}

fn is_angle_non_terminal(text: &str) -> bool {
    text.strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .is_some_and(|inner| {
            inner.chars().any(char::is_uppercase)
                && !inner.chars().any(|c| c.is_lowercase() || c.is_whitespace())
        })
}

fn is_macro_name(line: &str) -> bool {
    is_angle_non_terminal(line)
        || (line.chars().any(char::is_uppercase)
            && line
                .chars()
                .all(|c| c.is_uppercase() || c.is_ascii_digit() || matches!(c, '_' | '-')))
}

fn classify(text: &str, macros: &[String]) -> TokenClass {
    if text.len() > 2 && text.starts_with('[') && text.ends_with(']') {
        TokenClass::Net
    } else if is_angle_non_terminal(text) || macros.iter().any(|m| m == text) {
        TokenClass::NonTerminal
    } else {
        TokenClass::Word
    }
}
