//! Rewrite-rule right-hand sides.
//!
//! A rule line is `(tok tok ...)` with each token optionally decorated:
//!
//! | Decoration | Meaning |
//! |---|---|
//! | `*tok` | optional |
//! | `+tok` | may repeat |
//! | `*+tok` / `+*tok` | zero or more repeats |
//! | `tok!` | grammatical head |
//! | `tok.{feat}` | feature string copied onto the arc |
//!
//! Suffixes may appear in either order.

use phoenix_foundation::{Error, Result};

/// One decorated token of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleToken {
    /// Symbol text without decorations.
    pub text: String,
    /// `*` prefix.
    pub optional: bool,
    /// `+` prefix.
    pub self_loop: bool,
    /// `!` suffix.
    pub head: bool,
    /// `.{...}` suffix, braces included.
    pub feature: Option<String>,
}

impl RuleToken {
    /// A plain token with no decorations.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            optional: false,
            self_loop: false,
            head: false,
            feature: None,
        }
    }
}

/// Parses the right-hand side of a rule line.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedLine`](phoenix_foundation::ErrorKind::MalformedLine)
/// if the parentheses are missing, the rule is empty, or a decoration has no
/// symbol.
pub fn parse_rule(line: &str) -> Result<Vec<RuleToken>> {
    let trimmed = line.trim();
    let (Some(open), Some(close)) = (trimmed.find('('), trimmed.rfind(')')) else {
        return Err(Error::malformed_line("rule needs parentheses", trimmed));
    };
    if close < open {
        return Err(Error::malformed_line("rule needs parentheses", trimmed));
    }

    let mut scanner = RuleScanner::new(&trimmed[open + 1..close]);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token().map_err(|msg| Error::malformed_line(msg, trimmed))? {
        tokens.push(token);
    }
    if tokens.is_empty() {
        return Err(Error::malformed_line("empty rule", trimmed));
    }
    Ok(tokens)
}

/// Scans decorated tokens out of the text between the parentheses.
struct RuleScanner<'src> {
    rest: &'src str,
}

impl<'src> RuleScanner<'src> {
    fn new(source: &'src str) -> Self {
        Self { rest: source }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.rest = &self.rest[c.len_utf8()..];
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'src str {
        let end = self.rest.find(|c| !keep(c)).unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    fn next_token(&mut self) -> std::result::Result<Option<RuleToken>, &'static str> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return Ok(None);
        }

        let mut token = RuleToken::plain("");
        loop {
            match self.peek_char() {
                Some('*') if !token.optional => token.optional = true,
                Some('+') if !token.self_loop => token.self_loop = true,
                _ => break,
            }
            self.advance();
        }

        let text = self.take_while(|c| !c.is_whitespace() && !matches!(c, '.' | '!'));
        if text.is_empty() {
            return Err("decoration without a symbol");
        }
        token.text = text.to_string();

        loop {
            match self.peek_char() {
                Some('!') => {
                    token.head = true;
                    self.advance();
                }
                Some('.') => {
                    self.advance();
                    token.feature = Some(self.scan_feature()?);
                }
                _ => break,
            }
        }
        Ok(Some(token))
    }

    fn scan_feature(&mut self) -> std::result::Result<String, &'static str> {
        if self.peek_char() == Some('{') {
            let Some(end) = self.rest.find('}') else {
                return Err("unterminated feature");
            };
            let (feature, rest) = self.rest.split_at(end + 1);
            self.rest = rest;
            return Ok(feature.to_string());
        }
        let feature = self.take_while(|c| !c.is_whitespace() && c != '!');
        if feature.is_empty() {
            return Err("empty feature");
        }
        Ok(feature.to_string())
    }
}
