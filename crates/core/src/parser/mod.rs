//! Recursive-descent parser producing a typed [`Program`] directly.
//!
//! Every definition kind shares one body loop, [`Parser::parse_body`], which
//! classifies each statement by its leading keyword, checks it against the
//! legality table and only then parses the rest of it. Errors are collected
//! as diagnostics; the parser skips to the next statement (inside a body) or
//! the next definition keyword (at top level) and keeps going.

use crate::ast::{CrossReference, DefinitionKind, KindSet, Program, Span, VersionLiteral};
use crate::error::Diagnostic;
use crate::lexer::{self, Spanned, Token};

mod definitions;
mod flow;
mod statements;

pub(crate) use flow::FLOW_STATEMENT_WORDS;

/// Default cap on syntax errors collected per document.
pub const DEFAULT_MAX_ERRORS: usize = 25;

type PResult<T> = Result<T, Diagnostic>;

/// A parsed document plus everything the lexer and parser reported.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    /// Syntax-class errors only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Lex and parse one document.
pub fn parse_source(src: &str, filename: &str, max_errors: usize) -> ParseOutput {
    let (tokens, lex_diagnostics) = lexer::lex(src, filename);
    let mut p = Parser::new(src, &tokens, filename, max_errors);
    for d in lex_diagnostics {
        p.report(d);
    }
    let program = p.parse_program();
    tracing::trace!(
        file = filename,
        definitions = program.definitions.len(),
        diagnostics = p.diagnostics.len(),
        "parsed document"
    );
    ParseOutput {
        program,
        diagnostics: p.diagnostics,
    }
}

/// Parse with the default error cap.
pub fn parse(src: &str, filename: &str) -> ParseOutput {
    parse_source(src, filename, DEFAULT_MAX_ERRORS)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Spanned],
    pos: usize,
    /// Number of `{` consumed and not yet closed.
    depth: usize,
    filename: String,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    max_errors: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: &'a [Spanned], filename: &str, max_errors: usize) -> Self {
        Parser {
            src,
            tokens,
            pos: 0,
            depth: 0,
            filename: filename.to_owned(),
            diagnostics: Vec::new(),
            error_count: 0,
            max_errors: max_errors.max(1),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    /// Token `n` positions ahead of the current one.
    fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_span(&self) -> Span {
        self.cur().span
    }

    /// Span of the most recently consumed token.
    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            return self.cur_span();
        }
        self.tokens[(self.pos - 1).min(self.tokens.len() - 1)].span
    }

    /// Span from `start` through the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        start.to(self.prev_span())
    }

    /// 0-based character column where `span` starts.
    fn column(&self, span: Span) -> usize {
        let before = &self.src[..span.start.min(self.src.len())];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        before[line_start..].chars().count()
    }

    /// Whether the current token is the first one on its line.
    fn at_line_start(&self) -> bool {
        self.pos > 0 && self.cur_span().line > self.prev_span().line
    }

    fn advance(&mut self) -> &Spanned {
        let idx = self.pos.min(self.tokens.len() - 1);
        match self.tokens[idx].token {
            Token::LBrace => self.depth += 1,
            Token::RBrace => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn err(&self, msg: impl Into<String>) -> Diagnostic {
        Diagnostic::syntax(&self.filename, self.cur_span(), msg)
    }

    fn err_at(&self, span: Span, msg: impl Into<String>) -> Diagnostic {
        Diagnostic::syntax(&self.filename, span, msg)
    }

    fn report(&mut self, d: Diagnostic) {
        if d.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(d);
    }

    /// Once the error cap is reached the rest of the document is skipped.
    fn halted(&self) -> bool {
        self.error_count >= self.max_errors
    }

    fn expect(&mut self, token: Token) -> PResult<Span> {
        if *self.peek() == token {
            Ok(self.advance().span)
        } else {
            Err(self.err(format!(
                "expected {}, got {}",
                token.describe(),
                self.peek().describe()
            )))
        }
    }

    fn expect_word(&mut self, expected: &str) -> PResult<Span> {
        if self.is_word(expected) {
            return Ok(self.advance().span);
        }
        Err(self.err(format!(
            "expected '{}', got {}",
            expected,
            self.peek().describe()
        )))
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn take_word(&mut self) -> PResult<(String, Span)> {
        if let Token::Word(w) = self.peek().clone() {
            let span = self.advance().span;
            Ok((w, span))
        } else {
            Err(self.err(format!(
                "expected identifier, got {}",
                self.peek().describe()
            )))
        }
    }

    fn take_str(&mut self) -> PResult<String> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.err(format!(
                "expected string literal, got {}",
                self.peek().describe()
            )))
        }
    }

    /// A quoted string or a bare identifier.
    fn take_text(&mut self) -> PResult<String> {
        match self.peek().clone() {
            Token::Str(s) | Token::Word(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.err(format!("expected a value, got {}", other.describe()))),
        }
    }

    fn take_bool(&mut self) -> PResult<bool> {
        match self.peek() {
            Token::Word(w) if w == "true" => {
                self.advance();
                Ok(true)
            }
            Token::Word(w) if w == "false" => {
                self.advance();
                Ok(false)
            }
            other => Err(self.err(format!(
                "expected 'true' or 'false', got {}",
                other.describe()
            ))),
        }
    }

    /// A version literal written bare (`1.0.0`, `v2`) or quoted.
    fn take_version(&mut self) -> PResult<VersionLiteral> {
        let span = self.cur_span();
        let text = match self.peek().clone() {
            Token::Version(v) | Token::Word(v) | Token::Str(v) => {
                self.advance();
                v
            }
            other => {
                return Err(self.err(format!(
                    "expected version literal, got {}",
                    other.describe()
                )))
            }
        };
        VersionLiteral::parse(&text).map_err(|msg| self.err_at(span, msg))
    }

    /// `name[@version]` as a reference site accepting `expected` kinds.
    fn take_ref(&mut self, expected: KindSet) -> PResult<CrossReference> {
        let (name, start) = self.take_word()?;
        let version = if *self.peek() == Token::At {
            self.advance();
            let span = self.cur_span();
            let text = match self.peek().clone() {
                Token::Version(v) | Token::Word(v) => {
                    self.advance();
                    v
                }
                other => {
                    return Err(self.err(format!(
                        "expected version after '@', got {}",
                        other.describe()
                    )))
                }
            };
            Some(VersionLiteral::parse(&text).map_err(|msg| self.err_at(span, msg))?)
        } else {
            None
        };
        Ok(CrossReference::new(
            name,
            version,
            expected,
            self.span_from(start),
        ))
    }

    // -- Recovery ---------------------------------------------

    /// Skip the rest of a broken statement: stop at a word starting a later
    /// line, or at the `}` closing the body, both at the body's own depth.
    fn recover_to_next_statement(&mut self, level: usize, line: u32) {
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::RBrace if self.depth == level => return,
                Token::Word(_) if self.depth == level && self.cur_span().line > line => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next definition keyword at top level.
    fn recover_to_next_definition(&mut self) {
        let start = self.pos;
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Word(w)
                    if self.depth == 0
                        && self.pos > start
                        && DefinitionKind::from_keyword(w).is_some() =>
                {
                    break
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_program(&mut self) -> Program {
        let mut definitions = Vec::new();
        while *self.peek() != Token::Eof && !self.halted() {
            match self.parse_top_level() {
                Ok(def) => definitions.push(def),
                Err(d) => {
                    self.report(d);
                    self.recover_to_next_definition();
                }
            }
        }
        Program { definitions }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
