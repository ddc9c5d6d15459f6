use super::{PResult, Parser};
use crate::ast::{
    Definition, DefinitionKind, FlagField, Statement, StatementKind, TextField,
};
use crate::error::Diagnostic;
use crate::legality;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    pub(super) fn parse_top_level(&mut self) -> PResult<Definition> {
        let span = self.cur_span();
        let kind = match self.peek() {
            Token::Word(w) => match DefinitionKind::from_keyword(w) {
                Some(kind) => kind,
                None => return Err(self.err(format!("expected a definition, got '{}'", w))),
            },
            other => {
                return Err(self.err(format!(
                    "expected a definition, got {}",
                    other.describe()
                )))
            }
        };
        if !legality::is_allowed_at_top_level(kind) {
            return Err(Diagnostic::illegal(
                &self.filename,
                span,
                format!("'{}' is only allowed inside a domain", kind),
            ));
        }
        self.parse_definition(kind)
    }

    /// `<kind> <name> [{ body }]`. The current token is the kind keyword.
    pub(super) fn parse_definition(&mut self, kind: DefinitionKind) -> PResult<Definition> {
        let start = self.advance().span;
        let (name, name_span) = self.take_word()?;
        if *self.peek() == Token::At {
            return Err(self.err(format!(
                "a {} definition declares its version with a 'version' statement, not '@'",
                kind
            )));
        }
        let (body, inline) = if *self.peek() == Token::LBrace {
            self.advance();
            (self.parse_body(kind), false)
        } else {
            (Vec::new(), true)
        };
        let version = body.iter().find_map(|s| match s {
            Statement::Version { value, .. } => Some(value.clone()),
            _ => None,
        });
        Ok(Definition {
            kind,
            name,
            version,
            body,
            inline,
            span: self.span_from(start),
            name_span,
        })
    }

    /// Statements up to and including the closing `}`. The opening brace has
    /// already been consumed; `body_kind` selects the legal statement set.
    pub(super) fn parse_body(&mut self, body_kind: DefinitionKind) -> Vec<Statement> {
        let level = self.depth;
        let mut body = Vec::new();
        loop {
            if self.halted() {
                return body;
            }
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    return body;
                }
                Token::Eof => {
                    let d = self.err(format!("unclosed {} body: expected '}}'", body_kind));
                    self.report(d);
                    return body;
                }
                _ => {}
            }
            let line = self.cur_span().line;
            match self.parse_statement(body_kind) {
                Ok(stmt) => body.push(stmt),
                Err(d) => {
                    self.report(d);
                    self.recover_to_next_statement(level, line);
                }
            }
        }
    }

    fn parse_statement(&mut self, body_kind: DefinitionKind) -> PResult<Statement> {
        let span = self.cur_span();
        let kind = self.classify_statement(body_kind)?;
        if !legality::is_allowed(body_kind, kind) {
            return Err(Diagnostic::illegal(
                &self.filename,
                span,
                format!(
                    "'{}' statement is not allowed in a {} body",
                    kind.keyword(),
                    body_kind
                ),
            ));
        }
        match kind {
            StatementKind::Version => {
                self.advance();
                let value = self.take_version()?;
                Ok(Statement::Version {
                    value,
                    span: self.span_from(span),
                })
            }
            StatementKind::Text(field) => self.parse_text(field),
            StatementKind::Flag(field) => self.parse_flag(field),
            StatementKind::Owner => self.parse_owner(),
            StatementKind::Member => self.parse_member(),
            StatementKind::Annotation => Ok(Statement::Annotation(self.parse_annotation()?)),
            StatementKind::Sends => Ok(Statement::Sends(self.parse_message_flow()?)),
            StatementKind::Receives => Ok(Statement::Receives(self.parse_message_flow()?)),
            StatementKind::WritesTo | StatementKind::ReadsFrom => self.parse_container_access(kind),
            StatementKind::Reference(target_kind) => self.parse_reference(target_kind),
            StatementKind::Definition(def_kind) => {
                Ok(Statement::Definition(Box::new(self.parse_definition(def_kind)?)))
            }
            StatementKind::Parameter => Ok(Statement::Parameter(self.parse_parameter()?)),
            StatementKind::Route => self.parse_route(),
            StatementKind::Input => Ok(Statement::Input(self.parse_data_port()?)),
            StatementKind::Output => Ok(Statement::Output(self.parse_data_port()?)),
            StatementKind::EntryChain => Ok(Statement::EntryChain(self.parse_entry_chain()?)),
            StatementKind::When => Ok(Statement::When(self.parse_when()?)),
        }
    }

    /// Decide which statement starts here from the leading keyword. A
    /// definition keyword followed by `name[@version] {` nests a definition;
    /// without the brace it is a reference statement.
    fn classify_statement(&self, body_kind: DefinitionKind) -> PResult<StatementKind> {
        let word = match self.peek() {
            Token::At => return Ok(StatementKind::Annotation),
            Token::Word(w) => w.as_str(),
            other => {
                return Err(self.err(format!(
                    "expected a statement, got {}",
                    other.describe()
                )))
            }
        };

        let fixed = match word {
            "version" => Some(StatementKind::Version),
            "owner" => Some(StatementKind::Owner),
            "member" => Some(StatementKind::Member),
            "sends" => Some(StatementKind::Sends),
            "receives" => Some(StatementKind::Receives),
            "writes-to" => Some(StatementKind::WritesTo),
            "reads-from" => Some(StatementKind::ReadsFrom),
            "parameter" => Some(StatementKind::Parameter),
            "route" => Some(StatementKind::Route),
            "input" => Some(StatementKind::Input),
            "output" => Some(StatementKind::Output),
            "when" => Some(StatementKind::When),
            _ => TextField::from_keyword(word)
                .map(StatementKind::Text)
                .or_else(|| FlagField::from_keyword(word).map(StatementKind::Flag)),
        };
        if let Some(kind) = fixed {
            return Ok(kind);
        }

        if let Some(kind) = DefinitionKind::from_keyword(word) {
            if matches!(self.peek_at(1), Token::Word(_)) {
                let mut ahead = 2;
                if *self.peek_at(ahead) == Token::At {
                    ahead += 2;
                }
                return Ok(if *self.peek_at(ahead) == Token::LBrace {
                    StatementKind::Definition(kind)
                } else {
                    StatementKind::Reference(kind)
                });
            }
        }

        if body_kind == DefinitionKind::Flow {
            return Ok(StatementKind::EntryChain);
        }
        Err(self.err(format!(
            "unknown statement '{}' in a {} body",
            word, body_kind
        )))
    }
}
