use super::{PResult, Parser};
use crate::ast::{
    kinds, Annotation, AnnotationArg, AnnotationValue, ChannelClause, ChannelDirection, Contract,
    DataPort, DefinitionKind, DeliveryMode, FlagField, MessageFlow, MessageKind, ParameterDecl,
    Statement, StatementKind, TextField, VersionLiteral,
};
use crate::lexer::Token;

impl<'a> Parser<'a> {
    pub(super) fn parse_text(&mut self, field: TextField) -> PResult<Statement> {
        let start = self.advance().span;
        let value = self.take_text()?;
        Ok(Statement::Text {
            field,
            value,
            span: self.span_from(start),
        })
    }

    /// `<flag> true|false`; a bare flag means `true`.
    pub(super) fn parse_flag(&mut self, field: FlagField) -> PResult<Statement> {
        let start = self.advance().span;
        let value = if self.is_word("true") || self.is_word("false") {
            self.take_bool()?
        } else {
            true
        };
        Ok(Statement::Flag {
            field,
            value,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_owner(&mut self) -> PResult<Statement> {
        let start = self.advance().span;
        let owner = self.take_ref(kinds::OWNERS)?;
        Ok(Statement::Owner {
            owner,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_member(&mut self) -> PResult<Statement> {
        let start = self.advance().span;
        let member = self.take_ref(kinds::USERS)?;
        Ok(Statement::Member {
            member,
            span: self.span_from(start),
        })
    }

    /// `@name` or `@name(arg, key: value, key = value)`.
    pub(super) fn parse_annotation(&mut self) -> PResult<Annotation> {
        let start = self.expect(Token::At)?;
        let (name, _) = self.take_word()?;
        let mut args = Vec::new();
        if *self.peek() == Token::LParen {
            self.advance();
            while *self.peek() != Token::RParen {
                let named = matches!(self.peek(), Token::Word(_))
                    && matches!(self.peek_at(1), Token::Colon | Token::Eq);
                let key = if named {
                    let (key, _) = self.take_word()?;
                    self.advance();
                    Some(key)
                } else {
                    None
                };
                let value = self.parse_annotation_value()?;
                args.push(AnnotationArg { key, value });
                if *self.peek() == Token::Comma {
                    self.advance();
                } else if *self.peek() != Token::RParen {
                    return Err(self.err(format!(
                        "expected ',' or ')' in annotation arguments, got {}",
                        self.peek().describe()
                    )));
                }
            }
            self.expect(Token::RParen)?;
        }
        Ok(Annotation {
            name,
            args,
            span: self.span_from(start),
        })
    }

    fn parse_annotation_value(&mut self) -> PResult<AnnotationValue> {
        let span = self.cur_span();
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(AnnotationValue::Str(s))
            }
            Token::Word(w) => {
                self.advance();
                Ok(match w.as_str() {
                    "true" => AnnotationValue::Bool(true),
                    "false" => AnnotationValue::Bool(false),
                    _ => AnnotationValue::Ident(w),
                })
            }
            Token::Version(v) => {
                self.advance();
                if let Ok(n) = v.parse::<i64>() {
                    return Ok(AnnotationValue::Int(n));
                }
                VersionLiteral::parse(&v)
                    .map(AnnotationValue::Version)
                    .map_err(|msg| self.err_at(span, msg))
            }
            other => Err(self.err(format!(
                "expected annotation value, got {}",
                other.describe()
            ))),
        }
    }

    fn take_message_kind(&mut self) -> PResult<MessageKind> {
        if let Token::Word(w) = self.peek() {
            if let Some(kind) = MessageKind::from_keyword(w) {
                self.advance();
                return Ok(kind);
            }
        }
        Err(self.err(format!(
            "expected 'event', 'command' or 'query', got {}",
            self.peek().describe()
        )))
    }

    /// `sends|receives <kind> <name>[@v] [to|from ...] [{ body }]`. The
    /// channel clause and the inline body are independent.
    pub(super) fn parse_message_flow(&mut self) -> PResult<MessageFlow> {
        let start = self.advance().span;
        let message_kind = self.take_message_kind()?;
        let message = self.take_ref(kinds::MESSAGES)?;
        let channels = if self.is_word("to") || self.is_word("from") {
            Some(self.parse_channel_clause()?)
        } else {
            None
        };
        let body = if *self.peek() == Token::LBrace {
            self.advance();
            Some(self.parse_body(DefinitionKind::Message(message_kind)))
        } else {
            None
        };
        Ok(MessageFlow {
            message_kind,
            message,
            channels,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_channel_clause(&mut self) -> PResult<ChannelClause> {
        let start = self.cur_span();
        let direction = if self.is_word("to") {
            ChannelDirection::To
        } else {
            ChannelDirection::From
        };
        self.advance();
        let mut channels = vec![self.take_ref(kinds::CHANNELS)?];
        while *self.peek() == Token::Comma {
            self.advance();
            channels.push(self.take_ref(kinds::CHANNELS)?);
        }
        let delivery = if self.is_word("delivery") {
            self.advance();
            Some(match self.take_word()? {
                (w, _) if w == "push" => DeliveryMode::Push,
                (w, _) if w == "pull" => DeliveryMode::Pull,
                (w, span) => {
                    return Err(self.err_at(
                        span,
                        format!("expected delivery mode 'push' or 'pull', got '{}'", w),
                    ))
                }
            })
        } else {
            None
        };
        Ok(ChannelClause {
            direction,
            channels,
            delivery,
            span: self.span_from(start),
        })
    }

    /// `writes-to container <name>[@v]` / `reads-from container <name>[@v]`
    pub(super) fn parse_container_access(&mut self, kind: StatementKind) -> PResult<Statement> {
        let start = self.advance().span;
        self.expect_word("container")?;
        let container = self.take_ref(kinds::CONTAINERS)?;
        let span = self.span_from(start);
        Ok(if kind == StatementKind::WritesTo {
            Statement::WritesTo { container, span }
        } else {
            Statement::ReadsFrom { container, span }
        })
    }

    pub(super) fn parse_reference(&mut self, kind: DefinitionKind) -> PResult<Statement> {
        let start = self.advance().span;
        let target = self.take_ref(kind.as_set())?;
        Ok(Statement::Reference {
            kind,
            target,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_route(&mut self) -> PResult<Statement> {
        let start = self.advance().span;
        let target = self.take_ref(kinds::CHANNELS)?;
        Ok(Statement::Route {
            target,
            span: self.span_from(start),
        })
    }

    /// `parameter <name> { description "…" default "…" enum [..] examples [..] }`
    pub(super) fn parse_parameter(&mut self) -> PResult<ParameterDecl> {
        let start = self.advance().span;
        let (name, _) = self.take_word()?;
        let mut param = ParameterDecl {
            name,
            description: None,
            default: None,
            enum_values: Vec::new(),
            examples: Vec::new(),
            span: start,
        };
        if *self.peek() == Token::LBrace {
            self.advance();
            while *self.peek() != Token::RBrace {
                let (key, key_span) = self.take_word()?;
                match key.as_str() {
                    "description" => param.description = Some(self.take_str()?),
                    "default" => param.default = Some(self.take_text()?),
                    "enum" => param.enum_values = self.parse_string_list()?,
                    "examples" => param.examples = self.parse_string_list()?,
                    _ => {
                        return Err(
                            self.err_at(key_span, format!("unknown parameter field '{}'", key))
                        )
                    }
                }
            }
            self.expect(Token::RBrace)?;
        }
        param.span = self.span_from(start);
        Ok(param)
    }

    /// `["a", "b"]`; a trailing comma is accepted.
    fn parse_string_list(&mut self) -> PResult<Vec<String>> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        while *self.peek() != Token::RBracket {
            items.push(self.take_text()?);
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        Ok(items)
    }

    /// `input|output <kind> <name>[@v] [{ contract { path "…" name "…" type "…" } }]`
    pub(super) fn parse_data_port(&mut self) -> PResult<DataPort> {
        let start = self.advance().span;
        let message_kind = self.take_message_kind()?;
        let message = self.take_ref(kinds::MESSAGES)?;
        let mut contract = None;
        if *self.peek() == Token::LBrace {
            self.advance();
            while *self.peek() != Token::RBrace {
                if contract.is_some() {
                    return Err(self.err("only one contract is allowed per data port"));
                }
                contract = Some(self.parse_contract()?);
            }
            self.expect(Token::RBrace)?;
        }
        Ok(DataPort {
            message_kind,
            message,
            contract,
            span: self.span_from(start),
        })
    }

    fn parse_contract(&mut self) -> PResult<Contract> {
        let start = self.expect_word("contract")?;
        self.expect(Token::LBrace)?;
        let mut contract = Contract {
            path: None,
            name: None,
            type_: None,
            span: start,
        };
        while *self.peek() != Token::RBrace {
            let (key, key_span) = self.take_word()?;
            let slot = match key.as_str() {
                "path" => &mut contract.path,
                "name" => &mut contract.name,
                "type" => &mut contract.type_,
                _ => {
                    return Err(self.err_at(key_span, format!("unknown contract field '{}'", key)))
                }
            };
            *slot = Some(self.take_text()?);
        }
        self.expect(Token::RBrace)?;
        contract.span = self.span_from(start);
        Ok(contract)
    }
}
