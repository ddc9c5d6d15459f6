use crate::ast::Span;
use crate::error::Diagnostic;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords; may contain `-`, `_` and `.` after the
    /// first character (`data-product`, `orders.v2`).
    Word(String),
    /// Starts with a digit: version literals and integers. Validated by the
    /// parser, not here.
    Version(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    At,
    Eq,
    /// `->` or U+2192
    Arrow,
    Eof,
}

impl Token {
    /// Short description used in "expected X, got Y" messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Version(v) => format!("'{}'", v),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::LBrace => "'{'".to_owned(),
            Token::RBrace => "'}'".to_owned(),
            Token::LParen => "'('".to_owned(),
            Token::RParen => "')'".to_owned(),
            Token::LBracket => "'['".to_owned(),
            Token::RBracket => "']'".to_owned(),
            Token::Comma => "','".to_owned(),
            Token::Colon => "':'".to_owned(),
            Token::At => "'@'".to_owned(),
            Token::Eq => "'='".to_owned(),
            Token::Arrow => "'->'".to_owned(),
            Token::Eof => "end of file".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Reserved words of the language. Statement keywords are only reserved in
/// the position where a statement starts; elsewhere (names, annotation
/// values) they are ordinary identifiers.
const KEYWORDS: &[&str] = &[
    "domain",
    "subdomain",
    "service",
    "event",
    "command",
    "query",
    "channel",
    "container",
    "flow",
    "user",
    "team",
    "data-product",
    "diagram",
    "actor",
    "external-system",
    "visualizer",
    "version",
    "name",
    "summary",
    "owner",
    "draft",
    "deprecated",
    "schema",
    "sends",
    "receives",
    "to",
    "from",
    "delivery",
    "push",
    "pull",
    "writes-to",
    "reads-from",
    "parameter",
    "route",
    "address",
    "protocol",
    "container-type",
    "technology",
    "access-mode",
    "classification",
    "authoritative",
    "residency",
    "retention",
    "input",
    "output",
    "contract",
    "member",
    "email",
    "role",
    "slack",
    "avatar",
    "animated",
    "legend",
    "search",
    "toolbar",
    "focus-mode",
    "style",
    "when",
    "and",
    "true",
    "false",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Tokenize `src`. Lexical problems are reported as diagnostics and the
/// offending input is skipped, so the token stream always ends in `Eof`.
pub fn lex(src: &str, filename: &str) -> (Vec<Spanned>, Vec<Diagnostic>) {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let offset = |i: usize| chars.get(i).map(|(o, _)| *o).unwrap_or(src.len());
    let at = |i: usize| chars.get(i).map(|(_, c)| *c);

    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    while let Some(c) = at(pos) {
        // Line comment
        if c == '/' && at(pos + 1) == Some('/') {
            while at(pos).is_some_and(|c| c != '\n') {
                pos += 1;
            }
            continue;
        }

        // Block comment
        if c == '/' && at(pos + 1) == Some('*') {
            let start = pos;
            let start_line = line;
            pos += 2;
            loop {
                match at(pos) {
                    None => {
                        diagnostics.push(Diagnostic::lex(
                            filename,
                            Span::new(offset(start), src.len(), start_line),
                            "unterminated block comment",
                        ));
                        break;
                    }
                    Some('*') if at(pos + 1) == Some('/') => {
                        pos += 2;
                        break;
                    }
                    Some(ch) => {
                        if ch == '\n' {
                            line += 1;
                        }
                        pos += 1;
                    }
                }
            }
            continue;
        }

        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let start = pos;
        let tok_line = line;

        // String literal; an unterminated one runs to the end of the line.
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                match at(pos) {
                    None | Some('\n') => {
                        diagnostics.push(Diagnostic::lex(
                            filename,
                            Span::new(offset(start), offset(pos), tok_line),
                            "unterminated string literal",
                        ));
                        break;
                    }
                    Some('"') => {
                        pos += 1;
                        break;
                    }
                    Some('\\') => {
                        pos += 1;
                        match at(pos) {
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other) if other != '\n' => {
                                s.push('\\');
                                s.push(other);
                            }
                            _ => continue,
                        }
                        pos += 1;
                    }
                    Some(sc) => {
                        s.push(sc);
                        pos += 1;
                    }
                }
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                span: Span::new(offset(start), offset(pos), tok_line),
            });
            continue;
        }

        let single = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            ':' => Some(Token::Colon),
            '@' => Some(Token::At),
            '=' => Some(Token::Eq),
            '\u{2192}' => Some(Token::Arrow),
            _ => None,
        };
        if let Some(token) = single {
            pos += 1;
            tokens.push(Spanned {
                token,
                span: Span::new(offset(start), offset(pos), tok_line),
            });
            continue;
        }

        if c == '-' && at(pos + 1) == Some('>') {
            pos += 2;
            tokens.push(Spanned {
                token: Token::Arrow,
                span: Span::new(offset(start), offset(pos), tok_line),
            });
            continue;
        }

        // Words and version literals share a body; a '-' that begins an
        // arrow ends the run so `A->B` lexes as three tokens.
        if c.is_alphanumeric() || c == '_' {
            pos += 1;
            while let Some(wc) = at(pos) {
                if !is_word_char(wc) || (wc == '-' && at(pos + 1) == Some('>')) {
                    break;
                }
                pos += 1;
            }
            let text = src[offset(start)..offset(pos)].to_owned();
            let token = if c.is_ascii_digit() {
                Token::Version(text)
            } else {
                Token::Word(text)
            };
            tokens.push(Spanned {
                token,
                span: Span::new(offset(start), offset(pos), tok_line),
            });
            continue;
        }

        diagnostics.push(Diagnostic::lex(
            filename,
            Span::new(offset(start), offset(pos + 1), tok_line),
            format!("unexpected character '{}'", c),
        ));
        pos += 1;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        span: Span::new(src.len(), src.len(), line),
    });
    (tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        let (tokens, diags) = lex(src, "test.ec");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn hyphenated_keywords_are_single_words() {
        assert_eq!(
            kinds("writes-to container orders-db"),
            vec![
                Token::Word("writes-to".into()),
                Token::Word("container".into()),
                Token::Word("orders-db".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn version_suffix_lexes_as_at_and_version() {
        assert_eq!(
            kinds("OrderCreated@1.0.0"),
            vec![
                Token::Word("OrderCreated".into()),
                Token::At,
                Token::Version("1.0.0".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn arrow_splits_words_without_spaces() {
        assert_eq!(
            kinds("A->B → C"),
            vec![
                Token::Word("A".into()),
                Token::Arrow,
                Token::Word("B".into()),
                Token::Arrow,
                Token::Word("C".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_discarded_and_lines_counted() {
        let (tokens, diags) = lex("// head\n/* a\nb */ domain", "t.ec");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].token, Token::Word("domain".into()));
        assert_eq!(tokens[0].span.line, 3);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let (tokens, _) = lex("summary \"héllo\" x", "t.ec");
        assert_eq!(tokens[1].span.start, 8);
        assert_eq!(tokens[2].span.start, 8 + "\"héllo\"".len() + 1);
    }

    #[test]
    fn string_escapes_are_resolved() {
        assert_eq!(
            kinds(r#""a \"quoted\" word""#),
            vec![Token::Str("a \"quoted\" word".into()), Token::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_reported_and_lexing_continues() {
        let (tokens, diags) = lex("summary \"open\ndomain", "t.ec");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unterminated string"));
        assert_eq!(tokens[2].token, Token::Word("domain".into()));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let (tokens, diags) = lex("domain $ Sales", "t.ec");
        assert_eq!(diags.len(), 1);
        assert_eq!(tokens.len(), 3);
    }
}
