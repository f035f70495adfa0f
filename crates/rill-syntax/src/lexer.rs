use logos::Logos;
use rill_common::error::{Error, ErrorS, SyntaxError};
use rill_common::types::Span;

use std::fmt::{self, Display, Formatter};

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    pending: Option<(TokenKind, logos::Span)>,
    /// Line of the byte at `cursor`.
    line: usize,
    cursor: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { inner: TokenKind::lexer(source), pending: None, line: 1, cursor: 0, done: false }
    }

    /// Advances the line counter up to `offset`, and returns the line on
    /// which `offset` lies.
    fn line_at(&mut self, offset: usize) -> usize {
        let source = self.inner.source();
        self.line += source[self.cursor..offset].matches('\n').count();
        self.cursor = offset;
        self.line
    }

    fn span(&mut self, range: logos::Span) -> Span {
        Span::new(self.line_at(range.start), range.start, range.end)
    }

    fn token(&mut self, kind: TokenKind, range: logos::Span) -> Result<Token, ErrorS> {
        let lexeme = self.inner.source()[range.clone()].to_string();
        let span = self.span(range);
        let literal = match kind {
            TokenKind::Number => match lexeme.parse::<f64>() {
                Ok(number) => Some(Literal::Number(number)),
                Err(_) => {
                    return Err((
                        Error::SyntaxError(SyntaxError::UnexpectedInput { token: lexeme }),
                        span,
                    ));
                }
            },
            TokenKind::String => Some(Literal::String(lexeme[1..lexeme.len() - 1].to_string())),
            _ => None,
        };
        Ok(Token { kind, lexeme, literal, span })
    }

    /// The end-of-file token, positioned just past the last byte of input.
    fn eof(&mut self) -> Token {
        let end = self.inner.source().len();
        let span = self.span(end..end);
        Token { kind: TokenKind::Eof, lexeme: String::new(), literal: None, span }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, ErrorS>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (kind, mut range) = match self.pending.take() {
            Some(pending) => pending,
            None => {
                let kind = self.inner.next()?;
                (kind, self.inner.span())
            }
        };
        if kind != TokenKind::Error {
            return Some(self.token(kind, range));
        }

        let source = self.inner.source();
        if source[range.clone()].starts_with('"') {
            // An unterminated string swallows the rest of the input.
            self.done = true;
            range.end = source.len();
            let span = self.span(range);
            return Some(Err((Error::SyntaxError(SyntaxError::UnterminatedString), span)));
        }

        // Report a run of adjacent unrecognized input as a single error.
        while let Some(kind) = self.inner.next() {
            let range_new = self.inner.span();
            let adjacent = range.end == range_new.start;
            if kind == TokenKind::Error && adjacent && !source[range_new.clone()].starts_with('"') {
                range.end = range_new.end;
            } else {
                self.pending = Some((kind, range_new));
                break;
            }
        }

        let token = source[range.clone()].to_string();
        let span = self.span(range);
        Some(Err((Error::SyntaxError(SyntaxError::UnexpectedInput { token }), span)))
    }
}

/// Scans the whole of `source`. The returned tokens always end with exactly
/// one [`TokenKind::Eof`]; lexical errors are collected alongside them
/// rather than stopping the scan.
pub fn scan(source: &str) -> (Vec<Token>, Vec<ErrorS>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for result in &mut lexer {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }
    tokens.push(lexer.eof());
    (tokens, errors)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Clone, Copy, Debug, Eq, Hash, Logos, PartialEq)]
pub enum TokenKind {
    // Single-character tokens.
    #[token("(")]
    LtParen,
    #[token(")")]
    RtParen,
    #[token("{")]
    LtBrace,
    #[token("}")]
    RtBrace,
    #[token("[")]
    LtBracket,
    #[token("]")]
    RtBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // One or two character tokens.
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token("+")]
    Plus,
    #[token("+=")]
    PlusEqual,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("-=")]
    MinusEqual,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Asterisk,
    #[token("*=")]
    AsteriskEqual,
    #[token("/")]
    Slash,
    #[token("/=")]
    SlashEqual,

    // Literals.
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r#""[^"]*""#)]
    String,
    #[regex(r#"[0-9]+(\.[0-9]+)?"#)]
    Number,

    // Keywords.
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("switch")]
    Switch,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    /// Appended by [`scan`], never produced by the generated lexer.
    Eof,

    #[regex(r"//.*", logos::skip)]
    #[regex(r"[ \r\n\t\f]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Break
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Else
                | TokenKind::False
                | TokenKind::For
                | TokenKind::Fun
                | TokenKind::If
                | TokenKind::Nil
                | TokenKind::Or
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Super
                | TokenKind::Switch
                | TokenKind::This
                | TokenKind::True
                | TokenKind::Var
                | TokenKind::While
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LtParen => r#""(""#,
            TokenKind::RtParen => r#"")""#,
            TokenKind::LtBrace => r#""{""#,
            TokenKind::RtBrace => r#""}""#,
            TokenKind::LtBracket => r#""[""#,
            TokenKind::RtBracket => r#""]""#,
            TokenKind::Comma => r#"",""#,
            TokenKind::Dot => r#"".""#,
            TokenKind::Colon => r#"":""#,
            TokenKind::Semicolon => r#"";""#,
            TokenKind::Bang => r#""!""#,
            TokenKind::BangEqual => r#""!=""#,
            TokenKind::Equal => r#""=""#,
            TokenKind::EqualEqual => r#""==""#,
            TokenKind::Greater => r#"">""#,
            TokenKind::GreaterEqual => r#"">=""#,
            TokenKind::Less => r#""<""#,
            TokenKind::LessEqual => r#""<=""#,
            TokenKind::Plus => r#""+""#,
            TokenKind::PlusEqual => r#""+=""#,
            TokenKind::PlusPlus => r#""++""#,
            TokenKind::Minus => r#""-""#,
            TokenKind::MinusEqual => r#""-=""#,
            TokenKind::MinusMinus => r#""--""#,
            TokenKind::Asterisk => r#""*""#,
            TokenKind::AsteriskEqual => r#""*=""#,
            TokenKind::Slash => r#""/""#,
            TokenKind::SlashEqual => r#""/=""#,
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::And => r#""and""#,
            TokenKind::Break => r#""break""#,
            TokenKind::Case => r#""case""#,
            TokenKind::Default => r#""default""#,
            TokenKind::Else => r#""else""#,
            TokenKind::False => r#""false""#,
            TokenKind::For => r#""for""#,
            TokenKind::Fun => r#""fun""#,
            TokenKind::If => r#""if""#,
            TokenKind::Nil => r#""nil""#,
            TokenKind::Or => r#""or""#,
            TokenKind::Print => r#""print""#,
            TokenKind::Return => r#""return""#,
            TokenKind::Super => r#""super""#,
            TokenKind::Switch => r#""switch""#,
            TokenKind::This => r#""this""#,
            TokenKind::True => r#""true""#,
            TokenKind::Var => r#""var""#,
            TokenKind::While => r#""while""#,
            TokenKind::Eof => "end of file",
            TokenKind::Error => "error",
        };
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = scan(source);
        assert_eq!(errors, vec![]);
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn lex_empty() {
        let (tokens, errors) = scan("");
        assert_eq!(errors, vec![]);
        assert_eq!(
            tokens,
            vec![Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                literal: None,
                span: Span::new(1, 0, 0)
            }]
        );
    }

    #[test]
    fn lex_single_char() {
        use TokenKind::*;
        assert_eq!(
            kinds("(){}[],.:-+;/*"),
            vec![
                LtParen, RtParen, LtBrace, RtBrace, LtBracket, RtBracket, Comma, Dot, Colon,
                Minus, Plus, Semicolon, Slash, Asterisk, Eof
            ]
        );
    }

    #[test]
    fn lex_two_char() {
        use TokenKind::*;
        assert_eq!(
            kinds("!!====>>=<<="),
            vec![Bang, BangEqual, EqualEqual, Equal, Greater, GreaterEqual, Less, LessEqual, Eof]
        );
        assert_eq!(
            kinds("+ += ++ - -= -- * *= / /="),
            vec![
                Plus, PlusEqual, PlusPlus, Minus, MinusEqual, MinusMinus, Asterisk, AsteriskEqual,
                Slash, SlashEqual, Eof
            ]
        );
    }

    #[test]
    fn lex_literals() {
        let (tokens, errors) = scan(r#"test "str" 77 1.5"#);
        assert_eq!(errors, vec![]);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "test");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].lexeme, r#""str""#);
        assert_eq!(tokens[1].literal, Some(Literal::String("str".to_string())));
        assert_eq!(tokens[2].literal, Some(Literal::Number(77.0)));
        assert_eq!(tokens[3].literal, Some(Literal::Number(1.5)));
        assert_eq!(tokens[3].span, Span::new(1, 14, 17));
    }

    #[test]
    fn lex_keywords() {
        use TokenKind::*;
        assert_eq!(
            kinds("var fun switch case default breaks"),
            vec![Var, Fun, Switch, Case, Default, Identifier, Eof]
        );
    }

    #[test]
    fn lex_comment() {
        assert_eq!(kinds("// This is a comment"), vec![TokenKind::Eof]);
        let (tokens, _) = scan(r#""// This is a string""#);
        assert_eq!(tokens[0].literal, Some(Literal::String("// This is a string".to_string())));
    }

    #[test]
    fn lex_lines() {
        let (tokens, _) = scan("a\n\"b\nc\"\n  d\n");
        let lines = tokens.iter().map(|token| token.span.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn lex_invalid_token() {
        let exp = vec![
            Err((
                Error::SyntaxError(SyntaxError::UnexpectedInput { token: "@".to_string() }),
                Span::new(1, 0, 1),
            )),
            Ok(Token {
                kind: TokenKind::Identifier,
                lexeme: "foo".to_string(),
                literal: None,
                span: Span::new(1, 1, 4),
            }),
            Ok(Token {
                kind: TokenKind::Identifier,
                lexeme: "bar".to_string(),
                literal: None,
                span: Span::new(1, 5, 8),
            }),
        ];
        let got = Lexer::new("@foo bar").collect::<Vec<_>>();
        assert_eq!(exp, got);
    }

    #[test]
    fn lex_merges_adjacent_invalid_input() {
        let (tokens, errors) = scan("a @# b");
        assert_eq!(
            errors,
            vec![(
                Error::SyntaxError(SyntaxError::UnexpectedInput { token: "@#".to_string() }),
                Span::new(1, 2, 4)
            )]
        );
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn lex_continues_after_error() {
        let (tokens, errors) = scan("a # b $ c");
        assert_eq!(errors.len(), 2);
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn lex_unterminated_string() {
        let (tokens, errors) = scan("x \"\nfoo");
        assert_eq!(
            errors,
            vec![(Error::SyntaxError(SyntaxError::UnterminatedString), Span::new(1, 2, 7))]
        );
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }
}
