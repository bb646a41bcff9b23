//! Lexical analysis for the expression language.
//!
//! A hand-rolled, position-tracking scanner (character-at-a-time,
//! `peek`/`advance`/`match_char`) that is fail-fast rather than
//! error-tolerant: the first unscannable character or unterminated string
//! raises `UnexpectedToken` immediately rather than accumulating
//! diagnostics and continuing. This language has no notion of "keep going
//! after a syntax error" the way a statement-level grammar does.

pub mod token;

use crate::diag::Diag;
use token::{Token, TokenKind};

/// Result of tokenizing a single token: either the token, or a diagnostic.
pub type LexResult<T> = Result<T, Box<Diag>>;

/// A lexical analyzer for expression source text.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Scans and returns the entire token stream, including a trailing EOF.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            if self.is_at_end() {
                let eof_pos = self.source.len();
                tokens.push(Token::new(TokenKind::Eof, "", eof_pos..eof_pos));
                return Ok(tokens);
            }
            tokens.push(self.scan_token()?);
        }
    }

    fn scan_token(&mut self) -> LexResult<Token> {
        let start = self.pos;
        let ch = self.advance();

        let kind = match ch {
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '$' => TokenKind::Dollar,
            '@' => TokenKind::At,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '?' => TokenKind::Question,
            '=' => TokenKind::Equals,
            '!' => {
                if self.match_char('=') {
                    TokenKind::NotEquals
                } else {
                    return Err(self.unexpected(start, "!"));
                }
            }
            '<' => {
                if self.match_char('>') {
                    TokenKind::NotEquals
                } else if self.match_char('=') {
                    TokenKind::LessOrEquals
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::GreaterOrEquals
                } else {
                    TokenKind::Greater
                }
            }
            '\'' | '"' => return self.scan_string(start, ch),
            '0'..='9' => return Ok(self.scan_number(start)),
            c if is_identifier_start(c) => return Ok(self.scan_word(start)),
            other => return Err(self.unexpected(start, &other.to_string())),
        };

        let text = &self.source[start..self.pos];
        Ok(Token::new(kind, text, start..self.pos))
    }

    fn scan_word(&mut self, start: usize) -> Token {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        Token::new(TokenKind::Word(text.into()), text, start..self.pos)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_double = false;

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_double = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let save = self.pos;
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            if self.peek().is_ascii_digit() {
                is_double = true;
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            } else {
                self.pos = save;
            }
        }

        let text = &self.source[start..self.pos];
        let kind = if is_double {
            TokenKind::Double(text.into())
        } else {
            TokenKind::Int(text.into())
        };
        Token::new(kind, text, start..self.pos)
    }

    fn scan_string(&mut self, start: usize, quote: char) -> LexResult<Token> {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.unterminated_string(start));
            }
            let c = self.peek();
            if c == quote {
                self.advance();
                break;
            }
            if c == '\\' {
                self.advance();
                if self.is_at_end() {
                    return Err(self.unterminated_string(start));
                }
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\'' => '\'',
                    '"' => '"',
                    '\\' => '\\',
                    other => other,
                });
            } else {
                value.push(self.advance());
            }
        }
        Ok(Token::new(TokenKind::String(value.into()), "", start..self.pos))
    }

    fn skip_whitespace_and_comments(&mut self) -> LexResult<()> {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == '*' => {
                    let comment_start = self.pos;
                    self.advance();
                    self.advance();
                    let mut depth = 1usize;
                    while depth > 0 {
                        if self.is_at_end() {
                            return Err(Box::new(
                                Diag::error("unclosed comment")
                                    .with_primary_label(comment_start..self.pos, "here")
                                    .with_code("UnexpectedToken"),
                            ));
                        }
                        if self.peek() == '/' && self.peek_next() == '*' {
                            self.advance();
                            self.advance();
                            depth += 1;
                        } else if self.peek() == '*' && self.peek_next() == '/' {
                            self.advance();
                            self.advance();
                            depth -= 1;
                        } else {
                            self.advance();
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn unexpected(&self, start: usize, text: &str) -> Box<Diag> {
        Box::new(
            Diag::error(format!("unexpected character '{text}'"))
                .with_primary_label(start..self.pos.max(start + 1), "here")
                .with_code("UnexpectedToken"),
        )
    }

    fn unterminated_string(&self, start: usize) -> Box<Diag> {
        Box::new(
            Diag::error("unterminated string literal")
                .with_primary_label(start..self.source.len(), "here")
                .with_code("UnexpectedToken"),
        )
    }

    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let ch = self.peek();
        if ch != '\0' {
            self.pos += ch.len_utf8();
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Convenience function to tokenize a source string end to end.
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].position, 0);
    }

    #[test]
    fn integers_and_doubles() {
        let tokens = tokenize("42 5.0 5.001 1e10 2.5E-3").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int("42".into()));
        assert_eq!(tokens[1].kind, TokenKind::Double("5.0".into()));
        assert_eq!(tokens[2].kind, TokenKind::Double("5.001".into()));
        assert_eq!(tokens[3].kind, TokenKind::Double("1e10".into()));
        assert_eq!(tokens[4].kind, TokenKind::Double("2.5E-3".into()));
    }

    #[test]
    fn words_include_keywords_and_identifiers() {
        let tokens = tokenize("AND foo_bar").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Word("AND".into()));
        assert_eq!(tokens[1].kind, TokenKind::Word("foo_bar".into()));
    }

    #[test]
    fn string_literals_both_quote_styles() {
        let tokens = tokenize(r#"'hello' "world""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String("hello".into()));
        assert_eq!(tokens[1].kind, TokenKind::String("world".into()));
    }

    #[test]
    fn string_with_escapes() {
        let tokens = tokenize(r#"'a\nb' 'it\'s'"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String("a\nb".into()));
        assert_eq!(tokens[1].kind, TokenKind::String("it's".into()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("'oops").unwrap_err();
        assert_eq!(err.code.as_deref(), Some("UnexpectedToken"));
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = tokenize("#").unwrap_err();
        assert_eq!(err.code.as_deref(), Some("UnexpectedToken"));
    }

    #[test]
    fn operators() {
        let tokens = tokenize("= != <> > >= < <=").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Equals);
        assert_eq!(tokens[1].kind, TokenKind::NotEquals);
        assert_eq!(tokens[2].kind, TokenKind::NotEquals);
        assert_eq!(tokens[3].kind, TokenKind::Greater);
        assert_eq!(tokens[4].kind, TokenKind::GreaterOrEquals);
        assert_eq!(tokens[5].kind, TokenKind::Less);
        assert_eq!(tokens[6].kind, TokenKind::LessOrEquals);
    }

    #[test]
    fn nested_block_comments_are_skipped() {
        let tokens = tokenize("1 /* a /* b */ c */ + 2").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int("1".into()));
        assert_eq!(tokens[1].kind, TokenKind::Plus);
        assert_eq!(tokens[2].kind, TokenKind::Int("2".into()));
    }

    #[test]
    fn eof_position_equals_input_length() {
        let tokens = tokenize("$.a").unwrap();
        assert_eq!(tokens.last().unwrap().position, 3);
    }
}
