//! Tokenizer. Iterator-over-`Token` shape modeled on the teacher's
//! `syntax::lexer`, grammar content replaced per the original source's
//! `lex.c` (ASCII, character-class driven — no `regex`/`lazy_static`, since
//! this grammar is simpler than the Prolog one the teacher tokenizes).

use crate::ops::{self, OpTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokKind<'a> {
    Num(&'a str),
    /// String contents with surrounding quotes stripped; no escape processing.
    Str(&'a str),
    Ident(&'a str),
    Op(OpTag),
    Dollar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Eof,
    /// Unterminated string or otherwise unrecognized character.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokKind<'a>,
    /// True if whitespace (including `;`, which also resets prefix context)
    /// separated this token from the previous one. Load-bearing for the
    /// parser: distinguishes `f/x` from `f / x`.
    pub ws_before: bool,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
    had_whitespace: bool,
    at_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Lexer<'a> {
        Lexer {
            src: text.as_bytes(),
            text,
            pos: 0,
            had_whitespace: false,
            at_start: true,
        }
    }

    fn peek(&self) -> u8 {
        *self.src.get(self.pos).unwrap_or(&0)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    fn skip_space(&mut self) {
        self.had_whitespace = false;
        loop {
            while matches!(self.peek(), b' ' | b'\r' | b'\t' | b'\n') {
                self.advance();
                self.had_whitespace = true;
            }
            if self.peek() == b'/' && (self.had_whitespace || self.at_start) {
                while !self.at_end() && self.peek() != b'\n' {
                    self.advance();
                }
                self.had_whitespace = true;
                continue;
            }
            break;
        }
    }

    fn read_number(&mut self, start: usize) -> TokKind<'a> {
        let started_with_dot = self.src[start] == b'.';
        if started_with_dot {
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        } else {
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            if self.peek() == b'.' {
                self.advance();
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }
        if matches!(self.peek(), b'e' | b'E') {
            let exp_start = self.pos;
            self.advance();
            if matches!(self.peek(), b'+' | b'-') {
                self.advance();
            }
            if self.peek().is_ascii_digit() {
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            } else {
                self.pos = exp_start;
            }
        }
        if matches!(self.peek(), b'w' | b'W') {
            self.advance();
        }
        TokKind::Num(self.slice(start, self.pos))
    }

    fn read_string(&mut self, start: usize) -> TokKind<'a> {
        while !self.at_end() && self.peek() != b'"' {
            self.advance();
        }
        if self.at_end() {
            return TokKind::Error;
        }
        self.advance(); // closing quote
        TokKind::Str(self.slice(start + 1, self.pos - 1))
    }

    fn read_ident(&mut self, start: usize) -> TokKind<'a> {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }
        let text = self.slice(start, self.pos);
        match ops::tag_for_ident(text) {
            Some(tag) => TokKind::Op(tag),
            None => TokKind::Ident(text),
        }
    }

    /// Produces the next token. Called repeatedly by the `Iterator` impl.
    fn scan(&mut self) -> Token<'a> {
        self.skip_space();
        let ws_before = self.had_whitespace;
        self.at_start = false;
        let start = self.pos;
        if self.at_end() {
            return Token {
                kind: TokKind::Eof,
                ws_before,
            };
        }
        let c = self.advance();
        let kind = if c.is_ascii_digit() {
            self.read_number(start)
        } else if c == b'.' && self.peek().is_ascii_digit() {
            self.read_number(start)
        } else if c == b'"' {
            self.read_string(start)
        } else if c.is_ascii_alphabetic() {
            self.read_ident(start)
        } else {
            match c {
                b'(' => TokKind::LParen,
                b')' => TokKind::RParen,
                b'[' => TokKind::LBracket,
                b']' => TokKind::RBracket,
                b'{' => TokKind::LBrace,
                b'}' => TokKind::RBrace,
                b'$' => TokKind::Dollar,
                b';' => {
                    self.had_whitespace = true;
                    TokKind::Semicolon
                }
                b'/' if self.peek() == b':' => {
                    self.advance();
                    TokKind::Op(OpTag::EachRight)
                }
                b'\\' if self.peek() == b':' => {
                    self.advance();
                    TokKind::Op(OpTag::EachLeft)
                }
                _ => match ops::tag_for_char(c as char) {
                    Some(tag) => TokKind::Op(tag),
                    None => TokKind::Error,
                },
            }
        };
        Token { kind, ws_before }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let tok = self.scan();
        if tok.kind == TokKind::Eof {
            None
        } else {
            Some(tok)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(src: &str) -> Vec<TokKind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(
            kinds("1 2 3 + 10"),
            vec![
                TokKind::Num("1"),
                TokKind::Num("2"),
                TokKind::Num("3"),
                TokKind::Op(OpTag::Plus),
                TokKind::Num("10"),
            ]
        );
    }

    #[test]
    fn ws_before_distinguishes_divide_from_over() {
        let a: Vec<_> = Lexer::new("f/x").map(|t| t.ws_before).collect();
        assert_eq!(a, vec![false, false, false]);
        let b: Vec<_> = Lexer::new("f / x").map(|t| t.ws_before).collect();
        assert_eq!(b, vec![false, true, true]);
    }

    #[test]
    fn string_literal_strips_quotes() {
        assert_eq!(kinds("\"hi\""), vec![TokKind::Str("hi")]);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(kinds("\"hi"), vec![TokKind::Error]);
    }

    #[test]
    fn comment_to_end_of_line() {
        assert_eq!(
            kinds("1 / this is a comment\n2"),
            vec![TokKind::Num("1"), TokKind::Num("2")]
        );
    }

    #[test]
    fn sin_cos_abs_are_op_tokens() {
        assert_eq!(
            kinds("sin cos abs"),
            vec![
                TokKind::Op(OpTag::Sin),
                TokKind::Op(OpTag::Cos),
                TokKind::Op(OpTag::Abs)
            ]
        );
    }

    #[test]
    fn each_right_and_left() {
        assert_eq!(
            kinds("f/:x"),
            vec![
                TokKind::Ident("f"),
                TokKind::Op(OpTag::EachRight),
                TokKind::Ident("x")
            ]
        );
        assert_eq!(
            kinds("f\\:x"),
            vec![
                TokKind::Ident("f"),
                TokKind::Op(OpTag::EachLeft),
                TokKind::Ident("x")
            ]
        );
    }

    #[test]
    fn semicolon_resets_whitespace() {
        let toks: Vec<_> = Lexer::new("a;-1").collect();
        assert_eq!(toks[1].kind, TokKind::Op(OpTag::Minus));
        assert!(toks[1].ws_before);
    }

    #[test]
    fn number_with_exponent_and_infinity_suffix() {
        assert_eq!(
            kinds("1.5e10 0w 3w"),
            vec![TokKind::Num("1.5e10"), TokKind::Num("0w"), TokKind::Num("3w")]
        );
    }

    #[test]
    fn bad_exponent_backtracks() {
        // "1e" with no following digits is not a valid exponent; the trailing
        // 'e' must NOT be consumed as part of the number.
        assert_eq!(
            kinds("1e x"),
            vec![
                TokKind::Num("1"),
                TokKind::Ident("e"),
                TokKind::Ident("x")
            ]
        );
    }
}
