//! Converts DSL source text into a flat token stream. Purely functional
//! over its own position/line/column/depth state; never fails — characters
//! it does not recognize are silently skipped.

use std::str::CharIndices;

use crate::character_class::{is_identifier_start, subscript_ascii, superscript_ascii};
use crate::predefined::{keyword, latex_escape};
use crate::token::{Token, TokenKind};

/// Lexes `source` into a token list terminated by an [`TokenKind::Eoi`] token.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'s> {
    chars: CharIndices<'s>,
    peek: Option<(usize, char)>,
    line: u32,
    col: u32,
    bracket_depth: i32,
    paren_depth: i32,
}

/// Unicode math symbols that each emit their own distinct token kind,
/// lexed as a single code point.
const SINGLE_CHAR_SYMBOLS: &[char] = &[
    '·', '⋅', '×', '‖', '√', '∑', '∈', 'ᵀ', 'θ', 'π', 'ε', 'δ', 'ℝ', 'ℤ',
];

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        let mut chars = source.char_indices();
        let peek = chars.next();
        Lexer {
            chars,
            peek,
            line: 1,
            col: 1,
            bracket_depth: 0,
            paren_depth: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let current = self.peek.map(|(_, c)| c);
        self.peek = self.chars.next();
        if let Some(ch) = current {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        current
    }

    fn peek_char(&self) -> Option<char> {
        self.peek.map(|(_, c)| c)
    }

    fn peek_next_char(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn run(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let (line, col) = (self.line, self.col);
            match self.peek_char() {
                None => {
                    out.push(Token::new(TokenKind::Eoi, "", line, col));
                    break;
                }
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.peek_char(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('\n') => {
                    self.advance();
                    if self.bracket_depth == 0 && self.paren_depth == 0 {
                        out.push(Token::new(TokenKind::Newline, "\n", line, col));
                    }
                }
                Some(c) if SINGLE_CHAR_SYMBOLS.contains(&c) => self.lex_single(&mut out, c, line, col),
                Some(c) if c.is_ascii_digit() => self.lex_number(&mut out, line, col),
                Some(c) if is_identifier_start(c) => self.lex_identifier(&mut out, line, col),
                Some('\\') => self.lex_escape(&mut out, line, col),
                Some(c) if subscript_ascii(c).is_some() => {
                    self.advance();
                    out.push(Token::new(TokenKind::Subscript, subscript_ascii(c).expect("checked above"), line, col));
                }
                Some(c) if superscript_ascii(c).is_some() => self.lex_superscript_run(&mut out, line, col),
                Some('^') => self.lex_caret_superscript(&mut out, line, col),
                Some('.') => self.lex_dot_or_range(&mut out, line, col),
                Some('-') => self.lex_minus_or_arrow(&mut out, line, col),
                Some('|') => self.lex_pipe_or_norm(&mut out, line, col),
                Some('<') => self.lex_lt(&mut out, line, col),
                Some('>') => self.lex_gt(&mut out, line, col),
                Some(c) => self.lex_single(&mut out, c, line, col),
            }
        }
        out
    }

    fn lex_number(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek_char() == Some('.') && self.peek_next_char() != Some('.') {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        out.push(Token::new(TokenKind::Number, text, line, col));
    }

    fn lex_identifier(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        let mut text = String::new();
        text.push(self.advance().expect("checked by caller"));
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else if let Some(ascii) = subscript_ascii(c) {
                text.push('_');
                text.push_str(ascii);
                self.advance();
            } else {
                break;
            }
        }
        let lowered = text.to_lowercase();
        let kind = keyword(&lowered).unwrap_or(TokenKind::Identifier);
        out.push(Token::new(kind, text, line, col));
    }

    fn lex_escape(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance(); // the backslash
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphabetic() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match latex_escape(&name) {
            Some(kind) => out.push(Token::new(kind, name, line, col)),
            None => out.push(Token::new(TokenKind::Identifier, name, line, col)),
        }
    }

    fn lex_superscript_run(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            match superscript_ascii(c) {
                Some(ascii) => {
                    text.push_str(ascii);
                    self.advance();
                }
                None => break,
            }
        }
        out.push(Token::new(TokenKind::Superscript, text, line, col));
    }

    fn lex_caret_superscript(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance(); // the '^'
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == 'x' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if !text.is_empty() {
            out.push(Token::new(TokenKind::Superscript, text, line, col));
        }
    }

    fn lex_dot_or_range(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance(); // the first '.'
        if self.peek_char() == Some('.') {
            self.advance();
            out.push(Token::new(TokenKind::Range, "..", line, col));
        } else {
            out.push(Token::new(TokenKind::Dot, ".", line, col));
        }
    }

    fn lex_minus_or_arrow(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance(); // the '-'
        if self.peek_char() == Some('>') {
            self.advance();
            out.push(Token::new(TokenKind::Arrow, "->", line, col));
        } else {
            out.push(Token::new(TokenKind::Minus, "-", line, col));
        }
    }

    fn lex_pipe_or_norm(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance(); // the '|'
        if self.peek_char() == Some('|') {
            self.advance();
            out.push(Token::new(TokenKind::NormDelim, "||", line, col));
        } else {
            out.push(Token::new(TokenKind::Pipe, "|", line, col));
        }
    }

    fn lex_lt(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance();
        if self.peek_char() == Some('=') {
            self.advance();
            out.push(Token::new(TokenKind::Le, "<=", line, col));
        } else {
            out.push(Token::new(TokenKind::Lt, "<", line, col));
        }
    }

    fn lex_gt(&mut self, out: &mut Vec<Token>, line: u32, col: u32) {
        self.advance();
        if self.peek_char() == Some('=') {
            self.advance();
            out.push(Token::new(TokenKind::Ge, ">=", line, col));
        } else {
            out.push(Token::new(TokenKind::Gt, ">", line, col));
        }
    }

    fn lex_single(&mut self, out: &mut Vec<Token>, c: char, line: u32, col: u32) {
        self.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '·' | '⋅' => TokenKind::Dot,
            '×' => TokenKind::Cross,
            '‖' => TokenKind::NormDelim,
            '√' => TokenKind::Sqrt,
            '∑' => TokenKind::Sum,
            '∈' => TokenKind::In,
            'ᵀ' => TokenKind::Transpose,
            'θ' => TokenKind::Theta,
            'π' => TokenKind::Pi,
            'ε' => TokenKind::Epsilon,
            'δ' => TokenKind::Delta,
            'ℝ' => TokenKind::RealType,
            'ℤ' => TokenKind::IntType,
            '(' => {
                self.paren_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.paren_depth -= 1;
                TokenKind::RParen
            }
            '[' => {
                self.bracket_depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.bracket_depth -= 1;
                TokenKind::RBracket
            }
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Equals,
            _ => return, // unrecognized character: silently skipped, per §4.1
        };
        out.push(Token::new(kind, c.to_string(), line, col));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_suppressed_inside_brackets() {
        let tokens = lex("[1,\n2]");
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::Newline));
    }

    #[test]
    fn newline_emitted_outside_brackets() {
        let tokens = lex("a\nb");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Newline));
    }

    #[test]
    fn subscript_identifier_rewrite() {
        let tokens = lex("a_i");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "a_i");
    }

    #[test]
    fn dot_product_unicode_vs_ascii_field_access_share_kind_but_differ_in_text() {
        let tokens = lex("a·b");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[1].text, "·");
        let tokens = lex("a.b");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[1].text, ".");
    }

    #[test]
    fn latex_escape_unknown_degrades_to_identifier() {
        let tokens = lex(r"\nope");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "nope");
    }

    #[test]
    fn range_operator_not_confused_with_number_dot() {
        let tokens = lex("0..4");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "0");
        assert_eq!(tokens[1].kind, TokenKind::Range);
    }

    #[test]
    fn line_and_column_point_at_first_code_point() {
        let tokens = lex("a\n  b");
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.line, 2);
        assert_eq!(b.col, 3);
    }
}
