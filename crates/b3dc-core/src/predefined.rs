//! Fixed lookup tables the lexer consults: keyword recognition for plain
//! identifiers and the LaTeX backslash-escape table.

use crate::token::TokenKind;

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "where" => TokenKind::Where,
    "let" => TokenKind::Let,
    "in" => TokenKind::In,
    "if" => TokenKind::If,
    "then" => TokenKind::Then,
    "else" => TokenKind::Else,
    "sin" => TokenKind::Sin,
    "cos" => TokenKind::Cos,
    "tan" => TokenKind::Tan,
    "abs" => TokenKind::Abs,
    "floor" => TokenKind::Floor,
    "min" => TokenKind::Min,
    "max" => TokenKind::Max,
    "clamp" => TokenKind::Clamp,
};

/// Looks up an identifier's lowercased text as a keyword.
pub fn keyword(lowercased: &str) -> Option<TokenKind> {
    KEYWORDS.get(lowercased).copied()
}

static LATEX_ESCAPES: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "sum" => TokenKind::Sum,
    "in" => TokenKind::In,
    "cdot" => TokenKind::Dot,
    "dot" => TokenKind::Dot,
    "times" => TokenKind::Cross,
    "cross" => TokenKind::Cross,
    "sqrt" => TokenKind::Sqrt,
    "norm" => TokenKind::NormDelim,
    "T" => TokenKind::Transpose,
    "transpose" => TokenKind::Transpose,
    "theta" => TokenKind::Theta,
    "pi" => TokenKind::Pi,
    "epsilon" => TokenKind::Epsilon,
    "eps" => TokenKind::Epsilon,
    "delta" => TokenKind::Delta,
    "R" => TokenKind::RealType,
    "Real" => TokenKind::RealType,
    "Z" => TokenKind::IntType,
    "Int" => TokenKind::IntType,
};

/// Looks up a LaTeX escape name (the text after `\`, case-sensitive).
pub fn latex_escape(name: &str) -> Option<TokenKind> {
    LATEX_ESCAPES.get(name).copied()
}
