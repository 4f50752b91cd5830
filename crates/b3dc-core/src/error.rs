//! Compile-time error type. Parsing is the only stage that can fail:
//! the lexer has no error token, and the generator never rejects input.

use std::fmt;

use strum_macros::IntoStaticStr;

use crate::token::TokenKind;

/// An error raised while parsing a token stream into `FuncDef`s.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub line: u32,
    pub col: u32,
    pub kind: CompileErrKind,
}

#[derive(Debug, Clone, IntoStaticStr)]
pub enum CompileErrKind {
    ExpectedToken {
        expected: &'static str,
        got: &'static str,
        text: String,
    },
    /// An invariant the parser believes cannot be violated.
    Internal,
}

impl CompileErrKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            CompileErrKind::ExpectedToken { expected, got, text } => {
                format!("expected {expected}, got {got} (\"{text}\")")
            }
            CompileErrKind::Internal => {
                "internal compiler error: an invariant the parser relies on was violated".to_string()
            }
        }
    }
}

impl CompileError {
    pub fn expected(expected: &'static str, got_kind: TokenKind, got_text: &str, line: u32, col: u32) -> Self {
        CompileError {
            line,
            col,
            kind: CompileErrKind::ExpectedToken {
                expected,
                got: got_kind.into(),
                text: got_text.to_string(),
            },
        }
    }

    pub fn internal(line: u32, col: u32) -> Self {
        CompileError {
            line,
            col,
            kind: CompileErrKind::Internal,
        }
    }

    pub fn error_message(&self) -> String {
        self.kind.string()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.kind.string())
    }
}

impl std::error::Error for CompileError {}

#[cfg(feature = "ariadne")]
impl CompileError {
    /// Converts this error into an [`ariadne::Report`] for pretty-printing.
    ///
    /// Token spans are line/column, not byte offsets, so the offending
    /// token is located by re-scanning `source` for its line and column
    /// rather than by carrying a byte range through the parser.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        source: &str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, std::ops::Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let offset = byte_offset_for(source, self.line, self.col);
        let span = offset..(offset + 1).min(source.len().max(offset + 1));

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, span.clone()))
            .with_config(config)
            .with_message(self.kind.string())
            .with_label(Label::new((source_name, span)).with_message(self.kind.string()))
            .finish()
    }
}

#[cfg(feature = "ariadne")]
fn byte_offset_for(source: &str, line: u32, col: u32) -> usize {
    let mut line_start = 0usize;
    let mut cur_line = 1u32;
    if line > 1 {
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                cur_line += 1;
                if cur_line == line {
                    line_start = idx + 1;
                    break;
                }
            }
        }
    }
    let mut cur_col = 1u32;
    for (idx, ch) in source[line_start..].char_indices() {
        if cur_col == col {
            return line_start + idx;
        }
        if ch == '\n' {
            break;
        }
        cur_col += 1;
    }
    line_start
}
