//! Lexer, parser, and driver for the b3d math DSL compiler.
//!
//! The pipeline is a pure function from `(source text, mode, suffix)` to
//! generated C text: [`lexer::lex`] tokenizes, [`parse::parse`] builds the
//! typed AST (delegating to `b3dc-ast` for the `Expr`/`FuncDef` types and
//! [`infer`] for return-type inference), and [`compile`] drives both stages
//! plus `b3dc-ast`'s code generator and stitches the result into the
//! header-comment-plus-functions shape the driver is expected to emit.
//!
//! ```
//! use b3dc_core::{compile, CompilerConfig};
//!
//! let source = "dot3(a, b) = ∑(i∈xyz) a_i · b_i where a ∈ ℝ³ b ∈ ℝ³";
//! let config = CompilerConfig::default();
//! let c_source = compile(source, "math.dsl", &config).unwrap();
//! assert!(c_source.contains("static inline float b3d_dot3("));
//! ```

pub mod character_class;
pub mod config;
pub mod error;
pub mod infer;
pub mod lexer;
pub mod parse;
pub mod predefined;
pub mod token;

pub use b3dc_ast::codegen::Mode;
pub use b3dc_ast::expr::FuncDef;

pub use config::CompilerConfig;
pub use error::{CompileErrKind, CompileError};
pub use lexer::lex;
pub use parse::parse;
pub use token::{Token, TokenKind};

/// Runs the full pipeline — lex, parse, generate — over `source`, producing
/// the complete `.inc` text: a header comment naming `source_name` and
/// `config.mode`, followed by one `static inline` C function per
/// definition, each separated by a blank line.
pub fn compile(source: &str, source_name: &str, config: &CompilerConfig) -> Result<String, CompileError> {
    let tokens = lexer::lex(source);
    let funcs = parse::parse(&tokens)?;
    Ok(render_program(&funcs, source_name, config))
}

/// Renders an already-parsed function list into the driver's output shape.
/// Split out from [`compile`] so the CLI's `--debug` path can parse once and
/// reuse the same `Vec<FuncDef>` for both the summary dump and the emitted C.
pub fn render_program(funcs: &[FuncDef], source_name: &str, config: &CompilerConfig) -> String {
    let mut out = header_comment(source_name, config.mode);
    out.push('\n');
    let bodies: Vec<String> = funcs
        .iter()
        .map(|f| b3dc_ast::codegen::emit_function(f, config.mode, &config.suffix))
        .collect();
    out.push_str(&bodies.join("\n"));
    if !bodies.is_empty() {
        out.push('\n');
    }
    out
}

fn header_comment(source_name: &str, mode: Mode) -> String {
    format!(
        "/* Auto-generated from {source_name} — {} arithmetic. Do not edit by hand. */\n",
        mode.label()
    )
}
