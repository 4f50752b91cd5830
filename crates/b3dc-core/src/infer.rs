//! Return-type inference, delegated to [`b3dc_ast::ctype`] so the parser
//! and the code generator share exactly one shape-inference walk.

use b3dc_ast::ctype::{infer_type, TypeEnv};
use b3dc_ast::expr::Expr;

/// Infers a `FuncDef`'s return type tag from its body and parameter types.
pub fn return_type(body: &Expr, env: &TypeEnv) -> &'static str {
    infer_type(body, env)
}
