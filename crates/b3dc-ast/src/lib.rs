//! AST types and the C code generator for the b3d math DSL.
//!
//! ```
//! use b3dc_ast::expr::{Expr, FuncDef, Param};
//! use b3dc_ast::codegen::{emit_function, Mode};
//!
//! let func = FuncDef {
//!     name: "identity".to_string(),
//!     params: vec![Param { name: "x".to_string(), type_tag: "scalar".to_string() }],
//!     return_type: "scalar".to_string(),
//!     body: Expr::Variable("x".to_string()),
//! };
//! let c_source = emit_function(&func, Mode::Float, "");
//! assert!(c_source.starts_with("static inline float b3d_identity("));
//! ```

pub mod codegen;
pub mod ctype;
pub mod expr;
pub mod subst;

pub use codegen::{emit_function, Mode};
pub use ctype::{c_type_for_tag, infer_type, is_scalar, TypeEnv};
pub use expr::{BinOp, Expr, FuncDef, Param, RangeDesc, UnaryOp};
