//! C type mapping and the shared shape/return-type inference used by both
//! return-type computation and operator lowering.

use rustc_hash::FxHashMap;

use crate::expr::Expr;

/// Maps a variable name to the textual type tag it was declared or inferred
/// with — either a raw parameter tag (`"ℝ4"`, `"ℝ4x4"`, `"ℤ"`, …) or one of
/// the three canonical inference results (`"scalar"`, `"vec4"`, `"mat4"`).
pub type TypeEnv = FxHashMap<String, String>;

/// Maps a textual type tag to its C type name.
///
/// Superscripts reach this tag as the lexer's ASCII rewrite (`subscript_ascii`/
/// `superscript_ascii` in `b3dc-core`), not the original Unicode code points —
/// `parse_type` builds tags like `"ℝ3"`, `"ℝ4"`, `"ℝ4x4"` (ℝ/ℤ plus ASCII
/// digits/`x`), never `"ℝ³"`. `scalar|ℝ|ℝ1` → `float` (fixed-point values are
/// still carried as `float` at the C-type level; only arithmetic lowering
/// differs). `ℝ3|ℝ4|vec3|vec4` → `b3d_vec_t`. `ℝ4x4|mat4` → `b3d_mat_t`.
/// `ℤ|int` → `int`. Anything else falls back to `float`.
pub fn c_type_for_tag(tag: &str) -> &'static str {
    match tag {
        "scalar" | "ℝ" | "ℝ1" => "float",
        "ℝ3" | "ℝ4" | "vec3" | "vec4" => "b3d_vec_t",
        "ℝ4x4" | "mat4" => "b3d_mat_t",
        "ℤ" | "int" => "int",
        _ => "float",
    }
}

/// Infers the shape of an expression: `"scalar"`, `"vec4"`, or `"mat4"`.
///
/// This single walk serves three purposes in the pipeline: computing a
/// `FuncDef`'s return type, picking the C type for a peeled `let`
/// declaration, and deciding whether a `dot`/`cross` operator lowers to a
/// scalar multiply or a `b3d_vec_*` call (see `codegen::lower_binop`).
pub fn infer_type(expr: &Expr, env: &TypeEnv) -> &'static str {
    match expr {
        Expr::Matrix(_) => "mat4",
        Expr::Vector(_) | Expr::Comprehension(..) => "vec4",
        Expr::Sum(..) | Expr::Norm(_) => "scalar",
        Expr::If(_, t, f) => {
            let then_ty = infer_type(t, env);
            if then_ty != "scalar" {
                then_ty
            } else {
                infer_type(f, env)
            }
        }
        Expr::Let(_, body) => infer_type(body, env),
        Expr::Variable(name) => match env.get(name).map(String::as_str) {
            Some("ℝ4") | Some("ℝ3") | Some("vec4") | Some("vec3") => "vec4",
            Some("ℝ4x4") | Some("mat4") => "mat4",
            _ => "scalar",
        },
        Expr::Call(name, _) => {
            if matches!(name.as_str(), "vec_dot" | "vec_length" | "vec_length_sq") {
                "scalar"
            } else if let Some(rest) = name.strip_prefix("mat_") {
                if rest.contains("vec") {
                    "vec4"
                } else {
                    "mat4"
                }
            } else if name.starts_with("vec_") {
                "vec4"
            } else {
                "scalar"
            }
        }
        _ => "scalar",
    }
}

/// Whether `expr` is scalar-shaped — used to decide `dot`/`cross` lowering.
pub fn is_scalar(expr: &Expr, env: &TypeEnv) -> bool {
    infer_type(expr, env) == "scalar"
}
