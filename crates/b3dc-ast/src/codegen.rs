//! Lowers a [`FuncDef`] to a complete `static inline` C function definition.

use rustc_hash::FxHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ctype::{c_type_for_tag, infer_type, is_scalar, TypeEnv};
use crate::expr::{BinOp, Expr, FuncDef, RangeDesc, UnaryOp};
use crate::subst::{cleanup, whole_word_replace};

/// The arithmetic lowering target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Mode {
    #[default]
    Float,
    Fixed,
}

impl Mode {
    /// The name used in the generated header comment.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Float => "floating-point",
            Mode::Fixed => "fixed-point",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(Mode::Float),
            "fixed" => Ok(Mode::Fixed),
            other => Err(format!("unknown mode \"{other}\" (expected \"float\" or \"fixed\")")),
        }
    }
}

/// Whether a call argument's numeric-literal children should drop their
/// fractional part and `f` suffix. Carried explicitly through the call
/// chain rather than as process-wide mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntContext {
    Default,
    Integer,
}

/// Emits one complete C function definition for `func` in the given `mode`,
/// with `suffix` appended to the function name and every runtime helper
/// call it makes.
pub fn emit_function(func: &FuncDef, mode: Mode, suffix: &str) -> String {
    let mut env: TypeEnv = FxHashMap::default();
    for p in &func.params {
        env.insert(p.name.clone(), p.type_tag.clone());
    }
    let ret_ctype = c_type_for_tag(&func.return_type);
    let params_text = func
        .params
        .iter()
        .map(|p| format!("{} {}", c_type_for_tag(&p.type_tag), p.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!(
        "static inline {ret_ctype} b3d_{name}{suffix}({params_text}) {{\n",
        name = func.name,
    );
    for line in shape_body(&func.body, &mut env, mode, suffix, 1) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

/// Produces the statement lines for a body position: peels `let` bindings
/// into declarations, lowers a conditional to a block `if`/`else` when
/// either branch needs one, and otherwise returns a single expression
/// (plain, or a ternary when the body is itself a conditional).
fn shape_body(expr: &Expr, env: &mut TypeEnv, mode: Mode, suffix: &str, indent: usize) -> Vec<String> {
    let pad = "    ".repeat(indent);
    match expr {
        Expr::Let(bindings, body) => {
            let mut lines = Vec::new();
            for (name, value) in bindings {
                let ty = infer_type(value, env);
                let ctype = c_type_for_tag(ty);
                let value_text = render(value, env, mode, suffix);
                lines.push(format!("{pad}{ctype} {name} = {value_text};"));
                env.insert(name.clone(), ty.to_string());
            }
            lines.extend(shape_body(body, env, mode, suffix, indent));
            lines
        }
        Expr::If(cond, t, f) if t.branch_needs_block() || f.branch_needs_block() => {
            let cond_text = render(cond, env, mode, suffix);
            let mut lines = vec![format!("{pad}if ({cond_text}) {{")];
            let mut then_env = env.clone();
            lines.extend(shape_body(t, &mut then_env, mode, suffix, indent + 1));
            lines.push(format!("{pad}}} else {{"));
            let mut else_env = env.clone();
            lines.extend(shape_body(f, &mut else_env, mode, suffix, indent + 1));
            lines.push(format!("{pad}}}"));
            lines
        }
        Expr::If(cond, t, f) => {
            vec![format!(
                "{pad}return ({});",
                render_ternary(cond, t, f, env, mode, suffix)
            )]
        }
        other => vec![format!("{pad}return {};", render(other, env, mode, suffix))],
    }
}

fn render_ternary(cond: &Expr, t: &Expr, f: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    format!(
        "{} ? {} : {}",
        render(cond, env, mode, suffix),
        render_ternary_branch(t, env, mode, suffix),
        render_ternary_branch(f, env, mode, suffix),
    )
}

fn render_ternary_branch(expr: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    match expr {
        Expr::If(c, t, f) => format!("({})", render_ternary(c, t, f, env, mode, suffix)),
        other => render(other, env, mode, suffix),
    }
}

/// Renders any expression to C text.
fn render(expr: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    match expr {
        Expr::Number(text) => render_number(text, IntContext::Default),
        Expr::Variable(name) => render_variable(name, mode, suffix),
        Expr::BinOp(op, l, r) => render_binop(*op, l, r, env, mode, suffix),
        Expr::Unary(op, operand) => render_unary(*op, operand, env, mode, suffix),
        Expr::Call(name, args) => render_call(name, args, env, mode, suffix),
        Expr::Index(base, idx) => render_index(base, idx, env, mode, suffix),
        Expr::MatrixIndex(base, row, col) => render_matrix_index(base, row, col, env, mode, suffix),
        Expr::DotAccess(base, field) => format!("{}.{field}", render(base, env, mode, suffix)),
        Expr::Sum(var, range, body) => render_sum(var, range, body, env, mode, suffix),
        Expr::Norm(operand) => format!("b3d_vec_length{suffix}({})", render(operand, env, mode, suffix)),
        Expr::Vector(elems) => render_vector(elems, env, mode, suffix),
        Expr::Comprehension(body, var, range) => render_comprehension(body, var, range, env, mode, suffix),
        Expr::Matrix(rows) => render_matrix(rows, env, mode, suffix),
        Expr::Let(bindings, body) => render_nested_let(bindings, body, env, mode, suffix),
        Expr::If(c, t, f) => format!("({})", render_ternary(c, t, f, env, mode, suffix)),
    }
}

fn render_number(text: &str, int_ctx: IntContext) -> String {
    match int_ctx {
        IntContext::Integer => text.split('.').next().unwrap_or(text).to_string(),
        IntContext::Default if text.contains('.') => format!("{text}f"),
        IntContext::Default => format!("{text}.0f"),
    }
}

fn render_variable(name: &str, mode: Mode, suffix: &str) -> String {
    match (name, mode) {
        ("PI", Mode::Float) => "B3D_PI".to_string(),
        ("PI", Mode::Fixed) => "B3D_FP_PI".to_string(),
        ("EPSILON", Mode::Float) => "B3D_EPSILON".to_string(),
        ("EPSILON", Mode::Fixed) => "B3D_FP_EPSILON".to_string(),
        ("ZERO", Mode::Float) => "0.0f".to_string(),
        ("ZERO", Mode::Fixed) => "0".to_string(),
        ("ONE", Mode::Float) => "1.0f".to_string(),
        ("ONE", Mode::Fixed) => "B3D_FP_ONE".to_string(),
        ("I", _) => format!("b3d_mat_ident{suffix}()"),
        _ => name.to_string(),
    }
}

fn render_unary(op: UnaryOp, operand: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let inner = render(operand, env, mode, suffix);
    match op {
        UnaryOp::Neg => format!("-({inner})"),
        UnaryOp::Transpose => format!("b3d_mat_transpose{suffix}({inner})"),
    }
}

/// Lowers a binary operator. `dot`/`cross` between two scalar-shaped
/// operands degrade to ordinary multiplication (mode-aware); between
/// vector-shaped operands they become `b3d_vec_dot`/`b3d_vec_cross` calls
/// regardless of mode. See DESIGN.md for why this shape check is needed.
fn render_binop(op: BinOp, l: &Expr, r: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    use BinOp::*;
    match op {
        Lt | Gt | Le | Ge => format!(
            "({} {} {})",
            render(l, env, mode, suffix),
            cmp_symbol(op),
            render(r, env, mode, suffix)
        ),
        Dot | Cross if !(is_scalar(l, env) && is_scalar(r, env)) => {
            let name = if op == Dot { "b3d_vec_dot" } else { "b3d_vec_cross" };
            format!(
                "{name}{suffix}({}, {})",
                render(l, env, mode, suffix),
                render(r, env, mode, suffix)
            )
        }
        Add | Sub | Mul | Div | Dot | Cross => {
            let arith = match op {
                Dot | Cross => Mul,
                other => other,
            };
            let l_text = render(l, env, mode, suffix);
            let r_text = render(r, env, mode, suffix);
            match mode {
                Mode::Float => format!("({l_text} {} {r_text})", arith_symbol(arith)),
                Mode::Fixed => format!("{}({l_text}, {r_text})", fixed_macro(arith)),
            }
        }
    }
}

fn arith_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        _ => unreachable!("arith_symbol called with a non-arithmetic operator"),
    }
}

fn fixed_macro(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "B3D_FP_ADD",
        BinOp::Sub => "B3D_FP_SUB",
        BinOp::Mul => "B3D_FP_MUL",
        BinOp::Div => "B3D_FP_DIV",
        _ => unreachable!("fixed_macro called with a non-arithmetic operator"),
    }
}

fn cmp_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        _ => unreachable!("cmp_symbol called with a non-comparison operator"),
    }
}

fn render_index(base: &Expr, idx: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let base_text = render(base, env, mode, suffix);
    let idx_text = render(idx, env, mode, suffix);
    match component_letter_for_index_text(&idx_text) {
        Some(letter) => format!("{base_text}.{letter}"),
        None => format!("{base_text}[{idx_text}]"),
    }
}

fn component_letter_for_index_text(idx_text: &str) -> Option<&'static str> {
    Some(match idx_text {
        "0" | "0.0f" | "x" => "x",
        "1" | "1.0f" | "y" => "y",
        "2" | "2.0f" | "z" => "z",
        "3" | "3.0f" | "w" => "w",
        _ => return None,
    })
}

fn render_matrix_index(base: &Expr, row: &Expr, col: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let base_text = render(base, env, mode, suffix);
    let row_text = strip_frac_suffix(&render(row, env, mode, suffix));
    let col_text = strip_frac_suffix(&render(col, env, mode, suffix));
    format!("{base_text}.m[{row_text}][{col_text}]")
}

fn strip_frac_suffix(text: &str) -> String {
    text.strip_suffix(".0f").unwrap_or(text).to_string()
}

fn render_call(name: &str, args: &[Expr], env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let rendered: Vec<String> = args
        .iter()
        .enumerate()
        .map(|(i, a)| render_arg(a, env, mode, suffix, int_context_for(name, i)))
        .collect();
    match name {
        "sin" => format!("b3d_sinf({})", rendered[0]),
        "cos" => format!("b3d_cosf({})", rendered[0]),
        "tan" => format!("b3d_tanf({})", rendered[0]),
        "sqrt" => format!("b3d_sqrtf({})", rendered[0]),
        "abs" => format!("b3d_fabsf({})", rendered[0]),
        "floor" => format!("floorf({})", rendered[0]),
        "min" => format!("fminf({}, {})", rendered[0], rendered[1]),
        "max" => format!("fmaxf({}, {})", rendered[0], rendered[1]),
        "clamp" => format!("fminf(fmaxf({}, {}), {})", rendered[0], rendered[1], rendered[2]),
        "kronecker" => format!("(({}) == ({}) ? 1.0f : 0.0f)", rendered[0], rendered[1]),
        other => format!("b3d_{other}{suffix}({})", rendered.join(", ")),
    }
}

fn render_arg(arg: &Expr, env: &TypeEnv, mode: Mode, suffix: &str, int_ctx: IntContext) -> String {
    match (arg, int_ctx) {
        (Expr::Number(text), IntContext::Integer) => render_number(text, IntContext::Integer),
        _ => render(arg, env, mode, suffix),
    }
}

fn int_context_for(func: &str, arg_index: usize) -> IntContext {
    if func == "mat_row3" && arg_index == 1 {
        IntContext::Integer
    } else {
        IntContext::Default
    }
}

fn render_vector(elems: &[Expr], env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let rendered: Vec<String> = elems.iter().map(|e| render(e, env, mode, suffix)).collect();
    format!("(b3d_vec_t){{{}}}", rendered.join(", "))
}

fn render_matrix(rows: &[Vec<Expr>], env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let rendered_rows: Vec<String> = rows
        .iter()
        .map(|row| {
            let elems: Vec<String> = row.iter().map(|e| render(e, env, mode, suffix)).collect();
            format!("{{{}}}", elems.join(", "))
        })
        .collect();
    format!("(b3d_mat_t){{.m = {{ {} }}}}", rendered_rows.join(", "))
}

fn render_sum(var: &str, range: &RangeDesc, body: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let terms = expand_terms(var, range, body, env, mode, suffix);
    join_sum_terms(&terms, mode)
}

fn render_comprehension(
    body: &Expr,
    var: &str,
    range: &RangeDesc,
    env: &TypeEnv,
    mode: Mode,
    suffix: &str,
) -> String {
    let elems = expand_terms(var, range, body, env, mode, suffix);
    format!("(b3d_vec_t){{{}}}", elems.join(", "))
}

/// Renders `body` once, symbolically, then substitutes each concrete index
/// for the loop variable and applies the bracket/dot clean-up rules.
fn expand_terms(var: &str, range: &RangeDesc, body: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> Vec<String> {
    let symbolic = render(body, env, mode, suffix);
    range
        .index_strings()
        .iter()
        .map(|idx| cleanup(&whole_word_replace(&symbolic, var, idx), idx))
        .collect()
}

fn join_sum_terms(terms: &[String], mode: Mode) -> String {
    let mut iter = terms.iter();
    let Some(first) = iter.next() else {
        return "0.0f".to_string();
    };
    match mode {
        Mode::Float => {
            let mut out = first.clone();
            for t in iter {
                out.push_str(" + ");
                out.push_str(t);
            }
            out
        }
        Mode::Fixed => {
            let mut acc = first.clone();
            for t in iter {
                acc = format!("B3D_FP_ADD({acc}, {t})");
            }
            acc
        }
    }
}

/// Renders a `let` that appears as a nested subexpression rather than at a
/// body position: the body is rendered with bound names left as plain
/// identifiers, then each binding's rendered value is substituted back in,
/// innermost first. This reuses the same textual-substitution idiom as sum
/// expansion; it has no dedicated test oracle because every concrete
/// scenario only ever nests `let` at a body position.
fn render_nested_let(bindings: &[(String, Expr)], body: &Expr, env: &TypeEnv, mode: Mode, suffix: &str) -> String {
    let mut inner_env = env.clone();
    for (name, value) in bindings {
        inner_env.insert(name.clone(), infer_type(value, env).to_string());
    }
    let mut text = render(body, &inner_env, mode, suffix);
    for (name, value) in bindings.iter().rev() {
        let value_text = render(value, env, mode, suffix);
        text = whole_word_replace(&text, name, &format!("({value_text})"));
    }
    text
}
