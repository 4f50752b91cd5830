//! End-to-end driver tests: DSL source text in, generated C text out,
//! through the full lex → parse → generate pipeline (not hand-built ASTs).
//! Covers the six concrete scenarios and the invariants from `spec.md` §8.

use b3dc_core::{compile, CompilerConfig, Mode};

fn compile_float(source: &str) -> String {
    compile(source, "math.dsl", &CompilerConfig::default()).expect("compiles")
}

#[test]
fn scenario_1_dot3() {
    let out = compile_float("dot3(a, b) = ∑(i∈xyz) a_i · b_i where a ∈ ℝ³ b ∈ ℝ³");
    assert!(out.contains("static inline float b3d_dot3(b3d_vec_t a, b3d_vec_t b) {\n"));
    assert!(out.contains("    return (a.x * b.x) + (a.y * b.y) + (a.z * b.z);\n"));
}

#[test]
fn scenario_2_len() {
    let out = compile_float("len(v) = √(v·v) where v ∈ ℝ⁴");
    assert!(out.contains("static inline float b3d_len(b3d_vec_t v) {\n"));
    assert!(out.contains("    return b3d_sqrtf(b3d_vec_dot(v, v));\n"));
}

#[test]
fn scenario_3_scale() {
    let out = compile_float("scale(v, s) = [v_i * s | i ∈ xyzw] where v ∈ ℝ⁴ s ∈ ℝ");
    assert!(out.contains("static inline b3d_vec_t b3d_scale(b3d_vec_t v, float s) {\n"));
    assert!(out.contains("    return (b3d_vec_t){(v.x * s), (v.y * s), (v.z * s), (v.w * s)};\n"));
}

#[test]
fn scenario_4_clamp01() {
    let out = compile_float("clamp01(x) = if x < 0 then 0 else if x > 1 then 1 else x");
    assert!(out.contains("static inline float b3d_clamp01(float x) {\n"));
    assert!(out.contains("    return ((x < 0.0f) ? 0.0f : ((x > 1.0f) ? 1.0f : x));\n"));
}

#[test]
fn scenario_5_safe_norm_ternary() {
    let out = compile_float("safe_norm(v) = let n = ‖v‖ in if n < EPSILON then v else [v_i / n | i ∈ xyzw] where v ∈ ℝ⁴");
    assert!(out.contains("    float n = b3d_vec_length(v);\n"));
    assert!(out.contains(
        "    return ((n < B3D_EPSILON) ? v : (b3d_vec_t){(v.x / n), (v.y / n), (v.z / n), (v.w / n)});\n"
    ));
}

#[test]
fn scenario_5_variant_forces_block_form() {
    let out = compile_float(
        "safe_norm(v) = let n = ‖v‖ in if n < EPSILON then v else let r = 1/n in v * r where v ∈ ℝ⁴",
    );
    assert!(out.contains("    float n = b3d_vec_length(v);\n"));
    assert!(out.contains("    if ((n < B3D_EPSILON)) {\n"));
    assert!(out.contains("        return v;\n"));
    assert!(out.contains("    } else {\n"));
    assert!(out.contains("        float r = (1.0f / n);\n"));
    assert!(out.contains("        return (v * r);\n"));
}

#[test]
fn scenario_6_dot3_fixed() {
    let config = CompilerConfig {
        mode: Mode::Fixed,
        suffix: String::new(),
    };
    let out = compile(
        "dot3(a, b) = ∑(i∈xyz) a_i · b_i where a ∈ ℝ³ b ∈ ℝ³",
        "math.dsl",
        &config,
    )
    .expect("compiles");
    assert!(out.contains(
        "    return B3D_FP_ADD(B3D_FP_ADD(B3D_FP_MUL(a.x, b.x), B3D_FP_MUL(a.y, b.y)), B3D_FP_MUL(a.z, b.z));\n"
    ));
}

#[test]
fn sum_expansion_count_matches_range_and_drops_loop_var() {
    let out = compile_float("total(v) = ∑(i∈0..4) v_i where v ∈ ℝ⁴");
    // Four terms joined by " + ", none of them containing a whole-word "i".
    assert_eq!(out.matches(" + ").count(), 3);
    let body_line = out.lines().find(|l| l.trim_start().starts_with("return")).unwrap();
    assert!(!body_line
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|word| word == "i"));
}

#[test]
fn multiple_functions_separated_by_blank_line() {
    let out = compile_float("f(x) = x\ng(y) = y + 1");
    assert!(out.contains("b3d_f"));
    assert!(out.contains("b3d_g"));
    // Exactly one blank line between the two function bodies.
    assert!(out.contains("}\n\nstatic inline"));
}

#[test]
fn suffix_independence_round_trip() {
    let source = "len(v) = √(v·v) where v ∈ ℝ⁴";
    let v2 = compile(
        source,
        "math.dsl",
        &CompilerConfig {
            mode: Mode::Float,
            suffix: "_v2".to_string(),
        },
    )
    .unwrap();
    assert!(v2.contains("b3d_len_v2"));
    assert!(v2.contains("b3d_vec_length_v2(v)"));
}

#[test]
fn mode_swap_only_affects_operators_constants_and_header() {
    let source = "tau() = PI * 2";
    let float_out = compile_float(source);
    let fixed_out = compile(
        source,
        "math.dsl",
        &CompilerConfig {
            mode: Mode::Fixed,
            suffix: String::new(),
        },
    )
    .unwrap();
    assert!(float_out.contains("floating-point"));
    assert!(fixed_out.contains("fixed-point"));
    assert!(float_out.contains("return (B3D_PI * 2.0f);"));
    assert!(fixed_out.contains("return B3D_FP_MUL(B3D_FP_PI, 2.0f);"));
    // Function name and parameter list are identical across modes.
    assert!(float_out.contains("b3d_tau("));
    assert!(fixed_out.contains("b3d_tau("));
}

#[test]
fn unrecognized_leading_characters_are_skipped_by_the_lexer() {
    let out = compile_float("???\nf(x) = x");
    assert!(out.contains("b3d_f"));
}

#[test]
fn stray_leading_token_is_skipped_by_the_parser() {
    let out = compile_float("+ f(x) = x");
    assert!(out.contains("b3d_f"));
}

#[test]
fn parse_error_names_location() {
    let err = compile("f(x =", "math.dsl", &CompilerConfig::default()).unwrap_err();
    assert_eq!(err.line, 1);
}
