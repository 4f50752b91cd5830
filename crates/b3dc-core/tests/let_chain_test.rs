//! Pins the resolved Open Question from `spec.md` §9: `let` chains accept
//! either `;` or a redundant `let` keyword between bindings, and may or may
//! not be followed by `in` before the body — both spellings parse to the
//! same AST shape.

use b3dc_core::{lex, parse};
use b3dc_ast::expr::Expr;

fn body_of(source: &str) -> Expr {
    let tokens = lex(source);
    let mut funcs = parse(&tokens).expect("parse should succeed");
    funcs.remove(0).body
}

#[test]
fn semicolon_chain_without_in() {
    let body = body_of("f(x) = let a = x; b = a + 1 in b");
    match body {
        Expr::Let(bindings, inner) => {
            assert_eq!(bindings.len(), 2);
            assert_eq!(bindings[0].0, "a");
            assert_eq!(bindings[1].0, "b");
            assert!(matches!(*inner, Expr::Variable(ref n) if n == "b"));
        }
        other => panic!("expected Let, got {other:?}"),
    }
}

#[test]
fn redundant_let_chain_without_trailing_in() {
    let body = body_of("f(x) = let a = x let b = a + 1 b");
    match body {
        Expr::Let(bindings, inner) => {
            assert_eq!(bindings.len(), 2);
            assert!(matches!(*inner, Expr::Variable(ref n) if n == "b"));
        }
        other => panic!("expected Let, got {other:?}"),
    }
}

#[test]
fn semicolon_chain_three_bindings() {
    let body = body_of("f(x) = let a = x; b = a + 1; c = b + 1 in c");
    match body {
        Expr::Let(bindings, inner) => {
            assert_eq!(bindings.len(), 3);
            assert_eq!(bindings.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);
            assert!(matches!(*inner, Expr::Variable(ref n) if n == "c"));
        }
        other => panic!("expected Let, got {other:?}"),
    }
}

#[test]
fn single_binding_with_in_still_parses() {
    let body = body_of("f(x) = let a = x in a");
    match body {
        Expr::Let(bindings, inner) => {
            assert_eq!(bindings.len(), 1);
            assert!(matches!(*inner, Expr::Variable(ref n) if n == "a"));
        }
        other => panic!("expected Let, got {other:?}"),
    }
}
