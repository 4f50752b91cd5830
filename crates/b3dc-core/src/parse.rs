//! Recursive-descent parser: token list → `Vec<FuncDef>`.

use rustc_hash::FxHashMap;

use b3dc_ast::ctype::TypeEnv;
use b3dc_ast::expr::{BinOp, Expr, FuncDef, Param, RangeDesc, UnaryOp};

use crate::error::CompileError;
use crate::infer;
use crate::token::{Token, TokenKind};

/// Parses a full token list (as produced by [`crate::lexer::lex`]) into the
/// function definitions it contains. Leading junk before the first
/// definition is silently skipped; a malformed definition raises a
/// [`CompileError`] naming the expected token.
pub fn parse(tokens: &[Token]) -> Result<Vec<FuncDef>, CompileError> {
    let mut parser = Parser::new(tokens);
    let mut funcs = Vec::new();
    loop {
        parser.skip_newlines();
        if parser.at_eoi() {
            break;
        }
        if parser.looks_like_function_start() {
            funcs.push(parser.parse_function()?);
        } else {
            parser.advance();
        }
    }
    Ok(funcs)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_text(&self) -> &str {
        &self.current().text
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens.get(self.pos + 1).map(|t| t.kind).unwrap_or(TokenKind::Eoi)
    }

    fn at_eoi(&self) -> bool {
        self.peek_kind() == TokenKind::Eoi
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, CompileError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.err_expected(expected))
        }
    }

    fn err_expected(&self, what: &'static str) -> CompileError {
        let tok = self.current();
        CompileError::expected(what, tok.kind, &tok.text, tok.line, tok.col)
    }

    fn looks_like_function_start(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Identifier | TokenKind::Theta)
            && self.peek_next_kind() == TokenKind::LParen
    }

    /// Parses a name in any position that accepts `θ`, rewriting it to `a`.
    fn parse_name(&mut self) -> Option<String> {
        match self.peek_kind() {
            TokenKind::Identifier => Some(self.advance().text),
            TokenKind::Theta => {
                self.advance();
                Some("a".to_string())
            }
            _ => None,
        }
    }

    fn parse_function(&mut self) -> Result<FuncDef, CompileError> {
        let name = self.parse_name().ok_or_else(|| self.err_expected("function name"))?;
        self.expect(TokenKind::LParen, "(")?;
        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                let pname = self.parse_name().ok_or_else(|| self.err_expected("parameter name"))?;
                params.push(Param {
                    name: pname,
                    type_tag: "scalar".to_string(),
                });
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        self.expect(TokenKind::Equals, "=")?;
        let body = self.parse_expr();
        self.skip_newlines();
        if matches!(self.peek_kind(), TokenKind::Where) {
            self.advance();
            self.parse_where_block(&mut params)?;
        }

        let mut env: TypeEnv = FxHashMap::default();
        for p in &params {
            env.insert(p.name.clone(), p.type_tag.clone());
        }
        let return_type = infer::return_type(&body, &env).to_string();

        Ok(FuncDef {
            name,
            params,
            return_type,
            body,
        })
    }

    /// `where (name ∈ type)*`, terminated per §4.2: a line starting with an
    /// identifier immediately followed by `(` begins the next function; any
    /// other non-identifier/non-`θ` leading token also ends the block. A
    /// name not followed by `∈` rewinds one position and ends the block.
    /// Duplicate declarations keep the last seen type.
    fn parse_where_block(&mut self, params: &mut [Param]) -> Result<(), CompileError> {
        loop {
            self.skip_newlines();
            if self.looks_like_function_start() {
                break;
            }
            match self.peek_kind() {
                TokenKind::Identifier | TokenKind::Theta => {
                    let save = self.pos;
                    let tok = self.current().clone();
                    let name = self
                        .parse_name()
                        .ok_or_else(|| CompileError::internal(tok.line, tok.col))?;
                    if matches!(self.peek_kind(), TokenKind::In) {
                        self.advance();
                        let type_tag = self.parse_type();
                        if let Some(p) = params.iter_mut().find(|p| p.name == name) {
                            p.type_tag = type_tag;
                        }
                    } else {
                        self.pos = save;
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_type(&mut self) -> String {
        let base = match self.peek_kind() {
            TokenKind::RealType => {
                self.advance();
                "ℝ"
            }
            TokenKind::IntType => {
                self.advance();
                "ℤ"
            }
            _ => return "scalar".to_string(),
        };
        if matches!(self.peek_kind(), TokenKind::Superscript) {
            let suffix = self.advance().text;
            format!("{base}{suffix}")
        } else {
            base.to_string()
        }
    }

    fn parse_range(&mut self) -> RangeDesc {
        match self.peek_kind() {
            TokenKind::Identifier if matches!(self.peek_text(), "xyz" | "xyzw") => {
                let is_xyzw = self.peek_text() == "xyzw";
                self.advance();
                RangeDesc::Components(if is_xyzw { "xyzw" } else { "xyz" })
            }
            TokenKind::Number => {
                let lo_text = self.advance().text;
                if matches!(self.peek_kind(), TokenKind::Range) {
                    self.advance();
                    if matches!(self.peek_kind(), TokenKind::Number) {
                        let hi_text = self.advance().text;
                        let lo: u32 = lo_text.parse().unwrap_or(0);
                        let hi: u32 = hi_text.parse().unwrap_or(lo);
                        RangeDesc::IntRange(lo, hi)
                    } else {
                        RangeDesc::Raw(lo_text)
                    }
                } else {
                    RangeDesc::Raw(lo_text)
                }
            }
            _ => {
                let text = self.advance().text;
                RangeDesc::Raw(text)
            }
        }
    }

    // --- expression precedence chain, loosest to tightest ---

    fn parse_expr(&mut self) -> Expr {
        self.parse_let()
    }

    fn parse_let(&mut self) -> Expr {
        if !matches!(self.peek_kind(), TokenKind::Let) {
            return self.parse_if();
        }
        self.advance();
        let mut bindings = Vec::new();
        loop {
            let name = self.parse_name().unwrap_or_else(|| "_unknown_".to_string());
            let _ = self.expect(TokenKind::Equals, "=");
            let value = self.parse_if();
            bindings.push((name, value));
            match self.peek_kind() {
                TokenKind::Semicolon | TokenKind::Let => {
                    self.advance();
                    continue;
                }
                _ => break,
            }
        }
        if matches!(self.peek_kind(), TokenKind::In) {
            self.advance();
        }
        let body = self.parse_expr();
        Expr::Let(bindings, Box::new(body))
    }

    fn parse_if(&mut self) -> Expr {
        if !matches!(self.peek_kind(), TokenKind::If) {
            return self.parse_comparison();
        }
        self.advance();
        let cond = self.parse_comparison();
        let _ = self.expect(TokenKind::Then, "then");
        let then_branch = self.parse_let();
        let _ = self.expect(TokenKind::Else, "else");
        let else_branch = self.parse_let();
        Expr::If(Box::new(cond), Box::new(then_branch), Box::new(else_branch))
    }

    fn parse_comparison(&mut self) -> Expr {
        let mut left = self.parse_additive();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive();
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative();
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Dot => BinOp::Dot,
                TokenKind::Cross => BinOp::Cross,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary();
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()))
            }
            TokenKind::Sqrt => {
                self.advance();
                Expr::Call("sqrt".to_string(), vec![self.parse_unary()])
            }
            _ => self.parse_postfix(),
        }
    }

    /// A `.` token followed by an identifier is field access. This only
    /// fires for the literal ASCII dot (`token.text == "."`): the Unicode
    /// (`·`, `⋅`) and LaTeX (`\cdot`, `\dot`) spellings of the dot-product
    /// operator are never field access, regardless of what follows, so
    /// they fall through unconsumed to `parse_multiplicative`.
    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let idx1 = self.parse_comparison();
                    let _ = self.expect(TokenKind::RBracket, "]");
                    if matches!(self.peek_kind(), TokenKind::LBracket) {
                        self.advance();
                        let idx2 = self.parse_comparison();
                        let _ = self.expect(TokenKind::RBracket, "]");
                        expr = Expr::MatrixIndex(Box::new(expr), Box::new(idx1), Box::new(idx2));
                    } else {
                        expr = Expr::Index(Box::new(expr), Box::new(idx1));
                    }
                }
                TokenKind::Dot if self.peek_text() == "." && self.peek_next_kind() == TokenKind::Identifier => {
                    self.advance();
                    let field = self.advance().text;
                    expr = Expr::DotAccess(Box::new(expr), field);
                }
                TokenKind::Transpose => {
                    self.advance();
                    expr = Expr::Unary(UnaryOp::Transpose, Box::new(expr));
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> Expr {
        match self.peek_kind() {
            TokenKind::Number => Expr::Number(self.advance().text),
            TokenKind::Identifier => self.parse_identifier_primary(),
            TokenKind::Theta => {
                self.advance();
                Expr::Variable("a".to_string())
            }
            TokenKind::Pi => {
                self.advance();
                Expr::Variable("PI".to_string())
            }
            TokenKind::Epsilon => {
                self.advance();
                Expr::Variable("EPSILON".to_string())
            }
            TokenKind::Delta => self.parse_delta(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                let _ = self.expect(TokenKind::RParen, ")");
                inner
            }
            TokenKind::Pipe => {
                self.advance();
                let inner = self.parse_expr();
                let _ = self.expect(TokenKind::Pipe, "|");
                Expr::Call("abs".to_string(), vec![inner])
            }
            TokenKind::NormDelim => {
                self.advance();
                let inner = self.parse_expr();
                let _ = self.expect(TokenKind::NormDelim, "‖");
                Expr::Norm(Box::new(inner))
            }
            TokenKind::Sum => self.parse_sum(),
            TokenKind::LBracket => self.parse_bracket_primary(),
            TokenKind::Sin
            | TokenKind::Cos
            | TokenKind::Tan
            | TokenKind::Abs
            | TokenKind::Floor
            | TokenKind::Min
            | TokenKind::Max
            | TokenKind::Clamp => self.parse_builtin_call(),
            _ => {
                // Unknown primary: sentinel variable, advance one token. See
                // the "silent recovery" error kind.
                self.advance();
                Expr::Variable("_unknown_".to_string())
            }
        }
    }

    fn parse_identifier_primary(&mut self) -> Expr {
        let text = self.advance().text;
        if matches!(self.peek_kind(), TokenKind::LParen) {
            let args = self.parse_call_args();
            return Expr::Call(text, args);
        }
        rewrite_underscore_index(&text).unwrap_or(Expr::Variable(text))
    }

    fn parse_builtin_call(&mut self) -> Expr {
        let name = match self.peek_kind() {
            TokenKind::Sin => "sin",
            TokenKind::Cos => "cos",
            TokenKind::Tan => "tan",
            TokenKind::Abs => "abs",
            TokenKind::Floor => "floor",
            TokenKind::Min => "min",
            TokenKind::Max => "max",
            TokenKind::Clamp => "clamp",
            _ => unreachable!("parse_builtin_call called on a non-builtin token"),
        };
        self.advance();
        let args = self.parse_call_args();
        Expr::Call(name.to_string(), args)
    }

    fn parse_call_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if matches!(self.peek_kind(), TokenKind::LParen) {
            self.advance();
            if !matches!(self.peek_kind(), TokenKind::RParen) {
                loop {
                    args.push(self.parse_comparison());
                    if matches!(self.peek_kind(), TokenKind::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            let _ = self.expect(TokenKind::RParen, ")");
        }
        args
    }

    /// `δᵢⱼ` (Kronecker delta): `δ` followed by two `Subscript` tokens lowers
    /// to `Call("kronecker", [i, j])`. A bare `δ`, or `δ` followed by only
    /// one subscript, falls back to the plain variable `delta` — the first
    /// subscript is consumed either way, matching the notation's origin.
    fn parse_delta(&mut self) -> Expr {
        self.advance(); // δ
        if matches!(self.peek_kind(), TokenKind::Subscript) {
            let i = self.advance().text;
            if matches!(self.peek_kind(), TokenKind::Subscript) {
                let j = self.advance().text;
                return Expr::Call("kronecker".to_string(), vec![Expr::Variable(i), Expr::Variable(j)]);
            }
        }
        Expr::Variable("delta".to_string())
    }

    fn parse_sum(&mut self) -> Expr {
        self.advance(); // ∑
        let _ = self.expect(TokenKind::LParen, "(");
        let var = self.parse_name().unwrap_or_else(|| "_unknown_".to_string());
        let _ = self.expect(TokenKind::In, "∈");
        let range = self.parse_range();
        let _ = self.expect(TokenKind::RParen, ")");
        // Sums bind only a multiplicative-precedence body.
        let body = self.parse_multiplicative();
        Expr::Sum(var, range, Box::new(body))
    }

    /// `[...]` at primary position: a matrix literal if its first element
    /// starts with `[`, a comprehension if a `|` follows the first element,
    /// otherwise a vector literal.
    fn parse_bracket_primary(&mut self) -> Expr {
        self.advance(); // '['
        if matches!(self.peek_kind(), TokenKind::LBracket) {
            return self.parse_matrix_rows();
        }
        let first = self.parse_comparison();
        if matches!(self.peek_kind(), TokenKind::Pipe) {
            self.advance();
            let var = self.parse_name().unwrap_or_else(|| "_unknown_".to_string());
            let _ = self.expect(TokenKind::In, "∈");
            let range = self.parse_range();
            let _ = self.expect(TokenKind::RBracket, "]");
            return Expr::Comprehension(Box::new(first), var, range);
        }
        let mut elems = vec![first];
        while matches!(self.peek_kind(), TokenKind::Comma) {
            self.advance();
            elems.push(self.parse_comparison());
        }
        let _ = self.expect(TokenKind::RBracket, "]");
        Expr::Vector(elems)
    }

    fn parse_matrix_rows(&mut self) -> Expr {
        let mut rows = Vec::new();
        loop {
            let _ = self.expect(TokenKind::LBracket, "[");
            let mut row = vec![self.parse_comparison()];
            while matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
                row.push(self.parse_comparison());
            }
            let _ = self.expect(TokenKind::RBracket, "]");
            rows.push(row);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        let _ = self.expect(TokenKind::RBracket, "]");
        Expr::Matrix(rows)
    }
}

/// An identifier containing underscores rewrites to nested `Index` only if
/// its first segment is a single character and every following segment is
/// one of `{i,j,k,l,m,0,1,2,3,4}` — this keeps names like `vec_dot` or
/// `up_n` as plain variables.
fn rewrite_underscore_index(text: &str) -> Option<Expr> {
    let mut parts = text.split('_');
    let base = parts.next()?;
    if base.chars().count() != 1 {
        return None;
    }
    let segments: Vec<&str> = parts.collect();
    if segments.is_empty() {
        return None;
    }
    if !segments
        .iter()
        .all(|s| matches!(*s, "i" | "j" | "k" | "l" | "m" | "0" | "1" | "2" | "3" | "4"))
    {
        return None;
    }
    let mut expr = Expr::Variable(base.to_string());
    for seg in segments {
        let idx = if seg.chars().all(|c| c.is_ascii_digit()) {
            Expr::Number(seg.to_string())
        } else {
            Expr::Variable(seg.to_string())
        };
        expr = Expr::Index(Box::new(expr), Box::new(idx));
    }
    Some(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_one(source: &str) -> FuncDef {
        let tokens = lex(source);
        let mut funcs = parse(&tokens).expect("parse should succeed");
        assert_eq!(funcs.len(), 1);
        funcs.remove(0)
    }

    #[test]
    fn dot_product_sum_scenario() {
        let func = parse_one("dot3(a, b) = ∑(i∈xyz) a_i · b_i where a ∈ ℝ³ b ∈ ℝ³");
        assert_eq!(func.name, "dot3");
        assert_eq!(func.params[0].type_tag, "ℝ3");
        assert_eq!(func.params[1].type_tag, "ℝ3");
        match &func.body {
            Expr::Sum(var, RangeDesc::Components(letters), _) => {
                assert_eq!(var, "i");
                assert_eq!(*letters, "xyz");
            }
            other => panic!("expected Sum, got {other:?}"),
        }
    }

    #[test]
    fn underscore_rewrite_rejects_multi_char_base() {
        let func = parse_one("f(vec_dot) = vec_dot");
        assert!(matches!(&func.body, Expr::Variable(name) if name == "vec_dot"));
    }

    #[test]
    fn let_chain_accepts_semicolon_without_in() {
        let func = parse_one("f(x) = let a = x; b = a + 1 in b");
        match &func.body {
            Expr::Let(bindings, body) => {
                assert_eq!(bindings.len(), 2);
                assert!(matches!(**body, Expr::Variable(ref n) if n == "b"));
            }
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn let_chain_accepts_redundant_let_and_missing_in() {
        let func = parse_one("f(x) = let a = x let b = a + 1 b");
        match &func.body {
            Expr::Let(bindings, body) => {
                assert_eq!(bindings.len(), 2);
                assert!(matches!(**body, Expr::Variable(ref n) if n == "b"));
            }
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn theta_rewritten_to_a_everywhere() {
        let func = parse_one("f(θ) = θ");
        assert_eq!(func.params[0].name, "a");
        assert!(matches!(&func.body, Expr::Variable(name) if name == "a"));
    }

    #[test]
    fn where_block_stops_at_next_function() {
        let tokens = lex("f(x) = x where x ∈ ℝ\ng(y) = y");
        let funcs = parse(&tokens).expect("parse should succeed");
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[1].name, "g");
    }

    #[test]
    fn ascii_dot_is_field_access_unicode_dot_is_product() {
        let func = parse_one("f(a, b) = a.b");
        assert!(matches!(&func.body, Expr::DotAccess(_, field) if field == "b"));

        let func2 = parse_one("f(a, b) = a · b");
        assert!(matches!(&func2.body, Expr::BinOp(BinOp::Dot, _, _)));
    }

    #[test]
    fn nested_conditional_parses_as_scenario_4() {
        let func = parse_one("clamp01(x) = if x < 0 then 0 else if x > 1 then 1 else x");
        match &func.body {
            Expr::If(cond, then_b, else_b) => {
                assert!(matches!(**cond, Expr::BinOp(BinOp::Lt, _, _)));
                assert!(matches!(**then_b, Expr::Number(ref n) if n == "0"));
                assert!(matches!(**else_b, Expr::If(..)));
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_where_decl_keeps_last_type() {
        let func = parse_one("f(x) = x where x ∈ ℝ x ∈ ℝ⁴");
        assert_eq!(func.params[0].type_tag, "ℝ4");
    }

    #[test]
    fn kronecker_delta_with_two_subscripts() {
        let func = parse_one("f(i, j) = δᵢⱼ");
        match &func.body {
            Expr::Call(name, args) => {
                assert_eq!(name, "kronecker");
                assert!(matches!(&args[0], Expr::Variable(n) if n == "i"));
                assert!(matches!(&args[1], Expr::Variable(n) if n == "j"));
            }
            other => panic!("expected Call(\"kronecker\", ..), got {other:?}"),
        }
    }

    #[test]
    fn bare_delta_falls_back_to_plain_variable() {
        let func = parse_one("f(x) = δ");
        assert!(matches!(&func.body, Expr::Variable(name) if name == "delta"));
    }
}
