//! Context-sensitive recursive-descent parser.
//!
//! Shape modeled on the teacher's `syntax::parser::Parser` (a struct wrapping
//! the lexer plus small scratch buffers); grammar content replaced entirely
//! per the original source's `parser.c`, since this language has no operator
//! precedence table — operators chain strictly right-to-left and the only
//! real complexity is context sensitivity driven by `ws_before`.
//!
//! Tokens are collected up front into a small `Vec` (a single REPL line or
//! script line is never large) so that arbitrary lookahead is a plain index
//! bump rather than a stack of `Peekable` adapters.

use std::rc::Rc;

use crate::error::KError;
use crate::lexer::{Lexer, TokKind, Token};
use crate::ops::{self, OpTag};
use crate::value::{LambdaDef, Value};

#[derive(Clone, Debug)]
pub enum Ast {
    Literal(Value),
    Var(Rc<str>),
    Unary(OpTag, Box<Ast>),
    Binary(OpTag, Box<Ast>, Box<Ast>),
    Call(Box<Ast>, Vec<Ast>),
    Seq(Vec<Ast>),
    List(Vec<Ast>),
    Conditional(Box<Ast>, Box<Ast>, Box<Ast>),
    Adverb(OpTag, Box<Ast>),
}

pub struct Parser<'a> {
    toks: Vec<Token<'a>>,
    pos: usize,
}

const EOF_TOK: Token<'static> = Token {
    kind: TokKind::Eof,
    ws_before: false,
};

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Parser<'a> {
        Parser {
            toks: Lexer::new(src).collect(),
            pos: 0,
        }
    }

    /// Parses one full program / REPL line: zero expressions is a Nil
    /// literal, one expression is returned bare, two or more `;`-joined
    /// expressions are wrapped in a `Seq`.
    pub fn parse_program(&mut self) -> Result<Ast, KError> {
        if self.pos >= self.toks.len() {
            return Ok(Ast::Literal(Value::Nil));
        }
        let mut exprs = vec![self.parse_expr()?];
        while self.at(TokKind::Semicolon) {
            self.pos += 1;
            if self.pos >= self.toks.len() {
                break;
            }
            exprs.push(self.parse_expr()?);
        }
        if self.pos < self.toks.len() {
            return Err(KError::Parse);
        }
        if exprs.len() == 1 {
            Ok(exprs.pop().unwrap())
        } else {
            Ok(Ast::Seq(exprs))
        }
    }

    // --- token stream helpers ---------------------------------------

    fn cur(&self) -> &Token<'a> {
        self.toks.get(self.pos).unwrap_or(&EOF_TOK)
    }

    fn kind_at(&self, i: usize) -> TokKind<'a> {
        self.toks.get(i).map(|t| t.kind).unwrap_or(TokKind::Eof)
    }

    fn ws_at(&self, i: usize) -> bool {
        self.toks.get(i).map(|t| t.ws_before).unwrap_or(false)
    }

    fn at(&self, kind: TokKind<'a>) -> bool {
        self.cur().kind == kind
    }

    fn bump(&mut self) -> Token<'a> {
        let t = *self.cur();
        self.pos += 1;
        t
    }

    fn expect(&mut self, kind: TokKind<'a>) -> Result<(), KError> {
        if self.cur().kind == kind {
            self.pos += 1;
            Ok(())
        } else {
            Err(KError::Parse)
        }
    }

    fn is_real_verb(tag: OpTag) -> bool {
        !ops::is_adverb_tag(tag) && tag != OpTag::Colon
    }

    /// Punctuation verbs only — excludes Sin/Cos/Abs, Colon and the
    /// adverbs. Mirrors the original's `is_unary_op`.
    fn is_unary_op(tag: OpTag) -> bool {
        Self::is_real_verb(tag) && !matches!(tag, OpTag::Sin | OpTag::Cos | OpTag::Abs)
    }

    /// True when the current token can open a new term on its own:
    /// `is_expr_start` from the original grammar. Punctuation verbs are
    /// deliberately excluded — a value followed by one of those, with
    /// whitespace in between, is an infix binary application for
    /// `parse_expr` to build, not an argument for juxtaposition.
    fn can_start_term(&self) -> bool {
        match self.cur().kind {
            TokKind::Num(_) | TokKind::Str(_) | TokKind::Ident(_) | TokKind::Dollar | TokKind::LBrace | TokKind::LParen => true,
            TokKind::Op(tag) => matches!(tag, OpTag::Sin | OpTag::Cos | OpTag::Abs),
            _ => false,
        }
    }

    /// True when the current token is a real verb immediately (no
    /// whitespace) followed by an adverb token: that verb becomes a callable
    /// *value* rather than opening a new unary application.
    fn next_is_adverb_no_ws(&self) -> bool {
        match self.kind_at(self.pos + 1) {
            TokKind::Op(tag) if ops::is_adverb_tag(tag) => !self.ws_at(self.pos + 1),
            _ => false,
        }
    }

    /// A punctuation verb counts as an argument-starter when it isn't about
    /// to glue to a following adverb itself (`unary_op_allowed`).
    fn unary_op_allowed(&self) -> bool {
        match self.cur().kind {
            TokKind::Op(tag) if Self::is_unary_op(tag) => !self.next_is_adverb_no_ws(),
            _ => false,
        }
    }

    /// Token kinds that can precede a `-` in "value position": a previous
    /// value makes `-` ambiguous between subtraction and a negative literal,
    /// resolved by `is_prefix_context_at` below.
    fn is_value_tok_kind(kind: TokKind<'a>) -> bool {
        matches!(
            kind,
            TokKind::Num(_) | TokKind::Str(_) | TokKind::Ident(_) | TokKind::RParen | TokKind::RBracket | TokKind::RBrace
        )
    }

    /// Whether the token at `i` sits in prefix (unary) context: start of
    /// input, or right after a verb/adverb/colon/opener/`;`. After a plain
    /// value, it's prefix context only if whitespace separates the value
    /// from `i` — mirrors the original's `is_prefix_context`.
    fn is_prefix_context_at(&self, i: usize) -> bool {
        if i == 0 {
            return true;
        }
        match self.kind_at(i - 1) {
            TokKind::Op(_) => true,
            TokKind::LParen | TokKind::LBracket | TokKind::LBrace | TokKind::Semicolon => true,
            prev if Self::is_value_tok_kind(prev) => self.ws_at(i),
            _ => false,
        }
    }

    /// A bare `-` immediately glued to a digit reads as a negative literal
    /// when it sits in prefix context (`peek_negative`).
    fn peek_negative(&self) -> bool {
        matches!(self.cur().kind, TokKind::Op(OpTag::Minus))
            && matches!(self.kind_at(self.pos + 1), TokKind::Num(_))
            && !self.ws_at(self.pos + 1)
            && self.is_prefix_context_at(self.pos)
    }

    /// The narrow curry case: a bare verb *value* (not yet applied to
    /// anything) followed, with whitespace, by another unary op starts a new
    /// unary application that becomes this verb's argument.
    fn verb_curry_follows(&self, base: &Ast) -> bool {
        matches!(base, Ast::Literal(Value::Verb(_))) && matches!(self.cur().kind, TokKind::Op(tag) if Self::is_unary_op(tag))
    }

    // --- numeric / string atoms, stranding ---------------------------

    fn parse_number_text(text: &str, negative: bool) -> Value {
        let (mantissa, is_w) = if let Some(stripped) = text.strip_suffix(['w', 'W']) {
            (stripped, true)
        } else {
            (text, false)
        };
        let is_zero = mantissa.is_empty()
            || mantissa.chars().all(|c| c == '0' || c == '.');
        if is_w && is_zero {
            return if negative { Value::NInf } else { Value::PInf };
        }
        let is_float = mantissa.contains('.') || mantissa.contains('e') || mantissa.contains('E');
        if is_float {
            let f: f64 = mantissa.parse().unwrap_or(0.0);
            Value::Float(if negative { -f } else { f })
        } else {
            let i: i64 = mantissa.parse().unwrap_or(0);
            Value::Int(if negative { -i } else { i })
        }
    }

    /// Reads one atom (number or string), applying the negative-number
    /// heuristic: a `-` immediately followed (no whitespace) by a digit is
    /// absorbed into the literal, but only in prefix context — at the start
    /// of a strand, or after whitespace following another value — so that
    /// `3-2` still reads as subtraction rather than a stranded `3 -2`.
    fn try_read_atom(&mut self) -> Option<Value> {
        match self.cur().kind {
            TokKind::Op(OpTag::Minus)
                if matches!(self.kind_at(self.pos + 1), TokKind::Num(_))
                    && !self.ws_at(self.pos + 1)
                    && self.is_prefix_context_at(self.pos) =>
            {
                self.pos += 1;
                let text = match self.bump().kind {
                    TokKind::Num(t) => t,
                    _ => unreachable!(),
                };
                Some(Self::parse_number_text(text, true))
            }
            TokKind::Num(text) => {
                self.pos += 1;
                Some(Self::parse_number_text(text, false))
            }
            TokKind::Str(text) => {
                self.pos += 1;
                Some(Value::string(text))
            }
            _ => None,
        }
    }

    /// Reads one atom, then strands any further whitespace-only-separated
    /// atoms into a single literal Vector. Identifiers never strand.
    fn try_read_strand(&mut self) -> Option<Ast> {
        let first = self.try_read_atom()?;
        let mut items = vec![first];
        while let Some(next) = self.try_read_atom() {
            items.push(next);
        }
        if items.len() == 1 {
            Some(Ast::Literal(items.pop().unwrap()))
        } else {
            Some(Ast::Literal(Value::vector(items)))
        }
    }

    // --- primary / unary / postfix / expr ----------------------------

    fn parse_primary(&mut self) -> Result<Ast, KError> {
        match self.cur().kind {
            TokKind::Ident(name) => {
                self.pos += 1;
                Ok(Ast::Var(Rc::from(name)))
            }
            TokKind::Dollar => self.parse_conditional(),
            TokKind::LBrace => self.parse_lambda(),
            TokKind::LParen => self.parse_paren(),
            TokKind::Op(tag) if Self::is_real_verb(tag) => {
                self.pos += 1;
                Ok(Ast::Literal(Value::Verb(tag)))
            }
            _ => Err(KError::Parse),
        }
    }

    fn parse_paren(&mut self) -> Result<Ast, KError> {
        self.pos += 1; // '('
        if self.at(TokKind::RParen) {
            self.pos += 1;
            return Ok(Ast::List(vec![]));
        }
        let first = self.parse_expr()?;
        if self.at(TokKind::Semicolon) {
            let mut items = vec![first];
            while self.at(TokKind::Semicolon) {
                self.pos += 1;
                items.push(self.parse_expr()?);
            }
            self.expect(TokKind::RParen)?;
            Ok(Ast::List(items))
        } else {
            self.expect(TokKind::RParen)?;
            Ok(first)
        }
    }

    fn parse_conditional(&mut self) -> Result<Ast, KError> {
        self.pos += 1; // '$'
        self.expect(TokKind::LBracket)?;
        let cond = self.parse_expr()?;
        self.expect(TokKind::Semicolon)?;
        let then_branch = self.parse_expr()?;
        self.expect(TokKind::Semicolon)?;
        let else_branch = self.parse_expr()?;
        self.expect(TokKind::RBracket)?;
        Ok(Ast::Conditional(
            Box::new(cond),
            Box::new(then_branch),
            Box::new(else_branch),
        ))
    }

    fn parse_lambda(&mut self) -> Result<Ast, KError> {
        self.pos += 1; // '{'
        let mut params: Vec<Rc<str>> = vec![];
        let mut explicit_params = false;
        if self.at(TokKind::LBracket) {
            explicit_params = true;
            self.pos += 1;
            if !self.at(TokKind::RBracket) {
                loop {
                    match self.cur().kind {
                        TokKind::Ident(name) => {
                            self.pos += 1;
                            params.push(Rc::from(name));
                        }
                        _ => return Err(KError::Parse),
                    }
                    if self.at(TokKind::Semicolon) {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
            }
            self.expect(TokKind::RBracket)?;
        }

        let mut body = vec![];
        let mut explicit_return = true;
        if !self.at(TokKind::RBrace) {
            loop {
                body.push(self.parse_expr()?);
                if self.at(TokKind::Semicolon) {
                    self.pos += 1;
                    if self.at(TokKind::RBrace) {
                        explicit_return = false;
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(TokKind::RBrace)?;

        let arity = if explicit_params {
            params.len()
        } else {
            max_implicit_arity(&body)
        };

        Ok(Ast::Literal(Value::Lambda(Rc::new(LambdaDef {
            params,
            arity,
            body,
            explicit_return,
        }))))
    }

    fn parse_unary(&mut self) -> Result<Ast, KError> {
        if let Some(atom) = self.try_read_strand() {
            return self.parse_postfix(atom);
        }

        let mut ops = vec![];
        loop {
            match self.cur().kind {
                TokKind::Op(tag) if Self::is_real_verb(tag) => {
                    if self.next_is_adverb_no_ws() {
                        break;
                    }
                    self.pos += 1;
                    ops.push(tag);
                    if let Some(atom) = self.try_read_strand() {
                        let mut result = atom;
                        for op in ops.iter().rev() {
                            result = Ast::Unary(*op, Box::new(result));
                        }
                        return self.parse_postfix(result);
                    }
                }
                _ => break,
            }
        }

        if ops.is_empty() {
            let base = self.parse_primary()?;
            return self.parse_postfix(base);
        }

        if self.can_start_term() {
            let x = self.parse_unary()?;
            let mut result = x;
            for op in ops.iter().rev() {
                result = Ast::Unary(*op, Box::new(result));
            }
            self.parse_postfix(result)
        } else if ops.len() == 1 {
            self.parse_postfix(Ast::Literal(Value::Verb(ops[0])))
        } else {
            let mut body_expr = Ast::Var(Rc::from("x"));
            for op in ops.iter().rev() {
                body_expr = Ast::Unary(*op, Box::new(body_expr));
            }
            let lambda = Value::Lambda(Rc::new(LambdaDef {
                params: vec![],
                arity: 1,
                body: vec![body_expr],
                explicit_return: true,
            }));
            self.parse_postfix(Ast::Literal(lambda))
        }
    }

    fn parse_postfix(&mut self, mut base: Ast) -> Result<Ast, KError> {
        let mut attached_adverb = false;
        while let TokKind::Op(tag) = self.cur().kind {
            if ops::is_adverb_tag(tag) && !self.cur().ws_before {
                self.pos += 1;
                base = Ast::Adverb(tag, Box::new(base));
                attached_adverb = true;
            } else {
                break;
            }
        }

        loop {
            match self.cur().kind {
                TokKind::LBracket => {
                    self.pos += 1;
                    let mut args = vec![];
                    if !self.at(TokKind::RBracket) {
                        args.push(self.parse_expr()?);
                        while self.at(TokKind::Semicolon) {
                            self.pos += 1;
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(TokKind::RBracket)?;
                    base = Ast::Call(Box::new(base), args);
                    attached_adverb = true;
                }
                TokKind::LParen if !self.cur().ws_before => {
                    let inner = self.parse_paren()?;
                    let args = match inner {
                        Ast::List(items) => items,
                        other => vec![other],
                    };
                    base = Ast::Call(Box::new(base), args);
                    attached_adverb = true;
                }
                // An adverb-headed callable (`+/`, `{x*x}'`, ...) takes its
                // argument with no whitespace requirement, and admits a bare
                // unary op as the start of that argument (`+/!5`).
                _ if matches!(base, Ast::Adverb(_, _))
                    && (self.can_start_term() || self.unary_op_allowed() || self.peek_negative()) =>
                {
                    let arg = self.parse_expr()?;
                    base = Ast::Call(Box::new(base), vec![arg]);
                }
                _ if (self.can_start_term() || self.peek_negative() || self.verb_curry_follows(&base))
                    && (self.cur().ws_before || attached_adverb) =>
                {
                    let arg = self.parse_unary()?;
                    base = Ast::Call(Box::new(base), vec![arg]);
                }
                _ => break,
            }
        }

        Ok(base)
    }

    /// Top level of a single expression: binary operators chain strictly
    /// right-to-left (`2*3+4` is `2*(3+4)`), including `:` for assignment.
    fn parse_expr(&mut self) -> Result<Ast, KError> {
        let left = self.parse_unary()?;
        if let TokKind::Op(tag) = self.cur().kind {
            if tag == OpTag::Colon || Self::is_real_verb(tag) {
                self.pos += 1;
                let right = self.parse_expr()?;
                return Ok(Ast::Binary(tag, Box::new(left), Box::new(right)));
            }
        }
        Ok(left)
    }
}

/// Scans a lambda body for free `x`/`y`/`z` variable references and returns
/// the highest implied parameter count (x=1, y=2, z=3); 0 if none appear.
fn max_implicit_arity(body: &[Ast]) -> usize {
    fn visit(ast: &Ast, found: &mut usize) {
        match ast {
            Ast::Var(name) => {
                let n = match &**name {
                    "x" => 1,
                    "y" => 2,
                    "z" => 3,
                    _ => 0,
                };
                if n > *found {
                    *found = n;
                }
            }
            Ast::Literal(_) => {}
            Ast::Unary(_, a) => visit(a, found),
            Ast::Binary(_, a, b) => {
                visit(a, found);
                visit(b, found);
            }
            Ast::Call(callee, args) => {
                visit(callee, found);
                for a in args {
                    visit(a, found);
                }
            }
            Ast::Seq(items) | Ast::List(items) => {
                for a in items {
                    visit(a, found);
                }
            }
            Ast::Conditional(c, t, e) => {
                visit(c, found);
                visit(t, found);
                visit(e, found);
            }
            Ast::Adverb(_, a) => visit(a, found),
        }
    }
    let mut found = 0;
    for a in body {
        visit(a, &mut found);
    }
    found
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(src: &str) -> Ast {
        Parser::new(src).parse_program().unwrap()
    }

    #[test]
    fn simple_arithmetic() {
        match parse("1 2 3 + 10") {
            Ast::Binary(OpTag::Plus, l, r) => {
                assert!(matches!(*l, Ast::Literal(Value::Vector(_))));
                assert!(matches!(*r, Ast::Literal(Value::Int(10))));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn glued_subtraction_is_not_a_stranded_negative() {
        // "3-2" is subtraction, not the vector `3 -2` — the minus isn't in
        // prefix context since it's glued straight onto the preceding atom.
        match parse("3-2") {
            Ast::Binary(OpTag::Minus, l, r) => {
                assert!(matches!(*l, Ast::Literal(Value::Int(3))));
                assert!(matches!(*r, Ast::Literal(Value::Int(2))));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn spaced_infix_verb_after_a_noun_is_binary() {
        match parse("a + b") {
            Ast::Binary(OpTag::Plus, l, r) => {
                assert!(matches!(*l, Ast::Var(_)));
                assert!(matches!(*r, Ast::Var(_)));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn bare_verb_curries_onto_a_following_unary_chain() {
        // "sin - x" applies sin to the unary-negated argument, the one case
        // where a verb value still admits another verb as its argument.
        match parse("sin - x") {
            Ast::Call(callee, args) => {
                assert!(matches!(*callee, Ast::Literal(Value::Verb(OpTag::Sin))));
                assert_eq!(args.len(), 1);
                assert!(matches!(args[0], Ast::Unary(OpTag::Minus, _)));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn right_associative_chain() {
        // 2*3+4 means 2*(3+4)
        match parse("2*3+4") {
            Ast::Binary(OpTag::Star, l, r) => {
                assert!(matches!(*l, Ast::Literal(Value::Int(2))));
                match *r {
                    Ast::Binary(OpTag::Plus, _, _) => {}
                    other => panic!("expected nested plus, got {:?}", other),
                }
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn negative_number_heuristic() {
        match parse("1 -2") {
            Ast::Literal(Value::Vector(v)) => {
                let v = v.borrow();
                assert!(matches!(v[0], Value::Int(1)));
                assert!(matches!(v[1], Value::Int(-2)));
            }
            other => panic!("expected stranded vector, got {:?}", other),
        }
        match parse("1 - 2") {
            Ast::Binary(OpTag::Minus, _, _) => {}
            other => panic!("expected binary minus, got {:?}", other),
        }
    }

    #[test]
    fn adverb_over_range() {
        match parse("+/!5") {
            Ast::Call(callee, args) => {
                assert!(matches!(*callee, Ast::Adverb(OpTag::Over, _)));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn each_over_lambda() {
        match parse("{x*x}'1 2 3") {
            Ast::Call(callee, args) => {
                assert!(matches!(*callee, Ast::Adverb(OpTag::Each, _)));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn bracket_call() {
        match parse("f[2;3]") {
            Ast::Call(_, args) => assert_eq!(args.len(), 2),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn conditional() {
        match parse("$[0;\"t\";\"f\"]") {
            Ast::Conditional(_, _, _) => {}
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn assignment_with_index() {
        match parse("a[1]:99") {
            Ast::Binary(OpTag::Colon, l, _) => {
                assert!(matches!(*l, Ast::Call(_, _)));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn curried_unary_chain_at_end() {
        // "- -" at end of expression with nothing to apply to: curries into
        // a one-argument lambda.
        match parse("- -") {
            Ast::Literal(Value::Lambda(l)) => assert_eq!(l.arity, 1),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn single_trailing_operator_is_a_verb_value() {
        match parse("f:-") {
            Ast::Binary(OpTag::Colon, _, r) => {
                assert!(matches!(*r, Ast::Literal(Value::Verb(OpTag::Minus))));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn sequence_of_top_level_expressions() {
        match parse("f:{x+y}; f[2;3]") {
            Ast::Seq(exprs) => assert_eq!(exprs.len(), 2),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn lambda_with_trailing_semicolon_suppresses_return() {
        match parse("{x:1;}") {
            Ast::Literal(Value::Lambda(l)) => assert!(!l.explicit_return),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn empty_program_is_nil() {
        match parse("") {
            Ast::Literal(Value::Nil) => {}
            other => panic!("unexpected AST: {:?}", other),
        }
    }
}
