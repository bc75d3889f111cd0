//! Tree-walking evaluator: environment resolution, verb/lambda/projection/
//! adverb dispatch, indexed assignment.
//!
//! Grounded on `examples/original_source/eval.c` (`evaluate`, `env_get`/
//! `env_set`/`env_push`/`env_pop`, `call_unary`/`call_binary`/`call_n`) for
//! control flow, with the multi-dimensional assignment walk and Projections
//! built fresh from spec.md §4.4 (the retained `eval.c` only assigns a
//! single bracket level and has no projection type at all).

use std::rc::Rc;

use crate::adverbs;
use crate::error::KError;
use crate::ops::OpDesc;
use crate::parser::Ast;
use crate::value::{LambdaDef, Projection, Value};

/// One name/value frame. A small linear `Vec` mirrors the source's
/// fixed-size `EnvFrame` array; lookup walks frames top-down same as
/// `env_get`.
type Frame = Vec<(Rc<str>, Value)>;

pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    pub fn new() -> Env {
        Env {
            frames: vec![Frame::new()],
        }
    }

    fn push(&mut self) {
        self.frames.push(Frame::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn get(&self, name: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            for (n, v) in frame.iter().rev() {
                if &**n == name {
                    return Some(v.clone());
                }
            }
        }
        None
    }

    fn set(&mut self, name: &str, value: Value) {
        let frame = self.frames.last_mut().expect("env always has a frame");
        for (n, v) in frame.iter_mut() {
            if &**n == name {
                *v = value;
                return;
            }
        }
        frame.push((Rc::from(name), value));
    }

    /// `\v`: every binding in every frame, bottom to top, as `name: value\n`
    /// lines (globals live in the bottom frame).
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for frame in &self.frames {
            for (name, value) in frame {
                out.push_str(name);
                out.push_str(": ");
                if let Some(s) = crate::printer::print(value) {
                    out.push_str(&s);
                } else {
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn fail(e: KError) -> Value {
    println!("{}", e.tag());
    Value::Nil
}

fn unwrap_or_fail(r: Result<Value, KError>) -> Value {
    match r {
        Ok(v) => v,
        Err(e) => fail(e),
    }
}

pub fn eval(ast: &Ast, env: &mut Env) -> Value {
    match ast {
        Ast::Literal(v) => eval_literal(v),
        Ast::Var(name) => match env.get(name) {
            Some(v) => v,
            None => fail(KError::Var),
        },
        Ast::Unary(tag, child) => {
            let v = eval(child, env);
            if v.is_nil() {
                return v;
            }
            let desc = OpDesc::find(*tag);
            match desc.unary {
                Some(f) => unwrap_or_fail(f(&v)),
                None => fail(KError::Nyi),
            }
        }
        Ast::Binary(tag, l, r) => {
            if *tag == crate::ops::OpTag::Colon {
                return eval_assign(l, r, env);
            }
            let lv = eval(l, env);
            if lv.is_nil() {
                return lv;
            }
            let rv = eval(r, env);
            if rv.is_nil() {
                return rv;
            }
            binary_dispatch(*tag, lv, rv, env)
        }
        Ast::Conditional(c, t, e) => {
            let cv = eval(c, env);
            if cv.is_nil() {
                return cv;
            }
            if cv.truthy() {
                eval(t, env)
            } else {
                eval(e, env)
            }
        }
        Ast::Adverb(tag, child) => {
            let cv = eval(child, env);
            if cv.is_nil() {
                return cv;
            }
            Value::Adverb(*tag, Rc::new(cv))
        }
        Ast::Call(callee, args) => eval_call(callee, args, env),
        Ast::Seq(items) => {
            let mut result = Value::Nil;
            for item in items {
                result = eval(item, env);
            }
            result
        }
        Ast::List(items) => {
            let out: Vec<Value> = items.iter().map(|a| eval(a, env)).collect();
            Value::vector(out)
        }
    }
}

/// A stored literal is already a concrete value; a literal Vector is
/// re-walked recursively so that any nested literal which itself contains
/// further structure is consistently deep-cloned rather than aliased. Every
/// other tag is returned as-is (ref-counted clone).
fn eval_literal(v: &Value) -> Value {
    match v {
        Value::Vector(items) => Value::vector(items.borrow().iter().map(eval_literal).collect()),
        other => other.clone(),
    }
}

fn eval_call(callee: &Ast, arg_asts: &[Ast], env: &mut Env) -> Value {
    let fn_val = eval(callee, env);
    if fn_val.is_nil() {
        return fn_val;
    }
    let mut args = Vec::with_capacity(arg_asts.len());
    for a in arg_asts {
        let v = eval(a, env);
        if v.is_nil() {
            return v;
        }
        args.push(v);
    }
    apply(&fn_val, args, env)
}

/// Dispatches a callable (Verb/Lambda/Projection/Adverb) or indexes a
/// Vector, per §4.4's "callable dispatch" table. Exposed so `adverbs.rs` can
/// invoke the same calling convention for each/over/scan/etc children.
pub fn apply(fn_val: &Value, args: Vec<Value>, env: &mut Env) -> Value {
    match fn_val {
        Value::Verb(tag) => {
            let desc = OpDesc::find(*tag);
            match args.len() {
                1 => match desc.unary {
                    Some(f) => unwrap_or_fail(f(&args[0])),
                    None => fail(KError::Rank),
                },
                2 => {
                    let mut it = args.into_iter();
                    let (l, r) = (it.next().unwrap(), it.next().unwrap());
                    binary_dispatch(*tag, l, r, env)
                }
                _ => fail(KError::Rank),
            }
        }
        Value::Lambda(lam) => call_lambda(fn_val, lam, args, env),
        Value::Projection(proj) => {
            let mut combined = proj.args.clone();
            combined.extend(args);
            if combined.len() < proj.arity {
                Value::Projection(Rc::new(Projection {
                    callable: proj.callable.clone(),
                    args: combined,
                    arity: proj.arity,
                }))
            } else {
                apply(&proj.callable.clone(), combined, env)
            }
        }
        Value::Adverb(tag, child) => adverbs::dispatch(*tag, child, &args, env),
        Value::Vector(_) => index_vector(fn_val, &args),
        _ => fail(KError::Type),
    }
}

/// Shared by `Ast::Binary` and a 2-arg `Verb` call: every binary verb slot
/// except `_` is a plain `(&Value,&Value)->Result` function. `_` needs the
/// environment when its left operand is a callable (the filter form), so it
/// is special-cased here rather than threading `Env` through every verb.
fn binary_dispatch(tag: crate::ops::OpTag, lv: Value, rv: Value, env: &mut Env) -> Value {
    if tag == crate::ops::OpTag::Underscore && lv.is_callable() {
        return drop_with_predicate(&lv, &rv, env);
    }
    let desc = OpDesc::find(tag);
    match desc.binary {
        Some(f) => unwrap_or_fail(f(&lv, &rv)),
        None => fail(KError::Nyi),
    }
}

/// `_` with a callable left operand: keeps elements of the Vector `items` for
/// which `pred(item)` is falsy. A sub-call failure (already reported) short
/// circuits and propagates Nil rather than being reported again.
fn drop_with_predicate(pred: &Value, items: &Value, env: &mut Env) -> Value {
    let items = match items {
        Value::Vector(items) => items.borrow().clone(),
        _ => return fail(KError::Type),
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let r = apply(pred, vec![item.clone()], env);
        if r.is_nil() {
            return r;
        }
        if !r.truthy() {
            out.push(item);
        }
    }
    Value::vector(out)
}

fn call_lambda(fn_val: &Value, lam: &LambdaDef, args: Vec<Value>, env: &mut Env) -> Value {
    if args.len() < lam.arity {
        return Value::Projection(Rc::new(Projection {
            callable: fn_val.clone(),
            args,
            arity: lam.arity,
        }));
    }
    env.push();
    if !lam.params.is_empty() {
        let n = lam.params.len().min(args.len());
        for (p, a) in lam.params[..n].iter().zip(args.into_iter()) {
            env.set(p, a);
        }
    } else {
        const DEFAULTS: [&str; 3] = ["x", "y", "z"];
        let n = args.len().min(3);
        for (name, a) in DEFAULTS[..n].iter().zip(args.into_iter()) {
            env.set(name, a);
        }
    }
    let mut result = Value::Nil;
    for expr in &lam.body {
        result = eval(expr, env);
    }
    if !lam.explicit_return {
        result = Value::Nil;
    }
    env.pop();
    result
}

/// Vector application (indexing): each argument is applied as one
/// dimension step, matching `(1 2 3;4 5 6)[1;2]` walking row then column.
/// Out-of-range scalar indices return `Int 0` (preserved design quirk);
/// out-of-range elements inside a gather index yield `^length`.
fn index_vector(base: &Value, args: &[Value]) -> Value {
    let mut current = base.clone();
    for idx in args {
        let items = match &current {
            Value::Vector(items) => items,
            _ => return fail(KError::Type),
        };
        current = match idx {
            Value::Int(_) | Value::Float(_) => {
                let i = idx.as_index().expect("checked above");
                let items = items.borrow();
                if i < 0 || i as usize >= items.len() {
                    Value::Int(0)
                } else {
                    items[i as usize].clone()
                }
            }
            Value::Vector(gather) => {
                let gather = gather.borrow();
                let items = items.borrow();
                let mut out = Vec::with_capacity(gather.len());
                let mut failed = None;
                for g in gather.iter() {
                    let i = match g.as_index() {
                        Some(i) => i,
                        None => {
                            failed = Some(KError::Type);
                            break;
                        }
                    };
                    if i < 0 || i as usize >= items.len() {
                        failed = Some(KError::Length);
                        break;
                    }
                    out.push(items[i as usize].clone());
                }
                if let Some(e) = failed {
                    return fail(e);
                }
                Value::vector(out)
            }
            _ => return fail(KError::Type),
        };
    }
    current
}

/// `ident:rhs`, `ident[i]:rhs`, `ident[i;j;…]:rhs`.
fn eval_assign(lhs: &Ast, rhs: &Ast, env: &mut Env) -> Value {
    match lhs {
        Ast::Var(name) => {
            let rv = eval(rhs, env);
            if rv.is_nil() {
                return rv;
            }
            env.set(name, rv.clone());
            rv
        }
        Ast::Call(callee, idx_asts) => {
            let name = match &**callee {
                Ast::Var(name) => name.clone(),
                _ => return fail(KError::Assign),
            };
            eval_indexed_assign(&name, idx_asts, rhs, env)
        }
        _ => fail(KError::Assign),
    }
}

fn eval_indexed_assign(name: &str, idx_asts: &[Ast], rhs: &Ast, env: &mut Env) -> Value {
    let base = match env.get(name) {
        Some(v) => v,
        None => return fail(KError::Var),
    };

    // Walk every index but the last through nested Vectors, requiring a
    // plain Int at each intermediate level; only the innermost container is
    // ever mutated.
    let mut container = base;
    for idx_ast in &idx_asts[..idx_asts.len().saturating_sub(1)] {
        let idx = eval(idx_ast, env);
        if idx.is_nil() {
            return idx;
        }
        let i = match idx {
            Value::Int(i) => i,
            _ => return fail(KError::Type),
        };
        let next = match &container {
            Value::Vector(items) => {
                let items = items.borrow();
                if i < 0 || i as usize >= items.len() {
                    return fail(KError::Length);
                }
                items[i as usize].clone()
            }
            _ => return fail(KError::Type),
        };
        container = next;
    }

    let idx = eval(&idx_asts[idx_asts.len() - 1], env);
    if idx.is_nil() {
        return idx;
    }
    let rv = eval(rhs, env);
    if rv.is_nil() {
        return rv;
    }

    match assign_into_vector(&container, &idx, &rv) {
        Ok(()) => rv,
        Err(e) => fail(e),
    }
}

fn assign_into_vector(container: &Value, idx: &Value, rhs: &Value) -> Result<(), KError> {
    let cell = match container {
        Value::Vector(cell) => cell,
        _ => return Err(KError::Type),
    };
    match idx {
        Value::Int(i) => {
            let mut items = cell.borrow_mut();
            if *i < 0 || *i as usize >= items.len() {
                return Err(KError::Length);
            }
            items[*i as usize] = rhs.clone();
            Ok(())
        }
        Value::Vector(idx_items) => {
            let idxs: Vec<i64> = idx_items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Ok(*i),
                    _ => Err(KError::Type),
                })
                .collect::<Result<_, _>>()?;
            let (rhs_is_vec, rhs_count) = match rhs {
                Value::Vector(items) => (true, items.borrow().len()),
                _ => (false, 1),
            };
            if rhs_count != idxs.len() {
                return Err(KError::Length);
            }
            let mut items = cell.borrow_mut();
            for i in &idxs {
                if *i < 0 || *i as usize >= items.len() {
                    return Err(KError::Length);
                }
            }
            for (k, i) in idxs.iter().enumerate() {
                let new_val = if rhs_is_vec {
                    match rhs {
                        Value::Vector(rv) => rv.borrow()[k].clone(),
                        _ => unreachable!(),
                    }
                } else {
                    rhs.clone()
                };
                items[*i as usize] = new_val;
            }
            Ok(())
        }
        _ => Err(KError::Type),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str) -> Value {
        let ast = Parser::new(src).parse_program().unwrap();
        let mut env = Env::new();
        eval(&ast, &mut env)
    }

    fn ivec(xs: &[i64]) -> Value {
        Value::vector(xs.iter().map(|x| Value::Int(*x)).collect())
    }

    #[test]
    fn broadcast_add() {
        assert!(crate::verbs::match_values(&run("1 2 3 + 10"), &ivec(&[11, 12, 13])));
    }

    #[test]
    fn over_sums_range() {
        assert!(crate::verbs::match_values(&run("+/!5"), &Value::Int(10)));
    }

    #[test]
    fn nested_indexing() {
        assert!(crate::verbs::match_values(&run("(1 2 3;4 5 6)[1;2]"), &Value::Int(6)));
    }

    #[test]
    fn each_squares() {
        assert!(crate::verbs::match_values(&run("{x*x}'1 2 3"), &ivec(&[1, 4, 9])));
    }

    #[test]
    fn define_and_call_lambda() {
        assert!(crate::verbs::match_values(&run("f:{x+y}; f[2;3]"), &Value::Int(5)));
    }

    #[test]
    fn conditional_picks_else_branch() {
        let v = run("$[0;\"t\";\"f\"]");
        assert!(crate::verbs::match_values(&v, &Value::string("f")));
    }

    #[test]
    fn indexed_assignment_updates_in_place() {
        assert!(crate::verbs::match_values(&run("a:!3; a[1]:99; a"), &ivec(&[0, 99, 2])));
    }

    #[test]
    fn assignment_to_non_name_is_assign_error() {
        // `1:2` — lhs is neither a name nor an indexing call.
        let v = run("1:2");
        assert!(v.is_nil());
    }

    #[test]
    fn missing_var_reports_nil() {
        assert!(run("nosuchname").is_nil());
    }

    #[test]
    fn projection_from_underfull_lambda_call() {
        match run("f:{[a;b;c] a+b+c}; g:f[1]; g[2;3]") {
            Value::Int(6) => {}
            other => panic!("expected 6, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_scalar_index_returns_int_zero() {
        assert!(crate::verbs::match_values(&run("(!3)[10]"), &Value::Int(0)));
    }

    #[test]
    fn out_of_range_gather_index_is_length_error() {
        assert!(run("(!3)[1 2 10]").is_nil());
    }

    #[test]
    fn drop_with_callable_keeps_falsy_elements() {
        // {x>2}_!5 keeps elements where x>2 is falsy, i.e. 0 1 2.
        assert!(crate::verbs::match_values(&run("{x>2}_!5"), &ivec(&[0, 1, 2])));
    }

    #[test]
    fn multi_dim_assignment_only_touches_innermost() {
        assert!(crate::verbs::match_values(
            &run("a:(1 2;3 4); a[0;1]:99; a"),
            &Value::vector(vec![ivec(&[1, 99]), ivec(&[3, 4])]),
        ));
    }
}
