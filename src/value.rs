//! The tagged value type shared by parser literals and evaluator results.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::ops::OpTag;
use crate::parser::Ast;

/// A K value.
///
/// Containers (`Vector`, `Dict`) and callables that capture state (`Lambda`,
/// `Projection`) are `Rc`-wrapped so that cloning a `Value` is cheap and
/// sharing is observable the way the source's retain/release scheme intended.
/// There is no cycle risk: lambdas never capture an environment, so the value
/// graph is always a DAG (see the design notes on ref-counting).
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Int(i64),
    Float(f64),
    Char(u8),
    PInf,
    NInf,
    Sym(Rc<str>),
    Vector(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<Dict>),
    Verb(OpTag),
    Adverb(OpTag, Rc<Value>),
    Lambda(Rc<LambdaDef>),
    Projection(Rc<Projection>),
}

#[derive(Debug)]
pub struct Dict {
    pub keys: Value,
    pub values: Value,
}

#[derive(Debug)]
pub struct LambdaDef {
    pub params: Vec<Rc<str>>,
    /// Computed once at lambda-construction time and cached here (see design
    /// notes on implicit params): explicit param count, or the highest of
    /// `x`/`y`/`z` referenced in the body when no param list was given.
    pub arity: usize,
    pub body: Vec<Ast>,
    pub explicit_return: bool,
}

#[derive(Debug)]
pub struct Projection {
    pub callable: Value,
    pub args: Vec<Value>,
    pub arity: usize,
}

impl Value {
    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn string(s: &str) -> Value {
        Value::vector(s.bytes().map(Value::Char).collect())
    }

    pub fn sym(name: &str) -> Value {
        Value::Sym(Rc::from(name))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Value::Vector(_))
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// A Vector all of whose elements are `Char` is treated as a string by
    /// printing and by some verbs (`,` fast path, `/`'s join/split).
    pub fn is_char_vector(&self) -> bool {
        match self {
            Value::Vector(v) => {
                let v = v.borrow();
                !v.is_empty() && v.iter().all(|e| matches!(e, Value::Char(_)))
            }
            _ => false,
        }
    }

    /// True for Verb/Adverb/Lambda/Projection: anything that can appear as a
    /// callee in a Call node.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Verb(_) | Value::Adverb(_, _) | Value::Lambda(_) | Value::Projection(_)
        )
    }

    /// Truthiness for `$[cond;then;else]`: Int != 0, Float != 0.0, anything
    /// else non-Nil is true, Nil is false (and should usually have already
    /// short-circuited the caller before this is consulted).
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            _ => true,
        }
    }

    /// Best-effort conversion to an index, used by Vector application.
    /// Returns `None` for non-numeric values (caller reports `^type`).
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Char(c) => Some(*c as f64),
            Value::PInf => Some(f64::INFINITY),
            Value::NInf => Some(f64::NEG_INFINITY),
            _ => None,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Value::Nil
                | Value::Int(_)
                | Value::Float(_)
                | Value::Char(_)
                | Value::PInf
                | Value::NInf
                | Value::Sym(_)
        )
    }
}

/// Identity-based equality for callables, structural for everything else at
/// the atom level. Containers use `match` (verbs.rs) for deep equality; this
/// impl backs the `group`/`=` hash table's bucket comparisons and the
/// "Nil == Nil is true, Verb/Lambda compare by identity" preserved rule.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::PInf, Value::PInf) => true,
            (Value::NInf, Value::NInf) => true,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Verb(a), Value::Verb(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Projection(a), Value::Projection(b)) => Rc::ptr_eq(a, b),
            (Value::Adverb(op_a, a), Value::Adverb(op_b, b)) => op_a == op_b && a == b,
            (Value::Vector(a), Value::Vector(b)) => *a.borrow() == *b.borrow(),
            (Value::Dict(a), Value::Dict(b)) => a.keys == b.keys && a.values == b.values,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::render(self))
    }
}
