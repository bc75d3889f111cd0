//! Elementwise arithmetic/comparison with broadcast, plus the structural
//! verbs (reverse, flip, count, first, enlist, where, group, enum, take,
//! drop, concat, key, match, sort, grade).
//!
//! Grounded throughout on `examples/original_source/builtins.c`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::error::KError;
use crate::value::{Dict, Value};

type R = Result<Value, KError>;

// ---------------------------------------------------------------------
// Broadcast harness
// ---------------------------------------------------------------------

/// Recurses through Dict -> Vector -> scalar, matching the source's
/// `apply_binary`/`apply_dict_binary`/`apply_vector_binary` chain. Keys are
/// preserved on Dicts; equal-length Vectors zip; a scalar broadcasts over a
/// Vector.
fn broadcast_binary(l: &Value, r: &Value, scalar: fn(&Value, &Value) -> R) -> R {
    match (l, r) {
        (Value::Dict(d), other) => {
            let values = broadcast_binary(&d.values, other, scalar)?;
            Ok(Value::Dict(Rc::new(Dict {
                keys: d.keys.clone(),
                values,
            })))
        }
        (other, Value::Dict(d)) => {
            let values = broadcast_binary(other, &d.values, scalar)?;
            Ok(Value::Dict(Rc::new(Dict {
                keys: d.keys.clone(),
                values,
            })))
        }
        (Value::Vector(a), Value::Vector(b)) => {
            let a = a.borrow();
            let b = b.borrow();
            if a.len() != b.len() {
                return Err(KError::Length);
            }
            let out = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| broadcast_binary(x, y, scalar))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        (Value::Vector(a), scalar_r) => {
            let a = a.borrow();
            let out = a
                .iter()
                .map(|x| broadcast_binary(x, scalar_r, scalar))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        (scalar_l, Value::Vector(b)) => {
            let b = b.borrow();
            let out = b
                .iter()
                .map(|y| broadcast_binary(scalar_l, y, scalar))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        (a, b) => scalar(a, b),
    }
}

fn num_pair(a: &Value, b: &Value) -> Option<(f64, f64, bool)> {
    let is_float = matches!(a, Value::Float(_)) || matches!(b, Value::Float(_));
    Some((a.as_f64()?, b.as_f64()?, is_float))
}

fn numeric_result(a: &Value, b: &Value, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> R {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int_op(*x, *y))),
        _ => {
            let (x, y, _) = num_pair(a, b).ok_or(KError::Type)?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

// --- arithmetic ---------------------------------------------------------

fn add_scalar(a: &Value, b: &Value) -> R {
    numeric_result(a, b, |x, y| x.wrapping_add(y), |x, y| x + y)
}
fn sub_scalar(a: &Value, b: &Value) -> R {
    numeric_result(a, b, |x, y| x.wrapping_sub(y), |x, y| x - y)
}
fn mul_scalar(a: &Value, b: &Value) -> R {
    numeric_result(a, b, |x, y| x.wrapping_mul(y), |x, y| x * y)
}
fn div_scalar(a: &Value, b: &Value) -> R {
    let (x, y, _) = num_pair(a, b).ok_or(KError::Type)?;
    if y == 0.0 {
        return Ok(if x >= 0.0 { Value::PInf } else { Value::NInf });
    }
    Ok(Value::Float(x / y))
}
fn min_scalar(a: &Value, b: &Value) -> R {
    numeric_result(a, b, |x, y| x.min(y), |x, y| x.min(y))
}
fn max_scalar(a: &Value, b: &Value) -> R {
    numeric_result(a, b, |x, y| x.max(y), |x, y| x.max(y))
}

pub fn add(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, add_scalar)
}
pub fn sub(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, sub_scalar)
}
pub fn mul(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, mul_scalar)
}
pub fn div(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, div_scalar)
}
pub fn min(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, min_scalar)
}
pub fn max(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, max_scalar)
}

pub fn negate(v: &Value) -> R {
    match v {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Float(f) => Ok(Value::Float(-f)),
        Value::PInf => Ok(Value::NInf),
        Value::NInf => Ok(Value::PInf),
        Value::Vector(items) => {
            let out = items
                .borrow()
                .iter()
                .map(negate)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        _ => Err(KError::Type),
    }
}

pub fn sqrt(v: &Value) -> R {
    match v.as_f64() {
        Some(f) if f >= 0.0 => Ok(Value::Float(f.sqrt())),
        Some(_) => Err(KError::Domain),
        None => match v {
            Value::Vector(items) => {
                let out = items
                    .borrow()
                    .iter()
                    .map(sqrt)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::vector(out))
            }
            _ => Err(KError::Type),
        },
    }
}

fn map_unary_numeric(v: &Value, f: fn(f64) -> f64) -> R {
    match v.as_f64() {
        Some(x) => Ok(Value::Float(f(x))),
        None => match v {
            Value::Vector(items) => {
                let out = items
                    .borrow()
                    .iter()
                    .map(|x| map_unary_numeric(x, f))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::vector(out))
            }
            _ => Err(KError::Type),
        },
    }
}

pub fn sin(v: &Value) -> R {
    map_unary_numeric(v, f64::sin)
}
pub fn cos(v: &Value) -> R {
    map_unary_numeric(v, f64::cos)
}
pub fn abs(v: &Value) -> R {
    match v {
        Value::Int(i) => Ok(Value::Int(i.abs())),
        _ => map_unary_numeric(v, f64::abs),
    }
}

// --- comparisons ---------------------------------------------------------

fn atom_cmp(a: &Value, b: &Value) -> Result<Ordering, KError> {
    match (a, b) {
        (Value::Sym(x), Value::Sym(y)) => Ok(x.cmp(y)),
        _ => {
            let (x, y, _) = num_pair(a, b).ok_or(KError::Domain)?;
            OrderedFloat(x).partial_cmp(&OrderedFloat(y)).ok_or(KError::Domain)
        }
    }
}

pub fn eq(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, |x, y| Ok(Value::Int((x == y) as i64)))
}
pub fn less(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, |x, y| Ok(Value::Int((atom_cmp(x, y)? == Ordering::Less) as i64)))
}
pub fn more(a: &Value, b: &Value) -> R {
    broadcast_binary(a, b, |x, y| Ok(Value::Int((atom_cmp(x, y)? == Ordering::Greater) as i64)))
}

pub fn not(v: &Value) -> R {
    match v {
        Value::Vector(items) => {
            let out = items
                .borrow()
                .iter()
                .map(not)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        other => Ok(Value::Int(!other.truthy() as i64)),
    }
}

/// Full structural equality (`~`), including the Char-vs-1-length-Char-vector
/// special case (a bare Char matches a length-1 char-vector of the same byte).
pub fn match_values(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Vector(x), Value::Vector(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| match_values(a, b))
        }
        (Value::Char(c), Value::Vector(y)) | (Value::Vector(y), Value::Char(c)) => {
            let y = y.borrow();
            y.len() == 1 && matches!(y[0], Value::Char(yc) if yc == *c)
        }
        (Value::Dict(x), Value::Dict(y)) => match_values(&x.keys, &y.keys) && match_values(&x.values, &y.values),
        _ => a == b,
    }
}

pub fn match_(a: &Value, b: &Value) -> R {
    Ok(Value::Int(match_values(a, b) as i64))
}

// ---------------------------------------------------------------------
// Structural verbs
// ---------------------------------------------------------------------

pub fn count(v: &Value) -> R {
    Ok(Value::Int(match v {
        Value::Nil => 0,
        Value::Vector(items) => items.borrow().len() as i64,
        Value::Dict(d) => match &d.keys {
            Value::Vector(k) => k.borrow().len() as i64,
            _ => 0,
        },
        _ => 1,
    }))
}

pub fn first(v: &Value) -> R {
    match v {
        Value::Vector(items) => Ok(items.borrow().first().cloned().unwrap_or(Value::Nil)),
        other => Ok(other.clone()),
    }
}

pub fn enlist(v: &Value) -> R {
    Ok(Value::vector(vec![v.clone()]))
}

pub fn reverse(v: &Value) -> R {
    match v {
        Value::Vector(items) => {
            let mut out = items.borrow().clone();
            out.reverse();
            Ok(Value::vector(out))
        }
        other => Ok(other.clone()),
    }
}

/// "where": expands an Int-vector `v` into a flat Int-vector repeating each
/// index `i` exactly `v[i]` times.
pub fn where_(v: &Value) -> R {
    let items = match v {
        Value::Vector(items) => items.borrow().clone(),
        Value::Int(n) => vec![Value::Int(*n)],
        _ => return Err(KError::Type),
    };
    let mut out = vec![];
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Int(n) if *n >= 0 => {
                for _ in 0..*n {
                    out.push(Value::Int(i as i64));
                }
            }
            Value::Int(_) => return Err(KError::Domain),
            _ => return Err(KError::Type),
        }
    }
    Ok(Value::vector(out))
}

/// Flip: ragged rows are padded (Int with 0, Char with space) to transpose.
pub fn flip(v: &Value) -> R {
    let rows = match v {
        Value::Vector(items) => items.borrow().clone(),
        other => return Ok(other.clone()),
    };
    let row_vecs: Vec<Vec<Value>> = rows
        .iter()
        .map(|r| match r {
            Value::Vector(items) => items.borrow().clone(),
            other => vec![other.clone()],
        })
        .collect();
    let width = row_vecs.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut cols = vec![];
    for c in 0..width {
        let mut col = vec![];
        for row in &row_vecs {
            col.push(match row.get(c) {
                Some(v) => v.clone(),
                None => match row.first() {
                    Some(Value::Char(_)) => Value::Char(b' '),
                    _ => Value::Int(0),
                },
            });
        }
        cols.push(Value::vector(col));
    }
    Ok(Value::vector(cols))
}

pub fn floor(v: &Value) -> R {
    match v {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(f.floor() as i64)),
        Value::Char(c) => Ok(Value::Char(c.to_ascii_lowercase())),
        Value::Vector(items) => {
            let out = items
                .borrow()
                .iter()
                .map(floor)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vector(out))
        }
        _ => Err(KError::Type),
    }
}

/// Binary `#`: Int cyclic reshape, or Int-vector multi-dimensional reshape.
pub fn take(shape: &Value, v: &Value) -> R {
    let source: Vec<Value> = match v {
        Value::Vector(items) => items.borrow().clone(),
        other => vec![other.clone()],
    };
    if source.is_empty() {
        return Err(KError::Length);
    }
    match shape {
        Value::Int(n) => Ok(Value::vector(take_n(&source, *n))),
        Value::Vector(dims) => {
            let dims: Vec<i64> = dims
                .borrow()
                .iter()
                .map(|d| match d {
                    Value::Int(i) => Ok(*i),
                    _ => Err(KError::Type),
                })
                .collect::<Result<_, _>>()?;
            let clamped: Vec<usize> = dims.iter().map(|d| (*d).max(0) as usize).collect();
            let total: usize = clamped.iter().product();
            let flat = take_n(&source, total as i64);
            Ok(build_shape(&flat, &clamped))
        }
        _ => Err(KError::Type),
    }
}

fn take_n(source: &[Value], n: i64) -> Vec<Value> {
    let len = source.len();
    if len == 0 || n <= 0 {
        return vec![];
    }
    let n = n as usize;
    (0..n).map(|i| source[i % len].clone()).collect()
}

fn build_shape(flat: &[Value], dims: &[usize]) -> Value {
    if dims.len() <= 1 {
        return Value::vector(flat.to_vec());
    }
    let chunk_size: usize = dims[1..].iter().product();
    let rows: Vec<Value> = flat
        .chunks(chunk_size.max(1))
        .take(dims[0])
        .map(|chunk| build_shape(chunk, &dims[1..]))
        .collect();
    Value::vector(rows)
}

/// Binary `_`: Int chops from front/back, Int-vector removes matching
/// elements. The callable-predicate form needs `Env` to invoke the predicate
/// and is handled by `eval::drop_with_predicate` instead.
pub fn drop(n: &Value, v: &Value) -> R {
    let items = match v {
        Value::Vector(items) => items.borrow().clone(),
        _ => return Err(KError::Type),
    };
    match n {
        Value::Int(n) => Ok(Value::vector(drop_int(&items, *n))),
        Value::Vector(remove) => {
            let remove = remove.borrow();
            let out: Vec<Value> = items
                .into_iter()
                .filter(|item| !remove.iter().any(|r| match_values(item, r)))
                .collect();
            Ok(Value::vector(out))
        }
        _ => Err(KError::Type),
    }
}

fn drop_int(items: &[Value], n: i64) -> Vec<Value> {
    let len = items.len() as i64;
    if n >= 0 {
        let skip = n.min(len) as usize;
        items[skip..].to_vec()
    } else {
        let keep = (len + n).max(0) as usize;
        items[..keep].to_vec()
    }
}

pub fn concat(a: &Value, b: &Value) -> R {
    if a.is_char_vector() && b.is_char_vector() {
        let (Value::Vector(av), Value::Vector(bv)) = (a, b) else {
            unreachable!()
        };
        let mut out = av.borrow().clone();
        out.extend(bv.borrow().iter().cloned());
        return Ok(Value::vector(out));
    }
    let mut out = match a {
        Value::Vector(items) => items.borrow().clone(),
        other => vec![other.clone()],
    };
    match b {
        Value::Vector(items) => out.extend(items.borrow().iter().cloned()),
        other => out.push(other.clone()),
    }
    Ok(Value::vector(out))
}

/// Unary `!`: atom n>=0 -> 0..n-1; n<0 -> identity matrix of size |n|;
/// a Vector of dims -> Cartesian axis rows.
pub fn enumerate(v: &Value) -> R {
    match v {
        Value::Int(n) if *n >= 0 => Ok(Value::vector((0..*n).map(Value::Int).collect())),
        Value::Int(n) => {
            let size = n.unsigned_abs() as usize;
            let rows: Vec<Value> = (0..size)
                .map(|i| {
                    Value::vector(
                        (0..size)
                            .map(|j| Value::Int((i == j) as i64))
                            .collect(),
                    )
                })
                .collect();
            Ok(Value::vector(rows))
        }
        Value::Vector(dims) => {
            let dims: Vec<i64> = dims
                .borrow()
                .iter()
                .map(|d| match d {
                    Value::Int(i) => Ok(*i),
                    _ => Err(KError::Type),
                })
                .collect::<Result<_, _>>()?;
            Ok(build_enum_rows(&dims))
        }
        _ => Err(KError::Type),
    }
}

fn build_enum_rows(dims: &[i64]) -> Value {
    let total: i64 = dims.iter().product();
    let axes: Vec<Vec<i64>> = (0..dims.len())
        .map(|axis| {
            let stride: i64 = dims[axis + 1..].iter().product();
            let period = dims[axis].max(1) * stride.max(1);
            (0..total)
                .map(|i| (i / stride.max(1)) % dims[axis].max(1))
                .collect::<Vec<_>>()
                .into_iter()
                .take(period as usize)
                .collect()
        })
        .collect();
    Value::vector(
        axes.into_iter()
            .map(|row| Value::vector(row.into_iter().map(Value::Int).collect()))
            .collect(),
    )
}

/// Binary `!`: pairs two equal-length atom-only vectors into a Dict.
pub fn key(keys: &Value, values: &Value) -> R {
    let (klen, vlen) = (count_len(keys)?, count_len(values)?);
    if klen != vlen {
        return Err(KError::Length);
    }
    Ok(Value::Dict(Rc::new(Dict {
        keys: keys.clone(),
        values: values.clone(),
    })))
}

fn count_len(v: &Value) -> Result<usize, KError> {
    match v {
        Value::Vector(items) => Ok(items.borrow().len()),
        _ => Err(KError::Type),
    }
}

/// Grade up/down: a stable, iterative bottom-up merge sort over an index
/// permutation, so the comparator can surface `^domain` on heterogeneous
/// input without a library sort swallowing the error.
fn grade(v: &Value, ascending: bool) -> R {
    let items = match v {
        Value::Vector(items) => items.borrow().clone(),
        _ => return Err(KError::Type),
    };
    let n = items.len();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut buf = perm.clone();
    let mut width = 1;
    while width < n {
        let mut i = 0;
        while i < n {
            let mid = (i + width).min(n);
            let end = (i + 2 * width).min(n);
            let (mut l, mut r, mut k) = (i, mid, i);
            while l < mid && r < end {
                let ord = atom_cmp(&items[perm[l]], &items[perm[r]])?;
                let take_left = if ascending {
                    ord != Ordering::Greater
                } else {
                    ord != Ordering::Less
                };
                if take_left {
                    buf[k] = perm[l];
                    l += 1;
                } else {
                    buf[k] = perm[r];
                    r += 1;
                }
                k += 1;
            }
            while l < mid {
                buf[k] = perm[l];
                l += 1;
                k += 1;
            }
            while r < end {
                buf[k] = perm[r];
                r += 1;
                k += 1;
            }
            i += 2 * width;
        }
        std::mem::swap(&mut perm, &mut buf);
        width *= 2;
    }
    Ok(Value::vector(perm.into_iter().map(|i| Value::Int(i as i64)).collect()))
}

pub fn grade_up(v: &Value) -> R {
    grade(v, true)
}
pub fn grade_down(v: &Value) -> R {
    grade(v, false)
}

pub fn sort(v: &Value) -> R {
    let perm = grade_up(v)?;
    let items = match v {
        Value::Vector(items) => items.borrow().clone(),
        _ => return Err(KError::Type),
    };
    let Value::Vector(p) = perm else { unreachable!() };
    let out: Vec<Value> = p
        .borrow()
        .iter()
        .map(|i| match i {
            Value::Int(i) => items[*i as usize].clone(),
            _ => unreachable!(),
        })
        .collect();
    Ok(Value::vector(out))
}

// --- group / hashing -----------------------------------------------------

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^= x >> 33;
    x
}

fn hash_str64(s: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in s {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

/// A hash key usable in a plain `HashMap`. Values that cannot be grouped
/// meaningfully (Vector/Dict/callables with no stable identity other than
/// pointer identity) hash by pointer.
fn hash_key(v: &Value) -> u64 {
    match v {
        Value::Nil => 0,
        Value::Int(i) => mix64(*i as u64),
        Value::Float(f) => {
            let bits = if *f == 0.0 { 0u64 } else { f.to_bits() };
            mix64(bits)
        }
        Value::Char(c) => mix64(*c as u64),
        Value::PInf => mix64(u64::MAX),
        Value::NInf => mix64(u64::MAX - 1),
        Value::Sym(s) => hash_str64(s.as_bytes()),
        Value::Verb(tag) => mix64(*tag as u64),
        _ => mix64(Rc::as_ptr(&Rc::new(0)) as u64), // unreachable for atomic keys
    }
}

#[derive(PartialEq)]
struct GroupKey(Value);

impl Eq for GroupKey {}

impl std::hash::Hash for GroupKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(hash_key(&self.0));
    }
}

/// Group: build a Dict from distinct values to the Int-vector of their
/// positions.
pub fn group(v: &Value) -> R {
    let items = match v {
        Value::Vector(items) => items.borrow().clone(),
        _ => return Err(KError::Type),
    };
    let mut map: HashMap<GroupKey, Vec<Value>> = HashMap::new();
    let mut order = vec![];
    for (i, item) in items.into_iter().enumerate() {
        let key = GroupKey(item.clone());
        let entry = map.entry(key).or_insert_with(|| {
            order.push(item.clone());
            vec![]
        });
        entry.push(Value::Int(i as i64));
    }
    let keys = Value::vector(order.clone());
    let values = Value::vector(
        order
            .iter()
            .map(|k| map.get(&GroupKey(k.clone())).cloned().unwrap_or_default())
            .map(Value::vector)
            .collect(),
    );
    Ok(Value::Dict(Rc::new(Dict { keys, values })))
}

#[cfg(test)]
mod test {
    use super::*;

    fn ivec(xs: &[i64]) -> Value {
        Value::vector(xs.iter().map(|x| Value::Int(*x)).collect())
    }

    #[test]
    fn broadcast_scalar_over_vector() {
        let v = ivec(&[1, 2, 3]);
        let ten = Value::Int(10);
        let r1 = add(&v, &ten).unwrap();
        let r2 = add(&ten, &v).unwrap();
        assert!(match_values(&r1, &r2));
        assert!(match_values(&r1, &ivec(&[11, 12, 13])));
    }

    #[test]
    fn length_mismatch_errors() {
        let a = ivec(&[1, 2]);
        let b = ivec(&[1, 2, 3]);
        assert_eq!(add(&a, &b), Err(KError::Length));
    }

    #[test]
    fn where_expands_counts() {
        let v = ivec(&[2, 0, 1]);
        let r = where_(&v).unwrap();
        assert!(match_values(&r, &ivec(&[0, 0, 2])));
    }

    #[test]
    fn grade_up_sorts_ascending() {
        let v = ivec(&[3, 1, 2]);
        let p = grade_up(&v).unwrap();
        assert!(match_values(&p, &ivec(&[1, 2, 0])));
    }

    #[test]
    fn take_cyclic_reshape() {
        let v = ivec(&[1, 2, 3]);
        let r = take(&Value::Int(5), &v).unwrap();
        assert!(match_values(&r, &ivec(&[1, 2, 3, 1, 2])));
    }

    #[test]
    fn take_negative_dim_clamps_to_zero() {
        let v = ivec(&[1, 2, 3]);
        let shape = ivec(&[-1, 2]);
        let r = take(&shape, &v).unwrap();
        assert!(match_values(&r, &Value::vector(vec![])));
    }

    #[test]
    fn drop_front_and_back() {
        let v = ivec(&[1, 2, 3, 4, 5]);
        assert!(match_values(&drop(&Value::Int(2), &v).unwrap(), &ivec(&[3, 4, 5])));
        assert!(match_values(&drop(&Value::Int(-2), &v).unwrap(), &ivec(&[1, 2, 3])));
    }

    #[test]
    fn match_is_symmetric_and_reflexive() {
        let a = ivec(&[1, 2, 3]);
        let b = ivec(&[1, 2, 3]);
        assert!(match_values(&a, &b));
        assert!(match_values(&b, &a));
        assert!(match_values(&a, &a));
        assert!(!match_values(&a, &Value::Nil));
    }

    #[test]
    fn group_builds_position_dict() {
        let v = ivec(&[1, 2, 1, 2, 3]);
        let d = group(&v).unwrap();
        if let Value::Dict(d) = d {
            assert!(match_values(&d.keys, &ivec(&[1, 2, 3])));
        } else {
            panic!("expected dict");
        }
    }

    #[test]
    fn enum_nonnegative_is_range() {
        assert!(match_values(&enumerate(&Value::Int(5)).unwrap(), &ivec(&[0, 1, 2, 3, 4])));
    }
}
