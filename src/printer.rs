//! `print(value)` and the inline renderer it's built from: string/vector
//! quoting, single-element-vector comma prefix, the matrix column-alignment
//! rule, and dict-as-lines.
//!
//! Grounded on `examples/original_source/repl.c` (`kobj_to_string`,
//! `vector_to_string`, `print_inline`, `print`, `ast_to_string`) — ported
//! line for line into the value model here, since that file owns the exact
//! formatting rules §6's "Output format (illustrative)" only sketches.

use std::mem::discriminant;

use crate::ops;
use crate::parser::Ast;
use crate::value::{Dict, LambdaDef, Value};

fn vector_items(v: &Value) -> Vec<Value> {
    match v {
        Value::Vector(items) => items.borrow().clone(),
        _ => vec![],
    }
}

/// Approximates C's `%g`: fixed notation with trailing zeros trimmed for
/// numbers in a reasonable magnitude range, otherwise scientific.
fn format_g(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "+0w".to_string() } else { "-0w".to_string() };
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if (1e-4..1e6).contains(&abs) {
        let mut s = format!("{:.6}", f);
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    } else {
        format!("{:e}", f)
    }
}

/// Renders one value the way it would appear nested inside a container
/// (`kobj_to_string`): atoms as themselves, symbols backtick-prefixed,
/// vectors parenthesised and space-separated (or quoted if a string),
/// dicts as `(k|v;k|v)`.
fn atom_str(v: &Value) -> String {
    match v {
        Value::Nil => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_g(*f),
        Value::PInf => "+0w".to_string(),
        Value::NInf => "-0w".to_string(),
        Value::Char(c) => (*c as char).to_string(),
        Value::Sym(s) => format!("`{}", s),
        Value::Vector(_) => vector_to_string(v),
        Value::Verb(tag) => ops::print_text(*tag).to_string(),
        Value::Adverb(tag, child) => format!("{}{}", atom_str(child), ops::print_text(*tag)),
        Value::Projection(p) => {
            let args: Vec<String> = p.args.iter().map(atom_str).collect();
            format!("{}[{}]", atom_str(&p.callable), args.join(";"))
        }
        Value::Lambda(l) => lambda_to_string(l),
        Value::Dict(d) => dict_inline_string(d),
    }
}

fn vector_to_string(v: &Value) -> String {
    if v.is_char_vector() {
        let items = vector_items(v);
        let mut s = String::from("\"");
        for it in items {
            if let Value::Char(c) = it {
                s.push(c as char);
            }
        }
        s.push('"');
        return s;
    }
    let items = vector_items(v);
    let parts: Vec<String> = items.iter().map(atom_str).collect();
    format!("({})", parts.join(" "))
}

fn dict_inline_string(d: &Dict) -> String {
    let keys = vector_items(&d.keys);
    let values = vector_items(&d.values);
    if keys.is_empty() {
        return "()".to_string();
    }
    let parts: Vec<String> = keys
        .iter()
        .zip(values.iter())
        .map(|(k, v)| format!("{}|{}", atom_str(k), atom_str(v)))
        .collect();
    format!("({})", parts.join(";"))
}

fn lambda_to_string(l: &LambdaDef) -> String {
    let mut s = String::from("{");
    if !l.params.is_empty() {
        s.push('[');
        s.push_str(&l.params.join(";"));
        s.push(']');
    }
    let bodies: Vec<String> = l.body.iter().map(ast_to_string).collect();
    s.push_str(&bodies.join(";"));
    s.push('}');
    s
}

/// Reconstructs source text for a lambda body, matching `ast_to_string`'s
/// limited coverage (literal/var/unary/binary/seq); anything else renders as
/// `<expr>`, exactly as the source does.
fn ast_to_string(ast: &Ast) -> String {
    match ast {
        Ast::Literal(v) => match v {
            Value::Sym(s) => format!("`{}", s),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_g(*f),
            Value::Vector(_) if v.is_char_vector() => vector_to_string(v),
            _ => "<obj>".to_string(),
        },
        Ast::Var(name) => name.to_string(),
        Ast::Unary(op, child) => format!("{}{}", ops::print_text(*op), ast_to_string(child)),
        Ast::Binary(op, l, r) => format!("{}{}{}", ast_to_string(l), ops::print_text(*op), ast_to_string(r)),
        Ast::Seq(items) => items.iter().map(ast_to_string).collect::<Vec<_>>().join(";"),
        _ => "<expr>".to_string(),
    }
}

/// `print_inline`: used for a single-element vector's lone member and
/// recursively inside nested non-string vectors. Parenthesises when shape
/// is non-uniform or elements are themselves nested vectors; omits spaces
/// between adjacent symbols.
fn print_inline(v: &Value) -> String {
    if v.is_nil() {
        return String::new();
    }
    if let Value::Char(c) = v {
        return format!("\"{}\"", *c as char);
    }
    if v.is_vector() && !v.is_char_vector() {
        let items = vector_items(v);
        let n = items.len();
        let mut need_paren = n == 0;
        let mut uniform = true;
        let mut first: Option<std::mem::Discriminant<Value>> = None;
        for item in &items {
            if item.is_vector() && !item.is_char_vector() {
                need_paren = true;
            }
            let d = discriminant(item);
            match first {
                None => first = Some(d),
                Some(f) if f != d => uniform = false,
                _ => {}
            }
        }
        if !uniform {
            need_paren = true;
        }
        let all_syms = uniform && items.iter().all(|it| matches!(it, Value::Sym(_)));
        let mut s = String::new();
        if need_paren {
            s.push('(');
        }
        for (i, item) in items.iter().enumerate() {
            s.push_str(&print_inline(item));
            if i + 1 < n {
                if need_paren {
                    s.push(';');
                } else if !all_syms {
                    s.push(' ');
                }
            }
        }
        if need_paren {
            s.push(')');
        }
        return s;
    }
    atom_str(v)
}

/// `Display` rendering for a bare value (no trailing newline, no top-level
/// dict/matrix layout) — what a value looks like nested inside another.
pub fn render(v: &Value) -> String {
    atom_str(v)
}

/// Top-level `print(value)`: returns `None` when nothing should be printed
/// at all (Nil), else the full rendering including its trailing newline(s).
pub fn print(v: &Value) -> Option<String> {
    if v.is_nil() {
        return None;
    }
    if let Value::Dict(d) = v {
        return Some(print_dict(d));
    }
    let items = vector_items(v);
    if v.is_vector() && !v.is_char_vector() && items.len() == 1 {
        return Some(format!(",{}\n", print_inline(&items[0])));
    }
    if !v.is_vector() || v.is_char_vector() {
        return Some(format!("{}\n", atom_str(v)));
    }

    let n = items.len();
    let mut simple = true;
    let mut all_strings = true;
    let mut all_syms = true;
    for item in &items {
        if item.is_vector() && !item.is_char_vector() {
            simple = false;
        }
        if !(item.is_vector() && item.is_char_vector()) {
            all_strings = false;
        }
        if !matches!(item, Value::Sym(_)) {
            all_syms = false;
        }
    }

    if simple {
        if all_strings {
            let all_single_chars = items.iter().all(|it| vector_items(it).len() == 1);
            if all_single_chars {
                let mut s = String::from("\"");
                for it in &items {
                    if let Value::Char(c) = vector_items(it)[0] {
                        s.push(c as char);
                    }
                }
                s.push_str("\"\n");
                return Some(s);
            }
            let mut s = String::new();
            for it in &items {
                s.push_str(&atom_str(it));
                s.push('\n');
            }
            return Some(s);
        }
        let mut s = String::new();
        for (i, it) in items.iter().enumerate() {
            s.push_str(&atom_str(it));
            if !all_syms && i + 1 < n {
                s.push(' ');
            }
        }
        s.push('\n');
        return Some(s);
    }

    // Matrix: every row rendered into cells, columns padded to the widest
    // cell in that column plus one space of separation.
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(n);
    let mut max_cols = 0;
    for item in &items {
        if item.is_vector() && !item.is_char_vector() {
            let row: Vec<String> = vector_items(item).iter().map(atom_str).collect();
            max_cols = max_cols.max(row.len());
            cells.push(row);
        } else {
            cells.push(vec![atom_str(item)]);
            max_cols = max_cols.max(1);
        }
    }
    let mut col_w = vec![0usize; max_cols];
    for row in &cells {
        for (c, cell) in row.iter().enumerate() {
            col_w[c] = col_w[c].max(cell.chars().count());
        }
    }
    let mut s = String::new();
    for row in &cells {
        for (c, cell) in row.iter().enumerate() {
            s.push_str(cell);
            if c + 1 < row.len() {
                let pad = if col_w[c] > cell.chars().count() {
                    col_w[c] - cell.chars().count() + 1
                } else {
                    1
                };
                s.extend(std::iter::repeat(' ').take(pad));
            }
        }
        s.push('\n');
    }
    Some(s)
}

fn print_dict(d: &Dict) -> String {
    let keys = vector_items(&d.keys);
    let values = vector_items(&d.values);
    let mut s = String::new();
    for (k, v) in keys.iter().zip(values.iter()) {
        match k {
            Value::Sym(name) => {
                s.push_str(name);
                s.push('|');
            }
            _ => {
                s.push_str(&atom_str(k));
                s.push('|');
            }
        }
        if v.is_vector() && !v.is_char_vector() {
            let items = vector_items(v);
            let l = items.len();
            if l == 1 {
                s.push(',');
            }
            for (j, it) in items.iter().enumerate() {
                s.push_str(&atom_str(it));
                if j + 1 < l {
                    s.push(' ');
                }
            }
        } else {
            s.push_str(&atom_str(v));
        }
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    fn ivec(xs: &[i64]) -> Value {
        Value::vector(xs.iter().map(|x| Value::Int(*x)).collect())
    }

    #[test]
    fn atom_has_trailing_newline() {
        assert_eq!(print(&Value::Int(5)), Some("5\n".to_string()));
    }

    #[test]
    fn nil_prints_nothing() {
        assert_eq!(print(&Value::Nil), None);
    }

    #[test]
    fn single_element_vector_has_leading_comma() {
        assert_eq!(print(&ivec(&[7])), Some(",7\n".to_string()));
    }

    #[test]
    fn char_vector_is_quoted_string() {
        assert_eq!(print(&Value::string("hi")), Some("\"hi\"\n".to_string()));
    }

    #[test]
    fn flat_int_vector_space_separated() {
        assert_eq!(print(&ivec(&[1, 2, 3])), Some("1 2 3\n".to_string()));
    }

    #[test]
    fn matrix_is_column_aligned() {
        let m = Value::vector(vec![ivec(&[1, 22]), ivec(&[333, 4])]);
        let out = print(&m).unwrap();
        assert_eq!(out, "1   22\n333 4\n");
    }

    #[test]
    fn dict_prints_one_line_per_key() {
        use crate::value::Dict as VDict;
        use std::rc::Rc;
        let d = Value::Dict(Rc::new(VDict {
            keys: ivec(&[1, 2]),
            values: ivec(&[10, 20]),
        }));
        assert_eq!(print(&d), Some("1|10\n2|20\n".to_string()));
    }
}
