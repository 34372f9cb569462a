// ABOUTME: List and sequence builtins: construction, access, joining, indexing, sorting

use super::{
    expect_at_least, expect_between, expect_exact, numeric_or_error, same_flavor, seq_or_error,
    BuiltinDef, Seq,
};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::eval::call_function;
use crate::value::{Expr, Unit, UnitRef};
use std::rc::Rc;

pub fn builtin_list(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = super::call_args(call);
    Ok(Unit::new(call.pos, Expr::Quoted(args.to_vec())))
}

inventory::submit! {
    BuiltinDef {
        name: "list",
        description: "Collects its arguments into a Q expression.",
        is_macro: false,
        call: builtin_list,
    }
}

pub fn builtin_head(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("head", call, 1)?;
    match seq_or_error(&args[0])? {
        Seq::Items { children, quoted } => match children.first() {
            Some(first) => Ok(Rc::clone(first)),
            None => Ok(same_flavor(args[0].pos, Vec::new(), quoted)),
        },
        Seq::Text(text) => {
            let first: String = text.chars().take(1).collect();
            Ok(Unit::raw_str(args[0].pos, first))
        }
    }
}

pub fn builtin_tail(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("tail", call, 1)?;
    match seq_or_error(&args[0])? {
        Seq::Items { children, quoted } => {
            let rest = children.iter().skip(1).cloned().collect();
            Ok(same_flavor(args[0].pos, rest, quoted))
        }
        Seq::Text(text) => {
            let rest: String = text.chars().skip(1).collect();
            Ok(Unit::raw_str(args[0].pos, rest))
        }
    }
}

pub fn builtin_last(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("last", call, 1)?;
    match seq_or_error(&args[0])? {
        Seq::Items { children, quoted } => match children.last() {
            Some(last) => Ok(Rc::clone(last)),
            None => Ok(same_flavor(args[0].pos, Vec::new(), quoted)),
        },
        Seq::Text(text) => {
            let last: String = text.chars().last().map(String::from).unwrap_or_default();
            Ok(Unit::raw_str(args[0].pos, last))
        }
    }
}

pub fn builtin_init(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("init", call, 1)?;
    match seq_or_error(&args[0])? {
        Seq::Items { children, quoted } => {
            let len = children.len().saturating_sub(1);
            Ok(same_flavor(args[0].pos, children[..len].to_vec(), quoted))
        }
        Seq::Text(text) => {
            let count = text.chars().count().saturating_sub(1);
            let init: String = text.chars().take(count).collect();
            Ok(Unit::raw_str(args[0].pos, init))
        }
    }
}

inventory::submit! {
    BuiltinDef {
        name: "head",
        description: "Returns the first element of a list or a raw string.",
        is_macro: false,
        call: builtin_head,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "tail",
        description: "Returns the list or raw string without its first element.",
        is_macro: false,
        call: builtin_tail,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "last",
        description: "Returns the last element of a list or a raw string.",
        is_macro: false,
        call: builtin_last,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "init",
        description: "Returns the list or raw string without its last element.",
        is_macro: false,
        call: builtin_init,
    }
}

pub fn builtin_join(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_at_least("join", call, 1)?;
    match seq_or_error(&args[0])? {
        Seq::Items { quoted, .. } => {
            let mut joined = Vec::new();
            for arg in args {
                match seq_or_error(arg)? {
                    Seq::Items { children, .. } => joined.extend_from_slice(children),
                    Seq::Text(_) => return Err(EvalError::expected("a list", arg.pos)),
                }
            }
            Ok(same_flavor(call.pos, joined, quoted))
        }
        Seq::Text(_) => {
            let mut joined = String::new();
            for arg in args {
                match seq_or_error(arg)? {
                    Seq::Text(text) => joined.push_str(text),
                    Seq::Items { .. } => {
                        return Err(EvalError::expected("a raw string", arg.pos))
                    }
                }
            }
            Ok(Unit::raw_str(call.pos, joined))
        }
    }
}

inventory::submit! {
    BuiltinDef {
        name: "join",
        description: "Joins one or more lists or raw strings.",
        is_macro: false,
        call: builtin_join,
    }
}

pub fn builtin_cons(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("cons", call, 2)?;
    match &args[1].expr {
        Expr::List(children) | Expr::Quoted(children) => {
            let mut extended = Vec::with_capacity(children.len() + 1);
            extended.push(Rc::clone(&args[0]));
            extended.extend_from_slice(children);
            let quoted = matches!(args[1].expr, Expr::Quoted(_));
            Ok(same_flavor(call.pos, extended, quoted))
        }
        Expr::Map(map) => {
            let pair = args[0]
                .children()
                .filter(|c| c.len() == 2)
                .ok_or_else(|| {
                    EvalError::expected("a two element list to insert into a map", args[0].pos)
                })?;
            let updated = map.insert(Rc::clone(&pair[0]), Rc::clone(&pair[1]));
            Ok(Unit::new(call.pos, Expr::Map(updated)))
        }
        _ => Err(EvalError::expected("a list or a map", args[1].pos)),
    }
}

inventory::submit! {
    BuiltinDef {
        name: "cons",
        description: "Prepends a value to a list, or inserts a {key value} pair into a map.",
        is_macro: false,
        call: builtin_cons,
    }
}

pub fn builtin_at(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("at", call, 2)?;
    if let Expr::Map(map) = &args[0].expr {
        return Ok(map
            .get(&args[1])
            .cloned()
            .unwrap_or_else(|| Unit::empty_list(call.pos)));
    }

    let index = numeric_or_error(&args[1])?;
    if index < 0 {
        return Err(EvalError::expected("a non-negative index", args[1].pos));
    }
    let index = index as usize;

    match seq_or_error(&args[0])? {
        Seq::Items { children, .. } => children
            .get(index)
            .cloned()
            .ok_or_else(|| EvalError::new("Index out of range.", args[1].pos)),
        Seq::Text(text) => text
            .chars()
            .nth(index)
            .map(|c| Unit::raw_str(args[0].pos, c.to_string()))
            .ok_or_else(|| EvalError::new("Index out of range.", args[1].pos)),
    }
}

inventory::submit! {
    BuiltinDef {
        name: "at",
        description: "Indexes into a list or a raw string, or looks a key up in a map.",
        is_macro: false,
        call: builtin_at,
    }
}

pub fn builtin_len(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("len", call, 1)?;
    let len = match &args[0].expr {
        Expr::List(children) | Expr::Quoted(children) => children.len(),
        Expr::Str(s) if s.raw => s.text.chars().count(),
        Expr::Map(map) => map.len(),
        _ => {
            return Err(EvalError::expected(
                "a list, a raw string, or a map",
                args[0].pos,
            ))
        }
    };
    Ok(Unit::number(call.pos, len as i64))
}

inventory::submit! {
    BuiltinDef {
        name: "len",
        description: "Calculates the length of a list, a raw string, or a map.",
        is_macro: false,
        call: builtin_len,
    }
}

/// Stable merge sort that propagates comparator failures instead of
/// swallowing them; the standard sort routines cannot carry a Result out of
/// the comparison.
fn merge_sort<F>(items: Vec<UnitRef>, less: &F) -> Result<Vec<UnitRef>, EvalError>
where
    F: Fn(&UnitRef, &UnitRef) -> Result<bool, EvalError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, less)?;
    let right = merge_sort(right, less)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut l = left.into_iter().peekable();
    let mut r = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (l.peek(), r.peek()) {
        // Equal elements keep their original order.
        if less(b, a)? {
            merged.push(r.next().expect("peeked"));
        } else {
            merged.push(l.next().expect("peeked"));
        }
    }
    merged.extend(l);
    merged.extend(r);
    Ok(merged)
}

pub fn builtin_sorted(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_between("sorted", call, 1, 2)?;
    let (children, quoted) = match &args[0].expr {
        Expr::List(children) => (children.clone(), false),
        Expr::Quoted(children) => (children.clone(), true),
        _ => return Err(EvalError::expected("a list", args[0].pos)),
    };

    let sorted = if let Some(comparator) = args.get(1) {
        if !matches!(comparator.expr, Expr::Fn(_)) {
            return Err(EvalError::expected("a function comparator", comparator.pos));
        }
        let less = |a: &UnitRef, b: &UnitRef| -> Result<bool, EvalError> {
            let verdict = call_function(comparator, &[Rc::clone(a), Rc::clone(b)], call.pos, env)?;
            verdict
                .as_number()
                .map(|n| n != 0)
                .ok_or_else(|| EvalError::expected("a numeric comparator result", verdict.pos))
        };
        merge_sort(children, &less)?
    } else {
        merge_sort(children, &super::comparison::less_than)?
    };

    Ok(same_flavor(call.pos, sorted, quoted))
}

inventory::submit! {
    BuiltinDef {
        name: "sorted",
        description: "Returns a new list with sorted elements. Supports a custom comparator.",
        is_macro: false,
        call: builtin_sorted,
    }
}
