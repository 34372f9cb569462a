// ABOUTME: Builtin registry and the argument helpers shared by the category modules

use crate::env::{EnvNode, EnvNodeRef, Frame};
use crate::error::EvalError;
use crate::value::{BuiltinFn, Callable, Expr, Function, Position, Unit, UnitRef};

pub mod arithmetic;
pub mod binding;
pub mod comparison;
pub mod console;
pub mod control;
pub mod errors;
pub mod filesystem;
pub mod help;
pub mod lambda;
pub mod lists;
pub mod maps;
pub mod quote;
pub mod strings;
pub mod types;

/// One registered builtin. Category modules submit these through `inventory`
/// so the registry never needs a central list to maintain.
pub struct BuiltinDef {
    pub name: &'static str,
    pub description: &'static str,
    pub is_macro: bool,
    pub call: BuiltinFn,
}

inventory::collect!(BuiltinDef);

/// A fresh chain whose root frame holds every registered builtin, installed
/// in name order. The root frame is only written to again by `def`.
pub fn global_environment() -> EnvNodeRef {
    let frame = Frame::new();
    let mut defs: Vec<&BuiltinDef> = inventory::iter::<BuiltinDef>.into_iter().collect();
    defs.sort_by_key(|def| def.name);
    for def in defs {
        frame.define(
            def.name,
            Unit::new(
                Position::default(),
                Expr::Fn(Function {
                    description: def.description.to_string(),
                    callable: Callable::Builtin(def.call),
                    is_macro: def.is_macro,
                    is_syntax: false,
                }),
            ),
        );
    }
    EnvNode::root(frame)
}

// ============================================================================
// Argument helpers
// ============================================================================

/// The arguments of a call list (everything after the callee).
pub(crate) fn call_args(call: &UnitRef) -> &[UnitRef] {
    match &call.expr {
        Expr::List(children) if !children.is_empty() => &children[1..],
        _ => &[],
    }
}

pub(crate) fn expect_exact<'a>(
    name: &str,
    call: &'a UnitRef,
    count: usize,
) -> Result<&'a [UnitRef], EvalError> {
    let args = call_args(call);
    if args.len() != count {
        return Err(EvalError::new(
            format!(
                "{}: expected {} argument{}, got {}.",
                name,
                count,
                if count == 1 { "" } else { "s" },
                args.len()
            ),
            call.pos,
        ));
    }
    Ok(args)
}

pub(crate) fn expect_at_least<'a>(
    name: &str,
    call: &'a UnitRef,
    count: usize,
) -> Result<&'a [UnitRef], EvalError> {
    let args = call_args(call);
    if args.len() < count {
        return Err(EvalError::new(
            format!(
                "{}: expected at least {} argument{}, got {}.",
                name,
                count,
                if count == 1 { "" } else { "s" },
                args.len()
            ),
            call.pos,
        ));
    }
    Ok(args)
}

pub(crate) fn expect_between<'a>(
    name: &str,
    call: &'a UnitRef,
    low: usize,
    high: usize,
) -> Result<&'a [UnitRef], EvalError> {
    let args = call_args(call);
    if args.len() < low || args.len() > high {
        return Err(EvalError::new(
            format!(
                "{}: expected {} to {} arguments, got {}.",
                name,
                low,
                high,
                args.len()
            ),
            call.pos,
        ));
    }
    Ok(args)
}

pub(crate) fn numeric_or_error(u: &UnitRef) -> Result<i64, EvalError> {
    u.as_number()
        .ok_or_else(|| EvalError::expected("a numeric value", u.pos))
}

/// Strict `{ ... }` argument, as required by the binding and lambda forms.
pub(crate) fn quoted_or_error(u: &UnitRef) -> Result<&[UnitRef], EvalError> {
    match &u.expr {
        Expr::Quoted(children) => Ok(children),
        _ => Err(EvalError::expected("a Q expression", u.pos)),
    }
}

pub(crate) fn raw_or_error(u: &UnitRef) -> Result<&str, EvalError> {
    match &u.expr {
        Expr::Str(s) if s.raw => Ok(&s.text),
        _ => Err(EvalError::expected("a raw string", u.pos)),
    }
}

pub(crate) fn symbol_or_error(u: &UnitRef) -> Result<&str, EvalError> {
    u.symbol_text()
        .ok_or_else(|| EvalError::expected("a symbol", u.pos))
}

/// A sequence argument: either list flavor, or a raw string.
pub(crate) enum Seq<'a> {
    Items {
        children: &'a [UnitRef],
        quoted: bool,
    },
    Text(&'a str),
}

pub(crate) fn seq_or_error(u: &UnitRef) -> Result<Seq<'_>, EvalError> {
    match &u.expr {
        Expr::List(children) => Ok(Seq::Items {
            children,
            quoted: false,
        }),
        Expr::Quoted(children) => Ok(Seq::Items {
            children,
            quoted: true,
        }),
        Expr::Str(s) if s.raw => Ok(Seq::Text(&s.text)),
        _ => Err(EvalError::expected("a list or a raw string", u.pos)),
    }
}

/// Rebuilds a sequence of the same flavor as its source.
pub(crate) fn same_flavor(pos: Position, children: Vec<UnitRef>, quoted: bool) -> UnitRef {
    if quoted {
        Unit::new(pos, Expr::Quoted(children))
    } else {
        Unit::new(pos, Expr::List(children))
    }
}
