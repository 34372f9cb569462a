// ABOUTME: Raw string builtins: splitting, numeric parsing, printing to text

use super::{expect_exact, raw_or_error, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Expr, Unit, UnitRef};
use std::num::IntErrorKind;
use std::rc::Rc;

pub fn builtin_split(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("split", call, 2)?;
    let text = raw_or_error(&args[0])?;
    let delimiter = raw_or_error(&args[1])?;
    if delimiter.is_empty() {
        return Err(EvalError::new("Empty delimiter.", args[1].pos));
    }

    // Empty runs between adjacent delimiters and at either end are skipped.
    let parts = text
        .split(delimiter)
        .filter(|part| !part.is_empty())
        .map(|part| Unit::raw_str(args[0].pos, part))
        .collect();
    Ok(Unit::new(call.pos, Expr::Quoted(parts)))
}

inventory::submit! {
    BuiltinDef {
        name: "split",
        description: "Splits a raw string by a delimiter, dropping empty runs.",
        is_macro: false,
        call: builtin_split,
    }
}

pub fn builtin_int(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("int", call, 1)?;
    let text = raw_or_error(&args[0])?;
    match text.parse::<i64>() {
        Ok(n) => Ok(Unit::number(call.pos, n)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(EvalError::new(
                "Numeric constant does not fit into 64 bits.",
                args[0].pos,
            )),
            _ => Err(EvalError::new("Malformed numeric constant.", args[0].pos)),
        },
    }
}

inventory::submit! {
    BuiltinDef {
        name: "int",
        description: "Converts a raw string to an integer.",
        is_macro: false,
        call: builtin_int,
    }
}

pub fn builtin_str(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("str", call, 1)?;
    // Raw strings pass through; everything else uses its printed form.
    if args[0].is_raw_str() {
        return Ok(Rc::clone(&args[0]));
    }
    Ok(Unit::raw_str(args[0].pos, format!("{}", args[0].expr)))
}

inventory::submit! {
    BuiltinDef {
        name: "str",
        description: "Converts any value to a raw string via its printed form.",
        is_macro: false,
        call: builtin_str,
    }
}
