// ABOUTME: File access: reading a file into a list of raw-string lines

use super::{expect_exact, raw_or_error, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Expr, Unit, UnitRef};
use std::fs;

/// Reads the whole file eagerly and yields a Q expression of its lines. One
/// trailing empty line (the usual final newline) is trimmed.
pub fn builtin_readlines(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("readlines", call, 1)?;
    let path = raw_or_error(&args[0])?;
    let contents = fs::read_to_string(path)
        .map_err(|_| EvalError::new("Unable to open given file.", args[0].pos))?;

    let mut lines: Vec<&str> = contents.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    let children = lines
        .into_iter()
        .map(|line| Unit::raw_str(args[0].pos, line.strip_suffix('\r').unwrap_or(line)))
        .collect();
    Ok(Unit::new(args[0].pos, Expr::Quoted(children)))
}

inventory::submit! {
    BuiltinDef {
        name: "readlines",
        description: "Yields a Q expression containing the lines of a file.\n\
Example: 'readlines \"data.txt\"'.",
        is_macro: false,
        call: builtin_readlines,
    }
}
