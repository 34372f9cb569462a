// ABOUTME: Map construction from flat key-value lists

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Expr, Unit, UnitRef, ValueMap};
use std::rc::Rc;

/// Builds a map from a flat `{k1 v1 k2 v2 ...}` list. Later duplicates of a
/// key overwrite earlier ones.
pub fn builtin_mk_map(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("mk-map", call, 1)?;
    let children = args[0]
        .children()
        .ok_or_else(|| EvalError::expected("a list of keys and values", args[0].pos))?;
    if children.len() % 2 != 0 {
        return Err(EvalError::new(
            "Expected an even number of children.",
            args[0].pos,
        ));
    }

    let mut map = ValueMap::new();
    for pair in children.chunks(2) {
        map.insert_in_place(Rc::clone(&pair[0]), Rc::clone(&pair[1]));
    }
    Ok(Unit::new(call.pos, Expr::Map(map)))
}

inventory::submit! {
    BuiltinDef {
        name: "mk-map",
        description: "Builds a map from a flat list of alternating keys and values.",
        is_macro: false,
        call: builtin_mk_map,
    }
}
