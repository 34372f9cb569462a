// ABOUTME: Interactive help: language overview, symbol listing, value inspection

use super::{expect_between, BuiltinDef};
use crate::env::{EnvNode, EnvNodeRef};
use crate::error::EvalError;
use crate::value::{Unit, UnitRef};

const OVERVIEW: &str = "  This is a lisp like interpreted language.\n\
  There are six kinds of values: numeric, symbol, raw string, list, map and function.\n\
  Numeric values are signed 64 bit integers such as 1 or -2444.\n\
  A symbol is any named value such as 'a' or 'help'.\n\
  A list is either evaluated such as '(+ 1 2)', or unevaluated such as\n\
  '{+ 1 2}', which a later 'eval' can reduce. Unevaluated lists are also\n\
  referred to as Q expressions.\n\
  Functions are created with '\\', macros with '\\m' and syntax functions\n\
  with '\\s'; see 'help \\'. Functions support partial application.\n\
\n\
  Examples:\n\
  (+ 1 2)\n\
  eval {+ 1 2}\n\
  def {mySymbol} 2\n\
  + mySymbol 4\n\
  (\\{x y} {+ x y}) 2 4\n\
\n\
  Enter 'help symbol' to get information about a symbol.\n\
  Symbols currently available for inspection:\n";

/// With no argument, an overview plus the root frame's symbols in insertion
/// order; with one argument, the kind and printed form of that value.
pub fn builtin_help(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_between("help", call, 0, 1)?;
    let mut text = String::from("\n");

    match args.first() {
        None => {
            text.push_str(OVERVIEW);
            for name in EnvNode::global(env).curr.names() {
                text.push_str("    ");
                text.push_str(&name);
                text.push('\n');
            }
        }
        Some(value) => {
            text.push_str(value.expr.type_name());
            text.push_str(":\n");
            text.push_str(&format!("{}\n", value.expr));
        }
    }

    Ok(Unit::raw_str(call.pos, text))
}

inventory::submit! {
    BuiltinDef {
        name: "help",
        description: "Outputs information about a symbol.",
        is_macro: false,
        call: builtin_help,
    }
}
