// ABOUTME: Constructors for user functions: ordinary, macro, and syntax flavors

use super::{expect_between, quoted_or_error, raw_or_error, symbol_or_error, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Callable, Expr, Function, Lambda, Unit, UnitRef};
use indexmap::IndexMap;
use std::rc::Rc;

/// Shared constructor for `\`, `\m` and `\s`:
/// `(params [docstring] body)` where params and body are Q expressions.
fn make_function(
    name: &str,
    call: &UnitRef,
    env: &EnvNodeRef,
    is_macro: bool,
    is_syntax: bool,
    default_description: &str,
) -> Result<UnitRef, EvalError> {
    let args = expect_between(name, call, 2, 3)?;
    let params = quoted_or_error(&args[0])?;

    let (description, body) = if args.len() == 3 {
        let doc = raw_or_error(&args[1])
            .map_err(|_| EvalError::expected("a raw doc-string", args[1].pos))?;
        quoted_or_error(&args[2])?;
        (doc.to_string(), Rc::clone(&args[2]))
    } else {
        quoted_or_error(&args[1])?;
        (default_description.to_string(), Rc::clone(&args[1]))
    };

    // An empty parameter list accepts and discards any arguments.
    let mut variadic = params.is_empty();
    let mut unused = variadic;

    for (i, param) in params.iter().enumerate() {
        let text = symbol_or_error(param)?;
        if text == "&" {
            if variadic {
                return Err(EvalError::new(
                    "Can not have more than one variadic sign.",
                    param.pos,
                ));
            }
            variadic = true;
            if params.len() - i > 2 {
                return Err(EvalError::new(
                    "Variadic sign expects either zero or one following symbol.",
                    param.pos,
                ));
            }
            unused = i == params.len() - 1;
        }
    }

    let lambda = Lambda {
        params: params.to_vec(),
        body,
        closure: Rc::clone(env),
        captured: IndexMap::new(),
        variadic,
        unused,
    };
    Ok(Unit::new(
        call.pos,
        Expr::Fn(Function {
            description,
            callable: Callable::Lambda(Rc::new(lambda)),
            is_macro,
            is_syntax,
        }),
    ))
}

pub fn builtin_lambda(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    make_function("\\", call, env, false, false, "User defined function.")
}

pub fn builtin_macro(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    make_function("\\m", call, env, true, false, "User defined macro.")
}

pub fn builtin_syntax(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    make_function("\\s", call, env, true, true, "User defined syntax function.")
}

inventory::submit! {
    BuiltinDef {
        name: "\\",
        description: "Lambda function, takes a Q expression with symbols as parameters \
and a Q expression as a body to evaluate. Returns a callable function.\n\
For example '(\\{x y} {+ x y}) 2 3' will yield 5.\n\
It can also take a docstring: '\\{x y} \"add\" {+ x y}'.\n\
Supplying fewer arguments than parameters partially applies the function.",
        is_macro: false,
        call: builtin_lambda,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "\\m",
        description: "Macro function: like '\\' but arguments arrive unevaluated.\n\
Prefix an argument with ',' inside the call to evaluate it at splice time.",
        is_macro: false,
        call: builtin_macro,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "\\s",
        description: "Syntax function: like '\\m' but the body resolves free names \
in the caller's environment, so user control forms can short-circuit.",
        is_macro: false,
        call: builtin_syntax,
    }
}
