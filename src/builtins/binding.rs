// ABOUTME: Binding forms writing into the root or current frame, and pattern decomposition

use super::{expect_at_least, expect_exact, quoted_or_error, symbol_or_error, BuiltinDef};
use crate::env::{EnvNode, EnvNodeRef};
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::{Expr, Unit, UnitRef};
use std::rc::Rc;

/// `def {names...} v1 v2 ...` and `=` share everything except the target
/// frame. All values evaluate in the caller's environment before any binding
/// is installed.
fn assign(
    name: &str,
    call: &UnitRef,
    env: &EnvNodeRef,
    target: &EnvNodeRef,
) -> Result<UnitRef, EvalError> {
    let args = expect_at_least(name, call, 2)?;
    let names = quoted_or_error(&args[0])?;
    if names.len() != args.len() - 1 {
        return Err(EvalError::new(
            "Differing length of names and corresponding values.",
            call.pos,
        ));
    }

    let mut values = Vec::with_capacity(names.len());
    for (name_unit, form) in names.iter().zip(&args[1..]) {
        symbol_or_error(name_unit)?;
        values.push(eval(form, env)?);
    }
    for (name_unit, value) in names.iter().zip(values) {
        let text = symbol_or_error(name_unit)?;
        target.curr.define(text, value);
    }
    Ok(Unit::empty_list(call.pos))
}

pub fn builtin_def(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    assign("def", call, env, &EnvNode::global(env))
}

pub fn builtin_assign(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    assign("=", call, env, env)
}

inventory::submit! {
    BuiltinDef {
        name: "def",
        description: "Defines global variables. 'def {a b} 1 2' assigns 1 and 2 to a and b.",
        is_macro: true,
        call: builtin_def,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "=",
        description: "Assigns to local variables. '= {a b} 1 2' assigns 1 and 2 to a and b.",
        is_macro: true,
        call: builtin_assign,
    }
}

fn destructure(pattern: &UnitRef, value: &UnitRef, env: &EnvNodeRef) -> Result<(), EvalError> {
    match &pattern.expr {
        Expr::Str(s) if !s.raw => {
            env.curr.define(s.text.clone(), Rc::clone(value));
            Ok(())
        }
        Expr::Quoted(patterns) => {
            let children = value
                .children()
                .ok_or_else(|| EvalError::expected("a list to decompose", value.pos))?;
            if patterns.len() != children.len() {
                return Err(EvalError::new(
                    "Differing length of pattern and value.",
                    pattern.pos,
                ));
            }
            for (sub_pattern, sub_value) in patterns.iter().zip(children) {
                destructure(sub_pattern, sub_value, env)?;
            }
            Ok(())
        }
        _ => Err(EvalError::expected(
            "a symbol or a Q expression pattern",
            pattern.pos,
        )),
    }
}

/// `decomp pattern expr`: evaluates the expression, then binds the pattern's
/// symbols against its shape in the current frame.
pub fn builtin_decomp(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("decomp", call, 2)?;
    let value = eval(&args[1], env)?;
    destructure(&args[0], &value, env)?;
    Ok(Unit::empty_list(call.pos))
}

inventory::submit! {
    BuiltinDef {
        name: "decomp",
        description: "Destructures a value: 'decomp {a {b c}} {1 {2 3}}' binds a, b and c.",
        is_macro: true,
        call: builtin_decomp,
    }
}

#[cfg(test)]
mod tests {
    use super::super::global_environment;
    use crate::env::EnvNodeRef;
    use crate::error::EvalError;
    use crate::eval::eval;
    use crate::parser::parse;
    use crate::value::UnitRef;

    fn run(env: &EnvNodeRef, source: &str) -> Result<UnitRef, EvalError> {
        let unit = parse(source, 0).expect("parse failed");
        eval(&unit, env)
    }

    fn printed(env: &EnvNodeRef, source: &str) -> String {
        format!("{}", run(env, source).expect("eval failed"))
    }

    #[test]
    fn test_def_installs_globally() {
        let env = global_environment();
        assert_eq!(printed(&env, "def {x y} 1 2"), "()");
        assert_eq!(printed(&env, "+ x y"), "3");
    }

    #[test]
    fn test_def_values_evaluate_in_caller_env() {
        let env = global_environment();
        run(&env, "def {x} 10").unwrap();
        run(&env, "def {y} (+ x 5)").unwrap();
        assert_eq!(printed(&env, "y"), "15");
    }

    #[test]
    fn test_assignment_is_local_to_the_frame() {
        let env = global_environment();
        // Inside a lambda, `=` binds in the call frame and `def` escapes it.
        run(&env, "def {f} (\\ {} {(= {local} 1) })").unwrap();
        run(&env, "def {g} (\\ {ignored} {def {escaped} 2})").unwrap();
        run(&env, "g 0").unwrap();
        assert_eq!(printed(&env, "escaped"), "2");

        run(&env, "(f)").unwrap();
        let err = run(&env, "local").unwrap_err();
        assert_eq!(err.message, "Symbol local is undefined.");
    }

    #[test]
    fn test_mismatched_counts() {
        let env = global_environment();
        let err = run(&env, "def {a b} 1").unwrap_err();
        assert_eq!(
            err.message,
            "Differing length of names and corresponding values."
        );
    }

    #[test]
    fn test_names_must_be_symbols() {
        let env = global_environment();
        let err = run(&env, "def {\"a\"} 1").unwrap_err();
        assert_eq!(err.message, "Expected a symbol.");
        let err = run(&env, "def (list) 1").unwrap_err();
        assert_eq!(err.message, "Expected a Q expression.");
    }

    #[test]
    fn test_decomp_binds_nested_patterns() {
        let env = global_environment();
        run(&env, "decomp {a {b c}} {1 {2 3}}").unwrap();
        assert_eq!(printed(&env, "+ a b c"), "6");
    }

    #[test]
    fn test_decomp_single_symbol() {
        let env = global_environment();
        run(&env, "decomp whole (+ 1 2)").unwrap();
        assert_eq!(printed(&env, "whole"), "3");
    }

    #[test]
    fn test_decomp_shape_mismatch() {
        let env = global_environment();
        let err = run(&env, "decomp {a b} {1}").unwrap_err();
        assert_eq!(err.message, "Differing length of pattern and value.");

        let err = run(&env, "decomp {a} 1").unwrap_err();
        assert_eq!(err.message, "Expected a list to decompose.");

        let err = run(&env, "decomp 1 2").unwrap_err();
        assert_eq!(err.message, "Expected a symbol or a Q expression pattern.");
    }
}
