// ABOUTME: Evaluator reducing unit trees against an environment chain

use crate::env::{EnvNode, EnvNodeRef, Frame};
use crate::error::EvalError;
use crate::value::{Callable, Expr, Function, Lambda, Position, Unit, UnitRef};
use std::rc::Rc;

/// Reduces a unit without lifting quote suppression.
pub fn eval(u: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    eval_unit(u, env, false)
}

/// Reduces a unit. `force` makes a `{ ... }` literal evaluate as a list for
/// exactly one level; it is used by `eval`, branch bodies, and lambda bodies.
pub fn eval_unit(u: &UnitRef, env: &EnvNodeRef, force: bool) -> Result<UnitRef, EvalError> {
    match &u.expr {
        Expr::Number(_) | Expr::Map(_) | Expr::Fn(_) => Ok(Rc::clone(u)),
        Expr::Str(s) if s.raw => Ok(Rc::clone(u)),
        Expr::Str(_) => resolve_symbol(u, env),
        Expr::Quoted(children) => {
            if force {
                eval_call(u, children, env)
            } else {
                Ok(Rc::clone(u))
            }
        }
        Expr::List(children) => eval_call(u, children, env),
    }
}

/// Resolves an unresolved symbol against the chain. A binding may itself be a
/// symbol (macro parameters receive unevaluated forms), in which case
/// resolution restarts from the original node with the new name.
fn resolve_symbol(u: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let mut name = match u.symbol_text() {
        Some(text) => text.to_string(),
        None => return Err(EvalError::expected("a symbol", u.pos)),
    };

    loop {
        if name == "," {
            return Err(EvalError::new(
                "Unquote is only meaningful before an argument.",
                u.pos,
            ));
        }
        let found = env
            .lookup(&name)
            .ok_or_else(|| EvalError::undefined_symbol(&name, u.pos))?;
        match &found.expr {
            Expr::Str(inner) if !inner.raw => name = inner.text.clone(),
            _ => return Ok(found.with_pos(u.pos)),
        }
    }
}

fn is_unquote(u: &Unit) -> bool {
    u.symbol_text() == Some(",")
}

/// Replaces every `, X` pair among the raw argument forms with `eval(X)`,
/// left to right. The result has the `,` markers removed.
fn splice_unquotes(forms: &[UnitRef], env: &EnvNodeRef) -> Result<Vec<UnitRef>, EvalError> {
    let mut spliced = Vec::with_capacity(forms.len());
    let mut i = 0;
    while i < forms.len() {
        if is_unquote(&forms[i]) {
            let form = forms.get(i + 1).ok_or_else(|| {
                EvalError::new("Expected an expression after unquote.", forms[i].pos)
            })?;
            spliced.push(eval_unit(form, env, false)?);
            i += 2;
        } else {
            spliced.push(Rc::clone(&forms[i]));
            i += 1;
        }
    }
    Ok(spliced)
}

fn eval_call(u: &UnitRef, children: &[UnitRef], env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    if children.is_empty() {
        return Ok(Rc::clone(u));
    }

    let head = eval_unit(&children[0], env, false)?;
    let function = match &head.expr {
        Expr::Fn(f) => f.clone(),
        // A lone value in call position evaluates to itself.
        _ if children.len() == 1 => return Ok(head),
        _ => {
            return Err(EvalError::expected(
                "a builtin or user defined function",
                children[0].pos,
            ))
        }
    };

    let forms = splice_unquotes(&children[1..], env)?;

    let mut call_children = Vec::with_capacity(forms.len() + 1);
    call_children.push(head);
    if function.is_macro {
        call_children.extend(forms);
    } else {
        for form in &forms {
            call_children.push(eval_unit(form, env, false)?);
        }
    }

    let call = Unit::new(u.pos, Expr::List(call_children));
    apply(&function, &call, env)
}

/// The single dispatch point honoring the macro and syntax bits.
pub fn apply(function: &Function, call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    match &function.callable {
        Callable::Builtin(builtin) => builtin(call, env),
        Callable::Lambda(lambda) => apply_lambda(function, lambda, call, env),
    }
}

/// Invokes an already-evaluated function value with already-evaluated
/// arguments; used by builtins that take user callbacks.
pub fn call_function(
    callee: &UnitRef,
    args: &[UnitRef],
    pos: Position,
    env: &EnvNodeRef,
) -> Result<UnitRef, EvalError> {
    let function = match &callee.expr {
        Expr::Fn(f) => f.clone(),
        _ => return Err(EvalError::expected("a function", callee.pos)),
    };
    let mut children = Vec::with_capacity(args.len() + 1);
    children.push(Rc::clone(callee));
    children.extend(args.iter().cloned());
    apply(&function, &Unit::new(pos, Expr::List(children)), env)
}

fn param_name(param: &UnitRef) -> Result<&str, EvalError> {
    param
        .symbol_text()
        .ok_or_else(|| EvalError::expected("a symbol", param.pos))
}

fn apply_lambda(
    function: &Function,
    lambda: &Rc<Lambda>,
    call: &UnitRef,
    env: &EnvNodeRef,
) -> Result<UnitRef, EvalError> {
    let actuals = match &call.expr {
        Expr::List(children) => &children[1..],
        _ => return Err(EvalError::expected("a call expression", call.pos)),
    };
    let params = &lambda.params;
    let fixed = if lambda.variadic {
        params
            .iter()
            .position(|p| p.symbol_text() == Some("&"))
            .unwrap_or(params.len())
    } else {
        params.len()
    };

    if !lambda.variadic && actuals.len() > params.len() {
        return Err(EvalError::new(
            format!(
                "Excess arguments, expected {}, got {}.",
                params.len(),
                actuals.len()
            ),
            call.pos,
        ));
    }
    if lambda.variadic && actuals.len() < fixed {
        return Err(EvalError::new(
            "Not enough values to assign to non-variadic parameters.",
            call.pos,
        ));
    }

    let mut bound = lambda.captured.clone();
    if lambda.variadic {
        for (param, actual) in params[..fixed].iter().zip(actuals) {
            bound.insert(param_name(param)?.to_string(), Rc::clone(actual));
        }
        if !lambda.unused {
            let rest_param = &params[fixed + 1];
            let rest: Vec<UnitRef> = actuals[fixed..].to_vec();
            let rest_pos = rest.first().map_or(call.pos, |u| u.pos);
            bound.insert(
                param_name(rest_param)?.to_string(),
                Unit::new(rest_pos, Expr::Quoted(rest)),
            );
        }
    } else {
        for (param, actual) in params.iter().zip(actuals) {
            bound.insert(param_name(param)?.to_string(), Rc::clone(actual));
        }
        if actuals.len() < params.len() {
            // Too few arguments: hand back a function that resumes binding
            // where this call left off.
            let resumed = Lambda {
                params: params[actuals.len()..].to_vec(),
                body: Rc::clone(&lambda.body),
                closure: Rc::clone(&lambda.closure),
                captured: bound,
                variadic: false,
                unused: false,
            };
            let partial = Function {
                description: "User defined partially applied function.".to_string(),
                callable: Callable::Lambda(Rc::new(resumed)),
                is_macro: function.is_macro,
                is_syntax: function.is_syntax,
            };
            return Ok(Unit::new(lambda.body.pos, Expr::Fn(partial)));
        }
    }

    let parent = if function.is_syntax {
        Rc::clone(env)
    } else {
        Rc::clone(&lambda.closure)
    };
    let node = EnvNode::push(Frame::from_bindings(bound), parent);
    eval_unit(&lambda.body, &node, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::global_environment;
    use crate::parser::parse;
    use crate::value::structural_eq;

    fn run(env: &EnvNodeRef, source: &str) -> Result<UnitRef, EvalError> {
        let unit = parse(source, 0).expect("parse failed");
        eval(&unit, env)
    }

    fn printed(env: &EnvNodeRef, source: &str) -> String {
        format!("{}", run(env, source).expect("eval failed"))
    }

    #[test]
    fn test_self_evaluating_values() {
        let env = global_environment();
        assert_eq!(printed(&env, "42"), "42");
        assert_eq!(printed(&env, "\"text\""), "\"text\"");
        assert_eq!(printed(&env, "{+ 1 2}"), "{+ 1 2}");
    }

    #[test]
    fn test_symbol_resolution_carries_position() {
        let env = global_environment();
        run(&env, "= {x} 10").unwrap();
        let value = run(&env, "x").unwrap();
        assert_eq!(value.as_number(), Some(10));
        assert_eq!(value.pos.column, 0);
    }

    #[test]
    fn test_undefined_symbol() {
        let env = global_environment();
        let err = run(&env, "nope").unwrap_err();
        assert_eq!(err.message, "Symbol nope is undefined.");
    }

    #[test]
    fn test_lone_unquote_is_an_error() {
        let env = global_environment();
        let err = run(&env, ",").unwrap_err();
        assert_eq!(err.message, "Unquote is only meaningful before an argument.");
    }

    #[test]
    fn test_single_element_list_unwraps() {
        let env = global_environment();
        run(&env, "= {x} 7").unwrap();
        assert_eq!(printed(&env, "(x)"), "7");
        assert_eq!(printed(&env, "((+ 1 2))"), "3");
    }

    #[test]
    fn test_calling_a_non_function_fails() {
        let env = global_environment();
        let err = run(&env, "(1 2 3)").unwrap_err();
        assert_eq!(
            err.message,
            "Expected a builtin or user defined function."
        );
        assert_eq!(err.pos.column, 1);
    }

    #[test]
    fn test_empty_list_evaluates_to_itself() {
        let env = global_environment();
        assert_eq!(printed(&env, "()"), "()");
    }

    #[test]
    fn test_ordinary_arguments_evaluate_left_to_right() {
        let env = global_environment();
        run(&env, "= {x} 1").unwrap();
        assert_eq!(printed(&env, "+ x (+ x 1) (+ x 2)"), "6");
    }

    #[test]
    fn test_lambda_call_and_closure() {
        let env = global_environment();
        assert_eq!(printed(&env, "((\\ {x y} {+ x y}) 2 3)"), "5");

        // Free names resolve at the definition site.
        run(&env, "def {base} 100").unwrap();
        run(&env, "def {add-base} (\\ {x} {+ x base})").unwrap();
        assert_eq!(printed(&env, "add-base 5"), "105");
    }

    #[test]
    fn test_partial_application() {
        let env = global_environment();
        run(&env, "def {add} (\\ {x y} {+ x y})").unwrap();
        assert_eq!(printed(&env, "((add 2) 3)"), "5");
        assert_eq!(printed(&env, "add 2 3"), "5");

        // The partial value is reusable.
        run(&env, "def {inc} (add 1)").unwrap();
        assert_eq!(printed(&env, "inc 10"), "11");
        assert_eq!(printed(&env, "inc 20"), "21");
    }

    #[test]
    fn test_excess_arguments() {
        let env = global_environment();
        let err = run(&env, "(\\ {x} {x}) 1 2").unwrap_err();
        assert_eq!(err.message, "Excess arguments, expected 1, got 2.");
    }

    #[test]
    fn test_variadic_rest_collection() {
        let env = global_environment();
        run(&env, "def {pack} (\\ {first & rest} {rest})").unwrap();
        assert_eq!(printed(&env, "pack 1 2 3"), "{2 3}");
        assert_eq!(printed(&env, "pack 1"), "{}");

        let err = run(&env, "(pack)").unwrap_err();
        assert_eq!(
            err.message,
            "Not enough values to assign to non-variadic parameters."
        );
    }

    #[test]
    fn test_variadic_discard() {
        let env = global_environment();
        run(&env, "def {always} (\\ {x &} {x})").unwrap();
        assert_eq!(printed(&env, "always 9 1 2 3"), "9");
    }

    #[test]
    fn test_macro_receives_forms_unevaluated() {
        let env = global_environment();
        run(&env, "def {freeze} (\\m {x} {x})").unwrap();
        let value = run(&env, "freeze (+ 1 2)").unwrap();
        // The argument form itself comes back, not 3.
        assert!(matches!(value.expr, Expr::List(ref c) if c.len() == 3));
    }

    #[test]
    fn test_unquote_splices_into_macro_arguments() {
        let env = global_environment();
        run(&env, "def {freeze} (\\m {x} {x})").unwrap();
        let value = run(&env, "freeze , (+ 1 2)").unwrap();
        assert_eq!(value.as_number(), Some(3));
    }

    #[test]
    fn test_unquote_inside_macro_body() {
        let env = global_environment();
        run(&env, "def {twice} (\\m {x} {+ , x , x})").unwrap();
        assert_eq!(printed(&env, "twice (+ 1 2)"), "6");
    }

    #[test]
    fn test_trailing_unquote_is_an_error() {
        let env = global_environment();
        let err = run(&env, "+ 1 ,").unwrap_err();
        assert_eq!(err.message, "Expected an expression after unquote.");
    }

    #[test]
    fn test_syntax_vs_macro_scoping() {
        let env = global_environment();
        // Both receive the unevaluated symbol `local`; only the syntax
        // flavor evaluates it where the caller's frame is visible.
        run(&env, "def {via-syntax} (\\s {a} {eval , a})").unwrap();
        run(&env, "def {via-macro} (\\m {a} {eval , a})").unwrap();
        run(
            &env,
            "def {try-syntax} (\\ {local} {via-syntax (+ local 1)})",
        )
        .unwrap();
        run(&env, "def {try-macro} (\\ {local} {via-macro (+ local 1)})").unwrap();

        assert_eq!(printed(&env, "try-syntax 41"), "42");
        let err = run(&env, "try-macro 41").unwrap_err();
        assert_eq!(err.message, "Symbol local is undefined.");
    }

    #[test]
    fn test_functions_survive_being_passed_around() {
        let env = global_environment();
        run(&env, "def {apply-twice} (\\ {f x} {f (f x)})").unwrap();
        run(&env, "def {inc} (\\ {x} {+ x 1})").unwrap();
        assert_eq!(printed(&env, "apply-twice inc 3"), "5");
    }

    #[test]
    fn test_quote_equals_original() {
        let env = global_environment();
        let quoted = run(&env, "q {1 {2 3} \"s\"}").unwrap();
        let original = parse("{1 {2 3} \"s\"}", 0).unwrap();
        assert!(structural_eq(&quoted, &original.children().unwrap()[0]));
    }
}
