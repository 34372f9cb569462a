// ABOUTME: Console output and the epoch clock

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Unit, UnitRef};

/// Prints the argument's printed form on its own line and yields the empty
/// list.
pub fn builtin_echo(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("echo", call, 1)?;
    println!("{}", args[0].expr);
    Ok(Unit::empty_list(call.pos))
}

inventory::submit! {
    BuiltinDef {
        name: "echo",
        description: "Prints the printed form of its argument followed by a newline.",
        is_macro: false,
        call: builtin_echo,
    }
}

pub fn builtin_time_ms(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    expect_exact("time-ms", call, 0)?;
    Ok(Unit::number(call.pos, chrono::Utc::now().timestamp_millis()))
}

inventory::submit! {
    BuiltinDef {
        name: "time-ms",
        description: "Milliseconds since the Unix epoch.",
        is_macro: false,
        call: builtin_time_ms,
    }
}
