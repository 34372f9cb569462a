// ABOUTME: CLI entry point: argument parsing, predef loading, REPL and file modes

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::{Path, PathBuf};
use yl::driver::Session;
use yl::helper::ReplHelper;

const PROMPT: &str = "yl> ";
const CONTINUATION_PROMPT: &str = "... ";
const PREDEF_PATH: &str = ".predef.yl";

/// Interpreter for the yl language
#[derive(Parser, Debug)]
#[command(name = "yl")]
#[command(version)]
#[command(about = "An interactive interpreter for a small Lisp-family language")]
struct CliArgs {
    /// Source file to interpret (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let mut session = Session::new();

    let predef = Path::new(PREDEF_PATH);
    if predef.exists() {
        match session.load_predef(predef) {
            Ok(true) => {}
            Ok(false) => eprintln!("errors in predef, interpret it directly for details"),
            Err(e) => eprintln!("unable to read predef: {}", e),
        }
    }

    let mut out = std::io::stdout();
    let mut err_out = std::io::stderr();

    if let Some(file) = args.file {
        session
            .run_file(&file, &mut out, &mut err_out)
            .map_err(|e| {
                format!(
                    "unable to open given file for interpretation: {}: {}",
                    file.display(),
                    e
                )
            })?;
        return Ok(());
    }

    println!("yl interpreter");
    println!("^C to exit, 'help' to get started");

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<ReplHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ReplHelper));

    loop {
        let mut first = true;
        let mut terminated = false;
        let exhausted = {
            let mut supplier = || {
                let prompt = if first { PROMPT } else { CONTINUATION_PROMPT };
                first = false;
                match rl.readline(prompt) {
                    Ok(line) => Some(line),
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                        terminated = true;
                        None
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        terminated = true;
                        None
                    }
                }
            };
            session.handle_line(&mut supplier, PROMPT.len(), &mut out, &mut err_out)
        };
        if exhausted || terminated {
            break;
        }
    }

    Ok(())
}
