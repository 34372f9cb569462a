// ABOUTME: Line driver gathering logical inputs, dispatching parse/eval, printing diagnostics

use crate::builtins::global_environment;
use crate::env::EnvNodeRef;
use crate::eval::eval;
use crate::history::History;
use crate::parser::{paren_balance, parse};
use crate::value::Position;
use std::io::Write;
use std::path::Path;

/// Removes a `;` comment, honoring raw strings so a quoted semicolon
/// survives. Escapes inside strings are respected.
pub fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            ';' => break,
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// One interpreter session: the environment chain rooted in the builtins and
/// the history of logical lines already handled.
pub struct Session {
    env: EnvNodeRef,
    history: History,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            env: global_environment(),
            history: History::new(),
        }
    }

    pub fn env(&self) -> &EnvNodeRef {
        &self.env
    }

    /// Gathers one logical input from `next_line`, joining physical lines
    /// while more groups are open than closed, then evaluates it. Blank and
    /// comment-only lines are skipped. Returns true when the source is
    /// exhausted before any input arrived.
    pub fn handle_line<F, O, E>(
        &mut self,
        next_line: &mut F,
        prompt_width: usize,
        out: &mut O,
        err_out: &mut E,
    ) -> bool
    where
        F: FnMut() -> Option<String>,
        O: Write,
        E: Write,
    {
        let Some(first) = next_line() else {
            return true;
        };

        let mut buf = strip_comment(&first);
        if buf.trim().is_empty() {
            return false;
        }

        let mut balance = paren_balance(&buf);
        let continuated = balance < 0;
        while balance < 0 {
            let Some(next) = next_line() else {
                break;
            };
            let stripped = strip_comment(&next);
            if stripped.trim().is_empty() {
                continue;
            }
            balance += paren_balance(&stripped);
            buf.push(' ');
            buf.push_str(&stripped);
        }

        // File interpretation echoes the gathered input like a transcript.
        if prompt_width == 0 {
            let _ = writeln!(out, "{}", buf);
        }
        self.handle_input(&buf, prompt_width, continuated, out, err_out);
        if prompt_width == 0 {
            let _ = writeln!(out);
        }
        false
    }

    /// Parses and evaluates one gathered logical input, printing the value or
    /// a positioned diagnostic.
    pub fn handle_input<O, E>(
        &mut self,
        input: &str,
        prompt_width: usize,
        continuated: bool,
        out: &mut O,
        err_out: &mut E,
    ) where
        O: Write,
        E: Write,
    {
        let parsed = parse(input, self.history.len());
        self.history.append(input);

        match parsed {
            Err(e) => self.print_error(&e.message, e.pos, prompt_width, continuated, err_out),
            Ok(unit) => match eval(&unit, &self.env) {
                Ok(value) => {
                    let _ = writeln!(out, "{}", value.expr);
                }
                Err(e) => self.print_error(&e.message, e.pos, prompt_width, continuated, err_out),
            },
        }
    }

    /// A caret under the offending column; prior history lines are reprinted
    /// with an "N entries ago:" header, and a continuation buffer is
    /// reprinted as gathered.
    fn print_error<E: Write>(
        &self,
        message: &str,
        pos: Position,
        prompt_width: usize,
        continuated: bool,
        err_out: &mut E,
    ) {
        let past = self.history.len().saturating_sub(pos.line + 1);
        if past > 0 {
            let _ = writeln!(err_out, "{} entries ago:", past);
            let _ = writeln!(err_out, "{}", self.history.get(pos.line).unwrap_or(""));
        } else if continuated {
            let _ = writeln!(err_out, "{}", self.history.get(pos.line).unwrap_or(""));
        }

        let offset = if past == 0 && !continuated {
            prompt_width
        } else {
            0
        };
        let _ = writeln!(err_out, "{}^", " ".repeat(pos.column + offset));
        let _ = writeln!(err_out, "{}", message);
    }

    /// Drives a whole file through the line handler.
    pub fn run_file<O, E>(
        &mut self,
        path: &Path,
        out: &mut O,
        err_out: &mut E,
    ) -> std::io::Result<()>
    where
        O: Write,
        E: Write,
    {
        let contents = std::fs::read_to_string(path)?;
        let mut lines = contents.lines().map(str::to_owned).collect::<Vec<_>>().into_iter();
        let mut supplier = move || lines.next();
        while !self.handle_line(&mut supplier, 0, out, err_out) {}
        Ok(())
    }

    /// Evaluates a predef file into the session with its output discarded.
    /// Returns whether it ran without diagnostics.
    pub fn load_predef(&mut self, path: &Path) -> std::io::Result<bool> {
        let mut discard = std::io::sink();
        let mut diagnostics: Vec<u8> = Vec::new();
        self.run_file(path, &mut discard, &mut diagnostics)?;
        Ok(diagnostics.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(session: &mut Session, lines: &[&str], prompt_width: usize) -> (String, String) {
        let mut queue: Vec<String> = lines.iter().rev().map(|s| s.to_string()).collect();
        let mut supplier = move || queue.pop();
        let mut out = Vec::new();
        let mut err = Vec::new();
        while !session.handle_line(&mut supplier, prompt_width, &mut out, &mut err) {}
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("(+ 1 2) ; add"), "(+ 1 2) ");
        assert_eq!(strip_comment("; whole line"), "");
        assert_eq!(strip_comment("(echo \"a;b\") ; note"), "(echo \"a;b\") ");
        assert_eq!(strip_comment("\"esc \\\" ;\" ; tail"), "\"esc \\\" ;\" ");
    }

    #[test]
    fn test_values_print_on_their_own_lines() {
        let mut session = Session::new();
        let (out, err) = feed(&mut session, &["(+ 1 2)", "(* 2 3)"], 4);
        assert_eq!(out, "3\n6\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_state_persists_across_lines() {
        let mut session = Session::new();
        let (out, _) = feed(&mut session, &["(= {x} 10)", "(+ x 5)"], 4);
        assert_eq!(out, "()\n15\n");
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let mut session = Session::new();
        let (out, err) = feed(&mut session, &["", "   ", "; nothing", "42"], 4);
        assert_eq!(out, "42\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_multi_line_continuation() {
        let mut session = Session::new();
        let (out, err) = feed(&mut session, &["(+ 1", "2", "3)"], 4);
        assert_eq!(out, "6\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_parse_error_diagnostic_aligns_with_the_prompt() {
        let mut session = Session::new();
        let (_, err) = feed(&mut session, &["1)"], 4);
        // Column 1 plus the four character prompt.
        let expected = format!("{}^\nUnmatched parenthesis.\n", " ".repeat(5));
        assert_eq!(err, expected);
    }

    #[test]
    fn test_unclosed_input_at_end_of_source() {
        // Interactively the driver would keep reading; when the source runs
        // dry the partial buffer is parsed and diagnosed as gathered.
        let mut session = Session::new();
        let (_, err) = feed(&mut session, &["(+ 1"], 4);
        let expected = format!("(+ 1\n{}^\nExpected closing parenthesis.\n", " ".repeat(4));
        assert_eq!(err, expected);
    }

    #[test]
    fn test_continuated_error_reprints_the_buffer() {
        let mut session = Session::new();
        let (_, err) = feed(&mut session, &["(+ 1", "nope)"], 4);
        let mut lines = err.lines();
        assert_eq!(lines.next(), Some("(+ 1 nope)"));
        assert_eq!(lines.next(), Some("     ^"));
        assert_eq!(lines.next(), Some("Symbol nope is undefined."));
    }

    #[test]
    fn test_errors_at_prior_lines_name_the_entry() {
        let mut session = Session::new();
        // The lambda body fails only when called, one entry later.
        let (_, err) = feed(
            &mut session,
            &["(def {f} (\\ {x} {+ x misspelled}))", "(f 1)"],
            4,
        );
        let caret = format!("{}^", " ".repeat(21));
        let mut lines = err.lines();
        assert_eq!(lines.next(), Some("1 entries ago:"));
        assert_eq!(lines.next(), Some("(def {f} (\\ {x} {+ x misspelled}))"));
        assert_eq!(lines.next(), Some(caret.as_str()));
        assert_eq!(lines.next(), Some("Symbol misspelled is undefined."));
    }

    #[test]
    fn test_run_file_echoes_a_transcript() {
        let path = std::env::temp_dir().join("yl-driver-file-test.yl");
        std::fs::write(&path, "; demo\n(def {x} 2)\n(* x 21)\n").unwrap();

        let mut session = Session::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        session.run_file(&path, &mut out, &mut err).unwrap();
        std::fs::remove_file(&path).ok();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "(def {x} 2)\n()\n\n(* x 21)\n42\n\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_load_predef_reports_dirty_runs() {
        let clean = std::env::temp_dir().join("yl-predef-clean.yl");
        std::fs::write(&clean, "(def {from-predef} 7)\n").unwrap();
        let mut session = Session::new();
        assert!(session.load_predef(&clean).unwrap());
        std::fs::remove_file(&clean).ok();

        let unit = crate::parser::parse("from-predef", 99).unwrap();
        let value = crate::eval::eval(&unit, session.env()).unwrap();
        assert_eq!(value.as_number(), Some(7));

        let dirty = std::env::temp_dir().join("yl-predef-dirty.yl");
        std::fs::write(&dirty, "(undefined-name)\n").unwrap();
        let mut session = Session::new();
        assert!(!session.load_predef(&dirty).unwrap());
        std::fs::remove_file(&dirty).ok();
    }
}
