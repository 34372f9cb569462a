// ABOUTME: rustyline helper colorizing prompt input while it is typed

use rustyline::highlight::{CmdKind, Highlighter};
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_COMMENT: &str = "\x1b[90m"; // Gray
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow

#[derive(Completer, Helper, Hinter, Validator)]
pub struct ReplHelper;

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        !line.is_empty()
    }
}

fn highlight_line(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ';' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }
            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        break;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
                result.push_str(COLOR_RESET);
            }
            c @ ('(' | ')' | '{' | '}') => {
                result.push_str(COLOR_PARENS);
                result.push(c);
                result.push_str(COLOR_RESET);
                i += 1;
            }
            c if c.is_ascii_digit() => {
                result.push_str(COLOR_NUMBER);
                while i < chars.len() && !chars[i].is_whitespace() && !"(){}\"".contains(chars[i]) {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }
            c => {
                result.push(c);
                i += 1;
            }
        }
    }

    result
}
