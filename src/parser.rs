// ABOUTME: Parser turning one logical source line into a positioned unit tree

use crate::error::ParseError;
use crate::value::{Expr, Position, Unit, UnitRef};
use nom::bytes::complete::{take_till1, take_while, take_while1};
use std::num::IntErrorKind;

/// Byte cursor over a single logical line. The line number is fixed for the
/// whole parse; columns are byte offsets into the line.
struct Cursor<'a> {
    src: &'a str,
    line: usize,
    at: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, line: usize) -> Self {
        Cursor { src, line, at: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.at..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self, c: char) {
        self.at += c.len_utf8();
    }

    /// Advance past whatever a leaf parser consumed.
    fn advance_to(&mut self, remaining: &str) {
        self.at = self.src.len() - remaining.len();
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.at)
    }

    fn skip_blanks(&mut self) {
        if let Ok((rest, _)) =
            take_while::<_, _, nom::error::Error<&str>>(|c| c == ' ' || c == '\t')(self.rest())
        {
            self.advance_to(rest);
        }
    }
}

fn symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '{' | '}' | '"')
}

/// A terminal is a run of non-blank, non-parenthesis, non-quote characters.
/// Runs that parse fully as an integer become numbers; digit-like runs that
/// do not are malformed rather than symbols.
fn parse_terminal(cur: &mut Cursor) -> Result<UnitRef, ParseError> {
    let start = cur.pos();
    let (rest, token) = take_while1::<_, _, nom::error::Error<&str>>(symbol_char)(cur.rest())
        .map_err(|_| ParseError::new("Expected a token.", start))?;
    cur.advance_to(rest);

    let mut chars = token.chars();
    let first = chars.next().unwrap_or(' ');
    let digit_like = first.is_ascii_digit()
        || (first == '-' && chars.next().is_some_and(|c| c.is_ascii_digit()));

    match token.parse::<i64>() {
        Ok(n) => Ok(Unit::number(start, n)),
        Err(e) if digit_like => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(ParseError::new(
                "Numeric constant does not fit into 64 bits.",
                start,
            )),
            _ => Err(ParseError::new("Malformed numeric constant.", start)),
        },
        Err(_) => Ok(Unit::symbol(start, token)),
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'v' => '\x0b',
        other => other,
    }
}

fn parse_string(cur: &mut Cursor) -> Result<UnitRef, ParseError> {
    let start = cur.pos();
    cur.bump('"');

    let mut text = String::new();
    loop {
        // Consume a plain run in one go before handling the special cases.
        if let Ok((rest, chunk)) =
            take_till1::<_, _, nom::error::Error<&str>>(|c| c == '"' || c == '\\')(cur.rest())
        {
            text.push_str(chunk);
            cur.advance_to(rest);
        }

        match cur.peek() {
            Some('"') => {
                cur.bump('"');
                return Ok(Unit::raw_str(start, text));
            }
            Some('\\') => {
                cur.bump('\\');
                match cur.peek() {
                    Some(c) => {
                        text.push(unescape(c));
                        cur.bump(c);
                    }
                    None => {
                        return Err(ParseError::new("Unexpected end of a raw string.", cur.pos()))
                    }
                }
            }
            _ => return Err(ParseError::new("Unexpected end of a raw string.", cur.pos())),
        }
    }
}

/// Parses the expressions up to `closer` (or end of input for the implicit
/// top-level list). The opener, if any, has already been consumed.
fn parse_expression(cur: &mut Cursor, closer: Option<char>) -> Result<UnitRef, ParseError> {
    cur.skip_blanks();
    if cur.peek().is_none() && closer.is_some() {
        return Err(ParseError::new("Expression expected.", cur.pos()));
    }

    let open_pos = cur.pos();
    let mut children = Vec::new();

    loop {
        cur.skip_blanks();
        match cur.peek() {
            None | Some(')') | Some('}') => break,
            Some('"') => children.push(parse_string(cur)?),
            Some('(') => {
                cur.bump('(');
                children.push(parse_expression(cur, Some(')'))?);
            }
            Some('{') => {
                cur.bump('{');
                children.push(parse_expression(cur, Some('}'))?);
            }
            Some(_) => children.push(parse_terminal(cur)?),
        }
    }

    if let Some(expected) = closer {
        match cur.peek() {
            Some(got @ (')' | '}')) => {
                if got != expected {
                    return Err(ParseError::new(
                        format!("Differing parenthesis, expected '{}' got '{}'.", expected, got),
                        cur.pos(),
                    ));
                }
                cur.bump(got);
            }
            _ => return Err(ParseError::new("Expected closing parenthesis.", cur.pos())),
        }
    }

    let expr = if closer == Some('}') {
        Expr::Quoted(children)
    } else {
        Expr::List(children)
    };
    Ok(Unit::new(open_pos, expr))
}

/// Parses a whole logical line as an implicit evaluated list, so that both
/// `(+ 1 2)` and the bare `+ 1 2` are accepted at the prompt.
pub fn parse(source: &str, line: usize) -> Result<UnitRef, ParseError> {
    let mut cur = Cursor::new(source, line);
    let unit = parse_expression(&mut cur, None)?;
    if matches!(cur.peek(), Some(')' | '}')) {
        return Err(ParseError::new("Unmatched parenthesis.", cur.pos()));
    }
    Ok(unit)
}

/// Closers minus openers over a physical line, ignoring the contents of raw
/// strings. Negative while the line opens more groups than it closes, which
/// is the driver's continuation condition.
pub fn paren_balance(line: &str) -> i64 {
    let mut balance = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '(' | '{' => balance -= 1,
            ')' | '}' => balance += 1,
            _ => {}
        }
    }
    balance
}
