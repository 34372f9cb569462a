// ABOUTME: Value types: positioned units and the expression tagged union shared by reference

use crate::env::EnvNodeRef;
use crate::error::EvalError;
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Units are shared by reference: environment entries and list cells may all
/// point at the same allocation. They are immutable after construction.
pub type UnitRef = Rc<Unit>;

/// Where a unit originated: the history index of its logical input line and a
/// byte column within that line. Used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub pos: Position,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// The sole numeric type. Booleans are encoded as 0/nonzero.
    Number(i64),
    /// Raw string literal when `raw`, unresolved symbol otherwise.
    Str(Str),
    /// An evaluated `( ... )` expression.
    List(Vec<UnitRef>),
    /// A `{ ... }` literal; evaluation is suppressed unless forced.
    Quoted(Vec<UnitRef>),
    Fn(Function),
    /// Persistent insertion-ordered mapping with structural keys.
    Map(ValueMap),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Str {
    pub text: String,
    pub raw: bool,
}

impl Str {
    pub fn raw(text: impl Into<String>) -> Self {
        Str {
            text: text.into(),
            raw: true,
        }
    }

    pub fn symbol(text: impl Into<String>) -> Self {
        Str {
            text: text.into(),
            raw: false,
        }
    }
}

/// A builtin receives the whole call list (element 0 is the callee, the rest
/// are the arguments) together with the caller's environment node.
pub type BuiltinFn = fn(&UnitRef, &EnvNodeRef) -> Result<UnitRef, EvalError>;

#[derive(Clone)]
pub enum Callable {
    Builtin(BuiltinFn),
    Lambda(Rc<Lambda>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Builtin(_) => write!(f, "<builtin>"),
            Callable::Lambda(_) => write!(f, "<lambda>"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub description: String,
    pub callable: Callable,
    /// Arguments are passed unevaluated.
    pub is_macro: bool,
    /// Macro whose body resolves free names in the caller's environment.
    pub is_syntax: bool,
}

/// A user-defined function body together with everything needed to resume it:
/// the formal parameters still awaiting values, the defining environment
/// chain, and any bindings accumulated through partial application.
pub struct Lambda {
    pub params: Vec<UnitRef>,
    pub body: UnitRef,
    pub closure: EnvNodeRef,
    pub captured: IndexMap<String, UnitRef>,
    pub variadic: bool,
    /// Trailing bare `&`: extra arguments are discarded instead of collected.
    pub unused: bool,
}

impl Unit {
    pub fn new(pos: Position, expr: Expr) -> UnitRef {
        Rc::new(Unit { pos, expr })
    }

    pub fn number(pos: Position, n: i64) -> UnitRef {
        Unit::new(pos, Expr::Number(n))
    }

    pub fn raw_str(pos: Position, text: impl Into<String>) -> UnitRef {
        Unit::new(pos, Expr::Str(Str::raw(text)))
    }

    pub fn symbol(pos: Position, text: impl Into<String>) -> UnitRef {
        Unit::new(pos, Expr::Str(Str::symbol(text)))
    }

    pub fn empty_list(pos: Position) -> UnitRef {
        Unit::new(pos, Expr::List(Vec::new()))
    }

    pub fn boolean(pos: Position, value: bool) -> UnitRef {
        Unit::number(pos, i64::from(value))
    }

    /// The same expression wearing a different position.
    pub fn with_pos(&self, pos: Position) -> UnitRef {
        Unit::new(pos, self.expr.clone())
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.expr {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_raw_str(&self) -> bool {
        matches!(&self.expr, Expr::Str(s) if s.raw)
    }

    pub fn symbol_text(&self) -> Option<&str> {
        match &self.expr {
            Expr::Str(s) if !s.raw => Some(&s.text),
            _ => None,
        }
    }

    /// Children of either list flavor.
    pub fn children(&self) -> Option<&[UnitRef]> {
        match &self.expr {
            Expr::List(c) | Expr::Quoted(c) => Some(c),
            _ => None,
        }
    }
}

impl Expr {
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "numeric",
            Expr::Str(s) if s.raw => "raw string",
            Expr::Str(_) => "symbol",
            Expr::List(_) => "S expression",
            Expr::Quoted(_) => "Q expression",
            Expr::Fn(_) => "function",
            Expr::Map(_) => "map",
        }
    }
}

/// Structural equality as observed by `==` and map keys. Functions never
/// compare equal, not even to themselves; the two list flavors are distinct.
pub fn structural_eq(a: &Unit, b: &Unit) -> bool {
    match (&a.expr, &b.expr) {
        (Expr::Number(x), Expr::Number(y)) => x == y,
        (Expr::Str(x), Expr::Str(y)) => x == y,
        (Expr::List(x), Expr::List(y)) | (Expr::Quoted(x), Expr::Quoted(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| structural_eq(l, r))
        }
        (Expr::Map(x), Expr::Map(y)) => x.structural_eq(y),
        _ => false,
    }
}

// ============================================================================
// Maps
// ============================================================================

/// Map key wrapper giving units structural equality and hashing so they can
/// live in an IndexMap.
#[derive(Debug, Clone)]
struct MapKey(UnitRef);

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unit(&self.0, state);
    }
}

fn hash_unit<H: Hasher>(u: &Unit, state: &mut H) {
    match &u.expr {
        Expr::Number(n) => {
            state.write_u8(0);
            n.hash(state);
        }
        Expr::Str(s) => {
            state.write_u8(1);
            s.hash(state);
        }
        Expr::List(children) => {
            state.write_u8(2);
            for child in children {
                hash_unit(child, state);
            }
        }
        Expr::Quoted(children) => {
            state.write_u8(3);
            for child in children {
                hash_unit(child, state);
            }
        }
        // Functions are never equal to anything, so any constant hash works.
        Expr::Fn(_) => state.write_u8(4),
        Expr::Map(map) => {
            state.write_u8(5);
            // Entry order must not influence the hash.
            let mut acc = 0u64;
            for (k, v) in map.iter() {
                let mut entry = DefaultHasher::new();
                hash_unit(k, &mut entry);
                hash_unit(v, &mut entry);
                acc ^= entry.finish();
            }
            state.write_u64(acc);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: IndexMap<MapKey, UnitRef>,
}

impl ValueMap {
    pub fn new() -> Self {
        ValueMap::default()
    }

    /// Functional update: returns a new map carrying the extra entry.
    pub fn insert(&self, key: UnitRef, value: UnitRef) -> ValueMap {
        let mut entries = self.entries.clone();
        entries.insert(MapKey(key), value);
        ValueMap { entries }
    }

    pub(crate) fn insert_in_place(&mut self, key: UnitRef, value: UnitRef) {
        self.entries.insert(MapKey(key), value);
    }

    pub fn get(&self, key: &UnitRef) -> Option<&UnitRef> {
        self.entries.get(&MapKey(key.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitRef, &UnitRef)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    /// Order-independent comparison; values compare structurally.
    pub fn structural_eq(&self, other: &ValueMap) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| structural_eq(v, ov)))
    }
}

// ============================================================================
// Printing
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Str(s) if s.raw => write!(f, "\"{}\"", s.text),
            Expr::Str(s) => write!(f, "{}", s.text),
            Expr::List(children) => write_children(f, children, '(', ')'),
            Expr::Quoted(children) => write_children(f, children, '{', '}'),
            Expr::Map(map) => {
                write!(f, "{{ ")?;
                for (key, value) in map.iter() {
                    write!(f, "{} -> {}\n ", key.expr, value.expr)?;
                }
                write!(f, "}}")
            }
            Expr::Fn(function) => write!(f, "{}", function.description),
        }
    }
}

fn write_children(
    f: &mut fmt::Formatter<'_>,
    children: &[UnitRef],
    open: char,
    close: char,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", child.expr)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(column: usize) -> Position {
        Position::new(0, column)
    }

    #[test]
    fn test_number_display() {
        assert_eq!(format!("{}", Expr::Number(42)), "42");
        assert_eq!(format!("{}", Expr::Number(-7)), "-7");
    }

    #[test]
    fn test_string_and_symbol_display() {
        assert_eq!(format!("{}", Expr::Str(Str::raw("hello"))), "\"hello\"");
        assert_eq!(format!("{}", Expr::Str(Str::symbol("foo"))), "foo");
    }

    #[test]
    fn test_list_display_keeps_flavor() {
        let children = vec![
            Unit::number(at(1), 1),
            Unit::number(at(3), 2),
            Unit::number(at(5), 3),
        ];
        assert_eq!(format!("{}", Expr::List(children.clone())), "(1 2 3)");
        assert_eq!(format!("{}", Expr::Quoted(children)), "{1 2 3}");
        assert_eq!(format!("{}", Expr::List(Vec::new())), "()");
        assert_eq!(format!("{}", Expr::Quoted(Vec::new())), "{}");
    }

    #[test]
    fn test_nested_display() {
        let inner = Unit::new(
            at(2),
            Expr::Quoted(vec![Unit::symbol(at(3), "a"), Unit::symbol(at(5), "b")]),
        );
        let outer = Expr::List(vec![Unit::number(at(1), 1), inner]);
        assert_eq!(format!("{}", outer), "(1 {a b})");
    }

    #[test]
    fn test_structural_eq_numbers_and_strings() {
        let one = Unit::number(at(0), 1);
        let also_one = Unit::number(at(9), 1);
        assert!(structural_eq(&one, &also_one));
        assert!(!structural_eq(&one, &Unit::number(at(0), 2)));

        // A raw string and a symbol with the same text differ.
        assert!(!structural_eq(
            &Unit::raw_str(at(0), "x"),
            &Unit::symbol(at(0), "x")
        ));
    }

    #[test]
    fn test_structural_eq_lists_are_order_sensitive() {
        let a = Unit::new(
            at(0),
            Expr::Quoted(vec![Unit::number(at(1), 1), Unit::number(at(3), 2)]),
        );
        let b = Unit::new(
            at(0),
            Expr::Quoted(vec![Unit::number(at(1), 2), Unit::number(at(3), 1)]),
        );
        assert!(!structural_eq(&a, &b));

        // The quote flag participates: (1 2) != {1 2}.
        let c = Unit::new(
            at(0),
            Expr::List(vec![Unit::number(at(1), 1), Unit::number(at(3), 2)]),
        );
        assert!(!structural_eq(&a, &c));
    }

    #[test]
    fn test_map_equality_is_order_independent() {
        let k1 = Unit::number(at(0), 1);
        let v1 = Unit::number(at(0), 10);
        let k2 = Unit::number(at(0), 2);
        let v2 = Unit::number(at(0), 20);

        let forward = ValueMap::new()
            .insert(k1.clone(), v1.clone())
            .insert(k2.clone(), v2.clone());
        let backward = ValueMap::new().insert(k2, v2).insert(k1, v1);
        assert!(forward.structural_eq(&backward));
    }

    #[test]
    fn test_map_insert_is_functional() {
        let base = ValueMap::new();
        let extended = base.insert(Unit::number(at(0), 1), Unit::number(at(0), 2));
        assert_eq!(base.len(), 0);
        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn test_map_lookup_is_structural() {
        let map = ValueMap::new().insert(Unit::raw_str(at(0), "key"), Unit::number(at(0), 5));
        let probe = Unit::raw_str(at(40), "key");
        assert_eq!(map.get(&probe).and_then(|v| v.as_number()), Some(5));
    }
}
