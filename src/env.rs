// ABOUTME: Environment frames and the lookup chain walking from the innermost scope to the root

use crate::value::UnitRef;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type FrameRef = Rc<Frame>;
pub type EnvNodeRef = Rc<EnvNode>;

/// One mutable name table. Insertion order is preserved so listings such as
/// `help` come out in a stable order.
#[derive(Debug, Default)]
pub struct Frame {
    bindings: RefCell<IndexMap<String, UnitRef>>,
}

impl Frame {
    pub fn new() -> FrameRef {
        Rc::new(Frame::default())
    }

    pub fn from_bindings(bindings: IndexMap<String, UnitRef>) -> FrameRef {
        Rc::new(Frame {
            bindings: RefCell::new(bindings),
        })
    }

    /// Insert or overwrite in this frame only.
    pub fn define(&self, name: impl Into<String>, value: UnitRef) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<UnitRef> {
        self.bindings.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Bound names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.bindings.borrow().keys().cloned().collect()
    }
}

/// A link in the environment chain. `prev == None` marks the root node whose
/// frame holds the builtins.
#[derive(Debug)]
pub struct EnvNode {
    pub curr: FrameRef,
    pub prev: Option<EnvNodeRef>,
}

impl EnvNode {
    pub fn root(frame: FrameRef) -> EnvNodeRef {
        Rc::new(EnvNode {
            curr: frame,
            prev: None,
        })
    }

    pub fn push(frame: FrameRef, parent: EnvNodeRef) -> EnvNodeRef {
        Rc::new(EnvNode {
            curr: frame,
            prev: Some(parent),
        })
    }

    /// First hit walking `curr -> prev -> ...`.
    pub fn lookup(&self, name: &str) -> Option<UnitRef> {
        if let Some(value) = self.curr.get(name) {
            return Some(value);
        }
        self.prev.as_ref().and_then(|prev| prev.lookup(name))
    }

    /// The root node of a chain; `def` installs bindings there.
    pub fn global(node: &EnvNodeRef) -> EnvNodeRef {
        let mut node = Rc::clone(node);
        loop {
            let prev = match &node.prev {
                Some(prev) => Rc::clone(prev),
                None => return node,
            };
            node = prev;
        }
    }
}
