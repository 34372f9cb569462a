// ABOUTME: In-memory history of logical input lines, referenced by diagnostics

/// Every logical input (after comment stripping and continuation joining)
/// lands here; positions carry an index into this history so errors can point
/// back at earlier lines.
#[derive(Debug, Default)]
pub struct History {
    lines: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
