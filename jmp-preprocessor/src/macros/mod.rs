//! Macro values and positional expansion.

pub mod table;

pub use table::MacroTable;

use std::collections::HashMap;

/// Name of the built-in macro that expands to nothing
pub const NULL_MACRO: &str = "null";

/// Character standing in for one argument occurrence in a compiled body
pub const PLACEHOLDER: char = 'X';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    /// User macro defined with `@def`
    Normal,
    Def,
    Let,
    Set,
    Null,
}

/// Represents a macro binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub arity: usize,
    /// Body offsets of each argument's placeholders, indexed by argument
    pub positions: Vec<Vec<usize>>,
    /// Compiled body; every substituted occurrence is one [`PLACEHOLDER`]
    pub body: String,
    pub kind: MacroKind,
    /// Whether the binding may be replaced or removed
    pub deletable: bool,
}

impl Macro {
    /// Create a user macro from a compiled body
    pub fn normal(positions: Vec<Vec<usize>>, body: String) -> Self {
        Self {
            arity: positions.len(),
            positions,
            body,
            kind: MacroKind::Normal,
            deletable: true,
        }
    }

    pub(crate) fn builtin(kind: MacroKind, arity: usize, deletable: bool) -> Self {
        Self {
            arity,
            positions: Vec::new(),
            body: String::new(),
            kind,
            deletable,
        }
    }

    /// Substitute `args` (in declaration order) into the body
    pub fn expand(&self, args: &[String]) -> String {
        let mut substitutions = HashMap::new();
        for (offsets, value) in self.positions.iter().zip(args) {
            for &offset in offsets {
                substitutions.insert(offset, value.as_str());
            }
        }
        expand(&self.body, &substitutions)
    }
}

/// Replace the characters of `body` at the given offsets.
///
/// A substitution keyed exactly one past the last character is appended.
pub fn expand(body: &str, substitutions: &HashMap<usize, &str>) -> String {
    let mut expanded = String::with_capacity(body.len());
    let mut length = 0;

    for (offset, ch) in body.chars().enumerate() {
        match substitutions.get(&offset) {
            Some(value) => expanded.push_str(value),
            None => expanded.push(ch),
        }
        length = offset + 1;
    }

    if let Some(value) = substitutions.get(&length) {
        expanded.push_str(value);
    }

    expanded
}
