//! Name to macro bindings.

use super::{Macro, MacroKind, NULL_MACRO};
use jmp_common::{JmpError, Result};
use std::collections::HashMap;

/// Built-in primitives with their public name, protected alias and arity
const BUILTINS: [(&str, &str, MacroKind, usize); 3] = [
    ("def", "__def__", MacroKind::Def, 3),
    ("let", "__let__", MacroKind::Let, 2),
    ("set", "__set__", MacroKind::Set, 1),
];

#[derive(Debug, Clone)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    /// Table holding only the built-in macros
    pub fn bootstrap() -> Self {
        let mut macros = HashMap::new();
        macros.insert(
            NULL_MACRO.to_string(),
            Macro::builtin(MacroKind::Null, 0, false),
        );
        for (public, alias, kind, arity) in BUILTINS {
            macros.insert(public.to_string(), Macro::builtin(kind, arity, true));
            macros.insert(alias.to_string(), Macro::builtin(kind, arity, false));
        }
        Self { macros }
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn insert(&mut self, name: String, value: Macro) {
        self.macros.insert(name, value);
    }

    /// Free `name` for a new binding.
    ///
    /// Fails when the existing binding is protected or when every rebinding
    /// is forbidden.
    pub fn release(&mut self, name: &str, redefinition_forbidden: bool) -> Result<()> {
        if let Some(existing) = self.macros.get(name) {
            if redefinition_forbidden || !existing.deletable {
                return Err(JmpError::redefinition(format!(
                    "macro '@{name}' cannot be redefined"
                )));
            }
            self.macros.remove(name);
        }
        Ok(())
    }

    /// Remove `name` if bound; protected bindings cannot be removed
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if let Some(existing) = self.macros.get(name) {
            if !existing.deletable {
                return Err(JmpError::redefinition(format!(
                    "macro '@{name}' cannot be deleted"
                )));
            }
            self.macros.remove(name);
        }
        Ok(())
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::bootstrap()
    }
}
