use std::collections::HashMap;

use crate::value::{RuntimeError, Value};

/// The distinguished entry consulted by every class statement.
pub(crate) const BUILD_CLASS_HOOK: &str = "__build_class__";

/// Names seeded into the namespace at interpreter startup. Each starts as a
/// `Value::Builtin` slot dispatched by name through the runtime.
const DEFAULT_NAMES: &[&str] = &[
    "abs",
    "print",
    "len",
    "repr",
    "str",
    "int",
    "bool",
    "type",
    "range",
    "min",
    "max",
    BUILD_CLASS_HOOK,
];

#[derive(Debug, Clone)]
struct BuiltinEntry {
    value: Value,
    overridable: bool,
}

/// The builtin namespace: one mutable mapping from identifier to value,
/// consulted as the last fallback in name resolution. Whether an entry may be
/// replaced is per-entry data, not a hardcoded list; a host embedding the
/// interpreter can protect individual entries or freeze the whole namespace.
#[derive(Debug, Clone)]
pub(crate) struct Builtins {
    entries: HashMap<String, BuiltinEntry>,
    /// A frozen namespace also rejects the creation of new entries.
    frozen: bool,
}

impl Builtins {
    pub(crate) fn new() -> Self {
        let mut entries = HashMap::new();
        for name in DEFAULT_NAMES {
            entries.insert(
                (*name).to_string(),
                BuiltinEntry {
                    value: Value::Builtin((*name).to_string()),
                    overridable: true,
                },
            );
        }
        Self {
            entries,
            frozen: false,
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|entry| entry.value.clone())
    }

    /// Replace or create a binding. Rejects the write, leaving the original
    /// binding intact, when the entry is protected.
    pub(crate) fn set(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.entries.get_mut(name) {
            Some(entry) => {
                if !entry.overridable {
                    return Err(RuntimeError::write_protected(name));
                }
                entry.value = value;
            }
            None => {
                if self.frozen {
                    return Err(RuntimeError::write_protected(name));
                }
                self.entries.insert(
                    name.to_string(),
                    BuiltinEntry {
                        value,
                        overridable: true,
                    },
                );
            }
        }
        Ok(())
    }

    /// Remove a binding entirely. `Ok(false)` when no such entry exists.
    pub(crate) fn remove(&mut self, name: &str) -> Result<bool, RuntimeError> {
        match self.entries.get(name) {
            Some(entry) if !entry.overridable => Err(RuntimeError::write_protected(name)),
            Some(_) => {
                self.entries.remove(name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Mark a single entry write-protected. Returns false if absent.
    pub(crate) fn protect(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.overridable = false;
                true
            }
            None => false,
        }
    }

    /// Make the whole namespace read-only, modelling a host without override
    /// support.
    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
        for entry in self.entries.values_mut() {
            entry.overridable = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BUILD_CLASS_HOOK, Builtins};
    use crate::value::{RuntimeErrorCode, Value};

    #[test]
    fn set_then_get_returns_replacement() {
        let mut ns = Builtins::new();
        ns.set("abs", Value::Int(42)).expect("set abs");
        assert_eq!(ns.get("abs"), Some(Value::Int(42)));
    }

    #[test]
    fn get_is_idempotent_without_set() {
        let ns = Builtins::new();
        assert_eq!(ns.get("len"), ns.get("len"));
        assert_eq!(ns.get("missing"), None);
    }

    #[test]
    fn build_class_hook_is_an_ordinary_entry() {
        let mut ns = Builtins::new();
        assert_eq!(
            ns.get(BUILD_CLASS_HOOK),
            Some(Value::Builtin(BUILD_CLASS_HOOK.to_string()))
        );
        ns.set(BUILD_CLASS_HOOK, Value::Str("hook".to_string()))
            .expect("override hook");
        assert_eq!(ns.get(BUILD_CLASS_HOOK), Some(Value::Str("hook".to_string())));
    }

    #[test]
    fn protected_entry_rejects_write_and_keeps_binding() {
        let mut ns = Builtins::new();
        assert!(ns.protect("abs"));
        let err = ns.set("abs", Value::Int(0)).unwrap_err();
        assert_eq!(err.code, Some(RuntimeErrorCode::WriteProtected));
        assert_eq!(ns.get("abs"), Some(Value::Builtin("abs".to_string())));
    }

    #[test]
    fn frozen_namespace_rejects_all_writes() {
        let mut ns = Builtins::new();
        ns.freeze();
        assert!(ns.set("print", Value::None).is_err());
        assert!(ns.remove("print").is_err());
    }

    #[test]
    fn frozen_namespace_rejects_new_entries() {
        let mut ns = Builtins::new();
        ns.freeze();
        let err = ns.set("shiny", Value::Int(1)).unwrap_err();
        assert_eq!(err.code, Some(RuntimeErrorCode::WriteProtected));
        assert_eq!(ns.get("shiny"), None);
    }

    #[test]
    fn remove_reports_absence() {
        let mut ns = Builtins::new();
        assert!(ns.remove("abs").expect("remove abs"));
        assert!(!ns.remove("abs").expect("second remove"));
        assert_eq!(ns.get("abs"), None);
    }
}
