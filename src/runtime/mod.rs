use std::collections::HashMap;

use crate::builtins::Builtins;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{RuntimeError, Value};

mod builtins;
mod calls;
mod class;
mod eval;
mod exec;
mod ops;
mod resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Module,
    Function,
    /// The namespace a class body executes in; not visible from methods.
    Class,
}

#[derive(Debug)]
pub(crate) struct Frame {
    kind: FrameKind,
    vars: HashMap<String, Value>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            vars: HashMap::new(),
        }
    }
}

/// The tree-walking evaluator. One instance owns the module globals, the
/// builtin namespace, and the buffered program output.
pub struct Interpreter {
    /// Scope stack; `scopes[0]` is the module's global frame and always
    /// present.
    scopes: Vec<Frame>,
    /// The single, shared builtin namespace. Every unqualified name that
    /// misses the local and global scopes falls back to it, and every class
    /// statement re-reads its build-class hook from it.
    builtins: Builtins,
    output: String,
    halted: bool,
    exit_code: i64,
    pub(crate) last_value: Option<Value>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            scopes: vec![Frame::new(FrameKind::Module)],
            builtins: Builtins::new(),
            output: String::new(),
            halted: false,
            exit_code: 0,
            last_value: None,
        }
    }

    pub fn run(&mut self, input: &str) -> Result<String, RuntimeError> {
        self.halted = false;
        let tokens = Lexer::new(input).tokenize()?;
        let stmts = Parser::new(tokens).parse_program()?;
        match self.run_block(&stmts) {
            Ok(()) => {}
            Err(e) if e.exception_type() == "SystemExit" => {
                self.halted = true;
                if let Ok(code) = e.message.parse::<i64>() {
                    self.exit_code = code;
                }
            }
            Err(e) if e.return_value.is_some() => {
                return Err(RuntimeError::new("'return' outside function"));
            }
            Err(e) if e.is_break => {
                return Err(RuntimeError::new("'break' outside loop"));
            }
            Err(e) if e.is_continue => {
                return Err(RuntimeError::new("'continue' not properly in loop"));
            }
            Err(e) => return Err(e),
        }
        Ok(self.output.clone())
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn exit_code(&self) -> i64 {
        self.exit_code
    }

    pub(crate) fn write_out(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Host-side read of a builtin namespace entry.
    pub fn builtin(&self, name: &str) -> Option<Value> {
        self.builtins.get(name)
    }

    /// Host-side override of a builtin namespace entry. Fails with the
    /// write-protected error kind when the entry is protected.
    pub fn set_builtin(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.builtins.set(name, value)
    }

    /// Host-side removal of a builtin namespace entry.
    pub fn remove_builtin(&mut self, name: &str) -> Result<bool, RuntimeError> {
        self.builtins.remove(name)
    }

    /// Mark one builtin entry write-protected. Returns false if absent.
    pub fn protect_builtin(&mut self, name: &str) -> bool {
        self.builtins.protect(name)
    }

    /// Make the whole builtin namespace read-only, modelling a host without
    /// override support.
    pub fn freeze_builtins(&mut self) {
        self.builtins.freeze();
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Interpreter;

    #[test]
    fn print_and_math() {
        let mut interp = Interpreter::new();
        let output = interp.run("print(1 + 2)\nprint(3 * 4)\n").unwrap();
        assert_eq!(output, "3\n12\n");
    }

    #[test]
    fn variables_and_strings() {
        let mut interp = Interpreter::new();
        let output = interp
            .run("x = 2\nx = x + 3\nprint('hi', x)\n")
            .unwrap();
        assert_eq!(output, "hi 5\n");
    }

    #[test]
    fn if_else() {
        let mut interp = Interpreter::new();
        let output = interp
            .run("x = 1\nif x == 1:\n    print('yes')\nelse:\n    print('no')\n")
            .unwrap();
        assert_eq!(output, "yes\n");
    }

    #[test]
    fn while_loop() {
        let mut interp = Interpreter::new();
        let output = interp
            .run("x = 0\nwhile x < 3:\n    print(x)\n    x = x + 1\n")
            .unwrap();
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn system_exit_code_is_kept_unnarrowed() {
        let mut interp = Interpreter::new();
        interp.run("raise SystemExit(4294967298)\n").unwrap();
        assert_eq!(interp.exit_code(), 4294967298);
    }

    #[test]
    fn system_exit_halts_cleanly() {
        let mut interp = Interpreter::new();
        let output = interp
            .run("print('before')\nraise SystemExit\nprint('after')\n")
            .unwrap();
        assert_eq!(output, "before\n");
    }
}
