mod ast;
mod builtins;
mod lexer;
mod parser;
pub mod repl;
mod runtime;
pub(crate) mod trace;
mod value;

pub use runtime::Interpreter;
pub use value::{RuntimeError, RuntimeErrorCode, Value};

/// Parse a program and return its AST as a debug-formatted string.
pub fn dump_ast(input: &str) -> Result<String, RuntimeError> {
    let tokens = lexer::Lexer::new(input).tokenize()?;
    let stmts = parser::Parser::new(tokens).parse_program()?;
    Ok(format!("{:#?}", stmts))
}

#[cfg(test)]
mod tests {
    use super::{Interpreter, dump_ast};

    #[test]
    fn dump_ast_renders_a_program() {
        let ast = dump_ast("x = 1\n").unwrap();
        assert!(ast.contains("Assign"));
    }

    #[test]
    fn default_abs_resolves_through_builtins() {
        let mut interp = Interpreter::new();
        let output = interp.run("print(abs(-5))\n").unwrap();
        assert_eq!(output, "5\n");
    }

    #[test]
    fn functions_and_returns() {
        let mut interp = Interpreter::new();
        let output = interp
            .run("def add(a, b):\n    return a + b\nprint(add(2, 3))\n")
            .unwrap();
        assert_eq!(output, "5\n");
    }
}
