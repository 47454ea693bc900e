use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::ast::Stmt;

/// A class object assembled by the default build-class hook: the class name,
/// the evaluated base classes, and the attribute namespace collected from the
/// class body.
#[derive(Debug)]
pub struct ClassObj {
    pub(crate) name: String,
    pub(crate) bases: Vec<Rc<ClassObj>>,
    pub(crate) attrs: HashMap<String, Value>,
}

#[derive(Debug)]
pub struct InstanceObj {
    pub(crate) class: Rc<ClassObj>,
    pub(crate) attrs: HashMap<String, Value>,
}

#[allow(private_interfaces)]
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Range(i64, i64),
    /// A native function slot, dispatched by name through the runtime.
    Builtin(String),
    Function {
        name: String,
        params: Vec<String>,
        body: Rc<Vec<Stmt>>,
        env: HashMap<String, Value>,
    },
    /// The executable unit of a class body, handed to the build-class hook.
    Code(Rc<Vec<Stmt>>),
    Class(Rc<ClassObj>),
    BoundMethod {
        receiver: Box<Value>,
        func: Box<Value>,
    },
    Instance(Rc<RefCell<InstanceObj>>),
    Module(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Range(a1, b1), Value::Range(a2, b2)) => a1 == a2 && b1 == b2,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Function { body: a, .. }, Value::Function { body: b, .. }) => Rc::ptr_eq(a, b),
            (Value::Code(a), Value::Code(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => a == b,
            _ => false,
        }
    }
}

fn float_repr(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl Value {
    pub(crate) fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::BigInt(i) => *i != BigInt::from(0),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Range(a, b) => a < b,
            _ => true,
        }
    }

    /// The `str()` rendering, used by `print`.
    pub(crate) fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.repr_value(),
        }
    }

    /// The `repr()` rendering, used inside containers and by the REPL echo.
    pub(crate) fn repr_value(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::BigInt(i) => i.to_string(),
            Value::Float(f) => float_repr(*f),
            Value::Str(s) => str_repr(s),
            Value::Tuple(items) => {
                let inner = items
                    .iter()
                    .map(|v| v.repr_value())
                    .collect::<Vec<_>>()
                    .join(", ");
                if items.len() == 1 {
                    format!("({},)", inner)
                } else {
                    format!("({})", inner)
                }
            }
            Value::List(items) => {
                let inner = items
                    .iter()
                    .map(|v| v.repr_value())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", inner)
            }
            Value::Range(a, b) => format!("range({}, {})", a, b),
            Value::Builtin(name) => format!("<built-in function {}>", name),
            Value::Function { name, .. } => format!("<function {}>", name),
            Value::Code(_) => "<code object>".to_string(),
            Value::Class(cls) => format!("<class '{}'>", cls.name),
            Value::BoundMethod { func, .. } => match func.as_ref() {
                Value::Function { name, .. } => format!("<bound method {}>", name),
                _ => "<bound method>".to_string(),
            },
            Value::Instance(inst) => format!("<{} object>", inst.borrow().class.name),
            Value::Module(name) => format!("<module '{}'>", name),
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) | Value::BigInt(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Range(_, _) => "range".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Function { .. } => "function".to_string(),
            Value::Code(_) => "code".to_string(),
            Value::Class(_) => "type".to_string(),
            Value::BoundMethod { .. } => "method".to_string(),
            Value::Instance(inst) => inst.borrow().class.name.clone(),
            Value::Module(_) => "module".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorCode {
    ParseUnexpected,
    ParseExpected,
    ParseIndent,
    NameResolution,
    WriteProtected,
    TypeMismatch,
    ValueInvalid,
    ZeroDivision,
    Attribute,
    Index,
    Import,
    SystemExit,
}

impl std::fmt::Display for RuntimeErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RuntimeErrorCode::ParseUnexpected => "PARSE_UNEXPECTED",
            RuntimeErrorCode::ParseExpected => "PARSE_EXPECTED",
            RuntimeErrorCode::ParseIndent => "PARSE_INDENT",
            RuntimeErrorCode::NameResolution => "NAME_RESOLUTION",
            RuntimeErrorCode::WriteProtected => "WRITE_PROTECTED",
            RuntimeErrorCode::TypeMismatch => "TYPE_MISMATCH",
            RuntimeErrorCode::ValueInvalid => "VALUE_INVALID",
            RuntimeErrorCode::ZeroDivision => "ZERO_DIVISION",
            RuntimeErrorCode::Attribute => "ATTRIBUTE",
            RuntimeErrorCode::Index => "INDEX",
            RuntimeErrorCode::Import => "IMPORT",
            RuntimeErrorCode::SystemExit => "SYSTEM_EXIT",
        };
        write!(f, "{}", name)
    }
}

impl RuntimeErrorCode {
    pub fn is_parse(self) -> bool {
        matches!(
            self,
            RuntimeErrorCode::ParseUnexpected
                | RuntimeErrorCode::ParseExpected
                | RuntimeErrorCode::ParseIndent
        )
    }

    /// The Python-level exception type this error kind surfaces as.
    pub fn exception_name(self) -> &'static str {
        match self {
            RuntimeErrorCode::ParseUnexpected
            | RuntimeErrorCode::ParseExpected
            | RuntimeErrorCode::ParseIndent => "SyntaxError",
            RuntimeErrorCode::NameResolution => "NameError",
            RuntimeErrorCode::WriteProtected | RuntimeErrorCode::Attribute => "AttributeError",
            RuntimeErrorCode::TypeMismatch => "TypeError",
            RuntimeErrorCode::ValueInvalid => "ValueError",
            RuntimeErrorCode::ZeroDivision => "ZeroDivisionError",
            RuntimeErrorCode::Index => "IndexError",
            RuntimeErrorCode::Import => "ImportError",
            RuntimeErrorCode::SystemExit => "SystemExit",
        }
    }
}

/// Runtime failure, raised exception, or (flagged) non-local control flow.
/// `return`/`break`/`continue` ride the error channel with their flag set and
/// are unwound by the enclosing call or loop, never by `except` handlers.
#[derive(Debug)]
pub struct RuntimeError {
    pub message: String,
    pub code: Option<RuntimeErrorCode>,
    pub line: Option<usize>,
    pub hint: Option<String>,
    pub(crate) return_value: Option<Value>,
    pub(crate) is_break: bool,
    pub(crate) is_continue: bool,
    /// Exception type name for user-raised exceptions (`raise FooError`).
    pub(crate) exception: Option<String>,
}

impl RuntimeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            line: None,
            hint: None,
            return_value: None,
            is_break: false,
            is_continue: false,
            exception: None,
        }
    }

    pub(crate) fn with_code(message: impl Into<String>, code: RuntimeErrorCode) -> Self {
        let mut err = Self::new(message);
        err.code = Some(code);
        err
    }

    pub(crate) fn with_location(
        message: impl Into<String>,
        code: RuntimeErrorCode,
        line: usize,
    ) -> Self {
        let mut err = Self::with_code(message, code);
        err.line = Some(line);
        err
    }

    pub(crate) fn name_resolution(name: &str) -> Self {
        Self::with_code(
            format!("name '{}' is not defined", name),
            RuntimeErrorCode::NameResolution,
        )
    }

    pub(crate) fn write_protected(name: &str) -> Self {
        Self::with_code(
            format!("can't override builtin '{}'", name),
            RuntimeErrorCode::WriteProtected,
        )
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self::with_code(message, RuntimeErrorCode::TypeMismatch)
    }

    pub(crate) fn attribute(object: impl Into<String>, name: &str) -> Self {
        Self::with_code(
            format!("{} has no attribute '{}'", object.into(), name),
            RuntimeErrorCode::Attribute,
        )
    }

    pub(crate) fn zero_division() -> Self {
        Self::with_code("division by zero", RuntimeErrorCode::ZeroDivision)
    }

    pub(crate) fn raised(exc_type: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new(message);
        err.exception = Some(exc_type.into());
        err
    }

    pub(crate) fn ret(value: Value) -> Self {
        let mut err = Self::new("return outside function");
        err.return_value = Some(value);
        err
    }

    pub(crate) fn brk() -> Self {
        let mut err = Self::new("'break' outside loop");
        err.is_break = true;
        err
    }

    pub(crate) fn cont() -> Self {
        let mut err = Self::new("'continue' not properly in loop");
        err.is_continue = true;
        err
    }

    pub(crate) fn is_control_flow(&self) -> bool {
        self.return_value.is_some() || self.is_break || self.is_continue
    }

    /// The exception type name seen by `except` clauses.
    pub fn exception_type(&self) -> &str {
        if let Some(name) = &self.exception {
            name
        } else if let Some(code) = self.code {
            code.exception_name()
        } else {
            "RuntimeError"
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.exception_type())
        } else {
            write!(f, "{}: {}", self.exception_type(), self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RuntimeError, RuntimeErrorCode, Value};

    #[test]
    fn runtime_error_code_display_names_are_stable() {
        assert_eq!(
            RuntimeErrorCode::NameResolution.to_string(),
            "NAME_RESOLUTION"
        );
        assert_eq!(
            RuntimeErrorCode::WriteProtected.to_string(),
            "WRITE_PROTECTED"
        );
        assert_eq!(RuntimeErrorCode::ParseIndent.to_string(), "PARSE_INDENT");
    }

    #[test]
    fn runtime_error_code_parse_classification() {
        assert!(RuntimeErrorCode::ParseUnexpected.is_parse());
        assert!(RuntimeErrorCode::ParseExpected.is_parse());
        assert!(!RuntimeErrorCode::NameResolution.is_parse());
    }

    #[test]
    fn error_kinds_map_to_python_exception_names() {
        assert_eq!(RuntimeError::name_resolution("x").exception_type(), "NameError");
        assert_eq!(
            RuntimeError::write_protected("abs").exception_type(),
            "AttributeError"
        );
        assert_eq!(
            RuntimeError::raised("SystemExit", "").exception_type(),
            "SystemExit"
        );
    }

    #[test]
    fn repr_follows_python_conventions() {
        let t = Value::Tuple(vec![
            Value::Str("class".to_string()),
            Value::Str("A".to_string()),
        ]);
        assert_eq!(t.repr_value(), "('class', 'A')");
        assert_eq!(
            Value::Tuple(vec![Value::Int(1)]).repr_value(),
            "(1,)"
        );
        assert_eq!(Value::Float(2.0).repr_value(), "2.0");
        assert_eq!(Value::Str("it's".to_string()).repr_value(), "\"it's\"");
    }
}
