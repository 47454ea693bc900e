use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Pow,
    Div,
    FloorDiv,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoolOpKind {
    And,
    Or,
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Literal(Value),
    Name(String),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Attribute {
        target: Box<Expr>,
        name: String,
    },
    Subscript {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Short-circuiting `and`/`or`; the right operand may not be evaluated.
    BoolOp {
        op: BoolOpKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub(crate) enum AssignTarget {
    Name(String),
    Attribute { target: Expr, name: String },
}

#[derive(Debug, Clone)]
pub(crate) struct ExceptHandler {
    /// `None` for a bare `except:` clause.
    pub(crate) exc_type: Option<String>,
    /// The `as NAME` binding, if any.
    pub(crate) binding: Option<String>,
    pub(crate) body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub(crate) enum Stmt {
    Expr(Expr),
    Assign {
        target: AssignTarget,
        value: Expr,
    },
    Delete(AssignTarget),
    Import {
        module: String,
    },
    FuncDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    ClassDef {
        name: String,
        bases: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        finally: Option<Vec<Stmt>>,
    },
    Raise {
        exc_type: String,
        message: Option<Expr>,
    },
    Pass,
    Break,
    Continue,
}
