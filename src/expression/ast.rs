//! Syntax tree for one compilation unit. One type or variant per grammar production.

/// `program := segment*`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub segments: Vec<Segment>,
}

/// `segment := condition | sentence ';'`
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Sentence(Sentence),
    Condition(Condition),
}

/// `sentence := variable '=' expr`
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub target: String,
    pub value: Expr,
}

/// `condition := 'if' expr block 'else' block`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub test: Expr,
    pub then_block: Vec<Sentence>,
    pub else_block: Vec<Sentence>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atom(Atom),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: String,
        args: Vec<Expr>,
    },
    /// `'(' expr ')'`
    Brackets(Box<Expr>),
}

/// `atom := variable | number`
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Variable(String),
    Number(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }
}
