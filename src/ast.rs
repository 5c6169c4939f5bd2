// Abstract Syntax Tree (AST) definitions for the tiny Python language

use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub defs: Vec<FuncDef>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub func_name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: String,
        value: Expr,
    },
    If {
        // The `if` test first, followed by every `elif`, in source order
        branches: Vec<Branch>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        cond: Cond,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Return {
        expr: Option<Expr>,
    },
    Print {
        arg: PrintArg,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub cond: Cond,
    pub body: Vec<Stmt>,
}

/// A comparison between two integer expressions, as used by `if` and `while`
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub op: CmpOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintArg {
    Str(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i32),
    Var(String),
    Call {
        func_name: String,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
    Geq,
    Leq,
    Neq,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Eq => "==",
            CmpOp::Geq => ">=",
            CmpOp::Leq => "<=",
            CmpOp::Neq => "!=",
        }
    }
}

impl FromStr for CmpOp {
    type Err = CompileError;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op {
            "<" => Ok(CmpOp::Lt),
            ">" => Ok(CmpOp::Gt),
            "==" => Ok(CmpOp::Eq),
            ">=" => Ok(CmpOp::Geq),
            "<=" => Ok(CmpOp::Leq),
            "!=" => Ok(CmpOp::Neq),
            _ => Err(CompileError::UnsupportedOperator { op: op.to_string() }),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts the digits of an integer literal, optionally negated, into an
/// `i32`. `-2147483648` is accepted even though its magnitude is not.
pub fn int_literal(digits: &str, negative: bool) -> Result<i32, CompileError> {
    let literal = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    literal
        .parse::<i32>()
        .map_err(|_| CompileError::IntegerOutOfRange { literal })
}
