//! Checks run on the syntax tree before any instruction is emitted.
//!
//! Translation appends to the output as it walks, so every violation that
//! does not depend on scoping is rejected here up front.

use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::error::CompileError;

struct Validator<'a> {
    arities: HashMap<&'a str, usize>,
    in_function: bool,
    loop_depth: usize,
}

pub fn validate(program: &Program) -> Result<(), CompileError> {
    let mut arities = HashMap::new();
    for func_def in &program.defs {
        if arities
            .insert(func_def.func_name.as_str(), func_def.params.len())
            .is_some()
        {
            return Err(CompileError::DuplicateFunction {
                name: func_def.func_name.clone(),
            });
        }
    }

    let mut validator = Validator {
        arities,
        in_function: true,
        loop_depth: 0,
    };
    for func_def in &program.defs {
        let mut seen = HashSet::new();
        for param in &func_def.params {
            if !seen.insert(param.as_str()) {
                return Err(CompileError::DuplicateParameter {
                    function: func_def.func_name.clone(),
                    param: param.clone(),
                });
            }
        }
        validator.block(&func_def.body)?;
    }

    validator.in_function = false;
    validator.block(&program.body)
}

impl Validator<'_> {
    fn block(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        stmts.iter().try_for_each(|stmt| self.stmt(stmt))
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign { value, .. } => self.expr(value),
            Stmt::If {
                branches,
                else_body,
            } => {
                if branches.is_empty() {
                    return Err(CompileError::MalformedTree {
                        message: "'if' without a test".to_string(),
                    });
                }
                for branch in branches {
                    self.cond(&branch.cond)?;
                    self.block(&branch.body)?;
                }
                match else_body {
                    Some(body) => self.block(body),
                    None => Ok(()),
                }
            }
            Stmt::While { cond, body } => {
                self.cond(cond)?;
                self.loop_depth += 1;
                let result = self.block(body);
                self.loop_depth -= 1;
                result
            }
            Stmt::Break if self.loop_depth == 0 => Err(CompileError::BreakOutsideLoop),
            Stmt::Continue if self.loop_depth == 0 => Err(CompileError::ContinueOutsideLoop),
            Stmt::Break | Stmt::Continue => Ok(()),
            Stmt::Return { expr: Some(expr) } => {
                if !self.in_function {
                    return Err(CompileError::ReturnValueOutsideFunction);
                }
                self.expr(expr)
            }
            Stmt::Return { expr: None } => Ok(()),
            Stmt::Print { arg } => match arg {
                PrintArg::Str(_) => Ok(()),
                PrintArg::Expr(expr) => self.expr(expr),
            },
        }
    }

    fn cond(&self, cond: &Cond) -> Result<(), CompileError> {
        self.expr(&cond.lhs)?;
        self.expr(&cond.rhs)
    }

    fn expr(&self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(_) | Expr::Var(_) => Ok(()),
            Expr::Call { func_name, args } => {
                let Some(&expected) = self.arities.get(func_name.as_str()) else {
                    return Err(CompileError::UndefinedFunction {
                        name: func_name.clone(),
                    });
                };
                if expected != args.len() {
                    return Err(CompileError::ArityMismatch {
                        name: func_name.clone(),
                        expected,
                        found: args.len(),
                    });
                }
                args.iter().try_for_each(|arg| self.expr(arg))
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs)?;
                self.expr(rhs)
            }
        }
    }
}
