use crate::ast::*;
use crate::error::CompileError;
use crate::frontend::jvm_context::JvmContext;
use crate::frontend::labels::IfContext;

const PRINT_STREAM: &str = "java/lang/System/out";
const PRINT_STREAM_TYPE: &str = "Ljava/io/PrintStream;";
const PRINTLN_STRING: &str = "java/io/PrintStream/println(Ljava/lang/String;)V";
const PRINTLN_INT: &str = "java/io/PrintStream/println(I)V";

/// Trait for generating Jasmin instructions
pub trait GenerateJvm {
    fn generate(&self, ctx: &mut JvmContext) -> Result<(), CompileError>;
}

impl GenerateJvm for Program {
    fn generate(&self, ctx: &mut JvmContext) -> Result<(), CompileError> {
        // Class declaration and the default constructor
        let class_name = ctx.class_name().to_string();
        ctx.write_directive("class", &["public", &class_name], false);
        ctx.write_directive("super", &["java/lang/Object"], false);
        ctx.write_comment("standard initializer");
        ctx.write_directive("method", &["public", "<init>()V"], false);
        ctx.write_inst("aload_0", &[])?;
        ctx.write_inst("invokenonvirtual", &["java/lang/Object/<init>()V"])?;
        ctx.write_inst("return", &[])?;
        ctx.end_method();

        for func_def in &self.defs {
            func_def.generate(ctx)?;
        }

        // Slot 0 of `main` holds the argument array
        ctx.begin_method("main", "([Ljava/lang/String;)V", 1);
        for stmt in &self.body {
            stmt.generate(ctx)?;
        }
        ctx.write_inst("return", &[])?;
        ctx.end_method();
        Ok(())
    }
}

impl GenerateJvm for FuncDef {
    fn generate(&self, ctx: &mut JvmContext) -> Result<(), CompileError> {
        ctx.symbol_table.enter_scope(); // Enter function scope
        ctx.begin_method(&self.func_name, &int_descriptor(self.params.len()), 0);
        // Parameters occupy slots 0..n in declaration order
        for param in &self.params {
            let slot = ctx.alloc_slot(param)?;
            ctx.symbol_table.insert(param.clone(), slot);
        }

        for stmt in &self.body {
            stmt.generate(ctx)?;
        }
        ctx.symbol_table.exit_scope(); // Exit function scope
        ctx.end_method();
        Ok(())
    }
}

impl GenerateJvm for Stmt {
    fn generate(&self, ctx: &mut JvmContext) -> Result<(), CompileError> {
        match self {
            Stmt::Assign { target, value } => {
                value.generate(ctx)?;
                // Storage is per function: a name first assigned inside a
                // nested block still takes the next slot of the method
                let slot = match ctx.symbol_table.lookup(target) {
                    Some(slot) => slot,
                    None => ctx.alloc_slot(target)?,
                };
                ctx.symbol_table.insert(target.clone(), slot);
                ctx.store(slot)?;
            } // Stmt::Assign
            Stmt::If {
                branches,
                else_body,
            } => {
                // if a < b: A elif c == d: B else: C
                // will be translated to:
                //   <a> <b> if_icmpge elif1LabelN
                //   A
                //   goto endLabelN
                // elif1LabelN:
                //   <c> <d> if_icmpne elif2LabelN
                //   B
                //   goto endLabelN
                // elif2LabelN:
                //   C
                // endLabelN:
                let if_ctx = ctx.new_if(branches.len() - 1, else_body.is_some());
                for (i, branch) in branches.iter().enumerate() {
                    if let Some(label) = if_ctx.entry_label(i) {
                        ctx.write_label(&label);
                    }
                    branch.cond.generate_branch(ctx, &if_ctx.fail_target(i))?;
                    generate_block(&branch.body, ctx)?;
                    close_branch(ctx, &if_ctx, i)?;
                }
                if let Some(else_body) = else_body {
                    if let Some(label) = if_ctx.else_label() {
                        ctx.write_label(&label);
                    }
                    generate_block(else_body, ctx)?;
                    close_branch(ctx, &if_ctx, branches.len())?;
                }
            } // Stmt::If
            Stmt::While { cond, body } => {
                // while a < b: body
                // will be translated to:
                // loop_startN:
                //   <a> <b> if_icmpge loop_endN
                //   body
                //   goto loop_startN
                // loop_endN:
                let loop_ctx = ctx.new_loop();
                ctx.write_label(&loop_ctx.start);
                cond.generate_branch(ctx, &loop_ctx.end)?;

                // Push information for break/continue statements before
                // generating the loop body
                ctx.enter_loop(loop_ctx.clone());
                generate_block(body, ctx)?;
                ctx.exit_loop();

                ctx.write_inst("goto", &[&loop_ctx.start])?;
                ctx.write_label(&loop_ctx.end);
            } // Stmt::While
            Stmt::Break => {
                let target = ctx
                    .current_loop()
                    .ok_or(CompileError::BreakOutsideLoop)?
                    .end
                    .clone();
                ctx.write_inst("goto", &[&target])?;
            } // Stmt::Break
            Stmt::Continue => {
                let target = ctx
                    .current_loop()
                    .ok_or(CompileError::ContinueOutsideLoop)?
                    .start
                    .clone();
                ctx.write_inst("goto", &[&target])?;
            } // Stmt::Continue
            Stmt::Return { expr } => match expr {
                Some(expr) => {
                    expr.generate(ctx)?;
                    ctx.write_inst("ireturn", &[])?;
                }
                None => ctx.write_inst("return", &[])?,
            }, // Stmt::Return
            Stmt::Print { arg } => {
                ctx.write_inst("getstatic", &[PRINT_STREAM, PRINT_STREAM_TYPE])?;
                match arg {
                    PrintArg::Str(text) => {
                        ctx.write_inst("ldc", &[&format!("\"{}\"", text)])?;
                        ctx.write_inst("invokevirtual", &[PRINTLN_STRING])?;
                    }
                    PrintArg::Expr(expr) => {
                        expr.generate(ctx)?;
                        ctx.write_inst("invokevirtual", &[PRINTLN_INT])?;
                    }
                }
            } // Stmt::Print
        }
        Ok(())
    }
}

impl GenerateJvm for Expr {
    fn generate(&self, ctx: &mut JvmContext) -> Result<(), CompileError> {
        match self {
            Expr::Number(n) => ctx.write_inst("ldc", &[&n.to_string()])?,
            Expr::Var(name) => {
                let slot = ctx
                    .symbol_table
                    .lookup(name)
                    .ok_or_else(|| CompileError::UndeclaredVariable { name: name.clone() })?;
                ctx.load(slot)?;
            }
            Expr::Call { func_name, args } => {
                // Arguments are pushed left to right
                for arg in args {
                    arg.generate(ctx)?;
                }
                let target = format!(
                    "{}/{}{}",
                    ctx.class_name(),
                    func_name,
                    int_descriptor(args.len())
                );
                ctx.write_inst("invokestatic", &[&target])?;
            }
            Expr::Binary { op, lhs, rhs } => {
                lhs.generate(ctx)?;
                rhs.generate(ctx)?;
                match op {
                    BinaryOp::Add => ctx.write_inst("iadd", &[])?,
                    BinaryOp::Sub => ctx.write_inst("isub", &[])?,
                }
            }
        }
        Ok(())
    }
}

impl Cond {
    /// Pushes both operands and jumps to `target` when the comparison fails
    fn generate_branch(&self, ctx: &mut JvmContext, target: &str) -> Result<(), CompileError> {
        self.lhs.generate(ctx)?;
        self.rhs.generate(ctx)?;
        ctx.write_inst(negated_branch(self.op), &[target])?;
        Ok(())
    }
}

/// Conditional jump taken when `op` does not hold
fn negated_branch(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Lt => "if_icmpge",
        CmpOp::Gt => "if_icmple",
        CmpOp::Eq => "if_icmpne",
        CmpOp::Geq => "if_icmplt",
        CmpOp::Leq => "if_icmpgt",
        CmpOp::Neq => "if_icmpeq",
    }
}

/// Method descriptor taking `arity` ints and returning an int
fn int_descriptor(arity: usize) -> String {
    format!("({})I", "I".repeat(arity))
}

/// Generates the body of an `if` branch or loop in its own scope
fn generate_block(stmts: &[Stmt], ctx: &mut JvmContext) -> Result<(), CompileError> {
    ctx.symbol_table.enter_scope();
    for stmt in stmts {
        stmt.generate(ctx)?;
    }
    ctx.symbol_table.exit_scope();
    Ok(())
}

/// Ends body `branch` of an `if`: the last body places the end label,
/// every other body jumps over the rest of the construct
fn close_branch(
    ctx: &mut JvmContext,
    if_ctx: &IfContext,
    branch: usize,
) -> Result<(), CompileError> {
    let end = if_ctx.end_label();
    if if_ctx.is_terminal(branch) {
        ctx.write_label(&end);
        Ok(())
    } else {
        ctx.write_inst("goto", &[&end])
    }
}
