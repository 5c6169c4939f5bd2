mod jvm_context;
mod jvm_generator;
pub mod labels;
pub mod symbol_table;
mod validate;

use tracing::debug;

use crate::ast::Program;
use crate::error::CompileError;
use jvm_context::JvmContext;
use jvm_generator::GenerateJvm;

pub use jvm_context::{LOCALS_LIMIT, STACK_LIMIT};
pub use validate::validate;

/// Translates a whole program into Jasmin assembly for class `class_name`.
/// Nothing is returned unless the entire tree was translated.
pub fn translate_to_jasmin(program: &Program, class_name: &str) -> Result<String, CompileError> {
    validate(program)?;
    let mut context = JvmContext::new(class_name);
    program.generate(&mut context)?;
    debug_assert!(context.symbol_table.is_global_scope());
    debug!(
        functions = program.defs.len(),
        lines = context.lines().len(),
        "translation finished"
    );
    Ok(context.finish())
}
