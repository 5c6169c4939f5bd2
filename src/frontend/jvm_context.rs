use tracing::debug;

use crate::backend::AsmWriter;
use crate::error::CompileError;
use crate::frontend::labels::{IfContext, LabelAllocator, LoopContext};
use crate::frontend::symbol_table::{Slot, SymbolTable};

pub const STACK_LIMIT: u16 = 32;
pub const LOCALS_LIMIT: u16 = 32;

/// Context for Jasmin generation
/// Owns every piece of mutable state of one compilation: the symbol table,
/// the label counters, the stack of enclosing loops, the operand stack depth
/// and the output buffer.
pub struct JvmContext {
    class_name: String,
    pub symbol_table: SymbolTable,
    writer: AsmWriter,
    labels: LabelAllocator,
    loops: Vec<LoopContext>, // Innermost loop last
    current_func: String,
    next_slot: Slot, // Next free local variable slot of the current method
    stack_depth: u16,
    max_stack: u16,
}

impl JvmContext {
    pub fn new(class_name: &str) -> Self {
        JvmContext {
            class_name: class_name.to_string(),
            symbol_table: SymbolTable::new(),
            writer: AsmWriter::new(),
            labels: LabelAllocator::new(),
            loops: Vec::new(),
            current_func: String::new(),
            next_slot: 0,
            stack_depth: 0,
            max_stack: 0,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Writes one instruction and applies its effect on the operand stack
    pub fn write_inst(&mut self, inst: &str, args: &[&str]) -> Result<(), CompileError> {
        let (pops, pushes) = stack_effect(inst, args);
        self.stack_depth = self.stack_depth.saturating_sub(pops) + pushes;
        if self.stack_depth > STACK_LIMIT {
            return Err(CompileError::StackTooDeep {
                function: self.current_func.clone(),
                limit: STACK_LIMIT,
            });
        }
        self.max_stack = self.max_stack.max(self.stack_depth);
        self.writer.write_inst(inst, args);
        Ok(())
    }

    pub fn write_label(&mut self, label: &str) {
        self.writer.write_label(label);
    }

    pub fn write_directive(&mut self, directive: &str, args: &[&str], indent: bool) {
        self.writer.write_directive(directive, args, indent);
    }

    pub fn write_comment(&mut self, comment: &str) {
        self.writer.write_comment(comment);
    }

    /// Starts a `public static` method and resets the slot counter to
    /// `first_slot`
    pub fn begin_method(&mut self, name: &str, descriptor: &str, first_slot: Slot) {
        debug!(method = name, descriptor, "begin method");
        self.current_func = name.to_string();
        self.next_slot = first_slot;
        self.stack_depth = 0;
        self.max_stack = 0;
        let signature = format!("{}{}", name, descriptor);
        self.write_directive("method", &["public", "static", &signature], false);
        self.write_directive("limit", &["stack", &STACK_LIMIT.to_string()], true);
        self.write_directive("limit", &["locals", &LOCALS_LIMIT.to_string()], true);
    }

    pub fn end_method(&mut self) {
        debug!(method = %self.current_func, max_stack = self.max_stack, "end method");
        self.write_directive("end", &["method"], false);
    }

    /// Allocates the next local variable slot of the current method
    pub fn alloc_slot(&mut self, name: &str) -> Result<Slot, CompileError> {
        if self.next_slot >= LOCALS_LIMIT {
            return Err(CompileError::TooManyLocals {
                function: self.current_func.clone(),
                limit: LOCALS_LIMIT,
            });
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        debug!(method = %self.current_func, var = name, slot, "allocate slot");
        Ok(slot)
    }

    pub fn load(&mut self, slot: Slot) -> Result<(), CompileError> {
        self.slot_inst("iload", slot)
    }

    pub fn store(&mut self, slot: Slot) -> Result<(), CompileError> {
        self.slot_inst("istore", slot)
    }

    // The JVM only defines the one-byte `_<n>` forms for slots 0 to 3
    fn slot_inst(&mut self, inst: &str, slot: Slot) -> Result<(), CompileError> {
        if slot <= 3 {
            self.write_inst(&format!("{}_{}", inst, slot), &[])
        } else {
            self.write_inst(inst, &[&slot.to_string()])
        }
    }

    /// Deepest operand stack reached so far in the current method
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    pub fn new_if(&mut self, elif_count: usize, has_else: bool) -> IfContext {
        let ctx = self.labels.new_if(elif_count, has_else);
        debug!(id = ctx.id(), shape = ?ctx.shape(), "enter if");
        ctx
    }

    pub fn new_loop(&mut self) -> LoopContext {
        let ctx = self.labels.new_loop();
        debug!(start = %ctx.start, "enter while");
        ctx
    }

    /// Pushes the labels of a loop whose body is about to be generated
    pub fn enter_loop(&mut self, ctx: LoopContext) {
        self.loops.push(ctx);
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    pub fn current_loop(&self) -> Option<&LoopContext> {
        self.loops.last()
    }

    pub fn lines(&self) -> &[String] {
        self.writer.lines()
    }

    pub fn finish(self) -> String {
        self.writer.finish()
    }
}

/// Values popped from and pushed onto the operand stack by `inst`
fn stack_effect(inst: &str, args: &[&str]) -> (u16, u16) {
    match inst {
        "ldc" | "getstatic" | "aload_0" => (0, 1),
        "iadd" | "isub" => (2, 1),
        "ireturn" => (1, 0),
        "invokestatic" => invoke_effect(args, 0),
        // Instance calls also pop the receiver
        "invokevirtual" | "invokenonvirtual" => invoke_effect(args, 1),
        _ if inst.starts_with("iload") => (0, 1),
        _ if inst.starts_with("istore") => (1, 0),
        _ if inst.starts_with("if_icmp") => (2, 0),
        _ => (0, 0),
    }
}

fn invoke_effect(args: &[&str], receiver: u16) -> (u16, u16) {
    let target = args.first().copied().unwrap_or_default();
    let Some((params, ret)) = target
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
    else {
        return (receiver, 0);
    };

    let mut count = 0;
    let mut chars = params.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => continue,
            'L' => {
                // Class types run up to the next ';'
                chars.by_ref().find(|c| *c == ';');
                count += 1;
            }
            _ => count += 1,
        }
    }
    let pushes = if ret == "V" { 0 } else { 1 };
    (receiver + count, pushes)
}
