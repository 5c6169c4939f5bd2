use std::collections::HashMap;

/// Index of a local variable in the JVM activation record
pub type Slot = u16;

/// Symbol table mapping variable names to local variable slots
/// Frames are stored innermost-last; frame 0 is the global frame, which the
/// entry point's top-level statements bind into.
/// Slot numbering is not the table's concern: the translation context hands
/// out slots per function, the table only records which names see them.
pub struct SymbolTable {
    frames: Vec<HashMap<String, Slot>>, // Names are stored verbatim
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a symbol table holding only the global frame
    pub fn new() -> Self {
        SymbolTable {
            frames: vec![HashMap::new()],
        }
    }

    /// Number of live frames, the global frame included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_global_scope(&self) -> bool {
        self.frames.len() == 1
    }

    /// Searches from the innermost frame outwards and returns the first match
    pub fn lookup(&self, name: &str) -> Option<Slot> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// Binds `name` in the innermost frame only, shadowing outer bindings
    pub fn insert(&mut self, name: String, slot: Slot) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, slot);
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            panic!("No outer scope to exit to");
        }
    }
}
