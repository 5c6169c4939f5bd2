//! Label allocation for conditional and loop constructs.
//!
//! Every construct instance draws its own id when it is entered, so
//! sequential and nested constructs of the same kind never share labels.

/// Branch layout of one `if` construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfShape {
    /// `if`
    IfOnly,
    /// `if` / `else`
    IfElse,
    /// `if` / `elif`+ / `else`
    ElifElse,
    /// `if` / `elif`+
    ElifNoElse,
}

impl IfShape {
    pub fn classify(elif_count: usize, has_else: bool) -> Self {
        match (elif_count, has_else) {
            (0, false) => IfShape::IfOnly,
            (0, true) => IfShape::IfElse,
            (_, true) => IfShape::ElifElse,
            (_, false) => IfShape::ElifNoElse,
        }
    }

    pub fn has_else(self) -> bool {
        matches!(self, IfShape::IfElse | IfShape::ElifElse)
    }
}

/// Labels of one `if` construct instance
/// Branch 0 is the `if` test, branch `i >= 1` is the `i`-th `elif`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfContext {
    id: u32,
    shape: IfShape,
    branch_count: usize,
}

impl IfContext {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn shape(&self) -> IfShape {
        self.shape
    }

    pub fn end_label(&self) -> String {
        format!("endLabel{}", self.id)
    }

    fn elif_label(&self, index: usize) -> String {
        format!("elif{}Label{}", index, self.id)
    }

    /// Label placed before the test of `branch`, if the branch has one
    pub fn entry_label(&self, branch: usize) -> Option<String> {
        (branch > 0).then(|| self.elif_label(branch))
    }

    /// Label placed at the start of the `else` body
    pub fn else_label(&self) -> Option<String> {
        match self.shape {
            IfShape::IfElse => Some(format!("elseLabel{}", self.id)),
            IfShape::ElifElse => Some(self.elif_label(self.branch_count)),
            IfShape::IfOnly | IfShape::ElifNoElse => None,
        }
    }

    /// Where control goes when the test of `branch` fails
    pub fn fail_target(&self, branch: usize) -> String {
        let last = branch + 1 == self.branch_count;
        match self.shape {
            IfShape::IfOnly => self.end_label(),
            IfShape::IfElse => format!("elseLabel{}", self.id),
            IfShape::ElifElse => self.elif_label(branch + 1),
            IfShape::ElifNoElse if last => self.end_label(),
            IfShape::ElifNoElse => self.elif_label(branch + 1),
        }
    }

    /// Whether `branch` is the last body of the construct; the `else` body
    /// is addressed as `branch_count`.
    pub fn is_terminal(&self, branch: usize) -> bool {
        let bodies = self.branch_count + usize::from(self.shape.has_else());
        branch + 1 == bodies
    }
}

/// Labels of one `while` loop instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopContext {
    pub start: String,
    pub end: String,
}

/// Hands out per-instance ids for `if` and `while` constructs
/// Ids start at 1 and increase in document order of construct entry.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    if_count: u32,
    while_count: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_if(&mut self, elif_count: usize, has_else: bool) -> IfContext {
        self.if_count += 1;
        IfContext {
            id: self.if_count,
            shape: IfShape::classify(elif_count, has_else),
            branch_count: elif_count + 1,
        }
    }

    pub fn new_loop(&mut self) -> LoopContext {
        self.while_count += 1;
        LoopContext {
            start: format!("loop_start{}", self.while_count),
            end: format!("loop_end{}", self.while_count),
        }
    }
}
