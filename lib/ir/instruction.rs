use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an instruction slot in its function's arena.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct InstructionId(usize);

impl InstructionId {
    pub fn new(index: usize) -> InstructionId {
        InstructionId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Instruction {
    id: InstructionId,
    block: usize,
    operation: Operation,
    comment: Option<String>,
}

impl Instruction {
    pub fn new(id: InstructionId, block: usize, operation: Operation) -> Instruction {
        Instruction {
            id,
            block,
            operation,
            comment: None,
        }
    }

    pub fn id(&self) -> InstructionId {
        self.id
    }

    /// Index of the block this instruction belongs to.
    pub fn block(&self) -> usize {
        self.block
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub(crate) fn operation_mut(&mut self) -> &mut Operation {
        &mut self.operation
    }

    pub fn ty(&self) -> Type {
        self.operation.ty()
    }

    pub fn operands(&self) -> Vec<&Operand> {
        self.operation.operands()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Returns true if this instruction produces a value that other
    /// instructions may read.
    pub fn is_definition(&self) -> bool {
        let operation = self.operation();
        !(operation.is_terminator() || operation.is_store() || self.ty().is_void())
    }

    /// Definitions with no side effects, which may be removed when their
    /// value is never needed.
    pub fn is_eliminable_definition(&self) -> bool {
        let operation = self.operation();
        self.is_definition() && !operation.is_call()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let comment = self
            .comment()
            .map(|comment| format!(" // {}", comment))
            .unwrap_or_default();

        if self.is_definition() {
            write!(f, "{} = {}{}", self.id, self.operation, comment)
        } else {
            write!(f, "{}{}", self.operation, comment)
        }
    }
}
