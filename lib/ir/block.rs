use crate::ir::*;
use falcon::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block. Holds handles to its instructions, in program order; the
/// instructions themselves live in the owning `Function`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Block {
    index: usize,
    label: String,
    instructions: Vec<InstructionId>,
}

impl Block {
    pub fn new<S: Into<String>>(index: usize, label: S) -> Block {
        Block {
            index,
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn instructions(&self) -> &[InstructionId] {
        &self.instructions
    }
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
    pub fn last(&self) -> Option<InstructionId> {
        self.instructions.last().cloned()
    }

    pub(crate) fn push(&mut self, id: InstructionId) {
        self.instructions.push(id);
    }

    /// Detach an instruction handle from this block. Returns false if the
    /// handle was not present.
    pub(crate) fn remove(&mut self, id: InstructionId) -> bool {
        match self.instructions.iter().position(|i| *i == id) {
            Some(position) => {
                self.instructions.remove(position);
                true
            }
            None => false,
        }
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[ Block 0x{:02x} {} ]", self.index(), self.label())
    }
}
