use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value read by an instruction.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Operand {
    Constant(Constant),
    Instruction(InstructionId),
    /// A function argument, by declaration position.
    Argument(usize),
}

impl Operand {
    pub fn instruction(&self) -> Option<InstructionId> {
        match self {
            Operand::Instruction(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Operand {
        Operand::Constant(constant)
    }
}

impl From<InstructionId> for Operand {
    fn from(id: InstructionId) -> Operand {
        Operand::Instruction(id)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Constant(constant) => write!(f, "{}", constant),
            Operand::Instruction(id) => write!(f, "{}", id),
            Operand::Argument(position) => write!(f, "%arg{}", position),
        }
    }
}
