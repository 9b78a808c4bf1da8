use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Divu,
    Modu,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CompareOp {
    Eq,
    Neq,
    Ltu,
    Lts,
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Operation {
    Binary {
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
        bits: usize,
    },
    Compare {
        op: CompareOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// Reserve a stack slot local to the function. Produces its address.
    Alloca {
        bits: usize,
    },
    Load {
        address: Operand,
        bits: usize,
    },
    Store {
        address: Operand,
        value: Operand,
    },
    Call {
        callee: String,
        arguments: Vec<Operand>,
        return_type: Type,
    },
    /// A merge node. Each pair is a predecessor block index and the value
    /// flowing in along the edge from that block.
    Phi {
        incoming: Vec<(usize, Operand)>,
        bits: usize,
    },
    Branch {
        target: usize,
    },
    ConditionalBranch {
        condition: Operand,
        then_block: usize,
        else_block: usize,
    },
    Return(Option<Operand>),
}

impl Operation {
    pub fn is_alloca(&self) -> bool {
        match self {
            Operation::Alloca { .. } => true,
            _ => false,
        }
    }

    pub fn is_store(&self) -> bool {
        match self {
            Operation::Store { .. } => true,
            _ => false,
        }
    }

    pub fn is_call(&self) -> bool {
        match self {
            Operation::Call { .. } => true,
            _ => false,
        }
    }

    pub fn is_phi(&self) -> bool {
        match self {
            Operation::Phi { .. } => true,
            _ => false,
        }
    }

    pub fn is_terminator(&self) -> bool {
        match self {
            Operation::Branch { .. }
            | Operation::ConditionalBranch { .. }
            | Operation::Return(_) => true,
            _ => false,
        }
    }

    /// The type of the value this operation produces.
    pub fn ty(&self) -> Type {
        match self {
            Operation::Binary { bits, .. }
            | Operation::Load { bits, .. }
            | Operation::Phi { bits, .. } => Type::Integer(*bits),
            Operation::Compare { .. } => Type::Integer(1),
            Operation::Alloca { .. } => Type::Pointer,
            Operation::Call { return_type, .. } => *return_type,
            Operation::Store { .. }
            | Operation::Branch { .. }
            | Operation::ConditionalBranch { .. }
            | Operation::Return(_) => Type::Void,
        }
    }

    pub fn incoming(&self) -> Option<&[(usize, Operand)]> {
        match self {
            Operation::Phi { incoming, .. } => Some(incoming),
            _ => None,
        }
    }

    /// The phi operand flowing in from `predecessor`, if this is a phi.
    pub fn incoming_from(&self, predecessor: usize) -> Option<&Operand> {
        self.incoming()?
            .iter()
            .find(|(block, _)| *block == predecessor)
            .map(|(_, operand)| operand)
    }

    /// Block indices this operation may transfer control to.
    pub fn targets(&self) -> Vec<usize> {
        match self {
            Operation::Branch { target } => vec![*target],
            Operation::ConditionalBranch {
                then_block,
                else_block,
                ..
            } => {
                if then_block == else_block {
                    vec![*then_block]
                } else {
                    vec![*then_block, *else_block]
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Operation::Binary { lhs, rhs, .. } | Operation::Compare { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            Operation::Alloca { .. } | Operation::Branch { .. } => Vec::new(),
            Operation::Load { address, .. } => vec![address],
            Operation::Store { address, value } => vec![address, value],
            Operation::Call { arguments, .. } => arguments.iter().collect(),
            Operation::Phi { incoming, .. } => incoming.iter().map(|(_, o)| o).collect(),
            Operation::ConditionalBranch { condition, .. } => vec![condition],
            Operation::Return(value) => value.iter().collect(),
        }
    }

    /// Instructions whose results this operation reads.
    pub fn instructions_read(&self) -> Vec<InstructionId> {
        self.operands()
            .into_iter()
            .filter_map(|operand| operand.instruction())
            .collect()
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Divu => "divu",
            BinaryOp::Modu => "modu",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "cmpeq",
            CompareOp::Neq => "cmpneq",
            CompareOp::Ltu => "cmpltu",
            CompareOp::Lts => "cmplts",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Binary { op, lhs, rhs, bits } => {
                write!(f, "{} i{} {}, {}", op, bits, lhs, rhs)
            }
            Operation::Compare { op, lhs, rhs } => write!(f, "{} {}, {}", op, lhs, rhs),
            Operation::Alloca { bits } => write!(f, "alloca i{}", bits),
            Operation::Load { address, bits } => write!(f, "load i{} [{}]", bits, address),
            Operation::Store { address, value } => write!(f, "store [{}] = {}", address, value),
            Operation::Call {
                callee,
                arguments,
                return_type,
            } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| format!("{}", argument))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "call {} {}({})", return_type, callee, arguments)
            }
            Operation::Phi { incoming, bits } => {
                let incoming = incoming
                    .iter()
                    .map(|(block, operand)| format!("[{}, 0x{:02x}]", operand, block))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "phi i{} {}", bits, incoming)
            }
            Operation::Branch { target } => write!(f, "branch 0x{:02x}", target),
            Operation::ConditionalBranch {
                condition,
                then_block,
                else_block,
            } => write!(
                f,
                "branch {} ? 0x{:02x} : 0x{:02x}",
                condition, then_block, else_block
            ),
            Operation::Return(value) => match value {
                Some(value) => write!(f, "return {}", value),
                None => write!(f, "return"),
            },
        }
    }
}
