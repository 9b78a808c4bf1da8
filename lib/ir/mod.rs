//! A small typed CFG IR for whole-function dataflow analysis.
//!
//! Instructions live in an arena owned by their `Function` and are addressed
//! through `InstructionId` handles. Blocks hold ordered lists of handles and
//! are the vertices of a `falcon::graph::Graph`.

mod argument;
mod block;
mod control_flow_graph;
mod edge;
mod function;
mod instruction;
mod operand;
mod operation;
mod types;

pub use self::argument::Argument;
pub use self::block::Block;
pub use self::control_flow_graph::ControlFlowGraph;
pub use self::edge::Edge;
pub use self::function::Function;
pub use self::instruction::{Instruction, InstructionId};
pub use self::operand::Operand;
pub use self::operation::{BinaryOp, CompareOp, Operation};
pub use self::types::Type;

pub type Constant = ::falcon::il::Constant;

pub fn const_(value: u64, bits: usize) -> Constant {
    Constant::new(value, bits)
}

pub fn constant(value: u64, bits: usize) -> Operand {
    Operand::Constant(Constant::new(value, bits))
}

pub fn instruction(id: InstructionId) -> Operand {
    Operand::Instruction(id)
}

pub fn argument(position: usize) -> Operand {
    Operand::Argument(position)
}

pub fn binary(op: BinaryOp, lhs: Operand, rhs: Operand, bits: usize) -> Operation {
    Operation::Binary { op, lhs, rhs, bits }
}

pub fn add(lhs: Operand, rhs: Operand, bits: usize) -> Operation {
    binary(BinaryOp::Add, lhs, rhs, bits)
}

pub fn sub(lhs: Operand, rhs: Operand, bits: usize) -> Operation {
    binary(BinaryOp::Sub, lhs, rhs, bits)
}

pub fn mul(lhs: Operand, rhs: Operand, bits: usize) -> Operation {
    binary(BinaryOp::Mul, lhs, rhs, bits)
}

pub fn compare(op: CompareOp, lhs: Operand, rhs: Operand) -> Operation {
    Operation::Compare { op, lhs, rhs }
}

pub fn alloca(bits: usize) -> Operation {
    Operation::Alloca { bits }
}

pub fn load(address: Operand, bits: usize) -> Operation {
    Operation::Load { address, bits }
}

pub fn store(address: Operand, value: Operand) -> Operation {
    Operation::Store { address, value }
}

pub fn call<S: Into<String>>(callee: S, arguments: Vec<Operand>, return_type: Type) -> Operation {
    Operation::Call {
        callee: callee.into(),
        arguments,
        return_type,
    }
}

pub fn phi(incoming: Vec<(usize, Operand)>, bits: usize) -> Operation {
    Operation::Phi { incoming, bits }
}

pub fn branch(target: usize) -> Operation {
    Operation::Branch { target }
}

pub fn conditional_branch(condition: Operand, then_block: usize, else_block: usize) -> Operation {
    Operation::ConditionalBranch {
        condition,
        then_block,
        else_block,
    }
}

pub fn return_(value: Option<Operand>) -> Operation {
    Operation::Return(value)
}
