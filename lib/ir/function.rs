use crate::error::*;
use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A function: arguments, a control-flow graph, and the arena owning every
/// instruction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Function {
    name: String,
    arguments: Vec<Argument>,
    control_flow_graph: ControlFlowGraph,
    // Removed instructions leave a `None` slot, so handles are never reused.
    instructions: Vec<Option<Instruction>>,
}

impl Function {
    pub fn new<S: Into<String>>(name: S) -> Function {
        Function {
            name: name.into(),
            arguments: Vec::new(),
            control_flow_graph: ControlFlowGraph::new(),
            instructions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an argument and return an operand referring to it.
    pub fn add_argument<S: Into<String>>(&mut self, name: S, ty: Type) -> Operand {
        let position = self.arguments.len();
        self.arguments.push(Argument::new(position, name, ty));
        Operand::Argument(position)
    }
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
    pub fn argument(&self, position: usize) -> Option<&Argument> {
        self.arguments.get(position)
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn new_block<S: Into<String>>(&mut self, label: S) -> Result<usize> {
        self.control_flow_graph.new_block(label)
    }
    pub fn set_entry(&mut self, index: usize) -> Result<()> {
        self.control_flow_graph.set_entry(index)
    }
    pub fn entry(&self) -> Option<usize> {
        self.control_flow_graph.entry()
    }

    pub fn block(&self, index: usize) -> Result<&Block> {
        self.control_flow_graph.block(index)
    }
    pub fn blocks(&self) -> Vec<&Block> {
        self.control_flow_graph.blocks()
    }
    pub fn successors(&self, index: usize) -> Result<Vec<usize>> {
        self.control_flow_graph.successors(index)
    }
    pub fn predecessors(&self, index: usize) -> Result<Vec<usize>> {
        self.control_flow_graph.predecessors(index)
    }
    pub fn exit_blocks(&self) -> Result<Vec<usize>> {
        self.control_flow_graph.exit_blocks()
    }

    pub fn instruction(&self, id: InstructionId) -> Result<&Instruction> {
        self.instructions
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| ErrorKind::InvalidInstruction(format!("{}", id)).into())
    }

    pub fn contains(&self, id: InstructionId) -> bool {
        self.instruction(id).is_ok()
    }

    /// The instructions of one block, in program order.
    pub fn block_instructions(&self, index: usize) -> Result<Vec<&Instruction>> {
        self.block(index)?
            .instructions()
            .iter()
            .map(|id| self.instruction(*id))
            .collect()
    }

    /// Every instruction, blocks in layout order and instructions in block
    /// order.
    pub fn instructions(&self) -> Vec<&Instruction> {
        self.blocks()
            .into_iter()
            .flat_map(|block| block.instructions().iter())
            .filter_map(|id| self.instruction(*id).ok())
            .collect()
    }

    pub fn num_instructions(&self) -> usize {
        self.instructions.iter().filter(|slot| slot.is_some()).count()
    }

    /// Append an operation to the end of a block. Terminators insert the
    /// control-flow edges to their targets.
    pub fn append(&mut self, block_index: usize, operation: Operation) -> Result<InstructionId> {
        if let Some(last) = self.block(block_index)?.last() {
            if self.instruction(last)?.operation().is_terminator() {
                bail!("Block 0x{:x} is already terminated", block_index);
            }
        }

        for operand in operation.operands() {
            self.check_operand(operand)?;
        }
        if let Some(incoming) = operation.incoming() {
            for (predecessor, _) in incoming {
                self.block(*predecessor)?;
            }
        }
        for target in operation.targets() {
            self.block(target)?;
        }

        let id = InstructionId::new(self.instructions.len());
        let targets = operation.targets();
        self.instructions
            .push(Some(Instruction::new(id, block_index, operation)));
        self.control_flow_graph.block_mut(block_index)?.push(id);

        for target in targets {
            self.control_flow_graph.insert_edge(block_index, target)?;
        }

        Ok(id)
    }

    /// Add an incoming value to a phi. Used to close loops, where the value
    /// flowing around the back-edge is created after the phi.
    pub fn add_phi_incoming(
        &mut self,
        phi: InstructionId,
        predecessor: usize,
        operand: Operand,
    ) -> Result<()> {
        self.check_operand(&operand)?;
        self.block(predecessor)?;
        let slot = self
            .instructions
            .get_mut(phi.index())
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::from(ErrorKind::InvalidInstruction(format!("{}", phi))))?;
        match slot.operation_mut() {
            Operation::Phi { incoming, .. } => {
                incoming.push((predecessor, operand));
                Ok(())
            }
            _ => Err(ErrorKind::InvalidInstruction(format!("{} is not a phi", phi)).into()),
        }
    }

    pub fn set_comment(&mut self, id: InstructionId, comment: Option<String>) -> Result<()> {
        match self.instructions.get_mut(id.index()).and_then(|s| s.as_mut()) {
            Some(instruction) => {
                instruction.set_comment(comment);
                Ok(())
            }
            None => Err(ErrorKind::InvalidInstruction(format!("{}", id)).into()),
        }
    }

    fn check_operand(&self, operand: &Operand) -> Result<()> {
        match operand {
            Operand::Constant(_) => Ok(()),
            Operand::Instruction(id) => {
                if self.instruction(*id)?.is_definition() {
                    Ok(())
                } else {
                    Err(ErrorKind::InvalidInstruction(format!("{} produces no value", id)).into())
                }
            }
            Operand::Argument(position) => match self.argument(*position) {
                Some(_) => Ok(()),
                None => bail!("No argument at position {}", position),
            },
        }
    }

    /// If `operand` is the result of an `Alloca` in this function, return it.
    pub fn local_allocation(&self, operand: &Operand) -> Option<InstructionId> {
        let id = operand.instruction()?;
        match self.instruction(id) {
            Ok(instruction) if instruction.operation().is_alloca() => Some(id),
            _ => None,
        }
    }

    /// Remove one instruction from its block. Fails if any other instruction
    /// still reads its value.
    pub fn remove_instruction(&mut self, id: InstructionId) -> Result<Instruction> {
        let mut ids = HashSet::new();
        ids.insert(id);
        self.remove_instructions(&ids)
            .map(|mut removed| removed.remove(0))
    }

    /// Remove a set of instructions at once. Instructions in the set may
    /// reference each other, but no instruction outside the set may
    /// reference any of them. Returns the removed instructions in program
    /// order.
    pub fn remove_instructions(
        &mut self,
        ids: &HashSet<InstructionId>,
    ) -> Result<Vec<Instruction>> {
        for id in ids {
            self.instruction(*id)?;
        }

        for instruction in self.instructions() {
            if ids.contains(&instruction.id()) {
                continue;
            }
            if let Some(stale) = instruction
                .operation()
                .instructions_read()
                .into_iter()
                .find(|read| ids.contains(read))
            {
                return Err(ErrorKind::StaleReference(format!(
                    "{} is still read by \"{}\"",
                    stale, instruction
                ))
                .into());
            }
        }

        let order: Vec<InstructionId> = self
            .instructions()
            .into_iter()
            .map(|instruction| instruction.id())
            .filter(|id| ids.contains(id))
            .collect();

        let mut removed = Vec::with_capacity(order.len());
        for id in order {
            let instruction = match self.instructions[id.index()].take() {
                Some(instruction) => instruction,
                None => bail!("Instruction {} removed twice", id),
            };
            self.control_flow_graph
                .block_mut(instruction.block())?
                .remove(id);
            removed.push(instruction);
        }

        Ok(removed)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let arguments = self
            .arguments()
            .iter()
            .map(|argument| format!("{}", argument))
            .collect::<Vec<String>>()
            .join(", ");
        writeln!(f, "function {}({})", self.name(), arguments)?;
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
            for id in block.instructions() {
                if let Ok(instruction) = self.instruction(*id) {
                    writeln!(f, "  {}", instruction)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators_insert_edges() {
        let mut function = Function::new("branches");
        let a = function.add_argument("a", Type::Integer(1));
        let entry = function.new_block("entry").unwrap();
        let done = function.new_block("done").unwrap();
        function
            .append(entry, conditional_branch(a, done, done))
            .unwrap();
        function.append(done, return_(None)).unwrap();

        assert_eq!(function.successors(entry).unwrap(), vec![done]);
        assert_eq!(function.predecessors(done).unwrap(), vec![entry]);
        assert_eq!(function.exit_blocks().unwrap(), vec![done]);

        let error = function.append(done, return_(None)).unwrap_err();
        assert!(error.to_string().contains("already terminated"));
    }

    #[test]
    fn read_values_cannot_be_removed() {
        let mut function = Function::new("chain");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let x = function.append(entry, add(a, constant(1, 32), 32)).unwrap();
        let r = function
            .append(entry, return_(Some(instruction(x))))
            .unwrap();
        function.set_comment(x, Some("x".to_string())).unwrap();
        assert!(format!("{}", function).contains("%0 = add i32 %arg0, "));
        assert!(format!("{}", function).contains("// x"));

        let error = function.remove_instruction(x).unwrap_err();
        match error.kind() {
            ErrorKind::StaleReference(_) => {}
            kind => panic!("expected StaleReference, got {:?}", kind),
        }
        assert!(function.contains(x));

        function.remove_instruction(r).unwrap();
        function.remove_instruction(x).unwrap();
        assert_eq!(function.num_instructions(), 0);
        assert!(function.block(entry).unwrap().is_empty());
    }
}
