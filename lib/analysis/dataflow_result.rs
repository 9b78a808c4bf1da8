use crate::analysis::fixed_point::BlockStates;
use crate::analysis::{BitSet, Entity, EntityIndex};
use crate::ir;
use std::collections::HashMap;

/// Everything one analysis run exposes: the universe it ran over, the
/// converged block states, and the state at the program point immediately
/// before each instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataflowResult {
    entities: EntityIndex,
    block_states: BlockStates,
    instruction_states: HashMap<ir::InstructionId, BitSet>,
}

impl DataflowResult {
    pub fn new(
        entities: EntityIndex,
        block_states: BlockStates,
        instruction_states: HashMap<ir::InstructionId, BitSet>,
    ) -> DataflowResult {
        DataflowResult {
            entities,
            block_states,
            instruction_states,
        }
    }

    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    pub fn block_states(&self) -> &BlockStates {
        &self.block_states
    }

    pub fn in_state(&self, block_index: usize) -> Option<&BitSet> {
        self.block_states.in_state(block_index)
    }

    pub fn out_state(&self, block_index: usize) -> Option<&BitSet> {
        self.block_states.out_state(block_index)
    }

    /// The state immediately before `id`. Instructions in blocks the engine
    /// never visited have no state.
    pub fn instruction_state(&self, id: ir::InstructionId) -> Option<&BitSet> {
        self.instruction_states.get(&id)
    }

    pub fn instruction_states(&self) -> &HashMap<ir::InstructionId, BitSet> {
        &self.instruction_states
    }

    /// Returns true if `entity` is tracked and its bit is set in `state`.
    pub fn contains(&self, state: &BitSet, entity: &Entity) -> bool {
        self.entities
            .index(entity)
            .map(|position| state.contains(position))
            .unwrap_or(false)
    }
}
