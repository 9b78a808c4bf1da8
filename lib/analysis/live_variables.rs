//! Live variable analysis.
//!
//! A value is live at a point if some path from that point reads it before
//! the end of the function. Phi operands are live only along the edge from
//! the predecessor they name.

use crate::analysis::fixed_point::{self, DataflowAnalysis, Direction};
use crate::analysis::{BitSet, DataflowResult, EntityIndex};
use crate::config::Config;
use crate::error::*;
use crate::ir;
use std::collections::HashMap;

/// Compute the live variables of the given function.
pub fn live_variables(function: &ir::Function) -> Result<DataflowResult> {
    live_variables_with(function, &Config::default())
}

pub fn live_variables_with(function: &ir::Function, config: &Config) -> Result<DataflowResult> {
    let mut live_variables = LiveVariables {
        entities: EntityIndex::new(function, true, ir::Instruction::is_definition),
        before: HashMap::new(),
    };

    let block_states = fixed_point::fixed_point(&mut live_variables, function, config)?;

    Ok(DataflowResult::new(
        live_variables.entities,
        block_states,
        live_variables.before,
    ))
}

struct LiveVariables {
    entities: EntityIndex,
    before: HashMap<ir::InstructionId, BitSet>,
}

impl DataflowAnalysis for LiveVariables {
    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn top(&self) -> BitSet {
        self.entities.empty_set()
    }

    fn boundary_condition(&self, state: &mut BitSet) {
        *state = self.entities.empty_set();
    }

    fn meet(&self, accumulator: &mut BitSet, operand: &BitSet) {
        accumulator.union_with(operand);
    }

    fn initial_interior_point(&self, _block: &ir::Block) -> BitSet {
        self.entities.empty_set()
    }

    fn transfer(
        &mut self,
        function: &ir::Function,
        block: &ir::Block,
        state: &BitSet,
    ) -> Result<BitSet> {
        let mut state = state.clone();

        let instructions = function.block_instructions(block.index())?;
        for instruction in instructions.into_iter().rev() {
            if let Some(position) = self.entities.instruction_index(instruction.id()) {
                state.remove(position);
            }

            // Phi operands are added on the incoming edges instead.
            if !instruction.operation().is_phi() {
                for operand in instruction.operands() {
                    if let Some(position) = self.entities.operand_index(operand) {
                        state.insert(position);
                    }
                }
            }

            self.before.insert(instruction.id(), state.clone());
        }

        Ok(state)
    }

    fn edge_transfer(
        &self,
        function: &ir::Function,
        head: usize,
        tail: usize,
        state: &mut BitSet,
    ) -> Result<()> {
        for instruction in function.block_instructions(tail)? {
            if let Some(operand) = instruction.operation().incoming_from(head) {
                if let Some(position) = self.entities.operand_index(operand) {
                    state.insert(position);
                }
            }
        }
        Ok(())
    }
}
