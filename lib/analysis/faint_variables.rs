//! Faint variable analysis.
//!
//! A value is faint if it is dead, or is only read by other faint values.
//! Unlike liveness this catches cycles of values feeding only each other,
//! and stores to stack slots which are never loaded.
//!
//! This is a backward must-analysis: every value starts faint, and a value
//! stops being faint once something which must be kept reads it.

use crate::analysis::fixed_point::{self, DataflowAnalysis, Direction};
use crate::analysis::{BitSet, DataflowResult, EntityIndex};
use crate::config::Config;
use crate::error::*;
use crate::ir;
use std::collections::HashMap;

/// Compute the faint variables of the given function.
pub fn faint_variables(function: &ir::Function) -> Result<DataflowResult> {
    faint_variables_with(function, &Config::default())
}

pub fn faint_variables_with(function: &ir::Function, config: &Config) -> Result<DataflowResult> {
    let mut faint_variables = FaintVariables {
        entities: EntityIndex::new(function, true, ir::Instruction::is_definition),
        before: HashMap::new(),
    };

    let block_states = fixed_point::fixed_point(&mut faint_variables, function, config)?;

    Ok(DataflowResult::new(
        faint_variables.entities,
        block_states,
        faint_variables.before,
    ))
}

struct FaintVariables {
    entities: EntityIndex,
    before: HashMap<ir::InstructionId, BitSet>,
}

impl FaintVariables {
    fn is_faint(&self, state: &BitSet, id: ir::InstructionId) -> bool {
        self.entities
            .instruction_index(id)
            .map(|position| state.contains(position))
            .unwrap_or(false)
    }

    fn mark_needed(&self, state: &mut BitSet, operand: &ir::Operand) {
        if let Some(position) = self.entities.operand_index(operand) {
            state.remove(position);
        }
    }
}

impl DataflowAnalysis for FaintVariables {
    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn top(&self) -> BitSet {
        self.entities.full_set()
    }

    fn boundary_condition(&self, state: &mut BitSet) {
        *state = self.entities.full_set();
    }

    fn meet(&self, accumulator: &mut BitSet, operand: &BitSet) {
        accumulator.intersect_with(operand);
    }

    fn initial_interior_point(&self, _block: &ir::Block) -> BitSet {
        self.entities.full_set()
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
            match instruction.operation() {
                ir::Operation::Store { address, value } => {
                    match function.local_allocation(address) {
                        // The stored value matters only if the slot does.
                        Some(slot) => {
                            if !self.is_faint(&state, slot) {
                                self.mark_needed(&mut state, value);
                            }
                        }
                        None => {
                            self.mark_needed(&mut state, value);
                            self.mark_needed(&mut state, address);
                        }
                    }
                }
                operation => {
                    let needed = operation.is_call()
                        || operation.is_terminator()
                        || !self.is_faint(&state, instruction.id());
                    if needed {
                        for operand in operation.operands() {
                            self.mark_needed(&mut state, operand);
                        }
                    }
                    if operation.is_call() {
                        if let Some(position) = self.entities.instruction_index(instruction.id())
                        {
                            state.remove(position);
                        }
                    }
                }
            }

            self.before.insert(instruction.id(), state.clone());
        }

        Ok(state)
    }
}
