use crate::analysis::fixed_point::{self, DataflowAnalysis, Direction};
use crate::analysis::{BitSet, DataflowResult, EntityIndex};
use crate::config::Config;
use crate::error::*;
use crate::ir;
use std::collections::HashMap;

/// Compute reaching definitions for the given function.
pub fn reaching_definitions(function: &ir::Function) -> Result<DataflowResult> {
    reaching_definitions_with(function, &Config::default())
}

pub fn reaching_definitions_with(
    function: &ir::Function,
    config: &Config,
) -> Result<DataflowResult> {
    let mut reaching_definitions = ReachingDefinitions {
        entities: EntityIndex::new(function, false, ir::Instruction::is_definition),
        before: HashMap::new(),
    };

    let block_states = fixed_point::fixed_point(&mut reaching_definitions, function, config)?;

    Ok(DataflowResult::new(
        reaching_definitions.entities,
        block_states,
        reaching_definitions.before,
    ))
}

// We require a struct to implement methods for our analysis over.
struct ReachingDefinitions {
    entities: EntityIndex,
    // Definitions reaching the point just before each instruction.
    before: HashMap<ir::InstructionId, BitSet>,
}

impl DataflowAnalysis for ReachingDefinitions {
    fn direction(&self) -> Direction {
        Direction::Forward
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

        for instruction in function.block_instructions(block.index())? {
            self.before.insert(instruction.id(), state.clone());
            if let Some(position) = self.entities.instruction_index(instruction.id()) {
                state.insert(position);
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Entity;
    use crate::ir::*;

    #[test]
    fn definitions_accumulate_in_program_order() {
        crate::init_test_logging();
        let mut function = Function::new("straight");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let x = function
            .append(entry, add(a.clone(), constant(1, 32), 32))
            .unwrap();
        let s = function
            .append(entry, call("print", vec![instruction(x)], Type::Void))
            .unwrap();
        let y = function.append(entry, sub(instruction(x), a, 32)).unwrap();
        let r = function
            .append(entry, return_(Some(instruction(y))))
            .unwrap();

        let rd = reaching_definitions(&function).unwrap();
        let entities = rd.entities();

        // Arguments and void calls are not definitions.
        assert_eq!(
            entities.entities(),
            &[Entity::Instruction(x), Entity::Instruction(y)]
        );

        assert!(rd.instruction_state(x).unwrap().is_empty());
        assert_eq!(
            entities.entities_in(rd.instruction_state(s).unwrap()),
            vec![Entity::Instruction(x)]
        );
        assert_eq!(
            entities.entities_in(rd.instruction_state(y).unwrap()),
            vec![Entity::Instruction(x)]
        );
        assert_eq!(
            entities.entities_in(rd.instruction_state(r).unwrap()),
            vec![Entity::Instruction(x), Entity::Instruction(y)]
        );
        assert_eq!(rd.out_state(entry), rd.instruction_state(r));
        assert!(rd.in_state(entry).unwrap().is_empty());
    }

    #[test]
    fn definitions_flow_around_loops() {
        let mut function = Function::new("loop");
        let n = function.add_argument("n", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let header = function.new_block("header").unwrap();
        let body = function.new_block("body").unwrap();
        let exit = function.new_block("exit").unwrap();

        let zero = function
            .append(entry, add(constant(0, 32), constant(0, 32), 32))
            .unwrap();
        function.append(entry, branch(header)).unwrap();
        let i = function
            .append(header, phi(vec![(entry, instruction(zero))], 32))
            .unwrap();
        let c = function
            .append(header, compare(CompareOp::Ltu, instruction(i), n))
            .unwrap();
        function
            .append(header, conditional_branch(instruction(c), body, exit))
            .unwrap();
        let next = function
            .append(body, add(instruction(i), constant(1, 32), 32))
            .unwrap();
        function.append(body, branch(header)).unwrap();
        function.add_phi_incoming(i, body, instruction(next)).unwrap();
        function
            .append(exit, return_(Some(instruction(i))))
            .unwrap();

        let rd = reaching_definitions(&function).unwrap();
        let header_in = rd.in_state(header).unwrap();
        assert!(rd.contains(header_in, &Entity::Instruction(zero)));
        assert!(rd.contains(header_in, &Entity::Instruction(next)));
        // Definitions are never killed, so the header's own phi reaches
        // back around the loop.
        assert!(rd.contains(header_in, &Entity::Instruction(i)));

        let exit_in = rd.in_state(exit).unwrap();
        for id in &[zero, i, c, next] {
            assert!(rd.contains(exit_in, &Entity::Instruction(*id)));
        }

        let blocks = function.blocks().len();
        let universe = rd.entities().len();
        assert!(rd.block_states().commits() <= blocks * (universe + 1));
    }
}
