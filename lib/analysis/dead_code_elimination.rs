//! Dead-Code Elimination

use crate::analysis::{def_use, faint_variables, DataflowResult};
use crate::config::Config;
use crate::error::*;
use crate::ir;
use std::collections::{HashMap, HashSet};

/// Run faint variable analysis over `function` and remove what it finds.
/// Returns true if any instruction was removed.
pub fn dead_code_elimination(function: &mut ir::Function) -> Result<bool> {
    dead_code_elimination_with(function, &Config::default())
}

pub fn dead_code_elimination_with(function: &mut ir::Function, config: &Config) -> Result<bool> {
    let faint = faint_variables::faint_variables_with(function, config)?;
    eliminate(function, &faint)
}

/// Remove the instructions `faint` shows are not needed: side-effect free
/// definitions whose value is faint, and stores to faint stack slots.
///
/// The state at the entry of the function decides faintness for the whole
/// function. `faint` must have been computed over `function` as it is now.
pub fn eliminate(function: &mut ir::Function, faint: &DataflowResult) -> Result<bool> {
    let entry = function.entry().ok_or(ErrorKind::NoEntry)?;
    let oracle = faint
        .in_state(entry)
        .ok_or("Faint result has no state for the entry block")?;
    let entities = faint.entities();

    let is_faint = |id: ir::InstructionId| {
        entities
            .instruction_index(id)
            .map(|position| oracle.contains(position))
            .unwrap_or(false)
    };

    // Every removable instruction with a faint value
    let mut kill: HashSet<ir::InstructionId> = HashSet::new();
    // Stores into each stack slot, which live and die with the slot
    let mut stores: HashMap<ir::InstructionId, Vec<ir::InstructionId>> = HashMap::new();
    for instruction in function.instructions() {
        let dead = match instruction.operation() {
            ir::Operation::Store { address, .. } => match function.local_allocation(address) {
                Some(slot) => {
                    stores
                        .entry(slot)
                        .or_insert_with(Vec::new)
                        .push(instruction.id());
                    is_faint(slot)
                }
                None => false,
            },
            _ => instruction.is_eliminable_definition() && is_faint(instruction.id()),
        };
        if dead {
            kill.insert(instruction.id());
        }
    }

    // Entry faintness is coarser than the state at each instruction, so a
    // value may be faint at entry but still read by something we keep. Keep
    // those too, until nothing we keep reads something we kill.
    let du = def_use(function);
    loop {
        let revived: Vec<ir::InstructionId> = kill
            .iter()
            .filter(|id| {
                du.get(*id)
                    .map(|users| users.iter().any(|user| !kill.contains(user)))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if revived.is_empty() {
            break;
        }
        for id in revived {
            warn!(
                "{}: keeping {}, read by a retained instruction",
                function.name(),
                id
            );
            kill.remove(&id);
            for store in stores.get(&id).into_iter().flatten() {
                kill.remove(store);
            }
        }
    }

    if kill.is_empty() {
        return Ok(false);
    }

    let removed = function.remove_instructions(&kill)?;
    for instruction in &removed {
        trace!("{}: removed {}", function.name(), instruction);
    }
    debug!(
        "{}: eliminated {} instructions",
        function.name(),
        removed.len()
    );

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    fn spill() -> (Function, InstructionId, InstructionId) {
        let mut function = Function::new("spill");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let slot = function.append(entry, alloca(32)).unwrap();
        let x = function
            .append(entry, add(a.clone(), constant(1, 32), 32))
            .unwrap();
        function
            .append(entry, store(instruction(slot), instruction(x)))
            .unwrap();
        let r = function.append(entry, return_(Some(a))).unwrap();
        (function, x, r)
    }

    #[test]
    fn stores_to_unread_slots_are_removed() {
        crate::init_test_logging();
        let (mut function, x, r) = spill();

        assert!(dead_code_elimination(&mut function).unwrap());
        assert_eq!(function.num_instructions(), 1);
        assert!(!function.contains(x));
        assert!(function.contains(r));

        assert!(!dead_code_elimination(&mut function).unwrap());
        assert_eq!(function.num_instructions(), 1);
    }

    #[test]
    fn calls_are_retained() {
        let mut function = Function::new("effects");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let x = function.append(entry, mul(a.clone(), a, 32)).unwrap();
        let r = function
            .append(entry, call("rand", vec![instruction(x)], Type::Integer(32)))
            .unwrap();
        let dead = function
            .append(entry, add(instruction(r), constant(1, 32), 32))
            .unwrap();
        function.append(entry, return_(None)).unwrap();

        assert!(dead_code_elimination(&mut function).unwrap());
        assert!(function.contains(x));
        assert!(function.contains(r));
        assert!(!function.contains(dead));
    }

    #[test]
    fn stale_results_cannot_remove_read_values() {
        let (mut function, x, _) = spill();
        let faint = faint_variables::faint_variables(&function).unwrap();

        // Make `x` needed after the analysis ran.
        let entry = function.entry().unwrap();
        let r = function.block(entry).unwrap().last().unwrap();
        function.remove_instruction(r).unwrap();
        function
            .append(entry, call("sink", vec![instruction(x)], Type::Void))
            .unwrap();
        function.append(entry, return_(None)).unwrap();

        // The new call is not in the universe. `x` is kept by the re-check
        // instead of being left dangling, the slot and its store still go.
        assert!(eliminate(&mut function, &faint).unwrap());
        assert!(function.contains(x));
        assert_eq!(function.num_instructions(), 3);
    }

    #[test]
    fn kept_slots_keep_their_stores() {
        let mut function = Function::new("orphan");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let orphan = function.new_block("orphan").unwrap();
        let slot = function.append(entry, alloca(32)).unwrap();
        let write = function.append(entry, store(instruction(slot), a)).unwrap();
        function.append(entry, return_(None)).unwrap();
        // Never reached from the entry, so the engine never visits it.
        let read = function.append(orphan, load(instruction(slot), 32)).unwrap();
        function
            .append(orphan, return_(Some(instruction(read))))
            .unwrap();

        assert!(!dead_code_elimination(&mut function).unwrap());
        assert!(function.contains(slot));
        assert!(function.contains(write));
        assert!(function.contains(read));
    }
}
