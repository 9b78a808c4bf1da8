//! Definition Use Analysis

use crate::ir;
use std::collections::HashMap;

/// Compute definition use chains for the given function. Every instruction
/// is a key; its value lists the other instructions reading its result, in
/// program order.
pub fn def_use(function: &ir::Function) -> HashMap<ir::InstructionId, Vec<ir::InstructionId>> {
    let mut du: HashMap<ir::InstructionId, Vec<ir::InstructionId>> = HashMap::new();

    for instruction in function.instructions() {
        du.entry(instruction.id()).or_insert_with(Vec::new);
        for read in instruction.operation().instructions_read() {
            if read == instruction.id() {
                continue;
            }
            let users = du.entry(read).or_insert_with(Vec::new);
            if !users.contains(&instruction.id()) {
                users.push(instruction.id());
            }
        }
    }

    du
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    #[test]
    fn users_in_program_order() {
        let mut function = Function::new("f");
        let a = function.add_argument("a", Type::Integer(32));
        let entry = function.new_block("entry").unwrap();
        let x = function.append(entry, add(a, constant(1, 32), 32)).unwrap();
        let y = function
            .append(entry, mul(instruction(x), instruction(x), 32))
            .unwrap();
        let r = function
            .append(entry, return_(Some(instruction(y))))
            .unwrap();

        let du = def_use(&function);
        assert_eq!(du[&x], vec![y]);
        assert_eq!(du[&y], vec![r]);
        assert!(du[&r].is_empty());
    }
}
