//! Bidirectional mapping between tracked values and bit positions.

use crate::analysis::BitSet;
use crate::ir;
use std::collections::HashMap;
use std::fmt;

/// A value an analysis tracks: a function argument or the result of an
/// instruction.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Entity {
    Argument(usize),
    Instruction(ir::InstructionId),
}

impl Entity {
    /// The entity an operand reads, if it reads one.
    pub fn from_operand(operand: &ir::Operand) -> Option<Entity> {
        match operand {
            ir::Operand::Constant(_) => None,
            ir::Operand::Instruction(id) => Some(Entity::Instruction(*id)),
            ir::Operand::Argument(position) => Some(Entity::Argument(*position)),
        }
    }

    pub fn instruction(&self) -> Option<ir::InstructionId> {
        match self {
            Entity::Instruction(id) => Some(*id),
            Entity::Argument(_) => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Entity::Argument(position) => write!(f, "%arg{}", position),
            Entity::Instruction(id) => write!(f, "{}", id),
        }
    }
}

/// The universe of an analysis run, built once per function.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntityIndex {
    positions: HashMap<Entity, usize>,
    entities: Vec<Entity>,
}

impl EntityIndex {
    /// Build the universe for `function`: arguments first in declaration
    /// order when `include_arguments` is set, then every instruction
    /// accepted by `tracked`, blocks in layout order.
    pub fn new<P>(function: &ir::Function, include_arguments: bool, tracked: P) -> EntityIndex
    where
        P: Fn(&ir::Instruction) -> bool,
    {
        let mut index = EntityIndex::default();

        if include_arguments {
            for argument in function.arguments() {
                index.insert(Entity::Argument(argument.position()));
            }
        }

        for instruction in function.instructions() {
            if tracked(instruction) {
                index.insert(Entity::Instruction(instruction.id()));
            }
        }

        index
    }

    /// Add an entity to the universe, returning its position. An entity is
    /// only ever given one position.
    pub fn insert(&mut self, entity: Entity) -> usize {
        if let Some(position) = self.positions.get(&entity) {
            return *position;
        }
        let position = self.entities.len();
        self.positions.insert(entity, position);
        self.entities.push(entity);
        position
    }

    pub fn index(&self, entity: &Entity) -> Option<usize> {
        self.positions.get(entity).cloned()
    }

    pub fn instruction_index(&self, id: ir::InstructionId) -> Option<usize> {
        self.index(&Entity::Instruction(id))
    }

    pub fn argument_index(&self, position: usize) -> Option<usize> {
        self.index(&Entity::Argument(position))
    }

    /// Position of the entity an operand reads, if that entity is tracked.
    pub fn operand_index(&self, operand: &ir::Operand) -> Option<usize> {
        Entity::from_operand(operand).and_then(|entity| self.index(&entity))
    }

    pub fn entity(&self, position: usize) -> Option<&Entity> {
        self.entities.get(position)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The entities whose bits are set in `set`.
    pub fn entities_in(&self, set: &BitSet) -> Vec<Entity> {
        set.iter()
            .filter_map(|position| self.entity(position).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn empty_set(&self) -> BitSet {
        BitSet::new_empty(self.len())
    }

    pub fn full_set(&self) -> BitSet {
        BitSet::new_full(self.len())
    }
}
