//! A fixed-point engine for bit-vector data-flow analysis.
//!
//! The engine owns the per-block `IN`/`OUT` states and the worklist. An
//! analysis supplies the lattice (through `top`, `meet` and the boundary
//! condition) and the block transfer function.

use crate::analysis::BitSet;
use crate::config::{Config, NoExitBlock};
use crate::error::*;
use crate::ir;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The operations a concrete analysis supplies to the engine.
pub trait DataflowAnalysis {
    fn direction(&self) -> Direction;

    /// The identity of `meet`.
    fn top(&self) -> BitSet;

    /// Set the state imposed at the edge of the graph: `IN` of the entry
    /// block for forward analyses, `OUT` of every block without successors
    /// for backward analyses.
    fn boundary_condition(&self, state: &mut BitSet);

    /// `accumulator = accumulator meet operand`
    fn meet(&self, accumulator: &mut BitSet, operand: &BitSet);

    /// The far-side state of `block` before its first transfer.
    fn initial_interior_point(&self, block: &ir::Block) -> BitSet;

    /// Compute the far-side state of `block` from its near-side `state`
    /// (`OUT` from `IN` going forward, `IN` from `OUT` going backward).
    /// Per-instruction states are recorded here.
    fn transfer(
        &mut self,
        function: &ir::Function,
        block: &ir::Block,
        state: &BitSet,
    ) -> Result<BitSet>;

    /// Adjust the state flowing along the edge `head -> tail` before it is
    /// met with the states of the other edges.
    fn edge_transfer(
        &self,
        _function: &ir::Function,
        _head: usize,
        _tail: usize,
        _state: &mut BitSet,
    ) -> Result<()> {
        Ok(())
    }
}

/// Converged block states of one engine run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockStates {
    direction: Direction,
    in_states: HashMap<usize, BitSet>,
    out_states: HashMap<usize, BitSet>,
    commits: usize,
}

impl BlockStates {
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn in_state(&self, block_index: usize) -> Option<&BitSet> {
        self.in_states.get(&block_index)
    }
    pub fn out_state(&self, block_index: usize) -> Option<&BitSet> {
        self.out_states.get(&block_index)
    }
    pub fn in_states(&self) -> &HashMap<usize, BitSet> {
        &self.in_states
    }
    pub fn out_states(&self) -> &HashMap<usize, BitSet> {
        &self.out_states
    }
    /// How many times a block's far-side state changed before convergence.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

/// Blocks reachable from `entry`, in breadth-first order over successor
/// edges.
pub fn breadth_first(function: &ir::Function, entry: usize) -> Result<Vec<usize>> {
    let mut order = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    visited.insert(entry);
    queue.push_back(entry);

    while let Some(index) = queue.pop_front() {
        order.push(index);
        for successor in function.successors(index)? {
            if visited.insert(successor) {
                queue.push_back(successor);
            }
        }
    }

    Ok(order)
}

/// Run `analysis` over `function` to a fixed point.
pub fn fixed_point<A>(
    analysis: &mut A,
    function: &ir::Function,
    config: &Config,
) -> Result<BlockStates>
where
    A: DataflowAnalysis,
{
    let direction = analysis.direction();
    let entry = function.entry().ok_or(ErrorKind::NoEntry)?;

    let mut in_states: HashMap<usize, BitSet> = HashMap::new();
    let mut out_states: HashMap<usize, BitSet> = HashMap::new();

    for block in function.blocks() {
        let interior = analysis.initial_interior_point(block);
        match direction {
            Direction::Forward => {
                out_states.insert(block.index(), interior);
                in_states.insert(block.index(), analysis.top());
            }
            Direction::Backward => {
                in_states.insert(block.index(), interior);
                out_states.insert(block.index(), analysis.top());
            }
        }
    }

    if direction == Direction::Forward {
        let state = in_states
            .get_mut(&entry)
            .ok_or("Function's entry block is missing from its layout")?;
        analysis.boundary_condition(state);
    }

    let order = breadth_first(function, entry)?;

    if direction == Direction::Backward {
        let mut has_exit = false;
        for index in &order {
            if function.successors(*index)?.is_empty() {
                has_exit = true;
                break;
            }
        }
        if !has_exit {
            match config.no_exit_block {
                NoExitBlock::Reject => {
                    bail!(ErrorKind::NoExitBlock(function.name().to_string()))
                }
                NoExitBlock::Unconstrained => warn!(
                    "{} has no reachable exit block, running without a boundary condition",
                    function.name()
                ),
            }
        }
    }

    let mut worklist: VecDeque<usize> = match direction {
        Direction::Forward => order.into_iter().collect(),
        Direction::Backward => order.into_iter().rev().collect(),
    };
    let mut in_queue: HashSet<usize> = worklist.iter().cloned().collect();

    debug!(
        "{}: {:?} analysis over {} blocks, {} entities",
        function.name(),
        direction,
        function.blocks().len(),
        analysis.top().len()
    );

    let mut commits = 0;

    while let Some(index) = worklist.pop_front() {
        in_queue.remove(&index);
        let block = function.block(index)?;

        let (changed, neighbors) = match direction {
            Direction::Forward => {
                let predecessors = function.predecessors(index)?;
                let edges = predecessors.iter().map(|p| (*p, index));
                if let Some(state) =
                    meet_edges(analysis, function, edges, |(head, _)| head, &out_states)?
                {
                    in_states.insert(index, state);
                }
                // A block with no predecessors keeps its current IN, which
                // for the entry is the boundary condition.

                let near = in_states
                    .get(&index)
                    .ok_or("Block missing from IN states")?;
                let far = analysis.transfer(function, block, near)?;
                let changed = commit(analysis, config, &mut out_states, index, far)?;
                (changed, function.successors(index)?)
            }
            Direction::Backward => {
                let successors = function.successors(index)?;
                let edges = successors.iter().map(|s| (index, *s));
                match meet_edges(analysis, function, edges, |(_, tail)| tail, &in_states)? {
                    Some(state) => {
                        out_states.insert(index, state);
                    }
                    None => {
                        let state = out_states
                            .get_mut(&index)
                            .ok_or("Block missing from OUT states")?;
                        analysis.boundary_condition(state);
                    }
                }

                let near = out_states
                    .get(&index)
                    .ok_or("Block missing from OUT states")?;
                let far = analysis.transfer(function, block, near)?;
                let changed = commit(analysis, config, &mut in_states, index, far)?;
                (changed, function.predecessors(index)?)
            }
        };

        if changed {
            commits += 1;
            for neighbor in neighbors {
                if in_queue.insert(neighbor) {
                    worklist.push_back(neighbor);
                }
            }
        }
    }

    debug!(
        "{}: {:?} analysis converged after {} commits",
        function.name(),
        direction,
        commits
    );

    Ok(BlockStates {
        direction,
        in_states,
        out_states,
        commits,
    })
}

/// Meet the states flowing along `edges`. `neighbor` picks the block on the
/// far end of each edge, whose state is read from `states`. Returns `None`
/// when there are no edges.
fn meet_edges<A, I, N>(
    analysis: &A,
    function: &ir::Function,
    edges: I,
    neighbor: N,
    states: &HashMap<usize, BitSet>,
) -> Result<Option<BitSet>>
where
    A: DataflowAnalysis,
    I: Iterator<Item = (usize, usize)>,
    N: Fn((usize, usize)) -> usize,
{
    let mut accumulator: Option<BitSet> = None;

    for (head, tail) in edges {
        let mut contribution = states
            .get(&neighbor((head, tail)))
            .ok_or("Neighbor block has no state")?
            .clone();
        analysis.edge_transfer(function, head, tail, &mut contribution)?;
        accumulator = match accumulator {
            Some(mut accumulator) => {
                analysis.meet(&mut accumulator, &contribution);
                Some(accumulator)
            }
            None => Some(contribution),
        };
    }

    Ok(accumulator)
}

/// Store `state` for `index` if it differs from the current state. Returns
/// true if the state changed.
fn commit<A: DataflowAnalysis>(
    analysis: &A,
    config: &Config,
    states: &mut HashMap<usize, BitSet>,
    index: usize,
    state: BitSet,
) -> Result<bool> {
    let previous = states.get(&index).ok_or("Block has no state to update")?;
    if *previous == state {
        return Ok(false);
    }

    // Every commit must move down the meet order: meet(previous, new) == new.
    if config.check_monotonicity {
        let mut met = previous.clone();
        analysis.meet(&mut met, &state);
        if met != state {
            return Err(ErrorKind::NonMonotonic(index).into());
        }
    }

    trace!("block 0x{:x} <- {}", index, state);
    states.insert(index, state);
    Ok(true)
}
