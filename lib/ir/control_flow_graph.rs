use crate::error::*;
use crate::ir::*;
use falcon::graph::Graph;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ControlFlowGraph {
    graph: Graph<Block, Edge>,
    entry: Option<usize>,
    // Blocks in textual order. Block indices are never reused.
    layout: Vec<usize>,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph {
            graph: Graph::new(),
            entry: None,
            layout: Vec::new(),
        }
    }

    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    pub fn set_entry(&mut self, index: usize) -> Result<()> {
        self.block(index)?;
        self.entry = Some(index);
        Ok(())
    }

    /// Create a new, empty block and return its index. The first block
    /// created becomes the entry.
    pub fn new_block<S: Into<String>>(&mut self, label: S) -> Result<usize> {
        let index = self.layout.iter().max().map(|i| i + 1).unwrap_or(0);
        self.graph.insert_vertex(Block::new(index, label))?;
        self.layout.push(index);
        if self.entry.is_none() {
            self.entry = Some(index);
        }
        Ok(index)
    }

    pub fn block(&self, index: usize) -> Result<&Block> {
        self.graph
            .vertex(index)
            .map_err(|_| ErrorKind::InvalidBlock(index).into())
    }
    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block> {
        self.graph
            .vertex_mut(index)
            .map_err(|_| ErrorKind::InvalidBlock(index).into())
    }

    /// All blocks, in layout order.
    pub fn blocks(&self) -> Vec<&Block> {
        self.layout
            .iter()
            .filter_map(|index| self.graph.vertex(*index).ok())
            .collect()
    }

    /// Insert an edge, ignoring it if it already exists.
    pub fn insert_edge(&mut self, head: usize, tail: usize) -> Result<()> {
        self.block(head)?;
        self.block(tail)?;
        if self.graph.edge(head, tail).is_ok() {
            return Ok(());
        }
        self.graph.insert_edge(Edge::new(head, tail))?;
        Ok(())
    }

    pub fn edges_out(&self, block_index: usize) -> Result<&Vec<Edge>> {
        Ok(self.graph.edges_out(block_index)?)
    }

    pub fn edges_in(&self, block_index: usize) -> Result<&Vec<Edge>> {
        Ok(self.graph.edges_in(block_index)?)
    }

    pub fn successors(&self, block_index: usize) -> Result<Vec<usize>> {
        Ok(self
            .edges_out(block_index)?
            .iter()
            .map(|edge| edge.tail())
            .collect())
    }

    pub fn predecessors(&self, block_index: usize) -> Result<Vec<usize>> {
        Ok(self
            .edges_in(block_index)?
            .iter()
            .map(|edge| edge.head())
            .collect())
    }

    /// Blocks with no successors, in layout order.
    pub fn exit_blocks(&self) -> Result<Vec<usize>> {
        let mut exits = Vec::new();
        for index in &self.layout {
            if self.edges_out(*index)?.is_empty() {
                exits.push(*index);
            }
        }
        Ok(exits)
    }
}

impl Default for ControlFlowGraph {
    fn default() -> ControlFlowGraph {
        ControlFlowGraph::new()
    }
}
