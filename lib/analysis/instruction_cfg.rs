//! The instruction-level control-flow graph.
//!
//! Vertices are the function's memory operations plus two artifact
//! vertices, entry and exit. Edges are the control-flow successor relation
//! between memory operations: consecutive operations within a block, and
//! block-boundary edges that skip transitively through blocks containing
//! no memory operations.

use crate::graph::{self, Graph, NullEdge};
use crate::il;
use crate::Error;
use rustc_hash::{FxHashMap, FxHashSet};

/// The vertex index of the artifact entry node.
pub const ENTRY_INDEX: usize = 0;
/// The vertex index of the artifact exit node.
pub const EXIT_INDEX: usize = 1;

/// Whether a memory operation reads or writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One memory operation as seen by the dependence model.
#[derive(Clone, Debug)]
pub struct Access {
    kind: AccessKind,
    address: il::ValueId,
    place: il::InstructionRef,
    line: u32,
    variable: String,
}

impl Access {
    pub fn kind(&self) -> AccessKind {
        self.kind
    }

    pub fn address(&self) -> il::ValueId {
        self.address
    }

    /// Where this operation lives in the function.
    pub fn place(&self) -> il::InstructionRef {
        self.place
    }

    /// The source line of the operation, or 0 when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The source-level name of the addressed variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn is_write(&self) -> bool {
        self.kind == AccessKind::Write
    }
}

/// A vertex of the instruction CFG and the dependence graph. Artifact
/// vertices (entry, exit) carry no access.
#[derive(Clone, Debug)]
pub struct OpNode {
    index: usize,
    access: Option<Access>,
}

impl OpNode {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn access(&self) -> Option<&Access> {
        self.access.as_ref()
    }

    pub fn is_artifact(&self) -> bool {
        self.access.is_none()
    }
}

impl graph::Vertex for OpNode {
    fn index(&self) -> usize {
        self.index
    }

    fn dot_label(&self) -> String {
        match self.access {
            Some(ref access) => format!(
                "{} {} | {}",
                match access.kind() {
                    AccessKind::Read => "Read",
                    AccessKind::Write => "Write",
                },
                access.variable(),
                access.line()
            ),
            None => {
                if self.index == ENTRY_INDEX {
                    "entry".to_string()
                } else {
                    "exit".to_string()
                }
            }
        }
    }

    fn dot_fill_color(&self) -> String {
        match self.access {
            Some(_) => "#ffddcc".to_string(),
            None => "#dddddd".to_string(),
        }
    }
}

/// The instruction-level CFG of one function.
#[derive(Clone, Debug)]
pub struct InstructionCfg {
    graph: Graph<OpNode, NullEdge>,
    entry: usize,
    exit: usize,
}

impl InstructionCfg {
    /// Build the instruction CFG for a function.
    pub fn new(function: &il::Function) -> Result<InstructionCfg, Error> {
        let mut graph = Graph::new();
        graph.insert_vertex(OpNode {
            index: ENTRY_INDEX,
            access: None,
        })?;
        graph.insert_vertex(OpNode {
            index: EXIT_INDEX,
            access: None,
        })?;

        // One vertex per memory operation, chained in program order within
        // each block.
        let mut next_index = EXIT_INDEX + 1;
        let mut block_nodes: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for block in function.blocks() {
            let mut nodes = Vec::new();
            for instruction in block.instructions() {
                let kind = match *instruction.operation() {
                    il::Operation::Read { .. } => AccessKind::Read,
                    il::Operation::Write { .. } => AccessKind::Write,
                    _ => continue,
                };
                let address = match instruction.address() {
                    Some(address) => address,
                    None => continue,
                };
                let access = Access {
                    kind,
                    address,
                    place: il::InstructionRef::new(block.index(), instruction.index()),
                    line: instruction.line(),
                    variable: function.value_name(address).to_string(),
                };
                graph.insert_vertex(OpNode {
                    index: next_index,
                    access: Some(access),
                })?;
                nodes.push(next_index);
                next_index += 1;
            }
            for pair in nodes.windows(2) {
                graph.insert_edge(NullEdge::new(pair[0], pair[1]))?;
            }
            block_nodes.insert(block.index(), nodes);
        }

        let cfg = function.control_flow_graph();
        let entry_block = cfg
            .entry()
            .ok_or_else(|| Error::FunctionEntry(function.name().to_string()))?;

        // Entry artifact to the first reachable memory operations.
        let entry_targets = match block_nodes.get(&entry_block) {
            Some(nodes) if !nodes.is_empty() => vec![nodes[0]],
            _ => successor_heads(cfg, &block_nodes, entry_block, &mut FxHashSet::default())?,
        };
        if entry_targets.is_empty() {
            graph.insert_edge(NullEdge::new(ENTRY_INDEX, EXIT_INDEX))?;
        }
        for target in entry_targets {
            insert_edge_once(&mut graph, ENTRY_INDEX, target)?;
        }

        // Block-boundary edges: last memory operation of a block to the
        // first memory operation of each reachable successor.
        for block in function.blocks() {
            let last = match block_nodes.get(&block.index()) {
                Some(nodes) if !nodes.is_empty() => *nodes.last().unwrap(),
                _ => continue,
            };
            let heads =
                successor_heads(cfg, &block_nodes, block.index(), &mut FxHashSet::default())?;
            if heads.is_empty() {
                insert_edge_once(&mut graph, last, EXIT_INDEX)?;
            }
            for head in heads {
                insert_edge_once(&mut graph, last, head)?;
            }
        }

        Ok(InstructionCfg {
            graph,
            entry: ENTRY_INDEX,
            exit: EXIT_INDEX,
        })
    }

    pub fn graph(&self) -> &Graph<OpNode, NullEdge> {
        &self.graph
    }

    pub fn entry(&self) -> usize {
        self.entry
    }

    pub fn exit(&self) -> usize {
        self.exit
    }

    pub fn nodes(&self) -> Vec<&OpNode> {
        self.graph.vertices()
    }
}

/// The first memory-operation vertices reachable from the successors of
/// `block_index`, skipping through blocks without memory operations.
fn successor_heads(
    cfg: &il::ControlFlowGraph,
    block_nodes: &FxHashMap<usize, Vec<usize>>,
    block_index: usize,
    visited: &mut FxHashSet<usize>,
) -> Result<Vec<usize>, Error> {
    let mut heads = Vec::new();
    for successor in cfg.successor_indices(block_index)? {
        if !visited.insert(successor) {
            continue;
        }
        match block_nodes.get(&successor) {
            Some(nodes) if !nodes.is_empty() => heads.push(nodes[0]),
            _ => heads.extend(successor_heads(cfg, block_nodes, successor, visited)?),
        }
    }
    Ok(heads)
}

fn insert_edge_once(
    graph: &mut Graph<OpNode, NullEdge>,
    head: usize,
    tail: usize,
) -> Result<(), Error> {
    if !graph.has_edge(head, tail) {
        graph.insert_edge(NullEdge::new(head, tail))?;
    }
    Ok(())
}
