//! The instruction-level data-dependence graph.
//!
//! Vertices mirror the instruction CFG. An edge from operation `a` to
//! operation `b` records that `a` depends on `b`: `b` is a nearest
//! conflicting access to the same address on some control-flow path
//! reaching `a`. The graph may contain cycles around loop back-edges, and
//! an operation inside a loop body may even depend on itself.

use crate::analysis::InstructionCfg;
use crate::graph::{self, Graph};
use crate::il;
use crate::Error;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::instruction_cfg::OpNode;

/// The kind of a data dependence.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum DependenceKind {
    ReadAfterWrite,
    WriteAfterRead,
    WriteAfterWrite,
}

impl fmt::Display for DependenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DependenceKind::ReadAfterWrite => write!(f, "RAW"),
            DependenceKind::WriteAfterRead => write!(f, "WAR"),
            DependenceKind::WriteAfterWrite => write!(f, "WAW"),
        }
    }
}

/// A directed dependence edge: the head operation depends on the tail
/// operation.
#[derive(Clone, Debug)]
pub struct DependenceEdge {
    head: usize,
    tail: usize,
    kind: DependenceKind,
}

impl DependenceEdge {
    fn new(head: usize, tail: usize, kind: DependenceKind) -> DependenceEdge {
        DependenceEdge { head, tail, kind }
    }

    pub fn kind(&self) -> DependenceKind {
        self.kind
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }
}

impl graph::Edge for DependenceEdge {
    fn head(&self) -> usize {
        self.head
    }
    fn tail(&self) -> usize {
        self.tail
    }
    fn dot_label(&self) -> String {
        format!("{}", self.kind)
    }
    fn dot_style(&self) -> String {
        "dashed".to_string()
    }
}

/// The data-dependence graph of one function.
#[derive(Clone, Debug)]
pub struct DependenceGraph {
    graph: Graph<OpNode, DependenceEdge>,
    file_id: u32,
}

impl DependenceGraph {
    /// Build the dependence graph from a function's instruction CFG.
    pub fn new(function: &il::Function, cfg: &InstructionCfg) -> Result<DependenceGraph, Error> {
        let mut graph = Graph::new();
        for node in cfg.graph().vertices() {
            graph.insert_vertex(node.clone())?;
        }

        for node in cfg.graph().vertices() {
            let access = match node.access() {
                Some(access) => access,
                None => continue,
            };

            // Backward walk over the CFG from this operation, collecting
            // the nearest conflicting accesses. A write to the same
            // address kills the path behind it.
            let mut stack = cfg.graph().predecessor_indices(node.index())?;
            let mut visited: FxHashSet<usize> = stack.iter().cloned().collect();
            while let Some(candidate_index) = stack.pop() {
                let candidate = cfg.graph().vertex(candidate_index)?;
                let mut killed = false;
                if let Some(candidate_access) = candidate.access() {
                    if candidate_access.address() == access.address()
                        && (access.is_write() || candidate_access.is_write())
                    {
                        let kind = if access.is_write() {
                            if candidate_access.is_write() {
                                DependenceKind::WriteAfterWrite
                            } else {
                                DependenceKind::WriteAfterRead
                            }
                        } else {
                            DependenceKind::ReadAfterWrite
                        };
                        if !graph.has_edge(node.index(), candidate_index) {
                            graph.insert_edge(DependenceEdge::new(
                                node.index(),
                                candidate_index,
                                kind,
                            ))?;
                        }
                        killed = candidate_access.is_write();
                    }
                }
                if !killed {
                    for predecessor in cfg.graph().predecessor_indices(candidate_index)? {
                        if visited.insert(predecessor) {
                            stack.push(predecessor);
                        }
                    }
                }
            }
        }

        Ok(DependenceGraph {
            graph,
            file_id: function.file_id(),
        })
    }

    pub fn graph(&self) -> &Graph<OpNode, DependenceEdge> {
        &self.graph
    }

    pub fn nodes(&self) -> Vec<&OpNode> {
        self.graph.vertices()
    }

    /// Render a dependence edge as its descriptor:
    /// `fid:line KIND fid:line|variable`.
    ///
    /// Descriptors must not contain the table delimiters `/` and `,`, so
    /// variable names carrying either are not representable.
    pub fn descriptor(&self, edge: &DependenceEdge) -> Result<String, Error> {
        let source = self
            .graph
            .vertex(edge.head())?
            .access()
            .ok_or_else(|| Error::from("dependence edge head is an artifact node"))?;
        let destination = self
            .graph
            .vertex(edge.tail())?
            .access()
            .ok_or_else(|| Error::from("dependence edge tail is an artifact node"))?;
        Ok(format!(
            "{}:{} {} {}:{}|{}",
            self.file_id,
            source.line(),
            edge.kind(),
            self.file_id,
            destination.line(),
            destination.variable()
        ))
    }
}
