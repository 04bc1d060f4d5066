//! Dominance-based dependence predictability.
//!
//! A dependence edge is predictable when its two endpoints are distinct
//! operations and the depended-on operation dominates the dependent one:
//! every execution reaching the dependent operation has already executed
//! the other endpoint, so their relative order never varies at runtime.
//!
//! The proof is all-or-nothing per operation: one unpredictable edge
//! abandons the operation entirely, and none of its edges contribute
//! descriptors anywhere.

use crate::analysis::{DependenceGraph, InstructionCfg, Locality};
use crate::il;
use crate::Error;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Operations proven predictable, and the per-block descriptor sets of
/// their dependences.
#[derive(Clone, Debug, Default)]
pub struct PredictabilityResult {
    omittable: Vec<il::InstructionRef>,
    block_dependences: BTreeMap<usize, BTreeSet<String>>,
}

impl PredictabilityResult {
    /// Operations whose every dependence is statically ordered.
    pub fn omittable(&self) -> &[il::InstructionRef] {
        &self.omittable
    }

    /// Proven dependence descriptors keyed by basic-block index, in
    /// block-index order. Re-proving a block widens its set.
    pub fn block_dependences(&self) -> &BTreeMap<usize, BTreeSet<String>> {
        &self.block_dependences
    }
}

/// Prove which local operations carry only statically-ordered dependences.
pub fn analyze_predictability(
    function: &il::Function,
    cfg: &InstructionCfg,
    dg: &DependenceGraph,
    locality: &Locality,
) -> Result<PredictabilityResult, Error> {
    let dominators = cfg.graph().compute_dominators(cfg.entry())?;
    // Unreachable vertices have no dominator set and never dominate.
    let dominates = |a: usize, b: usize| {
        dominators
            .get(&b)
            .map(|doms| doms.contains(&a))
            .unwrap_or(false)
    };

    let mut result = PredictabilityResult::default();

    for node in dg.nodes() {
        let access = match node.access() {
            Some(access) => access,
            None => continue,
        };

        let out_edges = dg.graph().edges_out(node.index())?;
        let in_edges = dg.graph().edges_in(node.index())?;

        // Every outgoing edge: the depended-on operation must dominate
        // this one. Every incoming edge: this operation must dominate the
        // dependent one. Edges ending in artifact nodes are skipped.
        let predictable = out_edges.iter().all(|edge| {
            match dg.graph().vertex(edge.tail()).ok().and_then(|n| n.access()) {
                Some(_) => edge.tail() != node.index() && dominates(edge.tail(), node.index()),
                None => true,
            }
        }) && in_edges.iter().all(|edge| {
            match dg.graph().vertex(edge.head()).ok().and_then(|n| n.access()) {
                Some(_) => edge.head() != node.index() && dominates(node.index(), edge.head()),
                None => true,
            }
        });
        if !predictable {
            continue;
        }

        let mut descriptors = BTreeSet::new();
        for edge in out_edges.into_iter().chain(in_edges.into_iter()) {
            descriptors.insert(dg.descriptor(edge)?);
        }

        // A predictable operation with no dependences at all is left to
        // the baseline classification.
        if descriptors.is_empty() {
            continue;
        }
        if !locality.is_local(access.address()) {
            continue;
        }

        debug!(
            "{}: {} at {} is predictable",
            function.name(),
            access.variable(),
            access.place()
        );

        result.omittable.push(access.place());
        result
            .block_dependences
            .entry(access.place().block_index())
            .or_default()
            .extend(descriptors);
    }

    Ok(result)
}
