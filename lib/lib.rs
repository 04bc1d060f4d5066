//! Shrike is a static omission analysis for dynamic data-dependence
//! profiling instrumentation.
//!
//! An upstream instrumentation pass inserts a tracking call before every
//! memory read and write so that a runtime library can record data
//! dependences. Shrike proves, per function, which of those recorded
//! operations are either strictly local and never truly written, or carry
//! only dependences whose order is fixed by dominance. Tracking calls for
//! proven operations are deleted, and statically-ordered dependences are
//! emitted once as a compact table instead of being recorded on every
//! execution.
//!
//! The crate is split into four parts:
//!
//! * [`il`] - a minimal intermediate representation of the instrumented
//!   program.
//! * [`graph`] - a directed graph with dominator computation, used for both
//!   the instruction-level control-flow graph and the dependence graph.
//! * [`analysis`] - locality classification, instruction CFG and dependence
//!   graph construction, and the dominance predictability proof.
//! * [`omission`] - the pass driver, the module-wide omission table, and the
//!   instrumentation rewriter.

pub mod analysis;
mod error;
pub mod graph;
pub mod il;
pub mod loader;
pub mod omission;
#[cfg(test)]
mod tests;

pub use crate::error::Error;
