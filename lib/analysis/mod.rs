//! Static analyses over the shrike IR.
//!
//! The cheap analyses ([`Locality`]) always run. The expensive ones
//! ([`InstructionCfg`], [`DependenceGraph`], [`analyze_predictability`]) are
//! only constructed when deep predictability analysis is requested.

mod dependence_graph;
mod instruction_cfg;
mod locality;
mod predictability;

pub use self::dependence_graph::{DependenceEdge, DependenceGraph, DependenceKind};
pub use self::instruction_cfg::{Access, AccessKind, InstructionCfg, OpNode, ENTRY_INDEX, EXIT_INDEX};
pub use self::locality::Locality;
pub use self::predictability::{analyze_predictability, PredictabilityResult};
