//! The shrike intermediate representation of an instrumented program.
//!
//! The IR is deliberately small: it models exactly what the omission
//! analysis needs to see of a previously-instrumented program.
//!
//! ## `Value`
//!
//! Address-valued entities are arena-allocated per function and referenced
//! by [`ValueId`]. Two operations touch the same memory exactly when their
//! address operands carry the same `ValueId`; identity is by id, never by
//! name.
//!
//! ## `Operation`
//!
//! A closed tagged variant over the operation kinds the analysis
//! distinguishes:
//!
//! * `Read` - a memory read through an address value.
//! * `Write` - a memory write through an address value. The written source
//!   is an [`Operand`], since the analysis must notice when an address value
//!   itself is persisted (pointer escape).
//! * `Call` - a call to a named function with `Operand` arguments. The
//!   callee is a name, not an operand, so every argument is an escape
//!   candidate.
//! * `Bind` - a debug-metadata binding of a source variable to an address.
//!   Bindings seed the local-address set.
//! * `Return` - function return, the block terminator when present.
//! * `Nop`
//!
//! ## `Instruction`, `Block`, `ControlFlowGraph`, `Function`, `Program`
//!
//! An `Instruction` gives an `Operation` a block-unique index and an
//! optional [`SourceLocation`]. A `Block` is a basic block of instructions,
//! a vertex in the block-level `ControlFlowGraph`. A `Function` owns its
//! value arena and its CFG; a `Program` is an ordered collection of
//! functions, processed strictly in index order.

mod block;
mod control_flow_graph;
mod edge;
mod function;
mod instruction;
mod location;
mod operation;
mod program;
mod value;

pub use self::block::*;
pub use self::control_flow_graph::*;
pub use self::edge::*;
pub use self::function::*;
pub use self::instruction::*;
pub use self::location::*;
pub use self::operation::*;
pub use self::program::*;
pub use self::value::*;
