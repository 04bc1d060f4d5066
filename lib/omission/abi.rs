//! The runtime tracking ABI.
//!
//! These names form the function-call contract between the upstream
//! instrumentation pass, the profiling runtime, and this pass. The
//! rewriter only ever deletes calls to the trackers and inserts calls to
//! `REPORT_BLOCK` and `ADD_OMISSION_DEPS`.

/// Records a memory read at runtime. Inserted upstream, deleted here.
pub const READ_TRACKER: &str = "read_tracker";

/// Records a memory write at runtime. Inserted upstream, deleted here.
pub const WRITE_TRACKER: &str = "write_tracker";

/// Tells the runtime to materialize one pre-computed dependence set.
/// Takes the omission-table index of the set as its only argument.
pub const REPORT_BLOCK: &str = "report_block";

/// Hands the full serialized omission table to the runtime. Takes the
/// encoded table string as its only argument.
pub const ADD_OMISSION_DEPS: &str = "add_omission_deps";

/// The pre-existing runtime teardown call. Its location in the entry
/// function anchors the insertion of `ADD_OMISSION_DEPS`.
pub const FINALIZE: &str = "finalize";

/// The program's entry function, where `FINALIZE` lives.
pub const ENTRY_FUNCTION: &str = "main";

/// The conventional name of a function's return-value slot. It cannot be
/// observed outside its function and is always omittable.
pub const RETURN_SLOT: &str = "retval";

/// True when `name` is one of the memory trackers.
pub fn is_tracker(name: &str) -> bool {
    name == READ_TRACKER || name == WRITE_TRACKER
}
