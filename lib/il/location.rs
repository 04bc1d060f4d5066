use serde::{Deserialize, Serialize};
use std::fmt;

/// A source location carried by an instruction's debug metadata.
///
/// Compiler-inserted instructions carry no `SourceLocation`. The write
/// collector relies on that distinction to separate user writes from
/// initializers; the precision of the split is inherited from upstream
/// debug-info generation and is not verified here.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct SourceLocation {
    line: u32,
    column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> SourceLocation {
        SourceLocation { line, column }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// A stable handle to one instruction within a function.
///
/// The instruction index is block-unique and survives the removal of other
/// instructions, so handles collected during analysis stay valid while the
/// rewriter mutates the block.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct InstructionRef {
    block_index: usize,
    instruction_index: usize,
}

impl InstructionRef {
    pub fn new(block_index: usize, instruction_index: usize) -> InstructionRef {
        InstructionRef {
            block_index,
            instruction_index,
        }
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    pub fn instruction_index(&self) -> usize {
        self.instruction_index
    }
}

impl fmt::Display for InstructionRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:X}:{:02X}", self.block_index, self.instruction_index)
    }
}
