use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `Instruction` gives location and debug metadata to an `Operation`
/// within a `Block`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instruction {
    operation: Operation,
    index: usize,
    location: Option<SourceLocation>,
}

impl Instruction {
    pub(crate) fn new(index: usize, operation: Operation) -> Instruction {
        Instruction {
            operation,
            index,
            location: None,
        }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn operation_mut(&mut self) -> &mut Operation {
        &mut self.operation
    }

    /// The block-unique index of this instruction.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The source location from debug metadata, when one exists.
    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    pub fn set_location(&mut self, location: Option<SourceLocation>) {
        self.location = location;
    }

    /// The source line, or 0 when no location is known.
    pub fn line(&self) -> u32 {
        self.location.map(|l| l.line()).unwrap_or(0)
    }

    pub fn is_read(&self) -> bool {
        self.operation.is_read()
    }

    pub fn is_write(&self) -> bool {
        self.operation.is_write()
    }

    pub fn is_memory_access(&self) -> bool {
        self.operation.is_memory_access()
    }

    /// The address operand of a read or write.
    pub fn address(&self) -> Option<ValueId> {
        self.operation.address()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{:02X} {} [{}]", self.index, self.operation, location),
            None => write!(f, "{:02X} {}", self.index, self.operation),
        }
    }
}
