use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant or value operand of a call or write.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operand {
    /// A reference to a value in the function's arena.
    Value(ValueId),
    /// An immediate integer constant.
    Integer(i64),
    /// An immediate string constant.
    Text(String),
}

impl Operand {
    /// The `ValueId` behind this operand, if it is a value reference.
    pub fn value(&self) -> Option<ValueId> {
        match *self {
            Operand::Value(id) => Some(id),
            Operand::Integer(_) | Operand::Text(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Value(ref id) => write!(f, "{}", id),
            Operand::Integer(i) => write!(f, "{}", i),
            Operand::Text(ref s) => write!(f, "{:?}", s),
        }
    }
}

/// An IR operation of an instrumented program.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operation {
    /// Read memory through `address` into `dst`.
    Read { dst: ValueId, address: ValueId },
    /// Write `src` to memory through `address`.
    Write { address: ValueId, src: Operand },
    /// Call the function named `target`.
    Call {
        target: String,
        arguments: Vec<Operand>,
    },
    /// Debug-metadata binding of a source variable to `address`.
    Bind { address: ValueId },
    /// Return from the function.
    Return { result: Option<ValueId> },
    /// Does nothing.
    Nop,
}

impl Operation {
    pub fn read(dst: ValueId, address: ValueId) -> Operation {
        Operation::Read { dst, address }
    }

    pub fn write(address: ValueId, src: Operand) -> Operation {
        Operation::Write { address, src }
    }

    pub fn call<S>(target: S, arguments: Vec<Operand>) -> Operation
    where
        S: Into<String>,
    {
        Operation::Call {
            target: target.into(),
            arguments,
        }
    }

    pub fn bind(address: ValueId) -> Operation {
        Operation::Bind { address }
    }

    pub fn ret(result: Option<ValueId>) -> Operation {
        Operation::Return { result }
    }

    pub fn nop() -> Operation {
        Operation::Nop
    }

    pub fn is_read(&self) -> bool {
        matches!(*self, Operation::Read { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(*self, Operation::Write { .. })
    }

    /// True for operations the dependence model tracks: memory reads and
    /// writes.
    pub fn is_memory_access(&self) -> bool {
        self.is_read() || self.is_write()
    }

    pub fn is_call(&self) -> bool {
        matches!(*self, Operation::Call { .. })
    }

    pub fn is_return(&self) -> bool {
        matches!(*self, Operation::Return { .. })
    }

    /// The address operand of a read or write.
    pub fn address(&self) -> Option<ValueId> {
        match *self {
            Operation::Read { address, .. } | Operation::Write { address, .. } => Some(address),
            _ => None,
        }
    }

    /// The callee name, when this operation is a call.
    pub fn call_target(&self) -> Option<&str> {
        match *self {
            Operation::Call { ref target, .. } => Some(target),
            _ => None,
        }
    }

    /// True when this operation is a call to the function named `target`.
    pub fn is_call_to(&self, target: &str) -> bool {
        self.call_target() == Some(target)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operation::Read { ref dst, ref address } => write!(f, "{} = load {}", dst, address),
            Operation::Write {
                ref address,
                ref src,
            } => write!(f, "store {}, {}", src, address),
            Operation::Call {
                ref target,
                ref arguments,
            } => write!(
                f,
                "call {}({})",
                target,
                arguments
                    .iter()
                    .map(|a| format!("{}", a))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Operation::Bind { ref address } => write!(f, "bind {}", address),
            Operation::Return { ref result } => match *result {
                Some(ref value) => write!(f, "return {}", value),
                None => write!(f, "return"),
            },
            Operation::Nop => write!(f, "nop"),
        }
    }
}
