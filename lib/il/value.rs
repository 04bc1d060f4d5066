use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity of a value within one function.
///
/// Address identity is `ValueId` equality. Ids are handed out by
/// `Function::new_value` and are never reused.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct ValueId(usize);

impl ValueId {
    pub(crate) fn new(index: usize) -> ValueId {
        ValueId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An address-valued entity in a function's value arena.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Value {
    index: usize,
    name: String,
}

impl Value {
    pub(crate) fn new<S>(index: usize, name: S) -> Value
    where
        S: Into<String>,
    {
        Value {
            index,
            name: name.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The source-level name of this value, as recovered from debug
    /// metadata. Empty when no name is known.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> ValueId {
        ValueId(self.index)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "%{}", self.index)
        } else {
            write!(f, "%{}<{}>", self.index, self.name)
        }
    }
}
