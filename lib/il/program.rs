use crate::il::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A `Program` is an ordered collection of `Function`s: one compilation
/// unit of the instrumented program.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Program {
    // Mapping of function indices to `Function`
    functions: BTreeMap<usize, Function>,
    // The index for the next function added to this program
    next_index: usize,
}

impl Program {
    pub fn new() -> Program {
        Program {
            functions: BTreeMap::new(),
            next_index: 0,
        }
    }

    /// Add a function to this program, assigning it the next index.
    pub fn add_function(&mut self, mut function: Function) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        function.set_index(Some(index));
        self.functions.insert(index, function);
        index
    }

    /// Get a function by its index.
    pub fn function(&self, index: usize) -> Option<&Function> {
        self.functions.get(&index)
    }

    pub fn function_mut(&mut self, index: usize) -> Option<&mut Function> {
        self.functions.get_mut(&index)
    }

    /// Get a function by name.
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions
            .values()
            .find(|function| function.name() == name)
    }

    pub fn function_by_name_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions
            .values_mut()
            .find(|function| function.name() == name)
    }

    /// All functions in index order.
    pub fn functions(&self) -> Vec<&Function> {
        self.functions.values().collect()
    }

    pub fn functions_mut(&mut self) -> Vec<&mut Function> {
        self.functions.values_mut().collect()
    }

    /// The indices of all functions, in order.
    pub fn function_indices(&self) -> Vec<usize> {
        self.functions.keys().cloned().collect()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for function in self.functions.values() {
            writeln!(f, "{}", function)?;
        }
        Ok(())
    }
}
