use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A function of an instrumented program: a name, a value arena, and a
/// `ControlFlowGraph`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Function {
    // The name of the function
    name: String,
    // The debug-info file identifier, used in dependence descriptors
    file_id: u32,
    // Arena of values referenced by this function's instructions
    values: Vec<Value>,
    // The `ControlFlowGraph` for this function
    control_flow_graph: ControlFlowGraph,
    // Functions which belong to a Program have indices
    index: Option<usize>,
}

impl Function {
    pub fn new<S>(name: S) -> Function
    where
        S: Into<String>,
    {
        Function {
            name: name.into(),
            file_id: 0,
            values: Vec::new(),
            control_flow_graph: ControlFlowGraph::new(),
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    pub fn set_file_id(&mut self, file_id: u32) {
        self.file_id = file_id;
    }

    /// Allocates a new value in this function's arena.
    pub fn new_value<S>(&mut self, name: S) -> ValueId
    where
        S: Into<String>,
    {
        let index = self.values.len();
        self.values.push(Value::new(index, name));
        ValueId::new(index)
    }

    /// Get a `Value` by id.
    pub fn value(&self, id: ValueId) -> Result<&Value, Error> {
        self.values
            .get(id.index())
            .ok_or(Error::ValueNotFound(id.index()))
    }

    /// The name of a value, or `""` when the value is unknown or unnamed.
    pub fn value_name(&self, id: ValueId) -> &str {
        self.values
            .get(id.index())
            .map(|value| value.name())
            .unwrap_or("")
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.control_flow_graph.block(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block, Error> {
        self.control_flow_graph.block_mut(index)
    }

    pub fn blocks(&self) -> Vec<&Block> {
        self.control_flow_graph.blocks()
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn control_flow_graph_mut(&mut self) -> &mut ControlFlowGraph {
        &mut self.control_flow_graph
    }

    /// The number of instructions in this function. Functions with no
    /// instructions are skipped by analyses.
    pub fn instruction_count(&self) -> usize {
        self.control_flow_graph.instruction_count()
    }

    /// Every instruction in this function, in block-index order.
    pub fn instructions(&self) -> Vec<(InstructionRef, &Instruction)> {
        let mut instructions = Vec::new();
        let mut block_indices: Vec<usize> =
            self.blocks().iter().map(|block| block.index()).collect();
        block_indices.sort_unstable();
        for block_index in block_indices {
            let block = self.block(block_index).unwrap();
            for instruction in block.instructions() {
                instructions.push((
                    InstructionRef::new(block_index, instruction.index()),
                    instruction,
                ));
            }
        }
        instructions
    }

    /// Fetch an instruction by reference.
    pub fn instruction(&self, reference: InstructionRef) -> Result<&Instruction, Error> {
        self.block(reference.block_index())?
            .instruction(reference.instruction_index())
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "function {}", self.name)?;
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
        }
        Ok(())
    }
}
