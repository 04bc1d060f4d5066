use crate::graph;
use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block.
///
/// Instruction indices are block-unique and monotonically increasing. They
/// identify an instruction for the lifetime of the block, regardless of
/// later insertions or removals.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Default)]
pub struct Block {
    /// The index of the block.
    index: usize,
    /// An internal counter for the next block-unique instruction index.
    next_instruction_index: usize,
    /// The instructions for this block.
    instructions: Vec<Instruction>,
}

impl Block {
    pub(crate) fn new(index: usize) -> Block {
        Block {
            index,
            next_instruction_index: 0,
            instructions: Vec::new(),
        }
    }

    fn new_instruction_index(&mut self) -> usize {
        let instruction_index = self.next_instruction_index;
        self.next_instruction_index = instruction_index + 1;
        instruction_index
    }

    fn push(&mut self, operation: Operation) -> &mut Instruction {
        let index = self.new_instruction_index();
        self.instructions.push(Instruction::new(index, operation));
        self.instructions.last_mut().unwrap()
    }

    /// Returns the index of this block
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns this block's instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns an instruction by its block-unique index
    pub fn instruction(&self, index: usize) -> Result<&Instruction, Error> {
        self.instructions
            .iter()
            .find(|instruction| instruction.index() == index)
            .ok_or_else(|| format!("No instruction with index {}", index).into())
    }

    pub fn instruction_mut(&mut self, index: usize) -> Result<&mut Instruction, Error> {
        self.instructions
            .iter_mut()
            .find(|instruction| instruction.index() == index)
            .ok_or_else(|| format!("No instruction with index {}", index).into())
    }

    /// Returns the position of an instruction within this block's
    /// instruction sequence
    pub fn instruction_position(&self, index: usize) -> Option<usize> {
        self.instructions
            .iter()
            .position(|instruction| instruction.index() == index)
    }

    /// Deletes an instruction by its block-unique index
    pub fn remove_instruction(&mut self, index: usize) -> Result<(), Error> {
        match self.instruction_position(index) {
            Some(position) => {
                self.instructions.remove(position);
                Ok(())
            }
            None => Err(format!("No instruction with index {} found", index).into()),
        }
    }

    /// Inserts an operation at the given position in the instruction
    /// sequence, assigning it a fresh block-unique index.
    pub fn insert_instruction(
        &mut self,
        position: usize,
        operation: Operation,
    ) -> Result<&mut Instruction, Error> {
        if position > self.instructions.len() {
            return Err(format!("Position {} out of bounds", position).into());
        }
        let index = self.new_instruction_index();
        self.instructions
            .insert(position, Instruction::new(index, operation));
        Ok(&mut self.instructions[position])
    }

    /// The terminator of this block, when its last instruction is a return.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions
            .last()
            .filter(|instruction| instruction.operation().is_return())
    }

    /// Adds a read operation to the end of this block.
    pub fn read(&mut self, dst: ValueId, address: ValueId) -> &mut Instruction {
        self.push(Operation::read(dst, address))
    }

    /// Adds a write operation to the end of this block.
    pub fn write(&mut self, address: ValueId, src: Operand) -> &mut Instruction {
        self.push(Operation::write(address, src))
    }

    /// Adds a call operation to the end of this block.
    pub fn call<S>(&mut self, target: S, arguments: Vec<Operand>) -> &mut Instruction
    where
        S: Into<String>,
    {
        self.push(Operation::call(target, arguments))
    }

    /// Adds a debug-binding operation to the end of this block.
    pub fn bind(&mut self, address: ValueId) -> &mut Instruction {
        self.push(Operation::bind(address))
    }

    /// Adds a return operation to the end of this block.
    pub fn ret(&mut self, result: Option<ValueId>) -> &mut Instruction {
        self.push(Operation::ret(result))
    }

    /// Adds a nop operation to the end of this block.
    pub fn nop(&mut self) -> &mut Instruction {
        self.push(Operation::nop())
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ Block: 0x{:X} ]", self.index)?;
        for instruction in self.instructions() {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
