//! In-place rewriting of the instrumented program.
//!
//! Three independent actions: deleting the tracker call immediately
//! preceding each omittable operation, inserting one report call per
//! block with proven dependences, and attaching the serialized table
//! before the finalize call in the entry function. Each action tolerates
//! already-rewritten input, so a second run leaves the program unchanged.

use crate::il;
use crate::omission::abi;
use crate::Error;
use log::debug;
use std::collections::BTreeMap;

fn is_tracker_call(instruction: &il::Instruction) -> bool {
    instruction
        .operation()
        .call_target()
        .map(abi::is_tracker)
        .unwrap_or(false)
}

/// The number of tracker calls currently in the function.
pub(crate) fn count_tracking_calls(function: &il::Function) -> usize {
    function
        .instructions()
        .iter()
        .filter(|(_, instruction)| is_tracker_call(instruction))
        .count()
}

/// Deletes the tracker call immediately preceding each omittable
/// operation. Operations with no preceding tracker are left untouched.
/// Returns the number of calls deleted.
pub(crate) fn remove_tracking_calls(
    function: &mut il::Function,
    omittable: &[il::InstructionRef],
) -> Result<usize, Error> {
    let mut removed = 0;
    for reference in omittable {
        let block = function.block_mut(reference.block_index())?;
        let position = match block.instruction_position(reference.instruction_index()) {
            Some(position) => position,
            None => continue,
        };
        if position == 0 {
            continue;
        }
        let preceding = &block.instructions()[position - 1];
        if !is_tracker_call(preceding) {
            continue;
        }
        let index = preceding.index();
        block.remove_instruction(index)?;
        removed += 1;
    }
    Ok(removed)
}

/// Inserts a report call carrying the block's assigned table index,
/// immediately before the block's terminator. A block already carrying a
/// report call is skipped.
pub(crate) fn insert_block_reports(
    function: &mut il::Function,
    assignments: &BTreeMap<usize, usize>,
) -> Result<(), Error> {
    for (&block_index, &table_index) in assignments {
        let block = function.block_mut(block_index)?;
        if block
            .instructions()
            .iter()
            .any(|instruction| instruction.operation().is_call_to(abi::REPORT_BLOCK))
        {
            continue;
        }
        let position = match block.terminator() {
            Some(_) => block.instructions().len() - 1,
            None => block.instructions().len(),
        };
        block.insert_instruction(
            position,
            il::Operation::call(
                abi::REPORT_BLOCK,
                vec![il::Operand::Integer(table_index as i64)],
            ),
        )?;
    }
    Ok(())
}

/// Inserts the serialized table immediately before the finalize call in
/// the entry function. Skipped without error when the entry function or
/// its finalize call is missing, or when a table is already attached.
/// Returns whether the table was attached.
pub(crate) fn attach_dependence_table(
    program: &mut il::Program,
    encoded: &str,
) -> Result<bool, Error> {
    let function = match program.function_by_name_mut(abi::ENTRY_FUNCTION) {
        Some(function) => function,
        None => {
            debug!(
                "no entry function {:?}, skipping table attachment",
                abi::ENTRY_FUNCTION
            );
            return Ok(false);
        }
    };

    if function
        .instructions()
        .iter()
        .any(|(_, instruction)| instruction.operation().is_call_to(abi::ADD_OMISSION_DEPS))
    {
        return Ok(false);
    }

    let anchor = function
        .instructions()
        .iter()
        .find(|(_, instruction)| instruction.operation().is_call_to(abi::FINALIZE))
        .map(|(reference, _)| *reference);
    let reference = match anchor {
        Some(reference) => reference,
        None => {
            debug!(
                "no {:?} call in {:?}, skipping table attachment",
                abi::FINALIZE,
                abi::ENTRY_FUNCTION
            );
            return Ok(false);
        }
    };

    let block = function.block_mut(reference.block_index())?;
    let position = block
        .instruction_position(reference.instruction_index())
        .ok_or_else(|| Error::from("finalize call vanished during rewriting"))?;
    block.insert_instruction(
        position,
        il::Operation::call(
            abi::ADD_OMISSION_DEPS,
            vec![il::Operand::Text(encoded.to_string())],
        ),
    )?;
    Ok(true)
}
