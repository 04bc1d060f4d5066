//! Whole-pass tests over small instrumented programs.

use crate::il;
use crate::loader;
use crate::omission::{abi, Config, OmissionPass};

fn tracker(block: &mut il::Block, name: &str) {
    block.call(name, vec![il::Operand::Integer(0)]);
}

fn located(instruction: &mut il::Instruction, line: u32) {
    instruction.set_location(Some(il::SourceLocation::new(line, 1)));
}

fn tracking_calls(function: &il::Function) -> usize {
    function
        .instructions()
        .iter()
        .filter(|(_, instruction)| {
            instruction
                .operation()
                .call_target()
                .map(abi::is_tracker)
                .unwrap_or(false)
        })
        .count()
}

fn calls_to(function: &il::Function, target: &str) -> usize {
    function
        .instructions()
        .iter()
        .filter(|(_, instruction)| instruction.operation().is_call_to(target))
        .count()
}

/// A local variable never escaped and never written, used only in reads.
fn read_only_program() -> il::Program {
    let mut function = il::Function::new("f");
    function.set_file_id(1);
    let a = function.new_value("a");
    let tmp = function.new_value("tmp");
    let block_index = function.control_flow_graph_mut().new_block().unwrap();
    let block = function.block_mut(block_index).unwrap();
    block.bind(a);
    tracker(block, abi::READ_TRACKER);
    located(block.read(tmp, a), 2);
    tracker(block, abi::READ_TRACKER);
    located(block.read(tmp, a), 3);
    block.ret(None);

    let mut program = il::Program::new();
    program.add_function(function);
    program
}

/// `main` with a written local: a write then a read of the same address,
/// each preceded by its tracker, followed by the runtime teardown.
fn written_local_program() -> il::Program {
    let mut function = il::Function::new(abi::ENTRY_FUNCTION);
    function.set_file_id(1);
    let a = function.new_value("a");
    let tmp = function.new_value("tmp");
    let block_index = function.control_flow_graph_mut().new_block().unwrap();
    let block = function.block_mut(block_index).unwrap();
    block.bind(a);
    tracker(block, abi::WRITE_TRACKER);
    located(block.write(a, il::Operand::Integer(1)), 3);
    tracker(block, abi::READ_TRACKER);
    located(block.read(tmp, a), 4);
    block.call(abi::FINALIZE, vec![]);
    block.ret(None);

    let mut program = il::Program::new();
    program.add_function(function);
    program
}

#[test]
fn baseline_removes_tracking_of_read_only_locals() {
    let mut program = read_only_program();
    let mut pass = OmissionPass::new(Config::default());
    pass.run(&mut program).unwrap();

    let function = program.function_by_name("f").unwrap();
    assert_eq!(tracking_calls(function), 0);
    assert_eq!(pass.statistics().tracking_calls_seen(), 2);
    assert_eq!(pass.statistics().tracking_calls_removed(), 2);

    // no deep analysis ran, so the table stays empty and nothing reports
    assert_eq!(pass.table().encode(), "");
    assert_eq!(calls_to(function, abi::REPORT_BLOCK), 0);
}

#[test]
fn escaped_address_keeps_its_tracking() {
    let mut function = il::Function::new("f");
    let a = function.new_value("a");
    let tmp = function.new_value("tmp");
    let block_index = function.control_flow_graph_mut().new_block().unwrap();
    let block = function.block_mut(block_index).unwrap();
    block.bind(a);
    block.call("helper", vec![il::Operand::Value(a)]);
    tracker(block, abi::READ_TRACKER);
    located(block.read(tmp, a), 5);
    block.ret(None);

    let mut program = il::Program::new();
    program.add_function(function);

    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();

    let function = program.function_by_name("f").unwrap();
    assert_eq!(tracking_calls(function), 1);
    assert_eq!(pass.statistics().tracking_calls_removed(), 0);
}

#[test]
fn return_slot_is_omittable_even_when_written() {
    let mut function = il::Function::new("f");
    let retval = function.new_value(abi::RETURN_SLOT);
    let block_index = function.control_flow_graph_mut().new_block().unwrap();
    let block = function.block_mut(block_index).unwrap();
    block.bind(retval);
    tracker(block, abi::WRITE_TRACKER);
    located(block.write(retval, il::Operand::Integer(1)), 2);
    block.ret(None);

    let mut program = il::Program::new();
    program.add_function(function);

    let mut pass = OmissionPass::new(Config::default());
    pass.run(&mut program).unwrap();
    assert_eq!(pass.statistics().tracking_calls_removed(), 1);
}

#[test]
fn dependence_analysis_proves_a_straight_line_dependence() {
    let mut baseline = written_local_program();
    let mut pass = OmissionPass::new(Config::default());
    pass.run(&mut baseline).unwrap();
    // the address is written, so the baseline alone removes nothing
    assert_eq!(pass.statistics().tracking_calls_removed(), 0);

    let mut program = written_local_program();
    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();

    assert_eq!(pass.statistics().tracking_calls_removed(), 2);
    assert_eq!(pass.table().encode(), "1:4 RAW 1:3|a");

    let main = program.function_by_name(abi::ENTRY_FUNCTION).unwrap();
    assert_eq!(tracking_calls(main), 0);
    assert_eq!(calls_to(main, abi::REPORT_BLOCK), 1);

    // one block: bind, write, read, add_omission_deps, finalize,
    // report_block, return
    let block = main.block(0).unwrap();
    let instructions = block.instructions();
    assert!(instructions[3]
        .operation()
        .is_call_to(abi::ADD_OMISSION_DEPS));
    assert_eq!(
        instructions[3].operation(),
        &il::Operation::call(
            abi::ADD_OMISSION_DEPS,
            vec![il::Operand::Text("1:4 RAW 1:3|a".to_string())]
        )
    );
    assert!(instructions[4].operation().is_call_to(abi::FINALIZE));
    assert_eq!(
        instructions[5].operation(),
        &il::Operation::call(abi::REPORT_BLOCK, vec![il::Operand::Integer(0)])
    );
    assert!(instructions[6].operation().is_return());
}

#[test]
fn sibling_branch_dependences_stay_tracked() {
    let mut function = il::Function::new("f");
    function.set_file_id(1);
    let a = function.new_value("a");
    let tmp = function.new_value("tmp");
    let cfg = function.control_flow_graph_mut();
    let head = cfg.new_block().unwrap();
    let left = cfg.new_block().unwrap();
    let right = cfg.new_block().unwrap();
    let join = cfg.new_block().unwrap();
    cfg.insert_edge(head, left).unwrap();
    cfg.insert_edge(head, right).unwrap();
    cfg.insert_edge(left, join).unwrap();
    cfg.insert_edge(right, join).unwrap();

    let head_block = function.block_mut(head).unwrap();
    head_block.bind(a);
    tracker(head_block, abi::WRITE_TRACKER);
    located(head_block.write(a, il::Operand::Integer(0)), 1);
    let left_block = function.block_mut(left).unwrap();
    tracker(left_block, abi::WRITE_TRACKER);
    located(left_block.write(a, il::Operand::Integer(1)), 2);
    function.block_mut(right).unwrap().nop();
    let join_block = function.block_mut(join).unwrap();
    tracker(join_block, abi::READ_TRACKER);
    located(join_block.read(tmp, a), 4);
    join_block.ret(None);

    let mut program = il::Program::new();
    program.add_function(function);

    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();

    let function = program.function_by_name("f").unwrap();
    // the join read and the branch write are ordered by neither
    // dominance direction, so both keep their trackers; the head write
    // dominates everything that depends on it and loses its tracker
    assert_eq!(tracking_calls(function), 2);
    assert_eq!(pass.statistics().tracking_calls_removed(), 1);
    assert_eq!(pass.table().encode(), "1:2 WAW 1:1|a,1:4 RAW 1:1|a");
    assert_eq!(calls_to(function, abi::REPORT_BLOCK), 1);
    assert_eq!(
        function
            .block(head)
            .unwrap()
            .instructions()
            .last()
            .unwrap()
            .operation(),
        &il::Operation::call(abi::REPORT_BLOCK, vec![il::Operand::Integer(0)])
    );
}

#[test]
fn rewriting_is_idempotent() {
    let mut program = written_local_program();
    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();
    let rewritten = format!("{}", program);

    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();
    assert_eq!(format!("{}", program), rewritten);
    assert_eq!(pass.statistics().tracking_calls_removed(), 0);
}

#[test]
fn table_order_is_deterministic() {
    let build = || {
        let mut program = written_local_program();
        let mut pass = OmissionPass::new(Config {
            dependence_analysis: true,
            ..Config::default()
        });
        pass.run(&mut program).unwrap();
        pass.table().encode()
    };
    assert_eq!(build(), build());
}

#[test]
fn loaded_program_runs_end_to_end() {
    let text = r#"{
        "functions": [
            {
                "name": "main",
                "file_id": 7,
                "values": ["a", "tmp"],
                "blocks": [
                    { "instructions": [
                        { "op": "bind", "address": 0 },
                        { "op": "call", "target": "write_tracker",
                          "arguments": [{ "integer": 0 }] },
                        { "op": "write", "address": 0, "src": { "integer": 1 },
                          "line": 3 },
                        { "op": "call", "target": "read_tracker",
                          "arguments": [{ "integer": 0 }] },
                        { "op": "read", "dst": 1, "address": 0, "line": 4 },
                        { "op": "call", "target": "finalize" },
                        { "op": "return" }
                    ] }
                ]
            }
        ]
    }"#;
    let mut program = loader::from_str(text).unwrap();

    let mut pass = OmissionPass::new(Config {
        dependence_analysis: true,
        ..Config::default()
    });
    pass.run(&mut program).unwrap();

    assert_eq!(pass.statistics().tracking_calls_seen(), 2);
    assert_eq!(pass.statistics().tracking_calls_removed(), 2);
    assert_eq!(pass.table().encode(), "7:4 RAW 7:3|a");

    let main = program.function_by_name(abi::ENTRY_FUNCTION).unwrap();
    assert_eq!(calls_to(main, abi::ADD_OMISSION_DEPS), 1);
    assert_eq!(calls_to(main, abi::REPORT_BLOCK), 1);
}
