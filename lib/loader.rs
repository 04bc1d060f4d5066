//! Loads an instrumented program from its JSON hand-over format.
//!
//! The upstream instrumentation pass serializes the program it produced;
//! this loader turns that JSON into an [`il::Program`] the pass can
//! rewrite. The format is small: functions carry a name, a debug file id,
//! a value-name arena, blocks of instructions in index order, and CFG
//! edges between block indices. Value operands reference the arena by
//! position.

use crate::il;
use crate::Error;
use serde_json::Value;
use std::path::Path;

pub fn from_file(path: &Path) -> Result<il::Program, Error> {
    from_str(&std::fs::read_to_string(path)?)
}

pub fn from_str(s: &str) -> Result<il::Program, Error> {
    from_json(&serde_json::from_str(s)?)
}

pub fn from_json(root: &Value) -> Result<il::Program, Error> {
    let mut program = il::Program::new();

    let functions = match root["functions"] {
        Value::Array(ref functions) => functions,
        _ => return Err("functions missing".into()),
    };
    for function in functions {
        program.add_function(parse_function(function)?);
    }

    Ok(program)
}

fn parse_function(json: &Value) -> Result<il::Function, Error> {
    let name = match json["name"] {
        Value::String(ref name) => name.to_string(),
        _ => return Err("name missing for function".into()),
    };
    let mut function = il::Function::new(name);

    if let Some(file_id) = json.get("file_id") {
        let file_id = file_id
            .as_u64()
            .ok_or_else(|| Error::from("file_id not u64"))?;
        function.set_file_id(file_id as u32);
    }

    if let Value::Array(ref values) = json["values"] {
        for value in values {
            let name = value
                .as_str()
                .ok_or_else(|| Error::from("value name not a string"))?;
            function.new_value(name);
        }
    }

    let blocks = match json["blocks"] {
        Value::Array(ref blocks) => blocks,
        _ => return Err("blocks missing for function".into()),
    };
    for block in blocks {
        let block_index = function.control_flow_graph_mut().new_block()?;
        let instructions = match block["instructions"] {
            Value::Array(ref instructions) => instructions,
            _ => return Err("instructions missing for block".into()),
        };
        for instruction in instructions {
            parse_instruction(function.block_mut(block_index)?, instruction)?;
        }
    }

    if let Value::Array(ref edges) = json["edges"] {
        for edge in edges {
            let pair = edge
                .as_array()
                .filter(|pair| pair.len() == 2)
                .ok_or_else(|| Error::from("edge not a [head, tail] pair"))?;
            let head = index(&pair[0], "edge head")?;
            let tail = index(&pair[1], "edge tail")?;
            function.control_flow_graph_mut().insert_edge(head, tail)?;
        }
    }

    Ok(function)
}

fn parse_instruction(block: &mut il::Block, json: &Value) -> Result<(), Error> {
    let op = match json["op"] {
        Value::String(ref op) => op.as_str(),
        _ => return Err("op missing for instruction".into()),
    };

    let instruction = match op {
        "read" => {
            let dst = value_id(json, "dst")?;
            let address = value_id(json, "address")?;
            block.read(dst, address)
        }
        "write" => {
            let address = value_id(json, "address")?;
            let src = operand(&json["src"])?;
            block.write(address, src)
        }
        "call" => {
            let target = match json["target"] {
                Value::String(ref target) => target.to_string(),
                _ => return Err("target missing for call".into()),
            };
            let mut arguments = Vec::new();
            if let Value::Array(ref values) = json["arguments"] {
                for value in values {
                    arguments.push(operand(value)?);
                }
            }
            block.call(target, arguments)
        }
        "bind" => block.bind(value_id(json, "address")?),
        "return" => {
            let result = match json.get("result") {
                Some(result) if !result.is_null() => {
                    Some(il::ValueId::new(index(result, "result")?))
                }
                _ => None,
            };
            block.ret(result)
        }
        "nop" => block.nop(),
        _ => return Err(format!("unknown operation {:?}", op).into()),
    };

    if let Some(line) = json.get("line") {
        let line = line.as_u64().ok_or_else(|| Error::from("line not u64"))?;
        let column = json
            .get("column")
            .and_then(|column| column.as_u64())
            .unwrap_or(0);
        instruction.set_location(Some(il::SourceLocation::new(line as u32, column as u32)));
    }

    Ok(())
}

fn operand(json: &Value) -> Result<il::Operand, Error> {
    if let Some(value) = json.get("value") {
        return Ok(il::Operand::Value(il::ValueId::new(index(value, "value")?)));
    }
    if let Some(integer) = json.get("integer") {
        let integer = integer
            .as_i64()
            .ok_or_else(|| Error::from("integer operand not i64"))?;
        return Ok(il::Operand::Integer(integer));
    }
    if let Some(text) = json.get("text") {
        let text = text
            .as_str()
            .ok_or_else(|| Error::from("text operand not a string"))?;
        return Ok(il::Operand::Text(text.to_string()));
    }
    Err("operand is none of value, integer, text".into())
}

fn value_id(json: &Value, field: &str) -> Result<il::ValueId, Error> {
    Ok(il::ValueId::new(index(&json[field], field)?))
}

fn index(json: &Value, what: &str) -> Result<usize, Error> {
    json.as_u64()
        .map(|index| index as usize)
        .ok_or_else(|| format!("{} not an index", what).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"{
        "functions": [
            {
                "name": "main",
                "file_id": 1,
                "values": ["a", "tmp"],
                "blocks": [
                    { "instructions": [
                        { "op": "bind", "address": 0 },
                        { "op": "call", "target": "write_tracker",
                          "arguments": [{ "integer": 0 }] },
                        { "op": "write", "address": 0, "src": { "integer": 1 },
                          "line": 3, "column": 5 },
                        { "op": "call", "target": "read_tracker",
                          "arguments": [{ "integer": 0 }] },
                        { "op": "read", "dst": 1, "address": 0, "line": 4 },
                        { "op": "return" }
                    ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn loads_a_program() {
        let program = from_str(PROGRAM).unwrap();
        let main = program.function_by_name("main").unwrap();
        assert_eq!(main.file_id(), 1);
        assert_eq!(main.values().len(), 2);
        assert_eq!(main.instruction_count(), 6);

        let instructions = main.instructions();
        assert!(instructions[2].1.is_write());
        assert_eq!(
            instructions[2].1.location(),
            Some(il::SourceLocation::new(3, 5))
        );
        assert_eq!(instructions[4].1.line(), 4);
        assert!(instructions[5].1.operation().is_return());
    }

    #[test]
    fn rejects_unknown_operations() {
        let text = r#"{ "functions": [ { "name": "f", "blocks": [
            { "instructions": [ { "op": "jump" } ] } ] } ] }"#;
        assert!(from_str(text).is_err());
    }

    #[test]
    fn edges_become_cfg_edges() {
        let text = r#"{ "functions": [ { "name": "f", "blocks": [
            { "instructions": [ { "op": "nop" } ] },
            { "instructions": [ { "op": "return" } ] }
        ], "edges": [[0, 1]] } ] }"#;
        let program = from_str(text).unwrap();
        let function = program.function_by_name("f").unwrap();
        assert_eq!(
            function.control_flow_graph().successor_indices(0).unwrap(),
            vec![1]
        );
    }
}
