//! Integration tests for the compiler

use sluice_foundation::{ErrorKind, Value};
use sluice_language::{Bytecode, Compiler, Opcode, compile, parse};

fn opcodes(code: &Bytecode) -> Vec<Opcode> {
    code.instructions()
        .map(|i| i.expect("decodes").opcode)
        .collect()
}

#[test]
fn arithmetic_layout() {
    let program = compile("1 + 2 * 3").expect("compile");
    assert_eq!(
        program.constants,
        vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]
    );
    let decoded: Vec<(Opcode, Vec<u16>)> = program
        .code
        .instructions()
        .map(|i| i.expect("decodes"))
        .map(|i| (i.opcode, i.operands))
        .collect();
    assert_eq!(
        decoded,
        vec![
            (Opcode::Constant, vec![0]),
            (Opcode::Constant, vec![1]),
            (Opcode::Constant, vec![2]),
            (Opcode::Mul, vec![]),
            (Opcode::Add, vec![]),
        ]
    );
}

#[test]
fn main_stream_has_no_return() {
    let program = compile("a + 1").expect("compile");
    assert!(!opcodes(&program.code).contains(&Opcode::Return));
}

#[test]
fn comparisons_reorder_operands() {
    let program = compile("x < y").expect("compile");
    let names: Vec<&str> = program.symbols.iter().map(|s| &**s).collect();
    // `y` is loaded first.
    assert_eq!(names, vec!["y", "x"]);
    assert_eq!(opcodes(&program.code).last(), Some(&Opcode::GreaterThan));
}

#[test]
fn pipe_stages_share_pools() {
    let program = compile("xs |map: $item + 1 |filter: $item > 1").expect("compile");
    assert_eq!(program.pipes.len(), 1);
    let stages = &program.pipes[0].stages;
    assert_eq!(stages.len(), 3);
    // Constants from every stage land in the one pool.
    assert_eq!(program.constants, vec![Value::Float(1.0), Value::Float(1.0)]);
    assert!(program.symbols.iter().any(|s| &**s == "$item"));
    assert!(stages[0].bindings.is_empty());
}

#[test]
fn compiler_accepts_hand_built_trees() {
    let expr = parse("[a, b][1]").expect("parse");
    let mut compiler = Compiler::new();
    let first = compiler.compile(&expr).expect("compile");
    let second = compiler.compile(&expr).expect("recompile");
    assert_eq!(first.code, second.code);
    assert_eq!(first.symbols, second.symbols);
}

#[test]
fn constant_pool_limit() {
    let source = vec!["1"; 70_000].join(", ");
    let err = compile(&format!("[{source}]")).expect_err("too many constants");
    assert!(matches!(err.kind, ErrorKind::LimitExceeded(_)));
}

#[test]
fn disassembly_annotates_operands() {
    let program = compile(r#"user.name + "!""#).expect("compile");
    let listing = program.disassemble();
    assert!(listing.contains("ContextVar 0    ; user"));
    assert!(listing.contains(r#"Constant 0    ; "name""#));
    assert!(listing.contains("Index 0"));
}
