//! Integration tests for pipe stages
//!
//! Covers the built-in stage kinds, binding scope, and custom handlers.

use std::sync::Arc;

use sluice_foundation::{ErrorKind, Result, Value};
use sluice_language::{Context, FunctionRegistry, PipeHandler, PipeRegistry, StageEvaluator, Vm};

fn run(source: &str, ctx: &Context) -> Result<Value> {
    Vm::new().eval(source, ctx)
}

fn hundred() -> Context {
    Context::new().with("arr", (1..=100).collect::<Vec<i32>>())
}

#[test]
fn map_filter_reduce() {
    let result = run(
        "arr |map: $item * 2.0 |filter: $item > 100.0 |reduce: ($acc || 0) + $item",
        &hundred(),
    )
    .expect("pipe");
    assert_eq!(result, Value::Float(7550.0));
}

#[test]
fn filter_keeps_original_elements() {
    let ctx = Context::new().with(
        "users",
        vec![
            Value::object([("name", Value::from("a")), ("age", Value::from(30))]),
            Value::object([("name", Value::from("b")), ("age", Value::from(12))]),
        ],
    );
    let adults = run("users |filter: $item.age >= 18", &ctx).expect("filter");
    let names = run("users |filter: $item.age >= 18 |map: $item.name", &ctx).expect("names");
    assert_eq!(adults.as_array().map(|a| a.len()), Some(1));
    assert_eq!(names, Value::from(vec!["a"]));
}

#[test]
fn find_first_match() {
    let ctx = hundred();
    assert_eq!(
        run("arr |find: $item * $item > 50", &ctx).expect("find"),
        Value::Float(8.0)
    );
    assert_eq!(run("arr |find: $item > 100", &ctx).expect("find"), Value::Null);
}

#[test]
fn pipe_stage_threads_previous_result() {
    let ctx = hundred();
    assert_eq!(
        run("arr |filter: $item <= 3 |pipe: $1[0] + $1[2]", &ctx).expect("pipe"),
        Value::Float(4.0)
    );
}

#[test]
fn scalar_input_is_one_element() {
    let ctx = Context::new().with("n", 7);
    assert_eq!(
        run("n |map: $item + 1", &ctx).expect("map"),
        Value::from(vec![8])
    );
    assert_eq!(
        run("n |reduce: ($acc || 0) + $item", &ctx).expect("reduce"),
        Value::Float(7.0)
    );
}

#[test]
fn context_shadowed_by_binding() {
    let ctx = Context::new().with("$item", 99).with("xs", vec![1]);
    assert_eq!(
        run("xs |map: $item", &ctx).expect("map"),
        Value::from(vec![1])
    );
    assert_eq!(ctx.get("$item"), Some(&Value::Float(99.0)));
}

#[test]
fn stage_errors_carry_stage_frames() {
    let err = run("[[1]] |map: ($item |map: $item + null)", &Context::new())
        .expect_err("inner failure");
    assert!(matches!(err.kind, ErrorKind::UnsupportedOperands { .. }));
    let stack = err.context.expect("frames").stack;
    assert_eq!(
        stack,
        vec!["pipe stage 'map'".to_string(), "pipe stage 'map'".to_string()]
    );
}

// =============================================================================
// Custom handlers
// =============================================================================

/// `sortby:` orders elements by the key the body computes for each one.
struct SortBy;

impl PipeHandler for SortBy {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        let items: Vec<Value> = previous
            .as_array()
            .map(|a| a.iter().cloned().collect())
            .unwrap_or_else(|| vec![previous.clone()]);
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let key = stage.eval(&[("$item", item.clone())])?;
            keyed.push((key.as_float().unwrap_or(f64::NAN), item));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Value::array(keyed.into_iter().map(|(_, item)| item)))
    }
}

/// `count:` ignores its body and reports how many elements arrived.
struct Count;

impl PipeHandler for Count {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        assert_eq!(stage.name(), "count");
        let n = previous.as_array().map_or(1, |a| a.len());
        Ok(Value::from(n))
    }
}

fn custom_vm() -> Vm {
    let pipes = PipeRegistry::builder()
        .with_builtins()
        .register("sortby", Arc::new(SortBy))
        .register("count", Arc::new(Count))
        .build();
    Vm::with_registries(Arc::new(FunctionRegistry::default()), Arc::new(pipes))
}

#[test]
fn custom_handlers_are_dispatched() {
    let mut vm = custom_vm();
    let ctx = Context::new().with("xs", vec![3, -1, 2]);
    assert_eq!(
        vm.eval("xs |sortby: -$item", &ctx).expect("sortby"),
        Value::from(vec![3, 2, -1])
    );
    assert_eq!(
        vm.eval("xs |filter: $item > 0 |count: null", &ctx).expect("count"),
        Value::Float(2.0)
    );
}

#[test]
fn builtins_can_be_omitted() {
    let pipes = PipeRegistry::builder()
        .register("sortby", Arc::new(SortBy))
        .build();
    let mut vm = Vm::with_registries(Arc::new(FunctionRegistry::default()), Arc::new(pipes));
    let err = vm
        .eval("[1] |sortby: $item", &Context::new())
        .expect_err("first is not registered");
    assert!(matches!(err.kind, ErrorKind::UnknownPipeHandler(ref n) if n == "first"));
}
