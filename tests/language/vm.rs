//! Integration tests for the VM
//!
//! Tests evaluation of compiled Sluice programs against caller contexts.

use std::sync::Arc;
use std::thread;

use sluice_foundation::{ErrorKind, NativeFn, Result, Value};
use sluice_language::{Context, FunctionRegistry, PipeRegistry, Vm, VmConfig, compile, eval};

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn eval_without_context() {
    assert_eq!(eval("1 + 2 * 3").expect("eval"), Value::Float(7.0));
    assert_eq!(eval(r#""n" + 1"#).expect("eval"), Value::from("n1"));
}

#[test]
fn eval_with_context() {
    let ctx = Context::new()
        .with("price", 2.5)
        .with("qty", 4)
        .with("user", Value::object([("name", Value::from("ada"))]));
    let mut vm = Vm::new();
    assert_eq!(vm.eval("price * qty", &ctx).expect("eval"), Value::Float(10.0));
    assert_eq!(
        vm.eval(r#""hi " + user.name"#, &ctx).expect("eval"),
        Value::from("hi ada")
    );
    assert_eq!(vm.eval("user?.address?.city", &ctx).expect("eval"), Value::Null);
}

#[test]
fn missing_context_is_undefined() {
    let err = Vm::new()
        .eval("price * 2", &Context::new())
        .expect_err("undefined");
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable(ref n) if n == "price"));
}

#[test]
fn run_is_repeatable() {
    let program = compile("xs[1:] |map: $item * k").expect("compile");
    let ctx = Context::new().with("xs", vec![1, 2, 3]).with("k", 10);
    let mut vm = Vm::new();
    let expected = Value::from(vec![20, 30]);
    for _ in 0..3 {
        assert_eq!(vm.run(&program, &ctx).expect("run"), expected);
        assert_eq!(vm.binding_depth(), 0);
    }
}

#[test]
fn vm_recovers_after_error() {
    let mut vm = Vm::new();
    let ctx = Context::new().with("xs", vec![1, 0]);
    assert!(vm.eval("xs |map: 1 / $item", &ctx).is_err());
    assert_eq!(vm.eval("xs[0] + 1", &ctx).expect("eval"), Value::Float(2.0));
}

// =============================================================================
// Functions
// =============================================================================

fn greet(args: &[Value]) -> Result<Value> {
    let name = args.first().map_or_else(|| "world".to_string(), ToString::to_string);
    Ok(Value::from(format!("hello, {name}")))
}

#[test]
fn registered_and_context_functions() {
    let functions = FunctionRegistry::builder()
        .register(NativeFn::new("greet", greet))
        .build();
    let mut vm = Vm::with_registries(Arc::new(functions), Arc::new(PipeRegistry::builtin()));
    let ctx = Context::new().with("hello", NativeFn::new("hello", greet));

    assert_eq!(
        vm.eval(r#"greet("ada")"#, &ctx).expect("call"),
        Value::from("hello, ada")
    );
    assert_eq!(vm.eval("hello()", &ctx).expect("call"), Value::from("hello, world"));
    let err = vm.eval("missing()", &ctx).expect_err("unknown");
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(_)));
}

#[test]
fn non_function_variable_is_not_callable() {
    let ctx = Context::new().with("x", 1);
    let err = Vm::new().eval("x()", &ctx).expect_err("not callable");
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(ref n) if n == "x"));
}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn shared_context_across_threads() {
    let ctx = Arc::new(Context::new().with("xs", (1..=10).collect::<Vec<i32>>()));
    let source = "xs |filter: $item % 2 == 0 |reduce: ($acc || 0) + $item";
    let program = Arc::new(compile(source).expect("compile"));
    let pipes = Arc::new(PipeRegistry::builtin());
    let functions = Arc::new(FunctionRegistry::default());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let program = Arc::clone(&program);
            let mut vm = Vm::with_registries(Arc::clone(&functions), Arc::clone(&pipes));
            thread::spawn(move || vm.run(&program, &ctx).expect("run"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread"), Value::Float(30.0));
    }
}

#[test]
fn config_is_applied() {
    let config = VmConfig::default()
        .with_stack_capacity(4)
        .with_trace_instructions(true);
    let mut vm = Vm::new().with_config(config.clone());
    assert_eq!(vm.config(), &config);
    // The stack grows past its initial capacity.
    assert_eq!(
        vm.eval("[1, 2, 3, 4, 5, 6, 7, 8]", &Context::new()).expect("eval"),
        Value::from(vec![1, 2, 3, 4, 5, 6, 7, 8])
    );
}
