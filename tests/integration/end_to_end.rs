//! End-to-end tests: host data in, expression out.

use sluice::foundation::{ErrorKind, Value};
use sluice::language::{Context, compile};
use sluice::{init_tracing, standard_vm};

fn orders() -> Value {
    let order = |id: i32, total: f64, status: &str| {
        Value::object([
            ("id", Value::from(id)),
            ("total", Value::from(total)),
            ("status", Value::from(status)),
        ])
    };
    Value::from(vec![
        order(1, 19.5, "paid"),
        order(2, 250.0, "paid"),
        order(3, 75.25, "refunded"),
        order(4, 120.0, "paid"),
    ])
}

#[test]
fn tracing_init_is_idempotent() {
    init_tracing();
    init_tracing();
    assert_eq!(
        standard_vm().eval("1 + 1", &Context::new()).expect("eval"),
        Value::Float(2.0)
    );
}

#[test]
fn revenue_report() {
    let ctx = Context::new().with("orders", orders()).with("threshold", 100);
    let mut vm = standard_vm();

    let paid = vm
        .eval(r#"orders |filter: $item.status == "paid" |map: $item.total"#, &ctx)
        .expect("paid totals");
    assert_eq!(paid, Value::from(vec![19.5, 250.0, 120.0]));

    let big = vm
        .eval(
            "orders |filter: $item.total > threshold |map: $item.id",
            &ctx,
        )
        .expect("big orders");
    assert_eq!(big, Value::from(vec![2, 4]));

    let revenue = vm
        .eval(
            r#"sum(orders |filter: $item.status == "paid" |map: $item.total)"#,
            &ctx,
        )
        .expect("revenue");
    assert_eq!(revenue, Value::Float(389.5));
}

#[test]
fn first_refund_lookup() {
    let ctx = Context::new().with("orders", orders());
    let mut vm = standard_vm();
    assert_eq!(
        vm.eval(r#"(orders |find: $item.status == "refunded")?.id"#, &ctx)
            .expect("find"),
        Value::Float(3.0)
    );
    assert_eq!(
        vm.eval(r#"(orders |find: $item.status == "void")?.id"#, &ctx)
            .expect("find"),
        Value::Null
    );
}

#[test]
fn label_building() {
    let ctx = Context::new().with("orders", orders());
    let mut vm = standard_vm();
    let labels = vm
        .eval(
            r##"orders[:2] |map: "#" + $item.id + " " + upper($item.status)"##,
            &ctx,
        )
        .expect("labels");
    assert_eq!(labels, Value::from(vec!["#1 PAID", "#2 PAID"]));
}

#[test]
fn compiled_program_is_reused_across_contexts() {
    let program = compile("max(xs |map: abs($item)) || 0").expect("compile");
    let mut vm = standard_vm();
    for (xs, expected) in [(vec![-5, 3], 5.0), (vec![1, 2], 2.0), (vec![], 0.0)] {
        let ctx = Context::new().with("xs", xs);
        assert_eq!(vm.run(&program, &ctx).expect("run"), Value::Float(expected));
    }
}

#[test]
fn errors_surface_with_stage() {
    let ctx = Context::new().with("orders", orders());
    let err = standard_vm()
        .eval("orders |map: $item.total / $item.discount", &ctx)
        .expect_err("missing key");
    assert!(matches!(err.kind, ErrorKind::MissingKey(ref k) if k == "discount"));
    let context = err.context.expect("stage frame");
    assert!(context.to_string().contains("in pipe stage 'map'"));
    assert_eq!(
        context.source.as_deref(),
        Some("orders |map: $item.total / $item.discount")
    );
}
