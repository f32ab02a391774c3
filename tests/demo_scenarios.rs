// tests/demo_scenarios.rs

mod common;
use crate::common::{init_tracing, ms, pool};

use futuro::cli::Scenario;
use futuro::demo::{build_scenario, describe_order, run_forwarding, run_graph};
use futuro::FailurePolicy;

#[test]
fn diamond_scenario_sums_to_five() {
    init_tracing();

    let s = build_scenario(Scenario::Diamond, ms(1), FailurePolicy::PropagateSkip)
        .unwrap()
        .expect("diamond has a graph");
    let lines = run_graph(s, &pool(2)).unwrap();

    let f4 = lines.iter().find(|l| l.starts_with("f4")).unwrap();
    assert!(f4.ends_with("= 5"), "unexpected line {f4}");
    assert!(lines.last().unwrap().starts_with("4 succeeded, 0 failed, 0 skipped"));
}

#[test]
fn failing_scenario_depends_on_policy() {
    init_tracing();

    let skip = build_scenario(Scenario::Failing, ms(1), FailurePolicy::PropagateSkip)
        .unwrap()
        .unwrap();
    let lines = run_graph(skip, &pool(2)).unwrap();
    assert!(lines.last().unwrap().starts_with("1 succeeded, 1 failed, 2 skipped"));

    let proceed = build_scenario(Scenario::Failing, ms(1), FailurePolicy::ProceedRegardless)
        .unwrap()
        .unwrap();
    let lines = run_graph(proceed, &pool(2)).unwrap();
    assert!(lines.last().unwrap().starts_with("1 succeeded, 3 failed, 0 skipped"));
}

#[test]
fn dry_run_order_lists_dependencies() {
    let s = build_scenario(Scenario::Chain, ms(1), FailurePolicy::default())
        .unwrap()
        .unwrap();
    let lines = describe_order(&s).unwrap();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "f1 (task#0)");
    assert!(lines.iter().any(|l| l == "f4 (task#3) <- f3 (task#2)"));
}

#[test]
fn forwarding_scenario_has_no_graph_and_computes_values() {
    init_tracing();

    assert!(
        build_scenario(Scenario::Forwarding, ms(1), FailurePolicy::default())
            .unwrap()
            .is_none()
    );

    let lines = run_forwarding(&pool(2), ms(1)).unwrap();
    assert!(lines.contains(&"x + 5    = 6".to_string()));
    assert!(lines.contains(&"y + z    = 5".to_string()));
    assert!(lines.contains(&"cos(w)   = 1".to_string()));
    assert_eq!(lines.last().unwrap(), "x after resolving:  1");
}
