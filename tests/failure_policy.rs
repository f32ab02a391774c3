// tests/failure_policy.rs

mod common;
use crate::common::{InlineExecutor, init_tracing, pool};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use futuro::errors::{ErrorKind, FuturoError};
use futuro::{DependencyScheduler, FailurePolicy, HandleStatus, TaskRunState};

#[test]
fn propagate_skip_marks_transitive_dependents_skipped() {
    init_tracing();

    let mut s = DependencyScheduler::<i32>::with_policy(FailurePolicy::PropagateSkip);
    let ran = Arc::new(AtomicBool::new(false));

    let bad = s
        .register_named("bad", &[], || Err(anyhow!("boom")))
        .unwrap();
    let child = {
        let ran = Arc::clone(&ran);
        s.register_named("child", &[bad], move || {
            ran.store(true, Ordering::SeqCst);
            Ok(1)
        })
        .unwrap()
    };
    let grandchild = s.register_named("grandchild", &[child], || Ok(2)).unwrap();
    let sibling = s.register_named("sibling", &[], || Ok(3)).unwrap();

    let exec = pool(2);
    let report = s.run(&exec).expect("run does not fail because a task failed");

    assert!(!ran.load(Ordering::SeqCst), "skipped task must never run");
    assert_eq!(report.state_of(bad), Some(TaskRunState::Failed));
    assert_eq!(report.state_of(child), Some(TaskRunState::Skipped));
    assert_eq!(report.state_of(grandchild), Some(TaskRunState::Skipped));
    assert_eq!(report.state_of(sibling), Some(TaskRunState::Succeeded));
    assert_eq!(*report.value(sibling).unwrap(), 3);

    // Skipped tasks are never handed to the executor.
    assert!(!report.submission_order().contains(&child));
    assert!(!report.submission_order().contains(&grandchild));

    let skipped = report.get(grandchild).unwrap();
    assert_eq!(skipped.status(), HandleStatus::Skipped);
    match skipped.get() {
        Err(err @ FuturoError::Skipped { .. }) => {
            assert_eq!(err.kind(), ErrorKind::Resolution);
            if let FuturoError::Skipped {
                task,
                failed_dependency,
            } = err
            {
                assert_eq!(task, grandchild);
                assert_eq!(failed_dependency, bad);
            }
        }
        other => panic!("expected Skipped, got {other:?}"),
    }

    let failed = report.get(bad).unwrap();
    match failed.get() {
        Err(FuturoError::Task(failure)) => {
            assert!(!failure.is_panic());
            assert_eq!(failure.to_string(), "boom");
        }
        other => panic!("expected Task error, got {other:?}"),
    }
}

#[test]
fn skip_in_diamond_holds_even_when_other_branch_succeeds() {
    init_tracing();

    let mut s = DependencyScheduler::<i32>::new();
    let root = s.register(&[], || Ok(1)).unwrap();
    let ok = s.register(&[root], || Ok(2)).unwrap();
    let bad = s.register(&[root], || Err(anyhow!("nope"))).unwrap();
    let join = s.register(&[ok, bad], || Ok(4)).unwrap();

    let report = s.run(&InlineExecutor::new()).unwrap();

    assert_eq!(report.succeeded(), vec![root, ok]);
    assert_eq!(report.failed(), vec![bad]);
    assert_eq!(report.skipped(), vec![join]);
    assert!(!report.all_succeeded());
}

#[test]
fn proceed_regardless_submits_dependents_of_failed_tasks() {
    init_tracing();

    let mut s = DependencyScheduler::<i32>::with_policy(FailurePolicy::ProceedRegardless);
    let bad = s.register(&[], || Err(anyhow!("upstream broke"))).unwrap();
    let ignores = s.register(&[bad], || Ok(10)).unwrap();
    let reads = s
        .register_with(&[bad], |up| {
            let v = up.value(0)?;
            Ok(v + 1)
        })
        .unwrap();
    let observes = s
        .register_with(&[bad], |up| {
            let handle = up.handle(0)?;
            Ok(if handle.failure().is_some() { -1 } else { 0 })
        })
        .unwrap();

    let exec = pool(2);
    let report = s.run(&exec).unwrap();

    assert_eq!(report.submission_order().len(), 4);
    assert_eq!(report.state_of(ignores), Some(TaskRunState::Succeeded));
    assert_eq!(*report.value(ignores).unwrap(), 10);

    // The failure surfaces only when the dependency is dereferenced.
    assert_eq!(report.state_of(reads), Some(TaskRunState::Failed));
    let msg = report.get(reads).unwrap().failure().unwrap().to_string();
    assert!(msg.contains("upstream broke"), "unexpected message: {msg}");

    assert_eq!(*report.value(observes).unwrap(), -1);
    assert!(report.skipped().is_empty());
}

#[test]
fn panicking_task_is_captured_and_isolated() {
    init_tracing();

    let mut s = DependencyScheduler::<i32>::new();
    let panics = s
        .register(&[], || -> anyhow::Result<i32> { panic!("kaboom") })
        .unwrap();
    let after = s.register(&[panics], || Ok(1)).unwrap();
    let unrelated = s.register(&[], || Ok(2)).unwrap();

    let exec = pool(1);
    let report = s.run(&exec).unwrap();

    let failure = report.get(panics).unwrap().failure().unwrap();
    assert!(failure.is_panic());
    assert!(failure.to_string().contains("kaboom"));
    assert_eq!(report.state_of(after), Some(TaskRunState::Skipped));
    assert_eq!(*report.value(unrelated).unwrap(), 2);

    // The single worker survived the panic.
    let again = futuro::Executor::submit(&exec, || Ok(5)).unwrap();
    assert_eq!(again.resolve().unwrap(), 5);
}

#[test]
fn policy_can_be_parsed_from_strings() {
    assert_eq!(
        "propagate-skip".parse::<FailurePolicy>().unwrap(),
        FailurePolicy::PropagateSkip
    );
    assert_eq!(
        "Proceed".parse::<FailurePolicy>().unwrap(),
        FailurePolicy::ProceedRegardless
    );
    assert!("retry".parse::<FailurePolicy>().is_err());
    assert_eq!(FailurePolicy::default(), FailurePolicy::PropagateSkip);
    assert_eq!(FailurePolicy::ProceedRegardless.to_string(), "proceed-regardless");
}
