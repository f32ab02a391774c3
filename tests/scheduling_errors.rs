// tests/scheduling_errors.rs

mod common;
use crate::common::{InlineExecutor, init_tracing, ms, pool, with_timeout};

use futuro::errors::{ErrorKind, FuturoError};
use futuro::exec::Completer;
use futuro::{DependencyScheduler, Executor, Handle, HandleStatus, TokioExecutor};

#[test]
fn submit_after_pool_shutdown_is_a_scheduling_error() {
    init_tracing();

    let exec = pool(2);
    exec.shutdown(true);
    assert!(exec.is_shut_down());

    let err = exec.submit(|| Ok(1)).unwrap_err();
    assert!(matches!(err, FuturoError::Scheduling(_)));
    assert_eq!(err.kind(), ErrorKind::Scheduling);
}

#[test]
fn run_on_shut_down_pool_fails_without_hanging() {
    init_tracing();

    let err = with_timeout(|| {
        let mut s = DependencyScheduler::<i32>::new();
        let a = s.register(&[], || Ok(1)).unwrap();
        s.register(&[a], || Ok(2)).unwrap();

        let exec = pool(1);
        exec.shutdown(false);
        s.run(&exec).err().expect("run must fail")
    });

    assert_eq!(err.kind(), ErrorKind::Scheduling);
}

#[test]
fn rejection_mid_run_drains_in_flight_work_then_errors() {
    init_tracing();

    let mut s = DependencyScheduler::<i32>::new();
    let a = s.register(&[], || Ok(1)).unwrap();
    let b = s.register(&[], || Ok(2)).unwrap();
    let c = s.register(&[a], || Ok(3)).unwrap();
    s.register(&[c], || Ok(4)).unwrap();
    s.register(&[b], || Ok(5)).unwrap();

    // Accepts the two roots and one dependent, then refuses.
    let exec = InlineExecutor::reject_after(3);
    let err = s.run(&exec).err().expect("run must fail");

    assert!(matches!(err, FuturoError::Scheduling(_)));
    assert_eq!(exec.accepted(), 3, "no submission after the first rejection");
}

#[test]
fn closed_tokio_executor_rejects_submissions() {
    init_tracing();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let exec = TokioExecutor::new(rt.handle().clone());

    let ok = exec.submit(|| Ok("before")).unwrap();
    assert_eq!(ok.resolve().unwrap(), "before");

    exec.close();
    assert!(exec.is_closed());
    let err = exec.submit(|| Ok("after")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Scheduling);
}

#[test]
fn tokio_executor_outside_runtime_reports_scheduling_error() {
    init_tracing();

    let err = TokioExecutor::current().err().expect("no runtime on test thread");
    assert_eq!(err.kind(), ErrorKind::Scheduling);
}

#[test]
fn run_on_shut_down_tokio_runtime_fails_without_hanging() {
    init_tracing();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let exec = TokioExecutor::new(rt.handle().clone());
    rt.shutdown_timeout(ms(100));

    let err = with_timeout(move || {
        let mut s = DependencyScheduler::<i32>::new();
        s.register(&[], || Ok(1)).unwrap();
        s.run(&exec).err().expect("run must fail")
    });

    assert!(matches!(err, FuturoError::Scheduling(_)), "got {err:?}");
}

#[test]
fn dropped_job_fails_its_handle() {
    init_tracing();

    let handle: Handle<i32> = Handle::pending();
    let completer = Completer::new(handle.clone());
    assert_eq!(handle.status(), HandleStatus::Pending);

    drop(completer);

    assert_eq!(handle.status(), HandleStatus::Failed);
    assert!(handle.failure().is_some_and(|f| f.is_dropped()));
    let err = handle.result(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Task);
    assert!(err.to_string().contains("dropped before running"));
}

#[test]
fn completer_that_ran_does_not_overwrite_outcome() {
    let handle: Handle<i32> = Handle::pending();
    Completer::new(handle.clone()).complete(Ok(7));

    assert_eq!(handle.result(None).unwrap(), 7);
}
