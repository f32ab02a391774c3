// tests/forwarding_handle.rs

mod common;
use crate::common::{init_tracing, ms, pool};

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use futuro::errors::{ErrorKind, FuturoError};
use futuro::{Executor, ForwardingHandle, Handle, HandleStatus};

#[test]
fn arithmetic_on_unresolved_handles_blocks_and_forwards() {
    init_tracing();

    let exec = pool(2);
    let one: ForwardingHandle<i32> = exec
        .submit(|| {
            thread::sleep(ms(50));
            Ok(1)
        })
        .unwrap();
    let two: ForwardingHandle<i32> = exec
        .submit(|| {
            thread::sleep(ms(20));
            Ok(2)
        })
        .unwrap();

    let three = (&one + &two).unwrap();
    assert_eq!(three, 3);

    let three_handle: ForwardingHandle<i32> = exec.submit(move || Ok(three)).unwrap();
    assert_eq!((&three_handle + &two).unwrap(), 5);

    assert_eq!((&one + 5).unwrap(), 6);
    assert_eq!((&two - &one).unwrap(), 1);
    assert_eq!((&two * 10).unwrap(), 20);
    assert_eq!((&three_handle / &two).unwrap(), 1);
    assert_eq!((&three_handle % 2).unwrap(), 1);
    assert_eq!((-&one).unwrap(), -1);
}

#[test]
fn result_matches_direct_resolution() {
    init_tracing();

    let exec = pool(2);
    let a: ForwardingHandle<f64> = exec.submit(|| Ok(1.5)).unwrap();
    let b: ForwardingHandle<f64> = exec.submit(|| Ok(2.25)).unwrap();

    let via_op = (&a + &b).unwrap();
    let direct = a.resolve().unwrap() + b.resolve().unwrap();
    assert_eq!(via_op, direct);
}

#[test]
fn combination_is_independent_of_completion_order() {
    init_tracing();

    let exec = pool(2);
    for (left_delay, right_delay) in [(ms(40), ms(5)), (ms(5), ms(40))] {
        let left = exec
            .submit(move || {
                thread::sleep(left_delay);
                Ok(String::from("left"))
            })
            .unwrap();
        let right = exec
            .submit(move || {
                thread::sleep(right_delay);
                Ok(String::from("right"))
            })
            .unwrap();

        let joined = left.zip_with(&right, |l, r| format!("{l}+{r}")).unwrap();
        assert_eq!(joined, "left+right");
    }
}

#[test]
fn resolve_caches_the_value() {
    init_tracing();

    let calls = Arc::new(AtomicUsize::new(0));
    let exec = pool(1);
    let handle = {
        let calls = Arc::clone(&calls);
        exec.submit(move || {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(vec![1, 2, 3])
        })
        .unwrap()
    };

    let first = handle.get().unwrap() as *const Vec<i32>;
    assert!(handle.is_resolved());
    let second = handle.get().unwrap() as *const Vec<i32>;
    assert_eq!(first, second, "later reads are served from the cache");
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

    // Clones share the cached value.
    let copy = handle.clone();
    assert!(copy.is_resolved());
    assert_eq!(copy.resolve().unwrap(), vec![1, 2, 3]);
}

#[test]
fn timeout_does_not_alter_eventual_outcome() {
    init_tracing();

    let exec = pool(1);
    let slow = exec
        .submit(|| {
            thread::sleep(ms(150));
            Ok(42)
        })
        .unwrap();

    let started = Instant::now();
    let err = slow.get_timeout(ms(10)).unwrap_err();
    assert!(matches!(err, FuturoError::Timeout(d) if d == ms(10)));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(started.elapsed() < ms(150));
    assert_eq!(slow.status(), HandleStatus::Pending);

    assert_eq!(slow.resolve_timeout(ms(2_000)).unwrap(), 42);
    assert_eq!(slow.resolve().unwrap(), 42);
}

#[test]
fn unbounded_timeout_waits_for_the_value() {
    init_tracing();

    let exec = pool(1);
    let slow: ForwardingHandle<i32> = exec
        .submit(|| {
            thread::sleep(ms(30));
            Ok(7)
        })
        .unwrap();

    assert_eq!(slow.resolve_timeout(Duration::MAX).unwrap(), 7);
    assert!(slow.handle().wait(Some(Duration::MAX)));
    assert_eq!(*slow.get_timeout(Duration::MAX).unwrap(), 7);
}

#[test]
fn failure_is_raised_on_every_dereference() {
    init_tracing();

    let exec = pool(1);
    let bad: ForwardingHandle<i32> = exec.submit(|| Err(anyhow!("bad input"))).unwrap();

    for _ in 0..2 {
        match bad.get() {
            Err(FuturoError::Task(failure)) => {
                assert_eq!(failure.to_string(), "bad input");
                assert_eq!(
                    failure.error().map(|e| e.to_string()),
                    Some("bad input".to_string())
                );
            }
            other => panic!("expected Task error, got {other:?}"),
        }
    }
    assert_eq!(bad.status(), HandleStatus::Failed);
    assert_eq!((&bad + 1).unwrap_err().kind(), ErrorKind::Task);
}

#[test]
fn comparison_indexing_and_iteration_forward_to_the_value() {
    init_tracing();

    let exec = pool(2);
    let small = exec.submit(|| Ok(vec![1, 2, 3])).unwrap();
    let large = exec.submit(|| Ok(vec![1, 2, 4])).unwrap();

    assert_eq!(small.try_cmp(&large).unwrap(), Some(Ordering::Less));
    assert!(!small.try_eq(&large).unwrap());
    assert!(small.eq_value(&vec![1, 2, 3]).unwrap());
    assert_eq!(large.try_index(2usize).unwrap(), 4);
    assert_eq!(small.try_iter().unwrap().sum::<i32>(), 6);
    assert_eq!(small.map(Vec::len).unwrap(), 3);
}

#[test]
fn call_and_string_conversion_forward_to_the_value() {
    init_tracing();

    let exec = pool(1);
    let double = exec.submit(|| Ok(|x: i32| x * 2)).unwrap();
    assert_eq!(double.call(21).unwrap(), 42);

    let greet = exec.submit(|| Ok(|| "hello")).unwrap();
    assert_eq!(greet.invoke().unwrap(), "hello");

    let pi = exec.submit(|| Ok(3.5_f64)).unwrap();
    assert_eq!(pi.try_to_string().unwrap(), "3.5");
}

#[test]
fn display_never_blocks() {
    init_tracing();

    let pending: ForwardingHandle<i32> = ForwardingHandle::new(Handle::pending());
    assert_eq!(pending.to_string(), "<pending>");

    let handle = Handle::pending();
    let fwd = ForwardingHandle::from(handle.clone());
    handle.complete(Ok(7));
    assert_eq!(fwd.to_string(), "7");
    assert!(format!("{fwd:?}").contains("Resolved"));
}

#[test]
fn handle_completes_only_once() {
    let handle: Handle<i32> = Handle::pending();
    handle.complete(Ok(1));
    handle.complete(Ok(2));
    handle.complete(Err(anyhow!("late").into()));

    assert_eq!(handle.status(), HandleStatus::Resolved);
    assert_eq!(handle.result(None).unwrap(), 1);
    assert!(handle.same_handle(&handle.clone()));
    assert!(!handle.same_handle(&Handle::pending()));
}
