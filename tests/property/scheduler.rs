use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futuro::dag::{StateManager, TaskGraph, TaskId, TaskRunState};
use futuro::{DependencyScheduler, FailurePolicy, HandleStatus};
use futuro_test_utils::InlineExecutor;
use parking_lot::Mutex;
use proptest::prelude::*;

// Random DAG as per-task dependency lists.
// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut deps: Vec<usize> = if i == 0 {
                        Vec::new()
                    } else {
                        potential.into_iter().map(|d| d % i).collect()
                    };
                    deps.sort_unstable();
                    deps.dedup();
                    deps
                })
                .collect()
        })
    })
}

fn policy_strategy() -> impl Strategy<Value = FailurePolicy> {
    prop_oneof![
        Just(FailurePolicy::PropagateSkip),
        Just(FailurePolicy::ProceedRegardless),
    ]
}

fn build_graph(deps: &[Vec<usize>]) -> (TaskGraph, Vec<TaskId>) {
    let mut graph = TaskGraph::new(u64::MAX);
    let ids: Vec<TaskId> = deps.iter().map(|_| graph.add_node(None)).collect();
    for (i, task_deps) in deps.iter().enumerate() {
        for d in task_deps {
            graph.add_edge(ids[i], ids[*d]).expect("acyclic by construction");
        }
    }
    (graph, ids)
}

proptest! {
    /// Step the state machine with an arbitrary completion order and check
    /// the submission invariants.
    #[test]
    fn state_manager_submits_each_task_once_after_its_deps(
        deps in dag_strategy(12),
        failing in proptest::collection::hash_set(0..12usize, 0..4),
        picks in proptest::collection::vec(any::<usize>(), 64),
        policy in policy_strategy(),
    ) {
        let (graph, ids) = build_graph(&deps);
        let mut sm = StateManager::new(&graph, policy);

        let mut submitted: HashSet<usize> = HashSet::new();
        let mut terminal: HashSet<usize> = HashSet::new();
        let mut failed: HashSet<usize> = HashSet::new();
        let mut skipped: HashSet<usize> = HashSet::new();
        let mut running: Vec<usize> = Vec::new();

        let initial: Vec<usize> = sm.initial_ready().iter().map(|id| id.index()).collect();
        let roots: HashSet<usize> = (0..deps.len()).filter(|i| deps[*i].is_empty()).collect();
        prop_assert_eq!(initial.iter().copied().collect::<HashSet<_>>(), roots);
        for t in initial {
            prop_assert!(submitted.insert(t));
            running.push(t);
        }

        let mut pick = picks.into_iter().cycle();
        while !running.is_empty() {
            let idx = pick.next().unwrap_or(0) % running.len();
            let task = running.swap_remove(idx);
            let ok = !failing.contains(&task);

            terminal.insert(task);
            if !ok {
                failed.insert(task);
            }

            let step = sm.complete(ids[task], ok);
            for s in &step.newly_skipped {
                prop_assert_eq!(policy, FailurePolicy::PropagateSkip);
                prop_assert!(!submitted.contains(&s.task.index()), "skipped a submitted task");
                skipped.insert(s.task.index());
                terminal.insert(s.task.index());
            }
            for id in step.newly_ready {
                let t = id.index();
                prop_assert!(submitted.insert(t), "task {} submitted twice", t);
                for d in &deps[t] {
                    prop_assert!(terminal.contains(d), "task {} submitted before dep {}", t, d);
                    if policy == FailurePolicy::PropagateSkip {
                        prop_assert!(!failed.contains(d));
                    }
                }
                running.push(t);
            }
        }

        // Full drain: every task is terminal.
        prop_assert!(sm.all_terminal());
        prop_assert_eq!(submitted.len() + skipped.len(), deps.len());

        if policy == FailurePolicy::ProceedRegardless {
            prop_assert!(skipped.is_empty());
            prop_assert_eq!(submitted.len(), deps.len());
        }

        // Skipped exactly when some dependency failed or was skipped.
        for (t, task_deps) in deps.iter().enumerate() {
            let state = sm.state_of(ids[t]);
            let blocked = policy == FailurePolicy::PropagateSkip
                && task_deps.iter().any(|d| failed.contains(d) || skipped.contains(d));
            prop_assert_eq!(state == Some(TaskRunState::Skipped), blocked);
        }
    }

    /// Run a real scheduler on an inline executor and compare the report
    /// with the graph.
    #[test]
    fn scheduler_run_reports_every_task(
        deps in dag_strategy(10),
        failing in proptest::collection::hash_set(0..10usize, 0..3),
        policy in policy_strategy(),
    ) {
        let started: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let mut s = DependencyScheduler::<usize>::with_policy(policy);
        let mut ids: Vec<TaskId> = Vec::new();

        for (i, task_deps) in deps.iter().enumerate() {
            let dep_ids: Vec<TaskId> = task_deps.iter().map(|d| ids[*d]).collect();
            let started = Arc::clone(&started);
            let fails = failing.contains(&i);
            let id = s
                .register(&dep_ids, move || {
                    started.lock().push(i);
                    if fails {
                        anyhow::bail!("task {i} failed");
                    }
                    Ok(i)
                })
                .expect("register");
            ids.push(id);
        }

        let report = s.run(&InlineExecutor::new()).expect("run");
        prop_assert_eq!(report.len(), deps.len());

        let order: HashMap<usize, usize> = report
            .submission_order()
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.index(), pos))
            .collect();
        prop_assert_eq!(order.len(), report.submission_order().len());

        for (t, task_deps) in deps.iter().enumerate() {
            let handle = report.get(ids[t]).expect("every task has a handle");
            prop_assert!(handle.is_terminal());

            if let Some(pos) = order.get(&t) {
                for d in task_deps {
                    let dep_pos = order.get(d);
                    prop_assert!(dep_pos.is_some_and(|p| p < pos), "dep {} not before {}", d, t);
                }
            } else {
                prop_assert_eq!(handle.status(), HandleStatus::Skipped);
            }

            if failing.contains(&t) && order.contains_key(&t) {
                prop_assert_eq!(report.state_of(ids[t]), Some(TaskRunState::Failed));
            }
        }

        let ran = started.lock().clone();
        prop_assert_eq!(ran.len(), report.submission_order().len());
    }
}
