//! Scenario tests for `FairShareEngine`.

use super::*;

fn proc(id: u64, group: u64, arrival: u64, burst: u64) -> Process {
    Process::new(
        ProcessId::new(id),
        GroupId::new(group),
        VirtualTime::new(arrival),
        burst,
    )
}

/// `(pid, start, end)` triples for compact timeline assertions.
fn spans(engine: &FairShareEngine) -> Vec<(u64, u64, u64)> {
    engine
        .timeline()
        .blocks()
        .iter()
        .map(|b| (b.process.raw(), b.start.ticks(), b.end.ticks()))
        .collect()
}

fn metrics_of(engine: &FairShareEngine, pid: u64) -> ProcessMetrics {
    engine
        .completed()
        .iter()
        .find(|p| p.id() == ProcessId::new(pid))
        .and_then(Process::metrics)
        .unwrap()
}

// ── Construction ──────────────────────────────────────────────────────

#[test]
fn test_zero_quantum_rejected() {
    assert_eq!(
        FairShareEngine::new(0).unwrap_err(),
        FairShareError::InvalidQuantum
    );
}

#[test]
fn test_empty_input_terminates_immediately() {
    let mut engine = FairShareEngine::new(4).unwrap();
    assert_eq!(engine.simulate(Vec::new()), 0);
    assert!(engine.is_finished());
    assert!(engine.timeline().is_empty());
    assert!(engine.completed().is_empty());
    assert!(engine.summary().is_none());

    // Idempotent once terminated.
    assert!(engine.step().is_none());
    assert!(engine.step().is_none());
    assert_eq!(engine.current_time(), VirtualTime::ZERO);
}

// ── Quantum splitting ─────────────────────────────────────────────────

#[test]
fn test_two_groups_arriving_together() {
    // Both groups are in the rotation from t=0, so each turn gets 4/2 = 2
    // until group 2 drains and group 1 runs alone with the full quantum.
    let mut engine = FairShareEngine::new(4).unwrap();
    let turns = engine.simulate(vec![proc(1, 1, 0, 5), proc(2, 2, 0, 3)]);

    assert_eq!(turns, 5);
    assert_eq!(
        spans(&engine),
        vec![(1, 0, 2), (2, 2, 4), (1, 4, 6), (2, 6, 7), (1, 7, 8)]
    );

    let p2 = metrics_of(&engine, 2);
    assert_eq!(p2.turnaround, 7);
    assert_eq!(p2.waiting, 4);
    assert_eq!(p2.response, 2);

    let p1 = metrics_of(&engine, 1);
    assert_eq!(p1.turnaround, 8);
    assert_eq!(p1.waiting, 3);
    assert_eq!(p1.response, 0);

    let order: Vec<_> = engine.completed().iter().map(|p| p.id().raw()).collect();
    assert_eq!(order, vec![2, 1]);
}

#[test]
fn test_group_share_split_across_ready_processes() {
    let mut engine = FairShareEngine::new(8).unwrap();
    engine.load(vec![proc(1, 1, 0, 4), proc(2, 1, 0, 4), proc(3, 2, 0, 4)]);

    let first = engine.step().unwrap();
    assert_eq!(first.group, GroupId::new(1));
    assert_eq!(first.active_groups, 2);
    assert_eq!(first.group_quantum, 4);
    assert_eq!(first.process_quantum, 2);
    assert_eq!(first.dispatched, 2);

    let second = engine.step().unwrap();
    assert_eq!(second.group, GroupId::new(2));
    assert_eq!(second.process_quantum, 4);
    assert_eq!(second.completed, vec![ProcessId::new(3)]);

    // Group 2 is pruned: group 1 alone gets 8, split over two processes.
    let third = engine.step().unwrap();
    assert_eq!(third.active_groups, 1);
    assert_eq!(third.group_quantum, 8);
    assert_eq!(third.process_quantum, 4);
    assert_eq!(third.completed, vec![ProcessId::new(1), ProcessId::new(2)]);

    assert!(engine.step().is_none());
    assert_eq!(
        spans(&engine),
        vec![(1, 0, 2), (2, 2, 4), (3, 4, 8), (1, 8, 10), (2, 10, 12)]
    );
}

#[test]
fn test_process_quantum_floor_of_one() {
    // 1 / 3 rounds down to zero; every dispatch still gets one tick.
    let mut engine = FairShareEngine::new(1).unwrap();
    engine.load(vec![proc(1, 1, 0, 2), proc(2, 1, 0, 2), proc(3, 1, 0, 2)]);

    let turn = engine.step().unwrap();
    assert_eq!(turn.group_quantum, 1);
    assert_eq!(turn.process_quantum, 1);
    assert_eq!(spans(&engine), vec![(1, 0, 1), (2, 1, 2), (3, 2, 3)]);

    engine.run();
    assert!(engine.timeline().blocks().iter().all(|b| b.duration() >= 1));
    assert_eq!(engine.completed().len(), 3);
}

#[test]
fn test_group_quantum_floor_with_many_groups() {
    // Three groups share a quantum of 2: the group share is 0, floored to 1.
    let mut engine = FairShareEngine::new(2).unwrap();
    engine.load(vec![proc(1, 1, 0, 1), proc(2, 2, 0, 1), proc(3, 3, 0, 1)]);

    let turn = engine.step().unwrap();
    assert_eq!(turn.active_groups, 3);
    assert_eq!(turn.group_quantum, 0);
    assert_eq!(turn.process_quantum, 1);

    engine.run();
    assert_eq!(spans(&engine), vec![(1, 0, 1), (2, 1, 2), (3, 2, 3)]);
}

// ── Arrivals and rotation ─────────────────────────────────────────────

#[test]
fn test_idle_gap_is_fast_forwarded() {
    let mut engine = FairShareEngine::new(4).unwrap();
    engine.load(vec![proc(1, 1, 5, 2), proc(2, 1, 20, 1)]);

    let turn = engine.step().unwrap();
    assert_eq!(turn.started_at, VirtualTime::new(5));
    assert_eq!(turn.ended_at, VirtualTime::new(7));

    let turn = engine.step().unwrap();
    assert_eq!(turn.started_at, VirtualTime::new(20));

    assert!(engine.step().is_none());
    // No idle blocks are recorded for the gaps.
    assert_eq!(spans(&engine), vec![(1, 5, 7), (2, 20, 21)]);
    assert_eq!(metrics_of(&engine, 1).response, 0);
}

#[test]
fn test_arrival_during_turn_waits_for_next_turn() {
    let mut engine = FairShareEngine::new(6).unwrap();
    engine.load(vec![proc(1, 1, 0, 10), proc(2, 1, 1, 10)]);

    // p2 arrives at t=1 while p1 runs; it is queued but not dispatched.
    let first = engine.step().unwrap();
    assert_eq!(first.dispatched, 1);
    assert_eq!(first.process_quantum, 6);
    assert_eq!(engine.ready_count(GroupId::new(1)), 2);
    assert_eq!(spans(&engine), vec![(1, 0, 6)]);

    // The newcomer sits ahead of the requeued p1.
    let second = engine.step().unwrap();
    assert_eq!(second.dispatched, 2);
    assert_eq!(second.process_quantum, 3);
    assert_eq!(spans(&engine), vec![(1, 0, 6), (2, 6, 9), (1, 9, 12)]);
}

#[test]
fn test_drained_group_rejoins_rotation_on_arrival() {
    let mut engine = FairShareEngine::new(4).unwrap();
    engine.simulate(vec![proc(1, 1, 0, 2), proc(2, 2, 0, 8), proc(3, 1, 5, 1)]);

    assert_eq!(
        spans(&engine),
        vec![(1, 0, 2), (2, 2, 6), (2, 6, 8), (3, 8, 9), (2, 9, 11)]
    );

    let order: Vec<_> = engine.completed().iter().map(|p| p.id().raw()).collect();
    assert_eq!(order, vec![1, 3, 2]);

    let p3 = metrics_of(&engine, 3);
    assert_eq!(p3.response, 3);
    assert_eq!(p3.turnaround, 4);
    assert_eq!(p3.waiting, 3);

    let p2 = metrics_of(&engine, 2);
    assert_eq!(p2.response, 2);
    assert_eq!(p2.turnaround, 11);
    assert_eq!(p2.waiting, 3);
}

#[test]
fn test_equal_arrivals_keep_input_order() {
    let mut engine = FairShareEngine::new(4).unwrap();
    engine.simulate(vec![proc(9, 2, 3, 1), proc(5, 2, 0, 1), proc(1, 1, 0, 1)]);

    // Sorted by arrival, ties in input order: p5 (G2) before p1 (G1).
    let first = engine.timeline().blocks()[0];
    assert_eq!(first.process, ProcessId::new(5));
    assert_eq!(first.group, GroupId::new(2));

    let pids: Vec<_> = spans(&engine).into_iter().map(|(p, _, _)| p).collect();
    assert_eq!(pids, vec![5, 1, 9]);
}

#[test]
fn test_rotation_pops_head_and_pushes_to_tail() {
    let mut engine = FairShareEngine::new(9).unwrap();
    engine.load(vec![proc(1, 1, 0, 9), proc(2, 2, 0, 9), proc(3, 3, 0, 9)]);

    engine.step();
    let rotation: Vec<_> = engine.rotation().map(GroupId::raw).collect();
    assert_eq!(rotation, vec![2, 3, 1]);

    engine.step();
    let rotation: Vec<_> = engine.rotation().map(GroupId::raw).collect();
    assert_eq!(rotation, vec![3, 1, 2]);
}

// ── Driving ───────────────────────────────────────────────────────────

#[test]
fn test_run_for_leaves_consistent_partial_state() {
    let mut engine = FairShareEngine::new(2).unwrap();
    engine.load(vec![proc(1, 1, 0, 10), proc(2, 2, 50, 1)]);

    assert_eq!(engine.run_for(2), 2);
    assert!(!engine.is_finished());
    assert_eq!(engine.current_time(), VirtualTime::new(4));
    assert_eq!(engine.ready_count(GroupId::new(1)), 1);
    assert_eq!(engine.pending_count(), 1);
    assert!(engine.completed().is_empty());

    let in_flight: Vec<_> = engine.ready_processes().map(|p| p.remaining()).collect();
    assert_eq!(in_flight, vec![6]);

    engine.run();
    assert!(engine.is_finished());
    assert_eq!(engine.turns_executed(), 6);
    assert_eq!(engine.completed().len(), 2);
}

#[test]
fn test_simulate_resets_previous_run() {
    let workload_a = vec![proc(1, 1, 0, 7), proc(2, 2, 3, 4)];
    let workload_b = vec![proc(7, 3, 1, 2), proc(8, 1, 1, 5), proc(9, 3, 4, 3)];

    let mut reused = FairShareEngine::new(3).unwrap();
    reused.simulate(workload_a);
    reused.simulate(workload_b.clone());

    let mut fresh = FairShareEngine::new(3).unwrap();
    fresh.simulate(workload_b);

    assert_eq!(reused.timeline(), fresh.timeline());
    assert_eq!(reused.completed(), fresh.completed());
    assert_eq!(reused.loaded_count(), 3);
}

#[test]
fn test_deterministic_replay() {
    fn run() -> (u64, Vec<ProcessMetrics>) {
        let workload = vec![
            proc(1, 1, 0, 7),
            proc(2, 2, 0, 3),
            proc(3, 1, 2, 9),
            proc(4, 3, 4, 2),
            proc(5, 2, 6, 6),
            proc(6, 3, 30, 4),
        ];
        let mut engine = FairShareEngine::new(5).unwrap();
        engine.simulate(workload);
        (engine.timeline().timeline_hash(), engine.completed_metrics())
    }

    let (hash1, metrics1) = run();
    let (hash2, metrics2) = run();
    assert_eq!(hash1, hash2, "timelines differ between runs");
    assert_eq!(metrics1, metrics2);
    assert_eq!(metrics1.len(), 6);
}

#[test]
fn test_summary_reflects_completed_list() {
    let mut engine = FairShareEngine::new(4).unwrap();
    engine.simulate(vec![proc(1, 1, 0, 5), proc(2, 2, 0, 3)]);

    let summary = engine.summary().unwrap();
    assert_eq!(summary.overall.count, 2);
    assert!((summary.overall.turnaround - 7.5).abs() < 1e-9);
    assert!((summary.overall.waiting - 3.5).abs() < 1e-9);
    assert!((summary.overall.response - 1.0).abs() < 1e-9);
    assert_eq!(summary.per_group.len(), 2);
    let groups: Vec<_> = engine.known_groups().map(GroupId::raw).collect();
    assert_eq!(groups, vec![1, 2]);
}
