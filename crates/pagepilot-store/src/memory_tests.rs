use super::*;

fn store() -> MemoryStore {
    MemoryStore::new()
}

async fn seeded(id: &str) -> MemoryStore {
    let s = store();
    s.create(id).await.unwrap();
    s
}

/// Drive an entry into `Result` state with a published response, the way a
/// worker would.
async fn publish(s: &MemoryStore, id: &str, shot: &str) {
    s.transition(
        id,
        StateUpdate::to(SessionState::Running).expecting([SessionState::Idle]),
    )
    .await
    .unwrap();
    let t = s
        .transition(
            id,
            StateUpdate::to(SessionState::Result)
                .expecting([SessionState::Running])
                .with_response(ActionResult::success(shot)),
        )
        .await
        .unwrap();
    assert!(t.applied());
}

#[tokio::test]
async fn test_create_seeds_idle() {
    let s = seeded("a").await;
    assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Idle));
    assert!(s.exists("a").await.unwrap());
    assert_eq!(s.take_instruction("a").await.unwrap(), None);
    assert_eq!(s.take_response("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_entry() {
    let s = store();
    assert_eq!(s.read_state("nope").await.unwrap(), None);
    assert!(!s.exists("nope").await.unwrap());
    let t = s
        .transition("nope", StateUpdate::to(SessionState::Running))
        .await
        .unwrap();
    assert_eq!(t, Transition::Missing);
}

#[tokio::test]
async fn test_guard_conflict_writes_nothing() {
    let s = seeded("a").await;
    let t = s
        .transition(
            "a",
            StateUpdate::to(SessionState::Running)
                .expecting([SessionState::Result])
                .with_instruction(Instruction::Wait),
        )
        .await
        .unwrap();
    assert_eq!(
        t,
        Transition::Conflict {
            state: SessionState::Idle
        }
    );
    // The rejected write must not have leaked any field.
    assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Idle));
    assert_eq!(s.take_instruction("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_destructive_response_read_leaves_state() {
    let s = seeded("a").await;
    publish(&s, "a", "shot-1").await;

    assert_eq!(
        s.take_response("a").await.unwrap(),
        Some(ActionResult::success("shot-1"))
    );
    assert_eq!(s.take_response("a").await.unwrap(), None);
    assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Result));
}

#[tokio::test]
async fn test_single_flight_submission() {
    // Two racing Result->Running submissions: exactly one applies, the
    // other observes the Running it lost to.
    let s = seeded("a").await;
    publish(&s, "a", "shot").await;
    let s = std::sync::Arc::new(s);

    let submit = |inst: Instruction| {
        let s = s.clone();
        tokio::spawn(async move {
            s.transition(
                "a",
                StateUpdate::to(SessionState::Running)
                    .expecting([SessionState::Result])
                    .with_instruction(inst),
            )
            .await
            .unwrap()
        })
    };

    let first = submit(Instruction::Click { label: 1 });
    let second = submit(Instruction::Click { label: 2 });
    let outcomes = [first.await.unwrap(), second.await.unwrap()];

    let applied = outcomes.iter().filter(|t| t.applied()).count();
    assert_eq!(applied, 1);
    assert!(outcomes.contains(&Transition::Conflict {
        state: SessionState::Running
    }));
    // Exactly one instruction landed.
    assert!(s.take_instruction("a").await.unwrap().is_some());
    assert_eq!(s.take_instruction("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_no_double_delivery_under_concurrency() {
    let s = seeded("a").await;
    publish(&s, "a", "shot").await;
    let s = std::sync::Arc::new(s);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let s = s.clone();
        handles.push(tokio::spawn(
            async move { s.take_response("a").await.unwrap() },
        ));
    }
    let mut delivered = 0;
    for h in handles {
        if h.await.unwrap().is_some() {
            delivered += 1;
        }
    }
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn test_unguarded_fatal_from_any_state() {
    for prior in [
        SessionState::Idle,
        SessionState::Running,
        SessionState::Result,
    ] {
        let s = seeded("a").await;
        if prior != SessionState::Idle {
            s.transition(
                "a",
                StateUpdate::to(prior).expecting([SessionState::Idle]),
            )
            .await
            .unwrap();
        }
        let t = s
            .transition("a", StateUpdate::to(SessionState::Fatal).clearing_response())
            .await
            .unwrap();
        assert!(t.applied(), "fatal write rejected from {prior}");
        assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Fatal));
        assert_eq!(s.take_response("a").await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_forced_finish_writes_synthetic_instruction() {
    let s = seeded("a").await;
    publish(&s, "a", "shot").await;

    let t = s
        .transition(
            "a",
            StateUpdate::to(SessionState::Finish).with_instruction(Instruction::Finish),
        )
        .await
        .unwrap();
    assert!(t.applied());
    assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Finish));
    // A worker blocked on its instruction poll picks the Finish up naturally.
    assert_eq!(
        s.take_instruction("a").await.unwrap(),
        Some(Instruction::Finish)
    );
}

#[tokio::test]
async fn test_clear_and_write_in_one_update() {
    let s = seeded("a").await;
    publish(&s, "a", "old").await;

    // Worker finish: clear the response while moving to Finish.
    let t = s
        .transition("a", StateUpdate::to(SessionState::Finish).clearing_response())
        .await
        .unwrap();
    assert!(t.applied());
    assert_eq!(s.take_response("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_remove_makes_entry_vanish() {
    let s = seeded("a").await;
    s.remove("a").await.unwrap();
    assert!(!s.exists("a").await.unwrap());
    assert_eq!(s.read_state("a").await.unwrap(), None);
    assert_eq!(
        s.transition("a", StateUpdate::to(SessionState::Finish))
            .await
            .unwrap(),
        Transition::Missing
    );
}

#[tokio::test]
async fn test_create_resets_previous_entry() {
    let s = seeded("a").await;
    publish(&s, "a", "shot").await;
    s.create("a").await.unwrap();
    assert_eq!(s.read_state("a").await.unwrap(), Some(SessionState::Idle));
    assert_eq!(s.take_response("a").await.unwrap(), None);
}
