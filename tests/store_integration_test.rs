// Integration tests for the notification store public API
// Simulated time throughout: the paused tokio clock stands in for wall time

use std::time::Duration;

use proptest::prelude::*;
use toastq::notifications::{
    IdStrategy, NotificationConfig, NotificationContext, NotificationError, NotificationId,
    NotificationKind, NotificationStore, RemovalReason, StoreEvent,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

async fn advance(millis: u64) {
    tokio::time::advance(ms(millis)).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_context_lifecycle() {
    let context = NotificationContext::new();
    assert_eq!(context.store().unwrap_err(), NotificationError::NotInitialized);

    let config = NotificationConfig { default_ttl_ms: 40, ..NotificationConfig::default() };
    context.install(config.build_store().unwrap()).unwrap();

    let store = context.store().unwrap();
    let id = store.add(NotificationKind::Info, "Synced", "3 files");
    assert!(store.contains(&id));
    assert!(store.has_armed_timer(&id));

    advance(41).await;
    assert!(store.is_empty());

    context.shutdown();
    assert_eq!(store.timer_stats().armed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_leaves_others_in_order() {
    let store = NotificationStore::new().unwrap();
    let a = store.add_with_ttl(NotificationKind::Success, "A", "", ms(300));
    let b = store.add_with_ttl(NotificationKind::Error, "B", "", ms(100));
    let c = store.add_with_ttl(NotificationKind::Warning, "C", "", Duration::ZERO);

    let ids: Vec<NotificationId> = store.list().iter().map(|n| n.id().clone()).collect();
    assert_eq!(ids, vec![a.clone(), b.clone(), c.clone()]);

    advance(150).await;
    let ids: Vec<NotificationId> = store.list().iter().map(|n| n.id().clone()).collect();
    assert_eq!(ids, vec![a, c.clone()]);

    advance(10_000).await;
    let ids: Vec<NotificationId> = store.list().iter().map(|n| n.id().clone()).collect();
    assert_eq!(ids, vec![c]);
}

#[tokio::test(start_paused = true)]
async fn test_event_feed_reports_every_change() {
    let store = NotificationStore::new().unwrap();
    let mut events = store.subscribe();

    let first = store.add_with_ttl(NotificationKind::Info, "First", "", ms(20));
    let second = store.add_with_ttl(NotificationKind::Info, "Second", "", Duration::ZERO);
    let third = store.add_with_ttl(NotificationKind::Info, "Third", "", Duration::ZERO);
    store.remove(&second);
    advance(25).await;
    store.clear_all();

    let mut labels = Vec::new();
    while let Ok(event) = events.try_recv() {
        match &event {
            StoreEvent::Removed { id, reason: RemovalReason::Expired } => assert_eq!(id, &first),
            StoreEvent::Removed { id, reason: RemovalReason::Dismissed } => assert_eq!(id, &second),
            StoreEvent::Cleared { ids } => assert_eq!(ids, &vec![third.clone()]),
            StoreEvent::Added { .. } => {}
        }
        labels.push(event.label());
    }
    assert_eq!(labels, vec!["added", "added", "added", "dismissed", "expired", "cleared"]);
}

#[tokio::test(start_paused = true)]
async fn test_uuid_ids_are_unique() {
    let config = NotificationConfig { id_strategy: IdStrategy::Uuid, ..NotificationConfig::default() };
    let store = config.build_store().unwrap();

    let ids: Vec<NotificationId> = (0..50)
        .map(|i| store.add(NotificationKind::Info, format!("n{}", i), ""))
        .collect();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 50);
    assert!(!ids[0].as_str().starts_with("toast-"));
}

#[test]
fn test_store_outside_runtime_fails_fast() {
    assert!(matches!(NotificationStore::new(), Err(NotificationError::NoRuntime(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_remove_races_expiry_exactly_once() {
    let store = NotificationStore::new().unwrap();
    let ids: Vec<NotificationId> = (0..100)
        .map(|i| store.add_with_ttl(NotificationKind::Info, format!("n{}", i), "", ms(5)))
        .collect();

    tokio::time::sleep(ms(4)).await;
    for id in &ids {
        store.remove(id);
    }
    tokio::time::sleep(ms(50)).await;

    assert!(store.is_empty());
    let stats = store.timer_stats();
    assert_eq!(stats.armed, 0);
    assert_eq!(stats.fired + stats.cancelled, 100);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Remove(usize),
    Clear,
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..4).prop_map(Op::Add),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => Just(Op::Clear),
        3 => (0u64..4).prop_map(Op::Advance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_list_tracks_adds_minus_removals(ops in prop::collection::vec(op_strategy(), 0..10)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = NotificationStore::new().unwrap();
            // (id, absolute deadline in ms); ttls are whole tens of ms and every
            // advance adds 3ms, so no deadline lands on an observation point
            let mut model: Vec<(NotificationId, Option<u64>)> = Vec::new();
            let mut now = 0u64;

            for op in ops {
                match op {
                    Op::Add(tens) => {
                        let ttl = tens * 10;
                        let id = store.add_with_ttl(NotificationKind::Info, "p", "", ms(ttl));
                        model.push((id, (ttl > 0).then_some(now + ttl)));
                    }
                    Op::Remove(index) => {
                        if !model.is_empty() {
                            let (id, _) = model.remove(index % model.len());
                            store.remove(&id);
                        }
                    }
                    Op::Clear => {
                        store.clear_all();
                        model.clear();
                    }
                    Op::Advance(tens) => {
                        let step = tens * 10 + 3;
                        advance(step).await;
                        now += step;
                        model.retain(|(_, deadline)| deadline.map_or(true, |d| d > now));
                    }
                }

                let actual: Vec<NotificationId> = store.list().iter().map(|n| n.id().clone()).collect();
                let expected: Vec<NotificationId> = model.iter().map(|(id, _)| id.clone()).collect();
                assert_eq!(actual, expected);
                assert_eq!(store.timer_stats().armed, model.iter().filter(|(_, d)| d.is_some()).count());
            }
        });
    }
}
