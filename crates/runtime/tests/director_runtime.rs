use director_core::{
    AgentId, ItemCategory, MacroState, Rarity, TaskFlags, TelemetryEvent, TelemetrySnapshot,
};
use director_runtime::{
    AgentEvent, DirectorEvent, DirectorRuntime, Event, Topic, UpgradeOffer,
};
use glam::Vec2;

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn combined_director_publishes_directives_and_behaviors() {
    let runtime = DirectorRuntime::builder()
        .build()
        .await
        .expect("runtime should build with embedded content");
    let handle = runtime.handle();
    let mut director_rx = runtime.subscribe(Topic::Director);
    let mut agents_rx = runtime.subscribe(Topic::Agents);

    for id in 0..6 {
        handle
            .register_agent(AgentId(id), Vec2::new(id as f32 * 2.0, 5.0))
            .await
            .expect("register");
    }

    let telemetry = TelemetrySnapshot::new(90.0, 100.0).with_position(Vec2::new(0.0, 0.0));
    for _ in 0..40 {
        handle
            .record(TelemetryEvent::DamageDealt(12.0))
            .await
            .expect("record");
        handle.tick(0.1, telemetry.clone()).await.expect("tick");
    }

    let directives: Vec<_> = drain(&mut director_rx)
        .into_iter()
        .filter(|e| matches!(e, Event::Director(DirectorEvent::DirectiveIssued { .. })))
        .collect();
    assert!(!directives.is_empty(), "expected at least one directive");

    let broadcasts: Vec<_> = drain(&mut agents_rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::Agents(AgentEvent::BehaviorBroadcast {
                behavior, agents, ..
            }) => Some((behavior, agents)),
            _ => None,
        })
        .collect();
    let (last_behavior, agents) = *broadcasts.last().expect("expected a behavior broadcast");
    assert_eq!(agents, 6);

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.behavior, last_behavior);
    assert_eq!(snapshot.agents_alive, 6);
    assert!(snapshot.directive.is_some());
    assert!((0.0..=1.0).contains(&snapshot.escalation));
    assert!(snapshot.curse_multiplier >= 1.0);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn deaths_are_penalized_in_group_reward() {
    let runtime = DirectorRuntime::builder().build().await.expect("build");
    let handle = runtime.handle();
    handle
        .set_tasks(TaskFlags::GROUP_REWARD)
        .await
        .expect("set tasks");

    handle.register_agent(AgentId(1), Vec2::ZERO).await.unwrap();
    handle.register_agent(AgentId(2), Vec2::ONE).await.unwrap();
    handle.agent_hit(AgentId(1)).await.unwrap();
    handle.agent_death(AgentId(1)).await.unwrap();
    handle.agent_death(AgentId(2)).await.unwrap();
    // Second death of the same agent is ignored, as is a hit from a dead one.
    handle.agent_death(AgentId(2)).await.unwrap();
    handle.agent_hit(AgentId(2)).await.unwrap();

    let report = handle
        .tick(2.0, TelemetrySnapshot::new(100.0, 100.0))
        .await
        .expect("tick");

    // No survivors, one hit, two deaths: 1 - 2 * 2.
    let reward = report.group_reward.expect("reward task should fire");
    assert!((reward + 3.0).abs() < 1e-5);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn standalone_planner_waits_for_confirmation() {
    let runtime = DirectorRuntime::builder().build().await.expect("build");
    let handle = runtime.handle();
    handle.set_tasks(TaskFlags::MDP).await.expect("set tasks");
    let mut director_rx = runtime.subscribe(Topic::Director);

    // Full HP and no incoming damage reads as Dominating.
    let telemetry = TelemetrySnapshot::new(100.0, 100.0);
    let mut first_directive = None;
    for tick in 1..=15 {
        let report = handle.tick(0.1, telemetry.clone()).await.expect("tick");
        if report.directive.is_some() && first_directive.is_none() {
            first_directive = Some(tick);
        }
    }

    let tick = first_directive.expect("a directive after confirmation");
    assert!(tick > 5, "directive issued before confirmation at tick {tick}");

    let events = drain(&mut director_rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::Director(DirectorEvent::DirectiveIssued { .. })))
    );
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.observed_state, MacroState::Dominating);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn stale_telemetry_issues_nothing() {
    let runtime = DirectorRuntime::builder().build().await.expect("build");
    let handle = runtime.handle();
    handle.register_agent(AgentId(1), Vec2::ZERO).await.unwrap();

    for _ in 0..50 {
        let report = handle
            .tick(0.1, TelemetrySnapshot::default())
            .await
            .expect("tick");
        assert!(!report.has_signal);
        assert!(report.directive.is_none());
        assert!(report.behavior.is_none());
    }

    let pending = handle.drain_requests().await.expect("drain");
    assert!(pending.is_empty());

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn upgrade_draws_respect_count() {
    let runtime = DirectorRuntime::builder().build().await.expect("build");
    let handle = runtime.handle();

    let pool = vec![
        UpgradeOffer::new("Kunai", Some(ItemCategory::Brutality), Rarity::Common),
        UpgradeOffer::new("Armor", Some(ItemCategory::Survival), Rarity::Rare),
        UpgradeOffer::new("Time Piece", Some(ItemCategory::Tactics), Rarity::Uncommon),
    ];
    let picks = handle
        .choose_upgrades(pool.clone(), Some(2))
        .await
        .expect("choose");
    assert_eq!(picks.len(), 2);
    assert_ne!(picks[0].name, picks[1].name);
    assert!(picks.iter().all(|p| pool.contains(p)));

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn worker_serves_remaining_clones() {
    let runtime = DirectorRuntime::builder().build().await.expect("build");
    let handle = runtime.handle();
    let clone = handle.clone();
    drop(handle);

    clone
        .tick(0.1, TelemetrySnapshot::new(50.0, 100.0))
        .await
        .expect("tick while a clone is alive");
    drop(clone);
    runtime.shutdown().await.expect("shutdown");
}
