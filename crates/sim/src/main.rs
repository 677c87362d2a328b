//! Headless director simulation.
//!
//! Drives a synthetic player and agent population through the director
//! runtime at a fixed step and logs every directive and behavior broadcast.
//!
//! # Examples
//!
//! ```bash
//! # Ten simulated minutes with the default configuration
//! cargo run -p director-sim
//!
//! # Short run with a custom config, logging to a file
//! DIRECTOR_CONFIG=director.toml SIM_DURATION_SECS=120 DIRECTOR_LOG_DIR=logs \
//!     cargo run -p director-sim
//! ```

mod config;
mod world;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use director_content::ItemCatalogLoader;
use director_runtime::{
    AgentEvent, DirectorEvent, DirectorHandle, DirectorRuntime, Event, FileProfileRepository,
    RuntimeConfig, Topic,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::SimConfig;
use crate::world::World;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = SimConfig::from_env()?;
    setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting director simulation");
    tracing::info!(
        "Duration: {}s at {}s per tick, {} agents, seed {}",
        config.duration_secs,
        config.tick_secs,
        config.agents,
        config.seed
    );

    let repository = match &config.profile_dir {
        Some(dir) => FileProfileRepository::new(dir)?,
        None => FileProfileRepository::in_default_dir()?,
    };
    tracing::info!("Profiles: {}", repository.base_dir().display());

    let runtime = DirectorRuntime::builder()
        .config(RuntimeConfig {
            director: config.director.clone(),
            ..RuntimeConfig::default()
        })
        .repository(Arc::new(repository))
        .build()
        .await?;

    let listener = spawn_event_logger(&runtime.handle());
    let handle = runtime.handle();
    let summary = run(&config, &handle).await;
    drop(handle);

    runtime.shutdown().await?;
    if let Err(e) = listener.await {
        tracing::warn!("Event logger stopped abnormally: {}", e);
    }

    summary?;
    tracing::info!("Simulation complete");
    Ok(())
}

async fn run(config: &SimConfig, handle: &DirectorHandle) -> Result<()> {
    let catalog = ItemCatalogLoader::embedded()?;
    let mut world = World::new(config.seed, catalog);
    let dt = config.tick_secs;

    handle.start_run(config.continue_run).await?;
    world.spawn(config.agents);

    let mut since_upgrade = 0.0;
    let mut directives = 0u32;
    for step in 0..config.steps() {
        let frame = world.step(dt);
        for (id, position) in frame.spawned {
            handle.register_agent(id, position).await?;
        }
        for (id, position) in frame.moved {
            handle.move_agent(id, position).await?;
        }
        for id in frame.hits {
            handle.agent_hit(id).await?;
        }
        for event in frame.telemetry {
            handle.record(event).await?;
        }
        for &id in &frame.deaths {
            handle.agent_death(id).await?;
        }

        let report = handle.tick(dt, world.telemetry()).await?;
        if report.directive.is_some() {
            directives += 1;
        }

        // Deaths are counted by the reward task; the roster can forget them now.
        for id in frame.deaths {
            handle.unregister_agent(id).await?;
        }

        let pending = handle.drain_requests().await?;
        for wave in &pending.waves {
            tracing::debug!("Spawning {} wave ({})", wave.difficulty, wave.phase);
            world.spawn_wave(wave.difficulty);
        }
        for event in &pending.events {
            tracing::info!("Scripted {} event requested ({})", event.difficulty, event.phase);
        }

        since_upgrade += dt;
        if since_upgrade >= config.upgrade_interval_secs {
            since_upgrade = 0.0;
            let picks = handle.choose_upgrades(world.upgrade_pool(), Some(3)).await?;
            if let Some(pick) = picks.first() {
                tracing::info!("Level up: {} ({})", pick.name, pick.rarity);
                if let Some(event) = world.take_upgrade(pick) {
                    handle.record(event).await?;
                }
            }
        }

        if step % 600 == 0 {
            tracing::info!(
                "t={:.0}s hp={:.0} agents={}",
                step as f32 * dt,
                world.hp(),
                world.alive()
            );
        }
    }

    let snapshot = handle.snapshot().await?;
    tracing::info!(
        "Run finished: state={} escalation={:.2} curse=x{:.2} directives={} kills={}",
        snapshot.macro_state,
        snapshot.escalation,
        snapshot.curse_multiplier,
        directives,
        snapshot.profile.total_kills
    );

    if let Some(profile) = handle.end_run(true).await? {
        tracing::info!("Profile saved (replays={})", profile.replay_count);
    }
    Ok(())
}

/// Logs director and agent events until the runtime shuts down.
fn spawn_event_logger(handle: &DirectorHandle) -> JoinHandle<()> {
    let mut receivers = handle.subscribe_multiple(&[Topic::Director, Topic::Agents]);
    let director_rx = receivers.remove(&Topic::Director);
    let agents_rx = receivers.remove(&Topic::Agents);

    tokio::spawn(async move {
        let (Some(mut director_rx), Some(mut agents_rx)) = (director_rx, agents_rx) else {
            return;
        };
        let mut director_open = true;
        let mut agents_open = true;

        while director_open || agents_open {
            tokio::select! {
                result = director_rx.recv(), if director_open => {
                    director_open = log_event(result);
                }
                result = agents_rx.recv(), if agents_open => {
                    agents_open = log_event(result);
                }
            }
        }
    })
}

/// Returns false once the channel is closed.
fn log_event(result: Result<Event, RecvError>) -> bool {
    match result {
        Ok(Event::Director(DirectorEvent::DirectiveIssued {
            directive,
            session_time,
            escalation,
        })) => {
            tracing::info!(
                "[{:.1}s] directive: target={} wave={} loot={} curse={:+.2} escalation={:.2}",
                session_time,
                directive.target_state,
                directive.wave_type,
                directive.loot_bias,
                directive.curse_adjustment,
                escalation
            );
            true
        }
        Ok(Event::Director(DirectorEvent::MacroStateCommitted {
            from,
            to,
            session_time,
        })) => {
            tracing::info!("[{:.1}s] macro state {} -> {}", session_time, from, to);
            true
        }
        Ok(Event::Agents(AgentEvent::BehaviorBroadcast {
            behavior,
            agents,
            session_time,
        })) => {
            tracing::info!("[{:.1}s] behavior {} for {} agents", session_time, behavior, agents);
            true
        }
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!("Event logger lagged, skipped {} events", skipped);
            true
        }
        Err(RecvError::Closed) => false,
    }
}

/// Log to stderr, or to `sim.log` under `log_dir` when one is configured.
fn setup_logging(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "sim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking_file)
                        .with_ansi(false),
                )
                .init();

            // Leak the guard to keep file writer alive
            std::mem::forget(guard);
            tracing::info!("Log file: {}/sim.log", dir.display());
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}
