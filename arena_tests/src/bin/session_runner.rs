//! Headless session runner.
//!
//! Usage:
//!   cargo run -p arena_tests --bin session_runner -- [--config game.json] [--frames 300] [--lag-ms 80]
//!
//! Drives a `GameClient` against the loopback authority over channels with
//! jittered latency, then prints the final HUD stats as JSON.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use arena_client::{
    input::{Buttons, InputState},
    GameClient,
};
use arena_shared::{
    action::ActionMsg,
    collision::TileGrid,
    config::GameConfig,
    event::{EventBus, ImpactEffect},
    math::Vec2,
    net::{EntityEvent, MonsterAttrs, ServerMsg},
    time::{Clock, SystemClock},
};
use arena_tests::{game_room, LoopbackAuthority};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const ARENA: [&str; 10] = [
    "############",
    "#..........#",
    "#..........#",
    "#....##....#",
    "#..........#",
    "#..........#",
    "#....##....#",
    "#..........#",
    "#..........#",
    "############",
];
const TILE_SIZE: f32 = 32.0;

struct RunnerArgs {
    config: Option<PathBuf>,
    frames: u64,
    lag_ms: u64,
}

fn parse_args() -> RunnerArgs {
    let mut out = RunnerArgs {
        config: None,
        frames: 300,
        lag_ms: 80,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                out.frames = args[i + 1].parse().unwrap_or(out.frames);
                i += 2;
            }
            "--lag-ms" if i + 1 < args.len() => {
                out.lag_ms = args[i + 1].parse().unwrap_or(out.lag_ms);
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

/// Square walk with a slowly sweeping aim, trigger held.
fn scripted_input(frame: u64) -> InputState {
    let buttons = match (frame / 30) % 4 {
        0 => Buttons::RIGHT,
        1 => Buttons::DOWN,
        2 => Buttons::LEFT,
        _ => Buttons::UP,
    };
    let aim = (frame / 15) as f32 * 0.25;
    InputState::new(buttons | Buttons::SHOOT, aim)
}

fn monster_update(step: u32) -> ServerMsg {
    let angle = step as f32 * 0.2;
    let at = Vec2::new(192.0, 160.0).add(Vec2::from_angle(angle).scale(64.0));
    ServerMsg::Monster(EntityEvent::Update {
        id: "m1".into(),
        attrs: MonsterAttrs {
            x: at.x,
            y: at.y,
            rotation: angle,
        },
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = match &args.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("load {}", path.display()))?,
        None => GameConfig::default(),
    };
    info!(frames = args.frames, lag_ms = args.lag_ms, "Starting session");

    let map = TileGrid::from_rows(&ARENA, TILE_SIZE);
    let authority =
        LoopbackAuthority::new(&cfg, "local".into(), Vec2::new(96.0, 96.0)).with_map(map.clone());
    let mut client = GameClient::new(cfg.clone(), "local".into(), Box::new(map))?;
    client.handle(authority.join_msg());
    client.handle(game_room("loopback", 4));
    client.handle(ServerMsg::Monster(EntityEvent::Add {
        id: "m1".into(),
        attrs: MonsterAttrs {
            x: 256.0,
            y: 160.0,
            rotation: 0.0,
        },
    }));

    let (mut action_tx, mut action_rx) = mpsc::unbounded_channel::<ActionMsg>();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<ServerMsg>();

    // Authority: apply each action, deliver the update after simulated latency.
    let lag_ms = args.lag_ms;
    let authority_tx = update_tx.clone();
    let authority_task = tokio::spawn(async move {
        let mut authority = authority;
        while let Some(msg) = action_rx.recv().await {
            authority.receive(msg)?;
            let delay = {
                let mut rng = rand::thread_rng();
                lag_ms + rng.gen_range(0..=lag_ms / 4)
            };
            let update = authority.update_msg();
            let tx = authority_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                if tx.send(update).is_err() {
                    warn!(delay, "Client gone, authoritative update dropped");
                }
            });
        }
        Ok::<_, anyhow::Error>(authority)
    });

    // World: the monster circles the middle of the arena.
    let world_tx = update_tx;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        let mut step = 0u32;
        loop {
            interval.tick().await;
            if world_tx.send(monster_update(step)).is_err() {
                break;
            }
            step += 1;
        }
    });

    let clock = SystemClock;
    let mut fx = EventBus::default();
    let frame_ms = (cfg.frame_interval_ms.round() as u64).max(1);
    let mut interval = tokio::time::interval(Duration::from_millis(frame_ms));
    for frame in 0..args.frames {
        interval.tick().await;
        while let Ok(msg) = update_rx.try_recv() {
            client.handle(msg);
        }

        let report = client.tick(&scripted_input(frame), clock.now_ms(), &mut action_tx, &mut fx);
        for (bullet, outcome) in &report.bullet_hits {
            info!(frame, %bullet, ?outcome, "Bullet hit");
        }
        for effect in fx.drain::<ImpactEffect>() {
            debug!(x = effect.at.x, y = effect.at.y, color = effect.color, "Impact");
        }
    }

    // Let in-flight updates land before reporting.
    drop(action_tx);
    let authority = authority_task.await??;
    tokio::time::sleep(Duration::from_millis(lag_ms + lag_ms / 4 + 10)).await;
    while let Ok(msg) = update_rx.try_recv() {
        client.handle(msg);
    }

    let residual = match (client.store.local(), client.store.ghost.as_ref()) {
        (Some(local), Some(ghost)) => local.position.distance(ghost.position),
        _ => 0.0,
    };
    info!(
        processed = authority.processed(),
        pending = client.reconciler().log().len(),
        residual,
        "Session finished"
    );

    println!("{}", serde_json::to_string_pretty(&client.stats())?);
    Ok(())
}
