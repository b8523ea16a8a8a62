//! Prediction/reconciliation scenarios driven through the public client API.

use arena_client::{
    input::{Buttons, InputState},
    reconcile::Correction,
    GameClient,
};
use arena_shared::{
    action::ActionMsg,
    collision::{EmptyMap, TileGrid},
    config::GameConfig,
    ecs::EntityId,
    event::ImpactEffect,
    math::Vec2,
    net::{EntityEvent, PlayerAttrs, ServerMsg},
};
use arena_tests::{game_room, LoopbackAuthority};

fn config(speed: f32) -> GameConfig {
    GameConfig {
        player_speed: speed,
        ..GameConfig::default()
    }
}

fn spawn(cfg: &GameConfig, at: Vec2) -> anyhow::Result<(GameClient, LoopbackAuthority)> {
    let me = EntityId::from("me");
    let mut client = GameClient::new(cfg.clone(), me.clone(), Box::new(EmptyMap))?;
    let authority = LoopbackAuthority::new(cfg, me, at);
    client.handle(authority.join_msg());
    client.handle(game_room("crypt", 4));
    Ok((client, authority))
}

fn local_update(x: f32, y: f32, ack: u64) -> ServerMsg {
    ServerMsg::Player(EntityEvent::Update {
        id: "me".into(),
        attrs: PlayerAttrs {
            x,
            y,
            radius: 12.0,
            rotation: 0.0,
            name: "Player".to_string(),
            lives: 3,
            max_lives: 3,
            kills: 0,
            ack: Some(ack),
        },
    })
}

fn held(buttons: Buttons) -> InputState {
    InputState::new(buttons, 0.0)
}

#[test]
fn two_moves_then_partial_ack_snaps_to_replayed_ghost() -> anyhow::Result<()> {
    let cfg = config(5.0);
    let (mut client, _) = spawn(&cfg, Vec2::ZERO)?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();

    client.tick(&held(Buttons::RIGHT), 100, &mut sent, &mut fx);
    client.tick(&held(Buttons::RIGHT), 116, &mut sent, &mut fx);
    assert_eq!(client.store.local().unwrap().position, Vec2::new(10.0, 0.0));

    client.handle(local_update(4.0, 0.0, 100));

    let pending: Vec<u64> = client.reconciler().log().pending().map(|a| a.ts).collect();
    assert_eq!(pending, [116]);
    assert_eq!(client.store.ghost.as_ref().unwrap().position, Vec2::new(9.0, 0.0));
    assert_eq!(client.store.local().unwrap().position, Vec2::new(9.0, 0.0));
    Ok(())
}

#[test]
fn acking_everything_converges_exactly() -> anyhow::Result<()> {
    let cfg = config(3.5);
    let (mut client, mut authority) = spawn(&cfg, Vec2::new(40.0, 40.0))?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();

    let script = [
        Buttons::RIGHT,
        Buttons::RIGHT | Buttons::DOWN,
        Buttons::DOWN,
        Buttons::LEFT | Buttons::UP,
        Buttons::UP,
    ];
    for (i, buttons) in script.iter().enumerate() {
        client.tick(&held(*buttons), 1000 + i as u64 * 16, &mut sent, &mut fx);
    }
    let predicted = client.store.local().unwrap().position;

    let update = authority.receive_all(sent.drain(..))?;
    client.handle(update);

    let ghost = client.store.ghost.as_ref().unwrap().position;
    assert_eq!(ghost, authority.position());
    assert_eq!(client.store.local().unwrap().position, ghost);
    assert_eq!(predicted.distance(ghost), 0.0);
    assert!(client.reconciler().log().is_empty());
    Ok(())
}

#[test]
fn divergent_authority_wins_and_pending_moves_are_replayed() -> anyhow::Result<()> {
    let cfg = config(2.0);
    let (mut client, authority) = spawn(&cfg, Vec2::ZERO)?;
    let mut authority = authority.with_bias(Vec2::new(0.0, 1.0));
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();

    for ts in [10, 20, 30, 40] {
        client.tick(&held(Buttons::RIGHT), ts, &mut sent, &mut fx);
    }
    // The server has only seen the first two moves.
    let first_two: Vec<ActionMsg> = sent.drain(..2).collect();
    let update = authority.receive_all(first_two)?;
    client.handle(update);

    // Authority: (4, 2); two pending moves replay to (8, 2).
    assert_eq!(authority.position(), Vec2::new(4.0, 2.0));
    assert_eq!(client.store.local().unwrap().position, Vec2::new(8.0, 2.0));
    assert_eq!(client.reconciler().log().len(), 2);
    Ok(())
}

#[test]
fn ack_between_entries_prunes_best_prefix() -> anyhow::Result<()> {
    let cfg = config(1.0);
    let (mut client, _) = spawn(&cfg, Vec2::ZERO)?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();
    for ts in [100, 200, 300] {
        client.tick(&held(Buttons::DOWN), ts, &mut sent, &mut fx);
    }

    client.handle(local_update(0.0, 2.0, 250));
    let pending: Vec<u64> = client.reconciler().log().pending().map(|a| a.ts).collect();
    assert_eq!(pending, [300]);
    assert_eq!(client.store.local().unwrap().position, Vec2::new(0.0, 3.0));
    Ok(())
}

#[test]
fn stale_ack_is_ignored() -> anyhow::Result<()> {
    let cfg = config(1.0);
    let (mut client, _) = spawn(&cfg, Vec2::ZERO)?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();
    for ts in 1..=6 {
        client.tick(&held(Buttons::RIGHT), ts, &mut sent, &mut fx);
    }

    client.handle(local_update(5.0, 0.0, 5));
    client.handle(local_update(3.0, 0.0, 3));

    assert_eq!(client.reconciler().last_ack(), Some(5));
    assert_eq!(client.reconciler().log().len(), 1);
    assert_eq!(client.store.local().unwrap().position, Vec2::new(6.0, 0.0));
    Ok(())
}

#[test]
fn duplicate_ack_keeps_position_but_refreshes_lives() -> anyhow::Result<()> {
    let cfg = config(1.0);
    let (mut client, mut authority) = spawn(&cfg, Vec2::ZERO)?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();
    client.tick(&held(Buttons::RIGHT), 50, &mut sent, &mut fx);
    client.handle(authority.receive_all(sent.drain(..))?);

    client.tick(&held(Buttons::RIGHT), 66, &mut sent, &mut fx);
    authority.attrs_mut().lives = 1;
    authority.attrs_mut().x = -100.0;
    client.handle(authority.update_msg());

    let local = client.store.local().unwrap();
    assert_eq!(local.lives, 1);
    assert_eq!(local.position, Vec2::new(2.0, 0.0));
    Ok(())
}

#[test]
fn empty_replay_matches_authority_exactly() -> anyhow::Result<()> {
    let mut rec = arena_client::reconcile::Reconciler::new(
        arena_shared::physics::MoveRules { speed: 5.0, dt: 1.0 },
        false,
    );
    let cfg = config(5.0);
    let (mut client, _) = spawn(&cfg, Vec2::ZERO)?;
    let mut ghost = client.store.ghost.clone().unwrap();
    let predicted = client.store.local_mut().unwrap();

    let ServerMsg::Player(EntityEvent::Update { attrs, .. }) = local_update(7.25, -3.5, 1) else {
        unreachable!();
    };
    let c = rec.on_authoritative_update(&attrs, &mut ghost, predicted, None);
    assert!(matches!(c, Correction::Replayed { replayed: 0, .. }));
    assert_eq!(ghost.position, Vec2::new(7.25, -3.5));
    Ok(())
}

#[test]
fn local_removal_drops_ghost_and_log() -> anyhow::Result<()> {
    let cfg = config(1.0);
    let (mut client, _) = spawn(&cfg, Vec2::ZERO)?;
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();
    client.tick(&held(Buttons::RIGHT), 5, &mut sent, &mut fx);

    client.handle(ServerMsg::Player(EntityEvent::Remove { id: "me".into() }));
    assert!(client.store.local().is_none());
    assert!(client.store.ghost.is_none());
    assert!(client.reconciler().log().is_empty());

    // Input without a local actor is a no-op.
    let report = client.tick(&held(Buttons::RIGHT), 6, &mut sent, &mut fx);
    assert_eq!(report.actions_sent, 0);
    Ok(())
}

fn corridor() -> TileGrid {
    TileGrid::from_rows(&["#####", "#...#", "#####"], 10.0)
}

#[test]
fn wall_blocks_prediction_and_replay_alike() -> anyhow::Result<()> {
    let cfg = config(4.0);
    let me = EntityId::from("me");
    let mut client = GameClient::new(cfg.clone(), me.clone(), Box::new(corridor()))?;
    let mut authority = LoopbackAuthority::new(&cfg, me, Vec2::new(25.0, 15.0)).with_map(corridor());
    authority.attrs_mut().radius = 3.0;
    client.handle(authority.join_msg());
    client.handle(game_room("crypt", 4));
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();

    for ts in 100..110 {
        client.tick(&held(Buttons::RIGHT), ts, &mut sent, &mut fx);
    }
    // Stops flush against the wall tile at x=40.
    let stopped = Vec2::new(37.0, 15.0);
    assert_eq!(client.store.local().unwrap().position, stopped);

    // Only the first move is acked; nine walled moves are replayed.
    let first: Vec<ActionMsg> = sent.drain(..1).collect();
    client.handle(authority.receive_all(first)?);
    assert_eq!(authority.position(), Vec2::new(29.0, 15.0));
    assert_eq!(client.reconciler().log().len(), 9);
    assert_eq!(client.store.ghost.as_ref().unwrap().position, stopped);
    assert_eq!(client.store.local().unwrap().position, stopped);

    client.handle(authority.receive_all(sent.drain(..))?);
    assert_eq!(authority.position(), stopped);
    assert_eq!(client.store.ghost.as_ref().unwrap().position, stopped);
    assert!(client.reconciler().log().is_empty());
    Ok(())
}

#[test]
fn replay_can_opt_out_of_walls() -> anyhow::Result<()> {
    let cfg = GameConfig {
        wall_aware_replay: false,
        ..config(4.0)
    };
    let me = EntityId::from("me");
    let mut client = GameClient::new(cfg.clone(), me.clone(), Box::new(corridor()))?;
    let mut authority = LoopbackAuthority::new(&cfg, me, Vec2::new(25.0, 15.0));
    authority.attrs_mut().radius = 3.0;
    client.handle(authority.join_msg());
    let mut sent: Vec<ActionMsg> = Vec::new();
    let mut fx: Vec<ImpactEffect> = Vec::new();

    for ts in 100..104 {
        client.tick(&held(Buttons::RIGHT), ts, &mut sent, &mut fx);
    }
    // Prediction still respects the wall.
    assert_eq!(client.store.local().unwrap().position, Vec2::new(37.0, 15.0));

    // Replay of the three pending moves ignores it, and the actor snaps there.
    let first: Vec<ActionMsg> = sent.drain(..1).collect();
    client.handle(authority.receive_all(first)?);
    assert_eq!(client.store.local().unwrap().position, Vec2::new(41.0, 15.0));
    Ok(())
}
