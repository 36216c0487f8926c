//! Integration tests for room actors and the room registry.
//!
//! Rounds are played with a board that starts completely full: the first
//! shot has nowhere to land and the game-over row is already occupied, so
//! whoever shoots first is eliminated.

use std::time::Duration;

use bubblebrawl_game::GameConfig;
use bubblebrawl_protocol::{PlayerId, RoomId, RoomSnapshot, RoomState, ServerEvent};
use bubblebrawl_room::{RoomConfig, RoomError, RoomRegistry};
use tokio::sync::mpsc;
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::Receiver<ServerEvent>;

/// Outbound queue size for players that keep up.
const INBOX: usize = 256;

const A: PlayerId = PlayerId(1);
const B: PlayerId = PlayerId(2);
const C: PlayerId = PlayerId(3);
const ROOM_1: RoomId = RoomId(1);

fn full_board() -> GameConfig {
    GameConfig {
        rows: 4,
        initial_rows: 4,
        fill_probability: 1.0,
        game_over_row: 3,
        ..GameConfig::default()
    }
}

fn registry() -> RoomRegistry {
    RoomRegistry::new(10, RoomConfig::default(), full_board())
}

async fn join(reg: &RoomRegistry, player: PlayerId, room: RoomId) -> Inbox {
    join_with_inbox(reg, player, room, INBOX).await
}

async fn join_with_inbox(
    reg: &RoomRegistry,
    player: PlayerId,
    room: RoomId,
    size: usize,
) -> Inbox {
    let (tx, rx) = mpsc::channel(size);
    reg.join(player, room, None, tx).await.unwrap();
    rx
}

/// Dummy sender whose receiver is dropped immediately.
fn dummy_sender() -> mpsc::Sender<ServerEvent> {
    mpsc::channel(1).0
}

/// Receives events until one matches, panicking after 60 s of room time.
async fn wait_for<T>(
    rx: &mut Inbox,
    mut pick: impl FnMut(ServerEvent) -> Option<T>,
) -> T {
    let deadline = Instant::now() + Duration::from_secs(60);
    loop {
        let event = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("room dropped the channel");
        if let Some(found) = pick(event) {
            return found;
        }
    }
}

fn update_room(event: ServerEvent) -> Option<RoomSnapshot> {
    match event {
        ServerEvent::UpdateRoom(snap) => Some(snap),
        _ => None,
    }
}

fn game_started(event: ServerEvent) -> Option<RoomSnapshot> {
    match event {
        ServerEvent::GameStarted(snap) => Some(snap),
        _ => None,
    }
}

fn game_over(event: ServerEvent) -> Option<Option<PlayerId>> {
    match event {
        ServerEvent::GameOver { winner } => Some(winner),
        _ => None,
    }
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_registry_creates_fixed_rooms() {
    let reg = registry();
    assert_eq!(reg.room_count(), 10);
    assert_eq!(reg.room_ids().first(), Some(&RoomId(1)));
    assert_eq!(reg.room_ids().last(), Some(&RoomId(10)));

    let list = reg.list_rooms().await;
    assert_eq!(list.len(), 10);
    assert_eq!(list[0].name, "Room 1");
    assert!(list.iter().all(|r| r.player_count == 0 && r.capacity == 10));
    assert!(list.iter().all(|r| r.state == RoomState::LobbyVoting));
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let reg = registry();
    let result = reg.join(A, RoomId(11), None, dummy_sender()).await;
    assert_eq!(result, Err(RoomError::NotFound(RoomId(11))));
    assert_eq!(reg.room_of(A).await, None);
}

#[tokio::test]
async fn test_join_sends_update_room_to_everyone() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    let snap = wait_for(&mut a, update_room).await;
    assert_eq!(snap.players.len(), 1);

    let mut b = join(&reg, B, ROOM_1).await;
    let seen_by_a = wait_for(&mut a, update_room).await;
    let seen_by_b = wait_for(&mut b, update_room).await;
    assert_eq!(seen_by_a, seen_by_b);
    assert_eq!(seen_by_a.players.len(), 2);
    assert_eq!(reg.room_of(B).await, Some(ROOM_1));
}

#[tokio::test]
async fn test_player_holds_one_seat() {
    let reg = registry();
    let _a = join(&reg, A, ROOM_1).await;
    let result = reg.join(A, RoomId(2), None, dummy_sender()).await;
    assert_eq!(result, Err(RoomError::AlreadyInRoom(A, ROOM_1)));
    assert_eq!(reg.room_info(RoomId(2)).await.unwrap().player_count, 0);
}

#[tokio::test]
async fn test_full_room_rejects_join() {
    let config = RoomConfig {
        capacity: 2,
        ..RoomConfig::default()
    };
    let reg = RoomRegistry::new(1, config, full_board());
    let _a = join(&reg, A, ROOM_1).await;
    let _b = join(&reg, B, ROOM_1).await;

    let result = reg.join(C, ROOM_1, None, dummy_sender()).await;
    assert_eq!(result, Err(RoomError::RoomFull(ROOM_1)));
    assert_eq!(reg.room_of(C).await, None, "a rejected join holds no seat");
}

#[tokio::test]
async fn test_leave_frees_the_seat() {
    let reg = registry();
    let _a = join(&reg, A, ROOM_1).await;
    assert_eq!(reg.leave(A).await, Ok(ROOM_1));
    assert_eq!(reg.room_of(A).await, None);
    assert_eq!(reg.room_info(ROOM_1).await.unwrap().player_count, 0);

    assert_eq!(reg.leave(A).await, Err(RoomError::NotSeated(A)));
    // The seat can be taken again, in any room.
    let _a = join(&reg, A, RoomId(3)).await;
}

#[tokio::test]
async fn test_room_list_published_on_join_and_leave() {
    let reg = registry();
    let mut list_rx = reg.subscribe();

    let _a = join(&reg, A, RoomId(4)).await;
    let list = list_rx.recv().await.unwrap();
    assert_eq!(list.len(), 10);
    assert_eq!(list[3].id, RoomId(4));
    assert_eq!(list[3].player_count, 1);

    reg.leave(A).await.unwrap();
    let list = list_rx.recv().await.unwrap();
    assert_eq!(list[3].player_count, 0);
}

#[tokio::test]
async fn test_snapshot_lists_seated_players() {
    let reg = registry();
    let _a = join(&reg, A, ROOM_1).await;
    let snap = reg.snapshot(ROOM_1).await.unwrap();
    assert_eq!(snap.id, ROOM_1);
    assert_eq!(snap.player(A).map(|p| p.name.as_str()), Some("Player 1"));
    assert_eq!(
        reg.snapshot(RoomId(42)).await,
        Err(RoomError::NotFound(RoomId(42)))
    );
}

#[tokio::test]
async fn test_shutdown_stops_every_room() {
    let reg = registry();
    let _a = join(&reg, A, ROOM_1).await;
    reg.shutdown().await;
    assert_eq!(reg.room_of(A).await, None);
    assert_eq!(
        reg.room_info(ROOM_1).await,
        Err(RoomError::Unavailable(ROOM_1))
    );
    assert!(reg.list_rooms().await.is_empty());
}

// =========================================================================
// Intents
// =========================================================================

#[tokio::test]
async fn test_ready_without_seat_is_rejected() {
    let reg = registry();
    assert_eq!(reg.ready(A).await, Err(RoomError::NotSeated(A)));
}

#[tokio::test]
async fn test_unseated_shot_is_dropped() {
    let reg = registry();
    assert_eq!(reg.shoot(A, -1.5).await, Ok(()));
}

#[tokio::test]
async fn test_shot_in_lobby_reports_error_to_shooter_only() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    let mut b = join(&reg, B, ROOM_1).await;
    reg.shoot(A, -1.5).await.unwrap();

    let message = wait_for(&mut a, |e| match e {
        ServerEvent::Error(msg) => Some(msg),
        _ => None,
    })
    .await;
    assert!(message.contains("LOBBY_VOTING"), "{message}");

    // B saw only the two joins.
    let mut b_events = Vec::new();
    while let Ok(event) = b.try_recv() {
        b_events.push(event);
    }
    assert!(b_events.iter().all(|e| matches!(e, ServerEvent::UpdateRoom(_))));
}

// =========================================================================
// Full round
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_two_players_round_trip_through_game_over() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    let mut b = join(&reg, B, ROOM_1).await;

    reg.ready(A).await.unwrap();
    let snap = wait_for(&mut b, |e| {
        update_room(e).filter(|s| s.player(A).is_some_and(|p| p.is_ready))
    })
    .await;
    assert_eq!(snap.state, RoomState::LobbyVoting);
    assert_eq!(snap.player(B).map(|p| p.is_ready), Some(false));

    reg.ready(B).await.unwrap();
    let started = wait_for(&mut a, game_started).await;
    assert_eq!(started.state, RoomState::InProgress);
    assert!(started.players.iter().all(|p| p.is_alive));
    assert_eq!(
        reg.room_info(ROOM_1).await.unwrap().state,
        RoomState::InProgress
    );

    // Ticks flow while the round runs.
    wait_for(&mut b, |e| match e {
        ServerEvent::GameStateUpdate(_) => Some(()),
        _ => None,
    })
    .await;

    reg.shoot(A, -1.5).await.unwrap();
    let eliminated = wait_for(&mut b, |e| match e {
        ServerEvent::PlayerEliminated { player_id } => Some(player_id),
        ServerEvent::GameOver { .. } => panic!("gameOver before playerEliminated"),
        _ => None,
    })
    .await;
    assert_eq!(eliminated, A);
    let winner = wait_for(&mut b, game_over).await;
    assert_eq!(winner, Some(B));
    let over_at = Instant::now();
    assert_eq!(
        reg.room_info(ROOM_1).await.unwrap().state,
        RoomState::GameOver
    );

    // The tick loop is gone: the next thing B hears is the lobby reset.
    let next = tokio::time::timeout(Duration::from_secs(30), b.recv())
        .await
        .unwrap()
        .unwrap();
    let lobby = update_room(next).expect("expected updateRoom after grace");
    assert!(over_at.elapsed() >= Duration::from_secs(10));
    assert_eq!(lobby.state, RoomState::LobbyVoting);
    assert!(lobby.players.iter().all(|p| p.is_alive && !p.is_ready));
}

#[tokio::test(start_paused = true)]
async fn test_slow_reader_skips_state_updates_but_gets_results() {
    let reg = registry();
    // A never reads during the round.
    let mut a = join_with_inbox(&reg, A, ROOM_1, 16).await;
    let mut b = join(&reg, B, ROOM_1).await;

    reg.ready(A).await.unwrap();
    reg.ready(B).await.unwrap();
    wait_for(&mut b, game_started).await;

    // Two seconds of ticks: far more state updates than A's queue holds.
    tokio::time::sleep(Duration::from_secs(2)).await;
    reg.shoot(B, -1.5).await.unwrap();
    assert_eq!(wait_for(&mut b, game_over).await, Some(A));

    let mut queued = Vec::new();
    while let Ok(event) = a.try_recv() {
        queued.push(event);
    }
    assert!(queued.len() <= 16, "queue overran: {}", queued.len());
    let updates = queued
        .iter()
        .filter(|e| matches!(e, ServerEvent::GameStateUpdate(_)))
        .count();
    assert!(updates <= 8, "{updates} state updates kept");
    assert!(queued.contains(&ServerEvent::PlayerEliminated { player_id: B }));
    assert!(queued.contains(&ServerEvent::GameOver { winner: Some(A) }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_rate_still_ticks() {
    let config = RoomConfig {
        tick_rate: 0,
        ..RoomConfig::default()
    };
    let reg = RoomRegistry::new(1, config, full_board());
    let mut a = join(&reg, A, ROOM_1).await;
    reg.ready(A).await.unwrap();
    wait_for(&mut a, game_started).await;

    wait_for(&mut a, |e| match e {
        ServerEvent::GameStateUpdate(_) => Some(()),
        _ => None,
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_solo_round_ends_without_winner() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    reg.ready(A).await.unwrap();
    wait_for(&mut a, game_started).await;

    reg.shoot(A, -1.0).await.unwrap();
    assert_eq!(wait_for(&mut a, game_over).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_emptied_room_returns_to_lobby_and_cancels_grace() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    reg.ready(A).await.unwrap();
    reg.shoot(A, -1.5).await.unwrap();
    wait_for(&mut a, game_over).await;

    reg.leave(A).await.unwrap();
    assert_eq!(
        reg.room_info(ROOM_1).await.unwrap().state,
        RoomState::LobbyVoting
    );

    let mut a = join(&reg, A, ROOM_1).await;
    wait_for(&mut a, update_room).await;
    let stale = tokio::time::timeout(Duration::from_secs(30), a.recv()).await;
    assert!(stale.is_err(), "cancelled grace period must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_join_mid_round_waits_for_next_round() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    let _b = join(&reg, B, ROOM_1).await;
    reg.ready(A).await.unwrap();
    reg.ready(B).await.unwrap();
    wait_for(&mut a, game_started).await;

    let mut c = join(&reg, C, ROOM_1).await;
    let snap = wait_for(&mut c, update_room).await;
    assert_eq!(snap.state, RoomState::InProgress);
    let newcomer = snap.player(C).unwrap();
    assert!(!newcomer.is_alive);
    assert!(newcomer.launcher.is_none());

    // C's shots are ignored; A's elimination still ends the round for B.
    reg.shoot(C, -1.5).await.unwrap();
    reg.shoot(A, -1.5).await.unwrap();
    assert_eq!(wait_for(&mut c, game_over).await, Some(B));
}

#[tokio::test(start_paused = true)]
async fn test_leave_mid_round_hands_win_to_survivor() {
    let reg = registry();
    let mut a = join(&reg, A, ROOM_1).await;
    let _b = join(&reg, B, ROOM_1).await;
    reg.ready(A).await.unwrap();
    reg.ready(B).await.unwrap();
    wait_for(&mut a, game_started).await;

    reg.leave(B).await.unwrap();
    assert_eq!(wait_for(&mut a, game_over).await, Some(A));
}
