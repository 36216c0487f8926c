//! Per-connection handler: welcome, intent routing, and room fan-out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Send `welcome` with the assigned player id, then the room list
//!   2. Loop over inbound frames, room events, room-list updates, and
//!      the idle timer
//!   3. On close or idle timeout, raise [`Intent::Disconnect`] to give up
//!      the player's seat

use std::sync::Arc;

use bubblebrawl_protocol::{
    ClientEvent, Codec, Envelope, Intent, JsonCodec, PlayerId, ServerEvent,
};
use bubblebrawl_room::{RoomError, RoomHandle};
use bubblebrawl_transport::{Connection, WebSocketConnection};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::BubbleBrawlError;
use crate::server::ServerState;

/// Drop guard that frees the player's seat if the handler exits early.
///
/// Covers errors and panics; a normal exit disarms it and leaves through
/// [`Intent::Disconnect`]. `Drop` is synchronous, so the async leave is
/// spawned.
struct SeatGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
    armed: bool,
}

impl SeatGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Ok(room_id) = state.registry.leave(player_id).await {
                tracing::info!(%player_id, %room_id, "player left on disconnect");
            }
        });
    }
}

/// Writes envelopes to one connection, numbering them as it goes.
struct Outbox<'a> {
    conn: &'a WebSocketConnection,
    codec: &'a JsonCodec,
    seq: u64,
    start: Instant,
}

impl Outbox<'_> {
    async fn send(&mut self, message: ServerEvent) -> Result<(), BubbleBrawlError> {
        let envelope = Envelope {
            seq: next_seq(&mut self.seq),
            timestamp: self.start.elapsed().as_millis() as u64,
            message,
        };
        let bytes = self.codec.encode_envelope(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), BubbleBrawlError> {
    let player_id = PlayerId(conn.id().into_inner());
    tracing::info!(%player_id, peer = %conn.peer_addr(), "player connected");

    let mut guard = SeatGuard {
        player_id,
        state: Arc::clone(&state),
        armed: true,
    };

    // Room actors write here; this task owns the socket's write half.
    let (events_tx, mut events_rx) = mpsc::channel(state.outbound_buffer);
    // The room this player sits in, once a join succeeds.
    let mut seat: Option<RoomHandle> = None;
    let mut room_list = state.registry.subscribe();

    let mut outbox = Outbox {
        conn: &conn,
        codec: &state.codec,
        seq: 1,
        start: Instant::now(),
    };
    outbox.send(ServerEvent::Welcome { player_id }).await?;
    outbox
        .send(ServerEvent::RoomListUpdate(state.registry.list_rooms().await))
        .await?;

    let idle = tokio::time::sleep(state.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            received = conn.recv() => {
                let data = match received {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };

                let event = match state.codec.decode_event(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode event");
                        outbox.send(ServerEvent::Error(e.to_string())).await?;
                        continue;
                    }
                };

                match event {
                    ClientEvent::Heartbeat => {
                        idle.as_mut().reset(Instant::now() + state.idle_timeout);
                    }
                    ClientEvent::ListRooms => {
                        let rooms = state.registry.list_rooms().await;
                        outbox.send(ServerEvent::RoomListUpdate(rooms)).await?;
                    }
                    other => match Intent::try_from(other) {
                        Ok(intent) => {
                            if let Err(e) = apply_intent(
                                &state, player_id, intent, &mut seat, &events_tx,
                            )
                            .await
                            {
                                tracing::debug!(%player_id, error = %e, "intent rejected");
                                outbox.send(ServerEvent::Error(e.to_string())).await?;
                            }
                        }
                        Err(e) => {
                            tracing::debug!(%player_id, error = %e, "invalid intent");
                            outbox.send(ServerEvent::Error(e.to_string())).await?;
                        }
                    },
                }
            }

            Some(event) = events_rx.recv() => {
                outbox.send(event).await?;
            }

            list = room_list.recv() => match list {
                Ok(rooms) => outbox.send(ServerEvent::RoomListUpdate(rooms)).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(%player_id, skipped, "room list lagged, resending");
                    let rooms = state.registry.list_rooms().await;
                    outbox.send(ServerEvent::RoomListUpdate(rooms)).await?;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            () = &mut idle => {
                tracing::info!(%player_id, "idle timeout, disconnecting");
                outbox
                    .send(ServerEvent::ForceDisconnect(
                        "disconnected for inactivity".into(),
                    ))
                    .await?;
                let _ = conn.close().await;
                break;
            }
        }
    }

    guard.disarm();
    if let Err(e) =
        apply_intent(&state, player_id, Intent::Disconnect, &mut seat, &events_tx).await
    {
        tracing::debug!(%player_id, error = %e, "leave on disconnect failed");
    }
    Ok(())
}

/// Carries out one intent.
///
/// Joining goes through the registry, which owns the one-seat-per-player
/// rule. Once seated, `ready` and `shoot` go straight to the room.
async fn apply_intent(
    state: &ServerState,
    player_id: PlayerId,
    intent: Intent,
    seat: &mut Option<RoomHandle>,
    events_tx: &mpsc::Sender<ServerEvent>,
) -> Result<(), BubbleBrawlError> {
    match intent {
        Intent::Join { room_id, name } => {
            state
                .registry
                .join(player_id, room_id, name, events_tx.clone())
                .await?;
            *seat = Some(state.registry.room(room_id)?.clone());
        }
        Intent::Ready => {
            let room = seat.as_ref().ok_or(RoomError::NotSeated(player_id))?;
            room.ready(player_id).await?;
        }
        Intent::Shoot { angle } => match seat {
            Some(room) => room.shoot(player_id, angle).await?,
            None => tracing::debug!(%player_id, "shot from unseated player ignored"),
        },
        Intent::Disconnect => {
            if seat.take().is_some() {
                let room_id = state.registry.leave(player_id).await?;
                tracing::info!(%player_id, %room_id, "player left on disconnect");
            }
        }
    }
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_seq_counts_up_from_current() {
        let mut seq = 1;
        assert_eq!(next_seq(&mut seq), 1);
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(seq, 3);
    }
}
