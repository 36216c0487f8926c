//! Room registry: the fixed set of rooms and which player sits where.

use std::collections::{BTreeMap, HashMap};

use bubblebrawl_game::GameConfig;
use bubblebrawl_protocol::{PlayerId, RoomId, RoomListEntry, RoomSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, Mutex};

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle};

/// Buffered room-list updates per subscriber before it starts lagging.
const ROOM_LIST_BUFFER: usize = 16;

/// Every room of the process, created once at startup.
///
/// The room map never changes after construction. The assignment table
/// maps each player to the one room they are seated in; it is the only
/// shared mutable state and lives behind an async mutex.
pub struct RoomRegistry {
    rooms: BTreeMap<RoomId, RoomHandle>,
    assignments: Mutex<HashMap<PlayerId, RoomId>>,
    room_list: broadcast::Sender<Vec<RoomListEntry>>,
}

impl RoomRegistry {
    /// Spawns `room_count` room actors, `room-1` through `room-<n>`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(room_count: u32, config: RoomConfig, game: GameConfig) -> Self {
        let config = config.validated();
        let game = game.validated();
        let handles = (1..=room_count).map(|n| {
            spawn_room(RoomId(n), &config, game.clone(), StdRng::from_os_rng())
        });
        let registry = Self::from_handles(handles);
        tracing::info!(rooms = room_count, capacity = config.capacity, "rooms created");
        registry
    }

    fn from_handles(handles: impl IntoIterator<Item = RoomHandle>) -> Self {
        let rooms = handles.into_iter().map(|h| (h.room_id(), h)).collect();
        let (room_list, _) = broadcast::channel(ROOM_LIST_BUFFER);
        Self {
            rooms,
            assignments: Mutex::new(HashMap::new()),
            room_list,
        }
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The handle of one room. A connection keeps a clone after joining so
    /// its intents go straight to the room.
    pub fn room(&self, room_id: RoomId) -> Result<&RoomHandle, RoomError> {
        self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))
    }

    /// Seats a player in a room.
    ///
    /// A player holds at most one seat: joining while seated anywhere is
    /// rejected. The seat is reserved in the assignment table before the
    /// room is asked and released again if the room refuses, so the lock
    /// is never held while waiting on a room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
        name: Option<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let room = self.room(room_id)?;
        {
            let mut assignments = self.assignments.lock().await;
            if let Some(&current) = assignments.get(&player_id) {
                return Err(RoomError::AlreadyInRoom(player_id, current));
            }
            assignments.insert(player_id, room_id);
        }

        if let Err(e) = room.join(player_id, name, sender).await {
            let mut assignments = self.assignments.lock().await;
            if assignments.get(&player_id) == Some(&room_id) {
                assignments.remove(&player_id);
            }
            return Err(e);
        }
        self.publish_room_list().await;
        Ok(())
    }

    /// Gives up the player's seat, returning the room they left.
    pub async fn leave(&self, player_id: PlayerId) -> Result<RoomId, RoomError> {
        let room_id = self
            .assignments
            .lock()
            .await
            .remove(&player_id)
            .ok_or(RoomError::NotSeated(player_id))?;
        self.room(room_id)?.leave(player_id).await?;
        self.publish_room_list().await;
        Ok(room_id)
    }

    /// The room a player is seated in, if any.
    pub async fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.assignments.lock().await.get(&player_id).copied()
    }

    /// Routes a ready toggle to the player's room.
    pub async fn ready(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let room_id = self
            .room_of(player_id)
            .await
            .ok_or(RoomError::NotSeated(player_id))?;
        self.room(room_id)?.ready(player_id).await
    }

    /// Routes a shot to the player's room. A shot from a player without a
    /// seat is dropped.
    pub async fn shoot(&self, player_id: PlayerId, angle: f64) -> Result<(), RoomError> {
        let Some(room_id) = self.room_of(player_id).await else {
            tracing::debug!(%player_id, "shot from unseated player ignored");
            return Ok(());
        };
        self.room(room_id)?.shoot(player_id, angle).await
    }

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomListEntry, RoomError> {
        self.room(room_id)?.get_info().await
    }

    pub async fn snapshot(&self, room_id: RoomId) -> Result<RoomSnapshot, RoomError> {
        self.room(room_id)?.snapshot().await
    }

    /// Occupancy of every room, in id order. Rooms that fail to answer are
    /// skipped.
    pub async fn list_rooms(&self) -> Vec<RoomListEntry> {
        let mut list = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.get_info().await {
                list.push(info);
            }
        }
        list
    }

    /// Receives a fresh room list after every join and leave.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<RoomListEntry>> {
        self.room_list.subscribe()
    }

    async fn publish_room_list(&self) {
        if self.room_list.receiver_count() == 0 {
            return;
        }
        let list = self.list_rooms().await;
        let _ = self.room_list.send(list);
    }

    /// Stops every room actor.
    pub async fn shutdown(&self) {
        for handle in self.rooms.values() {
            let _ = handle.shutdown().await;
        }
        self.assignments.lock().await.clear();
        tracing::info!("rooms shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bubblebrawl_protocol::ServerEvent;
    use tokio::sync::mpsc;

    use super::*;
    use crate::room::RoomCommand;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);

    /// A room whose actor never answers: commands pile up in `rx`.
    fn stalled_room(id: RoomId) -> (RoomHandle, mpsc::Receiver<RoomCommand>) {
        let (tx, rx) = mpsc::channel(4);
        (RoomHandle::new(id, tx), rx)
    }

    #[tokio::test]
    async fn test_pending_join_does_not_block_other_rooms() {
        let (stalled, mut stalled_rx) = stalled_room(RoomId(1));
        let live = spawn_room(
            RoomId(2),
            &RoomConfig::default(),
            GameConfig::default(),
            StdRng::seed_from_u64(7),
        );
        let reg = Arc::new(RoomRegistry::from_handles([stalled, live]));

        let (tx_b, mut rx_b) = mpsc::channel(64);
        reg.join(B, RoomId(2), None, tx_b).await.unwrap();

        let pending = {
            let reg = Arc::clone(&reg);
            tokio::spawn(async move {
                reg.join(A, RoomId(1), None, mpsc::channel(1).0).await
            })
        };
        let Some(RoomCommand::Join { player_id, reply, .. }) = stalled_rx.recv().await
        else {
            panic!("expected the join to reach room-1");
        };
        assert_eq!(player_id, A);
        // The seat is reserved while room-1 thinks about it.
        assert_eq!(reg.room_of(A).await, Some(RoomId(1)));

        // Room-2 keeps working while the join into room-1 hangs.
        tokio::time::timeout(Duration::from_secs(1), reg.ready(B))
            .await
            .expect("ready must not wait on another room")
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if let Some(ServerEvent::GameStarted(_)) = rx_b.recv().await {
                    break;
                }
            }
        })
        .await
        .expect("room-2 round should start");
        tokio::time::timeout(Duration::from_secs(1), reg.shoot(B, -1.5))
            .await
            .expect("shoot must not wait on another room")
            .unwrap();

        // Room-1 finally refuses: the reservation is rolled back.
        reply.send(Err(RoomError::RoomFull(RoomId(1)))).unwrap();
        assert_eq!(
            pending.await.unwrap(),
            Err(RoomError::RoomFull(RoomId(1)))
        );
        assert_eq!(reg.room_of(A).await, None);
    }

    #[tokio::test]
    async fn test_second_join_sees_reservation() {
        let (stalled, mut stalled_rx) = stalled_room(RoomId(1));
        let (other, _other_rx) = stalled_room(RoomId(2));
        let reg = Arc::new(RoomRegistry::from_handles([stalled, other]));

        let first = {
            let reg = Arc::clone(&reg);
            tokio::spawn(async move {
                reg.join(A, RoomId(1), None, mpsc::channel(1).0).await
            })
        };
        let Some(RoomCommand::Join { reply, .. }) = stalled_rx.recv().await else {
            panic!("expected the join to reach room-1");
        };

        let second = reg.join(A, RoomId(2), None, mpsc::channel(1).0).await;
        assert_eq!(second, Err(RoomError::AlreadyInRoom(A, RoomId(1))));

        reply.send(Ok(())).unwrap();
        assert_eq!(first.await.unwrap(), Ok(()));
        assert_eq!(reg.room_of(A).await, Some(RoomId(1)));
    }
}
