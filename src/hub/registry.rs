use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

pub type ConnId = u64;

/// One live, authenticated socket currently joined to a room. The owning
/// session keeps the socket itself and is alone responsible for closing it;
/// the registry holds this handle only for lookup and fan-out.
#[derive(Clone)]
pub struct Member {
    pub conn_id: ConnId,
    pub user_id: i64,
    pub tx: mpsc::UnboundedSender<Utf8Bytes>,
}

/// Room id -> member set, the only mutable state shared between sessions.
/// Rooms exist implicitly: created on first join, dropped with their last
/// member. All mutation happens behind one lock, held only for map edits,
/// never across I/O.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<i64, Vec<Member>>>,
}

impl RoomRegistry {
    /// Adds `member` to the room, creating the room entry if absent.
    /// Idempotent per connection id.
    pub fn join(&self, room_id: i64, member: Member) {
        let mut rooms = self.lock();
        let members = rooms.entry(room_id).or_default();
        if members.iter().all(|m| m.conn_id != member.conn_id) {
            members.push(member);
        }
    }

    /// Removes the connection if present, dropping the room entry once its
    /// member set empties. Returns whether anything was removed, so the
    /// second of a racing explicit leave and failed-send eviction is a no-op.
    pub fn leave(&self, room_id: i64, conn_id: ConnId) -> bool {
        let mut rooms = self.lock();
        let Some(members) = rooms.get_mut(&room_id) else {
            return false;
        };

        let before = members.len();
        members.retain(|m| m.conn_id != conn_id);
        let removed = members.len() < before;
        if members.is_empty() {
            rooms.remove(&room_id);
        }
        removed
    }

    /// Point-in-time copy of the member set, so a join or leave racing a
    /// broadcast can never invalidate the iteration.
    pub fn members_snapshot(&self, room_id: i64) -> Vec<Member> {
        self.lock().get(&room_id).cloned().unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Vec<Member>>> {
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
