//! Per-contract chat hub: groups live websocket connections into rooms keyed
//! by contract id and fans every event out to the whole room. Rooms run
//! independently; the registry is the only shared state.

mod event;
mod registry;

pub use event::ChatEvent;
pub use registry::{ConnId, Member, RoomRegistry};

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Fan-out engine over the room registry. Owned by `AppState` and constructed
/// per process (or per test) rather than living in a global.
///
/// CRUD handlers call [`ChatHub::broadcast`] directly to inject domain events
/// such as `contract_created` into a room with no live sender.
#[derive(Default)]
pub struct ChatHub {
    registry: RoomRegistry,
    next_conn_id: AtomicU64,
    // Serializes broadcasts so every member of a room observes the same
    // relative event order. Sends inside the gate are non-blocking channel
    // pushes, never network I/O.
    fanout_gate: Mutex<()>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a registry handle for a freshly authenticated socket.
    pub fn connect(&self, user_id: i64, tx: mpsc::UnboundedSender<Utf8Bytes>) -> Member {
        Member {
            conn_id: self.next_conn_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            tx,
        }
    }

    pub fn join(&self, room_id: i64, member: Member) {
        self.registry.join(room_id, member);
    }

    pub fn leave(&self, room_id: i64, conn_id: ConnId) -> bool {
        self.registry.leave(room_id, conn_id)
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Delivers `event` to every current member of `room_id`, one attempt per
    /// member, each independent of the others. Failures never reach the
    /// caller: a member whose channel is gone is evicted from the room (an
    /// implicit leave) and everyone else still gets the event.
    pub fn broadcast(&self, room_id: i64, event: &ChatEvent) {
        let payload: Utf8Bytes = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(err) => {
                error!(%err, "chat event failed to serialize");
                return;
            }
        };

        let dead: Vec<ConnId> = {
            let _order = self
                .fanout_gate
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            self.registry
                .members_snapshot(room_id)
                .iter()
                .filter(|m| m.tx.send(payload.clone()).is_err())
                .map(|m| m.conn_id)
                .collect()
        };

        for conn_id in dead {
            if self.registry.leave(room_id, conn_id) {
                debug!(room_id, conn_id, "evicted unreachable chat member");
            }
        }
    }
}
