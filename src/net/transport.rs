//! Transport Capabilities
//!
//! The core never touches sockets. The orchestrator that owns the
//! connection table injects these named interfaces into each system at
//! construction time; implementations are expected to absorb per-connection
//! delivery failures so one bad connection never stalls a tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::protocol::ServerMessage;

/// Opaque connection identifier, assigned by the transport layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound message delivery.
///
/// Three paths with distinct guarantees:
/// - `broadcast`: reliable, ordered, for authoritative events;
/// - `broadcast_deferred`: reliable but lower urgency, for on-change
///   attribute updates that may yield to the kinematic stream;
/// - `broadcast_buffer`: raw binary on the low-latency channel, loss is
///   acceptable because full state follows next tick.
pub trait Broadcaster: Send + Sync {
    /// Send a structured message to all connections on the reliable channel.
    fn broadcast(&self, msg: &ServerMessage);

    /// Send a structured message to all connections at low priority.
    fn broadcast_deferred(&self, msg: &ServerMessage);

    /// Send an already-encoded buffer to all connections on the
    /// low-latency channel.
    fn broadcast_buffer(&self, buf: &[u8]);

    /// Send a structured message to one connection on the reliable channel.
    fn send(&self, conn: ConnectionId, msg: &ServerMessage);
}

/// Read access to the live connection table.
pub trait ConnectionRoster: Send + Sync {
    /// Currently established connections.
    fn connections(&self) -> Vec<ConnectionId>;

    /// Number of established connections.
    fn active_count(&self) -> usize {
        self.connections().len()
    }
}

/// Presentation metadata lookup for round broadcasts.
pub trait PlayerPalette: Send + Sync {
    /// Color index assigned to a player entity.
    fn color_index(&self, entity: crate::world::entity::EntityId) -> u8;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording doubles shared by the system tests.

    use std::sync::Mutex;

    use super::*;
    use crate::world::entity::EntityId;

    /// One delivery captured by [`RecordingBroadcaster`].
    #[derive(Clone, Debug, PartialEq)]
    pub enum Delivery {
        /// Reliable broadcast.
        Reliable(ServerMessage),
        /// Low-priority broadcast.
        Deferred(ServerMessage),
        /// Binary buffer broadcast.
        Buffer(Vec<u8>),
        /// Reliable single-connection send.
        Direct(ConnectionId, ServerMessage),
    }

    /// Broadcaster that records every delivery in order.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        deliveries: Mutex<Vec<Delivery>>,
    }

    impl RecordingBroadcaster {
        /// Everything delivered so far, in order.
        pub fn deliveries(&self) -> Vec<Delivery> {
            self.deliveries.lock().unwrap().clone()
        }

        /// Drop recorded deliveries.
        pub fn clear(&self) {
            self.deliveries.lock().unwrap().clear();
        }
    }

    impl Broadcaster for RecordingBroadcaster {
        fn broadcast(&self, msg: &ServerMessage) {
            self.deliveries
                .lock()
                .unwrap()
                .push(Delivery::Reliable(msg.clone()));
        }

        fn broadcast_deferred(&self, msg: &ServerMessage) {
            self.deliveries
                .lock()
                .unwrap()
                .push(Delivery::Deferred(msg.clone()));
        }

        fn broadcast_buffer(&self, buf: &[u8]) {
            self.deliveries
                .lock()
                .unwrap()
                .push(Delivery::Buffer(buf.to_vec()));
        }

        fn send(&self, conn: ConnectionId, msg: &ServerMessage) {
            self.deliveries
                .lock()
                .unwrap()
                .push(Delivery::Direct(conn, msg.clone()));
        }
    }

    /// Fixed connection list.
    pub struct StaticRoster(pub Vec<ConnectionId>);

    impl ConnectionRoster for StaticRoster {
        fn connections(&self) -> Vec<ConnectionId> {
            self.0.clone()
        }
    }

    /// Palette mapping every entity to its id modulo 8.
    pub struct ModuloPalette;

    impl PlayerPalette for ModuloPalette {
        fn color_index(&self, entity: EntityId) -> u8 {
            (entity.0 % 8) as u8
        }
    }
}
