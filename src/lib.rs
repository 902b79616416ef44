//! # Palisade Game Server Core
//!
//! Authoritative server state for a real-time multiplayer survival game.
//! Owns the canonical world (entities and components), advances match logic
//! at a fixed tick rate, and keeps every connected client consistent
//! through targeted broadcasts and a join-sync bootstrap.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PALISADE SERVER CORE                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  world/            - Canonical state                         │
//! │  ├── math.rs       - f32 vectors, yaw quaternions            │
//! │  ├── component.rs  - Component records and tags (closed set) │
//! │  ├── entity.rs     - Entity: id + component bag + tags       │
//! │  └── store.rs      - Entity registry, id counter, queries    │
//! │                                                              │
//! │  game/             - Systems (orchestrator-invoked)          │
//! │  ├── round.rs      - Match state machine, score bookkeeping  │
//! │  ├── ladder.rs     - Transient obstacle lifecycle            │
//! │  ├── broadcast.rs  - Per-tick kinematics + attribute deltas  │
//! │  └── join.rs       - Bootstrap for new connections           │
//! │                                                              │
//! │  net/              - Wire protocol and transport seams       │
//! │  ├── protocol.rs   - Opcodes, message unions, fixed layout   │
//! │  └── transport.rs  - Broadcaster/roster capability traits    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution Model
//!
//! A single logical thread of control: the orchestrator alternates fixed
//! ticks with run-to-completion message callbacks, so no two mutations of
//! the store or any side table ever execute concurrently and no locking is
//! needed for in-process state. The kinematic path sends full state every
//! tick on a low-latency channel; slow attributes are delta-suppressed on
//! a deferred reliable channel; a new connection gets one ordered
//! bootstrap sequence scheduled after the current tick's queued broadcasts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod net;
pub mod world;

// Re-export commonly used types
pub use game::broadcast::StateBroadcast;
pub use game::join::JoinSynchronizer;
pub use game::ladder::LadderRegistry;
pub use game::round::{RoundConfig, RoundManager, RoundPhase};
pub use net::protocol::{ClientMessage, Opcode, ProtocolError, ServerMessage};
pub use net::transport::{Broadcaster, ConnectionId, ConnectionRoster};
pub use world::entity::EntityId;
pub use world::store::EntityStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 30;
