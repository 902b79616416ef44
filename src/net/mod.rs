//! Networking Module
//!
//! Wire protocol and the capability interfaces the core uses to reach the
//! transport layer. Connection handling itself (accept, handshake,
//! disconnect detection) lives in the orchestrator, not here.
//!
//! ## Module Structure
//!
//! - `protocol`: opcodes, message unions, fixed kinematic layout
//! - `transport`: broadcaster/roster capability traits

pub mod protocol;
pub mod transport;

// Re-export key types
pub use protocol::{ClientMessage, MovementSnapshot, Opcode, ProtocolError, ServerMessage};
pub use transport::{Broadcaster, ConnectionId, ConnectionRoster, PlayerPalette};
