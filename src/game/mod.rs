//! Game Systems Module
//!
//! Independent callable units invoked by the orchestrator; none of them
//! owns the tick loop. Each mutates the entity store within a single
//! run-to-completion call.
//!
//! ## Module Structure
//!
//! - `round`: match state machine and score bookkeeping
//! - `ladder`: transient obstacle placement/removal
//! - `broadcast`: per-tick kinematics and on-change attribute updates
//! - `join`: one-shot bootstrap for new connections

pub mod broadcast;
pub mod join;
pub mod ladder;
pub mod round;

// Re-export key types
pub use broadcast::StateBroadcast;
pub use join::{JoinSynchronizer, NpcSync, SpawnSource};
pub use ladder::LadderRegistry;
pub use round::{RoundConfig, RoundManager, RoundPhase};
