//! Protocol Messages
//!
//! Wire format for client-server communication. Every message category has
//! a numeric opcode; frames on the binary channels are one opcode byte
//! followed by the payload. Structured payloads use bincode, with JSON
//! helpers for debugging ease. The movement snapshot is the exception: it
//! is the latency-critical path and uses a hand-laid fixed byte layout.
//!
//! Both message enums are closed tagged unions with an exhaustive
//! opcode <-> payload mapping, so adding an opcode forces handling it in
//! every dispatch site.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::round::{RoundPhase, RoundPlayer};
use crate::world::entity::EntityId;
use crate::world::math::{Quat, Vec3};

/// Protocol errors.
///
/// Size mismatches on the fixed movement layout are programming errors and
/// surface as `Err` immediately; they are never silently recovered.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Fixed-layout buffer had the wrong length.
    #[error("movement snapshot buffer must be {expected} bytes, got {actual}")]
    BufferSize {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Frame was empty (no opcode byte).
    #[error("empty frame")]
    EmptyFrame,

    /// Opcode byte does not map to any message category.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    /// Structured payload failed to decode.
    #[error("payload decode failed: {0}")]
    Payload(#[from] bincode::Error),
}

// =============================================================================
// OPCODES
// =============================================================================

/// Message category discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Per-tick kinematic snapshot (unreliable-ok channel).
    Movement = 1,
    /// Stamina changed.
    Stamina = 2,
    /// Armor changed.
    Armor = 3,
    /// Helmet changed.
    Helmet = 4,
    /// Material counts (join sync).
    Materials = 5,
    /// Dropped item spawn.
    ItemSpawn = 6,
    /// Tree placements.
    TreeSpawn = 7,
    /// Rock placements.
    RockSpawn = 8,
    /// Bush placements.
    BushSpawn = 9,
    /// Building initial state.
    BuildingState = 10,
    /// NPC/dummy spawn.
    NpcSpawn = 11,
    /// Ladder placed.
    LadderSpawned = 12,
    /// Ladder removed.
    LadderDestroyed = 13,
    /// Match phase change.
    MatchState = 14,
    /// Kill feed entry.
    KillFeed = 15,
    /// Kill/death totals for one player.
    ScoreUpdate = 16,
    /// Client request: place a ladder.
    PlaceLadder = 64,
    /// Client request: remove a ladder.
    RemoveLadder = 65,
}

impl Opcode {
    /// Map a wire byte back to an opcode.
    pub fn from_u8(byte: u8) -> Result<Self, ProtocolError> {
        Ok(match byte {
            1 => Opcode::Movement,
            2 => Opcode::Stamina,
            3 => Opcode::Armor,
            4 => Opcode::Helmet,
            5 => Opcode::Materials,
            6 => Opcode::ItemSpawn,
            7 => Opcode::TreeSpawn,
            8 => Opcode::RockSpawn,
            9 => Opcode::BushSpawn,
            10 => Opcode::BuildingState,
            11 => Opcode::NpcSpawn,
            12 => Opcode::LadderSpawned,
            13 => Opcode::LadderDestroyed,
            14 => Opcode::MatchState,
            15 => Opcode::KillFeed,
            16 => Opcode::ScoreUpdate,
            64 => Opcode::PlaceLadder,
            65 => Opcode::RemoveLadder,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        })
    }
}

// =============================================================================
// MOVEMENT SNAPSHOT (fixed binary layout)
// =============================================================================

/// One player's kinematic state for a tick.
///
/// Sent full-state every tick to every connection; never delta-compressed.
/// The body orientation is derived purely from yaw (no pitch/roll on the
/// wire); head pitch travels as its own scalar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementSnapshot {
    /// Entity being described.
    pub entity: EntityId,
    /// World position.
    pub position: Vec3,
    /// Body orientation, yaw-only unit quaternion.
    pub orientation: Quat,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Head pitch, radians.
    pub head_pitch: f32,
    /// Sequence number of the last processed client input.
    pub last_input_seq: u32,
    /// Body is in water.
    pub submerged: bool,
    /// Head is below the surface.
    pub head_submerged: bool,
    /// Remaining breath, seconds.
    pub breath: f32,
    /// Water depth at the entity's position.
    pub depth: f32,
}

impl MovementSnapshot {
    /// Encoded payload size in bytes (excluding the opcode byte).
    pub const WIRE_SIZE: usize = 66;

    /// Encode into a caller-provided buffer of exactly [`WIRE_SIZE`] bytes.
    ///
    /// [`WIRE_SIZE`]: MovementSnapshot::WIRE_SIZE
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<(), ProtocolError> {
        if buf.len() != Self::WIRE_SIZE {
            return Err(ProtocolError::BufferSize {
                expected: Self::WIRE_SIZE,
                actual: buf.len(),
            });
        }

        buf[0..8].copy_from_slice(&self.entity.0.to_le_bytes());
        buf[8..12].copy_from_slice(&self.position.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.position.y.to_le_bytes());
        buf[16..20].copy_from_slice(&self.position.z.to_le_bytes());
        buf[20..24].copy_from_slice(&self.orientation.x.to_le_bytes());
        buf[24..28].copy_from_slice(&self.orientation.y.to_le_bytes());
        buf[28..32].copy_from_slice(&self.orientation.z.to_le_bytes());
        buf[32..36].copy_from_slice(&self.orientation.w.to_le_bytes());
        buf[36..40].copy_from_slice(&self.velocity.x.to_le_bytes());
        buf[40..44].copy_from_slice(&self.velocity.y.to_le_bytes());
        buf[44..48].copy_from_slice(&self.velocity.z.to_le_bytes());
        buf[48..52].copy_from_slice(&self.head_pitch.to_le_bytes());
        buf[52..56].copy_from_slice(&self.last_input_seq.to_le_bytes());
        buf[56] = self.submerged as u8;
        buf[57] = self.head_submerged as u8;
        buf[58..62].copy_from_slice(&self.breath.to_le_bytes());
        buf[62..66].copy_from_slice(&self.depth.to_le_bytes());
        Ok(())
    }

    /// Encode to a fresh buffer.
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        // Length is correct by construction.
        self.encode_into(&mut buf)
            .expect("fixed-size buffer matches WIRE_SIZE");
        buf
    }

    /// Decode from exactly [`WIRE_SIZE`] bytes.
    ///
    /// [`WIRE_SIZE`]: MovementSnapshot::WIRE_SIZE
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() != Self::WIRE_SIZE {
            return Err(ProtocolError::BufferSize {
                expected: Self::WIRE_SIZE,
                actual: buf.len(),
            });
        }

        let f32_at = |off: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&buf[off..off + 4]);
            f32::from_le_bytes(b)
        };

        let mut id = [0u8; 8];
        id.copy_from_slice(&buf[0..8]);
        let mut seq = [0u8; 4];
        seq.copy_from_slice(&buf[52..56]);

        Ok(Self {
            entity: EntityId(u64::from_le_bytes(id)),
            position: Vec3::new(f32_at(8), f32_at(12), f32_at(16)),
            orientation: Quat {
                x: f32_at(20),
                y: f32_at(24),
                z: f32_at(28),
                w: f32_at(32),
            },
            velocity: Vec3::new(f32_at(36), f32_at(40), f32_at(44)),
            head_pitch: f32_at(48),
            last_input_seq: u32::from_le_bytes(seq),
            submerged: buf[56] != 0,
            head_submerged: buf[57] != 0,
            breath: f32_at(58),
            depth: f32_at(62),
        })
    }
}

// =============================================================================
// STRUCTURED PAYLOADS
// =============================================================================

/// Stamina changed for a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaminaUpdate {
    /// Player entity.
    pub entity: EntityId,
    /// New stamina value.
    pub value: f32,
    /// Exhaustion flag.
    pub exhausted: bool,
}

/// Armor changed for a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmorUpdate {
    /// Player entity.
    pub entity: EntityId,
    /// New armor value.
    pub value: f32,
}

/// Helmet changed for a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HelmetUpdate {
    /// Player entity.
    pub entity: EntityId,
    /// Whether a helmet is worn.
    pub present: bool,
    /// Helmet health (0 when absent).
    pub health: f32,
}

/// Material counts for a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialsUpdate {
    /// Player entity.
    pub entity: EntityId,
    /// Wood count.
    pub wood: u32,
    /// Stone count.
    pub stone: u32,
    /// Metal count.
    pub metal: u32,
}

/// A dropped item existing in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpawn {
    /// Item entity.
    pub entity: EntityId,
    /// Item kind tag.
    pub item: String,
    /// World position.
    pub position: Vec3,
}

/// One instance of a terrain feature (tree/rock/bush).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureInstance {
    /// World position.
    pub position: Vec3,
    /// Uniform scale.
    pub scale: f32,
}

/// All placements of one terrain-feature category, sent as a single message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeatureSpawn {
    /// Feature placements.
    pub instances: Vec<FeatureInstance>,
}

/// Initial state of one building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    /// Building entity.
    pub entity: EntityId,
    /// Structure kind tag.
    pub kind: String,
    /// World position.
    pub position: Vec3,
    /// Structure health.
    pub health: f32,
}

/// NPC/dummy spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    /// NPC entity.
    pub entity: EntityId,
    /// World position.
    pub position: Vec3,
}

/// A ladder was placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LadderSpawned {
    /// Ladder entity.
    pub entity: EntityId,
    /// World position.
    pub position: Vec3,
    /// Surface normal the ladder leans against.
    pub normal: Vec3,
    /// Segment count.
    pub segment_count: u32,
}

/// A ladder was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderDestroyed {
    /// Ladder entity.
    pub entity: EntityId,
}

/// Match phase change, with presentation metadata for the scoreboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchStateUpdate {
    /// New phase.
    pub phase: RoundPhase,
    /// Countdown seconds remaining (0 outside countdown).
    pub countdown_secs: u32,
    /// Players in the round with their assigned colors.
    pub players: Vec<RoundPlayer>,
}

/// One kill for the feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KillFeedEntry {
    /// Killer entity.
    pub killer: EntityId,
    /// Victim entity.
    pub victim: EntityId,
    /// Weapon tag.
    pub weapon: String,
    /// Headshot flag.
    pub headshot: bool,
}

/// Kill/death totals for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    /// Player entity.
    pub entity: EntityId,
    /// Kills this round.
    pub kills: u32,
    /// Deaths this round.
    pub deaths: u32,
}

/// Client request to place a ladder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LadderPlaceRequest {
    /// Requested world position.
    pub position: Vec3,
    /// Surface normal.
    pub normal: Vec3,
    /// Segment count.
    pub segment_count: u32,
}

/// Client request to remove a ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderRemoveRequest {
    /// Ladder entity to remove.
    pub ladder: EntityId,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Per-tick kinematic snapshot.
    Movement(MovementSnapshot),
    /// Stamina changed.
    Stamina(StaminaUpdate),
    /// Armor changed.
    Armor(ArmorUpdate),
    /// Helmet changed.
    Helmet(HelmetUpdate),
    /// Material counts.
    Materials(MaterialsUpdate),
    /// Dropped item spawn.
    ItemSpawn(ItemSpawn),
    /// Tree placements.
    TreeSpawn(TerrainFeatureSpawn),
    /// Rock placements.
    RockSpawn(TerrainFeatureSpawn),
    /// Bush placements.
    BushSpawn(TerrainFeatureSpawn),
    /// Building initial state.
    BuildingState(BuildingState),
    /// NPC/dummy spawn.
    NpcSpawn(NpcSpawn),
    /// Ladder placed.
    LadderSpawned(LadderSpawned),
    /// Ladder removed.
    LadderDestroyed(LadderDestroyed),
    /// Match phase change.
    MatchState(MatchStateUpdate),
    /// Kill feed entry.
    KillFeed(KillFeedEntry),
    /// Kill/death totals.
    ScoreUpdate(ScoreUpdate),
}

impl ServerMessage {
    /// The opcode identifying this message's shape.
    pub fn opcode(&self) -> Opcode {
        match self {
            ServerMessage::Movement(_) => Opcode::Movement,
            ServerMessage::Stamina(_) => Opcode::Stamina,
            ServerMessage::Armor(_) => Opcode::Armor,
            ServerMessage::Helmet(_) => Opcode::Helmet,
            ServerMessage::Materials(_) => Opcode::Materials,
            ServerMessage::ItemSpawn(_) => Opcode::ItemSpawn,
            ServerMessage::TreeSpawn(_) => Opcode::TreeSpawn,
            ServerMessage::RockSpawn(_) => Opcode::RockSpawn,
            ServerMessage::BushSpawn(_) => Opcode::BushSpawn,
            ServerMessage::BuildingState(_) => Opcode::BuildingState,
            ServerMessage::NpcSpawn(_) => Opcode::NpcSpawn,
            ServerMessage::LadderSpawned(_) => Opcode::LadderSpawned,
            ServerMessage::LadderDestroyed(_) => Opcode::LadderDestroyed,
            ServerMessage::MatchState(_) => Opcode::MatchState,
            ServerMessage::KillFeed(_) => Opcode::KillFeed,
            ServerMessage::ScoreUpdate(_) => Opcode::ScoreUpdate,
        }
    }

    /// Encode to an opcode-prefixed binary frame.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut frame = vec![self.opcode() as u8];
        match self {
            ServerMessage::Movement(snap) => frame.extend_from_slice(&snap.encode()),
            ServerMessage::Stamina(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::Armor(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::Helmet(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::Materials(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::ItemSpawn(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::TreeSpawn(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::RockSpawn(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::BushSpawn(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::BuildingState(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::NpcSpawn(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::LadderSpawned(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::LadderDestroyed(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::MatchState(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::KillFeed(p) => frame.append(&mut bincode::serialize(p)?),
            ServerMessage::ScoreUpdate(p) => frame.append(&mut bincode::serialize(p)?),
        }
        Ok(frame)
    }

    /// Decode from an opcode-prefixed binary frame.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&op, payload) = frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        Ok(match Opcode::from_u8(op)? {
            Opcode::Movement => ServerMessage::Movement(MovementSnapshot::decode(payload)?),
            Opcode::Stamina => ServerMessage::Stamina(bincode::deserialize(payload)?),
            Opcode::Armor => ServerMessage::Armor(bincode::deserialize(payload)?),
            Opcode::Helmet => ServerMessage::Helmet(bincode::deserialize(payload)?),
            Opcode::Materials => ServerMessage::Materials(bincode::deserialize(payload)?),
            Opcode::ItemSpawn => ServerMessage::ItemSpawn(bincode::deserialize(payload)?),
            Opcode::TreeSpawn => ServerMessage::TreeSpawn(bincode::deserialize(payload)?),
            Opcode::RockSpawn => ServerMessage::RockSpawn(bincode::deserialize(payload)?),
            Opcode::BushSpawn => ServerMessage::BushSpawn(bincode::deserialize(payload)?),
            Opcode::BuildingState => ServerMessage::BuildingState(bincode::deserialize(payload)?),
            Opcode::NpcSpawn => ServerMessage::NpcSpawn(bincode::deserialize(payload)?),
            Opcode::LadderSpawned => ServerMessage::LadderSpawned(bincode::deserialize(payload)?),
            Opcode::LadderDestroyed => {
                ServerMessage::LadderDestroyed(bincode::deserialize(payload)?)
            }
            Opcode::MatchState => ServerMessage::MatchState(bincode::deserialize(payload)?),
            Opcode::KillFeed => ServerMessage::KillFeed(bincode::deserialize(payload)?),
            Opcode::ScoreUpdate => ServerMessage::ScoreUpdate(bincode::deserialize(payload)?),
            op @ (Opcode::PlaceLadder | Opcode::RemoveLadder) => {
                return Err(ProtocolError::UnknownOpcode(op as u8))
            }
        })
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Place a ladder.
    PlaceLadder(LadderPlaceRequest),
    /// Remove a ladder.
    RemoveLadder(LadderRemoveRequest),
}

impl ClientMessage {
    /// The opcode identifying this message's shape.
    pub fn opcode(&self) -> Opcode {
        match self {
            ClientMessage::PlaceLadder(_) => Opcode::PlaceLadder,
            ClientMessage::RemoveLadder(_) => Opcode::RemoveLadder,
        }
    }

    /// Encode to an opcode-prefixed binary frame.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut frame = vec![self.opcode() as u8];
        match self {
            ClientMessage::PlaceLadder(p) => frame.append(&mut bincode::serialize(p)?),
            ClientMessage::RemoveLadder(p) => frame.append(&mut bincode::serialize(p)?),
        }
        Ok(frame)
    }

    /// Decode from an opcode-prefixed binary frame.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&op, payload) = frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        Ok(match Opcode::from_u8(op)? {
            Opcode::PlaceLadder => ClientMessage::PlaceLadder(bincode::deserialize(payload)?),
            Opcode::RemoveLadder => ClientMessage::RemoveLadder(bincode::deserialize(payload)?),
            other => return Err(ProtocolError::UnknownOpcode(other as u8)),
        })
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> MovementSnapshot {
        MovementSnapshot {
            entity: EntityId(42),
            position: Vec3::new(10.0, 2.5, -7.0),
            orientation: Quat::from_yaw(1.2),
            velocity: Vec3::new(0.5, -9.8, 0.0),
            head_pitch: -0.3,
            last_input_seq: 9001,
            submerged: true,
            head_submerged: false,
            breath: 12.5,
            depth: 1.75,
        }
    }

    #[test]
    fn movement_snapshot_fixed_layout_roundtrip() {
        let snap = sample_snapshot();
        let buf = snap.encode();
        assert_eq!(buf.len(), MovementSnapshot::WIRE_SIZE);

        let decoded = MovementSnapshot::decode(&buf).unwrap();
        assert_eq!(decoded, snap);
    }

    #[test]
    fn movement_snapshot_rejects_wrong_buffer_size() {
        let snap = sample_snapshot();

        let mut short = [0u8; MovementSnapshot::WIRE_SIZE - 1];
        let err = snap.encode_into(&mut short).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BufferSize { expected, actual }
                if expected == MovementSnapshot::WIRE_SIZE && actual == MovementSnapshot::WIRE_SIZE - 1
        ));

        assert!(MovementSnapshot::decode(&[0u8; 3]).is_err());
    }

    #[test]
    fn movement_orientation_is_yaw_only() {
        let buf = sample_snapshot().encode();
        let decoded = MovementSnapshot::decode(&buf).unwrap();
        assert_eq!(decoded.orientation.x, 0.0);
        assert_eq!(decoded.orientation.z, 0.0);
    }

    #[test]
    fn server_frame_roundtrip() {
        let msg = ServerMessage::KillFeed(KillFeedEntry {
            killer: EntityId(1),
            victim: EntityId(2),
            weapon: "pistol".to_string(),
            headshot: true,
        });

        let frame = msg.encode().unwrap();
        assert_eq!(frame[0], Opcode::KillFeed as u8);
        assert_eq!(ServerMessage::decode(&frame).unwrap(), msg);
    }

    #[test]
    fn movement_frame_is_opcode_plus_fixed_payload() {
        let msg = ServerMessage::Movement(sample_snapshot());
        let frame = msg.encode().unwrap();
        assert_eq!(frame.len(), 1 + MovementSnapshot::WIRE_SIZE);
        assert_eq!(frame[0], Opcode::Movement as u8);
        assert_eq!(ServerMessage::decode(&frame).unwrap(), msg);
    }

    #[test]
    fn client_frame_roundtrip() {
        let msg = ClientMessage::PlaceLadder(LadderPlaceRequest {
            position: Vec3::new(1.0, 0.0, 2.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            segment_count: 4,
        });

        let frame = msg.encode().unwrap();
        assert_eq!(frame[0], Opcode::PlaceLadder as u8);
        assert_eq!(ClientMessage::decode(&frame).unwrap(), msg);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert!(matches!(
            ServerMessage::decode(&[200, 0, 0]),
            Err(ProtocolError::UnknownOpcode(200))
        ));
        assert!(matches!(
            ServerMessage::decode(&[]),
            Err(ProtocolError::EmptyFrame)
        ));
        // Client opcodes are not server messages.
        assert!(ServerMessage::decode(&[Opcode::PlaceLadder as u8]).is_err());
    }

    #[test]
    fn json_helpers_roundtrip() {
        let msg = ServerMessage::ScoreUpdate(ScoreUpdate {
            entity: EntityId(7),
            kills: 3,
            deaths: 1,
        });
        let json = msg.to_json().unwrap();
        assert!(json.contains("score_update"));
        assert_eq!(ServerMessage::from_json(&json).unwrap(), msg);
    }
}
