//! Component Records
//!
//! All component data attached to entities, as a closed set. A component is
//! simply present-or-absent per entity; there is no per-type storage, which
//! keeps the store a plain id -> entity map with stable iteration order.

use serde::{Deserialize, Serialize};

use crate::world::math::Vec3;

/// Well-known entity tags.
pub mod tags {
    /// Player-controlled entity.
    pub const PLAYER: &str = "player";
    /// Placed ladder obstacle.
    pub const LADDER: &str = "ladder";
    /// Server-driven dummy/NPC entity.
    pub const NPC: &str = "npc";
    /// Player-built structure.
    pub const BUILDING: &str = "building";
}

/// Discriminator for component lookup.
///
/// One value per component record; an entity holds at most one component
/// of each kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position and body orientation.
    Transform,
    /// Velocity and input tracking.
    Movement,
    /// Water interaction state.
    Water,
    /// Kill/death bookkeeping.
    Score,
    /// Stamina pool.
    Stamina,
    /// Chest armor.
    Armor,
    /// Head armor.
    Helmet,
    /// Crafting material counts.
    Materials,
    /// Ladder collision volume.
    LadderCollider,
}

/// Position and orientation of an entity.
///
/// Yaw is the only body rotation the server tracks; head pitch is a
/// separate scalar sent alongside it on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// Body yaw about the vertical axis, radians.
    pub yaw: f32,
    /// Head pitch, radians.
    pub head_pitch: f32,
}

/// Kinematic state driven by client input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Linear velocity.
    pub velocity: Vec3,
    /// Sequence number of the last client input the server processed,
    /// echoed back for client-side reconciliation.
    pub last_input_seq: u32,
}

/// Water interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Water {
    /// Body is in water.
    pub submerged: bool,
    /// Head is below the surface.
    pub head_submerged: bool,
    /// Remaining breath, seconds.
    pub breath: f32,
    /// Water depth at the entity's position.
    pub depth: f32,
}

/// Per-player kill/death counters. Mutated only by the round manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Kills this round.
    pub kills: u32,
    /// Deaths this round.
    pub deaths: u32,
}

/// Stamina pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stamina {
    /// Current stamina.
    pub value: f32,
    /// Player is exhausted (stamina drained, regen penalty active).
    pub exhausted: bool,
}

/// Chest armor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    /// Remaining armor points.
    pub value: f32,
}

/// Head armor. Presence of the component means the player wears one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Helmet {
    /// Remaining helmet health.
    pub health: f32,
}

/// Crafting material counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materials {
    /// Wood count.
    pub wood: u32,
    /// Stone count.
    pub stone: u32,
    /// Metal count.
    pub metal: u32,
}

/// Collision volume of a placed ladder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderCollider {
    /// Collider width.
    pub width: f32,
    /// Collider depth.
    pub depth: f32,
    /// Collider height, derived from segment count.
    pub height: f32,
    /// Surface normal the ladder leans against.
    pub normal: Vec3,
    /// Number of ladder segments.
    pub segment_count: u32,
}

/// A component value, as a closed tagged union.
///
/// Adding a record here forces handling it in `kind()` and in the typed
/// entity accessors, so no component can exist without a lookup path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// Position and orientation.
    Transform(Transform),
    /// Velocity and input tracking.
    Movement(Movement),
    /// Water interaction state.
    Water(Water),
    /// Kill/death bookkeeping.
    Score(Score),
    /// Stamina pool.
    Stamina(Stamina),
    /// Chest armor.
    Armor(Armor),
    /// Head armor.
    Helmet(Helmet),
    /// Crafting materials.
    Materials(Materials),
    /// Ladder collision volume.
    LadderCollider(LadderCollider),
}

impl Component {
    /// The kind this value is stored under.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Movement(_) => ComponentKind::Movement,
            Component::Water(_) => ComponentKind::Water,
            Component::Score(_) => ComponentKind::Score,
            Component::Stamina(_) => ComponentKind::Stamina,
            Component::Armor(_) => ComponentKind::Armor,
            Component::Helmet(_) => ComponentKind::Helmet,
            Component::Materials(_) => ComponentKind::Materials,
            Component::LadderCollider(_) => ComponentKind::LadderCollider,
        }
    }
}
