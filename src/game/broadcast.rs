//! Transform Broadcast Logic
//!
//! Once per tick, every player's kinematic state goes out as a fixed binary
//! frame on the low-latency channel: full state, every tick, never
//! delta-compressed. Slowly-changing attributes (stamina, armor, helmet)
//! take the opposite trade: they are compared against the last values sent
//! and emitted on the deferred reliable path only when something changed.
//!
//! The per-entity attribute cache is a side table keyed by entity id. The
//! orchestrator must call [`clear_cache_for_entity`] when an entity is
//! destroyed or fully respawned; otherwise a post-respawn value equal to
//! the stale cache entry would be suppressed.
//!
//! [`clear_cache_for_entity`]: StateBroadcast::clear_cache_for_entity

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::net::protocol::{
    ArmorUpdate, HelmetUpdate, MovementSnapshot, ServerMessage, StaminaUpdate,
};
use crate::net::transport::{Broadcaster, ConnectionRoster};
use crate::world::component::tags;
use crate::world::entity::{Entity, EntityId};
use crate::world::math::Quat;
use crate::world::store::EntityStore;

/// Last-sent values for one player's slow attributes.
///
/// Fields start unset so the first broadcast after creation (or after a
/// cache clear) always emits.
#[derive(Clone, Copy, Debug, Default)]
struct AttributeCache {
    stamina: Option<(f32, bool)>,
    armor: Option<f32>,
    helmet: Option<(bool, f32)>,
}

/// Per-tick state broadcaster.
pub struct StateBroadcast {
    cache: BTreeMap<EntityId, AttributeCache>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl StateBroadcast {
    /// Create a broadcaster with an empty attribute cache.
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            cache: BTreeMap::new(),
            broadcaster,
        }
    }

    /// Broadcast one tick's worth of state.
    ///
    /// No-op when no connections exist: serializing for nobody is wasted
    /// work. Iteration over players follows store order, so the frame
    /// sequence is stable within a tick.
    pub fn broadcast_tick(&mut self, world: &EntityStore, roster: &dyn ConnectionRoster) {
        if roster.active_count() == 0 {
            trace!("state broadcast skipped: no connections");
            return;
        }

        let players = world.tagged_ids(tags::PLAYER);
        for id in players {
            let Some(entity) = world.get(id) else { continue };

            if let Some(snapshot) = Self::capture(entity) {
                let frame = snapshot.encode();
                self.broadcaster.broadcast_buffer(&frame);
            }

            self.emit_attribute_deltas(entity);
        }
    }

    /// Drop cached attribute values for an entity.
    ///
    /// Must be called on destroy/respawn so the next broadcast re-emits
    /// instead of suppressing against stale values.
    pub fn clear_cache_for_entity(&mut self, id: EntityId) {
        self.cache.remove(&id);
    }

    /// Build the kinematic snapshot for a player entity. Requires a
    /// transform; movement and water default to rest state when absent.
    fn capture(entity: &Entity) -> Option<MovementSnapshot> {
        let transform = entity.transform()?;
        let movement = entity.movement().copied().unwrap_or_default();
        let water = entity.water().copied().unwrap_or_default();

        Some(MovementSnapshot {
            entity: entity.id(),
            position: transform.position,
            orientation: Quat::from_yaw(transform.yaw),
            velocity: movement.velocity,
            head_pitch: transform.head_pitch,
            last_input_seq: movement.last_input_seq,
            submerged: water.submerged,
            head_submerged: water.head_submerged,
            breath: water.breath,
            depth: water.depth,
        })
    }

    /// Compare slow attributes against the cache and emit per-group
    /// updates for changed values. Cache entries are created lazily here.
    fn emit_attribute_deltas(&mut self, entity: &Entity) {
        let id = entity.id();
        let cached = self.cache.entry(id).or_default();

        if let Some(stamina) = entity.stamina() {
            let current = (stamina.value, stamina.exhausted);
            if cached.stamina != Some(current) {
                self.broadcaster
                    .broadcast_deferred(&ServerMessage::Stamina(StaminaUpdate {
                        entity: id,
                        value: stamina.value,
                        exhausted: stamina.exhausted,
                    }));
                cached.stamina = Some(current);
            }
        }

        if let Some(armor) = entity.armor() {
            if cached.armor != Some(armor.value) {
                self.broadcaster
                    .broadcast_deferred(&ServerMessage::Armor(ArmorUpdate {
                        entity: id,
                        value: armor.value,
                    }));
                cached.armor = Some(armor.value);
            }
        }

        // Helmet presence is itself state: taking the helmet off must
        // produce an update just like a health change. A player never
        // observed with a helmet produces no traffic, though; absence only
        // counts as a change once a helmet has been seen.
        let helmet = entity.helmet();
        let current = (helmet.is_some(), helmet.map(|h| h.health).unwrap_or(0.0));
        if cached.helmet != Some(current) && (current.0 || cached.helmet.is_some()) {
            self.broadcaster
                .broadcast_deferred(&ServerMessage::Helmet(HelmetUpdate {
                    entity: id,
                    present: current.0,
                    health: current.1,
                }));
            cached.helmet = Some(current);
        }
    }
}
