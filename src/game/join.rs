//! Join-Sync Logic
//!
//! One-shot bootstrap for a newly established connection: an ordered
//! message sequence that reconstructs the world as currently known, sent on
//! the reliable channel. Invoked by the orchestrator exactly once per
//! connection, after handshake completion and after any spawn broadcasts
//! already queued for the current tick, so the joiner neither misses nor
//! double-receives an event that happened during its join.

use std::sync::Arc;

use tracing::debug;

use crate::net::protocol::{
    ArmorUpdate, BuildingState, HelmetUpdate, ItemSpawn, MaterialsUpdate, ServerMessage,
    TerrainFeatureSpawn,
};
use crate::net::transport::{Broadcaster, ConnectionId};
use crate::world::component::tags;
use crate::world::store::EntityStore;

/// Static spawn-descriptor producers (item drops, vegetation, buildings).
///
/// Terrain-feature categories are each at most one message; `None` means
/// the category has no message right now, which is not an error.
pub trait SpawnSource: Send + Sync {
    /// Every currently-existing dropped item.
    fn item_spawns(&self) -> Vec<ItemSpawn>;

    /// Tree placements, if any exist.
    fn tree_spawns(&self) -> Option<TerrainFeatureSpawn>;

    /// Rock placements, if any exist.
    fn rock_spawns(&self) -> Option<TerrainFeatureSpawn>;

    /// Bush placements, if any exist.
    fn bush_spawns(&self) -> Option<TerrainFeatureSpawn>;

    /// Initial state of every existing building.
    fn building_states(&self) -> Vec<BuildingState>;
}

/// NPC spawn sync, delegated to the system that owns the dummies.
///
/// Always invoked during bootstrap, even when it has nothing to send.
pub trait NpcSync: Send + Sync {
    /// Send spawn messages for all live NPCs to one connection.
    fn send_spawns(&self, conn: ConnectionId);
}

/// Bootstrap sender for late joiners.
pub struct JoinSynchronizer {
    broadcaster: Arc<dyn Broadcaster>,
    spawns: Arc<dyn SpawnSource>,
    npcs: Arc<dyn NpcSync>,
}

impl JoinSynchronizer {
    /// Create a join synchronizer over the given producers.
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        spawns: Arc<dyn SpawnSource>,
        npcs: Arc<dyn NpcSync>,
    ) -> Self {
        Self {
            broadcaster,
            spawns,
            npcs,
        }
    }

    /// Send the full initial-state sequence to one connection.
    ///
    /// Pure read-and-send; mutates nothing. Order is fixed: items,
    /// terrain features (trees/rocks/bushes), NPCs, per-player attributes,
    /// buildings. Categories with zero members send nothing.
    pub fn send_initial_state(&self, world: &EntityStore, conn: ConnectionId) {
        debug!(conn = %conn, "sending initial state");

        for item in self.spawns.item_spawns() {
            self.broadcaster.send(conn, &ServerMessage::ItemSpawn(item));
        }

        if let Some(trees) = self.spawns.tree_spawns() {
            self.broadcaster.send(conn, &ServerMessage::TreeSpawn(trees));
        }
        if let Some(rocks) = self.spawns.rock_spawns() {
            self.broadcaster.send(conn, &ServerMessage::RockSpawn(rocks));
        }
        if let Some(bushes) = self.spawns.bush_spawns() {
            self.broadcaster.send(conn, &ServerMessage::BushSpawn(bushes));
        }

        self.npcs.send_spawns(conn);

        // Store order is id order, so the per-player walk is stable
        // within a call.
        for player in world.query_tag(tags::PLAYER) {
            if let Some(armor) = player.armor() {
                if armor.value > 0.0 {
                    self.broadcaster.send(
                        conn,
                        &ServerMessage::Armor(ArmorUpdate {
                            entity: player.id(),
                            value: armor.value,
                        }),
                    );
                }
            }

            if let Some(helmet) = player.helmet() {
                self.broadcaster.send(
                    conn,
                    &ServerMessage::Helmet(HelmetUpdate {
                        entity: player.id(),
                        present: true,
                        health: helmet.health,
                    }),
                );
            }

            let materials = player.materials().copied().unwrap_or_default();
            self.broadcaster.send(
                conn,
                &ServerMessage::Materials(MaterialsUpdate {
                    entity: player.id(),
                    wood: materials.wood,
                    stone: materials.stone,
                    metal: materials.metal,
                }),
            );
        }

        for building in self.spawns.building_states() {
            self.broadcaster.send(conn, &ServerMessage::BuildingState(building));
        }
    }
}
