//! Ladder Logic
//!
//! Client-initiated placement and removal of ladder obstacles. The
//! registry keeps a side index of live ladder ids so stale or duplicate
//! destroy requests resolve without touching unrelated entities; the index
//! and the set of ladder-tagged entities in the store are updated within
//! the same synchronous call and are therefore always in 1:1
//! correspondence.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::net::protocol::{LadderDestroyed, LadderPlaceRequest, LadderSpawned, ServerMessage};
use crate::net::transport::Broadcaster;
use crate::world::component::{tags, Component, LadderCollider, Transform};
use crate::world::entity::EntityId;
use crate::world::store::EntityStore;

/// Height contributed by one ladder segment.
pub const SEGMENT_HEIGHT: f32 = 0.5;
/// Ladder collider width.
pub const LADDER_WIDTH: f32 = 0.5;
/// Ladder collider depth.
pub const LADDER_DEPTH: f32 = 0.3;

/// Lifecycle manager for placed ladders.
pub struct LadderRegistry {
    ladders: BTreeSet<EntityId>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl LadderRegistry {
    /// Create an empty registry.
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            ladders: BTreeSet::new(),
            broadcaster,
        }
    }

    /// Number of live ladders.
    pub fn len(&self) -> usize {
        self.ladders.len()
    }

    /// Whether no ladders exist.
    pub fn is_empty(&self) -> bool {
        self.ladders.is_empty()
    }

    /// Whether an id refers to a live ladder.
    pub fn contains(&self, id: EntityId) -> bool {
        self.ladders.contains(&id)
    }

    /// Place a ladder on behalf of a player.
    ///
    /// Fails silently (logged, no state change, no broadcast) when the
    /// requesting entity no longer exists.
    pub fn handle_place(
        &mut self,
        world: &mut EntityStore,
        requester: EntityId,
        request: &LadderPlaceRequest,
    ) {
        if !world.contains(requester) {
            warn!(requester = %requester, "ladder place ignored: requester missing");
            return;
        }

        let id = world.create();
        let entity = world.get_mut(id).expect("entity just created");
        entity.insert(Component::Transform(Transform {
            position: request.position,
            ..Transform::default()
        }));
        entity.insert(Component::LadderCollider(LadderCollider {
            width: LADDER_WIDTH,
            depth: LADDER_DEPTH,
            height: request.segment_count as f32 * SEGMENT_HEIGHT,
            normal: request.normal,
            segment_count: request.segment_count,
        }));
        entity.tag(tags::LADDER);

        self.ladders.insert(id);

        info!(ladder = %id, requester = %requester, segments = request.segment_count, "ladder placed");
        self.broadcaster.broadcast(&ServerMessage::LadderSpawned(LadderSpawned {
            entity: id,
            position: request.position,
            normal: request.normal,
            segment_count: request.segment_count,
        }));
    }

    /// Remove a ladder on behalf of a player.
    ///
    /// Fails silently when the requester is missing or the id is not a
    /// live ladder (a stale or duplicate client request, not an error the
    /// requester sees). Otherwise the entity and the index entry go away
    /// together, then the destroy is broadcast.
    pub fn handle_destroy(&mut self, world: &mut EntityStore, requester: EntityId, ladder: EntityId) {
        if !world.contains(requester) {
            warn!(requester = %requester, "ladder destroy ignored: requester missing");
            return;
        }
        if !self.ladders.remove(&ladder) {
            debug!(ladder = %ladder, "ladder destroy ignored: unknown or already removed");
            return;
        }

        world.destroy(ladder);

        info!(ladder = %ladder, requester = %requester, "ladder destroyed");
        self.broadcaster
            .broadcast(&ServerMessage::LadderDestroyed(LadderDestroyed { entity: ladder }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::transport::testing::{Delivery, RecordingBroadcaster};
    use crate::world::math::Vec3;

    fn request(segments: u32) -> LadderPlaceRequest {
        LadderPlaceRequest {
            position: Vec3::new(4.0, 0.0, -2.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            segment_count: segments,
        }
    }

    fn setup() -> (EntityStore, LadderRegistry, Arc<RecordingBroadcaster>, EntityId) {
        let mut world = EntityStore::new();
        let player = world.create();
        world.get_mut(player).unwrap().tag(tags::PLAYER);

        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let registry = LadderRegistry::new(broadcaster.clone());
        (world, registry, broadcaster, player)
    }

    #[test]
    fn place_creates_tagged_entity_with_derived_height() {
        let (mut world, mut registry, broadcaster, player) = setup();

        registry.handle_place(&mut world, player, &request(6));

        let ladder = world.query_tag(tags::LADDER).next().expect("ladder entity");
        let collider = ladder.ladder_collider().unwrap();
        assert_eq!(collider.height, 3.0);
        assert_eq!(collider.width, LADDER_WIDTH);
        assert_eq!(collider.segment_count, 6);
        assert!(registry.contains(ladder.id()));

        let sent = broadcaster.deliveries();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Delivery::Reliable(ServerMessage::LadderSpawned(spawn)) => {
                assert_eq!(spawn.entity, ladder.id());
                assert_eq!(spawn.position, Vec3::new(4.0, 0.0, -2.0));
                assert_eq!(spawn.normal, Vec3::new(0.0, 0.0, 1.0));
                assert_eq!(spawn.segment_count, 6);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[test]
    fn place_with_missing_requester_changes_nothing() {
        let (mut world, mut registry, broadcaster, _player) = setup();

        registry.handle_place(&mut world, EntityId(404), &request(2));

        assert!(registry.is_empty());
        assert_eq!(world.query_tag(tags::LADDER).count(), 0);
        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn destroy_removes_entity_and_index_together() {
        let (mut world, mut registry, broadcaster, player) = setup();
        registry.handle_place(&mut world, player, &request(3));
        let ladder = world.tagged_ids(tags::LADDER)[0];
        broadcaster.clear();

        registry.handle_destroy(&mut world, player, ladder);

        assert!(!registry.contains(ladder));
        assert!(world.get(ladder).is_none());
        assert_eq!(
            broadcaster.deliveries(),
            vec![Delivery::Reliable(ServerMessage::LadderDestroyed(
                LadderDestroyed { entity: ladder }
            ))]
        );
    }

    #[test]
    fn destroy_with_unknown_id_broadcasts_nothing() {
        let (mut world, mut registry, broadcaster, player) = setup();
        registry.handle_place(&mut world, player, &request(3));
        broadcaster.clear();

        registry.handle_destroy(&mut world, player, EntityId(12345));

        assert_eq!(registry.len(), 1);
        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn duplicate_destroy_is_silent() {
        let (mut world, mut registry, broadcaster, player) = setup();
        registry.handle_place(&mut world, player, &request(3));
        let ladder = world.tagged_ids(tags::LADDER)[0];

        registry.handle_destroy(&mut world, player, ladder);
        broadcaster.clear();
        registry.handle_destroy(&mut world, player, ladder);

        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn index_matches_tagged_entities() {
        let (mut world, mut registry, _broadcaster, player) = setup();
        registry.handle_place(&mut world, player, &request(1));
        registry.handle_place(&mut world, player, &request(2));
        let ladders = world.tagged_ids(tags::LADDER);
        registry.handle_destroy(&mut world, player, ladders[0]);

        let remaining = world.tagged_ids(tags::LADDER);
        assert_eq!(remaining.len(), registry.len());
        for id in remaining {
            assert!(registry.contains(id));
        }
    }
}
