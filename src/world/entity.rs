//! Entities
//!
//! An entity is an id plus a bag of named components and a set of tags.
//! Entities are owned exclusively by the [`EntityStore`]; nothing holds one
//! outside it.
//!
//! [`EntityStore`]: crate::world::store::EntityStore

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::component::{
    Armor, Component, ComponentKind, Helmet, LadderCollider, Materials, Movement, Score, Stamina,
    Transform, Water,
};

/// Unique entity identifier, monotonically assigned by the store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity: id, component bag, tag set.
///
/// BTreeMap/BTreeSet keep iteration order stable, so any walk over an
/// entity's components or tags is reproducible across calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    components: BTreeMap<ComponentKind, Component>,
    tags: BTreeSet<String>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BTreeMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// This entity's id.
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Insert or replace a component. The slot is determined by the
    /// value's own kind.
    pub fn insert(&mut self, component: Component) {
        self.components.insert(component.kind(), component);
    }

    /// Remove a component. Returns the removed value, if any.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(&kind)
    }

    /// Look up a component by kind.
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    /// Look up a component mutably by kind.
    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.get_mut(&kind)
    }

    /// Whether a component of this kind is present.
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Whether all listed kinds are present.
    pub fn has_all(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|k| self.components.contains_key(k))
    }

    /// Add a tag. Adding an existing tag is a no-op.
    pub fn tag(&mut self, tag: &str) {
        self.tags.insert(tag.to_owned());
    }

    /// Remove a tag.
    pub fn untag(&mut self, tag: &str) {
        self.tags.remove(tag);
    }

    /// Whether the entity carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// Typed accessors. These keep system code free of enum plumbing; the
// match arms are the single place a kind is tied to its record type.
macro_rules! typed_accessors {
    ($( $get:ident, $get_mut:ident => $variant:ident ( $ty:ty ) ),* $(,)?) => {
        impl Entity {
            $(
                /// Typed component lookup.
                pub fn $get(&self) -> Option<&$ty> {
                    match self.components.get(&ComponentKind::$variant) {
                        Some(Component::$variant(inner)) => Some(inner),
                        _ => None,
                    }
                }

                /// Typed mutable component lookup.
                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match self.components.get_mut(&ComponentKind::$variant) {
                        Some(Component::$variant(inner)) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }
    };
}

typed_accessors! {
    transform, transform_mut => Transform(Transform),
    movement, movement_mut => Movement(Movement),
    water, water_mut => Water(Water),
    score, score_mut => Score(Score),
    stamina, stamina_mut => Stamina(Stamina),
    armor, armor_mut => Armor(Armor),
    helmet, helmet_mut => Helmet(Helmet),
    materials, materials_mut => Materials(Materials),
    ladder_collider, ladder_collider_mut => LadderCollider(LadderCollider),
}
