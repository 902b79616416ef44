//! World State Module
//!
//! The canonical entity registry and the data attached to it.
//!
//! ## Module Structure
//!
//! - `math`: f32 vector and yaw-quaternion helpers
//! - `component`: component records and tags, as a closed set
//! - `entity`: entity id, component bag, tag set
//! - `store`: the id counter and id -> entity registry

pub mod component;
pub mod entity;
pub mod math;
pub mod store;

// Re-export key types
pub use component::{Component, ComponentKind};
pub use entity::{Entity, EntityId};
pub use math::{Quat, Vec3};
pub use store::EntityStore;
