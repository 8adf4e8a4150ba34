//! Shared value types for the tankfield workspace.
//!
//! # Invariants
//! - Back-references between entities are identifiers, never ownership.
//! - The core only talks to presentation through [`SceneHandle`].

pub mod hash;
pub mod scene;
pub mod types;

pub use scene::{SceneGraph, SceneHandle, SceneNode};
pub use types::{EntityId, ObstacleId, TileCoord, Transform};
