//! Deterministic simulation module
//!
//! All physics lives here. This module must stay pure and deterministic:
//! - Caller-supplied time step only
//! - Seeded RNG only
//! - Stable iteration order (body creation order)
//! - No rendering or platform dependencies

pub mod body;
pub mod cannon;
pub mod collision;
pub mod demo;
pub mod engine;
pub mod forces;
pub mod terrain;

pub use body::{Body, BodyId, Side};
pub use cannon::Cannon;
pub use collision::{
    CannonHit, CannonZone, ResolveMode, border_collide, cannon_hit, resolve_bodies, resolve_pair,
    segment_intersection, terrain_collide,
};
pub use engine::{Engine, RoundResult};
pub use forces::{Wind, gravity};
pub use terrain::{Landmarks, TerrainView};
