//! Circular point-mass bodies with Verlet state
//!
//! Velocity is never stored: it is `pos - prev_pos`, and every collision
//! response edits `prev_pos` to change it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which of the two parties owns a body or a cannon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Left cannon
    #[default]
    Player,
    /// Right cannon
    Opponent,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Slot index for per-side arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}

/// Stable body identity (creation sequence within a round)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// A projectile
///
/// Only [`Engine::create_body`](super::Engine::create_body) builds bodies,
/// so mass and radius are always valid. Callers may adjust the Verlet state
/// before handing a body to the engine.
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    id: BodyId,
    pub pos: Vec2,
    /// Position at the previous step (Verlet state)
    pub prev_pos: Vec2,
    /// Forces accumulated since the last integration
    pub force: Vec2,
    /// Current radius (inflated by shock)
    pub(crate) radius: f32,
    /// Unshocked radius
    pub(crate) base_radius: f32,
    pub(crate) mass: f32,
    pub(crate) side: Side,
    /// Latched once the body touches terrain; never cleared
    pub(crate) has_hit_terrain: bool,
}

impl Body {
    /// Create a resting body. Mass must already be validated by the caller.
    pub(crate) fn new(id: BodyId, pos: Vec2, mass: f32, side: Side) -> Self {
        let radius = MASS_TO_RADIUS * mass;
        Self {
            id,
            pos,
            prev_pos: pos,
            force: Vec2::ZERO,
            radius,
            base_radius: radius,
            mass,
            side,
            has_hit_terrain: false,
        }
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn previous_position(&self) -> Vec2 {
        self.prev_pos
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn has_hit_terrain(&self) -> bool {
        self.has_hit_terrain
    }

    /// Implied velocity per step
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev_pos
    }

    /// Non-physical inverse mass, tuned for feel rather than SI units
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        1.0 / (1.0 + self.mass)
    }

    /// Distance between centers
    #[inline]
    pub fn separation(&self, point: Vec2) -> f32 {
        self.pos.distance(point)
    }

    /// Smallest center distance at which two circles do not overlap
    #[inline]
    pub fn min_separation(&self, other_radius: f32) -> f32 {
        self.radius + other_radius
    }

    /// Whether this body overlaps another
    pub fn overlaps(&self, other: &Body) -> bool {
        self.separation(other.pos) < self.min_separation(other.radius)
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Apply the accumulated force and clear it
    pub fn integrate(&mut self, dt: f32, shock: f32) {
        self.radius = self.base_radius + SHOCK_RADIUS_GAIN * self.base_radius * shock;
        self.pos += self.force * self.inv_mass() * dt * dt;
        self.force = Vec2::ZERO;
    }

    /// Carry the implied velocity forward one step
    pub fn preserve_inertia(&mut self) {
        let next = 2.0 * self.pos - self.prev_pos;
        self.prev_pos = self.pos;
        self.pos = next;
    }

    /// Zero the implied velocity
    #[inline]
    pub fn stop(&mut self) {
        self.prev_pos = self.pos;
    }
}
