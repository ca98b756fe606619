//! Cannon Duel - an artillery duel over a mountain landscape
//!
//! Core modules:
//! - `sim`: Verlet circle physics, terrain collision and round detection
//! - `settings`: Engine configuration and presets
//! - `error`: Caller contract violations

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{EngineError, Result};
pub use settings::{Preset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation time step per frame (one substep of half a unit)
    pub const SIM_DT: f32 = 0.5;

    /// Playfield dimensions (screen space, y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 1104.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Water line as a fraction of the playfield height
    pub const HORIZON_RATIO: f32 = 0.85;

    /// Downward gravity magnitude
    pub const GRAVITY_FACTOR: f32 = 0.5;
    /// Velocity damping applied on body and border collisions
    pub const DAMPING: f32 = 0.9;

    /// Body radius per unit of mass
    pub const MASS_TO_RADIUS: f32 = 10.0;
    /// Radius inflation at full shock
    pub const SHOCK_RADIUS_GAIN: f32 = 0.35;
    /// Shock decay per step
    pub const SHOCK_DECAY: f32 = 0.01;

    /// Path lengthening for the terrain tunneling guard
    pub const TUNNELING_SLACK: f32 = 1.22;
    /// Terrain resolution passes per step
    pub const TERRAIN_PASSES: u32 = 2;
    /// Horizontal spacing of terrain vertices
    pub const TERRAIN_SEGMENT_WIDTH: f32 = 4.0;

    /// Wind
    pub const MAX_WIND_FORCE: f32 = 0.1;
    pub const WIND_PHASE_STEP: f32 = 0.004;

    /// Cannon defaults
    pub const CANNON_LENGTH: f32 = 40.0;
    pub const CANNON_MAX_FORCE: f32 = 60.0;
    /// Zone radius relative to half the barrel (smaller is harder to hit)
    pub const CANNON_ZONE_SCALE: f32 = 0.75;
    pub const PROJECTILE_MIN_MASS: f32 = 0.5;
    pub const PROJECTILE_MAX_MASS: f32 = 1.0;
}

/// Unit direction for an angle measured the way the cannons aim:
/// `(sin θ, cos θ)`, so `θ = π/2` points along +x.
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// 2-D cross product (z component of the 3-D cross)
#[inline]
pub fn cross2d(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Check a vector has no NaN/infinite components
#[inline]
pub fn ensure_finite(pos: Vec2) -> Result<Vec2> {
    if pos.is_finite() {
        Ok(pos)
    } else {
        Err(EngineError::NonFinitePosition { x: pos.x, y: pos.y })
    }
}
