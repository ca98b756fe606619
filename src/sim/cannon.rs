//! Steerable cannons that launch projectiles into the engine

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, Side};
use super::collision::CannonZone;
use super::engine::Engine;
use crate::consts::*;
use crate::direction_from_angle;
use crate::error::Result;

/// A cannon fixed to the terrain at `base`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannon {
    base: Vec2,
    /// Elevation in `[0, π/2]`, 0 is horizontal
    angle: f32,
    /// Launch strength in `[0, 1]`
    charge: f32,
    /// Mass of the next projectile
    next_mass: f32,
    side: Side,
    length: f32,
    max_force: f32,
}

impl Cannon {
    pub fn new(base: Vec2, side: Side, rng: &mut impl Rng) -> Self {
        Self {
            base,
            angle: 0.0,
            charge: 0.0,
            next_mass: pick_mass(rng),
            side,
            length: CANNON_LENGTH,
            max_force: CANNON_MAX_FORCE,
        }
    }

    #[inline]
    pub fn base(&self) -> Vec2 {
        self.base
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn charge_level(&self) -> f32 {
        self.charge
    }

    #[inline]
    pub fn next_mass(&self) -> f32 {
        self.next_mass
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle.clamp(0.0, FRAC_PI_2);
    }

    pub fn raise(&mut self, amount: f32) {
        self.set_angle(self.angle + amount);
    }

    pub fn lower(&mut self, amount: f32) {
        self.set_angle(self.angle - amount);
    }

    /// Turn at most `step` toward `target`. Returns true once on target.
    pub fn steer_toward(&mut self, target: f32, step: f32) -> bool {
        let target = target.clamp(0.0, FRAC_PI_2);
        let delta = target - self.angle;
        if delta.abs() <= step {
            self.angle = target;
            true
        } else {
            self.raise(step.copysign(delta));
            false
        }
    }

    pub fn charge(&mut self, amount: f32) {
        self.charge = (self.charge + amount).clamp(0.0, 1.0);
    }

    pub fn discharge(&mut self, amount: f32) {
        self.charge = (self.charge - amount).clamp(0.0, 1.0);
    }

    /// Pick a charge the way the computer opponent does
    pub fn randomize_charge(&mut self, rng: &mut impl Rng) {
        self.charge = rng.random_range(0.6..0.7);
    }

    /// Unit barrel direction. Both cannons face the valley.
    pub fn aim_direction(&self) -> Vec2 {
        let angle = match self.side {
            Side::Player => self.angle + FRAC_PI_2,
            Side::Opponent => -(self.angle + FRAC_PI_2),
        };
        direction_from_angle(angle)
    }

    /// Middle of the barrel
    pub fn muzzle_center(&self) -> Vec2 {
        self.base + self.aim_direction() * (self.length / 2.0)
    }

    pub fn zone_radius(&self) -> f32 {
        CANNON_ZONE_SCALE * self.length / 2.0
    }

    /// Collision zone guarding this cannon
    pub fn zone(&self) -> CannonZone {
        CannonZone {
            center: self.muzzle_center(),
            radius: self.zone_radius(),
            side: self.side,
        }
    }

    /// Launch a projectile from the barrel tip.
    ///
    /// Returns `None` without consuming the charge when the projectile
    /// would start inside a live body.
    pub fn fire(&mut self, engine: &mut Engine, rng: &mut impl Rng) -> Result<Option<BodyId>> {
        let direction = self.aim_direction();
        let mut body = engine.create_body(
            self.base + direction * self.length,
            self.next_mass,
            self.side,
        )?;
        body.add_force(direction * (self.charge * self.max_force));

        let Some(id) = engine.try_add_body(body)? else {
            log::warn!("{:?} cannon blocked, muzzle is obstructed", self.side);
            return Ok(None);
        };
        log::debug!(
            "{:?} fired {:?}: mass {:.2}, charge {:.2}, angle {:.2}",
            self.side,
            id,
            self.next_mass,
            self.charge,
            self.angle
        );
        self.charge = 0.0;
        self.next_mass = pick_mass(rng);
        Ok(Some(id))
    }
}

fn pick_mass(rng: &mut impl Rng) -> f32 {
    rng.random_range(PROJECTILE_MIN_MASS..PROJECTILE_MAX_MASS)
}
