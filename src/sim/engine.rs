//! Fixed-step simulation engine
//!
//! Owns the live projectiles and both cannon zones and advances them one
//! frame at a time. A step never aborts halfway: a destroyed cannon is
//! latched and reported once the whole step has run.

use glam::Vec2;

use super::body::{Body, BodyId, Side};
use super::collision::{
    CannonHit, CannonZone, ResolveMode, border_collide, resolve_bodies, terrain_collide,
};
use super::terrain::TerrainView;
use crate::error::{EngineError, Result};
use crate::settings::{Preset, Settings};

/// How a round ended, seen from the engine's attacker side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    /// The attacker destroyed the opposing cannon
    AttackerWon { attacker: Side },
    /// The attacker's own cannon was destroyed
    AttackerLost { attacker: Side },
}

impl RoundResult {
    pub fn attacker(&self) -> Side {
        match *self {
            RoundResult::AttackerWon { attacker } | RoundResult::AttackerLost { attacker } => {
                attacker
            }
        }
    }

    pub fn winner(&self) -> Side {
        match *self {
            RoundResult::AttackerWon { attacker } => attacker,
            RoundResult::AttackerLost { attacker } => attacker.opposite(),
        }
    }

    /// Owner of the destroyed cannon
    pub fn destroyed(&self) -> Side {
        self.winner().opposite()
    }

    pub fn message(&self) -> &'static str {
        match self {
            RoundResult::AttackerWon { .. } => "YOU WON!",
            RoundResult::AttackerLost { .. } => "YOU LOST!",
        }
    }
}

/// Verlet circle engine
#[derive(Debug, Clone)]
pub struct Engine {
    settings: Settings,
    /// Live projectiles in creation order
    bodies: Vec<Body>,
    /// Cannon zones indexed by `Side::index`
    zones: [Option<CannonZone>; 2],
    /// Radius inflation, decays toward zero
    shock: f32,
    /// Next body sequence id
    next_sequence: u32,
    /// First result of the round, if any
    result: Option<RoundResult>,
    /// Steps taken since the last reset
    steps: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            bodies: Vec::new(),
            zones: [None, None],
            shock: 0.0,
            next_sequence: 0,
            result: None,
            steps: 0,
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Toggle the border constraint and cannon detection. The preset
    /// follows the toggles when they match one; otherwise it is left as is.
    pub fn configure(&mut self, border_constraint: bool, cannon_collision: bool) {
        self.settings.border_constraint = border_constraint;
        self.settings.cannon_collision = cannon_collision;
        if let Some(preset) = [Preset::Round, Preset::Stability].into_iter().find(|p| {
            p.border_constraint() == border_constraint && p.cannon_collision() == cannon_collision
        }) {
            self.settings.preset = preset;
        }
        log::info!(
            "Engine configured: border constraint {}, cannon collision {} ({} preset)",
            border_constraint,
            cannon_collision,
            self.settings.preset.as_str()
        );
    }

    /// Build a resting body with the next sequence id. It is not live
    /// until passed to `add_body` or `try_add_body`.
    pub fn create_body(&mut self, position: Vec2, mass: f32, side: Side) -> Result<Body> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(EngineError::InvalidMass(mass));
        }
        crate::ensure_finite(position)?;

        let id = BodyId(self.next_sequence);
        self.next_sequence = self
            .next_sequence
            .checked_add(1)
            .ok_or(EngineError::BodyIdsExhausted)?;
        Ok(Body::new(id, position, mass, side))
    }

    /// Make a body live, even if it overlaps others.
    ///
    /// The Verlet state may have been edited since `create_body`, so it is
    /// checked again here.
    pub fn add_body(&mut self, body: Body) -> Result<BodyId> {
        validate(&body)?;
        let id = body.id();
        self.bodies.push(body);
        Ok(id)
    }

    /// Make a body live unless it would start inside another one
    pub fn try_add_body(&mut self, body: Body) -> Result<Option<BodyId>> {
        validate(&body)?;
        if self.in_collision(&body) {
            return Ok(None);
        }
        let id = body.id();
        self.bodies.push(body);
        Ok(Some(id))
    }

    /// Whether `body` overlaps any live body other than itself
    pub fn in_collision(&self, body: &Body) -> bool {
        self.bodies
            .iter()
            .any(|other| other.id() != body.id() && body.overlaps(other))
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    #[cfg(test)]
    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id() == id)
    }

    /// Live bodies in creation order
    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Remove every body, clear zones and the round result, restore the
    /// round preset and restart sequence ids
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.zones = [None, None];
        self.shock = 0.0;
        self.next_sequence = 0;
        self.result = None;
        self.steps = 0;
        self.settings.apply_preset(Preset::Round);
        log::info!("Engine reset");
    }

    /// Inflate every radius to stress-test stability
    pub fn shock(&mut self) {
        self.shock = 1.0;
    }

    #[inline]
    pub fn shock_factor(&self) -> f32 {
        self.shock
    }

    pub fn set_cannon_zone(&mut self, side: Side, center: Vec2, radius: f32) {
        self.zones[side.index()] = Some(CannonZone {
            center,
            radius,
            side,
        });
    }

    /// Track a cannon's muzzle as it is re-aimed
    pub fn move_cannon_zone(&mut self, side: Side, center: Vec2) -> Result<()> {
        let zone = self.zones[side.index()]
            .as_mut()
            .ok_or(EngineError::MissingCannonZone(side))?;
        zone.center = center;
        Ok(())
    }

    pub fn cannon_zone(&self, side: Side) -> Option<&CannonZone> {
        self.zones[side.index()].as_ref()
    }

    /// Result of the current round, once decided
    #[inline]
    pub fn round_result(&self) -> Option<RoundResult> {
        self.result
    }

    /// Advance the simulation by one frame.
    ///
    /// `dt` is the time step of each substep. Returns the round result on
    /// the step a cannon is destroyed, `None` on every other step.
    pub fn step(
        &mut self,
        dt: f32,
        terrain: &TerrainView,
        wind: Vec2,
        gravity: Vec2,
    ) -> Result<Option<RoundResult>> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EngineError::InvalidTimestep(dt));
        }
        for force in [wind, gravity] {
            if !force.is_finite() {
                return Err(EngineError::NonFiniteForce {
                    x: force.x,
                    y: force.y,
                });
            }
        }

        let mut hit = None;
        for _ in 0..self.settings.substeps.max(1) {
            self.accelerate(dt, wind, gravity);

            hit = hit.or(self.collide_bodies(ResolveMode::DEPENETRATE));
            if self.settings.border_constraint {
                self.collide_border(false);
            }

            for _ in 0..self.settings.terrain_passes {
                self.collide_terrain(terrain);
            }

            for body in &mut self.bodies {
                body.preserve_inertia();
            }

            hit = hit.or(self.collide_bodies(ResolveMode::ELASTIC));
            if self.settings.border_constraint {
                self.collide_border(true);
            }
        }

        self.shock = (self.shock - self.settings.shock_decay).max(0.0);
        self.cleanup(terrain.horizon());
        self.steps += 1;

        Ok(hit.and_then(|hit| self.record(hit)))
    }

    /// Gravity on everything, wind only on airborne bodies, then integrate
    fn accelerate(&mut self, dt: f32, wind: Vec2, gravity: Vec2) {
        for body in &mut self.bodies {
            body.add_force(gravity);
            if !body.has_hit_terrain {
                body.add_force(wind);
            }
            body.integrate(dt, self.shock);
        }
    }

    fn collide_bodies(&mut self, mode: ResolveMode) -> Option<CannonHit> {
        let zones: Vec<CannonZone> = if self.settings.cannon_collision {
            self.zones.iter().flatten().copied().collect()
        } else {
            Vec::new()
        };
        resolve_bodies(&mut self.bodies, &zones, mode, self.settings.damping)
    }

    fn collide_border(&mut self, preserving_impulse: bool) {
        let Settings {
            width,
            height,
            damping,
            ..
        } = self.settings;
        for body in &mut self.bodies {
            border_collide(body, width, height, preserving_impulse, damping);
        }
    }

    fn collide_terrain(&mut self, terrain: &TerrainView) {
        let guard = self.settings.tunneling_guard;
        for body in &mut self.bodies {
            if terrain_collide(body, terrain, guard) {
                log::debug!("Body {:?} stopped by terrain at {}", body.id(), body.pos);
            }
        }
    }

    /// Drop bodies that left the playfield or sank below the water line
    fn cleanup(&mut self, horizon: f32) {
        if self.settings.border_constraint {
            return;
        }
        let (width, height) = (self.settings.width, self.settings.height);
        let before = self.bodies.len();
        self.bodies.retain(|b| {
            let r = b.radius;
            !(b.pos.x + r < 0.0
                || b.pos.x - r > width
                || b.pos.y - r > height
                || b.pos.y - r > horizon)
        });
        let removed = before - self.bodies.len();
        if removed > 0 {
            log::debug!("Removed {} bodies, {} live", removed, self.bodies.len());
        }
    }

    /// Latch the first cannon hit of the round
    fn record(&mut self, hit: CannonHit) -> Option<RoundResult> {
        if self.result.is_some() {
            return None;
        }
        let attacker = self.settings.attacker;
        let result = if hit.owner == attacker {
            RoundResult::AttackerLost { attacker }
        } else {
            RoundResult::AttackerWon { attacker }
        };
        log::info!(
            "{:?} cannon destroyed by body {:?} ({:?}) after {} steps: {}",
            hit.owner,
            hit.body,
            hit.shooter,
            self.steps,
            result.message()
        );
        self.result = Some(result);
        Some(result)
    }
}

/// Reject bodies whose state would turn the simulation into NaN
fn validate(body: &Body) -> Result<()> {
    if !body.mass.is_finite() || body.mass <= 0.0 {
        return Err(EngineError::InvalidMass(body.mass));
    }
    crate::ensure_finite(body.pos)?;
    crate::ensure_finite(body.prev_pos)?;
    if !body.force.is_finite() {
        return Err(EngineError::NonFiniteForce {
            x: body.force.x,
            y: body.force.y,
        });
    }
    Ok(())
}
