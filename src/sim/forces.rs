//! External force sources: gravity and a slowly oscillating lateral wind

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_WIND_FORCE, WIND_PHASE_STEP};
use crate::direction_from_angle;

/// Gravity of magnitude `factor`, rotated by `angle` from straight down
#[inline]
pub fn gravity(angle: f32, factor: f32) -> Vec2 {
    direction_from_angle(angle) * factor
}

/// Time-varying horizontal wind: `max_force * sin(phase)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    phase: f32,
    step_size: f32,
    max_force: f32,
    force: Vec2,
}

impl Wind {
    /// Wind starting at a random point of its cycle
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::with_phase(rng.random_range(0.0..std::f32::consts::TAU))
    }

    pub fn with_phase(phase: f32) -> Self {
        Self {
            phase,
            step_size: WIND_PHASE_STEP,
            max_force: MAX_WIND_FORCE,
            force: Vec2::ZERO,
        }
    }

    /// Advance the cycle by one frame
    pub fn step(&mut self) {
        self.phase += self.step_size;
        self.force.x = self.max_force * self.phase.sin();
    }

    #[inline]
    pub fn force(&self) -> Vec2 {
        self.force
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }
}
