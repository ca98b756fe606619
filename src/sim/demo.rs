//! Scripted scenarios for exercising the engine
//!
//! All randomness goes through the caller's RNG so a seed reproduces a run.

use glam::Vec2;
use rand::Rng;

use super::body::{BodyId, Side};
use super::engine::Engine;
use super::terrain::TerrainView;
use crate::consts::*;
use crate::error::Result;
use crate::settings::Settings;

/// Placement attempts per requested body before `fill` gives up
const FILL_ATTEMPTS_PER_BODY: usize = 50;

/// Stability stress test: pack `count` random bodies into the playfield with
/// the border on and cannons inert. The first half belongs to the player.
///
/// Returns how many bodies were placed; crowded playfields may get fewer.
pub fn fill(engine: &mut Engine, rng: &mut impl Rng, count: usize) -> Result<usize> {
    engine.configure(true, false);
    let (width, height) = (engine.settings().width, engine.settings().height);

    let mut placed = 0;
    for _ in 0..count * FILL_ATTEMPTS_PER_BODY {
        if placed == count {
            break;
        }
        let pos = Vec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
        let mass = rng.random_range(PROJECTILE_MIN_MASS..PROJECTILE_MAX_MASS);
        let side = if placed < count / 2 {
            Side::Player
        } else {
            Side::Opponent
        };
        let body = engine.create_body(pos, mass, side)?;
        if engine.try_add_body(body)?.is_some() {
            placed += 1;
        }
    }

    if placed < count {
        log::warn!("Fill placed {placed} of {count} bodies");
    } else {
        log::info!("Fill placed {placed} bodies");
    }
    Ok(placed)
}

/// A heavy and a light body pushed toward each other around `center`
pub fn momentum(
    engine: &mut Engine,
    center: Vec2,
    rng: &mut impl Rng,
) -> Result<Option<(BodyId, BodyId)>> {
    let mut heavy = engine.create_body(center - Vec2::new(50.0, 0.0), 2.0, Side::Player)?;
    heavy.add_force(Vec2::new(30.0, 0.0));
    let offset = Vec2::new(50.0, rng.random_range(0.0..5.0));
    let mut light = engine.create_body(center + offset, 0.6, Side::Opponent)?;
    light.add_force(Vec2::new(-30.0, 0.0));

    let Some(heavy) = engine.try_add_body(heavy)? else {
        return Ok(None);
    };
    Ok(engine.try_add_body(light)?.map(|light| (heavy, light)))
}

/// Drop an enemy body just above `victim`'s cannon
pub fn self_destruct(engine: &mut Engine, cannon_base: Vec2, victim: Side) -> Result<BodyId> {
    let dx = match victim {
        Side::Player => 10.0,
        Side::Opponent => -10.0,
    };
    let body = engine.create_body(cannon_base + Vec2::new(dx, -50.0), 1.0, victim.opposite())?;
    engine.add_body(body)
}

/// Random two-summit landscape sized to `settings`' playfield
pub fn random_layout(rng: &mut impl Rng, settings: &Settings) -> Result<TerrainView> {
    let (width, height) = (settings.width, settings.height);
    let horizon = HORIZON_RATIO * height;

    let left_summit = Vec2::new(
        rng.random_range(0.1 * width..0.2 * width),
        horizon - rng.random_range(150.0..400.0),
    );
    let sea_floor = Vec2::new(width / 2.0, horizon + 175.0);
    let right_summit = Vec2::new(
        rng.random_range(0.8 * width..0.9 * width),
        horizon - rng.random_range(150.0..400.0),
    );
    log::debug!("Layout summits at {left_summit} and {right_summit}, horizon {horizon}");

    TerrainView::mountains(
        width,
        TERRAIN_SEGMENT_WIDTH,
        horizon,
        left_summit,
        sea_floor,
        right_summit,
    )
}
