//! Cannon Duel headless runner
//!
//! Builds a random landscape, lets two scripted cannons trade shots and
//! logs how the round ends. Set `RUST_LOG=debug` to follow every shot.
//!
//! Usage: `cannon-duel [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use cannon_duel::{
    Result, Settings,
    consts::SIM_DT,
    sim::{Cannon, Engine, Side, Wind, demo, gravity},
};

/// Frames before a round is called a draw
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 20_000;
/// Frames between shots from the same cannon
#[cfg(not(target_arch = "wasm32"))]
const RELOAD_FRAMES: u64 = 240;
/// Aim speed in radians per frame
#[cfg(not(target_arch = "wasm32"))]
const STEER_STEP: f32 = 0.01;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cannon Duel (headless) starting...");

    if let Err(e) = run() {
        log::error!("Duel aborted: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(rand::random);
    log::info!("Duel seed: {seed}");

    let mut rng = Pcg32::seed_from_u64(seed);
    let terrain = demo::random_layout(&mut rng, &settings)?;
    let g = gravity(0.0, settings.gravity_factor);
    let mut engine = Engine::new(settings);
    let mut wind = Wind::new(&mut rng);

    let mut cannons = [
        Cannon::new(terrain.left_cannon_base(), Side::Player, &mut rng),
        Cannon::new(terrain.right_cannon_base(), Side::Opponent, &mut rng),
    ];
    for cannon in &cannons {
        let zone = cannon.zone();
        engine.set_cannon_zone(cannon.side(), zone.center, zone.radius);
    }
    let mut targets: [f32; 2] = [rng.random_range(0.2..1.2), rng.random_range(0.2..1.2)];

    for frame in 0..MAX_FRAMES {
        wind.step();

        for (cannon, target) in cannons.iter_mut().zip(targets.iter_mut()) {
            let on_target = cannon.steer_toward(*target, STEER_STEP);
            engine.move_cannon_zone(cannon.side(), cannon.muzzle_center())?;

            // Take turns: the opponent fires half a reload after the player
            let offset = cannon.side().index() as u64 * RELOAD_FRAMES / 2;
            if on_target && frame % RELOAD_FRAMES == offset {
                cannon.randomize_charge(&mut rng);
                if cannon.fire(&mut engine, &mut rng)?.is_some() {
                    *target = rng.random_range(0.2..1.2);
                }
            }
        }

        if let Some(result) = engine.step(SIM_DT, &terrain, wind.force(), g)? {
            log::info!(
                "{} {:?} wins after {} frames",
                result.message(),
                result.winner(),
                frame + 1
            );
            return Ok(());
        }
    }

    log::info!(
        "No cannon destroyed after {MAX_FRAMES} frames, {} bodies in play",
        engine.count()
    );
    Ok(())
}
