//! Engine settings and presets
//!
//! Persisted as JSON so stability runs can be reproduced with the same knobs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::sim::Side;

/// Preset configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Normal duel: bodies die at the water line, cannons can be hit
    #[default]
    Round,
    /// Stability demo: bodies are kept inside the playfield, cannons are inert
    Stability,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Round => "Round",
            Preset::Stability => "Stability",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "round" | "duel" => Some(Preset::Round),
            "stability" | "demo" => Some(Preset::Stability),
            _ => None,
        }
    }

    /// Whether bodies are clamped to the playfield
    pub fn border_constraint(&self) -> bool {
        match self {
            Preset::Round => false,
            Preset::Stability => true,
        }
    }

    /// Whether projectiles can destroy cannons
    pub fn cannon_collision(&self) -> bool {
        match self {
            Preset::Round => true,
            Preset::Stability => false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Active preset
    pub preset: Preset,

    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Physics ===
    /// Gravity magnitude used by `forces::gravity`
    pub gravity_factor: f32,
    /// Velocity damping on collisions (0..1)
    pub damping: f32,
    /// Shock decay per step
    pub shock_decay: f32,
    /// Integration substeps per `step` call
    pub substeps: u32,
    /// Terrain resolution passes per substep
    pub terrain_passes: u32,
    /// Segment-intersection check against terrain for fast bodies
    pub tunneling_guard: bool,

    // === Modes ===
    /// Clamp bodies to the playfield instead of culling them
    pub border_constraint: bool,
    /// Detect projectiles entering cannon zones
    pub cannon_collision: bool,
    /// Side whose point of view round results are reported from
    #[serde(default)]
    pub attacker: Side,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Round,

            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,

            gravity_factor: GRAVITY_FACTOR,
            damping: DAMPING,
            shock_decay: SHOCK_DECAY,
            substeps: 1,
            terrain_passes: TERRAIN_PASSES,
            tunneling_guard: true,

            border_constraint: false,
            cannon_collision: true,
            attacker: Side::Player,
        }
    }
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (updates mode toggles)
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;
        self.border_constraint = preset.border_constraint();
        self.cannon_collision = preset.cannon_collision();
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} preset)",
            path.as_ref().display(),
            settings.preset.as_str()
        );
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
