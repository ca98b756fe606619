//! Error types for the duel engine.
//!
//! Only caller contract violations end up here. Round termination is a
//! normal outcome and travels through [`crate::sim::RoundResult`].

use thiserror::Error;

use crate::sim::Side;

/// Errors raised when a caller breaks the engine's preconditions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Body mass must be finite and strictly positive.
    #[error("invalid body mass: {0} (must be finite and > 0)")]
    InvalidMass(f32),

    /// A position contained NaN or infinity.
    #[error("non-finite position: ({x}, {y})")]
    NonFinitePosition {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Wind or gravity contained NaN or infinity.
    #[error("non-finite force: ({x}, {y})")]
    NonFiniteForce {
        /// X component.
        x: f32,
        /// Y component.
        y: f32,
    },

    /// Time step must be finite and strictly positive.
    #[error("invalid time step: {0}")]
    InvalidTimestep(f32),

    /// Terrain needs at least enough vertices to hold its landmarks.
    #[error("terrain has {0} vertices, need at least 5")]
    TerrainTooShort(usize),

    /// Vertex and normal arrays differ in length.
    #[error("terrain has {vertices} vertices but {normals} normals")]
    TerrainLengthMismatch {
        /// Vertex count.
        vertices: usize,
        /// Normal count.
        normals: usize,
    },

    /// Normals must be finite unit vectors.
    #[error("terrain normal {index} is not a unit vector: ({x}, {y})")]
    InvalidNormal {
        /// Vertex index.
        index: usize,
        /// X component.
        x: f32,
        /// Y component.
        y: f32,
    },

    /// Vertices must be strictly increasing in x.
    #[error("terrain vertex {0} does not increase in x")]
    TerrainNotMonotonic(usize),

    /// Segment width must be finite and strictly positive.
    #[error("invalid terrain segment width: {0}")]
    InvalidSegmentWidth(f32),

    /// Landmarks must satisfy `0 < left < sea < right < len - 1`.
    #[error("invalid terrain landmarks: left={left} sea={sea} right={right} (len {len})")]
    InvalidLandmarks {
        /// Left summit index.
        left: usize,
        /// Sea floor index.
        sea: usize,
        /// Right summit index.
        right: usize,
        /// Vertex count.
        len: usize,
    },

    /// Window query for an x outside the terrain span.
    #[error("x = {0} lies outside the terrain span")]
    PositionOutOfRange(f32),

    /// Every body id of the round has been handed out.
    #[error("body ids exhausted, reset the engine")]
    BodyIdsExhausted,

    /// Zone move requested before the zone was placed.
    #[error("no cannon zone set for {0:?}")]
    MissingCannonZone(Side),

    /// Reading or writing a settings file failed.
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Settings JSON could not be parsed or produced.
    #[error("settings JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
