//! Heightmap terrain consumed read-only by the engine
//!
//! Screen space: y grows downward, so "above the surface" means smaller y.
//! The three landmarks (left summit, sea floor, right summit) split the
//! heightmap into four monotonic regions; collision only scans the region
//! a body is over.

use std::ops::Range;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Allowed deviation of a normal's length from 1
const NORMAL_TOLERANCE: f32 = 1e-3;

/// Structurally significant vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmarks {
    pub left_summit: usize,
    pub sea_floor: usize,
    pub right_summit: usize,
}

/// Vertex heightmap with per-vertex normals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainView {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    segment_width: f32,
    landmarks: Landmarks,
    /// Water line y
    horizon: f32,
}

impl TerrainView {
    /// Wrap a precomputed heightmap, validating its invariants
    pub fn new(
        vertices: Vec<Vec2>,
        normals: Vec<Vec2>,
        segment_width: f32,
        landmarks: Landmarks,
        horizon: f32,
    ) -> Result<Self> {
        let len = vertices.len();
        if len < 5 {
            return Err(EngineError::TerrainTooShort(len));
        }
        if normals.len() != len {
            return Err(EngineError::TerrainLengthMismatch {
                vertices: len,
                normals: normals.len(),
            });
        }
        if !segment_width.is_finite() || segment_width <= 0.0 {
            return Err(EngineError::InvalidSegmentWidth(segment_width));
        }
        for (i, v) in vertices.iter().enumerate() {
            crate::ensure_finite(*v)?;
            if i > 0 && v.x <= vertices[i - 1].x {
                return Err(EngineError::TerrainNotMonotonic(i));
            }
        }
        for (index, n) in normals.iter().enumerate() {
            if !n.is_finite() || (n.length() - 1.0).abs() > NORMAL_TOLERANCE {
                return Err(EngineError::InvalidNormal {
                    index,
                    x: n.x,
                    y: n.y,
                });
            }
        }
        let Landmarks {
            left_summit: left,
            sea_floor: sea,
            right_summit: right,
        } = landmarks;
        if !(0 < left && left < sea && sea < right && right < len - 1) {
            return Err(EngineError::InvalidLandmarks {
                left,
                sea,
                right,
                len,
            });
        }

        Ok(Self {
            vertices,
            normals,
            segment_width,
            landmarks,
            horizon,
        })
    }

    /// Wrap a heightmap and derive normals from neighbouring vertices
    pub fn with_derived_normals(
        vertices: Vec<Vec2>,
        segment_width: f32,
        landmarks: Landmarks,
        horizon: f32,
    ) -> Result<Self> {
        let normals = derive_normals(&vertices);
        Self::new(vertices, normals, segment_width, landmarks, horizon)
    }

    /// Noise-free mountain profile: edge → left summit → sea floor →
    /// right summit → edge, sampled every `segment_width`.
    pub fn mountains(
        width: f32,
        segment_width: f32,
        horizon: f32,
        left_summit: Vec2,
        sea_floor: Vec2,
        right_summit: Vec2,
    ) -> Result<Self> {
        if !segment_width.is_finite() || segment_width <= 0.0 {
            return Err(EngineError::InvalidSegmentWidth(segment_width));
        }
        let count = (width / segment_width) as usize + 1;
        let left_edge = Vec2::new(0.0, horizon);
        let right_edge = Vec2::new(width, horizon);

        let mut vertices = Vec::with_capacity(count);
        let mut landmarks = Landmarks {
            left_summit: 0,
            sea_floor: 0,
            right_summit: 0,
        };
        for i in 0..count {
            let x = i as f32 * segment_width;
            let vertex = if x < left_summit.x {
                landmarks.left_summit = i + 1;
                interpolate(left_edge, left_summit, x)
            } else if x < sea_floor.x {
                landmarks.sea_floor = i + 1;
                interpolate(left_summit, sea_floor, x)
            } else if x < right_summit.x {
                landmarks.right_summit = i + 1;
                interpolate(sea_floor, right_summit, x)
            } else {
                interpolate(right_summit, right_edge, x)
            };
            vertices.push(vertex);
        }

        Self::with_derived_normals(vertices, segment_width, landmarks, horizon)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    #[inline]
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    #[inline]
    pub fn segment_width(&self) -> f32 {
        self.segment_width
    }

    #[inline]
    pub fn landmarks(&self) -> Landmarks {
        self.landmarks
    }

    #[inline]
    pub fn horizon(&self) -> f32 {
        self.horizon
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false: construction rejects short heightmaps
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Start point and direction of segment `j` (vertex j to j+1)
    #[inline]
    pub fn segment(&self, j: usize) -> (Vec2, Vec2) {
        (self.vertices[j], self.vertices[j + 1] - self.vertices[j])
    }

    /// Range of segment indices worth scanning for a body at `x`.
    ///
    /// Picks the landmark region containing `x`, padded by one segment on
    /// each side so bodies straddling a landmark still see both neighbours.
    pub fn window(&self, x: f32) -> Result<Range<usize>> {
        let first = self.vertices[0].x;
        let last = self.vertices[self.vertices.len() - 1].x;
        if !x.is_finite() || x < first || x > last {
            return Err(EngineError::PositionOutOfRange(x));
        }

        let Landmarks {
            left_summit,
            sea_floor,
            right_summit,
        } = self.landmarks;
        let segments = self.vertices.len() - 1;
        let (low, high) = if x < self.vertices[left_summit].x {
            (0, left_summit)
        } else if x < self.vertices[sea_floor].x {
            (left_summit, sea_floor)
        } else if x < self.vertices[right_summit].x {
            (sea_floor, right_summit)
        } else {
            (right_summit, segments)
        };

        Ok(low.saturating_sub(1)..(high + 1).min(segments))
    }

    /// Segment in `window` whose open x-interval contains `x`
    pub fn segment_under(&self, x: f32, window: Range<usize>) -> Option<usize> {
        let slice = &self.vertices[window.start..=window.end.min(self.vertices.len() - 1)];
        // First vertex at or right of x
        let right = slice.partition_point(|v| v.x < x);
        if right == 0 || right >= slice.len() {
            return None;
        }
        let j = window.start + right - 1;
        (self.vertices[j].x < x && x < self.vertices[j + 1].x).then_some(j)
    }

    /// Surface y at `x` by linear interpolation inside segment `j`
    pub fn height_in_segment(&self, j: usize, x: f32) -> f32 {
        let a = self.vertices[j];
        let b = self.vertices[j + 1];
        let t = (x - a.x) / (b.x - a.x);
        a.y + (b.y - a.y) * t
    }

    /// Base of the left cannon: a third of the way from the left summit
    /// down to the water line
    pub fn left_cannon_base(&self) -> Vec2 {
        let start = self.landmarks.left_summit;
        let mut index = start;
        while index < self.landmarks.sea_floor && self.vertices[index].y < self.horizon {
            index += 1;
        }
        self.vertices[start + (index - start) / 3]
    }

    /// Base of the right cannon, mirrored from the left
    pub fn right_cannon_base(&self) -> Vec2 {
        let start = self.landmarks.right_summit;
        let mut index = start;
        while index > self.landmarks.sea_floor && self.vertices[index].y < self.horizon {
            index -= 1;
        }
        self.vertices[start - (start - index) / 3]
    }
}

/// Point on the line `start → end` at horizontal position `x`
fn interpolate(start: Vec2, end: Vec2, x: f32) -> Vec2 {
    let t = (x - start.x) / (end.x - start.x);
    Vec2::new(x, start.y + t * (end.y - start.y))
}

/// Perpendicular of the central difference at each interior vertex; the
/// two end vertices copy their neighbour.
fn derive_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    if n < 3 {
        return vec![Vec2::NEG_Y; n];
    }
    let mut normals = vec![Vec2::ZERO; n];
    for i in 1..n - 1 {
        let d = vertices[i + 1] - vertices[i - 1];
        normals[i] = Vec2::new(d.y, -d.x).normalize_or(Vec2::NEG_Y);
    }
    normals[0] = normals[1];
    normals[n - 1] = normals[n - 2];
    normals
}

/// Flat heightmap used by collision tests across the crate
#[cfg(test)]
pub(crate) fn flat(width: f32, surface: f32, horizon: f32) -> TerrainView {
    let segment_width = 4.0;
    let count = (width / segment_width) as usize + 1;
    let vertices = (0..count)
        .map(|i| Vec2::new(i as f32 * segment_width, surface))
        .collect();
    let landmarks = Landmarks {
        left_summit: count / 4,
        sea_floor: count / 2,
        right_summit: 3 * count / 4,
    };
    TerrainView::with_derived_normals(vertices, segment_width, landmarks, horizon).unwrap()
}
