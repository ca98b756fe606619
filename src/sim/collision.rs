//! Collision detection and response for Verlet circles
//!
//! Everything here is position based: overlaps are fixed by moving
//! `pos` directly, and velocity changes are expressed by rewriting
//! `prev_pos`. No impulses are stored.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, Side};
use super::terrain::TerrainView;
use crate::consts::TUNNELING_SLACK;
use crate::cross2d;

/// How a body-body pass treats the colliding pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveMode {
    /// Rewrite velocities with the elastic-collision response
    pub preserving_impulse: bool,
    /// Split corrections by mass ratio instead of 50/50
    pub preserving_momentum: bool,
}

impl ResolveMode {
    /// Pure depenetration, mass weighted
    pub const DEPENETRATE: Self = Self {
        preserving_impulse: false,
        preserving_momentum: true,
    };
    /// Depenetration plus elastic velocity response
    pub const ELASTIC: Self = Self {
        preserving_impulse: true,
        preserving_momentum: true,
    };
}

/// Proximity target around a cannon's muzzle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannonZone {
    pub center: Vec2,
    pub radius: f32,
    /// Owner of the cannon
    pub side: Side,
}

/// A projectile reached a cannon zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannonHit {
    pub body: BodyId,
    /// Side that fired the projectile
    pub shooter: Side,
    /// Side whose cannon was hit
    pub owner: Side,
}

/// Whether a projectile destroys the cannon guarded by `zone`.
///
/// Only airborne projectiles from the other side count.
pub fn cannon_hit(body: &Body, zone: &CannonZone) -> bool {
    !body.has_hit_terrain
        && body.side != zone.side
        && body.separation(zone.center) < body.min_separation(zone.radius)
}

/// Resolve one overlapping pair. Returns true if they overlapped.
///
/// Coincident centers have no separating direction and are skipped.
pub fn resolve_pair(a: &mut Body, b: &mut Body, mode: ResolveMode, damping: f32) -> bool {
    let separation = a.separation(b.pos);
    let min_separation = a.min_separation(b.radius);
    if !(separation < min_separation && separation != 0.0) {
        return false;
    }

    let dn = a.pos - b.pos;
    let (m1, m2) = (a.mass, b.mass);
    let total = m1 + m2;

    // Hard constraint: push apart along the center line
    let conflict = (min_separation - separation) / separation;
    let (share_a, share_b) = if mode.preserving_momentum {
        (m2 / total, m1 / total)
    } else {
        (0.5, 0.5)
    };
    a.pos += dn * (share_a * conflict);
    b.pos -= dn * (share_b * conflict);

    if !mode.preserving_impulse {
        return true;
    }

    let mut v1 = a.velocity();
    let mut v2 = b.velocity();
    let n = dn / separation;

    if mode.preserving_momentum {
        let t = Vec2::new(n.y, -n.x);
        let v1n = damping * v1.dot(n);
        let v1t = damping * v1.dot(t);
        let v2n = damping * v2.dot(n);
        let v2t = damping * v2.dot(t);
        // Normal speeds enter as magnitudes and the own-mass term is
        // subtracted. Equal masses reduce this to a plain exchange.
        v1 = t * v1t + n * (2.0 * m2 / total * v2n.abs() - (m1 - m2) / total * v1n.abs());
        v2 = t * v2t - n * (2.0 * m1 / total * v1n.abs() - (m2 - m1) / total * v2n.abs());
    } else {
        let proj1 = n * (damping * n.dot(v1));
        let proj2 = n * (damping * n.dot(v2));
        v1 += proj2 - proj1;
        v2 += proj1 - proj2;
    }

    a.prev_pos = a.pos - v1;
    b.prev_pos = b.pos - v2;
    true
}

/// One O(n²) pass over every unordered pair.
///
/// Each body is first tested against `zones` (pass an empty slice to skip
/// cannon detection); the first hit is returned after the pass completes.
pub fn resolve_bodies(
    bodies: &mut [Body],
    zones: &[CannonZone],
    mode: ResolveMode,
    damping: f32,
) -> Option<CannonHit> {
    let mut first_hit = None;
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];

        if first_hit.is_none() {
            first_hit = zones
                .iter()
                .find(|zone| cannon_hit(a, zone))
                .map(|zone| CannonHit {
                    body: a.id(),
                    shooter: a.side,
                    owner: zone.side,
                });
        }

        for b in tail.iter_mut() {
            resolve_pair(a, b, mode, damping);
        }
    }
    first_hit
}

/// Intersection of segments `p1 + s·v1` and `p2 + u·v2`, both parameters
/// strictly inside (0, 1). Parallel segments never intersect.
pub fn segment_intersection(p1: Vec2, v1: Vec2, p2: Vec2, v2: Vec2) -> Option<Vec2> {
    let denom = cross2d(v1, v2);
    if denom == 0.0 {
        return None;
    }
    let s = cross2d(p2 - p1, v2) / denom;
    let u = cross2d(p1 - p2, v1) / cross2d(v2, v1);

    (0.0 < s && s < 1.0 && 0.0 < u && u < 1.0).then(|| p1 + v1 * s)
}

/// Keep a body inside `[0, width] × [0, height]`.
///
/// With `preserving_impulse` the clamped axis reflects its velocity,
/// damped.
pub fn border_collide(
    body: &mut Body,
    width: f32,
    height: f32,
    preserving_impulse: bool,
    damping: f32,
) {
    // Reversed and damped velocity
    let vel = (body.prev_pos - body.pos) * damping;
    let r = body.radius;

    if body.pos.x - r < 0.0 {
        body.pos.x = r;
        if preserving_impulse {
            body.prev_pos.x = body.pos.x - vel.x;
        }
    } else if body.pos.x + r > width {
        body.pos.x = width - r;
        if preserving_impulse {
            body.prev_pos.x = body.pos.x - vel.x;
        }
    }

    if body.pos.y - r < 0.0 {
        body.pos.y = r;
        if preserving_impulse {
            body.prev_pos.y = body.pos.y - vel.y;
        }
    } else if body.pos.y + r > height {
        body.pos.y = height - r;
        if preserving_impulse {
            body.prev_pos.y = body.pos.y - vel.y;
        }
    }
}

/// Resolve a body against the terrain under it. Returns true when the
/// tunneling guard brought the body to a full stop.
///
/// Bodies outside the terrain's x-span are left alone; cleanup removes
/// them at the end of the step.
pub fn terrain_collide(body: &mut Body, terrain: &TerrainView, tunneling_guard: bool) -> bool {
    let Ok(window) = terrain.window(body.pos.x) else {
        return false;
    };

    let mut stopped = false;
    if tunneling_guard && !body.has_hit_terrain {
        let travel = body.velocity();
        if travel != Vec2::ZERO {
            // Sweep from the leading edge, a little past the next move
            let reach = travel.normalize() * body.radius;
            let path = travel * TUNNELING_SLACK;
            for j in window.clone() {
                let (start, dir) = terrain.segment(j);
                if let Some(hit) = segment_intersection(body.pos + reach, path, start, dir) {
                    body.pos = hit - reach;
                    body.stop();
                    stopped = true;
                    break;
                }
            }
        }
    }

    for j in window.start..=window.end {
        let offset = body.pos - terrain.vertices()[j];
        let distance = offset.length();
        if distance < body.radius && distance != 0.0 {
            body.pos += offset * ((body.radius - distance) / distance);
            if stopped {
                body.stop();
            }
        }
    }

    // Surface height safety net for wide segments and stacked bodies
    if let Some(j) = terrain.segment_under(body.pos.x, window) {
        let height = terrain.height_in_segment(j, body.pos.x);
        let excess = body.pos.y + body.radius - height;
        if excess > 0.0 {
            body.pos += terrain.normals()[j] * excess;
            body.pos.y = height - body.radius;
            body.prev_pos.y = body.pos.y;
        }
    }

    if stopped {
        body.has_hit_terrain = true;
    }
    stopped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DAMPING;
    use crate::sim::terrain::flat;
    use proptest::prelude::*;

    fn body(id: u32, pos: Vec2, mass: f32, side: Side) -> Body {
        Body::new(BodyId(id), pos, mass, side)
    }

    fn penetration(a: &Body, b: &Body) -> f32 {
        (a.min_separation(b.radius) - a.separation(b.pos)).max(0.0)
    }

    #[test]
    fn test_depenetration_converges() {
        let mut a = body(0, Vec2::new(100.0, 100.0), 1.0, Side::Player);
        let mut b = body(1, Vec2::new(112.0, 103.0), 2.0, Side::Opponent);

        let mut depth = penetration(&a, &b);
        assert!(depth > 0.0);
        for _ in 0..4 {
            resolve_pair(&mut a, &mut b, ResolveMode::DEPENETRATE, DAMPING);
            let next = penetration(&a, &b);
            assert!(next < depth || next < 1e-4);
            depth = next;
        }
        let gap = a.separation(b.pos) - a.min_separation(b.radius);
        assert!(gap.abs() < 1e-3, "gap {gap}");
    }

    #[test]
    fn test_cluster_depenetration_shrinks() {
        let mut bodies: Vec<Body> = (0..5)
            .map(|i| body(i, Vec2::new(200.0 + i as f32 * 12.0, 300.0), 1.0, Side::Player))
            .collect();
        let worst = |bodies: &[Body]| {
            let mut worst = 0.0f32;
            for i in 0..bodies.len() {
                for j in i + 1..bodies.len() {
                    worst = worst.max(penetration(&bodies[i], &bodies[j]));
                }
            }
            worst
        };

        let before = worst(&bodies);
        for _ in 0..200 {
            resolve_bodies(&mut bodies, &[], ResolveMode::DEPENETRATE, DAMPING);
        }
        let after = worst(&bodies);
        assert!(after < before);
        assert!(after < 0.05, "worst penetration {after}");
    }

    #[test]
    fn test_mass_ratio_split() {
        let mut a = body(0, Vec2::new(0.0, 0.0), 1.0, Side::Player);
        let mut b = body(1, Vec2::new(30.0, 0.0), 3.0, Side::Player);
        // radii 10 + 30, overlap 10 along x
        let (a0, b0) = (a.pos, b.pos);

        assert!(resolve_pair(&mut a, &mut b, ResolveMode::DEPENETRATE, DAMPING));

        let da = (a.pos - a0).length();
        let db = (b.pos - b0).length();
        assert!((da - 3.0 * db).abs() < 1e-4, "da {da} db {db}");
        assert!((da + db - 10.0).abs() < 1e-4);
        assert!(a.pos.x < 0.0 && b.pos.x > 30.0);
    }

    #[test]
    fn test_equal_split_without_momentum() {
        let mut a = body(0, Vec2::new(0.0, 0.0), 1.0, Side::Player);
        let mut b = body(1, Vec2::new(30.0, 0.0), 3.0, Side::Player);
        let mode = ResolveMode {
            preserving_impulse: false,
            preserving_momentum: false,
        };
        resolve_pair(&mut a, &mut b, mode, DAMPING);
        assert!((a.pos.x + 5.0).abs() < 1e-4);
        assert!((b.pos.x - 35.0).abs() < 1e-4);
    }

    #[test]
    fn test_symmetric_head_on_exchange() {
        let mut a = body(0, Vec2::new(0.0, 0.0), 1.0, Side::Player);
        a.prev_pos = Vec2::new(-2.0, 0.0);
        let mut b = body(1, Vec2::new(19.0, 0.0), 1.0, Side::Opponent);
        b.prev_pos = Vec2::new(21.0, 0.0);
        let (pa, pb) = (a.prev_pos, b.prev_pos);
        let momentum_before = a.mass * a.velocity() + b.mass * b.velocity();

        assert!(resolve_pair(&mut a, &mut b, ResolveMode::ELASTIC, DAMPING));

        // Velocities as they stood after depenetration, before the response
        let va_mid = a.pos - pa;
        let vb_mid = b.pos - pb;
        assert!((a.velocity() - vb_mid * DAMPING).length() < 1e-4);
        assert!((b.velocity() - va_mid * DAMPING).length() < 1e-4);

        let momentum_after = a.mass * a.velocity() + b.mass * b.velocity();
        assert!((momentum_after - momentum_before).length() < 1e-4);
        assert!(a.velocity().x < 0.0 && b.velocity().x > 0.0);
    }

    #[test]
    fn test_unequal_mass_keeps_subtraction() {
        // Light body hits a resting heavy one along x
        let mut a = body(0, Vec2::new(0.0, 0.0), 1.0, Side::Player);
        a.prev_pos = Vec2::new(-3.0, 0.0);
        let mut b = body(1, Vec2::new(39.0, 0.0), 3.0, Side::Player);

        resolve_pair(&mut a, &mut b, ResolveMode::ELASTIC, DAMPING);

        // n points from b to a (-x); |v_b,n| is only the depenetration push
        let total = 4.0;
        let va_mid = (a.pos - Vec2::new(-3.0, 0.0)).x;
        let vb_mid = b.pos.x - 39.0;
        let expected_a = -(2.0 * 3.0 / total * (DAMPING * vb_mid).abs()
            - (1.0 - 3.0) / total * (DAMPING * va_mid).abs());
        assert!((a.velocity().x - expected_a).abs() < 1e-4);
        assert!(a.velocity().y.abs() < 1e-6);
    }

    #[test]
    fn test_equal_split_impulse_exchanges_normal_projections() {
        let mode = ResolveMode {
            preserving_impulse: true,
            preserving_momentum: false,
        };
        // Unequal masses, but this mode ignores them
        let mut a = body(0, Vec2::new(0.0, 0.0), 1.0, Side::Player);
        a.prev_pos = Vec2::new(-2.0, 0.0);
        let mut b = body(1, Vec2::new(39.0, 0.0), 3.0, Side::Opponent);
        b.prev_pos = Vec2::new(41.0, 0.0);

        assert!(resolve_pair(&mut a, &mut b, mode, DAMPING));

        // Overlap of 1 split evenly
        assert!((a.pos.x + 0.5).abs() < 1e-5);
        assert!((b.pos.x - 39.5).abs() < 1e-5);

        // Mid velocities are +1.5 and -1.5; each trades its damped normal part
        let (va, vb) = (1.5, -1.5);
        let expected_a = va + DAMPING * vb - DAMPING * va;
        let expected_b = vb + DAMPING * va - DAMPING * vb;
        assert!((a.velocity().x - expected_a).abs() < 1e-4, "a {}", a.velocity().x);
        assert!((b.velocity().x - expected_b).abs() < 1e-4, "b {}", b.velocity().x);
        assert!(a.velocity().y.abs() < 1e-6 && b.velocity().y.abs() < 1e-6);
    }

    #[test]
    fn test_coincident_centers_skipped() {
        let mut a = body(0, Vec2::new(5.0, 5.0), 1.0, Side::Player);
        let mut b = body(1, Vec2::new(5.0, 5.0), 1.0, Side::Opponent);
        assert!(!resolve_pair(&mut a, &mut b, ResolveMode::ELASTIC, DAMPING));
        assert_eq!(a.pos, b.pos);
    }

    #[test]
    fn test_segment_intersection_cross() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, -10.0),
        )
        .unwrap();
        assert!((hit - Vec2::new(5.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_segment_intersection_parallel_and_short() {
        // Parallel
        assert!(
            segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(0.0, 1.0), Vec2::X).is_none()
        );
        // Would cross if extended, but the first segment stops short
        assert!(
            segment_intersection(
                Vec2::ZERO,
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(10.0, -10.0)
            )
            .is_none()
        );
        // Touching at an endpoint is not strictly inside
        assert!(
            segment_intersection(Vec2::ZERO, Vec2::X, Vec2::new(1.0, -1.0), Vec2::new(0.0, 2.0))
                .is_none()
        );
    }

    #[test]
    fn test_border_reflects_with_damping() {
        let mut b = body(0, Vec2::new(3.0, 50.0), 1.0, Side::Player);
        b.prev_pos = Vec2::new(8.0, 50.0);
        border_collide(&mut b, 100.0, 100.0, true, 0.5);
        assert_eq!(b.pos.x, 10.0);
        // was moving -5 in x, now +2.5
        assert!((b.velocity().x - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_border_without_impulse_only_clamps() {
        let mut b = body(0, Vec2::new(50.0, 97.0), 1.0, Side::Player);
        b.prev_pos = Vec2::new(50.0, 90.0);
        border_collide(&mut b, 100.0, 100.0, false, DAMPING);
        assert_eq!(b.pos.y, 90.0);
        assert_eq!(b.prev_pos.y, 90.0);
    }

    #[test]
    fn test_cannon_hit_rules() {
        let zone = CannonZone {
            center: Vec2::new(100.0, 100.0),
            radius: 15.0,
            side: Side::Opponent,
        };
        let mut b = body(0, Vec2::new(110.0, 100.0), 1.0, Side::Player);
        assert!(cannon_hit(&b, &zone));

        b.side = Side::Opponent;
        assert!(!cannon_hit(&b, &zone));

        b.side = Side::Player;
        b.has_hit_terrain = true;
        assert!(!cannon_hit(&b, &zone));

        b.has_hit_terrain = false;
        b.pos = Vec2::new(126.0, 100.0);
        assert!(!cannon_hit(&b, &zone));
    }

    #[test]
    fn test_resolve_bodies_reports_first_hit_after_full_pass() {
        let zones = [CannonZone {
            center: Vec2::new(50.0, 50.0),
            radius: 10.0,
            side: Side::Opponent,
        }];
        let mut bodies = vec![
            body(7, Vec2::new(55.0, 50.0), 1.0, Side::Player),
            body(8, Vec2::new(300.0, 300.0), 1.0, Side::Player),
            body(9, Vec2::new(312.0, 300.0), 1.0, Side::Player),
        ];
        let hit = resolve_bodies(&mut bodies, &zones, ResolveMode::DEPENETRATE, DAMPING).unwrap();
        assert_eq!(hit.body, BodyId(7));
        assert_eq!(hit.shooter, Side::Player);
        assert_eq!(hit.owner, Side::Opponent);
        // The later pair was still resolved
        assert!(bodies[1].separation(bodies[2].pos) >= 20.0 - 1e-4);
    }

    #[test]
    fn test_terrain_guard_full_stop() {
        let terrain = flat(400.0, 400.0, 500.0);
        let mut b = body(0, Vec2::new(202.0, 388.0), 1.0, Side::Player);
        b.prev_pos = Vec2::new(202.0, 368.0);

        assert!(terrain_collide(&mut b, &terrain, true));
        assert!(b.has_hit_terrain);
        assert_eq!(b.velocity(), Vec2::ZERO);
        assert!((b.pos.y - 390.0).abs() < 1e-3);
    }

    #[test]
    fn test_terrain_overlap_lifts_resting_body() {
        let terrain = flat(400.0, 400.0, 500.0);
        // Slow, sunk 5 units into the surface
        let mut b = body(0, Vec2::new(202.0, 395.0), 1.0, Side::Player);

        assert!(!terrain_collide(&mut b, &terrain, true));
        assert!(!b.has_hit_terrain);
        assert!(b.pos.y + b.radius <= 400.0 + 1e-3);
    }

    #[test]
    fn test_terrain_height_clamp_lifts_buried_body() {
        let terrain = flat(400.0, 400.0, 500.0);
        let mut b = body(0, Vec2::new(202.0, 430.0), 1.0, Side::Player);

        terrain_collide(&mut b, &terrain, false);
        assert!((b.pos.y - 390.0).abs() < 1e-3);
        assert_eq!(b.prev_pos.y, b.pos.y);
    }

    #[test]
    fn test_terrain_ignores_bodies_off_the_map() {
        let terrain = flat(400.0, 400.0, 500.0);
        let mut b = body(0, Vec2::new(-50.0, 430.0), 1.0, Side::Player);
        assert!(!terrain_collide(&mut b, &terrain, true));
        assert_eq!(b.pos, Vec2::new(-50.0, 430.0));
    }

    proptest! {
        #[test]
        fn prop_depenetration_keeps_centroid(
            angle in 0.0f32..std::f32::consts::TAU,
            fraction in 0.05f32..0.95,
            m1 in 0.5f32..3.0,
            m2 in 0.5f32..3.0,
        ) {
            let mut a = body(0, Vec2::new(200.0, 200.0), m1, Side::Player);
            let min_sep = a.radius + 10.0 * m2;
            let offset = Vec2::new(angle.cos(), angle.sin()) * (min_sep * fraction);
            let mut b = body(1, a.pos + offset, m2, Side::Opponent);
            let centroid = a.pos * m1 + b.pos * m2;

            prop_assert!(resolve_pair(&mut a, &mut b, ResolveMode::DEPENETRATE, DAMPING));

            let gap = a.separation(b.pos) - min_sep;
            prop_assert!(gap.abs() < 1e-2);
            prop_assert!(((a.pos * m1 + b.pos * m2) - centroid).length() < 1e-2);
        }

        #[test]
        fn prop_intersection_lies_on_both_segments(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0,
            cx in -50.0f32..50.0, cy in -50.0f32..50.0,
            dx in -50.0f32..50.0, dy in -50.0f32..50.0,
        ) {
            let (p1, v1) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            let (p2, v2) = (Vec2::new(cx, cy), Vec2::new(dx, dy));
            prop_assume!(cross2d(v1, v2).abs() > 1.0);
            if let Some(hit) = segment_intersection(p1, v1, p2, v2) {
                // Perpendicular distance to each carrier line
                let d1 = cross2d(hit - p1, v1).abs() / v1.length();
                let d2 = cross2d(hit - p2, v2).abs() / v2.length();
                prop_assert!(d1 < 1e-2 && d2 < 1e-2);
            }
        }
    }
}
