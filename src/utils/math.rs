//! # Game Mathematics
//!
//! Collision and placement helpers in world space.

use crate::game::WorldPoint;
use rand::Rng;
use std::f32::consts::TAU;

/// Circular hit test; the boundary counts as a hit.
///
/// # Examples
///
/// ```
/// use tacojiman::{circle_contains, WorldPoint};
///
/// let center = WorldPoint::new(0.0, 0.0);
/// assert!(circle_contains(center, 5.0, WorldPoint::new(3.0, 4.0)));
/// assert!(!circle_contains(center, 4.9, WorldPoint::new(3.0, 4.0)));
/// ```
pub fn circle_contains(center: WorldPoint, radius: f32, point: WorldPoint) -> bool {
    center.distance(point) <= radius
}

/// Point at `radius` from `center` along `angle` (radians).
pub fn point_on_circle(center: WorldPoint, radius: f32, angle: f32) -> WorldPoint {
    WorldPoint::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Uniformly random angle with a radius drawn from `min_radius..=max_radius`.
pub fn random_point_in_ring<R: Rng + ?Sized>(
    rng: &mut R,
    center: WorldPoint,
    min_radius: f32,
    max_radius: f32,
) -> WorldPoint {
    let (low, high) = if min_radius <= max_radius {
        (min_radius, max_radius)
    } else {
        (max_radius, min_radius)
    };
    let radius = if high > low { rng.gen_range(low..=high) } else { low };
    let angle = rng.gen_range(0.0..TAU);
    point_on_circle(center, radius, angle)
}

/// Random point on one of the four edges of a `width` x `height` world.
pub fn random_edge_point<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32) -> WorldPoint {
    let along_x = rng.gen_range(0.0..=width.max(0.0));
    let along_y = rng.gen_range(0.0..=height.max(0.0));
    match rng.gen_range(0..4) {
        0 => WorldPoint::new(along_x, 0.0),
        1 => WorldPoint::new(width, along_y),
        2 => WorldPoint::new(along_x, height),
        _ => WorldPoint::new(0.0, along_y),
    }
}

/// Clamps a point into the `width` x `height` world rectangle.
pub fn clamp_to_world(point: WorldPoint, width: f32, height: f32) -> WorldPoint {
    WorldPoint::new(point.x.clamp(0.0, width), point.y.clamp(0.0, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ring_points_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = WorldPoint::new(420.0, 420.0);
        for _ in 0..200 {
            let point = random_point_in_ring(&mut rng, center, 80.0, 180.0);
            let distance = center.distance(point);
            assert!(distance >= 79.9 && distance <= 180.1, "distance {}", distance);
        }
    }

    #[test]
    fn test_degenerate_ring() {
        let mut rng = StdRng::seed_from_u64(1);
        let center = WorldPoint::new(0.0, 0.0);
        let point = random_point_in_ring(&mut rng, center, 10.0, 10.0);
        assert!((center.distance(point) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_edge_points_lie_on_edges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let point = random_edge_point(&mut rng, 840.0, 600.0);
            let on_edge = point.x == 0.0 || point.x == 840.0 || point.y == 0.0 || point.y == 600.0;
            assert!(on_edge, "{:?}", point);
        }
    }

    #[test]
    fn test_clamp_to_world() {
        let clamped = clamp_to_world(WorldPoint::new(-5.0, 900.0), 840.0, 840.0);
        assert_eq!(clamped, WorldPoint::new(0.0, 840.0));
    }
}
