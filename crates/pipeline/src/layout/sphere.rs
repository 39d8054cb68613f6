//! Vector helpers and the Fibonacci sphere distribution

use std::f64::consts::PI;

pub type Vec3 = [f64; 3];

/// Direction used whenever a vector cannot be normalized
pub const REFERENCE_DIRECTION: Vec3 = [1.0, 0.0, 0.0];

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn scale(v: Vec3, factor: f64) -> Vec3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

pub fn norm(v: Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Unit vector along `v`, or the reference direction for a zero vector
pub fn normalize_or_reference(v: Vec3) -> Vec3 {
    let n = norm(v);
    if n == 0.0 || !n.is_finite() {
        REFERENCE_DIRECTION
    } else {
        scale(v, 1.0 / n)
    }
}

/// First three embedding components as a unit direction
pub fn reduce_to_3d(embedding: &[f32]) -> Vec3 {
    let mut v = [0.0; 3];
    for (slot, value) in v.iter_mut().zip(embedding) {
        *slot = f64::from(*value);
    }
    normalize_or_reference(v)
}

/// `samples` points spread evenly over the unit sphere.
///
/// Latitude is linear in the index; longitude advances by the golden angle.
/// `rotation` shifts every point's longitude index by the same amount, so
/// relative spacing is unchanged while absolute orientation varies.
pub fn fibonacci_sphere(samples: usize, rotation: f64) -> Vec<Vec3> {
    if samples == 0 {
        return Vec::new();
    }
    let n = samples as f64;
    let offset = 2.0 / n;
    let increment = PI * (3.0 - 5.0_f64.sqrt());

    (0..samples)
        .map(|i| {
            let i = i as f64;
            let y = (i * offset) - 1.0 + (offset / 2.0);
            let r = (1.0 - y * y).max(0.0).sqrt();
            let phi = ((i + rotation) % n) * increment;
            [phi.cos() * r, y, phi.sin() * r]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_sphere_points_are_unit_length() {
        for samples in [1, 2, 7, 50] {
            let points = fibonacci_sphere(samples, 0.37 * samples as f64);
            assert_eq!(points.len(), samples);
            for p in points {
                assert!((norm(p) - 1.0).abs() < EPS);
            }
        }
        assert!(fibonacci_sphere(0, 0.0).is_empty());
    }

    #[test]
    fn test_latitudes_are_evenly_spaced() {
        let points = fibonacci_sphere(4, 1.5);
        let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        let expected = [-0.75, -0.25, 0.25, 0.75];
        for (y, e) in ys.iter().zip(expected) {
            assert!((y - e).abs() < EPS);
        }
    }

    #[test]
    fn test_rotation_preserves_latitudes() {
        let a = fibonacci_sphere(5, 0.0);
        let b = fibonacci_sphere(5, 2.3);
        for (p, q) in a.iter().zip(&b) {
            assert!((p[1] - q[1]).abs() < EPS);
        }
        assert_ne!(a, b);
    }

    #[test]
    fn test_reduce_to_3d() {
        let v = reduce_to_3d(&[3.0, 0.0, 4.0, 100.0]);
        assert!((v[0] - 0.6).abs() < EPS);
        assert!((v[2] - 0.8).abs() < EPS);
        assert_eq!(reduce_to_3d(&[0.0, 0.0, 0.0, 1.0]), REFERENCE_DIRECTION);
        assert_eq!(reduce_to_3d(&[]), REFERENCE_DIRECTION);
    }
}
