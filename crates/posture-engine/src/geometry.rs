//! Angle computations between landmark positions.

use thiserror::Error;

/// Angle substituted when a joint angle cannot be computed.
pub const NEUTRAL_ANGLE: f64 = 0.0;

/// Values this close to a rule threshold count as equal to it.
///
/// Landmark coordinates arrive as decimals (0.70, 0.60, ...) whose binary
/// differences land a few ulps either side of the literal thresholds.
pub const THRESHOLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("zero-length ray at vertex")]
    ZeroLength,

    #[error("non-finite coordinate")]
    NonFinite,
}

/// Interior angle at `b` between rays b→a and b→c, in degrees [0, 180].
pub fn angle_at<const N: usize>(a: [f64; N], b: [f64; N], c: [f64; N]) -> Result<f64, GeometryError> {
    if a.iter().chain(b.iter()).chain(c.iter()).any(|v| !v.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    let ba: [f64; N] = std::array::from_fn(|i| a[i] - b[i]);
    let bc: [f64; N] = std::array::from_fn(|i| c[i] - b[i]);
    let len_ba = norm(&ba);
    let len_bc = norm(&bc);
    if len_ba == 0.0 || len_bc == 0.0 {
        return Err(GeometryError::ZeroLength);
    }

    // Same angle as acos(BA·BC / |BA||BC|), but exact at 0° and 180° where
    // acos amplifies rounding in the cosine.
    let mut diff = 0.0;
    let mut sum = 0.0;
    for i in 0..N {
        let u = ba[i] * len_bc;
        let v = bc[i] * len_ba;
        diff += (u - v) * (u - v);
        sum += (u + v) * (u + v);
    }

    Ok((2.0 * diff.sqrt().atan2(sum.sqrt())).to_degrees().min(180.0))
}

fn norm<const N: usize>(v: &[f64; N]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// [`angle_at`], falling back to [`NEUTRAL_ANGLE`] on degenerate input.
pub fn angle_or_neutral<const N: usize>(a: [f64; N], b: [f64; N], c: [f64; N]) -> f64 {
    angle_at(a, b, c).unwrap_or(NEUTRAL_ANGLE)
}

/// Point `distance` units above `p` (y grows downward).
pub fn above(p: [f64; 2], distance: f64) -> [f64; 2] {
    [p[0], p[1] - distance]
}

/// `value > threshold`, with values within epsilon treated as equal.
pub fn exceeds(value: f64, threshold: f64) -> bool {
    value - threshold > THRESHOLD_EPSILON
}

/// `value < threshold`, with values within epsilon treated as equal.
pub fn below(value: f64, threshold: f64) -> bool {
    threshold - value > THRESHOLD_EPSILON
}

/// `value >= threshold`, with values within epsilon treated as equal.
pub fn at_least(value: f64, threshold: f64) -> bool {
    !below(value, threshold)
}

/// `value <= threshold`, with values within epsilon treated as equal.
pub fn at_most(value: f64, threshold: f64) -> bool {
    !exceeds(value, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_collinear_is_straight() {
        let angle = angle_at([0.0, 0.0], [0.5, 0.5], [1.0, 1.0]).unwrap();
        assert!(close(angle, 180.0));
    }

    #[test]
    fn test_same_ray_is_zero() {
        let angle = angle_at([0.2, 0.3], [0.5, 0.5], [0.2, 0.3]).unwrap();
        assert!(close(angle, 0.0));
    }

    #[test]
    fn test_extreme_angles_are_exact() {
        assert!((angle_at([0.0, 0.0], [0.5, 0.5], [1.0, 1.0]).unwrap() - 180.0).abs() < 1e-12);
        assert_eq!(angle_at([0.2, 0.3], [0.5, 0.5], [0.2, 0.3]).unwrap(), 0.0);
        // Same direction, different lengths
        assert!(close(angle_at([0.9, 0.9], [0.5, 0.5], [0.7, 0.7]).unwrap(), 0.0));
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at([1.0, 0.0], [0.0, 0.0], [0.0, 1.0]).unwrap();
        assert!(close(angle, 90.0));
    }

    #[test]
    fn test_symmetric() {
        let a = [0.13, 0.72, 0.05];
        let b = [0.41, 0.38, -0.02];
        let c = [0.77, 0.91, 0.11];
        assert!(close(angle_at(a, b, c).unwrap(), angle_at(c, b, a).unwrap()));
    }

    #[test]
    fn test_three_dimensional() {
        let angle = angle_at([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]).unwrap();
        assert!(close(angle, 90.0));
    }

    #[test]
    fn test_degenerate_inputs_fail_softly() {
        assert_eq!(
            angle_at([0.5, 0.5], [0.5, 0.5], [1.0, 1.0]),
            Err(GeometryError::ZeroLength)
        );
        assert_eq!(
            angle_at([f64::NAN, 0.0], [0.5, 0.5], [1.0, 1.0]),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(angle_or_neutral([0.5, 0.5], [0.5, 0.5], [0.5, 0.5]), NEUTRAL_ANGLE);
    }

    #[test]
    fn test_result_range() {
        let points = [[0.1, 0.9], [0.4, 0.2], [0.8, 0.8], [0.35, 0.36], [0.99, 0.01]];
        for a in points {
            for b in points {
                for c in points {
                    if let Ok(angle) = angle_at(a, b, c) {
                        assert!((0.0..=180.0).contains(&angle));
                    }
                }
            }
        }
    }

    #[test]
    fn test_vertical_reference_point() {
        let hip = [0.5, 0.8];
        let shoulder = [0.5, 0.5];
        assert!(close(angle_at(hip, shoulder, above(shoulder, 0.1)).unwrap(), 180.0));
    }

    #[test]
    fn test_threshold_comparisons_absorb_rounding() {
        // 0.70 - 0.60 is 0.09999999999999998 in binary
        assert!(at_least(0.70 - 0.60, 0.1));
        assert!(!below(0.70 - 0.60, 0.1));
        // 0.55 - 0.50 is 0.05000000000000004
        assert!(!exceeds(0.55 - 0.50, 0.05));
        assert!(exceeds(0.06, 0.05));
        assert!(at_most(120.0, 120.0));
        assert!(below(149.9, 150.0));
    }
}
