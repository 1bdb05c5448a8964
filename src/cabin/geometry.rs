//! Far-field model of the 8-element circular microphone array.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use num_complex::Complex;

/// Speed of sound in m/s.
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Azimuth in radians of each array microphone, indexed by channel.
pub const ARRAY_MIC_ANGLES: [f64; 8] = [
    PI,
    3.0 * FRAC_PI_4,
    FRAC_PI_2,
    FRAC_PI_4,
    0.0,
    -FRAC_PI_4,
    -FRAC_PI_2,
    -3.0 * FRAC_PI_4,
];

/// Steering vector of the array for a plane wave at `frequency` Hz arriving from
/// `theta_degrees`.
///
/// Element `m` is `exp(i · 2π·f/c · cos(θ − angle_m))`. Every element has unit
/// magnitude.
pub fn steering_vector(frequency: f64, theta_degrees: f64) -> [Complex<f64>; 8] {
    let theta = theta_degrees.to_radians();
    let k = 2.0 * PI * frequency / SPEED_OF_SOUND;
    ARRAY_MIC_ANGLES.map(|angle| Complex::from_polar(1.0, k * (theta - angle).cos()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn elements_have_unit_magnitude() {
        for v in steering_vector(1000.0, 0.0) {
            assert_approx_eq!(v.norm(), 1.0, 1e-12);
        }
    }

    #[test]
    fn broadside_phases_follow_mic_angles() {
        let k = 2.0 * PI * 1000.0 / SPEED_OF_SOUND;
        let v = steering_vector(1000.0, 0.0);
        for (element, angle) in v.iter().zip(ARRAY_MIC_ANGLES) {
            let expected = Complex::new(0.0, k * angle.cos()).exp();
            assert!((element - expected).norm() < 1e-12);
        }
        // Mic 4 faces the source, mic 0 faces away.
        assert!((v[4] - Complex::new(0.0, k).exp()).norm() < 1e-12);
        assert!((v[0] - Complex::new(0.0, -k).exp()).norm() < 1e-12);
    }

    #[test]
    fn zero_frequency_is_all_ones() {
        for v in steering_vector(0.0, 37.0) {
            assert!((v - Complex::new(1.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn symmetric_mics_match_for_opposite_angles() {
        let left = steering_vector(500.0, -25.0);
        let right = steering_vector(500.0, 25.0);
        // Mic 2 (π/2) at -θ sees the same projection as mic 6 (-π/2) at θ.
        assert!((left[2] - right[6]).norm() < 1e-12);
    }
}
