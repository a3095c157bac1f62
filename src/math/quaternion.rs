// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quaternion helpers.

use core::f32::consts::FRAC_PI_2;

use super::RAD_TO_DEG;

/// Convert a `[w, x, y, z]` quaternion into Euler angles in degrees.
///
/// The result is ordered `[pitch, roll, yaw]`, which is the order the rest of the firmware indexes
/// attitude by. When the pitch argument reaches ±1 the pitch is pinned to ±90° instead of feeding
/// `asin` a value outside its domain.
pub fn quat_to_euler(q: [f32; 4]) -> [f32; 3] {
    let sinr_cosp = 2.0 * (q[0] * q[1] + q[2] * q[3]);
    let cosr_cosp = 1.0 - 2.0 * (q[1] * q[1] + q[2] * q[2]);
    let roll = libm::atan2f(sinr_cosp, cosr_cosp);

    let sinp = 2.0 * (q[0] * q[2] - q[3] * q[1]);
    let pitch = if libm::fabsf(sinp) >= 1.0 {
        if sinp >= 0.0 {
            FRAC_PI_2
        } else {
            -FRAC_PI_2
        }
    } else {
        libm::asinf(sinp)
    };

    let siny_cosp = 2.0 * (q[0] * q[3] + q[1] * q[2]);
    let cosy_cosp = 1.0 - 2.0 * (q[2] * q[2] + q[3] * q[3]);
    let yaw = libm::atan2f(siny_cosp, cosy_cosp);

    [pitch * RAD_TO_DEG, roll * RAD_TO_DEG, yaw * RAD_TO_DEG]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DEG_TO_RAD: f32 = 1.0 / RAD_TO_DEG;

    /// Build a unit quaternion from roll/pitch/yaw (degrees, ZYX convention).
    fn from_euler(roll: f32, pitch: f32, yaw: f32) -> [f32; 4] {
        let (sr, cr) = libm::sincosf(roll * DEG_TO_RAD / 2.0);
        let (sp, cp) = libm::sincosf(pitch * DEG_TO_RAD / 2.0);
        let (sy, cy) = libm::sincosf(yaw * DEG_TO_RAD / 2.0);
        [
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        ]
    }

    #[test]
    fn identity_is_level() {
        assert_eq!(quat_to_euler([1.0, 0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn output_is_pitch_roll_yaw() {
        let e = quat_to_euler(from_euler(30.0, 0.0, 0.0));
        assert_relative_eq!(e[0], 0.0, epsilon = 1e-3);
        assert_relative_eq!(e[1], 30.0, epsilon = 1e-3);
        assert_relative_eq!(e[2], 0.0, epsilon = 1e-3);

        let e = quat_to_euler(from_euler(0.0, 0.0, 40.0));
        assert_relative_eq!(e[2], 40.0, epsilon = 1e-3);

        let e = quat_to_euler(from_euler(0.0, -25.0, 0.0));
        assert_relative_eq!(e[0], -25.0, epsilon = 1e-3);
    }

    #[test]
    fn recovers_angles_across_the_unit_sphere() {
        let mut roll = -170.0;
        while roll <= 170.0 {
            let mut pitch = -80.0;
            while pitch <= 80.0 {
                let mut yaw = -170.0;
                while yaw <= 170.0 {
                    let e = quat_to_euler(from_euler(roll, pitch, yaw));
                    assert_relative_eq!(e[0], pitch, epsilon = 0.01);
                    assert_relative_eq!(e[1], roll, epsilon = 0.01);
                    assert_relative_eq!(e[2], yaw, epsilon = 0.01);
                    yaw += 34.0;
                }
                pitch += 20.0;
            }
            roll += 34.0;
        }
    }

    #[test]
    fn pitch_is_pinned_at_gimbal_lock() {
        // Not normalised on purpose: the pitch argument evaluates to exactly 2.
        let up = quat_to_euler([1.0, 0.0, 1.0, 0.0]);
        assert_relative_eq!(up[0], 90.0, epsilon = 1e-4);

        let down = quat_to_euler([1.0, 0.0, -1.0, 0.0]);
        assert_relative_eq!(down[0], -90.0, epsilon = 1e-4);

        let (s, c) = libm::sincosf(core::f32::consts::FRAC_PI_4);
        let straight_up = quat_to_euler([c, 0.0, s, 0.0]);
        assert_relative_eq!(straight_up[0], 90.0, epsilon = 0.05);
    }
}
