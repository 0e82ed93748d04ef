//! Transform math shared by gizmo editing and the transform component
//!
//! Gizmos always edit in decomposed form (position, Euler degrees, scale)
//! and recompose before writing the matrix back, so the compose/decompose
//! pair here must round-trip.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Rotation order used throughout: yaw (Y), then pitch (X), then roll (Z)
const EULER_ORDER: EulerRot = EulerRot::YXZ;

/// Wrap an angle in degrees into the canonical `[0, 360)` range.
/// Negative inputs wrap upward: −10 becomes 350.
pub fn wrap_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Component-wise [`wrap_degrees`]
pub fn wrap_degrees_vec3(euler: Vec3) -> Vec3 {
    Vec3::new(
        wrap_degrees(euler.x),
        wrap_degrees(euler.y),
        wrap_degrees(euler.z),
    )
}

/// Build a rotation quaternion from Euler angles in degrees
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EULER_ORDER,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Compose a transform from position, Euler rotation (degrees), and scale
pub fn compose(position: Vec3, euler: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, quat_from_euler_degrees(euler), position)
}

/// Decompose a transform into position, Euler rotation wrapped to
/// `[0, 360)` degrees, and scale.
pub fn decompose(matrix: Mat4) -> (Vec3, Vec3, Vec3) {
    let (scale, rotation, position) = matrix.to_scale_rotation_translation();
    let (y, x, z) = rotation.to_euler(EULER_ORDER);
    let euler = wrap_degrees_vec3(Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees()));
    (position, euler, scale)
}
