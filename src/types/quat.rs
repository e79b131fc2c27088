//! Quaternion helpers for hover-target math
//!
//! Quaternions are `[w, x, y, z]`. Only yaw rotations are commanded in
//! practice, but rotation of body-frame velocity deltas into the world
//! frame needs the full product.

/// Conjugate (inverse for unit quaternions)
pub fn inv(q: [f64; 4]) -> [f64; 4] {
    [q[0], -q[1], -q[2], -q[3]]
}

/// Hamilton product q1 * q2
pub fn mul(q1: [f64; 4], q2: [f64; 4]) -> [f64; 4] {
    [
        q1[0] * q2[0] - q1[1] * q2[1] - q1[2] * q2[2] - q1[3] * q2[3],
        q1[0] * q2[1] + q1[1] * q2[0] + q1[2] * q2[3] - q1[3] * q2[2],
        q1[0] * q2[2] - q1[1] * q2[3] + q1[2] * q2[0] + q1[3] * q2[1],
        q1[0] * q2[3] + q1[1] * q2[2] - q1[2] * q2[1] + q1[3] * q2[0],
    ]
}

/// Rotate vector v by quaternion q (q * v * q⁻¹)
pub fn rotate(q: [f64; 4], v: [f64; 3]) -> [f64; 3] {
    let qv = [0.0, v[0], v[1], v[2]];
    let r = mul(q, mul(qv, inv(q)));
    [r[1], r[2], r[3]]
}

/// Extract yaw (rad) from a quaternion
pub fn to_yaw(q: [f64; 4]) -> f64 {
    (2.0 * (q[0] * q[3] + q[1] * q[2]))
        .atan2(q[0] * q[0] + q[1] * q[1] - q[2] * q[2] - q[3] * q[3])
}

/// Quaternion for a pure yaw rotation (rad)
pub fn from_yaw(yaw: f64) -> [f64; 4] {
    [(yaw / 2.0).cos(), 0.0, 0.0, (yaw / 2.0).sin()]
}
