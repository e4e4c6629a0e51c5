//! Small vector and quaternion helpers over plain arrays.
//!
//! Positions and directions are `[f32; 3]` in meters; orientations are
//! `[x, y, z, w]` quaternions, matching the layout hand-tracking runtimes
//! hand us.  Angles are in degrees throughout.

/// 3-D vector (x, y, z).
pub type Vec3 = [f32; 3];

/// Orientation quaternion (x, y, z, w).
pub type Quat = [f32; 4];

pub const ZERO: Vec3 = [0.0, 0.0, 0.0];
pub const IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

/// Guard for near-zero denominators in single precision.
pub const EPSILON: f32 = 1.0e-6;

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn neg(v: Vec3) -> Vec3 {
    [-v[0], -v[1], -v[2]]
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length(v: Vec3) -> f32 {
    dot(v, v).sqrt()
}

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    length(sub(b, a))
}

/// Unit vector in the direction of `v`, or zero for a zero-length input.
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    if len < EPSILON {
        ZERO
    } else {
        scale(v, 1.0 / len)
    }
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    scale(add(a, b), 0.5)
}

/// Linear interpolation helper.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate between two points with `t` clamped to `[0, 1]`.
pub fn lerp_vec(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let t = clamp01(t);
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]`, clamping the
/// result to the output range.
pub fn map(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_min == in_max {
        return out_min;
    }
    lerp(out_min, out_max, clamp01((value - in_min) / (in_max - in_min)))
}

/// Same as [`map`] but extrapolates past the input range.
pub fn map_unclamped(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_min == in_max {
        return out_min;
    }
    lerp(out_min, out_max, (value - in_min) / (in_max - in_min))
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
/// Returns 0 when either vector has zero length.
pub fn angle_deg(from: Vec3, to: Vec3) -> f32 {
    let denom = (dot(from, from) * dot(to, to)).sqrt();
    if denom < EPSILON * EPSILON {
        return 0.0;
    }
    let cos = (dot(from, to) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Angle from `from` to `to` in degrees, signed by the handedness of the
/// rotation about `axis`.  A rotation exactly in-plane counts as positive.
pub fn signed_angle_deg(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_deg(from, to);
    if dot(axis, cross(from, to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Rotate `v` by the unit quaternion `q`.
pub fn rotate(q: Quat, v: Vec3) -> Vec3 {
    // v' = v + 2w(u x v) + 2(u x (u x v)), u = (qx, qy, qz)
    let u = [q[0], q[1], q[2]];
    let w = q[3];
    let uv = cross(u, v);
    let uuv = cross(u, uv);
    add(v, add(scale(uv, 2.0 * w), scale(uuv, 2.0)))
}

/// Quaternion for a rotation of `angle` degrees about a unit `axis`.
pub fn quat_from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    let axis = normalize(axis);
    let half = angle.to_radians() * 0.5;
    let s = half.sin();
    [axis[0] * s, axis[1] * s, axis[2] * s, half.cos()]
}

#[cfg(test)]
pub(crate) fn assert_vec_near(actual: Vec3, expected: Vec3, tol: f32) {
    for i in 0..3 {
        assert!(
            (actual[i] - expected[i]).abs() < tol,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }
}
