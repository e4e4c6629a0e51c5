//! Closest points between two finite line segments.
//!
//! Solves the 2x2 system for the closest points on the infinite lines, then
//! clamps each parameter to its segment, re-solving the reduced problem on
//! whichever edge becomes visible.  Parallel and zero-length segments fall
//! into epsilon-guarded branches and always produce finite output; a
//! zero-length segment behaves as a point.

use super::hand_tracking::{BoneType, HandSnapshot};
use super::math::{self, Vec3};

/// Below this `sin²` of the angle between the segments they are treated as
/// parallel.
const PARALLEL_TOLERANCE: f32 = 1.0e-6;

/// Closest-point query result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentClosest {
    pub closest_on_a: Vec3,
    pub closest_on_b: Vec3,
    /// `closest_on_a - closest_on_b`.
    pub displacement: Vec3,
    /// Position of `closest_on_a` along A, in `[0, 1]` from `a1` to `a2`.
    pub param_a: f32,
    /// Position of `closest_on_b` along B, in `[0, 1]` from `b1` to `b2`.
    pub param_b: f32,
}

impl SegmentClosest {
    /// Minimum distance between the two segments.
    pub fn distance(&self) -> f32 {
        math::length(self.displacement)
    }
}

/// Closest points between segment A (`a1`→`a2`) and segment B (`b1`→`b2`).
pub fn closest_points_between_segments(a1: Vec3, a2: Vec3, b1: Vec3, b2: Vec3) -> SegmentClosest {
    let u = math::sub(a2, a1);
    let v = math::sub(b2, b1);
    let w = math::sub(a1, b1);
    let a = math::dot(u, u);
    let b = math::dot(u, v);
    let c = math::dot(v, v);
    let d = math::dot(u, w);
    let e = math::dot(v, w);
    let det = a * c - b * b;

    let (mut s_n, mut s_d) = (0.0_f32, det);
    let (mut t_n, mut t_d) = (0.0_f32, det);

    if c <= f32::MIN_POSITIVE {
        // B is a point: project it onto A.
        t_d = 1.0;
        if a <= f32::MIN_POSITIVE {
            s_d = 1.0;
        } else {
            s_n = (-d).clamp(0.0, a);
            s_d = a;
        }
    } else if det <= PARALLEL_TOLERANCE * a * c {
        // Parallel, or A is a point: pin A at its start and solve for B alone.
        s_n = 0.0;
        s_d = 1.0;
        t_n = e;
        t_d = c;
    } else {
        s_n = b * e - c * d;
        t_n = a * e - b * d;
        if s_n < 0.0 {
            s_n = 0.0;
            t_n = e;
            t_d = c;
        } else if s_n > s_d {
            s_n = s_d;
            t_n = e + b;
            t_d = c;
        }
    }

    if t_n < 0.0 {
        t_n = 0.0;
        if -d < 0.0 {
            s_n = 0.0;
        } else if -d > a {
            s_n = s_d;
        } else {
            s_n = -d;
            s_d = a;
        }
    } else if t_n > t_d {
        t_n = t_d;
        if -d + b < 0.0 {
            s_n = 0.0;
        } else if -d + b > a {
            s_n = s_d;
        } else {
            s_n = -d + b;
            s_d = a;
        }
    }

    let sc = if s_n.abs() < f32::MIN_POSITIVE { 0.0 } else { s_n / s_d };
    let tc = if t_n.abs() < f32::MIN_POSITIVE { 0.0 } else { t_n / t_d };

    let closest_on_a = math::add(a1, math::scale(u, sc));
    let closest_on_b = math::add(b1, math::scale(v, tc));

    SegmentClosest {
        closest_on_a,
        closest_on_b,
        displacement: math::sub(closest_on_a, closest_on_b),
        param_a: sc,
        param_b: tc,
    }
}

/// Closest points between the index distal segment (A) and the thumb distal
/// segment (B), each running from the distal joint to the fingertip.
pub fn pinch_segment_displacement(hand: &HandSnapshot) -> SegmentClosest {
    let index = hand.index();
    let thumb = hand.thumb();
    closest_points_between_segments(
        index.bone(BoneType::Distal).prev_joint,
        index.tip_position(),
        thumb.bone(BoneType::Distal).prev_joint,
        thumb.tip_position(),
    )
}
