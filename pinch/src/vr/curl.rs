//! Finger curl and finger-vs-palm angles.
//!
//! Curl is read from the base bone of the finger (bone 2 for the thumb,
//! bone 1 otherwise): the signed angle from that bone to the palm normal,
//! about a thumb-side axis that is consistent for both hands.  An extended
//! finger reads 0, one pointing straight into the palm reads 1.

use super::hand_tracking::{BoneType, Finger, FingerType, HandSnapshot};
use super::math::{self, Vec3};

/// Base bone used for curl and openness checks.
pub fn base_bone(finger: &Finger) -> BoneType {
    match finger.finger_type {
        FingerType::Thumb => BoneType::Intermediate,
        _ => BoneType::Proximal,
    }
}

/// Direction of the finger's base bone.
pub fn base_direction(finger: &Finger) -> Vec3 {
    finger.bone(base_bone(finger)).direction()
}

/// Radial axis flipped so it has the same handedness on left and right
/// hands.
fn left_positive_thumb_axis(hand: &HandSnapshot) -> Vec3 {
    let radial = hand.radial_axis();
    if hand.is_left() {
        radial
    } else {
        math::neg(radial)
    }
}

/// Curl of `finger` in `[0, 1]`: 0° to the palm normal reads 1, 90° reads 0.
pub fn curl(hand: &HandSnapshot, finger: &Finger) -> f32 {
    let angle = math::signed_angle_deg(
        base_direction(finger),
        hand.palmar_axis(),
        left_positive_thumb_axis(hand),
    );
    math::map(angle, 0.0, 90.0, 1.0, 0.0)
}

/// Curl of the outer finger relative to its base bone, in `[0, 1]` over
/// 0°–150° of bend.  Angles below -30° wrap around, so hyperextension does
/// not read as a full grip.
pub fn grip_curl(hand: &HandSnapshot, finger: &Finger) -> f32 {
    let mut angle = math::signed_angle_deg(
        base_direction(finger),
        finger.bone(BoneType::Distal).direction(),
        left_positive_thumb_axis(hand),
    );
    if angle < -30.0 {
        angle += 360.0;
    }
    math::map(angle, 0.0, 150.0, 0.0, 1.0)
}

/// Signed angle from `from` to `to` about the radial axis, mirrored on
/// left hands so both chiralities read the same.
pub fn signed_finger_angle(hand: &HandSnapshot, from: Vec3, to: Vec3) -> f32 {
    let angle = math::signed_angle_deg(from, to, hand.radial_axis());
    if hand.is_left() {
        -angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vr::hand_tracking::Hand;
    use crate::vr::synthetic::{HandFactory, HandShape};

    #[test]
    fn test_open_hand_has_no_curl() {
        let factory = HandFactory::standard();
        for hand in [Hand::Left, Hand::Right] {
            let snap = factory.build(hand, &HandShape::open());
            for finger in [FingerType::Index, FingerType::Middle, FingerType::Pinky] {
                let c = curl(&snap, snap.finger(finger));
                assert!(c.abs() < 1e-4, "{:?} {:?}: got {}", hand, finger, c);
            }
        }
    }

    #[test]
    fn test_curl_tracks_flex() {
        let factory = HandFactory::standard();
        for hand in [Hand::Left, Hand::Right] {
            let shape = HandShape::open().with_flex(FingerType::Ring, [45.0, 0.0, 0.0]);
            let snap = factory.build(hand, &shape);
            let c = curl(&snap, snap.ring());
            assert!((c - 0.5).abs() < 1e-3, "{:?}: got {}", hand, c);
        }
    }

    #[test]
    fn test_curl_saturates() {
        let shape = HandShape::open().with_flex(FingerType::Pinky, [120.0, 0.0, 0.0]);
        let snap = HandFactory::standard().build(Hand::Right, &shape);
        assert_eq!(curl(&snap, snap.pinky()), 1.0);
    }

    #[test]
    fn test_thumb_uses_intermediate_bone() {
        let snap = HandFactory::standard().build(Hand::Right, &HandShape::open());
        assert_eq!(base_bone(snap.thumb()), BoneType::Intermediate);
        assert_eq!(base_bone(snap.index()), BoneType::Proximal);
    }

    #[test]
    fn test_grip_curl() {
        let factory = HandFactory::standard();
        let straight = factory.build(Hand::Right, &HandShape::open());
        assert!(grip_curl(&straight, straight.middle()).abs() < 1e-4);

        let bent = factory.build(
            Hand::Right,
            &HandShape::open().with_flex(FingerType::Middle, [0.0, 45.0, 30.0]),
        );
        let g = grip_curl(&bent, bent.middle());
        assert!((g - 0.5).abs() < 1e-3, "got {}", g);
    }

    #[test]
    fn test_signed_finger_angle_mirrors() {
        let factory = HandFactory::standard();
        for hand in [Hand::Left, Hand::Right] {
            let snap = factory.build(hand, &HandShape::open());
            let angle = signed_finger_angle(&snap, snap.palmar_axis(), base_direction(snap.middle()));
            assert!((angle - 90.0).abs() < 1e-3, "{:?}: got {}", hand, angle);
        }
    }
}
