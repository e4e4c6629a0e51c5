//! Synthetic hands for replay, calibration and tests.
//!
//! `HandProportions` is the measurement table of a standard adult hand,
//! built once and handed to a `HandFactory`; the factory poses that hand
//! from a `HandShape` into a `HandSnapshot` in engine space.

use super::gesture::Viewer;
use super::hand_tracking::{Finger, FingerType, Hand, HandSnapshot, Pose};
use super::math::{self, Quat, Vec3};

/// Bone lengths and joint anchors of a hand, in hand space.
///
/// Hand-space coordinates are (radial, dorsal, distal): toward the thumb,
/// out of the back of the hand, and toward the fingertips, relative to the
/// palm center.
#[derive(Debug, Clone, PartialEq)]
pub struct HandProportions {
    /// Proximal, intermediate and distal bone lengths per finger.  The
    /// thumb's zero-length metacarpal is implicit.
    pub bone_lengths: [[f32; 3]; 5],
    /// Base of each metacarpal.
    pub metacarpal_bases: [Vec3; 5],
    /// Knuckle of each finger (end of the metacarpal).
    pub knuckles: [Vec3; 5],
}

impl HandProportions {
    /// Standard adult hand, in meters.
    pub fn standard() -> Self {
        Self {
            bone_lengths: [
                [0.045, 0.032, 0.025],
                [0.040, 0.025, 0.020],
                [0.045, 0.028, 0.021],
                [0.042, 0.027, 0.021],
                [0.033, 0.020, 0.019],
            ],
            metacarpal_bases: [
                [0.022, -0.012, -0.035],
                [0.015, 0.0, -0.045],
                [0.003, 0.0, -0.045],
                [-0.010, 0.0, -0.043],
                [-0.021, 0.0, -0.040],
            ],
            knuckles: [
                [0.022, -0.012, -0.035],
                [0.024, 0.0, 0.035],
                [0.004, 0.0, 0.038],
                [-0.014, 0.0, 0.034],
                [-0.030, 0.0, 0.027],
            ],
        }
    }

    /// Lengths of the three visible bones of `finger`.
    pub fn lengths(&self, finger: FingerType) -> [f32; 3] {
        self.bone_lengths[finger.index()]
    }
}

/// Relaxed thumb direction in hand space: out toward the radial side,
/// slightly under the palm.
const RELAXED_THUMB_DIR: Vec3 = [0.6, -0.3, 0.75];

/// How a synthetic hand is posed.
#[derive(Debug, Clone, PartialEq)]
pub struct HandShape {
    /// Palm center in engine space.
    pub position: Vec3,
    pub rotation: Quat,
    /// Flex toward the palm, in degrees, of each finger's proximal,
    /// intermediate and distal bones, indexed by `FingerType`.  The thumb
    /// entry is unused.
    pub flex: [[f32; 3]; 5],
    /// When set, the thumb is placed so its distal bone runs parallel to the
    /// index distal bone at this distance, on the radial side.
    pub pinch_gap: Option<f32>,
}

impl HandShape {
    /// Flat open hand with a relaxed thumb, 30 cm ahead of the origin.
    pub fn open() -> Self {
        Self {
            position: [0.0, 0.0, 0.3],
            rotation: math::IDENTITY,
            flex: [[0.0; 3]; 5],
            pinch_gap: None,
        }
    }

    /// Index curled toward the thumb with the other fingers extended; the
    /// index and thumb distal segments sit `gap` meters apart.
    pub fn pinching(gap: f32) -> Self {
        Self::open()
            .with_flex(FingerType::Index, [30.0, 35.0, 20.0])
            .with_pinch_gap(gap)
    }

    /// All four fingers curled into the palm.
    pub fn fist() -> Self {
        let mut shape = Self::open();
        for finger in &FingerType::ALL[1..] {
            shape.flex[finger.index()] = [75.0, 85.0, 60.0];
        }
        shape
    }

    pub fn with_flex(mut self, finger: FingerType, flex: [f32; 3]) -> Self {
        self.flex[finger.index()] = flex;
        self
    }

    pub fn with_pinch_gap(mut self, gap: f32) -> Self {
        self.pinch_gap = Some(gap);
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Poses a fixed set of proportions into hand snapshots.
#[derive(Debug, Clone)]
pub struct HandFactory {
    proportions: HandProportions,
}

impl HandFactory {
    pub fn new(proportions: HandProportions) -> Self {
        Self { proportions }
    }

    /// Factory over [`HandProportions::standard`].
    pub fn standard() -> Self {
        Self::new(HandProportions::standard())
    }

    pub fn proportions(&self) -> &HandProportions {
        &self.proportions
    }

    /// Build a snapshot of `hand` posed as `shape`.
    pub fn build(&self, hand: Hand, shape: &HandShape) -> HandSnapshot {
        let p = &self.proportions;
        let mut local: [[Vec3; 5]; 5] = [[math::ZERO; 5]; 5];

        for finger in &FingerType::ALL[1..] {
            let i = finger.index();
            local[i] = self.finger_joints(p.metacarpal_bases[i], p.knuckles[i], p.lengths(*finger), shape.flex[i]);
        }

        let thumb_base = p.metacarpal_bases[FingerType::Thumb.index()];
        local[FingerType::Thumb.index()] = match shape.pinch_gap {
            Some(gap) => {
                let index = local[FingerType::Index.index()];
                let offset = [gap, 0.0, 0.0];
                let distal_start = math::add(index[3], offset);
                let tip = math::add(index[4], offset);
                let bend = math::add(
                    math::lerp_vec(thumb_base, distal_start, 0.55),
                    [0.0, 0.01, 0.0],
                );
                [thumb_base, thumb_base, bend, distal_start, tip]
            }
            None => {
                let dir = math::normalize(RELAXED_THUMB_DIR);
                let lengths = p.lengths(FingerType::Thumb);
                let mut joints = [thumb_base; 5];
                for k in 0..3 {
                    joints[k + 2] = math::add(joints[k + 1], math::scale(dir, lengths[k]));
                }
                joints
            }
        };

        let to_world = |v: Vec3| hand_to_world(hand, shape, v);
        let fingers = FingerType::ALL.map(|finger| {
            Finger::from_joints(finger, local[finger.index()].map(to_world))
        });

        HandSnapshot {
            hand,
            palm: Pose::new(shape.position, shape.rotation),
            wrist_position: to_world([0.0, 0.0, -0.07]),
            fingers,
        }
    }

    /// Joints of a non-thumb finger, bending each bone toward the palm by
    /// its cumulative flex.
    fn finger_joints(&self, base: Vec3, knuckle: Vec3, lengths: [f32; 3], flex: [f32; 3]) -> [Vec3; 5] {
        let mut joints = [base, knuckle, knuckle, knuckle, knuckle];
        let mut angle: f32 = 0.0;
        for k in 0..3 {
            angle += flex[k];
            let rad = angle.to_radians();
            let dir = [0.0, -rad.sin(), rad.cos()];
            joints[k + 2] = math::add(joints[k + 1], math::scale(dir, lengths[k]));
        }
        joints
    }
}

/// Map a hand-space point into engine space for `hand` posed by `shape`.
fn hand_to_world(hand: Hand, shape: &HandShape, local: Vec3) -> Vec3 {
    let x_basis = math::rotate(shape.rotation, [1.0, 0.0, 0.0]);
    let radial = match hand {
        Hand::Right => math::neg(x_basis),
        Hand::Left => x_basis,
    };
    let dorsal = math::rotate(shape.rotation, [0.0, 1.0, 0.0]);
    let distal = math::rotate(shape.rotation, [0.0, 0.0, 1.0]);

    let mut world = shape.position;
    world = math::add(world, math::scale(radial, local[0]));
    world = math::add(world, math::scale(dorsal, local[1]));
    math::add(world, math::scale(distal, local[2]))
}

/// A viewer half a meter above `target`, looking straight down at it.
pub fn overhead_viewer(target: Vec3) -> Viewer {
    Viewer {
        position: math::add(target, [0.0, 0.5, 0.0]),
        forward: [0.0, -1.0, 0.0],
        fov_deg: 90.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vr::hand_tracking::BoneType;
    use crate::vr::math::assert_vec_near;

    #[test]
    fn test_open_hand_fingers_point_distal() {
        let hand = HandFactory::standard().build(Hand::Right, &HandShape::open());
        for finger in &FingerType::ALL[1..] {
            let dir = hand.finger(*finger).bone(BoneType::Proximal).direction();
            assert_vec_near(dir, [0.0, 0.0, 1.0], 1e-5);
        }
    }

    #[test]
    fn test_right_thumb_on_negative_x() {
        let hand = HandFactory::standard().build(Hand::Right, &HandShape::open());
        assert!(hand.thumb().tip_position()[0] < 0.0);
        let left = HandFactory::standard().build(Hand::Left, &HandShape::open());
        assert!(left.thumb().tip_position()[0] > 0.0);
    }

    #[test]
    fn test_pinch_gap_places_thumb_parallel() {
        let hand = HandFactory::standard().build(Hand::Right, &HandShape::pinching(0.03));
        let index = hand.index().bone(BoneType::Distal);
        let thumb = hand.thumb().bone(BoneType::Distal);
        assert!((math::distance(index.prev_joint, thumb.prev_joint) - 0.03).abs() < 1e-5);
        assert!((math::distance(index.next_joint, thumb.next_joint) - 0.03).abs() < 1e-5);
        assert_vec_near(index.direction(), thumb.direction(), 1e-5);
    }

    #[test]
    fn test_thumb_metacarpal_is_zero_length() {
        let hand = HandFactory::standard().build(Hand::Left, &HandShape::open());
        assert_eq!(hand.thumb().bone(BoneType::Metacarpal).length(), 0.0);
    }

    #[test]
    fn test_custom_proportions_respected() {
        let mut proportions = HandProportions::standard();
        proportions.bone_lengths[FingerType::Middle.index()] = [0.05, 0.03, 0.02];
        let factory = HandFactory::new(proportions);
        let hand = factory.build(Hand::Right, &HandShape::open());
        assert!((hand.middle().length() - 0.10).abs() < 1e-5);
        assert_eq!(factory.proportions().lengths(FingerType::Middle), [0.05, 0.03, 0.02]);
    }
}
