//! Per-frame hand snapshot consumed by the gesture recognizers.
//!
//! Models five fingers of four bones each (metacarpal, proximal,
//! intermediate, distal) plus the palm pose.  Hand axes are derived from the
//! palm orientation: `+z` of the palm basis points along the fingers, `+y`
//! out of the back of the hand, in a y-up, z-forward engine space.
//! The thumb carries a zero-length metacarpal.

use super::math::{self, Quat, Vec3};

// ── Hand enum ──────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse "left" or "right".
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

// ── Finger and bone definitions ────────────────────────────

/// The five digits, in anatomical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerType {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerType {
    pub const ALL: [FingerType; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Convert to array index (0-4).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

/// Bones of a finger, from the hand outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneType {
    Metacarpal,
    Proximal,
    Intermediate,
    Distal,
}

impl BoneType {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Bones per finger.
pub const BONE_COUNT: usize = 4;

/// A single bone, spanning two joints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Joint closest to the wrist.
    pub prev_joint: Vec3,
    /// Joint closest to the fingertip.
    pub next_joint: Vec3,
}

impl Bone {
    pub fn new(prev_joint: Vec3, next_joint: Vec3) -> Self {
        Self {
            prev_joint,
            next_joint,
        }
    }

    /// Unit direction from `prev_joint` to `next_joint`; zero for a
    /// zero-length bone.
    pub fn direction(&self) -> Vec3 {
        math::normalize(math::sub(self.next_joint, self.prev_joint))
    }

    pub fn length(&self) -> f32 {
        math::distance(self.prev_joint, self.next_joint)
    }
}

/// One finger of a tracked hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    pub finger_type: FingerType,
    /// Bones indexed by [`BoneType`].
    pub bones: [Bone; BONE_COUNT],
}

impl Finger {
    /// Build a finger from its five joints, wrist-most first and tip last.
    pub fn from_joints(finger_type: FingerType, joints: [Vec3; BONE_COUNT + 1]) -> Self {
        let bones = [
            Bone::new(joints[0], joints[1]),
            Bone::new(joints[1], joints[2]),
            Bone::new(joints[2], joints[3]),
            Bone::new(joints[3], joints[4]),
        ];
        Self { finger_type, bones }
    }

    pub fn bone(&self, bone: BoneType) -> &Bone {
        &self.bones[bone.index()]
    }

    pub fn tip_position(&self) -> Vec3 {
        self.bones[BoneType::Distal.index()].next_joint
    }

    /// Length of the visible finger: proximal, intermediate and distal bones.
    pub fn length(&self) -> f32 {
        self.bones[1..].iter().map(Bone::length).sum()
    }
}

// ── Pose ───────────────────────────────────────────────────

/// Position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in meters (x, y, z).
    pub position: Vec3,
    /// Orientation quaternion (x, y, z, w).
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: math::ZERO,
        rotation: math::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Hand snapshot ──────────────────────────────────────────

/// Read-only view of one hand for a single frame.
///
/// Owned by the tracking source; recognizers borrow it for one tick and
/// never keep it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSnapshot {
    /// Which hand this snapshot represents.
    pub hand: Hand,
    /// Palm center and hand orientation.
    pub palm: Pose,
    pub wrist_position: Vec3,
    /// Fingers indexed by [`FingerType`].
    pub fingers: [Finger; 5],
}

impl HandSnapshot {
    pub fn finger(&self, finger: FingerType) -> &Finger {
        &self.fingers[finger.index()]
    }

    pub fn thumb(&self) -> &Finger {
        self.finger(FingerType::Thumb)
    }

    pub fn index(&self) -> &Finger {
        self.finger(FingerType::Index)
    }

    pub fn middle(&self) -> &Finger {
        self.finger(FingerType::Middle)
    }

    pub fn ring(&self) -> &Finger {
        self.finger(FingerType::Ring)
    }

    pub fn pinky(&self) -> &Finger {
        self.finger(FingerType::Pinky)
    }

    pub fn is_left(&self) -> bool {
        self.hand == Hand::Left
    }

    pub fn palm_position(&self) -> Vec3 {
        self.palm.position
    }

    pub fn rotation(&self) -> Quat {
        self.palm.rotation
    }

    /// Normal out of the palm surface.
    pub fn palmar_axis(&self) -> Vec3 {
        math::neg(math::rotate(self.palm.rotation, [0.0, 1.0, 0.0]))
    }

    /// Direction from the wrist toward the knuckles.
    pub fn distal_axis(&self) -> Vec3 {
        math::rotate(self.palm.rotation, [0.0, 0.0, 1.0])
    }

    /// Direction across the palm toward the thumb side.
    pub fn radial_axis(&self) -> Vec3 {
        let x_basis = math::rotate(self.palm.rotation, [1.0, 0.0, 0.0]);
        match self.hand {
            Hand::Right => math::neg(x_basis),
            Hand::Left => x_basis,
        }
    }

    /// Where the thumb and index tips are expected to meet.
    ///
    /// A rigid point in hand space offset from the index knuckle and scaled
    /// by index length, pulled toward the thumb tip as the thumb swings
    /// under the palm, then lightly toward the index tip.
    pub fn predicted_pinch_position(&self) -> Vec3 {
        let index_tip = self.index().tip_position();
        let thumb_tip = self.thumb().tip_position();
        let index_knuckle = self.index().bone(BoneType::Proximal).prev_joint;
        let index_length = self.index().length();
        let radial = self.radial_axis();

        let thumb_influence = math::map(
            math::dot(math::normalize(math::sub(thumb_tip, index_knuckle)), radial),
            0.0,
            1.0,
            0.5,
            0.0,
        );

        let mut predicted = index_knuckle;
        predicted = math::add(predicted, math::scale(self.palmar_axis(), index_length * 0.85));
        predicted = math::add(predicted, math::scale(self.distal_axis(), index_length * 0.20));
        predicted = math::add(predicted, math::scale(radial, index_length * 0.20));

        predicted = math::lerp_vec(predicted, thumb_tip, thumb_influence);
        math::lerp_vec(predicted, index_tip, 0.15)
    }
}

// ── Tests ──────────────────────────────────────────────────
