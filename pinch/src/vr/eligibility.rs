//! Eligibility and safety gate for pinch activation.
//!
//! A hand is eligible to begin a pinch only while it looks like it is about
//! to pinch on purpose: middle and ring fingers held away from the palm,
//! index and thumb not splayed open, the hand inside the viewer's field of
//! view, and no pinch already held from a closed pose.  Several checks are
//! looser once the hand was eligible on the previous evaluation, so the
//! flag does not flicker at the thresholds.

use super::config::PinchConfig;
use super::curl;
use super::gesture::Viewer;
use super::hand_tracking::{BoneType, HandSnapshot};
use super::math;

// ── Signals ──────────────────────────────────────────────

/// Per-frame measurements the gate decides on.  Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EligibilitySignals {
    /// Pinky-style safety amount in `[0, 1]`.
    pub pinky_safety_amount: f32,
    /// Latest buffered pinky curl.
    pub pinky_curl: f32,
    /// Signed palm-normal to middle proximal angle.
    pub middle_palm_angle: f32,
    /// Signed palm-normal to ring proximal angle.
    pub ring_palm_angle: f32,
    /// Unsigned angle between the palm normal and the viewer's forward.
    pub palm_viewer_angle: f32,
    /// Unsigned angle between the index proximal bone and the palm normal.
    pub index_palm_angle: f32,
    /// Unsigned angle between the thumb intermediate bone and the palm normal.
    pub thumb_palm_angle: f32,
    /// Angle between the view axis and the palm, seen from the viewer.
    pub hand_fov_angle: f32,
    /// Full field of view of the viewer.
    pub viewer_fov: f32,
    pub requires_repinch: bool,
}

impl EligibilitySignals {
    /// Measure `hand` as seen by `viewer`.
    pub fn measure(
        hand: &HandSnapshot,
        viewer: &Viewer,
        pinky_curl: f32,
        requires_repinch: bool,
    ) -> Self {
        let palm_dir = hand.palmar_axis();
        let index_dir = hand.index().bone(BoneType::Proximal).direction();
        let middle_dir = hand.middle().bone(BoneType::Proximal).direction();
        let ring_dir = hand.ring().bone(BoneType::Proximal).direction();
        let thumb_dir = curl::base_direction(hand.thumb());

        Self {
            pinky_safety_amount: pinky_safety_amount(hand),
            pinky_curl,
            middle_palm_angle: curl::signed_finger_angle(hand, palm_dir, middle_dir),
            ring_palm_angle: curl::signed_finger_angle(hand, palm_dir, ring_dir),
            palm_viewer_angle: math::angle_deg(palm_dir, viewer.forward),
            index_palm_angle: math::angle_deg(index_dir, palm_dir),
            thumb_palm_angle: math::angle_deg(thumb_dir, palm_dir),
            hand_fov_angle: viewer.angle_to(hand.palm_position()),
            viewer_fov: viewer.fov_deg,
            requires_repinch,
        }
    }
}

/// How far the pinky points along the hand: its proximal bone projected on
/// the distal axis, clamped to `[0, 1]`.  A pinky bent back out of the palm
/// plane counts as fully safe.
pub fn pinky_safety_amount(hand: &HandSnapshot) -> f32 {
    let pinky_dir = hand.pinky().bone(BoneType::Proximal).direction();
    if math::dot(pinky_dir, math::neg(hand.palmar_axis())) > 0.0 {
        return 1.0;
    }
    math::map(math::dot(pinky_dir, hand.distal_axis()), 0.0, 1.0, 0.0, 1.0)
}

// ── Checks ───────────────────────────────────────────────

/// One named condition of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityCheck {
    PinkySafety,
    PinkyCurl,
    MiddleFinger,
    RingFinger,
    PalmVsViewer,
    IndexAngle,
    ThumbAngle,
    FieldOfView,
    Repinch,
}

impl EligibilityCheck {
    pub const ALL: [EligibilityCheck; 9] = [
        EligibilityCheck::PinkySafety,
        EligibilityCheck::PinkyCurl,
        EligibilityCheck::MiddleFinger,
        EligibilityCheck::RingFinger,
        EligibilityCheck::PalmVsViewer,
        EligibilityCheck::IndexAngle,
        EligibilityCheck::ThumbAngle,
        EligibilityCheck::FieldOfView,
        EligibilityCheck::Repinch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityCheck::PinkySafety => "pinky-safety",
            EligibilityCheck::PinkyCurl => "pinky-curl",
            EligibilityCheck::MiddleFinger => "middle-finger",
            EligibilityCheck::RingFinger => "ring-finger",
            EligibilityCheck::PalmVsViewer => "palm-vs-viewer",
            EligibilityCheck::IndexAngle => "index-angle",
            EligibilityCheck::ThumbAngle => "thumb-angle",
            EligibilityCheck::FieldOfView => "field-of-view",
            EligibilityCheck::Repinch => "repinch",
        }
    }
}

/// Outcome of every check for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityReport {
    passed: [bool; 9],
}

impl EligibilityReport {
    pub fn passed(&self, check: EligibilityCheck) -> bool {
        self.passed[check as usize]
    }

    pub fn is_eligible(&self) -> bool {
        self.passed.iter().all(|p| *p)
    }

    pub fn failed_checks(&self) -> Vec<EligibilityCheck> {
        EligibilityCheck::ALL
            .iter()
            .copied()
            .filter(|c| !self.passed(*c))
            .collect()
    }
}

/// Hysteresis-aware minimum: `threshold` to become eligible, scaled by
/// `mult` to stay eligible.
fn at_least(value: f32, threshold: f32, mult: f32, was_eligible: bool) -> bool {
    if was_eligible {
        value >= threshold * mult
    } else {
        value >= threshold
    }
}

/// Hysteresis-aware maximum with separate enter and stay thresholds.
fn below(value: f32, enter: f32, stay: f32, was_eligible: bool) -> bool {
    if was_eligible {
        value < stay
    } else {
        value < enter
    }
}

/// Run every check against `signals`.  `was_eligible` is the result of the
/// previous evaluation and selects the looser thresholds.
pub fn evaluate(
    signals: &EligibilitySignals,
    config: &PinchConfig,
    was_eligible: bool,
) -> EligibilityReport {
    let mult = config.ring_middle_safety_hysteresis_mult;
    let mut passed = [false; 9];

    passed[EligibilityCheck::PinkySafety as usize] = !config.require_pinky_safety
        || signals.pinky_safety_amount > config.min_pinky_safety_product;
    passed[EligibilityCheck::PinkyCurl as usize] =
        !config.require_pinky_safety || signals.pinky_curl < config.max_pinky_curl;
    passed[EligibilityCheck::MiddleFinger as usize] = !config.require_middle_finger_angle
        || at_least(
            signals.middle_palm_angle,
            config.min_palm_middle_angle,
            mult,
            was_eligible,
        );
    passed[EligibilityCheck::RingFinger as usize] = !config.require_ring_finger_angle
        || at_least(
            signals.ring_palm_angle,
            config.min_palm_ring_angle,
            mult,
            was_eligible,
        );
    passed[EligibilityCheck::PalmVsViewer as usize] = !config.require_palm_vs_viewer_angle
        || signals.palm_viewer_angle <= config.max_palm_vs_viewer_angle;
    passed[EligibilityCheck::IndexAngle as usize] = below(
        signals.index_palm_angle,
        config.max_index_angle_for_eligibility_activation,
        config.max_index_angle_for_eligibility_deactivation,
        was_eligible,
    );
    passed[EligibilityCheck::ThumbAngle as usize] = below(
        signals.thumb_palm_angle,
        config.max_thumb_angle_for_eligibility_activation,
        config.max_thumb_angle_for_eligibility_deactivation,
        was_eligible,
    );
    passed[EligibilityCheck::FieldOfView as usize] =
        signals.hand_fov_angle < signals.viewer_fov / config.fov_divisor;
    passed[EligibilityCheck::Repinch as usize] = !signals.requires_repinch;

    EligibilityReport { passed }
}
