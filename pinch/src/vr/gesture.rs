//! Gesture events, the viewer model and the two-handed pinch tracker.
//!
//! Recognizers are polled once per frame and return the events that frame
//! produced, in order: a strength reading, then at most one of stream open,
//! pose sample or stream close.  Hosts either consume the returned `Vec`
//! directly or forward each event into a `PinchEventSink`.

use super::config::PinchConfig;
use super::hand_tracking::{Hand, HandSnapshot, Pose};
use super::math::{self, Vec3};
use super::pinch::PinchGesture;

// ── Viewer ─────────────────────────────────────────────────

/// Camera the hands are seen from, in the same space as hand snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub position: Vec3,
    /// View direction; need not be normalized.
    pub forward: Vec3,
    /// Full field of view in degrees.
    pub fov_deg: f32,
}

impl Viewer {
    /// Angle in degrees between the view direction and `point`.
    pub fn angle_to(&self, point: Vec3) -> f32 {
        math::angle_deg(self.forward, math::sub(point, self.position))
    }

    /// Angle in degrees between `direction` and the ray from the viewer to
    /// `point`.
    pub fn angle_to_direction(&self, point: Vec3, direction: Vec3) -> f32 {
        math::angle_deg(direction, math::sub(point, self.position))
    }
}

// ── Events ─────────────────────────────────────────────────

/// Why a pinch stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationReason {
    /// The fingers opened past the release distance.
    Finished,
    /// The hand stopped being tracked mid-pinch.
    TrackingLost,
}

impl DeactivationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::TrackingLost => "tracking-lost",
        }
    }
}

/// Events emitted by pinch recognition.
#[derive(Debug, Clone, PartialEq)]
pub enum PinchEvent {
    /// Pinch strength for this frame.  May exceed 1.
    Strength { hand: Hand, strength: f32 },
    /// A pinch just began.
    StreamOpen { hand: Hand },
    /// Pinch pose on a held frame.
    PoseSample { hand: Hand, pose: Pose },
    /// The pinch ended.
    StreamClose {
        hand: Hand,
        reason: DeactivationReason,
    },
}

impl PinchEvent {
    pub fn hand(&self) -> Hand {
        match self {
            Self::Strength { hand, .. }
            | Self::StreamOpen { hand }
            | Self::PoseSample { hand, .. }
            | Self::StreamClose { hand, .. } => *hand,
        }
    }

    /// Forward this event to the matching sink callback.
    pub fn deliver(&self, sink: &mut dyn PinchEventSink) {
        match self {
            Self::Strength { hand, strength } => sink.on_pinch_strength(*hand, *strength),
            Self::StreamOpen { hand } => sink.on_stream_open(*hand),
            Self::PoseSample { hand, pose } => sink.on_pose_sample(*hand, pose),
            Self::StreamClose { hand, reason } => sink.on_stream_close(*hand, *reason),
        }
    }

    /// Render as a keyword plist.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::Strength { hand, strength } => format!(
                "(:event strength :hand {} :strength {:.4})",
                hand.as_str(),
                strength
            ),
            Self::StreamOpen { hand } => format!("(:event stream-open :hand {})", hand.as_str()),
            Self::PoseSample { hand, pose } => {
                let p = pose.position;
                let q = pose.rotation;
                format!(
                    "(:event pose :hand {} :position ({:.4} {:.4} {:.4}) :rotation ({:.4} {:.4} {:.4} {:.4}))",
                    hand.as_str(),
                    p[0],
                    p[1],
                    p[2],
                    q[0],
                    q[1],
                    q[2],
                    q[3],
                )
            }
            Self::StreamClose { hand, reason } => format!(
                "(:event stream-close :hand {} :reason {})",
                hand.as_str(),
                reason.as_str()
            ),
        }
    }
}

/// Receiver for pinch events.  Every callback defaults to a no-op.
pub trait PinchEventSink {
    fn on_pinch_strength(&mut self, _hand: Hand, _strength: f32) {}
    fn on_stream_open(&mut self, _hand: Hand) {}
    fn on_pose_sample(&mut self, _hand: Hand, _pose: &Pose) {}
    fn on_stream_close(&mut self, _hand: Hand, _reason: DeactivationReason) {}
}

// ── Gesture ────────────────────────────────────────────────

/// A one-handed gesture polled once per frame.
pub trait Gesture {
    fn hand(&self) -> Hand;

    /// Advance one frame.  `None` means the hand is not tracked.
    fn tick(&mut self, hand: Option<&HandSnapshot>, viewer: &Viewer, dt: f32) -> Vec<PinchEvent>;

    fn is_active(&self) -> bool;

    /// Tracked and either active or ready to activate.
    fn is_eligible(&self) -> bool;

    /// Latest gesture pose.
    fn pose(&self) -> Pose;
}

// ── Tracker ────────────────────────────────────────────────

/// Pinch recognition for both hands.
pub struct PinchTracker {
    left: PinchGesture,
    right: PinchGesture,
}

impl PinchTracker {
    pub fn new(config: PinchConfig) -> Self {
        Self {
            left: PinchGesture::new(Hand::Left, config.clone()),
            right: PinchGesture::new(Hand::Right, config),
        }
    }

    pub fn gesture(&self, hand: Hand) -> &PinchGesture {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn gesture_mut(&mut self, hand: Hand) -> &mut PinchGesture {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Tick both hands and return their events, left first.
    pub fn update(
        &mut self,
        left: Option<&HandSnapshot>,
        right: Option<&HandSnapshot>,
        viewer: &Viewer,
        dt: f32,
    ) -> Vec<PinchEvent> {
        let mut events = self.left.tick(left, viewer, dt);
        events.extend(self.right.tick(right, viewer, dt));
        events
    }

    /// Tick both hands and forward every event to `sink`.
    pub fn update_into(
        &mut self,
        left: Option<&HandSnapshot>,
        right: Option<&HandSnapshot>,
        viewer: &Viewer,
        dt: f32,
        sink: &mut dyn PinchEventSink,
    ) {
        for event in self.update(left, right, viewer, dt) {
            event.deliver(sink);
        }
    }

    pub fn is_active(&self, hand: Hand) -> bool {
        self.gesture(hand).is_active()
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Generate s-expression for status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:left {} :right {})",
            self.left.status_sexp(),
            self.right.status_sexp()
        )
    }

    pub fn config_sexp(&self) -> String {
        self.left.config().config_sexp()
    }
}

impl Default for PinchTracker {
    fn default() -> Self {
        Self::new(PinchConfig::default())
    }
}
