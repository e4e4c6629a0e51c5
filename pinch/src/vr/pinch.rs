//! Pinch state machine for a single hand.
//!
//! Each tick either runs the activation check (inactive) or the
//! deactivation check (active), then refreshes the pinch pose.  Activation
//! sits behind two frame debounces (time since the last release and time
//! since the wrist was last seen end-on), a full window of strength
//! samples, the eligibility gate and an optional velocity gate.  A pinch
//! that closes without activating must reopen past the re-pinch strength
//! before it may activate.

use tracing::{debug, trace};

use super::config::PinchConfig;
use super::curl;
use super::delta_buffer::{DeltaFloatBuffer, DeltaVecBuffer};
use super::eligibility::{self, EligibilityReport, EligibilitySignals};
use super::gesture::{DeactivationReason, Gesture, PinchEvent, Viewer};
use super::hand_tracking::{Hand, HandSnapshot, Pose};
use super::math;
use super::segment;

/// Samples kept by every rolling buffer.
pub const BUFFER_CAPACITY: usize = 5;

/// Distance at which the offset pinch distance maps to strength 1.
const FULL_STRENGTH_DISTANCE: f32 = 0.0168;
/// Distance at which the offset pinch distance maps to strength 0.
const ZERO_STRENGTH_DISTANCE: f32 = 0.08;

/// Strength reported on every frame a pinch is held.
pub const ACTIVE_STRENGTH: f32 = 1.0;

/// Curl velocity assumed until both curl buffers are full.
const DEFAULT_CURL_VELOCITY: f32 = 10.0;

// ── State ──────────────────────────────────────────────────

/// Externally visible recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchState {
    Inactive,
    /// Tracked and passing the eligibility gate, not yet pinching.
    Eligible,
    Active,
}

impl PinchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Eligible => "eligible",
            Self::Active => "active",
        }
    }
}

/// Pinch strength from a raw index/thumb segment distance.  Not clamped
/// above 1: distances under the full-strength distance extrapolate.
pub fn pinch_strength(distance: f32, config: &PinchConfig) -> f32 {
    let offset = math::clamp01(distance - config.activation_pinch_distance);
    math::map_unclamped(offset, FULL_STRENGTH_DISTANCE, ZERO_STRENGTH_DISTANCE, 1.0, 0.0)
}

// ── Recognizer ─────────────────────────────────────────────

/// Pinch recognizer for one hand.
#[derive(Debug, Clone)]
pub struct PinchGesture {
    hand: Hand,
    config: PinchConfig,

    tracked: bool,
    active: bool,
    eligible: bool,
    requires_repinch: bool,

    reactivate_frames: u32,
    frames_since_degenerate: u32,
    deactivate_frames: u32,

    strength_buffer: DeltaFloatBuffer,
    palm_buffer: DeltaVecBuffer,
    pinky_curl_buffer: DeltaFloatBuffer,
    index_curl_buffer: DeltaFloatBuffer,
    middle_curl_buffer: DeltaFloatBuffer,

    last_report: Option<EligibilityReport>,
    /// Seconds accumulated from `dt`.
    clock: f64,
    pose: Pose,
}

impl PinchGesture {
    pub fn new(hand: Hand, config: PinchConfig) -> Self {
        Self {
            hand,
            config,
            tracked: false,
            active: false,
            eligible: false,
            requires_repinch: false,
            reactivate_frames: 0,
            frames_since_degenerate: 0,
            deactivate_frames: 0,
            strength_buffer: DeltaFloatBuffer::new(BUFFER_CAPACITY),
            palm_buffer: DeltaVecBuffer::new(BUFFER_CAPACITY),
            pinky_curl_buffer: DeltaFloatBuffer::new(BUFFER_CAPACITY),
            index_curl_buffer: DeltaFloatBuffer::new(BUFFER_CAPACITY),
            middle_curl_buffer: DeltaFloatBuffer::new(BUFFER_CAPACITY),
            last_report: None,
            clock: 0.0,
            pose: Pose::IDENTITY,
        }
    }

    pub fn config(&self) -> &PinchConfig {
        &self.config
    }

    pub fn state(&self) -> PinchState {
        if self.active {
            PinchState::Active
        } else if self.tracked && self.eligible {
            PinchState::Eligible
        } else {
            PinchState::Inactive
        }
    }

    /// Whether a pinch that closed without activating must reopen first.
    pub fn requires_repinch(&self) -> bool {
        self.requires_repinch
    }

    /// Most recent eligibility evaluation, if any since tracking began.
    pub fn last_eligibility(&self) -> Option<&EligibilityReport> {
        self.last_report.as_ref()
    }

    /// Advance one frame.  `None` means the hand is not tracked.
    pub fn tick(&mut self, hand: Option<&HandSnapshot>, viewer: &Viewer, dt: f32) -> Vec<PinchEvent> {
        let Some(snapshot) = hand else {
            return self.lose_tracking();
        };
        self.tracked = true;
        self.clock += f64::from(dt);

        let mut events = Vec::new();

        // Looking down the wrist occludes the fingers
        let wrist_view_angle = viewer.angle_to_direction(snapshot.palm_position(), snapshot.distal_axis());
        if wrist_view_angle < self.config.degenerate_view_angle {
            self.frames_since_degenerate = 0;
        }

        let distance = segment::pinch_segment_displacement(snapshot).distance();
        let mut activated = false;

        if self.active {
            // A held pinch reports full strength until it is released
            trace!(
                hand = self.hand.as_str(),
                measured = pinch_strength(distance, &self.config),
                "pinch strength (active)"
            );
            events.push(PinchEvent::Strength {
                hand: self.hand,
                strength: ACTIVE_STRENGTH,
            });
            if self.should_deactivate(distance) {
                self.active = false;
                self.eligible = false;
                self.reactivate_frames = 0;
                self.strength_buffer.clear();
                debug!(hand = self.hand.as_str(), distance, "pinch released");
                events.push(PinchEvent::StreamClose {
                    hand: self.hand,
                    reason: DeactivationReason::Finished,
                });
            }
        } else if self.should_activate(snapshot, viewer, distance, &mut events) {
            self.active = true;
            self.deactivate_frames = 0;
            activated = true;
            debug!(hand = self.hand.as_str(), distance, "pinch activated");
            events.push(PinchEvent::StreamOpen { hand: self.hand });
        }

        self.update_pose(snapshot);

        if self.active && !activated {
            events.push(PinchEvent::PoseSample {
                hand: self.hand,
                pose: self.pose,
            });
        }

        events
    }

    fn should_activate(
        &mut self,
        hand: &HandSnapshot,
        viewer: &Viewer,
        distance: f32,
        events: &mut Vec<PinchEvent>,
    ) -> bool {
        let was_eligible = self.eligible;
        self.eligible = false;

        let t = self.clock;
        self.pinky_curl_buffer.add(curl::curl(hand, hand.pinky()), t);
        self.index_curl_buffer.add(curl::curl(hand, hand.index()), t);
        self.middle_curl_buffer.add(curl::curl(hand, hand.middle()), t);

        if self.reactivate_frames <= self.config.min_reactivate_frames {
            self.reactivate_frames += 1;
            return false;
        }
        if self.frames_since_degenerate <= self.config.min_frames_since_degenerate {
            self.frames_since_degenerate += 1;
            return false;
        }

        let strength = pinch_strength(distance, &self.config);
        trace!(hand = self.hand.as_str(), strength, distance, "pinch strength");
        events.push(PinchEvent::Strength {
            hand: self.hand,
            strength,
        });
        self.strength_buffer.add(strength, t);
        self.palm_buffer.add(hand.palm_position(), t);

        if !self.strength_buffer.is_full() {
            return false;
        }

        let pinky_curl = self.pinky_curl_buffer.latest().unwrap_or(0.0);
        let signals = EligibilitySignals::measure(hand, viewer, pinky_curl, self.requires_repinch);
        let report = eligibility::evaluate(&signals, &self.config, was_eligible);
        self.eligible = report.is_eligible();
        if self.eligible != was_eligible {
            debug!(
                hand = self.hand.as_str(),
                eligible = self.eligible,
                failed = ?report.failed_checks(),
                "pinch eligibility changed"
            );
        }
        self.last_report = Some(report);

        let should_activate = self.eligible
            && strength > self.config.activation_strength
            && self.velocity_gate(distance);

        if strength > self.config.repinch_strength && !should_activate && !self.requires_repinch {
            self.requires_repinch = true;
            debug!(hand = self.hand.as_str(), strength, "pinch closed while ineligible, repinch required");
        }
        if self.requires_repinch && strength < self.config.repinch_strength {
            self.requires_repinch = false;
            debug!(hand = self.hand.as_str(), strength, "repinch latch cleared");
        }

        should_activate
    }

    /// Strength must be rising faster than a bar that grows with hand speed
    /// and shrinks as the fingers close.  Passes trivially when velocities
    /// are disabled.
    fn velocity_gate(&self, distance: f32) -> bool {
        if !self.config.use_velocities {
            return true;
        }

        let hand_speed = self.palm_buffer.delta().map(math::length).unwrap_or(0.0);
        let threshold = math::map(hand_speed, 0.0, 2.0, 1.5, 8.0) * math::map(distance, 0.0, 0.02, 0.0, 1.0);
        let strength_ok = match self.strength_buffer.delta() {
            Ok(velocity) => velocity > threshold,
            Err(_) => false,
        };
        if !strength_ok {
            return false;
        }
        if !self.config.require_pinky_safety {
            return true;
        }

        let (index_minus_pinky, index) = self.curl_velocities();
        index_minus_pinky > self.config.min_index_minus_pinky_curl_vel && index > self.config.min_index_curl_vel
    }

    /// `(index - pinky, index)` curl velocities.
    fn curl_velocities(&self) -> (f32, f32) {
        match (self.index_curl_buffer.delta(), self.pinky_curl_buffer.delta()) {
            (Ok(index), Ok(pinky)) => (index - pinky, index),
            _ => (DEFAULT_CURL_VELOCITY, DEFAULT_CURL_VELOCITY),
        }
    }

    fn should_deactivate(&mut self, distance: f32) -> bool {
        if self.deactivate_frames <= self.config.min_deactivate_frames {
            self.deactivate_frames += 1;
            return false;
        }
        distance > self.config.pinch_deactivate_distance
    }

    /// Blend the predicted pinch point toward the fingertip midpoint by the
    /// latest buffered strength.
    fn update_pose(&mut self, hand: &HandSnapshot) {
        let predicted = hand.predicted_pinch_position();
        let position = match self.strength_buffer.latest() {
            Ok(strength) => {
                let tips = math::midpoint(hand.index().tip_position(), hand.thumb().tip_position());
                math::lerp_vec(predicted, tips, strength)
            }
            Err(_) => predicted,
        };
        self.pose = Pose::new(position, hand.rotation());
    }

    fn lose_tracking(&mut self) -> Vec<PinchEvent> {
        let mut events = Vec::new();
        if self.active {
            debug!(hand = self.hand.as_str(), "tracking lost during pinch");
            events.push(PinchEvent::StreamClose {
                hand: self.hand,
                reason: DeactivationReason::TrackingLost,
            });
        }
        self.reset();
        events
    }

    /// Drop all runtime state.  The last pose is kept.
    pub fn reset(&mut self) {
        self.tracked = false;
        self.active = false;
        self.eligible = false;
        self.requires_repinch = false;
        self.reactivate_frames = 0;
        self.frames_since_degenerate = 0;
        self.deactivate_frames = 0;
        self.strength_buffer.clear();
        self.palm_buffer.clear();
        self.pinky_curl_buffer.clear();
        self.index_curl_buffer.clear();
        self.middle_curl_buffer.clear();
        self.last_report = None;
    }

    /// Middle curl rate over the buffer window, when available.  Diagnostic
    /// only; the gate does not read it.
    pub fn middle_curl_velocity(&self) -> Option<f32> {
        self.middle_curl_buffer.delta().ok()
    }

    pub fn status_sexp(&self) -> String {
        let p = self.pose.position;
        format!(
            "(:state {} :eligible {} :repinch {} :position ({:.4} {:.4} {:.4}))",
            self.state().as_str(),
            if self.is_eligible() { "t" } else { "nil" },
            if self.requires_repinch { "t" } else { "nil" },
            p[0],
            p[1],
            p[2],
        )
    }
}

impl Gesture for PinchGesture {
    fn hand(&self) -> Hand {
        self.hand
    }

    fn tick(&mut self, hand: Option<&HandSnapshot>, viewer: &Viewer, dt: f32) -> Vec<PinchEvent> {
        PinchGesture::tick(self, hand, viewer, dt)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_eligible(&self) -> bool {
        self.tracked && (self.active || self.eligible)
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vr::hand_tracking::FingerType;
    use crate::vr::synthetic::{overhead_viewer, HandFactory, HandShape};

    const DT: f32 = 1.0 / 90.0;

    /// Frames before the first strength sample: six reactivation frames,
    /// then seven degenerate-view frames.
    const GATE_FRAMES: usize = 13;
    /// Enough open frames to pass both debounces and fill the strength window.
    const WARMUP_FRAMES: usize = 20;

    struct Rig {
        factory: HandFactory,
        gesture: PinchGesture,
        viewer: Viewer,
    }

    impl Rig {
        fn new(config: PinchConfig) -> Self {
            let factory = HandFactory::standard();
            let viewer = overhead_viewer(HandShape::open().position);
            Self {
                factory,
                gesture: PinchGesture::new(Hand::Right, config),
                viewer,
            }
        }

        fn step(&mut self, shape: &HandShape) -> Vec<PinchEvent> {
            let snap = self.factory.build(Hand::Right, shape);
            self.gesture.tick(Some(&snap), &self.viewer, DT)
        }

        fn gap(&mut self, gap: f32) -> Vec<PinchEvent> {
            self.step(&HandShape::pinching(gap))
        }

        fn warm_up(&mut self) {
            for _ in 0..WARMUP_FRAMES {
                let events = self.gap(0.08);
                assert!(!opened(&events), "{:?}", events);
            }
        }
    }

    /// Gap that yields `strength` under the default config.
    fn gap_for(strength: f32) -> f32 {
        0.01 + ZERO_STRENGTH_DISTANCE - strength * (ZERO_STRENGTH_DISTANCE - FULL_STRENGTH_DISTANCE)
    }

    fn opened(events: &[PinchEvent]) -> bool {
        events.iter().any(|e| matches!(e, PinchEvent::StreamOpen { .. }))
    }

    fn closed(events: &[PinchEvent]) -> Option<DeactivationReason> {
        events.iter().find_map(|e| match e {
            PinchEvent::StreamClose { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    fn strengths(events: &[PinchEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                PinchEvent::Strength { strength, .. } => Some(*strength),
                _ => None,
            })
            .collect()
    }

    /// Warm up, then close the pinch and return with the gesture active.
    fn activated_rig(config: PinchConfig) -> Rig {
        let mut rig = Rig::new(config);
        rig.warm_up();
        let events = rig.gap(0.01);
        assert!(opened(&events), "expected activation, got {:?}", events);
        rig
    }

    #[test]
    fn test_strength_mapping() {
        let config = PinchConfig::default();
        assert!((pinch_strength(0.09, &config)).abs() < 1e-5);
        assert!((pinch_strength(0.0268, &config) - 1.0).abs() < 1e-5);
        assert!((pinch_strength(gap_for(0.9), &config) - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_strength_extrapolates_past_one() {
        // Closer than the full-strength distance keeps rising
        let config = PinchConfig::default();
        let s = pinch_strength(0.01, &config);
        assert!((s - 0.0168 / 0.0632 - 1.0).abs() < 1e-4, "got {}", s);
        assert!(s > 1.0);
        // Below the offset the distance clamps at zero
        assert!((pinch_strength(0.0, &config) - s).abs() < 1e-6);
    }

    #[test]
    fn test_new_state() {
        let gesture = PinchGesture::new(Hand::Left, PinchConfig::default());
        assert_eq!(gesture.state(), PinchState::Inactive);
        assert!(!gesture.is_active());
        assert!(!gesture.is_eligible());
        assert_eq!(gesture.hand(), Hand::Left);
        assert_eq!(gesture.pose(), Pose::IDENTITY);
    }

    #[test]
    fn test_debounce_gates_strength() {
        let mut rig = Rig::new(PinchConfig::default());
        for frame in 0..GATE_FRAMES {
            let events = rig.gap(0.01);
            assert!(events.is_empty(), "frame {}: {:?}", frame, events);
        }
        // First strength sample, window not yet full
        let events = rig.gap(0.01);
        assert_eq!(strengths(&events).len(), 1);
        assert!(!opened(&events));
    }

    #[test]
    fn test_end_to_end_approach() {
        let mut rig = Rig::new(PinchConfig::default());
        rig.warm_up();
        assert_eq!(rig.gesture.state(), PinchState::Eligible);

        let mut all = Vec::new();
        let mut open_frames = Vec::new();
        for i in 0..10 {
            let gap = 0.08 - i as f32 * 0.07 / 9.0;
            let events = rig.gap(gap);
            let s = strengths(&events);
            assert_eq!(s.len(), 1, "frame {}: {:?}", i, events);
            all.extend(s);
            if opened(&events) {
                open_frames.push(i);
            }
        }

        for pair in all.windows(2) {
            assert!(pair[1] >= pair[0], "strengths not monotonic: {:?}", all);
        }
        assert_eq!(open_frames, vec![6], "strengths {:?}", all);
        assert!(all[5] <= 0.8 && all[6] > 0.8, "strengths {:?}", all);
        assert!(rig.gesture.is_active());
    }

    #[test]
    fn test_pose_samples_follow_activation() {
        let mut rig = activated_rig(PinchConfig::default());
        let events = rig.gap(0.01);
        assert!(matches!(events[0], PinchEvent::Strength { .. }), "{:?}", events);
        assert!(
            matches!(events.last(), Some(PinchEvent::PoseSample { .. })),
            "{:?}",
            events
        );
        // Pose sits between the fingertips while the pinch is held
        let snap = rig.factory.build(Hand::Right, &HandShape::pinching(0.01));
        let tips = math::midpoint(snap.index().tip_position(), snap.thumb().tip_position());
        let pose = rig.gesture.pose();
        assert!(math::distance(pose.position, tips) < 0.02, "{:?} vs {:?}", pose, tips);
        assert_eq!(pose.rotation, snap.rotation());
    }

    #[test]
    fn test_deactivation_after_debounce() {
        let mut rig = activated_rig(PinchConfig::default());
        // Released immediately, but the deactivation window holds it open
        for frame in 0..6 {
            let events = rig.gap(0.08);
            assert!(closed(&events).is_none(), "frame {}: {:?}", frame, events);
            assert!(rig.gesture.is_active());
        }
        let events = rig.gap(0.08);
        assert_eq!(closed(&events), Some(DeactivationReason::Finished));
        assert!(!events.iter().any(|e| matches!(e, PinchEvent::PoseSample { .. })));
        assert!(!rig.gesture.is_active());
        // Eligibility is re-earned after the release, not carried over
        assert_eq!(rig.gesture.state(), PinchState::Inactive);
        assert!(!rig.gesture.is_eligible());
    }

    #[test]
    fn test_held_pinch_reports_full_strength() {
        let mut rig = activated_rig(PinchConfig::default());
        // Held tight, inside the release band, then opened through the
        // deactivation window
        let gaps = [0.01, 0.03, 0.03, 0.08, 0.08, 0.08];
        for (frame, gap) in gaps.iter().enumerate() {
            assert!(rig.gesture.is_active(), "frame {}", frame);
            let events = rig.gap(*gap);
            assert_eq!(strengths(&events), vec![ACTIVE_STRENGTH], "frame {}: {:?}", frame, events);
        }
        // The releasing frame still reports the held strength
        let events = rig.gap(0.08);
        assert_eq!(closed(&events), Some(DeactivationReason::Finished));
        assert_eq!(strengths(&events), vec![ACTIVE_STRENGTH]);
    }

    #[test]
    fn test_middle_curl_velocity() {
        let mut rig = Rig::new(PinchConfig::default());
        assert_eq!(rig.gesture.middle_curl_velocity(), None);

        // 10° more proximal flex per frame is 1/9 curl per frame
        for i in 0..BUFFER_CAPACITY {
            let shape = HandShape::pinching(0.08).with_flex(FingerType::Middle, [i as f32 * 10.0, 0.0, 0.0]);
            rig.step(&shape);
        }
        let velocity = rig.gesture.middle_curl_velocity().expect("full window");
        assert!((velocity - 10.0).abs() < 1e-2, "got {}", velocity);
    }

    #[test]
    fn test_velocity_gate_after_long_uptime() {
        let mut config = PinchConfig::default();
        config.use_velocities = true;
        let mut rig = Rig::new(config);
        // Three days of prior frames
        rig.gesture.clock = 3.0e5;
        rig.warm_up();

        let mut open_frames = Vec::new();
        for i in 0..10 {
            let events = rig.gap(0.08 - i as f32 * 0.07 / 9.0);
            if opened(&events) {
                open_frames.push(i);
            }
        }
        assert_eq!(open_frames, vec![6]);
    }

    #[test]
    fn test_hysteresis_band_holds_pinch() {
        let mut rig = activated_rig(PinchConfig::default());
        // 3 cm is above the activation band but inside the deactivation distance
        for frame in 0..20 {
            let events = rig.gap(0.03);
            assert!(closed(&events).is_none(), "frame {}: {:?}", frame, events);
        }
        assert!(rig.gesture.is_active());
    }

    #[test]
    fn test_reactivation_debounce() {
        let mut rig = activated_rig(PinchConfig::default());
        for _ in 0..7 {
            rig.gap(0.08);
        }
        assert!(!rig.gesture.is_active());

        // A perfect pinch right after release must wait out the debounce
        // and refill the strength window
        for frame in 1..=10 {
            let events = rig.gap(0.01);
            assert!(!opened(&events), "frame {}: {:?}", frame, events);
            if frame <= 6 {
                assert!(strengths(&events).is_empty(), "frame {}: {:?}", frame, events);
            }
        }
        let events = rig.gap(0.01);
        assert!(opened(&events), "{:?}", events);
    }

    #[test]
    fn test_degenerate_view_blocks_activation() {
        let mut rig = Rig::new(PinchConfig::default());
        let palm = HandShape::open().position;
        // Behind the wrist, looking along the fingers
        rig.viewer = Viewer {
            position: math::add(palm, [0.0, 0.0, -0.5]),
            forward: [0.0, 0.0, 1.0],
            fov_deg: 90.0,
        };
        for frame in 0..40 {
            let events = rig.gap(0.01);
            assert!(events.is_empty(), "frame {}: {:?}", frame, events);
        }

        // Six clean frames before strength is sampled again
        rig.viewer = overhead_viewer(palm);
        for frame in 0..6 {
            let events = rig.gap(0.01);
            assert!(events.is_empty(), "frame {}: {:?}", frame, events);
        }
        assert_eq!(strengths(&rig.gap(0.01)).len(), 1);
    }

    #[test]
    fn test_repinch_latch() {
        let mut rig = Rig::new(PinchConfig::default());
        rig.warm_up();

        let curled_middle = |gap: f32| {
            HandShape::pinching(gap).with_flex(FingerType::Middle, [60.0, 60.0, 40.0])
        };

        // Closes to 0.90 while the middle finger blocks eligibility
        let events = rig.step(&curled_middle(gap_for(0.90)));
        assert!(!opened(&events));
        assert!(rig.gesture.requires_repinch());

        // Eligible again but never reopened: still suppressed
        let events = rig.gap(gap_for(0.95));
        assert!(!opened(&events), "{:?}", events);
        assert!(rig.gesture.requires_repinch());

        // Dips below the re-pinch strength, clearing the latch
        let events = rig.gap(gap_for(0.70));
        assert!(!opened(&events));
        assert!(!rig.gesture.requires_repinch());

        let events = rig.gap(gap_for(0.95));
        assert!(opened(&events), "{:?}", events);
    }

    #[test]
    fn test_tracking_loss_closes_stream() {
        let mut rig = activated_rig(PinchConfig::default());
        let viewer = rig.viewer;
        let events = rig.gesture.tick(None, &viewer, DT);
        assert_eq!(closed(&events), Some(DeactivationReason::TrackingLost));
        assert_eq!(events.len(), 1);
        assert_eq!(rig.gesture.state(), PinchState::Inactive);
        assert!(!rig.gesture.is_eligible());
        assert!(!rig.gesture.requires_repinch());

        // Nothing more to close
        assert!(rig.gesture.tick(None, &viewer, DT).is_empty());

        // Tracking resumes from scratch
        for frame in 0..GATE_FRAMES {
            assert!(rig.gap(0.01).is_empty(), "frame {}", frame);
        }
    }

    #[test]
    fn test_velocity_gate_rejects_slow_close() {
        let mut config = PinchConfig::default();
        config.use_velocities = true;
        let mut rig = Rig::new(config);
        rig.warm_up();

        // Settle just under the activation strength, then creep past 0.9
        // at 0.2 mm per frame
        let start = gap_for(0.78);
        for _ in 0..BUFFER_CAPACITY {
            assert!(!opened(&rig.gap(start)));
        }
        for i in 0..40 {
            let events = rig.gap(start - i as f32 * 0.0002);
            assert!(!opened(&events), "frame {}: {:?}", i, events);
        }
    }

    #[test]
    fn test_velocity_gate_accepts_fast_close() {
        let mut config = PinchConfig::default();
        config.use_velocities = true;
        let mut rig = Rig::new(config);
        rig.warm_up();

        let mut open_frames = Vec::new();
        for i in 0..10 {
            let events = rig.gap(0.08 - i as f32 * 0.07 / 9.0);
            if opened(&events) {
                open_frames.push(i);
            }
        }
        assert_eq!(open_frames, vec![6]);
    }

    #[test]
    fn test_zero_dt_never_passes_velocity_gate() {
        let mut config = PinchConfig::default();
        config.use_velocities = true;
        let mut gesture = PinchGesture::new(Hand::Right, config);
        let factory = HandFactory::standard();
        let viewer = overhead_viewer(HandShape::open().position);
        let snap = factory.build(Hand::Right, &HandShape::pinching(0.01));
        for _ in 0..40 {
            let events = gesture.tick(Some(&snap), &viewer, 0.0);
            assert!(!opened(&events));
        }
    }

    #[test]
    fn test_fist_never_eligible() {
        let mut rig = Rig::new(PinchConfig::default());
        for _ in 0..30 {
            let events = rig.step(&HandShape::fist().with_pinch_gap(0.01));
            assert!(!opened(&events));
        }
        assert_eq!(rig.gesture.state(), PinchState::Inactive);
        let report = rig.gesture.last_eligibility().expect("evaluated");
        assert!(!report.is_eligible());
    }

    #[test]
    fn test_status_sexp() {
        let rig = activated_rig(PinchConfig::default());
        let sexp = rig.gesture.status_sexp();
        assert!(sexp.starts_with("(:state active :eligible t"), "{}", sexp);
    }
}
