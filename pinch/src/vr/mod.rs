//! Hand geometry and pinch recognition.
//!
//! Provides:
//! - `math`, `segment`: vector helpers and segment-to-segment distance
//! - `hand_tracking`: hand skeleton snapshot and anatomical axes
//! - `delta_buffer`: rolling sample windows with finite-difference rates
//! - `curl`, `eligibility`: finger curl and the pinch safety gate
//! - `pinch`, `gesture`: the per-hand state machine, events and tracker
//! - `synthetic`: posable synthetic hands for replay and tests

pub mod config;
pub mod curl;
pub mod delta_buffer;
pub mod eligibility;
pub mod gesture;
pub mod hand_tracking;
pub mod math;
pub mod pinch;
pub mod segment;
pub mod synthetic;

pub use config::{ConfigError, PinchConfig};
pub use gesture::{DeactivationReason, Gesture, PinchEvent, PinchEventSink, PinchTracker, Viewer};
pub use hand_tracking::{Hand, HandSnapshot, Pose};
pub use pinch::{PinchGesture, PinchState};
