//! Pinch-gesture recognition for tracked VR hands.
//!
//! Turns per-frame hand skeletons into a debounced, hysteretic pinch signal:
//! a strength reading every frame, plus an open / pose / close stream while
//! a deliberate pinch is held.

pub mod vr;
