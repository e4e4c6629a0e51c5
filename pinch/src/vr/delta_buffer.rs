//! Fixed-capacity rolling sample buffers with a finite-difference rate.
//!
//! Samples are `(value, time)` pairs kept in insertion order; the oldest is
//! evicted once the buffer is full.  `delta()` reports the change per unit
//! time across the whole window and refuses to answer until the window is
//! full and spans a nonzero time.  Timestamps are `f64` seconds so long
//! sessions keep frame-level resolution; only the window span is narrowed.

use std::collections::VecDeque;

use thiserror::Error;

use super::math::{self, Vec3};

/// Reasons a buffer cannot produce a reading yet.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BufferError {
    #[error("buffer is empty")]
    Empty,

    #[error("buffer holds {len} of {capacity} samples")]
    NotFull { len: usize, capacity: usize },

    #[error("samples span zero time")]
    ZeroTimeSpan,
}

/// A value that can be differenced and scaled.
pub trait Sample: Copy {
    fn difference(newer: Self, older: Self) -> Self;
    fn scaled(self, factor: f32) -> Self;
}

impl Sample for f32 {
    fn difference(newer: Self, older: Self) -> Self {
        newer - older
    }

    fn scaled(self, factor: f32) -> Self {
        self * factor
    }
}

impl Sample for Vec3 {
    fn difference(newer: Self, older: Self) -> Self {
        math::sub(newer, older)
    }

    fn scaled(self, factor: f32) -> Self {
        math::scale(self, factor)
    }
}

/// Rolling window of timestamped samples.
#[derive(Debug, Clone)]
pub struct DeltaBuffer<T: Sample> {
    samples: VecDeque<(T, f64)>,
    capacity: usize,
}

/// Scalar buffer (curl, pinch strength).
pub type DeltaFloatBuffer = DeltaBuffer<f32>;

/// Vector buffer (palm position).
pub type DeltaVecBuffer = DeltaBuffer<Vec3>;

impl<T: Sample> DeltaBuffer<T> {
    /// Create a buffer holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn add(&mut self, value: T, time: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((value, time));
    }

    /// Most recently added value.
    pub fn latest(&self) -> Result<T, BufferError> {
        self.samples
            .back()
            .map(|(value, _)| *value)
            .ok_or(BufferError::Empty)
    }

    /// Change per unit time between the oldest and newest samples.
    pub fn delta(&self) -> Result<T, BufferError> {
        if !self.is_full() {
            return Err(BufferError::NotFull {
                len: self.samples.len(),
                capacity: self.capacity,
            });
        }
        let (Some(&(newest, t_new)), Some(&(oldest, t_old))) =
            (self.samples.back(), self.samples.front())
        else {
            return Err(BufferError::Empty);
        };
        let span = (t_new - t_old) as f32;
        if span == 0.0 || !span.is_finite() {
            return Err(BufferError::ZeroTimeSpan);
        }
        Ok(T::difference(newest, oldest).scaled(1.0 / span))
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample; capacity is unchanged.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
