//! Pinch recognizer tuning and its s-expression form.
//!
//! A configuration file is a keyword plist, e.g.
//! `(:use-velocities t :pinch-deactivate-distance 0.04)`.  Keys left out
//! keep their defaults; unknown keys are logged and skipped.  Values are not
//! range-checked.

use lexpr::Value;
use thiserror::Error;
use tracing::warn;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed s-expression: {0}")]
    Parse(#[from] lexpr::parse::Error),

    #[error("configuration must be a keyword plist")]
    NotAPlist,

    #[error("expected a keyword, found {found}")]
    ExpectedKeyword { found: String },

    #[error("missing value for :{key}")]
    MissingValue { key: String },

    #[error("invalid value for :{key}: expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },
}

/// Thresholds and toggles for the pinch heuristic.  Distances in meters,
/// angles in degrees, debounce windows in frames.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchConfig {
    // Activation
    /// Subtracted from the raw segment distance before mapping to strength.
    pub activation_pinch_distance: f32,
    /// Gate activation on strength velocity (and curl velocities with pinky safety).
    pub use_velocities: bool,
    /// Strength above which an eligible hand activates.
    pub activation_strength: f32,
    /// Strength above which a non-activating pinch must reopen first.
    pub repinch_strength: f32,

    // Pinky safety
    pub require_pinky_safety: bool,
    pub min_pinky_safety_product: f32,
    /// Higher = pinky may be curled further and still begin a pinch.
    pub max_pinky_curl: f32,
    /// Higher = index must curl faster than the pinky to pinch.
    pub min_index_minus_pinky_curl_vel: f32,
    pub min_index_curl_vel: f32,

    // Middle and ring safety
    pub require_middle_finger_angle: bool,
    pub min_palm_middle_angle: f32,
    pub require_ring_finger_angle: bool,
    pub min_palm_ring_angle: f32,
    /// Applied to the middle/ring thresholds once eligible.
    pub ring_middle_safety_hysteresis_mult: f32,

    // Palm facing
    pub require_palm_vs_viewer_angle: bool,
    pub max_palm_vs_viewer_angle: f32,

    // Index and thumb openness (eligibility only)
    pub max_index_angle_for_eligibility_activation: f32,
    pub max_index_angle_for_eligibility_deactivation: f32,
    pub max_thumb_angle_for_eligibility_activation: f32,
    pub max_thumb_angle_for_eligibility_deactivation: f32,

    // Deactivation
    pub pinch_deactivate_distance: f32,

    // Debounce and viewing conditions
    pub min_reactivate_frames: u32,
    pub min_frames_since_degenerate: u32,
    pub min_deactivate_frames: u32,
    /// Looking down the wrist closer than this counts as degenerate.
    pub degenerate_view_angle: f32,
    /// The hand must lie within `fov / fov_divisor` of the view axis.
    pub fov_divisor: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            activation_pinch_distance: 0.01,
            use_velocities: false,
            activation_strength: 0.8,
            repinch_strength: 0.88,
            require_pinky_safety: false,
            min_pinky_safety_product: 0.5,
            max_pinky_curl: 0.2,
            min_index_minus_pinky_curl_vel: 1.5,
            min_index_curl_vel: 0.5,
            require_middle_finger_angle: true,
            min_palm_middle_angle: 65.0,
            require_ring_finger_angle: true,
            min_palm_ring_angle: 65.0,
            ring_middle_safety_hysteresis_mult: 0.8,
            require_palm_vs_viewer_angle: false,
            max_palm_vs_viewer_angle: 181.0,
            max_index_angle_for_eligibility_activation: 98.0,
            max_index_angle_for_eligibility_deactivation: 110.0,
            max_thumb_angle_for_eligibility_activation: 85.0,
            max_thumb_angle_for_eligibility_deactivation: 100.0,
            pinch_deactivate_distance: 0.035,
            min_reactivate_frames: 5,
            min_frames_since_degenerate: 6,
            min_deactivate_frames: 5,
            degenerate_view_angle: 25.0,
            fov_divisor: 2.2,
        }
    }
}

impl PinchConfig {
    /// Parse a keyword plist on top of the defaults.
    pub fn from_sexp(raw: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(raw)?;
        let mut config = Self::default();
        for (key, val) in plist_entries(&value)? {
            config.apply(&key, val)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &Value) -> Result<(), ConfigError> {
        match key {
            "activation-pinch-distance" => self.activation_pinch_distance = float(key, value)?,
            "use-velocities" => self.use_velocities = boolean(key, value)?,
            "activation-strength" => self.activation_strength = float(key, value)?,
            "repinch-strength" => self.repinch_strength = float(key, value)?,
            "require-pinky-safety" => self.require_pinky_safety = boolean(key, value)?,
            "min-pinky-safety-product" => self.min_pinky_safety_product = float(key, value)?,
            "max-pinky-curl" => self.max_pinky_curl = float(key, value)?,
            "min-index-minus-pinky-curl-vel" => {
                self.min_index_minus_pinky_curl_vel = float(key, value)?
            }
            "min-index-curl-vel" => self.min_index_curl_vel = float(key, value)?,
            "require-middle-finger-angle" => self.require_middle_finger_angle = boolean(key, value)?,
            "min-palm-middle-angle" => self.min_palm_middle_angle = float(key, value)?,
            "require-ring-finger-angle" => self.require_ring_finger_angle = boolean(key, value)?,
            "min-palm-ring-angle" => self.min_palm_ring_angle = float(key, value)?,
            "ring-middle-safety-hysteresis-mult" => {
                self.ring_middle_safety_hysteresis_mult = float(key, value)?
            }
            "require-palm-vs-viewer-angle" => {
                self.require_palm_vs_viewer_angle = boolean(key, value)?
            }
            "max-palm-vs-viewer-angle" => self.max_palm_vs_viewer_angle = float(key, value)?,
            "max-index-angle-for-eligibility-activation" => {
                self.max_index_angle_for_eligibility_activation = float(key, value)?
            }
            "max-index-angle-for-eligibility-deactivation" => {
                self.max_index_angle_for_eligibility_deactivation = float(key, value)?
            }
            "max-thumb-angle-for-eligibility-activation" => {
                self.max_thumb_angle_for_eligibility_activation = float(key, value)?
            }
            "max-thumb-angle-for-eligibility-deactivation" => {
                self.max_thumb_angle_for_eligibility_deactivation = float(key, value)?
            }
            "pinch-deactivate-distance" => self.pinch_deactivate_distance = float(key, value)?,
            "min-reactivate-frames" => self.min_reactivate_frames = frames(key, value)?,
            "min-frames-since-degenerate" => self.min_frames_since_degenerate = frames(key, value)?,
            "min-deactivate-frames" => self.min_deactivate_frames = frames(key, value)?,
            "degenerate-view-angle" => self.degenerate_view_angle = float(key, value)?,
            "fov-divisor" => self.fov_divisor = float(key, value)?,
            other => warn!("pinch config: ignoring unknown key :{}", other),
        }
        Ok(())
    }

    /// Render the configuration as a keyword plist.  Floats use their
    /// shortest exact form, so the output parses back to an equal config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:activation-pinch-distance {} :use-velocities {} :activation-strength {} :repinch-strength {} \
             :require-pinky-safety {} :min-pinky-safety-product {} :max-pinky-curl {} \
             :min-index-minus-pinky-curl-vel {} :min-index-curl-vel {} \
             :require-middle-finger-angle {} :min-palm-middle-angle {} \
             :require-ring-finger-angle {} :min-palm-ring-angle {} \
             :ring-middle-safety-hysteresis-mult {} \
             :require-palm-vs-viewer-angle {} :max-palm-vs-viewer-angle {} \
             :max-index-angle-for-eligibility-activation {} :max-index-angle-for-eligibility-deactivation {} \
             :max-thumb-angle-for-eligibility-activation {} :max-thumb-angle-for-eligibility-deactivation {} \
             :pinch-deactivate-distance {} :min-reactivate-frames {} :min-frames-since-degenerate {} \
             :min-deactivate-frames {} :degenerate-view-angle {} :fov-divisor {})",
            self.activation_pinch_distance,
            sexp_bool(self.use_velocities),
            self.activation_strength,
            self.repinch_strength,
            sexp_bool(self.require_pinky_safety),
            self.min_pinky_safety_product,
            self.max_pinky_curl,
            self.min_index_minus_pinky_curl_vel,
            self.min_index_curl_vel,
            sexp_bool(self.require_middle_finger_angle),
            self.min_palm_middle_angle,
            sexp_bool(self.require_ring_finger_angle),
            self.min_palm_ring_angle,
            self.ring_middle_safety_hysteresis_mult,
            sexp_bool(self.require_palm_vs_viewer_angle),
            self.max_palm_vs_viewer_angle,
            self.max_index_angle_for_eligibility_activation,
            self.max_index_angle_for_eligibility_deactivation,
            self.max_thumb_angle_for_eligibility_activation,
            self.max_thumb_angle_for_eligibility_deactivation,
            self.pinch_deactivate_distance,
            self.min_reactivate_frames,
            self.min_frames_since_degenerate,
            self.min_deactivate_frames,
            self.degenerate_view_angle,
            self.fov_divisor,
        )
    }
}

pub(crate) fn sexp_bool(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

/// Split a plist into `(key, value)` pairs, keys without the leading colon.
fn plist_entries(value: &Value) -> Result<Vec<(String, &Value)>, ConfigError> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => break,
            _ => return Err(ConfigError::NotAPlist),
        }
    }

    let mut entries = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let Some(key_value) = iter.next() {
        let key = match key_value {
            Value::Keyword(k) => k.to_string(),
            Value::Symbol(s) if s.starts_with(':') => s[1..].to_string(),
            other => {
                return Err(ConfigError::ExpectedKeyword {
                    found: other.to_string(),
                })
            }
        };
        let val = iter
            .next()
            .ok_or_else(|| ConfigError::MissingValue { key: key.clone() })?;
        entries.push((key, val));
    }
    Ok(entries)
}

fn float(key: &str, value: &Value) -> Result<f32, ConfigError> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32).ok_or_else(|| invalid(key, "a number", value)),
        _ => Err(invalid(key, "a number", value)),
    }
}

fn frames(key: &str, value: &Value) -> Result<u32, ConfigError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(key, "a frame count", value)),
        _ => Err(invalid(key, "a frame count", value)),
    }
}

/// Accepts `t`/`nil`, `#t`/`#f` and the empty list.
fn boolean(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Nil | Value::Null => Ok(false),
        Value::Symbol(s) if s.as_ref() == "t" => Ok(true),
        Value::Symbol(s) if s.as_ref() == "nil" => Ok(false),
        _ => Err(invalid(key, "t or nil", value)),
    }
}

fn invalid(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        expected,
        found: found.to_string(),
    }
}
