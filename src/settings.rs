//! Physics tuning and feedback content
//!
//! Defaults come from `crate::consts`; a page may override them with a JSON
//! blob embedded in `<script type="application/json" id="dodge-settings">`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from parsing or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Physics constants for the evasive body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fraction of velocity kept after a bounce
    pub restitution: f32,
    /// Per-frame velocity multiplier
    pub friction: f32,
    /// Speed below which the body stops and the frame loop sleeps
    pub rest_speed: f32,
    /// Speed of a fresh impulse
    pub launch_speed: f32,
    /// Margin kept around the accept control
    pub gap: f32,
    /// Signed pointer distance that starts a dodge
    pub dodge_threshold: f32,
    /// Evading ends beyond `dodge_threshold * release_factor`
    pub release_factor: f32,
    /// Speed fraction (of launch speed) under which a new dodge may fire
    pub restart_fraction: f32,
    /// Dodge direction jitter, degrees either way
    pub jitter_degrees: f32,
    /// Weight of the away-from-center push on a direct click
    pub center_bias: f32,
    /// Vertical gap below the accept control at spawn
    pub spawn_gap: f32,
    /// Spawn position when the accept control can't be measured
    pub fallback_position: (f32, f32),
    /// Feedback message lifetime (ms)
    pub feedback_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            restitution: RESTITUTION,
            friction: FRICTION,
            rest_speed: REST_SPEED,
            launch_speed: LAUNCH_SPEED,
            gap: OBSTACLE_GAP,
            dodge_threshold: DODGE_THRESHOLD,
            release_factor: RELEASE_FACTOR,
            restart_fraction: RESTART_FRACTION,
            jitter_degrees: JITTER_DEGREES,
            center_bias: CENTER_BIAS,
            spawn_gap: SPAWN_GAP,
            fallback_position: FALLBACK_POSITION,
            feedback_ms: FEEDBACK_MS,
        }
    }
}

impl Tuning {
    /// Speed under which the pointer may launch another dodge
    #[inline]
    pub fn restart_speed(&self) -> f32 {
        self.launch_speed * self.restart_fraction
    }

    /// Pointer distance at which evading ends
    #[inline]
    pub fn release_distance(&self) -> f32 {
        self.dodge_threshold * self.release_factor
    }

    /// Upper bound on frames for a body launched at `speed` to come to rest
    ///
    /// Bounces only ever remove speed, so friction alone gives the bound.
    pub fn max_frames_to_rest(&self, speed: f32) -> u32 {
        if speed < self.rest_speed {
            return 1;
        }
        let frames = (self.rest_speed / speed).ln() / self.friction.ln();
        frames.ceil() as u32 + 1
    }

    /// Check every field is finite and in a range the simulation can use
    pub fn validate(&self) -> Result<(), SettingsError> {
        let check = |ok: bool, field: &'static str, reason: &'static str| {
            if ok {
                Ok(())
            } else {
                Err(SettingsError::Invalid { field, reason })
            }
        };
        let (fx, fy) = self.fallback_position;

        check(
            self.restitution > 0.0 && self.restitution <= 1.0,
            "restitution",
            "must be in (0, 1]",
        )?;
        check(self.friction > 0.0 && self.friction < 1.0, "friction", "must be in (0, 1)")?;
        check(
            self.rest_speed > 0.0 && self.rest_speed.is_finite(),
            "rest_speed",
            "must be positive and finite",
        )?;
        check(
            self.launch_speed > 0.0 && self.launch_speed.is_finite(),
            "launch_speed",
            "must be positive and finite",
        )?;
        check(
            self.gap >= 0.0 && self.gap.is_finite(),
            "gap",
            "must be finite and not negative",
        )?;
        check(
            self.dodge_threshold > 0.0 && self.dodge_threshold.is_finite(),
            "dodge_threshold",
            "must be positive and finite",
        )?;
        check(
            self.release_factor >= 1.0 && self.release_factor.is_finite(),
            "release_factor",
            "must be finite and at least 1",
        )?;
        check(
            (0.0..=1.0).contains(&self.restart_fraction),
            "restart_fraction",
            "must be in [0, 1]",
        )?;
        check(
            (0.0..=180.0).contains(&self.jitter_degrees),
            "jitter_degrees",
            "must be in [0, 180]",
        )?;
        check(
            self.center_bias >= 0.0 && self.center_bias.is_finite(),
            "center_bias",
            "must be finite and not negative",
        )?;
        check(self.spawn_gap.is_finite(), "spawn_gap", "must be finite")?;
        check(
            fx.is_finite() && fy.is_finite(),
            "fallback_position",
            "must be finite",
        )?;
        check(
            self.feedback_ms >= 0.0 && self.feedback_ms.is_finite(),
            "feedback_ms",
            "must be finite and not negative",
        )
    }
}

/// Tuning plus the rotating messages shown when the decline control is clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    pub messages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            messages: [
                "What did you say? SAY IT TO MY FACE!!!!!",
                "What did you say? SAY IT TO MY FACE!!!!!",
                "Are you sure? Think again!",
                "What did you say? SAY IT TO MY FACE!!!!!",
                "That button doesn't work here!",
                "What did you say? SAY IT TO MY FACE!!!!!",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Settings {
    /// Element id of the embedded JSON override
    #[cfg(target_arch = "wasm32")]
    const ELEMENT_ID: &'static str = "dodge-settings";

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    /// Message for the `click`-th click (0-indexed), wrapping around
    pub fn message_for(&self, click: u32) -> Option<(usize, &str)> {
        if self.messages.is_empty() {
            return None;
        }
        let index = click as usize % self.messages.len();
        Some((index, self.messages[index].as_str()))
    }

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = text {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded dodge settings from page");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring dodge settings: {}", e),
            }
        }

        log::info!("Using default dodge settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
