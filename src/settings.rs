//! Wheel settings and tuning
//!
//! Persisted in LocalStorage on the web. Every group is `#[serde(default)]`
//! so partial JSON overrides only the fields it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::WheelError;

/// How friction is applied each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrictionModel {
    /// `velocity *= friction` once per frame regardless of frame time.
    /// Decay rate therefore depends on the display refresh rate.
    #[default]
    PerFrame,
    /// `velocity *= friction^(dt * 60)`, matching `PerFrame` at 60 Hz
    TimeScaled,
}

/// Integrator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub friction: f64,
    pub friction_model: FrictionModel,
    pub min_start_velocity: f64,
    pub start_floor: f64,
    pub settle_threshold: f64,
    pub max_step_dt: f64,
    pub max_spin_secs: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            friction_model: FrictionModel::PerFrame,
            min_start_velocity: MIN_START_VELOCITY,
            start_floor: START_FLOOR,
            settle_threshold: SETTLE_THRESHOLD,
            max_step_dt: MAX_STEP_DT,
            max_spin_secs: MAX_SPIN_SECS,
        }
    }
}

/// Drag velocity estimation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureTuning {
    pub window_ms: f64,
    pub min_duration: f64,
    pub gain: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            window_ms: GESTURE_WINDOW_MS,
            min_duration: GESTURE_MIN_DURATION,
            gain: GESTURE_GAIN,
        }
    }
}

/// Audio preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
    /// Segment crossings below this speed make no sound
    pub min_audible_speed: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            min_audible_speed: MIN_AUDIBLE_SPEED,
        }
    }
}

/// Programmatic spin velocity range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulseRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ImpulseRange {
    fn default() -> Self {
        Self {
            min: IMPULSE_MIN,
            max: IMPULSE_MAX,
        }
    }
}

/// All wheel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    pub physics: PhysicsTuning,
    pub gesture: GestureTuning,
    pub audio: AudioSettings,
    pub impulse: ImpulseRange,
    /// Pause before surfacing the winner (ms)
    pub settle_delay_ms: f64,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            gesture: GestureTuning::default(),
            audio: AudioSettings::default(),
            impulse: ImpulseRange::default(),
            settle_delay_ms: SETTLE_DELAY_MS,
        }
    }
}

fn check(ok: bool, what: &str) -> Result<(), WheelError> {
    if ok {
        Ok(())
    } else {
        Err(WheelError::InvalidConfiguration(what.to_string()))
    }
}

impl WheelSettings {
    /// Reject tuning the engine can't honor
    pub fn validate(&self) -> Result<(), WheelError> {
        let p = &self.physics;
        check(
            p.friction > 0.0 && p.friction < 1.0,
            "friction must be in (0, 1)",
        )?;
        check(
            p.settle_threshold > 0.0,
            "settle_threshold must be positive",
        )?;
        check(
            p.min_start_velocity > 0.0 && p.min_start_velocity.is_finite(),
            "min_start_velocity must be positive",
        )?;
        check(
            p.start_floor > p.settle_threshold,
            "start_floor must exceed settle_threshold",
        )?;
        check(
            p.max_step_dt > 0.0 && p.max_step_dt.is_finite(),
            "max_step_dt must be positive",
        )?;
        check(p.max_spin_secs > 0.0, "max_spin_secs must be positive")?;

        let g = &self.gesture;
        check(g.window_ms > 0.0, "gesture window must be positive")?;
        check(g.min_duration > 0.0, "gesture min_duration must be positive")?;
        check(g.gain.is_finite(), "gesture gain must be finite")?;

        let i = &self.impulse;
        check(
            i.min >= p.min_start_velocity && i.min <= i.max && i.max.is_finite(),
            "impulse range must be ordered and at least min_start_velocity",
        )?;

        check(
            self.settle_delay_ms >= 0.0 && self.settle_delay_ms.is_finite(),
            "settle_delay_ms must be non-negative",
        )?;
        Ok(())
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, WheelError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, WheelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective tick volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.audio.muted {
            0.0
        } else {
            self.audio.master_volume.clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "lunch_wheel_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("No LocalStorage, using default settings");
            return Self::default();
        };

        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            },
            Ok(None) => {
                // First run: store the defaults so they can be tuned in place
                let defaults = Self::default();
                defaults.save(&storage);
                return defaults;
            }
            Err(e) => log::warn!("LocalStorage read failed: {:?}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    #[cfg(target_arch = "wasm32")]
    fn save(&self, storage: &web_sys::Storage) {
        match self.to_json() {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_ok() {
                    log::info!("Default settings saved");
                }
            }
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
