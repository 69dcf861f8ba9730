//! Game settings and preferences
//!
//! Persisted separately from high scores through the platform key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SPEED_MULTIPLIER, PIPE_GAP_DESKTOP, PIPE_GAP_MOBILE};
use crate::platform::KeyValueStore;

/// Performance profile, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformanceProfile {
    #[default]
    Desktop,
    Mobile,
}

impl PerformanceProfile {
    /// Viewport width at or below which a device counts as mobile
    pub const MOBILE_MAX_WIDTH: f32 = 768.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceProfile::Desktop => "Desktop",
            PerformanceProfile::Mobile => "Mobile",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(PerformanceProfile::Desktop),
            "mobile" => Some(PerformanceProfile::Mobile),
            _ => None,
        }
    }

    /// Classify a device from its user agent and viewport width
    pub fn detect(user_agent: &str, viewport_width: f32) -> Self {
        const MOBILE_AGENTS: [&str; 9] = [
            "android",
            "webos",
            "iphone",
            "ipad",
            "ipod",
            "blackberry",
            "iemobile",
            "opera mini",
            "mobile",
        ];
        let ua = user_agent.to_lowercase();
        if viewport_width <= Self::MOBILE_MAX_WIDTH || MOBILE_AGENTS.iter().any(|m| ua.contains(m))
        {
            PerformanceProfile::Mobile
        } else {
            PerformanceProfile::Desktop
        }
    }

    /// Vertical gap between pipe and tower (reference px); tighter on mobile
    pub fn pipe_gap(&self) -> f32 {
        match self {
            PerformanceProfile::Desktop => PIPE_GAP_DESKTOP,
            PerformanceProfile::Mobile => PIPE_GAP_MOBILE,
        }
    }

    /// Whether jump smoke particles are spawned
    pub fn smoke_enabled(&self) -> bool {
        match self {
            PerformanceProfile::Desktop => true,
            PerformanceProfile::Mobile => false,
        }
    }

    /// Decoration spawn interval window in milliseconds
    pub fn decor_interval_ms(&self) -> (f64, f64) {
        match self {
            PerformanceProfile::Desktop => (500.0, 1200.0),
            PerformanceProfile::Mobile => (1000.0, 2400.0),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Forced profile; `None` means detect at startup
    pub profile_override: Option<PerformanceProfile>,

    // === Visual Effects ===
    /// Ground decorations
    pub decorations: bool,
    /// Draw collision boxes (debug)
    pub show_hitbox: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Simulation ===
    /// Largest speed multiplier one frame may apply before being clamped
    pub max_speed_multiplier: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile_override: None,

            decorations: true,
            show_hitbox: false,

            master_volume: 0.3,
            sfx_volume: 1.0,
            muted: false,

            max_speed_multiplier: MAX_SPEED_MULTIPLIER,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "santa_flappy_settings";

    /// Profile to use given what the platform detected
    pub fn resolve_profile(&self, detected: PerformanceProfile) -> PerformanceProfile {
        self.profile_override.unwrap_or(detected)
    }

    /// Effective sound volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Toggle the hitbox overlay
    pub fn toggle_hitbox(&mut self) {
        self.show_hitbox = !self.show_hitbox;
    }

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unavailable: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and swallowed
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(Self::STORAGE_KEY, &json) {
                    log::warn!("Failed to save settings: {}", e);
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
