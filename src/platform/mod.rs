//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Wall-clock time, frame time and device detection

pub mod storage;

pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;

/// Wall-clock Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn unix_time_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Wall-clock Unix time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub mod web {
    //! Browser queries used once at startup or once per frame

    use crate::settings::PerformanceProfile;

    /// High-resolution timestamp in milliseconds
    pub fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Detect the device profile from the navigator and viewport
    pub fn detect_profile() -> PerformanceProfile {
        let Some(window) = web_sys::window() else {
            return PerformanceProfile::default();
        };
        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(1024.0) as f32;
        let profile = PerformanceProfile::detect(&user_agent, width);
        log::info!("Performance profile: {}", profile.as_str());
        profile
    }
}
