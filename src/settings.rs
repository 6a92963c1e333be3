//! Renderer settings and preferences
//!
//! Persisted in LocalStorage, separately from anything the host stores.

use serde::{Deserialize, Serialize};

use crate::consts::PARTICLE_COUNT;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Swarm particles uploaded to the shader (the pool itself is fixed)
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => PARTICLE_COUNT / 3,
            QualityPreset::Medium => PARTICLE_COUNT * 2 / 3,
            QualityPreset::High => PARTICLE_COUNT,
        }
    }
}

/// Renderer settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Animation ===
    /// Position tweens and fade overlays. Off means every entity renders at
    /// its board position immediately.
    pub animations: bool,
    /// Orbiting particle swarm around the player
    pub particles: bool,
    /// Velocity smear on moving blocks and the player trail
    pub motion_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no completion shake, no motion blur)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            animations: true,
            particles: true,
            motion_blur: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective motion blur (respects reduced_motion)
    pub fn effective_motion_blur(&self) -> bool {
        self.motion_blur && !self.reduced_motion
    }

    /// Effective completion shake (respects reduced_motion)
    pub fn effective_complete_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// `u_particleCount` for the current preferences
    pub fn particle_count(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.particle_count()
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "glow_grid_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_particle_counts() {
        assert_eq!(QualityPreset::Low.particle_count(), 20);
        assert_eq!(QualityPreset::Medium.particle_count(), 40);
        assert_eq!(QualityPreset::High.particle_count(), 60);
    }

    #[test]
    fn test_particles_off_uploads_none() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.particle_count(), 0);
    }

    #[test]
    fn test_reduced_motion_disables_blur_and_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_motion_blur());
        assert!(settings.effective_complete_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_motion_blur());
        assert!(!settings.effective_complete_shake());
        assert!(settings.animations);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"Low"}"#).unwrap();
        assert_eq!(settings, Settings::from_preset(QualityPreset::Low));
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
        // Logged names parse back
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert_eq!(QualityPreset::parse(preset.as_str()), Some(preset));
        }
    }
}
