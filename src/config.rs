/// Voice coordination configuration
///
/// Loaded from the environment by the host bootstrap; persistence of these
/// values lives outside this crate. Out-of-range values are clamped at the
/// setter boundary, never rejected.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Maximum distance (blocks) at which any audibility is possible
    voice_radius: u32,
    /// Exponential decay constant for the distance-to-volume curve
    attenuation: f64,
    /// Base URL of the voice backend (positions are POSTed to `{url}/positions`)
    pub backend_base_url: String,
    /// Whether clients should render positional (3D) audio
    pub enable_3d_audio: bool,
}

/// Clamp range for the voice radius, in blocks
pub const VOICE_RADIUS_RANGE: (u32, u32) = (4, 128);

/// Clamp range for the attenuation factor
pub const ATTENUATION_RANGE: (f64, f64) = (0.001, 0.1);

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_radius: 32,
            attenuation: 0.02,
            backend_base_url: "http://localhost:25566".to_string(),
            enable_3d_audio: true,
        }
    }
}

impl VoiceConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(radius) = std::env::var("VOICE_RADIUS") {
            if let Ok(parsed) = radius.parse::<u32>() {
                config.set_voice_radius(parsed);
            } else {
                tracing::warn!("Invalid VOICE_RADIUS '{}', using default", radius);
            }
        }

        if let Ok(attenuation) = std::env::var("VOICE_ATTENUATION") {
            if let Ok(parsed) = attenuation.parse::<f64>() {
                config.set_attenuation(parsed);
            } else {
                tracing::warn!("Invalid VOICE_ATTENUATION '{}', using default", attenuation);
            }
        }

        if let Ok(url) = std::env::var("BACKEND_URL") {
            config.backend_base_url = url;
        }

        if let Ok(enabled) = std::env::var("ENABLE_3D_AUDIO") {
            if let Ok(parsed) = enabled.parse::<bool>() {
                config.enable_3d_audio = parsed;
            } else {
                tracing::warn!("Invalid ENABLE_3D_AUDIO '{}', using default", enabled);
            }
        }

        config
    }

    pub fn voice_radius(&self) -> u32 {
        self.voice_radius
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    /// Set the voice radius, clamped to [4, 128] blocks
    pub fn set_voice_radius(&mut self, radius: u32) {
        self.voice_radius = radius.clamp(VOICE_RADIUS_RANGE.0, VOICE_RADIUS_RANGE.1);
    }

    /// Set the attenuation factor, clamped to [0.001, 0.1]
    pub fn set_attenuation(&mut self, attenuation: f64) {
        self.attenuation = attenuation.clamp(ATTENUATION_RANGE.0, ATTENUATION_RANGE.1);
    }

    /// Backend URL with any trailing slash removed
    pub fn backend_base_url_trimmed(&self) -> &str {
        self.backend_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VoiceConfig::default();
        assert_eq!(config.voice_radius(), 32);
        assert_eq!(config.attenuation(), 0.02);
        assert_eq!(config.backend_base_url, "http://localhost:25566");
        assert!(config.enable_3d_audio);
    }

    #[test]
    fn test_radius_clamped() {
        let mut config = VoiceConfig::default();
        config.set_voice_radius(1);
        assert_eq!(config.voice_radius(), 4);
        config.set_voice_radius(10_000);
        assert_eq!(config.voice_radius(), 128);
        config.set_voice_radius(64);
        assert_eq!(config.voice_radius(), 64);
    }

    #[test]
    fn test_attenuation_clamped() {
        let mut config = VoiceConfig::default();
        config.set_attenuation(0.0);
        assert_eq!(config.attenuation(), 0.001);
        config.set_attenuation(5.0);
        assert_eq!(config.attenuation(), 0.1);
        config.set_attenuation(0.05);
        assert_eq!(config.attenuation(), 0.05);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut config = VoiceConfig::default();
        config.backend_base_url = "http://voice.example.com/".to_string();
        assert_eq!(config.backend_base_url_trimmed(), "http://voice.example.com");
        config.backend_base_url = "http://voice.example.com".to_string();
        assert_eq!(config.backend_base_url_trimmed(), "http://voice.example.com");
    }
}
