use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::game::Timing;
use crate::media::Presentation;

const DEFAULT_SUSPENSE_MS: u64 = 3000;
const DEFAULT_REVEAL_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause between picking a case and revealing the others
    #[serde(default = "default_suspense_ms")]
    pub suspense_ms: u64,

    /// Pause between revealing the others and opening the picked case
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: u64,

    /// Pause before the result dialog; style default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_ms: Option<u64>,
}

fn default_suspense_ms() -> u64 {
    DEFAULT_SUSPENSE_MS
}

fn default_reveal_ms() -> u64 {
    DEFAULT_REVEAL_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            suspense_ms: DEFAULT_SUSPENSE_MS,
            reveal_ms: DEFAULT_REVEAL_MS,
            dialog_ms: None,
        }
    }
}

impl TimingConfig {
    pub fn timing(&self, style: Presentation) -> Timing {
        Timing {
            suspense: Duration::from_millis(self.suspense_ms),
            reveal: Duration::from_millis(self.reveal_ms),
            dialog: Duration::from_millis(
                self.dialog_ms.unwrap_or_else(|| style.default_dialog_delay_ms()),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Audio player command; the clip path is appended
    #[serde(default = "default_player")]
    pub player: Vec<String>,

    /// Command used to open image/video assets; the URL is appended
    #[serde(default = "default_opener")]
    pub opener: Vec<String>,

    /// Open the result asset externally when the dialog shows
    #[serde(default)]
    pub open_assets: bool,

    #[serde(default = "default_win_image")]
    pub win_image: String,
    #[serde(default = "default_miss_image")]
    pub miss_image: String,
    #[serde(default = "default_miss_video")]
    pub miss_video: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspense_clip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory_clip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_clip: Option<String>,
}

fn default_player() -> Vec<String> {
    vec!["mpv".into(), "--no-video".into(), "--really-quiet".into()]
}

fn default_opener() -> Vec<String> {
    vec!["xdg-open".into()]
}

fn default_win_image() -> String {
    "https://media.giphy.com/media/3o7aD2saalBwwftBIY/giphy.gif".to_string()
}

fn default_miss_image() -> String {
    "https://media.giphy.com/media/oHg5SJYRHA0Io/giphy.gif".to_string()
}

fn default_miss_video() -> String {
    "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            opener: default_opener(),
            open_assets: false,
            win_image: default_win_image(),
            miss_image: default_miss_image(),
            miss_video: default_miss_video(),
            suspense_clip: None,
            victory_clip: None,
            miss_clip: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which revision of the game to present
    #[serde(default)]
    pub style: Presentation,

    /// Desktop notification when the result is shown
    #[serde(default)]
    pub notifications: bool,

    /// Terminal bell for result cues that have no clip
    #[serde(default = "default_true")]
    pub bell: bool,

    /// kitty.conf style color file for the UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_file: Option<PathBuf>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            style: Presentation::default(),
            notifications: false,
            bell: true,
            theme_file: None,
            timing: TimingConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("casepick");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep a broken file around for the user to fix
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn timing(&self, style: Presentation) -> Timing {
        self.timing.timing(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.style = Presentation::Video;
        config.notifications = true;
        config.timing.dialog_ms = Some(250);
        config.media.victory_clip = Some("/usr/share/sounds/victory.ogg".to_string());

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(deserialized.style, Presentation::Video);
        assert!(deserialized.notifications);
        assert_eq!(deserialized.timing.dialog_ms, Some(250));
        assert_eq!(deserialized.media.victory_clip, config.media.victory_clip);
        assert_eq!(deserialized.media.player, config.media.player);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.style, Presentation::Audio);
        assert!(config.bell);
        assert_eq!(config.timing.suspense_ms, 3000);
        assert_eq!(config.timing.reveal_ms, 2000);
        assert_eq!(config.media.opener, vec!["xdg-open".to_string()]);
    }

    #[test]
    fn test_partial_timing_section() {
        let config = AppConfig::parse("style = \"gif\"\n[timing]\nreveal_ms = 500\n").unwrap();
        let timing = config.timing(config.style);
        assert_eq!(timing.suspense, Duration::from_millis(3000));
        assert_eq!(timing.reveal, Duration::from_millis(500));
        assert_eq!(timing.dialog, Duration::ZERO);
    }

    #[test]
    fn test_dialog_delay_follows_style() {
        let config = AppConfig::default();
        assert_eq!(config.timing(Presentation::Video).dialog, Duration::from_millis(1000));
        assert_eq!(config.timing(Presentation::Audio).dialog, Duration::ZERO);
    }

    #[test]
    fn test_unknown_style_rejected() {
        assert!(AppConfig::parse("style = \"hologram\"").is_err());
    }
}
