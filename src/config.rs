// ==========================================
// Runtime configuration (config.yaml)
// ==========================================
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::modes::SessionSettings;
use crate::profile::DEFAULT_PROFILE;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub source: SourceConfig,
    pub profiles: ProfilesConfig,
    pub gestures: GestureConfig,
    pub mouse: MouseConfig,
    pub screenshots: ScreenshotConfig,
    pub hotkeys: HotkeysConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open config file {}", path.display()))?;
        let config: Config = serde_yaml::from_reader(file).context("config format error")?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub auto_screen_size: bool,
    pub manual_width: u32,
    pub manual_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            auto_screen_size: true,
            manual_width: 1920,
            manual_height: 1080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub fps: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Landmark recording to replay.
    pub replay: Option<PathBuf>,
    pub loop_replay: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProfilesConfig {
    pub path: PathBuf,
    pub active: String,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("profiles.yaml"),
            active: DEFAULT_PROFILE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GestureConfig {
    pub cooldown_secs: f64,
    pub exercise_threshold: f32,
    pub exercise_hysteresis: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 1.0,
            exercise_threshold: 0.3,
            exercise_hysteresis: 0.02,
        }
    }
}

impl GestureConfig {
    pub fn session_settings(&self) -> SessionSettings {
        let cooldown = Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or_else(|_| {
            warn!(
                ">> [Config] gestures.cooldown_secs {} out of range, using default",
                self.cooldown_secs
            );
            crate::debounce::DEFAULT_COOLDOWN
        });
        SessionSettings {
            default_cooldown: cooldown,
            exercise_threshold: self.exercise_threshold,
            exercise_hysteresis: self.exercise_hysteresis,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MouseConfig {
    /// EMA factor toward the target position, 1.0 = no smoothing.
    pub smoothing: f32,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self { smoothing: 1.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub dir: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("screenshots"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeysConfig {
    pub toggle_keyboard: Vec<String>,
    pub toggle_mouse: Vec<String>,
    pub toggle_exercise: Vec<String>,
    pub next_profile: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        let combo = |key: &str| vec!["CTRL".to_string(), "ALT".to_string(), key.to_string()];
        Self {
            toggle_keyboard: combo("K"),
            toggle_mouse: combo("M"),
            toggle_exercise: combo("E"),
            next_profile: combo("P"),
            quit: combo("Q"),
        }
    }
}
