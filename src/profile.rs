// ==========================================
// User profiles: thresholds, shortcuts, theme
// ==========================================
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::debounce::DebounceClass;
use crate::events::Command;

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Landmark-9 distance below which two hands count as a clap.
    pub clap_threshold: f32,
    /// Minimum detection confidence handed to the landmark source.
    pub gesture_sensitivity: f32,
    /// Finger count (0..=5) -> command.
    pub shortcuts: BTreeMap<u8, Command>,
    pub theme: Theme,
    /// Per-class cooldown overrides in seconds.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cooldowns: BTreeMap<DebounceClass, f64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            clap_threshold: 0.3,
            gesture_sensitivity: 0.7,
            shortcuts: BTreeMap::new(),
            theme: Theme::Light,
            cooldowns: BTreeMap::new(),
        }
    }
}

impl Profile {
    pub fn shortcut(&self, finger_count: u8) -> Option<&Command> {
        self.shortcuts.get(&finger_count)
    }
}

/// All known profiles by name.
pub type ProfileBook = BTreeMap<String, Profile>;

pub fn default_book() -> ProfileBook {
    let mut book = ProfileBook::new();
    book.insert(DEFAULT_PROFILE.to_string(), Profile::default());
    book
}

/// Durable storage for the profile book.
pub trait ProfileStore {
    fn load(&self) -> Result<ProfileBook>;
    fn save(&self, book: &ProfileBook) -> Result<()>;
}

pub struct YamlProfileStore {
    path: PathBuf,
}

impl YamlProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for YamlProfileStore {
    fn load(&self) -> Result<ProfileBook> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no profile store yet, using default profile");
                return Ok(default_book());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("cannot open profiles {}", self.path.display()))
            }
        };
        let mut book: ProfileBook = serde_yaml::from_reader(file)
            .with_context(|| format!("malformed profiles {}", self.path.display()))?;
        if book.is_empty() {
            book = default_book();
        }
        Ok(book)
    }

    fn save(&self, book: &ProfileBook) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        let content = serde_yaml::to_string(book).context("cannot serialize profiles")?;
        fs::write(&self.path, content)
            .with_context(|| format!("cannot write profiles {}", self.path.display()))?;
        Ok(())
    }
}
