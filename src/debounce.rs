//! Rate-limiting debounce for discrete gestures.
//!
//! A candidate is accepted iff `now - last_accepted >= cooldown` for its key.
//! Rejected candidates are dropped, never queued.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Cooldown classes; every key of a class shares one cooldown length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceClass {
    Clap,
    Shortcut,
    VirtualKey,
    Click,
}

/// What a last-accepted timestamp is tracked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceKey {
    Clap,
    /// One window per distinct finger count.
    Shortcut(u8),
    /// One window per virtual-keyboard character.
    VirtualKey(char),
    Click,
}

impl DebounceKey {
    pub fn class(&self) -> DebounceClass {
        match self {
            Self::Clap => DebounceClass::Clap,
            Self::Shortcut(_) => DebounceClass::Shortcut,
            Self::VirtualKey(_) => DebounceClass::VirtualKey,
            Self::Click => DebounceClass::Click,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    default_cooldown: Duration,
    cooldowns: HashMap<DebounceClass, Duration>,
    last_accepted: HashMap<DebounceKey, Instant>,
}

impl Debouncer {
    pub fn new(default_cooldown: Duration) -> Self {
        Self {
            default_cooldown,
            cooldowns: HashMap::new(),
            last_accepted: HashMap::new(),
        }
    }

    pub fn cooldown(&self, class: DebounceClass) -> Duration {
        self.cooldowns
            .get(&class)
            .copied()
            .unwrap_or(self.default_cooldown)
    }

    pub fn set_cooldown(&mut self, class: DebounceClass, cooldown: Duration) {
        self.cooldowns.insert(class, cooldown);
    }

    /// Replace all per-class overrides (seconds). Last-accepted history is kept.
    /// Negative, non-finite or oversized values leave that class on the default.
    pub fn reseed(&mut self, overrides: &BTreeMap<DebounceClass, f64>) {
        self.cooldowns = overrides
            .iter()
            .filter_map(|(class, secs)| match Duration::try_from_secs_f64(*secs) {
                Ok(cooldown) => Some((*class, cooldown)),
                Err(_) => {
                    warn!(?class, secs, "cooldown out of range, using default");
                    None
                }
            })
            .collect();
    }

    /// Returns true and records `now` if the key is outside its cooldown.
    pub fn accept(&mut self, key: DebounceKey, now: Instant) -> bool {
        let cooldown = self.cooldown(key.class());
        if let Some(last) = self.last_accepted.get(&key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < cooldown {
                debug!(?key, ?elapsed, "debounced");
                return false;
            }
        }
        self.last_accepted.insert(key, now);
        true
    }

    pub fn reset(&mut self) {
        self.last_accepted.clear();
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
