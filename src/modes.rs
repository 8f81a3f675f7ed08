//! Interaction modes and the mode/profile state machine.
//!
//! Modes are independent capability flags; any subset may be active and an
//! empty set is the plain "Normal" behaviour. The [`Session`] owns every
//! piece of mutable interpretation state so a frame is interpreted as
//! `(hands, modes, profile, debounce) -> (events, debounce')`.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::debounce::{DebounceKey, Debouncer};
use crate::error::GestureError;
use crate::events::{Gesture, GestureEvent};
use crate::landmarks::Hand;
use crate::profile::{Profile, ProfileBook, Theme};
use crate::single_hand::{ExerciseTracker, SingleHandResolver, EXERCISE_THRESHOLD};
use crate::two_hand::{self, DisplayBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    VirtualKeyboard,
    MouseControl,
    Exercise,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::VirtualKeyboard, Mode::MouseControl, Mode::Exercise];

    pub fn label(&self) -> &'static str {
        match self {
            Self::VirtualKeyboard => "Virtual Keyboard",
            Self::MouseControl => "Mouse Control",
            Self::Exercise => "Exercise",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn with(mut self, mode: Mode) -> Self {
        self.0 |= mode.bit();
        self
    }

    pub fn toggle(&mut self, mode: Mode) -> bool {
        self.0 ^= mode.bit();
        self.contains(mode)
    }

    pub fn is_normal(&self) -> bool {
        self.0 == 0
    }

    pub fn active(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Status line text, e.g. "Normal" or "Mouse Control + Exercise".
    pub fn label(&self) -> String {
        if self.is_normal() {
            return "Normal".to_string();
        }
        self.active().map(|m| m.label()).collect::<Vec<_>>().join(" + ")
    }
}

/// Tunables that are not part of a profile.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub default_cooldown: Duration,
    pub exercise_threshold: f32,
    pub exercise_hysteresis: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_cooldown: crate::debounce::DEFAULT_COOLDOWN,
            exercise_threshold: EXERCISE_THRESHOLD,
            exercise_hysteresis: 0.0,
        }
    }
}

/// What the outside world must apply after a profile switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileChange {
    pub sensitivity: f32,
    pub theme: Theme,
}

pub struct Session {
    modes: ModeSet,
    profiles: ProfileBook,
    active: String,
    debouncer: Debouncer,
    single_hand: SingleHandResolver,
}

impl Session {
    pub fn new(
        profiles: ProfileBook,
        active: &str,
        settings: SessionSettings,
    ) -> Result<Self, GestureError> {
        let profile = profiles
            .get(active)
            .ok_or_else(|| GestureError::UnknownProfile(active.to_string()))?;
        let mut debouncer = Debouncer::new(settings.default_cooldown);
        debouncer.reseed(&profile.cooldowns);
        Ok(Self {
            modes: ModeSet::empty(),
            active: active.to_string(),
            debouncer,
            single_hand: SingleHandResolver::new(ExerciseTracker::new(
                settings.exercise_threshold,
                settings.exercise_hysteresis,
            )),
            profiles,
        })
    }

    pub fn modes(&self) -> ModeSet {
        self.modes
    }

    /// Flip one mode flag; returns whether it is now active.
    pub fn toggle(&mut self, mode: Mode) -> bool {
        let on = self.modes.toggle(mode);
        if mode == Mode::Exercise && !on {
            self.single_hand.reset_exercise();
        }
        info!(mode = mode.label(), on, "mode toggled");
        on
    }

    pub fn profile(&self) -> &Profile {
        // `active` is only ever set to a key present in `profiles`.
        &self.profiles[&self.active]
    }

    pub fn profile_name(&self) -> &str {
        &self.active
    }

    pub fn profiles(&self) -> &ProfileBook {
        &self.profiles
    }

    pub fn select_profile(&mut self, name: &str) -> Result<ProfileChange, GestureError> {
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| GestureError::UnknownProfile(name.to_string()))?;
        self.debouncer.reseed(&profile.cooldowns);
        let change = ProfileChange {
            sensitivity: profile.gesture_sensitivity,
            theme: profile.theme,
        };
        self.active = name.to_string();
        info!(
            profile = name,
            clap_threshold = profile.clap_threshold,
            sensitivity = profile.gesture_sensitivity,
            "profile selected"
        );
        Ok(change)
    }

    /// Profile after the active one in name order, wrapping around.
    pub fn next_profile_name(&self) -> String {
        self.profiles
            .range::<str, _>((
                std::ops::Bound::Excluded(self.active.as_str()),
                std::ops::Bound::Unbounded,
            ))
            .next()
            .or_else(|| self.profiles.iter().next())
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| self.active.clone())
    }

    /// Interpret one frame's hands into debounced gesture events.
    pub fn interpret(
        &mut self,
        hands: &[Hand],
        display: DisplayBounds,
        now: Instant,
    ) -> Vec<GestureEvent> {
        let profile = &self.profiles[&self.active];
        let candidates = match hands {
            [a, b] => two_hand::resolve(a, b, self.modes, profile, display, now),
            _ => self
                .single_hand
                .resolve_frame(hands, self.modes, profile, now),
        };

        let debouncer = &mut self.debouncer;
        candidates
            .into_iter()
            .filter(|event| match debounce_key(&event.gesture) {
                Some(key) => debouncer.accept(key, event.at),
                None => true,
            })
            .inspect(|event| debug!(gesture = event.gesture.name(), "accepted"))
            .collect()
    }
}

/// Continuous gestures (cursor, volume, exercise status) are never debounced.
fn debounce_key(gesture: &Gesture) -> Option<DebounceKey> {
    match gesture {
        Gesture::Clap => Some(DebounceKey::Clap),
        Gesture::Click => Some(DebounceKey::Click),
        Gesture::KeyPress { key } => Some(DebounceKey::VirtualKey(*key)),
        Gesture::ShortcutFired { finger_count, .. } => Some(DebounceKey::Shortcut(*finger_count)),
        Gesture::VolumeAdjust { .. } | Gesture::CursorMove { .. } | Gesture::ExercisePose(_) => {
            None
        }
    }
}
