// ==========================================
// OS-facing sinks: enigo input injection, rdev screen size, log-backed sinks
// ==========================================
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use rdev::display_size;
use tracing::{info, warn};

use crate::config::{DisplayConfig, MouseConfig};
use crate::events::{ExercisePose, MediaAction};
use crate::profile::Theme;
use crate::sinks::{
    DisplayGeometry, KeySink, MediaSink, PointerSink, ScreenshotSink, StatusSink, VolumeSink,
};
use crate::two_hand::DisplayBounds;

fn new_enigo() -> Result<Enigo> {
    Enigo::new(&Settings::default()).map_err(|e| anyhow!("Enigo init failed: {:?}", e))
}

// ==========================================
// Display geometry
// ==========================================
pub struct ScreenGeometry {
    bounds: DisplayBounds,
}

impl ScreenGeometry {
    pub fn new(config: &DisplayConfig) -> Self {
        let manual = DisplayBounds::new(config.manual_width, config.manual_height);
        let bounds = if config.auto_screen_size {
            match display_size() {
                Ok((w, h)) => DisplayBounds::new(w as u32, h as u32),
                Err(e) => {
                    warn!(">> [Display] size query failed ({:?}), using manual size", e);
                    manual
                }
            }
        } else {
            manual
        };
        info!(">> [Display] {}x{}", bounds.width, bounds.height);
        Self { bounds }
    }
}

impl DisplayGeometry for ScreenGeometry {
    fn bounds(&self) -> DisplayBounds {
        self.bounds
    }
}

// ==========================================
// Pointer
// ==========================================
#[derive(Clone, Copy)]
struct Position {
    x: f64,
    y: f64,
}

pub struct EnigoPointer {
    enigo: Enigo,
    screen_width: f64,
    screen_height: f64,
    smoothing: f64,
    filtered: Option<Position>,
}

impl EnigoPointer {
    pub fn new(bounds: DisplayBounds, config: &MouseConfig) -> Result<Self> {
        Ok(Self {
            enigo: new_enigo()?,
            screen_width: bounds.width as f64,
            screen_height: bounds.height as f64,
            smoothing: config.smoothing.clamp(0.01, 1.0) as f64,
            filtered: None,
        })
    }

    fn target(&mut self, x: f32, y: f32) -> Position {
        let target = Position {
            x: x as f64 * self.screen_width,
            y: y as f64 * self.screen_height,
        };
        let alpha = self.smoothing;
        let next = match self.filtered {
            Some(prev) => Position {
                x: prev.x * (1.0 - alpha) + target.x * alpha,
                y: prev.y * (1.0 - alpha) + target.y * alpha,
            },
            None => target,
        };
        self.filtered = Some(next);
        Position {
            x: next.x.clamp(0.0, self.screen_width),
            y: next.y.clamp(0.0, self.screen_height),
        }
    }
}

impl PointerSink for EnigoPointer {
    fn move_to(&mut self, x: f32, y: f32) -> Result<()> {
        let p = self.target(x, y);
        self.enigo
            .move_mouse(p.x as i32, p.y as i32, Coordinate::Abs)
            .map_err(|e| anyhow!("{:?}", e))
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| anyhow!("{:?}", e))
    }
}

// ==========================================
// Keyboard and media keys
// ==========================================
pub struct EnigoKeys {
    enigo: Enigo,
}

impl EnigoKeys {
    pub fn new() -> Result<Self> {
        Ok(Self { enigo: new_enigo()? })
    }
}

impl KeySink for EnigoKeys {
    fn press_and_release(&mut self, name: &str) -> Result<()> {
        let combo = KeyCombo::parse(name)?;
        let mut held = Vec::new();
        let mut result = Ok(());
        for modifier in &combo.modifiers {
            match self.enigo.key(*modifier, Direction::Press) {
                Ok(()) => held.push(*modifier),
                Err(e) => {
                    result = Err(anyhow!("{name}: {:?}", e));
                    break;
                }
            }
        }
        if result.is_ok() {
            result = self
                .enigo
                .key(combo.key, Direction::Click)
                .map_err(|e| anyhow!("{name}: {:?}", e));
        }
        // Never leave a modifier stuck down.
        for modifier in held.iter().rev() {
            if let Err(e) = self.enigo.key(*modifier, Direction::Release) {
                warn!(">> [Keyboard] release {:?} failed: {:?}", modifier, e);
            }
        }
        result
    }
}

/// A `key:` shortcut target such as `space`, `ctrl+c` or `ctrl+shift+t`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCombo {
    pub modifiers: Vec<Key>,
    pub key: Key,
}

impl KeyCombo {
    pub fn parse(name: &str) -> Result<Self> {
        if name == "+" {
            return Ok(Self {
                modifiers: Vec::new(),
                key: Key::Unicode('+'),
            });
        }
        let parts: Vec<&str> = name.split('+').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            bail!("malformed key combo '{name}'");
        }
        let (last, modifiers) = match parts.split_last() {
            Some(split) => split,
            None => bail!("empty key combo"),
        };
        let modifiers = modifiers
            .iter()
            .map(|m| match parse_modifier(m) {
                Some(key) => Ok(key),
                None => bail!("'{m}' is not a modifier in '{name}'"),
            })
            .collect::<Result<Vec<_>>>()?;
        let key = match parse_key(last)? {
            // `ctrl+T` means the T key, not a shifted T.
            Key::Unicode(c) if !modifiers.is_empty() => Key::Unicode(c.to_ascii_lowercase()),
            key => key,
        };
        Ok(Self { modifiers, key })
    }
}

fn parse_modifier(name: &str) -> Option<Key> {
    let key = match name.to_lowercase().as_str() {
        "ctrl" | "control" => Key::Control,
        "alt" => Key::Alt,
        "shift" => Key::Shift,
        "meta" | "super" | "win" | "cmd" => Key::Meta,
        _ => return None,
    };
    Some(key)
}

/// Single key names as written in `key:<name>` shortcuts.
pub fn parse_key(name: &str) -> Result<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Unicode(c));
    }
    if let Some(modifier) = parse_modifier(name) {
        return Ok(modifier);
    }
    let key = match name.to_lowercase().as_str() {
        "space" => Key::Space,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "playpause" => Key::MediaPlayPause,
        "nexttrack" => Key::MediaNextTrack,
        "prevtrack" => Key::MediaPrevTrack,
        "volumeup" => Key::VolumeUp,
        "volumedown" => Key::VolumeDown,
        "volumemute" => Key::VolumeMute,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        other => bail!("unknown key name '{other}'"),
    };
    Ok(key)
}

/// Media transport through the OS media keys.
pub struct EnigoMedia {
    enigo: Enigo,
}

impl EnigoMedia {
    pub fn new() -> Result<Self> {
        Ok(Self { enigo: new_enigo()? })
    }
}

impl MediaSink for EnigoMedia {
    fn control(&mut self, action: MediaAction) -> Result<()> {
        // Play and pause share the one toggle key.
        let key = match action {
            MediaAction::Play | MediaAction::Pause => Key::MediaPlayPause,
            MediaAction::Next => Key::MediaNextTrack,
            MediaAction::Previous => Key::MediaPrevTrack,
        };
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| anyhow!("media {}: {:?}", action.as_str(), e))
    }
}

// ==========================================
// Log-backed collaborators
// ==========================================

/// Records the requested level; the mixer backend is platform glue outside
/// this crate.
#[derive(Default)]
pub struct LoggedVolume {
    last: Option<f32>,
}

impl VolumeSink for LoggedVolume {
    fn set_level(&mut self, level: f32) -> Result<()> {
        // Continuous control: only log changes worth seeing.
        if self.last.map_or(true, |prev| (prev - level).abs() >= 0.05) {
            info!(">> [Volume] {:.0}%", level * 100.0);
            self.last = Some(level);
        }
        Ok(())
    }
}

/// `screenshot_<YYYYMMDD_HHMMSS>.png`
pub fn screenshot_file_name(now: DateTime<Local>) -> String {
    format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// Announces each screenshot request with the file it maps to. Pixel capture
/// belongs to the host application.
pub struct ScreenshotReporter {
    dir: PathBuf,
    count: u32,
}

impl ScreenshotReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            count: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl ScreenshotSink for ScreenshotReporter {
    fn capture(&mut self) -> Result<()> {
        let path = self.dir.join(screenshot_file_name(Local::now()));
        self.count += 1;
        info!(">> [Screenshot] #{} -> {}", self.count, path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct LogStatus {
    last_pose: Option<ExercisePose>,
}

impl StatusSink for LogStatus {
    fn show_pose(&mut self, pose: ExercisePose) {
        if self.last_pose != Some(pose) {
            info!(">> [Gesture] {}", pose.label());
            self.last_pose = Some(pose);
        }
    }

    fn show_mode(&mut self, label: &str) {
        info!(">> [Mode] {}", label);
    }

    fn apply_theme(&mut self, theme: Theme) {
        info!(">> [Theme] {:?}", theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_screenshot_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(screenshot_file_name(at), "screenshot_20240309_070501.png");
    }

    #[test]
    fn test_parse_key_names() {
        assert!(matches!(parse_key("x"), Ok(Key::Unicode('x'))));
        assert!(matches!(parse_key("ctrl"), Ok(Key::Control)));
        assert!(matches!(parse_key("volumeup"), Ok(Key::VolumeUp)));
        assert!(matches!(parse_key("Space"), Ok(Key::Space)));
        assert!(matches!(parse_key("f5"), Ok(Key::F5)));
        assert!(matches!(parse_key("enter"), Ok(Key::Return)));
        assert!(parse_key("hyper").is_err());
    }

    #[test]
    fn test_key_combos() {
        let copy = KeyCombo::parse("ctrl+c").unwrap();
        assert_eq!(copy.modifiers, vec![Key::Control]);
        assert_eq!(copy.key, Key::Unicode('c'));

        let reopen = KeyCombo::parse("Ctrl + Shift + T").unwrap();
        assert_eq!(reopen.modifiers, vec![Key::Control, Key::Shift]);
        assert_eq!(reopen.key, Key::Unicode('t'));

        let switch = KeyCombo::parse("alt+tab").unwrap();
        assert_eq!(switch.modifiers, vec![Key::Alt]);
        assert_eq!(switch.key, Key::Tab);

        // A literal plus is a single character, not a combo.
        assert_eq!(KeyCombo::parse("+").unwrap().key, Key::Unicode('+'));
        assert!(KeyCombo::parse("ctrl").unwrap().modifiers.is_empty());
        assert_eq!(KeyCombo::parse("X").unwrap().key, Key::Unicode('X'));

        assert!(KeyCombo::parse("c+ctrl").is_err());
        assert!(KeyCombo::parse("ctrl+").is_err());
        assert!(KeyCombo::parse("ctrl+hyper").is_err());
    }

    #[test]
    fn test_reporter_counts_requests() {
        let mut reporter = ScreenshotReporter::new("shots");
        reporter.capture().unwrap();
        reporter.capture().unwrap();
        assert_eq!(reporter.count(), 2);
    }
}
