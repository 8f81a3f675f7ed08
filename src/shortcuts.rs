// ==========================================
// Global hotkeys: mode toggles, profile cycling, quit
// ==========================================
use crate::config::HotkeysConfig;
use crate::modes::Mode;
use device_query::{DeviceQuery, DeviceState, Keycode};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppAction {
    None,
    Toggle(Mode),
    NextProfile,
    Quit,
}

/// Edge-triggered key combo: fires once per press, re-arms on release.
struct Hotkey {
    keys: Vec<Keycode>,
    action: AppAction,
    pressed: bool,
}

impl Hotkey {
    fn new(names: &[String], action: AppAction) -> Self {
        Self {
            keys: parse_keycodes(names),
            action,
            pressed: false,
        }
    }

    fn poll(&mut self, down: &[Keycode]) -> bool {
        let active = !self.keys.is_empty() && self.keys.iter().all(|k| down.contains(k));
        let fired = active && !self.pressed;
        self.pressed = active;
        fired
    }
}

pub struct InputManager {
    device_state: DeviceState,
    hotkeys: Vec<Hotkey>,
}

impl InputManager {
    pub fn new(config: &HotkeysConfig) -> Self {
        Self {
            device_state: DeviceState::new(),
            hotkeys: vec![
                Hotkey::new(&config.quit, AppAction::Quit),
                Hotkey::new(&config.toggle_keyboard, AppAction::Toggle(Mode::VirtualKeyboard)),
                Hotkey::new(&config.toggle_mouse, AppAction::Toggle(Mode::MouseControl)),
                Hotkey::new(&config.toggle_exercise, AppAction::Toggle(Mode::Exercise)),
                Hotkey::new(&config.next_profile, AppAction::NextProfile),
            ],
        }
    }

    /// Poll the keyboard; at most one action per call, quit first.
    pub fn check_action(&mut self) -> AppAction {
        let keys = self.device_state.get_keys();
        first_action(&mut self.hotkeys, &keys)
    }
}

fn first_action(hotkeys: &mut [Hotkey], down: &[Keycode]) -> AppAction {
    let mut action = AppAction::None;
    // Every hotkey sees the poll so its pressed state stays current.
    for hotkey in hotkeys.iter_mut() {
        if hotkey.poll(down) && action == AppAction::None {
            action = hotkey.action;
        }
    }
    action
}

fn parse_keycodes(keys: &[String]) -> Vec<Keycode> {
    keys.iter()
        .filter_map(|k| {
            let code = parse_keycode(&k.to_uppercase());
            if code.is_none() {
                warn!(">> [Config] unknown hotkey '{}'", k);
            }
            code
        })
        .collect()
}

fn parse_keycode(name: &str) -> Option<Keycode> {
    let code = match name {
        "LCONTROL" | "CTRL" => Keycode::LControl,
        "RCONTROL" => Keycode::RControl,
        "LALT" | "ALT" => Keycode::LAlt,
        "RALT" => Keycode::RAlt,
        "LSHIFT" | "SHIFT" => Keycode::LShift,
        "RSHIFT" => Keycode::RShift,
        "SPACE" => Keycode::Space,
        "ESCAPE" | "ESC" => Keycode::Escape,
        "TAB" => Keycode::Tab,
        "A" => Keycode::A,
        "B" => Keycode::B,
        "C" => Keycode::C,
        "D" => Keycode::D,
        "E" => Keycode::E,
        "F" => Keycode::F,
        "G" => Keycode::G,
        "H" => Keycode::H,
        "I" => Keycode::I,
        "J" => Keycode::J,
        "K" => Keycode::K,
        "L" => Keycode::L,
        "M" => Keycode::M,
        "N" => Keycode::N,
        "O" => Keycode::O,
        "P" => Keycode::P,
        "Q" => Keycode::Q,
        "R" => Keycode::R,
        "S" => Keycode::S,
        "T" => Keycode::T,
        "U" => Keycode::U,
        "V" => Keycode::V,
        "W" => Keycode::W,
        "X" => Keycode::X,
        "Y" => Keycode::Y,
        "Z" => Keycode::Z,
        "1" => Keycode::Key1,
        "2" => Keycode::Key2,
        "3" => Keycode::Key3,
        "4" => Keycode::Key4,
        "5" => Keycode::Key5,
        "F1" => Keycode::F1,
        "F2" => Keycode::F2,
        "F3" => Keycode::F3,
        "F4" => Keycode::F4,
        "F5" => Keycode::F5,
        "F6" => Keycode::F6,
        "F7" => Keycode::F7,
        "F8" => Keycode::F8,
        "F9" => Keycode::F9,
        "F10" => Keycode::F10,
        "F11" => Keycode::F11,
        "F12" => Keycode::F12,
        _ => return None,
    };
    Some(code)
}
