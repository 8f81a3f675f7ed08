//! Hand-gesture control: interprets per-frame hand landmarks into screenshot,
//! volume, pointer, keyboard, media and exercise signals.

pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod events;
pub mod fingers;
pub mod landmarks;
pub mod modes;
pub mod os;
pub mod profile;
pub mod shortcuts;
pub mod single_hand;
pub mod sinks;
pub mod source;
pub mod two_hand;
