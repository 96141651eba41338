//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`). Every field
//! carries a serde default so a settings file only needs the values it changes.
use bevy::prelude::{warn, KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub mod loader;

/// Convert settings seconds into a `Duration`, rounded to the microsecond so
/// values such as 0.1 stay exact.
///
/// NaN and non-positive values give `Duration::ZERO`. Values too large for a
/// `Duration` in microseconds (including `inf`) saturate instead of panicking.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn secs_to_duration(secs: f32) -> Duration {
    let micros = (f64::from(secs) * 1_000_000.0).round();
    if micros.is_nan() || micros <= 0.0 {
        return Duration::ZERO;
    }
    // float to int casts saturate at u64::MAX
    Duration::from_micros(micros as u64)
}

/// Replace a non-finite value with `default`. Returns whether it was replaced.
fn finite_or_default(field: &str, value: &mut f32, default: f32) -> bool {
    if value.is_finite() {
        return false;
    }
    warn!("settings: {field} = {value} is not finite, using {default}");
    *value = default;
    true
}

/// Flight tuning for the player ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipSettings {
    #[serde(default = "ShipSettings::default_speed")]
    pub x_speed: f32, // Horizontal speed in units per second at full stick.
    #[serde(default = "ShipSettings::default_x_range")]
    pub x_range: f32, // Local x is clamped to [-x_range, x_range].
    #[serde(default = "ShipSettings::default_speed")]
    pub y_speed: f32, // Vertical speed in units per second at full stick.
    #[serde(default = "ShipSettings::default_y_range")]
    pub y_range: f32, // Local y is clamped to [-y_range, y_range].
    #[serde(default = "ShipSettings::default_position_pitch_factor")]
    pub position_pitch_factor: f32, // Degrees of pitch per unit of height.
    #[serde(default = "ShipSettings::default_position_yaw_factor")]
    pub position_yaw_factor: f32, // Degrees of yaw per unit of sideways offset.
    #[serde(default = "ShipSettings::default_control_pitch_factor")]
    pub control_pitch_factor: f32, // Degrees of pitch at full vertical stick.
    #[serde(default = "ShipSettings::default_control_roll_factor")]
    pub control_roll_factor: f32, // Degrees of roll at full horizontal stick.
    #[serde(default = "ShipSettings::default_rotate_speed")]
    pub rotate_speed: f32, // Free-look speed in degrees per second.
    #[serde(default = "ShipSettings::default_burst_speed")]
    pub burst_speed: f32, // Burst shots per second of slow-tap hold.
    #[serde(default)]
    pub free_look: bool, // Let the look axis steer the ship orientation.
}

impl ShipSettings {
    fn default_speed() -> f32 { 10.0 }
    fn default_x_range() -> f32 { 9.0 }
    fn default_y_range() -> f32 { 5.0 }
    fn default_position_pitch_factor() -> f32 { -5.0 }
    fn default_position_yaw_factor() -> f32 { 5.0 }
    fn default_control_pitch_factor() -> f32 { -20.0 }
    fn default_control_roll_factor() -> f32 { -35.0 }
    fn default_rotate_speed() -> f32 { 90.0 }
    fn default_burst_speed() -> f32 { 10.0 }

    fn sanitize(&mut self) -> usize {
        [
            finite_or_default("ship.x_speed", &mut self.x_speed, Self::default_speed()),
            finite_or_default("ship.x_range", &mut self.x_range, Self::default_x_range()),
            finite_or_default("ship.y_speed", &mut self.y_speed, Self::default_speed()),
            finite_or_default("ship.y_range", &mut self.y_range, Self::default_y_range()),
            finite_or_default(
                "ship.position_pitch_factor",
                &mut self.position_pitch_factor,
                Self::default_position_pitch_factor(),
            ),
            finite_or_default(
                "ship.position_yaw_factor",
                &mut self.position_yaw_factor,
                Self::default_position_yaw_factor(),
            ),
            finite_or_default(
                "ship.control_pitch_factor",
                &mut self.control_pitch_factor,
                Self::default_control_pitch_factor(),
            ),
            finite_or_default(
                "ship.control_roll_factor",
                &mut self.control_roll_factor,
                Self::default_control_roll_factor(),
            ),
            finite_or_default("ship.rotate_speed", &mut self.rotate_speed, Self::default_rotate_speed()),
            finite_or_default("ship.burst_speed", &mut self.burst_speed, Self::default_burst_speed()),
        ]
        .into_iter()
        .filter(|&replaced| replaced)
        .count()
    }
}

impl Default for ShipSettings {
    fn default() -> Self {
        Self {
            x_speed: Self::default_speed(),
            x_range: Self::default_x_range(),
            y_speed: Self::default_speed(),
            y_range: Self::default_y_range(),
            position_pitch_factor: Self::default_position_pitch_factor(),
            position_yaw_factor: Self::default_position_yaw_factor(),
            control_pitch_factor: Self::default_control_pitch_factor(),
            control_roll_factor: Self::default_control_roll_factor(),
            rotate_speed: Self::default_rotate_speed(),
            burst_speed: Self::default_burst_speed(),
            free_look: false,
        }
    }
}

/// Projectile launch parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSettings {
    #[serde(default = "ProjectileSettings::default_spawn_offset")]
    pub spawn_offset: f32, // Distance in front of the ship where shots appear.
    #[serde(default = "ProjectileSettings::default_impulse")]
    pub impulse: f32, // Magnitude of the launch impulse.
    #[serde(default = "ProjectileSettings::default_size")]
    pub size: f32, // Uniform scale; mass is size cubed.
    #[serde(default = "ProjectileSettings::default_lifetime")]
    pub lifetime: f32, // Seconds before a shot is despawned.
    #[serde(default = "ProjectileSettings::default_burst_interval")]
    pub burst_interval: f32, // Seconds between shots of a burst.
    #[serde(default)]
    pub seed: Option<u64>, // Fixed colour seed; entropy when absent.
}

impl ProjectileSettings {
    fn default_spawn_offset() -> f32 { 0.6 }
    fn default_impulse() -> f32 { 20.0 }
    fn default_size() -> f32 { 1.0 }
    fn default_lifetime() -> f32 { 3.0 }
    fn default_burst_interval() -> f32 { 0.1 }

    fn sanitize(&mut self) -> usize {
        [
            finite_or_default("projectile.spawn_offset", &mut self.spawn_offset, Self::default_spawn_offset()),
            finite_or_default("projectile.impulse", &mut self.impulse, Self::default_impulse()),
            finite_or_default("projectile.size", &mut self.size, Self::default_size()),
            finite_or_default("projectile.lifetime", &mut self.lifetime, Self::default_lifetime()),
            finite_or_default(
                "projectile.burst_interval",
                &mut self.burst_interval,
                Self::default_burst_interval(),
            ),
        ]
        .into_iter()
        .filter(|&replaced| replaced)
        .count()
    }
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            spawn_offset: Self::default_spawn_offset(),
            impulse: Self::default_impulse(),
            size: Self::default_size(),
            lifetime: Self::default_lifetime(),
            burst_interval: Self::default_burst_interval(),
            seed: None,
        }
    }
}

/// Splash-to-level transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    #[serde(default = "SceneSettings::default_transition_delay")]
    pub transition_delay: f32, // Seconds the splash scene waits before loading.
    #[serde(default = "SceneSettings::default_target_index")]
    pub target_index: usize, // Scene index loaded when the delay elapses.
}

impl SceneSettings {
    fn default_transition_delay() -> f32 { 1.0 }
    fn default_target_index() -> usize { 1 }

    fn sanitize(&mut self) -> usize {
        usize::from(finite_or_default(
            "scene.transition_delay",
            &mut self.transition_delay,
            Self::default_transition_delay(),
        ))
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            transition_delay: Self::default_transition_delay(),
            target_index: Self::default_target_index(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default = "ControlsSettings::default_tap_time")]
    pub tap_time: f32, // Longest press still counted as a single shot.
    #[serde(default = "ControlsSettings::default_slow_tap_time")]
    pub slow_tap_time: f32, // Shortest hold counted as a burst.
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_tap_time() -> f32 { 0.2 }
    fn default_slow_tap_time() -> f32 { 0.5 }

    fn sanitize(&mut self) -> usize {
        usize::from(finite_or_default("controls.tap_time", &mut self.tap_time, Self::default_tap_time()))
            + usize::from(finite_or_default(
                "controls.slow_tap_time",
                &mut self.slow_tap_time,
                Self::default_slow_tap_time(),
            ))
    }

    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("up".to_string(), "W".to_string());
        m.insert("down".to_string(), "S".to_string());
        m.insert("left".to_string(), "A".to_string());
        m.insert("right".to_string(), "D".to_string());
        m.insert("look_up".to_string(), "Up".to_string());
        m.insert("look_down".to_string(), "Down".to_string());
        m.insert("look_left".to_string(), "Left".to_string());
        m.insert("look_right".to_string(), "Right".to_string());
        m.insert("fire".to_string(), "Space".to_string());
        m.insert("self_destruct".to_string(), "K".to_string());
        m
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            tap_time: Self::default_tap_time(),
            slow_tap_time: Self::default_slow_tap_time(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ship: ShipSettings,
    #[serde(default)]
    pub projectile: ProjectileSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Replace every non-finite number (RON accepts `NaN` and `inf`) with its
    /// default, logging a warning for each one.
    ///
    /// # Return
    /// The number of fields that were replaced.
    pub fn sanitize(&mut self) -> usize {
        self.ship.sanitize() + self.projectile.sanitize() + self.scene.sanitize() + self.controls.sanitize()
    }

    /// Convert a human-friendly key name (as used in the keybinds map) into a `KeyCode`.
    ///
    /// Accepts single letters and digits plus a handful of named keys; matching
    /// is case-insensitive. Returns `None` for anything unrecognised.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                'A' => Some(KeyCode::KeyA),
                'B' => Some(KeyCode::KeyB),
                'C' => Some(KeyCode::KeyC),
                'D' => Some(KeyCode::KeyD),
                'E' => Some(KeyCode::KeyE),
                'F' => Some(KeyCode::KeyF),
                'G' => Some(KeyCode::KeyG),
                'H' => Some(KeyCode::KeyH),
                'I' => Some(KeyCode::KeyI),
                'J' => Some(KeyCode::KeyJ),
                'K' => Some(KeyCode::KeyK),
                'L' => Some(KeyCode::KeyL),
                'M' => Some(KeyCode::KeyM),
                'N' => Some(KeyCode::KeyN),
                'O' => Some(KeyCode::KeyO),
                'P' => Some(KeyCode::KeyP),
                'Q' => Some(KeyCode::KeyQ),
                'R' => Some(KeyCode::KeyR),
                'S' => Some(KeyCode::KeyS),
                'T' => Some(KeyCode::KeyT),
                'U' => Some(KeyCode::KeyU),
                'V' => Some(KeyCode::KeyV),
                'W' => Some(KeyCode::KeyW),
                'X' => Some(KeyCode::KeyX),
                'Y' => Some(KeyCode::KeyY),
                'Z' => Some(KeyCode::KeyZ),
                '0' => Some(KeyCode::Digit0),
                '1' => Some(KeyCode::Digit1),
                '2' => Some(KeyCode::Digit2),
                '3' => Some(KeyCode::Digit3),
                '4' => Some(KeyCode::Digit4),
                '5' => Some(KeyCode::Digit5),
                '6' => Some(KeyCode::Digit6),
                '7' => Some(KeyCode::Digit7),
                '8' => Some(KeyCode::Digit8),
                '9' => Some(KeyCode::Digit9),
                _ => None,
            };
        }

        Some(match s.as_str() {
            // Arrows
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,

            // Whitespace / control
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,

            // Modifiers
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,

            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = ron::from_str("(ship: (x_range: 4.0))").unwrap();
        assert_eq!(s.ship.x_range, 4.0);
        assert_eq!(s.ship.y_range, 5.0);
        assert_eq!(s.ship.control_roll_factor, -35.0);
        assert_eq!(s.projectile.impulse, 20.0);
        assert_eq!(s.scene.target_index, 1);
        assert_eq!(s.controls.key("fire", KeyCode::KeyF), KeyCode::Space);
    }

    #[test]
    fn keycode_names_are_case_insensitive() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("space"), Some(KeyCode::Space));
        assert_eq!(Settings::keycode_from_str("ArrowUp"), Some(KeyCode::ArrowUp));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("nope"), None);
    }

    #[test]
    fn unknown_binding_uses_fallback() {
        let mut controls = ControlsSettings::default();
        controls.keybinds.insert("fire".to_string(), "???".to_string());
        assert_eq!(controls.key("fire", KeyCode::Enter), KeyCode::Enter);
        assert_eq!(controls.key("missing", KeyCode::KeyQ), KeyCode::KeyQ);
    }

    #[test]
    fn non_finite_numbers_fall_back_to_defaults() {
        let mut s: Settings = ron::from_str(
            "(ship: (x_range: NaN, y_range: 2.0, rotate_speed: inf), scene: (transition_delay: inf))",
        )
        .unwrap();
        assert_eq!(s.sanitize(), 3);
        assert_eq!(s.ship.x_range, 9.0);
        assert_eq!(s.ship.y_range, 2.0);
        assert_eq!(s.ship.rotate_speed, 90.0);
        assert_eq!(s.scene.transition_delay, 1.0);
        assert_eq!(s.sanitize(), 0);
    }

    #[test]
    fn settings_seconds_convert_exactly() {
        assert_eq!(secs_to_duration(0.1), Duration::from_millis(100));
        assert_eq!(secs_to_duration(3.0), Duration::from_secs(3));
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f32::NAN), Duration::ZERO);
    }

    #[test]
    fn oversized_seconds_saturate() {
        let max = Duration::from_micros(u64::MAX);
        assert_eq!(secs_to_duration(f32::INFINITY), max);
        assert_eq!(secs_to_duration(1e30), max);
        assert_eq!(secs_to_duration(f32::NEG_INFINITY), Duration::ZERO);
    }
}
