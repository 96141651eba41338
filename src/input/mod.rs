//! Keyboard bindings for the ship.
//!
//! Turns key state into the ship's `MoveInput`, `LookInput` and `FireInput`
//! events. Axes are only sent when they change. The fire key goes through
//! `SlowTapRecognizer`, which tells a quick tap (one shot) from a long hold
//! (a burst whose length depends on the hold time).

use bevy::input::InputSystem;
use bevy::prelude::*;

use crate::settings::{ControlsSettings, Settings};
use crate::ship::{FireEvent, FireInput, FireInteraction, LookInput, MoveInput};

/// Classifies a held button into tap, slow tap or cancel.
///
/// A press starts a slow tap right away. On release, a hold no longer than
/// `tap_time` is a tap, a hold of at least `slow_tap_time` is a slow tap
/// carrying its duration, and anything in between cancels.
#[derive(Resource, Debug, Clone)]
pub struct SlowTapRecognizer {
    pub tap_time: f32,
    pub slow_tap_time: f32,
    held: Option<f32>,
}

impl SlowTapRecognizer {
    #[must_use]
    pub fn new(tap_time: f32, slow_tap_time: f32) -> Self {
        Self { tap_time, slow_tap_time, held: None }
    }

    #[must_use]
    pub fn from_settings(controls: &ControlsSettings) -> Self {
        Self::new(controls.tap_time, controls.slow_tap_time)
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    pub fn press(&mut self) -> FireEvent {
        self.held = Some(0.0);
        FireEvent::slow_tap_started()
    }

    /// Account for `dt` seconds of holding. No-op while released.
    pub fn hold(&mut self, dt: f32) {
        if let Some(held) = self.held.as_mut() {
            *held += dt;
        }
    }

    /// Returns `None` if the button was not pressed.
    pub fn release(&mut self) -> Option<FireEvent> {
        let held = self.held.take()?;
        Some(if held <= self.tap_time {
            FireEvent::tap(held)
        } else if held >= self.slow_tap_time {
            FireEvent::slow_tap(held)
        } else {
            FireEvent::canceled(FireInteraction::SlowTap, held)
        })
    }
}

impl Default for SlowTapRecognizer {
    fn default() -> Self {
        Self::from_settings(&ControlsSettings::default())
    }
}

/// Build a unit-length axis from four keys. Opposite keys cancel out.
#[must_use]
pub fn axis_from_keys(keys: &ButtonInput<KeyCode>, right: KeyCode, left: KeyCode, up: KeyCode, down: KeyCode) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keys.pressed(right) {
        axis.x += 1.0;
    }
    if keys.pressed(left) {
        axis.x -= 1.0;
    }
    if keys.pressed(up) {
        axis.y += 1.0;
    }
    if keys.pressed(down) {
        axis.y -= 1.0;
    }
    axis.normalize_or_zero()
}

/// Last axes sent, so unchanged input is not re-sent.
#[derive(Default)]
pub struct SentAxes {
    moving: Option<Vec2>,
    looking: Option<Vec2>,
}

/// Read the keyboard and emit ship input events.
#[allow(clippy::needless_pass_by_value)]
pub fn keyboard_ship_input(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    settings: Res<Settings>,
    mut recognizer: ResMut<SlowTapRecognizer>,
    mut sent: Local<SentAxes>,
    mut moves: EventWriter<MoveInput>,
    mut looks: EventWriter<LookInput>,
    mut fires: EventWriter<FireInput>,
) {
    let controls = &settings.controls;

    let moving = axis_from_keys(
        &keys,
        controls.key("right", KeyCode::KeyD),
        controls.key("left", KeyCode::KeyA),
        controls.key("up", KeyCode::KeyW),
        controls.key("down", KeyCode::KeyS),
    );
    if sent.moving != Some(moving) {
        moves.send(MoveInput(moving));
        sent.moving = Some(moving);
    }

    let looking = axis_from_keys(
        &keys,
        controls.key("look_right", KeyCode::ArrowRight),
        controls.key("look_left", KeyCode::ArrowLeft),
        controls.key("look_up", KeyCode::ArrowUp),
        controls.key("look_down", KeyCode::ArrowDown),
    );
    if sent.looking != Some(looking) {
        looks.send(LookInput(looking));
        sent.looking = Some(looking);
    }

    // thresholds follow hot-reloaded settings
    recognizer.tap_time = controls.tap_time;
    recognizer.slow_tap_time = controls.slow_tap_time;

    let fire = controls.key("fire", KeyCode::Space);
    if keys.just_pressed(fire) {
        fires.send(FireInput(recognizer.press()));
    } else if keys.pressed(fire) {
        recognizer.hold(time.delta_seconds());
    }
    if keys.just_released(fire)
        && let Some(event) = recognizer.release()
    {
        fires.send(FireInput(event));
    }
}

/// Keyboard driver for the ship. Needs `InputPlugin` and `ShipPlugin`.
pub struct ShipInputPlugin;

impl Plugin for ShipInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SlowTapRecognizer>()
            .add_systems(PreUpdate, keyboard_ship_input.after(InputSystem));
    }
}
