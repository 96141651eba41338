//! On-rails flight: clamped translation and motion-driven tilt.
//!
//! The ship slides inside a rectangle of the parent's local space. Its
//! orientation is recomputed from scratch every frame from where it is and
//! how hard the stick is pushed, so it carries no hidden state.

use bevy::math::EulerRot;
use bevy::prelude::*;

use crate::settings::ShipSettings;

/// Squared stick deflection below which the ship does not move.
pub const DEAD_ZONE_SQ: f32 = 0.01;

/// Half-extent of a clamp range. A NaN range falls back to `default`.
fn half_extent(range: f32, default: impl FnOnce() -> f32) -> f32 {
    if range.is_nan() { default().abs() } else { range.abs() }
}

/// Move `position` by `axis * speed * dt` per axis and clamp x and y to the
/// configured ranges. Inside the dead-zone the position is returned as is.
#[must_use]
pub fn translate(position: Vec3, axis: Vec2, dt: f32, tuning: &ShipSettings) -> Vec3 {
    if axis.length_squared() < DEAD_ZONE_SQ {
        return position;
    }

    let x_range = half_extent(tuning.x_range, || ShipSettings::default().x_range);
    let y_range = half_extent(tuning.y_range, || ShipSettings::default().y_range);
    let x = (position.x + axis.x * tuning.x_speed * dt).clamp(-x_range, x_range);
    let y = (position.y + axis.y * tuning.y_speed * dt).clamp(-y_range, y_range);
    Vec3::new(x, y, position.z)
}

/// Pitch from height and vertical stick, yaw from sideways offset, roll from
/// horizontal stick. Factors are in degrees.
#[must_use]
pub fn orientation(position: Vec3, axis: Vec2, tuning: &ShipSettings) -> Quat {
    let pitch = position.y * tuning.position_pitch_factor + axis.y * tuning.control_pitch_factor;
    let yaw = position.x * tuning.position_yaw_factor;
    let roll = axis.x * tuning.control_roll_factor;
    Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), roll.to_radians())
}

/// One flight frame: translate first so the tilt matches the new position.
pub fn flight_step(transform: &mut Transform, axis: Vec2, dt: f32, tuning: &ShipSettings) {
    transform.translation = translate(transform.translation, axis, dt, tuning);
    transform.rotation = orientation(transform.translation, axis, tuning);
}
