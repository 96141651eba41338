//! Optional free look for the ship.
//!
//! When `ShipSettings::free_look` is on, the look axis accumulates yaw and
//! pitch (degrees) and overrides the flight tilt on frames where it is
//! pushed past the dead-zone.

use bevy::math::EulerRot;
use bevy::prelude::*;

use crate::ship::flight::DEAD_ZONE_SQ;

pub const MAX_LOOK_PITCH_DEG: f32 = 89.0;

/// Accumulated free-look angles in degrees.
#[derive(Component, Default, Debug, Clone, Copy, PartialEq)]
pub struct ShipLook {
    pub yaw: f32,
    pub pitch: f32,
}

impl ShipLook {
    /// Apply one frame of look input. Returns false, changing nothing, when
    /// the input is inside the dead-zone.
    pub fn apply_delta(&mut self, look: Vec2, rotate_speed: f32, dt: f32) -> bool {
        if look.length_squared() < DEAD_ZONE_SQ {
            return false;
        }
        let step = rotate_speed * dt;
        self.yaw += look.x * step;
        self.pitch = (self.pitch - look.y * step).clamp(-MAX_LOOK_PITCH_DEG, MAX_LOOK_PITCH_DEG);
        true
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }
}
