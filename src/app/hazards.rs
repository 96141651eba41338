//! Stand-in death source: a key that destroys the ship.
//!
//! Real hazards would send the same `ShipDestroyed` event.
use bevy::prelude::*;
use skyrail::settings::Settings;
use skyrail::ship::{Ship, ShipDestroyed};

#[allow(clippy::needless_pass_by_value)]
pub fn self_destruct_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    ships: Query<Entity, With<Ship>>,
    mut destroyed: EventWriter<ShipDestroyed>,
) {
    if !keys.just_pressed(settings.controls.key("self_destruct", KeyCode::KeyK)) {
        return;
    }
    for ship in &ships {
        warn!("ship {ship:?} destroyed");
        destroyed.send(ShipDestroyed { ship });
    }
}
