//! HUD: the "Charging..." label shown while a slow tap is being held.

use bevy::prelude::*;

use crate::scene::SceneMember;
use crate::ship::{FireController, Ship};

/// Marks the charging label text.
#[derive(Component)]
pub struct ChargingLabel;

/// Spawn the charging label, hidden, as part of the current scene.
pub fn spawn_charging_label(commands: &mut Commands) -> Entity {
    let mut text = TextBundle::from_section(
        "Charging...",
        TextStyle {
            font_size: 24.0,
            color: Color::WHITE,
            ..default()
        },
    )
    .with_style(Style {
        position_type: PositionType::Absolute,
        left: Val::Px(100.0),
        top: Val::Px(100.0),
        ..default()
    });
    text.visibility = Visibility::Hidden;

    commands.spawn((text, ChargingLabel, SceneMember)).id()
}

/// Show the label while any ship is charging.
#[allow(clippy::needless_pass_by_value)]
pub fn update_charging_label(
    ships: Query<&FireController, With<Ship>>,
    mut labels: Query<&mut Visibility, With<ChargingLabel>>,
) {
    let charging = ships.iter().any(FireController::is_charging);
    let wanted = if charging { Visibility::Visible } else { Visibility::Hidden };
    for mut visibility in &mut labels {
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, update_charging_label);
    }
}
