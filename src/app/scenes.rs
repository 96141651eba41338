//! Scene builders registered with the `SceneRegistry`.
//!
//! Scene 0 is a short splash that hands over to the flight level through a
//! `SceneTransitioner`; scene 1 is the level with the camera, a light, the
//! ship and the HUD. Every root entity carries `SceneMember` so a scene load
//! clears it.
use bevy::prelude::*;
use skyrail::scene::{SceneMember, SceneRegistry, SceneTransitioner};
use skyrail::settings::Settings;
use skyrail::ship::ShipBundle;
use skyrail::ui::spawn_charging_label;

/// Registry with the splash at index 0 and the level at index 1.
#[must_use]
pub fn scene_registry() -> SceneRegistry {
    let mut registry = SceneRegistry::default();
    registry.register(0, build_splash).register(1, build_level);
    registry
}

pub fn build_splash(commands: &mut Commands, settings: &Settings) {
    commands.spawn((Camera2dBundle::default(), SceneMember));
    commands.spawn((
        TextBundle::from_section(
            "skyrail",
            TextStyle {
                font_size: 64.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Percent(40.0),
            top: Val::Percent(40.0),
            ..default()
        }),
        SceneMember,
    ));
    commands.spawn((SceneTransitioner::from_settings(&settings.scene), SceneMember));
}

pub fn build_level(commands: &mut Commands, _settings: &Settings) {
    // camera sits behind the flight rectangle, ship flies toward -Z
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0.0, 0.0, 18.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        SceneMember,
    ));
    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: 8_000.0,
                ..default()
            },
            transform: Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        SceneMember,
    ));
    commands.spawn((ShipBundle::default(), SpatialBundle::default(), SceneMember));
    spawn_charging_label(commands);
}
