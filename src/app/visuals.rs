//! Ship mesh and material, attached once the ship entity exists.
use bevy::prelude::*;
use skyrail::ship::Ship;

#[derive(Resource)]
pub struct ShipAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

pub fn setup_ship_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ShipAssets {
        mesh: meshes.add(Cuboid::new(1.2, 0.3, 1.6)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.7, 0.75, 0.8),
            ..default()
        }),
    });
}

#[allow(clippy::needless_pass_by_value)]
pub fn attach_ship_visuals(
    mut commands: Commands,
    assets: Res<ShipAssets>,
    ships: Query<Entity, Added<Ship>>,
) {
    for entity in &ships {
        commands
            .entity(entity)
            .insert((assets.mesh.clone(), assets.material.clone()));
    }
}
