//! Projectiles: launch computation, a minimal mass/impulse body, drift and expiry.
//!
//! A shot leaves the ship `spawn_offset` units ahead of it, shares its
//! orientation, weighs `size³` and receives a forward impulse. The ship keeps
//! no reference to it afterwards. Visuals are attached separately by
//! `ProjectileRenderPlugin` so the simulation also runs headless.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::SceneMember;
use crate::settings::{secs_to_duration, ProjectileSettings, Settings};

const PROJECTILE_RADIUS: f32 = 0.1;

#[derive(Component, Default)]
pub struct Projectile;

/// Point mass with a velocity. Impulses change velocity by `impulse / mass`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub mass: f32,
    pub velocity: Vec3,
}

impl Body {
    #[must_use]
    pub fn with_mass(mass: f32) -> Self {
        Self { mass, velocity: Vec3::ZERO }
    }

    /// Massless bodies ignore impulses.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }

    #[must_use]
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct ProjectileColor(pub Color);

#[derive(Component, Debug)]
pub struct Lifetime(pub Timer);

/// Random source for projectile colours. Seeded for reproducible runs.
#[derive(Resource)]
pub struct ShotRng {
    rng: StdRng,
    seed: Option<u64>,
}

impl ShotRng {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, seed }
    }

    /// Seed this generator was created with; `None` for entropy.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform RGB, fully opaque.
    pub fn random_color(&mut self) -> Color {
        Color::srgba(
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
            1.0,
        )
    }
}

/// Where and how a shot leaves its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub transform: Transform,
    pub mass: f32,
    pub impulse: Vec3,
}

impl Launch {
    #[must_use]
    pub fn from_owner(owner: &Transform, settings: &ProjectileSettings) -> Self {
        let forward: Vec3 = owner.forward().into();
        let size = settings.size;
        Self {
            transform: Transform {
                translation: owner.translation + forward * settings.spawn_offset,
                rotation: owner.rotation,
                scale: Vec3::splat(size),
            },
            mass: size.powi(3),
            impulse: forward * settings.impulse,
        }
    }
}

/// Spawn one projectile fired by `owner`.
///
/// # Arguments
/// * `commands` - Command buffer the projectile is spawned through.
/// * `owner` - Transform of the firing ship; the shot leaves `spawn_offset` ahead of it.
/// * `settings` - Offset, impulse, size and lifetime of the shot.
/// * `rng` - Picks the shot's colour.
///
/// # Return
/// The new projectile entity. It belongs to the current scene and is not
/// tracked by the ship.
pub fn spawn_projectile(
    commands: &mut Commands,
    owner: &Transform,
    settings: &ProjectileSettings,
    rng: &mut ShotRng,
) -> Entity {
    let launch = Launch::from_owner(owner, settings);
    let mut body = Body::with_mass(launch.mass);
    body.apply_impulse(launch.impulse);

    commands
        .spawn((
            Projectile,
            SceneMember,
            SpatialBundle::from_transform(launch.transform),
            body,
            ProjectileColor(rng.random_color()),
            Lifetime(Timer::new(secs_to_duration(settings.lifetime), TimerMode::Once)),
        ))
        .id()
}

/// Recreate `ShotRng` when reloaded settings name a different seed.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_shot_seed(settings: Res<Settings>, mut rng: ResMut<ShotRng>) {
    if !settings.is_changed() {
        return;
    }
    let seed = settings.projectile.seed;
    if rng.seed() != seed {
        info!("reseeding shot colours with {seed:?}");
        *rng = ShotRng::new(seed);
    }
}

/// Move projectiles along their velocity.
#[allow(clippy::needless_pass_by_value)]
pub fn drift_projectiles(time: Res<Time>, mut shots: Query<(&mut Transform, &Body), With<Projectile>>) {
    let dt = time.delta_seconds();
    for (mut transform, body) in &mut shots {
        transform.translation += body.velocity * dt;
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn expire_projectiles(mut commands: Commands, time: Res<Time>, mut shots: Query<(Entity, &mut Lifetime)>) {
    for (entity, mut lifetime) in &mut shots {
        if lifetime.0.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Shared sphere mesh for every projectile.
#[derive(Resource)]
pub struct ProjectileAssets {
    pub mesh: Handle<Mesh>,
}

pub fn setup_projectile_assets(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let mesh = meshes.add(Sphere::new(PROJECTILE_RADIUS));
    commands.insert_resource(ProjectileAssets { mesh });
}

/// Give freshly spawned projectiles a mesh and a material in their colour.
#[allow(clippy::needless_pass_by_value)]
pub fn attach_projectile_visuals(
    mut commands: Commands,
    assets: Res<ProjectileAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    shots: Query<(Entity, &ProjectileColor), Added<Projectile>>,
) {
    for (entity, color) in &shots {
        let material = materials.add(StandardMaterial {
            base_color: color.0,
            ..default()
        });
        commands.entity(entity).insert((assets.mesh.clone(), material));
    }
}

/// Rendering side of projectiles; needs the asset and PBR plugins.
pub struct ProjectileRenderPlugin;

impl Plugin for ProjectileRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_projectile_assets)
            .add_systems(PostUpdate, attach_projectile_visuals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> ProjectileSettings {
        ProjectileSettings::default()
    }

    #[test]
    fn launch_sits_ahead_of_the_owner() {
        let owner = Transform::from_xyz(1.0, 2.0, 3.0);
        let launch = Launch::from_owner(&owner, &settings());
        assert!((launch.transform.translation - Vec3::new(1.0, 2.0, 2.4)).length() < 1e-5);
        assert_eq!(launch.transform.rotation, owner.rotation);
        assert_eq!(launch.transform.scale, Vec3::ONE);
    }

    #[test]
    fn launch_impulse_follows_owner_forward() {
        let owner = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let launch = Launch::from_owner(&owner, &settings());
        let forward: Vec3 = owner.forward().into();
        assert!((launch.impulse.length() - 20.0).abs() < 1e-4);
        assert!(launch.impulse.normalize().dot(forward) > 0.9999);
        assert_eq!(launch.mass, 1.0);
    }

    #[test]
    fn mass_is_size_cubed() {
        let mut s = settings();
        s.size = 2.0;
        let launch = Launch::from_owner(&Transform::IDENTITY, &s);
        assert_eq!(launch.mass, 8.0);
        assert_eq!(launch.transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn impulse_scales_by_inverse_mass() {
        let mut body = Body::with_mass(4.0);
        body.apply_impulse(Vec3::new(0.0, 0.0, -20.0));
        assert_eq!(body.velocity, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(body.momentum(), Vec3::new(0.0, 0.0, -20.0));

        let mut massless = Body::with_mass(0.0);
        massless.apply_impulse(Vec3::X);
        assert_eq!(massless.velocity, Vec3::ZERO);
    }

    #[test]
    fn seeded_colors_are_opaque_and_reproducible() {
        let mut a = ShotRng::new(Some(42));
        let mut b = ShotRng::new(Some(42));
        for _ in 0..16 {
            let ca = a.random_color().to_srgba();
            let cb = b.random_color().to_srgba();
            assert_eq!(ca, cb);
            assert_eq!(ca.alpha, 1.0);
            for channel in [ca.red, ca.green, ca.blue] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn reloaded_seed_reseeds_colors() {
        let mut settings = Settings::default();
        settings.projectile.seed = Some(1);
        let mut app = App::new();
        app.insert_resource(settings)
            .insert_resource(ShotRng::new(Some(1)))
            .add_systems(Update, sync_shot_seed);
        app.update();
        assert_eq!(app.world().resource::<ShotRng>().seed(), Some(1));

        app.world_mut().resource_mut::<Settings>().projectile.seed = Some(99);
        app.update();

        let mut expected = ShotRng::new(Some(99));
        let mut rng = app.world_mut().resource_mut::<ShotRng>();
        assert_eq!(rng.seed(), Some(99));
        assert_eq!(rng.random_color(), expected.random_color());
    }

    #[test]
    fn unchanged_seed_keeps_the_sequence() {
        let mut settings = Settings::default();
        settings.projectile.seed = Some(5);
        let mut app = App::new();
        app.insert_resource(settings)
            .insert_resource(ShotRng::new(Some(5)))
            .add_systems(Update, sync_shot_seed);

        let mut reference = ShotRng::new(Some(5));
        let first = app.world_mut().resource_mut::<ShotRng>().random_color();
        assert_eq!(first, reference.random_color());

        // a reload with the same seed must not restart the colour sequence
        app.world_mut().resource_mut::<Settings>().set_changed();
        app.update();
        let second = app.world_mut().resource_mut::<ShotRng>().random_color();
        assert_eq!(second, reference.random_color());
    }

    #[test]
    fn projectiles_expire_after_their_lifetime() {
        use bevy::time::TimeUpdateStrategy;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)))
            .add_systems(Update, (drift_projectiles, expire_projectiles).chain());
        app.update();

        let mut s = settings();
        s.lifetime = 0.5;
        let mut rng = ShotRng::new(Some(1));
        let mut queue = bevy::ecs::world::CommandQueue::default();
        let shot = {
            let mut commands = Commands::new(&mut queue, app.world());
            spawn_projectile(&mut commands, &Transform::IDENTITY, &s, &mut rng)
        };
        queue.apply(app.world_mut());

        app.update();
        let z = app.world().entity(shot).get::<Transform>().unwrap().translation.z;
        assert!((z - (-0.6 - 20.0 * 0.2)).abs() < 1e-3);

        app.update();
        assert!(app.world().get_entity(shot).is_some());
        app.update();
        assert!(app.world().get_entity(shot).is_none());
    }

    #[test]
    fn visuals_are_attached_to_new_projectiles() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_plugins(ProjectileRenderPlugin);
        app.update();

        let shot = app
            .world_mut()
            .spawn((Projectile, ProjectileColor(Color::srgb(1.0, 0.0, 0.0))))
            .id();
        app.update();

        let entity = app.world().entity(shot);
        assert!(entity.get::<Handle<Mesh>>().is_some());
        let material = entity.get::<Handle<StandardMaterial>>().unwrap();
        let base = app.world().resource::<Assets<StandardMaterial>>().get(material).unwrap().base_color;
        assert_eq!(base, Color::srgb(1.0, 0.0, 0.0));
    }
}
