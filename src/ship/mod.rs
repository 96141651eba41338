//! Player ship components and systems (flight, free look, firing).
//!
//! Input reaches the ship as `MoveInput`, `LookInput` and `FireInput` events;
//! the ship stores the latest axes in `ShipInput` and consumes them once per
//! frame in `fly_ships`. Anything that tracks ship death sends
//! `ShipDestroyed` to freeze the flight controls for good.
//!
//! # Example
//!
//! ```ignore
//! commands.spawn((ShipBundle::default(), SpatialBundle::default()));
//! app.add_plugins(ShipPlugin);
//! ```
pub mod fire;
pub mod flight;
pub mod look;
pub mod projectile;

use bevy::prelude::*;

pub use fire::*;
pub use flight::*;
pub use look::*;
pub use projectile::*;

use crate::settings::Settings;

/// Marks the player-controlled ship.
#[derive(Component, Default)]
pub struct Ship;

/// Latest input axes delivered to the ship, read once per frame.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct ShipInput {
    /// Stick deflection, x right and y up, each in [-1, 1].
    pub move_axis: Vec2,
    /// Look deflection; only used when free look is enabled.
    pub look_axis: Vec2,
}

/// One-way latch gating the per-frame flight update.
#[derive(Component, Debug)]
pub struct ShipControls {
    enabled: bool,
}

impl Default for ShipControls {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ShipControls {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disable the controls. There is no way back. Returns whether this call
    /// changed anything.
    pub fn disable(&mut self) -> bool {
        std::mem::replace(&mut self.enabled, false)
    }
}

#[derive(Bundle, Default)]
pub struct ShipBundle {
    pub ship: Ship,
    pub input: ShipInput,
    pub controls: ShipControls,
    pub fire: FireController,
    pub look: ShipLook,
}

/// New move axis from the input layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct MoveInput(pub Vec2);

/// New look axis from the input layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct LookInput(pub Vec2);

/// Phase-tagged fire action from the input layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct FireInput(pub FireEvent);

/// Sent by whatever system decides the ship is dead.
#[derive(Event, Debug, Clone, Copy)]
pub struct ShipDestroyed {
    pub ship: Entity,
}

#[allow(clippy::needless_pass_by_value)]
pub fn record_move_input(mut events: EventReader<MoveInput>, mut ships: Query<&mut ShipInput, With<Ship>>) {
    let Some(MoveInput(axis)) = events.read().last().copied() else { return };
    for mut input in &mut ships {
        input.move_axis = axis;
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn record_look_input(mut events: EventReader<LookInput>, mut ships: Query<&mut ShipInput, With<Ship>>) {
    let Some(LookInput(axis)) = events.read().last().copied() else { return };
    for mut input in &mut ships {
        input.look_axis = axis;
    }
}

/// Latch the controls of destroyed ships.
pub fn freeze_on_destroyed(mut events: EventReader<ShipDestroyed>, mut ships: Query<&mut ShipControls>) {
    for ev in events.read() {
        let Ok(mut controls) = ships.get_mut(ev.ship) else { continue };
        if controls.disable() {
            info!("froze controls of {:?}", ev.ship);
        }
    }
}

/// Per-frame flight update: translate, then tilt, then optional free look.
#[allow(clippy::needless_pass_by_value)]
pub fn fly_ships(
    time: Res<Time>,
    settings: Res<Settings>,
    mut ships: Query<(&mut Transform, &ShipInput, &ShipControls, Option<&mut ShipLook>), With<Ship>>,
) {
    let dt = time.delta_seconds();
    let tuning = &settings.ship;
    for (mut transform, input, controls, look) in &mut ships {
        if !controls.enabled() {
            continue;
        }
        flight_step(&mut transform, input.move_axis, dt, tuning);

        if tuning.free_look
            && let Some(mut look) = look
            && look.apply_delta(input.look_axis, tuning.rotate_speed, dt)
        {
            transform.rotation = look.rotation();
        }
    }
}

/// Registers ship events, the shot RNG and the ship systems. The RNG is
/// seeded from `projectile.seed` and reseeded when a reload changes it.
pub struct ShipPlugin;

impl Plugin for ShipPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ShotRng>() {
            let seed = app
                .world()
                .get_resource::<Settings>()
                .and_then(|s| s.projectile.seed);
            app.insert_resource(ShotRng::new(seed));
        }

        app.add_event::<MoveInput>()
            .add_event::<LookInput>()
            .add_event::<FireInput>()
            .add_event::<ShipDestroyed>()
            .add_event::<CancelBursts>()
            .add_systems(
                Update,
                (
                    sync_shot_seed,
                    record_move_input,
                    record_look_input,
                    freeze_on_destroyed,
                    fly_ships,
                    handle_fire_input,
                    cancel_bursts,
                    run_bursts,
                    drift_projectiles,
                    expire_projectiles,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn ship_app() -> App {
        let mut settings = Settings::default();
        settings.projectile.seed = Some(7);
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .insert_resource(settings)
            .add_plugins(ShipPlugin);
        // prime the clock so later frames carry a full delta
        app.update();
        app
    }

    fn spawn_ship(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((ShipBundle::default(), Transform::default()))
            .id()
    }

    fn projectiles(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<(), With<Projectile>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn disable_is_a_one_way_latch() {
        let mut controls = ShipControls::default();
        assert!(controls.enabled());
        assert!(controls.disable());
        assert!(!controls.disable());
        assert!(!controls.enabled());
    }

    #[test]
    fn move_input_drives_the_ship() {
        let mut app = ship_app();
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(MoveInput(Vec2::new(1.0, 0.0)));
        app.update();

        let tf = *app.world().entity(ship).get::<Transform>().unwrap();
        assert!((tf.translation.x - 1.0).abs() < 1e-4);
        assert_eq!(tf.translation.y, 0.0);
        assert_ne!(tf.rotation, Quat::IDENTITY);
    }

    #[test]
    fn free_look_overrides_tilt_when_enabled() {
        let mut app = ship_app();
        app.world_mut().resource_mut::<Settings>().ship.free_look = true;
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(LookInput(Vec2::X));
        app.update();

        // 90 deg/s for 0.1 s
        let tf = *app.world().entity(ship).get::<Transform>().unwrap();
        let expected = Quat::from_rotation_y(9f32.to_radians());
        assert!(tf.rotation.abs_diff_eq(expected, 1e-5));
        assert_eq!(tf.translation, Vec3::ZERO);
    }

    #[test]
    fn look_input_is_ignored_without_free_look() {
        let mut app = ship_app();
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(LookInput(Vec2::X));
        app.update();

        let tf = *app.world().entity(ship).get::<Transform>().unwrap();
        assert_eq!(tf.rotation, Quat::IDENTITY);
        assert_eq!(app.world().entity(ship).get::<ShipInput>().unwrap().look_axis, Vec2::X);
    }

    #[test]
    fn destroyed_ship_stops_responding() {
        let mut app = ship_app();
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(ShipDestroyed { ship });
        app.update();
        let before = *app.world().entity(ship).get::<Transform>().unwrap();

        app.world_mut().send_event(MoveInput(Vec2::new(-1.0, 1.0)));
        for _ in 0..5 {
            app.update();
        }

        let after = *app.world().entity(ship).get::<Transform>().unwrap();
        assert_eq!(before, after);
        assert!(!app.world().entity(ship).get::<ShipControls>().unwrap().enabled());
    }

    #[test]
    fn plain_fire_spawns_one_projectile() {
        let mut app = ship_app();
        spawn_ship(&mut app);

        app.world_mut().send_event(FireInput(FireEvent::press()));
        app.update();
        assert_eq!(projectiles(&mut app), 1);

        let body = app
            .world_mut()
            .query_filtered::<&Body, With<Projectile>>()
            .single(app.world())
            .clone();
        assert_eq!(body.mass, 1.0);
        assert!((body.velocity - Vec3::NEG_Z * 20.0).length() < 1e-4);
    }

    #[test]
    fn slow_tap_bursts_over_several_frames() {
        let mut app = ship_app();
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(FireInput(FireEvent::slow_tap_started()));
        app.update();
        assert!(app.world().entity(ship).get::<FireController>().unwrap().is_charging());

        // 0.4 s at 10 shots per second
        app.world_mut().send_event(FireInput(FireEvent::slow_tap(0.4)));
        app.update();
        assert_eq!(projectiles(&mut app), 1);
        assert_eq!(
            app.world().entity(ship).get::<FireController>().unwrap().state(),
            FireState::Bursting
        );

        for _ in 0..5 {
            app.update();
        }
        assert_eq!(projectiles(&mut app), 4);
        assert_eq!(
            app.world().entity(ship).get::<FireController>().unwrap().state(),
            FireState::Idle
        );
    }

    #[test]
    fn hot_reloaded_seed_reaches_the_shot_rng() {
        let mut app = ship_app();
        assert_eq!(app.world().resource::<ShotRng>().seed(), Some(7));

        app.world_mut().resource_mut::<Settings>().projectile.seed = Some(11);
        app.update();
        assert_eq!(app.world().resource::<ShotRng>().seed(), Some(11));
    }

    #[test]
    fn cancelled_burst_stops_firing() {
        let mut app = ship_app();
        let ship = spawn_ship(&mut app);

        app.world_mut().send_event(FireInput(FireEvent::slow_tap(1.0)));
        app.update();
        assert_eq!(projectiles(&mut app), 1);

        app.world_mut().send_event(CancelBursts { ship });
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(projectiles(&mut app), 1);
        assert_eq!(
            app.world().entity(ship).get::<FireController>().unwrap().state(),
            FireState::Idle
        );
    }
}
