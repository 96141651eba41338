//! Fire action handling: single shots, charging and timed bursts.
//!
//! `FireController::handle` is the state machine over fire events. A plain
//! performed event fires once. A slow tap that starts marks the ship as
//! charging, and when it is performed it turns into a `BurstSequence` entity
//! that fires `floor(hold * burst_speed)` shots one interval apart.
//! Overlapping bursts are allowed; each runs to completion unless cancelled.

use bevy::prelude::*;
use std::time::Duration;

use crate::settings::{secs_to_duration, Settings};
use crate::ship::projectile::{spawn_projectile, ShotRng};
use crate::ship::Ship;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirePhase {
    Started,
    Performed,
    Canceled,
}

/// Which input recognizer produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireInteraction {
    Press,
    Tap,
    SlowTap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireEvent {
    pub phase: FirePhase,
    pub interaction: FireInteraction,
    /// Seconds the button was held; zero for events that carry no hold.
    pub duration: f32,
}

impl FireEvent {
    #[must_use]
    pub fn press() -> Self {
        Self { phase: FirePhase::Performed, interaction: FireInteraction::Press, duration: 0.0 }
    }

    #[must_use]
    pub fn tap(duration: f32) -> Self {
        Self { phase: FirePhase::Performed, interaction: FireInteraction::Tap, duration }
    }

    #[must_use]
    pub fn slow_tap_started() -> Self {
        Self { phase: FirePhase::Started, interaction: FireInteraction::SlowTap, duration: 0.0 }
    }

    #[must_use]
    pub fn slow_tap(duration: f32) -> Self {
        Self { phase: FirePhase::Performed, interaction: FireInteraction::SlowTap, duration }
    }

    #[must_use]
    pub fn canceled(interaction: FireInteraction, duration: f32) -> Self {
        Self { phase: FirePhase::Canceled, interaction, duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireState {
    Idle,
    Charging,
    Bursting,
}

/// What the caller must do after a fire event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireCommand {
    None,
    Single,
    Burst(u32),
}

/// Number of burst shots for a hold of `duration` seconds.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn burst_count(duration: f32, burst_speed: f32) -> u32 {
    let shots = (duration * burst_speed).floor();
    if shots.is_finite() && shots > 0.0 { shots as u32 } else { 0 }
}

#[derive(Component, Debug, Default)]
pub struct FireController {
    charging: bool,
    active_bursts: u32,
}

impl FireController {
    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.charging
    }

    #[must_use]
    pub fn state(&self) -> FireState {
        if self.charging {
            FireState::Charging
        } else if self.active_bursts > 0 {
            FireState::Bursting
        } else {
            FireState::Idle
        }
    }

    pub fn handle(&mut self, event: &FireEvent, burst_speed: f32) -> FireCommand {
        match event.phase {
            FirePhase::Started => {
                if event.interaction == FireInteraction::SlowTap {
                    self.charging = true;
                }
                FireCommand::None
            }
            FirePhase::Performed => {
                self.charging = false;
                if event.interaction != FireInteraction::SlowTap {
                    return FireCommand::Single;
                }
                match burst_count(event.duration, burst_speed) {
                    0 => FireCommand::None,
                    n => FireCommand::Burst(n),
                }
            }
            FirePhase::Canceled => {
                self.charging = false;
                FireCommand::None
            }
        }
    }
}

/// A running burst: fires its first shot on the frame it starts, then one
/// shot per interval until `remaining` reaches zero.
#[derive(Component, Debug)]
pub struct BurstSequence {
    owner: Entity,
    remaining: u32,
    interval: Duration,
    until_next: Duration,
    started: bool,
}

impl BurstSequence {
    #[must_use]
    pub fn new(owner: Entity, shots: u32, interval: Duration) -> Self {
        Self { owner, remaining: shots, interval, until_next: Duration::ZERO, started: false }
    }

    #[must_use]
    pub fn owner(&self) -> Entity {
        self.owner
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Advance by `delta` and return how many shots are due. The first call
    /// ignores `delta`, since that time elapsed before the burst existed.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let mut budget = if self.started { delta } else { Duration::ZERO };
        self.started = true;

        let mut shots = 0;
        while self.remaining > 0 {
            if self.until_next > budget {
                self.until_next -= budget;
                break;
            }
            budget -= self.until_next;
            self.until_next = self.interval;
            self.remaining -= 1;
            shots += 1;
        }
        shots
    }
}

/// Handle to a spawned burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstHandle(pub Entity);

impl BurstHandle {
    /// Stop the burst; shots already fired stay in the world.
    pub fn cancel(self, commands: &mut Commands) {
        if let Some(mut entity) = commands.get_entity(self.0) {
            entity.despawn();
        }
    }
}

/// Stop every burst owned by `ship`.
#[derive(Event, Debug, Clone, Copy)]
pub struct CancelBursts {
    pub ship: Entity,
}

pub fn spawn_burst(commands: &mut Commands, owner: Entity, shots: u32, interval: Duration) -> BurstHandle {
    BurstHandle(commands.spawn(BurstSequence::new(owner, shots, interval)).id())
}

/// Apply fire events to every ship.
///
/// A performed press or tap fires one projectile right away. A performed
/// slow tap spawns a `BurstSequence` that `run_bursts` plays out.
///
/// # Arguments
/// * `events` - Fire events from the input layer, handled in order.
/// * `settings` - Supplies `burst_speed`, `burst_interval` and the launch parameters.
/// * `rng` - Colour source for new projectiles.
/// * `ships` - Every ship with a `FireController`; each one reacts to every event.
///
/// # Return
/// Nothing; projectiles and bursts are spawned through `commands`.
#[allow(clippy::needless_pass_by_value)]
pub fn handle_fire_input(
    mut commands: Commands,
    mut events: EventReader<crate::ship::FireInput>,
    settings: Res<Settings>,
    mut rng: ResMut<ShotRng>,
    mut ships: Query<(Entity, &Transform, &mut FireController), With<Ship>>,
) {
    for ev in events.read() {
        for (entity, transform, mut controller) in &mut ships {
            match controller.handle(&ev.0, settings.ship.burst_speed) {
                FireCommand::None => {}
                FireCommand::Single => {
                    spawn_projectile(&mut commands, transform, &settings.projectile, &mut rng);
                }
                FireCommand::Burst(shots) => {
                    let interval = secs_to_duration(settings.projectile.burst_interval);
                    let handle = spawn_burst(&mut commands, entity, shots, interval);
                    debug!("burst of {shots} started for {entity:?} as {:?}", handle.0);
                }
            }
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn cancel_bursts(
    mut commands: Commands,
    mut events: EventReader<CancelBursts>,
    bursts: Query<(Entity, &BurstSequence)>,
) {
    for ev in events.read() {
        for (entity, burst) in &bursts {
            if burst.owner() == ev.ship {
                debug!("burst {entity:?} cancelled with {} shots left", burst.remaining());
                BurstHandle(entity).cancel(&mut commands);
            }
        }
    }
}

/// Drive running bursts and keep each ship's burst count current.
///
/// # Arguments
/// * `time` - Frame delta used to advance every `BurstSequence`.
/// * `settings` - Launch parameters for the shots fired this frame.
/// * `rng` - Colour source for new projectiles.
/// * `bursts` - Running bursts; finished ones and those whose owner is gone are despawned.
/// * `ships` - Owners; `active_bursts` is recounted from scratch every frame.
///
/// # Return
/// Nothing; shots are spawned from the owner's current transform.
#[allow(clippy::needless_pass_by_value)]
pub fn run_bursts(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<Settings>,
    mut rng: ResMut<ShotRng>,
    mut bursts: Query<(Entity, &mut BurstSequence)>,
    mut ships: Query<(&Transform, &mut FireController)>,
) {
    for (_, mut controller) in &mut ships {
        controller.active_bursts = 0;
    }

    for (entity, mut burst) in &mut bursts {
        let Ok((transform, mut controller)) = ships.get_mut(burst.owner()) else {
            commands.entity(entity).despawn();
            continue;
        };

        for _ in 0..burst.advance(time.delta()) {
            spawn_projectile(&mut commands, transform, &settings.projectile, &mut rng);
        }

        if burst.is_finished() {
            commands.entity(entity).despawn();
        } else {
            controller.active_bursts += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENTH: Duration = Duration::from_millis(100);

    #[test]
    fn plain_press_fires_once() {
        let mut c = FireController::default();
        assert_eq!(c.handle(&FireEvent::press(), 10.0), FireCommand::Single);
        assert_eq!(c.state(), FireState::Idle);
        assert_eq!(c.handle(&FireEvent::tap(0.1), 10.0), FireCommand::Single);
    }

    #[test]
    fn slow_tap_charges_then_bursts() {
        let mut c = FireController::default();
        assert_eq!(c.handle(&FireEvent::slow_tap_started(), 10.0), FireCommand::None);
        assert!(c.is_charging());
        assert_eq!(c.state(), FireState::Charging);
        assert_eq!(c.handle(&FireEvent::slow_tap(0.75), 10.0), FireCommand::Burst(7));
        assert!(!c.is_charging());
    }

    #[test]
    fn cancel_ends_charging_without_firing() {
        let mut c = FireController::default();
        c.handle(&FireEvent::slow_tap_started(), 10.0);
        let cmd = c.handle(&FireEvent::canceled(FireInteraction::SlowTap, 0.3), 10.0);
        assert_eq!(cmd, FireCommand::None);
        assert_eq!(c.state(), FireState::Idle);
    }

    #[test]
    fn started_press_does_not_charge() {
        let mut c = FireController::default();
        let started = FireEvent { phase: FirePhase::Started, interaction: FireInteraction::Press, duration: 0.0 };
        c.handle(&started, 10.0);
        assert!(!c.is_charging());
    }

    #[test]
    fn burst_count_floors_and_rejects_garbage() {
        assert_eq!(burst_count(0.5, 10.0), 5);
        assert_eq!(burst_count(1.29, 10.0), 12);
        assert_eq!(burst_count(0.05, 10.0), 0);
        assert_eq!(burst_count(2.0, 0.0), 0);
        assert_eq!(burst_count(-1.0, 10.0), 0);
        assert_eq!(burst_count(f32::NAN, 10.0), 0);
    }

    #[test]
    fn short_slow_tap_fires_nothing() {
        let mut c = FireController::default();
        assert_eq!(c.handle(&FireEvent::slow_tap(0.05), 10.0), FireCommand::None);
    }

    #[test]
    fn burst_fires_first_shot_immediately() {
        let mut b = BurstSequence::new(Entity::PLACEHOLDER, 3, TENTH);
        assert_eq!(b.advance(Duration::from_secs(1)), 1);
        assert_eq!(b.remaining(), 2);
    }

    #[test]
    fn burst_shots_are_one_interval_apart() {
        let mut b = BurstSequence::new(Entity::PLACEHOLDER, 4, TENTH);
        assert_eq!(b.advance(Duration::ZERO), 1);
        assert_eq!(b.advance(Duration::from_millis(60)), 0);
        assert_eq!(b.advance(Duration::from_millis(40)), 1);
        assert_eq!(b.advance(Duration::from_millis(99)), 0);
        assert_eq!(b.advance(Duration::from_millis(1)), 1);
        assert_eq!(b.advance(TENTH), 1);
        assert!(b.is_finished());
        assert_eq!(b.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn long_frame_catches_up_on_missed_shots() {
        let mut b = BurstSequence::new(Entity::PLACEHOLDER, 10, TENTH);
        b.advance(Duration::ZERO);
        assert_eq!(b.advance(Duration::from_millis(250)), 2);
        assert_eq!(b.advance(Duration::from_millis(50)), 1);
        assert_eq!(b.remaining(), 6);
    }

    #[test]
    fn empty_burst_is_finished() {
        let mut b = BurstSequence::new(Entity::PLACEHOLDER, 0, TENTH);
        assert!(b.is_finished());
        assert_eq!(b.advance(TENTH), 0);
    }
}
