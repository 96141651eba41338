//! Index-based scene switching and the delayed splash transition.
//!
//! A scene is a set of entities tagged with `SceneMember`, created by a
//! builder function registered in `SceneRegistry` under a numeric index.
//! Sending `LoadScene` replaces the current scene with the requested one.
//! `SceneTransitioner` is the one-shot delay that sends that request after
//! the splash has been shown.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = SceneRegistry::default();
//! registry.register(0, build_splash);
//! registry.register(1, build_level);
//! app.insert_resource(registry).add_plugins(SceneFlowPlugin);
//! ```

use crate::settings::{secs_to_duration, SceneSettings, Settings};
use bevy::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Builds the entities of one scene. Every spawned root must carry `SceneMember`.
pub type SceneBuilder = fn(&mut Commands, &Settings);

/// Marks entities owned by the active scene; all of them are despawned on a scene load.
#[derive(Component, Default)]
pub struct SceneMember;

/// Request to replace the current scene with the scene registered under `index`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadScene {
    pub index: usize,
}

/// Index of the scene currently loaded, `None` before the first load.
#[derive(Resource, Default, Debug)]
pub struct ActiveScene(pub Option<usize>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    UnknownScene(usize),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownScene(index) => write!(f, "no scene registered at index {index}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Scene builders keyed by index.
#[derive(Resource, Default)]
pub struct SceneRegistry {
    builders: HashMap<usize, SceneBuilder>,
}

impl SceneRegistry {
    /// Register (or replace) the builder for `index`.
    pub fn register(&mut self, index: usize, builder: SceneBuilder) -> &mut Self {
        self.builders.insert(index, builder);
        self
    }

    /// # Errors
    /// Returns `SceneError::UnknownScene` when nothing is registered at `index`.
    pub fn get(&self, index: usize) -> Result<SceneBuilder, SceneError> {
        self.builders.get(&index).copied().ok_or(SceneError::UnknownScene(index))
    }
}

/// One-shot delayed scene load.
///
/// Starts counting when the component is spawned and requests its target
/// scene exactly once when the delay elapses.
#[derive(Component, Debug)]
pub struct SceneTransitioner {
    timer: Timer,
    target: usize,
}

impl SceneTransitioner {
    #[must_use]
    pub fn new(delay: Duration, target: usize) -> Self {
        Self {
            timer: Timer::new(delay, TimerMode::Once),
            target,
        }
    }

    /// Build the transitioner described by the scene settings. Negative or
    /// NaN delays fire on the first tick; oversized ones saturate.
    #[must_use]
    pub fn from_settings(settings: &SceneSettings) -> Self {
        Self::new(secs_to_duration(settings.transition_delay), settings.target_index)
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Advance the delay by `delta`. Returns the target index on the tick the
    /// delay completes and `None` on every other tick, including later ones.
    pub fn tick(&mut self, delta: Duration) -> Option<usize> {
        self.timer.tick(delta).just_finished().then_some(self.target)
    }
}

/// Tick every transitioner and send `LoadScene` for the ones that completed.
#[allow(clippy::needless_pass_by_value)]
pub fn tick_scene_transitioners(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut SceneTransitioner)>,
    mut loads: EventWriter<LoadScene>,
) {
    for (entity, mut transitioner) in &mut query {
        if let Some(index) = transitioner.tick(time.delta()) {
            info!("scene transition: requesting scene {index}");
            loads.send(LoadScene { index });
            commands.entity(entity).remove::<SceneTransitioner>();
        }
    }
}

/// Replace the active scene when a `LoadScene` request arrives.
///
/// Only the last request of a frame is honoured. A request for an unknown
/// index is logged and the current scene stays in place.
///
/// # Arguments
/// * `requests` - Pending `LoadScene` events; all are drained, the last one wins.
/// * `registry` - Builders keyed by scene index.
/// * `settings` - Passed through to the scene builder.
/// * `members` - Entities of the current scene, despawned before the build.
/// * `active` - Updated to the loaded index on success.
///
/// # Return
/// Nothing; the new scene's entities are spawned through `commands`.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_scene_loads(
    mut commands: Commands,
    mut requests: EventReader<LoadScene>,
    registry: Res<SceneRegistry>,
    settings: Res<Settings>,
    members: Query<Entity, With<SceneMember>>,
    mut active: ResMut<ActiveScene>,
) {
    let Some(request) = requests.read().last().copied() else { return };

    let build = match registry.get(request.index) {
        Ok(build) => build,
        Err(e) => {
            error!("scene load failed: {e}");
            return;
        }
    };

    let mut despawned = 0usize;
    for entity in &members {
        commands.entity(entity).despawn_recursive();
        despawned += 1;
    }
    build(&mut commands, &settings);
    info!("loaded scene {} (replaced {despawned} entities)", request.index);
    active.0 = Some(request.index);
}

/// Request scene 0 on startup.
pub fn load_initial_scene(mut loads: EventWriter<LoadScene>) {
    loads.send(LoadScene { index: 0 });
}

/// Registers scene events, resources and systems. The app supplies the
/// `SceneRegistry` contents.
pub struct SceneFlowPlugin;

impl Plugin for SceneFlowPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LoadScene>()
            .init_resource::<ActiveScene>()
            .init_resource::<SceneRegistry>()
            .add_systems(Startup, load_initial_scene)
            .add_systems(Update, (tick_scene_transitioners, apply_scene_loads).chain());
    }
}
