use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use skyrail::input::ShipInputPlugin;
use skyrail::scene::SceneFlowPlugin;
use skyrail::settings::loader as settings_loader;
use skyrail::ship::{ProjectileRenderPlugin, ShipPlugin};
use skyrail::ui::HudPlugin;

mod app;
use app::{attach_ship_visuals, scene_registry, self_destruct_on_key, setup_ship_assets};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "skyrail".to_string(),
            position: WindowPosition::Centered(MonitorSelection::Primary),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    // watcher creation logs through bevy, so it runs once the log plugin is up
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|e| {
            error!("settings watcher unavailable: {e}");
            settings_loader::SettingsWatcher::stub()
        });

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.insert_resource(scene_registry());

    app.add_plugins(SceneFlowPlugin)
        .add_plugins(ShipPlugin)
        .add_plugins(ShipInputPlugin)
        .add_plugins(ProjectileRenderPlugin)
        .add_plugins(HudPlugin);

    app.add_systems(Startup, setup_ship_assets);
    app.add_systems(PreUpdate, settings_loader::check_settings_changes);
    app.add_systems(Update, self_destruct_on_key);
    app.add_systems(PostUpdate, attach_ship_visuals);

    app.run();
}
