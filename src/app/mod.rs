pub mod hazards;
pub mod scenes;
pub mod visuals;

pub use hazards::self_destruct_on_key;
pub use scenes::{build_level, build_splash, scene_registry};
pub use visuals::{attach_ship_visuals, setup_ship_assets};
