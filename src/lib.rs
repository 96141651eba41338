pub mod input;
pub mod ron;
pub mod scene;
pub mod settings;
pub mod ship;
pub mod ui;
