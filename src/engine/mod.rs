pub mod assets;
pub mod camera;
pub mod core;
pub mod model;
pub mod render;
pub mod scene;
pub mod systems;
