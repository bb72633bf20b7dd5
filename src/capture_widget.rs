pub mod core;
mod main;
mod render;
mod run_effect;

pub use main::CameraUpload;
