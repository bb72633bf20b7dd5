//! Turns a device camera into a file-upload source on a web page.
//!
//! Host markup marks five cooperating elements per widget group (start,
//! capture and cancel controls, a video surface and a canvas) plus a
//! container holding a file input. The widget finds and binds those groups
//! whenever they appear, streams the rear camera into the video surface on
//! start, and on capture installs a JPEG still into the file input as if the
//! user had picked it by hand.

pub mod binding;
pub mod capture_widget;
pub mod config;
pub mod device_camera;
pub mod device_page;
pub mod frame_capture;
pub mod library;
pub mod rebind;
#[cfg(target_arch = "wasm32")]
mod web;

pub use capture_widget::CameraUpload;
pub use config::Config;
