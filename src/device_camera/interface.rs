use futures::future::LocalBoxFuture;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    Environment,
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

/// What the widget asks the device for. Widths and heights are "ideal"
/// values; the device may hand back something smaller.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
            audio: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission was denied")]
    PermissionDenied,

    #[error("no camera matching the request was found")]
    NotFound,

    #[error("camera is unavailable: {0}")]
    Unavailable(String),
}

/// A live camera stream. Dropping the handle does not release the device;
/// `stop` must be called.
pub trait CameraSession: fmt::Debug + 'static {
    /// Stops every track. Calling it again is harmless.
    fn stop(&self);

    fn live_tracks(&self) -> usize;
}

pub trait DeviceCamera {
    type Session: CameraSession;

    fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> LocalBoxFuture<'static, Result<Self::Session, CameraError>>;
}
