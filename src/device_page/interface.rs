use crate::device_camera::interface::CameraSession;
use crate::frame_capture::CapturedImage;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::rc::Rc;

/// The part an element plays inside a widget group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Start,
    Capture,
    Cancel,
    Video,
    Canvas,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Start => "start",
            Role::Capture => "capture",
            Role::Cancel => "cancel",
            Role::Video => "video",
            Role::Canvas => "canvas",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native resolution reported by a video surface. Zero until the stream
/// has delivered its first frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// RGBA pixels copied out of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A start control as found in the document, before any validation.
#[derive(Debug, Clone)]
pub struct StartControl<E> {
    pub element: E,
    pub group: Option<String>,
    pub upload_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PageError {
    #[error("{0} is unavailable")]
    Missing(String),

    #[error("browser call failed: {0}")]
    Js(String),
}

pub trait DevicePage {
    type Element: Clone + PartialEq + fmt::Debug + 'static;
    type Stream: CameraSession;
    /// Handle to an attached click listener, consumed by `off_click`.
    type Listener: 'static;

    /// Every start control in document order.
    fn start_controls(&self) -> Vec<StartControl<Self::Element>>;

    fn find_role(&self, group: &str, role: Role) -> Option<Self::Element>;

    /// First file input inside the element whose id is `upload_id`.
    fn find_upload_input(&self, upload_id: &str) -> Option<Self::Element>;

    fn set_display(&self, element: &Self::Element, value: &str) -> Result<(), PageError>;

    /// Runs `callback` on every click, after the default action is prevented.
    fn on_click(
        &self,
        element: &Self::Element,
        callback: Rc<dyn Fn()>,
    ) -> Result<Self::Listener, PageError>;

    fn off_click(&self, element: &Self::Element, listener: Self::Listener);

    /// Routes the stream into the video surface for muted inline playback.
    /// The returned future settles once playback has started or failed.
    fn attach_stream(
        &self,
        video: &Self::Element,
        stream: &Self::Stream,
    ) -> LocalBoxFuture<'static, Result<(), PageError>>;

    fn detach_stream(&self, video: &Self::Element) -> Result<(), PageError>;

    fn video_frame_size(&self, video: &Self::Element) -> FrameSize;

    /// Draws the current video frame onto the canvas at `size` and reads it back.
    fn read_frame(
        &self,
        video: &Self::Element,
        canvas: &Self::Element,
        size: FrameSize,
    ) -> Result<Frame, PageError>;

    /// Replaces the input's file list with `image` alone, then dispatches a
    /// single bubbling `change` event on the input.
    fn install_file(&self, input: &Self::Element, image: &CapturedImage) -> Result<(), PageError>;

    fn alert(&self, message: &str);
}
