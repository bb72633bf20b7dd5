use crate::config::Config;
use crate::device_camera::interface::CameraError;
use crate::device_page::interface::FrameSize;
use crate::frame_capture::{CaptureError, CapturedImage};
use crate::library::logger::interface::Level;

/// Per-group capture state. The live session is owned here and only here;
/// any transition out of `Streaming` or `Capturing` hands it to a
/// `StopSession` effect.
#[derive(Debug, PartialEq)]
pub enum State<S> {
    Idle,
    /// Camera requested, answer not in yet. Looks exactly like `Idle`.
    Starting,
    Streaming { session: S },
    /// A still is being read and encoded off the click handler. Looks
    /// exactly like `Streaming`.
    Capturing { session: S },
}

impl<S> Default for State<S> {
    fn default() -> Self {
        State::Idle
    }
}

impl<S> State<S> {
    pub fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Starting => Phase::Starting,
            State::Streaming { .. } => Phase::Streaming,
            State::Capturing { .. } => Phase::Capturing,
        }
    }

    pub fn session(&self) -> Option<&S> {
        match self {
            State::Streaming { session } | State::Capturing { session } => Some(session),
            State::Idle | State::Starting => None,
        }
    }

    pub fn into_session(self) -> Option<S> {
        match self {
            State::Streaming { session } | State::Capturing { session } => Some(session),
            State::Idle | State::Starting => None,
        }
    }
}

/// Session-free view of [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Streaming,
    Capturing,
}

#[derive(Debug)]
pub enum Event<S> {
    StartClicked,
    CameraStartDone(Result<S, CameraError>),
    CaptureClicked(FrameSize),
    FrameCaptureDone(Result<CapturedImage, CaptureError>),
    CancelClicked,
    PageUnload,
}

impl<S> Event<S> {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StartClicked => "StartClicked",
            Event::CameraStartDone(Ok(_)) => "CameraStartDone(Ok)",
            Event::CameraStartDone(Err(_)) => "CameraStartDone(Err)",
            Event::CaptureClicked(_) => "CaptureClicked",
            Event::FrameCaptureDone(Ok(_)) => "FrameCaptureDone(Ok)",
            Event::FrameCaptureDone(Err(_)) => "FrameCaptureDone(Err)",
            Event::CancelClicked => "CancelClicked",
            Event::PageUnload => "PageUnload",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Effect<S> {
    AcquireCamera,
    AttachStream,
    DetachStream,
    StopSession(S),
    CaptureFrame(FrameSize),
    InstallFile(CapturedImage),
    Notify(String),
    Log(Level, String),
}

pub fn init<S>() -> State<S> {
    State::Idle
}

pub fn transition<S>(config: &Config, state: State<S>, event: Event<S>) -> (State<S>, Vec<Effect<S>>) {
    match (state, event) {
        (State::Idle, Event::StartClicked) => (State::Starting, vec![Effect::AcquireCamera]),

        (State::Starting, Event::CameraStartDone(Ok(session))) => (
            State::Streaming { session },
            vec![
                Effect::AttachStream,
                Effect::Log(Level::Info, "Camera stream started".to_string()),
            ],
        ),
        (State::Starting, Event::CameraStartDone(Err(error))) => (
            State::Idle,
            vec![
                Effect::Log(Level::Error, format!("Camera access failed: {}", error)),
                Effect::Notify(config.camera_failure_message.clone()),
            ],
        ),
        // The request was abandoned (cancel or unload) while in flight.
        (state, Event::CameraStartDone(Ok(session))) => (
            state,
            vec![
                Effect::Log(
                    Level::Info,
                    "Camera stream arrived after the request was abandoned, stopping it".to_string(),
                ),
                Effect::StopSession(session),
            ],
        ),
        (state, Event::CameraStartDone(Err(error))) => (
            state,
            vec![Effect::Log(
                Level::Debug,
                format!("Ignoring late camera failure: {}", error),
            )],
        ),

        (State::Streaming { session }, Event::CaptureClicked(size)) => {
            if size.is_empty() {
                (
                    State::Streaming { session },
                    vec![Effect::Log(
                        Level::Warn,
                        "Video has not produced a frame yet, capture ignored".to_string(),
                    )],
                )
            } else {
                (State::Capturing { session }, vec![Effect::CaptureFrame(size)])
            }
        }
        (State::Capturing { session }, Event::FrameCaptureDone(Ok(image))) => (
            State::Idle,
            vec![
                Effect::InstallFile(image),
                Effect::StopSession(session),
                Effect::DetachStream,
            ],
        ),
        (State::Capturing { session }, Event::FrameCaptureDone(Err(error))) => {
            let level = match error {
                CaptureError::NotReady => Level::Warn,
                _ => Level::Error,
            };
            (
                State::Streaming { session },
                vec![Effect::Log(level, format!("Frame capture failed: {}", error))],
            )
        }

        (
            State::Streaming { session } | State::Capturing { session },
            Event::CancelClicked | Event::PageUnload,
        ) => (
            State::Idle,
            vec![Effect::StopSession(session), Effect::DetachStream],
        ),
        (State::Starting, Event::CancelClicked | Event::PageUnload) => (State::Idle, vec![]),

        (state, Event::FrameCaptureDone(Ok(image))) => (
            state,
            vec![Effect::Log(
                Level::Debug,
                format!("Discarding {} captured outside a capture", image.file_name),
            )],
        ),

        // Start while busy, capture outside a stream or while one is being
        // encoded, cancel or unload while idle.
        (state, _) => (state, vec![]),
    }
}
