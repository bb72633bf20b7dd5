//! Camera access through `navigator.mediaDevices.getUserMedia`.

use crate::device_camera::interface::{CameraError, CameraSession, DeviceCamera, StreamConstraints};
use crate::library::logger::interface::Logger;
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Object, Promise, Reflect};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, MediaStream, MediaStreamConstraints, MediaStreamTrack, MediaStreamTrackState};

#[derive(Debug, Clone, PartialEq)]
pub struct WebSession {
    stream: MediaStream,
}

impl WebSession {
    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    fn tracks(&self) -> Vec<MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }
}

impl CameraSession for WebSession {
    fn stop(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }

    fn live_tracks(&self) -> usize {
        self.tracks()
            .into_iter()
            .filter(|track| track.ready_state() == MediaStreamTrackState::Live)
            .count()
    }
}

pub struct DeviceCameraWeb {
    logger: Rc<dyn Logger>,
}

impl DeviceCameraWeb {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("web"),
        }
    }
}

impl DeviceCamera for DeviceCameraWeb {
    type Session = WebSession;

    fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> LocalBoxFuture<'static, Result<WebSession, CameraError>> {
        self.logger.debug(&format!("Requesting camera {:?}", constraints));
        let request = request_stream(constraints);

        async move {
            let stream = JsFuture::from(request?).await.map_err(camera_error)?;
            let stream = stream.dyn_into::<MediaStream>().map_err(|_| {
                CameraError::Unavailable("getUserMedia resolved to a non-stream value".to_string())
            })?;
            Ok(WebSession { stream })
        }
        .boxed_local()
    }
}

fn request_stream(constraints: &StreamConstraints) -> Result<Promise, CameraError> {
    let window = web_sys::window()
        .ok_or_else(|| CameraError::Unavailable("window is unavailable".to_string()))?;
    let devices = window.navigator().media_devices().map_err(camera_error)?;

    let video = Object::new();
    set(&video, "facingMode", &JsValue::from_str(constraints.facing_mode.as_str()))?;
    set(&video, "width", &ideal(constraints.ideal_width)?)?;
    set(&video, "height", &ideal(constraints.ideal_height)?)?;

    let request = MediaStreamConstraints::new();
    request.set_video(&video);
    request.set_audio(&JsValue::from_bool(constraints.audio));

    devices
        .get_user_media_with_constraints(&request)
        .map_err(camera_error)
}

fn ideal(value: u32) -> Result<Object, CameraError> {
    let object = Object::new();
    set(&object, "ideal", &JsValue::from(value))?;
    Ok(object)
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), CameraError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(camera_error)
}

fn camera_error(error: JsValue) -> CameraError {
    match error.dyn_ref::<DomException>().map(|exception| exception.name()) {
        Some(name) if name == "NotAllowedError" || name == "SecurityError" => {
            CameraError::PermissionDenied
        }
        Some(name) if name == "NotFoundError" || name == "OverconstrainedError" => {
            CameraError::NotFound
        }
        Some(name) => CameraError::Unavailable(name),
        None => CameraError::Unavailable(format!("{:?}", error)),
    }
}
