use crate::binding::BoundElements;
use crate::capture_widget::core::{Effect, Event, Phase};
use crate::capture_widget::main::CameraUpload;
use crate::device_camera::interface::{CameraError, CameraSession, DeviceCamera};
use crate::device_page::interface::DevicePage;
use crate::frame_capture::{self, CaptureError};
use crate::library::logger::interface::Logger;
use futures::task::LocalSpawnExt;
use std::future::Future;
use std::rc::Rc;

impl<P, C> CameraUpload<P, C>
where
    P: DevicePage + 'static,
    C: DeviceCamera<Session = P::Stream> + 'static,
{
    pub(super) fn run_effect(
        &self,
        key: &str,
        elements: &BoundElements<P::Element>,
        logger: &Rc<dyn Logger>,
        effect: Effect<P::Stream>,
    ) {
        match effect {
            Effect::AcquireCamera => {
                let request = self.inner.camera.acquire(&self.inner.config.constraints);
                let inner = Rc::downgrade(&self.inner);
                let group = key.to_string();
                let spawned = self.spawn(async move {
                    let result = request.await;
                    match inner.upgrade() {
                        Some(inner) => CameraUpload::from_inner(inner)
                            .dispatch(&group, Event::CameraStartDone(result)),
                        None => {
                            if let Ok(session) = result {
                                session.stop();
                            }
                        }
                    }
                });
                if let Err(error) = spawned {
                    self.dispatch(
                        key,
                        Event::CameraStartDone(Err(CameraError::Unavailable(error))),
                    );
                }
            }
            Effect::AttachStream => {
                let playback = self
                    .inner
                    .groups
                    .borrow()
                    .get(key)
                    .and_then(|group| group.state.session())
                    .map(|session| self.inner.page.attach_stream(&elements.video, session));
                let Some(playback) = playback else {
                    logger.warn("No stream to attach");
                    return;
                };

                let logger_playback = logger.clone();
                let spawned = self.spawn(async move {
                    if let Err(error) = playback.await {
                        logger_playback.warn(&format!("Video autoplay failed: {}", error));
                    }
                });
                if let Err(error) = spawned {
                    logger.warn(&format!("Could not watch playback: {}", error));
                }
            }
            Effect::DetachStream => {
                if let Err(error) = self.inner.page.detach_stream(&elements.video) {
                    logger.warn(&format!("Could not detach stream: {}", error));
                }
            }
            Effect::StopSession(session) => {
                session.stop();
                logger.info("Camera stream stopped");
            }
            Effect::CaptureFrame(size) => {
                let inner = Rc::downgrade(&self.inner);
                let group = key.to_string();
                let elements = elements.clone();
                let spawned = self.spawn(async move {
                    let Some(inner) = inner.upgrade() else {
                        return;
                    };
                    let upload = CameraUpload::from_inner(inner);
                    if upload.phase(&group) != Some(Phase::Capturing) {
                        return;
                    }
                    let result = frame_capture::capture(
                        &*upload.inner.page,
                        &upload.inner.config,
                        &group,
                        &elements,
                        size,
                    );
                    upload.dispatch(&group, Event::FrameCaptureDone(result));
                });
                if let Err(error) = spawned {
                    self.dispatch(
                        key,
                        Event::FrameCaptureDone(Err(CaptureError::Unscheduled(error))),
                    );
                }
            }
            Effect::InstallFile(image) => {
                match self.inner.page.install_file(&elements.upload_input, &image) {
                    Ok(()) => logger.info(&format!(
                        "Installed {} ({} bytes)",
                        image.file_name,
                        image.bytes.len()
                    )),
                    Err(error) => logger.error(&format!(
                        "Could not install {}: {}",
                        image.file_name, error
                    )),
                }
            }
            Effect::Notify(message) => self.inner.page.alert(&message),
            Effect::Log(level, message) => logger.log(level, &message),
        }
    }

    fn spawn(&self, future: impl Future<Output = ()> + 'static) -> Result<(), String> {
        self.inner
            .spawner
            .spawn_local(future)
            .map_err(|error| error.to_string())
    }
}
