use crate::device_camera::interface::{CameraError, CameraSession, DeviceCamera, StreamConstraints};
use crate::library::logger::interface::Logger;
use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct FakeSession {
    id: usize,
    tracks: Rc<Vec<Cell<bool>>>,
}

impl FakeSession {
    pub fn new(id: usize, track_count: usize) -> Self {
        Self {
            id,
            tracks: Rc::new((0..track_count).map(|_| Cell::new(true)).collect()),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl PartialEq for FakeSession {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl CameraSession for FakeSession {
    fn stop(&self) {
        for track in self.tracks.iter() {
            track.set(false);
        }
    }

    fn live_tracks(&self) -> usize {
        self.tracks.iter().filter(|track| track.get()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FakeCameraMode {
    Grant,
    Deny(CameraError),
    /// Requests stay pending until `release_pending` or `deny_pending`.
    Hold,
}

type PendingRequest = oneshot::Sender<Result<FakeSession, CameraError>>;

pub struct DeviceCameraFake {
    logger: Rc<dyn Logger>,
    mode: RefCell<FakeCameraMode>,
    requests: RefCell<Vec<StreamConstraints>>,
    sessions: RefCell<Vec<FakeSession>>,
    pending: RefCell<Vec<PendingRequest>>,
}

impl DeviceCameraFake {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            mode: RefCell::new(FakeCameraMode::Grant),
            requests: RefCell::new(vec![]),
            sessions: RefCell::new(vec![]),
            pending: RefCell::new(vec![]),
        }
    }

    pub fn set_mode(&self, mode: FakeCameraMode) {
        *self.mode.borrow_mut() = mode;
    }

    pub fn requests(&self) -> Vec<StreamConstraints> {
        self.requests.borrow().clone()
    }

    /// Every session ever handed out, stopped or not.
    pub fn sessions(&self) -> Vec<FakeSession> {
        self.sessions.borrow().clone()
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions
            .borrow()
            .iter()
            .filter(|session| session.live_tracks() > 0)
            .count()
    }

    pub fn release_pending(&self) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let released = pending.len();
        for sender in pending {
            let _ = sender.send(Ok(self.open_session()));
        }
        released
    }

    pub fn deny_pending(&self, error: CameraError) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let denied = pending.len();
        for sender in pending {
            let _ = sender.send(Err(error.clone()));
        }
        denied
    }

    fn open_session(&self) -> FakeSession {
        let mut sessions = self.sessions.borrow_mut();
        let session = FakeSession::new(sessions.len() + 1, 1);
        sessions.push(session.clone());
        self.logger
            .info(&format!("Opened session {}", session.id()));
        session
    }
}

impl DeviceCamera for DeviceCameraFake {
    type Session = FakeSession;

    fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> LocalBoxFuture<'static, Result<FakeSession, CameraError>> {
        self.requests.borrow_mut().push(constraints.clone());
        let mode = self.mode.borrow().clone();
        self.logger.info(&format!("Camera requested ({:?})", mode));

        match mode {
            FakeCameraMode::Grant => future::ready(Ok(self.open_session())).boxed_local(),
            FakeCameraMode::Deny(error) => future::ready(Err(error)).boxed_local(),
            FakeCameraMode::Hold => {
                let (sender, receiver) = oneshot::channel();
                self.pending.borrow_mut().push(sender);
                async move {
                    receiver.await.unwrap_or_else(|_| {
                        Err(CameraError::Unavailable("request was dropped".to_string()))
                    })
                }
                .boxed_local()
            }
        }
    }
}
