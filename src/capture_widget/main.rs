use crate::binding::{self, BoundElements};
use crate::capture_widget::core::{init, transition, Event, Phase, State};
use crate::capture_widget::render::render;
use crate::config::Config;
use crate::device_camera::interface::{CameraSession, DeviceCamera};
use crate::device_page::interface::{DevicePage, PageError};
use crate::library::logger::interface::Logger;
use futures::task::LocalSpawn;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

pub(super) struct Group<E, S, L> {
    pub(super) elements: BoundElements<E>,
    pub(super) state: State<S>,
    pub(super) logger: Rc<dyn Logger>,
    /// Click listeners wired by this binding, removed when it is replaced.
    listeners: Vec<(E, L)>,
}

pub(super) struct Inner<P: DevicePage, C> {
    pub(super) config: Config,
    pub(super) logger: Rc<dyn Logger>,
    pub(super) page: Rc<P>,
    pub(super) camera: Rc<C>,
    pub(super) spawner: Box<dyn LocalSpawn>,
    pub(super) groups: RefCell<HashMap<String, Group<P::Element, P::Stream, P::Listener>>>,
    queue: RefCell<VecDeque<(String, Event<P::Stream>)>>,
    draining: Cell<bool>,
}

/// Binds camera widgets found on a page and drives each one's capture
/// state. Cheap to clone; clones share the same groups.
pub struct CameraUpload<P: DevicePage, C> {
    pub(super) inner: Rc<Inner<P, C>>,
}

impl<P: DevicePage, C> Clone for CameraUpload<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P, C> CameraUpload<P, C>
where
    P: DevicePage + 'static,
    C: DeviceCamera<Session = P::Stream> + 'static,
{
    pub fn new(
        config: Config,
        logger: Rc<dyn Logger>,
        page: Rc<P>,
        camera: Rc<C>,
        spawner: Box<dyn LocalSpawn>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                logger: logger.with_namespace("camera_upload"),
                page,
                camera,
                spawner,
                groups: RefCell::new(HashMap::new()),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
            }),
        }
    }

    pub(super) fn from_inner(inner: Rc<Inner<P, C>>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn logger(&self) -> Rc<dyn Logger> {
        self.inner.logger.clone()
    }

    pub fn phase(&self, group: &str) -> Option<Phase> {
        self.inner
            .groups
            .borrow()
            .get(group)
            .map(|group| group.state.phase())
    }

    pub fn bound_groups(&self) -> Vec<String> {
        let mut groups: Vec<_> = self.inner.groups.borrow().keys().cloned().collect();
        groups.sort();
        groups
    }

    /// One reconciliation pass: binds every group whose elements are all
    /// present and that is not bound to the same start control already.
    /// Returns how many groups were bound.
    pub fn scan(&self) -> usize {
        let candidates = binding::discover(self.inner.page.start_controls());
        let mut bound = 0;

        for candidate in candidates {
            let rebinding = match self.inner.groups.borrow().get(&candidate.group) {
                Some(group) if group.elements.start == candidate.start => continue,
                Some(_) => true,
                None => false,
            };

            let elements = match binding::resolve(&*self.inner.page, &candidate) {
                Ok(elements) => elements,
                Err(_) => continue,
            };

            if rebinding {
                self.inner.logger.info(&format!(
                    "Start control for `{}` was re-created, rebinding",
                    candidate.group
                ));
                self.unbind(&candidate.group);
            }

            match self.bind(&candidate.group, elements) {
                Ok(()) => bound += 1,
                Err(error) => self.inner.logger.error(&format!(
                    "Could not bind `{}`: {}",
                    candidate.group, error
                )),
            }
        }

        if bound > 0 {
            self.inner
                .logger
                .debug(&format!("Scan bound {} group(s)", bound));
        }
        bound
    }

    pub fn start(&self, group: &str) {
        self.dispatch(group, Event::StartClicked);
    }

    pub fn capture(&self, group: &str) {
        let size = match self.inner.groups.borrow().get(group) {
            Some(bound) => self.inner.page.video_frame_size(&bound.elements.video),
            None => return,
        };
        self.dispatch(group, Event::CaptureClicked(size));
    }

    pub fn cancel(&self, group: &str) {
        self.dispatch(group, Event::CancelClicked);
    }

    /// Releases every live session. Safe to call any number of times.
    pub fn teardown(&self) {
        for group in self.bound_groups() {
            self.dispatch(&group, Event::PageUnload);
        }
    }

    fn bind(&self, key: &str, elements: BoundElements<P::Element>) -> Result<(), PageError> {
        let page = &self.inner.page;
        let actions: [(&P::Element, fn(&Self, &str)); 3] = [
            (&elements.start, Self::start),
            (&elements.capture, Self::capture),
            (&elements.cancel, Self::cancel),
        ];

        let mut listeners = Vec::with_capacity(actions.len());
        for (element, action) in actions {
            match page.on_click(element, self.listener(key, action)) {
                Ok(listener) => listeners.push((element.clone(), listener)),
                Err(error) => {
                    self.release(listeners);
                    return Err(error);
                }
            }
        }

        let state = init();
        if let Err(error) = render(&**page, &self.inner.config, &elements, state.phase()) {
            self.release(listeners);
            return Err(error);
        }

        let logger = self.inner.logger.with_namespace(key);
        logger.info("Bound");
        self.inner.groups.borrow_mut().insert(
            key.to_string(),
            Group {
                elements,
                state,
                logger,
                listeners,
            },
        );
        Ok(())
    }

    fn unbind(&self, key: &str) {
        let Some(group) = self.inner.groups.borrow_mut().remove(key) else {
            return;
        };
        let Group {
            elements,
            state,
            logger,
            listeners,
        } = group;

        self.release(listeners);
        if let Some(session) = state.into_session() {
            session.stop();
            if let Err(error) = self.inner.page.detach_stream(&elements.video) {
                logger.warn(&format!("Could not detach stale stream: {}", error));
            }
            logger.info("Stopped stream of replaced elements");
        }
    }

    fn release(&self, listeners: Vec<(P::Element, P::Listener)>) {
        for (element, listener) in listeners {
            self.inner.page.off_click(&element, listener);
        }
    }

    fn listener(&self, key: &str, action: fn(&Self, &str)) -> Rc<dyn Fn()> {
        let inner: Weak<Inner<P, C>> = Rc::downgrade(&self.inner);
        let key = key.to_string();
        Rc::new(move || {
            if let Some(inner) = inner.upgrade() {
                action(&CameraUpload::from_inner(inner), &key);
            }
        })
    }

    /// Queues `event` for `group` and, unless a dispatch is already running
    /// further up the stack, drains the queue.
    pub(super) fn dispatch(&self, group: &str, event: Event<P::Stream>) {
        self.inner
            .queue
            .borrow_mut()
            .push_back((group.to_string(), event));
        if self.inner.draining.replace(true) {
            return;
        }

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            match next {
                Some((group, event)) => self.step(&group, event),
                None => break,
            }
        }
        self.inner.draining.set(false);
    }

    fn step(&self, key: &str, event: Event<P::Stream>) {
        let (elements, logger, effects) = {
            let mut groups = self.inner.groups.borrow_mut();
            let Some(group) = groups.get_mut(key) else {
                self.inner
                    .logger
                    .debug(&format!("Ignoring {} for unbound group `{}`", event.name(), key));
                if let Event::CameraStartDone(Ok(session)) = event {
                    session.stop();
                }
                return;
            };

            let state = std::mem::take(&mut group.state);
            let before = state.phase();
            let event_name = event.name();
            let (next, effects) = transition(&self.inner.config, state, event);
            group.state = next;
            group.logger.debug(&format!(
                "{:?} --{}--> {:?} ({} effect(s))",
                before,
                event_name,
                group.state.phase(),
                effects.len()
            ));

            if let Err(error) = render(
                &*self.inner.page,
                &self.inner.config,
                &group.elements,
                group.state.phase(),
            ) {
                group.logger.error(&format!("Render failed: {}", error));
            }

            (group.elements.clone(), group.logger.clone(), effects)
        };

        for effect in effects {
            self.run_effect(key, &elements, &logger, effect);
        }
    }
}
