//! In-memory page used by tests and the native simulation binary.

use crate::config::AttributeNames;
use crate::device_camera::impl_fake::FakeSession;
use crate::device_page::interface::{DevicePage, Frame, FrameSize, PageError, Role, StartControl};
use crate::frame_capture::CapturedImage;
use crate::library::logger::interface::Logger;
use crate::rebind::ScanTriggers;
use futures::future::{self, FutureExt, LocalBoxFuture};
use rand::Rng;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Node {
    tag: String,
    id: Option<String>,
    attributes: RefCell<HashMap<String, String>>,
    children: RefCell<Vec<FakeElement>>,
    display: RefCell<String>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
    files: RefCell<Vec<CapturedImage>>,
    change_events: Cell<usize>,
    frame_size: Cell<FrameSize>,
    stream: RefCell<Option<FakeSession>>,
    inline_playback: Cell<bool>,
}

#[derive(Clone)]
pub struct FakeElement(Rc<Node>);

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(Node {
            tag: tag.to_string(),
            ..Node::default()
        }))
    }

    pub fn with_id(tag: &str, id: &str) -> Self {
        Self(Rc::new(Node {
            tag: tag.to_string(),
            id: Some(id.to_string()),
            ..Node::default()
        }))
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn append(&self, child: FakeElement) {
        self.0.children.borrow_mut().push(child);
    }

    pub fn display(&self) -> String {
        self.0.display.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.display() != "none"
    }

    pub fn click(&self) {
        let listeners = self.0.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    pub fn files(&self) -> Vec<CapturedImage> {
        self.0.files.borrow().clone()
    }

    pub fn change_events(&self) -> usize {
        self.0.change_events.get()
    }

    pub fn set_frame_size(&self, width: u32, height: u32) {
        self.0.frame_size.set(FrameSize::new(width, height));
    }

    pub fn stream(&self) -> Option<FakeSession> {
        self.0.stream.borrow().clone()
    }

    pub fn plays_inline(&self) -> bool {
        self.0.inline_playback.get()
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeElement")
            .field("tag", &self.0.tag)
            .field("id", &self.0.id)
            .field("attributes", &self.0.attributes.borrow())
            .finish()
    }
}

/// The five controls of one group plus the upload container holding the
/// file input.
#[derive(Debug, Clone)]
pub struct FakeGroup {
    pub start: FakeElement,
    pub capture: FakeElement,
    pub cancel: FakeElement,
    pub video: FakeElement,
    pub canvas: FakeElement,
    pub container: FakeElement,
    pub input: FakeElement,
}

impl FakeGroup {
    pub fn elements(&self) -> Vec<FakeElement> {
        vec![
            self.start.clone(),
            self.capture.clone(),
            self.cancel.clone(),
            self.video.clone(),
            self.canvas.clone(),
            self.container.clone(),
        ]
    }
}

#[derive(Default)]
struct Triggers {
    ready: Vec<(Duration, Rc<dyn Fn()>)>,
    mutation: Vec<Rc<dyn Fn()>>,
    interval: Vec<(Duration, Rc<dyn Fn()>)>,
    unload: Vec<Rc<dyn Fn()>>,
}

pub struct DevicePageFake {
    attributes: AttributeNames,
    logger: Rc<dyn Logger>,
    elements: RefCell<Vec<FakeElement>>,
    alerts: RefCell<Vec<String>>,
    fail_playback: Cell<bool>,
    fail_read: Cell<bool>,
    fail_install: Cell<bool>,
    triggers: RefCell<Triggers>,
}

impl DevicePageFake {
    pub fn new(attributes: AttributeNames, logger: Rc<dyn Logger>) -> Self {
        Self {
            attributes,
            logger: logger.with_namespace("page").with_namespace("fake"),
            elements: RefCell::new(vec![]),
            alerts: RefCell::new(vec![]),
            fail_playback: Cell::new(false),
            fail_read: Cell::new(false),
            fail_install: Cell::new(false),
            triggers: RefCell::new(Triggers::default()),
        }
    }

    /// Builds the markup for a group without adding it to the page.
    pub fn build_group(&self, group: &str, upload_id: &str) -> FakeGroup {
        let control = |tag: &str, role: Role| {
            FakeElement::new(tag)
                .with_attribute(&self.attributes.group, group)
                .with_attribute(&self.attributes.role, role.as_str())
        };
        let start = control("button", Role::Start).with_attribute(&self.attributes.upload_id, upload_id);
        let container = FakeElement::with_id("div", upload_id);
        let input = FakeElement::new("input").with_attribute("type", "file");
        container.append(input.clone());

        FakeGroup {
            start,
            capture: control("button", Role::Capture),
            cancel: control("button", Role::Cancel),
            video: control("video", Role::Video),
            canvas: control("canvas", Role::Canvas),
            container,
            input,
        }
    }

    pub fn add_group(&self, group: &str, upload_id: &str) -> FakeGroup {
        let built = self.build_group(group, upload_id);
        for element in built.elements() {
            self.append(element);
        }
        built
    }

    pub fn append(&self, element: FakeElement) {
        self.elements.borrow_mut().push(element);
    }

    pub fn remove(&self, element: &FakeElement) {
        self.elements.borrow_mut().retain(|candidate| candidate != element);
    }

    /// Swaps `old` for `new` in place, the way a host framework re-renders.
    pub fn replace(&self, old: &FakeElement, new: FakeElement) {
        let mut elements = self.elements.borrow_mut();
        if let Some(slot) = elements.iter_mut().find(|candidate| **candidate == *old) {
            *slot = new;
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn set_fail_playback(&self, fail: bool) {
        self.fail_playback.set(fail);
    }

    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.set(fail);
    }

    pub fn set_fail_install(&self, fail: bool) {
        self.fail_install.set(fail);
    }

    pub fn ready_delays(&self) -> Vec<Duration> {
        self.triggers.borrow().ready.iter().map(|(delay, _)| *delay).collect()
    }

    pub fn intervals(&self) -> Vec<Duration> {
        self.triggers.borrow().interval.iter().map(|(every, _)| *every).collect()
    }

    pub fn fire_ready(&self) {
        let runs: Vec<_> = self.triggers.borrow().ready.iter().map(|(_, run)| run.clone()).collect();
        runs.iter().for_each(|run| run());
    }

    pub fn fire_mutation(&self) {
        let runs = self.triggers.borrow().mutation.clone();
        runs.iter().for_each(|run| run());
    }

    pub fn fire_interval(&self) {
        let runs: Vec<_> = self.triggers.borrow().interval.iter().map(|(_, run)| run.clone()).collect();
        runs.iter().for_each(|run| run());
    }

    pub fn fire_unload(&self) {
        let runs = self.triggers.borrow().unload.clone();
        runs.iter().for_each(|run| run());
    }

    fn matches(&self, element: &FakeElement, group: &str, role: Role) -> bool {
        element.attribute(&self.attributes.group).as_deref() == Some(group)
            && element.attribute(&self.attributes.role).as_deref() == Some(role.as_str())
    }
}

impl DevicePage for DevicePageFake {
    type Element = FakeElement;
    type Stream = FakeSession;
    type Listener = Rc<dyn Fn()>;

    fn start_controls(&self) -> Vec<StartControl<FakeElement>> {
        self.elements
            .borrow()
            .iter()
            .filter(|element| {
                element.attribute(&self.attributes.role).as_deref() == Some(Role::Start.as_str())
            })
            .map(|element| StartControl {
                element: element.clone(),
                group: element.attribute(&self.attributes.group),
                upload_id: element.attribute(&self.attributes.upload_id),
            })
            .collect()
    }

    fn find_role(&self, group: &str, role: Role) -> Option<FakeElement> {
        self.elements
            .borrow()
            .iter()
            .find(|element| self.matches(element, group, role))
            .cloned()
    }

    fn find_upload_input(&self, upload_id: &str) -> Option<FakeElement> {
        let container = self
            .elements
            .borrow()
            .iter()
            .find(|element| element.0.id.as_deref() == Some(upload_id))
            .cloned()?;
        let input = container
            .0
            .children
            .borrow()
            .iter()
            .find(|child| child.0.tag == "input" && child.attribute("type").as_deref() == Some("file"))
            .cloned();
        input
    }

    fn set_display(&self, element: &FakeElement, value: &str) -> Result<(), PageError> {
        *element.0.display.borrow_mut() = value.to_string();
        Ok(())
    }

    fn on_click(&self, element: &FakeElement, callback: Rc<dyn Fn()>) -> Result<Rc<dyn Fn()>, PageError> {
        element.0.listeners.borrow_mut().push(callback.clone());
        Ok(callback)
    }

    fn off_click(&self, element: &FakeElement, listener: Rc<dyn Fn()>) {
        element
            .0
            .listeners
            .borrow_mut()
            .retain(|attached| !Rc::ptr_eq(attached, &listener));
    }

    fn attach_stream(
        &self,
        video: &FakeElement,
        stream: &FakeSession,
    ) -> LocalBoxFuture<'static, Result<(), PageError>> {
        *video.0.stream.borrow_mut() = Some(stream.clone());
        video.0.inline_playback.set(true);

        if self.fail_playback.get() {
            future::ready(Err(PageError::Js("NotAllowedError: play() was blocked".to_string())))
                .boxed_local()
        } else {
            future::ready(Ok(())).boxed_local()
        }
    }

    fn detach_stream(&self, video: &FakeElement) -> Result<(), PageError> {
        *video.0.stream.borrow_mut() = None;
        video.0.inline_playback.set(false);
        Ok(())
    }

    fn video_frame_size(&self, video: &FakeElement) -> FrameSize {
        video.0.frame_size.get()
    }

    fn read_frame(
        &self,
        _video: &FakeElement,
        _canvas: &FakeElement,
        size: FrameSize,
    ) -> Result<Frame, PageError> {
        if self.fail_read.get() {
            return Err(PageError::Js("SecurityError: the canvas has been tainted".to_string()));
        }
        let mut rgba = vec![0u8; size.width as usize * size.height as usize * 4];
        rand::rng().fill(&mut rgba[..]);
        Ok(Frame {
            width: size.width,
            height: size.height,
            rgba,
        })
    }

    fn install_file(&self, input: &FakeElement, image: &CapturedImage) -> Result<(), PageError> {
        if self.fail_install.get() {
            return Err(PageError::Js("DataTransfer is not supported".to_string()));
        }
        *input.0.files.borrow_mut() = vec![image.clone()];
        input.0.change_events.set(input.0.change_events.get() + 1);
        self.logger.debug(&format!("change dispatched for {}", image.file_name));
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.logger.info(&format!("alert: {}", message));
        self.alerts.borrow_mut().push(message.to_string());
    }
}

impl ScanTriggers for DevicePageFake {
    fn when_ready(&self, settle: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        self.triggers.borrow_mut().ready.push((settle, run));
        Ok(())
    }

    fn on_mutation(&self, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        self.triggers.borrow_mut().mutation.push(run);
        Ok(())
    }

    fn every(&self, interval: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        self.triggers.borrow_mut().interval.push((interval, run));
        Ok(())
    }

    fn on_unload(&self, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        self.triggers.borrow_mut().unload.push(run);
        Ok(())
    }
}
