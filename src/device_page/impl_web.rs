//! DOM access through `web-sys`.

use crate::config::AttributeNames;
use crate::device_camera::impl_web::WebSession;
use crate::device_page::interface::{DevicePage, Frame, FrameSize, PageError, Role, StartControl};
use crate::frame_capture::CapturedImage;
use crate::rebind::ScanTriggers;
use futures::future::{self, FutureExt, LocalBoxFuture};
use js_sys::{Array, Uint8Array};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, DataTransfer, Document, Event, EventInit, File, FilePropertyBag,
    HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlVideoElement, MutationObserver,
    MutationObserverInit, NodeList, Window,
};

pub struct DevicePageWeb {
    window: Window,
    document: Document,
    attributes: AttributeNames,
}

impl DevicePageWeb {
    pub fn new(attributes: AttributeNames) -> Result<Self, PageError> {
        let window = web_sys::window().ok_or_else(|| PageError::Missing("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| PageError::Missing("document".to_string()))?;
        Ok(Self {
            window,
            document,
            attributes,
        })
    }

    fn query_all(&self, selector: &str) -> Vec<HtmlElement> {
        self.document
            .query_selector_all(selector)
            .map(|nodes| html_elements(&nodes))
            .unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn set_timeout(&self, delay: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        let callback = Closure::once_into_js(move || run());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis(delay),
            )
            .map(|_| ())
            .map_err(js_error)
    }
}

impl DevicePage for DevicePageWeb {
    type Element = HtmlElement;
    type Stream = WebSession;
    type Listener = Closure<dyn FnMut(Event)>;

    fn start_controls(&self) -> Vec<StartControl<HtmlElement>> {
        let selector = format!("[{}=\"{}\"]", self.attributes.role, Role::Start.as_str());
        self.query_all(&selector)
            .into_iter()
            .map(|element| StartControl {
                group: element.get_attribute(&self.attributes.group),
                upload_id: element.get_attribute(&self.attributes.upload_id),
                element,
            })
            .collect()
    }

    // Group values come from host markup, so they are compared here rather
    // than spliced into a selector.
    fn find_role(&self, group: &str, role: Role) -> Option<HtmlElement> {
        let selector = format!("[{}=\"{}\"]", self.attributes.role, role.as_str());
        self.query_all(&selector).into_iter().find(|element| {
            element.get_attribute(&self.attributes.group).as_deref() == Some(group)
        })
    }

    fn find_upload_input(&self, upload_id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(upload_id)?
            .query_selector("input[type=\"file\"]")
            .ok()??
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn set_display(&self, element: &HtmlElement, value: &str) -> Result<(), PageError> {
        element
            .style()
            .set_property("display", value)
            .map_err(js_error)
    }

    fn on_click(
        &self,
        element: &HtmlElement,
        callback: Rc<dyn Fn()>,
    ) -> Result<Closure<dyn FnMut(Event)>, PageError> {
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            callback();
        });
        element
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(listener)
    }

    fn off_click(&self, element: &HtmlElement, listener: Closure<dyn FnMut(Event)>) {
        let _ = element
            .remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
    }

    fn attach_stream(
        &self,
        video: &HtmlElement,
        stream: &WebSession,
    ) -> LocalBoxFuture<'static, Result<(), PageError>> {
        let video = match video.dyn_ref::<HtmlVideoElement>() {
            Some(video) => video,
            None => {
                return future::ready(Err(PageError::Missing("video surface".to_string())))
                    .boxed_local()
            }
        };

        video.set_src_object(Some(stream.stream()));
        video.set_muted(true);
        for attribute in ["playsinline", "webkit-playsinline"] {
            if let Err(error) = video.set_attribute(attribute, "true") {
                return future::ready(Err(js_error(error))).boxed_local();
            }
        }

        match video.play() {
            Ok(playing) => async move {
                JsFuture::from(playing).await.map(|_| ()).map_err(js_error)
            }
            .boxed_local(),
            Err(error) => future::ready(Err(js_error(error))).boxed_local(),
        }
    }

    fn detach_stream(&self, video: &HtmlElement) -> Result<(), PageError> {
        let video = video
            .dyn_ref::<HtmlVideoElement>()
            .ok_or_else(|| PageError::Missing("video surface".to_string()))?;
        video.set_src_object(None);
        video.remove_attribute("playsinline").map_err(js_error)?;
        video.remove_attribute("webkit-playsinline").map_err(js_error)
    }

    fn video_frame_size(&self, video: &HtmlElement) -> FrameSize {
        video
            .dyn_ref::<HtmlVideoElement>()
            .map(|video| FrameSize::new(video.video_width(), video.video_height()))
            .unwrap_or_default()
    }

    fn read_frame(
        &self,
        video: &HtmlElement,
        canvas: &HtmlElement,
        size: FrameSize,
    ) -> Result<Frame, PageError> {
        let video = video
            .dyn_ref::<HtmlVideoElement>()
            .ok_or_else(|| PageError::Missing("video surface".to_string()))?;
        let canvas = canvas
            .dyn_ref::<HtmlCanvasElement>()
            .ok_or_else(|| PageError::Missing("canvas".to_string()))?;

        canvas.set_width(size.width);
        canvas.set_height(size.height);
        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| PageError::Missing("2d canvas context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PageError::Missing("2d canvas context".to_string()))?;

        let (width, height) = (f64::from(size.width), f64::from(size.height));
        context
            .draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, width, height)
            .map_err(js_error)?;
        let pixels = context
            .get_image_data(0.0, 0.0, width, height)
            .map_err(js_error)?;

        Ok(Frame {
            width: size.width,
            height: size.height,
            rgba: pixels.data().0,
        })
    }

    fn install_file(&self, input: &HtmlElement, image: &CapturedImage) -> Result<(), PageError> {
        let input = input
            .dyn_ref::<HtmlInputElement>()
            .ok_or_else(|| PageError::Missing("file input".to_string()))?;

        let parts = Array::of1(&Uint8Array::from(image.bytes.as_slice()));
        let options = FilePropertyBag::new();
        options.set_type(&image.mime_type);
        let file = File::new_with_u8_array_sequence_and_options(&parts, &image.file_name, &options)
            .map_err(js_error)?;

        let transfer = DataTransfer::new().map_err(js_error)?;
        transfer.items().add_with_file(&file).map_err(js_error)?;
        input.set_files(transfer.files().as_ref());

        let init = EventInit::new();
        init.set_bubbles(true);
        let change = Event::new_with_event_init_dict("change", &init).map_err(js_error)?;
        input.dispatch_event(&change).map(|_| ()).map_err(js_error)
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }
}

impl ScanTriggers for DevicePageWeb {
    fn when_ready(&self, settle: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        if !self.is_loading() {
            return self.set_timeout(settle, run);
        }

        let window = self.window.clone();
        let on_ready = Closure::once_into_js(move || {
            let callback = Closure::once_into_js(move || run());
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis(settle),
            );
        });
        self.document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(js_error)
    }

    fn on_mutation(&self, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        let callback = Closure::<dyn FnMut()>::new(move || run());
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(js_error)?;
        callback.forget();

        // Scripts loaded from <head> run before <body> exists.
        let target: web_sys::Node = match self.document.body() {
            Some(body) => body.into(),
            None => self
                .document
                .document_element()
                .ok_or_else(|| PageError::Missing("document element".to_string()))?
                .into(),
        };

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(&target, &options)
            .map_err(js_error)
    }

    fn every(&self, interval: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        let callback = Closure::<dyn FnMut()>::new(move || run());
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis(interval),
            )
            .map_err(js_error)?;
        callback.forget();
        Ok(())
    }

    fn on_unload(&self, run: Rc<dyn Fn()>) -> Result<(), PageError> {
        for event in ["beforeunload", "pagehide"] {
            let run = run.clone();
            let callback = Closure::<dyn FnMut()>::new(move || run());
            self.window
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                .map_err(js_error)?;
            callback.forget();
        }
        Ok(())
    }
}

fn html_elements(nodes: &NodeList) -> Vec<HtmlElement> {
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

fn js_error(error: JsValue) -> PageError {
    PageError::Js(
        error
            .as_string()
            .unwrap_or_else(|| format!("{:?}", error)),
    )
}
