//! Browser entry point.

use crate::capture_widget::CameraUpload;
use crate::config::Config;
use crate::device_camera::impl_web::DeviceCameraWeb;
use crate::device_page::impl_web::DevicePageWeb;
use crate::library::logger::impl_console::LoggerConsole;
use crate::library::logger::interface::Logger;
use crate::rebind;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Runs futures on the page's microtask queue.
struct WebSpawner;

impl LocalSpawn for WebSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let config = Config::default();
    let logger: Rc<dyn Logger> = Rc::new(LoggerConsole::new(config.logger_timezone, config.log_level));

    let page = Rc::new(
        DevicePageWeb::new(config.attributes.clone())
            .map_err(|error| JsValue::from_str(&error.to_string()))?,
    );
    let camera = Rc::new(DeviceCameraWeb::new(logger.clone()));

    let upload = CameraUpload::new(config, logger, page.clone(), camera, Box::new(WebSpawner));
    rebind::install(&upload, &*page).map_err(|error| JsValue::from_str(&error.to_string()))
}
