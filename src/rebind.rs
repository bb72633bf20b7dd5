//! Re-binding scheduler.
//!
//! The host page can rebuild its DOM at any moment, so binding is not a
//! one-shot step. Three independent signals (content ready, DOM mutation,
//! a fixed interval) all run the same idempotent scan; a fourth releases
//! every camera when the page goes away.

use crate::capture_widget::CameraUpload;
use crate::device_camera::interface::DeviceCamera;
use crate::device_page::interface::{DevicePage, PageError};
use std::rc::Rc;
use std::time::Duration;

pub trait ScanTriggers {
    /// Runs once the initial content is ready, after `settle`.
    fn when_ready(&self, settle: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError>;

    /// Runs on every child-list change anywhere under the body.
    fn on_mutation(&self, run: Rc<dyn Fn()>) -> Result<(), PageError>;

    fn every(&self, interval: Duration, run: Rc<dyn Fn()>) -> Result<(), PageError>;

    fn on_unload(&self, run: Rc<dyn Fn()>) -> Result<(), PageError>;
}

pub fn install<P, C, T>(upload: &CameraUpload<P, C>, triggers: &T) -> Result<(), PageError>
where
    P: DevicePage + 'static,
    C: DeviceCamera<Session = P::Stream> + 'static,
    T: ScanTriggers + ?Sized,
{
    let config = upload.config();

    let scanner = upload.clone();
    let scan: Rc<dyn Fn()> = Rc::new(move || {
        scanner.scan();
    });
    triggers.when_ready(config.settle_delay, scan.clone())?;
    triggers.on_mutation(scan.clone())?;
    triggers.every(config.scan_interval, scan)?;

    let releaser = upload.clone();
    triggers.on_unload(Rc::new(move || releaser.teardown()))?;

    upload.logger().info(&format!(
        "Installed (settle {:?}, rescan every {:?})",
        config.settle_delay, config.scan_interval
    ));
    Ok(())
}
