//! Walks one widget group through start and capture against the in-memory
//! page and camera, logging every step.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use camera_upload::device_camera::impl_fake::DeviceCameraFake;
    use camera_upload::device_page::impl_fake::DevicePageFake;
    use camera_upload::library::logger::impl_console::LoggerConsole;
    use camera_upload::library::logger::interface::{Level, Logger};
    use camera_upload::{rebind, CameraUpload, Config};
    use futures::executor::LocalPool;
    use std::rc::Rc;

    let config = Config::default();

    let logger: Rc<dyn Logger> = Rc::new(LoggerConsole::new(config.logger_timezone, Level::Debug));

    let page = Rc::new(DevicePageFake::new(config.attributes.clone(), logger.clone()));

    let camera = Rc::new(DeviceCameraFake::new(logger.clone()));

    let mut pool = LocalPool::new();

    let upload = CameraUpload::new(
        config,
        logger.clone(),
        page.clone(),
        camera,
        Box::new(pool.spawner()),
    );

    rebind::install(&upload, &*page)?;

    let group = page.add_group("id-front", "upload-front");
    page.fire_mutation();

    group.start.click();
    pool.run_until_stalled();

    group.video.set_frame_size(1280, 720);
    group.capture.click();
    pool.run_until_stalled();

    for file in group.input.files() {
        logger.info(&format!("Upload input now holds {:?}", file));
    }

    page.fire_unload();

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
