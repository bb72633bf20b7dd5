use crate::device_camera::interface::StreamConstraints;
use crate::library::logger::interface::Level;
use chrono::{Offset, Utc};
use std::time::Duration;

/// Attribute names that make up the markup contract with the host page.
#[derive(Debug, Clone)]
pub struct AttributeNames {
    pub group: String,
    pub role: String,
    pub upload_id: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            group: "data-camera-group".to_string(),
            role: "data-camera-role".to_string(),
            upload_id: "data-camera-upload-id".to_string(),
        }
    }
}

/// CSS `display` values used when an element is shown or hidden.
#[derive(Debug, Clone)]
pub struct DisplayValues {
    pub start: String,
    pub video: String,
    pub control: String,
    pub hidden: String,
}

impl Default for DisplayValues {
    fn default() -> Self {
        Self {
            start: "flex".to_string(),
            video: "block".to_string(),
            control: "inline-block".to_string(),
            hidden: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scan_interval: Duration,
    pub settle_delay: Duration,
    pub constraints: StreamConstraints,
    pub jpeg_quality: f32,
    pub file_suffix: String,
    pub mime_type: String,
    pub attributes: AttributeNames,
    pub display: DisplayValues,
    pub camera_failure_message: String,
    pub log_level: Level,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(2000),
            settle_delay: Duration::from_millis(500),
            constraints: StreamConstraints::default(),
            jpeg_quality: 0.95,
            file_suffix: "_capture.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            attributes: AttributeNames::default(),
            display: DisplayValues::default(),
            camera_failure_message:
                "Could not access the camera. Allow camera access in your browser settings and try again."
                    .to_string(),
            log_level: Level::Info,
            logger_timezone: Utc.fix(),
        }
    }
}
