//! Frame capture pipeline: video frame -> pixels -> JPEG -> named file.
//!
//! Encoding is pure and has no browser dependencies; the page seam supplies
//! the pixels and receives the finished file.

use crate::binding::BoundElements;
use crate::config::Config;
use crate::device_page::interface::{DevicePage, Frame, FrameSize, PageError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::fmt;

/// An encoded still, ready to be handed to the upload input.
#[derive(Clone, PartialEq)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("video has not produced a frame yet")]
    NotReady,

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("JPEG encoding failed: {0}")]
    Encoding(String),

    #[error("JPEG encoder produced no output")]
    EmptyOutput,

    #[error("could not schedule the capture: {0}")]
    Unscheduled(String),

    #[error(transparent)]
    Page(#[from] PageError),
}

pub fn file_name_for(group: &str, suffix: &str) -> String {
    format!("{}{}", group, suffix)
}

/// Maps a 0.0..=1.0 quality to the encoder's 1..=100 scale.
pub fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encodes RGBA pixels as a baseline JPEG. Alpha is discarded.
pub fn encode_jpeg(frame: Frame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let expected = frame.width as usize * frame.height as usize * 4;
    let actual = frame.rgba.len();
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::NotReady);
    }

    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .filter(|_| actual == expected)
        .ok_or(CaptureError::InvalidFrame { expected, actual })?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .map_err(|e| CaptureError::Encoding(e.to_string()))?;

    if bytes.is_empty() {
        return Err(CaptureError::EmptyOutput);
    }
    Ok(bytes)
}

/// Snapshots the group's video into its canvas and encodes the result.
///
/// Rejects with [`CaptureError::NotReady`] when `size` is empty, without
/// touching the canvas.
pub fn capture<P: DevicePage>(
    page: &P,
    config: &Config,
    group: &str,
    elements: &BoundElements<P::Element>,
    size: FrameSize,
) -> Result<CapturedImage, CaptureError> {
    if size.is_empty() {
        return Err(CaptureError::NotReady);
    }

    let frame = page.read_frame(&elements.video, &elements.canvas, size)?;
    let bytes = encode_jpeg(frame, quality_percent(config.jpeg_quality))?;

    Ok(CapturedImage {
        file_name: file_name_for(group, &config.file_suffix),
        mime_type: config.mime_type.clone(),
        bytes,
    })
}
