use crate::binding::BoundElements;
use crate::capture_widget::core::Phase;
use crate::config::Config;
use crate::device_page::interface::{DevicePage, PageError};

/// Visibility is a function of the phase alone: the start control while
/// idle or starting, video and controls while streaming or capturing.
pub fn render<P: DevicePage>(
    page: &P,
    config: &Config,
    elements: &BoundElements<P::Element>,
    phase: Phase,
) -> Result<(), PageError> {
    let display = &config.display;
    let (start, video, control) = match phase {
        Phase::Idle | Phase::Starting => (&display.start, &display.hidden, &display.hidden),
        Phase::Streaming | Phase::Capturing => (&display.hidden, &display.video, &display.control),
    };

    page.set_display(&elements.start, start)?;
    page.set_display(&elements.video, video)?;
    page.set_display(&elements.capture, control)?;
    page.set_display(&elements.cancel, control)?;

    Ok(())
}
