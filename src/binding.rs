//! Locates the elements that make up a widget group.
//!
//! Resolution only reads the page, so the scheduler may call it as often as
//! it likes.

use crate::device_page::interface::{DevicePage, Role, StartControl};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundElements<E> {
    pub start: E,
    pub capture: E,
    pub cancel: E,
    pub video: E,
    pub canvas: E,
    pub upload_input: E,
}

/// A start control that names both its group and its upload container.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<E> {
    pub group: String,
    pub upload_id: String,
    pub start: E,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("group `{group}` is not ready: {missing} is missing")]
pub struct NotReady {
    pub group: String,
    pub missing: String,
}

/// Keeps the first start control per group, in document order, and drops
/// controls without a group or upload id.
pub fn discover<E>(controls: Vec<StartControl<E>>) -> Vec<Candidate<E>> {
    let mut seen = HashSet::new();
    controls
        .into_iter()
        .filter_map(|control| {
            let group = control.group.filter(|group| !group.is_empty())?;
            let upload_id = control.upload_id.filter(|id| !id.is_empty())?;
            Some(Candidate {
                group,
                upload_id,
                start: control.element,
            })
        })
        .filter(|candidate| seen.insert(candidate.group.clone()))
        .collect()
}

pub fn resolve<P: DevicePage>(
    page: &P,
    candidate: &Candidate<P::Element>,
) -> Result<BoundElements<P::Element>, NotReady> {
    let group = candidate.group.as_str();
    let find = |role: Role| {
        page.find_role(group, role).ok_or_else(|| NotReady {
            group: group.to_string(),
            missing: role.to_string(),
        })
    };

    let capture = find(Role::Capture)?;
    let cancel = find(Role::Cancel)?;
    let video = find(Role::Video)?;
    let canvas = find(Role::Canvas)?;
    let upload_input = page
        .find_upload_input(&candidate.upload_id)
        .ok_or_else(|| NotReady {
            group: group.to_string(),
            missing: format!("file input in #{}", candidate.upload_id),
        })?;

    Ok(BoundElements {
        start: candidate.start.clone(),
        capture,
        cancel,
        video,
        canvas,
        upload_input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device_page::impl_fake::{DevicePageFake, FakeElement};
    use crate::library::logger::impl_fake::LoggerFake;
    use std::rc::Rc;

    fn page() -> DevicePageFake {
        DevicePageFake::new(Config::default().attributes, Rc::new(LoggerFake::new()))
    }

    fn candidate(group: &str, upload_id: &str, start: &FakeElement) -> Candidate<FakeElement> {
        Candidate {
            group: group.to_string(),
            upload_id: upload_id.to_string(),
            start: start.clone(),
        }
    }

    #[test]
    fn test_resolve_complete_group() {
        let page = page();
        let group = page.add_group("id-front", "upload-front");

        let elements = resolve(&page, &candidate("id-front", "upload-front", &group.start)).unwrap();

        assert_eq!(elements.start, group.start);
        assert_eq!(elements.capture, group.capture);
        assert_eq!(elements.cancel, group.cancel);
        assert_eq!(elements.video, group.video);
        assert_eq!(elements.canvas, group.canvas);
        assert_eq!(elements.upload_input, group.input);
    }

    #[test]
    fn test_resolve_reports_missing_canvas() {
        let page = page();
        let group = page.add_group("id-front", "upload-front");
        page.remove(&group.canvas);

        let result = resolve(&page, &candidate("id-front", "upload-front", &group.start));

        assert_eq!(
            result,
            Err(NotReady {
                group: "id-front".to_string(),
                missing: "canvas".to_string(),
            })
        );
    }

    #[test]
    fn test_resolve_reports_missing_upload_input() {
        let page = page();
        let group = page.add_group("id-front", "upload-front");
        page.remove(&group.container);

        let result = resolve(&page, &candidate("id-front", "upload-front", &group.start));

        assert!(matches!(result, Err(NotReady { missing, .. }) if missing.contains("upload-front")));
    }

    #[test]
    fn test_resolve_does_not_cross_groups() {
        let page = page();
        let front = page.add_group("id-front", "upload-front");
        let back = page.build_group("id-back", "upload-back");
        page.append(back.start.clone());
        page.append(back.container.clone());

        assert!(resolve(&page, &candidate("id-back", "upload-back", &back.start)).is_err());
        assert!(resolve(&page, &candidate("id-front", "upload-front", &front.start)).is_ok());
    }

    #[test]
    fn test_discover_skips_incomplete_attributes_and_duplicates() {
        let first = FakeElement::new("button");
        let duplicate = FakeElement::new("button");
        let anonymous = FakeElement::new("button");
        let no_upload = FakeElement::new("button");

        let controls = vec![
            StartControl {
                element: first.clone(),
                group: Some("id-front".to_string()),
                upload_id: Some("upload-front".to_string()),
            },
            StartControl {
                element: duplicate,
                group: Some("id-front".to_string()),
                upload_id: Some("upload-front".to_string()),
            },
            StartControl {
                element: anonymous,
                group: Some(String::new()),
                upload_id: Some("upload-x".to_string()),
            },
            StartControl {
                element: no_upload,
                group: Some("id-back".to_string()),
                upload_id: None,
            },
        ];

        let candidates = discover(controls);

        assert_eq!(candidates, vec![candidate("id-front", "upload-front", &first)]);
    }
}
