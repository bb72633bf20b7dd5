use super::fixture::{assert_idle_visuals, assert_streaming_visuals, Fixture};
use crate::capture_widget::core::Phase;
use crate::device_camera::impl_fake::FakeCameraMode;
use crate::device_camera::interface::{CameraError, CameraSession, FacingMode};
use crate::library::logger::interface::Level;

#[test]
fn test_scan_binds_each_group_once() {
    let mut f = Fixture::new();
    let group = f.page.add_group("id-front", "upload-front");

    assert_eq!(f.upload.scan(), 1);
    for _ in 0..5 {
        assert_eq!(f.upload.scan(), 0);
    }

    assert_eq!(group.start.listener_count(), 1);
    assert_eq!(group.capture.listener_count(), 1);
    assert_eq!(group.cancel.listener_count(), 1);
    assert_eq!(f.upload.bound_groups(), vec!["id-front".to_string()]);
    assert_idle_visuals(&group);
    f.settle();
}

#[test]
fn test_incomplete_group_is_bound_once_complete() {
    let f = Fixture::new();
    let group = f.page.build_group("id-front", "upload-front");
    for element in [&group.start, &group.capture, &group.cancel, &group.video] {
        f.page.append(element.clone());
    }

    assert_eq!(f.upload.scan(), 0);
    assert_eq!(f.upload.phase("id-front"), None);
    assert_eq!(group.start.listener_count(), 0);

    f.page.append(group.canvas.clone());
    f.page.append(group.container.clone());

    assert_eq!(f.upload.scan(), 1);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
}

#[test]
fn test_start_without_upload_id_is_never_bound() {
    let f = Fixture::new();
    let group = f.page.build_group("id-front", "upload-front");
    let anonymous = crate::device_page::impl_fake::FakeElement::new("button")
        .with_attribute(&f.config.attributes.group, "id-front")
        .with_attribute(&f.config.attributes.role, "start");
    f.page.append(anonymous);
    for element in group.elements().into_iter().skip(1) {
        f.page.append(element);
    }

    assert_eq!(f.upload.scan(), 0);
    assert!(f.upload.bound_groups().is_empty());
}

#[test]
fn test_front_capture_installs_file_and_returns_to_idle() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");

    group.start.click();
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Starting));
    assert_idle_visuals(&group);

    f.settle();
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
    assert_streaming_visuals(&group);
    assert!(group.video.stream().is_some());
    assert!(group.video.plays_inline());

    group.video.set_frame_size(64, 48);
    group.capture.click();

    // Encoding happens after the click handler has returned.
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Capturing));
    assert_streaming_visuals(&group);
    assert!(group.input.files().is_empty());
    assert_eq!(group.input.change_events(), 0);

    f.settle();

    let files = group.input.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "id-front_capture.jpg");
    assert!(files[0].file_name.ends_with("_capture.jpg"));
    assert_eq!(files[0].mime_type, "image/jpeg");
    assert_eq!(&files[0].bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(group.input.change_events(), 1);

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert!(group.video.stream().is_none());
    assert!(!group.video.plays_inline());
    assert_eq!(f.camera.sessions().len(), 1);
    assert_eq!(f.camera.live_sessions(), 0);
}

#[test]
fn test_second_capture_replaces_previous_file() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.video.set_frame_size(32, 32);

    for _ in 0..2 {
        f.upload.start("id-front");
        f.settle();
        f.upload.capture("id-front");
        f.settle();
    }

    assert_eq!(group.input.files().len(), 1);
    assert_eq!(group.input.change_events(), 2);
    assert_eq!(f.camera.sessions().len(), 2);
    assert_eq!(f.camera.live_sessions(), 0);
}

#[test]
fn test_back_permission_denied_leaves_idle() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-back", "upload-back");
    f.camera
        .set_mode(FakeCameraMode::Deny(CameraError::PermissionDenied));

    group.start.click();
    f.settle();

    assert_eq!(f.upload.phase("id-back"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert!(f.camera.sessions().is_empty());
    assert_eq!(f.page.alerts(), vec![f.config.camera_failure_message.clone()]);
    assert!(f.logger.contains(Level::Error, "Camera access failed"));
}

#[test]
fn test_denied_group_can_retry() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-back", "upload-back");
    f.camera.set_mode(FakeCameraMode::Deny(CameraError::NotFound));
    group.start.click();
    f.settle();

    f.camera.set_mode(FakeCameraMode::Grant);
    group.start.click();
    f.settle();

    assert_eq!(f.upload.phase("id-back"), Some(Phase::Streaming));
    assert_streaming_visuals(&group);
}

#[test]
fn test_double_start_acquires_one_session() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    f.camera.set_mode(FakeCameraMode::Hold);

    group.start.click();
    group.start.click();
    f.settle();
    assert_eq!(f.camera.requests().len(), 1);

    f.camera.release_pending();
    f.settle();
    group.start.click();
    f.settle();

    assert_eq!(f.camera.requests().len(), 1);
    assert_eq!(f.camera.sessions().len(), 1);
    assert_eq!(f.camera.live_sessions(), 1);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
}

#[test]
fn test_request_uses_rear_camera_at_full_hd() {
    let mut f = Fixture::new();
    f.bound_group("id-front", "upload-front");

    f.upload.start("id-front");
    f.settle();

    let request = &f.camera.requests()[0];
    assert_eq!(request.facing_mode, FacingMode::Environment);
    assert_eq!((request.ideal_width, request.ideal_height), (1920, 1080));
    assert!(!request.audio);
}

#[test]
fn test_cancel_while_idle_is_noop() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");

    group.cancel.click();
    f.upload.cancel("id-front");
    f.upload.cancel("not-a-group");

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert!(f.camera.requests().is_empty());
}

#[test]
fn test_cancel_stops_stream() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.start.click();
    f.settle();

    group.cancel.click();

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert_eq!(f.camera.sessions()[0].live_tracks(), 0);
    assert!(group.video.stream().is_none());
    assert!(group.input.files().is_empty());
}

#[test]
fn test_capture_before_first_frame_changes_nothing() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.start.click();
    f.settle();

    group.capture.click();

    assert!(group.input.files().is_empty());
    assert_eq!(group.input.change_events(), 0);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
    assert_streaming_visuals(&group);
    assert_eq!(f.camera.live_sessions(), 1);
    assert!(f.logger.contains(Level::Warn, "has not produced a frame"));
}

#[test]
fn test_install_failure_still_tears_down() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    f.page.set_fail_install(true);
    group.start.click();
    f.settle();

    group.video.set_frame_size(16, 16);
    group.capture.click();
    f.settle();

    assert!(group.input.files().is_empty());
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_eq!(f.camera.live_sessions(), 0);
    assert!(f.logger.contains(Level::Error, "Could not install id-front_capture.jpg"));
}

#[test]
fn test_cancel_while_starting_stops_late_session() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    f.camera.set_mode(FakeCameraMode::Hold);
    group.start.click();
    f.settle();

    f.upload.cancel("id-front");
    f.camera.release_pending();
    f.settle();

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert_eq!(f.camera.sessions().len(), 1);
    assert_eq!(f.camera.live_sessions(), 0);
    assert!(group.video.stream().is_none());
}

#[test]
fn test_teardown_stops_every_session() {
    let mut f = Fixture::new();
    let front = f.bound_group("id-front", "upload-front");
    let back = f.bound_group("id-back", "upload-back");
    f.upload.start("id-front");
    f.upload.start("id-back");
    f.settle();
    assert_eq!(f.camera.live_sessions(), 2);

    f.upload.teardown();
    f.upload.teardown();

    assert_eq!(f.camera.live_sessions(), 0);
    assert_idle_visuals(&front);
    assert_idle_visuals(&back);
}

#[test]
fn test_groups_do_not_interfere() {
    let mut f = Fixture::new();
    let front = f.bound_group("id-front", "upload-front");
    let back = f.bound_group("id-back", "upload-back");
    front.start.click();
    back.start.click();
    f.settle();

    back.cancel.click();

    assert_streaming_visuals(&front);
    assert_idle_visuals(&back);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
    assert_eq!(f.camera.live_sessions(), 1);

    front.video.set_frame_size(8, 8);
    front.capture.click();
    f.settle();
    assert_eq!(front.input.files()[0].file_name, "id-front_capture.jpg");
    assert!(back.input.files().is_empty());
}

#[test]
fn test_playback_failure_is_logged_and_stream_kept() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    f.page.set_fail_playback(true);

    group.start.click();
    f.settle();

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
    assert!(f.logger.contains(Level::Warn, "Video autoplay failed"));
}

#[test]
fn test_recreated_start_control_is_rebound() {
    let mut f = Fixture::new();
    let old = f.bound_group("id-front", "upload-front");
    old.start.click();
    f.settle();

    let fresh = f.page.build_group("id-front", "upload-front");
    f.page.replace(&old.start, fresh.start.clone());

    assert_eq!(f.upload.scan(), 1);
    assert_eq!(f.upload.scan(), 0);

    assert_eq!(fresh.start.listener_count(), 1);
    assert_eq!(old.start.listener_count(), 0);
    assert_eq!(old.capture.listener_count(), 1);
    assert_eq!(old.cancel.listener_count(), 1);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_eq!(f.camera.live_sessions(), 0);
    assert!(old.video.stream().is_none());
    assert!(fresh.start.is_visible());

    old.start.click();
    f.settle();
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));

    // Capture was kept by the host across the re-render and is wired once.
    fresh.start.click();
    f.settle();
    old.video.set_frame_size(16, 16);
    old.capture.click();
    f.settle();

    assert_eq!(old.input.change_events(), 1);
    let capture_clicks = f
        .logger
        .lines()
        .iter()
        .filter(|line| line.message.contains("--CaptureClicked-->"))
        .count();
    assert_eq!(capture_clicks, 1);
}

#[test]
fn test_repeated_rebinding_does_not_pile_up_listeners() {
    let f = Fixture::new();
    let group = f.page.add_group("id-front", "upload-front");
    f.upload.scan();

    let mut start = group.start.clone();
    for _ in 0..3 {
        let fresh = f.page.build_group("id-front", "upload-front").start;
        f.page.replace(&start, fresh.clone());
        assert_eq!(f.upload.scan(), 1);
        assert_eq!(start.listener_count(), 0);
        start = fresh;
    }

    assert_eq!(start.listener_count(), 1);
    assert_eq!(group.capture.listener_count(), 1);
    assert_eq!(group.cancel.listener_count(), 1);
}

#[test]
fn test_capture_click_while_encoding_is_ignored() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.start.click();
    f.settle();

    group.video.set_frame_size(32, 24);
    group.capture.click();
    group.capture.click();
    f.settle();

    assert_eq!(group.input.files().len(), 1);
    assert_eq!(group.input.change_events(), 1);
    assert_eq!(f.camera.sessions().len(), 1);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
}

#[test]
fn test_cancel_while_encoding_discards_the_still() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.start.click();
    f.settle();

    group.video.set_frame_size(32, 24);
    group.capture.click();
    group.cancel.click();
    f.settle();

    assert!(group.input.files().is_empty());
    assert_eq!(group.input.change_events(), 0);
    assert_eq!(f.upload.phase("id-front"), Some(Phase::Idle));
    assert_idle_visuals(&group);
    assert_eq!(f.camera.live_sessions(), 0);
}

#[test]
fn test_unreadable_frame_keeps_stream_for_retry() {
    let mut f = Fixture::new();
    let group = f.bound_group("id-front", "upload-front");
    group.start.click();
    f.settle();

    f.page.set_fail_read(true);
    group.video.set_frame_size(32, 24);
    group.capture.click();
    f.settle();

    assert_eq!(f.upload.phase("id-front"), Some(Phase::Streaming));
    assert_streaming_visuals(&group);
    assert!(group.input.files().is_empty());
    assert_eq!(group.input.change_events(), 0);
    assert_eq!(f.camera.live_sessions(), 1);
    assert!(f.logger.contains(Level::Error, "Frame capture failed"));

    f.page.set_fail_read(false);
    group.capture.click();
    f.settle();

    assert_eq!(group.input.change_events(), 1);
    assert_eq!(f.camera.live_sessions(), 0);
}
