// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the scanner screen

mod common;

use barcode_scanner::app::{self, AlertButton, AppModel, Message};
use barcode_scanner::backends::permission::PermissionState;
use barcode_scanner::constants::text;
use barcode_scanner::scanner::ScannerOptions;
use common::{CameraMonitor, FakePermission, FakeSettings, controller_with};
use ratatui::{Terminal, backend::TestBackend};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn model_with(answer: PermissionState) -> (AppModel, Arc<CameraMonitor>, Arc<FakeSettings>) {
    let (controller, camera) =
        controller_with(FakePermission::answering(answer), ScannerOptions::default());
    let settings = Arc::new(FakeSettings::default());
    let model = AppModel::new(
        controller,
        settings.clone(),
        tokio::runtime::Handle::current(),
        false,
    );
    (model, camera, settings)
}

fn render(model: &AppModel) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|f| app::draw(f, model)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}

async fn apply(model: &mut AppModel, message: Message) {
    if let Some(task) = model.update(message) {
        task.await.unwrap();
    }
    model.poll_events();
}

#[tokio::test]
async fn test_appear_starts_scanning() {
    let (mut model, camera, _) = model_with(PermissionState::Granted);
    assert!(!model.is_scanning());

    model.on_appear().unwrap().await.unwrap();
    assert!(model.is_scanning());
    assert_eq!(camera.starts(), 1);

    // Appearing again while shown does nothing
    assert!(model.on_appear().is_none());

    model.on_disappear();
    assert!(!model.is_scanning());
    assert!(!camera.is_running());
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let (mut model, _, _) = model_with(PermissionState::Granted);

    apply(&mut model, Message::ToggleScanning).await;
    assert!(model.is_scanning());

    apply(&mut model, Message::ToggleScanning).await;
    assert!(!model.is_scanning());
}

#[tokio::test]
async fn test_controls_follow_controller_state() {
    let (mut model, _, _) = model_with(PermissionState::Granted);

    let screen = render(&model);
    assert!(screen.contains("[space] Start Scan"));
    assert!(screen.contains(text::PREVIEW_PLACEHOLDER));

    apply(&mut model, Message::ToggleScanning).await;
    let screen = render(&model);
    assert!(screen.contains("[space] Pause"));
    assert!(screen.contains(text::WAITING_FOR_CAMERA));
}

#[tokio::test]
async fn test_scanned_value_is_displayed() {
    let (mut model, _, _) = model_with(PermissionState::Granted);
    apply(&mut model, Message::ToggleScanning).await;

    let screen = render(&model);
    assert!(!screen.contains(text::SCANNED_VALUE_LABEL));

    // Decode callback as invoked by the decode loop
    controller_of(&model).handle_decoded("WIFI:S:home;;");
    let screen = render(&model);
    assert!(screen.contains(text::SCANNED_VALUE_LABEL));
    assert!(screen.contains("WIFI:S:home;;"));
}

#[tokio::test]
async fn test_reset_clears_displayed_value() {
    let (mut model, camera, _) = model_with(PermissionState::Granted);
    apply(&mut model, Message::ToggleScanning).await;
    controller_of(&model).handle_decoded("ZX-42");

    apply(&mut model, Message::Reset).await;

    assert!(model.snapshot().detection.is_none());
    assert!(model.is_scanning());
    assert_eq!(camera.starts(), 2);
    assert!(!render(&model).contains("ZX-42"));
}

#[tokio::test]
async fn test_denied_permission_shows_alert() {
    let (mut model, camera, _) = model_with(PermissionState::Denied);

    model.on_appear().unwrap().await.unwrap();
    model.poll_events();

    let alert = model.alert().expect("alert should be open");
    assert_eq!(alert.title, text::ACCESS_REQUIRED_TITLE);
    assert_eq!(alert.focused, AlertButton::OpenSettings);
    assert!(!model.is_scanning());
    assert_eq!(camera.starts(), 0);

    let screen = render(&model);
    assert!(screen.contains(text::ACCESS_REQUIRED_TITLE));
    assert!(screen.contains(text::OPEN_SETTINGS));
    assert!(screen.contains(text::CANCEL));
}

#[tokio::test]
async fn test_open_settings_dismisses_alert() {
    let (mut model, _, settings) = model_with(PermissionState::Denied);
    model.on_appear().unwrap().await.unwrap();
    model.poll_events();

    apply(&mut model, Message::OpenSettings).await;

    assert_eq!(settings.opened(), 1);
    assert!(model.alert().is_none());
    assert!(!model.snapshot().permission_denied);
}

#[tokio::test]
async fn test_cancel_dismisses_without_settings() {
    let (mut model, _, settings) = model_with(PermissionState::Denied);
    model.on_appear().unwrap().await.unwrap();
    model.poll_events();

    apply(&mut model, Message::DismissAlert).await;

    assert_eq!(settings.opened(), 0);
    assert!(model.alert().is_none());
    assert!(!render(&model).contains(text::ACCESS_REQUIRED_TITLE));
}

#[tokio::test]
async fn test_focused_button_activates() {
    let (mut model, _, settings) = model_with(PermissionState::Denied);
    model.on_appear().unwrap().await.unwrap();
    model.poll_events();

    apply(&mut model, Message::CycleAlertFocus).await;
    assert_eq!(model.alert().unwrap().focused, AlertButton::Cancel);

    apply(&mut model, Message::ActivateAlertFocus).await;
    assert!(model.alert().is_none());
    assert_eq!(settings.opened(), 0);
}

#[tokio::test]
async fn test_settings_failure_is_reported() {
    let (mut model, _, settings) = model_with(PermissionState::Denied);
    settings.fail.store(true, Ordering::SeqCst);
    model.on_appear().unwrap().await.unwrap();
    model.poll_events();

    apply(&mut model, Message::OpenSettings).await;

    assert!(model.alert().is_none());
    assert!(model.status().unwrap().starts_with("Error:"));
}

#[tokio::test]
async fn test_quit_message() {
    let (mut model, _, _) = model_with(PermissionState::Granted);
    apply(&mut model, Message::Quit).await;
    assert!(model.should_quit());
}

fn controller_of(model: &AppModel) -> barcode_scanner::ScannerController {
    model.controller().clone()
}
