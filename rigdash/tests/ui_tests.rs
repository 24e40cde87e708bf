//! UI tests using iced_test Simulator.
//!
//! These tests verify the UI behavior without needing actual Zenoh connections
//! or miners.

use iced_test::simulator;

use rigdash::control::OfflineControl;
use rigdash::layout::Dashboard;
use rigdash::message::Message;
use rigdash::mock;
use rigdash::view::dashboard::{DashboardStatus, dashboard_view};
use rigdash::view::surface::ChartSurface;

fn rendered(devices: Vec<rigdash_common::DeviceSnapshot>) -> Dashboard<ChartSurface> {
    let mut dashboard = Dashboard::new();
    dashboard.render(devices, &OfflineControl);
    dashboard
}

/// Test that the dashboard view renders correctly with no devices.
#[test]
fn test_dashboard_empty() {
    let dashboard = Dashboard::<ChartSurface>::new();
    let status = DashboardStatus::default();
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    // Should show the placeholder message
    assert!(ui.find("Waiting for miner data...").is_ok());
    assert!(ui.find("0 devices").is_ok());
    assert!(ui.find("Disconnected").is_ok());
}

/// Test that the dashboard shows one panel per device.
#[test]
fn test_dashboard_with_devices() {
    let dashboard = rendered(mock::fleet());
    let status = DashboardStatus {
        connected: true,
        ..DashboardStatus::default()
    };
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    assert!(ui.find("192.168.1.31").is_ok());
    assert!(ui.find("192.168.1.32").is_ok());
    assert!(ui.find("192.168.1.33").is_ok());
    assert!(ui.find("3 devices").is_ok());
    assert!(ui.find("Connected").is_ok());
    assert!(ui.find("Waiting for miner data...").is_err());
}

/// Test that sensor panels show the fan captions.
#[test]
fn test_sensor_panel_fan_captions() {
    let dashboard = rendered(vec![mock::faulted("10.0.0.5")]);
    let status = DashboardStatus::default();
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    assert!(ui.find("Fan L: 0 RPM").is_ok());
    assert!(ui.find("Fan R: 3200 RPM").is_ok());
}

/// Test that diagnostic panels show their text.
#[test]
fn test_diagnostic_panel_text() {
    let dashboard = rendered(vec![mock::installing("10.0.0.7")]);
    let status = DashboardStatus::default();
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    assert!(ui.find(mock::INSTALL_LOG).is_ok());
    assert!(ui.find("10.0.0.7").is_ok());
}

/// Test clicking a panel header.
#[test]
fn test_panel_header_opens_management_page() {
    let dashboard = rendered(vec![mock::sensor("10.0.0.8")]);
    let status = DashboardStatus::default();
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    let _ = ui.click("10.0.0.8");

    // Should have produced OpenManagementPage message
    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::OpenManagementPage(address) if address == "10.0.0.8"))
    );
}

/// Test that the header shows the last error.
#[test]
fn test_dashboard_shows_error() {
    let dashboard = Dashboard::<ChartSurface>::new();
    let status = DashboardStatus {
        last_error: Some("router unreachable".to_string()),
        ..DashboardStatus::default()
    };
    let mut ui = simulator(dashboard_view(&dashboard, &status));

    assert!(ui.find("Error: router unreachable").is_ok());
}
