//! Obd2Device against the simulated vehicle network

use std::sync::Arc;
use std::time::Duration;

use obd_core::{ErrorKind, IgnitionType, LiveQuery, ObdDevice};
use obd_device::transport::mock::{MockTransportAdapter, MOCK_VIN};
use obd_device::{DeviceConfig, MockConfig, Obd2Device, TransportAdapter};
use pretty_assertions::assert_eq;

fn mock_device() -> (Arc<MockTransportAdapter>, Obd2Device) {
    let mock = Arc::new(MockTransportAdapter::new(&MockConfig::default()));
    let config = DeviceConfig {
        request_timeout_ms: 10,
        refresh_ms: 3_600_000,
        ..DeviceConfig::default()
    };
    let device = Obd2Device::with_transport(mock.clone(), config);
    (mock, device)
}

#[tokio::test]
async fn test_connect_mock_network() {
    let device = Obd2Device::connect(DeviceConfig::for_network("mock"))
        .await
        .unwrap();
    let pids = device.supported_pids(0x7E0).await.unwrap();
    assert!(pids.contains(&0x0C));
}

#[tokio::test]
async fn test_supported_pids() {
    let (_mock, device) = mock_device();
    let pids: Vec<u16> = device.supported_pids(0x7E0).await.unwrap().into_iter().collect();
    assert_eq!(pids, vec![0x01, 0x04, 0x05, 0x0C, 0x0D, 0x11, 0x20, 0x2F]);
}

#[tokio::test]
async fn test_supported_pids_unreachable_module() {
    let (_mock, device) = mock_device();
    let err = device.supported_pids(0x7E4).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
}

#[tokio::test]
async fn test_modules_in_address_order() {
    let (_mock, device) = mock_device();
    let modules = device.modules().await.unwrap();
    let rendered: Vec<String> = modules.iter().map(|m| m.to_string()).collect();
    assert_eq!(rendered, vec!["7E0: Engine", "7E1: Transmission"]);
}

#[tokio::test]
async fn test_vehicle_info() {
    let (_mock, device) = mock_device();
    let info = device.vehicle_info().await.unwrap();
    assert_eq!(info.vin, MOCK_VIN);
    assert_eq!(info.ignition, IgnitionType::Spark);
    assert_eq!(info.modules.len(), 2);
}

#[tokio::test]
async fn test_vehicle_info_disconnected() {
    let (mock, device) = mock_device();
    mock.set_connected(false);
    mock.set_reconnectable(false);
    let err = device.vehicle_info().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
}

#[tokio::test]
async fn test_dropped_transport_is_reconnected() {
    let (mock, device) = mock_device();
    mock.set_connected(false);

    let info = device.vehicle_info().await.unwrap();
    assert_eq!(info.vin, MOCK_VIN);
    assert!(mock.is_connected().await);

    mock.set_connected(false);
    assert!(device.supported_pids(0x7E0).await.unwrap().contains(&0x0C));
}

#[tokio::test]
async fn test_primary_module_from_config() {
    let (_mock, device) = mock_device();
    assert_eq!(device.primary_module(), 0x7E0);

    let mock = Arc::new(MockTransportAdapter::new(&MockConfig::default()));
    let config = DeviceConfig {
        primary_module: 0x7E1,
        ..DeviceConfig::default()
    };
    let device = Obd2Device::with_transport(mock, config);
    assert_eq!(device.primary_module(), 0x7E1);
}

#[tokio::test]
async fn test_trouble_codes_and_clear() {
    let (_mock, device) = mock_device();

    let codes: Vec<String> = device
        .trouble_codes(0x7E0)
        .await
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(codes, vec!["P0123", "U0156"]);

    device.clear_trouble_codes(0x7E0).await.unwrap();
    assert!(device.trouble_codes(0x7E0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bound_query_refresh() {
    let (mock, device) = mock_device();
    let rpm = device.bind_live_query(0x7E0, 0x01, 0x0C, Some("(256*A+B)/4"));
    let speed = device.bind_live_query(0x7E0, 0x01, 0x0D, None);

    device.live_queries().refresh_now().await;
    assert_eq!(rpm.current_value().unwrap(), 750.0);
    assert_eq!(speed.current_raw().unwrap(), vec![0x32]);

    mock.add_response(0x7E0, vec![0x01, 0x0C], vec![0x41, 0x0C, 0x1A, 0xF8]);
    device.live_queries().refresh_now().await;
    assert_eq!(rpm.current_value().unwrap(), 1726.0);
}

#[tokio::test]
async fn test_set_refresh_interval() {
    let (_mock, device) = mock_device();
    device.set_refresh_interval(Duration::from_millis(500));
    assert_eq!(
        device.live_queries().refresh_interval(),
        Duration::from_millis(500)
    );
}
