//! Concurrent trouble-code collection

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeDevice;
use obd_core::{ErrorKind, ModuleInfo, ObdDevice};
use obd_telemetry::{clear_trouble_codes, collect_trouble_codes};
use pretty_assertions::assert_eq;

fn modules() -> Vec<ModuleInfo> {
    vec![
        ModuleInfo::new(0x7E0, "Engine"),
        ModuleInfo::new(0x7E1, "Transmission"),
        ModuleInfo::new(0x7E2, "Hybrid"),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_results_keep_module_order() {
    let device: Arc<dyn ObdDevice> = Arc::new(
        FakeDevice::supporting(&[])
            .with_codes(0x7E0, &[0x0123, 0xC156])
            .with_codes(0x7E1, &[0x0700])
            .with_delay(0x7E0, Duration::from_millis(300)),
    );

    let results = collect_trouble_codes(device, modules()).await;

    let addresses: Vec<u32> = results.iter().map(|r| r.module.address).collect();
    assert_eq!(addresses, vec![0x7E0, 0x7E1, 0x7E2]);

    let codes: Vec<Vec<String>> = results
        .iter()
        .map(|r| {
            r.codes
                .as_ref()
                .unwrap()
                .iter()
                .map(|c| c.to_string())
                .collect()
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            vec!["P0123".to_string(), "U0156".to_string()],
            vec!["P0700".to_string()],
            vec![],
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fetches_run_concurrently() {
    let device: Arc<dyn ObdDevice> = Arc::new(
        FakeDevice::supporting(&[])
            .with_delay(0x7E0, Duration::from_millis(500))
            .with_delay(0x7E1, Duration::from_millis(500))
            .with_delay(0x7E2, Duration::from_millis(500)),
    );

    let start = tokio::time::Instant::now();
    collect_trouble_codes(device, modules()).await;

    assert!(start.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_failure_is_isolated() {
    let device: Arc<dyn ObdDevice> = Arc::new(
        FakeDevice::supporting(&[])
            .with_codes(0x7E0, &[0x0101])
            .with_failing_codes(0x7E1, "timeout")
            .with_codes(0x7E2, &[0x9234]),
    );

    let results = collect_trouble_codes(device, modules()).await;

    assert_eq!(results[0].codes.as_ref().unwrap()[0].code, "P0101");
    assert_eq!(
        results[1].codes.as_ref().unwrap_err().kind(),
        ErrorKind::DeviceUnavailable
    );
    assert_eq!(results[2].codes.as_ref().unwrap()[0].code, "B1234");
}

#[tokio::test]
async fn test_clear_every_module() {
    let device = FakeDevice::supporting(&[]);
    let results = clear_trouble_codes(&device, &modules()).await;

    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(*device.cleared.lock(), vec![0x7E0, 0x7E1, 0x7E2]);
}
