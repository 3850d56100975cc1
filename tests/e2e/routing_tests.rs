//! Device addressing, broadcast and inbound forwarding over a live websocket.

use crate::common::*;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn test_every_device_is_attempted_once_in_order() {
    let bridge = TestBridge::start(&["P0", "P1", "P2", "P3"], &["P1"]).await;

    assert_eq!(bridge.summary.opened, 3);
    assert_eq!(bridge.summary.failed, 1);

    let attempts = bridge.opener.attempts();
    let ports: Vec<_> = attempts.iter().map(|a| a.port_name.as_str()).collect();
    assert_eq!(ports, vec!["P0", "P1", "P2", "P3"]);
    assert_eq!(
        attempts.iter().map(|a| a.succeeded).collect::<Vec<_>>(),
        vec![true, false, true, true]
    );
}

#[tokio::test]
async fn test_device_addressed_write() {
    let bridge = TestBridge::start(&["P0", "P1", "P2"], &[]).await;
    let mut device0 = bridge.firmware("P0");
    let mut device2 = bridge.firmware("P2");
    let mut client = bridge.connect().await;

    send(&mut client, "2|RUN").await;
    send(&mut client, "0|SET|SPEED|40").await;

    assert_eq!(read_device(&mut device2, 4).await, b"RUN\n");
    assert_eq!(read_device(&mut device0, 13).await, b"SET|SPEED|40\n");
    expect_silence(&mut client, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_out_of_range_device_is_reported_without_write() {
    let bridge = TestBridge::start(&["P0", "P1", "P2"], &[]).await;
    let mut device0 = bridge.firmware("P0");
    let mut client = bridge.connect().await;

    send(&mut client, "5|RUN").await;
    assert_eq!(recv(&mut client).await, "Bad device ID: 5 (have 3 devices)");

    // The next valid write is the first thing any device sees.
    send(&mut client, "0|NEXT").await;
    assert_eq!(read_device(&mut device0, 5).await, b"NEXT\n");
}

#[tokio::test]
async fn test_broadcast_ignores_device_state() {
    let bridge = TestBridge::start(&["P0", "P1", "P2"], &["P1"]).await;
    let mut device0 = bridge.firmware("P0");
    let mut device2 = bridge.firmware("P2");
    let mut client = bridge.connect().await;

    send(&mut client, "Broadcast|STOP").await;

    assert_eq!(read_device(&mut device0, 5).await, b"STOP\n");
    assert_eq!(read_device(&mut device2, 5).await, b"STOP\n");
    // The failed device's write fails silently.
    expect_silence(&mut client, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_write_to_failed_device_is_silent() {
    let bridge = TestBridge::start(&["P0", "P1"], &["P1"]).await;
    let mut client = bridge.connect().await;

    send(&mut client, "1|RUN").await;

    expect_silence(&mut client, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_firmware_line_is_forwarded_with_device_id() {
    let bridge = TestBridge::start(&["P0", "P1"], &[]).await;
    let mut device1 = bridge.firmware("P1");
    let mut client = bridge.connect().await;

    firmware_says(&mut device1, "OK").await;
    assert_eq!(recv(&mut client).await, "1|OK");

    firmware_says(&mut device1, "TEMP|21.5").await;
    assert_eq!(recv(&mut client).await, "1|TEMP|21.5");
}

#[tokio::test]
async fn test_firmware_line_without_session_is_only_logged() {
    let bridge = TestBridge::start(&["P0"], &[]).await;
    let mut device0 = bridge.firmware("P0");

    // Nobody is connected; the line is logged and dropped.
    firmware_says(&mut device0, "BOOT").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut client = bridge.connect().await;
    firmware_says(&mut device0, "READY").await;
    assert_eq!(recv(&mut client).await, "0|READY");
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let bridge = TestBridge::start(&["P0"], &[]).await;
    let mut client = bridge.connect().await;

    send(&mut client, "ab").await;
    send(&mut client, "no delimiter").await;
    send(&mut client, "Unknown|x").await;

    // Only the unknown command produced a report.
    assert_eq!(recv(&mut client).await, "Bad command: Unknown");
    expect_silence(&mut client, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_no_devices_still_accepts_sessions() {
    let bridge = TestBridge::start(&[], &[]).await;
    let mut client = bridge.connect().await;

    send(&mut client, "0|RUN").await;
    assert_eq!(recv(&mut client).await, "Bad device ID: 0 (have 0 devices)");
}
