//! Single-active-session behavior and shutdown.

use crate::common::*;
use mcu_bridge::Event;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_new_session_replaces_old_without_closing_it() {
    let bridge = TestBridge::start(&["P0"], &[]).await;
    let mut device0 = bridge.firmware("P0");

    let mut first = bridge.connect().await;
    let mut second = bridge.connect().await;

    firmware_says(&mut device0, "OK").await;
    assert_eq!(recv(&mut second).await, "0|OK");
    expect_silence(&mut first, Duration::from_millis(100)).await;

    // The superseded socket is still open and its frames are still routed;
    // the reply goes to the current session.
    send(&mut first, "0|FROM-OLD").await;
    assert_eq!(read_device(&mut device0, 9).await, b"FROM-OLD\n");

    send(&mut first, "Nope|x").await;
    assert_eq!(recv(&mut second).await, "Bad command: Nope");
    expect_silence(&mut first, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let bridge = TestBridge::start(&["P0"], &[]).await;
    let mut device0 = bridge.firmware("P0");

    let mut first = bridge.connect().await;
    first.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    firmware_says(&mut device0, "LOST").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut second = bridge.connect().await;
    firmware_says(&mut device0, "SEEN").await;
    assert_eq!(recv(&mut second).await, "0|SEEN");
}

#[tokio::test]
async fn test_shutdown_closes_open_devices() {
    let bridge = TestBridge::start(&["P0", "P1"], &["P1"]).await;
    let mut device0 = bridge.firmware("P0");

    let (ack_tx, ack_rx) = oneshot::channel();
    bridge.events.send(Event::Shutdown(ack_tx)).unwrap();
    tokio::time::timeout(Duration::from_secs(2), ack_rx)
        .await
        .expect("Shutdown never acknowledged")
        .unwrap();

    let mut rest = Vec::new();
    device0.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}
