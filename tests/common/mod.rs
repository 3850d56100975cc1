//! Shared test utilities for MCU bridge tests.
//!
//! This module provides common test infrastructure including:
//! - A fully started bridge (registry, initializer, websocket) on mock ports
//! - Websocket client helpers with timeouts
//! - Firmware-side read/write helpers

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use mcu_bridge::{
    transport, Bridge, DeviceRegistry, Event, FileGateway, InitSummary, MockPortOpener,
    PortInitializer,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for a frame that should arrive.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Build a device file with one record per port name.
pub fn devices_json(ports: &[&str]) -> String {
    let records: Vec<String> = ports
        .iter()
        .enumerate()
        .map(|(i, port)| {
            format!(
                r#"{{"deviceName": "Board {}", "portName": "{}", "portSettings": "115200|8|1|none", "port": null}}"#,
                i, port
            )
        })
        .collect();
    format!("[{}]", records.join(","))
}

/// A running bridge backed by mock ports and a temporary asset root.
pub struct TestBridge {
    pub url: String,
    pub opener: MockPortOpener,
    pub events: mpsc::UnboundedSender<Event>,
    pub asset_root: TempDir,
    pub summary: InitSummary,
}

impl TestBridge {
    /// Start a bridge for `ports`; opens of `failing` ports are refused.
    pub async fn start(ports: &[&str], failing: &[&str]) -> Self {
        let opener = MockPortOpener::new();
        for port in failing {
            opener.fail_port(*port);
        }

        let registry =
            DeviceRegistry::from_json(&devices_json(ports)).expect("Invalid device file");
        let targets = registry.open_targets();
        let asset_root = tempfile::tempdir().expect("Failed to create asset root");

        let (events, events_rx) = mpsc::unbounded_channel();
        let bridge = Bridge::new(registry, FileGateway::new(asset_root.path()), events.clone());
        tokio::spawn(bridge.run(events_rx));

        let transport_events = events.clone();
        let (summary, addr) = PortInitializer::new(
            Arc::new(opener.clone()),
            targets,
            Duration::from_millis(5),
            events.clone(),
        )
        .run(|summary| async move {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind");
            let addr = listener.local_addr().expect("Failed to get address");
            tokio::spawn(async move {
                transport::serve(listener, transport_events)
                    .await
                    .expect("Server failed");
            });
            (summary, addr)
        })
        .await;

        Self {
            url: format!("ws://{}/", addr),
            opener,
            events,
            asset_root,
            summary,
        }
    }

    /// Take the firmware end of an opened mock port.
    pub fn firmware(&self, port: &str) -> DuplexStream {
        self.opener
            .take_device(port)
            .unwrap_or_else(|| panic!("Port {} was not opened", port))
    }

    /// Connect a client and wait until the bridge treats it as current.
    pub async fn connect(&self) -> Client {
        let (mut client, _) = connect_async(self.url.as_str()).await.expect("Failed to connect");
        sync_session(&mut client).await;
        client
    }
}

/// Send one text frame.
pub async fn send(client: &mut Client, frame: &str) {
    client
        .send(Message::Text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Receive the next text frame, failing after a timeout.
pub async fn recv(client: &mut Client) -> String {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("Timeout waiting for frame")
            .expect("Connection closed")
            .expect("WebSocket error");
        match msg {
            Message::Text(text) => return text,
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected text frame, got {:?}", other),
        }
    }
}

/// Assert that no text frame arrives within `window`.
pub async fn expect_silence(client: &mut Client, window: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(window, client.next()).await {
        panic!("Expected no frame, got {:?}", text);
    }
}

/// Round-trip an unknown command so the session is known to be attached.
pub async fn sync_session(client: &mut Client) {
    send(client, "Sync|probe").await;
    assert_eq!(recv(client).await, "Bad command: Sync");
}

/// Read exactly `n` bytes written to a device.
pub async fn read_device(firmware: &mut DuplexStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    tokio::time::timeout(RECV_TIMEOUT, firmware.read_exact(&mut buf))
        .await
        .expect("Timeout waiting for device write")
        .expect("Device link closed");
    buf
}

/// Emit one line from the firmware side.
pub async fn firmware_says(firmware: &mut DuplexStream, line: &str) {
    firmware
        .write_all(format!("{}\n", line).as_bytes())
        .await
        .expect("Failed to write firmware line");
}
