//! File commands over a live websocket.

use crate::common::*;
use pretty_assertions::assert_eq;
use std::time::Duration;

/// Wait for a spawned PutFile to land; a successful write sends no reply.
async fn wait_for_contents(path: &std::path::Path, expected: &str) {
    for _ in 0..200 {
        if std::fs::read_to_string(path).ok().as_deref() == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never contained {:?}", path.display(), expected);
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let bridge = TestBridge::start(&[], &[]).await;
    let mut client = bridge.connect().await;

    send(&mut client, "PutFile|foo.txt|line1|line2").await;
    wait_for_contents(&bridge.asset_root.path().join("foo.txt"), "line1|line2").await;
    expect_silence(&mut client, Duration::from_millis(50)).await;

    send(&mut client, "GetFile|foo.txt").await;
    assert_eq!(recv(&mut client).await, "File|line1|line2");
}

#[tokio::test]
async fn test_file_list() {
    let bridge = TestBridge::start(&[], &[]).await;
    let sequences = bridge.asset_root.path().join("sequences");
    std::fs::create_dir(&sequences).unwrap();
    std::fs::write(sequences.join("b.txt"), "").unwrap();
    std::fs::write(sequences.join("a.txt"), "").unwrap();
    std::fs::create_dir(bridge.asset_root.path().join("empty")).unwrap();
    let mut client = bridge.connect().await;

    send(&mut client, "GetFileList|sequences").await;
    assert_eq!(recv(&mut client).await, "FileList|a.txt|b.txt");

    send(&mut client, "GetFileList|empty").await;
    assert_eq!(recv(&mut client).await, "FileList|");
}

#[tokio::test]
async fn test_file_failures_are_plain_reports() {
    let bridge = TestBridge::start(&[], &[]).await;
    let mut client = bridge.connect().await;

    send(&mut client, "GetFile|missing.txt").await;
    let report = recv(&mut client).await;
    assert!(report.starts_with("GetFile 'missing.txt' failed:"), "{}", report);

    send(&mut client, "GetFileList|missing").await;
    let report = recv(&mut client).await;
    assert!(report.starts_with("GetFileList 'missing' failed:"), "{}", report);

    send(&mut client, "PutFile|no/such/dir/x.txt|data").await;
    let report = recv(&mut client).await;
    assert!(report.starts_with("PutFile 'no/such/dir/x.txt' failed:"), "{}", report);
}
