//! Feed connection lifecycle tests against a local mock server.

use futures_util::{SinkExt, StreamExt};
use maker_ws::{FeedConfig, FeedConnection, FeedState, WsError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const SNAPSHOT: &str = r#"{
    "sequence": "5",
    "bids": [{"id": "b1", "price": "100", "volume": "1"}],
    "asks": [{"id": "a1", "price": "101", "volume": "1"}]
}"#;

const SNAPSHOT_RESYNC: &str = r#"{
    "sequence": "42",
    "bids": [{"id": "b9", "price": "99", "volume": "2"}],
    "asks": [{"id": "a9", "price": "102", "volume": "2"}]
}"#;

const DELTA: &str = r#"{
    "sequence": "6",
    "create_update": {"order_id": "b2", "type": "BID", "price": "99.5", "volume": "3"}
}"#;

/// Accept one connection: expect the auth payload, send the scripted
/// frames, then close.
async fn serve_session(listener: &TcpListener, frames: Vec<Message>) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();

    let auth = ws.next().await.unwrap().unwrap();
    let payload = auth.into_text().unwrap();
    assert!(payload.contains("api_key_id"));
    assert!(payload.contains("api_key_secret"));

    for frame in frames {
        ws.send(frame).await.unwrap();
    }
    let _ = ws.close(None).await;
    while let Some(Ok(_)) = ws.next().await {}
}

async fn bound_listener() -> (TcpListener, FeedConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let mut config = FeedConfig::new(
        format!("ws://127.0.0.1:{port}"),
        "key".to_string(),
        "secret".to_string(),
    );
    config.min_reconnect_interval = Duration::from_millis(10);
    (listener, config)
}

#[tokio::test]
async fn test_connect_snapshot_keepalive_delta() {
    let (listener, config) = bound_listener().await;
    let server = tokio::spawn(async move {
        serve_session(
            &listener,
            vec![
                Message::Text(SNAPSHOT.to_string()),
                Message::Text("\"\"".to_string()),
                Message::Text(DELTA.to_string()),
            ],
        )
        .await;
    });

    let mut connection = FeedConnection::new(config, CancellationToken::new());
    let snapshot = connection.connect().await.unwrap();
    assert_eq!(snapshot.sequence, 5);
    assert_eq!(snapshot.bids.len(), 1);
    assert_eq!(connection.state(), FeedState::Streaming);

    // The keepalive is a valid no-op, not an error.
    let keepalive = connection.recv().await.unwrap();
    assert!(keepalive.is_none());

    let delta = connection.recv().await.unwrap().unwrap();
    assert_eq!(delta.sequence, 6);
    assert!(delta.create_update.is_some());

    // Server close surfaces as a transport error for the reconnect loop.
    let err = connection.recv().await.unwrap_err();
    assert!(matches!(
        err,
        WsError::ConnectionClosed { .. } | WsError::Tungstenite(_)
    ));

    server.await.unwrap();
}

#[tokio::test]
async fn test_reconnect_receives_fresh_snapshot() {
    let (listener, config) = bound_listener().await;
    let server = tokio::spawn(async move {
        serve_session(&listener, vec![Message::Text(SNAPSHOT.to_string())]).await;
        serve_session(&listener, vec![Message::Text(SNAPSHOT_RESYNC.to_string())]).await;
    });

    let mut connection = FeedConnection::new(config, CancellationToken::new());
    let first = connection.connect().await.unwrap();
    assert_eq!(first.sequence, 5);
    assert!(connection.recv().await.is_err());

    // Reconnect is deferred by the backoff rule but always proceeds and
    // yields a fresh snapshot for a new book.
    let second = connection.connect().await.unwrap();
    assert_eq!(second.sequence, 42);
    assert_eq!(connection.attempt_count(), 2);

    server.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_cancels_pending_recv() {
    let (listener, config) = bound_listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _auth = ws.next().await.unwrap().unwrap();
        ws.send(Message::Text(SNAPSHOT.to_string())).await.unwrap();
        // Keep the connection open without sending anything further.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let shutdown = CancellationToken::new();
    let mut connection = FeedConnection::new(config, shutdown.clone());
    connection.connect().await.unwrap();

    let canceller = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.cancel();
        }
    });

    let err = connection.recv().await.unwrap_err();
    assert!(matches!(err, WsError::Shutdown));

    canceller.await.unwrap();
    server.abort();
}
