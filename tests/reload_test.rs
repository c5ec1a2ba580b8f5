//! Integration tests for the live-reload subsystem.

use std::fs;
use std::time::Duration;

use sitekit::config::ServerConfig;

mod common;

/// Poll the broadcaster until it reports `count` clients.
async fn wait_for_clients(
    broadcaster: &sitekit::reload::ReloadBroadcaster,
    count: usize,
) {
    for _ in 0..100 {
        if broadcaster.client_count() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "broadcaster never reached {} clients (at {})",
        count,
        broadcaster.client_count()
    );
}

/// Read SSE chunks until `needle` appears or the stream ends.
async fn read_until(res: &mut reqwest::Response, needle: &str) -> String {
    let mut seen = String::new();
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(10), res.chunk())
            .await
            .expect("timed out waiting for SSE data")
            .expect("stream error");
        match chunk {
            Some(bytes) => {
                seen.push_str(&String::from_utf8_lossy(&bytes));
                if seen.contains(needle) {
                    return seen;
                }
            }
            None => panic!("stream ended before '{needle}' appeared; got: {seen}"),
        }
    }
}

/// Read until the stream terminates.
async fn read_to_end(res: &mut reqwest::Response) {
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(10), res.chunk())
            .await
            .expect("timed out waiting for stream end")
            .expect("stream error");
        if chunk.is_none() {
            return;
        }
    }
}

#[tokio::test]
async fn test_subscribe_without_event_stream_accept_is_refused() {
    let (url, broadcaster, _shutdown) = common::spawn_server(ServerConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("{url}/sse"))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 415);
    assert_eq!(broadcaster.client_count(), 0);
}

#[tokio::test]
async fn test_broadcast_reaches_subscriber() {
    let (url, broadcaster, _shutdown) = common::spawn_server(ServerConfig::default()).await;
    let client = common::client();

    let mut res = client
        .get(format!("{url}/sse"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    wait_for_clients(&broadcaster, 1).await;
    broadcaster.send("reload", r#"{"kind":"modify"}"#);

    let seen = read_until(&mut res, "event: reload").await;
    assert!(seen.contains(r#"{"kind":"modify"}"#));
}

#[tokio::test]
async fn test_close_all_ends_streams_and_empties_registry() {
    let (url, broadcaster, _shutdown) = common::spawn_server(ServerConfig::default()).await;
    let client = common::client();

    let mut res = client
        .get(format!("{url}/sse"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    wait_for_clients(&broadcaster, 1).await;

    broadcaster.close_all();
    assert_eq!(broadcaster.client_count(), 0);

    read_to_end(&mut res).await;

    // A later broadcast reaches zero channels and must not error.
    broadcaster.send("reload", "{}");
}

// The watcher couples "notify" with "drop all subscribers" on purpose:
// a client that reloads reconnects with a fresh subscription, so keeping
// the old channel around would only leak it.
#[tokio::test]
async fn test_file_change_broadcasts_reload_then_closes_channels() {
    let dir = common::scratch_dir("watch");
    let mut config = ServerConfig::default();
    config.dev = true;
    config.static_dir = dir.to_string_lossy().into_owned();

    let (url, broadcaster, _shutdown) = common::spawn_server(config).await;
    let client = common::client();

    let mut res = client
        .get(format!("{url}/sse"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    wait_for_clients(&broadcaster, 1).await;

    // Give the watcher a moment, then trigger it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(dir.join("index.html"), "<html>changed</html>").unwrap();

    let seen = read_until(&mut res, "event: reload").await;
    assert!(seen.contains("reload"));

    // The broadcast is followed by close-all; the stream terminates.
    read_to_end(&mut res).await;
    wait_for_clients(&broadcaster, 0).await;
}

#[tokio::test]
async fn test_updater_script_in_dev_mode() {
    let mut config = ServerConfig::default();
    config.dev = true;
    let (url, _, _shutdown) = common::spawn_server(config).await;
    let client = common::client();

    let res = client.get(format!("{url}/updater.js")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    let body = res.text().await.unwrap();
    assert!(body.contains("EventSource"));
    assert!(body.contains("/sse"));
}

#[tokio::test]
async fn test_updater_script_is_noop_in_production() {
    let (url, _, _shutdown) = common::spawn_server(ServerConfig::default()).await;
    let client = common::client();

    let res = client.get(format!("{url}/updater.js")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), ";");
}
