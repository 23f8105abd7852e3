//! Socket-level integration tests
//!
//! Each test plays the subscriber side with a real WebSocket listener and
//! drives the relay (or its hub components directly) against it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;

use lyric_relay::error::Result;
use lyric_relay::{
    BroadcastHub, ConnectionSupervisor, ConnectionTable, LyricLine, LyricRelay, LyricsProvider,
    PlayerEvent, RelayConfig, RelayStats, StateStore, Word,
};

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    (listener, address)
}

async fn accept_ws(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept())
        .await
        .expect("timed out waiting for connection")
        .unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        let message = timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection ended")
            .expect("websocket error");
        if message.is_text() {
            return message.into_text().unwrap().to_string();
        }
    }
}

/// Poll until `check` passes or the deadline hits
async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

struct Fixture {
    store: Arc<StateStore>,
    table: Arc<ConnectionTable>,
    hub: Arc<BroadcastHub>,
    supervisor: Arc<ConnectionSupervisor>,
    stats: Arc<RelayStats>,
}

fn fixture(addresses: Vec<String>) -> Fixture {
    let config = RelayConfig::with_addresses(addresses)
        .reconnect_delay(Duration::from_millis(50))
        .connect_timeout(Duration::from_secs(2));

    let store = Arc::new(StateStore::new());
    let table = Arc::new(ConnectionTable::new());
    let stats = Arc::new(RelayStats::new());
    let hub = Arc::new(BroadcastHub::new(
        Arc::clone(&store),
        Arc::clone(&table),
        Arc::clone(&stats),
    ));
    let supervisor = Arc::new(ConnectionSupervisor::new(
        config,
        Arc::clone(&table),
        Arc::clone(&hub),
        Arc::clone(&stats),
    ));

    Fixture {
        store,
        table,
        hub,
        supervisor,
        stats,
    }
}

fn three_lines() -> Vec<LyricLine> {
    vec![
        LyricLine::new(0, vec![Word::new("first")]),
        LyricLine::new(2000, vec![Word::new("second")]),
        LyricLine::new(4000, vec![Word::new("third")]),
    ]
}

const THREE_LINES_FRAME: &str = concat!(
    r#"{"lyrics":[{"time":0,"words":[{"string":"first"}]},"#,
    r#"{"time":2000,"words":[{"string":"second"}]},"#,
    r#"{"time":4000,"words":[{"string":"third"}]}]}"#
);

#[tokio::test]
async fn catch_up_send_on_open_and_idempotent_connect() {
    init_tracing();
    let (listener, address) = bind().await;
    let f = fixture(vec![address.clone()]);

    // Snapshot exists before the subscriber connects
    f.store.set_lyrics(Some(three_lines())).await;
    f.store.set_timestamp(42).await;

    f.supervisor.connect(&address).await;
    f.supervisor.connect(&address).await;

    // Late joiner receives the full snapshot, lyrics frame first
    let mut ws = accept_ws(&listener).await;
    assert_eq!(next_text(&mut ws).await, THREE_LINES_FRAME);
    assert_eq!(next_text(&mut ws).await, r#"{"time":42}"#);

    // The second connect() was a no-op: one handle, no second connection
    assert_eq!(f.table.len().await, 1);
    assert!(timeout(Duration::from_millis(300), listener.accept())
        .await
        .is_err());

    f.supervisor.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_every_close() {
    init_tracing();
    let (listener, address) = bind().await;
    let f = fixture(vec![address.clone()]);
    f.store.set_timestamp(1).await;

    f.supervisor.connect(&address).await;

    // First connection: graceful close from the subscriber side
    let mut ws = accept_ws(&listener).await;
    assert_eq!(next_text(&mut ws).await, r#"{"lyrics":null}"#);
    assert_eq!(next_text(&mut ws).await, r#"{"time":1}"#);
    ws.close(None).await.unwrap();
    drop(ws);

    // Second connection: catch-up arrives again, then the transport drops
    let mut ws = accept_ws(&listener).await;
    assert_eq!(next_text(&mut ws).await, r#"{"lyrics":null}"#);
    assert_eq!(next_text(&mut ws).await, r#"{"time":1}"#);
    drop(ws);

    // Third connection still happens: reconnection is unbounded
    let mut ws = accept_ws(&listener).await;
    assert_eq!(next_text(&mut ws).await, r#"{"lyrics":null}"#);

    assert_eq!(f.stats.snapshot().connects, 3);
    f.supervisor.shutdown().await;
}

#[tokio::test]
async fn broadcast_fans_out_and_unreachable_address_is_harmless() {
    init_tracing();
    let (listener_a, addr_a) = bind().await;
    let (listener_b, addr_b) = bind().await;
    let (listener_c, addr_c) = bind().await;

    // A port nobody listens on
    let dead_addr = {
        let (listener, addr) = bind().await;
        drop(listener);
        addr
    };

    let f = fixture(vec![
        addr_a.clone(),
        addr_b.clone(),
        addr_c.clone(),
        dead_addr,
    ]);
    f.supervisor.connect_all().await;

    let mut ws_a = accept_ws(&listener_a).await;
    let mut ws_b = accept_ws(&listener_b).await;
    let mut ws_c = accept_ws(&listener_c).await;

    let table = Arc::clone(&f.table);
    wait_until(|| {
        let table = Arc::clone(&table);
        async move { table.len().await == 3 }
    })
    .await;

    // Store was uninitialized while the connections opened, so no catch-up
    // frames were sent; the broadcast below is the first traffic.
    f.store.set_lyrics(Some(three_lines())).await;
    f.store.set_timestamp(9000).await;

    f.hub.broadcast_all().await;

    for ws in [&mut ws_a, &mut ws_b, &mut ws_c] {
        assert_eq!(next_text(ws).await, THREE_LINES_FRAME);
        assert_eq!(next_text(ws).await, r#"{"time":9000}"#);
    }

    // The unreachable subscriber keeps failing and retrying, nothing more
    let stats = Arc::clone(&f.stats);
    wait_until(|| {
        let stats = Arc::clone(&stats);
        async move { stats.snapshot().connect_failures >= 2 }
    })
    .await;

    f.supervisor.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_handles_and_cancels_reconnect() {
    init_tracing();
    let (listener, address) = bind().await;
    let f = fixture(vec![address.clone()]);

    f.supervisor.connect(&address).await;
    let mut ws = accept_ws(&listener).await;

    let table = Arc::clone(&f.table);
    wait_until(|| {
        let table = Arc::clone(&table);
        async move { table.len().await == 1 }
    })
    .await;

    f.supervisor.shutdown().await;

    // Subscriber observes the close
    loop {
        match timeout(WAIT, ws.next()).await.expect("no close observed") {
            None => break,
            Some(Ok(msg)) if msg.is_close() => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }

    // No handle left, no reconnect attempt after shutdown
    assert!(f.table.is_empty().await);
    assert!(timeout(Duration::from_millis(300), listener.accept())
        .await
        .is_err());
}

/// Canned provider for the end-to-end scenario
struct FakeProvider {
    tracks: HashMap<String, Option<Vec<LyricLine>>>,
}

impl LyricsProvider for FakeProvider {
    async fn fetch_lyrics(&self, track_id: &str) -> Result<Option<Vec<LyricLine>>> {
        Ok(self.tracks.get(track_id).cloned().flatten())
    }
}

#[tokio::test]
async fn relay_end_to_end_track_change_and_progress() {
    init_tracing();
    let (listener, address) = bind().await;

    let provider = FakeProvider {
        tracks: HashMap::from([
            ("t1".to_string(), Some(three_lines())),
            ("t2".to_string(), None),
        ]),
    };
    let config = RelayConfig::with_addresses([address])
        .reconnect_delay(Duration::from_millis(50))
        .connect_timeout(Duration::from_secs(2));
    let (relay, events) = LyricRelay::new(config, provider);
    let table = Arc::clone(relay.connections());

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let relay_task = tokio::spawn(relay.run_until(async {
        let _ = stop_rx.await;
    }));

    let mut ws = accept_ws(&listener).await;
    wait_until(|| {
        let table = Arc::clone(&table);
        async move { table.len().await == 1 }
    })
    .await;

    // Track with synced lyrics: lyrics frame then time frame (still unknown)
    events
        .send(PlayerEvent::TrackChanged {
            track_id: Some("t1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(next_text(&mut ws).await, THREE_LINES_FRAME);
    assert_eq!(next_text(&mut ws).await, r#"{"time":null}"#);

    // Progress tick
    events
        .send(PlayerEvent::Progress { position_ms: 5000 })
        .await
        .unwrap();
    assert_eq!(next_text(&mut ws).await, THREE_LINES_FRAME);
    assert_eq!(next_text(&mut ws).await, r#"{"time":5000}"#);

    // Duplicate tick broadcasts nothing; the next frames on the wire come
    // from the change to a track without lyrics
    events
        .send(PlayerEvent::Progress { position_ms: 5000 })
        .await
        .unwrap();
    events
        .send(PlayerEvent::TrackChanged {
            track_id: Some("t2".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(next_text(&mut ws).await, r#"{"lyrics":null}"#);
    assert_eq!(next_text(&mut ws).await, r#"{"time":5000}"#);

    let _ = stop_tx.send(());
    timeout(WAIT, relay_task).await.unwrap().unwrap();
}
