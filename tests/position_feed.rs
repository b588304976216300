// Integration tests for hand sample ingestion

mod common;

use common::{test_config, wait_until, FakeLink, CENTER};
use hand_follow_rs::communication::FeedStats;
use hand_follow_rs::config::FeedConfig;
use hand_follow_rs::tracking::TickOutcome;
use hand_follow_rs::{shutdown_channel, ControlLoop, ManualTicker, Position3, PositionFeed, SharedLatestPosition};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::net::UdpSocket;

fn ephemeral_feed_config() -> FeedConfig {
    FeedConfig {
        bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        ..FeedConfig::default()
    }
}

#[test]
fn test_concurrent_writers_never_produce_torn_reads() {
    let latest = SharedLatestPosition::new();
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let latest = latest.clone();
            thread::spawn(move || {
                for i in 0..20_000u32 {
                    let k = f64::from(w * 100_000 + i);
                    latest.store(Position3::new(k, 2.0 * k, 3.0 * k));
                }
            })
        })
        .collect();

    let reader = {
        let latest = latest.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut observed = 0u64;
            while !done.load(Ordering::Acquire) {
                let p = latest.load();
                assert_eq!(p.y, 2.0 * p.x, "torn read: {:?}", p);
                assert_eq!(p.z, 3.0 * p.x, "torn read: {:?}", p);
                observed += 1;
            }
            observed
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);
    assert!(reader.join().unwrap() > 0);
}

#[tokio::test]
async fn test_last_sample_wins() {
    let latest = SharedLatestPosition::new();
    let feed = PositionFeed::bind(&ephemeral_feed_config(), latest.clone()).await.unwrap();
    for i in 0..10 {
        let payload = format!(r#"{{"x": {i}, "y": 0, "z": 0}}"#);
        feed.handle_datagram(payload.as_bytes()).unwrap();
    }
    assert_eq!(latest.load(), Position3::new(9.0, 0.0, 0.0));
}

#[tokio::test]
async fn test_partial_record_is_dropped_and_feed_keeps_listening() {
    let latest = SharedLatestPosition::new();
    let feed = PositionFeed::bind(&ephemeral_feed_config(), latest.clone()).await.unwrap();
    let addr = feed.local_addr().unwrap();
    let stats = feed.stats();
    let (shutdown, signal) = shutdown_channel();
    let task = tokio::spawn(feed.run(signal));

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(br#"{"x": 1.0, "y": 2.0, "z": 3.0}"#, addr).await.unwrap();
    wait_until(|| stats.snapshot().samples_accepted == 1).await;

    sender.send_to(br#"{"x": 7.0, "z": 7.0}"#, addr).await.unwrap();
    sender.send_to(&[0xc3, 0x28], addr).await.unwrap();
    wait_until(|| stats.snapshot().datagrams_dropped == 2).await;
    assert_eq!(latest.load(), Position3::new(1.0, 2.0, 3.0));

    sender.send_to(br#"{"x": -4.0, "y": 5.5, "z": 0.0}"#, addr).await.unwrap();
    wait_until(|| stats.snapshot().samples_accepted == 2).await;
    assert_eq!(latest.load(), Position3::new(-4.0, 5.5, 0.0));
    assert_eq!(
        stats.snapshot(),
        FeedStats { datagrams_received: 4, samples_accepted: 2, datagrams_dropped: 2 }
    );

    shutdown.trigger();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_udp_sample_drives_velocity_command() {
    let latest = SharedLatestPosition::new();
    let feed = PositionFeed::bind(&ephemeral_feed_config(), latest.clone()).await.unwrap();
    let addr = feed.local_addr().unwrap();
    let (shutdown, signal) = shutdown_channel();
    let feed_task = tokio::spawn(feed.run(signal));

    let link = FakeLink::at(CENTER);
    let (ticker, _ticks) = ManualTicker::new();
    let mut control = ControlLoop::new(&test_config(), link.clone(), latest.clone(), ticker).unwrap();
    control.start().await.unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(br#"{"x": 0, "y": 0, "z": 150}"#, addr).await.unwrap();
    wait_until(|| latest.load().z == 150.0).await;

    match control.tick().await.unwrap() {
        TickOutcome::Commanded { target, velocity, .. } => {
            assert_eq!(target, Position3::new(0.9, 0.0, 0.5));
            assert_eq!(velocity.vx, 0.2);
        }
        other => panic!("expected a command, got {:?}", other),
    }

    shutdown.trigger();
    feed_task.await.unwrap().unwrap();
}
