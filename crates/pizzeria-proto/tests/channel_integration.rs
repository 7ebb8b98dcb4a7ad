use pizzeria_proto::{FifoMode, FramedChannel, Message};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn a_burst_of_mixed_messages_arrives_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("burst");
    let mut reader = FramedChannel::open(&path, FifoMode::ReadOnly).unwrap();
    let mut writer = FramedChannel::open(&path, FifoMode::WriteOnly).unwrap();

    let sent = vec![
        Message::RequestStatus,
        Message::Order { kitchen_id: 1, pizza: 0x0301 },
        Message::Status {
            kitchen_id: 1,
            stock: "5 5 5 5 5 5 5 5 5".to_string(),
            elapsed_idle_ms: 0,
            idle_count: 2,
            queued_count: 1,
            queued_cook_time_ms: 1500,
        },
        Message::CookedPizza { kitchen_id: 1, pizza: 0x0301 },
        Message::Closed { kitchen_id: 1 },
    ];

    for message in &sent {
        writer.send(message).unwrap();
    }

    std::thread::sleep(Duration::from_millis(20));

    let mut received = Vec::new();
    while let Some(message) = reader.try_recv() {
        received.push(message);
    }

    assert_eq!(received, sent);
}
