use simpulse::host::{FixedClock, GameTime, HostEntity, Position};
use simpulse::kernel::snapshot::SnapshotBuilder;
use simpulse::kernel::telemetry::window::MetricWindow;

fn player(n: u32, health: f32) -> HostEntity {
    HostEntity::player(
        &format!("7656119800000000{}", n),
        &format!("Player {}", n),
        Position::new(n as f32, 0.0, -(n as f32)),
        health,
    )
}

#[test]
fn test_empty_registry() {
    let mut builder = SnapshotBuilder::new();
    let window = MetricWindow::new();
    let registry: Vec<HostEntity> = Vec::new();

    let snapshot = builder.build(&window, &registry, &FixedClock::default());
    assert_eq!(snapshot.entity_count, 0);
    assert!(snapshot.entities.is_empty());
    assert_eq!(snapshot.fps, 60.0);
}

#[test]
fn test_unidentified_entities_are_skipped() {
    let registry = vec![
        player(1, 100.0),
        HostEntity::unidentified(Position::new(1.0, 2.0, 3.0), 50.0),
        player(2, 80.0),
        HostEntity::unidentified(Position::default(), 0.0),
        player(3, 10.0),
    ];

    let mut builder = SnapshotBuilder::new();
    let snapshot = builder.build(&MetricWindow::new(), &registry, &FixedClock::default());

    assert_eq!(snapshot.entity_count, 3);
    assert_eq!(snapshot.entities.len(), 3);
    let ids: Vec<&str> = snapshot.entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["76561198000000001", "76561198000000002", "76561198000000003"]);
}

#[test]
fn test_counts_match_identified_for_many_sizes() {
    let mut builder = SnapshotBuilder::with_capacity(8);
    for size in 0..20u32 {
        let registry: Vec<HostEntity> = (0..size)
            .map(|i| {
                if i % 3 == 0 {
                    HostEntity::unidentified(Position::default(), 100.0)
                } else {
                    player(i, 100.0)
                }
            })
            .collect();
        let expected = (0..size).filter(|i| i % 3 != 0).count();

        let snapshot = builder.build(&MetricWindow::new(), &registry, &FixedClock::default());
        assert_eq!(snapshot.entity_count, expected, "registry size {}", size);
        assert_eq!(snapshot.entities.len(), expected);
    }
}

#[test]
fn test_health_truncates() {
    let registry = vec![player(1, 75.9), player(2, 0.4), player(3, 99.99)];
    let mut builder = SnapshotBuilder::new();
    let snapshot = builder.build(&MetricWindow::new(), &registry, &FixedClock::default());

    let health: Vec<u8> = snapshot.entities.iter().map(|e| e.health_percent).collect();
    assert_eq!(health, vec![75, 0, 99]);
}

#[test]
fn test_reused_buffer_is_cleared() {
    let mut builder = SnapshotBuilder::new();
    let window = MetricWindow::new();

    let big = vec![player(1, 1.0), player(2, 2.0), player(3, 3.0)];
    assert_eq!(builder.build(&window, &big, &FixedClock::default()).entity_count, 3);

    let small = vec![player(9, 9.0)];
    let snapshot = builder.build(&window, &small, &FixedClock::default());
    assert_eq!(snapshot.entity_count, 1);
    assert_eq!(snapshot.entities[0].id, "76561198000000009");
}

#[test]
fn test_clock_and_window_are_captured() {
    let mut window = MetricWindow::new();
    for _ in 0..4 {
        window.advance(0.25);
    }
    let date = GameTime { hour: 14, minute: 5, day: 3, month: 7, year: 2024 };
    let clock = FixedClock { millis: 123_456, date: Some(date) };

    let mut builder = SnapshotBuilder::new();
    let snapshot = builder.build(&window, &vec![player(1, 50.0)], &clock);

    assert_eq!(snapshot.fps, 4.0);
    assert_eq!(snapshot.timestamp, 123_456);
    assert_eq!(snapshot.game_time, Some(date));
    assert_eq!(snapshot.entities[0].display_name, "Player 1");
    assert_eq!(snapshot.entities[0].position, Position::new(1.0, 0.0, -1.0));
}
