use crate::host::{Clock, EntityRegistry, GameTime, Position};
use crate::kernel::telemetry::window::MetricWindow;

/// One identified entity as captured for a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    /// Untrusted; may contain anything.
    pub display_name: String,
    pub position: Position,
    pub health_percent: u8,
}

/// Point-in-time capture. Entity order is the registry's iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub fps: f64,
    pub game_time: Option<GameTime>,
    pub timestamp: i64,
    pub entity_count: usize,
    pub entities: Vec<EntityRecord>,
}

/// Builds snapshots into a buffer it keeps across calls.
///
/// The returned snapshot is only valid until the next `build`; clone it to keep it longer.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(entities: usize) -> Self {
        Self {
            snapshot: Snapshot {
                entities: Vec::with_capacity(entities),
                ..Snapshot::default()
            },
        }
    }

    pub fn build(
        &mut self,
        window: &MetricWindow,
        registry: &dyn EntityRegistry,
        clock: &dyn Clock,
    ) -> &Snapshot {
        let snapshot = &mut self.snapshot;
        snapshot.entities.clear();
        snapshot.fps = window.value();
        snapshot.timestamp = clock.now_millis();
        snapshot.game_time = clock.world_date();

        let entities = &mut snapshot.entities;
        registry.visit_entities(&mut |view| {
            let Some(identity) = view.identity else {
                return;
            };
            entities.push(EntityRecord {
                id: identity.id.to_string(),
                display_name: identity.name.to_string(),
                position: view.position,
                health_percent: health_percent(view.health),
            });
        });

        snapshot.entity_count = snapshot.entities.len();
        &self.snapshot
    }
}

/// Truncate to a whole percentage: 75.9 -> 75. Out-of-range input is clamped, NaN -> 0.
pub fn health_percent(health: f32) -> u8 {
    if health.is_nan() {
        return 0;
    }
    health.trunc().clamp(0.0, 100.0) as u8
}
