//! A small stand-in host so the pipeline can run end-to-end without a game server.
//!
//! Entities walk in straight lines and lose health slowly; the in-world clock runs one game
//! minute per real second.

use super::{Clock, EntityRegistry, EntityView, GameTime, Host, HostEntity, Position};

const GAME_MINUTES_PER_SECOND: f64 = 1.0;
const HEALTH_DRAIN_PER_SECOND: f32 = 0.05;

#[derive(Debug, Clone)]
struct SimEntity {
    entity: HostEntity,
    velocity: Position,
}

#[derive(Debug, Clone)]
pub struct SimulatedWorld {
    entities: Vec<SimEntity>,
    elapsed_secs: f64,
    frames: u64,
    start_date: GameTime,
}

impl SimulatedWorld {
    pub fn new(start_date: GameTime) -> Self {
        Self {
            entities: Vec::new(),
            elapsed_secs: 0.0,
            frames: 0,
            start_date,
        }
    }

    /// A handful of players plus one AI body, including an awkward display name.
    pub fn demo() -> Self {
        let mut world = Self::new(GameTime {
            hour: 8,
            minute: 0,
            day: 1,
            month: 6,
            year: 2024,
        });
        world.spawn(
            HostEntity::player("76561198000000001", "Bob \"Bunny\" Smith", Position::new(100.5, 20.25, 300.75), 75.9),
            Position::new(1.2, 0.0, -0.4),
        );
        world.spawn(
            HostEntity::player("76561198000000002", "C:\\Users\\ghost", Position::new(4200.0, 3.5, 9100.0), 100.0),
            Position::new(-0.8, 0.0, 1.5),
        );
        world.spawn(
            HostEntity::unidentified(Position::new(512.0, 1.0, 512.0), 60.0),
            Position::new(0.3, 0.0, 0.3),
        );
        world
    }

    pub fn spawn(&mut self, entity: HostEntity, velocity: Position) {
        self.entities.push(SimEntity { entity, velocity });
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl EntityRegistry for SimulatedWorld {
    fn visit_entities(&self, visit: &mut dyn FnMut(EntityView<'_>)) {
        for sim in &self.entities {
            visit(sim.entity.view());
        }
    }
}

impl Clock for SimulatedWorld {
    fn now_millis(&self) -> i64 {
        (self.elapsed_secs * 1000.0) as i64
    }

    fn world_date(&self) -> Option<GameTime> {
        let minutes = (self.elapsed_secs * GAME_MINUTES_PER_SECOND) as u64;
        Some(self.start_date.advanced_by_minutes(minutes))
    }
}

impl Host for SimulatedWorld {
    fn step(&mut self, delta_time: f64) {
        self.frames += 1;
        self.elapsed_secs += delta_time;

        let dt = delta_time as f32;
        for sim in &mut self.entities {
            let pos = &mut sim.entity.position;
            pos.x += sim.velocity.x * dt;
            pos.y += sim.velocity.y * dt;
            pos.z += sim.velocity.z * dt;
            sim.entity.health = (sim.entity.health - HEALTH_DRAIN_PER_SECOND * dt).max(0.0);
        }
    }
}
