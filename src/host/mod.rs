//! Capabilities the pipeline needs from the host simulation.
//!
//! The host owns and mutates its entities; the pipeline only ever reads them through
//! `EntityRegistry`, once per telemetry tick.

pub mod sim;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// External identity of a connected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// Borrowed view of one live entity, valid for the duration of a visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView<'a> {
    /// `None` for AI-only or disconnected entities.
    pub identity: Option<Identity<'a>>,
    pub position: Position,
    /// Percentage in `[0, 100]`.
    pub health: f32,
}

pub trait EntityRegistry {
    /// Visit every live entity in registry order.
    fn visit_entities(&self, visit: &mut dyn FnMut(EntityView<'_>));
}

/// In-world calendar reading. Serialized as-is into the wire document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameTime {
    pub hour: u8,
    pub minute: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl GameTime {
    /// Calendar reading `minutes` later. Months and leap years follow the Gregorian calendar.
    pub fn advanced_by_minutes(self, minutes: u64) -> Self {
        let total = self.minute as u64 + minutes;
        let mut out = self;
        out.minute = (total % 60) as u8;

        let hours = self.hour as u64 + total / 60;
        out.hour = (hours % 24) as u8;

        let mut days = hours / 24;
        while days > 0 {
            let month_len = days_in_month(out.month, out.year);
            let remaining_in_month = month_len.saturating_sub(out.day) as u64;
            if days <= remaining_in_month {
                out.day += days as u8;
                days = 0;
            } else {
                days -= remaining_in_month + 1;
                out.day = 1;
                if out.month == 12 {
                    out.month = 1;
                    out.year += 1;
                } else {
                    out.month += 1;
                }
            }
        }
        out
    }
}

fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 31,
    }
}

pub trait Clock {
    /// Host clock in milliseconds.
    fn now_millis(&self) -> i64;

    /// In-world date, for hosts that simulate one.
    fn world_date(&self) -> Option<GameTime> {
        None
    }
}

/// A host the reactor can drive frame by frame.
pub trait Host: EntityRegistry + Clock {
    fn step(&mut self, delta_time: f64);
}

/// Owned entity record, used by simple hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEntity {
    pub id: Option<String>,
    pub name: String,
    pub position: Position,
    pub health: f32,
}

impl HostEntity {
    pub fn player(id: &str, name: &str, position: Position, health: f32) -> Self {
        Self {
            id: Some(id.to_string()),
            name: name.to_string(),
            position,
            health,
        }
    }

    /// An entity with no external identity (AI, disconnected body).
    pub fn unidentified(position: Position, health: f32) -> Self {
        Self {
            id: None,
            name: String::new(),
            position,
            health,
        }
    }

    pub fn view(&self) -> EntityView<'_> {
        EntityView {
            identity: self.id.as_deref().map(|id| Identity {
                id,
                name: &self.name,
            }),
            position: self.position,
            health: self.health,
        }
    }
}

impl EntityRegistry for [HostEntity] {
    fn visit_entities(&self, visit: &mut dyn FnMut(EntityView<'_>)) {
        for entity in self {
            visit(entity.view());
        }
    }
}

impl EntityRegistry for Vec<HostEntity> {
    fn visit_entities(&self, visit: &mut dyn FnMut(EntityView<'_>)) {
        self.as_slice().visit_entities(visit)
    }
}

/// Clock frozen at a given reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock {
    pub millis: i64,
    pub date: Option<GameTime>,
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }

    fn world_date(&self) -> Option<GameTime> {
        self.date
    }
}
