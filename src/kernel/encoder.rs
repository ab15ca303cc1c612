//! Wire document rendering.
//!
//! The collector contract is the field set and order below. Field order follows struct
//! declaration order, and every string goes through `serde_json`, which is the only place
//! escaping happens. Display names are the one untrusted input: quotes, backslashes and
//! control characters come out as JSON escapes and parse back to the exact original.
//!
//! ```text
//! {"fps":59.8,"gameTime":{...},"timestamp":123,"playerCount":1,
//!  "players":[{"id":"..","name":"..","pos":"x y z","health":75}]}
//! ```

use serde::{Serialize, Serializer};

use crate::error::TelemetryResult;
use crate::host::{GameTime, Position};
use crate::kernel::snapshot::{EntityRecord, Snapshot};

/// Decimal places kept for each coordinate in `pos`.
pub const POSITION_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEncoder;

impl DocumentEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, snapshot: &Snapshot) -> TelemetryResult<String> {
        Ok(serde_json::to_string(&WireDocument::from(snapshot))?)
    }
}

#[derive(Serialize)]
struct WireDocument<'a> {
    fps: f64,
    #[serde(rename = "gameTime", skip_serializing_if = "Option::is_none")]
    game_time: Option<GameTime>,
    timestamp: i64,
    #[serde(rename = "playerCount")]
    player_count: usize,
    players: WirePlayers<'a>,
}

impl<'a> From<&'a Snapshot> for WireDocument<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            fps: snapshot.fps,
            game_time: snapshot.game_time,
            timestamp: snapshot.timestamp,
            player_count: snapshot.entity_count,
            players: WirePlayers(&snapshot.entities),
        }
    }
}

/// Streams the entity slice as an array without collecting an intermediate Vec.
struct WirePlayers<'a>(&'a [EntityRecord]);

impl Serialize for WirePlayers<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(WirePlayer::from))
    }
}

#[derive(Serialize)]
struct WirePlayer<'a> {
    id: &'a str,
    name: &'a str,
    pos: String,
    health: u8,
}

impl<'a> From<&'a EntityRecord> for WirePlayer<'a> {
    fn from(record: &'a EntityRecord) -> Self {
        Self {
            id: &record.id,
            name: &record.display_name,
            pos: format_position(record.position),
            health: record.health_percent,
        }
    }
}

/// `"x y z"`, each coordinate rounded to `POSITION_DECIMALS` with trailing zeros dropped.
pub fn format_position(pos: Position) -> String {
    format!(
        "{} {} {}",
        format_coordinate(pos.x),
        format_coordinate(pos.y),
        format_coordinate(pos.z)
    )
}

pub fn format_coordinate(value: f32) -> String {
    let mut text = format!("{:.*}", POSITION_DECIMALS, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}
