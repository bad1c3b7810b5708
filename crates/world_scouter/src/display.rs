//! Plain-data projection of the world list for whatever UI renders it.

use crate::premove::format_y;
use crate::types::{AggregatedRecord, WorldId, WorldRegion};

/// Location code the client uses for US West worlds.
pub const LOCATION_US_WEST: i32 = -73;
/// Location code the client uses for US East worlds.
pub const LOCATION_US_EAST: i32 = -42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldFlag {
    Us,
    UsEast,
    UsWest,
    Uk,
    Australia,
    Germany,
}

impl WorldFlag {
    pub fn for_world(region: Option<WorldRegion>, location: Option<i32>) -> Option<Self> {
        let flag = match region? {
            WorldRegion::UnitedStates => match location {
                Some(LOCATION_US_WEST) => WorldFlag::UsWest,
                Some(LOCATION_US_EAST) => WorldFlag::UsEast,
                _ => WorldFlag::Us,
            },
            WorldRegion::UnitedKingdom => WorldFlag::Uk,
            WorldRegion::Australia => WorldFlag::Australia,
            WorldRegion::Germany => WorldFlag::Germany,
        };
        Some(flag)
    }
}

/// Relative age of a record, in whole minutes.
///
/// Timestamps in the future count as "Just now".
pub fn format_last_updated(timestamp: Option<i64>, now: i64) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };
    match (now - timestamp).max(0) / 60 {
        0 => "Just now".to_string(),
        1 => "1 min ago".to_string(),
        minutes => format!("{} mins ago", minutes),
    }
}

/// One rendered row of the world list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldRow {
    pub world_id: WorldId,
    pub flag: Option<WorldFlag>,
    pub y: String,
    pub last_updated: String,
}

impl WorldRow {
    pub fn project(record: &AggregatedRecord, now: i64) -> Self {
        let region = record.world.as_ref().and_then(|w| w.region);
        Self {
            world_id: record.world_id,
            flag: WorldFlag::for_world(region, record.world_location),
            y: record.y.map_or_else(|| "-".to_string(), format_y),
            last_updated: format_last_updated(record.timestamp, now),
        }
    }
}
