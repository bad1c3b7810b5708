//! Core data types shared by every scouter component.
//!
//! Identifiers are small newtypes so a world id can never be passed where a
//! region id is expected. Wire types derive serde and match the backend's
//! camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a game server world (e.g. 301, 420).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i32);

/// Identifier of a 64x64 map region.
///
/// Derived from a coordinate, so two samples in the same region always
/// produce the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub i32);

impl RegionId {
    /// Sentinel meaning "no region reported yet".
    pub const NONE: RegionId = RegionId(-1);

    /// Region containing the given coordinate.
    pub fn from_coordinate(coord: Coordinate) -> Self {
        RegionId(((coord.x >> 6) << 8) | (coord.y >> 6))
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute world position at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn region_id(self) -> RegionId {
        RegionId::from_coordinate(self)
    }
}

// ============================================================================
// Outgoing reports
// ============================================================================

/// A single observation of the local player inside an instance.
///
/// Built when the region-change detector fires and consumed by one submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceReport {
    pub world_id: WorldId,
    pub position: Coordinate,
    pub template_region_id: RegionId,
    /// Unix seconds when the observation was taken. Only used locally; the
    /// backend stamps its own receive time.
    pub timestamp: i64,
}

impl InstanceReport {
    pub fn new(world_id: WorldId, position: Coordinate, template_region_id: RegionId) -> Self {
        Self {
            world_id,
            position,
            template_region_id,
            timestamp: current_timestamp(),
        }
    }

    /// Body of the `PUT /world/{id}` request.
    pub fn payload(&self) -> WorldUpdate {
        WorldUpdate {
            x: self.position.x,
            y: self.position.y,
            region: self.template_region_id.0,
        }
    }
}

/// JSON body sent to the backend for one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldUpdate {
    pub x: i32,
    pub y: i32,
    pub region: i32,
}

// ============================================================================
// Incoming records
// ============================================================================

/// A `(time, y)` pair as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordSample {
    pub time: i64,
    pub y: i32,
}

/// One entry of the `GET /worlds` snapshot.
///
/// Older backends send `{worldId, y, time}`, newer ones nest the observed value
/// under `confirmed` and may add a `prediction`. Both shapes decode here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstanceRecord {
    pub world_id: WorldId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<CoordSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<CoordSample>,
}

impl RawInstanceRecord {
    /// Flat record as produced by the basic backend.
    pub fn flat(world_id: WorldId, y: i32, time: i64) -> Self {
        Self {
            world_id,
            y: Some(y),
            time: Some(time),
            confirmed: None,
            prediction: None,
        }
    }

    /// Confirmed y, falling back to the flat field.
    pub fn confirmed_y(&self) -> Option<i32> {
        self.confirmed.map(|c| c.y).or(self.y)
    }

    /// Confirmed timestamp, falling back to the flat field.
    pub fn confirmed_time(&self) -> Option<i64> {
        self.confirmed.map(|c| c.time).or(self.time)
    }
}

// ============================================================================
// World metadata
// ============================================================================

/// Geographic region a world is hosted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldRegion {
    UnitedStates,
    UnitedKingdom,
    Australia,
    Germany,
}

/// What the external world list knows about a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldMetadata {
    pub id: WorldId,
    pub region: Option<WorldRegion>,
    pub activity: Option<String>,
    pub players: Option<i32>,
}

impl WorldMetadata {
    pub fn new(id: WorldId, region: Option<WorldRegion>) -> Self {
        Self {
            id,
            region,
            activity: None,
            players: None,
        }
    }
}

/// A fetched record joined with whatever metadata was cached at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRecord {
    pub world_id: WorldId,
    pub y: Option<i32>,
    pub timestamp: Option<i64>,
    pub prediction: Option<CoordSample>,
    pub world: Option<WorldMetadata>,
    pub world_location: Option<i32>,
}

impl AggregatedRecord {
    pub fn from_raw(
        raw: &RawInstanceRecord,
        world: Option<WorldMetadata>,
        world_location: Option<i32>,
    ) -> Self {
        Self {
            world_id: raw.world_id,
            y: raw.confirmed_y(),
            timestamp: raw.confirmed_time(),
            prediction: raw.prediction,
            world,
            world_location,
        }
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Returns the current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_from_coordinate() {
        // 64x64 tiles per region, x in the high byte
        assert_eq!(Coordinate::new(0, 0).region_id(), RegionId(0));
        assert_eq!(Coordinate::new(1880, 5300).region_id(), RegionId((29 << 8) | 82));
        assert_eq!(
            Coordinate::new(1880, 5300).region_id(),
            Coordinate::new(1919, 5311).region_id()
        );
        assert_ne!(
            Coordinate::new(1919, 5300).region_id(),
            Coordinate::new(1920, 5300).region_id()
        );
    }

    #[test]
    fn test_payload_shape() {
        let report = InstanceReport::new(WorldId(420), Coordinate::new(1880, 5299), RegionId(7508));
        let json = serde_json::to_value(report.payload()).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1880, "y": 5299, "region": 7508}));
    }

    #[test]
    fn test_report_is_stamped_on_creation() {
        let before = current_timestamp();
        let report = InstanceReport::new(WorldId(420), Coordinate::new(1880, 5299), RegionId(7508));
        assert!(report.timestamp >= before);
        assert!(report.timestamp <= current_timestamp());
        // The stamp never reaches the wire.
        let json = serde_json::to_value(report.payload()).unwrap();
        assert!(json.get("time").is_none());
    }

    #[test]
    fn test_flat_record_decodes() {
        let raw: RawInstanceRecord =
            serde_json::from_str(r#"{"worldId": 302, "y": 5288, "time": 1700000000}"#).unwrap();
        assert_eq!(raw.world_id, WorldId(302));
        assert_eq!(raw.confirmed_y(), Some(5288));
        assert_eq!(raw.confirmed_time(), Some(1_700_000_000));
        assert!(raw.prediction.is_none());
    }

    #[test]
    fn test_nested_record_prefers_confirmed() {
        let raw: RawInstanceRecord = serde_json::from_str(
            r#"{
                "worldId": 330,
                "time": 5,
                "confirmed": {"time": 1700000100, "y": 5321},
                "prediction": {"time": 1700000400, "y": 5270}
            }"#,
        )
        .unwrap();
        assert_eq!(raw.confirmed_y(), Some(5321));
        assert_eq!(raw.confirmed_time(), Some(1_700_000_100));
        assert_eq!(raw.prediction, Some(CoordSample { time: 1_700_000_400, y: 5270 }));
    }

    #[test]
    fn test_record_without_sample() {
        let raw: RawInstanceRecord = serde_json::from_str(r#"{"worldId": 301}"#).unwrap();
        let record = AggregatedRecord::from_raw(&raw, None, None);
        assert_eq!(record.y, None);
        assert_eq!(record.timestamp, None);
    }
}
