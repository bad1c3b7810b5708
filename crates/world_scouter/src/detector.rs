//! Region-change detection.
//!
//! The host only says "a load happened", never "an instance was entered".
//! After each load the detector is armed and watches the following ticks until
//! the player's position settles, then fires at most once per region entered.

use tracing::debug;

use crate::types::{Coordinate, RegionId};

/// What the host reports on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    pub instanced: bool,
    pub position: Coordinate,
}

/// A report is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTrigger {
    pub position: Coordinate,
    pub template_region_id: RegionId,
}

/// Result of feeding one tick to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorOutcome {
    /// Not armed; nothing to do
    Idle,
    /// Armed, but the player is still in the last reported region
    Unchanged,
    /// The load ended outside an instance; the detector disarmed
    LeftInstance,
    /// A new region was entered
    Triggered(RegionTrigger),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Idle,
    Armed,
}

/// Decides when an instance report should be produced.
#[derive(Debug, Clone)]
pub struct RegionChangeDetector {
    state: DetectorState,
    last_reported_region: RegionId,
}

impl RegionChangeDetector {
    pub fn new() -> Self {
        Self {
            state: DetectorState::Idle,
            last_reported_region: RegionId::NONE,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state == DetectorState::Armed
    }

    pub fn last_reported_region(&self) -> RegionId {
        self.last_reported_region
    }

    /// Called for a loading transition.
    pub fn arm(&mut self) {
        self.state = DetectorState::Armed;
    }

    /// Feeds one tick sample.
    ///
    /// `template_region` maps the instance back onto its template and is only
    /// evaluated when a trigger fires.
    pub fn observe(
        &mut self,
        sample: TickSample,
        template_region: impl FnOnce() -> RegionId,
    ) -> DetectorOutcome {
        if self.state == DetectorState::Idle {
            return DetectorOutcome::Idle;
        }

        if !sample.instanced {
            self.state = DetectorState::Idle;
            return DetectorOutcome::LeftInstance;
        }

        let current_region = sample.position.region_id();
        if current_region == self.last_reported_region {
            // Stay armed until the region changes.
            return DetectorOutcome::Unchanged;
        }

        let template_region_id = template_region();
        debug!(
            "y = {}, region id = {}",
            sample.position.y, template_region_id
        );

        self.state = DetectorState::Idle;
        self.last_reported_region = current_region;
        DetectorOutcome::Triggered(RegionTrigger {
            position: sample.position,
            template_region_id,
        })
    }
}

impl Default for RegionChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}
