//! Premove evaluation.
//!
//! Turns the y coordinate of a fresh instance into a good/bad verdict. A
//! low y inside the wave map means the premove path is short.

use crate::config::{IndicatorActiveMode, IndicatorSettings};
use crate::host::{ChatMessage, IndicatorColor};
use crate::types::RegionId;

/// Wave map boundary; instances below it give a good premove.
pub const GOOD_PREMOVE_MAX_Y: i32 = 5300;

/// Template regions of the wave arenas.
pub const WAVE_REGION_IDS: [RegionId; 2] = [RegionId(7508), RegionId(7509)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad,
}

impl Verdict {
    pub fn for_y(y: i32) -> Self {
        if y < GOOD_PREMOVE_MAX_Y {
            Verdict::Good
        } else {
            Verdict::Bad
        }
    }

    pub fn color(self) -> IndicatorColor {
        match self {
            Verdict::Good => IndicatorColor::Green,
            Verdict::Bad => IndicatorColor::Red,
        }
    }
}

/// Verdict plus the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremoveEvaluation {
    pub verdict: Verdict,
    pub display_y: String,
}

/// Formats a y coordinate as thousands with one truncated decimal, e.g. `5.3k`.
pub fn format_y(y: i32) -> String {
    format!("{}.{}k", y / 1000, (y % 1000) / 100)
}

/// Host facts the gating rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PremoveContext {
    pub template_region_id: RegionId,
    pub carrying_scroller: bool,
}

/// Whether the indicator should be produced at all.
pub fn is_active(settings: &IndicatorSettings, context: &PremoveContext) -> bool {
    match settings.active_mode {
        IndicatorActiveMode::Disable => false,
        IndicatorActiveMode::AllInstances => true,
        IndicatorActiveMode::InBa => WAVE_REGION_IDS.contains(&context.template_region_id),
        IndicatorActiveMode::AsScroller => context.carrying_scroller,
    }
}

/// Evaluates `y` under `settings`, or `None` when gated off.
pub fn evaluate(
    y: i32,
    settings: &IndicatorSettings,
    context: &PremoveContext,
) -> Option<PremoveEvaluation> {
    if !is_active(settings, context) {
        return None;
    }
    Some(PremoveEvaluation {
        verdict: Verdict::for_y(y),
        display_y: format_y(y),
    })
}

/// Evaluation routed to the configured outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremoveIndicator {
    pub evaluation: PremoveEvaluation,
    pub show_info_box: bool,
    pub show_chat: bool,
}

impl PremoveIndicator {
    pub fn new(evaluation: PremoveEvaluation, settings: &IndicatorSettings) -> Self {
        Self {
            evaluation,
            show_info_box: settings.display_mode.shows_info_box(),
            show_chat: settings.display_mode.shows_chat(),
        }
    }

    pub fn color(&self) -> IndicatorColor {
        self.evaluation.verdict.color()
    }

    /// Info box caption.
    pub fn text(&self) -> &str {
        &self.evaluation.display_y
    }

    pub fn chat_message(&self) -> ChatMessage {
        let verdict = match self.evaluation.verdict {
            Verdict::Good => "good",
            Verdict::Bad => "bad",
        };
        ChatMessage {
            text: format!("Premove: {} ({})", self.evaluation.display_y, verdict),
            color: self.color(),
        }
    }
}
