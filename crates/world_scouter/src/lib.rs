//! # World Scouter - Instance Observation & Aggregation Client
//!
//! Detects when the local player enters a Barbarian Assault instance, reports
//! the player's y coordinate to a shared backend and keeps a sortable list of
//! what everyone else reported, so a player can pick a world with a favorable
//! premove before starting a wave.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Region-Change Detector** ([`detector`]) - Decides once per region entry
//!   whether a report is due
//! * **Remote Client** ([`remote`]) - Non-blocking submit/fetch against the
//!   aggregation backend
//! * **Metadata Cache** ([`metadata`]) - Last-known world list and location codes
//! * **World List View** ([`view`]) - Merges fetched records with metadata and
//!   keeps them sorted
//! * **Premove Evaluator** ([`premove`]) - Turns a y coordinate into a verdict
//!
//! ### Data Flow
//!
//! 1. The host reports a loading transition and the detector arms
//! 2. Following ticks feed position samples until the player settles in a new region
//! 3. The trigger fires one submit and one premove evaluation
//! 4. A periodic timer fetches every world's record and hands it back to the
//!    client context, where the view is repopulated and re-rendered
//!
//! ## Threading
//!
//! The host owns one client context that delivers ticks. Everything the
//! detector, view and host lookups touch stays on it. Timers and network
//! completions run on a tokio runtime and are redispatched through
//! [`dispatch::ClientThread`]; see [`scouter`] for the details.
//!
//! ## Error Handling
//!
//! Failures are categorized by [`ScouterError`]. None of them is fatal to the
//! host: submit errors are logged and dropped, fetch errors keep the previous
//! list on screen.
//!
//! ## Configuration
//!
//! [`ScouterConfig`] is loaded from TOML and published through a
//! [`ConfigHandle`]:
//!
//! * **Indicator** - When the premove indicator is produced and where it goes
//! * **API** - Backend base url and request timeout
//! * **Schedule** - Initial delays and periods of both refresh timers
//! * **Logging** - Level and output format

pub use config::{ConfigHandle, ScouterConfig};
pub use error::{Result, ScouterError};
pub use remote::{HttpBackend, InstanceBackend, InstanceInfoService};
pub use scouter::{Collaborators, WorldScouter};
pub use view::{SortKey, ViewReader, ViewState};

pub mod config;
pub mod detector;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod host;
pub mod logging;
pub mod metadata;
pub mod premove;
pub mod remote;
pub mod schedule;
pub mod scouter;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;
