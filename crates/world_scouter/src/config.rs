//! Configuration management for the scouter.
//!
//! Settings are loaded from a TOML file and published through a [`ConfigHandle`]
//! so the host can change them at runtime. Every premove evaluation reads one
//! snapshot and never sees a half-applied update.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ScouterError;
use crate::types::ItemId;

/// Production aggregation backend.
pub const PRODUCTION_API_BASE: &str = "https://bascout.jfost.com/api/v1";

/// Opt-in flag that allows the base url to be overridden.
pub const DEV_MODE_ENV: &str = "BA_SCOUTER_DEV";

/// Base url used when [`DEV_MODE_ENV`] is set.
pub const API_BASE_ENV: &str = "BA_SCOUTER_API_BASE";

/// Horn carried by the player calling in the scroller role.
pub const DEFAULT_SCROLLER_ITEM: ItemId = ItemId(10_012);

// ============================================================================
// Indicator modes
// ============================================================================

/// When the premove indicator is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorActiveMode {
    /// Only while carrying the scroller item
    #[default]
    AsScroller,
    /// Only inside the wave regions
    InBa,
    /// In any instance
    AllInstances,
    /// Never
    Disable,
}

impl fmt::Display for IndicatorActiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorActiveMode::AsScroller => "As scroller",
            IndicatorActiveMode::InBa => "In BA",
            IndicatorActiveMode::AllInstances => "All instances",
            IndicatorActiveMode::Disable => "Disable",
        };
        f.write_str(name)
    }
}

/// Where the premove indicator is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorDisplayMode {
    #[default]
    InfoBoxAndChat,
    InfoBox,
    Chat,
}

impl IndicatorDisplayMode {
    pub fn shows_info_box(self) -> bool {
        matches!(self, IndicatorDisplayMode::InfoBoxAndChat | IndicatorDisplayMode::InfoBox)
    }

    pub fn shows_chat(self) -> bool {
        matches!(self, IndicatorDisplayMode::InfoBoxAndChat | IndicatorDisplayMode::Chat)
    }
}

impl fmt::Display for IndicatorDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorDisplayMode::InfoBoxAndChat => "Info box/chat",
            IndicatorDisplayMode::InfoBox => "Info box",
            IndicatorDisplayMode::Chat => "Chat",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Root configuration object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScouterConfig {
    #[serde(default)]
    pub indicator: IndicatorSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Premove indicator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    #[serde(default)]
    pub active_mode: IndicatorActiveMode,
    #[serde(default)]
    pub display_mode: IndicatorDisplayMode,
    /// Item that counts as "carrying the scroller"
    #[serde(default = "default_scroller_item")]
    pub scroller_item: ItemId,
}

fn default_scroller_item() -> ItemId {
    DEFAULT_SCROLLER_ITEM
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            active_mode: IndicatorActiveMode::default(),
            display_mode: IndicatorDisplayMode::default(),
            scroller_item: DEFAULT_SCROLLER_ITEM,
        }
    }
}

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base url for end users
    #[serde(default = "default_api_base")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    PRODUCTION_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiSettings {
    /// Base url to use, honouring the developer override from the environment.
    pub fn resolve_base(&self) -> String {
        let dev_mode = std::env::var(DEV_MODE_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let override_base = std::env::var(API_BASE_ENV).ok();
        resolve_base_with(&self.base_url, dev_mode, override_base.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn resolve_base_with(configured: &str, dev_mode: bool, override_base: Option<&str>) -> String {
    let base = match override_base {
        Some(value) if dev_mode && !value.trim().is_empty() => {
            warn!("🔧 Using developer api base {}", value);
            value.trim()
        }
        _ => configured,
    };
    base.trim_end_matches('/').to_string()
}

/// Periodic refresh timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_world_refresh_delay")]
    pub world_refresh_delay_secs: u64,
    #[serde(default = "default_world_refresh_period")]
    pub world_refresh_period_secs: u64,
    #[serde(default = "default_instance_refresh_delay")]
    pub instance_refresh_delay_secs: u64,
    #[serde(default = "default_instance_refresh_period")]
    pub instance_refresh_period_secs: u64,
}

fn default_world_refresh_delay() -> u64 {
    5
}

fn default_world_refresh_period() -> u64 {
    300
}

fn default_instance_refresh_delay() -> u64 {
    10
}

fn default_instance_refresh_period() -> u64 {
    30
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            world_refresh_delay_secs: default_world_refresh_delay(),
            world_refresh_period_secs: default_world_refresh_period(),
            instance_refresh_delay_secs: default_instance_refresh_delay(),
            instance_refresh_period_secs: default_instance_refresh_period(),
        }
    }
}

impl ScheduleSettings {
    pub fn world_refresh_delay(&self) -> Duration {
        Duration::from_secs(self.world_refresh_delay_secs)
    }

    pub fn world_refresh_period(&self) -> Duration {
        Duration::from_secs(self.world_refresh_period_secs)
    }

    pub fn instance_refresh_delay(&self) -> Duration {
        Duration::from_secs(self.instance_refresh_delay_secs)
    }

    pub fn instance_refresh_period(&self) -> Duration {
        Duration::from_secs(self.instance_refresh_period_secs)
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl ScouterConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path`
    /// and returns it. A file that exists is validated before it is returned.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded or default configuration, or an error if reading, parsing,
    /// validation or writing the default failed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use world_scouter::ScouterConfig;
    ///
    /// let config = ScouterConfig::load_from_file("world_scouter.toml")?;
    /// println!("Reporting to {}", config.api.resolve_base());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ScouterConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let default_config = ScouterConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, toml_content)?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Checks the configuration for values the scouter cannot run with.
    pub fn validate(&self) -> Result<(), ScouterError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ScouterError::Config("api base url cannot be empty".to_string()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ScouterError::Config("request timeout must be positive".to_string()));
        }
        if self.schedule.world_refresh_period_secs == 0
            || self.schedule.instance_refresh_period_secs == 0
        {
            return Err(ScouterError::Config("refresh periods must be positive".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ScouterError::Config(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Live handle
// ============================================================================

/// Shared, swappable configuration.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<ArcSwap<ScouterConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ScouterConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Consistent snapshot of the current settings.
    pub fn snapshot(&self) -> Arc<ScouterConfig> {
        self.inner.load_full()
    }

    /// Replaces the settings. Readers holding an older snapshot keep it.
    pub fn store(&self, config: ScouterConfig) {
        self.inner.store(Arc::new(config));
    }

    /// Applies `f` to a copy of the current settings and publishes the result.
    pub fn update(&self, f: impl Fn(&mut ScouterConfig)) {
        self.inner.rcu(|current| {
            let mut next = ScouterConfig::clone(current);
            f(&mut next);
            next
        });
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(ScouterConfig::default())
    }
}
