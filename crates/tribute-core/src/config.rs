//! Configuration loading and typed config structures for the tribute page.
//!
//! The configuration lives in `tribute-config.yaml`. Every field has a
//! default equal to the value the page was built with, so an empty file (or
//! no file at all) reproduces the page as first published. Loaded configs are
//! validated before use; the timers and random ranges downstream rely on it.

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tribute_types::Viewport;

use crate::clock::{AnchorInstant, ClockError};
use crate::gate::DEFAULT_THRESHOLD;
use crate::music::AudioSource;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level page configuration.
///
/// Mirrors the structure of `tribute-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TributeConfig {
    /// The instant the elapsed counter measures from.
    #[serde(default)]
    pub anchor: AnchorConfig,

    /// Reveal gate threshold and delay.
    #[serde(default)]
    pub gate: GateConfig,

    /// Falling marker batches.
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Elapsed counter refresh rate.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Floating hearts on the revealed page.
    #[serde(default)]
    pub ambient: AmbientConfig,

    /// Text and asset paths shown by the rendering layer.
    #[serde(default)]
    pub page: PageContent,

    /// Seed for marker and heart placement. Absent means OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TributeConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the view relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gate.threshold == 0 {
            return Err(invalid("gate.threshold must be at least 1"));
        }
        if self.gate.reveal_delay_ms == 0 {
            return Err(invalid("gate.reveal_delay_ms must be at least 1"));
        }
        if self.clock.tick_interval_ms == 0 {
            return Err(invalid("clock.tick_interval_ms must be at least 1"));
        }
        self.markers.validate()?;
        self.ambient.validate()
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

fn non_negative(value: f64, name: &str) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be a finite, non-negative number (got {value})"),
        })
    }
}

/// Anchor instant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnchorConfig {
    /// Wall-clock time of the anchor, e.g. `2024-03-27T16:00:00`.
    #[serde(default = "default_anchor_local_time")]
    pub local_time: NaiveDateTime,

    /// Fixed offset from UTC in minutes. Absent means the host's local zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl AnchorConfig {
    /// Turn the configured wall-clock time into an instant.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the offset is out of range or the local
    /// time is ambiguous.
    pub fn resolve(&self) -> Result<AnchorInstant, ClockError> {
        match self.utc_offset_minutes {
            Some(minutes) => AnchorInstant::from_offset(self.local_time, minutes),
            None => AnchorInstant::from_local(self.local_time),
        }
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            local_time: default_anchor_local_time(),
            utc_offset_minutes: None,
        }
    }
}

/// Reveal gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GateConfig {
    /// Interactions needed to reveal the page.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Delay between reaching the threshold and the reveal, in milliseconds.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

impl GateConfig {
    /// Reveal delay as a [`Duration`].
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

/// Falling marker configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerConfig {
    /// Markers spawned per interaction.
    #[serde(default = "default_per_batch")]
    pub per_batch: u32,

    /// Full width of the horizontal jitter band (markers land within +/- half).
    #[serde(default = "default_jitter")]
    pub jitter_x: f64,

    /// Full height of the vertical jitter band.
    #[serde(default = "default_jitter")]
    pub jitter_y: f64,

    /// Initial rotation is drawn from `[0, rotation_max_deg)`.
    #[serde(default = "default_rotation_max_deg")]
    pub rotation_max_deg: f64,

    /// Smallest initial scale.
    #[serde(default = "default_scale_min")]
    pub scale_min: f64,

    /// Largest initial scale.
    #[serde(default = "default_scale_max")]
    pub scale_max: f64,

    /// How long a batch stays on screen, in milliseconds.
    #[serde(default = "default_marker_lifetime_ms")]
    pub lifetime_ms: u64,
}

impl MarkerConfig {
    /// Marker lifetime as a [`Duration`].
    pub const fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.per_batch == 0 {
            return Err(invalid("markers.per_batch must be at least 1"));
        }
        if self.lifetime_ms == 0 {
            return Err(invalid("markers.lifetime_ms must be at least 1"));
        }
        non_negative(self.jitter_x, "markers.jitter_x")?;
        non_negative(self.jitter_y, "markers.jitter_y")?;
        non_negative(self.rotation_max_deg, "markers.rotation_max_deg")?;
        non_negative(self.scale_min, "markers.scale_min")?;
        non_negative(self.scale_max, "markers.scale_max")?;
        if self.scale_min <= 0.0 || self.scale_min > self.scale_max {
            return Err(invalid(
                "markers.scale_min must be positive and not exceed markers.scale_max",
            ));
        }
        Ok(())
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            per_batch: default_per_batch(),
            jitter_x: default_jitter(),
            jitter_y: default_jitter(),
            rotation_max_deg: default_rotation_max_deg(),
            scale_min: default_scale_min(),
            scale_max: default_scale_max(),
            lifetime_ms: default_marker_lifetime_ms(),
        }
    }
}

/// Elapsed counter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Milliseconds between recomputations.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl ClockConfig {
    /// Tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Floating heart configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmbientConfig {
    /// Number of hearts.
    #[serde(default = "default_hearts")]
    pub hearts: u32,

    /// Shortest flight, in seconds.
    #[serde(default = "default_duration_min_s")]
    pub duration_min_s: f64,

    /// Longest flight, in seconds.
    #[serde(default = "default_duration_max_s")]
    pub duration_max_s: f64,

    /// Start delay added per heart index, in seconds.
    #[serde(default = "default_stagger_s")]
    pub stagger_s: f64,

    /// How far beyond the viewport edges a flight starts and ends.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f64,

    /// Viewport assumed when planning flights.
    #[serde(default)]
    pub viewport: Viewport,
}

impl AmbientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative(self.duration_min_s, "ambient.duration_min_s")?;
        non_negative(self.duration_max_s, "ambient.duration_max_s")?;
        non_negative(self.stagger_s, "ambient.stagger_s")?;
        non_negative(self.edge_margin, "ambient.edge_margin")?;
        if self.duration_min_s > self.duration_max_s {
            return Err(invalid(
                "ambient.duration_min_s must not exceed ambient.duration_max_s",
            ));
        }
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(invalid("ambient.viewport must have positive finite size"));
        }
        Ok(())
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            hearts: default_hearts(),
            duration_min_s: default_duration_min_s(),
            duration_max_s: default_duration_max_s(),
            stagger_s: default_stagger_s(),
            edge_margin: default_edge_margin(),
            viewport: Viewport::default(),
        }
    }
}

/// One photo on the revealed page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageAsset {
    /// Path served by the static asset host.
    pub path: String,
    /// Alternative text.
    pub alt: String,
}

/// Text and assets of the page. Passed through to the rendering layer
/// untouched; the core never loads or checks the assets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageContent {
    /// Subtitle under the gate prompt.
    #[serde(default = "default_gate_teaser")]
    pub gate_teaser: String,

    /// Track title on the music button.
    #[serde(default = "default_track_title")]
    pub track_title: String,

    /// Second line on the music button.
    #[serde(default = "default_track_subtitle")]
    pub track_subtitle: String,

    /// The background track.
    #[serde(default)]
    pub audio: AudioSource,

    /// Photos, in display order.
    #[serde(default = "default_images")]
    pub images: Vec<ImageAsset>,

    /// The message card.
    #[serde(default = "default_message")]
    pub message: String,

    /// Heading above the elapsed counter.
    #[serde(default = "default_counter_heading")]
    pub counter_heading: String,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            gate_teaser: default_gate_teaser(),
            track_title: default_track_title(),
            track_subtitle: default_track_subtitle(),
            audio: AudioSource::default(),
            images: default_images(),
            message: default_message(),
            counter_heading: default_counter_heading(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_anchor_local_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 27)
        .and_then(|d| d.and_hms_opt(16, 0, 0))
        .unwrap_or_default()
}

const fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

const fn default_reveal_delay_ms() -> u64 {
    1_000
}

const fn default_per_batch() -> u32 {
    5
}

const fn default_jitter() -> f64 {
    100.0
}

const fn default_rotation_max_deg() -> f64 {
    360.0
}

const fn default_scale_min() -> f64 {
    0.5
}

const fn default_scale_max() -> f64 {
    1.0
}

const fn default_marker_lifetime_ms() -> u64 {
    3_000
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_hearts() -> u32 {
    4
}

const fn default_duration_min_s() -> f64 {
    10.0
}

const fn default_duration_max_s() -> f64 {
    14.0
}

const fn default_stagger_s() -> f64 {
    3.0
}

const fn default_edge_margin() -> f64 {
    50.0
}

fn default_gate_teaser() -> String {
    "Uma surpresa especial te aguarda...".to_owned()
}

fn default_track_title() -> String {
    "Simply Red - You Make Me Feel Brand New".to_owned()
}

fn default_track_subtitle() -> String {
    "(Official Live at Sydney Opera House)".to_owned()
}

fn default_images() -> Vec<ImageAsset> {
    vec![
        ImageAsset {
            path: "/couple-1.jpg".to_owned(),
            alt: "Nosso amor - Foto 1".to_owned(),
        },
        ImageAsset {
            path: "/couple-2.jpg".to_owned(),
            alt: "Nosso amor - Foto 2".to_owned(),
        },
    ]
}

fn default_message() -> String {
    "Vou te amar pra sempre assim como...".to_owned()
}

fn default_counter_heading() -> String {
    "Estou te amando há:".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
