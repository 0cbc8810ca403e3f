//! Core display structs: points, markers, ambient decorations, the elapsed
//! breakdown, and the snapshot handed to the rendering layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PlaybackState, RevealPhase, TimeUnit};
use crate::ids::{BatchId, MarkerId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A 2D position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f64,
    /// Vertical coordinate, growing downward.
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This point expressed relative to `origin`.
    pub const fn relative_to(self, origin: Self) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// Size of the visible page area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl Default for Viewport {
    /// 400 x 800, the size assumed when the host cannot report one.
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// A short-lived falling marker spawned by one gate interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Marker {
    /// Unique marker identifier.
    pub id: MarkerId,
    /// The interaction batch this marker belongs to.
    pub batch: BatchId,
    /// Start position relative to the interaction target.
    pub position: Point,
    /// Initial rotation in degrees.
    pub rotation_deg: f64,
    /// Initial scale factor.
    pub scale: f64,
    /// When the marker was spawned.
    pub spawned_at: DateTime<Utc>,
}

/// A floating heart drifting up the revealed page, looping forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AmbientHeart {
    /// Horizontal position, fixed for the whole flight.
    pub x: f64,
    /// Vertical start position (below the bottom edge).
    pub start_y: f64,
    /// Vertical end position (above the top edge).
    pub end_y: f64,
    /// Rotation applied over one flight, in degrees.
    pub rotation_deg: f64,
    /// Length of one flight in seconds.
    pub duration_s: f64,
    /// Delay before the first flight in seconds.
    pub delay_s: f64,
}

// ---------------------------------------------------------------------------
// Elapsed time
// ---------------------------------------------------------------------------

/// Time since the anchor instant, split with fixed divisors.
///
/// Years are 365 days and months are 30 days. This is not a calendar
/// difference; see `tribute_core::clock` for the exact rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ElapsedBreakdown {
    /// Whole 365-day years.
    pub years: u32,
    /// Whole 30-day months within the current year remainder.
    pub months: u32,
    /// Whole days within the current 30-day block.
    pub days: u32,
    /// Whole hours within the current day.
    pub hours: u32,
    /// Whole minutes within the current hour.
    pub minutes: u32,
    /// Whole seconds within the current minute.
    pub seconds: u32,
}

impl ElapsedBreakdown {
    /// Value of a single component.
    pub const fn get(&self, unit: TimeUnit) -> u32 {
        match unit {
            TimeUnit::Years => self.years,
            TimeUnit::Months => self.months,
            TimeUnit::Days => self.days,
            TimeUnit::Hours => self.hours,
            TimeUnit::Minutes => self.minutes,
            TimeUnit::Seconds => self.seconds,
        }
    }

    /// All six components in display order.
    pub fn components(&self) -> [(TimeUnit, u32); 6] {
        TimeUnit::ALL.map(|unit| (unit, self.get(unit)))
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the rendering layer needs to draw the current frame.
///
/// Published by the view context after every state change. Read-only for
/// consumers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ViewSnapshot {
    /// Qualifying interactions recorded so far.
    pub interactions: u32,
    /// Interactions still needed to reach the threshold.
    pub remaining: u32,
    /// Current reveal phase.
    pub phase: RevealPhase,
    /// Markers currently on screen.
    pub markers: Vec<Marker>,
    /// Latest elapsed-time breakdown.
    pub elapsed: ElapsedBreakdown,
    /// Background music state.
    pub playback: PlaybackState,
    /// Floating hearts, planned once the page is revealed.
    pub ambient: Vec<AmbientHeart>,
}
