//! Enumeration types for the tribute page.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::Point;

// ---------------------------------------------------------------------------
// Reveal gate
// ---------------------------------------------------------------------------

/// Where the reveal gate is in its one-way lifecycle.
///
/// The only legal transitions are `Locked -> Pending -> Revealed`. A
/// `Revealed` gate never goes back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum RevealPhase {
    /// Fewer interactions than the threshold have been recorded.
    #[default]
    Locked,
    /// The threshold was reached; the deferred reveal has not fired yet.
    /// Interactions still count and still spawn markers.
    Pending,
    /// The tribute page is shown. Interactions are ignored from now on.
    Revealed,
}

impl RevealPhase {
    /// Whether the tribute page is visible.
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

// ---------------------------------------------------------------------------
// Music
// ---------------------------------------------------------------------------

/// Playback state of the single background track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlaybackState {
    /// Not playing. This is the state at mount.
    #[default]
    Paused,
    /// The track is playing.
    Playing,
}

impl PlaybackState {
    /// The state a toggle moves to.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Playing,
            Self::Playing => Self::Paused,
        }
    }
}

// ---------------------------------------------------------------------------
// Elapsed time
// ---------------------------------------------------------------------------

/// One component of an elapsed-time breakdown, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TimeUnit {
    /// Fixed 365-day years.
    Years,
    /// Fixed 30-day months.
    Months,
    /// Days.
    Days,
    /// Hours.
    Hours,
    /// Minutes.
    Minutes,
    /// Seconds.
    Seconds,
}

impl TimeUnit {
    /// All units in display order.
    pub const ALL: [Self; 6] = [
        Self::Years,
        Self::Months,
        Self::Days,
        Self::Hours,
        Self::Minutes,
        Self::Seconds,
    ];
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw interaction event as delivered by the rendering layer.
///
/// Pointer and touch events carry their coordinates differently; both are
/// reduced to one target-relative [`Point`] before the gate sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// A mouse or pen press.
    Pointer {
        /// Press position in client (viewport) coordinates.
        client: Point,
        /// Top-left corner of the interaction target in client coordinates.
        target_origin: Point,
    },
    /// A touch start. Only the first touch point is used.
    Touch {
        /// Active touch points in client coordinates.
        touches: Vec<Point>,
        /// Top-left corner of the interaction target in client coordinates.
        target_origin: Point,
    },
}
