//! Shared type definitions for the tribute reveal page.
//!
//! Everything the rendering layer reads or sends lives here. Types flow
//! downstream to `TypeScript` via `ts-rs` so the web front-end renders the
//! exact shapes the core publishes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for markers and interaction batches
//! - [`enums`] -- Reveal phase, playback state, time units, interaction events
//! - [`structs`] -- Points, markers, ambient hearts, elapsed breakdown, snapshot

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{InteractionEvent, PlaybackState, RevealPhase, TimeUnit};
pub use ids::{BatchId, MarkerId};
pub use structs::{AmbientHeart, ElapsedBreakdown, Marker, Point, ViewSnapshot, Viewport};
