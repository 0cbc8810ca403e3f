//! Reveal gate, elapsed-time clock, and view lifecycle for the tribute page.
//!
//! The page stays hidden behind a gate until the visitor has pressed it a
//! configured number of times, then reveals a counter of how long it has
//! been since the anchor moment, a music toggle, and floating hearts.
//!
//! # Modules
//!
//! - [`clock`] -- Fixed-divisor elapsed-time breakdown from the anchor.
//! - [`config`] -- Configuration loading from `tribute-config.yaml` into
//!   strongly-typed structs.
//! - [`decor`] -- Floating-heart planning for the revealed page.
//! - [`gate`] -- The reveal gate state machine and event normalization.
//! - [`labels`] -- Portuguese display strings.
//! - [`markers`] -- Marker batches spawned per interaction.
//! - [`music`] -- [`AudioBackend`] trait, [`SilentBackend`], and the
//!   play/pause toggle.
//! - [`time_source`] -- Wall-clock abstraction.
//! - [`view`] -- [`ViewContext`], which owns the state and timers of one
//!   page view.
//!
//! [`AudioBackend`]: music::AudioBackend
//! [`SilentBackend`]: music::SilentBackend
//! [`ViewContext`]: view::ViewContext

pub mod clock;
pub mod config;
pub mod decor;
pub mod gate;
pub mod labels;
pub mod markers;
pub mod music;
pub mod time_source;
pub mod view;
