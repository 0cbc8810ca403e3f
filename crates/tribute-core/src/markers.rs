//! Falling marker batches spawned by gate interactions.
//!
//! Every counted interaction spawns one batch of markers around the press
//! position. A batch is removed as a unit after the configured lifetime;
//! removal filters strictly by [`BatchId`], so overlapping batches from
//! rapid presses never cancel each other.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::SmallRng;
use tracing::debug;
use tribute_types::{BatchId, Marker, MarkerId, Point};

use crate::config::MarkerConfig;

/// The set of markers currently on screen.
#[derive(Debug)]
pub struct MarkerField {
    config: MarkerConfig,
    active: Vec<Marker>,
    rng: SmallRng,
}

impl MarkerField {
    /// Create an empty field. `config` must already be validated.
    pub const fn new(config: MarkerConfig, rng: SmallRng) -> Self {
        Self {
            config,
            active: Vec::new(),
            rng,
        }
    }

    /// Spawn one batch around `origin` and return its ID.
    ///
    /// Each marker is offset from `origin` by a uniform jitter within half
    /// the configured span on each axis, with a uniform rotation in
    /// `[0, rotation_max_deg)` and a uniform scale in `[scale_min, scale_max]`.
    pub fn spawn_batch(&mut self, origin: Point, now: DateTime<Utc>) -> BatchId {
        let batch = BatchId::new();
        for _ in 0..self.config.per_batch {
            let marker = Marker {
                id: MarkerId::new(),
                batch,
                position: Point::new(
                    origin.x + jitter(&mut self.rng, self.config.jitter_x),
                    origin.y + jitter(&mut self.rng, self.config.jitter_y),
                ),
                rotation_deg: self.rng.random::<f64>() * self.config.rotation_max_deg,
                scale: self
                    .rng
                    .random_range(self.config.scale_min..=self.config.scale_max),
                spawned_at: now,
            };
            self.active.push(marker);
        }
        debug!(%batch, count = self.config.per_batch, active = self.active.len(), "marker batch spawned");
        batch
    }

    /// Remove every marker of `batch`. Returns how many were removed.
    pub fn remove_batch(&mut self, batch: BatchId) -> usize {
        let before = self.active.len();
        self.active.retain(|marker| marker.batch != batch);
        let removed = before.saturating_sub(self.active.len());
        debug!(%batch, removed, active = self.active.len(), "marker batch removed");
        removed
    }

    /// Markers currently on screen, in spawn order.
    pub fn active(&self) -> &[Marker] {
        &self.active
    }
}

/// Uniform offset in `[-span / 2, span / 2)`.
fn jitter(rng: &mut SmallRng, span: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * span
}
