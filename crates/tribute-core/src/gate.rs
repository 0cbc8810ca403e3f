//! Interaction-counting reveal gate.
//!
//! The gate counts qualifying interactions and moves through
//! `Locked -> Pending -> Revealed`, once, with no way back. Reaching the
//! threshold only moves it to `Pending`; the view context flips it to
//! `Revealed` after the configured reveal delay via [`RevealGate::complete_reveal`].
//!
//! Raw input events are normalized by [`interaction_point`] before they get
//! here, so the gate never sees the difference between pointer and touch.

use tribute_types::{InteractionEvent, Point, RevealPhase};

/// Default number of interactions needed to reveal the page.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// What a single call to [`RevealGate::record_interaction`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The gate is already revealed; nothing changed.
    Ignored,
    /// The interaction was counted and the gate is still short of the
    /// threshold (or already pending).
    Counted {
        /// Interactions recorded so far.
        interactions: u32,
        /// Interactions still needed.
        remaining: u32,
    },
    /// This interaction reached the threshold. The caller schedules the
    /// reveal; this is reported exactly once per gate.
    ThresholdReached {
        /// Interactions recorded so far (equal to the threshold).
        interactions: u32,
    },
}

impl GateOutcome {
    /// Whether the interaction was counted (and should spawn markers).
    pub const fn counted(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// One-way interaction gate in front of the tribute page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealGate {
    threshold: u32,
    interactions: u32,
    phase: RevealPhase,
}

impl RevealGate {
    /// Create a locked gate. A threshold of 0 is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            interactions: 0,
            phase: RevealPhase::Locked,
        }
    }

    /// Count one qualifying interaction.
    ///
    /// No-op once revealed. While pending, interactions keep counting but
    /// the threshold is never reported twice.
    pub fn record_interaction(&mut self) -> GateOutcome {
        match self.phase {
            RevealPhase::Revealed => GateOutcome::Ignored,
            RevealPhase::Pending => {
                self.interactions = self.interactions.saturating_add(1);
                GateOutcome::Counted {
                    interactions: self.interactions,
                    remaining: 0,
                }
            }
            RevealPhase::Locked => {
                self.interactions = self.interactions.saturating_add(1);
                if self.interactions >= self.threshold {
                    self.phase = RevealPhase::Pending;
                    GateOutcome::ThresholdReached {
                        interactions: self.interactions,
                    }
                } else {
                    GateOutcome::Counted {
                        interactions: self.interactions,
                        remaining: self.remaining(),
                    }
                }
            }
        }
    }

    /// Flip a pending gate to revealed.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn complete_reveal(&mut self) -> bool {
        if self.phase == RevealPhase::Pending {
            self.phase = RevealPhase::Revealed;
            true
        } else {
            false
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Whether the page is revealed.
    pub const fn is_revealed(&self) -> bool {
        self.phase.is_revealed()
    }

    /// Interactions recorded so far.
    pub const fn interactions(&self) -> u32 {
        self.interactions
    }

    /// Interactions still needed, never below zero.
    pub const fn remaining(&self) -> u32 {
        self.threshold.saturating_sub(self.interactions)
    }

    /// The configured threshold.
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for RevealGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Reduce a pointer or touch event to one point relative to its target.
///
/// Touch events use their first touch point. A touch event without any
/// points has no position and returns `None`; it is not a qualifying
/// interaction.
pub fn interaction_point(event: &InteractionEvent) -> Option<Point> {
    match event {
        InteractionEvent::Pointer {
            client,
            target_origin,
        } => Some(client.relative_to(*target_origin)),
        InteractionEvent::Touch {
            touches,
            target_origin,
        } => touches
            .first()
            .map(|touch| touch.relative_to(*target_origin)),
    }
}
