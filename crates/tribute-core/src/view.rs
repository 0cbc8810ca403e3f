//! View lifecycle context.
//!
//! A [`ViewContext`] exists for exactly one page view. It owns every piece
//! of mutable page state (gate, markers, elapsed clock, music, hearts) and
//! every pending timer, and publishes a [`ViewSnapshot`] to the rendering
//! layer after each change.
//!
//! # Timers
//!
//! All deferred work runs as tasks in one [`JoinSet`] owned by the state:
//!
//! - the repeating elapsed-clock tick,
//! - one marker-batch removal per counted interaction,
//! - the one-shot reveal after the threshold is reached.
//!
//! Tasks hold only a [`Weak`] handle to the state. [`ViewContext::teardown`]
//! aborts them all and releases the audio; dropping the context without a
//! teardown does the same, because the `JoinSet` aborts its tasks on drop
//! and the music toggle releases on drop.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tribute_types::{AmbientHeart, BatchId, InteractionEvent, PlaybackState, ViewSnapshot};

use crate::clock::{ClockError, ElapsedTimeClock};
use crate::config::{AmbientConfig, ConfigError, PageContent, TributeConfig};
use crate::decor;
use crate::gate::{self, GateOutcome, RevealGate};
use crate::markers::MarkerField;
use crate::music::{AudioBackend, AudioError, MusicError, MusicToggle};
use crate::time_source::TimeSource;

/// Errors that can occur while mounting a view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The anchor instant could not be resolved.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The audio resource could not be opened.
    #[error("audio error: {source}")]
    Audio {
        /// The underlying audio error.
        #[from]
        source: AudioError,
    },
}

/// What [`ViewContext::record_interaction`] did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Nothing changed: the page is revealed, or the event had no position.
    Ignored,
    /// Counted and a marker batch spawned.
    Counted {
        /// The spawned batch.
        batch: BatchId,
        /// Interactions recorded so far.
        interactions: u32,
        /// Interactions still needed.
        remaining: u32,
    },
    /// Counted, a marker batch spawned, and the reveal is now scheduled.
    ThresholdReached {
        /// The spawned batch.
        batch: BatchId,
        /// Interactions recorded so far.
        interactions: u32,
    },
}

/// Delays copied out of the configuration at mount.
#[derive(Debug, Clone, Copy)]
struct Timing {
    reveal_delay: Duration,
    marker_lifetime: Duration,
}

/// All mutable state of one view. Only ever touched under the mutex.
struct ViewState {
    gate: RevealGate,
    markers: MarkerField,
    clock: ElapsedTimeClock,
    music: MusicToggle,
    ambient_config: AmbientConfig,
    ambient: Vec<AmbientHeart>,
    rng: SmallRng,
    tasks: JoinSet<()>,
    snapshots: watch::Sender<ViewSnapshot>,
}

impl ViewState {
    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            interactions: self.gate.interactions(),
            remaining: self.gate.remaining(),
            phase: self.gate.phase(),
            markers: self.markers.active().to_vec(),
            elapsed: self.clock.latest(),
            playback: self.music.state(),
            ambient: self.ambient.clone(),
        }
    }

    fn publish(&self) {
        // send_replace succeeds with or without live receivers.
        let _ = self.snapshots.send_replace(self.snapshot());
    }

    fn refresh_elapsed(&mut self, now: DateTime<Utc>) {
        match self.clock.tick(now) {
            Ok(_) => self.publish(),
            Err(e) => warn!(error = %e, "elapsed clock tick failed, keeping previous value"),
        }
    }

    fn complete_reveal(&mut self) {
        if self.gate.complete_reveal() {
            self.ambient = decor::plan_hearts(&self.ambient_config, &mut self.rng);
            info!(
                interactions = self.gate.interactions(),
                hearts = self.ambient.len(),
                "tribute revealed"
            );
            self.publish();
        }
    }

    fn remove_batch(&mut self, batch: BatchId) {
        if self.markers.remove_batch(batch) > 0 {
            self.publish();
        }
    }

    /// Drop the results of tasks that already finished.
    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }
}

/// Owner of one page view's state and timers.
pub struct ViewContext {
    state: Arc<Mutex<ViewState>>,
    snapshots: watch::Receiver<ViewSnapshot>,
    time: Arc<dyn TimeSource>,
    timing: Timing,
    content: PageContent,
}

impl ViewContext {
    /// Mount a view: acquire the audio, start the elapsed clock, and
    /// publish the initial snapshot.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the configuration is invalid, the anchor
    /// cannot be resolved, or the audio cannot be opened.
    pub async fn mount(
        config: &TributeConfig,
        backend: &dyn AudioBackend,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ViewError> {
        config.validate()?;
        let anchor = config.anchor.resolve()?;
        let music = MusicToggle::acquire(backend, &config.page.audio)?;

        let mut rng = config
            .rng_seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        let marker_rng = SmallRng::from_rng(&mut rng);

        let (sender, receiver) = watch::channel(ViewSnapshot::default());
        let state = ViewState {
            gate: RevealGate::new(config.gate.threshold),
            markers: MarkerField::new(config.markers.clone(), marker_rng),
            clock: ElapsedTimeClock::new(anchor),
            music,
            ambient_config: config.ambient.clone(),
            ambient: Vec::new(),
            rng,
            tasks: JoinSet::new(),
            snapshots: sender,
        };
        state.publish();

        let state = Arc::new(Mutex::new(state));
        {
            let mut guard = state.lock().await;
            guard.tasks.spawn(run_clock(
                Arc::downgrade(&state),
                Arc::clone(&time),
                config.clock.tick_interval(),
            ));
        }

        info!(
            anchor = %anchor.instant(),
            threshold = config.gate.threshold,
            tick_interval_ms = config.clock.tick_interval_ms,
            "view mounted"
        );

        Ok(Self {
            state,
            snapshots: receiver,
            time,
            timing: Timing {
                reveal_delay: config.gate.reveal_delay(),
                marker_lifetime: config.markers.lifetime(),
            },
            content: config.page.clone(),
        })
    }

    /// Feed one pointer or touch event to the gate.
    ///
    /// While the page is hidden this counts the interaction, spawns a
    /// marker batch at the normalized position, and schedules the batch's
    /// removal. The interaction that reaches the threshold also schedules
    /// the reveal. Once revealed, every call is a no-op.
    pub async fn record_interaction(&self, event: &InteractionEvent) -> InteractionOutcome {
        let Some(point) = gate::interaction_point(event) else {
            debug!("interaction without a position ignored");
            return InteractionOutcome::Ignored;
        };

        let mut state = self.state.lock().await;
        let outcome = state.gate.record_interaction();
        if !outcome.counted() {
            debug!("interaction after reveal ignored");
            return InteractionOutcome::Ignored;
        }

        let batch = state.markers.spawn_batch(point, self.time.now());
        state.reap_finished();
        state.tasks.spawn(remove_batch_later(
            Arc::downgrade(&self.state),
            batch,
            self.timing.marker_lifetime,
        ));

        let result = match outcome {
            GateOutcome::ThresholdReached { interactions } => {
                info!(
                    interactions,
                    delay_ms = self.timing.reveal_delay.as_millis(),
                    "reveal threshold reached"
                );
                state.tasks.spawn(reveal_later(
                    Arc::downgrade(&self.state),
                    self.timing.reveal_delay,
                ));
                InteractionOutcome::ThresholdReached {
                    batch,
                    interactions,
                }
            }
            GateOutcome::Counted {
                interactions,
                remaining,
            } => {
                debug!(interactions, remaining, "interaction counted");
                InteractionOutcome::Counted {
                    batch,
                    interactions,
                    remaining,
                }
            }
            GateOutcome::Ignored => InteractionOutcome::Ignored,
        };

        state.publish();
        result
    }

    /// Flip the background music between playing and paused.
    ///
    /// # Errors
    ///
    /// Returns [`MusicError`] if the backend fails; the state is unchanged.
    pub async fn toggle_music(&self) -> Result<PlaybackState, MusicError> {
        let mut state = self.state.lock().await;
        let playback = state.music.toggle()?;
        state.publish();
        Ok(playback)
    }

    /// A receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshots.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Text and assets for the rendering layer.
    pub const fn content(&self) -> &PageContent {
        &self.content
    }

    /// Unmount: cancel every timer and release the audio.
    pub async fn teardown(self) {
        let mut state = self.state.lock().await;
        let pending = state.tasks.len();
        state.tasks.abort_all();
        let released = state.music.release();
        info!(pending_tasks = pending, audio_released = released, "view torn down");
    }
}

impl Drop for ViewContext {
    fn drop(&mut self) {
        // Covers views dropped without `teardown`. A task holding a strong
        // handle at this moment keeps the state alive until it finishes, so
        // cancel and release here instead of waiting for the last handle.
        if let Ok(mut state) = self.state.try_lock() {
            state.tasks.abort_all();
            let _ = state.music.release();
        }
    }
}

impl core::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewContext")
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

async fn run_clock(state: Weak<Mutex<ViewState>>, time: Arc<dyn TimeSource>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };
        state.lock().await.refresh_elapsed(time.now());
    }
}

async fn remove_batch_later(state: Weak<Mutex<ViewState>>, batch: BatchId, after: Duration) {
    tokio::time::sleep(after).await;
    if let Some(state) = state.upgrade() {
        state.lock().await.remove_batch(batch);
    }
}

async fn reveal_later(state: Weak<Mutex<ViewState>>, after: Duration) {
    tokio::time::sleep(after).await;
    if let Some(state) = state.upgrade() {
        state.lock().await.complete_reveal();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::atomic::Ordering;

    use tribute_types::{Point, RevealPhase};

    use super::*;
    use crate::music::tests::{AudioLog, RecordingBackend};
    use crate::time_source::ManualTimeSource;

    fn test_config() -> TributeConfig {
        let mut config = TributeConfig::default();
        config.anchor.utc_offset_minutes = Some(0);
        config.rng_seed = Some(17);
        config
    }

    async fn mount(config: &TributeConfig) -> (ViewContext, Arc<AudioLog>, Arc<ManualTimeSource>) {
        let log = Arc::new(AudioLog::default());
        let backend = RecordingBackend {
            log: Arc::clone(&log),
        };
        let start = config.anchor.resolve().unwrap().instant() + chrono::Duration::seconds(10);
        let time = Arc::new(ManualTimeSource::new(start));
        let view = ViewContext::mount(config, &backend, Arc::clone(&time) as Arc<dyn TimeSource>)
            .await
            .unwrap();
        (view, log, time)
    }

    fn press(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::Pointer {
            client: Point::new(x, y),
            target_origin: Point::ORIGIN,
        }
    }

    const fn batch_of(outcome: InteractionOutcome) -> Option<BatchId> {
        match outcome {
            InteractionOutcome::Counted { batch, .. }
            | InteractionOutcome::ThresholdReached { batch, .. } => Some(batch),
            InteractionOutcome::Ignored => None,
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn counts_toward_threshold_then_reveals_after_delay() {
        let (view, _log, _time) = mount(&test_config()).await;

        for n in 1..5 {
            let outcome = view.record_interaction(&press(100.0, 100.0)).await;
            assert!(matches!(
                outcome,
                InteractionOutcome::Counted { interactions, remaining, .. }
                    if interactions == n && remaining == 5_u32.saturating_sub(n)
            ));
            assert_eq!(view.snapshot().phase, RevealPhase::Locked);
        }

        let outcome = view.record_interaction(&press(100.0, 100.0)).await;
        assert!(matches!(
            outcome,
            InteractionOutcome::ThresholdReached { interactions: 5, .. }
        ));
        assert_eq!(view.snapshot().phase, RevealPhase::Pending);

        wait(999).await;
        assert_eq!(view.snapshot().phase, RevealPhase::Pending);

        wait(2).await;
        let snapshot = view.snapshot();
        assert_eq!(snapshot.phase, RevealPhase::Revealed);
        assert_eq!(snapshot.ambient.len(), 4);

        view.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn interactions_after_reveal_change_nothing() {
        let mut config = test_config();
        config.gate.threshold = 1;
        let (view, _log, _time) = mount(&config).await;

        let _ = view.record_interaction(&press(5.0, 5.0)).await;
        wait(1_001).await;
        let before = view.snapshot();
        assert_eq!(before.phase, RevealPhase::Revealed);

        for _ in 0..10 {
            let outcome = view.record_interaction(&press(5.0, 5.0)).await;
            assert_eq!(outcome, InteractionOutcome::Ignored);
        }
        let after = view.snapshot();
        assert_eq!(after.interactions, before.interactions);
        assert_eq!(after.markers.len(), before.markers.len());
        assert_eq!(after.phase, RevealPhase::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_presses_keep_spawning_but_reveal_once() {
        let mut config = test_config();
        config.gate.threshold = 2;
        let (view, _log, _time) = mount(&config).await;
        let mut rx = view.subscribe();

        let _ = view.record_interaction(&press(1.0, 1.0)).await;
        let _ = view.record_interaction(&press(1.0, 1.0)).await;
        let third = view.record_interaction(&press(1.0, 1.0)).await;
        assert!(matches!(
            third,
            InteractionOutcome::Counted { interactions: 3, remaining: 0, .. }
        ));
        assert_eq!(view.snapshot().markers.len(), 15);

        let _ = rx.borrow_and_update();
        wait(1_001).await;
        assert!(rx.borrow_and_update().phase.is_revealed());
        assert_eq!(view.snapshot().interactions, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn batches_expire_independently() {
        let (view, _log, _time) = mount(&test_config()).await;

        let first = view.record_interaction(&press(10.0, 10.0)).await;
        wait(1_500).await;
        let second = view.record_interaction(&press(300.0, 300.0)).await;
        assert_eq!(view.snapshot().markers.len(), 10);

        let a = batch_of(first).unwrap();
        let b = batch_of(second).unwrap();

        wait(1_600).await;
        let markers = view.snapshot().markers;
        assert_eq!(markers.len(), 5);
        assert!(markers.iter().all(|m| m.batch == b && m.batch != a));

        wait(1_500).await;
        assert!(view.snapshot().markers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_ticks_every_interval() {
        let (view, _log, time) = mount(&test_config()).await;
        settle().await;
        assert_eq!(view.snapshot().elapsed.seconds, 10);

        time.advance(chrono::Duration::seconds(1));
        wait(1_000).await;
        assert_eq!(view.snapshot().elapsed.seconds, 11);

        time.advance(chrono::Duration::minutes(2));
        wait(1_000).await;
        let elapsed = view.snapshot().elapsed;
        assert_eq!((elapsed.minutes, elapsed.seconds), (2, 11));
    }

    #[tokio::test(start_paused = true)]
    async fn clock_before_anchor_keeps_last_value() {
        let (view, _log, time) = mount(&test_config()).await;
        settle().await;
        let good = view.snapshot().elapsed;

        time.advance(-chrono::Duration::hours(1));
        wait(1_000).await;
        assert_eq!(view.snapshot().elapsed, good);
    }

    #[tokio::test(start_paused = true)]
    async fn music_toggle_is_published_and_released_once() {
        let (view, log, _time) = mount(&test_config()).await;

        assert_eq!(view.toggle_music().await.unwrap(), PlaybackState::Playing);
        assert_eq!(view.snapshot().playback, PlaybackState::Playing);
        assert_eq!(view.toggle_music().await.unwrap(), PlaybackState::Paused);
        assert_eq!(view.toggle_music().await.unwrap(), PlaybackState::Playing);

        view.teardown().await;
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
        // Teardown paused the playing track before releasing it.
        assert_eq!(log.pauses.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_reveal_and_clock() {
        let (view, log, time) = mount(&test_config()).await;
        let mut rx = view.subscribe();
        for _ in 0..5 {
            let _ = view.record_interaction(&press(1.0, 1.0)).await;
        }
        view.teardown().await;
        let last = rx.borrow_and_update().clone();
        assert_eq!(last.phase, RevealPhase::Pending);

        time.advance(chrono::Duration::seconds(30));
        wait(5_000).await;

        // The state is gone: no reveal, no marker removal, no clock tick.
        assert!(rx.has_changed().is_err());
        assert_eq!(*rx.borrow(), last);
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_without_teardown_releases_audio() {
        let (view, log, _time) = mount(&test_config()).await;
        let _ = view.toggle_music().await.unwrap();
        drop(view);
        settle().await;
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_without_points_is_ignored() {
        let (view, _log, _time) = mount(&test_config()).await;
        let event = InteractionEvent::Touch {
            touches: Vec::new(),
            target_origin: Point::ORIGIN,
        };
        assert_eq!(view.record_interaction(&event).await, InteractionOutcome::Ignored);
        assert_eq!(view.snapshot().interactions, 0);
        assert!(view.snapshot().markers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_fails_to_mount() {
        let mut config = test_config();
        config.clock.tick_interval_ms = 0;
        let backend = RecordingBackend {
            log: Arc::new(AudioLog::default()),
        };
        let time: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(Utc::now()));
        let err = ViewContext::mount(&config, &backend, time).await.unwrap_err();
        assert!(matches!(err, ViewError::Config { .. }));
    }
}
