//! End-to-end view lifecycle: mount from YAML, unlock the gate, read the
//! counter, toggle the music, and tear down.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tribute_core::config::TributeConfig;
use tribute_core::labels;
use tribute_core::music::{AudioBackend, AudioError, AudioOutput, AudioSource, SilentBackend};
use tribute_core::time_source::{ManualTimeSource, TimeSource};
use tribute_core::view::{InteractionOutcome, ViewContext, ViewError};
use tribute_types::{InteractionEvent, PlaybackState, Point, RevealPhase, TimeUnit};

const YAML: &str = r"
anchor:
  local_time: 2024-03-27T16:00:00
  utc_offset_minutes: -180
gate:
  threshold: 3
rng_seed: 5
";

fn touch(x: f64, y: f64) -> InteractionEvent {
    InteractionEvent::Touch {
        touches: vec![Point::new(x, y), Point::new(x + 40.0, y)],
        target_origin: Point::new(20.0, 20.0),
    }
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

struct RefusingBackend;

impl AudioBackend for RefusingBackend {
    fn open(&self, source: &AudioSource) -> Result<Box<dyn AudioOutput>, AudioError> {
        Err(AudioError::Backend {
            message: format!("no device for {}", source.path),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn full_visit() {
    let config = TributeConfig::parse(YAML).unwrap();
    let anchor = config.anchor.resolve().unwrap().instant();
    let time = Arc::new(ManualTimeSource::new(
        anchor + TimeDelta::days(400) + TimeDelta::seconds(7),
    ));
    let view = ViewContext::mount(
        &config,
        &SilentBackend::new(),
        Arc::clone(&time) as Arc<dyn TimeSource>,
    )
    .await
    .unwrap();
    let mut rx = view.subscribe();

    assert_eq!(
        labels::reveal_prompt(view.snapshot().remaining),
        "Clique 3 vezes para revelar"
    );

    let first = view.record_interaction(&touch(120.0, 220.0)).await;
    assert!(matches!(
        first,
        InteractionOutcome::Counted { interactions: 1, remaining: 2, .. }
    ));
    let markers = view.snapshot().markers;
    assert_eq!(markers.len(), 5);
    // The first touch point, relative to the target origin.
    assert!(markers.iter().all(|m| (m.position.x - 100.0).abs() <= 50.0));
    assert!(markers.iter().all(|m| (m.position.y - 200.0).abs() <= 50.0));

    let _ = view.record_interaction(&touch(1.0, 1.0)).await;
    let third = view.record_interaction(&touch(1.0, 1.0)).await;
    assert!(matches!(
        third,
        InteractionOutcome::ThresholdReached { interactions: 3, .. }
    ));

    tokio::time::sleep(Duration::from_millis(1_010)).await;
    settle().await;
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.phase, RevealPhase::Revealed);
    assert_eq!(snapshot.ambient.len(), 4);

    let elapsed = snapshot.elapsed;
    assert_eq!(elapsed.get(TimeUnit::Years), 1);
    assert_eq!(elapsed.get(TimeUnit::Months), 1);
    assert_eq!(elapsed.get(TimeUnit::Days), 10);

    assert_eq!(view.toggle_music().await.unwrap(), PlaybackState::Playing);
    assert_eq!(view.content().images.len(), 2);

    view.teardown().await;
    assert!(rx.has_changed().is_err());
}

#[tokio::test(start_paused = true)]
async fn markers_clear_after_lifetime() {
    let config = TributeConfig::parse(YAML).unwrap();
    let time: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(
        config.anchor.resolve().unwrap().instant(),
    ));
    let view = ViewContext::mount(&config, &SilentBackend::new(), time)
        .await
        .unwrap();

    let _ = view.record_interaction(&touch(50.0, 50.0)).await;
    tokio::time::sleep(Duration::from_millis(2_900)).await;
    settle().await;
    assert_eq!(view.snapshot().markers.len(), 5);

    tokio::time::sleep(Duration::from_millis(200)).await;
    settle().await;
    assert!(view.snapshot().markers.is_empty());

    view.teardown().await;
}

#[tokio::test]
async fn unavailable_audio_fails_mount() {
    let config = TributeConfig::default();
    let time: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(chrono::Utc::now()));
    let err = ViewContext::mount(&config, &RefusingBackend, time)
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::Audio { .. }));
}
