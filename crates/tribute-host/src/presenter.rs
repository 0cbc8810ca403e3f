//! Plain-text rendering of view snapshots.
//!
//! The render functions are pure; [`spawn`] runs a task that watches the
//! view's snapshot channel and writes announcements to stdout.

use std::io::Write as _;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;
use tribute_core::config::PageContent;
use tribute_core::labels;
use tribute_types::{ElapsedBreakdown, PlaybackState, RevealPhase, ViewSnapshot};

/// The counter line, e.g. `1 ano | 0 meses | 5 dias | ...`.
pub fn render_counter(elapsed: &ElapsedBreakdown) -> String {
    elapsed
        .components()
        .iter()
        .map(|(unit, value)| format!("{value} {}", labels::unit_label(*unit, *value)))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The hidden page: prompt, teaser, and markers on screen.
pub fn render_gate(content: &PageContent, snapshot: &ViewSnapshot) -> String {
    let mut out = format!(
        "{}\n{}\n",
        labels::reveal_prompt(snapshot.remaining),
        content.gate_teaser
    );
    if !snapshot.markers.is_empty() {
        out.push_str(&format!("({} rosas caindo)\n", snapshot.markers.len()));
    }
    out
}

/// The revealed page: music button, photos, message, and counter.
pub fn render_page(content: &PageContent, snapshot: &ViewSnapshot) -> String {
    let playback = match snapshot.playback {
        PlaybackState::Playing => "tocando",
        PlaybackState::Paused => "pausado",
    };
    let mut out = format!(
        "[{playback}] {}\n          {}\n",
        content.track_title, content.track_subtitle
    );
    for image in &content.images {
        out.push_str(&format!("[foto] {} ({})\n", image.path, image.alt));
    }
    out.push_str(&format!(
        "{}\n{}\n{}\n",
        content.message,
        content.counter_heading,
        render_counter(&snapshot.elapsed)
    ));
    out
}

/// Render whichever page the snapshot's phase shows.
pub fn render(content: &PageContent, snapshot: &ViewSnapshot) -> String {
    match snapshot.phase {
        RevealPhase::Revealed => render_page(content, snapshot),
        RevealPhase::Locked | RevealPhase::Pending => render_gate(content, snapshot),
    }
}

/// What to print when the view moves from `previous` to `current`.
///
/// Clock ticks and marker expiry alone print nothing; `status` shows them.
pub fn announce(
    content: &PageContent,
    previous: &ViewSnapshot,
    current: &ViewSnapshot,
) -> Option<String> {
    if current.phase == RevealPhase::Revealed && previous.phase != RevealPhase::Revealed {
        return Some(render_page(content, current));
    }
    if current.interactions != previous.interactions {
        return Some(render_gate(content, current));
    }
    if current.playback != previous.playback {
        return Some(render_page(content, current));
    }
    None
}

/// Watch `snapshots` and print every announcement until the channel closes.
pub fn spawn(mut snapshots: watch::Receiver<ViewSnapshot>, content: PageContent) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous = snapshots.borrow_and_update().clone();
        while snapshots.changed().await.is_ok() {
            let current = snapshots.borrow_and_update().clone();
            if let Some(text) = announce(&content, &previous, &current) {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                    warn!(error = %e, "failed to write to stdout");
                }
            }
            previous = current;
        }
    })
}
