//! Background music toggle over a single scoped audio resource.
//!
//! The host provides an [`AudioBackend`]; the view opens one
//! [`AudioOutput`] from it at mount and releases it at teardown. The toggle
//! only sequences `play`/`pause` calls, it never decodes or buffers.
//!
//! Release happens exactly once: explicitly via [`MusicToggle::release`], or
//! on drop if the view is dropped without a teardown.

use serde::Deserialize;
use tracing::{debug, info, warn};
use tribute_types::PlaybackState;

/// Errors reported by an audio backend.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The backend refused or failed the request.
    #[error("audio backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// Errors that can occur when toggling music.
#[derive(Debug, thiserror::Error)]
pub enum MusicError {
    /// The audio resource was already released (view torn down).
    #[error("audio resource already released")]
    Released,

    /// The backend failed; the playback state is unchanged.
    #[error("audio error: {source}")]
    Audio {
        /// The underlying backend error.
        #[from]
        source: AudioError,
    },
}

/// The track to play.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AudioSource {
    /// Path served by the static asset host.
    #[serde(default = "default_audio_path")]
    pub path: String,

    /// Restart from the beginning when the track ends.
    #[serde(default = "default_looping")]
    pub looping: bool,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            path: default_audio_path(),
            looping: default_looping(),
        }
    }
}

fn default_audio_path() -> String {
    "/simply-red-you-make-me-feel-brand-new.mp3".to_owned()
}

const fn default_looping() -> bool {
    true
}

/// An opened audio resource.
pub trait AudioOutput: Send {
    /// Start or resume playback.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Pause playback.
    fn pause(&mut self) -> Result<(), AudioError>;

    /// Free the resource. Called exactly once, after which the output is
    /// dropped.
    fn release(&mut self);
}

/// Opens audio resources for a view.
pub trait AudioBackend {
    /// Open `source` for playback, paused.
    fn open(&self, source: &AudioSource) -> Result<Box<dyn AudioOutput>, AudioError>;
}

/// A backend whose outputs make no sound and only log.
///
/// Used by the terminal host, which has no audio device to drive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

impl SilentBackend {
    /// Create a new silent backend.
    pub const fn new() -> Self {
        Self
    }
}

impl AudioBackend for SilentBackend {
    fn open(&self, source: &AudioSource) -> Result<Box<dyn AudioOutput>, AudioError> {
        debug!(path = source.path, looping = source.looping, "silent audio opened");
        Ok(Box::new(SilentOutput {
            path: source.path.clone(),
        }))
    }
}

struct SilentOutput {
    path: String,
}

impl AudioOutput for SilentOutput {
    fn play(&mut self) -> Result<(), AudioError> {
        debug!(path = self.path, "silent audio play");
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        debug!(path = self.path, "silent audio pause");
        Ok(())
    }

    fn release(&mut self) {
        debug!(path = self.path, "silent audio released");
    }
}

/// Play/pause toggle owning the view's audio resource.
pub struct MusicToggle {
    output: Option<Box<dyn AudioOutput>>,
    state: PlaybackState,
}

impl MusicToggle {
    /// Take ownership of an opened output. Starts paused.
    pub const fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output: Some(output),
            state: PlaybackState::Paused,
        }
    }

    /// Open `source` through `backend` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError`] if the backend cannot open the source.
    pub fn acquire(backend: &dyn AudioBackend, source: &AudioSource) -> Result<Self, AudioError> {
        backend.open(source).map(Self::new)
    }

    /// Flip between playing and paused.
    ///
    /// # Errors
    ///
    /// Returns [`MusicError::Released`] after release, or
    /// [`MusicError::Audio`] if the backend fails (state unchanged).
    pub fn toggle(&mut self) -> Result<PlaybackState, MusicError> {
        let output = self.output.as_mut().ok_or(MusicError::Released)?;
        match self.state {
            PlaybackState::Paused => output.play()?,
            PlaybackState::Playing => output.pause()?,
        }
        self.state = self.state.toggled();
        info!(state = ?self.state, "music toggled");
        Ok(self.state)
    }

    /// Current playback state.
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the resource has been released.
    pub const fn is_released(&self) -> bool {
        self.output.is_none()
    }

    /// Pause if playing, then free the resource.
    ///
    /// Returns `true` for the call that released it; later calls do nothing.
    pub fn release(&mut self) -> bool {
        let Some(mut output) = self.output.take() else {
            return false;
        };
        if self.state == PlaybackState::Playing {
            if let Err(e) = output.pause() {
                warn!(error = %e, "failed to pause audio before release");
            }
            self.state = PlaybackState::Paused;
        }
        output.release();
        true
    }
}

impl Drop for MusicToggle {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

impl core::fmt::Debug for MusicToggle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MusicToggle")
            .field("state", &self.state)
            .field("released", &self.is_released())
            .finish()
    }
}
