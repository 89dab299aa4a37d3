use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{MachineError, Result};

/// External collaborator that actually plays sound files.
///
/// Playback is fire-and-forget: implementations should start playing and
/// return without waiting for the sound to finish.
pub trait AudioBackend: Send + Sync {
    fn play(&self, file: &Path) -> Result<()>;
}

/// Cheap, clonable handle the music box uses to request playback.
#[derive(Clone)]
pub struct AudioEngine {
    backend: Arc<dyn AudioBackend>,
}

impl AudioEngine {
    pub fn new(backend: impl AudioBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Engine that discards every request.
    pub fn silent() -> Self {
        Self::new(SilentBackend)
    }

    /// Requests playback of `file`. Failures are logged and otherwise
    /// ignored; the simulation never depends on audio.
    pub fn play(&self, file: &Path) {
        if let Err(err) = self.backend.play(file) {
            tracing::warn!(file = %file.display(), error = %err, "audio playback failed");
        }
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioEngine").finish_non_exhaustive()
    }
}

/// Backend that plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&self, _file: &Path) -> Result<()> {
        Ok(())
    }
}

/// Backend that remembers every requested file. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    played: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files requested so far, in request order.
    pub fn played(&self) -> Result<Vec<PathBuf>> {
        Ok(self.lock()?.clone())
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<PathBuf>>> {
        self.played
            .lock()
            .map_err(|_| MachineError::msg("audio log has been poisoned"))
    }
}

impl AudioBackend for RecordingBackend {
    fn play(&self, file: &Path) -> Result<()> {
        self.lock()?.push(file.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSpeaker;

    impl AudioBackend for BrokenSpeaker {
        fn play(&self, _file: &Path) -> Result<()> {
            Err(MachineError::msg("no output device"))
        }
    }

    #[test]
    fn recording_backend_shares_log_between_clones() {
        let backend = RecordingBackend::new();
        let engine = AudioEngine::new(backend.clone());

        engine.play(Path::new("audio/C4.wav"));
        engine.play(Path::new("audio/E4.wav"));

        let played = backend.played().unwrap();
        assert_eq!(
            played,
            vec![PathBuf::from("audio/C4.wav"), PathBuf::from("audio/E4.wav")]
        );
    }

    #[test]
    fn playback_failures_are_swallowed() {
        let engine = AudioEngine::new(BrokenSpeaker);
        engine.play(Path::new("audio/C4.wav"));
    }
}
