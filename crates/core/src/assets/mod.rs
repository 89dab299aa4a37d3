use std::path::{Path, PathBuf};

use crate::song::Song;
use crate::Result;

const IMAGES_DIR: &str = "images";
const AUDIO_DIR: &str = "audio";
const SONGS_DIR: &str = "songs";
const SONG_EXTENSION: &str = "json";

/// Resolves images, sound files and songs below a single resource root.
///
/// ```text
/// <root>/images/*.png
/// <root>/audio/*.wav
/// <root>/songs/<name>.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn image(&self, name: &str) -> PathBuf {
        self.images_dir().join(name)
    }

    /// Directory sound files named in songs are resolved against.
    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_DIR)
    }

    pub fn song_path(&self, name: &str) -> PathBuf {
        self.root
            .join(SONGS_DIR)
            .join(name)
            .with_extension(SONG_EXTENSION)
    }

    /// Loads the song called `name`, e.g. `"pop"` for `songs/pop.json`.
    pub fn load_song(&self, name: &str) -> Result<Song> {
        let path = self.song_path(name);
        tracing::debug!(song = name, path = %path.display(), "loading song");
        Song::load(&path, &self.audio_dir())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new("resources")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::MachineError;

    #[test]
    fn resolves_paths_below_root() {
        let resources = Resources::new("res");

        assert_eq!(resources.image("key.png"), PathBuf::from("res/images/key.png"));
        assert_eq!(resources.song_path("pop"), PathBuf::from("res/songs/pop.json"));
        assert_eq!(resources.audio_dir(), PathBuf::from("res/audio"));
    }

    #[test]
    fn loads_song_with_sounds_in_audio_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("songs")).unwrap();
        fs::write(
            dir.path().join("songs/tune.json"),
            r#"{ "beats": 2,
                 "sounds": [{ "note": "A4", "file": "A4.wav" }],
                 "notes": [{ "measure": 2, "beat": 1, "note": "A4" }] }"#,
        )
        .unwrap();

        let resources = Resources::new(dir.path());
        let song = resources.load_song("tune").unwrap();

        assert_eq!(song.notes()[0].beat, 2.0);
        assert_eq!(song.sound_for("A4"), Some(dir.path().join("audio/A4.wav").as_path()));
    }

    #[test]
    fn missing_song_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Resources::new(dir.path()).load_song("absent").unwrap_err();

        assert!(matches!(err, MachineError::SongLoad { ref path, .. } if path.ends_with("songs/absent.json")));
    }
}
