//! Song documents and their conversion into a beat schedule.
//!
//! A song is stored as JSON:
//!
//! ```json
//! {
//!   "beats": 4,
//!   "sounds": [{ "note": "C4", "file": "C4.wav" }],
//!   "notes": [{ "measure": 1, "beat": 1, "note": "C4" }]
//! }
//! ```
//!
//! Measures and beats are 1-based. Every note must name a declared sound.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::timeline::{NoteSchedule, ScheduledNote};
use crate::{MachineError, Result};

/// Raw song document as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SongDocument {
    /// Beats per measure.
    pub beats: u32,
    #[serde(default)]
    pub sounds: Vec<SoundEntry>,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundEntry {
    pub note: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteEntry {
    pub measure: u32,
    pub beat: f64,
    pub note: String,
}

/// A song ready for playback: resolved sound files and a beat-ordered note
/// list.
#[derive(Debug, Clone, Default)]
pub struct Song {
    beats_per_measure: u32,
    sounds: HashMap<String, PathBuf>,
    notes: Vec<ScheduledNote>,
}

impl Song {
    /// Reads and converts the song at `path`. Sound files are resolved
    /// against `audio_dir`.
    pub fn load(path: &Path, audio_dir: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| MachineError::song_load(path, format!("cannot open file: {err}")))?;
        let document: SongDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| MachineError::song_load(path, err.to_string()))?;

        Self::from_document(document, audio_dir).map_err(|err| match err {
            MachineError::SongLoad { reason, .. } => MachineError::song_load(path, reason),
            MachineError::UnknownNote { note } => {
                MachineError::song_load(path, format!("note `{note}` has no matching sound"))
            }
            other => other,
        })
    }

    pub fn from_json_str(json: &str, audio_dir: &Path) -> Result<Self> {
        let document: SongDocument = serde_json::from_str(json)?;
        Self::from_document(document, audio_dir)
    }

    pub fn from_document(document: SongDocument, audio_dir: &Path) -> Result<Self> {
        if document.beats == 0 {
            return Err(MachineError::song_load(
                "<document>",
                "beats per measure must be positive",
            ));
        }

        let sounds: HashMap<String, PathBuf> = document
            .sounds
            .into_iter()
            .map(|sound| (sound.note, audio_dir.join(sound.file)))
            .collect();

        let mut notes = Vec::with_capacity(document.notes.len());
        for entry in document.notes {
            if entry.measure == 0 || !entry.beat.is_finite() || entry.beat < 1.0 {
                return Err(MachineError::song_load(
                    "<document>",
                    format!(
                        "note `{}` has invalid position measure {} beat {}",
                        entry.note, entry.measure, entry.beat
                    ),
                ));
            }
            if !sounds.contains_key(&entry.note) {
                return Err(MachineError::UnknownNote { note: entry.note });
            }
            let beat = absolute_beat(document.beats, entry.measure, entry.beat);
            notes.push(ScheduledNote::new(beat, entry.note));
        }
        notes.sort_by(|a, b| a.beat.total_cmp(&b.beat));

        Ok(Self {
            beats_per_measure: document.beats,
            sounds,
            notes,
        })
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    /// Notes in beat order.
    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn sound_for(&self, note: &str) -> Option<&Path> {
        self.sounds.get(note).map(PathBuf::as_path)
    }

    pub fn schedule(&self) -> NoteSchedule {
        NoteSchedule::new(self.notes.clone())
    }
}

/// Zero-based beat counted from the start of the song.
fn absolute_beat(beats_per_measure: u32, measure: u32, beat: f64) -> f64 {
    f64::from(measure.saturating_sub(1)) * f64::from(beats_per_measure) + (beat - 1.0)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const WALTZ: &str = r#"{
        "beats": 3,
        "sounds": [
            { "note": "C4", "file": "C4.wav" },
            { "note": "G4", "file": "G4.wav" }
        ],
        "notes": [
            { "measure": 2, "beat": 1, "note": "G4" },
            { "measure": 1, "beat": 1, "note": "C4" },
            { "measure": 1, "beat": 2.5, "note": "G4" }
        ]
    }"#;

    #[test]
    fn converts_measures_to_sorted_absolute_beats() {
        let song = Song::from_json_str(WALTZ, Path::new("res/audio")).unwrap();

        let beats: Vec<f64> = song.notes().iter().map(|note| note.beat).collect();
        assert_eq!(beats, vec![0.0, 1.5, 3.0]);
        assert_eq!(song.beats_per_measure(), 3);
        assert_eq!(
            song.sound_for("G4"),
            Some(Path::new("res/audio/G4.wav"))
        );
    }

    #[test]
    fn unknown_note_fails_fast() {
        let json = r#"{ "beats": 4, "sounds": [], "notes": [{ "measure": 1, "beat": 1, "note": "A4" }] }"#;
        let err = Song::from_json_str(json, Path::new("audio")).unwrap_err();
        assert!(matches!(err, MachineError::UnknownNote { ref note } if note == "A4"));
    }

    #[test]
    fn unparsable_numbers_fail_fast() {
        let json = r#"{ "beats": "four", "sounds": [], "notes": [] }"#;
        assert!(matches!(
            Song::from_json_str(json, Path::new("audio")),
            Err(MachineError::Json(_))
        ));
    }

    #[test]
    fn absolute_beats_count_from_the_first_measure() {
        assert_eq!(absolute_beat(4, 1, 1.0), 0.0);
        assert_eq!(absolute_beat(4, 3, 2.5), 9.5);
        assert_eq!(absolute_beat(4, 0, 1.0), 0.0);
    }

    #[test]
    fn zero_measure_is_rejected() {
        let json = r#"{ "beats": 4, "sounds": [{ "note": "C4", "file": "C4.wav" }],
                        "notes": [{ "measure": 0, "beat": 1, "note": "C4" }] }"#;
        assert!(Song::from_json_str(json, Path::new("audio")).is_err());
    }

    #[test]
    fn load_reports_the_offending_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "beats": 4, "sounds": [], "notes": [{{ "measure": 1, "beat": 1, "note": "B4" }}] }}"#
        )
        .unwrap();

        let err = Song::load(file.path(), Path::new("audio")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("B4"), "{message}");
        assert!(message.contains(&file.path().display().to_string()), "{message}");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = Song::load(Path::new("does/not/exist.json"), Path::new("audio")).unwrap_err();
        assert!(matches!(err, MachineError::SongLoad { .. }));
    }
}
