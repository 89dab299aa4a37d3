use std::path::PathBuf;

use crate::audio::AudioEngine;
use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::{RotationSink, SinkOutcome};
use crate::render::{Canvas, Color, Cylinder, DrawCommand, Rect};
use crate::song::Song;
use crate::timeline::NoteSchedule;

/// Turns of the drum per measure are `1 / BEAT_SCALE`; one turn covers
/// `beats_per_measure * BEAT_SCALE` beats.
pub const BEAT_SCALE: f64 = 0.5;

const IMAGE_SIZE: f64 = 120.0;
const DRUM_WIDTH: f64 = 40.0;
const DRUM_DIAMETER: f64 = 33.0;
const DRUM_LINES: u32 = 6;
/// The drum is drawn turning slower than the shaft driving it.
const DRUM_ROTATION_DIVISOR: f64 = 4.0;
const DRUM_X_DIVISOR: f64 = 6.5;
const DRUM_Y_DIVISOR: f64 = 1.65;
const IMAGE_Y_DIVISOR: f64 = 10.0;

const DRUM_COLOR: Color = Color::rgb(248, 242, 191);
const DRUM_LINE_COLOR: Color = Color::rgb(20, 20, 20);

/// Plays a song as its drum turns.
#[derive(Debug, Clone)]
pub struct MusicBox {
    base: ComponentBase,
    rotation: f64,
    song: Song,
    schedule: NoteSchedule,
    audio: AudioEngine,
    muted: bool,
    mechanism: Rect,
    drum: Cylinder,
}

impl MusicBox {
    pub fn new(song: Song, audio: AudioEngine, mechanism_image: impl Into<PathBuf>) -> Self {
        Self {
            base: ComponentBase::new(Placement::ORIGIN),
            rotation: 0.0,
            schedule: song.schedule(),
            song,
            audio,
            muted: false,
            mechanism: Rect::new(0.0, 0.0, IMAGE_SIZE, IMAGE_SIZE).with_image(mechanism_image),
            drum: Cylinder::new(DRUM_DIAMETER, DRUM_WIDTH)
                .with_color(DRUM_COLOR)
                .with_lines(DRUM_LINE_COLOR, 2.0, DRUM_LINES),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.base.set_placement(placement);
        self
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn schedule(&self) -> &NoteSchedule {
        &self.schedule
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Beat reached by the drum at its current rotation.
    pub fn beat(&self) -> f64 {
        self.beat_at(self.rotation)
    }

    pub fn beat_at(&self, rotation: f64) -> f64 {
        rotation * f64::from(self.song.beats_per_measure()) * BEAT_SCALE
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Requests playback of `note` unless the box is muted.
    pub fn play_note(&self, note: &str) {
        if !self.muted {
            request_playback(&self.song, &self.audio, note);
        }
    }
}

fn request_playback(song: &Song, audio: &AudioEngine, note: &str) {
    match song.sound_for(note) {
        Some(file) => {
            tracing::trace!(note, file = %file.display(), "playing note");
            audio.play(file);
        }
        None => tracing::warn!(note, "note has no sound"),
    }
}

impl RotationSink for MusicBox {
    fn receive(&mut self, rotation: f64) -> SinkOutcome {
        self.rotation = rotation;
        let beat = self.beat_at(rotation);
        let due = self.schedule.advance_to(beat);
        if !self.muted {
            for note in due {
                request_playback(&self.song, &self.audio, &note.note);
            }
        }
        SinkOutcome::TERMINAL
    }
}

impl Part for MusicBox {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn reset(&mut self) {
        self.base.reset();
        self.rotation = 0.0;
        self.schedule.rewind();
    }

    fn draw_background(&self, canvas: &mut dyn Canvas) {
        let (x, y) = (self.base.x(), self.base.y());
        canvas.draw(DrawCommand::Rect {
            rect: self.mechanism.clone(),
            x: x - IMAGE_SIZE / 2.0,
            y: y - IMAGE_SIZE / IMAGE_Y_DIVISOR,
        });
        canvas.draw(DrawCommand::Cylinder {
            cylinder: self.drum.clone(),
            x: x - IMAGE_SIZE / DRUM_X_DIVISOR,
            y: y - IMAGE_SIZE / DRUM_Y_DIVISOR,
            rotation: self.rotation / DRUM_ROTATION_DIVISOR,
        });
    }
}
