use serde::{Deserialize, Serialize};

use crate::{MachineError, Result};

/// Absolute frame position of the frame driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    frame: i64,
    rate: f64,
}

impl FrameClock {
    pub fn new(rate: f64) -> Result<Self> {
        let mut clock = Self { frame: 0, rate: 1.0 };
        clock.set_rate(rate)?;
        Ok(clock)
    }

    pub fn frame(&self) -> i64 {
        self.frame
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(MachineError::InvalidFrameRate(rate));
        }
        self.rate = rate;
        Ok(())
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.rate
    }

    /// Absolute time of the current frame in seconds.
    pub fn time_seconds(&self) -> f64 {
        self.frame as f64 / self.rate
    }

    pub fn step_forward(&mut self) {
        self.frame += 1;
    }

    pub fn step_backward(&mut self) {
        self.frame -= 1;
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }
}

/// A note due at an absolute beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNote {
    pub beat: f64,
    pub note: String,
}

impl ScheduledNote {
    pub fn new(beat: f64, note: impl Into<String>) -> Self {
        Self {
            beat,
            note: note.into(),
        }
    }
}

/// Beat-ordered notes with a cursor that only moves forward until rewound.
#[derive(Debug, Default, Clone)]
pub struct NoteSchedule {
    notes: Vec<ScheduledNote>,
    next_note: usize,
}

impl NoteSchedule {
    pub fn new(mut notes: Vec<ScheduledNote>) -> Self {
        notes.sort_by(|a, b| a.beat.total_cmp(&b.beat));
        Self {
            notes,
            next_note: 0,
        }
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Index of the next note to play.
    pub fn cursor(&self) -> usize {
        self.next_note
    }

    /// The next note waiting to be played, if any.
    pub fn upcoming(&self) -> Option<&ScheduledNote> {
        self.notes.get(self.next_note)
    }

    /// Moves the cursor past every note due at or before `beat` and returns
    /// those notes. A beat lower than the last one returns nothing.
    pub fn advance_to(&mut self, beat: f64) -> &[ScheduledNote] {
        let start = self.next_note;
        while self
            .notes
            .get(self.next_note)
            .is_some_and(|note| beat >= note.beat)
        {
            self.next_note += 1;
        }
        &self.notes[start..self.next_note]
    }

    pub fn rewind(&mut self) {
        self.next_note = 0;
    }
}
