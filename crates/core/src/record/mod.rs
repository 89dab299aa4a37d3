use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::{DrawCommand, DrawList};
use crate::system::MachineSystem;
use crate::{MachineError, Result};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub fps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("recording.json"),
            fps: 30,
        }
    }
}

/// Everything drawn for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: i64,
    pub time: f64,
    pub commands: Vec<DrawCommand>,
}

/// A finished recording as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub fps: u32,
    pub frames: Vec<FrameSnapshot>,
}

#[derive(Serialize)]
struct RecordingRef<'a> {
    fps: u32,
    frames: &'a [FrameSnapshot],
}

/// Collects one draw list per captured frame and writes them out as JSON.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    is_recording: bool,
    frames: Vec<FrameSnapshot>,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            is_recording: false,
            frames: Vec::new(),
        }
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Starts a fresh recording, discarding frames from any earlier one.
    pub fn start(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(MachineError::msg("recording already in progress"));
        }
        self.frames.clear();
        self.is_recording = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.is_recording = false;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn frames(&self) -> &[FrameSnapshot] {
        &self.frames
    }

    /// Draws `system` into a new snapshot.
    pub fn capture(&mut self, system: &MachineSystem) -> Result<()> {
        if !self.is_recording {
            return Err(MachineError::msg("recorder has not been started"));
        }
        let mut list = DrawList::new();
        system.draw(&mut list);
        self.frames.push(FrameSnapshot {
            frame: system.frame(),
            time: system.machine_time(),
            commands: list.into_commands(),
        });
        Ok(())
    }

    /// Stops recording and writes every captured frame to the output path,
    /// headed by the frame rate they were captured at.
    pub fn finish(&mut self) -> Result<PathBuf> {
        self.stop()?;
        let path = self.settings.output_path.clone();
        let writer = BufWriter::new(File::create(&path)?);
        let recording = RecordingRef {
            fps: self.settings.fps,
            frames: &self.frames,
        };
        serde_json::to_writer(writer, &recording)?;
        tracing::info!(frames = self.frames.len(), fps = self.settings.fps, path = %path.display(), "wrote recording");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::assets::Resources;
    use crate::audio::AudioEngine;

    fn system(root: &std::path::Path) -> MachineSystem {
        fs::create_dir(root.join("songs")).unwrap();
        fs::write(
            root.join("songs/twinkle.json"),
            r#"{ "beats": 4, "sounds": [], "notes": [] }"#,
        )
        .unwrap();
        MachineSystem::new(Resources::new(root), AudioEngine::silent()).unwrap()
    }

    #[test]
    fn capture_requires_start() {
        let dir = tempfile::tempdir().unwrap();
        let system = system(dir.path());
        let mut recorder = Recorder::default();

        assert!(recorder.capture(&system).is_err());
        recorder.start().unwrap();
        assert!(recorder.start().is_err());
        recorder.capture(&system).unwrap();
        assert_eq!(recorder.frames().len(), 1);
    }

    #[test]
    fn finish_writes_frames_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let output = dir.path().join("out.json");
        let mut recorder = Recorder::new(RecordingSettings {
            output_path: output.clone(),
            fps: 60,
        });

        recorder.start().unwrap();
        for frame in 0..3 {
            system.set_frame(frame).unwrap();
            recorder.capture(&system).unwrap();
        }
        recorder.finish().unwrap();

        let recording: Recording =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(recording.fps, 60);
        assert_eq!(recording.frames.len(), 3);
        assert_eq!(recording.frames[2].frame, 2);
        assert!(!recording.frames[0].commands.is_empty());
        assert!(!recorder.is_recording());
    }
}
