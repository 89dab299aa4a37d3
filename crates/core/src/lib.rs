//! Core library for the jack-in-the-box machine simulation.
//!
//! A machine is a graph of mechanical parts driven by a single crank. The
//! crank turns with elapsed time and its rotation is propagated through
//! shafts, pulleys and belts to a cam and a music box. When the cam drops
//! its key, the box lid and the figures inside spring into motion. The
//! [`MachineSystem`] drives a machine frame by frame; drawing and audio are
//! handed to external collaborators through the [`Canvas`] and
//! [`AudioBackend`] traits.

pub mod assets;
pub mod audio;
pub mod component;
pub mod config;
pub mod error;
pub mod factory;
pub mod machine;
pub mod parts;
pub mod propagation;
pub mod record;
pub mod render;
pub mod song;
pub mod system;
pub mod timeline;

pub use assets::Resources;
pub use audio::{AudioBackend, AudioEngine, RecordingBackend, SilentBackend};
pub use component::{Component, ComponentBase, ComponentId, Part, PartVariant, Placement};
pub use config::{AppConfig, MachineConfig, ResourcesConfig};
pub use error::{MachineError, Result};
pub use factory::{MachineFactory, MachineKind};
pub use machine::{Machine, MachineBuilder};
pub use propagation::{
    KeyDropNotifier, KeyResponder, Link, LinkKind, RotationSink, RotationSource, SinkOutcome,
};
pub use record::{FrameSnapshot, Recorder, Recording, RecordingSettings};
pub use render::{Canvas, DrawCommand, DrawList};
pub use song::Song;
pub use system::{MachineSystem, DEFAULT_FRAME_RATE};
pub use timeline::{FrameClock, NoteSchedule, ScheduledNote};
