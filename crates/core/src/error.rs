use std::path::PathBuf;

/// Result alias that carries the custom [`MachineError`] type.
pub type Result<T> = std::result::Result<T, MachineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A song document could not be turned into a playable schedule.
    #[error("failed to load song `{}`: {reason}", path.display())]
    SongLoad { path: PathBuf, reason: String },
    /// A note in the song refers to a sound that was never declared.
    #[error("note `{note}` has no matching sound")]
    UnknownNote { note: String },
    /// Pulleys taking part in a belt need a strictly positive diameter.
    #[error("pulley `{component}` has invalid diameter {diameter}")]
    InvalidDiameter { component: String, diameter: f64 },
    /// The same sink was linked twice from one source.
    #[error("`{sink}` is already linked from `{source_name}`")]
    DuplicateLink { source_name: String, sink: String },
    /// A sink takes its rotation from exactly one source.
    #[error("`{sink}` is already driven by `{driver}`")]
    AlreadyDriven { sink: String, driver: String },
    /// A pulley can only drive a single belt.
    #[error("pulley `{component}` already drives a belt")]
    AlreadyBelted { component: String },
    #[error("`{component}` does not own a rotation source")]
    NotASource { component: String },
    #[error("`{component}` cannot receive rotation")]
    NotASink { component: String },
    #[error("`{component}` does not respond to key drops")]
    NotAResponder { component: String },
    #[error("`{component}` cannot trigger key drops")]
    NotATrigger { component: String },
    #[error("no component with id {0}")]
    UnknownComponent(usize),
    /// The rotation links form a loop through the named component.
    #[error("rotation links form a cycle through `{component}`")]
    RotationCycle { component: String },
    #[error("frame {0} is negative")]
    NegativeFrame(i64),
    #[error("frame rate {0} must be positive and finite")]
    InvalidFrameRate(f64),
    #[error("no machine recipe numbered {0}")]
    UnknownMachine(u32),
}

impl MachineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn song_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SongLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for MachineError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for MachineError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
