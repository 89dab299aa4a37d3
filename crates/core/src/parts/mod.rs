//! Concrete machine parts.
//!
//! The crank is the only part that derives motion from elapsed time. Shafts,
//! pulleys, the cam and the music box receive rotation from upstream
//! sources, while the box and the spring-loaded figures wait for key drops.

mod cam;
mod crank;
mod music_box;
mod pulley;
mod shaft;
mod sparty;
mod toy_box;

use std::f64::consts::TAU;

pub use cam::{Cam, CamState, CAM_CYCLE_TURNS, HOLE_WINDOW};
pub use crank::{Crank, CRANK_GEARING, CRANK_SPEED};
pub use music_box::{MusicBox, BEAT_SCALE};
pub use pulley::{Belt, Pulley};
pub use shaft::{Shaft, SHAFT_DIAMETER, SHAFT_LENGTH};
pub use sparty::{Sparty, SpartyOptions};
pub use toy_box::{ToyBox, LID_OPENING_TIME};

/// Converts a rotation in turns to radians for trigonometry.
pub(crate) fn radians(turns: f64) -> f64 {
    turns * TAU
}
