//! Frame driver owning the machine currently on show.

use crate::assets::Resources;
use crate::audio::AudioEngine;
use crate::component::Placement;
use crate::factory::{MachineFactory, MachineKind};
use crate::machine::Machine;
use crate::render::{Canvas, DrawCommand};
use crate::timeline::FrameClock;
use crate::{MachineError, Result};

pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Drives one machine frame by frame.
///
/// Time is always `frame / frame_rate`. Moving to a frame walks there one
/// frame at a time, so the machine sees the same sequence of steps whether
/// it is played or scrubbed.
#[derive(Debug)]
pub struct MachineSystem {
    factory: MachineFactory,
    machine: Machine,
    kind: MachineKind,
    clock: FrameClock,
    location: Placement,
    muted: bool,
}

impl MachineSystem {
    /// Creates a system showing machine 1 at the default frame rate.
    pub fn new(resources: Resources, audio: AudioEngine) -> Result<Self> {
        let factory = MachineFactory::new(resources, audio);
        let kind = MachineKind::One;
        let machine = factory.create(kind)?;

        Ok(Self {
            factory,
            machine,
            kind,
            clock: FrameClock::new(DEFAULT_FRAME_RATE)?,
            location: Placement::ORIGIN,
            muted: false,
        })
    }

    pub fn set_location(&mut self, location: Placement) {
        self.location = location;
    }

    pub fn location(&self) -> Placement {
        self.location
    }

    /// Draws the machine at its location.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw(DrawCommand::PushTranslate {
            x: self.location.x,
            y: self.location.y,
        });
        self.machine.draw(canvas);
        canvas.draw(DrawCommand::Pop);
    }

    /// Returns to frame zero and resets every component. The frame rate is
    /// kept.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.machine.reset();
    }

    /// Moves the machine to `frame`. Setting the current frame again does
    /// nothing.
    pub fn set_frame(&mut self, frame: i64) -> Result<()> {
        if frame < 0 {
            return Err(MachineError::NegativeFrame(frame));
        }

        // Each step lands on the exact frame time, so the machine advances
        // by one frame duration without accumulating rounding error.
        while self.clock.frame() < frame {
            self.clock.step_forward();
            self.machine.set_time(self.clock.time_seconds());
        }
        while self.clock.frame() > frame {
            self.clock.step_backward();
            self.machine.set_time(self.clock.time_seconds());
        }
        Ok(())
    }

    /// Changes the frame rate. The current frame is kept and the machine
    /// moves to that frame's time under the new rate.
    pub fn set_frame_rate(&mut self, rate: f64) -> Result<()> {
        self.clock.set_rate(rate)?;
        self.machine.set_time(self.clock.time_seconds());
        Ok(())
    }

    pub fn frame_rate(&self) -> f64 {
        self.clock.rate()
    }

    pub fn frame(&self) -> i64 {
        self.clock.frame()
    }

    /// Current machine time in seconds.
    pub fn machine_time(&self) -> f64 {
        self.clock.time_seconds()
    }

    /// Replaces the machine with the one numbered `number`, starting again
    /// from frame zero. On error the current machine is left untouched.
    pub fn choose_machine(&mut self, number: u32) -> Result<()> {
        let kind = MachineKind::from_number(number)?;
        let mut machine = self.factory.create(kind)?;
        machine.set_muted(self.muted);

        tracing::debug!(machine = number, "switching machine");
        self.machine = machine;
        self.kind = kind;
        self.clock.reset();
        Ok(())
    }

    pub fn machine_number(&self) -> u32 {
        self.kind.number()
    }

    pub fn machine_kind(&self) -> MachineKind {
        self.kind
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.machine.set_muted(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}
