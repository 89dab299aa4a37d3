//! Assembly recipes for the machines the system can show.

use std::fmt;

use crate::assets::Resources;
use crate::audio::AudioEngine;
use crate::component::{ComponentId, Placement};
use crate::machine::{Machine, MachineBuilder};
use crate::parts::{
    Cam, Crank, MusicBox, Pulley, Shaft, Sparty, SpartyOptions, ToyBox, SHAFT_DIAMETER,
};
use crate::{MachineError, Result};

const BOX_SIZE: f64 = 250.0;
const LID_SIZE: f64 = 240.0;

const KEY_IMAGE: &str = "key.png";
const MECHANISM_IMAGE: &str = "mechanism.png";
const SPARTY_IMAGE: &str = "sparty.png";
const TROLL_IMAGE: &str = "pinkTroll.png";

const TROLL_SPRING_X: [f64; 3] = [0.0, 65.0, -65.0];

/// The machines a [`MachineFactory`] knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineKind {
    /// A single Sparty popped by a cam on the crank shaft.
    One,
    /// Three bouncing trolls behind two reduction belts.
    Two,
}

impl MachineKind {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    pub fn number(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn from_number(number: u32) -> Result<Self> {
        Self::try_from(number)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::One => "crank, shaft and cam releasing one Sparty; plays `twinkle`",
            Self::Two => "two belt reductions driving a cam that releases three trolls; plays `pop`",
        }
    }
}

impl TryFrom<u32> for MachineKind {
    type Error = MachineError;

    fn try_from(number: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.number() == number)
            .ok_or(MachineError::UnknownMachine(number))
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine {}", self.number())
    }
}

/// Builds machines from the resources found under one root directory.
#[derive(Debug, Clone)]
pub struct MachineFactory {
    resources: Resources,
    audio: AudioEngine,
}

impl MachineFactory {
    pub fn new(resources: Resources, audio: AudioEngine) -> Self {
        Self { resources, audio }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn create(&self, kind: MachineKind) -> Result<Machine> {
        tracing::debug!(machine = kind.number(), "building machine");
        match kind {
            MachineKind::One => self.machine_one(),
            MachineKind::Two => self.machine_two(),
        }
    }

    fn machine_one(&self) -> Result<Machine> {
        let mut builder = Machine::builder();
        let toy_box = builder.add(self.toy_box());
        let sparty = builder.add(Sparty::new(SpartyOptions {
            image: self.resources.image(SPARTY_IMAGE),
            size: 260.0,
            spring_length: 260.0,
            spring_width: 80.0,
            links: 15,
            bouncy: false,
            spring_x: 0.0,
        }));

        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = Shaft::default();
        let cam_placement = shaft.right_center();
        let shaft = builder.add(shaft);
        builder.connect(crank, shaft)?;

        let cam = builder.add(Cam::new(self.resources.image(KEY_IMAGE), cam_placement));
        builder.connect(shaft, cam)?;
        builder.add_responder(cam, toy_box)?;
        builder.add_responder(cam, sparty)?;

        self.add_music_box(&mut builder, shaft, "twinkle")?;
        builder.build()
    }

    fn machine_two(&self) -> Result<Machine> {
        let mut builder = Machine::builder();
        let toy_box = builder.add(self.toy_box());
        let trolls: Vec<ComponentId> = TROLL_SPRING_X
            .into_iter()
            .map(|spring_x| {
                builder.add(Sparty::new(SpartyOptions {
                    image: self.resources.image(TROLL_IMAGE),
                    size: 212.0,
                    spring_length: 260.0,
                    spring_width: 55.0,
                    links: 15,
                    bouncy: true,
                    spring_x,
                }))
            })
            .collect();

        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = Shaft::default();
        let first_pulley = Pulley::new(40.0, shaft.left_center());
        let shaft = builder.add(shaft);
        builder.connect(crank, shaft)?;
        let first_pulley = builder.add(first_pulley);
        builder.connect(shaft, first_pulley)?;

        // Lower shaft, driven through the first belt.
        let lower = Shaft::new(8.0, 230.0, Placement::new(-115.0, -65.0));
        let second_pulley = Pulley::new(95.0, lower.right_center());
        let third_pulley = Pulley::new(20.0, lower.left_center());
        let lower = builder.add(lower);
        let second_pulley = builder.add(second_pulley);
        builder.belt(first_pulley, second_pulley)?;
        builder.connect(second_pulley, lower)?;
        let third_pulley = builder.add(third_pulley);
        builder.connect(lower, third_pulley)?;

        // Upper left shaft, driven through the second belt.
        let upper = Shaft::new(SHAFT_DIAMETER, 50.0, Placement::new(-115.0, -185.0));
        let fourth_pulley = Pulley::new(80.0, upper.left_center());
        let cam_placement = upper.right_center();
        let upper = builder.add(upper);
        let fourth_pulley = builder.add(fourth_pulley);
        builder.connect(fourth_pulley, upper)?;
        builder.belt(third_pulley, fourth_pulley)?;

        let cam = builder.add(Cam::new(self.resources.image(KEY_IMAGE), cam_placement));
        builder.connect(third_pulley, cam)?;
        builder.add_responder(cam, toy_box)?;
        for troll in trolls {
            builder.add_responder(cam, troll)?;
        }

        self.add_music_box(&mut builder, shaft, "pop")?;
        builder.build()
    }

    fn toy_box(&self) -> ToyBox {
        ToyBox::new(&self.resources.images_dir(), BOX_SIZE, LID_SIZE)
    }

    fn add_music_box(&self, builder: &mut MachineBuilder, shaft: ComponentId, song: &str) -> Result<()> {
        let song = self.resources.load_song(song)?;
        let music = builder.add(MusicBox::new(
            song,
            self.audio.clone(),
            self.resources.image(MECHANISM_IMAGE),
        ));
        builder.connect(shaft, music)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_numbers_round_trip() {
        for kind in MachineKind::ALL {
            assert_eq!(MachineKind::from_number(kind.number()).unwrap(), kind);
        }
        assert!(matches!(
            MachineKind::try_from(3),
            Err(MachineError::UnknownMachine(3))
        ));
    }

    #[test]
    fn missing_song_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MachineFactory::new(Resources::new(dir.path()), AudioEngine::silent());

        assert!(matches!(
            factory.create(MachineKind::One),
            Err(MachineError::SongLoad { .. })
        ));
    }
}
