//! Component base state and variant dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parts::{Cam, Crank, MusicBox, Pulley, Shaft, Sparty, ToyBox};
use crate::propagation::{KeyDropNotifier, KeyResponder, RotationSink, RotationSource};
use crate::render::Canvas;

/// 2-D placement of a component relative to the machine origin, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Placement and local clock shared by every component.
#[derive(Debug, Clone, Default)]
pub struct ComponentBase {
    placement: Placement,
    time: f64,
}

impl ComponentBase {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            time: 0.0,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub fn x(&self) -> f64 {
        self.placement.x
    }

    pub fn y(&self) -> f64 {
        self.placement.y
    }

    /// Local elapsed time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn advance(&mut self, delta: f64) {
        self.time += delta;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

/// Stable handle of a component inside its machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(usize);

impl ComponentId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour common to every part of a machine.
pub trait Part {
    fn base(&self) -> &ComponentBase;

    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Moves the part forward (or backward, for negative `delta`) in time.
    ///
    /// Returns the rotation to publish when the part drives motion on its
    /// own; only the crank does.
    fn advance(&mut self, delta: f64) -> Option<f64> {
        self.base_mut().advance(delta);
        None
    }

    /// Returns the part to its freshly assembled state.
    fn reset(&mut self);

    fn draw_background(&self, _canvas: &mut dyn Canvas) {}

    fn draw_foreground(&self, _canvas: &mut dyn Canvas) {}
}

/// Every kind of part a machine can hold.
#[derive(Debug)]
pub enum Component {
    Crank(Crank),
    Shaft(Shaft),
    Pulley(Pulley),
    Cam(Cam),
    ToyBox(ToyBox),
    Sparty(Sparty),
    MusicBox(MusicBox),
}

impl Component {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Crank(_) => "crank",
            Self::Shaft(_) => "shaft",
            Self::Pulley(_) => "pulley",
            Self::Cam(_) => "cam",
            Self::ToyBox(_) => "box",
            Self::Sparty(_) => "sparty",
            Self::MusicBox(_) => "music box",
        }
    }

    pub fn part(&self) -> &dyn Part {
        match self {
            Self::Crank(part) => part,
            Self::Shaft(part) => part,
            Self::Pulley(part) => part,
            Self::Cam(part) => part,
            Self::ToyBox(part) => part,
            Self::Sparty(part) => part,
            Self::MusicBox(part) => part,
        }
    }

    pub fn part_mut(&mut self) -> &mut dyn Part {
        match self {
            Self::Crank(part) => part,
            Self::Shaft(part) => part,
            Self::Pulley(part) => part,
            Self::Cam(part) => part,
            Self::ToyBox(part) => part,
            Self::Sparty(part) => part,
            Self::MusicBox(part) => part,
        }
    }

    pub fn as_sink_mut(&mut self) -> Option<&mut dyn RotationSink> {
        match self {
            Self::Shaft(part) => Some(part),
            Self::Pulley(part) => Some(part),
            Self::Cam(part) => Some(part),
            Self::MusicBox(part) => Some(part),
            Self::Crank(_) | Self::ToyBox(_) | Self::Sparty(_) => None,
        }
    }

    pub fn is_sink(&self) -> bool {
        matches!(
            self,
            Self::Shaft(_) | Self::Pulley(_) | Self::Cam(_) | Self::MusicBox(_)
        )
    }

    pub fn as_responder_mut(&mut self) -> Option<&mut dyn KeyResponder> {
        match self {
            Self::ToyBox(part) => Some(part),
            Self::Sparty(part) => Some(part),
            _ => None,
        }
    }

    pub fn is_responder(&self) -> bool {
        matches!(self, Self::ToyBox(_) | Self::Sparty(_))
    }

    pub fn source(&self) -> Option<&RotationSource> {
        match self {
            Self::Crank(part) => Some(part.source()),
            Self::Shaft(part) => Some(part.source()),
            Self::Pulley(part) => Some(part.source()),
            _ => None,
        }
    }

    pub fn source_mut(&mut self) -> Option<&mut RotationSource> {
        match self {
            Self::Crank(part) => Some(part.source_mut()),
            Self::Shaft(part) => Some(part.source_mut()),
            Self::Pulley(part) => Some(part.source_mut()),
            _ => None,
        }
    }

    pub fn notifier(&self) -> Option<&KeyDropNotifier> {
        match self {
            Self::Cam(part) => Some(part.notifier()),
            _ => None,
        }
    }

    pub fn notifier_mut(&mut self) -> Option<&mut KeyDropNotifier> {
        match self {
            Self::Cam(part) => Some(part.notifier_mut()),
            _ => None,
        }
    }
}

/// Typed access to the concrete part stored in a [`Component`].
pub trait PartVariant: Part + Sized {
    fn from_component(component: &Component) -> Option<&Self>;

    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Component {
                fn from(part: $variant) -> Self {
                    Self::$variant(part)
                }
            }

            impl PartVariant for $variant {
                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(part) => Some(part),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(part) => Some(part),
                        _ => None,
                    }
                }
            }
        )*
    };
}

component_variants!(Crank, Shaft, Pulley, Cam, ToyBox, Sparty, MusicBox);
