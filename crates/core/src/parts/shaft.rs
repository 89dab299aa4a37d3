use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::{RotationSink, RotationSource, SinkOutcome};
use crate::render::{Canvas, Color, Cylinder, DrawCommand};

pub const SHAFT_DIAMETER: f64 = 10.0;
pub const SHAFT_LENGTH: f64 = 80.0;
const DEFAULT_PLACEMENT: Placement = Placement::new(90.0, -185.0);

const SHAFT_COLOR: Color = Color::rgb(220, 220, 220);
const SHAFT_LINE_COLOR: Color = Color::rgb(100, 100, 100);
const SHAFT_LINE_WIDTH: f64 = 1.0;
const SHAFT_LINES: u32 = 4;

/// Offsets from the shaft ends where pulleys and cams are mounted.
const LEFT_MOUNT: (f64, f64) = (5.0, 2.5);
const RIGHT_MOUNT: (f64, f64) = (20.0, 2.5);

/// A rotating rod that passes its rotation on unchanged.
#[derive(Debug, Clone)]
pub struct Shaft {
    base: ComponentBase,
    source: RotationSource,
    rotation: f64,
    length: f64,
    cylinder: Cylinder,
}

impl Shaft {
    pub fn new(diameter: f64, length: f64, placement: Placement) -> Self {
        let cylinder = Cylinder::new(diameter, length)
            .with_color(SHAFT_COLOR)
            .with_lines(SHAFT_LINE_COLOR, SHAFT_LINE_WIDTH, SHAFT_LINES);

        Self {
            base: ComponentBase::new(placement),
            source: RotationSource::new(),
            rotation: 0.0,
            length,
            cylinder,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Mounting point near the left end of the shaft.
    pub fn left_center(&self) -> Placement {
        self.base.placement().offset(LEFT_MOUNT.0, -LEFT_MOUNT.1)
    }

    /// Mounting point near the right end of the shaft.
    pub fn right_center(&self) -> Placement {
        self.base
            .placement()
            .offset(self.length - RIGHT_MOUNT.0, -RIGHT_MOUNT.1)
    }

    pub fn source(&self) -> &RotationSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut RotationSource {
        &mut self.source
    }
}

impl Default for Shaft {
    fn default() -> Self {
        Self::new(SHAFT_DIAMETER, SHAFT_LENGTH, DEFAULT_PLACEMENT)
    }
}

impl RotationSink for Shaft {
    fn receive(&mut self, rotation: f64) -> SinkOutcome {
        self.rotation = rotation;
        SinkOutcome::republish(rotation)
    }
}

impl Part for Shaft {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn reset(&mut self) {
        self.base.reset();
        self.source.reset();
        self.rotation = 0.0;
    }

    fn draw_background(&self, canvas: &mut dyn Canvas) {
        canvas.draw(DrawCommand::Cylinder {
            cylinder: self.cylinder.clone(),
            x: self.base.x(),
            y: self.base.y(),
            rotation: self.rotation,
        });
    }
}
