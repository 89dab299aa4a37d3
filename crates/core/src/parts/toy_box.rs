use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::KeyResponder;
use crate::render::{Canvas, DrawCommand, Rect};

/// Seconds the lid takes to swing fully open.
pub const LID_OPENING_TIME: f64 = 0.25;

/// Vertical scale of the lid while it is closed, so it reads as a sliver.
const LID_CLOSED_SCALE: f64 = 0.02;

const BACKGROUND_IMAGE: &str = "box-background.png";
const FOREGROUND_IMAGE: &str = "box-foreground.png";
const LID_IMAGE: &str = "box-lid.png";

/// The box the figures spring out of. Its lid swings open after a key drop
/// and stays open until the box is reset.
#[derive(Debug, Clone)]
pub struct ToyBox {
    base: ComponentBase,
    box_size: f64,
    open: bool,
    opening_time: f64,
    fully_open: bool,
    back: Rect,
    face: Rect,
    lid: Rect,
}

impl ToyBox {
    pub fn new(images_dir: &Path, box_size: f64, lid_size: f64) -> Self {
        let back = Rect::new(-box_size / 2.0, 0.0, box_size, box_size)
            .with_image(images_dir.join(BACKGROUND_IMAGE));
        let face = Rect::new(-box_size / 2.0, 0.0, box_size, box_size)
            .with_image(images_dir.join(FOREGROUND_IMAGE));
        let lid = Rect::new(-lid_size / 2.0, -lid_size, lid_size, lid_size)
            .with_image(images_dir.join(LID_IMAGE));

        Self {
            base: ComponentBase::new(Placement::ORIGIN),
            box_size,
            open: false,
            opening_time: 0.0,
            fully_open: false,
            back,
            face,
            lid,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.base.set_placement(placement);
        self
    }

    /// Whether a key drop has been received since the last reset.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_fully_open(&self) -> bool {
        self.fully_open
    }

    /// Opening progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        (self.opening_time / LID_OPENING_TIME).clamp(0.0, 1.0)
    }

    /// Lid angle in radians, from closed (0) to upright (pi / 2).
    pub fn lid_angle(&self) -> f64 {
        FRAC_PI_2 * self.progress()
    }

    /// Vertical scale the lid is drawn with; eases in with the sine of the
    /// lid angle.
    pub fn lid_scale(&self) -> f64 {
        LID_CLOSED_SCALE + (1.0 - LID_CLOSED_SCALE) * self.lid_angle().sin()
    }
}

impl KeyResponder for ToyBox {
    fn on_key_drop(&mut self) {
        self.open = true;
    }
}

impl Part for ToyBox {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn advance(&mut self, delta: f64) -> Option<f64> {
        self.base.advance(delta);
        if self.open && !self.fully_open {
            self.opening_time = (self.opening_time + delta).clamp(0.0, LID_OPENING_TIME);
            self.fully_open = self.opening_time >= LID_OPENING_TIME;
        }
        None
    }

    fn reset(&mut self) {
        self.base.reset();
        self.open = false;
        self.opening_time = 0.0;
        self.fully_open = false;
    }

    fn draw_background(&self, canvas: &mut dyn Canvas) {
        let (x, y) = (self.base.x(), self.base.y());
        canvas.draw(DrawCommand::Rect {
            rect: self.back.clone(),
            x,
            y,
        });

        canvas.draw(DrawCommand::PushTranslate {
            x,
            y: y - self.box_size,
        });
        canvas.draw(DrawCommand::PushScale {
            x: 1.0,
            y: self.lid_scale(),
        });
        canvas.draw(DrawCommand::Rect {
            rect: self.lid.clone(),
            x: 0.0,
            y: 0.0,
        });
        canvas.draw(DrawCommand::Pop);
        canvas.draw(DrawCommand::Pop);
    }

    fn draw_foreground(&self, canvas: &mut dyn Canvas) {
        canvas.draw(DrawCommand::Rect {
            rect: self.face.clone(),
            x: self.base.x(),
            y: self.base.y(),
        });
    }
}
