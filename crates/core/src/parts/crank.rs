use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::RotationSource;
use crate::render::{Canvas, Color, Cylinder, DrawCommand, Rect};

use super::radians;

/// Crank speed in turns per second.
pub const CRANK_SPEED: f64 = 5.0;

/// Reduction between the crank handle and the first shaft it drives.
pub const CRANK_GEARING: f64 = 0.2;

const CRANK_WIDTH: f64 = 10.0;
const CRANK_LENGTH: f64 = 50.0;
const HANDLE_DIAMETER: f64 = 7.0;
const HANDLE_LENGTH: f64 = 40.0;
const HANDLE_X_OFFSET: f64 = 150.0;
const HANDLE_Y_OFFSET: f64 = -190.0;
const CRANK_X_OFFSET: f64 = 5.0;
const CRANK_Y_OFFSET: f64 = -170.0;
const HANDLE_LINES: u32 = 4;

const CRANK_COLOR: Color = Color::rgb(220, 220, 220);
const HANDLE_LINE_COLOR: Color = Color::rgb(100, 100, 100);

/// The hand crank that drives the whole machine.
#[derive(Debug, Clone)]
pub struct Crank {
    base: ComponentBase,
    source: RotationSource,
    rotation: f64,
    speed: f64,
    handle: Cylinder,
    arm: Rect,
}

impl Crank {
    pub fn new(placement: Placement) -> Self {
        let handle = Cylinder::new(HANDLE_DIAMETER, HANDLE_LENGTH)
            .with_color(CRANK_COLOR)
            .with_lines(HANDLE_LINE_COLOR, 1.0, HANDLE_LINES);
        let arm = Rect::new(
            placement.x + HANDLE_X_OFFSET,
            0.0,
            CRANK_WIDTH,
            CRANK_LENGTH / 2.0,
        )
        .with_color(CRANK_COLOR);

        Self {
            base: ComponentBase::new(placement),
            source: RotationSource::new(),
            rotation: 0.0,
            speed: CRANK_SPEED,
            handle,
            arm,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Handle rotation in turns.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rotation handed to the first shaft, after gearing.
    pub fn output(&self) -> f64 {
        self.rotation * CRANK_GEARING
    }

    pub fn source(&self) -> &RotationSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut RotationSource {
        &mut self.source
    }
}

impl Part for Crank {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn advance(&mut self, delta: f64) -> Option<f64> {
        self.base.advance(delta);
        self.rotation += delta * self.speed;
        Some(self.output())
    }

    fn reset(&mut self) {
        self.base.reset();
        self.source.reset();
        self.rotation = 0.0;
    }

    fn draw_foreground(&self, canvas: &mut dyn Canvas) {
        let handle_y = self.base.y() + radians(self.rotation).cos() * CRANK_LENGTH;
        canvas.draw(DrawCommand::Cylinder {
            cylinder: self.handle.clone(),
            x: HANDLE_X_OFFSET,
            y: HANDLE_Y_OFFSET + handle_y,
            rotation: self.rotation,
        });

        canvas.draw(DrawCommand::Rect {
            rect: self.arm.clone(),
            x: CRANK_X_OFFSET,
            y: CRANK_Y_OFFSET,
        });

        // The connecting arm stretches to follow the handle.
        let scaler = 1.0 - handle_y / (CRANK_LENGTH / 2.0);
        let overlap = if scaler < 0.0 { -0.6 } else { 0.3 };
        canvas.draw(DrawCommand::PushTranslate {
            x: 0.0,
            y: CRANK_Y_OFFSET,
        });
        canvas.draw(DrawCommand::PushScale {
            x: 1.0,
            y: scaler + overlap,
        });
        canvas.draw(DrawCommand::Rect {
            rect: self.arm.clone(),
            x: CRANK_X_OFFSET,
            y: 0.0,
        });
        canvas.draw(DrawCommand::Pop);
        canvas.draw(DrawCommand::Pop);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn advance_accumulates_rotation_and_publishes_geared_output() {
        let mut crank = Crank::new(Placement::ORIGIN);

        let published = crank.advance(0.5);

        assert_relative_eq!(crank.rotation(), 2.5);
        assert_relative_eq!(published.unwrap(), 0.5);
        assert_relative_eq!(crank.base().time(), 0.5);
    }

    #[test]
    fn negative_steps_run_the_crank_backwards() {
        let mut crank = Crank::new(Placement::ORIGIN);
        crank.advance(1.0);
        crank.advance(-0.25);

        assert_relative_eq!(crank.output(), 0.75);
    }

    #[test]
    fn reset_returns_to_rest() {
        let mut crank = Crank::new(Placement::ORIGIN).with_speed(2.0);
        crank.advance(3.0);
        crank.reset();

        assert_eq!(crank.rotation(), 0.0);
        assert_eq!(crank.base().time(), 0.0);
        assert_eq!(crank.speed(), 2.0);
    }
}
