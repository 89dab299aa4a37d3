use std::f64::consts::PI;
use std::path::PathBuf;

use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::{KeyDropNotifier, RotationSink, SinkOutcome};
use crate::render::{Canvas, Color, Cylinder, DrawCommand, Rect};

/// Turns the cam needs for the hole to travel once to the key.
pub const CAM_CYCLE_TURNS: f64 = 3.0;

const CAM_WIDTH: f64 = 17.0;
const CAM_DIAMETER: f64 = 55.0;
const HOLE_SIZE: f64 = 8.0;
const HOLE_X_DIVISOR: f64 = 4.0;
const HOLE_Y_OFFSET: f64 = 5.0;
const HOLE_SCALE: f64 = 4.5;
/// Distance the hole travels from its start to the key, in pixels.
const HOLE_TRAVEL: f64 = CAM_DIAMETER - HOLE_Y_OFFSET + 2.0;

/// Fraction of a cycle during which the hole sits under the key.
pub const HOLE_WINDOW: f64 = HOLE_SIZE / HOLE_TRAVEL;

const KEY_SIZE: f64 = 20.0;
const KEY_X_OFFSET: f64 = 8.0;

/// Where the cam follower is relative to the hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CamState {
    /// The hole is still on its way to the key.
    #[default]
    Approaching,
    /// The key rests in the hole.
    Firing,
}

/// Terminal rotation sink that drops a key every time its hole passes under
/// the key, waking every registered responder.
#[derive(Debug, Clone)]
pub struct Cam {
    base: ComponentBase,
    rotation: f64,
    state: CamState,
    notifier: KeyDropNotifier,
    body: Cylinder,
    key: Rect,
}

impl Cam {
    pub fn new(key_image: impl Into<PathBuf>, placement: Placement) -> Self {
        Self {
            base: ComponentBase::new(placement),
            rotation: 0.0,
            state: CamState::Approaching,
            notifier: KeyDropNotifier::new(),
            body: Cylinder::new(CAM_DIAMETER, CAM_WIDTH).with_color(Color::WHITE),
            key: Rect::new(-KEY_SIZE / 2.0, 0.0, KEY_SIZE, KEY_SIZE).with_image(key_image),
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn state(&self) -> CamState {
        self.state
    }

    pub fn notifier(&self) -> &KeyDropNotifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut KeyDropNotifier {
        &mut self.notifier
    }

    /// Hole passes completed so far, as a fraction.
    pub fn cycle(&self) -> f64 {
        cycle_of(self.rotation)
    }

    /// Position of the hole along its path, 0 at the start and approaching
    /// 1 just before it reaches the key.
    pub fn follower_travel(&self) -> f64 {
        self.cycle().rem_euclid(1.0)
    }

    pub fn key_dropped(&self) -> bool {
        self.state == CamState::Firing
    }
}

fn cycle_of(rotation: f64) -> f64 {
    rotation / CAM_CYCLE_TURNS
}

fn state_at(cycle: f64) -> CamState {
    if cycle >= 1.0 && cycle.rem_euclid(1.0) < HOLE_WINDOW {
        CamState::Firing
    } else {
        CamState::Approaching
    }
}

impl RotationSink for Cam {
    fn receive(&mut self, rotation: f64) -> SinkOutcome {
        let previous = self.cycle();
        self.rotation = rotation;
        let current = self.cycle();
        self.state = state_at(current);

        // Fires once per forward pass of the hole, even when one step skips
        // the whole window.
        let fired = current >= 1.0 && current.floor() > previous.floor();
        if fired {
            self.notifier.record_fire();
        }
        SinkOutcome::key_drop(fired)
    }
}

impl Part for Cam {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn reset(&mut self) {
        self.base.reset();
        self.notifier.reset();
        self.rotation = 0.0;
        self.state = CamState::Approaching;
    }

    fn draw_foreground(&self, canvas: &mut dyn Canvas) {
        let (x, y) = (self.base.x(), self.base.y());
        canvas.draw(DrawCommand::Cylinder {
            cylinder: self.body.clone(),
            x,
            y,
            rotation: 0.0,
        });

        if self.key_dropped() {
            canvas.draw(DrawCommand::Rect {
                rect: self.key.clone(),
                x: x + KEY_X_OFFSET,
                y: y - KEY_SIZE,
            });
            return;
        }

        let travel = self.follower_travel();
        let start_y = y + CAM_DIAMETER / 2.0 - HOLE_Y_OFFSET;
        let end_y = y - CAM_DIAMETER / 2.0 - 2.0;
        let hole_y = start_y + (end_y - start_y) * travel;
        // The hole looks taller while it faces the viewer.
        let stretch = 1.0 + (travel * PI).sin();
        let height = HOLE_SCALE * stretch;
        let lift = HOLE_SCALE * (stretch - 1.0) / 2.0;

        canvas.draw(DrawCommand::Ellipse {
            x: x + CAM_WIDTH / HOLE_X_DIVISOR,
            y: hole_y - lift,
            width: HOLE_SIZE,
            height,
            color: Color::BLACK,
        });
        canvas.draw(DrawCommand::Rect {
            rect: self.key.clone(),
            x: x + KEY_X_OFFSET,
            y: y - CAM_DIAMETER / 2.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam() -> Cam {
        Cam::new("key.png", Placement::ORIGIN)
    }

    #[test]
    fn stays_quiet_until_the_hole_reaches_the_key() {
        let mut cam = cam();
        for step in 0..30 {
            let outcome = cam.receive(step as f64 * 0.1);
            assert!(!outcome.key_drop, "fired early at step {step}");
        }
        assert_eq!(cam.state(), CamState::Approaching);
    }

    #[test]
    fn fires_once_when_crossing_and_again_next_cycle() {
        let mut cam = cam();
        cam.receive(2.95);
        assert!(cam.receive(3.05).key_drop);
        assert_eq!(cam.state(), CamState::Firing);
        assert!(!cam.receive(3.1).key_drop);
        assert!(!cam.receive(5.9).key_drop);
        assert!(cam.receive(6.01).key_drop);
        assert_eq!(cam.notifier().fired(), 2);
    }

    #[test]
    fn repeated_value_does_not_refire() {
        let mut cam = cam();
        assert!(cam.receive(3.0).key_drop);
        assert!(!cam.receive(3.0).key_drop);
    }

    #[test]
    fn large_step_over_the_window_still_fires_once() {
        let mut cam = cam();
        let outcome = cam.receive(3.0 * 1.5);
        assert!(outcome.key_drop);
        assert_eq!(cam.state(), CamState::Approaching);
    }

    #[test]
    fn backward_motion_never_fires() {
        let mut cam = cam();
        cam.receive(3.3);
        assert!(!cam.receive(3.1).key_drop);
        assert!(!cam.receive(2.0).key_drop);
    }

    #[test]
    fn reset_returns_to_approaching() {
        let mut cam = cam();
        cam.receive(3.0);
        cam.reset();

        assert_eq!(cam.state(), CamState::Approaching);
        assert_eq!(cam.rotation(), 0.0);
        assert_eq!(cam.notifier().fired(), 0);
    }
}
