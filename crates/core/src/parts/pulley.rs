use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::{RotationSink, RotationSource, SinkOutcome};
use crate::render::{Canvas, Color, Cylinder, DrawCommand, Rect};
use crate::ComponentId;

const HUB_WIDTH: f64 = 3.0;
const HUB_DISTANCE: f64 = 12.0;
const HUB_LINE_WIDTH: f64 = 4.0;
/// One hub line is drawn for every this many pixels of diameter.
const HUB_LINE_SPACING: f64 = 6.0;
const BELT_WIDTH: f64 = 10.0;
const BELT_X_DIVISOR: f64 = 4.0;

const PULLEY_COLOR: Color = Color::rgb(205, 250, 5);
const HUB_LINE_COLOR: Color = Color::rgb(139, 168, 7);

/// Geometry of the belt a pulley drives.
#[derive(Debug, Clone, PartialEq)]
pub struct Belt {
    pub driven: ComponentId,
    pub ratio: f64,
    driven_y: f64,
    driven_diameter: f64,
    shape: Rect,
}

/// A grooved wheel mounted on a shaft, optionally driving a second pulley
/// through a belt.
#[derive(Debug, Clone)]
pub struct Pulley {
    base: ComponentBase,
    source: RotationSource,
    rotation: f64,
    diameter: f64,
    hub: Cylinder,
    belt: Option<Belt>,
}

impl Pulley {
    pub fn new(diameter: f64, placement: Placement) -> Self {
        let lines = (diameter / HUB_LINE_SPACING).max(0.0) as u32;
        let hub = Cylinder::new(diameter, HUB_WIDTH)
            .with_color(PULLEY_COLOR)
            .with_lines(HUB_LINE_COLOR, HUB_LINE_WIDTH, lines);

        Self {
            base: ComponentBase::new(placement),
            source: RotationSource::new(),
            rotation: 0.0,
            diameter,
            hub,
            belt: None,
        }
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn belt(&self) -> Option<&Belt> {
        self.belt.as_ref()
    }

    pub fn source(&self) -> &RotationSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut RotationSource {
        &mut self.source
    }

    /// Records the belt towards `driven` and returns the speed ratio it
    /// imposes. Diameters are validated by the machine builder.
    pub(crate) fn attach_belt(&mut self, driven: ComponentId, driven_pulley: &Pulley) -> f64 {
        let ratio = self.diameter / driven_pulley.diameter;
        let height = (self.base.y() - driven_pulley.base.y()).abs()
            + self.diameter / 2.0
            + driven_pulley.diameter / 2.0
            - 1.0;

        self.belt = Some(Belt {
            driven,
            ratio,
            driven_y: driven_pulley.base.y(),
            driven_diameter: driven_pulley.diameter,
            shape: Rect::new(0.0, 0.0, BELT_WIDTH, height).with_color(Color::BLACK),
        });
        ratio
    }
}

impl RotationSink for Pulley {
    fn receive(&mut self, rotation: f64) -> SinkOutcome {
        self.rotation = rotation;
        SinkOutcome::republish(rotation)
    }
}

impl Part for Pulley {
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

    fn draw_foreground(&self, canvas: &mut dyn Canvas) {
        let (x, y) = (self.base.x(), self.base.y());
        for hub_x in [x, x + HUB_DISTANCE] {
            canvas.draw(DrawCommand::Cylinder {
                cylinder: self.hub.clone(),
                x: hub_x,
                y,
                rotation: self.rotation,
            });
        }

        if let Some(belt) = &self.belt {
            // The belt hangs from whichever pulley sits higher on screen.
            let belt_y = if y > belt.driven_y {
                y + self.diameter / 2.0
            } else {
                belt.driven_y + belt.driven_diameter / 2.0
            };
            canvas.draw(DrawCommand::Rect {
                rect: belt.shape.clone(),
                x: x + HUB_DISTANCE / BELT_X_DIVISOR,
                y: belt_y,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    #[test]
    fn republishes_received_rotation() {
        let mut pulley = Pulley::new(40.0, Placement::ORIGIN);
        assert_eq!(pulley.receive(-0.5), SinkOutcome::republish(-0.5));
        assert_eq!(pulley.rotation(), -0.5);
    }

    #[test]
    fn belt_ratio_is_driver_over_driven_diameter() {
        let mut driver = Pulley::new(20.0, Placement::new(0.0, -65.0));
        let driven = Pulley::new(80.0, Placement::new(0.0, -185.0));

        let ratio = driver.attach_belt(ComponentId::new(1), &driven);

        assert_eq!(ratio, 0.25);
        assert_eq!(driver.belt().map(|belt| belt.driven), Some(ComponentId::new(1)));
    }

    #[test]
    fn belted_pulley_draws_hubs_and_belt() {
        let mut driver = Pulley::new(20.0, Placement::new(0.0, -65.0));
        let driven = Pulley::new(80.0, Placement::new(0.0, -185.0));
        driver.attach_belt(ComponentId::new(1), &driven);

        let mut list = DrawList::new();
        driver.draw_foreground(&mut list);

        assert_eq!(list.len(), 3);
        assert!(matches!(
            list.commands()[2],
            DrawCommand::Rect { y, .. } if y == -55.0
        ));
    }
}
