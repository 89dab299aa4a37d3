use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// RGB colour handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Decorative lines drawn along a cylinder so its rotation is visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderLines {
    pub color: Color,
    pub width: f64,
    pub count: u32,
}

/// A cylinder seen from the side, used for shafts, pulley hubs and drums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub diameter: f64,
    pub length: f64,
    pub color: Color,
    pub lines: Option<CylinderLines>,
}

impl Cylinder {
    pub fn new(diameter: f64, length: f64) -> Self {
        Self {
            diameter,
            length,
            color: Color::WHITE,
            lines: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_lines(mut self, color: Color, width: f64, count: u32) -> Self {
        self.lines = Some(CylinderLines {
            color,
            width,
            count,
        });
        self
    }
}

/// Axis aligned rectangle, optionally textured with an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Option<Color>,
    pub image: Option<PathBuf>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: None,
            image: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One instruction for the rendering collaborator. Rotations are in turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Saves the transform state and translates.
    PushTranslate { x: f64, y: f64 },
    /// Saves the transform state and scales.
    PushScale { x: f64, y: f64 },
    /// Restores the most recently saved transform state.
    Pop,
    Cylinder {
        cylinder: Cylinder,
        x: f64,
        y: f64,
        rotation: f64,
    },
    Rect { rect: Rect, x: f64, y: f64 },
    Ellipse {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// A coil spring with its bottom centre at (x, y), extending upward.
    Spring {
        x: f64,
        y: f64,
        length: f64,
        width: f64,
        links: u32,
    },
}

/// Rendering boundary. Components describe what to draw; implementors decide
/// how to rasterise it.
pub trait Canvas {
    fn draw(&mut self, command: DrawCommand);
}

/// Canvas that simply keeps every command it receives, in order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Canvas for DrawList {
    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_keeps_command_order() {
        let mut list = DrawList::new();
        list.draw(DrawCommand::PushTranslate { x: 1.0, y: 2.0 });
        list.draw(DrawCommand::Pop);

        assert_eq!(list.len(), 2);
        assert_eq!(list.commands()[1], DrawCommand::Pop);
    }

    #[test]
    fn commands_serialise_with_op_tag() {
        let json = serde_json::to_value(DrawCommand::Pop).unwrap();
        assert_eq!(json["op"], "pop");
    }
}
