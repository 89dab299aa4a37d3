use std::path::PathBuf;

use crate::component::{ComponentBase, Part, Placement};
use crate::propagation::KeyResponder;
use crate::render::{Canvas, DrawCommand, Rect};

const POPUP_TIME: f64 = 0.25;
/// Pixels the spring extends per `POPUP_TIME` seconds.
const SPRING_SPEED: f64 = 140.0;
/// Fully extended spring length as a multiple of its compressed length.
const MAX_EXTENSION_FACTOR: f64 = 3.5;
/// The spring starts compressed to this fraction of its nominal length.
const SPRING_COMPRESSION: f64 = 4.0;
/// Extension, in pixels, that costs the spring one visible link.
const LINK_SEPARATION: f64 = 800.0;

const BOUNCE_HEIGHT: f64 = 8.0;
const BOUNCE_WIDTH: f64 = 3.0;
const BOUNCE_SPEED: f64 = 3.0;
const TOY_BOTTOM_Y: f64 = -90.0;

/// Construction parameters for a spring-loaded figure.
#[derive(Debug, Clone, PartialEq)]
pub struct SpartyOptions {
    pub image: PathBuf,
    /// Width and height of the figure in pixels.
    pub size: f64,
    /// Nominal spring length in pixels.
    pub spring_length: f64,
    pub spring_width: f64,
    pub links: u32,
    /// Bouncy toys wobble on their spring once sprung.
    pub bouncy: bool,
    /// Horizontal offset of the spring inside the box.
    pub spring_x: f64,
}

/// A figure on a spring that pops out of the box after a key drop.
#[derive(Debug, Clone)]
pub struct Sparty {
    base: ComponentBase,
    options: SpartyOptions,
    start_length: f64,
    sprung: bool,
    extension: f64,
    fully_extended: bool,
    bounce_time: f64,
    figure: Rect,
}

impl Sparty {
    pub fn new(options: SpartyOptions) -> Self {
        let figure = Rect::new(
            -options.size / 2.0,
            TOY_BOTTOM_Y,
            options.size,
            options.size,
        )
        .with_image(options.image.clone());

        Self {
            base: ComponentBase::new(Placement::ORIGIN),
            start_length: options.spring_length / SPRING_COMPRESSION,
            options,
            sprung: false,
            extension: 0.0,
            fully_extended: false,
            bounce_time: 0.0,
            figure,
        }
    }

    pub fn is_sprung(&self) -> bool {
        self.sprung
    }

    /// Extension beyond the compressed length, in pixels.
    pub fn extension(&self) -> f64 {
        self.extension
    }

    pub fn max_extension(&self) -> f64 {
        self.start_length * MAX_EXTENSION_FACTOR
    }

    pub fn spring_length(&self) -> f64 {
        self.start_length + self.extension
    }

    /// Offset of a bouncy figure from its resting spot on top of the spring.
    pub fn bounce_offset(&self) -> (f64, f64) {
        if !(self.sprung && self.options.bouncy) {
            return (0.0, 0.0);
        }
        let phase = self.bounce_time * BOUNCE_SPEED;
        (BOUNCE_WIDTH * (phase / 2.0).sin(), BOUNCE_HEIGHT * phase.sin())
    }

    fn visible_links(&self) -> u32 {
        let links = f64::from(self.options.links) - self.extension / LINK_SEPARATION;
        links.max(1.0) as u32
    }
}

impl KeyResponder for Sparty {
    fn on_key_drop(&mut self) {
        self.sprung = true;
    }
}

impl Part for Sparty {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn advance(&mut self, delta: f64) -> Option<f64> {
        self.base.advance(delta);
        if !self.sprung {
            return None;
        }

        self.bounce_time += delta;
        if !self.fully_extended {
            self.extension = (self.extension + SPRING_SPEED * delta / POPUP_TIME)
                .clamp(0.0, self.max_extension());
            self.fully_extended = self.extension >= self.max_extension();
        }
        None
    }

    fn reset(&mut self) {
        self.base.reset();
        self.sprung = false;
        self.extension = 0.0;
        self.fully_extended = false;
        self.bounce_time = 0.0;
    }

    fn draw_background(&self, canvas: &mut dyn Canvas) {
        let spring_x = self.options.spring_x;
        canvas.draw(DrawCommand::Spring {
            x: spring_x,
            y: 0.0,
            length: self.spring_length(),
            width: self.options.spring_width,
            links: self.visible_links(),
        });

        let (dx, dy) = self.bounce_offset();
        canvas.draw(DrawCommand::PushTranslate {
            x: spring_x + dx,
            y: self.start_length - self.extension + dy,
        });
        canvas.draw(DrawCommand::Rect {
            rect: self.figure.clone(),
            x: 0.0,
            y: 0.0,
        });
        canvas.draw(DrawCommand::Pop);
    }
}
