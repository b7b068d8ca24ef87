//! Draw primitives handed to the host each frame.
//!
//! Games never touch a canvas. [`Game::render`](crate::session::Game::render)
//! takes the game by shared reference and appends [`Draw`] commands to a
//! [`DrawList`]; the host walks the list in order and paints it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Body, Shape};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Arcade green
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Warning red
    pub const RED: Self = Self::rgb(255, 64, 64);
    /// Coin gold
    pub const GOLD: Self = Self::rgb(255, 215, 0);
    /// Placeholder magenta for missing assets
    pub const MISSING: Self = Self::rgb(255, 0, 255);

    /// Opaque color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a new alpha, `alpha` clamped to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Normalized `[r, g, b, a]` for GPU-style hosts.
    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// One draw primitive. Positions are playfield coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Draw {
    /// Filled rectangle centered on `center`, rotated by `rotation` radians
    Rect {
        center: Vec2,
        size: Vec2,
        rotation: f32,
        color: Rgba,
    },
    /// Filled circle
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    /// Filled ellipse; a flipping coin is an ellipse with a shrinking `radii.y`
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        color: Rgba,
    },
    /// Straight stroke
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba,
    },
    /// Host-loaded image identified by `handle`, scaled into `size`
    Sprite {
        handle: u32,
        center: Vec2,
        size: Vec2,
        rotation: f32,
    },
    /// Text anchored at its top-left corner
    Text {
        position: Vec2,
        text: String,
        size: f32,
        color: Rgba,
    },
}

/// Ordered draw commands for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    /// Surface width
    pub width: f32,
    /// Surface height
    pub height: f32,
    /// Clear color
    pub background: Rgba,
    commands: Vec<Draw>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl DrawList {
    /// Empty list for a `width` x `height` surface cleared to black.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: Rgba::BLACK,
            commands: Vec::new(),
        }
    }

    /// Sets the clear color.
    #[must_use]
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Appends a command.
    pub fn push(&mut self, draw: Draw) {
        self.commands.push(draw);
    }

    /// Appends a text readout.
    pub fn text(&mut self, position: Vec2, text: impl Into<String>, size: f32, color: Rgba) {
        self.push(Draw::Text {
            position,
            text: text.into(),
            size,
            color,
        });
    }

    /// Appends an axis-aligned rectangle.
    pub fn rect(&mut self, center: Vec2, size: Vec2, color: Rgba) {
        self.push(Draw::Rect {
            center,
            size,
            rotation: 0.0,
            color,
        });
    }

    /// Commands in paint order.
    #[must_use]
    pub fn commands(&self) -> &[Draw] {
        &self.commands
    }

    /// Iterates over commands in paint order.
    pub fn iter(&self) -> std::slice::Iter<'_, Draw> {
        self.commands.iter()
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing will be drawn besides the background.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops every command, keeping size and background.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns `true` if any text command contains `needle`.
    #[must_use]
    pub fn has_text(&self, needle: &str) -> bool {
        self.commands
            .iter()
            .any(|draw| matches!(draw, Draw::Text { text, .. } if text.contains(needle)))
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a Draw;
    type IntoIter = std::slice::Iter<'a, Draw>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Primitive for a body's collision shape, including scale and rotation.
#[must_use]
pub fn draw_body(body: &Body, color: Rgba) -> Draw {
    match body.shape {
        Shape::Circle { .. } => Draw::Circle {
            center: body.position,
            radius: body.radius(),
            color,
        },
        Shape::Rect { .. } => Draw::Rect {
            center: body.position,
            size: body.half_extents() * 2.0,
            rotation: body.rotation,
            color,
        },
    }
}
