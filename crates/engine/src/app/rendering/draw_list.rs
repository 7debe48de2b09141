use crate::app::Vec2;

/// Straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// White at the given opacity in `0.0..=1.0`.
    pub fn white(alpha: f32) -> Self {
        Self::new(255, 255, 255, alpha_to_u8(alpha))
    }

    pub fn black(alpha: f32) -> Self {
        Self::new(0, 0, 0, alpha_to_u8(alpha))
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

fn alpha_to_u8(alpha: f32) -> u8 {
    if !alpha.is_finite() {
        return 0;
    }
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One drawing instruction in logical view units (y-down).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        line_width: f32,
        color: Rgba,
    },
    /// `x`/`y` is the top-left corner of the first glyph.
    Text {
        x: f32,
        y: f32,
        text: String,
        color: Rgba,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
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

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }
}
