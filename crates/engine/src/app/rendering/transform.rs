use crate::app::Vec2;

/// Logical size of the drawing surface. Each side is at least one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl ViewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_side(width),
            height: sanitize_side(height),
        }
    }

    /// Logical view for a physical surface, or `None` when the surface has no
    /// area (minimized window, zero-sized container).
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Some(Self::new(
            (width as f64 / scale) as f32,
            (height as f64 / scale) as f32,
        ))
    }
}

fn sanitize_side(value: f32) -> f32 {
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

/// World-space extent covered by `view` at `zoom`.
pub fn visible_world_size(view: ViewSize, zoom: f32) -> Vec2 {
    Vec2 {
        x: view.width / zoom,
        y: view.height / zoom,
    }
}

/// Maps a world point to view units for a camera whose top-left corner sits at
/// `camera_top_left`. Both spaces are y-down.
pub fn world_to_view(world: Vec2, camera_top_left: Vec2, zoom: f32) -> Vec2 {
    Vec2 {
        x: (world.x - camera_top_left.x) * zoom,
        y: (world.y - camera_top_left.y) * zoom,
    }
}
