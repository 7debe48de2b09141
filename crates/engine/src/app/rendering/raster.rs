use super::draw_list::{DrawCommand, DrawList, Rgba};
use super::font::{glyph_rows, GLYPH_ADVANCE_CELLS, GLYPH_WIDTH};
use crate::app::Vec2;

/// Logical size of one font cell before the surface scale factor is applied.
const TEXT_CELL_UNITS: f32 = 2.0;
/// Pixel coordinates are clamped to `±COORD_LIMIT` so edge arithmetic stays
/// far from `i32` overflow. Much larger than any surface.
const COORD_LIMIT: i32 = 1 << 16;

/// Software rasterizer over an RGBA8 frame. Every write is clipped.
pub(crate) struct Rasterizer<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl<'a> Rasterizer<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            frame,
            width,
            height,
            scale,
        }
    }

    pub(crate) fn draw_list(&mut self, list: &DrawList) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        for command in list.iter() {
            self.draw(command);
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear { color } => self.clear(*color),
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let rect = self.logical_rect(*x, *y, *width, *height);
                self.fill_pixel_rect(rect, *color);
            }
            DrawCommand::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            } => {
                let rect = self.logical_rect(*x, *y, *width, *height);
                let thickness = self.thickness_px(*line_width);
                self.stroke_pixel_rect(rect, thickness, *color);
            }
            DrawCommand::Line {
                from,
                to,
                line_width,
                color,
            } => {
                let thickness = self.thickness_px(*line_width);
                self.line(*from, *to, thickness, *color);
            }
            DrawCommand::Text { x, y, text, color } => self.text(*x, *y, text, *color),
        }
    }

    fn clear(&mut self, color: Rgba) {
        let [r, g, b, _] = color.0;
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[r, g, b, 255]);
        }
    }

    fn to_px(&self, value: f32) -> i32 {
        let scaled = (value * self.scale).round();
        if scaled.is_finite() {
            scaled.clamp(-COORD_LIMIT as f32, COORD_LIMIT as f32) as i32
        } else {
            0
        }
    }

    fn thickness_px(&self, line_width: f32) -> i32 {
        self.to_px(line_width).max(1)
    }

    fn logical_rect(&self, x: f32, y: f32, width: f32, height: f32) -> PixelRect {
        let (x0, x1) = (self.to_px(x), self.to_px(x + width));
        let (y0, y1) = (self.to_px(y), self.to_px(y + height));
        PixelRect {
            left: x0.min(x1),
            top: y0.min(y1),
            right: x0.max(x1),
            bottom: y0.max(y1),
        }
    }

    fn fill_pixel_rect(&mut self, rect: PixelRect, color: Rgba) {
        if color.alpha() == 0 {
            return;
        }
        let left = rect.left.max(0);
        let top = rect.top.max(0);
        let right = rect.right.min(self.width as i32);
        let bottom = rect.bottom.min(self.height as i32);
        if right <= left || bottom <= top {
            return;
        }
        for y in top..bottom {
            for x in left..right {
                blend_pixel(self.frame, self.width as usize, x, y, color);
            }
        }
    }

    fn stroke_pixel_rect(&mut self, rect: PixelRect, thickness: i32, color: Rgba) {
        let width = rect.right - rect.left;
        let height = rect.bottom - rect.top;
        if width <= 0 || height <= 0 {
            return;
        }
        let t = thickness.min(width).min(height);
        let edges = [
            PixelRect {
                bottom: rect.top + t,
                ..rect
            },
            PixelRect {
                top: rect.bottom - t,
                ..rect
            },
            PixelRect {
                top: rect.top + t,
                bottom: rect.bottom - t,
                right: rect.left + t,
                ..rect
            },
            PixelRect {
                top: rect.top + t,
                bottom: rect.bottom - t,
                left: rect.right - t,
                ..rect
            },
        ];
        for edge in edges {
            self.fill_pixel_rect(edge, color);
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: i32, color: Rgba) {
        let (x0, y0) = (self.to_px(from.x), self.to_px(from.y));
        let (x1, y1) = (self.to_px(to.x), self.to_px(to.y));
        let half = thickness / 2;

        // Axis-aligned lines are filled once so translucent colours blend evenly.
        if x0 == x1 || y0 == y1 {
            let rect = PixelRect {
                left: x0.min(x1) - half,
                top: y0.min(y1) - half,
                right: x0.max(x1) - half + thickness,
                bottom: y0.max(y1) - half + thickness,
            };
            self.fill_pixel_rect(rect, color);
            return;
        }

        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let steps = dx.abs().max(dy.abs()) as i32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let cx = x0 + (dx * t).round() as i32;
            let cy = y0 + (dy * t).round() as i32;
            self.fill_pixel_rect(
                PixelRect {
                    left: cx - half,
                    top: cy - half,
                    right: cx - half + thickness,
                    bottom: cy - half + thickness,
                },
                color,
            );
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        let cell = self.to_px(TEXT_CELL_UNITS).max(1);
        let mut origin_x = self.to_px(x);
        let origin_y = self.to_px(y);
        for ch in text.chars() {
            let rows = glyph_rows(ch);
            for (row_index, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let left = origin_x + col * cell;
                    let top = origin_y + row_index as i32 * cell;
                    self.fill_pixel_rect(
                        PixelRect {
                            left,
                            top,
                            right: left + cell,
                            bottom: top + cell,
                        },
                        color,
                    );
                }
            }
            origin_x = origin_x.saturating_add(GLYPH_ADVANCE_CELLS * cell);
            if origin_x >= self.width as i32 {
                break;
            }
        }
    }
}

fn blend_pixel(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(dst) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };

    let alpha = u32::from(color.alpha());
    if alpha == 255 {
        dst.copy_from_slice(&color.0);
        return;
    }
    for channel in 0..3 {
        let src = u32::from(color.0[channel]);
        let old = u32::from(dst[channel]);
        dst[channel] = ((src * alpha + old * (255 - alpha) + 127) / 255) as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame(width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn single(command: DrawCommand) -> DrawList {
        let mut list = DrawList::new();
        list.push(command);
        list
    }

    #[test]
    fn zero_sized_frame_is_a_no_op() {
        let mut frame = Vec::new();
        let list = single(DrawCommand::Clear {
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 0, 0, 1.0).draw_list(&list);
        assert!(frame.is_empty());
    }

    #[test]
    fn clear_writes_opaque_color_everywhere() {
        let mut frame = blank_frame(4, 3);
        let list = single(DrawCommand::Clear {
            color: Rgba::new(10, 20, 30, 0),
        });
        Rasterizer::new(&mut frame, 4, 3, 1.0).draw_list(&list);
        assert!(frame.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut frame = blank_frame(2, 2);
        let list = single(DrawCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: 2.0,
            height: 2.0,
            color: Rgba::new(200, 100, 0, 128),
        });
        Rasterizer::new(&mut frame, 2, 2, 1.0).draw_list(&list);
        assert_eq!(pixel(&frame, 2, 1, 1), [100, 50, 0, 255]);
    }

    #[test]
    fn fill_clips_negative_and_oversized_rects() {
        let mut frame = blank_frame(4, 4);
        let list = single(DrawCommand::FillRect {
            x: -10.0,
            y: 2.0,
            width: 100.0,
            height: 100.0,
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 4, 4, 1.0).draw_list(&list);
        assert_eq!(pixel(&frame, 4, 0, 1), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 0, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 4, 3, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut frame = blank_frame(6, 6);
        let list = single(DrawCommand::StrokeRect {
            x: 0.0,
            y: 0.0,
            width: 6.0,
            height: 6.0,
            line_width: 1.0,
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 6, 6, 1.0).draw_list(&list);
        assert_eq!(pixel(&frame, 6, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 6, 5, 3), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 6, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn scale_factor_multiplies_logical_units() {
        let mut frame = blank_frame(4, 4);
        let list = single(DrawCommand::FillRect {
            x: 1.0,
            y: 1.0,
            width: 1.0,
            height: 1.0,
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 4, 4, 2.0).draw_list(&list);
        assert_eq!(pixel(&frame, 4, 1, 1), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 2, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 4, 3, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn horizontal_line_covers_its_span_once() {
        let mut frame = blank_frame(8, 3);
        let list = single(DrawCommand::Line {
            from: Vec2::new(0.0, 1.0),
            to: Vec2::new(8.0, 1.0),
            line_width: 1.0,
            color: Rgba::new(255, 255, 255, 128),
        });
        Rasterizer::new(&mut frame, 8, 3, 1.0).draw_list(&list);
        assert!((0..8).all(|x| pixel(&frame, 8, x, 1) == [128, 128, 128, 255]));
        assert_eq!(pixel(&frame, 8, 3, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn diagonal_line_stays_in_bounds() {
        let mut frame = blank_frame(5, 5);
        let list = single(DrawCommand::Line {
            from: Vec2::new(-3.0, -3.0),
            to: Vec2::new(9.0, 9.0),
            line_width: 1.0,
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 5, 5, 1.0).draw_list(&list);
        assert_eq!(pixel(&frame, 5, 2, 2), [255, 255, 255, 255]);
        assert_eq!(frame.len(), 5 * 5 * 4);
    }

    #[test]
    fn text_writes_glyph_pixels_and_skips_unknown() {
        let mut frame = blank_frame(32, 16);
        let list = single(DrawCommand::Text {
            x: 0.0,
            y: 0.0,
            text: "I".to_string(),
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 32, 16, 1.0).draw_list(&list);
        // Top bar of 'I' spans all three cells of the first row.
        assert_eq!(pixel(&frame, 32, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 32, 5, 1), [255, 255, 255, 255]);

        let mut untouched = blank_frame(8, 8);
        let unknown = single(DrawCommand::Text {
            x: 0.0,
            y: 0.0,
            text: "#".to_string(),
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut untouched, 8, 8, 1.0).draw_list(&unknown);
        assert!(untouched.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn extreme_coordinates_are_clipped_without_overflow() {
        let mut frame = blank_frame(4, 4);
        let mut list = DrawList::new();
        list.push(DrawCommand::FillRect {
            x: -1.0e30,
            y: -1.0e30,
            width: 2.0e30,
            height: 2.0e30,
            color: Rgba::white(1.0),
        });
        list.push(DrawCommand::StrokeRect {
            x: -3.0e38,
            y: 0.0,
            width: f32::MAX,
            height: 3.0e38,
            line_width: 1.0e30,
            color: Rgba::black(1.0),
        });
        list.push(DrawCommand::Line {
            from: Vec2::new(-3.0e38, 1.0),
            to: Vec2::new(3.0e38, 1.0),
            line_width: 3.0e38,
            color: Rgba::white(1.0),
        });
        list.push(DrawCommand::Line {
            from: Vec2::new(-3.0e38, -3.0e38),
            to: Vec2::new(3.0e38, 2.0e38),
            line_width: 1.0,
            color: Rgba::white(1.0),
        });
        list.push(DrawCommand::Text {
            x: 3.0e38,
            y: -3.0e38,
            text: "OVERFLOW".to_string(),
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 4, 4, 1.0).draw_list(&list);
        assert_eq!(pixel(&frame, 4, 0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn non_finite_coordinates_do_not_panic() {
        let mut frame = blank_frame(4, 4);
        let list = single(DrawCommand::FillRect {
            x: f32::NAN,
            y: f32::INFINITY,
            width: 2.0,
            height: f32::NEG_INFINITY,
            color: Rgba::white(1.0),
        });
        Rasterizer::new(&mut frame, 4, 4, 1.0).draw_list(&list);
        assert_eq!(frame.len(), 4 * 4 * 4);
    }
}
