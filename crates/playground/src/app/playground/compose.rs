use feel_engine::{visible_world_size, world_to_view, DrawCommand, DrawList, Rgba, Vec2, ViewSize};

use super::simulation::{Simulation, ZOOM};
use super::tuning::FeelMode;

const BACKGROUND: Rgba = Rgba::new(11, 13, 18, 255);
const GRID_SPACING: f32 = 40.0;
const CHECKPOINT_LABEL_TOP: f32 = 22.0;
const CHECKPOINT_CULL_MARGIN: f32 = 80.0;
const HUD_MARGIN: f32 = 8.0;

/// Overlay values that live outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hud {
    pub(crate) mode: FeelMode,
    pub(crate) fps: f32,
}

/// Appends one full frame for `sim` to `out`. Geometry is laid out in world
/// units relative to the camera and scaled by the zoom into view units.
pub(crate) fn compose_frame(sim: &Simulation, view: ViewSize, hud: Hud, out: &mut DrawList) {
    let visible = visible_world_size(view, ZOOM);
    let camera = sim.camera().position;
    let to_view = |world: Vec2| world_to_view(world, camera, ZOOM);

    out.push(DrawCommand::Clear { color: BACKGROUND });
    out.push(DrawCommand::FillRect {
        x: 0.0,
        y: 0.0,
        width: view.width,
        height: view.height,
        color: Rgba::white(0.02),
    });

    push_grid(view, visible, out);

    let world = sim.world();
    let floor_top = (world.floor_y - camera.y) * ZOOM;
    out.push(DrawCommand::FillRect {
        x: 0.0,
        y: floor_top,
        width: view.width,
        height: view.height - floor_top,
        color: Rgba::white(0.05),
    });
    out.push(DrawCommand::Line {
        from: Vec2::new(0.0, floor_top),
        to: Vec2::new(view.width, floor_top),
        line_width: 2.0 * ZOOM,
        color: Rgba::white(0.12),
    });

    for (index, platform) in world.platforms.iter().enumerate() {
        let top_left = to_view(Vec2::new(platform.x, platform.y));
        let width = platform.width * ZOOM;
        let height = platform.height * ZOOM;
        let fill = if index % 2 == 0 { 0.08 } else { 0.06 };
        out.push(DrawCommand::FillRect {
            x: top_left.x,
            y: top_left.y,
            width,
            height,
            color: Rgba::white(fill),
        });
        out.push(DrawCommand::StrokeRect {
            x: top_left.x,
            y: top_left.y,
            width,
            height,
            line_width: ZOOM,
            color: Rgba::white(0.16),
        });
    }

    for checkpoint in &world.checkpoints {
        let offset = checkpoint.x - camera.x;
        if offset < -CHECKPOINT_CULL_MARGIN || offset > visible.x + CHECKPOINT_CULL_MARGIN {
            continue;
        }
        out.push(DrawCommand::Text {
            x: offset * ZOOM,
            y: CHECKPOINT_LABEL_TOP * ZOOM,
            text: checkpoint.label.to_string(),
            color: Rgba::white(0.60),
        });
    }

    let player = sim.player();
    let top_left = to_view(player.position);
    let width = player.size.x * ZOOM;
    let height = player.size.y * ZOOM;
    let shade = if player.grounded { 0.92 } else { 0.78 };
    out.push(DrawCommand::FillRect {
        x: top_left.x,
        y: top_left.y,
        width,
        height,
        color: Rgba::white(shade),
    });
    out.push(DrawCommand::StrokeRect {
        x: top_left.x,
        y: top_left.y,
        width,
        height,
        line_width: ZOOM,
        color: Rgba::black(0.35),
    });

    out.push(DrawCommand::Text {
        x: HUD_MARGIN,
        y: view.height - HUD_MARGIN - 10.0,
        text: hud_line(hud),
        color: Rgba::white(0.70),
    });
}

/// Screen-fixed grid; it does not scroll with the camera.
fn push_grid(view: ViewSize, visible: Vec2, out: &mut DrawList) {
    let color = Rgba::white(0.06);
    let mut gx = 0.0;
    while gx <= visible.x {
        out.push(DrawCommand::Line {
            from: Vec2::new(gx * ZOOM, 0.0),
            to: Vec2::new(gx * ZOOM, view.height),
            line_width: ZOOM,
            color,
        });
        gx += GRID_SPACING;
    }
    let mut gy = 0.0;
    while gy <= visible.y {
        out.push(DrawCommand::Line {
            from: Vec2::new(0.0, gy * ZOOM),
            to: Vec2::new(view.width, gy * ZOOM),
            line_width: ZOOM,
            color,
        });
        gy += GRID_SPACING;
    }
}

fn hud_line(hud: Hud) -> String {
    format!(
        "mode: {}  fps: {:.0}  tab: toggle",
        hud.mode.label(),
        hud.fps.max(0.0)
    )
}
