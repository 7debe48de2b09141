use feel_engine::Vec2;

use super::tuning::CameraMode;

const DEAD_ZONE_X: (f32, f32) = (0.38, 0.62);
const DEAD_ZONE_Y: (f32, f32) = (0.40, 0.60);
const LOOK_AHEAD_PER_VELOCITY: f32 = 0.28;
const LOOK_AHEAD_LIMIT: f32 = 200.0;
const SPRING_STIFFNESS: f32 = 65.0;
const SPRING_DAMPING: f32 = 16.0;

/// Top-left corner of the visible world rectangle plus its spring velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct CameraState {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
}

impl CameraState {
    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    pub(crate) fn update(
        &mut self,
        mode: CameraMode,
        target_center: Vec2,
        target_velocity_x: f32,
        visible: Vec2,
        dt: f32,
    ) {
        match mode {
            CameraMode::Snap => self.snap_to(target_center, visible),
            CameraMode::SpringFollow => {
                self.spring_follow(target_center, target_velocity_x, visible, dt)
            }
        }
    }

    pub(crate) fn snap_to(&mut self, target_center: Vec2, visible: Vec2) {
        self.position = Vec2::new(
            target_center.x - visible.x * 0.5,
            target_center.y - visible.y * 0.5,
        );
        self.velocity = Vec2::ZERO;
    }

    pub(crate) fn spring_follow(
        &mut self,
        target_center: Vec2,
        target_velocity_x: f32,
        visible: Vec2,
        dt: f32,
    ) {
        let look_ahead = (target_velocity_x * LOOK_AHEAD_PER_VELOCITY)
            .clamp(-LOOK_AHEAD_LIMIT, LOOK_AHEAD_LIMIT);
        let desired_x = self.position.x
            + look_ahead
            + dead_zone_push(target_center.x, self.position.x, visible.x, DEAD_ZONE_X);
        let desired_y = self.position.y
            + dead_zone_push(target_center.y, self.position.y, visible.y, DEAD_ZONE_Y);

        let (x, vx) = spring_axis(self.position.x, self.velocity.x, desired_x, dt);
        let (y, vy) = spring_axis(self.position.y, self.velocity.y, desired_y, dt);
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::new(vx, vy);
    }
}

/// Signed distance the target sits outside the dead-zone band on one axis.
fn dead_zone_push(target: f32, camera: f32, visible: f32, zone: (f32, f32)) -> f32 {
    let low = camera + visible * zone.0;
    let high = camera + visible * zone.1;
    if target < low {
        target - low
    } else if target > high {
        target - high
    } else {
        0.0
    }
}

fn spring_axis(position: f32, velocity: f32, desired: f32, dt: f32) -> (f32, f32) {
    let acceleration = (desired - position) * SPRING_STIFFNESS - velocity * SPRING_DAMPING;
    let velocity = velocity + acceleration * dt;
    (position + velocity * dt, velocity)
}
