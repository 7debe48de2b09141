use feel_engine::Vec2;

use super::tuning::Tuning;
use super::world::World;

pub(crate) const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 34.0);
pub(crate) const PLAYER_SPAWN: Vec2 = Vec2::new(160.0, 0.0);

/// Inset between the world bounds and the reachable area.
const WALL_PADDING: f32 = 20.0;
/// Tolerance band for landing on the floor or a platform top.
const LANDING_EPSILON: f32 = 2.0;
/// Platforms are ignored while rising faster than this (y-down, so negative).
const MIN_LANDING_VELOCITY_Y: f32 = -50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerState {
    /// Top-left corner of the collision box.
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) size: Vec2,
    pub(crate) grounded: bool,
    pub(crate) coyote_left_ms: f32,
    pub(crate) jump_buffer_left_ms: f32,
}

impl PlayerState {
    pub(crate) fn spawn() -> Self {
        Self::at(PLAYER_SPAWN)
    }

    pub(crate) fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size: PLAYER_SIZE,
            grounded: false,
            coyote_left_ms: 0.0,
            jump_buffer_left_ms: 0.0,
        }
    }

    pub(crate) fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.size.x * 0.5,
            self.position.y + self.size.y * 0.5,
        )
    }

    pub(crate) fn feet(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.coyote_left_ms.is_finite()
            && self.jump_buffer_left_ms.is_finite()
    }
}

/// Accelerates toward `direction` (-1, 0 or 1) or brakes toward rest, then
/// clamps to the tuning's top speed.
pub(crate) fn apply_horizontal_input(
    player: &mut PlayerState,
    direction: f32,
    tuning: &Tuning,
    dt: f32,
) {
    let vx = &mut player.velocity.x;
    if direction != 0.0 {
        *vx += direction * tuning.acceleration * dt;
    } else if *vx != 0.0 {
        let slowed = (vx.abs() - tuning.deceleration * dt).max(0.0);
        *vx = slowed.copysign(*vx);
    }
    // Comparison rather than clamp: NaN must survive to the finiteness check
    // and a NaN bound must not panic.
    if vx.abs() > tuning.max_speed {
        *vx = tuning.max_speed.copysign(*vx);
    }
}

pub(crate) fn integrate(player: &mut PlayerState, gravity: f32, dt: f32) {
    player.velocity.y += gravity * dt;
    player.position.x += player.velocity.x * dt;
    player.position.y += player.velocity.y * dt;
}

pub(crate) fn clamp_to_walls(player: &mut PlayerState, world: &World) {
    let left = world.min_x + WALL_PADDING;
    let right = world.max_x - WALL_PADDING - player.size.x;
    if player.position.x < left {
        player.position.x = left;
        player.velocity.x = 0.0;
    } else if player.position.x > right {
        player.position.x = right;
        player.velocity.x = 0.0;
    }
}

/// Resolves floor and one-way platform contact for this tick. Clears
/// `grounded` first; returns the new grounded state.
pub(crate) fn resolve_vertical(player: &mut PlayerState, world: &World, dt: f32) -> bool {
    player.grounded = false;

    if player.feet() >= world.floor_y - LANDING_EPSILON {
        land_on(player, world.floor_y);
        return true;
    }
    if player.velocity.y < MIN_LANDING_VELOCITY_Y {
        return false;
    }

    let feet = player.feet();
    let prev_feet = feet - player.velocity.y * dt;
    let landing = world.platforms.iter().find(|platform| {
        if !platform.overlaps_span(player.position.x, player.size.x) {
            return false;
        }
        let above = player.position.y < platform.y;
        let crossed =
            prev_feet <= platform.y + LANDING_EPSILON && feet >= platform.y - LANDING_EPSILON;
        let close = (feet - platform.y).abs() <= LANDING_EPSILON;
        above && (crossed || close)
    });

    match landing {
        Some(platform) => {
            land_on(player, platform.y);
            true
        }
        None => false,
    }
}

fn land_on(player: &mut PlayerState, surface_y: f32) {
    player.position.y = surface_y - player.size.y;
    player.velocity.y = 0.0;
    player.grounded = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::playground::world::Platform;

    const DT: f32 = 1.0 / 60.0;

    fn world_with(platforms: Vec<Platform>) -> World {
        World {
            platforms,
            ..World::floor_only()
        }
    }

    #[test]
    fn braking_never_overshoots_zero() {
        let mut player = PlayerState::spawn();
        player.velocity.x = -30.0;
        apply_horizontal_input(&mut player, 0.0, &Tuning::RAW, DT);
        assert_eq!(player.velocity.x, 0.0);
    }

    #[test]
    fn acceleration_is_capped_at_max_speed() {
        let mut player = PlayerState::spawn();
        player.velocity.x = Tuning::RAW.max_speed - 1.0;
        apply_horizontal_input(&mut player, 1.0, &Tuning::RAW, DT);
        assert_eq!(player.velocity.x, Tuning::RAW.max_speed);
    }

    #[test]
    fn walls_stop_the_player_inside_padding() {
        let world = World::floor_only();
        let mut player = PlayerState::at(Vec2::new(5.0, 100.0));
        player.velocity.x = -200.0;
        clamp_to_walls(&mut player, &world);
        assert_eq!(player.position.x, 20.0);
        assert_eq!(player.velocity.x, 0.0);

        player.position.x = world.max_x;
        player.velocity.x = 200.0;
        clamp_to_walls(&mut player, &world);
        assert_eq!(player.position.x, world.max_x - 20.0 - PLAYER_SIZE.x);
        assert_eq!(player.velocity.x, 0.0);
    }

    #[test]
    fn floor_snaps_within_epsilon() {
        let world = World::floor_only();
        let mut player = PlayerState::at(Vec2::new(200.0, world.floor_y - PLAYER_SIZE.y - 1.5));
        assert!(resolve_vertical(&mut player, &world, DT));
        assert_eq!(player.feet(), world.floor_y);
    }

    #[test]
    fn falling_through_platform_top_lands_on_it() {
        let platform = Platform {
            x: 100.0,
            y: 200.0,
            width: 100.0,
            height: 16.0,
        };
        let world = world_with(vec![platform]);
        let mut player = PlayerState::at(Vec2::new(120.0, 200.0 - PLAYER_SIZE.y + 6.0));
        player.velocity.y = 600.0;

        assert!(resolve_vertical(&mut player, &world, DT));
        assert_eq!(player.position.y + player.size.y, 200.0);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn rising_player_passes_up_through_platforms() {
        let platform = Platform {
            x: 100.0,
            y: 200.0,
            width: 100.0,
            height: 16.0,
        };
        let world = world_with(vec![platform]);
        let mut player = PlayerState::at(Vec2::new(120.0, 200.0 - PLAYER_SIZE.y + 1.0));
        player.velocity.y = -400.0;

        assert!(!resolve_vertical(&mut player, &world, DT));
        assert!(!player.grounded);
    }

    #[test]
    fn edge_contact_without_overlap_does_not_land() {
        let platform = Platform {
            x: 100.0,
            y: 200.0,
            width: 100.0,
            height: 16.0,
        };
        let world = world_with(vec![platform]);
        let mut player = PlayerState::at(Vec2::new(200.0, 200.0 - PLAYER_SIZE.y));
        assert!(!resolve_vertical(&mut player, &world, DT));
    }
}
