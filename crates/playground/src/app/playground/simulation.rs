use feel_engine::{visible_world_size, ViewSize};
use thiserror::Error;
use tracing::debug;

use super::camera::CameraState;
use super::player::{self, PlayerState};
use super::tuning::Tuning;
use super::world::World;

pub(crate) const ZOOM: f32 = 0.85;
pub(crate) const MAX_STEP_SECONDS: f32 = 0.033;

/// Digital inputs sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickInput {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump_held: bool,
}

impl TickInput {
    fn direction(self) -> f32 {
        f32::from(u8::from(self.right)) - f32::from(u8::from(self.left))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StepReport {
    pub(crate) jumped: bool,
    pub(crate) landed: bool,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum SimError {
    #[error("step produced non-finite state (player={player_finite}, camera={camera_finite})")]
    NonFiniteState {
        player_finite: bool,
        camera_finite: bool,
    },
}

/// Player, camera and world for one session. State only changes through
/// [`Simulation::step`].
#[derive(Debug, Clone)]
pub(crate) struct Simulation {
    world: World,
    player: PlayerState,
    camera: CameraState,
    prev_jump_held: bool,
}

impl Simulation {
    pub(crate) fn new(world: World) -> Self {
        Self::with_player(world, PlayerState::spawn())
    }

    pub(crate) fn with_player(world: World, player: PlayerState) -> Self {
        Self {
            world,
            player,
            camera: CameraState::default(),
            prev_jump_held: false,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn player(&self) -> &PlayerState {
        &self.player
    }

    pub(crate) fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// Advances one tick. The next state is built on copies and only
    /// committed when every player and camera value is finite.
    pub(crate) fn step(
        &mut self,
        dt_seconds: f32,
        input: TickInput,
        tuning: &Tuning,
        view: ViewSize,
    ) -> Result<StepReport, SimError> {
        let dt = sanitize_dt(dt_seconds);
        let mut player = self.player;
        let mut camera = self.camera;

        let jump_pressed = input.jump_held && !self.prev_jump_held;
        if jump_pressed {
            player.jump_buffer_left_ms = tuning.jump_buffer_ms;
        }

        player::apply_horizontal_input(&mut player, input.direction(), tuning, dt);
        player::integrate(&mut player, self.world.gravity, dt);
        player::clamp_to_walls(&mut player, &self.world);

        let was_grounded = player.grounded;
        let grounded = player::resolve_vertical(&mut player, &self.world, dt);

        let elapsed_ms = dt * 1000.0;
        if grounded {
            player.coyote_left_ms = tuning.coyote_ms;
        } else {
            player.coyote_left_ms = (player.coyote_left_ms - elapsed_ms).max(0.0);
        }
        if player.jump_buffer_left_ms > 0.0 {
            player.jump_buffer_left_ms = (player.jump_buffer_left_ms - elapsed_ms).max(0.0);
        }
        if was_grounded && !grounded {
            player.coyote_left_ms = tuning.coyote_ms;
        }

        let wants_jump = if tuning.buffers_jumps() {
            player.jump_buffer_left_ms > 0.0
        } else {
            jump_pressed
        };
        let can_jump = player.grounded || player.coyote_left_ms > 0.0;
        let jumped = wants_jump && can_jump;
        if jumped {
            player.velocity.y = -tuning.jump_velocity;
            player.grounded = false;
            player.coyote_left_ms = 0.0;
            player.jump_buffer_left_ms = 0.0;
        }

        let visible = visible_world_size(view, ZOOM);
        camera.update(
            tuning.camera,
            player.center(),
            player.velocity.x,
            visible,
            dt,
        );

        let player_finite = player.is_finite();
        let camera_finite = camera.is_finite();
        if !player_finite || !camera_finite {
            return Err(SimError::NonFiniteState {
                player_finite,
                camera_finite,
            });
        }

        let landed = grounded && !was_grounded;
        if jumped {
            debug!(x = player.position.x, y = player.position.y, "player_jumped");
        } else if landed {
            debug!(x = player.position.x, y = player.position.y, "player_landed");
        }

        self.player = player;
        self.camera = camera;
        self.prev_jump_held = input.jump_held;
        Ok(StepReport { jumped, landed })
    }
}

fn sanitize_dt(dt_seconds: f32) -> f32 {
    if dt_seconds.is_finite() && dt_seconds > 0.0 {
        dt_seconds.min(MAX_STEP_SECONDS)
    } else {
        0.0
    }
}
