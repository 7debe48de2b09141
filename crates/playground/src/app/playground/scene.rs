use feel_engine::{
    DrawList, InputAction, InputSnapshot, MetricsHandle, Scene, SceneCommand, ViewSize,
};
use tracing::{info, warn};

use super::compose::{compose_frame, Hud};
use super::simulation::{Simulation, TickInput};
use super::tuning::{FeelMode, TuningSet};
use super::world::World;

/// Hosts one playground session: owns the feel mode and the simulation and
/// translates engine input into simulation ticks.
pub(crate) struct PlaygroundScene {
    world: World,
    tunings: TuningSet,
    mode: FeelMode,
    metrics: MetricsHandle,
    sim: Option<Simulation>,
    rejected_steps: u64,
}

impl PlaygroundScene {
    pub(crate) fn new(
        world: World,
        tunings: TuningSet,
        mode: FeelMode,
        metrics: MetricsHandle,
    ) -> Self {
        Self {
            world,
            tunings,
            mode,
            metrics,
            sim: None,
            rejected_steps: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> FeelMode {
        self.mode
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn rejected_steps(&self) -> u64 {
        self.rejected_steps
    }

    #[cfg(test)]
    pub(crate) fn tunings_mut(&mut self) -> &mut TuningSet {
        &mut self.tunings
    }

    fn toggle_mode(&mut self) {
        let from = self.mode;
        self.mode = from.toggled();
        info!(from = from.label(), to = self.mode.label(), "feel_mode_changed");
    }
}

fn tick_input(input: &InputSnapshot) -> TickInput {
    TickInput {
        left: input.is_down(InputAction::MoveLeft),
        right: input.is_down(InputAction::MoveRight),
        jump_held: input.is_down(InputAction::Jump),
    }
}

impl Scene for PlaygroundScene {
    fn load(&mut self) {
        self.sim = Some(Simulation::new(self.world.clone()));
        self.rejected_steps = 0;
        info!(
            platforms = self.world.platforms.len(),
            mode = self.mode.label(),
            "session_started"
        );
    }

    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, view: ViewSize) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if input.mode_toggle_pressed() {
            self.toggle_mode();
        }

        let tuning = *self.tunings.for_mode(self.mode);
        let Some(sim) = self.sim.as_mut() else {
            return SceneCommand::None;
        };
        if let Err(error) = sim.step(dt_seconds, tick_input(input), &tuning, view) {
            self.rejected_steps += 1;
            warn!(
                error = %error,
                dt_seconds,
                rejected_steps = self.rejected_steps,
                "sim_step_rejected"
            );
        }
        SceneCommand::None
    }

    fn draw(&self, view: ViewSize, out: &mut DrawList) {
        let Some(sim) = self.sim.as_ref() else {
            return;
        };
        let hud = Hud {
            mode: self.mode,
            fps: self.metrics.snapshot().fps,
        };
        compose_frame(sim, view, hud, out);
    }

    fn unload(&mut self) {
        info!(rejected_steps = self.rejected_steps, "session_ended");
        self.sim = None;
    }

    fn debug_title(&self) -> Option<String> {
        let sim = self.sim.as_ref()?;
        let player = sim.player();
        Some(format!(
            "Feel Playground | {} | x={:.0} vx={:.0} grounded={}",
            self.mode.label(),
            player.position.x,
            player.velocity.x,
            player.grounded
        ))
    }
}
