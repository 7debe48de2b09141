mod camera;
mod compose;
mod config;
mod player;
mod scene;
mod simulation;
mod tuning;
mod world;

use feel_engine::{MetricsHandle, Scene};

pub(crate) use config::{load_tuning_file, parse_flag};
pub(crate) use tuning::{FeelMode, TuningSet};

use scene::PlaygroundScene;
use world::World;

pub(crate) fn build_scene(
    tunings: TuningSet,
    mode: FeelMode,
    metrics: MetricsHandle,
) -> Box<dyn Scene> {
    Box::new(PlaygroundScene::new(World::demo(), tunings, mode, metrics))
}
