mod draw_list;
mod font;
mod raster;
mod renderer;
mod transform;

pub use draw_list::{DrawCommand, DrawList, Rgba};
pub use renderer::Renderer;
pub use transform::{visible_world_size, world_to_view, ViewSize};
