use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::raster::Rasterizer;
use super::{DrawList, ViewSize};

/// Presents draw lists through a `pixels` surface sized to the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    scale_factor: f64,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            scale_factor,
        })
    }

    /// Rebuilds the surface for a new physical size. A zero-sized surface is
    /// remembered so `view` reports it as unavailable until the next resize.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> Result<(), Error> {
        self.scale_factor = scale_factor;
        if width == 0 || height == 0 {
            self.width = width;
            self.height = height;
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub fn view(&self) -> Option<ViewSize> {
        ViewSize::from_physical(self.width, self.height, self.scale_factor)
    }

    pub fn render(&mut self, list: &DrawList) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let (width, height) = (self.width, self.height);
        let scale = self.scale_factor as f32;
        Rasterizer::new(self.pixels.frame_mut(), width, height, scale).draw_list(list);
        self.pixels.render()
    }
}
