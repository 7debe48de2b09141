/// Axis-aligned platform, solid only from above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Platform {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Platform {
    const fn new(x: f32, y: f32, width: f32) -> Self {
        Self {
            x,
            y,
            width,
            height: PLATFORM_HEIGHT,
        }
    }

    /// Strict overlap with the horizontal span `[left, left + width)`.
    pub(crate) fn overlaps_span(&self, left: f32, width: f32) -> bool {
        left + width > self.x && left < self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Checkpoint {
    pub(crate) x: f32,
    pub(crate) label: &'static str,
}

/// Static level geometry; never mutated once a session starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct World {
    pub(crate) gravity: f32,
    pub(crate) min_x: f32,
    pub(crate) max_x: f32,
    pub(crate) floor_y: f32,
    pub(crate) platforms: Vec<Platform>,
    pub(crate) checkpoints: Vec<Checkpoint>,
}

const PLATFORM_HEIGHT: f32 = 16.0;

const DEMO_PLATFORMS: [Platform; 9] = [
    Platform::new(120.0, 260.0, 220.0),
    Platform::new(500.0, 232.0, 160.0),
    Platform::new(820.0, 206.0, 180.0),
    Platform::new(1160.0, 240.0, 220.0),
    Platform::new(1540.0, 260.0, 160.0),
    Platform::new(1860.0, 220.0, 200.0),
    Platform::new(2240.0, 200.0, 170.0),
    Platform::new(2580.0, 240.0, 220.0),
    Platform::new(2920.0, 260.0, 200.0),
];

impl World {
    pub(crate) fn demo() -> Self {
        Self {
            gravity: 1900.0,
            min_x: 0.0,
            max_x: 3300.0,
            floor_y: 300.0,
            platforms: DEMO_PLATFORMS.to_vec(),
            checkpoints: vec![
                Checkpoint {
                    x: 200.0,
                    label: "Start",
                },
                Checkpoint {
                    x: 2980.0,
                    label: "End",
                },
            ],
        }
    }

    /// Same bounds and gravity as the demo, with nothing but the floor.
    #[cfg(test)]
    pub(crate) fn floor_only() -> Self {
        Self {
            platforms: Vec::new(),
            checkpoints: Vec::new(),
            ..Self::demo()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_platforms_sit_above_floor_in_order() {
        let world = World::demo();
        assert_eq!(world.platforms.len(), 9);
        assert!(world
            .platforms
            .windows(2)
            .all(|pair| pair[0].x + pair[0].width < pair[1].x));
        for platform in &world.platforms {
            assert!(platform.y + platform.height <= world.floor_y);
            assert!(platform.x >= world.min_x && platform.x + platform.width <= world.max_x);
        }
    }

    #[test]
    fn span_overlap_is_strict_at_edges() {
        let platform = Platform::new(100.0, 200.0, 50.0);
        assert!(platform.overlaps_span(80.0, 24.0));
        assert!(!platform.overlaps_span(76.0, 24.0));
        assert!(!platform.overlaps_span(150.0, 24.0));
        assert!(platform.overlaps_span(149.0, 24.0));
    }
}
