/// Platform field: procedural generation and per-frame movement.
///
/// ## Generation
///
/// Deterministic shape, randomized content. A triple-width start platform
/// sits just above the floor, then the tower climbs in steps of
/// `gap + random(0, jitter)` until the field passes `-world_depth`
/// ("up" is negative y, the run never scrolls the world). Platforms past
/// `moving_min_index` may be moving; the long static section below is the
/// difficulty gate, not an accident.
///
/// ## Movement
///
/// Moving platforms patrol horizontally and bounce elastically off the
/// wall margins. `advance` mutates in place; the field is only ever
/// replaced wholesale on session reset.

use rand::Rng;

use crate::config::PhysicsConfig;

#[derive(Clone, Copy, Debug)]
pub struct Platform {
    /// World-space top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub moving: bool,
    /// Horizontal velocity, units per frame. Nonzero iff `moving`.
    pub dx: f32,
}

impl Platform {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// The generated sequence of platforms, in generation order (bottom-up).
/// Landing resolution depends on this order, so it is never re-sorted.
#[derive(Clone, Debug, Default)]
pub struct PlatformField {
    pub platforms: Vec<Platform>,
}

impl PlatformField {
    /// Generate a fresh field for one run.
    ///
    /// Index 0 is the wide start platform at `floor_y - 1`. Every later
    /// platform has `width = platform_width` and an x drawn uniformly from
    /// `[wall_margin, viewport_width - platform_width - wall_margin]`.
    /// From generated index `moving_min_index` on, each platform moves with
    /// probability `moving_chance`, at `dx = ±(1 + random(0, 2))`.
    pub fn generate<R: Rng>(
        rng: &mut R,
        viewport_width: f32,
        floor_y: f32,
        tuning: &PhysicsConfig,
    ) -> Self {
        assert!(tuning.platform_gap > 0.0, "platform_gap must be positive");
        assert!(tuning.platform_width > 0.0, "platform_width must be positive");
        let x_span = viewport_width - tuning.platform_width - 2.0 * tuning.wall_margin;
        assert!(x_span > 0.0, "viewport too narrow for platform placement");

        let mut platforms = Vec::new();
        let mut y = floor_y - 1.0;

        let start_width = tuning.platform_width * 3.0;
        platforms.push(Platform {
            x: (viewport_width - start_width) / 2.0,
            y,
            width: start_width,
            height: tuning.platform_height,
            moving: false,
            dx: 0.0,
        });
        y -= tuning.platform_gap + rng.random::<f32>() * tuning.gap_jitter;

        while y > -tuning.world_depth {
            let x = tuning.wall_margin + rng.random::<f32>() * x_span;
            let moving = platforms.len() >= tuning.moving_min_index
                && rng.random::<f32>() < tuning.moving_chance;
            let dx = if moving {
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                sign * (1.0 + rng.random::<f32>() * 2.0)
            } else {
                0.0
            };
            platforms.push(Platform {
                x,
                y,
                width: tuning.platform_width,
                height: tuning.platform_height,
                moving,
                dx,
            });
            y -= tuning.platform_gap + rng.random::<f32>() * tuning.gap_jitter;
        }

        PlatformField { platforms }
    }

    /// Advance moving platforms by one frame, bouncing off the wall margins.
    /// In place, no allocation.
    pub fn advance(&mut self, viewport_width: f32, tuning: &PhysicsConfig) {
        for p in &mut self.platforms {
            if !p.moving {
                continue;
            }
            p.x += p.dx;
            let left = tuning.wall_margin;
            let right = viewport_width - tuning.wall_margin - p.width;
            if p.x < left {
                p.x = left;
                p.dx = -p.dx;
            } else if p.x > right {
                p.x = right;
                p.dx = -p.dx;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
