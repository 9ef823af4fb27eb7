/// Camera: an exponentially smoothed vertical viewport offset.
///
/// Purely a rendering offset: physics and collision run in world space
/// and never read the camera. Each frame the offset eases toward
/// "player centered vertically" by a fixed fraction (`camera_lag`).

#[derive(Clone, Copy, Debug, Default)]
pub struct CameraFollow {
    /// World y of the top of the viewport.
    pub y: f32,
}

impl CameraFollow {
    pub fn new() -> Self {
        CameraFollow { y: 0.0 }
    }

    /// Ease toward the target by `lag` per frame.
    pub fn update(&mut self, player_y: f32, viewport_height: f32, lag: f32) {
        let target = player_y - viewport_height * 0.5;
        self.y += (target - self.y) * lag;
    }

    /// Snap directly onto the player. Used on session reset.
    pub fn recenter(&mut self, player_y: f32, viewport_height: f32) {
        self.y = player_y - viewport_height * 0.5;
    }
}
