/// GameSession: the complete state of one play session.
///
/// ## Coordinates
///
/// World space is absolute for the full run; "up" is negative y. Screen
/// mapping (`world y - camera y`) happens only in the renderer. The
/// viewport describes the visible world area and is the single source of
/// truth for derived bounds: `floor_y` and `wall_right` are computed on
/// demand, never cached, so a resize can never leave them stale.
///
/// ## Lifecycle
///
/// `reset()` is the only exit from a terminal `game_over` state: it clears
/// the flag, re-grounds the player mid-screen on the floor, drops the lava
/// back to the bottom of the viewport, recenters the camera and regenerates
/// the platform field from the session RNG. The RNG stream persists across
/// resets, so one session seed reproduces an entire multi-run session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{GameConfig, PhysicsConfig};
use crate::domain::platform::PlatformField;
use crate::domain::player::PlayerBody;
use super::camera::CameraFollow;

/// Visible world area, in world units. Dimensions must be positive;
/// violating this is a programming-contract failure, not a runtime error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        assert!(width > 0.0 && height > 0.0, "viewport dimensions must be positive");
        Viewport { width, height }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

pub struct GameSession {
    pub field: PlatformField,
    pub player: PlayerBody,
    pub camera: CameraFollow,
    pub viewport: Viewport,
    pub tuning: PhysicsConfig,

    // ── Run state ──
    /// Highest platform index reached, 1-based. Monotonic within a run.
    pub score: u32,
    /// Sticky once set; only `reset()` clears it.
    pub game_over: bool,
    /// World y of the lava surface. Decreases every playing step.
    pub lava_y: f32,

    // ── Meta ──
    pub phase: Phase,
    pub seed: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    rng: Pcg32,
}

impl GameSession {
    /// Build a session from config. Uses the configured seed if present,
    /// otherwise draws one from entropy (and keeps it for display).
    pub fn new(config: &GameConfig, viewport: Viewport) -> Self {
        let seed = config.general.seed.unwrap_or_else(|| rand::rng().random());
        Self::with_seed(config.physics.clone(), viewport, seed)
    }

    /// Build a session with an explicit RNG seed. Deterministic: the same
    /// seed, tuning and viewport produce the same platform fields.
    pub fn with_seed(tuning: PhysicsConfig, viewport: Viewport, seed: u64) -> Self {
        assert!(tuning.platform_gap > 0.0, "platform_gap must be positive");

        let mut session = GameSession {
            field: PlatformField::default(),
            player: PlayerBody::new(0.0, 0.0, tuning.player_size),
            camera: CameraFollow::new(),
            viewport,
            tuning,
            score: 0,
            game_over: false,
            lava_y: viewport.height,
            phase: Phase::Title,
            seed,
            message: String::new(),
            message_timer: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        session.reset();
        session
    }

    // ── Derived bounds (recomputed from the viewport, never cached) ──

    /// World y of the floor surface.
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.viewport.height - self.tuning.floor_height
    }

    #[inline]
    pub fn wall_left(&self) -> f32 {
        self.tuning.wall_margin
    }

    /// Rightmost allowed player x (left edge of the body).
    #[inline]
    pub fn wall_right(&self) -> f32 {
        self.viewport.width - self.tuning.wall_margin - self.player.size
    }

    /// Adopt new viewport dimensions (terminal resize). Platforms keep
    /// their world coordinates; only the derived bounds and the camera
    /// mapping shift.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // ── Lifecycle ──

    /// Start a fresh run. The only way to leave `game_over`.
    pub fn reset(&mut self) {
        self.game_over = false;
        self.lava_y = self.viewport.height;
        self.score = 0;

        let size = self.tuning.player_size;
        let floor_y = self.floor_y();
        self.player = PlayerBody::new(
            self.viewport.width / 2.0 - size / 2.0,
            floor_y - size,
            size,
        );
        self.camera.recenter(self.player.y, self.viewport.height);
        self.field = PlatformField::generate(
            &mut self.rng,
            self.viewport.width,
            floor_y,
            &self.tuning,
        );

        self.message.clear();
        self.message_timer = 0;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the transient message. Called once per tick in every phase.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::Contact;

    fn session() -> GameSession {
        GameSession::with_seed(PhysicsConfig::default(), Viewport::new(400.0, 800.0), 42)
    }

    #[test]
    fn fresh_session_places_player_on_floor_mid_screen() {
        let s = session();
        assert_eq!(s.player.x, 190.0); // 400/2 - 20/2
        assert_eq!(s.player.bottom(), s.floor_y());
        assert_eq!(s.player.contact(), Contact::Grounded);
        assert_eq!(s.score, 0);
        assert!(!s.game_over);
        assert_eq!(s.lava_y, 800.0);
        assert_eq!(s.camera.y, 680.0 - 400.0); // player.y − height/2
    }

    #[test]
    fn reset_clears_terminal_state() {
        let mut s = session();
        s.score = 37;
        s.game_over = true;
        s.phase = Phase::GameOver;
        s.lava_y = -500.0;
        s.player.y = -900.0;
        s.player.on_ground = false;
        s.player.current_platform = Some(12);

        s.reset();
        assert!(!s.game_over);
        assert_eq!(s.score, 0);
        assert_eq!(s.lava_y, 800.0);
        assert_eq!(s.player.contact(), Contact::Grounded);
        assert!(s.player.current_platform.is_none());
        assert_eq!(s.player.bottom(), s.floor_y());
        assert!(!s.field.is_empty());
    }

    #[test]
    fn reset_builds_the_field_from_the_current_floor() {
        let mut s = session();
        s.reset();
        // The start platform sits one unit above the derived floor, and the
        // player rests on the floor itself.
        assert_eq!(s.field.platforms[0].y, s.floor_y() - 1.0);
        assert_eq!(s.player.bottom(), s.floor_y());
    }

    #[test]
    fn reset_regenerates_the_field() {
        let mut s = session();
        let first: Vec<f32> = s.field.platforms.iter().skip(1).take(20).map(|p| p.x).collect();
        s.reset();
        let second: Vec<f32> = s.field.platforms.iter().skip(1).take(20).map(|p| p.x).collect();
        // The RNG stream advances across resets; identical layouts would
        // mean the field was not regenerated.
        assert_ne!(first, second);
        // Fresh field still honors the wall bounds.
        for p in s.field.platforms.iter().skip(1) {
            assert!(p.x >= s.wall_left());
            assert!(p.right() <= s.viewport.width - s.tuning.wall_margin);
        }
    }

    #[test]
    fn resize_keeps_world_coordinates() {
        let mut s = session();
        let xs: Vec<f32> = s.field.platforms.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = s.field.platforms.iter().map(|p| p.y).collect();

        s.set_viewport(Viewport::new(640.0, 384.0));
        assert_eq!(s.floor_y(), 384.0 - 100.0);
        assert_eq!(s.wall_right(), 640.0 - 10.0 - 20.0);
        for (i, p) in s.field.platforms.iter().enumerate() {
            assert_eq!(p.x, xs[i]);
            assert_eq!(p.y, ys[i]);
        }
    }

    #[test]
    #[should_panic(expected = "viewport dimensions")]
    fn zero_viewport_is_a_contract_violation() {
        let _ = Viewport::new(0.0, 800.0);
    }
}
