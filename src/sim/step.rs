/// The step function: advances the session by one frame.
///
/// Fixed timestep, velocities in units per frame. Processing order is
/// load-bearing and must not be rearranged:
///   1. Consume jump intent (edge-triggered, dropped while airborne)
///   2. Advance moving platforms
///   3. Ride-along (grounded on a mover → carried by its dx)
///   4. Horizontal integration + wall resolution
///   5. Vertical integration (gravity)
///   6. Landing scan (only while descending; generation order, first match)
///   7. Floor check (unconditional; overrides any platform binding)
///   8. Camera follow
///   9. Lava descent
///  10. Terminal check (lava contact → sticky game over)
///
/// The landing window `[p.y, p.y + vy + 1]` is the game's collision
/// tolerance: no swept collision is performed beyond it. A body whose
/// bottom was already more than one unit below a platform top falls
/// through. That is the intended feel, not an approximation to fix.

use crate::domain::player::{Contact, FrameInput};
use super::event::GameEvent;
use super::session::{GameSession, Phase};

pub fn step(session: &mut GameSession, input: FrameInput) -> Vec<GameEvent> {
    if session.phase != Phase::Playing || session.game_over {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();

    session.tick_message();

    resolve_jump_intent(session, input, &mut events);
    session.field.advance(session.viewport.width, &session.tuning);
    resolve_ride_along(session);
    resolve_horizontal(session, &mut events);
    resolve_vertical(session);
    resolve_landing(session, &mut events);
    resolve_floor(session, &mut events);
    session.camera.update(
        session.player.y,
        session.viewport.height,
        session.tuning.camera_lag,
    );
    session.lava_y -= session.tuning.lava_speed;
    resolve_lava(session, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Jump intent
// ══════════════════════════════════════════════════════════════

fn resolve_jump_intent(session: &mut GameSession, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !input.jump {
        return;
    }
    match session.player.contact() {
        Contact::Grounded => {
            session.player.jump(session.tuning.jump_power);
            events.push(GameEvent::Jumped);
        }
        Contact::WallContact => {
            session.player.wall_jump(session.tuning.jump_power);
            events.push(GameEvent::WallJumped);
        }
        Contact::Airborne => {} // dropped, not buffered
    }
}

// ══════════════════════════════════════════════════════════════
// Horizontal motion
// ══════════════════════════════════════════════════════════════

/// Standing on a mover carries the player along with it.
fn resolve_ride_along(session: &mut GameSession) {
    if !session.player.on_ground {
        return;
    }
    if let Some(i) = session.player.current_platform {
        if let Some(p) = session.field.platforms.get(i) {
            if p.moving {
                session.player.x += p.dx;
            }
        }
    }
}

fn resolve_horizontal(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    session.player.x += session.tuning.speed_x * session.player.facing.sign();

    let wall_left = session.wall_left();
    let wall_right = session.wall_right();
    let player = &mut session.player;

    if player.x <= wall_left {
        player.x = wall_left;
        if !player.on_ground {
            if !player.on_wall {
                events.push(GameEvent::WallGrabbed);
            }
            player.on_wall = true;
        } else if player.facing.sign() < 0.0 {
            player.facing = player.facing.flipped();
            events.push(GameEvent::WallBounced);
        }
    } else if player.x >= wall_right {
        player.x = wall_right;
        if !player.on_ground {
            if !player.on_wall {
                events.push(GameEvent::WallGrabbed);
            }
            player.on_wall = true;
        } else if player.facing.sign() > 0.0 {
            player.facing = player.facing.flipped();
            events.push(GameEvent::WallBounced);
        }
    } else {
        player.on_wall = false;
    }
}

// ══════════════════════════════════════════════════════════════
// Vertical motion + landing
// ══════════════════════════════════════════════════════════════

fn resolve_vertical(session: &mut GameSession) {
    session.player.vy += session.tuning.gravity;
    session.player.y += session.player.vy;
}

/// Scan platforms in generation order for a landing. Runs only while the
/// body is descending (or at rest). The first platform whose top falls
/// inside the tolerance window wins, not the spatially closest one.
fn resolve_landing(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    if session.player.vy < 0.0 {
        return;
    }
    session.player.clear_ground();

    let bottom = session.player.bottom();
    let vy = session.player.vy;
    let left = session.player.x;
    let right = session.player.right();

    let mut hit: Option<(usize, f32)> = None;
    for (i, p) in session.field.platforms.iter().enumerate() {
        if bottom >= p.y && bottom <= p.y + vy + 1.0 && right > p.x && left < p.right() {
            hit = Some((i, p.y));
            break;
        }
    }

    if let Some((i, top)) = hit {
        session.player.land(top, Some(i));
        session.score = session.score.max(i as u32 + 1);
        events.push(GameEvent::Landed { platform: i });
    }
}

/// Floor contact is checked every frame, independent of the landing scan,
/// and overrides any platform binding.
fn resolve_floor(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    let floor_y = session.floor_y();
    if session.player.bottom() >= floor_y {
        let was_airborne = !session.player.on_ground;
        session.player.land(floor_y, None);
        if was_airborne {
            events.push(GameEvent::FloorContact);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Lava
// ══════════════════════════════════════════════════════════════

fn resolve_lava(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    if session.player.bottom() >= session.lava_y {
        session.game_over = true;
        session.phase = Phase::GameOver;
        events.push(GameEvent::LavaReached { score: session.score });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::platform::{Platform, PlatformField};
    use crate::domain::player::Facing;
    use crate::sim::session::Viewport;

    const JUMP: FrameInput = FrameInput { jump: true };
    const COAST: FrameInput = FrameInput { jump: false };

    fn playing_session() -> GameSession {
        let mut s = GameSession::with_seed(
            PhysicsConfig::default(),
            Viewport::new(400.0, 800.0),
            42,
        );
        s.phase = Phase::Playing;
        s
    }

    fn static_platform(x: f32, y: f32) -> Platform {
        Platform { x, y, width: 170.0, height: 10.0, moving: false, dx: 0.0 }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    // ── Jump kinematics (the canonical scenario) ──

    #[test]
    fn jump_then_one_step_integrates_gravity() {
        let mut s = playing_session();
        assert_eq!(s.player.x, 190.0);
        assert_eq!(s.player.y, 680.0);

        let events = step(&mut s, JUMP);
        assert!(events.contains(&GameEvent::Jumped));
        assert!(approx(s.player.vy, -11.6)); // -12 + 0.4
        assert!(approx(s.player.y, 668.4));  // 680 - 11.6
        assert!(approx(s.player.x, 193.0));  // constant run speed
        assert_eq!(s.player.contact(), Contact::Airborne);
    }

    #[test]
    fn airborne_jump_request_is_dropped() {
        let mut s = playing_session();
        step(&mut s, JUMP);
        let vy_before = s.player.vy;
        let events = step(&mut s, JUMP);
        assert!(!events.contains(&GameEvent::Jumped));
        assert!(!events.contains(&GameEvent::WallJumped));
        assert!(approx(s.player.vy, vy_before + 0.4)); // plain integration
    }

    // ── Landing ──

    #[test]
    fn landing_is_idempotent_at_rest() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![static_platform(100.0, 600.0)] };
        s.player.x = 150.0;
        s.player.y = 580.0;
        s.player.vy = 0.0;
        s.player.on_ground = true;
        s.player.current_platform = Some(0);

        step(&mut s, COAST);
        // Gravity briefly pulls the body into the window; the snap restores
        // the exact resting position.
        assert_eq!(s.player.y, 580.0);
        assert_eq!(s.player.vy, 0.0);
        assert!(s.player.on_ground);
        assert_eq!(s.player.current_platform, Some(0));
    }

    #[test]
    fn first_generated_platform_wins_ties() {
        let mut s = playing_session();
        // Both platforms qualify; index order decides, not proximity.
        s.field = PlatformField {
            platforms: vec![
                static_platform(100.0, 600.0),
                static_platform(100.0, 599.8),
            ],
        };
        s.player.x = 150.0;
        s.player.facing = Facing::Left; // keep the overlap after the x step
        s.player.y = 578.0; // bottom 598 before integration
        s.player.vy = 2.0;
        s.player.on_ground = false;

        let events = step(&mut s, COAST);
        assert!(events.contains(&GameEvent::Landed { platform: 0 }));
        assert_eq!(s.player.current_platform, Some(0));
        assert_eq!(s.score, 1); // not 2
        assert_eq!(s.player.bottom(), 600.0);
    }

    #[test]
    fn fast_fall_lands_within_swept_window() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![static_platform(100.0, 600.0)] };
        s.player.x = 150.0;
        s.player.y = 550.0; // bottom 570, well above the platform
        s.player.vy = 30.0;
        s.player.on_ground = false;

        let events = step(&mut s, COAST);
        // bottom after integration: 570 + 30.4 = 600.4, inside [600, 631.4]
        assert!(events.contains(&GameEvent::Landed { platform: 0 }));
        assert_eq!(s.player.bottom(), 600.0);
        assert_eq!(s.player.vy, 0.0);
    }

    #[test]
    fn body_already_below_top_falls_through() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![static_platform(100.0, 600.0)] };
        s.player.x = 150.0;
        s.player.y = 583.0; // bottom 603, two units below the top
        s.player.vy = 1.0;
        s.player.on_ground = false;

        let events = step(&mut s, COAST);
        // window this frame: [600, 602.4]; bottom 604.4 misses it
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Landed { .. })));
        assert!(!s.player.on_ground);
        assert!(s.player.vy > 0.0);
    }

    #[test]
    fn no_landing_while_rising() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![static_platform(100.0, 600.0)] };
        s.player.x = 150.0;
        s.player.y = 581.0; // intersecting the platform band
        s.player.vy = -8.0;
        s.player.on_ground = false;

        let events = step(&mut s, COAST);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Landed { .. })));
        assert!(!s.player.on_ground);
    }

    #[test]
    fn floor_overrides_platform_binding() {
        let mut s = playing_session();
        // Platform top below floor level: the landing fires first, then the
        // floor check re-snaps and clears the binding. The score keeps the
        // landing.
        s.field = PlatformField { platforms: vec![static_platform(100.0, 705.0)] };
        s.player.x = 150.0;
        s.player.y = 684.0; // bottom 705.9 after integration, inside the window
        s.player.vy = 1.5;
        s.player.on_ground = false;

        step(&mut s, COAST);
        assert_eq!(s.player.bottom(), s.floor_y());
        assert!(s.player.on_ground);
        assert!(s.player.current_platform.is_none());
        assert_eq!(s.score, 1);
    }

    // ── Walls ──

    #[test]
    fn airborne_wall_contact_grabs_the_wall() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![] };
        s.player.x = 11.0;
        s.player.y = 300.0;
        s.player.vy = -5.0; // rising: no landing scan
        s.player.facing = Facing::Left;
        s.player.on_ground = false;

        let events = step(&mut s, COAST);
        assert_eq!(s.player.x, s.wall_left());
        assert_eq!(s.player.contact(), Contact::WallContact);
        assert!(events.contains(&GameEvent::WallGrabbed));
        // Facing unchanged: grabbing is not a bounce.
        assert_eq!(s.player.facing, Facing::Left);
    }

    #[test]
    fn grounded_wall_contact_reverses_facing_only() {
        let mut s = playing_session();
        s.player.x = 12.0;
        s.player.facing = Facing::Left; // grounded on the floor, running left

        let events = step(&mut s, COAST);
        assert_eq!(s.player.x, s.wall_left());
        assert_eq!(s.player.facing, Facing::Right);
        assert!(s.player.on_ground);
        assert!(!s.player.on_wall);
        assert!(events.contains(&GameEvent::WallBounced));
    }

    #[test]
    fn wall_jump_flips_facing_and_releases_wall() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![] };
        s.player.x = s.wall_left();
        s.player.y = 300.0;
        s.player.vy = 0.0;
        s.player.facing = Facing::Left;
        s.player.on_ground = false;
        s.player.on_wall = true;

        let events = step(&mut s, JUMP);
        assert!(events.contains(&GameEvent::WallJumped));
        assert_eq!(s.player.facing, Facing::Right);
        assert!(approx(s.player.vy, -11.6));
        assert!(!s.player.on_wall);
    }

    // ── Moving platforms ──

    #[test]
    fn grounded_player_rides_a_moving_platform() {
        let mut s = playing_session();
        s.field = PlatformField {
            platforms: vec![Platform {
                x: 100.0, y: 600.0, width: 170.0, height: 10.0,
                moving: true, dx: 2.0,
            }],
        };
        s.player.x = 150.0;
        s.player.y = 580.0;
        s.player.vy = 0.0;
        s.player.on_ground = true;
        s.player.current_platform = Some(0);

        step(&mut s, COAST);
        // platform advanced to 102; ride-along +2 plus run speed +3
        assert_eq!(s.field.platforms[0].x, 102.0);
        assert!(approx(s.player.x, 155.0));
        assert!(s.player.on_ground);
    }

    // ── Score ──

    #[test]
    fn score_is_monotonic_within_a_run() {
        let mut s = playing_session();
        s.field = PlatformField {
            platforms: vec![
                static_platform(100.0, 650.0),
                static_platform(100.0, 500.0),
                static_platform(100.0, 350.0),
            ],
        };
        // Land on index 2 first.
        s.player.x = 150.0;
        s.player.facing = Facing::Left;
        s.player.y = 328.0;
        s.player.vy = 2.0;
        s.player.on_ground = false;
        step(&mut s, COAST);
        assert_eq!(s.score, 3);

        // Then fall back to index 0. The score must not regress.
        s.player.y = 628.0;
        s.player.vy = 2.0;
        s.player.on_ground = false;
        s.player.current_platform = None;
        step(&mut s, COAST);
        assert_eq!(s.player.current_platform, Some(0));
        assert_eq!(s.score, 3);

        s.reset();
        assert_eq!(s.score, 0);
    }

    // ── Lava / terminal ──

    #[test]
    fn lava_contact_ends_the_run_and_sticks() {
        let mut s = playing_session();
        s.field = PlatformField { platforms: vec![] };
        s.player.y = 0.0; // bottom 20
        s.player.vy = -1.0;
        s.player.on_ground = false;
        s.lava_y = 10.0;

        let events = step(&mut s, COAST);
        assert!(s.game_over);
        assert_eq!(s.phase, Phase::GameOver);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LavaReached { .. })));

        // Sticky: further steps are no-ops.
        let score = s.score;
        let y = s.player.y;
        let lava = s.lava_y;
        for _ in 0..5 {
            let ev = step(&mut s, JUMP);
            assert!(ev.is_empty());
        }
        assert_eq!(s.score, score);
        assert_eq!(s.player.y, y);
        assert_eq!(s.lava_y, lava);
    }

    #[test]
    fn lava_descends_every_playing_step() {
        let mut s = playing_session();
        let before = s.lava_y;
        step(&mut s, COAST);
        assert_eq!(s.lava_y, before - s.tuning.lava_speed);
        step(&mut s, COAST);
        assert_eq!(s.lava_y, before - 2.0 * s.tuning.lava_speed);
    }

    #[test]
    fn step_is_a_noop_outside_playing() {
        let mut s = playing_session();
        s.phase = Phase::Title;
        let y = s.player.y;
        let lava = s.lava_y;
        let events = step(&mut s, JUMP);
        assert!(events.is_empty());
        assert_eq!(s.player.y, y);
        assert_eq!(s.lava_y, lava);
    }

    // ── Camera ──

    #[test]
    fn camera_eases_toward_the_player() {
        let mut s = playing_session();
        let target = s.player.y - s.viewport.height * 0.5;
        assert!(approx(s.camera.y, target)); // recentered on reset

        step(&mut s, JUMP);
        let new_target = s.player.y - s.viewport.height * 0.5;
        // One frame covers a fixed fraction of the gap toward the new target.
        assert!((s.camera.y - new_target).abs() < (target - new_target).abs());
    }
}
