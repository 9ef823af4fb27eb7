/// Events emitted during a simulation step.
/// The shell consumes these for UI feedback; tests assert on them.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    WallJumped,
    /// Landed on a platform (generation index).
    Landed { platform: usize },
    /// Landed on (or was snapped to) the floor.
    FloorContact,
    /// Clamped against a side wall while airborne.
    WallGrabbed,
    /// Bounced off a side wall while grounded (facing reversed).
    WallBounced,
    /// Lava caught the player; the run is over.
    LavaReached { score: u32 },
}
