/// Pure game-domain types: platforms and the player body.
/// No I/O, no timers: everything here is driven by `sim::step`.

pub mod platform;
pub mod player;
