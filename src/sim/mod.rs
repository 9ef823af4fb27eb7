/// Simulation layer: the per-frame step, the session it advances,
/// the events it emits, and the camera that trails the player.

pub mod camera;
pub mod event;
pub mod session;
pub mod step;
