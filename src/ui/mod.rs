/// Terminal front end: input tracking, gamepad polling, and the
/// diff-based renderer.

pub mod gamepad;
pub mod input;
pub mod renderer;
