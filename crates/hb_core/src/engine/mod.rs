//! The play resolution engine.
//!
//! Layering follows a simple rule: leaf modules (`physics_constants`,
//! `geometry`, `batted_ball`, `throwing`, `fielder`, `baserunner`,
//! `umpire`) hold pure state and math; `play/` owns all cross-agent
//! orchestration and is the only writer of shared state.

pub mod baserunner;
pub mod batted_ball;
pub mod events;
pub mod fielder;
pub mod geometry;
pub mod physics_constants;
pub mod play;
pub mod throwing;
pub mod umpire;
