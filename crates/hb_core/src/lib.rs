//! # hb_core - Deterministic Baseball Play Resolution Engine
//!
//! This library resolves a single live-ball baseball play: from bat-ball
//! contact, it simulates ball flight and bounce physics, the coordinated
//! decisions of nine fielders, every baserunner's decisions, throw physics,
//! and biased umpire adjudication, in fixed 0.1s timesteps until the ball
//! is dead.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same play)
//! - Structured event log for observers (tests, narration layers)
//! - JSON API for easy integration with a surrounding game loop

pub mod api;
pub mod engine;
pub mod error;
pub mod models;

pub use api::{resolve_play_json, PlayRequest, PlayResponse};
pub use engine::play::{PlaySetup, PlayingAction};
pub use engine::umpire::UmpireProfile;
pub use error::{PlayError, Result};
pub use models::outcome::{PlayOutcome, PlayRecord};
