//! Structured play events.
//!
//! The engine appends one of these for every observable state change. The
//! log is the only channel observers (tests, a narration/broadcast layer)
//! get; they read it after the fact and can never mutate simulation state
//! through it.

use serde::{Deserialize, Serialize};

use super::outcome::{Base, PlayOutcome};
use super::player::FieldPosition;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Tick the event was emitted on (0 = contact).
    pub tick: u32,
    pub kind: PlayEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlayEventKind {
    /// Bat met ball; the play is live.
    Contact {
        exit_speed_mph: f32,
        vertical_angle_deg: f32,
        horizontal_angle_deg: f32,
    },
    /// First landing; carry and hang time are recorded exactly once.
    BallLanded { carry_m: f32, hang_time_s: f32 },
    BallRolledDead,
    BallLeftField { fair: bool },
    BallHitWall,
    BallHitFoulPole,
    RolesAssigned { playing_ball: FieldPosition },
    CalledOff {
        off: FieldPosition,
        by: FieldPosition,
    },
    FieldedCleanly { fielder: FieldPosition },
    CaughtInFlight { fielder: FieldPosition },
    Bobbled { fielder: FieldPosition },
    FieldingMiss { fielder: FieldPosition },
    ThrowReleased {
        from: FieldPosition,
        to: FieldPosition,
        base: Base,
        distance_m: f32,
    },
    ThrowArrived { base: Base },
    RelayStarted { via: FieldPosition },
    RunnerTookOff { runner: String, toward: Base },
    RunnerRounded { runner: String, past: Base },
    RunnerHeld { runner: String, at_pct: f32 },
    RunnerRetreating { runner: String, toward: Base },
    RunnerSafe { runner: String, base: Base },
    RunnerOut { runner: String, base: Base },
    RunScored { runner: String },
    RunsDiscarded { count: u8 },
    /// An umpire call, with the unbiased truth kept for scoring accuracy.
    UmpireCall {
        base: Option<Base>,
        called_out: bool,
        true_out: bool,
        margin_s: f32,
    },
    CatchRuled { caught: bool, true_catch: bool },
    FoulBall,
    PlayResolved { outcome: PlayOutcome },
}
