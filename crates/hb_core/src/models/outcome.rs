//! Terminal play classification and the record handed to collaborators.

use serde::{Deserialize, Serialize};

use super::event::PlayEvent;
use super::stats::StatSheet;

/// Bases a runner can be moving toward. `Home` is a valid target but never
/// an occupancy slot; a runner arriving there scores and leaves the bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    First,
    Second,
    Third,
    Home,
}

impl Base {
    /// The next base toward home, if any.
    pub fn next(self) -> Option<Base> {
        match self {
            Base::First => Some(Base::Second),
            Base::Second => Some(Base::Third),
            Base::Third => Some(Base::Home),
            Base::Home => None,
        }
    }

    /// Occupancy slot index for First/Second/Third.
    pub fn slot(self) -> Option<usize> {
        match self {
            Base::First => Some(0),
            Base::Second => Some(1),
            Base::Third => Some(2),
            Base::Home => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Base::First => "1B",
            Base::Second => "2B",
            Base::Third => "3B",
            Base::Home => "HOME",
        }
    }
}

/// Terminal classification of a resolved play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayOutcome {
    FlyOut,
    ForceOut,
    TagOut,
    DoublePlay,
    TriplePlay,
    FieldersChoice,
    Single,
    Double,
    Triple,
    HomeRun,
    GroundRuleDouble,
    FoulBall,
}

impl PlayOutcome {
    /// True when the batter is credited with a hit.
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            PlayOutcome::Single
                | PlayOutcome::Double
                | PlayOutcome::Triple
                | PlayOutcome::HomeRun
                | PlayOutcome::GroundRuleDouble
        )
    }

    /// True when the batter's at-bat ended in an out.
    pub fn batter_out(self) -> bool {
        matches!(
            self,
            PlayOutcome::FlyOut
                | PlayOutcome::ForceOut
                | PlayOutcome::TagOut
                | PlayOutcome::DoublePlay
                | PlayOutcome::TriplePlay
        )
    }
}

/// Everything a collaborator needs after the play is dead: classification,
/// scoring, the new base state, per-agent statistics and the ordered event
/// log. The event log is descriptive only; observers must not feed it back
/// into simulation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayRecord {
    pub outcome: PlayOutcome,
    /// Runs that actually counted.
    pub runs: u8,
    /// Outs recorded during this play.
    pub outs_recorded: u8,
    /// Total outs after the play.
    pub outs_after: u8,
    /// Occupant names for first/second/third after the play.
    pub bases_after: [Option<String>; 3],
    pub stats: StatSheet,
    pub events: Vec<PlayEvent>,
    /// Live ticks consumed before the play resolved.
    pub ticks: u32,
    /// Seed the play was resolved under; replaying with it reproduces the
    /// play bit for bit.
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_chain_ends_at_home() {
        assert_eq!(Base::First.next(), Some(Base::Second));
        assert_eq!(Base::Third.next(), Some(Base::Home));
        assert_eq!(Base::Home.next(), None);
    }

    #[test]
    fn test_hit_and_out_are_exclusive() {
        let all = [
            PlayOutcome::FlyOut,
            PlayOutcome::ForceOut,
            PlayOutcome::TagOut,
            PlayOutcome::DoublePlay,
            PlayOutcome::TriplePlay,
            PlayOutcome::FieldersChoice,
            PlayOutcome::Single,
            PlayOutcome::Double,
            PlayOutcome::Triple,
            PlayOutcome::HomeRun,
            PlayOutcome::GroundRuleDouble,
            PlayOutcome::FoulBall,
        ];
        for outcome in all {
            assert!(!(outcome.is_hit() && outcome.batter_out()), "{:?}", outcome);
        }
    }
}
