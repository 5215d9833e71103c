//! The play orchestrator.
//!
//! `PlayingAction` is the aggregate root for one live-ball sequence. It
//! owns every piece of mutable state (ball, throw, fielders, runners,
//! assignment board, event log) and advances them in lockstep 0.1s ticks
//! until the play is dead. Nothing is shared across plays; plays are
//! strictly sequential.
//!
//! The impl is split the same way the state is used:
//! - `tick.rs` - the per-tick state machine
//! - `fielding.rs` - role assignment, call-offs, fielding acts, throws
//! - `baserunning.rs` - runner decisions
//! - `resolve.rs` - putout adjudication and dead-ball determination

mod baserunning;
mod fielding;
mod resolve;
mod tick;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PlayError, Result};
use crate::models::event::PlayEventKind;
use crate::models::outcome::{Base, PlayOutcome, PlayRecord};
use crate::models::player::{BatterCard, Count, FieldPosition, FielderCard, RulesInEffect, RunnerCard};
use crate::models::stats::StatSheet;

use super::baserunner::{Runner, RunnerState};
use super::batted_ball::{BattedBall, ContactParams, Projection};
use super::events::EventLog;
use super::fielder::{Fielder, FielderIntent};
use super::throwing::Throw;
use super::umpire::UmpireProfile;

/// Everything the engine needs to resolve one play, supplied by the
/// surrounding at-bat/game layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaySetup {
    pub seed: u64,
    pub batter: BatterCard,
    /// Exactly nine fielders, one per position.
    pub fielders: Vec<FielderCard>,
    pub on_first: Option<RunnerCard>,
    pub on_second: Option<RunnerCard>,
    pub on_third: Option<RunnerCard>,
    pub outs: u8,
    pub count: Count,
    pub rules: RulesInEffect,
    pub umpire: UmpireProfile,
    pub contact: ContactParams,
}

/// Orchestrator phases. PreContact models the pitch follow-through and
/// defensive reaction window before anyone but the ball moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayPhase {
    Setup,
    PreContact { ticks_left: u32 },
    Live,
    Resolved,
}

/// What kind of out was recorded; drives classification and the
/// no-run-on-third-out rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutKind {
    Force,
    Tag,
    Catch,
    /// Runner doubled off his base after a catch.
    DoubleOff,
}

/// Base -> covering fielder map plus the single playing-ball slot,
/// owned by the orchestrator. Being the only writer of fielder intents,
/// it makes "two fielders both playing the ball" unrepresentable.
#[derive(Clone, Debug, Default)]
pub struct AssignmentBoard {
    playing_ball: Option<FieldPosition>,
    covering: [Option<FieldPosition>; 4],
    pub cutoff: Option<FieldPosition>,
}

impl AssignmentBoard {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playing_ball(&self) -> Option<FieldPosition> {
        self.playing_ball
    }

    pub fn set_playing_ball(&mut self, pos: FieldPosition) -> Option<FieldPosition> {
        self.playing_ball.replace(pos)
    }

    pub fn who_covers(&self, base: Base) -> Option<FieldPosition> {
        self.covering[Self::idx(base)]
    }

    /// Claim a base. Returns false (and leaves the board untouched) when
    /// somebody already has it.
    pub fn claim_base(&mut self, base: Base, pos: FieldPosition) -> bool {
        let slot = &mut self.covering[Self::idx(base)];
        if slot.is_some() {
            return false;
        }
        *slot = Some(pos);
        true
    }

    fn idx(base: Base) -> usize {
        match base {
            Base::First => 0,
            Base::Second => 1,
            Base::Third => 2,
            Base::Home => 3,
        }
    }
}

/// The aggregate root for one plate-appearance's live-ball sequence.
pub struct PlayingAction {
    pub(crate) rng: ChaCha8Rng,
    original_seed: u64,
    pub(crate) rules: RulesInEffect,
    pub(crate) umpire: UmpireProfile,
    outs_before: u8,

    pub(crate) phase: PlayPhase,
    pub(crate) tick: u32,
    pub(crate) clock_s: f32,

    pub(crate) ball: BattedBall,
    /// Cached forward projection of the ball; rebuilt whenever the ball
    /// is deflected (bobble, wall).
    pub(crate) projection: Option<Projection>,
    /// At most one throw is in flight at a time; a relay replaces it.
    pub(crate) throw: Option<Throw>,

    pub(crate) fielders: Vec<Fielder>,
    pub(crate) board: AssignmentBoard,
    /// Current holder of the live ball, if any fielder has it in hand.
    pub(crate) holder: Option<FieldPosition>,
    /// Fielders who have touched throws since the ball was fielded;
    /// credited with assists on a putout.
    pub(crate) assist_chain: Vec<FieldPosition>,

    pub(crate) runners: Vec<Runner>,
    /// Runner safely occupying first/second/third, by runner index.
    pub(crate) slots: [Option<usize>; 3],

    pub(crate) outs_recorded: u8,
    pub(crate) outs_detail: Vec<OutKind>,
    pub(crate) batter_out_kind: Option<OutKind>,
    /// Provisional runs: (runner index, clock when home was touched).
    /// Confirmed or discarded at resolution.
    pub(crate) run_queue: Vec<(usize, f32)>,
    pub(crate) third_out_at: Option<f32>,

    pub(crate) events: EventLog,
    pub(crate) stats: StatSheet,
    pub(crate) outcome: Option<PlayOutcome>,
    consumed: bool,
}

impl PlayingAction {
    pub fn new(setup: PlaySetup) -> Result<Self> {
        if setup.fielders.len() != 9 {
            return Err(PlayError::InvalidSetup(format!(
                "expected 9 fielders, got {}",
                setup.fielders.len()
            )));
        }
        if setup.outs >= 3 {
            return Err(PlayError::InvalidSetup(format!(
                "play cannot start with {} outs",
                setup.outs
            )));
        }

        // One fielder per position, stored in scorekeeping index order.
        let mut fielders: Vec<Option<Fielder>> = (0..9).map(|_| None).collect();
        for card in &setup.fielders {
            let idx = card.position.index();
            if fielders[idx].is_some() {
                return Err(PlayError::InvalidSetup(format!(
                    "duplicate fielder at {}",
                    card.position.code()
                )));
            }
            fielders[idx] = Some(Fielder::from_card(card));
        }
        let fielders: Vec<Fielder> = fielders.into_iter().map(|f| f.unwrap()).collect();

        let mut runners = Vec::new();
        let mut slots: [Option<usize>; 3] = [None, None, None];

        // Batter-runner is always runner 0.
        runners.push(Runner::new(
            setup.batter.name.clone(),
            Base::Home,
            Base::First,
            setup.batter.running,
        ));

        let mut add_occupant = |card: &Option<RunnerCard>, base: Base, runners: &mut Vec<Runner>| {
            if let Some(card) = card {
                let target = base.next().expect("occupied bases always have a next");
                let mut runner = Runner::new(card.name.clone(), base, target, card.attributes);
                runner.state = RunnerState::NotYetRunning;
                runners.push(runner);
                let idx = runners.len() - 1;
                slots[base.slot().expect("occupancy base")] = Some(idx);
            }
        };
        add_occupant(&setup.on_first, Base::First, &mut runners);
        add_occupant(&setup.on_second, Base::Second, &mut runners);
        add_occupant(&setup.on_third, Base::Third, &mut runners);

        // Force chain: a runner is forced when every base behind him is
        // occupied down to the batter.
        let first_occupied = setup.on_first.is_some();
        let second_occupied = setup.on_second.is_some();
        for runner in runners.iter_mut() {
            runner.forced = match runner.origin {
                Base::Home => true,
                Base::First => true,
                Base::Second => first_occupied,
                Base::Third => first_occupied && second_occupied,
            };
        }

        let ball = BattedBall::from_contact(setup.contact);
        let mut events = EventLog::new();
        events.push(
            0,
            PlayEventKind::Contact {
                exit_speed_mph: setup.contact.exit_speed_mph,
                vertical_angle_deg: setup.contact.vertical_angle_deg,
                horizontal_angle_deg: setup.contact.horizontal_angle_deg,
            },
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(setup.seed),
            original_seed: setup.seed,
            rules: setup.rules,
            umpire: setup.umpire,
            outs_before: setup.outs,
            phase: PlayPhase::Setup,
            tick: 0,
            clock_s: 0.0,
            ball,
            projection: None,
            throw: None,
            fielders,
            board: AssignmentBoard::default(),
            holder: None,
            assist_chain: Vec::new(),
            runners,
            slots,
            outs_recorded: 0,
            outs_detail: Vec::new(),
            batter_out_kind: None,
            run_queue: Vec::new(),
            third_out_at: None,
            events,
            stats: StatSheet::default(),
            outcome: None,
            consumed: false,
        })
    }

    /// Run the play to resolution and build the record. Calling this on
    /// an already-resolved play is an invariant violation, not a no-op:
    /// a stale reference mutating a dead play would corrupt statistics.
    pub fn run(&mut self) -> Result<PlayRecord> {
        if self.consumed || self.phase == PlayPhase::Resolved {
            return Err(PlayError::InvariantViolation(
                "re-entrant run() on a resolved play".into(),
            ));
        }
        if self.phase == PlayPhase::Setup {
            self.phase = PlayPhase::PreContact {
                ticks_left: super::physics_constants::tick::PRE_CONTACT_TICKS,
            };
        }

        while self.phase != PlayPhase::Resolved {
            if self.tick >= super::physics_constants::tick::MAX_TICKS {
                return Err(PlayError::TickLimitExceeded { ticks: self.tick });
            }
            self.step_tick()?;
        }
        self.consumed = true;
        Ok(self.build_record())
    }

    /// Advance one tick; public so tests and observers can step the play
    /// and inspect intermediate state. Returns true once resolved.
    pub fn tick_once(&mut self) -> Result<bool> {
        if self.consumed {
            return Err(PlayError::InvariantViolation(
                "tick on a consumed play".into(),
            ));
        }
        if self.phase == PlayPhase::Setup {
            self.phase = PlayPhase::PreContact {
                ticks_left: super::physics_constants::tick::PRE_CONTACT_TICKS,
            };
        }
        if self.phase == PlayPhase::Resolved {
            return Ok(true);
        }
        if self.tick >= super::physics_constants::tick::MAX_TICKS {
            return Err(PlayError::TickLimitExceeded { ticks: self.tick });
        }
        self.step_tick()?;
        Ok(self.phase == PlayPhase::Resolved)
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn fielders(&self) -> &[Fielder] {
        &self.fielders
    }

    pub fn ball(&self) -> &BattedBall {
        &self.ball
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn board(&self) -> &AssignmentBoard {
        &self.board
    }

    pub(crate) fn fielder(&self, pos: FieldPosition) -> &Fielder {
        &self.fielders[pos.index()]
    }

    pub(crate) fn fielder_mut(&mut self, pos: FieldPosition) -> &mut Fielder {
        &mut self.fielders[pos.index()]
    }

    /// Total outs including those carried into the play.
    pub(crate) fn total_outs(&self) -> u8 {
        self.outs_before + self.outs_recorded
    }

    /// Tick-level invariant sweep; cheap, run every tick. A violation
    /// aborts the play rather than corrupting statistics.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        let playing = self
            .fielders
            .iter()
            .filter(|f| f.intent == FielderIntent::PlayingBall)
            .count();
        if playing > 1 {
            return Err(PlayError::InvariantViolation(format!(
                "{} fielders playing the ball after call-off resolution",
                playing
            )));
        }
        if self.ball.bobbled && self.ball.fielded_by().is_some() {
            return Err(PlayError::InvariantViolation(
                "ball both bobbled and fielded".into(),
            ));
        }
        for (a, occ_a) in self.slots.iter().enumerate() {
            if let Some(idx) = occ_a {
                if *idx >= self.runners.len() {
                    return Err(PlayError::InvariantViolation(
                        "base slot holds a dangling runner handle".into(),
                    ));
                }
                for occ_b in self.slots.iter().skip(a + 1) {
                    if occ_b == occ_a {
                        return Err(PlayError::InvariantViolation(format!(
                            "runner {} occupies two base slots",
                            self.runners[*idx].name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn build_record(&mut self) -> PlayRecord {
        let outcome = self.outcome.unwrap_or(PlayOutcome::FoulBall);

        // Confirm the provisional run queue (resolve.rs already discarded
        // what a catch or third-out force invalidates).
        let runs = self.confirmed_runs();
        self.stats.batter.hit = outcome.is_hit();
        self.stats.batter.out = outcome.batter_out();
        self.stats.batter.runs_batted_in = runs;

        let bases_after = [
            self.slots[0].map(|i| self.runners[i].name.clone()),
            self.slots[1].map(|i| self.runners[i].name.clone()),
            self.slots[2].map(|i| self.runners[i].name.clone()),
        ];

        PlayRecord {
            outcome,
            runs,
            outs_recorded: self.outs_recorded,
            outs_after: self.total_outs(),
            bases_after,
            stats: self.stats.clone(),
            events: self.events.clone().into_vec(),
            ticks: self.tick,
            seed: self.original_seed,
        }
    }

    /// Runs that actually count. On a third out the kind matters: a
    /// force (or the batter retired, or a catch) kills every run on the
    /// play, while a tag third out is a time play that keeps runs which
    /// crossed before it.
    pub(crate) fn confirmed_runs(&self) -> u8 {
        match self.third_out_at {
            Some(cutoff) => match self.outs_detail.last() {
                Some(OutKind::Force) | Some(OutKind::Catch) => 0,
                _ => self
                    .run_queue
                    .iter()
                    .filter(|(_, at)| *at < cutoff)
                    .count() as u8,
            },
            None => self.run_queue.len() as u8,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::default_setup;
    use super::*;
    use crate::models::player::RunnerAttributes;

    #[test]
    fn test_setup_validation() {
        let mut setup = default_setup(
            1,
            ContactParams {
                exit_speed_mph: 90.0,
                vertical_angle_deg: 12.0,
                horizontal_angle_deg: 0.0,
            },
        );
        setup.fielders.pop();
        assert!(matches!(
            PlayingAction::new(setup),
            Err(PlayError::InvalidSetup(_))
        ));
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let mut setup = default_setup(
            1,
            ContactParams {
                exit_speed_mph: 90.0,
                vertical_angle_deg: 12.0,
                horizontal_angle_deg: 0.0,
            },
        );
        setup.fielders[1].position = FieldPosition::Pitcher;
        assert!(PlayingAction::new(setup).is_err());
    }

    #[test]
    fn test_rerun_is_invariant_violation() {
        let setup = default_setup(
            7,
            ContactParams {
                exit_speed_mph: 85.0,
                vertical_angle_deg: 8.0,
                horizontal_angle_deg: -12.0,
            },
        );
        let mut play = PlayingAction::new(setup).unwrap();
        play.run().unwrap();
        assert!(matches!(
            play.run(),
            Err(PlayError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_force_chain_setup() {
        let mut setup = default_setup(
            3,
            ContactParams {
                exit_speed_mph: 88.0,
                vertical_angle_deg: 5.0,
                horizontal_angle_deg: 10.0,
            },
        );
        setup.on_first = Some(RunnerCard {
            name: "r1".into(),
            attributes: RunnerAttributes::average(),
        });
        setup.on_third = Some(RunnerCard {
            name: "r3".into(),
            attributes: RunnerAttributes::average(),
        });
        let play = PlayingAction::new(setup).unwrap();
        let first_runner = play
            .runners()
            .iter()
            .find(|r| r.origin == Base::First)
            .unwrap();
        let third_runner = play
            .runners()
            .iter()
            .find(|r| r.origin == Base::Third)
            .unwrap();
        assert!(first_runner.forced);
        // Second base empty: the runner on third is not forced.
        assert!(!third_runner.forced);
    }
}
