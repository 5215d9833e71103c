//! The per-tick state machine.
//!
//! Every Live tick executes the same fixed sequence: ball, runners,
//! fielders, fielding-or-throw decision, throw flight, arrival
//! adjudication, dead-ball determination. Within the fielder pass the
//! processing order is corner infielders, middle infielders, outfielders,
//! then the battery; later agents legitimately read decisions earlier
//! agents just made this tick, so the order is a correctness requirement.

use crate::error::{PlayError, Result};
use crate::models::event::PlayEventKind;
use crate::models::outcome::Base;
use crate::models::player::FieldPosition;

use crate::engine::baserunner::RunnerState;
use crate::engine::fielder::FielderIntent;
use crate::engine::physics_constants::tick;

use super::{PlayPhase, PlayingAction};

/// Within-tick agent processing order: corner infielders, middle
/// infielders, outfielders, battery.
pub(crate) const AGENT_ORDER: [FieldPosition; 9] = [
    FieldPosition::ThirdBase,
    FieldPosition::FirstBase,
    FieldPosition::SecondBase,
    FieldPosition::Shortstop,
    FieldPosition::LeftField,
    FieldPosition::CenterField,
    FieldPosition::RightField,
    FieldPosition::Catcher,
    FieldPosition::Pitcher,
];

impl PlayingAction {
    pub(crate) fn step_tick(&mut self) -> Result<()> {
        self.tick += 1;
        self.clock_s += tick::DT;

        match self.phase {
            PlayPhase::Setup => Err(PlayError::InvariantViolation(
                "tick before the play was started".into(),
            )),
            PlayPhase::Resolved => Ok(()),
            PlayPhase::PreContact { ticks_left } => {
                self.fly_ball_step()?;
                self.advance_batter_runner();
                let left = ticks_left.saturating_sub(1);
                if left == 0 {
                    self.enter_live()?;
                } else {
                    self.phase = PlayPhase::PreContact { ticks_left: left };
                }
                Ok(())
            }
            PlayPhase::Live => self.live_tick(),
        }
    }

    fn live_tick(&mut self) -> Result<()> {
        // (1) Ball flight, unless a fielder already has it.
        self.fly_ball_step()?;

        // (2) Baserunners, lead runner first.
        self.advance_runners()?;

        // (3) Fielder movement, in dependency order.
        self.move_fielders();

        // (4) With no throw pending: fielding attempts, or the holder's
        // throw/on-foot decision.
        if self.throw.is_none() {
            match self.holder {
                Some(holder) if self.fielder(holder).intent == FielderIntent::Throwing => {
                    self.decide_with_ball(holder)?;
                }
                Some(_) => {}
                None => self.attempt_fielding_phase()?,
            }
        }

        // (5) Advance the in-flight throw. On-foot approaches already
        // moved with their fielder in (3).
        if let Some(throw) = self.throw.as_mut() {
            throw.step(tick::DT);
        }

        // (6) Adjudicate anything that just reached its target.
        self.resolve_arrivals()?;

        // (7) Dead ball / home run / foul determination.
        self.resolve_dead_ball()?;

        self.check_invariants()
    }

    /// Advance ball physics one tick and surface any state transitions.
    fn fly_ball_step(&mut self) -> Result<()> {
        if !self.ball.in_motion() {
            return Ok(());
        }
        let was_landed = self.ball.landed;
        let was_stopped = self.ball.stopped;
        let was_wall = self.ball.contacted_wall;
        let was_out = self.ball.left_playing_field;

        self.ball.step(tick::DT);

        if !was_landed && self.ball.landed {
            let landing = self.ball.landing.expect("landing record set on first touch");
            self.events.push(
                self.tick,
                PlayEventKind::BallLanded {
                    carry_m: landing.carry_m,
                    hang_time_s: landing.hang_time_s,
                },
            );
            self.on_ball_landed();
        }
        if !was_wall && self.ball.contacted_wall {
            self.events.push(self.tick, PlayEventKind::BallHitWall);
            // The rebound invalidated every cached read of the ball.
            self.projection = None;
            self.reassign_on_new_read()?;
        }
        if !was_out && self.ball.left_playing_field {
            if self.ball.contacted_foul_pole {
                self.events.push(self.tick, PlayEventKind::BallHitFoulPole);
            }
            self.events.push(
                self.tick,
                PlayEventKind::BallLeftField {
                    fair: self.ball.launched_fair() || self.ball.contacted_foul_pole,
                },
            );
        }
        if !was_stopped && self.ball.stopped {
            self.events.push(self.tick, PlayEventKind::BallRolledDead);
        }
        Ok(())
    }

    /// The batter-runner leaves the box at contact; his calibrated
    /// home-to-first speed already folds in the swing follow-through.
    fn advance_batter_runner(&mut self) {
        let batter = &mut self.runners[0];
        if batter.state == RunnerState::NotYetRunning {
            batter.state = RunnerState::FullSpeed;
            self.events.push(
                self.tick,
                PlayEventKind::RunnerTookOff {
                    runner: batter.name.clone(),
                    toward: Base::First,
                },
            );
        }
        let step = self.runners[0].full_step_pct();
        let batter = &mut self.runners[0];
        if batter.state == RunnerState::FullSpeed {
            batter.pct = (batter.pct + step).min(1.0);
        }
    }

    /// Transition into the Live phase: everyone reads the ball and takes
    /// a role.
    fn enter_live(&mut self) -> Result<()> {
        self.phase = PlayPhase::Live;
        self.projection = Some(self.ball.project());
        self.assign_roles()?;
        self.init_runner_modes();
        Ok(())
    }
}
