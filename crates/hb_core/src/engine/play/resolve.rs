//! Putout adjudication and dead-ball determination.
//!
//! Step (6) of the tick: anything that just reached its target (a throw,
//! or a fielder carrying the ball to a base) goes to the umpire. Step
//! (7): home run, ground-rule, foul and third-out determinations, any of
//! which flips the play to Resolved. After that no component mutates
//! shared state.

use crate::error::Result;
use crate::models::event::PlayEventKind;
use crate::models::outcome::{Base, PlayOutcome};
use crate::models::player::FieldPosition;

use crate::engine::baserunner::RunnerState;
use crate::engine::fielder::FielderIntent;
use crate::engine::geometry;
use crate::engine::physics_constants::throwing as throw_consts;
use crate::engine::throwing::PutoutAttempt;

use super::tick::AGENT_ORDER;
use super::{OutKind, PlayPhase, PlayingAction};

/// A runner contesting a base, from the umpire's point of view.
#[derive(Clone, Copy, Debug)]
struct Contest {
    runner_idx: usize,
    /// When the runner reaches (or reached) the base.
    runner_time_s: f32,
    is_force: bool,
    out_kind: OutKind,
}

impl PlayingAction {
    // =========================================================
    // Step 6: arrivals
    // =========================================================

    pub(crate) fn resolve_arrivals(&mut self) -> Result<()> {
        if self.phase == PlayPhase::Resolved {
            return Ok(());
        }
        self.resolve_throw_arrival()?;
        if self.phase == PlayPhase::Resolved {
            return Ok(());
        }
        self.resolve_on_foot_arrivals()
    }

    fn resolve_throw_arrival(&mut self) -> Result<()> {
        let arrived = self.throw.as_ref().map(|t| t.resolved).unwrap_or(false);
        if !arrived {
            return Ok(());
        }
        let throw = self.throw.take().expect("checked above");
        self.events
            .push(self.tick, PlayEventKind::ThrowArrived { base: throw.target_base });

        let receiver = throw.receiver;
        // The receiver gloves it wherever it was aimed; a wild throw has
        // already cost handling time below.
        self.fielder_mut(receiver).loc = throw.dest;
        self.fielder_mut(receiver).has_ball = true;
        self.holder = Some(receiver);

        if throw.is_relay {
            // Cut-off man turns and decides next tick.
            self.fielder_mut(receiver).intent = FielderIntent::Throwing;
            return Ok(());
        }

        let ball_time = self.clock_s + throw.handling_delay_s();
        let base = throw.target_base;
        self.fielder_mut(receiver).intent = FielderIntent::Throwing;
        self.adjudicate_putout(PutoutAttempt::Thrown(throw), base, receiver, ball_time)
    }

    fn resolve_on_foot_arrivals(&mut self) -> Result<()> {
        let mut approach: Option<(FieldPosition, Base)> = None;
        for pos in AGENT_ORDER {
            let f = self.fielder(pos);
            if let FielderIntent::RunningToBase(base) = f.intent {
                if f.has_ball && f.loc.distance(geometry::base_position(base)) < 0.1 {
                    approach = Some((pos, base));
                    break;
                }
            }
        }
        let Some((pos, base)) = approach else {
            return Ok(());
        };
        self.fielder_mut(pos).intent = FielderIntent::Throwing;
        let ball_time = self.clock_s;
        self.adjudicate_putout(PutoutAttempt::OnFoot(pos), base, pos, ball_time)
    }

    /// Put the attempt in front of the umpire, if anyone is contesting
    /// the base; otherwise the receiver just holds the ball.
    fn adjudicate_putout(
        &mut self,
        attempt: PutoutAttempt,
        base: Base,
        receiver: FieldPosition,
        ball_time_s: f32,
    ) -> Result<()> {
        let Some(contest) = self.find_contest(base) else {
            return Ok(());
        };

        let effective_ball_time = if contest.is_force {
            ball_time_s
        } else {
            // A tag has to be applied, not just caught.
            ball_time_s + throw_consts::TAG_APPLY_S
        };
        let margin = contest.runner_time_s - effective_ball_time;
        let call = self
            .umpire
            .call_timing(&mut self.rng, Some(base), margin);
        self.events.push(
            self.tick,
            PlayEventKind::UmpireCall {
                base: Some(base),
                called_out: call.called_out,
                true_out: call.true_out,
                margin_s: call.margin_s,
            },
        );

        if call.called_out {
            let assist_to: Vec<FieldPosition> = match &attempt {
                PutoutAttempt::Thrown(_) => self
                    .assist_chain
                    .iter()
                    .copied()
                    .filter(|p| *p != receiver)
                    .collect(),
                PutoutAttempt::OnFoot(_) => Vec::new(),
            };
            self.runner_out(contest.runner_idx, base, contest.out_kind, receiver, &assist_to)?;
        }
        Ok(())
    }

    /// Find the runner contesting a base: advancing to it, scrambling
    /// back to it, or having just arrived there in a bang-bang window.
    fn find_contest(&self, base: Base) -> Option<Contest> {
        // Advancing runner headed here.
        for (idx, r) in self.runners.iter().enumerate() {
            if r.state == RunnerState::FullSpeed && r.target == base {
                let force = r.forced || (r.is_batter && base == Base::First);
                return Some(Contest {
                    runner_idx: idx,
                    runner_time_s: self.clock_s + r.time_to_target_s(),
                    is_force: force,
                    out_kind: if force { OutKind::Force } else { OutKind::Tag },
                });
            }
        }
        // Runner caught off his base, coming back. After a catch the bag
        // itself retires him (double-off); otherwise he has to be tagged.
        for (idx, r) in self.runners.iter().enumerate() {
            let off_base = matches!(r.state, RunnerState::Retreating | RunnerState::Tentative)
                && r.pct > 0.0;
            if off_base && r.origin == base {
                let doubled = r.forced_to_retreat;
                return Some(Contest {
                    runner_idx: idx,
                    runner_time_s: self.clock_s + r.time_to_retreat_s(),
                    is_force: doubled,
                    out_kind: if doubled { OutKind::DoubleOff } else { OutKind::Tag },
                });
            }
        }
        // Bang-bang: the runner got there moments ago; the margin is his
        // recorded arrival against the ball.
        for (idx, r) in self.runners.iter().enumerate() {
            if r.state == RunnerState::OnBase && r.origin == base {
                if let Some(arrived) = r.arrived_at_s {
                    if self.clock_s - arrived <= 0.5 {
                        let force = r.forced || (r.is_batter && base == Base::First);
                        return Some(Contest {
                            runner_idx: idx,
                            runner_time_s: arrived,
                            is_force: force,
                            out_kind: if force { OutKind::Force } else { OutKind::Tag },
                        });
                    }
                }
            }
        }
        None
    }

    fn runner_out(
        &mut self,
        idx: usize,
        base: Base,
        kind: OutKind,
        putout_to: FieldPosition,
        assists: &[FieldPosition],
    ) -> Result<()> {
        let name = self.runners[idx].name.clone();
        self.runners[idx].state = RunnerState::Out;
        if let Some(slot) = base.slot() {
            if self.slots[slot] == Some(idx) {
                self.slots[slot] = None;
            }
        }
        // An out at the plate can never have produced a run.
        if base == Base::Home {
            self.run_queue.retain(|(r, _)| *r != idx);
        }

        self.outs_recorded += 1;
        self.outs_detail.push(kind);
        if idx == 0 {
            self.batter_out_kind = Some(kind);
        }
        self.stats.credit_putout(putout_to);
        for assist in assists {
            self.stats.credit_assist(*assist);
        }
        self.events
            .push(self.tick, PlayEventKind::RunnerOut { runner: name, base });

        self.recompute_forces();

        if self.total_outs() >= 3 {
            self.third_out_at = Some(self.clock_s);
            self.finish_from_outs()?;
        }
        Ok(())
    }

    // =========================================================
    // Step 7: dead-ball determination
    // =========================================================

    pub(crate) fn resolve_dead_ball(&mut self) -> Result<()> {
        if self.phase == PlayPhase::Resolved {
            return Ok(());
        }

        if self.ball.left_playing_field {
            return self.resolve_ball_out_of_field();
        }

        // Foul determination. In this model the spray angle fixes
        // fair/foul; a foul ball dies as soon as it can no longer be
        // caught, a dropped foul fly included.
        if self.ball.in_foul_territory && self.ball.fielded_by().is_none() && !self.ball.caught {
            let bound_window_open = self.rules.bound_catch_is_out
                && self.ball.bounce_count < 2
                && !self.ball.stopped;
            let dead = !bound_window_open
                && (self.ball.landed || self.ball.stopped || self.ball.bobbled);
            if dead {
                self.events.push(self.tick, PlayEventKind::FoulBall);
                self.finish(PlayOutcome::FoulBall);
            }
        }
        Ok(())
    }

    fn resolve_ball_out_of_field(&mut self) -> Result<()> {
        let fair = self.ball.contacted_foul_pole || self.ball.launched_fair();
        if !fair {
            // Into the stands on the foul side: dead, strike territory.
            self.events.push(self.tick, PlayEventKind::FoulBall);
            self.finish(PlayOutcome::FoulBall);
            return Ok(());
        }

        if self.ball.bounce_count == 0 {
            // Over the wall on the fly: everybody trots home.
            for idx in 0..self.runners.len() {
                let r = &self.runners[idx];
                if r.state == RunnerState::Out || r.scored {
                    continue;
                }
                let name = self.runners[idx].name.clone();
                self.run_queue.push((idx, self.clock_s));
                let r = &mut self.runners[idx];
                r.scored = true;
                r.state = RunnerState::OnBase;
                self.events
                    .push(self.tick, PlayEventKind::RunScored { runner: name });
            }
            self.slots = [None, None, None];
            self.finish(PlayOutcome::HomeRun);
            return Ok(());
        }

        // Bounced over: two bases for everyone.
        self.slots = [None, None, None];
        for idx in 0..self.runners.len() {
            let origin = self.runners[idx].origin;
            if self.runners[idx].state == RunnerState::Out || self.runners[idx].scored {
                continue;
            }
            let awarded = match origin {
                Base::Home => Some(Base::Second),
                Base::First => Some(Base::Third),
                Base::Second | Base::Third => None,
            };
            match awarded {
                Some(base) => {
                    let slot = base.slot().expect("award slots are bases");
                    self.slots[slot] = Some(idx);
                    let r = &mut self.runners[idx];
                    r.state = RunnerState::OnBase;
                    r.origin = base;
                    r.pct = 0.0;
                }
                None => {
                    let name = self.runners[idx].name.clone();
                    self.run_queue.push((idx, self.clock_s));
                    let r = &mut self.runners[idx];
                    r.scored = true;
                    r.state = RunnerState::OnBase;
                    self.events
                        .push(self.tick, PlayEventKind::RunScored { runner: name });
                }
            }
        }
        self.finish(PlayOutcome::GroundRuleDouble);
        Ok(())
    }

    // =========================================================
    // Terminal classification
    // =========================================================

    /// The pitcher holds the ball with nobody threatened: dead ball,
    /// classify whatever happened.
    pub(crate) fn finish_quiet(&mut self) -> Result<()> {
        let outcome = self.classify();
        self.finish(outcome);
        Ok(())
    }

    pub(crate) fn finish_from_outs(&mut self) -> Result<()> {
        let outcome = self.classify();
        self.finish(outcome);
        Ok(())
    }

    fn classify(&self) -> PlayOutcome {
        let caught = self.outs_detail.contains(&OutKind::Catch);
        match self.outs_recorded {
            0 => {
                let batter = &self.runners[0];
                if batter.scored {
                    PlayOutcome::HomeRun
                } else {
                    match batter.origin {
                        Base::Third => PlayOutcome::Triple,
                        Base::Second => PlayOutcome::Double,
                        Base::First => PlayOutcome::Single,
                        Base::Home => PlayOutcome::FoulBall,
                    }
                }
            }
            1 => {
                if caught {
                    PlayOutcome::FlyOut
                } else if self.runners[0].state == RunnerState::Out {
                    match self.batter_out_kind {
                        Some(OutKind::Tag) => PlayOutcome::TagOut,
                        _ => PlayOutcome::ForceOut,
                    }
                } else {
                    PlayOutcome::FieldersChoice
                }
            }
            2 => PlayOutcome::DoublePlay,
            _ => PlayOutcome::TriplePlay,
        }
    }

    pub(crate) fn finish(&mut self, outcome: PlayOutcome) {
        // A foul ball sends everybody back where they started.
        self.settle_stragglers(outcome == PlayOutcome::FoulBall);
        self.outcome = Some(outcome);
        self.phase = PlayPhase::Resolved;
        self.events
            .push(self.tick, PlayEventKind::PlayResolved { outcome });
    }

    /// Any runner still in motion when the ball goes dead settles where
    /// the dead ball puts him: his target once committed past the
    /// midpoint, his origin otherwise (always his origin on a foul).
    /// Keeps terminal occupancy coherent on every terminal path.
    fn settle_stragglers(&mut self, revert_to_origin: bool) {
        for idx in 0..self.runners.len() {
            let r = &self.runners[idx];
            if r.is_settled() || r.scored {
                continue;
            }
            let base = if revert_to_origin {
                r.origin
            } else {
                match r.state {
                    RunnerState::FullSpeed if r.pct >= 0.5 => r.target,
                    _ => r.origin,
                }
            };
            if base == Base::Home {
                // The batter never earned a base (foul, or the play died
                // under him); he goes back to the plate.
                self.runners[idx].state = RunnerState::OnBase;
                continue;
            }
            if let Some(slot) = base.slot() {
                if self.slots[slot].is_none() {
                    self.slots[slot] = Some(idx);
                }
            }
            let r = &mut self.runners[idx];
            r.state = RunnerState::OnBase;
            r.origin = base;
            r.pct = 0.0;
        }
    }
}
