//! Fielder decisions: role assignment, call-offs, movement goals,
//! fielding acts, and the throw/on-foot decision after possession.
//!
//! The role pass runs once when the play goes live, in the fixed
//! dependency order (corner infielders, middle infielders, outfielders,
//! battery): later positions read base coverage that earlier positions
//! just claimed. A bobble or wall rebound makes everyone re-read the
//! ball, which re-runs only the playing-ball assignment, not coverage.

use rand::Rng;
use tracing::trace;

use crate::error::{PlayError, Result};
use crate::models::event::PlayEventKind;
use crate::models::outcome::Base;
use crate::models::player::FieldPosition;

use crate::engine::baserunner::RunnerState;
use crate::engine::batted_ball::BallClass;
use crate::engine::fielder::FielderIntent;
use crate::engine::geometry::{self, Vec2, Vec3};
use crate::engine::physics_constants::{fielding, skills, throwing as throw_consts};
use crate::engine::throwing::{self, Throw};

use super::tick::AGENT_ORDER;
use super::{OutKind, PlayingAction};

/// One throw/on-foot option the ball holder weighs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ThreatOption {
    pub base: Base,
    pub runner_idx: usize,
    pub is_force: bool,
    /// Runner arrival minus throw arrival; positive means the defense
    /// wins the race.
    pub margin_throw_s: f32,
    /// Same, for carrying the ball there on foot.
    pub margin_foot_s: f32,
    pub distance_m: f32,
    /// True for a runner caught off his base after a catch.
    pub is_double_off: bool,
}

impl PlayingAction {
    // =========================================================
    // Role assignment
    // =========================================================

    pub(crate) fn assign_roles(&mut self) -> Result<()> {
        for f in self.fielders.iter_mut() {
            f.intent = FielderIntent::Idle;
            f.goal = None;
            f.called_off = false;
        }
        self.board.clear();

        let landing = self.landing_estimate();
        let owner = geometry::zone_owner(landing);
        self.board.set_playing_ball(owner);
        self.fielder_mut(owner).intent = FielderIntent::PlayingBall;

        for pos in AGENT_ORDER {
            if pos != owner {
                self.choose_support_role(pos, landing);
            }
        }

        self.call_off_pass()?;
        self.refresh_goals();

        let playing = self
            .board
            .playing_ball()
            .ok_or_else(|| PlayError::InvariantViolation("no fielder playing the ball".into()))?;
        self.events
            .push(self.tick, PlayEventKind::RolesAssigned { playing_ball: playing });
        Ok(())
    }

    /// Pick a non-playing role for one fielder given what earlier
    /// positions already claimed. The explicit defaults here mirror how
    /// real defenses resolve them.
    fn choose_support_role(&mut self, pos: FieldPosition, landing: Vec2) {
        let pulled_left = landing.x < 0.0;
        let deep = landing.y > fielding::INFIELD_DEPTH_M;
        let owner = self.board.playing_ball();
        let ss_playing = owner == Some(FieldPosition::Shortstop);
        let second_playing = owner == Some(FieldPosition::SecondBase);
        let scoring_threat = self.slots[1].is_some() || self.slots[2].is_some();

        let intent = match pos {
            FieldPosition::ThirdBase => {
                if self.board.claim_base(Base::Third, pos) {
                    FielderIntent::CoveringBase(Base::Third)
                } else {
                    FielderIntent::BackingUp(FieldPosition::ThirdBase)
                }
            }
            FieldPosition::FirstBase => {
                if self.board.claim_base(Base::First, pos) {
                    FielderIntent::CoveringBase(Base::First)
                } else {
                    FielderIntent::BackingUp(FieldPosition::FirstBase)
                }
            }
            FieldPosition::SecondBase => {
                // Covers second on balls pulled to the left half, or when
                // the shortstop is busy with the ball; otherwise takes
                // first unless it is already covered, in which case he is
                // the relay man or backs up first.
                if (pulled_left || ss_playing) && self.board.claim_base(Base::Second, pos) {
                    FielderIntent::CoveringBase(Base::Second)
                } else if self.board.claim_base(Base::First, pos) {
                    FielderIntent::CoveringBase(Base::First)
                } else if deep && self.board.cutoff.is_none() {
                    self.board.cutoff = Some(pos);
                    FielderIntent::Relay
                } else {
                    FielderIntent::BackingUp(FieldPosition::FirstBase)
                }
            }
            FieldPosition::Shortstop => {
                if (second_playing || !pulled_left) && self.board.claim_base(Base::Second, pos) {
                    FielderIntent::CoveringBase(Base::Second)
                } else if self.board.claim_base(Base::Third, pos) {
                    FielderIntent::CoveringBase(Base::Third)
                } else if self.board.claim_base(Base::Second, pos) {
                    FielderIntent::CoveringBase(Base::Second)
                } else if deep && self.board.cutoff.is_none() {
                    self.board.cutoff = Some(pos);
                    FielderIntent::Relay
                } else {
                    FielderIntent::BackingUp(FieldPosition::SecondBase)
                }
            }
            FieldPosition::LeftField | FieldPosition::CenterField | FieldPosition::RightField => {
                match owner {
                    Some(o) if o.is_outfielder() => FielderIntent::BackingUp(o),
                    // Infield ball: each outfielder trails the base on
                    // his side in case of an overthrow.
                    _ => match pos {
                        FieldPosition::LeftField => {
                            FielderIntent::BackingUp(FieldPosition::ThirdBase)
                        }
                        FieldPosition::CenterField => {
                            FielderIntent::BackingUp(FieldPosition::SecondBase)
                        }
                        _ => FielderIntent::BackingUp(FieldPosition::FirstBase),
                    },
                }
            }
            FieldPosition::Catcher => {
                if self.board.claim_base(Base::Home, pos) {
                    FielderIntent::CoveringBase(Base::Home)
                } else {
                    FielderIntent::BackingUp(FieldPosition::Catcher)
                }
            }
            FieldPosition::Pitcher => {
                if scoring_threat {
                    FielderIntent::BackingUp(FieldPosition::Catcher)
                } else if self.board.claim_base(Base::First, pos) {
                    FielderIntent::CoveringBase(Base::First)
                } else {
                    FielderIntent::BackingUp(FieldPosition::FirstBase)
                }
            }
        };
        self.fielder_mut(pos).intent = intent;
    }

    /// Probabilistic call-off cascade. A faster fielder may take the ball
    /// from the nominal owner, weighted by audacity; a fielder already on
    /// top of the ball cannot be called off.
    fn call_off_pass(&mut self) -> Result<()> {
        let deep = self.landing_estimate().y > fielding::INFIELD_DEPTH_M;

        // Priority order: on deep balls outfielders outrank infielders;
        // on shallow balls the infield has the right of way.
        let mut priority: Vec<FieldPosition> = AGENT_ORDER
            .iter()
            .copied()
            .filter(|p| !p.is_battery())
            .collect();
        if deep {
            priority.sort_by_key(|p| if p.is_outfielder() { 0 } else { 1 });
        }

        let mut current = match self.board.playing_ball() {
            Some(p) => p,
            None => return Ok(()),
        };

        for cand in priority {
            if cand == current {
                continue;
            }
            // Within ten feet of the ball nobody gets waved off.
            let owner_dist = self.fielder(current).loc.distance(self.ball.ground_pos());
            if owner_dist <= fielding::CALL_OFF_IMMUNITY_M {
                break;
            }
            let cur_t = self.effective_arrival_s(current);
            let cand_t = self.effective_arrival_s(cand);
            if cand_t + fielding::CALL_OFF_ADVANTAGE_S >= cur_t {
                continue;
            }
            let audacity = skills::normalize(self.fielder(cand).attributes.audacity);
            let p = fielding::CALL_OFF_BASE_PROB * (0.4 + 0.6 * audacity);
            if self.rng.gen::<f32>() >= p {
                continue;
            }

            self.events.push(
                self.tick,
                PlayEventKind::CalledOff {
                    off: current,
                    by: cand,
                },
            );
            self.fielder_mut(current).called_off = true;
            self.fielder_mut(current).intent = FielderIntent::Idle;
            self.board.set_playing_ball(cand);
            self.fielder_mut(cand).intent = FielderIntent::PlayingBall;
            let landing = self.landing_estimate();
            self.choose_support_role(current, landing);
            current = cand;
        }
        Ok(())
    }

    /// Re-read after a bobble or wall rebound: the ball's path changed,
    /// so whoever can get there soonest takes it. Coverage stands.
    pub(crate) fn reassign_on_new_read(&mut self) -> Result<()> {
        self.projection = Some(self.ball.project());

        let mut best: Option<(FieldPosition, f32)> = None;
        for pos in AGENT_ORDER {
            let t = self.effective_arrival_s(pos);
            if best.map(|(_, bt)| t < bt).unwrap_or(true) {
                best = Some((pos, t));
            }
        }
        let Some((new_owner, _)) = best else {
            return Ok(());
        };

        if self.board.playing_ball() != Some(new_owner) {
            if let Some(old) = self.board.playing_ball() {
                self.fielder_mut(old).intent = FielderIntent::Idle;
                let landing = self.landing_estimate();
                self.choose_support_role(old, landing);
            }
            self.board.set_playing_ball(new_owner);
            self.fielder_mut(new_owner).intent = FielderIntent::PlayingBall;
        }
        Ok(())
    }

    // =========================================================
    // Movement
    // =========================================================

    /// Per-tick movement for all nine fielders, in dependency order.
    pub(crate) fn move_fielders(&mut self) {
        self.refresh_goals();
        for pos in AGENT_ORDER {
            self.fielder_mut(pos).move_step();
        }
    }

    fn refresh_goals(&mut self) {
        for pos in AGENT_ORDER {
            let goal = self.goal_for(pos);
            self.fielder_mut(pos).goal = goal;
        }
    }

    fn goal_for(&self, pos: FieldPosition) -> Option<Vec2> {
        let f = self.fielder(pos);
        match f.intent {
            FielderIntent::Idle => None,
            FielderIntent::PlayingBall => Some(self.chase_point(pos)),
            FielderIntent::CoveringBase(base) => Some(geometry::base_position(base)),
            FielderIntent::BackingUp(behind) => {
                let covered = self.backup_anchor(behind);
                let ball = self.ball.ground_pos();
                let away = Vec2::new(covered.x - ball.x, covered.y - ball.y);
                let len = away.length().max(0.1);
                Some(Vec2::new(
                    covered.x + away.x / len * 6.0,
                    covered.y + away.y / len * 6.0,
                ))
            }
            FielderIntent::Relay => {
                let landing = self.landing_estimate();
                let target = if self.slots[1].is_some() || self.slots[2].is_some() {
                    Base::Home
                } else {
                    Base::Second
                };
                Some(landing.lerp(geometry::base_position(target), 0.45))
            }
            FielderIntent::Throwing => None,
            FielderIntent::RunningToBase(base) => Some(geometry::base_position(base)),
        }
    }

    fn backup_anchor(&self, behind: FieldPosition) -> Vec2 {
        let f = self.fielder(behind);
        match f.intent {
            FielderIntent::PlayingBall => self.chase_point(behind),
            FielderIntent::CoveringBase(base) => geometry::base_position(base),
            _ => f.loc,
        }
    }

    /// Where the playing fielder aims: the earliest reachable point on
    /// the ball's projected path, or its resting point as the
    /// conservative fallback.
    fn chase_point(&self, pos: FieldPosition) -> Vec2 {
        if let Some((point, _)) = self.intercept_for(pos) {
            return point.ground();
        }
        match &self.projection {
            Some(proj) => proj.rest_spot,
            None => self.ball.ground_pos(),
        }
    }

    /// Earliest point on the projected path this fielder can reach in
    /// time, with the ball at catchable height.
    pub(crate) fn intercept_for(&self, pos: FieldPosition) -> Option<(Vec3, f32)> {
        let proj = self.projection.as_ref()?;
        let f = self.fielder(pos);
        for (i, point) in proj.path.iter().enumerate() {
            let t_abs = proj.base_time() + i as f32 * crate::engine::physics_constants::tick::DT;
            if t_abs < self.clock_s {
                continue;
            }
            if point.z > f.attributes.reach_m {
                continue;
            }
            let travel = f.time_to_reach_s(point.ground());
            if travel <= (t_abs - self.clock_s) + fielding::INTERCEPT_SLACK_S {
                return Some((*point, t_abs));
            }
        }
        None
    }

    /// When this fielder could first have the ball in hand: intercept
    /// time, or chase-to-rest when no in-path intercept exists.
    pub(crate) fn effective_arrival_s(&self, pos: FieldPosition) -> f32 {
        if let Some((_, t)) = self.intercept_for(pos) {
            return t;
        }
        let (rest_spot, rest_time) = match &self.projection {
            Some(p) => (p.rest_spot, p.rest_time),
            None => (self.ball.ground_pos(), self.clock_s),
        };
        let chase = self.fielder(pos).time_to_reach_s(rest_spot);
        self.clock_s + chase.max(rest_time - self.clock_s)
    }

    pub(crate) fn landing_estimate(&self) -> Vec2 {
        match &self.projection {
            Some(p) => {
                if p.landing_time >= self.clock_s {
                    p.landing_spot
                } else {
                    p.rest_spot
                }
            }
            None => self.ball.ground_pos(),
        }
    }

    // =========================================================
    // Fielding acts
    // =========================================================

    /// Let whoever has a genuine chance attempt to field the ball.
    pub(crate) fn attempt_fielding_phase(&mut self) -> Result<()> {
        if self.ball.fielded_by().is_some() && !self.ball.bobbled {
            return Ok(());
        }
        if self.ball.left_playing_field {
            return Ok(());
        }
        // A foul ball past its catch window is dead on arrival; nobody
        // fields it into a live play.
        if self.ball.in_foul_territory && self.catch_margin().is_none() {
            return Ok(());
        }

        let ball_pos = self.ball.ground_pos();
        let ball_height = self.ball.height();
        let mut candidate: Option<(FieldPosition, f32)> = None;
        for pos in AGENT_ORDER {
            let f = self.fielder(pos);
            if !f.ready_to_attempt(self.clock_s) {
                continue;
            }
            if ball_height > f.attributes.reach_m {
                continue;
            }
            let dist = f.loc.distance(ball_pos);
            if dist > fielding::REACH_M {
                continue;
            }
            if candidate.map(|(_, d)| dist < d).unwrap_or(true) {
                candidate = Some((pos, dist));
            }
        }
        if let Some((pos, _)) = candidate {
            self.attempt_fielding_act(pos)?;
        }
        Ok(())
    }

    fn attempt_fielding_act(&mut self, pos: FieldPosition) -> Result<()> {
        let ball_pos = self.ball.ground_pos();
        let dist = self.fielder(pos).loc.distance(ball_pos);
        if dist > fielding::REACH_M {
            return Err(PlayError::InvariantViolation(format!(
                "{} attempted a fielding act {:.2}m from the ball",
                pos.code(),
                dist
            )));
        }

        let p_clean = self.clean_fielding_probability(pos);
        let draw: f32 = self.rng.gen();

        if draw < p_clean {
            self.field_cleanly(pos)
        } else if draw < p_clean + fielding::BOBBLE_SHARE * (1.0 - p_clean) {
            self.bobble(pos)
        } else {
            self.miss(pos)
        }
    }

    /// Difficulty score over skill, mapped into a clean-fielding
    /// probability.
    fn clean_fielding_probability(&self, pos: FieldPosition) -> f32 {
        let f = self.fielder(pos);

        // A stopped or dribbling ball is a routine pickup.
        let mut difficulty = if self.ball.stopped || self.ball.horizontal_speed() < 3.0 {
            0.3
        } else {
            match self.ball.classify() {
                BallClass::GroundBall => 1.0,
                BallClass::FlyBall => 0.8,
                BallClass::LineDrive => 1.5,
            }
        };

        difficulty += (self.ball.height() - fielding::IDEAL_GLOVE_HEIGHT_M).abs()
            * fielding::HEIGHT_DIFF_COEF;

        // Lateral and backward movement at the moment of the attempt.
        if let Some(goal) = f.goal {
            if f.loc.distance(goal) > 1e-3 {
                let speed = f.sprint_mps();
                let dir_len = f.loc.distance(goal).max(1e-6);
                let vx = (goal.x - f.loc.x) / dir_len * speed;
                let vy = (goal.y - f.loc.y) / dir_len * speed;
                // Away-from-home direction at the fielder's spot.
                let out_len = f.loc.length().max(1e-6);
                let (ox, oy) = (f.loc.x / out_len, f.loc.y / out_len);
                let backward = (vx * ox + vy * oy).max(0.0);
                let lateral = (vx * oy - vy * ox).abs();
                difficulty += lateral * fielding::LATERAL_MOVE_COEF
                    + backward * fielding::BACKWARD_MOVE_COEF;
            }
        }

        // Plays at the wall are a different animal.
        let lateral_deg = geometry::lateral_angle_deg(f.loc).clamp(-45.0, 45.0);
        if geometry::wall_distance_m(lateral_deg) - f.loc.length() < fielding::WALL_PLAY_RANGE_M {
            difficulty += fielding::WALL_PLAY_PENALTY;
        }

        let skill = skills::normalize(f.attributes.fielding).max(0.2);
        let glove = 0.75 + 0.5 * skills::normalize(f.attributes.glove);
        let composure = 0.85 + 0.3 * skills::normalize(f.attributes.composure);
        let score = difficulty / (skill * glove * composure);

        (1.0 - score * fielding::DIFFICULTY_SCALE)
            .clamp(fielding::MIN_CLEAN_PROB, fielding::MAX_CLEAN_PROB)
    }

    fn field_cleanly(&mut self, pos: FieldPosition) -> Result<()> {
        if self.ball.bobbled {
            self.ball.clear_bobble();
        }

        // Catch adjudication applies while the ball is inside the catch
        // threshold: the first bounce under modern rules, the second
        // under the bound rule.
        let catch_margin = self.catch_margin();
        self.ball.set_fielded(pos)?;

        if let Some(margin) = catch_margin {
            let call = self.umpire.call_catch(&mut self.rng, margin);
            self.events.push(
                self.tick,
                PlayEventKind::CatchRuled {
                    caught: call.called_out,
                    true_catch: call.true_out,
                },
            );
            // Game state follows the ruling, not the physics.
            self.ball.caught = call.called_out;
            self.take_possession(pos);
            if call.called_out {
                self.on_catch(pos)?;
            } else {
                // Ruled a trap: the fielding is no longer in doubt, so
                // every waiting runner picks a side now.
                self.on_ball_landed();
            }
            return Ok(());
        }

        self.ball.caught = false;
        self.events
            .push(self.tick, PlayEventKind::FieldedCleanly { fielder: pos });
        self.take_possession(pos);
        self.stats.fielder_mut(pos).composure_delta += fielding::COMPOSURE_GAIN;
        Ok(())
    }

    fn take_possession(&mut self, pos: FieldPosition) {
        self.holder = Some(pos);
        self.fielder_mut(pos).has_ball = true;
        self.fielder_mut(pos).intent = FielderIntent::Throwing;
        self.assist_chain.clear();
    }

    fn bobble(&mut self, pos: FieldPosition) -> Result<()> {
        self.ball.set_bobbled()?;
        self.events
            .push(self.tick, PlayEventKind::Bobbled { fielder: pos });
        self.stats.charge_error(pos, fielding::COMPOSURE_LOSS);
        let clock = self.clock_s;
        self.fielder_mut(pos).start_reorientation(clock);
        // Everyone re-reads the deflected ball; runners get their
        // re-evaluation immediately, not a tick late.
        self.reassign_on_new_read()?;
        self.on_defensive_misplay();
        Ok(())
    }

    fn miss(&mut self, pos: FieldPosition) -> Result<()> {
        self.events
            .push(self.tick, PlayEventKind::FieldingMiss { fielder: pos });
        let clock = self.clock_s;
        self.fielder_mut(pos).start_reorientation(clock);
        // Trajectory is unmodified; runners still re-evaluate right away.
        self.on_defensive_misplay();
        Ok(())
    }

    /// Seconds of catch window remaining, or `None` when a catch is no
    /// longer possible and the act is a plain pickup. The threshold is
    /// the first bounce, except for foul balls under the bound rule,
    /// where the second bounce still counts.
    fn catch_margin(&self) -> Option<f32> {
        let bound_applies = self.rules.bound_catch_is_out && self.ball.in_foul_territory;
        if bound_applies {
            if self.ball.bounce_count >= 2 {
                return None;
            }
            let threshold = self
                .ball
                .second_bounce_time
                .or(self.projection.as_ref().and_then(|p| p.second_bounce_time))?;
            Some(threshold - self.clock_s)
        } else {
            if self.ball.bounce_count >= 1 {
                return None;
            }
            let proj = self.projection.as_ref()?;
            Some(proj.landing_time - self.clock_s)
        }
    }

    // =========================================================
    // Throw decision
    // =========================================================

    /// The fielder holding the ball picks the best option: a throw to a
    /// base, an on-foot putout, or the ball back to the pitcher.
    pub(crate) fn decide_with_ball(&mut self, holder: FieldPosition) -> Result<()> {
        // A foul ball held without a ruled catch is just dead.
        if self.ball.in_foul_territory && !self.ball.caught {
            self.events.push(self.tick, PlayEventKind::FoulBall);
            self.finish(crate::models::outcome::PlayOutcome::FoulBall);
            return Ok(());
        }

        let threats = self.threat_list(holder);

        if threats.is_empty() {
            return self.no_threat_exit(holder);
        }

        // Genuine putout chances first; with two outs the third out is
        // everything, so take the fattest margin on the board.
        let genuine: Vec<&ThreatOption> = threats
            .iter()
            .filter(|t| t.margin_throw_s > 0.0 || t.margin_foot_s > 0.0)
            .collect();

        let chosen: Option<&ThreatOption> = if !genuine.is_empty() {
            genuine
                .iter()
                .copied()
                .max_by(|a, b| {
                    let ma = a.margin_throw_s.max(a.margin_foot_s);
                    let mb = b.margin_throw_s.max(b.margin_foot_s);
                    ma.partial_cmp(&mb).unwrap_or(std::cmp::Ordering::Equal)
                })
        } else {
            // No genuine chance: a preemptive throw ahead of the lead
            // advancing runner keeps him honest.
            threats
                .iter()
                .filter(|t| !t.is_double_off)
                .max_by_key(|t| match t.base {
                    Base::Home => 3,
                    Base::Third => 2,
                    Base::Second => 1,
                    Base::First => 0,
                })
        };

        let Some(choice) = chosen.copied() else {
            return self.no_threat_exit(holder);
        };
        trace!(
            base = choice.base.code(),
            runner = choice.runner_idx,
            distance_m = choice.distance_m,
            force = choice.is_force,
            "holder picked a target"
        );

        // On-foot beats the throw when the holder himself gets there
        // sooner and the base is close enough to bother.
        let base_pos = geometry::base_position(choice.base);
        let holder_dist = self.fielder(holder).loc.distance(base_pos);
        if choice.margin_foot_s > choice.margin_throw_s
            && holder_dist <= fielding::UNASSISTED_RANGE_M
        {
            self.fielder_mut(holder).intent = FielderIntent::RunningToBase(choice.base);
            return Ok(());
        }

        self.release_throw(holder, choice.base)
    }

    /// Nobody is threatened: ball goes back to the pitcher, or if the
    /// pitcher already has it the play is dead.
    fn no_threat_exit(&mut self, holder: FieldPosition) -> Result<()> {
        if holder == FieldPosition::Pitcher {
            return self.finish_quiet();
        }
        let dest = self.fielder(FieldPosition::Pitcher).loc;
        let attrs = self.fielder(holder).attributes;
        let origin = self.fielder(holder).loc;
        // Flagged like a relay: the pitcher just receives, no play at a
        // base is adjudicated off this throw.
        let throw = Throw::new(
            &mut self.rng,
            holder,
            &attrs,
            origin,
            FieldPosition::Pitcher,
            Base::Home,
            dest,
            true,
        );
        self.events.push(
            self.tick,
            PlayEventKind::ThrowReleased {
                from: holder,
                to: FieldPosition::Pitcher,
                base: Base::Home,
                distance_m: throw.distance_m,
            },
        );
        self.throw = Some(throw);
        self.release_from(holder);
        Ok(())
    }

    fn release_throw(&mut self, holder: FieldPosition, base: Base) -> Result<()> {
        let base_pos = geometry::base_position(base);
        let origin = self.fielder(holder).loc;
        let direct_dist = origin.distance(base_pos);

        // Long outfield throws go through the cut-off man.
        let relay_via = match self.board.cutoff {
            Some(c)
                if c != holder
                    && holder.is_outfielder()
                    && direct_dist > throw_consts::RELAY_DEPTH_M / 2.0 =>
            {
                Some(c)
            }
            _ => None,
        };

        let (receiver, dest, is_relay) = match relay_via {
            Some(cutoff) => (cutoff, self.fielder(cutoff).loc, true),
            None => {
                let covering = self.board.who_covers(base).unwrap_or_else(|| {
                    // No assigned cover: nearest non-battery fielder takes
                    // the bag.
                    self.nearest_available_to(base_pos, holder)
                });
                (covering, base_pos, false)
            }
        };

        if receiver == holder {
            // He is his own best option: take it there on foot.
            self.fielder_mut(holder).intent = FielderIntent::RunningToBase(base);
            return Ok(());
        }

        if is_relay {
            self.events
                .push(self.tick, PlayEventKind::RelayStarted { via: receiver });
        }

        let attrs = self.fielder(holder).attributes;
        let throw = Throw::new(
            &mut self.rng,
            holder,
            &attrs,
            origin,
            receiver,
            base,
            dest,
            is_relay,
        );
        self.events.push(
            self.tick,
            PlayEventKind::ThrowReleased {
                from: holder,
                to: receiver,
                base,
                distance_m: throw.distance_m,
            },
        );
        if receiver != holder && !is_relay {
            self.fielder_mut(receiver).intent = FielderIntent::CoveringBase(base);
        }
        self.throw = Some(throw);
        self.release_from(holder);
        Ok(())
    }

    fn release_from(&mut self, holder: FieldPosition) {
        self.fielder_mut(holder).has_ball = false;
        self.fielder_mut(holder).intent = FielderIntent::Idle;
        self.holder = None;
        self.assist_chain.push(holder);
    }

    fn nearest_available_to(&self, point: Vec2, except: FieldPosition) -> FieldPosition {
        let mut best = FieldPosition::Pitcher;
        let mut best_d = f32::INFINITY;
        for pos in AGENT_ORDER {
            if pos == except {
                continue;
            }
            let d = self.fielder(pos).loc.distance(point);
            if d < best_d {
                best_d = d;
                best = pos;
            }
        }
        best
    }

    /// Build the holder's option list: every base with a live or
    /// threatened runner, with throw and on-foot margins.
    pub(crate) fn threat_list(&self, holder: FieldPosition) -> Vec<ThreatOption> {
        let f = self.fielder(holder);
        let mut out = Vec::new();

        for (idx, runner) in self.runners.iter().enumerate() {
            let (base, eta, is_force, is_double_off) = match runner.state {
                RunnerState::FullSpeed => {
                    let force = runner.forced || (runner.is_batter && runner.target == Base::First);
                    (runner.target, runner.time_to_target_s(), force, false)
                }
                RunnerState::Tentative => {
                    // Off his base with a catch pending: the double-off
                    // at his origin is the live threat.
                    if runner.pct <= 0.0 {
                        continue;
                    }
                    (runner.origin, runner.time_to_retreat_s(), true, true)
                }
                RunnerState::Retreating => {
                    (runner.origin, runner.time_to_retreat_s(), true, true)
                }
                _ => continue,
            };
            if base == Base::Home && runner.origin == Base::Home {
                // The batter-runner's "retreat" to home is not a play.
                continue;
            }

            let base_pos = geometry::base_position(base);
            let dist = f.loc.distance(base_pos);
            let throw_time = throwing::estimate_throw_s(
                dist,
                f.attributes.arm_strength_mph,
                f.attributes.release_quickness,
            );
            let tag_cost = if is_force { 0.0 } else { throw_consts::TAG_APPLY_S };
            let foot_time = f.time_to_reach_s(base_pos);

            out.push(ThreatOption {
                base,
                runner_idx: idx,
                is_force,
                margin_throw_s: eta - throw_time - tag_cost,
                margin_foot_s: eta - foot_time - tag_cost,
                distance_m: dist,
                is_double_off,
            });
        }
        out
    }

    // =========================================================
    // Catch aftermath
    // =========================================================

    /// A ruled catch: batter is out, the run queue dies, and every runner
    /// off his base has to get back.
    pub(crate) fn on_catch(&mut self, pos: FieldPosition) -> Result<()> {
        self.events
            .push(self.tick, PlayEventKind::CaughtInFlight { fielder: pos });

        let batter_name = self.runners[0].name.clone();
        self.runners[0].state = RunnerState::Out;
        for slot in self.slots.iter_mut() {
            if *slot == Some(0) {
                *slot = None;
            }
        }
        self.outs_recorded += 1;
        self.outs_detail.push(OutKind::Catch);
        self.stats.credit_putout(pos);
        self.stats.fielder_mut(pos).composure_delta += fielding::COMPOSURE_GAIN;
        self.events.push(
            self.tick,
            PlayEventKind::RunnerOut {
                runner: batter_name,
                base: Base::First,
            },
        );
        if self.total_outs() >= 3 {
            self.third_out_at = Some(self.clock_s);
        }

        // Any run that crossed before the catch is void; the queue is
        // discarded, not tallied.
        if !self.run_queue.is_empty() {
            let discarded = self.run_queue.len() as u8;
            self.run_queue.clear();
            self.events
                .push(self.tick, PlayEventKind::RunsDiscarded { count: discarded });
        }

        for idx in 1..self.runners.len() {
            let runner = &mut self.runners[idx];
            if runner.is_settled() {
                continue;
            }
            if runner.pct > 0.0 {
                runner.forced_to_retreat = true;
                runner.state = RunnerState::Retreating;
                let name = runner.name.clone();
                let origin = runner.origin;
                self.events.push(
                    self.tick,
                    PlayEventKind::RunnerRetreating {
                        runner: name,
                        toward: origin,
                    },
                );
            } else {
                runner.state = RunnerState::OnBase;
            }
        }

        self.recompute_forces();
        if self.total_outs() >= 3 {
            self.finish_from_outs()?;
        }
        Ok(())
    }

    /// Forces only hold while the chain of occupied bases behind a
    /// runner is intact; an out anywhere in the chain releases it.
    pub(crate) fn recompute_forces(&mut self) {
        let batter_running = self.runners[0].state == RunnerState::FullSpeed;
        let first_live = self
            .runners
            .iter()
            .any(|r| r.origin == Base::First && !matches!(r.state, RunnerState::Out));
        let second_live = self
            .runners
            .iter()
            .any(|r| r.origin == Base::Second && !matches!(r.state, RunnerState::Out));

        for runner in self.runners.iter_mut() {
            if runner.forced_to_retreat {
                runner.forced = false;
                continue;
            }
            runner.forced = match runner.origin {
                Base::Home => true,
                Base::First => batter_running,
                Base::Second => batter_running && first_live,
                Base::Third => batter_running && first_live && second_live,
            };
        }
    }
}
