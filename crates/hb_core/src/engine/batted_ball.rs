//! Batted-ball flight and bounce physics.
//!
//! Integration runs in a physics-convenient 2D frame (range along the
//! launch ray, height) with explicit Euler at the engine tick, and
//! converts into the 3D field frame through the horizontal launch angle.
//! Wall, foul-line and foul-pole crossings only set flags here; what those
//! flags mean for the play is the resolution step's business.

use serde::{Deserialize, Serialize};

use crate::error::{PlayError, Result};
use crate::models::player::FieldPosition;

use super::geometry::{self, Vec2, Vec3};
use super::physics_constants::{ball, bounce, tick, units};

/// Launch conditions at contact.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ContactParams {
    pub exit_speed_mph: f32,
    /// Vertical launch angle in degrees; negative is into the ground.
    pub vertical_angle_deg: f32,
    /// Horizontal spray angle in degrees; 0 is dead center, positive is
    /// toward the first-base side.
    pub horizontal_angle_deg: f32,
}

/// Broad ball character, used by fielding difficulty and runner reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallClass {
    GroundBall,
    LineDrive,
    FlyBall,
}

/// Written exactly once, at the first landing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LandingRecord {
    pub carry_m: f32,
    pub hang_time_s: f32,
    pub spot: Vec2,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattedBall {
    pub contact: ContactParams,
    /// Drag coefficient in effect; the standard baseball value unless a
    /// caller overrides it.
    drag_coefficient: f32,
    /// Distance travelled along the launch ray (m). Goes negative only
    /// after a wall rebound.
    range_m: f32,
    height_m: f32,
    v_range: f32,
    v_vert: f32,
    pub time_since_contact: f32,
    /// Per-tick position history, lazily grown; index is the tick number.
    pub history: Vec<Vec3>,
    pub bounce_count: u8,
    pub landed: bool,
    pub stopped: bool,
    pub caught: bool,
    pub bobbled: bool,
    pub touched_by_fielder: bool,
    pub left_playing_field: bool,
    pub in_foul_territory: bool,
    pub contacted_wall: bool,
    pub contacted_foul_pole: bool,
    fielded_by: Option<FieldPosition>,
    pub landing: Option<LandingRecord>,
    /// Time of the second bounce, kept for bound-rule adjudication.
    pub second_bounce_time: Option<f32>,
    rolling: bool,
}

impl BattedBall {
    pub fn from_contact(contact: ContactParams) -> Self {
        let speed = contact.exit_speed_mph * units::MPH_TO_MPS;
        let vert = contact.vertical_angle_deg.to_radians();
        let mut ball = Self {
            contact,
            drag_coefficient: ball::DRAG_COEFFICIENT,
            range_m: 0.0,
            height_m: 1.0, // contact height off the bat
            v_range: speed * vert.cos(),
            v_vert: speed * vert.sin(),
            time_since_contact: 0.0,
            history: Vec::new(),
            bounce_count: 0,
            landed: false,
            stopped: false,
            caught: false,
            bobbled: false,
            touched_by_fielder: false,
            left_playing_field: false,
            in_foul_territory: false,
            contacted_wall: false,
            contacted_foul_pole: false,
            fielded_by: None,
            landing: None,
            second_bounce_time: None,
            rolling: false,
        };
        ball.history.push(ball.position());
        ball
    }

    /// Same launch, custom drag coefficient. Zero reduces the flight to a
    /// plain ballistic arc, which the regression tests pin against the
    /// closed form.
    pub fn from_contact_with_drag(contact: ContactParams, drag_coefficient: f32) -> Self {
        let mut b = Self::from_contact(contact);
        b.drag_coefficient = drag_coefficient;
        b
    }

    pub fn fielded_by(&self) -> Option<FieldPosition> {
        self.fielded_by
    }

    /// Current position in the field frame.
    pub fn position(&self) -> Vec3 {
        let theta = self.contact.horizontal_angle_deg.to_radians();
        Vec3::new(
            self.range_m * theta.sin(),
            self.range_m * theta.cos(),
            self.height_m,
        )
    }

    pub fn ground_pos(&self) -> Vec2 {
        self.position().ground()
    }

    pub fn height(&self) -> f32 {
        self.height_m
    }

    /// Horizontal speed along the ray (m/s).
    pub fn horizontal_speed(&self) -> f32 {
        self.v_range.abs()
    }

    /// Airborne means no bounce yet; a catch before the first bounce is a
    /// fly-out under modern rules.
    pub fn airborne(&self) -> bool {
        self.bounce_count == 0 && !self.stopped
    }

    /// True while the ball is live and moving on its own.
    pub fn in_motion(&self) -> bool {
        !self.stopped && !self.caught && !self.left_playing_field && self.fielded_by.is_none()
    }

    pub fn classify(&self) -> BallClass {
        let a = self.contact.vertical_angle_deg;
        if a < 10.0 {
            BallClass::GroundBall
        } else if a < 25.0 {
            BallClass::LineDrive
        } else {
            BallClass::FlyBall
        }
    }

    /// Whether the spray angle keeps the ball in fair territory.
    pub fn launched_fair(&self) -> bool {
        self.contact.horizontal_angle_deg.abs() <= 45.0
    }

    /// One engine tick of flight. No-op once the ball is dead or held.
    pub fn step(&mut self, dt: f32) {
        if !self.in_motion() {
            return;
        }
        self.time_since_contact += dt;

        if self.rolling {
            self.roll_step(dt);
        } else {
            self.flight_step(dt);
        }

        self.check_wall();
        self.in_foul_territory = geometry::is_foul(self.ground_pos());
        self.history.push(self.position());
    }

    fn flight_step(&mut self, dt: f32) {
        // Quadratic drag opposing velocity: F = 1/2 * rho * C * A * v^2.
        let k = 0.5 * ball::AIR_DENSITY * self.drag_coefficient * ball::cross_section_m2()
            / ball::MASS_KG;
        let speed = (self.v_range * self.v_range + self.v_vert * self.v_vert).sqrt();

        self.range_m += self.v_range * dt;
        self.height_m += self.v_vert * dt;
        self.v_range += -k * speed * self.v_range * dt;
        self.v_vert += (-ball::GRAVITY - k * speed * self.v_vert) * dt;

        if self.height_m <= 0.0 && self.v_vert < 0.0 {
            self.touch_ground();
        }
    }

    fn touch_ground(&mut self) {
        self.height_m = 0.0;
        self.bounce_count += 1;

        if self.bounce_count == 1 {
            self.landed = true;
            // Carry and hang time are recorded exactly once.
            self.landing = Some(LandingRecord {
                carry_m: self.range_m.abs(),
                hang_time_s: self.time_since_contact,
                spot: self.ground_pos(),
            });
        } else if self.bounce_count == 2 && self.second_bounce_time.is_none() {
            self.second_bounce_time = Some(self.time_since_contact);
        }

        self.v_vert = -self.v_vert * bounce::TURF_COR;
        self.v_range *= bounce::TURF_FRICTION;

        if self.v_vert < bounce::MIN_BOUNCE_SPEED {
            self.v_vert = 0.0;
            self.rolling = true;
        }
    }

    fn roll_step(&mut self, dt: f32) {
        self.range_m += self.v_range * dt;
        let decel = bounce::ROLL_DECEL * dt;
        if self.v_range.abs() <= decel || self.v_range.abs() < ball::STOP_SPEED {
            self.v_range = 0.0;
            self.stopped = true;
        } else {
            self.v_range -= decel * self.v_range.signum();
        }
    }

    fn check_wall(&mut self) {
        if self.left_playing_field || self.contacted_wall {
            return;
        }
        let theta = self.contact.horizontal_angle_deg;
        // Behind the plate there is no outfield wall to hit.
        if theta.abs() >= 90.0 {
            return;
        }
        let wall = geometry::wall_distance_m(theta.clamp(-45.0, 45.0));
        if self.range_m < wall {
            return;
        }

        if self.height_m >= geometry::WALL_HEIGHT_M {
            let near_line = (theta.abs() - 45.0).abs() <= geometry::FOUL_POLE_WINDOW_DEG;
            if near_line {
                // The pole is fair by rule.
                self.contacted_foul_pole = true;
            }
            self.left_playing_field = true;
        } else {
            self.contacted_wall = true;
            self.range_m = wall;
            self.v_range = -self.v_range * bounce::WALL_COR;
        }
    }

    /// Marks the ball secured by a fielder. The ball may be fielded at
    /// most once per play, and never while bobbled.
    pub fn set_fielded(&mut self, fielder: FieldPosition) -> Result<()> {
        if self.fielded_by.is_some() {
            return Err(PlayError::InvariantViolation(format!(
                "ball fielded twice (already held, then by {})",
                fielder.code()
            )));
        }
        if self.bobbled {
            return Err(PlayError::InvariantViolation(
                "ball cannot be fielded while bobbled".into(),
            ));
        }
        self.touched_by_fielder = true;
        self.fielded_by = Some(fielder);
        if self.airborne() {
            self.caught = true;
        }
        Ok(())
    }

    /// Ball squirts loose off the glove: damped velocity, everyone
    /// re-reads it.
    pub fn set_bobbled(&mut self) -> Result<()> {
        if self.fielded_by.is_some() {
            return Err(PlayError::InvariantViolation(
                "ball cannot bobble while fielded".into(),
            ));
        }
        self.touched_by_fielder = true;
        self.bobbled = true;
        self.v_range *= super::physics_constants::fielding::BOBBLE_DAMPING;
        self.v_vert = 0.0;
        self.rolling = self.height_m <= ball::GROUND_EPS;
        Ok(())
    }

    /// A later tick picks the bobbled ball back up.
    pub fn clear_bobble(&mut self) {
        self.bobbled = false;
    }

    /// Simulate a scratch copy forward to landing and rest. Used for
    /// fielder routes and runner lookahead; physics state is untouched.
    pub fn project(&self) -> Projection {
        let mut copy = self.clone();
        copy.history.clear();
        // A held/dead ball projects to where it already is.
        copy.fielded_by = None;
        copy.caught = false;
        copy.bobbled = false;

        let base_time = copy.time_since_contact;
        let mut path = vec![copy.position()];
        let mut steps = 0u32;
        while copy.in_motion() && !copy.left_playing_field && steps < tick::MAX_TICKS {
            copy.step(tick::DT);
            path.push(copy.position());
            steps += 1;
        }

        let landing = copy.landing.or(self.landing);
        let rest_spot = copy.ground_pos();
        let rest_time = copy.time_since_contact;
        Projection {
            base_time,
            path,
            landing_spot: landing.map(|l| l.spot).unwrap_or(rest_spot),
            landing_time: landing.map(|l| l.hang_time_s).unwrap_or(rest_time),
            second_bounce_time: copy.second_bounce_time.or(self.second_bounce_time),
            rest_spot,
            rest_time,
            leaves_field: copy.left_playing_field,
        }
    }
}

/// Forward projection of a ball's remaining path.
#[derive(Clone, Debug)]
pub struct Projection {
    base_time: f32,
    /// One entry per tick starting at `base_time`.
    pub path: Vec<Vec3>,
    pub landing_spot: Vec2,
    pub landing_time: f32,
    /// Projected (or already recorded) time of the second bounce, for
    /// bound-rule catch adjudication.
    pub second_bounce_time: Option<f32>,
    pub rest_spot: Vec2,
    pub rest_time: f32,
    pub leaves_field: bool,
}

impl Projection {
    pub fn base_time(&self) -> f32 {
        self.base_time
    }

    /// Position at an absolute time-since-contact, if the projection
    /// covers it. Callers fall back to [`Projection::rest_spot`] when the
    /// exact step is missing; the resting point is the conservative
    /// estimate.
    pub fn position_at(&self, time_since_contact: f32) -> Option<Vec3> {
        if time_since_contact < self.base_time {
            return None;
        }
        let idx = ((time_since_contact - self.base_time) / tick::DT).round() as usize;
        self.path.get(idx).copied()
    }

    /// Position at an absolute time, with the documented fallback applied.
    pub fn position_or_rest(&self, time_since_contact: f32) -> Vec3 {
        self.position_at(time_since_contact)
            .unwrap_or_else(|| Vec3::new(self.rest_spot.x, self.rest_spot.y, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics_constants::tick::DT;

    fn fly_ball() -> BattedBall {
        BattedBall::from_contact(ContactParams {
            exit_speed_mph: 95.0,
            vertical_angle_deg: 30.0,
            horizontal_angle_deg: 0.0,
        })
    }

    fn run_until_landed(ball: &mut BattedBall) {
        let mut guard = 0;
        while !ball.landed && guard < 600 {
            ball.step(DT);
            guard += 1;
        }
        assert!(ball.landed, "ball never landed");
    }

    #[test]
    fn test_landing_recorded_once() {
        let mut ball = fly_ball();
        run_until_landed(&mut ball);
        let first = ball.landing.expect("landing record");
        for _ in 0..50 {
            ball.step(DT);
        }
        let second = ball.landing.expect("landing record");
        assert_eq!(first.carry_m, second.carry_m);
        assert_eq!(first.hang_time_s, second.hang_time_s);
    }

    #[test]
    fn test_zero_drag_flat_launch_matches_closed_form() {
        // Zero vertical angle, zero drag: a straight-line projectile over
        // the one-meter drop from contact height. Closed-form carry is
        // v * sqrt(2h/g); Euler at 0.1s only differs by discretization.
        let contact = ContactParams {
            exit_speed_mph: 60.0,
            vertical_angle_deg: 0.0,
            horizontal_angle_deg: 0.0,
        };
        let v = contact.exit_speed_mph * units::MPH_TO_MPS;
        let t_fall = (2.0 * 1.0 / ball::GRAVITY).sqrt();
        let ideal = v * t_fall;

        let mut b = BattedBall::from_contact_with_drag(contact, 0.0);
        run_until_landed(&mut b);
        let carry = b.landing.unwrap().carry_m;
        // One Euler step of slack either way.
        let slack = v * DT;
        assert!(
            (carry - ideal).abs() <= slack,
            "carry {} vs closed form {}",
            carry,
            ideal
        );
    }

    #[test]
    fn test_ball_eventually_stops() {
        let mut ball = BattedBall::from_contact(ContactParams {
            exit_speed_mph: 70.0,
            vertical_angle_deg: 5.0,
            horizontal_angle_deg: -10.0,
        });
        let mut guard = 0;
        while ball.in_motion() && guard < 900 {
            ball.step(DT);
            guard += 1;
        }
        assert!(ball.stopped);
        assert!(ball.horizontal_speed() < ball::STOP_SPEED + 0.01);
    }

    #[test]
    fn test_fielded_twice_is_invariant_violation() {
        let mut ball = fly_ball();
        ball.step(DT);
        ball.set_fielded(FieldPosition::CenterField).unwrap();
        assert!(ball.set_fielded(FieldPosition::LeftField).is_err());
    }

    #[test]
    fn test_bobble_and_fielded_are_exclusive() {
        let mut ball = fly_ball();
        run_until_landed(&mut ball);
        ball.set_bobbled().unwrap();
        assert!(ball.set_fielded(FieldPosition::Shortstop).is_err());
        ball.clear_bobble();
        ball.set_fielded(FieldPosition::Shortstop).unwrap();
        assert_eq!(ball.fielded_by(), Some(FieldPosition::Shortstop));
    }

    #[test]
    fn test_deep_fair_fly_leaves_field() {
        let mut ball = BattedBall::from_contact(ContactParams {
            exit_speed_mph: 122.0,
            vertical_angle_deg: 28.0,
            horizontal_angle_deg: 0.0,
        });
        let mut guard = 0;
        while !ball.left_playing_field && !ball.stopped && guard < 900 {
            ball.step(DT);
            guard += 1;
        }
        assert!(ball.left_playing_field, "122mph at 28 degrees should clear the wall");
        assert!(!ball.in_foul_territory);
    }

    #[test]
    fn test_projection_covers_flight_and_falls_back() {
        let ball = fly_ball();
        let proj = ball.project();
        assert!(proj.position_at(0.1).is_some());
        // Far past rest: exact step missing, falls back to the rest spot.
        let far = proj.position_or_rest(1_000.0);
        assert!((far.x - proj.rest_spot.x).abs() < 1e-6);
        assert!((far.y - proj.rest_spot.y).abs() < 1e-6);
    }

    #[test]
    fn test_classification_bands() {
        let mk = |deg: f32| {
            BattedBall::from_contact(ContactParams {
                exit_speed_mph: 90.0,
                vertical_angle_deg: deg,
                horizontal_angle_deg: 0.0,
            })
        };
        assert_eq!(mk(2.0).classify(), BallClass::GroundBall);
        assert_eq!(mk(18.0).classify(), BallClass::LineDrive);
        assert_eq!(mk(35.0).classify(), BallClass::FlyBall);
    }
}
