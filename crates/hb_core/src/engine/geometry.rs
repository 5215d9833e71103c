//! Field geometry.
//!
//! The field frame puts home plate at the origin: x is lateral (positive
//! toward the first-base line), y is depth toward center field, z is
//! height. Foul lines run at 45 degrees, so a point is fair exactly when
//! `|x| <= y`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::models::outcome::Base;
use crate::models::player::FieldPosition;

use super::physics_constants::{baserunning, units};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// A point `dist` along the line from `self` toward `to`, clamped at
    /// `to` so movement never oscillates past a goal.
    pub fn step_toward(self, to: Vec2, dist: f32) -> Vec2 {
        let gap = self.distance(to);
        if gap <= dist || gap < f32::EPSILON {
            return to;
        }
        let t = dist / gap;
        Vec2::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        Vec2::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn ground(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Distance from home plate to first base (m).
pub const BASE_GAP_M: f32 = baserunning::BASE_GAP_M;

/// Outfield wall distance down the lines (m, 330 ft).
pub const WALL_LINE_M: f32 = 330.0 * units::FT_TO_M;
/// Outfield wall distance to dead center (m, 400 ft).
pub const WALL_CENTER_M: f32 = 400.0 * units::FT_TO_M;
/// Wall height (m, 8 ft).
pub const WALL_HEIGHT_M: f32 = 8.0 * units::FT_TO_M;

/// Coordinates of a base in the field frame.
pub fn base_position(base: Base) -> Vec2 {
    // First and third sit on the 45-degree lines, second on the y axis.
    let corner = BASE_GAP_M / std::f32::consts::SQRT_2;
    match base {
        Base::First => Vec2::new(corner, corner),
        Base::Second => Vec2::new(0.0, 2.0 * corner),
        Base::Third => Vec2::new(-corner, corner),
        Base::Home => Vec2::ZERO,
    }
}

/// True when the point is in foul territory.
pub fn is_foul(p: Vec2) -> bool {
    p.y < 0.0 || p.x.abs() > p.y
}

/// Lateral angle from the center-field line in degrees; negative toward
/// third base, positive toward first base. Only meaningful for fair-ish
/// territory.
pub fn lateral_angle_deg(p: Vec2) -> f32 {
    p.x.atan2(p.y).to_degrees()
}

/// Wall distance from home at the given lateral angle. Linear taper from
/// center to the lines; close enough for adjudication purposes.
pub fn wall_distance_m(lateral_deg: f32) -> f32 {
    let t = (lateral_deg.abs() / 45.0).clamp(0.0, 1.0);
    WALL_CENTER_M + (WALL_LINE_M - WALL_CENTER_M) * t
}

/// A ball crossing the wall plane within this many degrees of a foul line
/// can clip the pole.
pub const FOUL_POLE_WINDOW_DEG: f32 = 0.75;

/// Default defensive stations, in meters.
pub fn fielder_station(pos: FieldPosition) -> Vec2 {
    match pos {
        FieldPosition::Pitcher => Vec2::new(0.0, 18.44),
        FieldPosition::Catcher => Vec2::new(0.0, -1.0),
        FieldPosition::FirstBase => Vec2::new(22.0, 26.0),
        FieldPosition::SecondBase => Vec2::new(11.0, 40.0),
        FieldPosition::ThirdBase => Vec2::new(-22.0, 26.0),
        FieldPosition::Shortstop => Vec2::new(-11.0, 40.0),
        FieldPosition::LeftField => Vec2::new(-38.0, 85.0),
        FieldPosition::CenterField => Vec2::new(0.0, 97.0),
        FieldPosition::RightField => Vec2::new(38.0, 85.0),
    }
}

static STATIONS: Lazy<[(FieldPosition, Vec2); 9]> = Lazy::new(|| {
    let mut out = [(FieldPosition::Pitcher, Vec2::ZERO); 9];
    for (i, pos) in FieldPosition::ALL.iter().enumerate() {
        out[i] = (*pos, fielder_station(*pos));
    }
    out
});

/// Nominal zone owner for a ball arriving at `spot`: the fielder whose
/// station is closest, with the battery handicapped so the pitcher and
/// catcher only own balls hit essentially at them. On deep balls this
/// naturally hands ownership to the outfield.
pub fn zone_owner(spot: Vec2) -> FieldPosition {
    use super::physics_constants::fielding::BATTERY_ZONE_PENALTY;

    let mut best = FieldPosition::Pitcher;
    let mut best_score = f32::INFINITY;
    for (pos, station) in STATIONS.iter() {
        let mut score = station.distance(spot);
        if pos.is_battery() {
            score *= BATTERY_ZONE_PENALTY;
        }
        if score < best_score {
            best_score = score;
            best = *pos;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_geometry() {
        let first = base_position(Base::First);
        let second = base_position(Base::Second);
        // Consecutive bases are one base gap apart.
        assert!((first.distance(Vec2::ZERO) - BASE_GAP_M).abs() < 0.01);
        assert!((first.distance(second) - BASE_GAP_M).abs() < 0.01);
        // First base sits exactly on the foul line.
        assert!((first.x - first.y).abs() < 0.001);
    }

    #[test]
    fn test_foul_territory() {
        assert!(is_foul(Vec2::new(0.0, -2.0)));
        assert!(is_foul(Vec2::new(30.0, 10.0)));
        assert!(!is_foul(Vec2::new(5.0, 40.0)));
        // The line itself is fair.
        assert!(!is_foul(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_wall_tapers_toward_lines() {
        assert!(wall_distance_m(0.0) > wall_distance_m(45.0));
        assert!((wall_distance_m(0.0) - WALL_CENTER_M).abs() < 0.01);
        assert!((wall_distance_m(-45.0) - WALL_LINE_M).abs() < 0.01);
    }

    #[test]
    fn test_zone_ownership() {
        // Deep center belongs to the center fielder.
        assert_eq!(zone_owner(Vec2::new(0.0, 95.0)), FieldPosition::CenterField);
        // A hard pull down the third-base line belongs to the third baseman.
        assert_eq!(zone_owner(Vec2::new(-20.0, 24.0)), FieldPosition::ThirdBase);
        // A dribbler in front of the plate belongs to the battery anyway.
        let owner = zone_owner(Vec2::new(0.0, 3.0));
        assert!(owner.is_battery(), "got {:?}", owner);
    }

    #[test]
    fn test_step_toward_snaps_at_goal() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(1.0, 0.0);
        // Budget beyond the gap snaps exactly onto the goal.
        assert_eq!(from.step_toward(to, 5.0), to);
        let part = from.step_toward(to, 0.25);
        assert!((part.x - 0.25).abs() < 1e-6);
    }
}
