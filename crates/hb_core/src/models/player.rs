//! Players as the engine sees them: position codes, handedness, and the
//! attribute sheets supplied by the surrounding game (roster, development
//! and league simulation are external collaborators).

use serde::{Deserialize, Serialize};

/// Defensive position codes, numbered in scorekeeping order (1-9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPosition {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
}

impl FieldPosition {
    pub const ALL: [FieldPosition; 9] = [
        FieldPosition::Pitcher,
        FieldPosition::Catcher,
        FieldPosition::FirstBase,
        FieldPosition::SecondBase,
        FieldPosition::ThirdBase,
        FieldPosition::Shortstop,
        FieldPosition::LeftField,
        FieldPosition::CenterField,
        FieldPosition::RightField,
    ];

    /// Stable array index (scorekeeping number minus one).
    pub fn index(self) -> usize {
        match self {
            FieldPosition::Pitcher => 0,
            FieldPosition::Catcher => 1,
            FieldPosition::FirstBase => 2,
            FieldPosition::SecondBase => 3,
            FieldPosition::ThirdBase => 4,
            FieldPosition::Shortstop => 5,
            FieldPosition::LeftField => 6,
            FieldPosition::CenterField => 7,
            FieldPosition::RightField => 8,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FieldPosition::Pitcher => "P",
            FieldPosition::Catcher => "C",
            FieldPosition::FirstBase => "1B",
            FieldPosition::SecondBase => "2B",
            FieldPosition::ThirdBase => "3B",
            FieldPosition::Shortstop => "SS",
            FieldPosition::LeftField => "LF",
            FieldPosition::CenterField => "CF",
            FieldPosition::RightField => "RF",
        }
    }

    pub fn is_infielder(self) -> bool {
        matches!(
            self,
            FieldPosition::FirstBase
                | FieldPosition::SecondBase
                | FieldPosition::ThirdBase
                | FieldPosition::Shortstop
        )
    }

    pub fn is_outfielder(self) -> bool {
        matches!(
            self,
            FieldPosition::LeftField | FieldPosition::CenterField | FieldPosition::RightField
        )
    }

    pub fn is_battery(self) -> bool {
        matches!(self, FieldPosition::Pitcher | FieldPosition::Catcher)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Defensive attribute sheet, 0-100 scale except where noted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FielderAttributes {
    /// Footspeed.
    pub speed: f32,
    /// Fielding skill (reads, routes, hands).
    pub fielding: f32,
    /// Glove quality modifier.
    pub glove: f32,
    /// Throw velocity in mph.
    pub arm_strength_mph: f32,
    /// How quickly the ball leaves the hand after fielding.
    pub release_quickness: f32,
    /// Throw accuracy; higher means tighter error distribution.
    pub throw_accuracy: f32,
    /// Steadiness under pressure.
    pub composure: f32,
    /// Willingness to take the aggressive option (call-offs, risky throws).
    pub audacity: f32,
    /// Catchable height in meters (reach with glove extended).
    pub reach_m: f32,
}

impl FielderAttributes {
    /// A league-average defender, useful for tests and demos.
    pub fn average() -> Self {
        Self {
            speed: 60.0,
            fielding: 60.0,
            glove: 60.0,
            arm_strength_mph: 80.0,
            release_quickness: 60.0,
            throw_accuracy: 60.0,
            composure: 60.0,
            audacity: 50.0,
            reach_m: 2.4,
        }
    }
}

/// Baserunning attribute sheet.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RunnerAttributes {
    /// Top running speed, 0-100 scale.
    pub speed: f32,
    /// Calibrated home-to-first speed for the batter-runner. Folds the
    /// swing follow-through delay into one number, so the batter does not
    /// get a separate reaction-time model.
    pub home_to_first: f32,
    /// Willingness to run on a negative margin.
    pub audacity: f32,
}

impl RunnerAttributes {
    pub fn average() -> Self {
        Self {
            speed: 60.0,
            home_to_first: 55.0,
            audacity: 50.0,
        }
    }
}

/// One fielder as handed to the engine by the roster layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FielderCard {
    pub name: String,
    pub position: FieldPosition,
    pub attributes: FielderAttributes,
}

/// The batter at the moment of contact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatterCard {
    pub name: String,
    pub handedness: Handedness,
    pub running: RunnerAttributes,
}

/// A runner occupying a base at the moment of contact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerCard {
    pub name: String,
    pub attributes: RunnerAttributes,
}

/// The count at the moment of the pitch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    pub fn new(balls: u8, strikes: u8) -> Self {
        Self { balls, strikes }
    }

    /// Positive when the batter is ahead, negative when behind.
    pub fn leverage(&self) -> i8 {
        self.balls as i8 - self.strikes as i8
    }
}

/// Rule set supplied by the league layer. Era-dependent rules change how
/// the umpire adjudicates catches and how dead balls are awarded.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RulesInEffect {
    /// Historical rule: a foul ball secured on the first bound is an out.
    /// When set, the catch threshold for adjudication is the second bounce
    /// rather than the first.
    pub bound_catch_is_out: bool,
    /// A fair ball bouncing over the outfield wall awards two bases.
    pub ground_rule_double: bool,
}

impl Default for RulesInEffect {
    fn default() -> Self {
        Self {
            bound_catch_is_out: false,
            ground_rule_double: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_index_is_scorekeeping_order() {
        for (i, pos) in FieldPosition::ALL.iter().enumerate() {
            assert_eq!(pos.index(), i);
        }
    }

    #[test]
    fn test_position_groups_partition() {
        for pos in FieldPosition::ALL {
            let groups = [pos.is_infielder(), pos.is_outfielder(), pos.is_battery()];
            assert_eq!(groups.iter().filter(|g| **g).count(), 1, "{:?}", pos);
        }
    }

    #[test]
    fn test_count_leverage() {
        assert_eq!(Count::new(3, 0).leverage(), 3);
        assert_eq!(Count::new(0, 2).leverage(), -2);
    }
}
