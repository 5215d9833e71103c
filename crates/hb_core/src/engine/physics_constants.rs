//! Physics and decision constants for play resolution.
//!
//! Several thresholds are empirically tuned rather than derived; they are
//! kept here under names so they can be adjusted in one place.

/// Tick timing.
pub mod tick {
    /// Fixed timestep for the whole engine (seconds). Trajectory
    /// integration, throws and agent movement all advance on this step.
    pub const DT: f32 = 0.1;

    /// Pre-contact ticks before defenders react (pitch follow-through).
    pub const PRE_CONTACT_TICKS: u32 = 4;

    /// Hard ceiling per play. Exceeding it is a fatal internal error, not
    /// a recoverable condition.
    pub const MAX_TICKS: u32 = 900;
}

/// Ball aerodynamics.
pub mod ball {
    /// Ball mass (kg).
    pub const MASS_KG: f32 = 0.145;
    /// Ball diameter (m).
    pub const DIAMETER_M: f32 = 0.07366;
    /// Drag coefficient for a baseball at game speeds.
    pub const DRAG_COEFFICIENT: f32 = 0.35;
    /// Air density at sea level (kg/m³).
    pub const AIR_DENSITY: f32 = 1.225;
    /// Gravity (m/s²).
    pub const GRAVITY: f32 = 9.81;

    /// Cross-sectional area (m²).
    pub fn cross_section_m2() -> f32 {
        let r = DIAMETER_M / 2.0;
        std::f32::consts::PI * r * r
    }

    /// Horizontal speed below which a grounded ball is marked stopped (m/s).
    pub const STOP_SPEED: f32 = 0.5;
    /// Height below which the ball counts as on the ground (m).
    pub const GROUND_EPS: f32 = 0.02;
}

/// Bounce behavior on grass/dirt and the outfield wall.
pub mod bounce {
    /// Vertical coefficient of restitution off turf.
    pub const TURF_COR: f32 = 0.45;
    /// Horizontal speed retained per bounce.
    pub const TURF_FRICTION: f32 = 0.70;
    /// Restitution off the outfield wall.
    pub const WALL_COR: f32 = 0.55;
    /// Rolling deceleration once bouncing has degenerated (m/s²).
    pub const ROLL_DECEL: f32 = 2.2;
    /// Vertical speed under which a bounce degenerates into a roll (m/s).
    pub const MIN_BOUNCE_SPEED: f32 = 1.2;
}

/// Unit conversions at the boundary. Internals are SI.
pub mod units {
    pub const MPH_TO_MPS: f32 = 0.44704;
    pub const FT_TO_M: f32 = 0.3048;
}

/// Fielding act tuning.
pub mod fielding {
    /// Horizontal reach for a fielding attempt (m). A "chance" farther out
    /// than this is an invariant violation (1 ft).
    pub const REACH_M: f32 = 0.3048;
    /// Height the glove plays best at (m).
    pub const IDEAL_GLOVE_HEIGHT_M: f32 = 0.8;
    /// Difficulty per meter of height away from the ideal glove height.
    pub const HEIGHT_DIFF_COEF: f32 = 0.25;
    /// Difficulty per m/s of lateral closing speed at the attempt.
    pub const LATERAL_MOVE_COEF: f32 = 0.06;
    /// Difficulty per m/s of backward movement at the attempt.
    pub const BACKWARD_MOVE_COEF: f32 = 0.12;
    /// Extra difficulty for plays at the wall.
    pub const WALL_PLAY_PENALTY: f32 = 0.4;
    /// Distance from the wall that makes a play a wall play (m).
    pub const WALL_PLAY_RANGE_M: f32 = 3.0;
    /// Scales difficulty score into failure probability.
    pub const DIFFICULTY_SCALE: f32 = 0.045;
    /// Clean-fielding probability bounds.
    pub const MIN_CLEAN_PROB: f32 = 0.05;
    pub const MAX_CLEAN_PROB: f32 = 0.995;
    /// Share of failures that are bobbles rather than clean misses.
    pub const BOBBLE_SHARE: f32 = 0.55;
    /// Velocity retained by a bobbled ball.
    pub const BOBBLE_DAMPING: f32 = 0.25;
    /// Reorientation lockout after a miss, scaled down by skill (s).
    pub const REORIENT_BASE_S: f32 = 1.2;
    /// Composure shifts per play.
    pub const COMPOSURE_GAIN: f32 = 0.5;
    pub const COMPOSURE_LOSS: f32 = 1.5;

    /// Sprint speed range mapped from the 0-100 speed rating (m/s).
    pub const SPRINT_MIN_MPS: f32 = 5.8;
    pub const SPRINT_SPAN_MPS: f32 = 2.8;

    /// A fielder within this distance of the ball cannot be called off (10 ft).
    pub const CALL_OFF_IMMUNITY_M: f32 = 3.048;
    /// Time advantage required before a call-off is even considered (s).
    pub const CALL_OFF_ADVANTAGE_S: f32 = 0.25;
    /// Base probability of a call-off, scaled by audacity.
    pub const CALL_OFF_BASE_PROB: f32 = 0.65;
    /// Battery zone-ownership handicap; pitcher/catcher own only balls
    /// hit almost straight at them.
    pub const BATTERY_ZONE_PENALTY: f32 = 1.6;
    /// Landing depth beyond which a ball is an outfield ball, which puts
    /// outfielders ahead of infielders in call-off priority (m).
    pub const INFIELD_DEPTH_M: f32 = 45.0;
    /// Slack allowed when matching a fielder's arrival against a
    /// projected ball position (s).
    pub const INTERCEPT_SLACK_S: f32 = 0.05;
    /// Distance under which an unassisted on-foot putout is considered (m).
    pub const UNASSISTED_RANGE_M: f32 = 12.0;
}

/// Throwing model tuning.
pub mod throwing {
    /// Velocity retained per 0.1 s of throw flight. Deliberately mirrors
    /// the estimator fielders and runners use, so beliefs and physics
    /// stay consistent.
    pub const DECAY_PER_STEP: f32 = 0.99;
    /// Release time coefficient (s per sqrt-meter).
    pub const RELEASE_COEF: f32 = 0.11;
    /// Release-time multiplier range from the quickness rating.
    pub const RELEASE_SLOWEST: f32 = 1.5;
    pub const RELEASE_FASTEST: f32 = 0.7;
    /// Accuracy error, meters of standard deviation per meter thrown.
    pub const ERROR_SIGMA_PER_M: f32 = 0.004;
    /// Error multiplier range from the accuracy rating.
    pub const ERROR_WORST: f32 = 1.8;
    pub const ERROR_BEST: f32 = 0.6;
    /// Combined error beyond which the receiver must scramble (m).
    pub const CLEAN_CATCH_TOLERANCE_M: f32 = 1.2;
    /// Handling delay added by a wild throw (s).
    pub const WILD_RECOVERY_S: f32 = 0.45;
    /// Transfer-and-apply delay for a tag after the ball arrives (s).
    pub const TAG_APPLY_S: f32 = 0.35;
    /// Generic arm used for hypothetical throws in runner lookahead (mph).
    pub const GENERIC_ARM_MPH: f32 = 75.0;
    /// Landing depth beyond which an outfield throw goes through a
    /// cut-off man (m).
    pub const RELAY_DEPTH_M: f32 = 72.0;
}

/// Baserunning decision thresholds. The 0.49/0.85 pair and the risk
/// buffers are tuned values, not derived ones.
pub mod baserunning {
    /// Distance between consecutive bases (m, 90 ft).
    pub const BASE_GAP_M: f32 = 27.432;
    /// Progress at which the rounding decision is made.
    pub const ROUND_DECISION_PCT: f32 = 0.49;
    /// Progress past which a blocked runner must hold.
    pub const HOLD_PCT: f32 = 0.85;
    /// Tentative advance speed as a share of full speed.
    pub const TENTATIVE_FACTOR: f32 = 0.35;
    /// Risk buffer subtracted from the beat-the-throw margin (s).
    pub const RISK_BUFFER_BASE_S: f32 = 0.45;
    /// How much of the buffer audacity can remove (s). Fully audacious
    /// runners tolerate a negative margin.
    pub const RISK_BUFFER_AUDACITY_S: f32 = 0.65;
    /// Extra cushion a tentative runner demands before creeping farther
    /// off his base (s).
    pub const TENTATIVE_BUFFER_S: f32 = 0.1;
    /// Margin credit applied when re-evaluating right after a defensive
    /// misplay; keeps aggressive baserunning from being punished for
    /// reacting to errors a tick late.
    pub const MISPLAY_EXTRA_MARGIN_S: f32 = 0.15;
    /// Sprint speed range mapped from the 0-100 speed rating (m/s).
    pub const SPRINT_MIN_MPS: f32 = 6.0;
    pub const SPRINT_SPAN_MPS: f32 = 3.2;
    /// Home-to-first speed range for the batter-runner (m/s); slightly
    /// slower at the bottom to fold in the follow-through.
    pub const H2F_MIN_MPS: f32 = 5.4;
    pub const H2F_SPAN_MPS: f32 = 3.4;
}

/// Umpire adjudication tuning.
pub mod umpire {
    /// Margins tighter than this are ties and go to the tie policy (s).
    pub const TIE_EPS_S: f32 = 0.02;
    /// Strike zone geometry (m): half-width of the plate, and the
    /// vertical band.
    pub const ZONE_HALF_WIDTH_M: f32 = 0.216;
    pub const ZONE_BOTTOM_M: f32 = 0.53;
    pub const ZONE_TOP_M: f32 = 1.05;
}

/// Skill-rating helpers, 0-100 scale at the boundary.
pub mod skills {
    /// Normalize a 0-100 rating into 0.0-1.0.
    pub fn normalize(rating: f32) -> f32 {
        (rating / 100.0).clamp(0.0, 1.0)
    }

    /// Map a 0-100 rating onto `[lo, lo + span]`.
    pub fn scale(rating: f32, lo: f32, span: f32) -> f32 {
        lo + normalize(rating) * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(skills::normalize(-5.0), 0.0);
        assert_eq!(skills::normalize(250.0), 1.0);
        assert!((skills::normalize(50.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cross_section_positive() {
        assert!(ball::cross_section_m2() > 0.0);
        assert!(ball::cross_section_m2() < 0.01);
    }
}
