//! JSON API for play resolution.
//!
//! Thin serde wrapper over the engine so a surrounding game loop (or a
//! non-Rust host) can resolve plays without linking against the types:
//! hand in a `PlayRequest`, get a `PlayResponse` back.

use serde::{Deserialize, Serialize};

use crate::engine::play::{PlaySetup, PlayingAction};
use crate::error::Result;
use crate::models::outcome::PlayRecord;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayRequest {
    pub setup: PlaySetup,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub record: PlayRecord,
}

/// Resolve one play from a JSON request, returning the JSON record.
pub fn resolve_play_json(request_json: &str) -> Result<String> {
    let request: PlayRequest = serde_json::from_str(request_json)?;
    let mut play = PlayingAction::new(request.setup)?;
    let record = play.run()?;
    let response = PlayResponse { record };
    Ok(serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::batted_ball::ContactParams;
    use crate::engine::umpire::UmpireProfile;
    use crate::models::player::{
        BatterCard, Count, FieldPosition, FielderAttributes, FielderCard, Handedness,
        RulesInEffect, RunnerAttributes,
    };

    fn setup() -> PlaySetup {
        PlaySetup {
            seed: 1234,
            batter: BatterCard {
                name: "batter".into(),
                handedness: Handedness::Right,
                running: RunnerAttributes::average(),
            },
            fielders: FieldPosition::ALL
                .iter()
                .map(|pos| FielderCard {
                    name: format!("f-{}", pos.code()),
                    position: *pos,
                    attributes: FielderAttributes::average(),
                })
                .collect(),
            on_first: None,
            on_second: None,
            on_third: None,
            outs: 0,
            count: Count::new(0, 0),
            rules: RulesInEffect::default(),
            umpire: UmpireProfile::neutral(),
            contact: ContactParams {
                exit_speed_mph: 92.0,
                vertical_angle_deg: 14.0,
                horizontal_angle_deg: 8.0,
            },
        }
    }

    #[test]
    fn test_json_round_trip() {
        let request = PlayRequest { setup: setup() };
        let json = serde_json::to_string(&request).unwrap();
        let out = resolve_play_json(&json).unwrap();
        let response: PlayResponse = serde_json::from_str(&out).unwrap();
        assert_eq!(response.record.seed, 1234);
        assert!(response.record.ticks > 0);
    }

    #[test]
    fn test_bad_json_is_deserialization_error() {
        let err = resolve_play_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::PlayError::Deserialization(_)));
    }

    #[test]
    fn test_same_request_same_record() {
        let request = PlayRequest { setup: setup() };
        let json = serde_json::to_string(&request).unwrap();
        let a = resolve_play_json(&json).unwrap();
        let b = resolve_play_json(&json).unwrap();
        assert_eq!(a, b);
    }
}
