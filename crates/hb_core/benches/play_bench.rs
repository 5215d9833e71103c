//! Play resolution benchmark.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hb_core::engine::batted_ball::ContactParams;
use hb_core::engine::play::{PlaySetup, PlayingAction};
use hb_core::engine::umpire::UmpireProfile;
use hb_core::models::player::{
    BatterCard, Count, FieldPosition, FielderAttributes, FielderCard, Handedness, RulesInEffect,
    RunnerAttributes, RunnerCard,
};

fn setup(seed: u64) -> PlaySetup {
    PlaySetup {
        seed,
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
        on_first: Some(RunnerCard {
            name: "r1".into(),
            attributes: RunnerAttributes::average(),
        }),
        on_second: None,
        on_third: None,
        outs: 1,
        count: Count::new(1, 1),
        rules: RulesInEffect::default(),
        umpire: UmpireProfile::neutral(),
        contact: ContactParams {
            exit_speed_mph: 92.0,
            vertical_angle_deg: 14.0,
            horizontal_angle_deg: -10.0,
        },
    }
}

fn bench_resolve_play(c: &mut Criterion) {
    c.bench_function("resolve_play", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let mut play = PlayingAction::new(setup(seed)).expect("valid setup");
            black_box(play.run().expect("play resolves"))
        })
    });
}

criterion_group!(benches, bench_resolve_play);
criterion_main!(benches);
