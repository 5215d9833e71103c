//! Play resolution demo CLI.
//!
//! Builds sample play setups, runs them through the engine and prints
//! the JSON records. Useful for eyeballing behavior and for piping plays
//! into other tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hb_core::engine::batted_ball::ContactParams;
use hb_core::engine::play::{PlaySetup, PlayingAction};
use hb_core::engine::umpire::{PitchObservation, UmpireProfile};
use hb_core::models::player::{
    BatterCard, Count, FieldPosition, FielderAttributes, FielderCard, Handedness, RulesInEffect,
    RunnerAttributes, RunnerCard,
};

#[derive(Parser)]
#[command(name = "hb_cli")]
#[command(about = "Resolve baseball plays from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single play and print the JSON record
    Play {
        /// RNG seed; same seed reproduces the play exactly
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Exit speed off the bat (mph)
        #[arg(long, default_value = "95.0")]
        exit_speed: f32,

        /// Vertical launch angle (degrees)
        #[arg(long, default_value = "18.0")]
        launch: f32,

        /// Horizontal spray angle (degrees, negative pulls left)
        #[arg(long, default_value = "0.0")]
        spray: f32,

        /// Put a runner on first
        #[arg(long, default_value = "false")]
        runner_on_first: bool,

        /// Outs before the play
        #[arg(long, default_value = "0")]
        outs: u8,
    },

    /// Resolve a batch of plays with random contact and print one JSON
    /// record per line
    Batch {
        /// Seed for the first play; each play increments it
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Number of plays
        #[arg(long, default_value = "10")]
        count: u64,
    },

    /// Adjudicate a sequence of pitches with a freshly generated umpire
    /// and print each call
    Pitches {
        /// RNG seed for the umpire profile and the pitch locations
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of pitches
        #[arg(long, default_value = "20")]
        count: u64,
    },
}

fn default_setup(seed: u64, contact: ContactParams, outs: u8) -> PlaySetup {
    PlaySetup {
        seed,
        batter: BatterCard {
            name: "Batter".into(),
            handedness: Handedness::Right,
            running: RunnerAttributes::average(),
        },
        fielders: FieldPosition::ALL
            .iter()
            .map(|pos| FielderCard {
                name: format!("Fielder {}", pos.code()),
                position: *pos,
                attributes: FielderAttributes::average(),
            })
            .collect(),
        on_first: None,
        on_second: None,
        on_third: None,
        outs,
        count: Count::new(1, 1),
        rules: RulesInEffect::default(),
        umpire: UmpireProfile::neutral(),
        contact,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            seed,
            exit_speed,
            launch,
            spray,
            runner_on_first,
            outs,
        } => {
            let contact = ContactParams {
                exit_speed_mph: exit_speed,
                vertical_angle_deg: launch,
                horizontal_angle_deg: spray,
            };
            let mut setup = default_setup(seed, contact, outs);
            if runner_on_first {
                setup.on_first = Some(RunnerCard {
                    name: "Runner".into(),
                    attributes: RunnerAttributes::average(),
                });
            }
            let mut play = PlayingAction::new(setup).context("building play")?;
            let record = play.run().context("resolving play")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Pitches { seed, count } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let umpire = UmpireProfile::generate(&mut rng);
            let mut balls = 0u8;
            let mut strikes = 0u8;
            let mut previous: Option<bool> = None;
            for _ in 0..count {
                let obs = PitchObservation {
                    cross_x_m: rng.gen_range(-0.45..0.45),
                    cross_z_m: rng.gen_range(0.2..1.4),
                    count: Count::new(balls, strikes),
                    previous_call_was_strike: previous,
                    batter_hand: if rng.gen::<bool>() {
                        Handedness::Right
                    } else {
                        Handedness::Left
                    },
                    pitcher_is_home: true,
                    catcher_framing: 65.0,
                };
                let call = umpire.call_pitch(&mut rng, &obs);
                println!("{}", serde_json::to_string(&call)?);
                previous = Some(call.called_strike);
                if call.called_strike {
                    strikes = (strikes + 1).min(2);
                } else {
                    balls = (balls + 1).min(3);
                }
            }
        }
        Commands::Batch { seed, count } => {
            for i in 0..count {
                let s = seed + i;
                // Spread contact over a plausible spray/launch range,
                // derived from the seed so batches are reproducible.
                let contact = ContactParams {
                    exit_speed_mph: 70.0 + (s % 45) as f32,
                    vertical_angle_deg: -5.0 + (s % 40) as f32,
                    horizontal_angle_deg: -40.0 + ((s * 7) % 80) as f32,
                };
                let setup = default_setup(s, contact, (s % 3) as u8);
                let mut play = PlayingAction::new(setup).context("building play")?;
                let record = play.run().context("resolving play")?;
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }
    Ok(())
}
