//! Grid-world episode generation for the MCTS planner.
//!
//! Runs complete episodes on the classic 4x4 map: one fresh search per
//! decision, real transition fed back, repeat until termination or the
//! step cap. Optionally saves full trajectories in MessagePack format.

use anyhow::{Context, Result};
use clap::Parser;
use planner_core::Environment;
use planner_mcts::envs::GridWorld;
use planner_mcts::{Mcts, MctsConfig, RandomRollout};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Run MCTS-planned episodes on the grid world.
#[derive(Parser)]
#[command(name = "planner-episodes")]
#[command(about = "Generate grid-world episodes planned with MCTS")]
struct Cli {
    /// Number of episodes to run.
    #[arg(short, long, default_value = "10")]
    episodes: usize,

    /// Number of search iterations per decision.
    #[arg(short, long, default_value = "1000")]
    iterations: usize,

    /// UCB1 exploration weight used during search.
    #[arg(long, default_value = "1.41")]
    exploration: f32,

    /// Maximum steps per planning rollout.
    #[arg(long, default_value = "100")]
    rollout_steps: usize,

    /// Maximum real steps per episode.
    #[arg(long, default_value = "100")]
    max_steps: usize,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Run episodes in parallel, one environment and planner each.
    #[arg(long)]
    parallel: bool,

    /// Directory for MessagePack trajectory records (not written if absent).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// A single step of a real (non-simulated) trajectory.
#[derive(Serialize, Deserialize, Debug)]
struct EpisodeStep {
    /// Cell the step was taken from.
    state: usize,

    /// Move index (0 left, 1 down, 2 right, 3 up).
    action: u8,

    /// Immediate reward emitted by the step.
    reward: f32,
}

/// A complete episode trajectory.
#[derive(Serialize, Deserialize, Debug)]
struct EpisodeRecord {
    /// Sequence of real steps.
    steps: Vec<EpisodeStep>,

    /// Sum of rewards over the episode.
    total_reward: f32,

    /// Whether the episode terminated before the step cap.
    terminated: bool,

    /// Optional metadata.
    metadata: HashMap<String, serde_json::Value>,
}

/// Run one episode: plan, take the real step, feed the new state back.
fn run_episode(cli: &Cli, seed: u64) -> Result<EpisodeRecord> {
    let mut env = GridWorld::four_by_four();

    let config = MctsConfig {
        iterations: cli.iterations,
        exploration_weight: cli.exploration,
    };
    let rollouts = RandomRollout::new(
        ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        cli.rollout_steps,
    );
    let mut planner = Mcts::new(config, rollouts, ChaCha8Rng::seed_from_u64(seed));

    let mut steps = Vec::new();
    let mut total_reward = 0.0;
    let mut terminated = false;
    let mut state = env.reset();

    for _ in 0..cli.max_steps {
        let action = planner
            .search(&mut env, state)
            .context("planning a grid-world move")?;

        // Planning rollouts moved the environment's internal position;
        // re-enter at the real state before taking the real step.
        env.set_state(&state)?;
        let transition = env.step(&state, action)?;

        steps.push(EpisodeStep {
            state,
            action: action.index() as u8,
            reward: transition.reward,
        });
        total_reward += transition.reward;

        if transition.terminated {
            terminated = true;
            break;
        }
        state = transition.state;
    }

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert("iterations".to_string(), serde_json::json!(cli.iterations));

    Ok(EpisodeRecord {
        steps,
        total_reward,
        terminated,
        metadata,
    })
}

/// Save an episode record to a MessagePack file.
fn save_record(record: &EpisodeRecord, output: &PathBuf, index: usize) -> Result<()> {
    let path = output.join(format!("episode_{index:04}.msgpack"));
    let file = File::create(&path).with_context(|| format!("creating {path:?}"))?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write_named(&mut writer, record)
        .with_context(|| format!("writing {path:?}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(output) = &cli.output {
        fs::create_dir_all(output).with_context(|| format!("creating {output:?}"))?;
    }

    println!("Running {} grid-world episodes", cli.episodes);
    println!("Iterations per decision: {}", cli.iterations);
    println!("Seed: {}", cli.seed);

    let start = Instant::now();

    let records: Vec<EpisodeRecord> = if cli.parallel {
        // One environment and one planner per episode; nothing is shared.
        (0..cli.episodes)
            .into_par_iter()
            .map(|i| run_episode(&cli, cli.seed.wrapping_add(i as u64)))
            .collect::<Result<_>>()?
    } else {
        let mut records = Vec::with_capacity(cli.episodes);
        for i in 0..cli.episodes {
            records.push(run_episode(&cli, cli.seed.wrapping_add(i as u64))?);
            if (i + 1) % 10 == 0 {
                println!("  Completed {} episodes...", i + 1);
            }
        }
        records
    };

    if let Some(output) = &cli.output {
        for (i, record) in records.iter().enumerate() {
            save_record(record, output, i)?;
        }
    }

    let elapsed = start.elapsed();
    let successes = records.iter().filter(|r| r.total_reward > 0.0).count();
    let total_steps: usize = records.iter().map(|r| r.steps.len()).sum();
    let avg_steps = total_steps as f32 / records.len().max(1) as f32;

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!(
        "Goal reached: {} / {} ({:.1}%)",
        successes,
        records.len(),
        successes as f32 / records.len().max(1) as f32 * 100.0
    );
    println!("Average episode length: {avg_steps:.1} steps");
    if let Some(output) = &cli.output {
        println!("Records saved to: {output:?}");
    }

    Ok(())
}
