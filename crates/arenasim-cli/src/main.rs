//! Headless engine binary: the process `arenasim-mc` spawns per job.
//! Reads the mode-specific request body (not the outer tagged job
//! envelope — the bridge already picked the subcommand) from stdin,
//! runs it, and streams `arenasim_mc::protocol::OutputLine` JSON-lines
//! to stdout as it goes, finishing with a `result` line. Never talks to
//! the bridge's `JobStore` directly; that coupling lives on the other
//! side of the pipe.

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use arenasim_core::enums::Side;
use arenasim_mc::{BatchRequest, BatchResult, DoeRequest, DoeResult, OutputLine, PermutationResult, ReplayRequest, ReplayResult, RunOutcome, SummaryStats, TrajectorySample};
use arenasim_sim::{Simulation, SimulationConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Replicate a scenario `runs` times with independent seeds.
    Batch,
    /// Run one replication, sampling observable state on an interval.
    Replay,
    /// Sweep a list of scenario-config permutations, one run each.
    Doe,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Args::parse();
    let mut body = String::new();
    std::io::stdin().read_to_string(&mut body).context("reading job request from stdin")?;

    let start = std::time::Instant::now();
    let result = match args.mode {
        Mode::Batch => {
            let request: BatchRequest = serde_json::from_str(&body).context("parsing batch request")?;
            run_batch(request)?
        }
        Mode::Replay => {
            let request: ReplayRequest = serde_json::from_str(&body).context("parsing replay request")?;
            run_replay(request)?
        }
        Mode::Doe => {
            let request: DoeRequest = serde_json::from_str(&body).context("parsing doe request")?;
            run_doe(request)?
        }
    };

    emit(&OutputLine::Done { elapsed: start.elapsed().as_secs_f64() });
    emit(&OutputLine::Result { result });
    Ok(())
}

fn emit(line: &OutputLine) {
    println!("{}", serde_json::to_string(line).expect("OutputLine always serializes"));
}

/// One replication: advance `dt`-sized ticks until `max_time`, then read
/// off the winner and survivor counts from the final observable state.
fn run_one(scenario_json: &str, seed: u64, max_time: f64, dt: f64) -> Result<RunOutcome> {
    let config = SimulationConfig { seed, ..SimulationConfig::default() };
    let mut sim = Simulation::load(scenario_json, config).context("loading scenario")?;

    let mut state = sim.tick(0.0);
    let mut elapsed = 0.0;
    while elapsed < max_time {
        state = sim.tick(dt);
        elapsed += dt;
    }

    let survivors_blue = state.entities.iter().filter(|e| e.alive && e.team == Side::Blue).count() as u32;
    let survivors_red = state.entities.iter().filter(|e| e.alive && e.team == Side::Red).count() as u32;
    let winner = match (survivors_blue > 0, survivors_red > 0) {
        (true, false) => Some("blue".to_string()),
        (false, true) => Some("red".to_string()),
        _ => None,
    };

    Ok(RunOutcome {
        run: 0,
        seed,
        winner,
        survivors_blue,
        survivors_red,
        final_sim_time: sim.sim_time().elapsed_secs,
    })
}

/// Each replication is independent state (its own `Simulation`, its own
/// seed derived from the batch seed) so runs are embarrassingly
/// parallel — one OS thread per replication, no shared mutable state.
fn run_batch(request: BatchRequest) -> Result<serde_json::Value> {
    let scenario_json = request.scenario.to_string();
    let total = request.runs.max(1);

    let handles: Vec<_> = (0..total)
        .map(|run| {
            let scenario_json = scenario_json.clone();
            let seed = request.seed.wrapping_add(run as u64);
            let max_time = request.max_time;
            let dt = request.dt;
            std::thread::spawn(move || run_one(&scenario_json, seed, max_time, dt).map(|mut o| {
                o.run = run;
                o
            }))
        })
        .collect();

    let mut runs = Vec::with_capacity(total as usize);
    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.join().map_err(|_| anyhow::anyhow!("replication {i} thread panicked"))??;
        emit(&OutputLine::RunComplete { run: outcome.run, total });
        runs.push(outcome);
    }

    let mut win_rates = std::collections::HashMap::new();
    for side in ["blue", "red"] {
        let wins = runs.iter().filter(|r| r.winner.as_deref() == Some(side)).count();
        win_rates.insert(side.to_string(), wins as f64 / runs.len() as f64);
    }

    let n = runs.len() as f64;
    let summary = SummaryStats {
        mean_final_sim_time: runs.iter().map(|r| r.final_sim_time).sum::<f64>() / n,
        mean_survivors_blue: runs.iter().map(|r| r.survivors_blue as f64).sum::<f64>() / n,
        mean_survivors_red: runs.iter().map(|r| r.survivors_red as f64).sum::<f64>() / n,
    };

    Ok(serde_json::to_value(BatchResult { runs, win_rates, summary })?)
}

fn run_replay(request: ReplayRequest) -> Result<serde_json::Value> {
    let scenario_json = request.scenario.to_string();
    let config = SimulationConfig { seed: request.seed, ..SimulationConfig::default() };
    let mut sim = Simulation::load(&scenario_json, config).context("loading scenario")?;

    let mut trajectory = Vec::new();
    let mut elapsed = 0.0;
    let mut since_sample = request.sample_interval;
    let mut step = 0u64;

    while elapsed < request.max_time {
        let state = sim.tick(request.dt);
        elapsed += request.dt;
        step += 1;
        since_sample += request.dt;
        if since_sample >= request.sample_interval {
            since_sample -= request.sample_interval;
            let sim_time = sim.sim_time().elapsed_secs;
            trajectory.push(TrajectorySample { step, sim_time, state: serde_json::to_value(&state)? });
            emit(&OutputLine::ReplayProgress { step, total_steps: (request.max_time / request.dt).round() as u64, sim_time });
        }
    }

    Ok(serde_json::to_value(ReplayResult { trajectory })?)
}

/// Each permutation is a JSON-merge of `arena_config` with the
/// permutation's own overrides, run once like a single-run batch.
fn run_doe(request: DoeRequest) -> Result<serde_json::Value> {
    let total = request.permutations.len();
    let mut results = Vec::with_capacity(total);

    for (index, permutation) in request.permutations.iter().enumerate() {
        let scenario = merge_json(&request.arena_config, permutation);
        let seed = request.seed.wrapping_add(index as u64);
        let outcome = run_one(&scenario.to_string(), seed, request.max_time, 0.1)
            .with_context(|| format!("permutation {index} failed"))?;
        emit(&OutputLine::RunComplete { run: index as u32, total: total as u32 });
        results.push(PermutationResult { permutation_index: index, params: permutation.clone(), outcome });
    }

    Ok(serde_json::to_value(DoeResult { total_permutations: total, results })?)
}

fn merge_json(base: &serde_json::Value, patch: &serde_json::Value) -> serde_json::Value {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in patch_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => merge_json(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            serde_json::Value::Object(merged)
        }
        (_, patch) => patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_leaf_keys_and_keeps_unrelated_base_keys() {
        let base = serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}});
        let patch = serde_json::json!({"b": {"c": 99}});
        let merged = merge_json(&base, &patch);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"]["c"], 99);
        assert_eq!(merged["b"]["d"], 3);
    }

    #[test]
    fn merge_replaces_non_object_values_wholesale() {
        let base = serde_json::json!({"list": [1, 2, 3]});
        let patch = serde_json::json!({"list": [9]});
        let merged = merge_json(&base, &patch);
        assert_eq!(merged["list"], serde_json::json!([9]));
    }
}
