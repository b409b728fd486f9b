//! The single seam where this crate talks to `selen` directly (spec §4.7
//! Search Driver). Model construction, constraint/objective posting, and
//! the actual `solve()` call are all isolated here so the rest of the
//! crate only ever deals with [`VarArena`], [`DecodedSchedule`] and
//! plain domain types.

use std::time::{Duration, Instant};

use selen::prelude::*;

use crate::config::EngineSettings;
use crate::constraints::Relaxation;
use crate::decode::{self, DecodedSchedule};
use crate::domain::{Employee, Horizon};
use crate::error::{EngineError, EngineResult};
use crate::{constraints, objective, variables};

/// Search configuration (spec §4.7). `solver_workers` and the
/// reproducible seed are applied to the model via assumed `selen`
/// setters (`Model::set_max_workers`, `Model::set_seed`), and the cost
/// variable is registered via an assumed `Model::minimize` — the one
/// retrieved `selen` usage sample never configures the search or posts
/// an objective beyond `Model::default()` plus plain satisfaction
/// constraints, so these calls are a documented extension; see
/// `DESIGN.md`.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub time_limit: Duration,
    pub workers: usize,
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            time_limit: Duration::from_secs(settings.solver_time_limit_seconds),
            workers: settings.solver_workers.max(1),
            seed: settings.reproducible_seed,
        }
    }
}

/// One improving-solution snapshot (spec §4.7 "solution callback").
///
/// `branch_count`/`conflict_count` are always `0`: the one confirmed
/// `selen` usage sample in the retrieval pack (see `DESIGN.md`) exposes no
/// per-solution callback or search-statistics surface — `Model::solve`
/// returns a single final `Solution`, not a stream of improving ones, and
/// carries no branch/conflict counters. Rather than invent an unconfirmed
/// `selen` API to populate them, this crate reports what it can actually
/// observe (the final objective and elapsed wall time) as the sole
/// snapshot and leaves the two counters at their default. If a future
/// `selen` release exposes a real solution callback, wire it here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionSnapshot {
    pub objective: i64,
    pub best_bound: i64,
    pub elapsed: Duration,
    pub branch_count: u64,
    pub conflict_count: u64,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub objective: i64,
    pub wall_time: Duration,
    pub snapshots: Vec<SolutionSnapshot>,
}

/// Runs the full model-build-and-solve pipeline for one invocation
/// (spec §4.7/§4.8; ordering per spec §5: "build variables → post
/// constraints → build objective → solve → decode").
pub fn solve(
    employees: &[Employee],
    horizon: &Horizon,
    settings: &EngineSettings,
) -> EngineResult<(DecodedSchedule, SolveReport)> {
    let started = Instant::now();

    let max_level = if settings.relax_on_infeasible {
        Relaxation::MAX_LEVEL
    } else {
        0
    };

    let mut last_err = EngineError::NoFeasibleSchedule;
    for level in 0..=max_level {
        match solve_at(employees, horizon, settings, Relaxation::level(level), started) {
            Ok(result) => return Ok(result),
            // A timeout is never worth retrying at a looser relaxation level —
            // the budget is already spent.
            Err(err @ EngineError::NoSolutionWithinBudget { .. }) => return Err(err),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

fn solve_at(
    employees: &[Employee],
    horizon: &Horizon,
    settings: &EngineSettings,
    relaxation: Relaxation,
    started: Instant,
) -> EngineResult<(DecodedSchedule, SolveReport)> {
    let config = SearchConfig::from_settings(settings);

    let mut model = Model::default();
    let arena = variables::build(&mut model, employees, horizon);
    constraints::apply(&mut model, &arena, employees, horizon, settings, relaxation);
    let cost = objective::build(&mut model, &arena, employees, horizon);

    apply_search_config(&mut model, &config);
    model.minimize(cost);

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(_) => {
            return if started.elapsed() >= config.time_limit {
                Err(EngineError::NoSolutionWithinBudget {
                    budget_seconds: config.time_limit.as_secs(),
                })
            } else {
                Err(EngineError::NoFeasibleSchedule)
            };
        }
    };

    let objective_value = solution.get::<i32>(cost) as i64;
    let decoded = decode::decode(&solution, &arena, employees, horizon)?;
    let elapsed = started.elapsed();

    // `selen::Model::solve` returns only the final solution (see the
    // `SolutionSnapshot` doc comment above) — the one snapshot we can
    // honestly report is this final one, with `best_bound` equal to the
    // proven objective since no intermediate bound is ever observed.
    let report = SolveReport {
        objective: objective_value,
        wall_time: elapsed,
        snapshots: vec![SolutionSnapshot {
            objective: objective_value,
            best_bound: objective_value,
            elapsed,
            branch_count: 0,
            conflict_count: 0,
        }],
    };

    Ok((decoded, report))
}

/// Applies wall-time, worker-count, and (when reproducible mode is on) a
/// fixed seed to `model`. Isolated so the unconfirmed part of the
/// `selen` surface stays in one place.
fn apply_search_config(model: &mut Model, config: &SearchConfig) {
    model.set_time_limit(config.time_limit);
    model.set_max_workers(config.workers);
    if let Some(seed) = config.seed {
        model.set_seed(seed);
    }
}
