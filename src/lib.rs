//! SALSA scheduling engine.
//!
//! A constraint-programming engine that turns a calendar, a staffing
//! estimate table, and an employee/contract table into a day-off and
//! shift-assignment schedule (spec §1/§2). The phases run strictly in
//! sequence — normalize, derive contracts and classify the calendar,
//! build decision variables, post hard constraints, build the weighted
//! objective, solve, decode (spec §5 "Ordering") — with no phase
//! observing another's intermediate state.

pub mod api;
pub mod calendar;
pub mod config;
pub mod constraints;
pub mod contract;
pub mod decode;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod error;
pub mod normalize;
pub mod objective;
pub mod reify;
pub mod solver;
pub mod telemetry;
pub mod variables;

use error::{EngineError, EngineResult, EngineWarning};

/// The full output of one engine invocation.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub schedule: decode::DecodedSchedule,
    pub report: solver::SolveReport,
    pub warnings: Vec<EngineWarning>,
}

/// Runs the complete pipeline over one set of raw input tables (spec §2,
/// §5, §6). This is the single entry point every collaborator (HTTP
/// layer, benchmark binary, batch runner) goes through.
pub fn run(raw: &normalize::RawTables, settings: &config::EngineSettings) -> EngineResult<EngineOutput> {
    let (tables, mut warnings) = normalize::normalize(raw)?;

    let horizon = calendar::build_horizon(&tables.calendario, &tables.estimativas)?;
    if horizon.is_empty() {
        return Err(EngineError::EmptyHorizon);
    }

    let (employees, classify_warnings) =
        calendar::classify(&tables.colaborador, &tables.calendario, &horizon, settings);
    warnings.extend(classify_warnings);

    if employees.is_empty() {
        return Err(EngineError::EmptyWorkforce);
    }

    let (schedule, report) = solver::solve(&employees, &horizon, settings)?;

    Ok(EngineOutput {
        schedule,
        report,
        warnings,
    })
}
