//! The error surface of the engine (see spec §7).

use thiserror::Error;

/// Everything that can go wrong building or solving a schedule.
///
/// `ContractInvalid` is collected as a warning, not surfaced through this
/// type — an employee with invalid contract data is dropped from the
/// optimizable set and the rest of the solve proceeds (spec §7).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing required table `{0}`")]
    MissingTable(&'static str),

    #[error("table `{table}` is missing required column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("no employees remain in the active working set after classification")]
    EmptyWorkforce,

    #[error("horizon contains no days")]
    EmptyHorizon,

    #[error("no assignment satisfies the hard constraints")]
    NoFeasibleSchedule,

    #[error("solver exhausted its time budget ({budget_seconds}s) without a feasible solution")]
    NoSolutionWithinBudget { budget_seconds: u64 },

    #[error("internal invariant violated: {0}")]
    InternalFault(String),
}

/// Non-fatal conditions recorded alongside a successful solve (spec §7).
#[derive(Debug, Clone)]
pub enum EngineWarning {
    /// A specific employee's contract data was absent or `total_l <= 0`;
    /// the employee was dropped from the optimizable set.
    ContractInvalid { matricula: i64, reason: String },
    /// A derived `l_q` came out negative.
    NegativeLq { matricula: i64, l_q: i64 },
    /// An employee's `working_days` set is empty after classification.
    EmptyWorkingDays { matricula: i64 },
    /// An employee matricula appears in only one of `colaborador`/`calendario`.
    OrphanedEmployee { matricula: i64, present_in: &'static str },
}

pub type EngineResult<T> = Result<T, EngineError>;
