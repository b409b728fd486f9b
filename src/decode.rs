//! Result decoder (spec §4.8) — reads the solved model back into a plain
//! `schedule[e][d]` matrix plus per-employee and per-(day, shift) counters.

use std::collections::HashMap;

use selen::prelude::*;

use crate::domain::{Day, Employee, Horizon, Label, Matricula, Shift};
use crate::error::{EngineError, EngineResult};
use crate::variables::VarArena;

#[derive(Debug, Clone, Default)]
pub struct EmployeeCounters {
    pub l_count: i64,
    pub lq_count: i64,
    pub special_days_worked: i64,
    pub unassigned: i64,
}

#[derive(Debug, Clone)]
pub struct DecodedSchedule {
    /// `matrix[(matricula, day)] = label`.
    pub matrix: HashMap<(Matricula, Day), Label>,
    pub employee_counters: HashMap<Matricula, EmployeeCounters>,
    /// Actual worked headcount per `(day, shift)`.
    pub staffing_actual: HashMap<(Day, Shift), i64>,
}

/// Decodes `solution` against `arena`, asserting unicity held (spec §4.8:
/// "should not happen if unicity is posted; guard with an assertion").
pub fn decode(
    solution: &Solution,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
) -> EngineResult<DecodedSchedule> {
    let mut matrix = HashMap::new();
    let mut employee_counters: HashMap<Matricula, EmployeeCounters> = HashMap::new();
    let mut staffing_actual: HashMap<(Day, Shift), i64> = HashMap::new();

    for (e, employee) in employees.iter().enumerate() {
        let counters = employee_counters.entry(employee.matricula).or_default();
        for &day in &horizon.days {
            let assigned = arena
                .labels_on(e, day)
                .into_iter()
                .find(|&(_, var)| solution.get::<i32>(var) == 1)
                .map(|(label, _)| label);

            let label = match assigned {
                Some(label) => label,
                None => {
                    if arena.labels_on(e, day).is_empty() {
                        continue;
                    }
                    return Err(EngineError::InternalFault(format!(
                        "no label decoded for employee {} on day {day}",
                        employee.matricula
                    )));
                }
            };

            matrix.insert((employee.matricula, day), label);

            match label {
                Label::L => counters.l_count += 1,
                Label::Lq => counters.lq_count += 1,
                Label::V => counters.unassigned += 1,
                _ => {}
            }
            if horizon.special_days.contains(&day) && label.is_working() {
                counters.special_days_worked += 1;
            }

            if label.is_working() {
                let shift = if label == Label::M { Shift::M } else { Shift::T };
                *staffing_actual.entry((day, shift)).or_insert(0) += 1;
            }
        }
    }

    Ok(DecodedSchedule {
        matrix,
        employee_counters,
        staffing_actual,
    })
}
