//! Wire DTOs for the HTTP surface (spec §6 External Interfaces). These
//! mirror the three input tables and the two output shapes at the JSON
//! boundary; everything past [`crate::normalize`] uses the typed domain
//! model instead.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineSettings;
use crate::decode::DecodedSchedule;
use crate::domain::{Label, Matricula, Shift};
use crate::error::EngineWarning;
use crate::normalize::{CellValue, RawTable, RawTables};
use crate::solver::SolveReport;

/// A request body carrying the three raw input tables plus settings
/// (spec §6 "Input (in-memory)").
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub calendario: Vec<HashMap<String, Value>>,
    pub estimativas: Vec<HashMap<String, Value>>,
    pub colaborador: Vec<HashMap<String, Value>>,
    #[serde(default)]
    pub settings: EngineSettings,
}

impl ScheduleRequest {
    pub fn into_raw_tables(self) -> RawTables {
        RawTables {
            calendario: rows_to_table(self.calendario),
            estimativas: rows_to_table(self.estimativas),
            colaborador: rows_to_table(self.colaborador),
        }
    }
}

fn rows_to_table(rows: Vec<HashMap<String, Value>>) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    let mut out_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut out = HashMap::with_capacity(row.len());
        for (key, value) in row {
            if !columns.contains(&key) {
                columns.push(key.clone());
            }
            out.insert(key, json_to_cell(value));
        }
        out_rows.push(out);
    }
    RawTable { columns, rows: out_rows }
}

fn json_to_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else {
                CellValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(date) => CellValue::Date(date),
            Err(_) => CellValue::Text(s),
        },
        Value::Array(_) | Value::Object(_) => CellValue::Null,
    }
}

/// `schedule_matrix` rows (spec §6 "Output").
#[derive(Debug, Serialize)]
pub struct ScheduleRow {
    pub worker: Matricula,
    pub days: HashMap<u16, &'static str>,
}

#[derive(Debug, Serialize, Default)]
pub struct EmployeeSummaryDto {
    pub l_count: i64,
    pub lq_count: i64,
    pub special_days_worked: i64,
    pub unassigned: i64,
}

/// One `(day, shift)` actual-staffing count (spec §4.8/§6 "per-day
/// summary counters").
#[derive(Debug, Serialize)]
pub struct StaffingActualDto {
    pub day: u16,
    pub shift: &'static str,
    pub actual: i64,
}

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub objective: i64,
    pub status: &'static str,
    pub wall_time_seconds: f64,
    pub per_employee: HashMap<Matricula, EmployeeSummaryDto>,
    pub per_day_shift: Vec<StaffingActualDto>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule_matrix: Vec<ScheduleRow>,
    pub report: ReportDto,
}

impl ScheduleResponse {
    pub fn build(schedule: &DecodedSchedule, report: &SolveReport, warnings: &[EngineWarning]) -> Self {
        let mut by_worker: HashMap<Matricula, HashMap<u16, &'static str>> = HashMap::new();
        for (&(worker, day), label) in &schedule.matrix {
            by_worker.entry(worker).or_default().insert(day, label.wire());
        }
        let schedule_matrix = by_worker
            .into_iter()
            .map(|(worker, days)| ScheduleRow { worker, days })
            .collect();

        let per_employee = schedule
            .employee_counters
            .iter()
            .map(|(&worker, c)| {
                (
                    worker,
                    EmployeeSummaryDto {
                        l_count: c.l_count,
                        lq_count: c.lq_count,
                        special_days_worked: c.special_days_worked,
                        unassigned: c.unassigned,
                    },
                )
            })
            .collect();

        let per_day_shift = schedule
            .staffing_actual
            .iter()
            .map(|(&(day, shift), &actual)| StaffingActualDto {
                day,
                shift: match shift {
                    Shift::M => "M",
                    Shift::T => "T",
                },
                actual,
            })
            .collect();

        Self {
            schedule_matrix,
            report: ReportDto {
                objective: report.objective,
                status: "OPTIMAL_OR_FEASIBLE",
                wall_time_seconds: report.wall_time.as_secs_f64(),
                per_employee,
                per_day_shift,
                warnings: warnings.iter().map(describe_warning).collect(),
            },
        }
    }
}

fn describe_warning(warning: &EngineWarning) -> String {
    match warning {
        EngineWarning::ContractInvalid { matricula, reason } => {
            format!("employee {matricula}: invalid contract ({reason})")
        }
        EngineWarning::NegativeLq { matricula, l_q } => {
            format!("employee {matricula}: negative computed l_q ({l_q})")
        }
        EngineWarning::EmptyWorkingDays { matricula } => {
            format!("employee {matricula}: no working days in horizon")
        }
        EngineWarning::OrphanedEmployee { matricula, present_in } => {
            format!("employee {matricula}: present only in `{present_in}`")
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub solver_engine: &'static str,
}

/// A pinned-assignment representation used by `/demo-data` previews and
/// the idempotence check in `tests/` — shows a single assigned label per
/// (worker, day) without the report wrapper.
#[derive(Debug, Serialize)]
pub struct DemoDataResponse {
    pub employee_count: usize,
    pub horizon_days: usize,
    pub sample_cells: Vec<(Matricula, u16, Label)>,
}
