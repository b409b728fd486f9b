//! Synthetic demo data (spec `SPEC_FULL.md` §B "Demo/bench data").
//!
//! Generates the three raw tables the engine expects straight from a
//! deterministic RNG, the same shape `/demo-data/{size}` hands back to a
//! caller that wants something to POST to `/schedules` without first
//! assembling a real roster.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::normalize::{CellValue, RawTable, RawTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSize {
    Small,
    Medium,
    Large,
}

impl std::str::FromStr for DemoSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(DemoSize::Small),
            "medium" => Ok(DemoSize::Medium),
            "large" => Ok(DemoSize::Large),
            _ => Err(()),
        }
    }
}

struct SizeParameters {
    employee_count: usize,
    weeks: i64,
}

impl DemoSize {
    fn parameters(&self) -> SizeParameters {
        match self {
            DemoSize::Small => SizeParameters { employee_count: 6, weeks: 4 },
            DemoSize::Medium => SizeParameters { employee_count: 20, weeks: 8 },
            DemoSize::Large => SizeParameters { employee_count: 60, weeks: 13 },
        }
    }
}

/// One week's worked-shift pattern, Monday through Sunday. `None` marks an
/// off day (`L`); Sunday is always off here, the off-pattern rotates across
/// employees via `offset` so not everybody shares the same weekend.
const BASE_PATTERN: [Option<&str>; 7] = [
    Some("M"),
    Some("M"),
    Some("T"),
    Some("T"),
    Some("M"),
    None,
    None,
];

fn shift_for(day_index: usize, offset: usize) -> Option<&'static str> {
    BASE_PATTERN[(day_index + offset) % 7]
}

/// Builds a synthetic raw-table bundle sized `small`, `medium`, or `large`.
pub fn generate(size: DemoSize) -> RawTables {
    let params = size.parameters();
    let mut rng = StdRng::seed_from_u64(42);

    let start_date = find_next_monday(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let total_days = params.weeks * 7;

    let closed_holiday_day = total_days / 2;
    let regular_holiday_day = (total_days / 3).max(2);

    let mut calendario_rows = Vec::new();
    let mut estimativas_rows = Vec::new();
    let mut colaborador_rows = Vec::with_capacity(params.employee_count);

    // One manager, one keyholder, everybody else a normal worker; one in
    // four employees runs the "complete" cycle (weekends genuinely free).
    for idx in 0..params.employee_count {
        let matricula = 1000 + idx as i64;
        let cycle = if idx % 4 == 0 { "complete" } else { "other" };
        let prioridade_folgas = if idx == 0 {
            95
        } else if idx == 1 {
            60
        } else {
            0
        };

        let sundays_in_horizon = params.weeks;
        let l_dom = sundays_in_horizon;
        let l_total = params.weeks * 2 + 2;

        colaborador_rows.push(cell_row(&[
            ("matricula", CellValue::Int(matricula)),
            ("cycle", CellValue::Text(cycle.to_string())),
            ("contract_type", CellValue::Int(5)),
            ("tipo_contrato", CellValue::Int(5)),
            ("l_total", CellValue::Int(l_total)),
            ("l_dom", CellValue::Int(l_dom)),
            ("l_dom_salsa", CellValue::Int(l_dom)),
            ("c2d", CellValue::Int(2)),
            ("c3d", CellValue::Int(0)),
            ("l_d", CellValue::Int(0)),
            ("l_q", CellValue::Int(0)),
            ("cxx", CellValue::Int(0)),
            ("vz", CellValue::Int(0)),
            ("l_res", CellValue::Int(0)),
            ("l_res2", CellValue::Int(0)),
            ("t_lq", CellValue::Int(1)),
            ("data_admissao", CellValue::Null),
            ("data_demissao", CellValue::Null),
            ("prioridade_folgas", CellValue::Int(prioridade_folgas)),
        ]));

        let offset = idx % 7;
        for day in 0..total_days {
            let date = start_date + Duration::days(day);
            let week = 1 + day / 7;
            let weekday_index = (day % 7) as usize;

            let dia_tipo = if day == closed_holiday_day {
                "fechado"
            } else if day == regular_holiday_day && date.weekday() != chrono::Weekday::Sun {
                "feriado"
            } else {
                "normal"
            };

            let tipo_turno = if date.weekday() == chrono::Weekday::Sun {
                if cycle == "complete" { "L" } else { "L_DOM" }
            } else {
                match shift_for(weekday_index, offset) {
                    Some(shift) => shift,
                    None => "L",
                }
            };

            calendario_rows.push(cell_row(&[
                ("colaborador", CellValue::Int(matricula)),
                ("data", CellValue::Date(date)),
                ("wd", CellValue::Int(weekday_index as i64 + 1)),
                ("dia_tipo", CellValue::Text(dia_tipo.to_string())),
                ("tipo_turno", CellValue::Text(tipo_turno.to_string())),
                ("ww", CellValue::Int(week)),
            ]));
        }
    }

    for day in 0..total_days {
        let date = start_date + Duration::days(day);
        let weekday_index = (day % 7) as usize;
        if date.weekday() == chrono::Weekday::Sun {
            continue;
        }
        for (turno, fk) in [("M", 1i64), ("T", 2i64)] {
            let working = params
                .employee_count
                .min(params.employee_count / 2 + rng.gen_range(0..3));
            let media = working as f64;
            estimativas_rows.push(cell_row(&[
                ("data", CellValue::Date(date)),
                ("turno", CellValue::Text(turno.to_string())),
                ("media_turno", CellValue::Float(media)),
                ("max_turno", CellValue::Float(media + 2.0)),
                ("min_turno", CellValue::Float((media - 2.0).max(0.0))),
                ("pess_obj", CellValue::Float(media)),
                ("sd_turno", CellValue::Float(1.0)),
                ("fk_tipo_posto", CellValue::Int(fk)),
                ("wday", CellValue::Int(weekday_index as i64 + 1)),
            ]));
        }
    }

    RawTables {
        calendario: build_table(calendario_rows),
        estimativas: build_table(estimativas_rows),
        colaborador: build_table(colaborador_rows),
    }
}

fn cell_row(pairs: &[(&str, CellValue)]) -> HashMap<String, CellValue> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn build_table(rows: Vec<HashMap<String, CellValue>>) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    RawTable { columns, rows }
}

fn find_next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = match date.weekday() {
        chrono::Weekday::Mon => 0,
        chrono::Weekday::Tue => 6,
        chrono::Weekday::Wed => 5,
        chrono::Weekday::Thu => 4,
        chrono::Weekday::Fri => 3,
        chrono::Weekday::Sat => 2,
        chrono::Weekday::Sun => 1,
    };
    date + Duration::days(days_until_monday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_size_parses_case_insensitively() {
        assert_eq!("Small".parse::<DemoSize>(), Ok(DemoSize::Small));
        assert_eq!("MEDIUM".parse::<DemoSize>(), Ok(DemoSize::Medium));
        assert_eq!("large".parse::<DemoSize>(), Ok(DemoSize::Large));
        assert!("huge".parse::<DemoSize>().is_err());
    }

    #[test]
    fn small_demo_has_expected_shape() {
        let raw = generate(DemoSize::Small);
        assert_eq!(raw.colaborador.rows.len(), 6);
        assert_eq!(raw.calendario.rows.len(), 6 * 4 * 7);
        assert!(!raw.estimativas.rows.is_empty());
    }

    #[test]
    fn large_demo_scales_up() {
        let raw = generate(DemoSize::Large);
        assert_eq!(raw.colaborador.rows.len(), 60);
        assert_eq!(raw.calendario.rows.len(), 60 * 13 * 7);
    }
}
