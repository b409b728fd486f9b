//! Calendar Classifier (spec §4.3) plus the horizon-level day classification
//! that feeds it (spec §3 Entities, "Horizon").
//!
//! Column encodings for `dia_tipo` were not recoverable from the retained
//! original source (the retrieval pack kept zero source files from it), so
//! this module makes one explicit decision, recorded in `DESIGN.md`:
//! `dia_tipo` is matched case-insensitively for the substrings `"fech"`
//! (closed holiday) and `"fer"` (holiday); Sundays are derived from the
//! calendar date itself, never from `dia_tipo`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Datelike;

use crate::contract;
use crate::domain::{
    Availability, Cycle, Day, Employee, Horizon, Label, Lifecycle, Role, Shift, StaffingTarget,
    Week, WeekShiftPreference,
};
use crate::error::{EngineError, EngineWarning};
use crate::normalize::{CalendarRow, ColaboradorRow, EstimateRow};
use crate::config::EngineSettings;

fn is_closed_holiday(dia_tipo: &str) -> bool {
    dia_tipo.to_lowercase().contains("fech")
}

fn is_holiday_flag(dia_tipo: &str) -> bool {
    dia_tipo.to_lowercase().contains("fer")
}

/// Builds the horizon (spec §3 Entities, "Horizon") from the normalized
/// `calendario` and `estimativas` rows.
pub fn build_horizon(
    calendario: &[CalendarRow],
    estimativas: &[EstimateRow],
) -> Result<Horizon, EngineError> {
    let mut day_of: BTreeMap<Day, chrono::NaiveDate> = BTreeMap::new();
    let mut dia_tipo_of: HashMap<Day, String> = HashMap::new();
    let mut week_of_raw: BTreeMap<Day, Week> = BTreeMap::new();

    for row in calendario {
        let day = row.data.ordinal() as Day;
        day_of.entry(day).or_insert(row.data);
        dia_tipo_of.entry(day).or_insert_with(|| row.dia_tipo.clone());
        week_of_raw.entry(day).or_insert(row.ww);
    }
    for row in estimativas {
        let day = row.data.ordinal() as Day;
        day_of.entry(day).or_insert(row.data);
    }

    if day_of.is_empty() {
        return Err(EngineError::EmptyHorizon);
    }

    let days: Vec<Day> = day_of.keys().copied().collect();
    let start_weekday = day_of[&days[0]].weekday().number_from_monday() as u8;

    let mut sundays = BTreeSet::new();
    let mut holidays = BTreeSet::new();
    let mut closed_holidays = BTreeSet::new();
    for (&day, date) in &day_of {
        if date.weekday() == chrono::Weekday::Sun {
            sundays.insert(day);
        }
        if let Some(dia_tipo) = dia_tipo_of.get(&day) {
            if is_closed_holiday(dia_tipo) {
                closed_holidays.insert(day);
            } else if is_holiday_flag(dia_tipo) && date.weekday() != chrono::Weekday::Sun {
                holidays.insert(day);
            }
        }
    }
    let special_days: BTreeSet<Day> = sundays.union(&holidays).copied().collect();
    let non_holidays: BTreeSet<Day> = days
        .iter()
        .copied()
        .filter(|d| !closed_holidays.contains(d))
        .collect();

    // `week_of`: fall back to a Monday-anchored ISO-ish week number derived
    // from the horizon's first day when the input never names a week for a
    // given day (e.g. a day only present via `estimativas`).
    let mut week_of = BTreeMap::new();
    for &day in &days {
        let week = week_of_raw
            .get(&day)
            .copied()
            .unwrap_or_else(|| 1 + (day as i64 - days[0] as i64) / 7);
        week_of.insert(day, week);
    }

    let mut week_to_days_all: BTreeMap<Week, Vec<Day>> = BTreeMap::new();
    for (&day, &week) in &week_of {
        week_to_days_all.entry(week).or_default().push(day);
    }
    let mut week_to_days: BTreeMap<Week, Vec<Day>> = BTreeMap::new();
    for (&week, ds) in &week_to_days_all {
        let filtered: Vec<Day> = ds.iter().copied().filter(|d| !closed_holidays.contains(d)).collect();
        week_to_days.insert(week, filtered);
    }

    let mut staffing = HashMap::new();
    for row in estimativas {
        let day = row.data.ordinal() as Day;
        let shift = match row.turno.to_uppercase().as_str() {
            "M" => Shift::M,
            "T" => Shift::T,
            _ => continue,
        };
        staffing.insert(
            (day, shift),
            StaffingTarget {
                pess_obj: row.pess_obj.round() as i64,
                min_workers: row.min_turno.round() as i64,
                max_workers: row.max_turno.round() as i64,
            },
        );
    }

    Ok(Horizon {
        days,
        start_weekday,
        sundays,
        holidays,
        closed_holidays,
        special_days,
        non_holidays,
        week_of,
        week_to_days_all,
        week_to_days,
        staffing,
    })
}

/// A single employee's calendar rows, grouped for classification.
struct EmployeeCalendar<'a> {
    matricula: i64,
    rows: Vec<&'a CalendarRow>,
}

fn group_by_employee(calendario: &[CalendarRow]) -> Vec<EmployeeCalendar<'_>> {
    let mut grouped: BTreeMap<i64, Vec<&CalendarRow>> = BTreeMap::new();
    for row in calendario {
        grouped.entry(row.colaborador).or_default().push(row);
    }
    grouped
        .into_iter()
        .map(|(matricula, rows)| EmployeeCalendar { matricula, rows })
        .collect()
}

fn to_horizon_day(date: Option<chrono::NaiveDate>, horizon: &Horizon) -> Day {
    match date {
        Some(d) => {
            let day = d.ordinal() as Day;
            if horizon.days.binary_search(&day).is_ok() {
                day
            } else {
                0
            }
        }
        None => 0,
    }
}

fn role_from_priority(prioridade_folgas: i64) -> Role {
    match prioridade_folgas {
        p if p >= 90 => Role::Manager,
        p if p >= 50 => Role::Keyholder,
        _ => Role::Normal,
    }
}

fn cycle_from_str(cycle: &str) -> Cycle {
    if cycle.eq_ignore_ascii_case("complete") {
        Cycle::Complete
    } else {
        Cycle::Other
    }
}

/// Applies the weekly-5-absence rule (spec §4.3 "Weekly-5-absence rule").
///
/// For each week with at least 6 days in the horizon and at least 5
/// absence days intersecting it, take the two latest non-closed days. If
/// they are exactly that week's Saturday/Sunday, reclassify the Saturday
/// as a fixed LQ and the Sunday as a fixed L; otherwise reclassify both as
/// fixed L. Either way the two days are removed from `absence_days`.
fn apply_weekly_five_absence_rule(
    horizon: &Horizon,
    absence_days: &mut BTreeSet<Day>,
    fixed_days_off: &mut BTreeSet<Day>,
    fixed_lqs: &mut BTreeSet<Day>,
) {
    for (_week, days_all) in &horizon.week_to_days_all {
        if days_all.len() < 6 {
            continue;
        }
        let absences_in_week: Vec<Day> = days_all
            .iter()
            .copied()
            .filter(|d| absence_days.contains(d))
            .collect();
        if absences_in_week.len() < 5 {
            continue;
        }

        let mut non_closed: Vec<Day> = days_all
            .iter()
            .copied()
            .filter(|d| !horizon.closed_holidays.contains(d))
            .collect();
        non_closed.sort_unstable();
        if non_closed.len() < 2 {
            continue;
        }
        let l1 = non_closed[non_closed.len() - 1];
        let l2 = non_closed[non_closed.len() - 2];

        let l2_is_saturday = horizon.is_saturday(l2);
        let l1_is_sunday = horizon.sundays.contains(&l1);

        if l2_is_saturday && l1_is_sunday {
            fixed_lqs.insert(l2);
            fixed_days_off.insert(l1);
        } else {
            fixed_days_off.insert(l1);
            fixed_days_off.insert(l2);
        }
        absence_days.remove(&l1);
        absence_days.remove(&l2);
    }
}

/// Classifies every employee present in `colaborador` and/or `calendario`:
/// builds the six availability masks, derives the contract tuple (via
/// [`contract::derive`]), and resolves role/cycle (spec §4.2, §4.3).
///
/// Employees with invalid contract data (`total_l <= 0` or absent contract
/// row) are dropped from the returned list and recorded as warnings — they
/// still appear in the calendar but the CORE model has nothing to build
/// for them beyond what closed-holiday/absence rules already pin.
pub fn classify(
    colaborador: &[ColaboradorRow],
    calendario: &[CalendarRow],
    horizon: &Horizon,
    settings: &EngineSettings,
) -> (Vec<Employee>, Vec<EngineWarning>) {
    let mut warnings = Vec::new();
    let contract_by_matricula: BTreeMap<i64, &ColaboradorRow> =
        colaborador.iter().map(|r| (r.matricula, r)).collect();
    let grouped = group_by_employee(calendario);

    let mut employees = Vec::with_capacity(grouped.len());

    for group in &grouped {
        let Some(&row) = contract_by_matricula.get(&group.matricula) else {
            warnings.push(EngineWarning::OrphanedEmployee {
                matricula: group.matricula,
                present_in: "calendario",
            });
            continue;
        };

        let mut sorted_rows = group.rows.clone();
        sorted_rows.sort_by_key(|r| r.data);

        let first_appearance = to_horizon_day(sorted_rows.first().map(|r| r.data), horizon);
        let last_appearance = to_horizon_day(sorted_rows.last().map(|r| r.data), horizon);

        let admission_day = to_horizon_day(row.data_admissao, horizon);
        let dismissal_day = to_horizon_day(row.data_demissao, horizon);

        let first_day = if admission_day > 0 {
            first_appearance.max(admission_day)
        } else {
            first_appearance
        };
        let last_day = if dismissal_day > 0 {
            if last_appearance == 0 {
                dismissal_day
            } else {
                last_appearance.min(dismissal_day)
            }
        } else {
            last_appearance
        };

        let lifecycle = Lifecycle {
            admission_day,
            dismissal_day,
            first_day,
            last_day,
        };

        let cycle = cycle_from_str(&row.cycle);

        let mut empty_days = BTreeSet::new();
        let mut missing_days = BTreeSet::new();
        let mut absence_days = BTreeSet::new();
        let mut fixed_days_off = BTreeSet::new();
        let mut free_day_complete_cycle = BTreeSet::new();
        let mut week_shift: HashMap<Week, WeekShiftPreference> = HashMap::new();

        let row_by_day: BTreeMap<Day, &CalendarRow> = sorted_rows
            .iter()
            .map(|r| (r.data.ordinal() as Day, *r))
            .collect();

        for &day in &horizon.days {
            if day < first_day || (last_day > 0 && day > last_day) {
                missing_days.insert(day);
                continue;
            }
            let Some(calendar_row) = row_by_day.get(&day) else {
                empty_days.insert(day);
                continue;
            };
            let label = calendar_row.tipo_turno.trim().to_uppercase();
            match label.as_str() {
                "M" | "T" => {
                    let week = horizon.week_of.get(&day).copied().unwrap_or_default();
                    let pref = week_shift.entry(week).or_default();
                    if label == "M" {
                        pref.eligible_m = true;
                    } else {
                        pref.eligible_t = true;
                    }
                }
                "L" => {
                    if cycle == Cycle::Complete {
                        free_day_complete_cycle.insert(day);
                    } else {
                        fixed_days_off.insert(day);
                    }
                }
                "L_DOM" => {
                    if cycle == Cycle::Complete {
                        free_day_complete_cycle.insert(day);
                    } else {
                        fixed_days_off.insert(day);
                    }
                }
                "A" | "AP" => {
                    absence_days.insert(day);
                }
                "V" => {
                    missing_days.insert(day);
                }
                "-" | "" => {
                    empty_days.insert(day);
                }
                _ => {
                    empty_days.insert(day);
                }
            }
        }

        // For weeks with no observed shift, an employee who can work at all
        // is assumed eligible for both shifts (absence of a preference is
        // not a restriction, spec §4.5 rule 5 only forbids the
        // non-eligible shift when the input declares an exclusive one).
        for &week in horizon.week_to_days.keys() {
            week_shift.entry(week).or_insert(WeekShiftPreference {
                eligible_m: true,
                eligible_t: true,
            });
        }
        for pref in week_shift.values_mut() {
            if !pref.eligible_m && !pref.eligible_t {
                pref.eligible_m = true;
                pref.eligible_t = true;
            }
        }

        let mut fixed_lqs = BTreeSet::new();
        apply_weekly_five_absence_rule(
            horizon,
            &mut absence_days,
            &mut fixed_days_off,
            &mut fixed_lqs,
        );

        // Closed holidays win over every other classification (spec §4.3
        // "Ordering").
        for day in &horizon.closed_holidays {
            empty_days.remove(day);
            missing_days.remove(day);
            absence_days.remove(day);
            fixed_days_off.remove(day);
            fixed_lqs.remove(day);
            free_day_complete_cycle.remove(day);
        }

        let working_days: BTreeSet<Day> = horizon
            .days
            .iter()
            .copied()
            .filter(|d| {
                !empty_days.contains(d)
                    && !absence_days.contains(d)
                    && !missing_days.contains(d)
                    && !horizon.closed_holidays.contains(d)
            })
            .collect();

        if working_days.is_empty() {
            warnings.push(EngineWarning::EmptyWorkingDays {
                matricula: group.matricula,
            });
        }

        let availability = Availability {
            empty_days,
            missing_days,
            absence_days,
            fixed_days_off,
            fixed_lqs,
            free_day_complete_cycle,
            working_days,
        };

        match contract::derive(row, &lifecycle, horizon, settings) {
            Ok(contract_fields) => {
                if contract_fields.l_q < 0 {
                    warnings.push(EngineWarning::NegativeLq {
                        matricula: group.matricula,
                        l_q: contract_fields.l_q,
                    });
                }
                employees.push(Employee {
                    matricula: group.matricula,
                    contract: contract_fields,
                    lifecycle,
                    cycle,
                    role: role_from_priority(row.prioridade_folgas),
                    availability,
                    week_shift,
                });
            }
            Err(reason) => {
                warnings.push(EngineWarning::ContractInvalid {
                    matricula: group.matricula,
                    reason,
                });
            }
        }
    }

    // Employees present in `colaborador` but never seen in `calendario` at
    // all cannot be scheduled (no days, no masks) — warn and skip.
    for row in colaborador {
        if !grouped.iter().any(|g| g.matricula == row.matricula) {
            warnings.push(EngineWarning::OrphanedEmployee {
                matricula: row.matricula,
                present_in: "colaborador",
            });
        }
    }

    (employees, warnings)
}

/// Returns the label a "blocked" (non-free-choice) day should carry for
/// this employee, applying the fixed priority order from spec §4.4:
/// empty > missing > fixed_LQ > fixed_off > absence > closed.
pub fn blocked_label(employee: &Employee, horizon: &Horizon, day: Day) -> Option<Label> {
    let a = &employee.availability;
    if horizon.closed_holidays.contains(&day) {
        return Some(Label::F);
    }
    if a.empty_days.contains(&day) {
        return Some(Label::Empty);
    }
    if a.missing_days.contains(&day) {
        return Some(Label::V);
    }
    if a.fixed_lqs.contains(&day) {
        return Some(Label::Lq);
    }
    if a.fixed_days_off.contains(&day) || a.free_day_complete_cycle.contains(&day) {
        return Some(Label::L);
    }
    if a.absence_days.contains(&day) {
        return Some(Label::A);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{CellValue, RawTable};

    fn week_horizon(first_day_closed: Option<Day>) -> Horizon {
        let days: Vec<Day> = (1..=7).collect();
        let mut closed_holidays = BTreeSet::new();
        if let Some(d) = first_day_closed {
            closed_holidays.insert(d);
        }
        let non_holidays: BTreeSet<Day> = days.iter().copied().filter(|d| !closed_holidays.contains(d)).collect();
        Horizon {
            days: days.clone(),
            start_weekday: 1, // Monday
            sundays: [7].into_iter().collect(),
            holidays: BTreeSet::new(),
            closed_holidays,
            special_days: [7].into_iter().collect(),
            non_holidays,
            week_of: days.iter().map(|&d| (d, 1)).collect(),
            week_to_days_all: [(1, days.clone())].into_iter().collect(),
            week_to_days: [(1, days.clone())].into_iter().collect(),
            staffing: Default::default(),
        }
    }

    #[test]
    fn saturday_sunday_absence_pair_becomes_quality_weekend() {
        let horizon = week_horizon(None);
        let mut absence_days: BTreeSet<Day> = (1..=5).collect();
        let mut fixed_days_off = BTreeSet::new();
        let mut fixed_lqs = BTreeSet::new();
        apply_weekly_five_absence_rule(&horizon, &mut absence_days, &mut fixed_days_off, &mut fixed_lqs);
        assert!(fixed_lqs.contains(&6));
        assert!(fixed_days_off.contains(&7));
        assert!(!absence_days.contains(&6));
        assert!(!absence_days.contains(&7));
    }

    #[test]
    fn non_weekend_five_absence_becomes_two_fixed_offs() {
        // Sunday (day 7) closed this week, so the two latest *non-closed*
        // days are {5, 6} — a Friday/Saturday pair, not the Sat/Sun
        // quality-weekend shape.
        let horizon = week_horizon(Some(7));
        let mut absence_days: BTreeSet<Day> = (1..=5).collect();
        let mut fixed_days_off = BTreeSet::new();
        let mut fixed_lqs = BTreeSet::new();
        apply_weekly_five_absence_rule(&horizon, &mut absence_days, &mut fixed_days_off, &mut fixed_lqs);
        assert!(fixed_days_off.contains(&5));
        assert!(fixed_days_off.contains(&6));
        assert!(fixed_lqs.is_empty());
    }

    #[test]
    fn weeks_under_six_days_are_untouched() {
        let days: Vec<Day> = (1..=5).collect();
        let horizon = Horizon {
            days: days.clone(),
            start_weekday: 1,
            sundays: BTreeSet::new(),
            holidays: BTreeSet::new(),
            closed_holidays: BTreeSet::new(),
            special_days: BTreeSet::new(),
            non_holidays: days.iter().copied().collect(),
            week_of: days.iter().map(|&d| (d, 1)).collect(),
            week_to_days_all: [(1, days.clone())].into_iter().collect(),
            week_to_days: [(1, days)].into_iter().collect(),
            staffing: Default::default(),
        };
        let mut absence_days: BTreeSet<Day> = (1..=5).collect();
        let mut fixed_days_off = BTreeSet::new();
        let mut fixed_lqs = BTreeSet::new();
        apply_weekly_five_absence_rule(&horizon, &mut absence_days, &mut fixed_days_off, &mut fixed_lqs);
        assert_eq!(absence_days.len(), 5);
        assert!(fixed_days_off.is_empty());
        assert!(fixed_lqs.is_empty());
    }

    #[test]
    fn is_saturday_matches_start_weekday_offset() {
        let horizon = week_horizon(None);
        assert!(horizon.is_saturday(6));
        assert!(!horizon.is_saturday(7));
        assert!(!horizon.is_saturday(1));
    }

    fn table(columns: &[&str], rows: Vec<Vec<(&str, CellValue)>>) -> RawTable {
        RawTable {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|pairs| pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
                .collect(),
        }
    }

    #[test]
    fn build_horizon_flags_closed_holiday_and_excludes_it_from_weeks() {
        use crate::normalize::normalize;

        let base = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(); // a Monday
        let mut calendario_rows = Vec::new();
        for offset in 0..7i64 {
            let date = base + chrono::Duration::days(offset);
            let dia_tipo = if offset == 4 { "Fechado" } else { "normal" };
            calendario_rows.push(vec![
                ("colaborador", CellValue::Int(101)),
                ("data", CellValue::Date(date)),
                ("wd", CellValue::Int(offset + 1)),
                ("dia_tipo", CellValue::Text(dia_tipo.to_string())),
                ("tipo_turno", CellValue::Text("M".to_string())),
                ("ww", CellValue::Int(1)),
            ]);
        }
        let calendario = table(
            &["colaborador", "data", "wd", "dia_tipo", "tipo_turno", "ww"],
            calendario_rows,
        );
        let estimativas = table(
            &[
                "data",
                "turno",
                "media_turno",
                "max_turno",
                "min_turno",
                "pess_obj",
                "sd_turno",
                "fk_tipo_posto",
                "wday",
            ],
            vec![],
        );
        let colaborador = table(
            &["matricula", "c2d", "data_admissao", "data_demissao", "l_dom_salsa"],
            vec![vec![
                ("matricula", CellValue::Int(101)),
                ("c2d", CellValue::Int(0)),
                ("data_admissao", CellValue::Null),
                ("data_demissao", CellValue::Null),
                ("l_dom_salsa", CellValue::Int(0)),
            ]],
        );

        let raw = crate::normalize::RawTables {
            calendario,
            estimativas,
            colaborador,
        };
        let (normalized, _) = normalize(&raw).unwrap();
        let horizon = build_horizon(&normalized.calendario, &normalized.estimativas).unwrap();

        let closed_day = base.ordinal() as Day + 4;
        assert!(horizon.closed_holidays.contains(&closed_day));
        for days in horizon.week_to_days.values() {
            assert!(!days.contains(&closed_day));
        }
        for days in horizon.week_to_days_all.values() {
            assert!(days.contains(&closed_day));
        }
    }
}
