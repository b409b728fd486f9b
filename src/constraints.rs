//! Hard constraint applier (spec §4.5). Every constraint is posted only
//! for the `(employee, day[, week])` combinations where the referenced
//! variables actually exist in the [`VarArena`](crate::variables::VarArena).

use selen::prelude::*;

use crate::config::{EngineSettings, Rounding};
use crate::domain::{Cycle, Day, Employee, Horizon, Label};
use crate::reify::reify_and;
use crate::variables::VarArena;

/// Droppable constraint classes for the configurable infeasible-relaxation
/// fallback (spec §7 `NoFeasibleSchedule`: "may... drop lowest-weight
/// constraint classes in a fixed order and retry; off by default"). The
/// fixed order follows the spec's own list of "usual suspects" for an
/// over-tight solve: weekly free-days quota first, then LQ quota, then
/// Sunday quota.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relaxation {
    skip_weekly_free_days: bool,
    skip_lq_quota: bool,
    skip_sunday_quota: bool,
}

impl Relaxation {
    /// The number of fallback levels beyond the unrelaxed model (level 0).
    pub const MAX_LEVEL: u8 = 3;

    /// `level` 0 is the full hard-constraint set; each subsequent level
    /// additionally drops one more class, in the fixed order above.
    pub fn level(level: u8) -> Self {
        Self {
            skip_weekly_free_days: level >= 1,
            skip_lq_quota: level >= 2,
            skip_sunday_quota: level >= 3,
        }
    }
}

pub fn apply(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    settings: &EngineSettings,
    relaxation: Relaxation,
) {
    unicity(m, arena, employees, horizon);
    weekly_cap(m, arena, employees, horizon);
    consecutive_working_cap(m, arena, employees, horizon, settings);
    if !relaxation.skip_lq_quota {
        lq_quota(m, arena, employees, horizon);
    }
    week_shift_consistency(m, arena, employees, horizon);
    working_day_label_set(m, arena, employees, horizon);
    no_three_consecutive_free(m, arena, employees, horizon);
    quality_weekend_coupling(m, arena, employees, horizon);
    saturday_l_exclusion(m, arena, employees, horizon);
    if !relaxation.skip_weekly_free_days {
        weekly_free_days(m, arena, employees, horizon, settings);
    }
    first_day_not_free(m, arena, employees, horizon);
    if !relaxation.skip_sunday_quota {
        sunday_quota(m, arena, employees, horizon);
    }
}

/// 1. Unicity: every `x[e,d,·]` sums to exactly 1.
fn unicity(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, _) in employees.iter().enumerate() {
        for &day in &horizon.days {
            let vars: Vec<VarId> = arena.labels_on(e, day).into_iter().map(|(_, v)| v).collect();
            if vars.is_empty() {
                continue;
            }
            let sum = m.sum(&vars);
            m.c(sum).eq(int(1));
        }
    }
}

/// 2. Weekly cap on working shifts, excluding closed holidays.
fn weekly_cap(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        for days in horizon.week_to_days.values() {
            let mut working: Vec<VarId> = Vec::new();
            for &day in days {
                for label in [Label::M, Label::T] {
                    if let Some(v) = arena.get(e, day, label) {
                        working.push(v);
                    }
                }
            }
            if working.is_empty() {
                continue;
            }
            let sum = m.sum(&working);
            m.c(sum).le(int(employee.contract.contract_type));
        }
    }
}

/// 3. Consecutive-working cap over every sliding window of
/// `max_continuous_working_days + 1` day indices.
fn consecutive_working_cap(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    settings: &EngineSettings,
) {
    let window = settings.max_continuous_working_days as usize + 1;
    if horizon.days.len() < window {
        return;
    }
    for (e, _) in employees.iter().enumerate() {
        for start in 0..=(horizon.days.len() - window) {
            let mut working: Vec<VarId> = Vec::new();
            for &day in &horizon.days[start..start + window] {
                for label in [Label::M, Label::T] {
                    if let Some(v) = arena.get(e, day, label) {
                        working.push(v);
                    }
                }
            }
            if working.is_empty() {
                continue;
            }
            let sum = m.sum(&working);
            m.c(sum).le(int(settings.max_continuous_working_days as i64));
        }
    }
}

/// 4. LQ quota: at least `c2d[e]` Saturdays marked LQ over working days.
fn lq_quota(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        let lqs: Vec<VarId> = employee
            .availability
            .working_days
            .iter()
            .filter_map(|&day| arena.get(e, day, Label::Lq))
            .collect();
        if lqs.is_empty() {
            continue;
        }
        let sum = m.sum(&lqs);
        m.c(sum).ge(int(employee.contract.c2d));
    }
}

/// 5. Week-shift consistency: an "M only"/"T only" week preference
/// zeroes out the opposite shift's variables for that employee-week.
fn week_shift_consistency(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        for (&week, pref) in &employee.week_shift {
            let Some(days) = horizon.week_to_days.get(&week) else { continue };
            if pref.eligible_m && !pref.eligible_t {
                for &day in days {
                    if let Some(v) = arena.get(e, day, Label::T) {
                        m.c(v).eq(int(0));
                    }
                }
            } else if pref.eligible_t && !pref.eligible_m {
                for &day in days {
                    if let Some(v) = arena.get(e, day, Label::M) {
                        m.c(v).eq(int(0));
                    }
                }
            }
        }
    }
}

/// 6. Working-day label set: on a working day, exactly one of
/// `{M, T, L, LQ}` (or `{M, T}` for complete-cycle employees) is set.
/// Subsumed by unicity whenever the variable-builder only created that
/// exact label set on working days, which it does (spec §4.4) — posted
/// again explicitly here for auditability, restricted to the relevant
/// label subset.
fn working_day_label_set(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        let labels: &[Label] = match employee.cycle {
            Cycle::Complete => &[Label::M, Label::T],
            Cycle::Other => &[Label::M, Label::T, Label::L, Label::Lq],
        };
        for &day in &employee.availability.working_days {
            let vars: Vec<VarId> = labels.iter().filter_map(|&l| arena.get(e, day, l)).collect();
            if vars.is_empty() {
                continue;
            }
            let sum = m.sum(&vars);
            m.c(sum).eq(int(1));
        }
    }
}

/// 7. No three consecutive free days (`{L, F, LQ}`) inside working days.
fn no_three_consecutive_free(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        let working = &employee.availability.working_days;
        for window in horizon.days.windows(3) {
            let [d0, d1, d2] = [window[0], window[1], window[2]];
            if !(working.contains(&d0) && working.contains(&d1) && working.contains(&d2)) {
                continue;
            }
            let mut free_vars: Vec<VarId> = Vec::with_capacity(3);
            for d in [d0, d1, d2] {
                match free_label_indicator(m, arena, e, d) {
                    Some(v) => free_vars.push(v),
                    None => continue,
                }
            }
            if free_vars.len() < 3 {
                continue;
            }
            let sum = m.sum(&free_vars);
            m.c(sum).le(int(2));
        }
    }
}

/// A 0/1 "is this day free" indicator from whichever of `{L, F, LQ}`
/// exist on `(e, d)` — unicity guarantees at most one is `1`, so their
/// sum already behaves as the indicator.
fn free_label_indicator(m: &mut Model, arena: &VarArena, e: usize, day: Day) -> Option<VarId> {
    let vars: Vec<VarId> = [Label::L, Label::F, Label::Lq]
        .into_iter()
        .filter_map(|l| arena.get(e, day, l))
        .collect();
    match vars.len() {
        0 => None,
        1 => Some(vars[0]),
        _ => Some(m.sum(&vars)),
    }
}

/// 8. Two-day quality weekend coupling, and Saturday `LQ` legality.
fn quality_weekend_coupling(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        if !matches!(employee.contract.contract_type, 4 | 5 | 6) {
            continue;
        }
        let working = &employee.availability.working_days;

        let mut qw_vars: Vec<VarId> = Vec::new();
        for &sunday in &horizon.sundays {
            let saturday = sunday - 1;
            if !working.contains(&saturday) {
                continue;
            }
            let (Some(sat_lq), Some(sun_l)) = (arena.get(e, saturday, Label::Lq), arena.get(e, sunday, Label::L))
            else {
                continue;
            };
            let qw = reify_and(m, sat_lq, sun_l);
            qw_vars.push(qw);
        }
        if !qw_vars.is_empty() {
            let sum = m.sum(&qw_vars);
            m.c(sum).ge(int(employee.contract.c2d));
        }

        for &day in &horizon.days {
            let Some(lq_var) = arena.get(e, day, Label::Lq) else { continue };
            let sunday = day + 1;
            let eligible = horizon.sundays.contains(&sunday) && working.contains(&sunday);
            let sun_l = eligible.then(|| arena.get(e, sunday, Label::L)).flatten();
            match sun_l {
                Some(sun_l) => m.c(lq_var).le(sun_l),
                None => m.c(lq_var).eq(int(0)),
            }
        }
    }
}

/// 9. Saturday-L exclusion: a Saturday/Sunday pair that are both off
/// must use the `LQ` encoding, never two plain `L`s.
fn saturday_l_exclusion(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        let working = &employee.availability.working_days;
        for &sunday in &horizon.sundays {
            let saturday = sunday - 1;
            if !working.contains(&sunday) {
                continue;
            }
            if let (Some(sat_l), Some(sun_l)) = (arena.get(e, saturday, Label::L), arena.get(e, sunday, Label::L)) {
                let sum = m.sum(&[sat_l, sun_l]);
                m.c(sum).le(int(1));
            }
        }
    }
}

/// 10. Weekly free-days quota, raised to cover any pre-fixed days off.
fn weekly_free_days(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    settings: &EngineSettings,
) {
    for (e, employee) in employees.iter().enumerate() {
        for (&week, all_days) in &horizon.week_to_days_all {
            let working_in_week: Vec<Day> = all_days
                .iter()
                .copied()
                .filter(|d| employee.availability.working_days.contains(d))
                .collect();
            let n = working_in_week.len() as i64;
            if n == 0 {
                continue;
            }

            let straddles_lifecycle = all_days
                .iter()
                .any(|&d| d == employee.lifecycle.admission_day || d == employee.lifecycle.dismissal_day);

            let mut required = if straddles_lifecycle {
                let raw = n as f64 / 7.0 * 2.0;
                match settings.admissao_proporcional {
                    Rounding::Floor => raw.floor() as i64,
                    Rounding::Ceil => raw.ceil() as i64,
                }
            } else if n >= 2 {
                2
            } else {
                1
            };

            let fixed_count = working_in_week
                .iter()
                .filter(|d| {
                    employee.availability.fixed_days_off.contains(d) || employee.availability.fixed_lqs.contains(d)
                })
                .count() as i64;
            required = required.max(fixed_count);

            let free_vars: Vec<VarId> = working_in_week
                .iter()
                .flat_map(|&d| [arena.get(e, d, Label::L), arena.get(e, d, Label::Lq)])
                .flatten()
                .collect();
            if free_vars.is_empty() {
                continue;
            }
            let sum = m.sum(&free_vars);
            m.c(sum).eq(int(required));
        }
    }
}

/// 11. First-day-not-free: every employee admitted after the earliest
/// first day must work on their own first day.
fn first_day_not_free(m: &mut Model, arena: &VarArena, employees: &[Employee], _horizon: &Horizon) {
    let earliest = employees
        .iter()
        .map(|e| e.lifecycle.first_day)
        .filter(|&d| d > 0)
        .min();
    let Some(earliest) = earliest else { return };

    for (e, employee) in employees.iter().enumerate() {
        let first = employee.lifecycle.first_day;
        if first <= earliest || !employee.availability.working_days.contains(&first) {
            continue;
        }
        let vars: Vec<VarId> = [Label::M, Label::T].into_iter().filter_map(|l| arena.get(e, first, l)).collect();
        if vars.is_empty() {
            continue;
        }
        let sum = m.sum(&vars);
        m.c(sum).eq(int(1));
    }
}

/// 12. Sunday quota: at least `total_l_dom[e]` Sundays marked `L`.
fn sunday_quota(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) {
    for (e, employee) in employees.iter().enumerate() {
        let vars: Vec<VarId> = horizon
            .sundays
            .iter()
            .filter(|d| employee.availability.working_days.contains(d))
            .filter_map(|&d| arena.get(e, d, Label::L))
            .collect();
        if vars.is_empty() {
            continue;
        }
        let sum = m.sum(&vars);
        m.c(sum).ge(int(employee.contract.total_l_dom));
    }
}
