//! Objective builder (spec §4.6) — assembles the weighted sum of penalty
//! and bonus terms and returns the single cost variable to minimize.

use selen::prelude::*;

use crate::domain::{Day, Employee, Horizon, Label, Shift};
use crate::reify::{deviation_pair, deviation_pair_vars, reify_and, reify_at_least, LARGE};
use crate::variables::VarArena;

const W_MANAGER_OVERLAP: i64 = 50_000;
const W_KEYHOLDER_OVERLAP: i64 = 50_000;
const W_BOTH_OFF: i64 = 30_000;
const W_STAFFING_DEVIATION: i64 = 1_000;
const W_ZERO_WORKER: i64 = 300;
const W_SUBMINIMUM: i64 = 60;
const W_FAIRNESS: i64 = 25; // 50 / 2, per spec §4.6 "pairwise proportional imbalance"
const W_QW_SEGMENT: i64 = 8;
const W_WEEK_MIX: i64 = 3;
const W_SUNDAY_SEGMENT: i64 = 1;
const W_CONSECUTIVE_FREE_BONUS: i64 = 1; // subtracted, per spec's "-1... bonus"

/// Builds every weighted term, sums them into one cost variable, and
/// returns it for the search driver to minimize.
pub fn build(m: &mut Model, arena: &VarArena, employees: &[Employee], horizon: &Horizon) -> VarId {
    let mut terms: Vec<(VarId, i64)> = Vec::new();

    staffing_deviation(m, arena, employees, horizon, &mut terms);
    zero_worker_and_subminimum(m, arena, employees, horizon, &mut terms);
    manager_keyholder_coverage(m, arena, employees, horizon, &mut terms);
    consecutive_free_bonus(m, arena, employees, horizon, &mut terms);
    sunday_and_weekend_segment_smoothing(m, arena, employees, horizon, &mut terms);
    pairwise_fairness(m, arena, employees, horizon, &mut terms);
    within_week_shift_mix(m, arena, employees, horizon, &mut terms);

    weighted_sum(m, &terms)
}

fn weighted_sum(m: &mut Model, terms: &[(VarId, i64)]) -> VarId {
    if terms.is_empty() {
        return m.int(0, 0);
    }
    let scaled: Vec<VarId> = terms
        .iter()
        .map(|&(var, weight)| if weight == 1 { var } else { var * weight })
        .collect();
    m.sum(&scaled)
}

fn working_vars_on(arena: &VarArena, e: usize, day: Day, shift: Shift) -> Option<VarId> {
    arena.get(e, day, shift.label())
}

/// `1000 * (pos + neg)` for every `(day, shift)` against its `pess_obj`.
fn staffing_deviation(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for &day in &horizon.days {
        for shift in [Shift::M, Shift::T] {
            let target = horizon.target(day, shift);
            let workers: Vec<VarId> = (0..employees.len())
                .filter_map(|e| working_vars_on(arena, e, day, shift))
                .collect();
            if workers.is_empty() {
                continue;
            }
            let worked = m.sum(&workers);
            let (pos, neg) = deviation_pair(m, worked, target.pess_obj);
            terms.push((pos, W_STAFFING_DEVIATION));
            terms.push((neg, W_STAFFING_DEVIATION));
        }
    }
}

/// `300` per zero-worker day (where staffing was expected) and `60` per
/// unit of sub-minimum shortfall.
fn zero_worker_and_subminimum(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for &day in &horizon.days {
        if horizon.closed_holidays.contains(&day) {
            continue;
        }
        for shift in [Shift::M, Shift::T] {
            let target = horizon.target(day, shift);
            let workers: Vec<VarId> = (0..employees.len())
                .filter_map(|e| working_vars_on(arena, e, day, shift))
                .collect();
            if workers.is_empty() {
                continue;
            }
            if target.pess_obj > 0 {
                let has_worker = reify_at_least(m, &workers, 1);
                let zero = m.int(0, 1);
                m.c(zero + has_worker).eq(int(1));
                terms.push((zero, W_ZERO_WORKER));
            }
            if target.min_workers > 0 {
                let worked = m.sum(&workers);
                let shortfall = m.int(0, LARGE);
                m.c(shortfall + worked).ge(int(target.min_workers));
                terms.push((shortfall, W_SUBMINIMUM));
            }
        }
    }
}

/// Manager/keyholder simultaneous-off overlap and both-off penalties.
fn manager_keyholder_coverage(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for &day in &horizon.days {
        if horizon.closed_holidays.contains(&day) {
            continue;
        }
        let mgr_off: Vec<VarId> = employees
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_manager())
            .flat_map(|(e, _)| [arena.get(e, day, Label::L), arena.get(e, day, Label::Lq)])
            .flatten()
            .collect();
        let kh_off: Vec<VarId> = employees
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_keyholder())
            .flat_map(|(e, _)| [arena.get(e, day, Label::L), arena.get(e, day, Label::Lq)])
            .flatten()
            .collect();

        if !mgr_off.is_empty() {
            let mgr_any = reify_at_least(m, &mgr_off, 1);
            let mgr_overlap = reify_at_least(m, &mgr_off, 2);
            terms.push((mgr_overlap, W_MANAGER_OVERLAP));

            if !kh_off.is_empty() {
                let kh_any = reify_at_least(m, &kh_off, 1);
                let kh_overlap = reify_at_least(m, &kh_off, 2);
                terms.push((kh_overlap, W_KEYHOLDER_OVERLAP));

                let both_off = reify_and(m, mgr_any, kh_any);
                terms.push((both_off, W_BOTH_OFF));
            }
        } else if !kh_off.is_empty() {
            let kh_overlap = reify_at_least(m, &kh_off, 2);
            terms.push((kh_overlap, W_KEYHOLDER_OVERLAP));
        }
    }
}

/// `-1` for every pair of consecutive free days inside working days.
fn consecutive_free_bonus(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for (e, employee) in employees.iter().enumerate() {
        let working = &employee.availability.working_days;
        for window in horizon.days.windows(2) {
            let (d0, d1) = (window[0], window[1]);
            if !(working.contains(&d0) && working.contains(&d1)) {
                continue;
            }
            let Some(free0) = free_day_indicator(m, arena, e, d0) else { continue };
            let Some(free1) = free_day_indicator(m, arena, e, d1) else { continue };
            let pair = reify_and(m, free0, free1);
            terms.push((pair, -W_CONSECUTIVE_FREE_BONUS));
        }
    }
}

fn free_day_indicator(m: &mut Model, arena: &VarArena, e: usize, day: Day) -> Option<VarId> {
    let vars: Vec<VarId> = [Label::L, Label::Lq, Label::F, Label::A, Label::V]
        .into_iter()
        .filter_map(|l| arena.get(e, day, l))
        .collect();
    match vars.len() {
        0 => None,
        1 => Some(vars[0]),
        _ => Some(reify_at_least(m, &vars, 1)),
    }
}

/// Intra-employee Sunday-off and quality-weekend smoothing across a
/// five-segment partition of each employee's eligible days.
fn sunday_and_weekend_segment_smoothing(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for (e, employee) in employees.iter().enumerate() {
        let sundays: Vec<Day> = horizon
            .sundays
            .iter()
            .copied()
            .filter(|d| employee.availability.working_days.contains(d))
            .collect();
        segment_smoothing(
            m,
            arena,
            e,
            &sundays,
            Label::L,
            employee.contract.total_l_dom,
            W_SUNDAY_SEGMENT,
            terms,
        );

        let saturdays: Vec<Day> = horizon
            .sundays
            .iter()
            .map(|&sunday| sunday - 1)
            .filter(|d| employee.availability.working_days.contains(d))
            .collect();
        segment_smoothing(
            m,
            arena,
            e,
            &saturdays,
            Label::Lq,
            employee.contract.c2d,
            W_QW_SEGMENT,
            terms,
        );
    }
}

/// Partitions `days` (an employee's eligible Sundays or Saturdays) into up
/// to five ordered, roughly-equal time segments and penalizes each
/// segment's deviation from its share of `quota` — the employee's actual
/// off-day target (`total_l_dom` or `c2d`), not the raw count of calendar
/// days in `days`. Using `days.len()` as the ideal's basis would push the
/// solver toward having nearly every Sunday off instead of spreading the
/// employee's real quota evenly across the horizon.
fn segment_smoothing(
    m: &mut Model,
    arena: &VarArena,
    e: usize,
    days: &[Day],
    label: Label,
    quota: i64,
    weight: i64,
    terms: &mut Vec<(VarId, i64)>,
) {
    if days.is_empty() {
        return;
    }
    let total = days.len();
    let segment_count = total.min(5).max(1);
    let chunk = (total + segment_count - 1) / segment_count;
    let quota = quota.max(0);

    for (k, segment) in days.chunks(chunk.max(1)).enumerate() {
        let vars: Vec<VarId> = segment.iter().filter_map(|&d| arena.get(e, d, label)).collect();
        if vars.is_empty() {
            continue;
        }
        let count = m.sum(&vars);
        let ideal = quota / 5 + i64::from((k as i64) < quota % 5);
        let (pos, neg) = deviation_pair(m, count, ideal);
        terms.push((pos, weight));
        terms.push((neg, weight));
    }
}

/// Pairwise proportional fairness of Sunday-offs and quality weekends
/// between every pair of employees who overlap the horizon's Sundays.
fn pairwise_fairness(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    if horizon.sundays.is_empty() || horizon.is_empty() {
        return;
    }
    let full = horizon.len() as i64;

    let presence = |employee: &Employee| -> i64 {
        let span = (employee.lifecycle.last_day as i64 - employee.lifecycle.first_day as i64 + 1).max(0);
        ((span * 100) / full).clamp(0, 100)
    };

    let sundays_off = |m: &mut Model, e: usize, employee: &Employee| -> VarId {
        let vars: Vec<VarId> = horizon
            .sundays
            .iter()
            .filter(|d| employee.availability.working_days.contains(d))
            .filter_map(|&d| {
                let l = arena.get(e, d, Label::L);
                let f = arena.get(e, d, Label::F);
                match (l, f) {
                    (Some(l), Some(f)) => Some(reify_at_least(m, &[l, f], 1)),
                    (Some(l), None) => Some(l),
                    (None, Some(f)) => Some(f),
                    (None, None) => None,
                }
            })
            .collect();
        if vars.is_empty() {
            m.int(0, 0)
        } else {
            m.sum(&vars)
        }
    };

    let eligible_weekends_off = |m: &mut Model, e: usize, employee: &Employee| -> VarId {
        let vars: Vec<VarId> = horizon
            .sundays
            .iter()
            .filter(|&&sunday| employee.availability.working_days.contains(&(sunday - 1)))
            .filter_map(|&sunday| arena.get(e, sunday - 1, Label::Lq))
            .collect();
        if vars.is_empty() {
            m.int(0, 0)
        } else {
            m.sum(&vars)
        }
    };

    for e1 in 0..employees.len() {
        for e2 in (e1 + 1)..employees.len() {
            let (emp1, emp2) = (&employees[e1], &employees[e2]);
            let p1 = presence(emp1);
            let p2 = presence(emp2);

            let s1 = sundays_off(m, e1, emp1);
            let s2 = sundays_off(m, e2, emp2);
            if p1 > 0 && p2 > 0 {
                let scaled1 = if p2 == 1 { s1 } else { s1 * p2 };
                let scaled2 = if p1 == 1 { s2 } else { s2 * p1 };
                let (pos, neg) = deviation_pair_vars(m, scaled1, scaled2);
                terms.push((pos, W_FAIRNESS));
                terms.push((neg, W_FAIRNESS));
            }

            let q1 = eligible_weekends_off(m, e1, emp1);
            let q2 = eligible_weekends_off(m, e2, emp2);
            if p1 > 0 && p2 > 0 {
                let scaled1 = if p2 == 1 { q1 } else { q1 * p2 };
                let scaled2 = if p1 == 1 { q2 } else { q2 * p1 };
                let (pos, neg) = deviation_pair_vars(m, scaled1, scaled2);
                terms.push((pos, W_FAIRNESS));
                terms.push((neg, W_FAIRNESS));
            }
        }
    }
}

/// `3` per (employee, week) where both `M` and `T` are worked.
fn within_week_shift_mix(
    m: &mut Model,
    arena: &VarArena,
    employees: &[Employee],
    horizon: &Horizon,
    terms: &mut Vec<(VarId, i64)>,
) {
    for (e, employee) in employees.iter().enumerate() {
        for days in horizon.week_to_days.values() {
            let working_days = days
                .iter()
                .filter(|d| employee.availability.working_days.contains(d))
                .count();
            if working_days < 2 {
                continue;
            }
            let m_vars: Vec<VarId> = days.iter().filter_map(|&d| arena.get(e, d, Label::M)).collect();
            let t_vars: Vec<VarId> = days.iter().filter_map(|&d| arena.get(e, d, Label::T)).collect();
            if m_vars.is_empty() || t_vars.is_empty() {
                continue;
            }
            let has_m = reify_at_least(m, &m_vars, 1);
            let has_t = reify_at_least(m, &t_vars, 1);
            let mix = reify_and(m, has_m, has_t);
            terms.push((mix, W_WEEK_MIX));
        }
    }
}
