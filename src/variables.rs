//! Variable Builder (spec §4.4) — a dense, pre-offset arena of boolean
//! decision variables keyed by `(employee, day, label)` (spec §9 "Arena of
//! variables").
//!
//! Variables are built over the full horizon rather than strictly
//! `[first_day, last_day]`: `spec.md`'s Variable Builder contract names
//! that range, but `missing_days` is defined to include every day before
//! `first_day`/after `last_day`, and Testable Property Invariant 1
//! requires exactly one variable to be `1` for *every* day in the
//! horizon. Building across the whole horizon and letting
//! [`crate::calendar::blocked_label`] pin the out-of-range days to `V`
//! satisfies both without contradiction — see `DESIGN.md`.

use std::collections::HashMap;

use selen::prelude::*;

use crate::calendar;
use crate::domain::{Cycle, Day, Employee, Horizon, Label};

/// Dense `(employee_idx, day, label)` arena. `exists` and `vars` are
/// parallel flat tables indexed by a precomputed offset, per spec §9.
pub struct VarArena {
    employee_count: usize,
    days: Vec<Day>,
    day_index: HashMap<Day, usize>,
    exists: Vec<bool>,
    vars: Vec<Option<VarId>>,
}

const LABELS_PER_SLOT: usize = 8;

impl VarArena {
    fn new(employee_count: usize, days: Vec<Day>) -> Self {
        let day_index = days.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        let slots = employee_count * days.len() * LABELS_PER_SLOT;
        Self {
            employee_count,
            days,
            day_index,
            exists: vec![false; slots],
            vars: vec![None; slots],
        }
    }

    #[inline]
    fn offset(&self, employee_idx: usize, day: Day, label: Label) -> Option<usize> {
        let day_idx = *self.day_index.get(&day)?;
        Some((employee_idx * self.days.len() + day_idx) * LABELS_PER_SLOT + label.arena_index())
    }

    fn set(&mut self, employee_idx: usize, day: Day, label: Label, var: VarId) {
        if let Some(idx) = self.offset(employee_idx, day, label) {
            self.exists[idx] = true;
            self.vars[idx] = Some(var);
        }
    }

    pub fn exists(&self, employee_idx: usize, day: Day, label: Label) -> bool {
        self.offset(employee_idx, day, label)
            .map(|idx| self.exists[idx])
            .unwrap_or(false)
    }

    pub fn get(&self, employee_idx: usize, day: Day, label: Label) -> Option<VarId> {
        self.offset(employee_idx, day, label).and_then(|idx| self.vars[idx])
    }

    /// All `(label, var)` pairs created for this (employee, day).
    pub fn labels_on(&self, employee_idx: usize, day: Day) -> Vec<(Label, VarId)> {
        Label::ALL
            .iter()
            .filter_map(|&label| self.get(employee_idx, day, label).map(|v| (label, v)))
            .collect()
    }

    pub fn employee_count(&self) -> usize {
        self.employee_count
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }
}

/// Instantiates one boolean decision variable per legal `(employee, day,
/// label)` triple (spec §4.4).
pub fn build(model: &mut Model, employees: &[Employee], horizon: &Horizon) -> VarArena {
    let mut arena = VarArena::new(employees.len(), horizon.days.clone());

    for (employee_idx, employee) in employees.iter().enumerate() {
        for &day in &horizon.days {
            if let Some(fixed_label) = calendar::blocked_label(employee, horizon, day) {
                let pinned = model.int(1, 1);
                arena.set(employee_idx, day, fixed_label, pinned);
                continue;
            }

            // Free-choice day: {M, T, L, LQ}, or {M, T} for complete-cycle
            // employees (spec §3 Invariant 4).
            let free_labels: &[Label] = match employee.cycle {
                Cycle::Complete => &[Label::M, Label::T],
                Cycle::Other => &[Label::M, Label::T, Label::L, Label::Lq],
            };

            for &label in free_labels {
                if label == Label::Lq && !(horizon.is_saturday(day) && horizon.has_next(day)) {
                    // LQ only legal on a Saturday whose Sunday is in
                    // horizon (spec §3 Invariant 2).
                    continue;
                }
                let var = model.int(0, 1);
                arena.set(employee_idx, day, label, var);
            }
        }
    }

    arena
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, Contract, Lifecycle, Role};
    use std::collections::BTreeSet;

    fn horizon_week() -> Horizon {
        let days: Vec<Day> = (1..=7).collect();
        Horizon {
            days,
            start_weekday: 1, // Monday
            sundays: [7].into_iter().collect(),
            holidays: BTreeSet::new(),
            closed_holidays: BTreeSet::new(),
            special_days: [7].into_iter().collect(),
            non_holidays: (1..=7).collect(),
            week_of: (1..=7).map(|d| (d, 1)).collect(),
            week_to_days_all: [(1, (1..=7).collect())].into_iter().collect(),
            week_to_days: [(1, (1..=7).collect())].into_iter().collect(),
            staffing: Default::default(),
        }
    }

    fn plain_employee() -> Employee {
        Employee {
            matricula: 1,
            contract: Contract {
                contract_type: 5,
                total_l: 2,
                ..Default::default()
            },
            lifecycle: Lifecycle {
                admission_day: 0,
                dismissal_day: 0,
                first_day: 1,
                last_day: 7,
            },
            cycle: Cycle::Other,
            role: Role::Normal,
            availability: Availability {
                working_days: (1..=7).collect(),
                ..Default::default()
            },
            week_shift: Default::default(),
        }
    }

    #[test]
    fn saturday_lq_only_exists_when_sunday_in_horizon() {
        let horizon = horizon_week();
        let employee = plain_employee();
        let mut model = Model::default();
        let arena = build(&mut model, std::slice::from_ref(&employee), &horizon);
        assert!(arena.exists(0, 6, Label::Lq));
        assert!(!arena.exists(0, 5, Label::Lq));
    }

    #[test]
    fn every_horizon_day_gets_at_least_one_variable() {
        let horizon = horizon_week();
        let employee = plain_employee();
        let mut model = Model::default();
        let arena = build(&mut model, std::slice::from_ref(&employee), &horizon);
        for &day in &horizon.days {
            assert!(!arena.labels_on(0, day).is_empty(), "day {day} has no variables");
        }
    }
}
