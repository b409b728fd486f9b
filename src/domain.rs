//! Domain model for the SALSA scheduling engine (spec §3 Data Model).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A day, addressed by day-of-year, `1..=366`.
pub type Day = u16;

/// A week number as carried on the input calendar (ISO-week-like).
pub type Week = i64;

/// An employee's payroll number.
pub type Matricula = i64;

/// The shift label alphabet `S = {M, T, L, LQ, F, A, V, -}` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Morning shift.
    M,
    /// Afternoon shift.
    T,
    /// Regular day off.
    L,
    /// Quality-weekend (Saturday) day off.
    Lq,
    /// Closed holiday — site is shut, every employee gets this label.
    F,
    /// Absence.
    A,
    /// Missing / not yet in the calendar.
    V,
    /// No slot at all (not present in the calendar, and not missing).
    Empty,
}

impl Label {
    /// All eight labels, in a stable order used for the variable arena.
    pub const ALL: [Label; 8] = [
        Label::M,
        Label::T,
        Label::L,
        Label::Lq,
        Label::F,
        Label::A,
        Label::V,
        Label::Empty,
    ];

    /// Index into the dense per-(employee, day) label arena.
    pub fn arena_index(self) -> usize {
        match self {
            Label::M => 0,
            Label::T => 1,
            Label::L => 2,
            Label::Lq => 3,
            Label::F => 4,
            Label::A => 5,
            Label::V => 6,
            Label::Empty => 7,
        }
    }

    pub fn is_working(self) -> bool {
        matches!(self, Label::M | Label::T)
    }

    /// The labels legal on a workable day: `{M, T, L, LQ}`.
    pub fn is_check(self) -> bool {
        matches!(self, Label::M | Label::T | Label::L | Label::Lq)
    }

    /// `{L, LQ, F}` — the labels counted "free" by most free-day rules.
    pub fn is_free(self) -> bool {
        matches!(self, Label::L | Label::Lq | Label::F)
    }

    /// `{L, LQ, F, A, V}` — the wider "free" set used by the
    /// consecutive-free-day bonus (spec §4.6).
    pub fn is_free_or_absent(self) -> bool {
        matches!(self, Label::L | Label::Lq | Label::F | Label::A | Label::V)
    }

    pub fn wire(self) -> &'static str {
        match self {
            Label::M => "M",
            Label::T => "T",
            Label::L => "L",
            Label::Lq => "LQ",
            Label::F => "F",
            Label::A => "A",
            Label::V => "V",
            Label::Empty => "-",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire())
    }
}

/// An employee's contract fields (spec §3 Entities, "Employee").
#[derive(Debug, Clone, Default)]
pub struct Contract {
    /// Max working days per week; typical values 4/5/6.
    pub contract_type: i64,
    /// Total days off to allocate over the horizon.
    pub total_l: i64,
    /// Minimum Sundays off.
    pub total_l_dom: i64,
    /// Minimum number of two-day quality weekends.
    pub c2d: i64,
    pub c3d: i64,
    pub l_d: i64,
    pub cxx: i64,
    pub t_lq: i64,
    pub vz: i64,
    pub l_res: i64,
    pub l_res2: i64,
    /// `total_l - l_dom - c2d - c3d - l_d - cxx - vz - l_res - l_res2`.
    /// Negative values are a warning, not a hard error (spec §3 Invariants).
    pub l_q: i64,
}

/// Complete-cycle employees have pre-fixed days off and only receive
/// working-shift variables (spec §3 Entities, "category").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Complete,
    Other,
}

/// Derived from a priority column (spec §3 Entities, "role").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Manager,
    Keyholder,
    Normal,
}

/// Admission/dismissal and first/last registered day (spec §3 Entities,
/// "lifecycle fields").
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    /// 0 if admission falls outside the horizon.
    pub admission_day: Day,
    /// 0 if dismissal falls outside the horizon.
    pub dismissal_day: Day,
    pub first_day: Day,
    pub last_day: Day,
}

/// Per-employee availability masks (spec §3 Entities, "Availability mask").
/// All sets are day indices; `closed_holidays` are removed from every mask
/// once classification finishes (spec §4.3 "Ordering").
#[derive(Debug, Clone, Default)]
pub struct Availability {
    pub empty_days: BTreeSet<Day>,
    pub missing_days: BTreeSet<Day>,
    pub absence_days: BTreeSet<Day>,
    pub fixed_days_off: BTreeSet<Day>,
    pub fixed_lqs: BTreeSet<Day>,
    pub free_day_complete_cycle: BTreeSet<Day>,
    pub working_days: BTreeSet<Day>,
}

/// Per-(employee, week) shift eligibility, inferred from the raw
/// calendar's observed shift entries (spec §3 Entities,
/// "Worker-week-shift preference").
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekShiftPreference {
    pub eligible_m: bool,
    pub eligible_t: bool,
}

/// A fully classified employee, ready for variable construction.
#[derive(Debug, Clone)]
pub struct Employee {
    pub matricula: Matricula,
    pub contract: Contract,
    pub lifecycle: Lifecycle,
    pub cycle: Cycle,
    pub role: Role,
    pub availability: Availability,
    pub week_shift: HashMap<Week, WeekShiftPreference>,
}

impl Employee {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    pub fn is_keyholder(&self) -> bool {
        self.role == Role::Keyholder
    }
}

/// Staffing targets for a (day, shift) pair (spec §3 Entities,
/// "Staffing targets").
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffingTarget {
    pub pess_obj: i64,
    pub min_workers: i64,
    pub max_workers: i64,
}

/// `M` or `T` — the two working shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    M,
    T,
}

impl Shift {
    pub fn label(self) -> Label {
        match self {
            Shift::M => Label::M,
            Shift::T => Label::T,
        }
    }
}

/// The time horizon over which the schedule is built (spec §3 Entities,
/// "Horizon").
#[derive(Debug, Clone)]
pub struct Horizon {
    /// Ordered, non-empty list of day-of-year indices.
    pub days: Vec<Day>,
    /// Weekday of `days[0]`; 1 = Monday, ..., 7 = Sunday.
    pub start_weekday: u8,
    pub sundays: BTreeSet<Day>,
    /// Non-Sunday days flagged as Sunday-or-holiday.
    pub holidays: BTreeSet<Day>,
    /// Days the site is closed; every employee gets label `F`.
    pub closed_holidays: BTreeSet<Day>,
    /// `sundays ∪ holidays`.
    pub special_days: BTreeSet<Day>,
    /// `days \ closed_holidays`.
    pub non_holidays: BTreeSet<Day>,
    /// `week_of(day) -> week_number`, carried from the input.
    pub week_of: BTreeMap<Day, Week>,
    /// All days of week `w` present in the horizon.
    pub week_to_days_all: BTreeMap<Week, Vec<Day>>,
    /// Same as `week_to_days_all`, minus `closed_holidays`.
    pub week_to_days: BTreeMap<Week, Vec<Day>>,
    /// Per-(day, shift) staffing targets.
    pub staffing: HashMap<(Day, Shift), StaffingTarget>,
}

impl Horizon {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// True if `day + 1` is also present in this horizon.
    pub fn has_next(&self, day: Day) -> bool {
        self.days.binary_search(&(day + 1)).is_ok()
    }

    /// `(d + start_weekday - 2) mod 7 == 5` — day-of-week 6 (Saturday),
    /// spec §3 Invariants, rule 2.
    pub fn is_saturday(&self, day: Day) -> bool {
        let offset = day as i64 - self.days[0] as i64;
        let weekday0 = (self.start_weekday as i64 - 1 + offset).rem_euclid(7);
        weekday0 == 5
    }

    pub fn target(&self, day: Day, shift: Shift) -> StaffingTarget {
        self.staffing.get(&(day, shift)).copied().unwrap_or_default()
    }
}
