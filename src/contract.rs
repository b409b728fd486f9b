//! Contract Deriver (spec §4.2).

use crate::config::{EngineSettings, Rounding};
use crate::domain::{Contract, Horizon, Lifecycle};
use crate::normalize::ColaboradorRow;

fn round_with(value: f64, mode: Rounding) -> i64 {
    match mode {
        Rounding::Floor => value.floor() as i64,
        Rounding::Ceil => value.ceil() as i64,
    }
}

/// Derives the contract tuple for one employee, recomputing `l_q` and
/// prorating quotas when the employee's span inside the horizon is
/// partial (spec §4.2, and the rounding-mode tie-break in spec §3
/// Invariant 5, which is more specific than §4.2's "round(p·x)"
/// shorthand and is what this implementation follows).
///
/// Returns `Err` with a human-readable reason when the contract data is
/// invalid (`total_l <= 0`); the caller drops the employee from the
/// optimizable set in that case (spec §7 `ContractInvalid`).
pub fn derive(
    row: &ColaboradorRow,
    lifecycle: &Lifecycle,
    horizon: &Horizon,
    settings: &EngineSettings,
) -> Result<Contract, String> {
    if row.l_total <= 0 {
        return Err(format!("total_l = {} is not positive", row.l_total));
    }

    let total_l_dom = if row.l_dom_salsa != 0 { row.l_dom_salsa } else { row.l_dom };

    let mut contract = Contract {
        contract_type: row.contract_type,
        total_l: row.l_total,
        total_l_dom,
        c2d: row.c2d,
        c3d: row.c3d,
        l_d: row.l_d,
        cxx: row.cxx,
        t_lq: row.t_lq,
        vz: row.vz,
        l_res: row.l_res,
        l_res2: row.l_res2,
        l_q: 0,
    };

    contract.l_q = contract.total_l
        - contract.total_l_dom
        - contract.c2d
        - contract.c3d
        - contract.l_d
        - contract.cxx
        - contract.vz
        - contract.l_res
        - contract.l_res2;

    let full = horizon.len() as i64;
    // Prorate whenever the employee's span inside the horizon is partial —
    // either because they leave before year end (`last_day < 364`, the
    // dismissal case spec §4.2 names explicitly) or because they start
    // after the horizon's first day (a mid-year admission, spec §3
    // Invariant 5 / Scenario 5). Using only the `last_day < 364` guard
    // left admissions with `last_day` at the horizon's end unprorated,
    // disagreeing with constraint 10's own per-week admission proration
    // (constraints.rs `weekly_free_days`).
    let span = (lifecycle.last_day as i64 - lifecycle.first_day as i64 + 1).max(0);
    let is_partial_span = lifecycle.last_day > 0 && (lifecycle.last_day as i64 < 364 || span < full);
    if full > 0 && is_partial_span {
        let p = (span as f64 / full as f64).clamp(0.0, 1.0);
        let mode = settings.admissao_proporcional;

        contract.total_l = round_with(p * contract.total_l as f64, mode);
        contract.total_l_dom = round_with(p * contract.total_l_dom as f64, mode);
        contract.l_d = round_with(p * contract.l_d as f64, mode);
        contract.l_q = round_with(p * contract.l_q as f64, mode);
        contract.cxx = round_with(p * contract.cxx as f64, mode);
        contract.t_lq = round_with(p * contract.t_lq as f64, mode);
        contract.c2d = (p * contract.c2d as f64).floor() as i64;
        contract.c3d = (p * contract.c3d as f64).floor() as i64;
    }

    Ok(contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::domain::Day;

    fn row() -> ColaboradorRow {
        ColaboradorRow {
            matricula: 1,
            cycle: "other".into(),
            contract_type: 5,
            tipo_contrato: 5,
            l_total: 30,
            l_dom: 10,
            l_dom_salsa: 10,
            c2d: 6,
            c3d: 0,
            l_d: 0,
            l_q: 0,
            cxx: 0,
            vz: 0,
            l_res: 0,
            l_res2: 0,
            t_lq: 0,
            data_admissao: None,
            data_demissao: None,
            prioridade_folgas: 0,
        }
    }

    fn full_year_horizon() -> Horizon {
        Horizon {
            days: (1..=365).collect(),
            start_weekday: 1,
            sundays: Default::default(),
            holidays: Default::default(),
            closed_holidays: Default::default(),
            special_days: Default::default(),
            non_holidays: (1..=365).collect(),
            week_of: Default::default(),
            week_to_days_all: Default::default(),
            week_to_days: Default::default(),
            staffing: Default::default(),
        }
    }

    #[test]
    fn full_year_employee_is_not_prorated() {
        let r = row();
        let horizon = full_year_horizon();
        let lifecycle = Lifecycle {
            admission_day: 0,
            dismissal_day: 0,
            first_day: 1,
            last_day: 365,
        };
        let settings = EngineSettings::default();
        let contract = derive(&r, &lifecycle, &horizon, &settings).unwrap();
        assert_eq!(contract.total_l, 30);
        assert_eq!(contract.l_q, 30 - 10 - 6);
    }

    #[test]
    fn mid_year_admission_prorates_quotas() {
        let r = row();
        let horizon = full_year_horizon();
        let admission: Day = 100;
        let lifecycle = Lifecycle {
            admission_day: admission,
            dismissal_day: 0,
            first_day: admission,
            last_day: 365,
        };
        let settings = EngineSettings::default();
        let contract = derive(&r, &lifecycle, &horizon, &settings).unwrap();
        // span = 365 - 100 + 1 = 266, full = 365, p = 266/365 ≈ 0.7288.
        // total_l = floor(0.7288 * 30) = 21 (Scenario 5, spec §8).
        let p = 266.0 / 365.0;
        assert_eq!(contract.total_l, (p * 30.0).floor() as i64);
        assert!(contract.total_l < 30);
    }

    #[test]
    fn invalid_contract_is_rejected() {
        let mut r = row();
        r.l_total = 0;
        let horizon = full_year_horizon();
        let lifecycle = Lifecycle {
            admission_day: 0,
            dismissal_day: 0,
            first_day: 1,
            last_day: 365,
        };
        let settings = EngineSettings::default();
        assert!(derive(&r, &lifecycle, &horizon, &settings).is_err());
    }
}
