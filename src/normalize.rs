//! Input Normalizer (spec §4.1).
//!
//! Lowercases column names, coerces `colaborador` (matricula) and `data`
//! (date) cells, drops rows that fail coercion, and fails fast with
//! `MissingTable`/`MissingColumn` when the input is structurally invalid.

use crate::error::{EngineError, EngineWarning};
use chrono::NaiveDate;
use std::collections::HashMap;

/// A loosely-typed table cell, the way tabular data arrives before the
/// engine has had a chance to coerce it into typed rows.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            CellValue::Float(v) => Some(*v as i64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(v) => Some(v.to_string()),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Bool(v) => Some(v.to_string()),
            CellValue::Date(d) => Some(d.to_string()),
            CellValue::Null => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// A raw, loosely-typed table: a column list plus rows keyed by (arbitrary
/// case) column name.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, CellValue>>,
}

impl RawTable {
    /// Lowercases every column name, in both `columns` and each row's keys.
    fn lowercased(&self) -> RawTable {
        RawTable {
            columns: self.columns.iter().map(|c| c.to_lowercase()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(k, v)| (k.to_lowercase(), v.clone()))
                        .collect()
                })
                .collect(),
        }
    }

    fn require_columns(
        &self,
        table: &'static str,
        required: &[&'static str],
    ) -> Result<(), EngineError> {
        for &column in required {
            if !self.columns.iter().any(|c| c == column) {
                return Err(EngineError::MissingColumn { table, column });
            }
        }
        Ok(())
    }
}

/// The three named input tables (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub calendario: RawTable,
    pub estimativas: RawTable,
    pub colaborador: RawTable,
}

/// One row of the normalized `calendario` table.
#[derive(Debug, Clone)]
pub struct CalendarRow {
    pub colaborador: i64,
    pub data: NaiveDate,
    pub wd: i64,
    pub dia_tipo: String,
    pub tipo_turno: String,
    pub ww: i64,
}

/// One row of the normalized `estimativas` table.
#[derive(Debug, Clone)]
pub struct EstimateRow {
    pub data: NaiveDate,
    pub turno: String,
    pub media_turno: f64,
    pub max_turno: f64,
    pub min_turno: f64,
    pub pess_obj: f64,
    pub sd_turno: f64,
    pub fk_tipo_posto: i64,
    pub wday: i64,
}

/// One row of the normalized `colaborador` table. Fields beyond the
/// required set default to `0`/`None` when the input omits them.
#[derive(Debug, Clone)]
pub struct ColaboradorRow {
    pub matricula: i64,
    pub cycle: String,
    pub contract_type: i64,
    pub tipo_contrato: i64,
    pub l_total: i64,
    pub l_dom: i64,
    pub l_dom_salsa: i64,
    pub c2d: i64,
    pub c3d: i64,
    pub l_d: i64,
    pub l_q: i64,
    pub cxx: i64,
    pub vz: i64,
    pub l_res: i64,
    pub l_res2: i64,
    pub t_lq: i64,
    pub data_admissao: Option<NaiveDate>,
    pub data_demissao: Option<NaiveDate>,
    pub prioridade_folgas: i64,
}

/// The three tables after normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTables {
    pub calendario: Vec<CalendarRow>,
    pub estimativas: Vec<EstimateRow>,
    pub colaborador: Vec<ColaboradorRow>,
}

const CALENDARIO_REQUIRED: &[&str] = &["colaborador", "data", "wd", "dia_tipo", "tipo_turno", "ww"];
const ESTIMATIVAS_REQUIRED: &[&str] = &[
    "data",
    "turno",
    "media_turno",
    "max_turno",
    "min_turno",
    "pess_obj",
    "sd_turno",
    "fk_tipo_posto",
    "wday",
];
const COLABORADOR_REQUIRED: &[&str] = &["matricula", "c2d", "data_admissao", "data_demissao", "l_dom_salsa"];

fn int_field(row: &HashMap<String, CellValue>, col: &str) -> i64 {
    row.get(col).and_then(CellValue::as_i64).unwrap_or(0)
}

fn str_field(row: &HashMap<String, CellValue>, col: &str) -> String {
    row.get(col).and_then(CellValue::as_str).unwrap_or_default()
}

fn date_field(row: &HashMap<String, CellValue>, col: &str) -> Option<NaiveDate> {
    row.get(col).and_then(CellValue::as_date)
}

/// Normalizes the three raw input tables (spec §4.1).
///
/// Fails with `MissingTable`/`MissingColumn` if the input is structurally
/// invalid. Rows that fail to coerce `colaborador`/`data` are dropped
/// silently per the spec's contract (they carry no recoverable identity).
pub fn normalize(raw: &RawTables) -> Result<(NormalizedTables, Vec<EngineWarning>), EngineError> {
    let mut warnings = Vec::new();

    if raw.calendario.columns.is_empty() {
        return Err(EngineError::MissingTable("calendario"));
    }
    if raw.estimativas.columns.is_empty() {
        return Err(EngineError::MissingTable("estimativas"));
    }
    if raw.colaborador.columns.is_empty() {
        return Err(EngineError::MissingTable("colaborador"));
    }

    let calendario = raw.calendario.lowercased();
    let estimativas = raw.estimativas.lowercased();
    let colaborador = raw.colaborador.lowercased();

    calendario.require_columns("calendario", CALENDARIO_REQUIRED)?;
    estimativas.require_columns("estimativas", ESTIMATIVAS_REQUIRED)?;
    colaborador.require_columns("colaborador", COLABORADOR_REQUIRED)?;

    let mut calendario_rows = Vec::with_capacity(calendario.rows.len());
    for row in &calendario.rows {
        let colaborador_id = match row.get("colaborador").and_then(CellValue::as_i64) {
            Some(v) => v,
            None => continue,
        };
        let data = match date_field(row, "data") {
            Some(v) => v,
            None => continue,
        };
        calendario_rows.push(CalendarRow {
            colaborador: colaborador_id,
            data,
            wd: int_field(row, "wd"),
            dia_tipo: str_field(row, "dia_tipo"),
            tipo_turno: str_field(row, "tipo_turno"),
            ww: int_field(row, "ww"),
        });
    }

    let mut estimativas_rows = Vec::with_capacity(estimativas.rows.len());
    for row in &estimativas.rows {
        let data = match date_field(row, "data") {
            Some(v) => v,
            None => continue,
        };
        estimativas_rows.push(EstimateRow {
            data,
            turno: str_field(row, "turno"),
            media_turno: row.get("media_turno").and_then(CellValue::as_f64).unwrap_or(0.0),
            max_turno: row.get("max_turno").and_then(CellValue::as_f64).unwrap_or(0.0),
            min_turno: row.get("min_turno").and_then(CellValue::as_f64).unwrap_or(0.0),
            pess_obj: row.get("pess_obj").and_then(CellValue::as_f64).unwrap_or(0.0),
            sd_turno: row.get("sd_turno").and_then(CellValue::as_f64).unwrap_or(0.0),
            fk_tipo_posto: int_field(row, "fk_tipo_posto"),
            wday: int_field(row, "wday"),
        });
    }

    let mut colaborador_rows = Vec::with_capacity(colaborador.rows.len());
    for row in &colaborador.rows {
        let matricula = match row.get("matricula").and_then(CellValue::as_i64) {
            Some(v) => v,
            None => continue,
        };
        colaborador_rows.push(ColaboradorRow {
            matricula,
            cycle: str_field(row, "cycle"),
            contract_type: int_field(row, "contract_type"),
            tipo_contrato: int_field(row, "tipo_contrato"),
            l_total: int_field(row, "l_total"),
            l_dom: int_field(row, "l_dom"),
            l_dom_salsa: int_field(row, "l_dom_salsa"),
            c2d: int_field(row, "c2d"),
            c3d: int_field(row, "c3d"),
            l_d: int_field(row, "l_d"),
            l_q: int_field(row, "l_q"),
            cxx: int_field(row, "cxx"),
            vz: int_field(row, "vz"),
            l_res: int_field(row, "l_res"),
            l_res2: int_field(row, "l_res2"),
            t_lq: int_field(row, "t_lq"),
            data_admissao: date_field(row, "data_admissao"),
            data_demissao: date_field(row, "data_demissao"),
            prioridade_folgas: int_field(row, "prioridade_folgas"),
        });
    }

    // Warn about employees present in only one of the two tables (spec §7).
    let calendar_ids: std::collections::BTreeSet<i64> =
        calendario_rows.iter().map(|r| r.colaborador).collect();
    let contract_ids: std::collections::BTreeSet<i64> =
        colaborador_rows.iter().map(|r| r.matricula).collect();
    for &id in calendar_ids.difference(&contract_ids) {
        warnings.push(EngineWarning::OrphanedEmployee {
            matricula: id,
            present_in: "calendario",
        });
    }
    for &id in contract_ids.difference(&calendar_ids) {
        warnings.push(EngineWarning::OrphanedEmployee {
            matricula: id,
            present_in: "colaborador",
        });
    }

    Ok((
        NormalizedTables {
            calendario: calendario_rows,
            estimativas: estimativas_rows,
            colaborador: colaborador_rows,
        },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_row(pairs: &[(&str, CellValue)]) -> HashMap<String, CellValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn missing_table_is_rejected() {
        let raw = RawTables::default();
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, EngineError::MissingTable("calendario")));
    }

    #[test]
    fn missing_column_is_rejected() {
        let raw = RawTables {
            calendario: RawTable {
                columns: vec!["colaborador".into(), "data".into()],
                rows: vec![],
            },
            estimativas: RawTable {
                columns: ESTIMATIVAS_REQUIRED.iter().map(|s| s.to_string()).collect(),
                rows: vec![],
            },
            colaborador: RawTable {
                columns: COLABORADOR_REQUIRED.iter().map(|s| s.to_string()).collect(),
                rows: vec![],
            },
        };
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingColumn {
                table: "calendario",
                ..
            }
        ));
    }

    #[test]
    fn rows_with_bad_colaborador_are_dropped() {
        let mut calendario = RawTable {
            columns: CALENDARIO_REQUIRED.iter().map(|s| s.to_string()).collect(),
            rows: vec![],
        };
        calendario.rows.push(cell_row(&[
            ("COLABORADOR", CellValue::Text("not-a-number".into())),
            ("DATA", CellValue::Text("2026-01-05".into())),
            ("WD", CellValue::Int(1)),
            ("DIA_TIPO", CellValue::Text("normal".into())),
            ("TIPO_TURNO", CellValue::Text("M".into())),
            ("WW", CellValue::Int(1)),
        ]));
        calendario.rows.push(cell_row(&[
            ("colaborador", CellValue::Int(101)),
            ("data", CellValue::Text("2026-01-05".into())),
            ("wd", CellValue::Int(1)),
            ("dia_tipo", CellValue::Text("normal".into())),
            ("tipo_turno", CellValue::Text("M".into())),
            ("ww", CellValue::Int(1)),
        ]));

        let raw = RawTables {
            calendario,
            estimativas: RawTable {
                columns: ESTIMATIVAS_REQUIRED.iter().map(|s| s.to_string()).collect(),
                rows: vec![],
            },
            colaborador: RawTable {
                columns: COLABORADOR_REQUIRED.iter().map(|s| s.to_string()).collect(),
                rows: vec![cell_row(&[
                    ("matricula", CellValue::Int(101)),
                    ("c2d", CellValue::Int(0)),
                    ("data_admissao", CellValue::Null),
                    ("data_demissao", CellValue::Null),
                    ("l_dom_salsa", CellValue::Int(0)),
                ])],
            },
        };

        let (normalized, _) = normalize(&raw).unwrap();
        assert_eq!(normalized.calendario.len(), 1);
        assert_eq!(normalized.calendario[0].colaborador, 101);
    }
}
