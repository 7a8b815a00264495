//! Plain data holders for the study-progress domain.
//!
//! Surrogate keys are SQLite rowids (`i64`) and are assigned by the store on
//! first persist; records that are returned together with their id carry no
//! id field themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Master data of the student. `matrikelnummer` is the natural key:
/// re-saving with the same value overwrites the other fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub vorname: String,
    pub nachname: String,
    pub matrikelnummer: String,
    pub geburtsdatum: Option<NaiveDate>,
    pub adresse: Option<String>,
}

/// A degree program owned by one student. A student may accumulate several
/// of these over time; consumers work with the latest (highest id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studiengang {
    pub name: String,
    pub start_datum: NaiveDate,
    pub soll_studiensemester: Option<i32>,
    pub soll_durchschnittsnote: f64,
}

/// Catalog entry, independent of any student. `titel` is unique and doubles
/// as a lookup key during import flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modul {
    pub modul_id: Option<i64>,
    pub titel: String,
    pub ects: i32,
    pub plan_semester_nr: i32,
    pub default_soll_bestanden_am: Option<NaiveDate>,
}

/// One recorded exam attempt of a module within a degree program. Several
/// rows may exist per (studiengang, modul) pair; queries that feed KPIs and
/// charts pick the one with the highest `belegung_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulBelegung {
    pub belegung_id: Option<i64>,
    pub studiengang_id: i64,
    pub modul_id: i64,
    pub plan_semester_nr: i32,
    pub ist_semester_nr: Option<i32>,
    pub soll_bestanden_am: Option<NaiveDate>,
    pub ist_bestanden_am: Option<NaiveDate>,
    pub soll_note: Option<f64>,
    pub ist_note: Option<f64>,
    pub anzahl_versuche: i32,
}

/// Row of the enrollment overview table, joined with catalog data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BelegungListRow {
    pub belegung_id: i64,
    pub modul_id: i64,
    pub modul_titel: String,
    pub ects: i32,
    pub plan_semester_nr: i32,
    pub ist_semester_nr: Option<i32>,
    pub ist_bestanden_am: Option<NaiveDate>,
    pub ist_note: Option<f64>,
    pub soll_note: Option<f64>,
    pub anzahl_versuche: i32,
}

/// Latest attempt per module, joined with catalog data. `delta_days` is
/// (actual - target) completion in signed days, `None` unless both dates
/// are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulPlotRow {
    pub modul_id: i64,
    pub titel: String,
    pub ects: i32,
    pub soll_note: Option<f64>,
    pub ist_note: Option<f64>,
    pub soll_bestanden_am: Option<NaiveDate>,
    pub ist_bestanden_am: Option<NaiveDate>,
    pub delta_days: Option<i64>,
}

/// One completed exam, raw series point for cumulative-ECTS and
/// rolling-average charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRow {
    pub ist_bestanden_am: NaiveDate,
    pub ects: i32,
    pub ist_note: Option<f64>,
}
