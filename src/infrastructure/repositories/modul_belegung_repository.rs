//! Persistence access for `ModulBelegung` (exam attempt records)
//!
//! Besides CRUD this repository carries the targeted query methods for KPI
//! computation and charts (ECTS sums, weighted average grade, time series).

use std::sync::Arc;

use sea_orm::{QueryResult, Statement};

use crate::db::Storage;
use crate::domain::{BelegungListRow, CompletionRow, DomainError, ModulBelegung, ModulPlotRow};

use super::{date_from_iso, iso, opt_date_from_iso};

/// Repository for the `modul_belegung` table. All methods are scoped to one
/// `studiengang_id` so program data stays cleanly separated.
#[derive(Clone)]
pub struct ModulBelegungRepository {
    db: Arc<dyn Storage>,
}

fn belegung_from_row(row: &QueryResult) -> Result<ModulBelegung, DomainError> {
    Ok(ModulBelegung {
        belegung_id: Some(row.try_get("", "belegung_id")?),
        studiengang_id: row.try_get("", "studiengang_id")?,
        modul_id: row.try_get("", "modul_id")?,
        plan_semester_nr: row.try_get("", "plan_semester_nr")?,
        ist_semester_nr: row.try_get("", "ist_semester_nr")?,
        soll_bestanden_am: opt_date_from_iso(row.try_get("", "soll_bestanden_am")?)?,
        ist_bestanden_am: opt_date_from_iso(row.try_get("", "ist_bestanden_am")?)?,
        soll_note: row.try_get("", "soll_note")?,
        ist_note: row.try_get("", "ist_note")?,
        anzahl_versuche: row.try_get("", "anzahl_versuche")?,
    })
}

impl ModulBelegungRepository {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    pub async fn create(&self, b: &ModulBelegung) -> Result<i64, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            INSERT INTO modul_belegung (
              studiengang_id, modul_id, plan_semester_nr, ist_semester_nr,
              soll_bestanden_am, ist_bestanden_am, soll_note, ist_note, anzahl_versuche
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            [
                b.studiengang_id.into(),
                b.modul_id.into(),
                b.plan_semester_nr.into(),
                b.ist_semester_nr.into(),
                iso(b.soll_bestanden_am).into(),
                iso(b.ist_bestanden_am).into(),
                b.soll_note.into(),
                b.ist_note.into(),
                b.anzahl_versuche.into(),
            ],
        );
        let res = self.db.execute(stmt).await?;
        Ok(res.last_insert_id() as i64)
    }

    /// Loads one enrollment; both parts of the composite key must match.
    pub async fn get(
        &self,
        studiengang_id: i64,
        belegung_id: i64,
    ) -> Result<Option<ModulBelegung>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT belegung_id, studiengang_id, modul_id, plan_semester_nr, ist_semester_nr,
                   soll_bestanden_am, ist_bestanden_am, soll_note, ist_note, anzahl_versuche
            FROM modul_belegung
            WHERE studiengang_id = ? AND belegung_id = ?
            "#,
            [studiengang_id.into(), belegung_id.into()],
        );
        match self.db.query_one(stmt).await? {
            Some(row) => Ok(Some(belegung_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Full overwrite keyed by (studiengang_id, belegung_id). The enrollment
    /// must already carry its id.
    pub async fn update(&self, b: &ModulBelegung) -> Result<(), DomainError> {
        let Some(belegung_id) = b.belegung_id else {
            return Err(DomainError::Internal(
                "belegung_id required for update".to_string(),
            ));
        };
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            UPDATE modul_belegung SET
              modul_id = ?,
              plan_semester_nr = ?,
              ist_semester_nr = ?,
              soll_bestanden_am = ?,
              ist_bestanden_am = ?,
              soll_note = ?,
              ist_note = ?,
              anzahl_versuche = ?
            WHERE studiengang_id = ? AND belegung_id = ?
            "#,
            [
                b.modul_id.into(),
                b.plan_semester_nr.into(),
                b.ist_semester_nr.into(),
                iso(b.soll_bestanden_am).into(),
                iso(b.ist_bestanden_am).into(),
                b.soll_note.into(),
                b.ist_note.into(),
                b.anzahl_versuche.into(),
                b.studiengang_id.into(),
                belegung_id.into(),
            ],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    pub async fn delete(&self, studiengang_id: i64, belegung_id: i64) -> Result<(), DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            "DELETE FROM modul_belegung WHERE studiengang_id = ? AND belegung_id = ?",
            [studiengang_id.into(), belegung_id.into()],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    /// Most recently created enrollments (newest first), joined with the
    /// catalog for display fields. `limit` defaults to 200.
    pub async fn list_latest(
        &self,
        studiengang_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BelegungListRow>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT
              mb.belegung_id,
              mb.modul_id,
              m.titel AS modul_titel,
              m.ects AS ects,
              mb.plan_semester_nr,
              mb.ist_semester_nr,
              mb.ist_bestanden_am,
              mb.ist_note,
              mb.soll_note,
              mb.anzahl_versuche
            FROM modul_belegung mb
            JOIN modul m ON m.modul_id = mb.modul_id
            WHERE mb.studiengang_id = ?
            ORDER BY mb.belegung_id DESC
            LIMIT ?
            "#,
            [studiengang_id.into(), limit.unwrap_or(200).into()],
        );
        let rows = self.db.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok(BelegungListRow {
                    belegung_id: row.try_get("", "belegung_id")?,
                    modul_id: row.try_get("", "modul_id")?,
                    modul_titel: row.try_get("", "modul_titel")?,
                    ects: row.try_get("", "ects")?,
                    plan_semester_nr: row.try_get("", "plan_semester_nr")?,
                    ist_semester_nr: row.try_get("", "ist_semester_nr")?,
                    ist_bestanden_am: opt_date_from_iso(row.try_get("", "ist_bestanden_am")?)?,
                    ist_note: row.try_get("", "ist_note")?,
                    soll_note: row.try_get("", "soll_note")?,
                    anzahl_versuche: row.try_get("", "anzahl_versuche")?,
                })
            })
            .collect()
    }

    // ---------- KPI helper queries ----------

    /// Sum of ECTS over passed modules (`ist_bestanden_am` set), 0.0 if
    /// none.
    pub async fn sum_ects_completed(&self, studiengang_id: i64) -> Result<f64, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT CAST(COALESCE(SUM(m.ects), 0) AS REAL) AS ects
            FROM modul_belegung mb
            JOIN modul m ON m.modul_id = mb.modul_id
            WHERE mb.studiengang_id = ?
              AND mb.ist_bestanden_am IS NOT NULL
            "#,
            [studiengang_id.into()],
        );
        match self.db.query_one(stmt).await? {
            Some(row) => Ok(row.try_get("", "ects")?),
            None => Ok(0.0),
        }
    }

    /// ECTS-weighted average of the recorded grades,
    /// `SUM(ects * note) / SUM(ects)`, or `None` when no grade exists yet.
    pub async fn avg_grade_weighted(
        &self,
        studiengang_id: i64,
    ) -> Result<Option<f64>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT
              SUM(m.ects * mb.ist_note) AS wsum,
              CAST(SUM(m.ects) AS REAL) AS ects
            FROM modul_belegung mb
            JOIN modul m ON m.modul_id = mb.modul_id
            WHERE mb.studiengang_id = ?
              AND mb.ist_note IS NOT NULL
            "#,
            [studiengang_id.into()],
        );
        let Some(row) = self.db.query_one(stmt).await? else {
            return Ok(None);
        };
        let wsum: Option<f64> = row.try_get("", "wsum")?;
        let ects: Option<f64> = row.try_get("", "ects")?;
        match (wsum, ects) {
            (Some(wsum), Some(ects)) if ects > 0.0 => Ok(Some(wsum / ects)),
            _ => Ok(None),
        }
    }

    /// Date of the most recently passed exam, or `None`.
    pub async fn last_completion_date(
        &self,
        studiengang_id: i64,
    ) -> Result<Option<chrono::NaiveDate>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT MAX(ist_bestanden_am) AS last_date
            FROM modul_belegung
            WHERE studiengang_id = ?
              AND ist_bestanden_am IS NOT NULL
            "#,
            [studiengang_id.into()],
        );
        let Some(row) = self.db.query_one(stmt).await? else {
            return Ok(None);
        };
        opt_date_from_iso(row.try_get("", "last_date")?)
    }

    // ---------- Plot helper queries ----------

    /// The newest enrollment per module (highest `belegung_id`), joined with
    /// catalog data, for target/actual grade and schedule-deviation charts.
    ///
    /// `delta_days` is (actual - target) completion in signed days and NULL
    /// unless both dates are present. Implemented with a max-id-per-module
    /// subquery joined back to the detail table; works on engines without
    /// window functions. Ordered ascending by `modul_id` for chart-axis
    /// stability.
    pub async fn plot_latest_per_module(
        &self,
        studiengang_id: i64,
    ) -> Result<Vec<ModulPlotRow>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            WITH latest AS (
              SELECT MAX(belegung_id) AS last_id, modul_id
              FROM modul_belegung
              WHERE studiengang_id = ?
              GROUP BY modul_id
            )
            SELECT
              mb.modul_id AS modul_id,
              m.titel AS titel,
              m.ects AS ects,
              mb.soll_note AS soll_note,
              mb.ist_note AS ist_note,
              mb.soll_bestanden_am AS soll_bestanden_am,
              mb.ist_bestanden_am AS ist_bestanden_am,
              CASE
                WHEN mb.soll_bestanden_am IS NOT NULL AND mb.ist_bestanden_am IS NOT NULL
                THEN CAST((julianday(mb.ist_bestanden_am) - julianday(mb.soll_bestanden_am)) AS INTEGER)
                ELSE NULL
              END AS delta_days
            FROM latest l
            JOIN modul_belegung mb ON mb.belegung_id = l.last_id
            JOIN modul m ON m.modul_id = mb.modul_id
            ORDER BY m.modul_id ASC
            "#,
            [studiengang_id.into()],
        );
        let rows = self.db.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok(ModulPlotRow {
                    modul_id: row.try_get("", "modul_id")?,
                    titel: row.try_get("", "titel")?,
                    ects: row.try_get("", "ects")?,
                    soll_note: row.try_get("", "soll_note")?,
                    ist_note: row.try_get("", "ist_note")?,
                    soll_bestanden_am: opt_date_from_iso(row.try_get("", "soll_bestanden_am")?)?,
                    ist_bestanden_am: opt_date_from_iso(row.try_get("", "ist_bestanden_am")?)?,
                    delta_days: row.try_get("", "delta_days")?,
                })
            })
            .collect()
    }

    /// All passed enrollments ordered by completion date (ties by
    /// `belegung_id`), the raw series for cumulative-ECTS and
    /// average-over-time charts.
    pub async fn plot_completions(
        &self,
        studiengang_id: i64,
    ) -> Result<Vec<CompletionRow>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT
              mb.ist_bestanden_am AS ist_bestanden_am,
              m.ects AS ects,
              mb.ist_note AS ist_note
            FROM modul_belegung mb
            JOIN modul m ON m.modul_id = mb.modul_id
            WHERE mb.studiengang_id = ?
              AND mb.ist_bestanden_am IS NOT NULL
            ORDER BY mb.ist_bestanden_am ASC, mb.belegung_id ASC
            "#,
            [studiengang_id.into()],
        );
        let rows = self.db.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok(CompletionRow {
                    ist_bestanden_am: date_from_iso(
                        &row.try_get::<String>("", "ist_bestanden_am")?,
                    )?,
                    ects: row.try_get("", "ects")?,
                    ist_note: row.try_get("", "ist_note")?,
                })
            })
            .collect()
    }
}
