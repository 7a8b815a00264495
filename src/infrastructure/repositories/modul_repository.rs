//! Persistence access for `Modul` (module catalog)

use std::sync::Arc;

use sea_orm::{QueryResult, Statement};

use crate::db::Storage;
use crate::domain::{DomainError, Modul};

use super::{iso, opt_date_from_iso};

/// Repository for the `modul` table (catalog CRUD and lookups for the
/// module picker in the UI).
#[derive(Clone)]
pub struct ModulRepository {
    db: Arc<dyn Storage>,
}

fn modul_from_row(row: &QueryResult) -> Result<Modul, DomainError> {
    Ok(Modul {
        modul_id: Some(row.try_get("", "modul_id")?),
        titel: row.try_get("", "titel")?,
        ects: row.try_get("", "ects")?,
        plan_semester_nr: row.try_get("", "plan_semester_nr")?,
        default_soll_bestanden_am: opt_date_from_iso(
            row.try_get("", "default_soll_bestanden_am")?,
        )?,
    })
}

impl ModulRepository {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    pub async fn create(&self, m: &Modul) -> Result<i64, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            INSERT INTO modul (titel, ects, plan_semester_nr, default_soll_bestanden_am)
            VALUES (?, ?, ?, ?)
            "#,
            [
                m.titel.clone().into(),
                m.ects.into(),
                m.plan_semester_nr.into(),
                iso(m.default_soll_bestanden_am).into(),
            ],
        );
        let res = self.db.execute(stmt).await?;
        Ok(res.last_insert_id() as i64)
    }

    /// Full-field overwrite by primary key.
    pub async fn update_by_id(&self, modul_id: i64, m: &Modul) -> Result<(), DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            UPDATE modul SET titel = ?, ects = ?, plan_semester_nr = ?, default_soll_bestanden_am = ?
            WHERE modul_id = ?
            "#,
            [
                m.titel.clone().into(),
                m.ects.into(),
                m.plan_semester_nr.into(),
                iso(m.default_soll_bestanden_am).into(),
                modul_id.into(),
            ],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    pub async fn get_by_id(&self, modul_id: i64) -> Result<Option<Modul>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            "SELECT modul_id, titel, ects, plan_semester_nr, default_soll_bestanden_am FROM modul WHERE modul_id = ?",
            [modul_id.into()],
        );
        match self.db.query_one(stmt).await? {
            Some(row) => Ok(Some(modul_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// The unique title doubles as a lookup key during import flows.
    pub async fn get_by_title(&self, titel: &str) -> Result<Option<Modul>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            "SELECT modul_id, titel, ects, plan_semester_nr, default_soll_bestanden_am FROM modul WHERE titel = ?",
            [titel.into()],
        );
        match self.db.query_one(stmt).await? {
            Some(row) => Ok(Some(modul_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// All catalog modules in ascending `modul_id` order. The ordering is a
    /// contract: combo boxes and chart series must be reproducible across
    /// calls.
    pub async fn list_all(&self) -> Result<Vec<Modul>, DomainError> {
        let stmt = Statement::from_string(
            self.db.backend(),
            "SELECT modul_id, titel, ects, plan_semester_nr, default_soll_bestanden_am FROM modul ORDER BY modul_id ASC".to_string(),
        );
        let rows = self.db.query_all(stmt).await?;
        rows.iter().map(modul_from_row).collect()
    }

    /// Sum of all catalog ECTS, 0.0 on an empty catalog. Fallback
    /// denominator when no semester-based target exists.
    pub async fn get_total_ects(&self) -> Result<f64, DomainError> {
        let stmt = Statement::from_string(
            self.db.backend(),
            "SELECT CAST(COALESCE(SUM(ects), 0) AS REAL) AS s FROM modul".to_string(),
        );
        match self.db.query_one(stmt).await? {
            Some(row) => Ok(row.try_get("", "s")?),
            None => Ok(0.0),
        }
    }
}
