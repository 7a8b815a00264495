//! Persistence access for `Student`

use std::sync::Arc;

use sea_orm::Statement;

use crate::db::Storage;
use crate::domain::{DomainError, Student};

use super::iso;

/// Repository for the `student` table.
///
/// `matrikelnummer` is the natural key; [`upsert`](Self::upsert) keeps
/// `student_id` stable across re-saves.
#[derive(Clone)]
pub struct StudentRepository {
    db: Arc<dyn Storage>,
}

impl StudentRepository {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Inserts the student, or updates the non-key fields in place when the
    /// matrikelnummer already exists. Returns the surviving `student_id`.
    pub async fn upsert(&self, student: &Student) -> Result<i64, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            INSERT INTO student (vorname, nachname, matrikelnummer, geburtsdatum, adresse)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(matrikelnummer) DO UPDATE SET
                vorname = excluded.vorname,
                nachname = excluded.nachname,
                geburtsdatum = excluded.geburtsdatum,
                adresse = excluded.adresse
            RETURNING student_id
            "#,
            [
                student.vorname.clone().into(),
                student.nachname.clone().into(),
                student.matrikelnummer.clone().into(),
                iso(student.geburtsdatum).into(),
                student.adresse.clone().into(),
            ],
        );
        // RETURNING yields the id on both the insert and the update branch.
        if let Some(row) = self.db.query_one(stmt).await? {
            return Ok(row.try_get("", "student_id")?);
        }

        // Engine gave us no row back; the upsert must have left one behind.
        let lookup = Statement::from_sql_and_values(
            self.db.backend(),
            "SELECT student_id FROM student WHERE matrikelnummer = ?",
            [student.matrikelnummer.clone().into()],
        );
        let row = self.db.query_one(lookup).await?.ok_or_else(|| {
            DomainError::Internal(
                "Student upsert failed: student not found after insert/update".to_string(),
            )
        })?;
        Ok(row.try_get("", "student_id")?)
    }
}
