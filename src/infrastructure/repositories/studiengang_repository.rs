//! Persistence access for `Studiengang`

use std::sync::Arc;

use sea_orm::Statement;

use crate::db::Storage;
use crate::domain::{DomainError, Studiengang};

use super::{date_from_iso, iso};

/// Repository for the `studiengang` table.
///
/// A student can own several programs over time; consumers work with the
/// latest one (highest `studiengang_id`).
#[derive(Clone)]
pub struct StudiengangRepository {
    db: Arc<dyn Storage>,
}

impl StudiengangRepository {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    pub async fn create(&self, student_id: i64, sg: &Studiengang) -> Result<i64, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            INSERT INTO studiengang (
              student_id, name, start_datum, soll_studiensemester, soll_durchschnittsnote
            )
            VALUES (?, ?, ?, ?, ?)
            "#,
            [
                student_id.into(),
                sg.name.clone().into(),
                iso(Some(sg.start_datum)).into(),
                sg.soll_studiensemester.into(),
                sg.soll_durchschnittsnote.into(),
            ],
        );
        let res = self.db.execute(stmt).await?;
        Ok(res.last_insert_id() as i64)
    }

    /// Loads the most recently created program of the student, or `None` if
    /// there is none yet.
    pub async fn get_latest_for_student(
        &self,
        student_id: i64,
    ) -> Result<Option<(i64, Studiengang)>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            SELECT studiengang_id, name, start_datum, soll_studiensemester, soll_durchschnittsnote
            FROM studiengang
            WHERE student_id = ?
            ORDER BY studiengang_id DESC
            LIMIT 1
            "#,
            [student_id.into()],
        );
        let Some(row) = self.db.query_one(stmt).await? else {
            return Ok(None);
        };

        let id: i64 = row.try_get("", "studiengang_id")?;
        let sg = Studiengang {
            name: row.try_get("", "name")?,
            start_datum: date_from_iso(&row.try_get::<String>("", "start_datum")?)?,
            soll_studiensemester: row.try_get("", "soll_studiensemester")?,
            soll_durchschnittsnote: row.try_get("", "soll_durchschnittsnote")?,
        };
        Ok(Some((id, sg)))
    }

    /// Full-field overwrite by primary key.
    pub async fn update(&self, studiengang_id: i64, sg: &Studiengang) -> Result<(), DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.backend(),
            r#"
            UPDATE studiengang SET
              name = ?,
              start_datum = ?,
              soll_studiensemester = ?,
              soll_durchschnittsnote = ?
            WHERE studiengang_id = ?
            "#,
            [
                sg.name.clone().into(),
                iso(Some(sg.start_datum)).into(),
                sg.soll_studiensemester.into(),
                sg.soll_durchschnittsnote.into(),
                studiengang_id.into(),
            ],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }
}
