//! Database access layer.
//!
//! Repositories talk to the store only through the [`Storage`] trait, so the
//! embedded engine can be swapped (tests use an in-memory instance through
//! the same `init_db` entry point).

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, ExecResult,
    QueryResult, Statement, Value,
};

/// Minimal contract a storage engine has to satisfy.
///
/// Mutations are durable when `execute` returns. `ExecResult` carries the
/// last inserted rowid; after an UPDATE that value is meaningless.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Placeholder dialect for building [`Statement`]s against this engine.
    fn backend(&self) -> DatabaseBackend;

    /// Run a single statement.
    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr>;

    /// Run the same statement once per parameter set.
    async fn execute_many(&self, sql: &str, param_sets: Vec<Vec<Value>>) -> Result<(), DbErr>;

    /// Run a multi-statement SQL script (schema setup).
    async fn run_script(&self, script: &str) -> Result<(), DbErr>;

    /// Fetch the first result row, if any.
    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr>;

    /// Fetch all result rows.
    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr>;

    async fn commit(&self) -> Result<(), DbErr>;

    async fn rollback(&self) -> Result<(), DbErr>;

    async fn close(&self) -> Result<(), DbErr>;
}

/// [`Storage`] adapter over the sqlx SQLite pool.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: DatabaseConnection,
}

impl SqliteStorage {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.conn.execute(stmt).await
    }

    async fn execute_many(&self, sql: &str, param_sets: Vec<Vec<Value>>) -> Result<(), DbErr> {
        for values in param_sets {
            self.conn
                .execute(Statement::from_sql_and_values(
                    self.backend(),
                    sql,
                    values,
                ))
                .await?;
        }
        Ok(())
    }

    async fn run_script(&self, script: &str) -> Result<(), DbErr> {
        self.conn.execute_unprepared(script).await?;
        Ok(())
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.conn.query_one(stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.conn.query_all(stmt).await
    }

    // The pool runs in autocommit mode: every statement is committed when
    // `execute` returns, so there is nothing to flush or unwind here.
    async fn commit(&self) -> Result<(), DbErr> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DbErr> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DbErr> {
        self.conn.clone().close().await
    }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS student (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    vorname TEXT NOT NULL,
    nachname TEXT NOT NULL,
    matrikelnummer TEXT NOT NULL UNIQUE,
    geburtsdatum TEXT,
    adresse TEXT
);

CREATE TABLE IF NOT EXISTS studiengang (
    studiengang_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES student(student_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    start_datum TEXT NOT NULL,
    soll_studiensemester INTEGER,
    soll_durchschnittsnote REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS modul (
    modul_id INTEGER PRIMARY KEY AUTOINCREMENT,
    titel TEXT NOT NULL UNIQUE,
    ects INTEGER NOT NULL,
    plan_semester_nr INTEGER NOT NULL,
    default_soll_bestanden_am TEXT
);

CREATE TABLE IF NOT EXISTS modul_belegung (
    belegung_id INTEGER PRIMARY KEY AUTOINCREMENT,
    studiengang_id INTEGER NOT NULL REFERENCES studiengang(studiengang_id) ON DELETE CASCADE,
    modul_id INTEGER NOT NULL REFERENCES modul(modul_id) ON DELETE CASCADE,
    plan_semester_nr INTEGER NOT NULL,
    ist_semester_nr INTEGER,
    soll_bestanden_am TEXT,
    ist_bestanden_am TEXT,
    soll_note REAL,
    ist_note REAL,
    anzahl_versuche INTEGER NOT NULL DEFAULT 1
);
"#;

/// Connect to the store and make sure the schema exists.
///
/// Dates are stored as ISO-8601 TEXT (`YYYY-MM-DD`); missing values as NULL.
pub async fn init_db(database_url: &str) -> Result<SqliteStorage, DbErr> {
    let conn = Database::connect(database_url).await?;
    let storage = SqliteStorage::new(conn);

    storage.run_script(SCHEMA).await?;
    tracing::info!("database ready at {}", database_url);

    Ok(storage)
}
