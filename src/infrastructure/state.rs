//! Application state containing repositories and shared resources

use std::sync::Arc;

use crate::db::Storage;
use crate::infrastructure::repositories::{
    ModulBelegungRepository, ModulRepository, StudentRepository, StudiengangRepository,
};

/// All repositories wired over one shared storage handle.
///
/// The handle is not locked internally; single-process, single-user access
/// is assumed.
#[derive(Clone)]
pub struct AppState {
    db: Arc<dyn Storage>,
    pub student_repo: StudentRepository,
    pub studiengang_repo: StudiengangRepository,
    pub modul_repo: ModulRepository,
    pub belegung_repo: ModulBelegungRepository,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: Arc<dyn Storage>) -> Self {
        let student_repo = StudentRepository::new(db.clone());
        let studiengang_repo = StudiengangRepository::new(db.clone());
        let modul_repo = ModulRepository::new(db.clone());
        let belegung_repo = ModulBelegungRepository::new(db.clone());

        Self {
            db,
            student_repo,
            studiengang_repo,
            modul_repo,
            belegung_repo,
        }
    }

    /// Direct storage access (scripts, maintenance).
    pub fn db(&self) -> &Arc<dyn Storage> {
        &self.db
    }
}
