//! Repository CRUD and upsert tests against an in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::Statement;
use studienplaner::db::{self, Storage};
use studienplaner::domain::{DomainError, Modul, ModulBelegung, Student, Studiengang};
use studienplaner::infrastructure::repositories::{
    ModulBelegungRepository, ModulRepository, StudentRepository, StudiengangRepository,
};

// Helper to create a test database
async fn setup_test_db() -> Arc<dyn Storage> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let storage = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    Arc::new(storage)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn test_student(matrikelnummer: &str) -> Student {
    Student {
        vorname: "Ada".to_string(),
        nachname: "Lovelace".to_string(),
        matrikelnummer: matrikelnummer.to_string(),
        geburtsdatum: Some(date(1995, 12, 10)),
        adresse: Some("Musterweg 1".to_string()),
    }
}

fn test_studiengang(name: &str) -> Studiengang {
    Studiengang {
        name: name.to_string(),
        start_datum: date(2023, 10, 1),
        soll_studiensemester: Some(6),
        soll_durchschnittsnote: 2.0,
    }
}

fn test_modul(titel: &str, ects: i32) -> Modul {
    Modul {
        modul_id: None,
        titel: titel.to_string(),
        ects,
        plan_semester_nr: 1,
        default_soll_bestanden_am: None,
    }
}

fn test_belegung(studiengang_id: i64, modul_id: i64) -> ModulBelegung {
    ModulBelegung {
        belegung_id: None,
        studiengang_id,
        modul_id,
        plan_semester_nr: 1,
        ist_semester_nr: None,
        soll_bestanden_am: None,
        ist_bestanden_am: None,
        soll_note: None,
        ist_note: None,
        anzahl_versuche: 1,
    }
}

#[tokio::test]
async fn test_student_upsert_inserts_then_updates_in_place() {
    let db = setup_test_db().await;
    let repo = StudentRepository::new(db.clone());

    let id1 = repo
        .upsert(&test_student("1234567"))
        .await
        .expect("first upsert");

    let mut changed = test_student("1234567");
    changed.nachname = "Byron".to_string();
    changed.adresse = None;
    let id2 = repo.upsert(&changed).await.expect("second upsert");

    assert_eq!(id1, id2, "same matrikelnummer must keep the student_id");

    let row = db
        .query_one(Statement::from_sql_and_values(
            db.backend(),
            "SELECT nachname, adresse FROM student WHERE student_id = ?",
            [id1.into()],
        ))
        .await
        .expect("query")
        .expect("row");
    assert_eq!(
        row.try_get::<String>("", "nachname").expect("nachname"),
        "Byron"
    );
    assert_eq!(
        row.try_get::<Option<String>>("", "adresse").expect("adresse"),
        None
    );

    let count_row = db
        .query_one(Statement::from_string(
            db.backend(),
            "SELECT COUNT(*) AS n FROM student".to_string(),
        ))
        .await
        .expect("query")
        .expect("row");
    assert_eq!(count_row.try_get::<i64>("", "n").expect("count"), 1);
}

#[tokio::test]
async fn test_student_upsert_id_survives_unrelated_inserts() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let module = ModulRepository::new(db.clone());

    let id = students
        .upsert(&test_student("7654321"))
        .await
        .expect("insert");

    // Rowids of other tables diverge from the student's.
    for titel in ["Mathematik 1", "Programmierung", "Datenbanken"] {
        module.create(&test_modul(titel, 5)).await.expect("modul");
    }

    let mut changed = test_student("7654321");
    changed.vorname = "Augusta".to_string();
    let id_after = students.upsert(&changed).await.expect("update branch");
    assert_eq!(id, id_after);
}

#[tokio::test]
async fn test_studiengang_latest_picks_highest_id() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let programs = StudiengangRepository::new(db.clone());

    let student_id = students
        .upsert(&test_student("1111111"))
        .await
        .expect("student");

    assert!(
        programs
            .get_latest_for_student(student_id)
            .await
            .expect("query")
            .is_none(),
        "no program yet"
    );

    programs
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("first program");
    let second_id = programs
        .create(student_id, &test_studiengang("Informatik M.Sc."))
        .await
        .expect("second program");

    let (latest_id, latest) = programs
        .get_latest_for_student(student_id)
        .await
        .expect("query")
        .expect("some program");
    assert_eq!(latest_id, second_id);
    assert_eq!(latest.name, "Informatik M.Sc.");
    assert_eq!(latest.start_datum, date(2023, 10, 1));
    assert_eq!(latest.soll_studiensemester, Some(6));
    assert_eq!(latest.soll_durchschnittsnote, 2.0);
}

#[tokio::test]
async fn test_studiengang_update_overwrites_all_fields() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let programs = StudiengangRepository::new(db.clone());

    let student_id = students
        .upsert(&test_student("2222222"))
        .await
        .expect("student");
    let sg_id = programs
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("program");

    let updated = Studiengang {
        name: "Wirtschaftsinformatik B.Sc.".to_string(),
        start_datum: date(2024, 4, 1),
        soll_studiensemester: None,
        soll_durchschnittsnote: 2.5,
    };
    programs.update(sg_id, &updated).await.expect("update");

    let (id, loaded) = programs
        .get_latest_for_student(student_id)
        .await
        .expect("query")
        .expect("program");
    assert_eq!(id, sg_id);
    assert_eq!(loaded, updated);
}

#[tokio::test]
async fn test_modul_crud_and_title_lookup() {
    let db = setup_test_db().await;
    let module = ModulRepository::new(db.clone());

    let mut m = test_modul("Lineare Algebra", 8);
    m.default_soll_bestanden_am = Some(date(2024, 2, 15));
    let id = module.create(&m).await.expect("create");

    let loaded = module.get_by_id(id).await.expect("query").expect("modul");
    assert_eq!(loaded.modul_id, Some(id));
    assert_eq!(loaded.titel, "Lineare Algebra");
    assert_eq!(loaded.ects, 8);
    assert_eq!(loaded.default_soll_bestanden_am, Some(date(2024, 2, 15)));

    let by_title = module
        .get_by_title("Lineare Algebra")
        .await
        .expect("query")
        .expect("modul");
    assert_eq!(by_title.modul_id, Some(id));

    assert!(module.get_by_id(9999).await.expect("query").is_none());
    assert!(
        module
            .get_by_title("Unbekannt")
            .await
            .expect("query")
            .is_none()
    );

    let overwrite = Modul {
        modul_id: Some(id),
        titel: "Lineare Algebra I".to_string(),
        ects: 6,
        plan_semester_nr: 2,
        default_soll_bestanden_am: None,
    };
    module.update_by_id(id, &overwrite).await.expect("update");
    let reloaded = module.get_by_id(id).await.expect("query").expect("modul");
    assert_eq!(reloaded.titel, "Lineare Algebra I");
    assert_eq!(reloaded.ects, 6);
    assert_eq!(reloaded.plan_semester_nr, 2);
    assert_eq!(reloaded.default_soll_bestanden_am, None);
}

#[tokio::test]
async fn test_modul_list_all_is_ordered_by_id() {
    let db = setup_test_db().await;
    let module = ModulRepository::new(db.clone());

    let mut created = Vec::new();
    for (titel, ects) in [("Zustandsautomaten", 5), ("Analysis", 10), ("Betriebssysteme", 6)] {
        created.push(module.create(&test_modul(titel, ects)).await.expect("create"));
    }

    let all = module.list_all().await.expect("list");
    assert_eq!(all.len(), 3);
    let ids: Vec<i64> = all.iter().map(|m| m.modul_id.expect("id")).collect();
    assert_eq!(ids, created, "ascending surrogate-id order");
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_modul_total_ects() {
    let db = setup_test_db().await;
    let module = ModulRepository::new(db.clone());

    assert_eq!(module.get_total_ects().await.expect("empty"), 0.0);

    module.create(&test_modul("A", 5)).await.expect("create");
    module.create(&test_modul("B", 10)).await.expect("create");
    assert_eq!(module.get_total_ects().await.expect("sum"), 15.0);
}

#[tokio::test]
async fn test_belegung_roundtrip_and_composite_key() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let programs = StudiengangRepository::new(db.clone());
    let module = ModulRepository::new(db.clone());
    let belegungen = ModulBelegungRepository::new(db.clone());

    let student_id = students
        .upsert(&test_student("3333333"))
        .await
        .expect("student");
    let sg_id = programs
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("program");
    let modul_id = module
        .create(&test_modul("Datenbanken", 5))
        .await
        .expect("modul");

    let mut b = test_belegung(sg_id, modul_id);
    b.ist_semester_nr = Some(2);
    b.soll_bestanden_am = Some(date(2024, 1, 10));
    b.ist_bestanden_am = Some(date(2024, 1, 15));
    b.soll_note = Some(2.0);
    b.ist_note = Some(1.7);
    b.anzahl_versuche = 2;

    let belegung_id = belegungen.create(&b).await.expect("create");

    let loaded = belegungen
        .get(sg_id, belegung_id)
        .await
        .expect("query")
        .expect("belegung");
    assert_eq!(loaded.belegung_id, Some(belegung_id));
    assert_eq!(loaded.modul_id, modul_id);
    assert_eq!(loaded.ist_semester_nr, Some(2));
    assert_eq!(loaded.soll_bestanden_am, Some(date(2024, 1, 10)));
    assert_eq!(loaded.ist_bestanden_am, Some(date(2024, 1, 15)));
    assert_eq!(loaded.soll_note, Some(2.0));
    assert_eq!(loaded.ist_note, Some(1.7));
    assert_eq!(loaded.anzahl_versuche, 2);

    // Both parts of the composite key must match.
    assert!(
        belegungen
            .get(sg_id + 1, belegung_id)
            .await
            .expect("query")
            .is_none()
    );
}

#[tokio::test]
async fn test_belegung_update_requires_id() {
    let db = setup_test_db().await;
    let belegungen = ModulBelegungRepository::new(db.clone());

    let b = test_belegung(1, 1);
    let err = belegungen.update(&b).await.expect_err("must fail");
    assert!(matches!(err, DomainError::Internal(_)));
}

#[tokio::test]
async fn test_belegung_update_and_delete() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let programs = StudiengangRepository::new(db.clone());
    let module = ModulRepository::new(db.clone());
    let belegungen = ModulBelegungRepository::new(db.clone());

    let student_id = students
        .upsert(&test_student("4444444"))
        .await
        .expect("student");
    let sg_id = programs
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("program");
    let modul_id = module
        .create(&test_modul("Rechnernetze", 5))
        .await
        .expect("modul");

    let belegung_id = belegungen
        .create(&test_belegung(sg_id, modul_id))
        .await
        .expect("create");

    let mut b = belegungen
        .get(sg_id, belegung_id)
        .await
        .expect("query")
        .expect("belegung");
    b.ist_bestanden_am = Some(date(2024, 6, 30));
    b.ist_note = Some(2.3);
    b.anzahl_versuche = 2;
    belegungen.update(&b).await.expect("update");

    let reloaded = belegungen
        .get(sg_id, belegung_id)
        .await
        .expect("query")
        .expect("belegung");
    assert_eq!(reloaded.ist_bestanden_am, Some(date(2024, 6, 30)));
    assert_eq!(reloaded.ist_note, Some(2.3));
    assert_eq!(reloaded.anzahl_versuche, 2);

    belegungen.delete(sg_id, belegung_id).await.expect("delete");
    assert!(
        belegungen
            .get(sg_id, belegung_id)
            .await
            .expect("query")
            .is_none()
    );
}

#[tokio::test]
async fn test_belegung_list_latest_orders_and_limits() {
    let db = setup_test_db().await;
    let students = StudentRepository::new(db.clone());
    let programs = StudiengangRepository::new(db.clone());
    let module = ModulRepository::new(db.clone());
    let belegungen = ModulBelegungRepository::new(db.clone());

    let student_id = students
        .upsert(&test_student("5555555"))
        .await
        .expect("student");
    let sg_id = programs
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("program");
    let modul_id = module
        .create(&test_modul("Software Engineering", 6))
        .await
        .expect("modul");

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(
            belegungen
                .create(&test_belegung(sg_id, modul_id))
                .await
                .expect("create"),
        );
    }

    let rows = belegungen.list_latest(sg_id, None).await.expect("list");
    assert_eq!(rows.len(), 3);
    let listed: Vec<i64> = rows.iter().map(|r| r.belegung_id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected, "newest first");
    assert_eq!(rows[0].modul_titel, "Software Engineering");
    assert_eq!(rows[0].ects, 6);

    let capped = belegungen.list_latest(sg_id, Some(2)).await.expect("list");
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn test_app_state_wires_repositories_over_one_handle() {
    let db = setup_test_db().await;
    let state = studienplaner::AppState::new(db.clone());

    let student_id = state
        .student_repo
        .upsert(&test_student("6666666"))
        .await
        .expect("student");
    let sg_id = state
        .studiengang_repo
        .create(student_id, &test_studiengang("Informatik B.Sc."))
        .await
        .expect("program");
    let modul_id = state
        .modul_repo
        .create(&test_modul("Theoretische Informatik", 7))
        .await
        .expect("modul");
    state
        .belegung_repo
        .create(&test_belegung(sg_id, modul_id))
        .await
        .expect("belegung");

    let rows = state
        .belegung_repo
        .list_latest(sg_id, None)
        .await
        .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].modul_titel, "Theoretische Informatik");
}

#[tokio::test]
async fn test_execute_many_seeds_catalog() {
    let db = setup_test_db().await;
    let module = ModulRepository::new(db.clone());

    db.execute_many(
        "INSERT INTO modul (titel, ects, plan_semester_nr) VALUES (?, ?, ?)",
        vec![
            vec!["Mathematik 1".into(), 8.into(), 1.into()],
            vec!["Mathematik 2".into(), 8.into(), 2.into()],
            vec!["Statistik".into(), 5.into(), 3.into()],
        ],
    )
    .await
    .expect("batch insert");

    let all = module.list_all().await.expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(module.get_total_ects().await.expect("sum"), 21.0);

    db.close().await.expect("close");
}
