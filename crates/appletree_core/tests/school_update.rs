use appletree_core::db::{open_db, open_db_in_memory, open_db_with, DbConfig};
use appletree_core::{
    NewSchool, RepoError, School, SchoolRepository, SqliteSchoolRepository,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn sample_school() -> School {
    School::new(NewSchool {
        name: "Muffles College".to_string(),
        level: "Secondary".to_string(),
        contact: "Front Desk".to_string(),
        phone: "(501) 322 2001".to_string(),
        email: "info@muffles.bz".to_string(),
        website: "https://muffles.bz".to_string(),
        address: "Orange Walk Town".to_string(),
        mode: vec!["in-person".to_string()],
    })
}

#[test]
fn update_with_current_version_bumps_version_by_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchoolRepository::try_new(&conn).unwrap();

    let mut school = sample_school();
    repo.insert(&mut school).unwrap();

    school.level = "Tertiary".to_string();
    school.mode.push("online".to_string());
    repo.update(&mut school).unwrap();
    assert_eq!(school.version, 2);

    let loaded = repo.get(school.id).unwrap();
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.level, "Tertiary");
    assert_eq!(loaded.mode, vec!["in-person", "online"]);
}

#[test]
fn stale_version_is_an_edit_conflict_and_leaves_row_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchoolRepository::try_new(&conn).unwrap();

    let mut school = sample_school();
    repo.insert(&mut school).unwrap();

    let mut stale = school.clone();
    school.name = "Muffles Junior College".to_string();
    repo.update(&mut school).unwrap();

    stale.name = "Overwritten".to_string();
    let err = repo.update(&mut stale).unwrap_err();
    assert!(matches!(err, RepoError::EditConflict(id) if id == school.id));
    assert_eq!(stale.version, 1);

    let loaded = repo.get(school.id).unwrap();
    assert_eq!(loaded.name, "Muffles Junior College");
    assert_eq!(loaded.version, 2);
}

#[test]
fn updating_a_deleted_school_is_an_edit_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchoolRepository::try_new(&conn).unwrap();

    let mut school = sample_school();
    repo.insert(&mut school).unwrap();
    repo.delete(school.id).unwrap();

    assert!(matches!(
        repo.update(&mut school),
        Err(RepoError::EditConflict(_))
    ));
}

#[test]
fn concurrent_updates_on_same_version_let_exactly_one_win() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrency.db");

    let mut school = sample_school();
    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteSchoolRepository::try_new(&conn).unwrap();
        repo.insert(&mut school).unwrap();
    }

    let barrier = Arc::new(Barrier::new(2));
    let handles = ["Writer A", "Writer B"]
        .into_iter()
        .map(|contact| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            let mut copy = school.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = SqliteSchoolRepository::try_new(&conn).unwrap();
                copy.contact = contact.to_string();
                barrier.wait();
                repo.update(&mut copy)
            })
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(RepoError::EditConflict(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);

    let conn = open_db(&path).unwrap();
    let repo = SqliteSchoolRepository::try_new(&conn).unwrap();
    let loaded = repo.get(school.id).unwrap();
    assert_eq!(loaded.version, 2);
    assert!(loaded.contact == "Writer A" || loaded.contact == "Writer B");
}

#[test]
fn lock_wait_is_bounded_by_query_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.db");

    let holder = open_db(&path).unwrap();
    let mut school = sample_school();
    SqliteSchoolRepository::try_new(&holder)
        .unwrap()
        .insert(&mut school)
        .unwrap();

    let waiter = open_db(&path).unwrap();
    let repo = SqliteSchoolRepository::try_new(&waiter)
        .unwrap()
        .with_timeout(Duration::from_millis(100));

    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let started = Instant::now();
    let err = repo.get(school.id).unwrap_err();
    let elapsed = started.elapsed();
    assert!(matches!(err, RepoError::Timeout(budget) if budget == Duration::from_millis(100)));
    assert!(elapsed < Duration::from_secs(2), "waited {elapsed:?}");

    let err = repo.update(&mut school).unwrap_err();
    assert!(matches!(err, RepoError::Timeout(_)));

    holder.execute_batch("COMMIT;").unwrap();

    let lock_wait_ms: i64 = waiter
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(lock_wait_ms, 3_000);
    assert_eq!(repo.get(school.id).unwrap().version, 1);
}

#[test]
fn lock_wait_shorter_than_budget_stays_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.db");

    let holder = open_db(&path).unwrap();
    let mut school = sample_school();
    SqliteSchoolRepository::try_new(&holder)
        .unwrap()
        .insert(&mut school)
        .unwrap();

    let waiter = open_db_with(
        &path,
        &DbConfig {
            busy_timeout: Duration::from_millis(50),
        },
    )
    .unwrap();
    let repo = SqliteSchoolRepository::try_new(&waiter)
        .unwrap()
        .with_timeout(Duration::from_secs(5));

    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();
    let err = repo.get(school.id).unwrap_err();
    holder.execute_batch("COMMIT;").unwrap();

    assert!(matches!(err, RepoError::Db(_)));
}
