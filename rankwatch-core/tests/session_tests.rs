// Tests for the session: write-through persistence and navigation

use rankwatch_core::credentials::CredentialSource;
use rankwatch_core::data::Database;
use rankwatch_core::error::CoreError;
use rankwatch_core::model::{KeywordResult, NewProject};
use rankwatch_core::session::{Session, View};
use rankwatch_lookup::RankingOutcome;
use std::path::Path;
use tempfile::TempDir;

fn open(path: &Path) -> Session {
    Session::load(Database::new(path).unwrap())
}

fn new_project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        domain: "coffee.example".to_string(),
        keywords: vec!["espresso".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_created_projects_are_persisted() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rankwatch.db");

    let id = {
        let mut session = open(&db_path);
        session.create_project(new_project("Coffee")).unwrap().id
    };

    let session = open(&db_path);
    assert_eq!(session.projects().len(), 1);
    assert_eq!(session.projects().get(&id).unwrap().name, "Coffee");
}

#[test]
fn test_update_is_persisted() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rankwatch.db");

    {
        let mut session = open(&db_path);
        let mut project = session.create_project(new_project("Coffee")).unwrap();
        project.results[0] =
            KeywordResult::succeeded("espresso", RankingOutcome::new("Rank: 9"));
        session.update_project(project).unwrap();
    }

    let session = open(&db_path);
    let project = &session.projects().list_all()[0];
    assert_eq!(project.results[0].rank().to_string(), "9");
}

#[test]
fn test_deleting_open_project_returns_to_list() {
    let temp = TempDir::new().unwrap();
    let mut session = open(&temp.path().join("rankwatch.db"));
    let project = session.create_project(new_project("Coffee")).unwrap();

    session.open_project(&project.id).unwrap();
    assert_eq!(session.view(), &View::Project(project.id.clone()));

    session.delete_project(&project.id).unwrap();
    assert_eq!(session.view(), &View::ProjectList);
    assert!(session.active_project().is_none());
    assert!(session.projects().is_empty());
}

#[test]
fn test_deleting_other_project_keeps_view() {
    let temp = TempDir::new().unwrap();
    let mut session = open(&temp.path().join("rankwatch.db"));
    let kept = session.create_project(new_project("Kept")).unwrap();
    let gone = session.create_project(new_project("Gone")).unwrap();

    session.open_project(&kept.id).unwrap();
    session.delete_project(&gone.id).unwrap();

    assert_eq!(session.view(), &View::Project(kept.id));
}

#[test]
fn test_delete_unknown_project() {
    let temp = TempDir::new().unwrap();
    let mut session = open(&temp.path().join("rankwatch.db"));
    assert!(matches!(
        session.delete_project("missing"),
        Err(CoreError::UnknownProject(_))
    ));
}

#[test]
fn test_open_and_close_project() {
    let temp = TempDir::new().unwrap();
    let mut session = open(&temp.path().join("rankwatch.db"));
    let project = session.create_project(new_project("Coffee")).unwrap();

    let opened = session.open_project(&project.id[..6]).unwrap();
    assert_eq!(opened.id, project.id);

    session.close_project();
    assert_eq!(session.view(), &View::ProjectList);
}

#[test]
fn test_credentials_are_persisted() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rankwatch.db");

    {
        let mut session = open(&db_path);
        session.add_credential("  first-key-1234 ").unwrap();
        session.add_credential("second-key-5678").unwrap();
        assert!(matches!(
            session.add_credential("first-key-1234"),
            Err(CoreError::DuplicateCredential)
        ));
        assert!(matches!(
            session.add_credential("   "),
            Err(CoreError::EmptyCredential)
        ));
    }

    let mut session = open(&db_path);
    assert_eq!(
        session.credentials().keys(),
        &["first-key-1234", "second-key-5678"]
    );

    assert_eq!(
        session.remove_credential_at(0).unwrap().as_deref(),
        Some("first-key-1234")
    );
    assert!(!session.remove_credential("not-there").unwrap());
    drop(session);

    let session = open(&db_path);
    assert_eq!(session.credentials().keys(), &["second-key-5678"]);
}

#[test]
fn test_shared_credentials_see_later_edits() {
    let temp = TempDir::new().unwrap();
    let mut session = open(&temp.path().join("rankwatch.db"));
    let shared = session.shared_credentials();

    session.add_credential("late-added-key").unwrap();

    assert_eq!(shared.snapshot(), vec!["late-added-key".to_string()]);
}
