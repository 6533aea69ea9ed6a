// Tests for database functionality

use rankwatch_core::credentials::CredentialSet;
use rankwatch_core::data::{CREDENTIALS_SLOT, Database, PROJECTS_SLOT};
use rankwatch_core::model::{KeywordResult, NewProject, Project};
use rankwatch_core::store::ProjectStore;
use rankwatch_lookup::{Device, RankingOutcome};
use tempfile::TempDir;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn sample_project() -> Project {
    let mut store = ProjectStore::default();
    let mut project = store
        .create(NewProject {
            name: "Coffee".to_string(),
            domain: "coffee.example".to_string(),
            keywords: vec!["espresso".to_string(), "latte art".to_string()],
            device: Device::Mobile,
            country: "Japan".to_string(),
            city: Some("Osaka".to_string()),
        })
        .unwrap();
    project.results[0] = KeywordResult::succeeded(
        "espresso",
        RankingOutcome::new("Rank: 2 https://coffee.example/espresso")
            .with_citation("https://search.example/1", Some("Espresso guide".to_string())),
    );
    project.results[1] = KeywordResult::failed("latte art", "quota exceeded");
    project
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists_and_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));
    drop(Database::new(&db_path).unwrap());
    assert!(Database::exists(&db_path));

    Database::drop(&db_path).unwrap();
    assert!(!Database::exists(&db_path));
}

#[test]
fn test_slots_table_created() {
    let (_temp, db) = create_test_db();
    let count: i64 = db
        .get_connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'slots'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

// ============================================================================
// Slot Tests
// ============================================================================

#[test]
fn test_missing_slot_reads_none() {
    let (_temp, db) = create_test_db();
    assert_eq!(db.read_slot("nothing-here").unwrap(), None);
}

#[test]
fn test_write_slot_overwrites() {
    let (_temp, db) = create_test_db();
    db.write_slot("s", "[1]").unwrap();
    db.write_slot("s", "[2]").unwrap();
    assert_eq!(db.read_slot("s").unwrap().as_deref(), Some("[2]"));
}

#[test]
fn test_fresh_database_loads_empty_state() {
    let (_temp, db) = create_test_db();
    assert!(db.load_projects().is_empty());
    assert!(db.load_credentials().is_empty());
}

#[test]
fn test_corrupt_projects_slot_degrades_to_empty() {
    let (_temp, db) = create_test_db();
    db.write_slot(PROJECTS_SLOT, "{not json").unwrap();
    assert!(db.load_projects().is_empty());
}

#[test]
fn test_wrong_shape_credentials_slot_degrades_to_empty() {
    let (_temp, db) = create_test_db();
    db.write_slot(CREDENTIALS_SLOT, r#"{"keys": 5}"#).unwrap();
    assert!(db.load_credentials().is_empty());
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_projects_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let project = sample_project();

    {
        let db = Database::new(&db_path).unwrap();
        db.save_projects(std::slice::from_ref(&project)).unwrap();
    }

    let db = Database::new(&db_path).unwrap();
    let loaded = db.load_projects();
    assert_eq!(loaded, vec![project]);
    assert_eq!(loaded[0].results[0].outcome.as_ref().unwrap().citations.len(), 1);
}

#[test]
fn test_credentials_keep_order() {
    let (_temp, db) = create_test_db();
    let mut keys = CredentialSet::default();
    keys.add("key-one").unwrap();
    keys.add("key-two").unwrap();
    keys.add("key-three").unwrap();

    db.save_credentials(&keys).unwrap();

    assert_eq!(
        db.load_credentials().keys(),
        &["key-one", "key-two", "key-three"]
    );
}

#[test]
fn test_credentials_stored_as_plain_array() {
    let (_temp, db) = create_test_db();
    db.save_credentials(&CredentialSet::from_keys(vec!["abc".to_string()]))
        .unwrap();
    assert_eq!(
        db.read_slot(CREDENTIALS_SLOT).unwrap().as_deref(),
        Some(r#"["abc"]"#)
    );
}

#[test]
fn test_project_without_device_defaults_to_desktop() {
    let (_temp, db) = create_test_db();
    db.write_slot(
        PROJECTS_SLOT,
        r#"[{"id":"p1","name":"n","domain":"d.example","keywords":["k"],
             "country":"Vietnam","results":[{"keyword":"k","status":"pending"}]}]"#,
    )
    .unwrap();

    let projects = db.load_projects();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].device, Device::Desktop);
    assert_eq!(projects[0].city, None);
}
