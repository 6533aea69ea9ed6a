// Tests for report generation functionality

use rankwatch_core::model::{KeywordResult, NewProject, Project};
use rankwatch_core::report::{
    ReportFormat, gather_report_data, generate_csv_report, generate_json_report,
    generate_markdown_report, generate_report, generate_text_report, save_report,
};
use rankwatch_core::store::ProjectStore;
use rankwatch_lookup::RankingOutcome;
use tempfile::TempDir;

fn checked_project() -> Project {
    let mut store = ProjectStore::default();
    let mut project = store
        .create(NewProject {
            name: "Coffee Shop".to_string(),
            domain: "coffee.example".to_string(),
            keywords: vec![
                "espresso".to_string(),
                "cold brew".to_string(),
                "latte, art".to_string(),
                "decaf".to_string(),
            ],
            city: Some("Hanoi".to_string()),
            ..Default::default()
        })
        .unwrap();

    project.results[0] = KeywordResult::succeeded(
        "espresso",
        RankingOutcome::new("Rank: 3. Found at https://coffee.example/espresso"),
    );
    project.results[1] = KeywordResult::succeeded(
        "cold brew",
        RankingOutcome::new("Not found in top 50 results"),
    );
    project.results[2] = KeywordResult::failed("latte, art", "quota exceeded");
    project
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json)));
    assert!(matches!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv)));
    assert!(matches!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown)));
    assert!(matches!(
        ReportFormat::from_str("Markdown"),
        Some(ReportFormat::Markdown)
    ));
    assert!(ReportFormat::from_str("pdf").is_none());
}

// ============================================================================
// Report Data Tests
// ============================================================================

#[test]
fn test_gather_report_data() {
    let data = gather_report_data(&checked_project());

    assert_eq!(data.name, "Coffee Shop");
    assert_eq!(data.location, "Hanoi, Vietnam");
    assert_eq!(data.device, "desktop");
    assert_eq!(data.counts.success, 2);
    assert_eq!(data.counts.error, 1);
    assert_eq!(data.counts.pending, 1);

    let ranks: Vec<&str> = data.rows.iter().map(|r| r.rank.as_str()).collect();
    assert_eq!(ranks, vec!["3", "Not Found", "N/A", "N/A"]);

    assert_eq!(data.rows[0].url, "https://coffee.example/espresso");
    assert_eq!(data.rows[1].url, "N/A");
    assert_eq!(data.rows[2].status, "Error");
    assert_eq!(data.rows[2].error.as_deref(), Some("quota exceeded"));
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_text_report_lists_every_keyword() {
    let report = generate_text_report(&gather_report_data(&checked_project()));

    assert!(report.contains("Coffee Shop"));
    assert!(report.contains("coffee.example"));
    assert!(report.contains("Hanoi, Vietnam"));
    for keyword in ["espresso", "cold brew", "latte, art", "decaf"] {
        assert!(report.contains(keyword), "missing {}", keyword);
    }
    assert!(report.contains("quota exceeded"));
    assert!(report.contains("2 success, 1 error, 1 pending"));
}

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&gather_report_data(&checked_project())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "Rankwatch");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["project"]["domain"], "coffee.example");
    assert_eq!(report["summary"]["success"], 2);
    assert_eq!(report["keywords"].as_array().unwrap().len(), 4);
    assert_eq!(report["keywords"][0]["rank"], "3");
    assert!(report["keywords"][0].get("error").is_none());
}

#[test]
fn test_csv_report_escapes_commas() {
    let csv = generate_csv_report(&gather_report_data(&checked_project()));
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "keyword,rank,url,status,error");
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[1],
        "espresso,3,https://coffee.example/espresso,Success,"
    );
    assert!(lines[3].starts_with("\"latte, art\",N/A,N/A,Error,quota exceeded"));
}

#[test]
fn test_markdown_report_table() {
    let md = generate_markdown_report(&gather_report_data(&checked_project()));

    assert!(md.starts_with("# Coffee Shop"));
    assert!(md.contains("| espresso | 3 | <https://coffee.example/espresso> | Success |"));
    assert!(md.contains("| decaf | N/A | N/A | Pending |"));
    assert!(md.contains("## Errors"));
}

#[test]
fn test_generate_report_dispatches_by_format() {
    let data = gather_report_data(&checked_project());
    let csv = generate_report(&data, &ReportFormat::Csv).unwrap();
    assert!(csv.starts_with("keyword,rank"));
}

#[test]
fn test_save_report() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.md");
    save_report("# hello\n", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
}
