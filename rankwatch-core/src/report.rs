// Report generation for a project's keyword results

use crate::interpret::{NOT_AVAILABLE, display_url};
use crate::model::{KeywordStatus, Project};
use rankwatch_lookup::Citation;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub keyword: String,
    pub rank: String,
    pub url: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub loading: usize,
    pub success: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub project_id: String,
    pub name: String,
    pub domain: String,
    pub device: String,
    pub location: String,
    pub counts: StatusCounts,
    pub rows: Vec<ReportRow>,
}

pub fn gather_report_data(project: &Project) -> ReportData {
    let rows = project
        .results
        .iter()
        .map(|r| ReportRow {
            keyword: r.keyword.clone(),
            rank: r.rank().to_string(),
            url: display_url(r.ranking_text()).to_string(),
            status: r.status.label().to_string(),
            error: r.error.clone(),
            citations: r
                .outcome
                .as_ref()
                .map(|o| o.citations.clone())
                .unwrap_or_default(),
        })
        .collect();

    ReportData {
        project_id: project.id.clone(),
        name: project.name.clone(),
        domain: project.domain.clone(),
        device: project.device.to_string(),
        location: project.location_display(),
        counts: StatusCounts {
            pending: project.count_by_status(KeywordStatus::Pending),
            loading: project.count_by_status(KeywordStatus::Loading),
            success: project.count_by_status(KeywordStatus::Success),
            error: project.count_by_status(KeywordStatus::Error),
        },
        rows,
    }
}

pub fn generate_report(data: &ReportData, format: &ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
        ReportFormat::Csv => Ok(generate_csv_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("  {}\n", data.name));
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Project ID:   {}\n", data.project_id));
    report.push_str(&format!("Domain:       {}\n", data.domain));
    report.push_str(&format!("Keywords:     {}\n", data.rows.len()));
    report.push_str(&format!("Device:       {}\n", data.device));
    report.push_str(&format!("Location:     {}\n", data.location));
    report.push_str(&format!(
        "Status:       {} success, {} error, {} pending\n\n",
        data.counts.success,
        data.counts.error,
        data.counts.pending + data.counts.loading
    ));

    let keyword_width = data
        .rows
        .iter()
        .map(|r| r.keyword.chars().count())
        .max()
        .unwrap_or(0)
        .max("Keyword".len());

    report.push_str(&format!(
        "{:<kw$}  {:>9}  {:<8}  {}\n",
        "Keyword",
        "Rank",
        "Status",
        "Ranking URL",
        kw = keyword_width
    ));
    report.push_str(&format!("{}\n", "─".repeat(keyword_width + 40)));

    for row in &data.rows {
        report.push_str(&format!(
            "{:<kw$}  {:>9}  {:<8}  {}\n",
            row.keyword,
            row.rank,
            row.status,
            row.url,
            kw = keyword_width
        ));
        if let Some(ref error) = row.error {
            report.push_str(&wrap_text(error, 80, "    ! "));
            report.push('\n');
        }
    }

    report.push('\n');
    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Rankwatch",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "project": {
                "id": data.project_id,
                "name": data.name,
                "domain": data.domain,
                "device": data.device,
                "location": data.location
            },
            "summary": data.counts,
            "keywords": data.rows
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(data: &ReportData) -> String {
    let mut csv = String::from("keyword,rank,url,status,error\n");
    for row in &data.rows {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_csv(&row.keyword),
            escape_csv(&row.rank),
            escape_csv(&row.url),
            escape_csv(&row.status),
            escape_csv(row.error.as_deref().unwrap_or(""))
        ));
    }
    csv
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", data.name));
    md.push_str(&format!("- **Domain:** {}\n", data.domain));
    md.push_str(&format!("- **Keywords:** {}\n", data.rows.len()));
    md.push_str(&format!("- **Device:** {}\n", data.device));
    md.push_str(&format!("- **Location:** {}\n\n", data.location));

    md.push_str("| Keyword | Rank | Ranking URL | Status |\n");
    md.push_str("|---------|-----:|-------------|--------|\n");
    for row in &data.rows {
        let url = if row.url == NOT_AVAILABLE {
            NOT_AVAILABLE.to_string()
        } else {
            format!("<{}>", row.url)
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_markdown(&row.keyword),
            row.rank,
            url,
            row.status
        ));
    }

    let errors: Vec<&ReportRow> = data.rows.iter().filter(|r| r.error.is_some()).collect();
    if !errors.is_empty() {
        md.push_str("\n## Errors\n\n");
        for row in errors {
            md.push_str(&format!(
                "- **{}**: {}\n",
                escape_markdown(&row.keyword),
                row.error.as_deref().unwrap_or_default()
            ));
        }
    }

    md
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn escape_markdown(value: &str) -> String {
    value.replace('|', "\\|")
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width - indent.len() {
            lines.push(format!("{}{}", indent, current));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(format!("{}{}", indent, current));
    }

    lines.join("\n")
}
