use crate::interpret::{RankReading, extract_rank, extract_url};
use rankwatch_lookup::{Device, RankQuery, RankingOutcome};
use serde::{Deserialize, Serialize};

/// Countries offered by the project form, in display order.
pub const COUNTRIES: [&str; 15] = [
    "United States",
    "United Kingdom",
    "Canada",
    "Australia",
    "Germany",
    "France",
    "Japan",
    "India",
    "Brazil",
    "Vietnam",
    "Singapore",
    "Mexico",
    "Italy",
    "Spain",
    "South Korea",
];

pub const DEFAULT_COUNTRY: &str = "Vietnam";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordStatus {
    #[default]
    Pending,
    Loading,
    Success,
    Error,
}

impl KeywordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordStatus::Pending => "pending",
            KeywordStatus::Loading => "loading",
            KeywordStatus::Success => "success",
            KeywordStatus::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeywordStatus::Pending => "Pending",
            KeywordStatus::Loading => "Checking",
            KeywordStatus::Success => "Success",
            KeywordStatus::Error => "Error",
        }
    }
}

/// Per-keyword state of a project. Once finished, exactly one of `outcome`/`error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub status: KeywordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RankingOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KeywordResult {
    pub fn pending(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            status: KeywordStatus::Pending,
            outcome: None,
            error: None,
        }
    }

    pub fn succeeded(keyword: impl Into<String>, outcome: RankingOutcome) -> Self {
        Self {
            keyword: keyword.into(),
            status: KeywordStatus::Success,
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn failed(keyword: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            status: KeywordStatus::Error,
            outcome: None,
            error: Some(error.into()),
        }
    }

    /// Marks the row as in flight. The previous answer stays visible until replaced.
    pub fn mark_loading(&mut self) {
        self.status = KeywordStatus::Loading;
    }

    pub fn ranking_text(&self) -> Option<&str> {
        self.outcome.as_ref().map(|o| o.ranking_text.as_str())
    }

    pub fn rank(&self) -> RankReading {
        extract_rank(self.ranking_text())
    }

    pub fn ranking_url(&self) -> Option<&str> {
        extract_url(self.ranking_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub device: Device,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub results: Vec<KeywordResult>,
}

impl Project {
    pub fn is_aligned(&self) -> bool {
        self.results.len() == self.keywords.len()
    }

    pub fn query_for(&self, keyword: &str) -> RankQuery {
        RankQuery {
            keyword: keyword.to_string(),
            domain: self.domain.clone(),
            device: self.device,
            country: self.country.clone(),
            city: self.city.clone(),
        }
    }

    /// "Hanoi, Vietnam" or just "Vietnam".
    pub fn location_display(&self) -> String {
        match &self.city {
            Some(city) => format!("{}, {}", city, self.country),
            None => self.country.clone(),
        }
    }

    pub fn count_by_status(&self, status: KeywordStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// User input for a new project, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub device: Device,
    pub country: String,
    pub city: Option<String>,
}

/// Splits a newline-separated keyword block, trimming lines and dropping blank ones.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
