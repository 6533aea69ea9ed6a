use serde::{Deserialize, Serialize};
use std::fmt;

/// Device class the search is simulated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Some(Device::Desktop),
            "mobile" => Some(Device::Mobile),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grounding source the model cited while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Raw answer of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub ranking_text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl RankingOutcome {
    pub fn new(ranking_text: impl Into<String>) -> Self {
        Self {
            ranking_text: ranking_text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citation(mut self, url: impl Into<String>, title: Option<String>) -> Self {
        self.citations.push(Citation {
            url: url.into(),
            title,
        });
        self
    }
}

/// Everything a single lookup needs apart from the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuery {
    pub keyword: String,
    pub domain: String,
    pub device: Device,
    pub country: String,
    pub city: Option<String>,
}

impl RankQuery {
    /// "in the city of Hanoi, Vietnam" or "in Vietnam".
    pub fn location_phrase(&self) -> String {
        match &self.city {
            Some(city) => format!("in the city of {}, {}", city, self.country),
            None => format!("in {}", self.country),
        }
    }
}
