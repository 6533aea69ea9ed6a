// Display-only readings of the free-text answer. Nothing here is persisted.

use std::fmt;

const RANK_PREFIX: &[u8] = b"rank: ";
const NOT_FOUND_PHRASE: &[u8] = b"not found in top 50 results";

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankReading {
    /// Digits exactly as the model wrote them.
    Position(String),
    NotFound,
    Unavailable,
}

impl RankReading {
    pub fn position(&self) -> Option<u32> {
        match self {
            RankReading::Position(digits) => digits.parse().ok(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RankReading::NotFound)
    }
}

impl fmt::Display for RankReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankReading::Position(digits) => f.write_str(digits),
            RankReading::NotFound => f.write_str("Not Found"),
            RankReading::Unavailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Finds `Rank: <digits>` or the not-found phrase, case-insensitively; the earliest one wins.
pub fn extract_rank(text: Option<&str>) -> RankReading {
    let Some(text) = text else {
        return RankReading::Unavailable;
    };

    // ASCII lowercasing keeps byte offsets identical to the original text
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    for start in 0..bytes.len() {
        let rest = &bytes[start..];

        if rest.starts_with(RANK_PREFIX) {
            let digits: Vec<u8> = rest[RANK_PREFIX.len()..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .copied()
                .collect();
            if !digits.is_empty() {
                return RankReading::Position(String::from_utf8_lossy(&digits).into_owned());
            }
        }

        if rest.starts_with(NOT_FOUND_PHRASE) {
            return RankReading::NotFound;
        }
    }

    RankReading::Unavailable
}

/// First `http://` or `https://` run of non-whitespace characters.
pub fn extract_url(text: Option<&str>) -> Option<&str> {
    let text = text?;

    for (start, _) in text.match_indices("http") {
        let rest = &text[start + 4..];
        let scheme_len = if rest.starts_with("s://") {
            8
        } else if rest.starts_with("://") {
            7
        } else {
            continue;
        };

        let body_start = start + scheme_len;
        let body_len = text[body_start..]
            .find(char::is_whitespace)
            .unwrap_or(text.len() - body_start);

        if body_len > 0 {
            return Some(&text[start..body_start + body_len]);
        }
    }

    None
}

pub fn display_url(text: Option<&str>) -> &str {
    extract_url(text).unwrap_or(NOT_AVAILABLE)
}
