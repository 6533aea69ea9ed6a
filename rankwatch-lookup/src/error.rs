use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API Key is missing. Please add a key in the API key manager.")]
    MissingKey,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("{status} ({code}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Failed to get ranking from Gemini API for \"{keyword}\": {source}")]
    Keyword {
        keyword: String,
        #[source]
        source: Box<LookupError>,
    },

    #[error("Other error: {0}")]
    Other(String),
}

impl LookupError {
    /// Attach the keyword being looked up, the way failures are shown per row.
    pub fn for_keyword(self, keyword: &str) -> Self {
        match self {
            LookupError::MissingKey | LookupError::Keyword { .. } => self,
            other => LookupError::Keyword {
                keyword: keyword.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
