use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Please fill out all fields: {0}")]
    Validation(String),

    #[error("Please fill out all fields and add at least one keyword.")]
    NoKeywords,

    #[error("API key must not be empty.")]
    EmptyCredential,

    #[error("This API key has already been added.")]
    DuplicateCredential,

    #[error(
        "Please add at least one API key in the \"Manage API Keys\" section before checking ranks."
    )]
    NoCredentials,

    #[error("Project not found: {0}")]
    UnknownProject(String),

    #[error("Project id '{0}' matches more than one project")]
    AmbiguousProject(String),

    #[error("Project {id} has {results} results for {keywords} keywords")]
    MisalignedResults {
        id: String,
        keywords: usize,
        results: usize,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
