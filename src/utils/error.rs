use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("System error: {0}")]
    System(String),
}

impl From<rusqlite::Error> for HealthError {
    fn from(e: rusqlite::Error) -> Self {
        HealthError::Query(e.to_string())
    }
}

impl From<glob::PatternError> for HealthError {
    fn from(e: glob::PatternError) -> Self {
        HealthError::Parse(format!("glob pattern: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, HealthError>;
