use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TidyDriveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Rule error in '{rule}': {message}")]
    Rule { rule: String, message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Plan validation error: {message}")]
    PlanValidation { message: String },

    #[error("Path generation failed for {path}: {message}")]
    PathGeneration { path: PathBuf, message: String },

    #[error("Duplicate detection error: {message}")]
    Detection { message: String },
}
