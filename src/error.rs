use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which input file failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Standings,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => write!(f, "Model"),
            ArtifactKind::Standings => write!(f, "Standings"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TitleOddsError {
    #[error("Total matches must be {expected}. Currently: {total}.")]
    InvalidMatchCount { total: u64, expected: u64 },

    #[error("{kind} file not found: {}", .path.display())]
    MissingArtifact { kind: ArtifactKind, path: PathBuf },

    #[error("Historical champion points have no spread (every season has {value} points)")]
    ZeroVariance { value: f64 },

    #[error("No historical champion records available")]
    EmptyHistory,

    #[error("Feature schema mismatch: model expects {expected:?}, got {actual:?}")]
    FeatureSchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Model returned a non-finite prediction: {0}")]
    InvalidModelOutput(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TitleOddsError {
    /// Errors the user can fix by correcting their input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TitleOddsError::InvalidMatchCount { .. })
    }
}

pub type Result<T> = std::result::Result<T, TitleOddsError>;
