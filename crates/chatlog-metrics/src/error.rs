use std::path::PathBuf;

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Coarse classification used by callers that only care whether the source
/// itself was unusable or a single cell failed to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Ingestion,
    TypeCoercion,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("cannot open log source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: cannot coerce `{column}` value {value:?} to {expected}")]
    TypeCoercion {
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } | Self::Csv(_) | Self::MissingColumn(_) => ErrorKind::Ingestion,
            Self::TypeCoercion { .. } => ErrorKind::TypeCoercion,
        }
    }

    pub(crate) fn coercion(
        row: usize,
        column: &'static str,
        value: &str,
        expected: &'static str,
    ) -> Self {
        Self::TypeCoercion {
            row,
            column,
            value: value.to_string(),
            expected,
        }
    }
}
