//! Errors raised while reading or validating model data.

/// Errors produced by the gait model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("records are not sorted by time at row {index}")]
    Unsorted { index: usize },

    #[error("unknown symmetry method '{0}' (expected si, sa, usi or wusi)")]
    UnknownSymmetryMethod(String),

    #[error("unknown pairing side '{0}' (expected first, second or both)")]
    UnknownPairingSide(String),
}
