use thiserror::Error;

/// Failure taxonomy for the rollup pipeline.
///
/// Nothing is retried or swallowed internally; every variant surfaces to
/// the immediate caller and aggregation is all-or-nothing per call.
#[derive(Error, Debug)]
pub enum RollupError {
    /// The caller requested an indicator code outside the supported set.
    /// Raised before any network access.
    #[error("unknown indicator code: {0}")]
    UnknownIndicator(String),

    /// An area identifier or indicator value from the source could not be
    /// parsed. Data-quality fault; rows are never coerced or dropped
    /// silently.
    #[error("malformed area identifier or value: {0}")]
    MalformedArea(String),

    /// Transport failure, non-success HTTP status, malformed response
    /// envelope, or a reference table that is empty after filtering.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A district's contributing areas sum to zero population, so
    /// population shares are undefined.
    #[error("district {district} has zero total population; weights are undefined")]
    DivisionUndefined { district: i64 },
}
