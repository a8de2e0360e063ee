use crate::error::RollupError;

/// Abstraction over a blocking HTTP GET.
///
/// Production code uses [`BasicClient`](super::BasicClient); tests
/// substitute in-memory implementations serving canned responses.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<String, RollupError>;
}
