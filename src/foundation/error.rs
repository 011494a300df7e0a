/// Convenience alias used throughout the crate.
pub type PosterResult<T> = Result<T, PosterError>;

/// Pipeline stage that a provider failure is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStage {
    /// Street-network graph request.
    Network,
    /// Water feature-layer request.
    Water,
    /// Park/green-space feature-layer request.
    Parks,
    /// Geocoding request.
    Geocode,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStage::Network => "network",
            FetchStage::Water => "water",
            FetchStage::Parks => "parks",
            FetchStage::Geocode => "geocode",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// A cache payload could not be encoded. Non-fatal for callers: the
    /// cache is an optimization, not a source of truth.
    #[error("cache serialization error: {0}")]
    CacheSerialization(String),

    /// The cache directory is unwritable or missing. Non-fatal for callers.
    #[error("cache i/o error: {0}")]
    CacheIo(String),

    /// An upstream provider call failed for one fetch stage.
    #[error("provider error during {stage} fetch: {message}")]
    Provider { stage: FetchStage, message: String },

    /// Geocoding yielded nothing. Fatal, surfaced to the caller.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("theme error: {0}")]
    Theme(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    pub fn cache_serialization(msg: impl Into<String>) -> Self {
        Self::CacheSerialization(msg.into())
    }

    pub fn cache_io(msg: impl Into<String>) -> Self {
        Self::CacheIo(msg.into())
    }

    pub fn provider(stage: FetchStage, msg: impl Into<String>) -> Self {
        Self::Provider {
            stage,
            message: msg.into(),
        }
    }

    pub fn location_not_found(msg: impl Into<String>) -> Self {
        Self::LocationNotFound(msg.into())
    }

    pub fn theme(msg: impl Into<String>) -> Self {
        Self::Theme(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for the two cache failure kinds that callers treat as
    /// log-and-continue.
    pub fn is_cache_error(&self) -> bool {
        matches!(
            self,
            Self::CacheSerialization(_) | Self::CacheIo(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PosterError::cache_serialization("x")
                .to_string()
                .contains("cache serialization error:")
        );
        assert!(
            PosterError::cache_io("x")
                .to_string()
                .contains("cache i/o error:")
        );
        assert!(
            PosterError::provider(FetchStage::Water, "x")
                .to_string()
                .contains("during water fetch")
        );
        assert!(
            PosterError::location_not_found("Atlantis")
                .to_string()
                .contains("location not found: Atlantis")
        );
    }

    #[test]
    fn cache_errors_are_non_fatal_class() {
        assert!(PosterError::cache_serialization("x").is_cache_error());
        assert!(PosterError::cache_io("x").is_cache_error());
        assert!(!PosterError::render("x").is_cache_error());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PosterError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
