use crate::{
    config::{ReaderConfig, RelatedParams},
    error::{ConfigError, RelatedError},
    limits::Limits,
    reader::RelatedReader,
};

/// Builder for configuring a [`RelatedReader`].
#[derive(Debug, Clone, Default)]
pub struct ReaderBuilder {
    params: RelatedParams,
    config: ReaderConfig,
}

impl ReaderBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current parameter snapshot.
    pub fn params(&self) -> &RelatedParams {
        &self.params
    }

    /// Returns the current configuration snapshot.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Replaces all `multipart/related` parameters.
    pub fn with_params(mut self, params: RelatedParams) -> Self {
        self.params = params;
        self
    }

    /// Replaces the full reader configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the multipart boundary.
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.params.boundary = boundary.into();
        self
    }

    /// Sets the declared root media type (`type` parameter).
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.params.media_type = Some(media_type.into());
        self
    }

    /// Sets the root Content-ID (`start` parameter).
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.params.start = Some(start.into());
        self
    }

    /// Sets the `start-info` parameter.
    pub fn start_info(mut self, start_info: impl Into<String>) -> Self {
        self.params.start_info = Some(start_info.into());
        self
    }

    /// Sets reader limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Validates builder configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// Builds a reader over `source`.
    pub fn build<R>(self, source: R) -> Result<RelatedReader<R>, RelatedError> {
        RelatedReader::with_config(source, self.params, self.config)
    }
}
