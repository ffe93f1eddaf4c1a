use crate::{content_id::parse_content_id, error::ConfigError, limits::Limits};

/// Parameters of a `multipart/related` media type (RFC 2387 section 3).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelatedParams {
    /// Multipart boundary separating body parts.
    pub boundary: String,
    /// The `type` parameter: media type of the root part.
    pub media_type: Option<String>,
    /// The `start` parameter in wire form, e.g. `<root@example.com>`.
    pub start: Option<String>,
    /// The `start-info` parameter, passed through verbatim.
    pub start_info: Option<String>,
}

impl RelatedParams {
    /// Creates parameters with only a boundary set.
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            ..Self::default()
        }
    }

    /// Sets the `type` parameter.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the `start` parameter.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Sets the `start-info` parameter.
    pub fn with_start_info(mut self, start_info: impl Into<String>) -> Self {
        self.start_info = Some(start_info.into());
        self
    }

    /// Canonical Content-ID of the root part, or `""` when `start` is absent
    /// or malformed.
    pub fn canonical_start(&self) -> String {
        self.start
            .as_deref()
            .map(parse_content_id)
            .unwrap_or_default()
    }
}

/// Reader configuration model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderConfig {
    /// Resource limits applied while reading.
    pub limits: Limits,
}

impl ReaderConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every configured limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()
    }
}
