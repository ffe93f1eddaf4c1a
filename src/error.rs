use std::io;

use thiserror::Error;

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configured numeric limit must be strictly greater than zero.
    #[error("limit `{limit}` must be greater than 0")]
    InvalidLimitValue {
        /// Name of the limit.
        limit: &'static str,
    },
}

/// Wire syntax failures from the multipart and media-type parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Generic parser failure with message context.
    #[error("{message}")]
    Message {
        /// Parser failure message.
        message: String,
    },
}

impl ParseError {
    /// Creates a parser error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Runtime error type used by `multipart-related`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RelatedError {
    /// Configuration error surfaced at runtime.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Multipart or media-type parser failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Underlying stream failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A Content-ID could not be formatted as an RFC 5322 addr-spec.
    #[error("invalid Content-ID `{value}`")]
    InvalidContentId {
        /// Rejected Content-ID value.
        value: String,
    },
    /// A second part matched the expected root Content-ID.
    #[error("duplicate root part with Content-ID `{content_id}`")]
    DuplicateRoot {
        /// Content-ID shared by both root candidates.
        content_id: String,
    },
    /// `create_root` was called more than once on the same writer.
    #[error("root part already exists")]
    RootAlreadyExists,
    /// The declared object type differs from the root part's media type.
    #[error("root media type `{root}` doesn't match declared type `{declared}`")]
    TypeMismatch {
        /// Media type declared for the compound object.
        declared: String,
        /// Media type recorded for the root or first part.
        root: String,
    },
    /// A media type string failed to parse.
    #[error("invalid media type `{value}`")]
    InvalidMediaType {
        /// Rejected media type.
        value: String,
    },
    /// A boundary failed validation or was set too late.
    #[error("invalid multipart boundary `{boundary}`: {reason}")]
    InvalidBoundary {
        /// Rejected boundary.
        boundary: String,
        /// Why the boundary was rejected.
        reason: &'static str,
    },
    /// A part was requested from a writer that was already closed.
    #[error("multipart writer is already closed")]
    WriterClosed,
    /// The number of parts exceeded the configured limit.
    #[error("multipart/related object exceeded max parts limit of {max_parts}")]
    PartsLimitExceeded {
        /// Maximum allowed number of parts.
        max_parts: usize,
    },
    /// A part header block exceeded the configured size limit.
    #[error("part header block exceeded max header size of {max_header_size} bytes")]
    HeaderSizeLimitExceeded {
        /// Maximum allowed header block size in bytes.
        max_header_size: usize,
    },
    /// The buffered object exceeded the configured size limit.
    #[error("multipart/related object exceeded max object size of {max_object_size} bytes")]
    ObjectSizeLimitExceeded {
        /// Maximum allowed total decoded content size in bytes.
        max_object_size: u64,
    },
    /// Multipart stream ended before a complete terminal boundary.
    #[error("multipart stream ended unexpectedly")]
    IncompleteStream,
}

impl RelatedError {
    /// Recovers an error that was tunnelled through an [`io::Error`] by a part
    /// body reader, or wraps a genuine I/O failure.
    pub fn from_io(err: io::Error) -> Self {
        if !err
            .get_ref()
            .is_some_and(|inner| inner.is::<RelatedError>())
        {
            return Self::Io(err);
        }

        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<RelatedError>()) {
            Some(Ok(related)) => *related,
            _ => Self::Io(io::Error::from(kind)),
        }
    }

    pub(crate) fn into_io(self) -> io::Error {
        match self {
            Self::Io(err) => err,
            Self::IncompleteStream => io::Error::new(io::ErrorKind::UnexpectedEof, self),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
