use std::io::Read;

use crate::{
    builder::ReaderBuilder,
    config::{ReaderConfig, RelatedParams},
    content_id::parse_content_id,
    decoder::decode_part,
    error::RelatedError,
    limits::Limits,
    object::CompoundObject,
    parser::{
        boundary::extract_related_params,
        stream::{RawPart, RawPartReader},
    },
    part::{Part, CONTENT_ID},
};

/// Root-resolution state for one compound object.
///
/// With an explicit `start`, the part whose Content-ID matches is the root and
/// a second match is an error. Without one, the first part is the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct RootTracker {
    expected: String,
    assigned: bool,
}

impl RootTracker {
    pub(crate) fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            assigned: false,
        }
    }

    pub(crate) fn expected(&self) -> &str {
        &self.expected
    }

    /// Returns whether the part carrying `content_id` is the root.
    pub(crate) fn classify(&mut self, content_id: &str) -> Result<bool, RelatedError> {
        if !self.expected.is_empty() && content_id == self.expected {
            if self.assigned {
                return Err(RelatedError::DuplicateRoot {
                    content_id: content_id.to_owned(),
                });
            }
            self.assigned = true;
            return Ok(true);
        }

        // Duplicate detection only applies to an explicit start id.
        if self.expected.is_empty() && !self.assigned {
            self.assigned = true;
            return Ok(true);
        }

        Ok(false)
    }
}

/// Iterator-like reader over the parts of a `multipart/related` body.
#[derive(Debug)]
pub struct RelatedReader<R> {
    raw: RawPartReader<R>,
    params: RelatedParams,
    roots: RootTracker,
    limits: Limits,
    parts_read: usize,
}

impl<R> RelatedReader<R> {
    /// Creates a reader from already extracted `multipart/related` parameters.
    pub fn new(source: R, params: RelatedParams) -> Result<Self, RelatedError> {
        Self::with_config(source, params, ReaderConfig::default())
    }

    /// Creates a reader with explicit validated configuration.
    pub fn with_config(
        source: R,
        params: RelatedParams,
        config: ReaderConfig,
    ) -> Result<Self, RelatedError> {
        config.validate()?;

        let raw = RawPartReader::new(params.boundary.clone(), source)?
            .with_max_header_size(config.limits.max_header_size);

        Ok(Self {
            raw,
            roots: RootTracker::new(params.canonical_start()),
            params,
            limits: config.limits,
            parts_read: 0,
        })
    }

    /// Creates a reader from a full `Content-Type` header value such as
    /// `multipart/related; boundary=b; type="text/html"; start="<root@x>"`.
    pub fn from_content_type(content_type: &str, source: R) -> Result<Self, RelatedError> {
        let params = extract_related_params(content_type)?;
        Self::new(source, params)
    }

    /// Creates a fluent builder.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Returns the parameters this reader was created with.
    pub fn params(&self) -> &RelatedParams {
        &self.params
    }

    /// Declared media type of the root part.
    pub fn media_type(&self) -> Option<&str> {
        self.params.media_type.as_deref()
    }

    /// Canonical Content-ID expected for the root, or `""` for first-part-wins.
    pub fn start(&self) -> &str {
        self.roots.expected()
    }

    /// Auxiliary `start-info` parameter.
    pub fn start_info(&self) -> Option<&str> {
        self.params.start_info.as_deref()
    }

    /// Returns the active limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl<R: Read> RelatedReader<R> {
    /// Returns the next part, or `Ok(None)` once every part has been read.
    ///
    /// The returned part borrows this reader; any content left unread is
    /// skipped by the next call.
    pub fn next_part(&mut self) -> Result<Option<Part<'_, R>>, RelatedError> {
        let Some(RawPart { mut headers, body }) = self.raw.next_part()? else {
            return Ok(None);
        };

        if !self.limits.allows_part(self.parts_read) {
            return Err(RelatedError::PartsLimitExceeded {
                max_parts: self.limits.max_parts.unwrap_or(self.parts_read),
            });
        }
        self.parts_read += 1;

        let content_id = headers
            .get(CONTENT_ID)
            .and_then(|value| value.to_str().ok())
            .map(parse_content_id)
            .unwrap_or_default();

        let root = match self.roots.classify(&content_id) {
            Ok(root) => root,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(content_id = content_id.as_str(), "reader: duplicate root part");
                return Err(err);
            }
        };

        #[cfg(feature = "tracing")]
        if root {
            tracing::debug!(
                content_id = content_id.as_str(),
                index = self.parts_read - 1,
                "reader: assigned root part"
            );
        }

        let body = decode_part(&mut headers, body);
        Ok(Some(Part::new(headers, root, body)))
    }

    /// Reads every remaining part into memory.
    ///
    /// Parts are kept in wire order except the root, which is moved to the
    /// front of the parts collected before it.
    pub fn read_object(&mut self) -> Result<CompoundObject, RelatedError> {
        let start = Some(self.roots.expected().to_owned()).filter(|start| !start.is_empty());
        let mut object = CompoundObject::new(
            self.params.media_type.clone(),
            start,
            self.params.start_info.clone(),
        );
        let max_object_size = self.limits.max_object_size;
        let mut total: u64 = 0;

        while let Some(part) = self.next_part()? {
            let buffered = match max_object_size {
                Some(max) => part
                    .buffer_up_to(max - total.min(max))?
                    .ok_or(RelatedError::ObjectSizeLimitExceeded {
                        max_object_size: max,
                    })?,
                None => part.into_buffered()?,
            };

            total += buffered.len() as u64;
            object.push(buffered);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            parts = object.len(),
            bytes = total,
            has_root = object.root().is_some(),
            "reader: materialized compound object"
        );

        Ok(object)
    }
}
