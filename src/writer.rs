use std::io::Write;

use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::{
    content_id::format_content_id,
    error::RelatedError,
    multipart::{MultipartWriter, PartWriter},
    parser::media_type::{escape_quotes, format_media_type, validate_media_type, MediaTypeParams},
    part::CONTENT_ID,
};

/// Media type used for parts that do not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "text/plain; charset=utf-8";

const MULTIPART_RELATED: &str = "multipart/related";

/// Generates `multipart/related` bodies (RFC 2387).
///
/// Tracks the object's `type`, `start` and `start-info` parameters and checks
/// on [`close`](Self::close) that the declared type still matches the media
/// type of the root part.
#[derive(Debug)]
pub struct RelatedWriter<W> {
    inner: MultipartWriter<W>,
    start: Option<String>,
    media_type: Option<String>,
    start_info: Option<String>,
    root_media_type: Option<String>,
    first_part_written: bool,
    root_part_written: bool,
}

impl<W> RelatedWriter<W> {
    /// Creates a writer with a random boundary.
    pub fn new(sink: W) -> Self {
        Self {
            inner: MultipartWriter::new(sink),
            start: None,
            media_type: None,
            start_info: None,
            root_media_type: None,
            first_part_written: false,
            root_part_written: false,
        }
    }

    /// Returns the active boundary.
    pub fn boundary(&self) -> &str {
        self.inner.boundary()
    }

    /// Overrides the random boundary.
    ///
    /// The boundary must be 1 to 69 bytes of RFC 2046 boundary characters and
    /// must be set before any part is created.
    pub fn set_boundary(&mut self, boundary: impl Into<String>) -> Result<(), RelatedError> {
        self.inner.set_boundary(boundary)
    }

    /// Sets the root part's Content-ID (`start` parameter).
    pub fn set_start(&mut self, content_id: &str) -> Result<(), RelatedError> {
        self.start = Some(format_content_id(content_id)?);
        Ok(())
    }

    /// Sets the compound object's declared media type (`type` parameter).
    pub fn set_type(&mut self, media_type: &str) -> Result<(), RelatedError> {
        checked_content_type(media_type)?;
        self.media_type = Some(media_type.to_owned());
        Ok(())
    }

    /// Sets the `start-info` parameter verbatim.
    pub fn set_start_info(&mut self, start_info: impl Into<String>) {
        self.start_info = Some(start_info.into());
    }

    /// Wire-form root Content-ID, e.g. `<root@example.com>`.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Declared media type of the compound object.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Auxiliary `start-info` parameter.
    pub fn start_info(&self) -> Option<&str> {
        self.start_info.as_deref()
    }

    /// Media type recorded for the root part, or for the first part when no
    /// root was created explicitly.
    pub fn root_media_type(&self) -> Option<&str> {
        self.root_media_type.as_deref()
    }

    /// Returns `true` once any part has been created.
    pub fn first_part_written(&self) -> bool {
        self.first_part_written
    }

    /// Returns `true` once [`create_root`](Self::create_root) succeeded.
    pub fn root_part_written(&self) -> bool {
        self.root_part_written
    }

    /// Returns the `Content-Type` value for the generated body, e.g.
    /// `multipart/related; boundary=b; start="<root@x>"; type="text/html"`.
    pub fn form_data_content_type(&self) -> String {
        let mut params = MediaTypeParams::new();
        params.insert("boundary".to_owned(), self.inner.boundary().to_owned());

        if let Some(start) = non_empty(&self.start) {
            params.insert("start".to_owned(), start.to_owned());
        }
        if let Some(media_type) = non_empty(&self.media_type) {
            params.insert("type".to_owned(), escape_quotes(media_type));
        }
        if let Some(start_info) = non_empty(&self.start_info) {
            params.insert("start-info".to_owned(), escape_quotes(start_info));
        }

        // The essence and parameter names are fixed tokens, so formatting
        // cannot be rejected.
        format_media_type(MULTIPART_RELATED, &params).unwrap_or_default()
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write> RelatedWriter<W> {
    /// Creates the root part and returns a writer for its body.
    ///
    /// An empty `media_type` defaults to [`DEFAULT_MEDIA_TYPE`]. The media type
    /// becomes both the object's declared type and the recorded root type. A
    /// non-empty `content_id` also becomes the `start` parameter. Any
    /// `Content-Type` or `Content-ID` in `headers` is overridden.
    pub fn create_root(
        &mut self,
        content_id: &str,
        media_type: &str,
        mut headers: HeaderMap,
    ) -> Result<PartWriter<'_, W>, RelatedError> {
        if self.root_part_written {
            return Err(RelatedError::RootAlreadyExists);
        }
        if self.inner.is_closed() {
            return Err(RelatedError::WriterClosed);
        }

        let media_type = if media_type.is_empty() {
            DEFAULT_MEDIA_TYPE
        } else {
            media_type
        };
        let content_type = checked_content_type(media_type)?;
        let start = if content_id.is_empty() {
            None
        } else {
            let start = format_content_id(content_id)?;
            let value = content_id_value(&start)?;
            Some((start, value))
        };

        self.media_type = Some(media_type.to_owned());
        self.root_media_type = Some(media_type.to_owned());
        headers.insert(CONTENT_TYPE, content_type);
        if let Some((start, value)) = start {
            headers.insert(CONTENT_ID, value);
            self.start = Some(start);
        }
        self.first_part_written = true;
        self.root_part_written = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            media_type = media_type,
            start = ?self.start,
            "writer: created root part"
        );

        self.inner.create_part(&headers)
    }

    /// Creates a non-root part and returns a writer for its body.
    ///
    /// The part's media type comes from the `Content-Type` in `headers`,
    /// defaulting to [`DEFAULT_MEDIA_TYPE`]. When this is the first part and no
    /// root was created, its media type becomes both the declared type and the
    /// root type.
    pub fn create_part(
        &mut self,
        content_id: &str,
        mut headers: HeaderMap,
    ) -> Result<PartWriter<'_, W>, RelatedError> {
        if self.inner.is_closed() {
            return Err(RelatedError::WriterClosed);
        }

        let media_type = match headers.get(CONTENT_TYPE) {
            Some(value) => value
                .to_str()
                .map_err(|_| RelatedError::InvalidMediaType {
                    value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                })?
                .to_owned(),
            None => String::new(),
        };
        let media_type = if media_type.is_empty() {
            DEFAULT_MEDIA_TYPE.to_owned()
        } else {
            media_type
        };

        let content_type = checked_content_type(&media_type)?;
        let content_id = if content_id.is_empty() {
            None
        } else {
            Some(content_id_value(&format_content_id(content_id)?)?)
        };

        if !self.first_part_written {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                media_type = media_type.as_str(),
                "writer: first part sets root media type"
            );

            self.media_type = Some(media_type.clone());
            self.root_media_type = Some(media_type);
            self.first_part_written = true;
        }

        headers.insert(CONTENT_TYPE, content_type);
        if let Some(value) = content_id {
            headers.insert(CONTENT_ID, value);
        }

        self.inner.create_part(&headers)
    }

    /// Checks the declared type against the root type, then writes the closing
    /// delimiter. Closing twice is harmless.
    pub fn close(&mut self) -> Result<(), RelatedError> {
        if self.media_type != self.root_media_type {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                declared = ?self.media_type,
                root = ?self.root_media_type,
                "writer: declared type doesn't match root part"
            );

            return Err(RelatedError::TypeMismatch {
                declared: self.media_type.clone().unwrap_or_default(),
                root: self.root_media_type.clone().unwrap_or_default(),
            });
        }

        self.inner.close()
    }
}

fn checked_content_type(media_type: &str) -> Result<HeaderValue, RelatedError> {
    let invalid = || RelatedError::InvalidMediaType {
        value: media_type.to_owned(),
    };

    validate_media_type(media_type).map_err(|_| invalid())?;
    HeaderValue::from_str(media_type).map_err(|_| invalid())
}

fn content_id_value(wire: &str) -> Result<HeaderValue, RelatedError> {
    HeaderValue::from_str(wire).map_err(|_| RelatedError::InvalidContentId {
        value: wire.to_owned(),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
