use std::io::{self, Cursor, Read};

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName};

use crate::{
    content_id::parse_content_id,
    decoder::PartBody,
    error::{ParseError, RelatedError},
    parser::stream::RawBody,
};

/// `Content-ID` header name.
pub const CONTENT_ID: HeaderName = HeaderName::from_static("content-id");

/// A streaming part of a `multipart/related` body.
///
/// The content reader borrows the [`RelatedReader`](crate::RelatedReader) it
/// came from and is only usable until the next `next_part` call.
#[derive(Debug)]
pub struct Part<'a, R: Read> {
    headers: HeaderMap,
    root: bool,
    body: PartBody<RawBody<'a, R>>,
}

impl<'a, R: Read> Part<'a, R> {
    pub(crate) fn new(headers: HeaderMap, root: bool, body: PartBody<RawBody<'a, R>>) -> Self {
        Self {
            headers,
            root,
            body,
        }
    }

    /// Returns the part headers. A decoded `Content-Transfer-Encoding` is
    /// not included.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns `true` when this part is the compound object's root.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Returns the canonical Content-ID, or `""` when absent or malformed.
    pub fn content_id(&self) -> String {
        content_id_of(&self.headers)
    }

    /// Returns the raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, &header::CONTENT_TYPE)
    }

    /// Reads the rest of the content and detaches the part from the reader.
    pub fn into_buffered(mut self) -> Result<BufferedPart, RelatedError> {
        let mut content = Vec::new();
        self.body
            .read_to_end(&mut content)
            .map_err(RelatedError::from_io)?;

        Ok(BufferedPart::new(self.headers, self.root, Bytes::from(content)))
    }

    /// Like [`Part::into_buffered`], but yields `None` when the content is
    /// longer than `limit` bytes.
    pub(crate) fn buffer_up_to(mut self, limit: u64) -> Result<Option<BufferedPart>, RelatedError> {
        let mut content = Vec::new();
        (&mut self.body)
            .take(limit.saturating_add(1))
            .read_to_end(&mut content)
            .map_err(RelatedError::from_io)?;

        if content.len() as u64 > limit {
            return Ok(None);
        }

        Ok(Some(BufferedPart::new(self.headers, self.root, Bytes::from(content))))
    }
}

impl<R: Read> Read for Part<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.body.read(out)
    }
}

/// A part whose decoded content is fully held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedPart {
    headers: HeaderMap,
    root: bool,
    content: Bytes,
}

impl BufferedPart {
    /// Creates a buffered part.
    pub fn new(headers: HeaderMap, root: bool, content: Bytes) -> Self {
        Self {
            headers,
            root,
            content,
        }
    }

    /// Returns the part headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns `true` when this part is the compound object's root.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Returns the canonical Content-ID, or `""` when absent or malformed.
    pub fn content_id(&self) -> String {
        content_id_of(&self.headers)
    }

    /// Returns the raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, &header::CONTENT_TYPE)
    }

    /// Returns the decoded content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Returns the decoded content as UTF-8 text.
    pub fn text(&self) -> Result<&str, RelatedError> {
        std::str::from_utf8(&self.content)
            .map_err(|_| ParseError::new("part content is not valid UTF-8").into())
    }

    /// Returns an independent reader over the content.
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }

    /// Returns the content length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` when the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn content_id_of(headers: &HeaderMap) -> String {
    header_str(headers, &CONTENT_ID)
        .map(parse_content_id)
        .unwrap_or_default()
}

fn header_str<'h>(headers: &'h HeaderMap, name: &HeaderName) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
