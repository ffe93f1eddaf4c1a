use std::io::{self, Write};

use http::{HeaderMap, HeaderName};
use uuid::Uuid;

use crate::{error::RelatedError, parser::boundary::validate_boundary};

/// Boundary-delimited multipart body writer.
///
/// Parts are written strictly in sequence: each [`PartWriter`] borrows the
/// writer, so the next part can only be created once the previous body is
/// finished.
#[derive(Debug)]
pub struct MultipartWriter<W> {
    sink: W,
    boundary: String,
    parts_written: usize,
    closed: bool,
}

impl<W> MultipartWriter<W> {
    /// Creates a writer with a random boundary.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            boundary: random_boundary(),
            parts_written: 0,
            closed: false,
        }
    }

    /// Returns the active boundary.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Overrides the random boundary. Must be called before the first part.
    pub fn set_boundary(&mut self, boundary: impl Into<String>) -> Result<(), RelatedError> {
        let boundary = boundary.into();
        if self.parts_written > 0 {
            return Err(RelatedError::InvalidBoundary {
                boundary,
                reason: "boundary must be set before the first part",
            });
        }

        validate_boundary(&boundary)?;
        self.boundary = boundary;
        Ok(())
    }

    /// Returns the number of parts created so far.
    pub fn parts_written(&self) -> usize {
        self.parts_written
    }

    /// Returns `true` once the closing delimiter has been written.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> MultipartWriter<W> {
    /// Writes a delimiter and `headers`, then returns a writer for the body.
    ///
    /// Header names are emitted in sorted order.
    pub fn create_part(&mut self, headers: &HeaderMap) -> Result<PartWriter<'_, W>, RelatedError> {
        if self.closed {
            return Err(RelatedError::WriterClosed);
        }

        let mut head = Vec::with_capacity(128);
        if self.parts_written > 0 {
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"--");
        head.extend_from_slice(self.boundary.as_bytes());
        head.extend_from_slice(b"\r\n");

        let mut names: Vec<&HeaderName> = headers.keys().collect();
        names.sort_by(|left, right| left.as_str().cmp(right.as_str()));

        for name in names {
            let canonical = canonical_header_name(name);
            for value in headers.get_all(name) {
                head.extend_from_slice(canonical.as_bytes());
                head.extend_from_slice(b": ");
                head.extend_from_slice(value.as_bytes());
                head.extend_from_slice(b"\r\n");
            }
        }
        head.extend_from_slice(b"\r\n");

        self.sink.write_all(&head)?;
        self.parts_written += 1;

        Ok(PartWriter {
            sink: &mut self.sink,
        })
    }

    /// Writes the closing delimiter and flushes. Later calls do nothing.
    pub fn close(&mut self) -> Result<(), RelatedError> {
        if self.closed {
            return Ok(());
        }

        let trailer = if self.parts_written > 0 {
            format!("\r\n--{}--\r\n", self.boundary)
        } else {
            format!("--{}--\r\n", self.boundary)
        };

        self.sink.write_all(trailer.as_bytes())?;
        self.sink.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Body writer for a single part.
#[derive(Debug)]
pub struct PartWriter<'a, W> {
    sink: &'a mut W,
}

impl<W: Write> Write for PartWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn random_boundary() -> String {
    Uuid::new_v4().simple().to_string()
}

/// `content-transfer-encoding` becomes `Content-Transfer-Encoding`;
/// `content-id` keeps its RFC spelling `Content-ID`.
fn canonical_header_name(name: &HeaderName) -> String {
    if name.as_str() == "content-id" {
        return "Content-ID".to_owned();
    }

    let mut out = String::with_capacity(name.as_str().len());
    let mut upper = true;
    for ch in name.as_str().chars() {
        if upper {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        upper = ch == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_header_names() {
        let name = HeaderName::from_static("content-transfer-encoding");
        assert_eq!(canonical_header_name(&name), "Content-Transfer-Encoding");
        assert_eq!(
            canonical_header_name(&HeaderName::from_static("content-id")),
            "Content-ID"
        );
    }

    #[test]
    fn random_boundary_is_valid() {
        let boundary = random_boundary();
        assert_eq!(boundary.len(), 32);
        assert!(validate_boundary(&boundary).is_ok());
    }
}
