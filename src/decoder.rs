//! Transfer-encoding aware part bodies.
//!
//! Only `base64` is decoded. Every other `Content-Transfer-Encoding` value
//! (`7bit`, `8bit`, `binary`, `quoted-printable`, or no header at all) is
//! passed through untouched.

use std::io::{self, Read};

use base64::{
    engine::{general_purpose::STANDARD, GeneralPurpose},
    read::DecoderReader,
};
use http::{HeaderMap, HeaderName};

/// `Content-Transfer-Encoding` header name.
pub const CONTENT_TRANSFER_ENCODING: HeaderName =
    HeaderName::from_static("content-transfer-encoding");

const BASE64: &[u8] = b"base64";

/// Decoding applied to a part body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDecoding {
    /// Body bytes are exposed as they appear on the wire.
    Identity,
    /// Body is standard-alphabet base64 with optional line breaks.
    Base64,
}

impl TransferDecoding {
    /// Picks the decoding for a header set. The match on `base64` is
    /// case-sensitive.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(CONTENT_TRANSFER_ENCODING) {
            Some(value) if value.as_bytes() == BASE64 => Self::Base64,
            _ => Self::Identity,
        }
    }
}

/// Part body reader with transfer decoding applied.
pub enum PartBody<R: Read> {
    /// Pass-through body.
    Identity(R),
    /// Base64-decoding body.
    Base64(DecoderReader<'static, GeneralPurpose, StripLineBreaks<R>>),
}

impl<R: Read> std::fmt::Debug for PartBody<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity(_) => f.write_str("PartBody::Identity"),
            Self::Base64(_) => f.write_str("PartBody::Base64"),
        }
    }
}

impl<R: Read> Read for PartBody<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Identity(body) => body.read(out),
            Self::Base64(body) => body.read(out),
        }
    }
}

/// Wraps `body` according to the part's transfer encoding.
///
/// A decoded encoding is removed from `headers` so callers see the part as if
/// it had been sent unencoded.
pub fn decode_part<R: Read>(headers: &mut HeaderMap, body: R) -> PartBody<R> {
    match TransferDecoding::from_headers(headers) {
        TransferDecoding::Base64 => {
            headers.remove(CONTENT_TRANSFER_ENCODING);

            #[cfg(feature = "tracing")]
            tracing::debug!("decoder: wrapping part body in base64 decoder");

            PartBody::Base64(DecoderReader::new(StripLineBreaks::new(body), &STANDARD))
        }
        TransferDecoding::Identity => PartBody::Identity(body),
    }
}

/// Reader adapter that drops CR and LF bytes.
#[derive(Debug)]
pub struct StripLineBreaks<R> {
    inner: R,
}

impl<R> StripLineBreaks<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for StripLineBreaks<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(out)?;
            if n == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for index in 0..n {
                let byte = out[index];
                if byte != b'\r' && byte != b'\n' {
                    out[kept] = byte;
                    kept += 1;
                }
            }

            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_breaks_across_small_reads() {
        let mut reader = StripLineBreaks::new(&b"ab\r\n\r\ncd\n"[..]);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).expect("read should succeed");
        assert_eq!(out, b"abcd");
    }

    #[test]
    fn base64_match_is_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TRANSFER_ENCODING, "BASE64".parse().expect("header value"));
        assert_eq!(TransferDecoding::from_headers(&headers), TransferDecoding::Identity);

        headers.insert(CONTENT_TRANSFER_ENCODING, "base64".parse().expect("header value"));
        assert_eq!(TransferDecoding::from_headers(&headers), TransferDecoding::Base64);
    }
}
