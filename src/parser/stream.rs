use std::io::{self, Read};

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{ParseError, RelatedError};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StartBoundary,
    Headers,
    Body,
    End,
    Failed,
}

/// Incremental multipart reader over a blocking byte source.
///
/// Yields raw parts in wire order. Part bodies are streamed straight out of
/// the internal buffer and end at the next delimiter; a body that is not read
/// to the end is skipped by the following [`RawPartReader::next_part`] call.
#[derive(Debug)]
pub struct RawPartReader<R> {
    source: R,
    boundary_line: Vec<u8>,
    boundary_end_line: Vec<u8>,
    delimiter: Vec<u8>,
    buffer: Vec<u8>,
    state: ParseState,
    upstream_done: bool,
    body_started: bool,
    max_header_size: Option<usize>,
}

/// A raw body part: its headers and a reader over its undecoded body.
#[derive(Debug)]
pub struct RawPart<'a, R> {
    /// Part headers, names normalized to lowercase.
    pub headers: HeaderMap,
    /// Undecoded body, valid until the next `next_part` call.
    pub body: RawBody<'a, R>,
}

/// Streaming reader over one raw part body.
#[derive(Debug)]
pub struct RawBody<'a, R> {
    reader: &'a mut RawPartReader<R>,
}

impl<R: Read> Read for RawBody<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.reader.read_body(out).map_err(RelatedError::into_io)
    }
}

impl<R> RawPartReader<R> {
    /// Creates a raw reader for a known multipart boundary.
    pub fn new(boundary: impl Into<String>, source: R) -> Result<Self, ParseError> {
        let boundary = boundary.into();
        validate_boundary_input(&boundary)?;

        Ok(Self {
            source,
            boundary_line: format!("--{boundary}").into_bytes(),
            boundary_end_line: format!("--{boundary}--").into_bytes(),
            delimiter: format!("\n--{boundary}").into_bytes(),
            buffer: Vec::new(),
            state: ParseState::StartBoundary,
            upstream_done: false,
            body_started: false,
            max_header_size: None,
        })
    }

    /// Caps the size of a single part's header block.
    pub fn with_max_header_size(mut self, max_header_size: Option<usize>) -> Self {
        self.max_header_size = max_header_size;
        self
    }

    /// Returns `true` once the closing delimiter has been consumed.
    pub fn is_finished(&self) -> bool {
        self.state == ParseState::End
    }
}

impl<R: Read> RawPartReader<R> {
    /// Advances to the next part, skipping whatever remains of the current one.
    ///
    /// Returns `Ok(None)` after the closing delimiter.
    pub fn next_part(&mut self) -> Result<Option<RawPart<'_, R>>, RelatedError> {
        loop {
            match self.state {
                ParseState::StartBoundary => {
                    let line = match take_line(&mut self.buffer) {
                        Some(line) => line,
                        None if self.upstream_done && !self.buffer.is_empty() => {
                            std::mem::take(&mut self.buffer)
                        }
                        None if self.upstream_done => {
                            self.state = ParseState::Failed;
                            return Err(RelatedError::IncompleteStream);
                        }
                        None => {
                            self.fill()?;
                            continue;
                        }
                    };

                    let line = trim_line_end(&line);
                    if line == self.boundary_line.as_slice() {
                        self.state = ParseState::Headers;
                    } else if line == self.boundary_end_line.as_slice() {
                        self.state = ParseState::End;
                    }
                }
                ParseState::Headers => {
                    let Some(raw) = self.take_header_block()? else {
                        if self.upstream_done {
                            self.state = ParseState::Failed;
                            return Err(RelatedError::IncompleteStream);
                        }
                        self.fill()?;
                        continue;
                    };

                    let headers = match parse_header_block(&raw) {
                        Ok(headers) => headers,
                        Err(err) => {
                            self.state = ParseState::Failed;
                            return Err(err.into());
                        }
                    };

                    self.state = ParseState::Body;
                    self.body_started = false;
                    return Ok(Some(RawPart {
                        headers,
                        body: RawBody { reader: self },
                    }));
                }
                ParseState::Body => self.skip_body()?,
                ParseState::End | ParseState::Failed => return Ok(None),
            }
        }
    }

    fn take_header_block(&mut self) -> Result<Option<Vec<u8>>, RelatedError> {
        if self.buffer.starts_with(b"\r\n") {
            self.buffer.drain(..2);
            return Ok(Some(Vec::new()));
        }
        if self.buffer.starts_with(b"\n") {
            self.buffer.drain(..1);
            return Ok(Some(Vec::new()));
        }

        let Some((block_len, consumed)) = find_header_end(&self.buffer) else {
            self.check_header_size(self.buffer.len())?;
            return Ok(None);
        };

        self.check_header_size(block_len)?;
        let raw = self.buffer[..block_len].to_vec();
        self.buffer.drain(..consumed);
        Ok(Some(raw))
    }

    fn check_header_size(&mut self, size: usize) -> Result<(), RelatedError> {
        match self.max_header_size {
            Some(max_header_size) if size > max_header_size => {
                self.state = ParseState::Failed;
                Err(RelatedError::HeaderSizeLimitExceeded { max_header_size })
            }
            _ => Ok(()),
        }
    }

    fn read_body(&mut self, out: &mut [u8]) -> Result<usize, RelatedError> {
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            if self.state != ParseState::Body {
                return Ok(0);
            }

            match self.scan_body() {
                BodyScan::Content(available) if available > 0 => {
                    return Ok(self.emit(out, available));
                }
                BodyScan::Boundary { content_len, .. } if content_len > 0 => {
                    return Ok(self.emit(out, content_len));
                }
                BodyScan::Boundary {
                    consumed, terminal, ..
                } => {
                    if terminal {
                        self.buffer.clear();
                        self.state = ParseState::End;
                    } else {
                        self.buffer.drain(..consumed);
                        self.state = ParseState::Headers;
                    }
                    return Ok(0);
                }
                BodyScan::Content(_) | BodyScan::NeedMore => {
                    if self.upstream_done {
                        self.state = ParseState::Failed;
                        return Err(RelatedError::IncompleteStream);
                    }
                    self.fill()?;
                }
            }
        }
    }

    fn emit(&mut self, out: &mut [u8], available: usize) -> usize {
        let n = available.min(out.len());
        out[..n].copy_from_slice(&self.buffer[..n]);
        self.buffer.drain(..n);
        self.body_started = true;
        n
    }

    fn scan_body(&self) -> BodyScan {
        // An empty body leaves the next boundary line directly after the
        // header block, with no line break of its own in front.
        if !self.body_started && self.buffer.starts_with(&self.boundary_line) {
            let rest = &self.buffer[self.boundary_line.len()..];
            match classify_suffix(rest, self.upstream_done) {
                Suffix::Terminal => {
                    return BodyScan::Boundary {
                        content_len: 0,
                        consumed: self.buffer.len(),
                        terminal: true,
                    };
                }
                Suffix::Next(len) => {
                    return BodyScan::Boundary {
                        content_len: 0,
                        consumed: self.boundary_line.len() + len,
                        terminal: false,
                    };
                }
                Suffix::NeedMore => return BodyScan::NeedMore,
                Suffix::NotDelimiter => {}
            }
        }

        let mut search_from = 0;

        loop {
            let Some(relative) = find_subslice(&self.buffer[search_from..], &self.delimiter) else {
                // Hold back enough bytes for a delimiter split across reads.
                let keep = self.delimiter.len() + 1;
                let safe = self.buffer.len().saturating_sub(keep).max(search_from);
                return BodyScan::Content(safe);
            };

            let index = search_from + relative;
            let content_len = if index > 0 && self.buffer[index - 1] == b'\r' {
                index - 1
            } else {
                index
            };
            let suffix_start = index + self.delimiter.len();

            match classify_suffix(&self.buffer[suffix_start..], self.upstream_done) {
                Suffix::Terminal => {
                    return BodyScan::Boundary {
                        content_len,
                        consumed: self.buffer.len(),
                        terminal: true,
                    };
                }
                Suffix::Next(len) => {
                    return BodyScan::Boundary {
                        content_len,
                        consumed: suffix_start + len,
                        terminal: false,
                    };
                }
                Suffix::NeedMore if content_len > 0 => return BodyScan::Content(content_len),
                Suffix::NeedMore => return BodyScan::NeedMore,
                Suffix::NotDelimiter => search_from = index + 1,
            }
        }
    }

    fn skip_body(&mut self) -> Result<(), RelatedError> {
        let mut scratch = [0u8; READ_CHUNK];
        while self.read_body(&mut scratch)? > 0 {}
        Ok(())
    }

    fn fill(&mut self) -> Result<(), RelatedError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.source.read(&mut chunk) {
                Ok(0) => {
                    self.upstream_done = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.state = ParseState::Failed;
                    return Err(err.into());
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyScan {
    Content(usize),
    Boundary {
        content_len: usize,
        consumed: usize,
        terminal: bool,
    },
    NeedMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    Terminal,
    Next(usize),
    NeedMore,
    NotDelimiter,
}

/// Classifies what follows `\n--boundary`: `--` closes the body, optional
/// linear whitespace then a line break starts the next part, anything else
/// means the match was body content.
fn classify_suffix(rest: &[u8], upstream_done: bool) -> Suffix {
    let incomplete = if upstream_done {
        Suffix::NotDelimiter
    } else {
        Suffix::NeedMore
    };

    if rest.starts_with(b"--") {
        return Suffix::Terminal;
    }
    if rest.is_empty() || rest == b"-" {
        return incomplete;
    }

    let lwsp = rest
        .iter()
        .take_while(|&&byte| byte == b' ' || byte == b'\t')
        .count();

    match &rest[lwsp..] {
        [] | [b'\r'] => incomplete,
        [b'\n', ..] => Suffix::Next(lwsp + 1),
        [b'\r', b'\n', ..] => Suffix::Next(lwsp + 2),
        _ => Suffix::NotDelimiter,
    }
}

fn parse_header_block(raw: &[u8]) -> Result<HeaderMap, ParseError> {
    let mut headers = HeaderMap::new();
    let mut current: Option<(HeaderName, Vec<u8>)> = None;

    for line in raw.split(|&byte| byte == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        if matches!(line[0], b' ' | b'\t') {
            let Some((_, value)) = current.as_mut() else {
                return Err(ParseError::new(
                    "part header continuation without a header",
                ));
            };
            value.push(b' ');
            value.extend_from_slice(trim_whitespace(line));
            continue;
        }

        if let Some((name, value)) = current.take() {
            append_header(&mut headers, name, &value)?;
        }

        let Some(colon) = line.iter().position(|&byte| byte == b':') else {
            return Err(ParseError::new("invalid part header line"));
        };

        let name = HeaderName::from_bytes(trim_whitespace(&line[..colon]))
            .map_err(|_| ParseError::new("invalid part header name"))?;
        current = Some((name, trim_whitespace(&line[colon + 1..]).to_vec()));
    }

    if let Some((name, value)) = current {
        append_header(&mut headers, name, &value)?;
    }

    Ok(headers)
}

fn append_header(
    headers: &mut HeaderMap,
    name: HeaderName,
    value: &[u8],
) -> Result<(), ParseError> {
    let value =
        HeaderValue::from_bytes(value).map_err(|_| ParseError::new("invalid part header value"))?;
    headers.append(name, value);
    Ok(())
}

fn find_header_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let mut search_from = 0;

    while let Some(relative) = buffer[search_from..].iter().position(|&byte| byte == b'\n') {
        let index = search_from + relative;
        let rest = &buffer[index + 1..];
        if rest.starts_with(b"\n") {
            return Some((index + 1, index + 2));
        }
        if rest.starts_with(b"\r\n") {
            return Some((index + 1, index + 3));
        }
        search_from = index + 1;
    }

    None
}

fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let split = buffer.iter().position(|&byte| byte == b'\n')?;
    let line = buffer[..split].to_vec();
    buffer.drain(..=split);
    Some(line)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&byte| !matches!(byte, b'\r' | b' ' | b'\t'))
        .map_or(0, |index| index + 1);
    &line[..end]
}

fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(start, |index| index + 1);
    &bytes[start..end]
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack.windows(needle.len()).position(|window| window == needle)
}

fn validate_boundary_input(boundary: &str) -> Result<(), ParseError> {
    if boundary.is_empty() {
        return Err(ParseError::new("multipart boundary cannot be empty"));
    }

    if boundary.contains('\r') || boundary.contains('\n') {
        return Err(ParseError::new("multipart boundary cannot contain CRLF"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_delimiter_suffixes() {
        assert_eq!(classify_suffix(b"--\r\n", false), Suffix::Terminal);
        assert_eq!(classify_suffix(b"\r\nContent", false), Suffix::Next(2));
        assert_eq!(classify_suffix(b" \t\nX", false), Suffix::Next(3));
        assert_eq!(classify_suffix(b"x\r\n", false), Suffix::NotDelimiter);
        assert_eq!(classify_suffix(b"\r", false), Suffix::NeedMore);
        assert_eq!(classify_suffix(b"", true), Suffix::NotDelimiter);
    }

    #[test]
    fn folds_continuation_lines() {
        let headers = parse_header_block(b"Content-Type: text/plain;\r\n\tcharset=utf-8\r\n")
            .expect("headers should parse");
        assert_eq!(
            headers.get("content-type").and_then(|value| value.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn finds_header_end_with_mixed_line_endings() {
        assert_eq!(find_header_end(b"A: b\r\n\r\nbody"), Some((6, 8)));
        assert_eq!(find_header_end(b"A: b\n\nbody"), Some((5, 6)));
        assert_eq!(find_header_end(b"A: b\r\n"), None);
    }
}
