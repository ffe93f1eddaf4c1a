#![allow(missing_docs)]

use std::io::Read;

use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use multipart_related::{BufferedPart, RelatedError, RelatedParams, RelatedReader};

const BODY: &str = concat!(
    "--BOUND\r\n",
    "Content-ID: <face@example.com>\r\n",
    "Content-Type: image/png\r\n",
    "X-Custom: 1\r\n",
    "X-Custom: 2\r\n",
    "\r\n",
    "abc\r\n",
    "--BOUND--\r\n"
);

#[test]
fn exposes_metadata_accessors() {
    let mut reader =
        RelatedReader::new(BODY.as_bytes(), RelatedParams::new("BOUND")).expect("reader");
    let part = reader
        .next_part()
        .expect("part should parse")
        .expect("part expected");

    assert_eq!(part.content_id(), "face@example.com");
    assert_eq!(part.content_type(), Some("image/png"));
    assert!(part.is_root());
    assert_eq!(part.headers().get_all("x-custom").iter().count(), 2);
}

#[test]
fn into_buffered_detaches_content() {
    let mut reader =
        RelatedReader::new(BODY.as_bytes(), RelatedParams::new("BOUND")).expect("reader");
    let part = reader
        .next_part()
        .expect("part should parse")
        .expect("part expected")
        .into_buffered()
        .expect("content should buffer");

    assert_eq!(part.content(), &Bytes::from_static(b"abc"));
    assert_eq!(part.len(), 3);
    assert!(!part.is_empty());
    assert_eq!(part.text().expect("utf-8"), "abc");
    assert!(reader.next_part().expect("end of parts").is_none());

    let mut again = String::new();
    part.reader().read_to_string(&mut again).expect("cursor read");
    assert_eq!(again, "abc");
}

#[test]
fn streams_content_in_small_reads() {
    let mut reader =
        RelatedReader::new(BODY.as_bytes(), RelatedParams::new("BOUND")).expect("reader");
    let mut part = reader
        .next_part()
        .expect("part should parse")
        .expect("part expected");

    let mut byte = [0u8; 1];
    let mut collected = Vec::new();
    while part.read(&mut byte).expect("read should succeed") > 0 {
        collected.push(byte[0]);
    }
    assert_eq!(collected, b"abc");
}

#[test]
fn buffered_part_accessors() {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert("content-id", HeaderValue::from_static("<note@example.com>"));

    let part = BufferedPart::new(headers, false, Bytes::from_static(b"\xff\xfe"));
    assert_eq!(part.content_id(), "note@example.com");
    assert_eq!(part.content_type(), Some("text/plain"));
    assert!(!part.is_root());
    assert!(matches!(part.text(), Err(RelatedError::Parse(_))));

    let empty = BufferedPart::new(HeaderMap::new(), true, Bytes::new());
    assert!(empty.is_empty());
    assert_eq!(empty.content_id(), "");
    assert_eq!(empty.content_type(), None);
}
