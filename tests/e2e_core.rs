#![allow(missing_docs)]

use std::io::{self, Read, Write};

use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use multipart_related::{
    decoder::CONTENT_TRANSFER_ENCODING, RelatedReader, RelatedWriter,
};

/// Delivers the input a few bytes at a time.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(out.len()).min(self.data.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn write_page() -> (String, Vec<u8>) {
    let mut writer = RelatedWriter::new(Vec::new());
    writer.set_start_info("-render \"fast\"");

    let mut image_headers = HeaderMap::new();
    image_headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
    image_headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("base64"));
    writer
        .create_part("logo@example.com", image_headers)
        .expect("image part")
        .write_all(b"iVBORw0K\r\nGgo=")
        .expect("image body");

    writer
        .create_root("page@example.com", "text/html", HeaderMap::new())
        .expect("root part")
        .write_all(b"<img src=\"cid:logo@example.com\">\r\n")
        .expect("root body");

    writer
        .create_part("", HeaderMap::new())
        .expect("anonymous part")
        .write_all(b"")
        .expect("empty body");

    let content_type = writer.form_data_content_type();
    writer.close().expect("close should succeed");
    (content_type, writer.into_inner())
}

#[test]
fn writer_output_reads_back_as_compound_object() {
    let (content_type, body) = write_page();
    let mut reader =
        RelatedReader::from_content_type(&content_type, body.as_slice()).expect("reader");

    assert_eq!(reader.media_type(), Some("text/html"));
    assert_eq!(reader.start(), "page@example.com");
    assert_eq!(reader.start_info(), Some("-render \\\"fast\\\""));

    let object = reader.read_object().expect("object should read");
    assert_eq!(object.len(), 3);

    let root = object.root().expect("root should exist");
    assert_eq!(root.content_id(), "page@example.com");
    assert_eq!(root.content_type(), Some("text/html"));
    assert_eq!(root.content().as_ref(), b"<img src=\"cid:logo@example.com\">\r\n");

    let logo = object
        .part_by_content_id("cid:logo@example.com")
        .expect("logo should resolve");
    assert_eq!(logo.content().as_ref(), b"\x89PNG\r\n\x1a\n");
    assert!(logo.headers().get(CONTENT_TRANSFER_ENCODING).is_none());

    let anonymous = &object.parts()[2];
    assert_eq!(anonymous.content_id(), "");
    assert!(anonymous.is_empty());
}

#[test]
fn writer_output_survives_trickled_reads() {
    let (content_type, body) = write_page();
    let source = Trickle {
        data: &body,
        step: 3,
    };
    let mut reader = RelatedReader::from_content_type(&content_type, source).expect("reader");

    let mut ids = Vec::new();
    while let Some(mut part) = reader.next_part().expect("part should parse") {
        let mut sink = Vec::new();
        part.read_to_end(&mut sink).expect("body should read");
        ids.push((part.content_id(), part.is_root(), sink.len()));
    }

    assert_eq!(
        ids,
        vec![
            ("logo@example.com".to_owned(), false, 8),
            ("page@example.com".to_owned(), true, 34),
            (String::new(), false, 0),
        ]
    );
}
