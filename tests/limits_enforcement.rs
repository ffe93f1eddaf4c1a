#![allow(missing_docs)]

use std::io::Read;

use multipart_related::{Limits, ReaderConfig, RelatedError, RelatedParams, RelatedReader};

fn reader_with(body: &str, limits: Limits) -> RelatedReader<&[u8]> {
    RelatedReader::with_config(
        body.as_bytes(),
        RelatedParams::new("BOUND"),
        ReaderConfig { limits },
    )
    .expect("reader should build")
}

const THREE_PARTS: &str = concat!(
    "--BOUND\r\n",
    "Content-ID: <a@x>\r\n",
    "\r\n",
    "aaaa\r\n",
    "--BOUND\r\n",
    "Content-ID: <b@x>\r\n",
    "\r\n",
    "bbbb\r\n",
    "--BOUND\r\n",
    "Content-ID: <c@x>\r\n",
    "\r\n",
    "cccc\r\n",
    "--BOUND--\r\n"
);

#[test]
fn enforces_max_parts() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_parts: Some(2),
            ..Limits::default()
        },
    );

    assert!(reader.next_part().expect("first part").is_some());
    assert!(reader.next_part().expect("second part").is_some());
    let err = reader.next_part().expect_err("third part exceeds limit");
    assert!(matches!(err, RelatedError::PartsLimitExceeded { max_parts: 2 }));
}

#[test]
fn max_parts_allows_exact_count() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_parts: Some(3),
            ..Limits::default()
        },
    );

    let object = reader.read_object().expect("three parts are allowed");
    assert_eq!(object.len(), 3);
}

#[test]
fn enforces_max_header_size() {
    let body = concat!(
        "--BOUND\r\n",
        "Content-ID: <a@x>\r\n",
        "X-Padding: 0123456789012345678901234567890123456789\r\n",
        "\r\n",
        "aaaa\r\n",
        "--BOUND--\r\n"
    );
    let mut reader = reader_with(
        body,
        Limits {
            max_header_size: Some(32),
            ..Limits::default()
        },
    );

    let err = reader.next_part().expect_err("header block too large");
    assert!(matches!(
        err,
        RelatedError::HeaderSizeLimitExceeded {
            max_header_size: 32
        }
    ));
}

#[test]
fn header_limit_counts_only_the_header_block() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_header_size: Some(32),
            ..Limits::default()
        },
    );

    let object = reader.read_object().expect("small headers are allowed");
    assert_eq!(object.len(), 3);
}

#[test]
fn enforces_max_object_size_across_parts() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_object_size: Some(10),
            ..Limits::default()
        },
    );

    let err = reader.read_object().expect_err("twelve bytes exceed ten");
    assert!(matches!(
        err,
        RelatedError::ObjectSizeLimitExceeded {
            max_object_size: 10
        }
    ));
}

#[test]
fn max_object_size_allows_exact_total() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_object_size: Some(12),
            ..Limits::default()
        },
    );

    let object = reader.read_object().expect("twelve bytes fit");
    let total: usize = object.iter().map(|part| part.len()).sum();
    assert_eq!(total, 12);
}

#[test]
fn object_limit_does_not_apply_to_streaming() {
    let mut reader = reader_with(
        THREE_PARTS,
        Limits {
            max_object_size: Some(1),
            ..Limits::default()
        },
    );

    let mut part = reader
        .next_part()
        .expect("part should parse")
        .expect("part should exist");
    let mut content = String::new();
    part.read_to_string(&mut content).expect("content should stream");
    assert_eq!(content, "aaaa");
}
