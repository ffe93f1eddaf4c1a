#![allow(missing_docs)]

use multipart_related::{
    Limits, ReaderBuilder, ReaderConfig, RelatedError, RelatedParams, RelatedReader,
};

const BODY: &str = concat!(
    "--BOUND\r\n",
    "Content-ID: <first@example.com>\r\n",
    "\r\n",
    "first\r\n",
    "--BOUND\r\n",
    "Content-ID: <root@example.com>\r\n",
    "Content-Type: text/html\r\n",
    "\r\n",
    "<p>root</p>\r\n",
    "--BOUND--\r\n"
);

#[test]
fn builder_default_is_permissive() {
    let builder = ReaderBuilder::default();
    assert_eq!(builder.config(), &ReaderConfig::default());
    assert_eq!(builder.params(), &RelatedParams::default());
}

#[test]
fn fluent_chaining_sets_expected_parameters() {
    let limits = Limits {
        max_parts: Some(4),
        max_header_size: Some(1024),
        ..Limits::default()
    };

    let reader = RelatedReader::<&[u8]>::builder()
        .boundary("BOUND")
        .media_type("text/html")
        .start("<root@example.com>")
        .start_info("viewer")
        .limits(limits.clone())
        .build(BODY.as_bytes())
        .expect("builder config should validate");

    assert_eq!(
        reader.params(),
        &RelatedParams::new("BOUND")
            .with_media_type("text/html")
            .with_start("<root@example.com>")
            .with_start_info("viewer")
    );
    assert_eq!(reader.limits(), &limits);
    assert_eq!(reader.start(), "root@example.com");
}

#[test]
fn built_reader_resolves_root_from_start() {
    let mut reader = ReaderBuilder::new()
        .boundary("BOUND")
        .start("<root@example.com>")
        .build(BODY.as_bytes())
        .expect("reader should build");

    let object = reader.read_object().expect("object should read");
    let root = object.root().expect("root should exist");
    assert_eq!(root.content_type(), Some("text/html"));
    assert_eq!(root.text().expect("utf-8"), "<p>root</p>");
    assert_eq!(object.parts()[1].content_id(), "first@example.com");
}

#[test]
fn with_params_and_with_config_replace_snapshots() {
    let params = RelatedParams::new("BOUND").with_media_type("text/html");
    let config = ReaderConfig {
        limits: Limits {
            max_parts: Some(1),
            ..Limits::default()
        },
    };

    let builder = ReaderBuilder::new()
        .with_params(params.clone())
        .with_config(config.clone());
    assert_eq!(builder.params(), &params);
    assert_eq!(builder.config(), &config);

    let mut reader = builder.build(BODY.as_bytes()).expect("reader should build");
    let err = reader.read_object().expect_err("second part exceeds max_parts");
    assert!(matches!(err, RelatedError::PartsLimitExceeded { max_parts: 1 }));
}

#[test]
fn build_rejects_invalid_config() {
    let err = ReaderBuilder::new()
        .boundary("BOUND")
        .limits(Limits {
            max_parts: Some(0),
            ..Limits::default()
        })
        .build(BODY.as_bytes())
        .expect_err("invalid limits must fail");
    assert!(matches!(err, RelatedError::Config(_)));
}
