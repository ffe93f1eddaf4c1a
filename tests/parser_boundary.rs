#![allow(missing_docs)]

use multipart_related::{
    parser::boundary::{extract_related_params, validate_boundary},
    RelatedError,
};

#[test]
fn extracts_all_related_parameters() {
    let params = extract_related_params(
        concat!(
            "multipart/related; boundary=example-1; type=\"text/html\"; ",
            "start=\"<root@example.com>\"; start-info=\"-o ps\""
        ),
    )
    .expect("content type should parse");

    assert_eq!(params.boundary, "example-1");
    assert_eq!(params.media_type.as_deref(), Some("text/html"));
    assert_eq!(params.start.as_deref(), Some("<root@example.com>"));
    assert_eq!(params.start_info.as_deref(), Some("-o ps"));
    assert_eq!(params.canonical_start(), "root@example.com");
}

#[test]
fn extracts_quoted_boundary_with_mixed_case_type() {
    let params = extract_related_params("Multipart/Related; Boundary=\"my boundary\"")
        .expect("quoted boundary should parse");
    assert_eq!(params.boundary, "my boundary");
    assert!(params.media_type.is_none());
    assert!(params.start.is_none());
}

#[test]
fn rejects_non_related_content_type() {
    let err = extract_related_params("multipart/mixed; boundary=abc").expect_err("must fail");
    assert_err_contains(&err.to_string(), "multipart/related");
}

#[test]
fn rejects_missing_boundary_parameter() {
    let err = extract_related_params("multipart/related; type=\"text/html\"")
        .expect_err("must fail");
    assert_err_contains(&err.to_string(), "missing multipart boundary");
}

#[test]
fn accepts_writer_boundaries() {
    for boundary in ["abc", "a'()+_,-./:=?z", "with space inside", &"a".repeat(69)] {
        validate_boundary(boundary).expect("boundary should be valid");
    }
}

#[test]
fn rejects_invalid_writer_boundaries() {
    let cases = [
        (String::new(), "empty"),
        ("a".repeat(70), "exceed 69"),
        ("trailing ".to_owned(), "whitespace"),
        ("ungültig".to_owned(), "invalid characters"),
        ("abc@123".to_owned(), "invalid characters"),
    ];

    for (boundary, fragment) in cases {
        let err = validate_boundary(&boundary).expect_err("boundary should be rejected");
        assert!(matches!(err, RelatedError::InvalidBoundary { .. }));
        assert_err_contains(&err.to_string(), fragment);
    }
}

fn assert_err_contains(actual: &str, expected_fragment: &str) {
    assert!(
        actual.contains(expected_fragment),
        "expected `{actual}` to contain `{expected_fragment}`"
    );
}
