use crate::{
    config::RelatedParams,
    error::{ParseError, RelatedError},
    parser::media_type::parse_media_type,
};

const MULTIPART_RELATED: &str = "multipart/related";
const MAX_BOUNDARY_LEN: usize = 69;

/// Extracts the `multipart/related` parameters from a `Content-Type` value.
pub fn extract_related_params(content_type: &str) -> Result<RelatedParams, ParseError> {
    let (essence, mut params) = parse_media_type(content_type)?;

    if essence != MULTIPART_RELATED {
        return Err(ParseError::new("Content-Type must be multipart/related"));
    }

    let boundary = params
        .remove("boundary")
        .filter(|boundary| !boundary.is_empty())
        .ok_or_else(|| ParseError::new("missing multipart boundary parameter"))?;

    Ok(RelatedParams {
        boundary,
        media_type: params.remove("type"),
        start: params.remove("start"),
        start_info: params.remove("start-info"),
    })
}

/// Validates a boundary chosen for writing.
///
/// Boundaries are 1 to 69 bytes drawn from the RFC 2046 `bchars` set and may
/// not end with a space.
pub fn validate_boundary(boundary: &str) -> Result<(), RelatedError> {
    let reject = |reason: &'static str| RelatedError::InvalidBoundary {
        boundary: boundary.to_owned(),
        reason,
    };

    if boundary.is_empty() {
        return Err(reject("boundary cannot be empty"));
    }

    if boundary.len() > MAX_BOUNDARY_LEN {
        return Err(reject("boundary cannot exceed 69 bytes"));
    }

    if boundary.ends_with(' ') {
        return Err(reject("boundary cannot end with whitespace"));
    }

    if !boundary.chars().all(is_boundary_char) {
        return Err(reject("boundary contains invalid characters"));
    }

    Ok(())
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}
