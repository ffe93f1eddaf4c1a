/// `Content-Type` parameter extraction and boundary validation.
pub mod boundary;
/// Media type parsing, formatting and validation.
pub mod media_type;
/// Blocking multipart part reader.
pub mod stream;

pub use boundary::{extract_related_params, validate_boundary};
pub use media_type::{
    escape_quotes, format_media_type, parse_media_type, validate_media_type, MediaTypeParams,
};
pub use stream::{RawBody, RawPart, RawPartReader};
