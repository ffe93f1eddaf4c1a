#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! RFC 2387 `multipart/related` reader and writer.
//!
//! A `multipart/related` body is a compound object: several MIME parts tied
//! together by Content-ID references, one of which is the *root*.
//! [`RelatedReader`] resolves the root while streaming parts and can buffer a
//! whole [`CompoundObject`] with the root first. [`RelatedWriter`] generates
//! bodies and refuses to finish one whose declared `type` disagrees with its
//! root part.
//!
//! ```
//! use http::HeaderMap;
//! use multipart_related::{RelatedReader, RelatedWriter};
//! use std::io::Write;
//!
//! # fn main() -> Result<(), multipart_related::RelatedError> {
//! let mut writer = RelatedWriter::new(Vec::new());
//! writer
//!     .create_root("root@example.com", "text/html", HeaderMap::new())?
//!     .write_all(b"<img src=\"cid:logo@example.com\">")?;
//! writer
//!     .create_part("logo@example.com", HeaderMap::new())?
//!     .write_all(b"logo")?;
//! writer.close()?;
//!
//! let content_type = writer.form_data_content_type();
//! let body = writer.into_inner();
//!
//! let mut reader = RelatedReader::from_content_type(&content_type, body.as_slice())?;
//! let object = reader.read_object()?;
//! assert_eq!(object.root().map(|part| part.content_id()), Some("root@example.com".to_owned()));
//! assert!(object.part_by_content_id("cid:logo@example.com").is_some());
//! # Ok(())
//! # }
//! ```

/// Fluent reader builder.
pub mod builder;
/// Reader configuration and `multipart/related` parameters.
pub mod config;
/// Content-ID parsing and formatting.
pub mod content_id;
/// Transfer-encoding aware part bodies.
pub mod decoder;
/// Error types exposed by this crate.
pub mod error;
/// Reader limits.
pub mod limits;
/// Boundary-delimited multipart writer.
pub mod multipart;
/// Buffered compound object model.
pub mod object;
/// Low-level parser components.
pub mod parser;
/// Streaming and buffered part types.
pub mod part;
/// `multipart/related` reader.
pub mod reader;
/// `multipart/related` writer.
pub mod writer;

pub use builder::ReaderBuilder;
pub use config::{ReaderConfig, RelatedParams};
pub use content_id::{format_content_id, parse_content_id};
pub use decoder::{PartBody, TransferDecoding};
pub use error::{ConfigError, ParseError, RelatedError};
pub use limits::Limits;
pub use multipart::{MultipartWriter, PartWriter};
pub use object::CompoundObject;
pub use part::{BufferedPart, Part};
pub use reader::RelatedReader;
pub use writer::{RelatedWriter, DEFAULT_MEDIA_TYPE};
