//! Content-ID tokens in wire form (`<local@domain>`) and canonical form
//! (`local@domain`).
//!
//! Only the RFC 5322 addr-spec production is supported: no display names, no
//! comments, no address lists. That is all a Content-ID ever carries.

use crate::error::RelatedError;

const ATEXT_SPECIALS: &[u8] = b"!#$%&'*+-/=?^_`{|}~";

/// Parses a wire Content-ID into its canonical addr-spec.
///
/// Accepts `<addr-spec>` and, leniently, a bare `addr-spec`. Malformed input
/// yields an empty string rather than an error.
pub fn parse_content_id(wire: &str) -> String {
    let token = wire.trim();
    let inner = match token.strip_prefix('<') {
        Some(rest) => match rest.strip_suffix('>') {
            Some(inner) => inner,
            None => return String::new(),
        },
        None => token,
    };

    if is_addr_spec(inner) {
        inner.to_owned()
    } else {
        String::new()
    }
}

/// Formats a canonical Content-ID for the wire by wrapping it in angle brackets.
///
/// The input must itself be a valid addr-spec; the empty string is rejected.
pub fn format_content_id(canonical: &str) -> Result<String, RelatedError> {
    if !is_addr_spec(canonical) {
        return Err(RelatedError::InvalidContentId {
            value: canonical.to_owned(),
        });
    }

    Ok(format!("<{canonical}>"))
}

/// Returns `true` when `value` is exactly one RFC 5322 addr-spec.
pub fn is_addr_spec(value: &str) -> bool {
    let bytes = value.as_bytes();
    let Some(local_end) = scan_local_part(bytes) else {
        return false;
    };

    match bytes[local_end..].strip_prefix(b"@") {
        Some(domain) => is_domain(domain),
        None => false,
    }
}

fn scan_local_part(bytes: &[u8]) -> Option<usize> {
    if bytes.first() == Some(&b'"') {
        return scan_quoted_string(bytes);
    }

    let end = bytes
        .iter()
        .position(|&b| !(is_atext(b) || b == b'.'))
        .unwrap_or(bytes.len());
    is_dot_atom(&bytes[..end]).then_some(end)
}

fn scan_quoted_string(bytes: &[u8]) -> Option<usize> {
    let mut index = 1;

    while let Some(&byte) = bytes.get(index) {
        match byte {
            b'"' => return Some(index + 1),
            b'\\' => {
                let escaped = *bytes.get(index + 1)?;
                if !(is_vchar(escaped) || is_wsp(escaped)) {
                    return None;
                }
                index += 2;
            }
            _ if is_qtext(byte) || is_wsp(byte) => index += 1,
            _ => return None,
        }
    }

    None
}

fn is_domain(bytes: &[u8]) -> bool {
    if let Some(literal) = bytes.strip_prefix(b"[") {
        return match literal.strip_suffix(b"]") {
            Some(inner) => inner.iter().all(|&b| is_dtext(b)),
            None => false,
        };
    }

    is_dot_atom(bytes)
}

fn is_dot_atom(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .split(|&b| b == b'.')
            .all(|atom| !atom.is_empty() && atom.iter().all(|&b| is_atext(b)))
}

fn is_atext(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(&byte)
}

fn is_qtext(byte: u8) -> bool {
    matches!(byte, 33 | 35..=91 | 93..=126)
}

fn is_dtext(byte: u8) -> bool {
    matches!(byte, 33..=90 | 94..=126)
}

fn is_vchar(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7e)
}

fn is_wsp(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}
