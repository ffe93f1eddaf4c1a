use std::{collections::BTreeMap, fmt::Write as _};

use crate::error::ParseError;

/// Parsed media type: lowercased `type/subtype` plus lowercased parameter names.
pub type MediaTypeParams = BTreeMap<String, String>;

/// Validates a media type string such as `text/plain; charset=utf-8`.
pub fn validate_media_type(value: &str) -> Result<mime::Mime, ParseError> {
    value
        .trim()
        .parse::<mime::Mime>()
        .map_err(|_| ParseError::new(format!("invalid media type `{value}`")))
}

/// Parses a media type value into its essence and parameter map.
///
/// Quoted parameter values are unescaped and RFC 2231 extended values
/// (`name*=utf-8''...`) are percent-decoded. Extended values take precedence
/// over plain ones with the same name.
pub fn parse_media_type(value: &str) -> Result<(String, MediaTypeParams), ParseError> {
    let mut segments = split_semicolon_aware(value).into_iter();
    let essence = segments
        .next()
        .map(|segment| segment.trim().to_ascii_lowercase())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::new("missing media type"))?;

    if !is_valid_essence(&essence) {
        return Err(ParseError::new(format!("invalid media type `{essence}`")));
    }

    let mut params = MediaTypeParams::new();
    let mut extended = MediaTypeParams::new();

    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
            return Err(ParseError::new("invalid media type parameter format"));
        };

        let key = raw_key.trim().to_ascii_lowercase();
        let name = key.trim_end_matches('*').to_owned();
        if !is_token(&name) {
            return Err(ParseError::new(format!("invalid parameter name `{key}`")));
        }
        let decoded = parse_parameter_value(raw_value.trim())?;

        let target = if key.ends_with('*') {
            &mut extended
        } else {
            &mut params
        };

        if target.insert(name.clone(), decoded).is_some() {
            return Err(ParseError::new(format!("duplicate parameter `{name}`")));
        }
    }

    for (name, encoded) in extended {
        params.insert(name, parse_rfc2231_value(&encoded)?);
    }

    Ok((essence, params))
}

/// Serializes a media type and its parameters.
///
/// Parameters are emitted in sorted order. Token values are written bare,
/// other ASCII values are quoted with `"` and `\` escaped, and non-ASCII values
/// use RFC 2231 extended notation. Returns `None` when the essence or a
/// parameter name is not a valid token.
pub fn format_media_type(essence: &str, params: &MediaTypeParams) -> Option<String> {
    if !is_valid_essence(essence) {
        return None;
    }

    let mut out = essence.to_ascii_lowercase();

    for (attribute, value) in params {
        if !is_token(attribute) {
            return None;
        }

        out.push_str("; ");
        out.push_str(&attribute.to_ascii_lowercase());

        if !value.is_ascii() {
            out.push_str("*=utf-8''");
            for byte in value.bytes() {
                if byte <= b' '
                    || byte >= 0x7f
                    || matches!(byte, b'*' | b'\'' | b'%')
                    || is_tspecial(byte)
                {
                    let _ = write!(out, "%{byte:02X}");
                } else {
                    out.push(char::from(byte));
                }
            }
            continue;
        }

        out.push('=');
        if is_token(value) {
            out.push_str(value);
        } else {
            out.push('"');
            for ch in value.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        }
    }

    Some(out)
}

/// Escapes `\` and `"` with a backslash.
pub fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_valid_essence(essence: &str) -> bool {
    match essence.split_once('/') {
        Some((kind, subtype)) => is_token(kind) && is_token(subtype),
        None => is_token(essence),
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|byte| byte > b' ' && byte < 0x7f && !is_tspecial(byte))
}

fn is_tspecial(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')'
            | b'<'
            | b'>'
            | b'@'
            | b','
            | b';'
            | b':'
            | b'\\'
            | b'"'
            | b'/'
            | b'['
            | b']'
            | b'?'
            | b'='
    )
}

fn parse_parameter_value(raw: &str) -> Result<String, ParseError> {
    if let Some(stripped) = raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return unescape_quoted_string(stripped);
    }

    if raw.contains('"') {
        return Err(ParseError::new("invalid quoted parameter value"));
    }

    Ok(raw.trim().to_owned())
}

fn unescape_quoted_string(value: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let escaped = chars
                .next()
                .ok_or_else(|| ParseError::new("dangling escape in quoted parameter"))?;
            out.push(escaped);
            continue;
        }
        out.push(ch);
    }

    Ok(out)
}

fn parse_rfc2231_value(value: &str) -> Result<String, ParseError> {
    let Some((charset, encoded)) = split_rfc2231(value) else {
        return Err(ParseError::new("invalid extended parameter encoding"));
    };

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return Err(ParseError::new(format!(
            "unsupported extended parameter charset `{charset}`"
        )));
    }

    percent_decode_utf8(encoded)
}

fn split_rfc2231(value: &str) -> Option<(&str, &str)> {
    let (charset, rest) = value.split_once('\'')?;
    let (_, encoded) = rest.split_once('\'')?;
    Some((charset, encoded))
}

fn percent_decode_utf8(value: &str) -> Result<String, ParseError> {
    let mut bytes = Vec::with_capacity(value.len());
    let raw = value.as_bytes();
    let mut index = 0;

    while index < raw.len() {
        if raw[index] == b'%' {
            if index + 2 >= raw.len() {
                return Err(ParseError::new("invalid percent-encoding in parameter"));
            }
            let hi = hex_value(raw[index + 1])?;
            let lo = hex_value(raw[index + 2])?;
            bytes.push((hi << 4) | lo);
            index += 3;
            continue;
        }

        bytes.push(raw[index]);
        index += 1;
    }

    String::from_utf8(bytes).map_err(|_| ParseError::new("extended parameter is not valid UTF-8"))
}

fn hex_value(byte: u8) -> Result<u8, ParseError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ParseError::new("invalid percent-encoding in parameter")),
    }
}

fn split_semicolon_aware(value: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                current.push(ch);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => {
                segments.push(current);
                current = String::new();
            }
            _ => current.push(ch),
        }
    }

    segments.push(current);
    segments
}
