// Response decoding
//
// Turns a successful body into the caller's declared type. Most shapes are
// plain serde, but the backend has a few quirks that need help:
//
// - bare JSON arrays are wrapped as `{"items": [...]}` and unwrapped again
// - `{success, message}` envelopes may arrive as plain text
// - key/value maps are extracted with a scanner instead of serde, because
//   their values are not guaranteed to be uniformly typed JSON strings
//
// An empty body decodes as JSON `null`, so `()` and `Option<T>` accept it.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A type the executor can decode a response body into.
///
/// The default implementation is structured serde decoding; types with a
/// quirky wire shape override [`Payload::from_body`].
pub trait Payload: DeserializeOwned {
    fn from_body(body: &str) -> Result<Self, Error> {
        decode_structured(body)
    }
}

impl Payload for () {}
impl Payload for bool {}
impl Payload for String {}
impl Payload for serde_json::Value {}
impl<T: DeserializeOwned> Payload for Option<T> {}

impl<T: DeserializeOwned> Payload for Vec<T> {
    fn from_body(body: &str) -> Result<Self, Error> {
        decode_array(body)
    }
}

// ── Structured ───────────────────────────────────────────────────────

/// Decode `body` with serde, treating an empty body as `null`.
pub fn decode_structured<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let source = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(source).map_err(|e| deserialization_error(&e, body))
}

fn deserialization_error(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

// ── Bare arrays ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

/// Decode a bare JSON array by wrapping it in an `items` envelope.
///
/// A body that is already an `{"items": [...]}` object is accepted as is;
/// an empty body is an empty list. Any other object is a decode error.
pub fn decode_array<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, Error> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let wrapped = if trimmed.starts_with('[') {
        format!("{{\"items\":{trimmed}}}")
    } else {
        trimmed.to_owned()
    };
    serde_json::from_str::<Items<T>>(&wrapped)
        .map(|envelope| envelope.items)
        .map_err(|e| deserialization_error(&e, body))
}

// ── Message envelope ─────────────────────────────────────────────────

/// The backend's `{success, message}` acknowledgement.
///
/// Some endpoints answer with bare text instead of JSON; any body that
/// does not start with `{` becomes `{success: true, message: <body>}`.
/// A JSON body without a `success` field decodes it as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl Payload for MessageResponse {
    fn from_body(body: &str) -> Result<Self, Error> {
        if body.trim_start().starts_with('{') {
            decode_structured(body)
        } else {
            Ok(Self {
                success: true,
                message: body.to_owned(),
            })
        }
    }
}

// ── Key/value maps ───────────────────────────────────────────────────

/// Extract the object stored under `field` in `body` as a string map.
///
/// Scans the outer object for a top-level `"field":` key, balances braces
/// (respecting quoted strings and escapes) to find the nested object, then
/// splits it on top-level commas and each entry on its first colon outside
/// quotes. Quoted keys and values are unescaped; unquoted values (numbers,
/// booleans, nested objects) are kept as their raw JSON text.
///
/// A missing or `null` field yields an empty map.
pub fn decode_string_map(body: &str, field: &str) -> Result<IndexMap<String, String>, Error> {
    let malformed = |reason: &str| Error::Deserialization {
        message: format!("malformed `{field}` map: {reason}"),
        body: body.to_owned(),
    };

    let trimmed = body.trim();
    if !trimmed.starts_with('{') {
        return Err(malformed("body is not a JSON object"));
    }

    let Some(value_start) =
        find_top_level_field(trimmed, field).ok_or_else(|| malformed("unterminated string"))?
    else {
        return Ok(IndexMap::new());
    };

    let rest = &trimmed[value_start..];
    if rest.starts_with("null") {
        return Ok(IndexMap::new());
    }
    if !rest.starts_with('{') {
        return Err(malformed("field is not an object"));
    }

    let end = matching_brace(rest).ok_or_else(|| malformed("unbalanced braces"))?;
    let inner = &rest[1..end];

    let mut map = IndexMap::new();
    for entry in split_top_level(inner, ',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((key, value)) = split_first_unquoted(entry, ':') else {
            return Err(malformed(&format!("entry without a colon: {entry}")));
        };
        map.insert(unquote(key.trim()), unquote(value.trim()));
    }
    Ok(map)
}

/// Byte offset of the value following `"field":` at depth 1 of `object`.
///
/// The outer `None` means the scan hit an unterminated string.
fn find_top_level_field(object: &str, field: &str) -> Option<Option<usize>> {
    let bytes = object.as_bytes();
    let mut depth = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = closing_quote(bytes, i)?;
                if depth == 1 && &object[i + 1..end] == field {
                    let after = skip_whitespace(bytes, end + 1);
                    if bytes.get(after) == Some(&b':') {
                        return Some(Some(skip_whitespace(bytes, after + 1)));
                    }
                }
                i = end + 1;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    Some(None)
}

/// Index of the `}` closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = closing_quote(bytes, i)? + 1;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the quote closing the string that opens at `open`.
fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let mut escaped = false;
    for (offset, &b) in bytes.get(open + 1..)?.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == b'"' {
            return Some(open + 1 + offset);
        }
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// Split on `sep` where it appears outside strings and nested brackets.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0usize;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn split_first_unquoted(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == sep {
            return Some((&s[..i], &s[i + c.len_utf8()..]));
        }
    }
    None
}

/// Strip surrounding quotes, decoding JSON escapes when the token is a valid string.
fn unquote(token: &str) -> String {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        serde_json::from_str::<String>(token)
            .unwrap_or_else(|_| token[1..token.len() - 1].to_owned())
    } else {
        token.to_owned()
    }
}
