/* src/form.rs */

use crate::error::{ReqError, Result};
use crate::values::Values;

/// Largest body accepted for form decoding (10 MiB).
pub const MAX_FORM_BODY: usize = 10 << 20;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Decode a request body into form values based on its `Content-Type`.
///
/// Urlencoded bodies are decoded in full, multipart bodies contribute their
/// text fields only. Any other (or missing) content type yields an empty map.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Values> {
    let Some(content_type) = content_type else {
        return Ok(Values::new());
    };

    let (media_type, params) = split_media_type(content_type);
    if media_type != URLENCODED && media_type != MULTIPART {
        return Ok(Values::new());
    }

    if body.len() > MAX_FORM_BODY {
        return Err(ReqError::FormTooLarge {
            size: body.len(),
            limit: MAX_FORM_BODY,
        });
    }

    if media_type == URLENCODED {
        return Ok(Values::parse_bytes(body));
    }

    match find_param(&params, "boundary") {
        Some(boundary) if !boundary.is_empty() => Ok(parse_multipart(body, boundary)),
        _ => {
            tracing::debug!("multipart body without boundary, ignoring");
            Ok(Values::new())
        }
    }
}

/// Split `type/subtype; k=v; k2="v2"` into the lowercased media type and its
/// parameters (names lowercased, values unquoted).
fn split_media_type(value: &str) -> (String, Vec<(String, String)>) {
    let mut pieces = value.split(';');
    let media_type = pieces.next().unwrap_or("").trim().to_ascii_lowercase();

    let params = pieces
        .filter_map(|piece| {
            let (name, value) = piece.split_once('=')?;
            let value = value.trim().trim_matches('"');
            Some((name.trim().to_ascii_lowercase(), value.to_string()))
        })
        .collect();

    (media_type, params)
}

fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_multipart(body: &[u8], boundary: &str) -> Values {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let mut values = Values::new();

    let Some(start) = find(body, delimiter) else {
        return values;
    };
    let mut rest = &body[start + delimiter.len()..];

    // Later delimiters only count at the start of a line.
    let anchored = [b"\n".as_slice(), delimiter].concat();

    // Each iteration sits just past a delimiter; "--" marks the closing one.
    while !rest.starts_with(b"--") {
        rest = strip_line_ending(rest);
        let Some(end) = find(rest, &anchored) else {
            break;
        };

        let part = &rest[..end];
        let part = part.strip_suffix(b"\r").unwrap_or(part);
        if let Some((name, value)) = parse_part(part) {
            values.add(name, value);
        }

        rest = &rest[end + anchored.len()..];
    }

    values
}

/// Returns the field name and text of a part, or `None` for file uploads and
/// parts without a usable `Content-Disposition`.
fn parse_part(part: &[u8]) -> Option<(String, String)> {
    let (head, content) = match find(part, b"\r\n\r\n") {
        Some(i) => (&part[..i], &part[i + 4..]),
        None => {
            let i = find(part, b"\n\n")?;
            (&part[..i], &part[i + 2..])
        }
    };

    let head = String::from_utf8_lossy(head);
    let disposition = head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-disposition")
            .then_some(value)
    })?;

    let (kind, params) = split_media_type(disposition);
    if kind != "form-data" || find_param(&params, "filename").is_some() {
        return None;
    }

    let name = find_param(&params, "name")?;
    Some((name.to_string(), String::from_utf8_lossy(content).into_owned()))
}

fn strip_line_ending(input: &[u8]) -> &[u8] {
    input
        .strip_prefix(b"\r\n")
        .or_else(|| input.strip_prefix(b"\n"))
        .unwrap_or(input)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPART_XYZ: Option<&str> = Some("multipart/form-data; boundary=XYZ");

    #[test]
    fn test_urlencoded_body() {
        let values = parse_body(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            b"key1=value1&key2=value%202",
        )
        .unwrap();
        assert_eq!(values.get("key1"), Some("value1"));
        assert_eq!(values.get("key2"), Some("value 2"));
    }

    #[test]
    fn test_content_type_is_case_insensitive() {
        let values = parse_body(Some("Application/X-WWW-Form-URLEncoded"), b"a=1")
            .unwrap();
        assert_eq!(values.get("a"), Some("1"));
    }

    #[test]
    fn test_other_content_types_yield_empty() {
        let json = parse_body(Some("application/json"), b"{\"a\":1}").unwrap();
        assert!(json.is_empty());
        assert!(parse_body(None, b"a=1").unwrap().is_empty());
    }

    #[test]
    fn test_too_large_body() {
        let body = vec![b'a'; MAX_FORM_BODY + 1];
        let err = parse_body(Some(URLENCODED), &body).unwrap_err();
        assert_eq!(
            err,
            ReqError::FormTooLarge {
                size: MAX_FORM_BODY + 1,
                limit: MAX_FORM_BODY
            }
        );
    }

    #[test]
    fn test_multipart_text_fields() {
        let body = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"title\"\r\n",
            "\r\n",
            "Hello\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "file contents\r\n",
            "--XYZ\r\n",
            "content-disposition: form-data; name=\"tags[]\"\r\n",
            "\r\n",
            "one\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"tags[]\"\r\n",
            "\r\n",
            "two\r\n",
            "--XYZ--\r\n",
        );

        let values = parse_body(MULTIPART_XYZ, body.as_bytes()).unwrap();
        assert_eq!(values.get("title"), Some("Hello"));
        assert_eq!(values.get_all("tags[]").unwrap(), ["one", "two"]);
        assert!(values.get("upload").is_none());
    }

    #[test]
    fn test_multipart_boundary_inside_value() {
        let body = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"t\"\r\n",
            "\r\n",
            "abc--XYZdef\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"empty\"\r\n",
            "\r\n",
            "\r\n",
            "--XYZ--\r\n",
        );

        let values = parse_body(MULTIPART_XYZ, body.as_bytes()).unwrap();
        assert_eq!(values.get("t"), Some("abc--XYZdef"));
        assert_eq!(values.get("empty"), Some(""));
    }

    #[test]
    fn test_multipart_bare_line_feeds() {
        let body = "--XYZ\nContent-Disposition: form-data; name=\"a\"\n\nline1\nline2\n--XYZ--\n";

        let values = parse_body(MULTIPART_XYZ, body.as_bytes()).unwrap();
        assert_eq!(values.get("a"), Some("line1\nline2"));
    }

    #[test]
    fn test_multipart_without_boundary() {
        let values = parse_body(Some("multipart/form-data"), b"--x\r\n").unwrap();
        assert!(values.is_empty());
    }
}
