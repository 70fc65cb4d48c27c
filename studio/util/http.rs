//! Form and multipart parsing for the studio's handlers — just enough of
//! each format for urlencoded forms and file uploads, no external parser.

// ---------------------------------------------------------------------------
// application/x-www-form-urlencoded
// ---------------------------------------------------------------------------

/// Decodes a percent-encoded string (`%XX`) and converts `+` to space.
pub fn url_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push((((h << 4) | l) as u8) as char);
                        i += 3;
                    }
                    _ => {
                        out.push('%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b as char);
                i += 1;
            }
        }
    }
    out
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter_map(|pair| {
            let mut it = pair.splitn(2, '=');
            let k = it.next()?.to_owned();
            let v = it.next().unwrap_or("").to_owned();
            Some((url_decode(&k), url_decode(&v)))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

// ---------------------------------------------------------------------------
// multipart/form-data
// ---------------------------------------------------------------------------

/// Returns the index of the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
}

/// Extracts the raw bytes of the file part named `field_name` from a
/// multipart/form-data body. Returns `None` if that field is missing,
/// empty, or not a file part.
pub fn multipart_file(body: &[u8], boundary: &str, field_name: &str) -> Option<Vec<u8>> {
    let delimiter = format!("--{}", boundary);
    for part in split_on(body, delimiter.as_bytes()) {
        let sep = b"\r\n\r\n";
        if let Some(sep_pos) = find_subsequence(part, sep) {
            let headers = String::from_utf8_lossy(&part[..sep_pos]);
            let has_name = headers.contains(&format!("name=\"{}\"", field_name));
            if has_name && headers.contains("filename=") {
                let raw = &part[sep_pos + sep.len()..];
                let trimmed = raw.strip_suffix(b"\r\n").unwrap_or(raw);
                if trimmed.is_empty() {
                    return None;
                }
                return Some(trimmed.to_vec());
            }
        }
    }
    None
}

/// Extracts a plain-text (non-file) field from a multipart body.
pub fn multipart_text(body: &[u8], boundary: &str, field_name: &str) -> Option<String> {
    let delimiter = format!("--{}", boundary);
    for part in split_on(body, delimiter.as_bytes()) {
        let sep = b"\r\n\r\n";
        if let Some(sep_pos) = find_subsequence(part, sep) {
            let headers = String::from_utf8_lossy(&part[..sep_pos]);
            let has_name = headers.contains(&format!("name=\"{}\"", field_name));
            if has_name && !headers.contains("filename=") {
                let raw = &part[sep_pos + sep.len()..];
                let trimmed = raw.strip_suffix(b"\r\n").unwrap_or(raw);
                return String::from_utf8(trimmed.to_vec()).ok();
            }
        }
    }
    None
}
