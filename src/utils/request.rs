use http::HeaderMap;

/// Parses `key=value` pairs separated by `&` into an ordered lookup.
///
/// Used for both query strings and form-encoded bodies. Keys and values are
/// percent-decoded, with `+` standing for a space. The first occurrence of a
/// key wins; key-only entries map to an empty value.
pub fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if raw.is_empty() {
        return pairs;
    }
    for item in raw.split('&') {
        if let Some((k, v)) = item.split_once('=') {
            pairs.push((decode_component(k), decode_component(v)));
        } else if !item.is_empty() {
            pairs.push((decode_component(item), String::new()));
        }
    }
    pairs
}

/// Decodes `%XX` escapes and `+` in a query/form component.
///
/// Invalid escapes pass through literally instead of failing the parse.
fn decode_component(raw: &str) -> String {
    if !raw.contains(['%', '+']) {
        return raw.to_string();
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Looks up the first value for `name` among parsed pairs.
pub fn pair_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Retrieves the value of a specific header.
///
/// Returns `None` if the header is not present or its value is not valid UTF-8.
pub fn get_header_value<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|value| value.to_str().ok())
}

/// Retrieves the value of a specific cookie from the `Cookie` header.
///
/// Parses the `Cookie` header string manually. This is sufficient for simple
/// key=value pairs but might not handle complex/encoded cookie values robustly.
/// Returns the first occurrence of the cookie's value.
pub fn get_cookie_value<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    if let Some(cookie_header_value) = get_header_value(headers, "Cookie") {
        for item in cookie_header_value.split(';') {
            let trimmed_item = item.trim();
            if let Some((k, v)) = trimmed_item.split_once('=') {
                if k.trim() == cookie_name {
                    return Some(v.trim());
                }
            }
        }
        log::debug!("Cookie '{cookie_name}' not found within Cookie header");
    }

    None
}

/// Whether the request carries a form-encoded body.
pub fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    get_header_value(headers, "content-type")
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
