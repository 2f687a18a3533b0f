//! Media-type matching helpers.

/// Media type of HTML landing pages.
pub const HTML: &str = "text/html";
/// Media type advertised by alternate discovery links.
pub const XML: &str = "text/xml";

/// The lowercase `type/subtype` portion of a content type, without parameters.
#[must_use]
pub fn base(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether `content_type` has the given base media type.
#[must_use]
pub fn matches_base(content_type: &str, expected: &str) -> bool {
    base(content_type) == expected
}

/// Whether the content type announces HTML.
#[must_use]
pub fn is_html(content_type: &str) -> bool {
    matches_base(content_type, HTML)
}

/// Whether the content type announces any XML flavour.
#[must_use]
pub fn is_xml(content_type: &str) -> bool {
    let base = base(content_type);
    base == "text/xml" || base == "application/xml" || base.ends_with("+xml")
}

/// The `charset` parameter, lowercased, if present.
#[must_use]
pub fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(['"', '\'']).to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Decode an HTML body to text.
///
/// UTF-8 is honoured when declared or when the bytes are valid UTF-8; any
/// other body is read as ISO-8859-1, the conventional `text/html` default.
#[must_use]
pub fn decode_text(content_type: &str, body: &[u8]) -> String {
    match charset(content_type).as_deref() {
        Some("utf-8" | "utf8") => String::from_utf8_lossy(body).into_owned(),
        _ => match std::str::from_utf8(body) {
            Ok(text) => text.to_string(),
            Err(_) => body.iter().map(|&b| char::from(b)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_strips_parameters() {
        assert_eq!(base("Text/HTML; charset=utf-8"), "text/html");
        assert_eq!(base(""), "");
    }

    #[test]
    fn test_html_detection() {
        assert!(is_html("text/html"));
        assert!(is_html("TEXT/HTML;charset=iso-8859-1"));
        assert!(!is_html("text/xml"));
        assert!(!is_html("application/xhtml+xml"));
    }

    #[test]
    fn test_xml_detection() {
        assert!(is_xml("text/xml; charset=utf-8"));
        assert!(is_xml("application/xml"));
        assert!(is_xml("application/soap+xml"));
        assert!(!is_xml("application/json"));
    }

    #[test]
    fn test_charset_parameter() {
        assert_eq!(
            charset("text/html; charset=\"UTF-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset("text/html"), None);
    }

    #[test]
    fn test_decode_falls_back_to_latin1() {
        let body = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text("text/html", &body), "café");
        assert_eq!(decode_text("text/html", "naïve".as_bytes()), "naïve");
    }
}
