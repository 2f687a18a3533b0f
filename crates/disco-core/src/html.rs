//! Alternate-link scraping from HTML landing pages.
//!
//! Service landing pages advertise their discovery document in the head:
//!
//! ```html
//! <link rel="alternate" type="text/xml" href="service.disco"/>
//! ```
//!
//! The scanner is tag-level and non-validating: it tolerates a leading
//! `DOCTYPE`, comments, and attributes quoted with single, double, or no
//! quotes, and it stops at the first `<body>` tag.

use crate::content_type;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for comments and start tags.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<([A-Za-z][A-Za-z0-9:_-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap()
});

/// Regex for a single attribute with an optional quoted or bare value.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#).unwrap()
});

/// Return the `href` of the first `<link rel="alternate" type="text/xml">` in
/// the document head.
///
/// The returned value is entity-decoded but not resolved; callers resolve it
/// against the page's location.
///
/// # Examples
///
/// ```rust
/// use disco_core::html::scrape_alternate_link;
///
/// let page = r#"<!DOCTYPE html><html><head>
///   <link rel=Alternate type='text/xml; charset=utf-8' href="svc.disco">
/// </head><body></body></html>"#;
/// assert_eq!(scrape_alternate_link(page).as_deref(), Some("svc.disco"));
/// ```
#[must_use]
pub fn scrape_alternate_link(html: &str) -> Option<String> {
    for tag in TAG_RE.captures_iter(html) {
        let Some(name) = tag.get(1) else {
            continue;
        };
        let name = name.as_str();

        if name.eq_ignore_ascii_case("body") {
            return None;
        }
        if !name.eq_ignore_ascii_case("link") {
            continue;
        }

        let attributes = tag.get(2).map_or("", |m| m.as_str());
        if let Some(href) = alternate_href(attributes) {
            return Some(href);
        }
    }
    None
}

fn alternate_href(attributes: &str) -> Option<String> {
    let mut is_alternate = false;
    let mut is_xml = false;
    let mut href = None;

    for attr in ATTR_RE.captures_iter(attributes) {
        let Some(name) = attr.get(1) else {
            continue;
        };
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());
        let value = html_escape::decode_html_entities(value);

        match name.as_str().to_ascii_lowercase().as_str() {
            "rel" => is_alternate = value.trim().eq_ignore_ascii_case("alternate"),
            "type" => is_xml = content_type::matches_base(&value, content_type::XML),
            "href" => href = Some(value.trim().to_string()),
            _ => {},
        }
    }

    if is_alternate && is_xml {
        href.filter(|h| !h.is_empty())
    } else {
        None
    }
}
