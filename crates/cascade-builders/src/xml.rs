//! XML document assembly.
//!
//! Sitemap documents are flat and enormous, so they are assembled by
//! appending to a pre-sized string, one element per line, with text
//! content escaped through `quick_xml`. Every document opens with the
//! XML declaration and an `<?xml-stylesheet?>` processing instruction
//! pointing at the companion stylesheet endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

/// sitemaps.org 0.9 schema namespace.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Google News extension namespace.
pub const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";

/// Google image extension namespace.
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// Google video extension namespace.
pub const VIDEO_NS: &str = "http://www.google.com/schemas/sitemap-video/1.1";

/// Format a timestamp the way `<lastmod>` wants it (W3C datetime).
#[must_use]
pub fn w3c_datetime(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// An XML sitemap document under construction.
pub struct XmlDocument {
    out: String,
    root: &'static str,
}

impl XmlDocument {
    /// Start a `<urlset>` document. `extra_namespaces` adds the Google
    /// extension namespaces as `(prefix, uri)` pairs.
    #[must_use]
    pub fn urlset(stylesheet_href: &str, extra_namespaces: &[(&str, &str)]) -> Self {
        Self::open("urlset", stylesheet_href, extra_namespaces)
    }

    /// Start a `<sitemapindex>` document.
    #[must_use]
    pub fn sitemapindex(stylesheet_href: &str) -> Self {
        Self::open("sitemapindex", stylesheet_href, &[])
    }

    fn open(root: &'static str, stylesheet_href: &str, extra_namespaces: &[(&str, &str)]) -> Self {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<?xml-stylesheet type=\"text/xsl\" href=\"{}\"?>\n",
            escape(stylesheet_href)
        ));
        out.push_str(&format!("<{root} xmlns=\"{SITEMAP_NS}\""));
        for (prefix, uri) in extra_namespaces {
            out.push_str(&format!(" xmlns:{prefix}=\"{uri}\""));
        }
        out.push_str(">\n");
        Self { out, root }
    }

    /// Open a container element.
    pub fn open_element(&mut self, name: &str) {
        self.out.push('<');
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    /// Close a container element.
    pub fn close_element(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    /// Append `<name>text</name>` with escaped text content.
    pub fn text_element(&mut self, name: &str, text: &str) {
        self.out.push('<');
        self.out.push_str(name);
        self.out.push('>');
        self.out.push_str(&escape(text));
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    /// Append a complete `<url>` element with `<loc>` and an optional
    /// `<lastmod>`.
    pub fn url(&mut self, loc: &str, lastmod: Option<DateTime<Utc>>) {
        self.open_element("url");
        self.text_element("loc", loc);
        if let Some(lastmod) = lastmod {
            self.text_element("lastmod", &w3c_datetime(lastmod));
        }
        self.close_element("url");
    }

    /// Append a `<sitemap>` member of a `<sitemapindex>`.
    pub fn sitemap_ref(&mut self, loc: &str) {
        self.open_element("sitemap");
        self.text_element("loc", loc);
        self.close_element("sitemap");
    }

    /// Close the root element and return the document.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.out.push_str("</");
        self.out.push_str(self.root);
        self.out.push_str(">\n");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_urlset_is_valid_wrapper() {
        let xml = XmlDocument::urlset("https://example.com/sitemap-template.xsl", &[]).finish();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains(
            "<?xml-stylesheet type=\"text/xsl\" href=\"https://example.com/sitemap-template.xsl\"?>"
        ));
        assert!(xml.contains(&format!("<urlset xmlns=\"{SITEMAP_NS}\">")));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_url_element_with_lastmod() {
        let mut doc = XmlDocument::urlset("https://example.com/sitemap-template.xsl", &[]);
        let modified = Utc.with_ymd_and_hms(2025, 4, 1, 10, 30, 0).unwrap();
        doc.url("https://example.com/hello/", Some(modified));
        let xml = doc.finish();

        assert!(xml.contains("<loc>https://example.com/hello/</loc>"));
        assert!(xml.contains("<lastmod>2025-04-01T10:30:00+00:00</lastmod>"));
    }

    #[test]
    fn test_url_element_without_lastmod() {
        let mut doc = XmlDocument::urlset("https://example.com/sitemap-template.xsl", &[]);
        doc.url("https://example.com/hello/", None);
        let xml = doc.finish();

        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = XmlDocument::urlset("https://example.com/x.xsl", &[]);
        doc.text_element("loc", "https://example.com/?a=1&b=<2>");
        let xml = doc.finish();

        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=&lt;2&gt;</loc>"));
    }

    #[test]
    fn test_extra_namespaces() {
        let xml = XmlDocument::urlset("https://example.com/x.xsl", &[("news", NEWS_NS)]).finish();

        assert!(xml.contains(&format!("xmlns:news=\"{NEWS_NS}\"")));
    }

    #[test]
    fn test_sitemapindex_members() {
        let mut doc = XmlDocument::sitemapindex("https://example.com/sitemap-index-template.xsl");
        doc.sitemap_ref("https://example.com/post-sitemap.xml");
        let xml = doc.finish();

        assert!(xml.contains("<sitemapindex"));
        assert!(xml.contains("<sitemap>\n<loc>https://example.com/post-sitemap.xml</loc>\n</sitemap>"));
        assert!(xml.ends_with("</sitemapindex>\n"));
    }

    #[test]
    fn test_w3c_datetime() {
        let timestamp = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(w3c_datetime(timestamp), "2024-12-31T23:59:59+00:00");
    }
}
