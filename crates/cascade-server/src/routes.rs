//! Inbound URL parsing.
//!
//! Maps a request path (or the query-string form) to a
//! [`RequestedDocument`], or to `None` for anything this engine does
//! not serve, which the caller passes through to normal content
//! handling. Parsing is pure and mirrors the canonical URL patterns the
//! [`Permalinks`](cascade_config::Permalinks) generator produces, so a
//! generated URL always parses back to its request.

use std::collections::HashMap;

use cascade_builders::stylesheet;
use cascade_config::Config;
use cascade_store::Family;

/// What an inbound request addresses within a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocId {
    /// The family's bare index URL.
    Index,
    /// A per-type document.
    ContentType(String),
    /// A stylesheet endpoint.
    Stylesheet(stylesheet::Variant),
}

/// An inbound document request, validated against the index by the
/// resolver before any query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedDocument {
    /// Document family.
    pub family: Family,
    /// Addressed document.
    pub doc_id: DocId,
    /// Requested number; 0 when the URL carried none.
    pub number: u32,
    /// True when the URL carried an explicit number (needed to tell an
    /// explicit `1` from the bare canonical form).
    pub explicit_number: bool,
    /// True when the request arrived in the query-string form; with
    /// pretty permalinks active such requests redirect to their
    /// canonical URL.
    pub via_query: bool,
}

impl RequestedDocument {
    fn new(family: Family, doc_id: DocId, number: Option<u32>) -> Self {
        Self {
            family,
            doc_id,
            number: number.unwrap_or(0),
            explicit_number: number.is_some(),
            via_query: false,
        }
    }
}

/// Parse a pretty-permalink path (no leading slash) into a request.
#[must_use]
pub fn parse_path(path: &str, config: &Config) -> Option<RequestedDocument> {
    let path = path.trim_matches('/');

    if let Some(request) = parse_site_tree_path(path, config) {
        return Some(request);
    }

    if let Some(name) = path.strip_suffix(".xsl") {
        return parse_stylesheet_name(name);
    }

    let name = path.strip_suffix(".xml")?;
    if name.contains('/') {
        return None;
    }

    let (base, number) = split_trailing_number(name);

    if base == "sitemap" {
        return Some(RequestedDocument::new(Family::Sitemap, DocId::Index, number));
    }
    if base == "news-sitemap" {
        return Some(RequestedDocument::new(Family::Newsmap, DocId::Index, number));
    }
    if let Some(id) = base.strip_suffix("-news-sitemap") {
        return Some(RequestedDocument::new(
            Family::Newsmap,
            DocId::ContentType(id.to_owned()),
            number,
        ));
    }
    if let Some(id) = base.strip_suffix("-sitemap") {
        return Some(RequestedDocument::new(
            Family::Sitemap,
            DocId::ContentType(id.to_owned()),
            number,
        ));
    }

    None
}

/// Parse the query-string form `?tpc=<family>&id=<type>&paged=<n>`.
///
/// A slug-only request (no `id`) addresses the family index.
#[must_use]
pub fn parse_query(params: &HashMap<String, String>) -> Option<RequestedDocument> {
    let family = Family::from_slug(params.get("tpc")?)?;
    let number = params
        .get("paged")
        .and_then(|raw| raw.parse::<u32>().ok());

    let doc_id = if family == Family::SiteTree {
        DocId::Index
    } else {
        match params.get("id").map(String::as_str) {
            None | Some("") | Some("index") => DocId::Index,
            Some(id) => match stylesheet::Variant::from_pseudo_id(id) {
                Some(variant) => DocId::Stylesheet(variant),
                None => DocId::ContentType(id.to_owned()),
            },
        }
    };

    let mut request = RequestedDocument::new(family, doc_id, number);
    request.via_query = true;
    Some(request)
}

/// `{page_slug}` or `{page_slug}/page/{n}`.
fn parse_site_tree_path(path: &str, config: &Config) -> Option<RequestedDocument> {
    let slug = config.site_tree.page_slug.as_str();

    if path == slug {
        return Some(RequestedDocument::new(Family::SiteTree, DocId::Index, None));
    }

    let rest = path.strip_prefix(slug)?.strip_prefix("/page/")?;
    let number = rest.parse::<u32>().ok()?;
    Some(RequestedDocument::new(
        Family::SiteTree,
        DocId::Index,
        Some(number),
    ))
}

/// `{family}-[{variant}-]template`.
fn parse_stylesheet_name(name: &str) -> Option<RequestedDocument> {
    let base = name.strip_suffix("-template")?;
    let (family_slug, variant) = match base.split_once('-') {
        Some((family, variant)) => (family, Some(variant)),
        None => (base, None),
    };

    let family = Family::from_slug(family_slug)?;
    if family == Family::SiteTree {
        return None;
    }

    let variant = match variant {
        None => stylesheet::Variant::Plain,
        Some("index") => stylesheet::Variant::Index,
        Some("image") => stylesheet::Variant::Image,
        Some("video") => stylesheet::Variant::Video,
        Some(_) => return None,
    };

    Some(RequestedDocument::new(
        family,
        DocId::Stylesheet(variant),
        None,
    ))
}

/// Split a trailing `-{digits}` group off a document name.
fn split_trailing_number(name: &str) -> (&str, Option<u32>) {
    if let Some((base, digits)) = name.rsplit_once('-')
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && let Ok(number) = digits.parse::<u32>()
    {
        return (base, Some(number));
    }
    (name, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_bare_index_paths() {
        let request = parse_path("sitemap.xml", &config()).unwrap();
        assert_eq!(request.family, Family::Sitemap);
        assert_eq!(request.doc_id, DocId::Index);
        assert_eq!(request.number, 0);
        assert!(!request.explicit_number);

        let request = parse_path("news-sitemap.xml", &config()).unwrap();
        assert_eq!(request.family, Family::Newsmap);
        assert_eq!(request.doc_id, DocId::Index);
    }

    #[test]
    fn test_typed_paths_with_and_without_number() {
        let request = parse_path("post-sitemap.xml", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::ContentType("post".to_owned()));
        assert_eq!(request.number, 0);

        let request = parse_path("post-sitemap-3.xml", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::ContentType("post".to_owned()));
        assert_eq!(request.number, 3);
        assert!(request.explicit_number);

        let request = parse_path("post-news-sitemap-2.xml", &config()).unwrap();
        assert_eq!(request.family, Family::Newsmap);
        assert_eq!(request.doc_id, DocId::ContentType("post".to_owned()));
        assert_eq!(request.number, 2);
    }

    #[test]
    fn test_hyphenated_type_ids() {
        let request = parse_path("press-release-sitemap.xml", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::ContentType("press-release".to_owned()));
    }

    #[test]
    fn test_stylesheet_paths() {
        let request = parse_path("sitemap-template.xsl", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::Stylesheet(stylesheet::Variant::Plain));

        let request = parse_path("sitemap-index-template.xsl", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::Stylesheet(stylesheet::Variant::Index));

        let request = parse_path("sitemap-image-template.xsl", &config()).unwrap();
        assert_eq!(request.doc_id, DocId::Stylesheet(stylesheet::Variant::Image));

        let request = parse_path("newsmap-template.xsl", &config()).unwrap();
        assert_eq!(request.family, Family::Newsmap);
    }

    #[test]
    fn test_site_tree_paths() {
        let request = parse_path("site-tree", &config()).unwrap();
        assert_eq!(request.family, Family::SiteTree);
        assert_eq!(request.number, 0);

        let request = parse_path("site-tree/page/4", &config()).unwrap();
        assert_eq!(request.number, 4);
        assert!(request.explicit_number);
    }

    #[test]
    fn test_unrelated_paths_pass_through() {
        assert_eq!(parse_path("about", &config()), None);
        assert_eq!(parse_path("feed.xml.gz", &config()), None);
        assert_eq!(parse_path("blog/post-sitemap.xml", &config()), None);
        assert_eq!(parse_path("style.css", &config()), None);
    }

    #[test]
    fn test_generated_urls_parse_back() {
        use cascade_config::Permalinks;

        let mut config = config();
        config.site.base_url = "https://example.com".to_owned();
        let links = Permalinks::new(&config);

        for (family, id, number) in [
            (Family::Sitemap, Some("post"), 3),
            (Family::Sitemap, None, 0),
            (Family::Newsmap, Some("post"), 2),
            (Family::Newsmap, None, 0),
        ] {
            let url = links.document(family, id, number);
            let path = url.strip_prefix("https://example.com/").unwrap();
            let request = parse_path(path, &config).unwrap();
            assert_eq!(request.family, family, "{url}");
            match id {
                Some(id) => assert_eq!(request.doc_id, DocId::ContentType(id.to_owned())),
                None => assert_eq!(request.doc_id, DocId::Index),
            }
            assert_eq!(request.number, number, "{url}");
        }
    }

    #[test]
    fn test_query_form() {
        let mut params = HashMap::new();
        params.insert("tpc".to_owned(), "sitemap".to_owned());
        params.insert("id".to_owned(), "post".to_owned());
        params.insert("paged".to_owned(), "3".to_owned());

        let request = parse_query(&params).unwrap();
        assert_eq!(request.family, Family::Sitemap);
        assert_eq!(request.doc_id, DocId::ContentType("post".to_owned()));
        assert_eq!(request.number, 3);
        assert!(request.via_query);
    }

    #[test]
    fn test_query_form_without_id_addresses_the_index() {
        let mut params = HashMap::new();
        params.insert("tpc".to_owned(), "sitemap".to_owned());

        let request = parse_query(&params).unwrap();
        assert_eq!(request.doc_id, DocId::Index);
        assert!(!request.explicit_number);
    }

    #[test]
    fn test_query_form_stylesheet_pseudo_ids() {
        let mut params = HashMap::new();
        params.insert("tpc".to_owned(), "sitemap".to_owned());
        params.insert("id".to_owned(), "index-stylesheet".to_owned());

        let request = parse_query(&params).unwrap();
        assert_eq!(request.doc_id, DocId::Stylesheet(stylesheet::Variant::Index));
    }

    #[test]
    fn test_query_form_unknown_family_passes_through() {
        let mut params = HashMap::new();
        params.insert("tpc".to_owned(), "feed".to_owned());

        assert_eq!(parse_query(&params), None);
    }
}
