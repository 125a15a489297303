//! Canonical URL generation.
//!
//! [`Permalinks`] is a pure function of the configuration: given
//! `(family, content-type id, document number)` it always produces the
//! same URL. Redirect targets, the sitemap-index document and the
//! self-referencing stylesheet instructions all go through here, which is
//! what keeps redirects loop-free.
//!
//! With pretty permalinks active, documents live at
//! `/{type}-{document-name}[-{number}].xml` and stylesheets at
//! `/{family}-[{variant}-]template.xsl`; otherwise the query-string form
//! `?tpc=<family>&id=<type>&paged=<n>` is used.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use cascade_store::Family;

use crate::Config;

/// Characters percent-encoded inside a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Canonical URL generator.
#[derive(Debug, Clone)]
pub struct Permalinks {
    base_url: String,
    pretty: bool,
    site_tree_slug: String,
}

impl Permalinks {
    /// Build a generator from the configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.site.base_url.trim_end_matches('/').to_owned(),
            pretty: config.site.pretty_permalinks,
            site_tree_slug: config.site_tree.page_slug.clone(),
        }
    }

    /// Site root URL with a trailing slash.
    #[must_use]
    pub fn home(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Permalink of a content item. Pages live directly under the root;
    /// every other type is prefixed with its type slug.
    #[must_use]
    pub fn item(&self, content_type: &str, slug: &str) -> String {
        let slug = utf8_percent_encode(slug, SEGMENT);
        if content_type == "page" {
            format!("{}/{slug}/", self.base_url)
        } else {
            let ty = utf8_percent_encode(content_type, SEGMENT);
            format!("{}/{ty}/{slug}/", self.base_url)
        }
    }

    /// Permalink of a taxonomy term archive.
    #[must_use]
    pub fn term(&self, taxonomy: &str, slug: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url,
            utf8_percent_encode(taxonomy, SEGMENT),
            utf8_percent_encode(slug, SEGMENT)
        )
    }

    /// Permalink of an author archive.
    #[must_use]
    pub fn author(&self, nicename: &str) -> String {
        format!(
            "{}/author/{}/",
            self.base_url,
            utf8_percent_encode(nicename, SEGMENT)
        )
    }

    /// Canonical URL of a served document.
    ///
    /// `doc_id = None` addresses the family's index document. Numbers 0
    /// and 1 both map to the bare form: an explicit `1` is never part of
    /// a canonical URL.
    #[must_use]
    pub fn document(&self, family: Family, doc_id: Option<&str>, number: u32) -> String {
        match family {
            Family::Sitemap | Family::Newsmap => self.xml_document(family, doc_id, number),
            Family::SiteTree => self.site_tree_page(number),
        }
    }

    /// Canonical URL of a stylesheet document. `variant` is `None` for
    /// the plain family stylesheet, or one of `index`/`image`/`video`.
    #[must_use]
    pub fn stylesheet(&self, family: Family, variant: Option<&str>) -> String {
        if self.pretty {
            let infix = variant.map(|v| format!("{v}-")).unwrap_or_default();
            return format!("{}/{}-{infix}template.xsl", self.base_url, family.slug());
        }

        let id = variant.map_or_else(
            || "stylesheet".to_owned(),
            |v| format!("{v}-stylesheet"),
        );
        format!("{}/?tpc={}&id={id}", self.base_url, family.slug())
    }

    fn xml_document(&self, family: Family, doc_id: Option<&str>, number: u32) -> String {
        let document_name = match family {
            Family::Newsmap => "news-sitemap",
            Family::Sitemap | Family::SiteTree => "sitemap",
        };

        if self.pretty {
            return match doc_id {
                None => format!("{}/{document_name}.xml", self.base_url),
                Some(id) => {
                    let id = utf8_percent_encode(id, SEGMENT);
                    if number > 1 {
                        format!("{}/{id}-{document_name}-{number}.xml", self.base_url)
                    } else {
                        format!("{}/{id}-{document_name}.xml", self.base_url)
                    }
                }
            };
        }

        let mut url = format!("{}/?tpc={}", self.base_url, family.slug());
        if let Some(id) = doc_id {
            url.push_str("&id=");
            url.push_str(&utf8_percent_encode(id, SEGMENT).to_string());
            if number > 1 {
                url.push_str(&format!("&paged={number}"));
            }
        }
        url
    }

    fn site_tree_page(&self, number: u32) -> String {
        if self.pretty {
            let slug = utf8_percent_encode(&self.site_tree_slug, SEGMENT);
            if number > 1 {
                return format!("{}/{slug}/page/{number}/", self.base_url);
            }
            return format!("{}/{slug}/", self.base_url);
        }

        if number > 1 {
            return format!("{}/?tpc=site_tree&paged={number}", self.base_url);
        }
        format!("{}/?tpc=site_tree", self.base_url)
    }
}
