//! XSLT stylesheet documents.
//!
//! Every served XML document references a companion stylesheet endpoint
//! so browsers render a readable table instead of raw XML. Stylesheets
//! are generated per family and variant: the index stylesheet renders
//! `<sitemapindex>` documents, the plain stylesheet renders `<urlset>`
//! documents, and the media variants add a column counting extension
//! blocks per URL.

use cascade_store::Family;

const TABLE_CSS: &str = "\
body { font: 14px/1.5 -apple-system, sans-serif; color: #222; margin: 2em; }\n\
h1 { font-size: 1.4em; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th { text-align: left; border-bottom: 2px solid #ccc; padding: 6px 10px; }\n\
td { border-bottom: 1px solid #eee; padding: 6px 10px; }\n\
tr:hover td { background: #f6f6f6; }";

/// Which extension column a stylesheet variant renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Renders `<sitemapindex>` documents.
    Index,
    /// Renders plain `<urlset>` documents.
    Plain,
    /// Adds an image count column.
    Image,
    /// Adds a video count column.
    Video,
}

impl Variant {
    /// Parse the stylesheet pseudo-id used on the URL surface
    /// (`index-stylesheet`, `stylesheet`, `image-stylesheet`, ...).
    #[must_use]
    pub fn from_pseudo_id(id: &str) -> Option<Self> {
        match id {
            "stylesheet" => Some(Self::Plain),
            "index-stylesheet" => Some(Self::Index),
            "image-stylesheet" => Some(Self::Image),
            "video-stylesheet" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Serialize the stylesheet document for `family` and `variant`.
#[must_use]
pub fn build(family: Family, variant: Variant) -> String {
    let title = match (family, variant) {
        (_, Variant::Index) => "Sitemap Index",
        (Family::Newsmap, _) => "News Sitemap",
        (_, Variant::Image) => "Image Sitemap",
        (_, Variant::Video) => "Video Sitemap",
        _ => "Sitemap",
    };

    if variant == Variant::Index {
        return index_stylesheet(title);
    }
    urlset_stylesheet(title, variant)
}

fn index_stylesheet(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0"
    xmlns:xsl="http://www.w3.org/1999/XSL/Transform"
    xmlns:sitemap="http://www.sitemaps.org/schemas/sitemap/0.9">
<xsl:output method="html" encoding="UTF-8" indent="yes"/>
<xsl:template match="/">
<html>
<head><title>{title}</title><style>{TABLE_CSS}</style></head>
<body>
<h1>{title}</h1>
<p><xsl:value-of select="count(sitemap:sitemapindex/sitemap:sitemap)"/> sitemaps</p>
<table>
<tr><th>#</th><th>Sitemap</th></tr>
<xsl:for-each select="sitemap:sitemapindex/sitemap:sitemap">
<tr>
<td><xsl:value-of select="position()"/></td>
<td><a href="{{sitemap:loc}}"><xsl:value-of select="sitemap:loc"/></a></td>
</tr>
</xsl:for-each>
</table>
</body>
</html>
</xsl:template>
</xsl:stylesheet>
"#
    )
}

fn urlset_stylesheet(title: &str, variant: Variant) -> String {
    let (extra_ns, extra_header, extra_cell) = match variant {
        Variant::Image => (
            "\n    xmlns:image=\"http://www.google.com/schemas/sitemap-image/1.1\"",
            "<th>Images</th>",
            "<td><xsl:value-of select=\"count(image:image)\"/></td>",
        ),
        Variant::Video => (
            "\n    xmlns:video=\"http://www.google.com/schemas/sitemap-video/1.1\"",
            "<th>Videos</th>",
            "<td><xsl:value-of select=\"count(video:video)\"/></td>",
        ),
        Variant::Plain | Variant::Index => ("", "<th>Last modified</th>", "<td><xsl:value-of select=\"sitemap:lastmod\"/></td>"),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0"
    xmlns:xsl="http://www.w3.org/1999/XSL/Transform"
    xmlns:sitemap="http://www.sitemaps.org/schemas/sitemap/0.9"{extra_ns}>
<xsl:output method="html" encoding="UTF-8" indent="yes"/>
<xsl:template match="/">
<html>
<head><title>{title}</title><style>{TABLE_CSS}</style></head>
<body>
<h1>{title}</h1>
<p><xsl:value-of select="count(sitemap:urlset/sitemap:url)"/> URLs</p>
<table>
<tr><th>#</th><th>URL</th>{extra_header}</tr>
<xsl:for-each select="sitemap:urlset/sitemap:url">
<tr>
<td><xsl:value-of select="position()"/></td>
<td><a href="{{sitemap:loc}}"><xsl:value-of select="sitemap:loc"/></a></td>
{extra_cell}
</tr>
</xsl:for-each>
</table>
</body>
</html>
</xsl:template>
</xsl:stylesheet>
"#
    )
}
