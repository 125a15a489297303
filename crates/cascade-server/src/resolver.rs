//! The request state machine.
//!
//! [`resolve`] walks a parsed request through
//! `SlugResolved → IDValidated → NumberValidated → Served`, returning an
//! explicit [`RouteOutcome`] for every terminal state. Validation
//! failures are outcomes, never errors: tests (and the HTTP layer)
//! match on the enum instead of unwinding. The single true error is a
//! failing content store, which propagates untouched.
//!
//! Number semantics: `1` is never a valid explicit document number for
//! a multi-document type: it redirects to the bare canonical URL, which
//! in turn serves the first document. Numbers past the indexed count
//! are not found.

use cascade_builders::{
    BuilderContext, BuiltDocument, DocumentRequest, MediaSitemapBuilder, NewsmapBuilder,
    SiteTreeBuilder, SitemapBuilder, index_doc, metrics, stylesheet,
};
use cascade_config::{Config, ContentFamily, Permalinks};
use cascade_index::{page_index, sitemap_index};
use cascade_kv::Kv;
use cascade_store::{ContentStore, Family, StoreError};

use crate::routes::{DocId, RequestedDocument};

/// Content-type header of XML documents.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";

/// Content-type header of stylesheet documents.
pub const XSL_CONTENT_TYPE: &str = "text/xsl; charset=UTF-8";

/// Content-type header of site-tree pages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Everything the resolver needs, passed by reference instead of held
/// as ambient state.
pub struct RouterContext<'a> {
    /// Content datastore.
    pub store: &'a dyn ContentStore,
    /// Index and metrics persistence.
    pub kv: &'a dyn Kv,
    /// Configuration.
    pub config: &'a Config,
    /// Canonical URL generator.
    pub links: &'a Permalinks,
}

/// A document ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedDocument {
    /// Serialized body.
    pub body: String,
    /// Content-type header value.
    pub content_type: &'static str,
}

/// Terminal state of a routed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Serve the document with deterministic headers.
    Served(ServedDocument),
    /// 301 to the canonical URL.
    Redirect(String),
    /// Standard 404.
    NotFound,
    /// Not ours: fall through to normal content handling.
    PassThrough,
}

/// Route one parsed request to its terminal state.
///
/// # Errors
///
/// Propagates [`StoreError`] when the content store fails mid-build; the
/// HTTP layer maps it to a 5xx.
pub fn resolve(
    ctx: &RouterContext<'_>,
    request: &RequestedDocument,
) -> Result<RouteOutcome, StoreError> {
    if !ctx.config.is_family_active(request.family) {
        return Ok(RouteOutcome::PassThrough);
    }

    // Stylesheets are static per family/variant and never redirect.
    if let DocId::Stylesheet(variant) = request.doc_id {
        return Ok(RouteOutcome::Served(ServedDocument {
            body: stylesheet::build(request.family, variant),
            content_type: XSL_CONTENT_TYPE,
        }));
    }

    // Query-var form with pretty permalinks active: send the client to
    // the canonical permalink.
    if request.via_query && ctx.config.site.pretty_permalinks {
        let number = if request.family == Family::SiteTree {
            request.number
        } else {
            0
        };
        return Ok(RouteOutcome::Redirect(ctx.links.document(
            request.family,
            None,
            number,
        )));
    }

    match request.family {
        Family::SiteTree => resolve_site_tree(ctx, request),
        Family::Sitemap | Family::Newsmap => resolve_xml(ctx, request),
    }
}

fn resolve_xml(
    ctx: &RouterContext<'_>,
    request: &RequestedDocument,
) -> Result<RouteOutcome, StoreError> {
    let family = request.family;

    match &request.doc_id {
        DocId::Index => {
            // The bare index URL never carries a number.
            if request.explicit_number {
                return Ok(RouteOutcome::NotFound);
            }

            let (index, built) =
                sitemap_index::build_or_load(ctx.store, ctx.config, ctx.kv, family, true)?;

            if index.total_documents() > 1 {
                let document = index_doc::build(&builder_ctx(ctx), family, &index)?;
                if built {
                    metrics::record_totals(
                        ctx.kv.bucket(family.slug()).as_ref(),
                        index.total_documents(),
                        index.total_items(),
                    );
                }
                return Ok(RouteOutcome::Served(ServedDocument {
                    body: document.body,
                    content_type: XML_CONTENT_TYPE,
                }));
            }

            // A single document: the bare URL serves it directly under
            // the first indexed post type.
            let default = match family {
                Family::Newsmap => "post",
                Family::Sitemap | Family::SiteTree => "page",
            };
            let doc_id = index
                .resolve_index_type(&ctx.config.site.content_types, default)
                .to_owned();
            serve_xml_document(ctx, family, &doc_id, 0, &index, built)
        }

        DocId::ContentType(id) => {
            if ctx.config.content_family(id).is_none() {
                return Ok(RouteOutcome::NotFound);
            }

            // An explicit 1 is never canonical.
            if request.explicit_number && request.number == 1 {
                return Ok(RouteOutcome::Redirect(ctx.links.document(
                    family,
                    Some(id),
                    0,
                )));
            }

            let (index, built) =
                sitemap_index::build_or_load(ctx.store, ctx.config, ctx.kv, family, true)?;

            let Some(documents) = index.documents_for(id) else {
                return Ok(RouteOutcome::NotFound);
            };
            if request.number > documents {
                return Ok(RouteOutcome::NotFound);
            }

            serve_xml_document(ctx, family, id, request.number, &index, built)
        }

        DocId::Stylesheet(_) => Ok(RouteOutcome::NotFound),
    }
}

fn serve_xml_document(
    ctx: &RouterContext<'_>,
    family: Family,
    doc_id: &str,
    number: u32,
    index: &cascade_index::SitemapIndex,
    index_built: bool,
) -> Result<RouteOutcome, StoreError> {
    let builder_ctx = builder_ctx(ctx);
    let document_request = DocumentRequest {
        doc_id: doc_id.to_owned(),
        number,
        capacity: ctx.config.capacity(family),
    };

    // Static registry dispatch: family plus content classification pick
    // the builder.
    let document: BuiltDocument = match (family, ctx.config.content_family(doc_id)) {
        (Family::Sitemap, Some(ContentFamily::Media(kind))) => {
            MediaSitemapBuilder::new(&builder_ctx, kind).build(&document_request)?
        }
        (Family::Newsmap, _) => NewsmapBuilder::new(&builder_ctx).build(&document_request)?,
        _ => SitemapBuilder::new(&builder_ctx).build(&document_request)?,
    };

    let uid = format!("{doc_id}-{}", number.max(1));
    metrics::record_document(
        ctx.kv.bucket(family.slug()).as_ref(),
        &uid,
        document.metrics,
        index_built.then(|| (index.total_documents(), index.total_items())),
    );

    Ok(RouteOutcome::Served(ServedDocument {
        body: document.body,
        content_type: XML_CONTENT_TYPE,
    }))
}

fn resolve_site_tree(
    ctx: &RouterContext<'_>,
    request: &RequestedDocument,
) -> Result<RouteOutcome, StoreError> {
    // An explicit /page/1/ is never canonical.
    if request.explicit_number && request.number == 1 {
        return Ok(RouteOutcome::Redirect(ctx.links.document(
            Family::SiteTree,
            None,
            0,
        )));
    }

    let (index, built) = page_index::build_or_load(ctx.store, ctx.config, ctx.kv)?;

    let number = request.number.max(1);
    if !index.page_exists(number) {
        // Stale page numbers redirect to the first page.
        return Ok(RouteOutcome::Redirect(ctx.links.document(
            Family::SiteTree,
            None,
            0,
        )));
    }

    let document = SiteTreeBuilder::new(&builder_ctx(ctx)).build(
        &index.slices_for(number),
        number,
        index.number_of_pages(),
    )?;

    metrics::record_document(
        ctx.kv.bucket(Family::SiteTree.slug()).as_ref(),
        &number.to_string(),
        document.metrics,
        built.then(|| {
            (
                index.number_of_pages(),
                i64::try_from(index.total_items()).unwrap_or(i64::MAX),
            )
        }),
    );

    Ok(RouteOutcome::Served(ServedDocument {
        body: document.body,
        content_type: HTML_CONTENT_TYPE,
    }))
}

fn builder_ctx<'a>(ctx: &'a RouterContext<'a>) -> BuilderContext<'a> {
    BuilderContext {
        store: ctx.store,
        config: ctx.config,
        links: ctx.links,
    }
}
