//! The in-page site-tree builder.
//!
//! Renders one page of the hyper-list: for every content-type range the
//! page index resolved for the requested page, a list container with
//! the documented CSS classes. The class names (`site-tree-list`,
//! `site-tree-<type>-list`, the `site-tree-nav*` ids) are an external
//! contract downstream theming depends on.
//!
//! Hierarchical types render as nested lists through a single generic
//! depth-first traversal parameterized by a per-item render closure;
//! grouped types (by date, category, author or topic) render group
//! headers between flat lists; sticky items are promoted to the top of
//! their list.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::escape::escape as xml_escape;

use cascade_config::{ContentFamily, Grouping, SiteTreeType};
use cascade_index::PageSlice;
use cascade_store::{
    AuthorQuery, ContentItem, ContentStore, Family, ItemOrder, ItemQuery, StoreError, TermQuery,
};

use crate::metrics::Counters;
use crate::{BuilderContext, BuiltDocument};

/// Page links shown in the navigation menu, previous/next excluded.
const MAX_NAV_ITEMS: u32 = 10;

/// Builder for site-tree pages.
pub struct SiteTreeBuilder<'a> {
    ctx: &'a BuilderContext<'a>,
    counters: Counters,
}

impl<'a> SiteTreeBuilder<'a> {
    /// Create a builder over the shared context.
    #[must_use]
    pub fn new(ctx: &'a BuilderContext<'a>) -> Self {
        Self {
            ctx,
            counters: Counters::start(),
        }
    }

    /// Render the hyper-list for one page of the index.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from slice queries.
    pub fn build(
        mut self,
        slices: &[PageSlice],
        page_number: u32,
        number_of_pages: u32,
    ) -> Result<BuiltDocument, StoreError> {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str("<div id=\"site-tree\">\n");

        for slice in slices {
            self.build_list(&mut out, slice)?;
        }

        out.push_str(&self.navigation(page_number, number_of_pages));
        out.push_str("</div>\n");

        Ok(BuiltDocument {
            body: out,
            metrics: self.counters.stop(),
        })
    }

    /// One list container: title, list body, wrapper div.
    fn build_list(&mut self, out: &mut String, slice: &PageSlice) -> Result<(), StoreError> {
        let type_config = self
            .ctx
            .config
            .site_tree
            .content_types
            .iter()
            .find(|t| t.id == slice.content_type)
            .cloned()
            .unwrap_or_else(|| SiteTreeType::plain(slice.content_type.clone()));

        out.push_str("<div class=\"site-tree-list-container\">\n");
        let _ = writeln!(
            out,
            "<h3 class=\"site-tree-list-title site-tree-{id}-list-title\">{title}</h3>",
            id = slice.content_type,
            title = esc(&title_for(&slice.content_type)),
        );

        match self.ctx.config.content_family(&slice.content_type) {
            Some(ContentFamily::Taxonomy) => self.build_term_list(out, slice)?,
            Some(ContentFamily::Author) => self.build_author_list(out, slice)?,
            _ => self.build_item_list(out, slice, &type_config)?,
        }

        out.push_str("</div>\n");
        Ok(())
    }

    fn build_item_list(
        &mut self,
        out: &mut String,
        slice: &PageSlice,
        type_config: &SiteTreeType,
    ) -> Result<(), StoreError> {
        self.counters.record_query();
        let mut items = self.ctx.store.items(&ItemQuery {
            content_type: slice.content_type.clone(),
            family: Family::SiteTree,
            news_window: None,
            order: ItemOrder::TitleAsc,
            limit: slice.limit,
            offset: slice.offset,
        })?;

        // Sticky items lead the list; the reorder is within the page,
        // ranks across pages are untouched.
        items.sort_by_key(|item| !item.sticky);

        match type_config.grouping {
            Some(Grouping::Topic) => self.build_topic_groups(out, slice, &items),
            Some(grouping) => self.build_grouped_list(out, slice, &items, grouping)?,
            None => self.build_tree(out, slice, &items, type_config),
        }
        Ok(())
    }

    /// Nested list: parents inside the slice adopt their children, rows
    /// whose parent is elsewhere become roots.
    fn build_tree(
        &mut self,
        out: &mut String,
        slice: &PageSlice,
        items: &[ContentItem],
        type_config: &SiteTreeType,
    ) {
        let forest = build_forest(items);
        let _ = writeln!(
            out,
            "<ul class=\"site-tree-list site-tree-{id}-list\">",
            id = slice.content_type
        );

        let links = self.ctx.links;
        let hyperlink_depth = type_config.hyperlink_depth;
        let mut emitted = 0u32;
        walk(out, &forest, 0, &mut |out, item, depth, has_children| {
            emitted += 1;
            let dehyperlink =
                has_children && hyperlink_depth.is_some_and(|max_depth| depth < max_depth);
            if dehyperlink {
                let _ = write!(
                    out,
                    "<li class=\"site-tree-dehyperlinked-parent\">{}",
                    esc(&item.title)
                );
            } else {
                let _ = write!(
                    out,
                    "<li><a href=\"{}\">{}</a>",
                    esc(&links.item(&item.content_type, &item.slug)),
                    esc(&item.title)
                );
            }
        });
        for _ in 0..emitted {
            self.counters.record_item();
        }

        out.push_str("</ul>\n");
    }

    /// Pages grouped under their editorial topic.
    fn build_topic_groups(&mut self, out: &mut String, slice: &PageSlice, items: &[ContentItem]) {
        let _ = writeln!(
            out,
            "<ul class=\"site-tree-list site-tree-{id}-list\">",
            id = slice.content_type
        );

        let mut current_topic: Option<String> = None;
        let mut topic_open = false;
        for item in items {
            let topic = item.topic.clone().unwrap_or_default();
            if current_topic.as_deref() != Some(topic.as_str()) {
                if topic_open {
                    out.push_str("</ul>\n</li>\n");
                }
                let topic_slug = slug_of(&topic);
                let _ = writeln!(
                    out,
                    "<li class=\"site-tree-pages-topic-item site-tree-pages-{topic_slug}-topic-item\">\n\
                     <h4 class=\"site-tree-topic-title\">{}</h4>\n\
                     <ul class=\"site-tree-pages-topic-list site-tree-pages-{topic_slug}-topic-list\">",
                    esc(&topic),
                );
                current_topic = Some(topic);
                topic_open = true;
            }
            self.counters.record_item();
            let _ = writeln!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                esc(&self.ctx.links.item(&item.content_type, &item.slug)),
                esc(&item.title)
            );
        }
        if topic_open {
            out.push_str("</ul>\n</li>\n");
        }

        out.push_str("</ul>\n");
    }

    /// Posts under date, category or author group headers.
    fn build_grouped_list(
        &mut self,
        out: &mut String,
        slice: &PageSlice,
        items: &[ContentItem],
        grouping: Grouping,
    ) -> Result<(), StoreError> {
        let mut current_group: Option<String> = None;
        let mut list_open = false;

        for item in items {
            let group = self.group_title(item, grouping)?;
            if current_group.as_deref() != Some(group.as_str()) {
                if list_open {
                    out.push_str("</ul>\n");
                }
                let _ = writeln!(out, "<h4>{}</h4>", esc(&group));
                if list_open {
                    out.push_str("<ul class=\"site-tree-list\">\n");
                } else {
                    let _ = writeln!(
                        out,
                        "<ul class=\"site-tree-list site-tree-{id}-list\">",
                        id = slice.content_type
                    );
                }
                current_group = Some(group);
                list_open = true;
            }
            self.counters.record_item();
            let _ = writeln!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                esc(&self.ctx.links.item(&item.content_type, &item.slug)),
                esc(&item.title)
            );
        }
        if list_open {
            out.push_str("</ul>\n");
        } else {
            // Keep the contract classes present even for an empty list.
            let _ = writeln!(
                out,
                "<ul class=\"site-tree-list site-tree-{id}-list\">\n</ul>",
                id = slice.content_type
            );
        }
        Ok(())
    }

    fn group_title(&mut self, item: &ContentItem, grouping: Grouping) -> Result<String, StoreError> {
        match grouping {
            Grouping::Date => Ok(item.published_at.format("%B %Y").to_string()),
            Grouping::Category => {
                self.counters.record_query();
                let terms = self.ctx.store.item_terms(item.id, "category")?;
                Ok(terms
                    .first()
                    .map_or_else(|| "Uncategorized".to_owned(), |t| t.name.clone()))
            }
            Grouping::Author => {
                let Some(author_id) = item.author else {
                    return Ok(String::new());
                };
                self.counters.record_query();
                let author = self.ctx.store.author(author_id)?;
                Ok(author.map(|a| a.display_name).unwrap_or_default())
            }
            Grouping::Topic => Ok(item.topic.clone().unwrap_or_default()),
        }
    }

    fn build_term_list(&mut self, out: &mut String, slice: &PageSlice) -> Result<(), StoreError> {
        self.counters.record_query();
        let terms = self.ctx.store.terms(&TermQuery {
            taxonomy: slice.content_type.clone(),
            excluded_term_ids: self
                .ctx
                .config
                .excluded_term_ids(&slice.content_type, Family::SiteTree),
            limit: slice.limit,
            offset: slice.offset,
        })?;

        let _ = writeln!(
            out,
            "<ul class=\"site-tree-list site-tree-{id}-list\">",
            id = slice.content_type
        );
        for term in &terms {
            self.counters.record_item();
            let _ = writeln!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                esc(&self.ctx.links.term(&term.taxonomy, &term.slug)),
                esc(&term.name)
            );
        }
        out.push_str("</ul>\n");
        Ok(())
    }

    fn build_author_list(&mut self, out: &mut String, slice: &PageSlice) -> Result<(), StoreError> {
        self.counters.record_query();
        let authors = self.ctx.store.authors(&AuthorQuery {
            excluded_nicenames: self
                .ctx
                .config
                .excluded_authors(Family::SiteTree)
                .to_vec(),
            limit: slice.limit,
            offset: slice.offset,
        })?;

        let _ = writeln!(
            out,
            "<ul class=\"site-tree-list site-tree-{id}-list\">",
            id = slice.content_type
        );
        for author in &authors {
            self.counters.record_item();
            let _ = writeln!(
                out,
                "<li class=\"h-card\"><a href=\"{}\" class=\"p-name\">{}</a></li>",
                esc(&self.ctx.links.author(&author.nicename)),
                esc(&author.display_name)
            );
        }
        out.push_str("</ul>\n");
        Ok(())
    }

    /// The pagination menu: Previous/Next around a window of at most
    /// [`MAX_NAV_ITEMS`] page links centred on the current page.
    fn navigation(&self, page_number: u32, number_of_pages: u32) -> String {
        if number_of_pages <= 1 {
            return String::new();
        }

        let (first, last) = if page_number < MAX_NAV_ITEMS {
            (1, MAX_NAV_ITEMS.min(number_of_pages))
        } else {
            let offset = (MAX_NAV_ITEMS - 1) / 2;
            let last = (page_number + offset).min(number_of_pages);
            (last - MAX_NAV_ITEMS + 1, last)
        };

        let links = self.ctx.links;
        let mut nav = String::from("<nav id=\"site-tree-nav\" role=\"navigation\">");

        if page_number > 1 {
            let _ = write!(
                nav,
                "<a href=\"{}\" id=\"site-tree-nav-prev\" class=\"site-tree-nav-item\">Previous</a> ",
                esc(&links.document(Family::SiteTree, None, page_number - 1))
            );
        }

        for number in first..=last {
            if number == page_number {
                let _ = write!(
                    nav,
                    "<span id=\"site-tree-nav-current-page-item\" class=\"site-tree-nav-item\" aria-current=\"page\">{number}</span> "
                );
            } else {
                let _ = write!(
                    nav,
                    "<a href=\"{}\" class=\"site-tree-nav-item\">{number}</a> ",
                    esc(&links.document(Family::SiteTree, None, number))
                );
            }
        }

        if page_number < number_of_pages {
            let _ = write!(
                nav,
                " <a href=\"{}\" id=\"site-tree-nav-next\" class=\"site-tree-nav-item\">Next</a>",
                esc(&links.document(Family::SiteTree, None, page_number + 1))
            );
        }

        nav.push_str("</nav>");
        nav
    }
}

/// Escape text for HTML output.
fn esc(text: &str) -> Cow<'_, str> {
    xml_escape(text)
}

/// A node of the rendered forest.
struct TreeNode<'i> {
    item: &'i ContentItem,
    children: Vec<TreeNode<'i>>,
}

/// Arrange slice rows into a forest using their parent links. Rows
/// whose parent is outside the slice become roots, in slice order.
fn build_forest(items: &[ContentItem]) -> Vec<TreeNode<'_>> {
    fn children_of<'i>(items: &'i [ContentItem], parent: u64) -> Vec<TreeNode<'i>> {
        items
            .iter()
            .filter(|item| item.parent == Some(parent))
            .map(|item| TreeNode {
                item,
                children: children_of(items, item.id),
            })
            .collect()
    }

    let in_slice: std::collections::HashSet<u64> = items.iter().map(|item| item.id).collect();
    items
        .iter()
        .filter(|item| item.parent.is_none_or(|parent| !in_slice.contains(&parent)))
        .map(|item| TreeNode {
            item,
            children: children_of(items, item.id),
        })
        .collect()
}

/// Depth-first traversal parameterized by a per-item render closure.
///
/// The closure writes the opening `<li>` and the label; the traversal
/// owns child-list wrappers and the closing tags.
fn walk<F>(out: &mut String, nodes: &[TreeNode<'_>], depth: u32, render: &mut F)
where
    F: FnMut(&mut String, &ContentItem, u32, bool),
{
    for node in nodes {
        let has_children = !node.children.is_empty();
        render(out, node.item, depth, has_children);
        if has_children {
            out.push_str("\n<ul class=\"site-tree-child-list\">\n");
            walk(out, &node.children, depth + 1, render);
            out.push_str("</ul>\n");
        }
        out.push_str("</li>\n");
    }
}

/// Human title of a list from its content-type id.
fn title_for(content_type: &str) -> String {
    let mut chars = content_type.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut title: String = first.to_uppercase().collect();
    title.push_str(chars.as_str());
    format!("{title}s")
}

/// CSS-safe slug of a topic title.
fn slug_of(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_config::{Config, Permalinks};
    use cascade_store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, day, 9, 0, 0).unwrap()
    }

    fn slice(content_type: &str, limit: u64, offset: u64) -> PageSlice {
        PageSlice {
            content_type: content_type.to_owned(),
            limit,
            offset,
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.site.base_url = "https://example.com".to_owned();
        config.site_tree.enabled = true;
        config.site_tree.content_types = vec![
            SiteTreeType::plain("page"),
            SiteTreeType::plain("post"),
        ];
        config
    }

    fn build(
        store: &MemoryStore,
        config: &Config,
        slices: &[PageSlice],
        page: u32,
        pages: u32,
    ) -> BuiltDocument {
        let links = Permalinks::new(config);
        let ctx = BuilderContext {
            store,
            config,
            links: &links,
        };
        SiteTreeBuilder::new(&ctx).build(slices, page, pages).unwrap()
    }

    #[test]
    fn test_contract_css_classes() {
        let store = MemoryStore::new().with_item(ContentItem::new(1, "about", "page", at(1)));

        let document = build(&store, &config(), &[slice("page", 100, 0)], 1, 1);

        assert!(document.body.contains("<div id=\"site-tree\">"));
        assert!(document.body.contains("site-tree-list-container"));
        assert!(document
            .body
            .contains("<ul class=\"site-tree-list site-tree-page-list\">"));
        assert!(document
            .body
            .contains("site-tree-list-title site-tree-page-list-title"));
    }

    #[test]
    fn test_nested_pages_render_child_lists() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "parent", "page", at(1)).titled("Parent"))
            .with_item(ContentItem::new(2, "child", "page", at(1)).titled("Child").child_of(1));

        let document = build(&store, &config(), &[slice("page", 100, 0)], 1, 1);

        assert!(document.body.contains("<ul class=\"site-tree-child-list\">"));
        let parent = document.body.find("Parent").unwrap();
        let child = document.body.find("Child").unwrap();
        assert!(parent < child);
        assert_eq!(document.metrics.num_items, 2);
    }

    #[test]
    fn test_dehyperlinked_ancestors_above_depth() {
        let mut config = config();
        config.site_tree.content_types = vec![SiteTreeType {
            id: "page".to_owned(),
            limit: None,
            grouping: None,
            hyperlink_depth: Some(1),
        }];
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "parent", "page", at(1)).titled("Parent"))
            .with_item(ContentItem::new(2, "child", "page", at(1)).titled("Child").child_of(1));

        let document = build(&store, &config, &[slice("page", 100, 0)], 1, 1);

        assert!(document
            .body
            .contains("<li class=\"site-tree-dehyperlinked-parent\">Parent"));
        assert!(document.body.contains("<a href=\"https://example.com/child/\">Child</a>"));
    }

    #[test]
    fn test_sticky_posts_lead_the_list() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "aaa", "post", at(1)).titled("Aaa"))
            .with_item(ContentItem::new(2, "zzz", "post", at(1)).titled("Zzz").sticky());

        let document = build(&store, &config(), &[slice("post", 100, 0)], 1, 1);

        let zzz = document.body.find("Zzz").unwrap();
        let aaa = document.body.find("Aaa").unwrap();
        assert!(zzz < aaa);
    }

    #[test]
    fn test_date_grouping_emits_headers() {
        let mut config = config();
        config.site_tree.content_types = vec![SiteTreeType {
            id: "post".to_owned(),
            limit: None,
            grouping: Some(Grouping::Date),
            hyperlink_depth: None,
        }];
        let store = MemoryStore::new()
            .with_item(
                ContentItem::new(1, "january", "post", at(1))
                    .published(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()),
            )
            .with_item(
                ContentItem::new(2, "february", "post", at(1))
                    .published(Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap()),
            );

        let document = build(&store, &config, &[slice("post", 100, 0)], 1, 1);

        assert!(document.body.contains("<h4>January 2025</h4>"));
        assert!(document.body.contains("<h4>February 2025</h4>"));
    }

    #[test]
    fn test_topic_grouping_markup() {
        let mut config = config();
        config.site_tree.content_types = vec![SiteTreeType {
            id: "page".to_owned(),
            limit: None,
            grouping: Some(Grouping::Topic),
            hyperlink_depth: None,
        }];
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "pricing", "page", at(1)).with_topic("Sales"))
            .with_item(ContentItem::new(2, "returns", "page", at(1)).with_topic("Sales"));

        let document = build(&store, &config, &[slice("page", 100, 0)], 1, 1);

        assert!(document
            .body
            .contains("site-tree-pages-topic-item site-tree-pages-sales-topic-item"));
        assert!(document.body.contains("<h4 class=\"site-tree-topic-title\">Sales</h4>"));
        assert!(document
            .body
            .contains("site-tree-pages-topic-list site-tree-pages-sales-topic-list"));
    }

    #[test]
    fn test_taxonomy_and_author_lists() {
        let mut config = config();
        config.site_tree.content_types = vec![
            SiteTreeType::plain("category"),
            SiteTreeType::plain("authors"),
        ];
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)).by_author(100))
            .with_term(10, "news", "News", "category")
            .with_assignment(10, 1)
            .with_author(100, "alice", "Alice");

        let document = build(
            &store,
            &config,
            &[slice("category", 100, 0), slice("authors", 100, 0)],
            1,
            1,
        );

        assert!(document
            .body
            .contains("<a href=\"https://example.com/category/news/\">News</a>"));
        assert!(document.body.contains("<li class=\"h-card\">"));
        assert!(document.body.contains("class=\"p-name\">Alice</a>"));
    }

    #[test]
    fn test_navigation_window() {
        let store = MemoryStore::new();

        let document = build(&store, &config(), &[], 12, 40);

        assert!(document.body.contains("id=\"site-tree-nav\""));
        assert!(document.body.contains("id=\"site-tree-nav-prev\""));
        assert!(document.body.contains("id=\"site-tree-nav-next\""));
        assert!(document
            .body
            .contains("id=\"site-tree-nav-current-page-item\""));
        // Window is [7, 16]: ten items centred on page 12.
        assert!(document.body.contains(">7</a>"));
        assert!(document.body.contains(">16</a>"));
        assert!(!document.body.contains(">6</a>"));
        assert!(!document.body.contains(">17</a>"));
    }

    #[test]
    fn test_single_page_has_no_navigation() {
        let store = MemoryStore::new().with_item(ContentItem::new(1, "a", "page", at(1)));

        let document = build(&store, &config(), &[slice("page", 100, 0)], 1, 1);

        assert!(!document.body.contains("site-tree-nav"));
    }
}
